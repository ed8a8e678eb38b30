use crate::{
    AppState,
    auth::{self, SessionUser},
    models::{
        Achievement, AdminDashboardStats, ContactRequest, CreateAchievementRequest,
        CreateProjectRequest, FieldError, ImageUploadRequest, ImageUploadResponse, LoginRequest,
        PortfolioStats, Profile, Project, Reach, SessionAccount, SessionResponse, SignUpRequest,
        SignUpResponse, UpdateAchievementRequest, UpdateProfileRequest, UpdateProjectRequest,
        ValidationErrorBody,
    },
    storage,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

// --- Filter Structs ---

/// ProjectFilter
///
/// Accepted query parameters for the public project listing (GET /projects).
#[derive(Deserialize, utoipa::IntoParams)]
pub struct ProjectFilter {
    /// Restrict to featured (or explicitly non-featured) projects.
    pub featured: Option<bool>,
    /// Case-insensitive match against title, slug, and description.
    pub search: Option<String>,
}

// --- Response Helpers ---

/// Field-validation failures become a structured 422 so the admin forms can
/// render each message inline. Nothing has touched the backend at this point.
fn validation_failed(errors: Vec<FieldError>) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ValidationErrorBody { errors }),
    )
        .into_response()
}

fn write_failed(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

// --- Public Handlers ---

/// get_projects
///
/// [Public Route] Lists projects newest-first with optional featured/search
/// filters. Read failures degrade to an empty list at the repository layer,
/// so this endpoint never errors.
#[utoipa::path(
    get,
    path = "/projects",
    params(ProjectFilter),
    responses((status = 200, description = "List filtered projects", body = [Project]))
)]
pub async fn get_projects(
    State(state): State<AppState>,
    Query(filter): Query<ProjectFilter>,
) -> Json<Vec<Project>> {
    let projects = state.repo.list_projects(filter.featured, filter.search).await;
    Json(projects)
}

/// get_featured_projects
///
/// [Public Route] The landing-page grid: the three newest featured projects.
#[utoipa::path(
    get,
    path = "/projects/featured",
    responses((status = 200, description = "Featured projects", body = [Project]))
)]
pub async fn get_featured_projects(State(state): State<AppState>) -> Json<Vec<Project>> {
    let featured = state.repo.list_featured_projects(3).await;
    Json(featured)
}

/// get_project_by_slug
///
/// [Public Route] Single project detail, addressed by its URL-safe slug.
#[utoipa::path(
    get,
    path = "/projects/{slug}",
    params(("slug" = String, Path, description = "Project slug")),
    responses(
        (status = 200, description = "Found", body = Project),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_project_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Project>, StatusCode> {
    match state.repo.get_project_by_slug(&slug).await {
        Some(project) => Ok(Json(project)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// get_achievements
///
/// [Public Route] Lists achievements newest-first.
#[utoipa::path(
    get,
    path = "/achievements",
    responses((status = 200, description = "Achievements", body = [Achievement]))
)]
pub async fn get_achievements(State(state): State<AppState>) -> Json<Vec<Achievement>> {
    let achievements = state.repo.list_achievements().await;
    Json(achievements)
}

/// get_achievement_details
///
/// [Public Route] Single achievement detail by id.
#[utoipa::path(
    get,
    path = "/achievements/{id}",
    params(("id" = Uuid, Path, description = "Achievement ID")),
    responses(
        (status = 200, description = "Found", body = Achievement),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_achievement_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Achievement>, StatusCode> {
    match state.repo.get_achievement(id).await {
        Some(achievement) => Ok(Json(achievement)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// get_portfolio_stats
///
/// [Public Route] Landing-page counters.
#[utoipa::path(
    get,
    path = "/stats",
    responses((status = 200, description = "Portfolio stats", body = PortfolioStats))
)]
pub async fn get_portfolio_stats(State(state): State<AppState>) -> Json<PortfolioStats> {
    Json(state.repo.portfolio_stats().await)
}

/// submit_contact
///
/// [Public Route] Persists a contact message to the `reach` table.
///
/// This is the one write path whose backend failure is surfaced with a
/// specific message instead of degrading silently: the visitor needs to know
/// their message did not go through. Malformed submissions are rejected
/// before any backend call.
#[utoipa::path(
    post,
    path = "/contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Message stored", body = Reach),
        (status = 422, description = "Validation failed", body = ValidationErrorBody),
        (status = 500, description = "Backend rejected the message")
    )
)]
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(payload): Json<ContactRequest>,
) -> Response {
    if let Err(errors) = payload.validate() {
        return validation_failed(errors);
    }

    match state.repo.insert_reach(payload).await {
        Ok(reach) => (StatusCode::CREATED, Json(reach)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": format!("Failed to send message: {}", e)
            })),
        )
            .into_response(),
    }
}

/// sign_up
///
/// [Public Route] Delegates account creation to the hosted auth provider.
/// The matching Profile row is provisioned by the backend's own trigger, so
/// no profile insert happens here. Backend rejections are returned to the
/// caller for display.
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignUpRequest,
    responses(
        (status = 200, description = "Registered", body = SignUpResponse),
        (status = 401, description = "Rejected by the auth provider")
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Response {
    let mut errors = Vec::new();
    if payload.email.parse::<email_address::EmailAddress>().is_err() {
        errors.push(FieldError {
            field: "email".to_string(),
            message: "Please enter a valid email address".to_string(),
        });
    }
    if payload.password.chars().count() < 6 {
        errors.push(FieldError {
            field: "password".to_string(),
            message: "Password must be at least 6 characters".to_string(),
        });
    }
    if payload.full_name.trim().is_empty() {
        errors.push(FieldError {
            field: "full_name".to_string(),
            message: "Full name is required".to_string(),
        });
    }
    if !errors.is_empty() {
        return validation_failed(errors);
    }

    match state
        .auth
        .sign_up(&payload.email, &payload.password, &payload.full_name)
        .await
    {
        Ok(id) => Json(SignUpResponse {
            id,
            email: payload.email,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// sign_in
///
/// [Public Route] Session establishment with a fixed precedence order:
/// the hardcoded administrator pair is checked first and, on a match, a
/// locally signed token is issued with administrator status — the hosted
/// backend is bypassed entirely. Everything else goes to the backend's
/// password grant, whose rejections propagate to the caller for display.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Response {
    // Local administrator override: no backend call, no profile lookup.
    if payload.email == state.config.admin_email
        && payload.password == state.config.admin_password
    {
        return match auth::issue_local_admin_token(&state.config) {
            Ok(token) => Json(SessionResponse {
                access_token: token,
                token_type: "bearer".to_string(),
                user: SessionAccount {
                    id: auth::LOCAL_ADMIN_ID,
                    email: payload.email,
                },
                is_admin: true,
            })
            .into_response(),
            Err(e) => e.into_response(),
        };
    }

    let session = match state.auth.sign_in(&payload.email, &payload.password).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };

    // The profiles row supplies the administrator flag; a failed lookup has
    // already been logged and resolves to a regular session.
    let is_admin = state
        .repo
        .get_profile(session.user_id)
        .await
        .map(|profile| profile.is_admin)
        .unwrap_or(false);

    Json(SessionResponse {
        access_token: session.access_token,
        token_type: "bearer".to_string(),
        user: SessionAccount {
            id: session.user_id,
            email: session.email.unwrap_or(payload.email),
        },
        is_admin,
    })
    .into_response()
}

// --- Authenticated Handlers ---

/// get_me
///
/// [Authenticated Route] The current identity's Profile. The local override
/// identity has no backing row, and a backend user whose profile has not been
/// provisioned yet gets a minimal fabricated record rather than an error.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = Profile))
)]
pub async fn get_me(user: SessionUser, State(state): State<AppState>) -> Json<Profile> {
    if let Some(profile) = state.repo.get_profile(user.id).await {
        return Json(profile);
    }

    let now = Utc::now();
    Json(Profile {
        id: user.id,
        full_name: None,
        avatar_url: None,
        website: None,
        bio: None,
        is_admin: user.is_admin,
        created_at: now,
        updated_at: now,
    })
}

/// update_me
///
/// [Authenticated Route] Updates the caller's own Profile fields. The
/// administrator flag is not writable through this surface.
#[utoipa::path(
    put,
    path = "/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 204, description = "Updated"),
        (status = 404, description = "No profile row"),
        (status = 422, description = "Validation failed", body = ValidationErrorBody)
    )
)]
pub async fn update_me(
    user: SessionUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Response {
    if let Err(errors) = payload.validate() {
        return validation_failed(errors);
    }

    if state.repo.update_profile(user.id, payload).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

/// sign_out
///
/// [Authenticated Route] Ends the session. The backend's sign-out is invoked
/// with the presented token regardless of which path established the session,
/// so stale backend sessions cannot linger; revocation failures are logged,
/// never surfaced. The token itself simply stops being presented.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Signed out"))
)]
pub async fn sign_out(
    _user: SessionUser,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> StatusCode {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if let Some(token) = token {
        if let Err(e) = state.auth.sign_out(token).await {
            tracing::warn!("backend sign-out failed: {}", e);
        }
    }

    StatusCode::NO_CONTENT
}

/// get_image_upload_url
///
/// [Authenticated Route] Issues a short-lived direct-to-storage upload URL
/// for a portfolio image. The content type is restricted to images and bound
/// into the signature; the object key is always server-generated.
#[utoipa::path(
    post,
    path = "/uploads/presigned",
    request_body = ImageUploadRequest,
    responses(
        (status = 200, description = "Upload URL", body = ImageUploadResponse),
        (status = 415, description = "Not an image type")
    )
)]
pub async fn get_image_upload_url(
    _user: SessionUser,
    State(state): State<AppState>,
    Json(payload): Json<ImageUploadRequest>,
) -> Response {
    if !storage::is_supported_image_type(&payload.content_type) {
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Json(serde_json::json!({
                "error": format!("Unsupported image type: {}", payload.content_type)
            })),
        )
            .into_response();
    }

    let extension = std::path::Path::new(&payload.filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("bin");
    let object_key = format!("portfolio/{}.{}", Uuid::new_v4(), extension);

    match state
        .storage
        .presigned_image_upload_url(&object_key, &payload.content_type)
        .await
    {
        Ok(url) => Json(ImageUploadResponse {
            upload_url: url,
            object_key,
        })
        .into_response(),
        Err(e) => {
            tracing::error!("presign error: {}", e);
            write_failed("Failed to issue upload URL")
        }
    }
}

// --- Admin Handlers ---
//
// The administrator guard on the /admin router is the authorization boundary
// for everything below; handlers here implement the list/form workflow only.

/// get_admin_projects
///
/// [Admin Route] All projects with their technology tags, for the admin list
/// view.
#[utoipa::path(
    get,
    path = "/admin/projects",
    responses((status = 200, description = "All projects", body = [Project]))
)]
pub async fn get_admin_projects(State(state): State<AppState>) -> Json<Vec<Project>> {
    Json(state.repo.list_projects(None, None).await)
}

/// create_project
///
/// [Admin Route] Creates a project and its technology rows. Validation runs
/// in full before any backend call.
#[utoipa::path(
    post,
    path = "/admin/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Created", body = Project),
        (status = 422, description = "Validation failed", body = ValidationErrorBody),
        (status = 500, description = "Backend rejected the insert")
    )
)]
pub async fn create_project(
    State(state): State<AppState>,
    Json(payload): Json<CreateProjectRequest>,
) -> Response {
    if let Err(errors) = payload.validate() {
        return validation_failed(errors);
    }

    match state.repo.create_project(payload).await {
        Some(project) => (StatusCode::CREATED, Json(project)).into_response(),
        // Covers both backend failures and slug collisions; the form shows
        // the message and stays open for correction.
        None => write_failed("Failed to create project. Please try again."),
    }
}

/// update_project
///
/// [Admin Route] Partial update; a provided technology set replaces the
/// stored set atomically.
#[utoipa::path(
    put,
    path = "/admin/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 204, description = "Updated"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Validation failed", body = ValidationErrorBody)
    )
)]
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProjectRequest>,
) -> Response {
    if let Err(errors) = payload.validate() {
        return validation_failed(errors);
    }

    if state.repo.update_project(id, payload).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

/// delete_project
///
/// [Admin Route] Deletes a project after the list view's confirmation prompt.
#[utoipa::path(
    delete,
    path = "/admin/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_project(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state.repo.delete_project(id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// get_admin_achievements
///
/// [Admin Route] All achievements for the admin list view.
#[utoipa::path(
    get,
    path = "/admin/achievements",
    responses((status = 200, description = "All achievements", body = [Achievement]))
)]
pub async fn get_admin_achievements(State(state): State<AppState>) -> Json<Vec<Achievement>> {
    Json(state.repo.list_achievements().await)
}

/// create_achievement
///
/// [Admin Route] Creates an achievement. The primary image URL is required by
/// validation before anything reaches the backend.
#[utoipa::path(
    post,
    path = "/admin/achievements",
    request_body = CreateAchievementRequest,
    responses(
        (status = 201, description = "Created", body = Achievement),
        (status = 422, description = "Validation failed", body = ValidationErrorBody),
        (status = 500, description = "Backend rejected the insert")
    )
)]
pub async fn create_achievement(
    State(state): State<AppState>,
    Json(payload): Json<CreateAchievementRequest>,
) -> Response {
    if let Err(errors) = payload.validate() {
        return validation_failed(errors);
    }

    match state.repo.create_achievement(payload).await {
        Some(achievement) => (StatusCode::CREATED, Json(achievement)).into_response(),
        None => write_failed("Failed to create achievement. Please try again."),
    }
}

/// update_achievement
///
/// [Admin Route] Partial update of an achievement.
#[utoipa::path(
    put,
    path = "/admin/achievements/{id}",
    params(("id" = Uuid, Path, description = "Achievement ID")),
    request_body = UpdateAchievementRequest,
    responses(
        (status = 204, description = "Updated"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Validation failed", body = ValidationErrorBody)
    )
)]
pub async fn update_achievement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAchievementRequest>,
) -> Response {
    if let Err(errors) = payload.validate() {
        return validation_failed(errors);
    }

    if state.repo.update_achievement(id, payload).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

/// delete_achievement
///
/// [Admin Route] Deletes an achievement.
#[utoipa::path(
    delete,
    path = "/admin/achievements/{id}",
    params(("id" = Uuid, Path, description = "Achievement ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_achievement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    if state.repo.delete_achievement(id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// get_admin_stats
///
/// [Admin Route] Dashboard counters.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses((status = 200, description = "Stats", body = AdminDashboardStats))
)]
pub async fn get_admin_stats(State(state): State<AppState>) -> Json<AdminDashboardStats> {
    Json(state.repo.admin_stats().await)
}
