use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod storage;

// Routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::SessionUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

// Core state types for the entry point and for test harnesses.
pub use auth::{AuthState, MockAuthBackend, SupabaseAuthClient};
pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation for the application from every
/// handler and schema decorated with the utoipa macros. The resulting JSON is
/// served at `/api-docs/openapi.json`, with the UI at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_projects, handlers::get_featured_projects, handlers::get_project_by_slug,
        handlers::get_achievements, handlers::get_achievement_details,
        handlers::get_portfolio_stats, handlers::submit_contact,
        handlers::sign_up, handlers::sign_in, handlers::sign_out,
        handlers::get_me, handlers::update_me, handlers::get_image_upload_url,
        handlers::get_admin_projects, handlers::create_project, handlers::update_project,
        handlers::delete_project, handlers::get_admin_achievements,
        handlers::create_achievement, handlers::update_achievement,
        handlers::delete_achievement, handlers::get_admin_stats
    ),
    components(
        schemas(
            models::Project, models::Achievement, models::Profile, models::Reach,
            models::CreateProjectRequest, models::UpdateProjectRequest,
            models::CreateAchievementRequest, models::UpdateAchievementRequest,
            models::UpdateProfileRequest, models::ContactRequest,
            models::SignUpRequest, models::LoginRequest,
            models::SessionAccount, models::SessionResponse, models::SignUpResponse,
            models::ImageUploadRequest, models::ImageUploadResponse,
            models::PortfolioStats, models::AdminDashboardStats,
            models::FieldError, models::ValidationErrorBody,
        )
    ),
    tags(
        (name = "portfolio", description = "Portfolio site API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding all application
/// services and configuration, shared across every request.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer: typed access to the hosted backend's database.
    pub repo: RepositoryState,
    /// Hosted identity provider (sign-up, password sign-in, sign-out).
    pub auth: AuthState,
    /// Object storage for the image upload pipeline.
    pub storage: StorageState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Allow extractors and handlers to pull individual components out of the
// shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(app_state: &AppState) -> AuthState {
        app_state.auth.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

// --- Route Guards ---

/// session_guard
///
/// The authenticated-only guard. `SessionUser` extraction failing (missing,
/// malformed, or expired token) rejects with a redirect to /login before the
/// handler runs; a resolved session passes through untouched.
async fn session_guard(_user: SessionUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// admin_guard
///
/// The administrator-only guard: everything the session guard does, plus the
/// administrator flag. A resolved session without the flag is redirected to
/// /login exactly like an anonymous visitor.
async fn admin_guard(user: SessionUser, request: Request, next: Next) -> Response {
    if !user.is_admin {
        return Redirect::to("/login").into_response();
    }
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies the guard layers and the
/// observability stack, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no guard.
        .merge(public::public_routes())
        // Authenticated routes: session guard.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), session_guard)),
        )
        // Admin routes: nested under /admin behind the administrator guard.
        .nest(
            "/admin",
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), admin_guard)),
        )
        .with_state(state);

    // 3. Observability and Correlation Layers (outermost)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID generation: a unique UUID per request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request tracing: every request/response wrapped in a span
                // carrying the generated request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS (applied last).
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes TraceLayer's span creation: includes the x-request-id header in
/// the structured logging metadata next to the method and URI, so every log
/// line for a single request shares one correlation id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
