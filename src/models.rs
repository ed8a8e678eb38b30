use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// Project
///
/// A portfolio project record from the `public.projects` table. The
/// `technologies` list lives in the `project_technologies` child table and is
/// attached by the repository after the row itself is fetched, so it is not
/// part of the SQL row mapping.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    // URL-safe unique identifier used in public routes (/projects/{slug}).
    pub slug: String,
    // Short card/tagline text.
    pub description: String,
    // Optional long-form body shown on the detail page.
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub secondary_image_url: Option<String>,
    pub demo_url: Option<String>,
    pub github_url: Option<String>,
    pub duration: Option<String>,
    pub completion_date: Option<String>,
    pub role: Option<String>,
    pub client: Option<String>,
    pub featured: bool,

    // Populated from the child table; absent from project SELECTs.
    #[sqlx(default)]
    pub technologies: Vec<String>,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Achievement
///
/// An achievement record from the `public.achievements` table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Achievement {
    pub id: Uuid,
    // Where it happened (event, venue, publication).
    pub place: String,
    // What it was for.
    pub product: String,
    pub description: String,
    pub image_url: Option<String>,
    pub secondary_image_url: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Profile
///
/// The identity-linked record in `public.profiles`, keyed by the hosted
/// backend's auth user id. `is_admin` is the sole authorization signal for
/// the admin area.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub website: Option<String>,
    pub bio: Option<String>,
    pub is_admin: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Reach
///
/// A contact-form submission persisted to `public.reach`. Write-only from
/// this application's perspective: rows are inserted and never read back.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Reach {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// CreateProjectRequest
///
/// Input payload for POST /admin/projects. Validated in full before any
/// backend call; the technology list is inserted into the child table in the
/// same repository operation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateProjectRequest {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub content: Option<String>,
    pub image_url: String,
    pub secondary_image_url: Option<String>,
    pub demo_url: Option<String>,
    pub github_url: Option<String>,
    pub duration: String,
    pub completion_date: String,
    pub role: String,
    pub client: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub technologies: Vec<String>,
}

/// UpdateProjectRequest
///
/// Partial update payload for PUT /admin/projects/{id}. All fields are
/// optional; only provided fields are written. A provided `technologies` set
/// fully replaces the stored set.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateProjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technologies: Option<Vec<String>>,
}

/// CreateAchievementRequest
///
/// Input payload for POST /admin/achievements.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateAchievementRequest {
    pub place: String,
    pub product: String,
    pub description: String,
    pub image_url: String,
    pub secondary_image_url: Option<String>,
}

/// UpdateAchievementRequest
///
/// Partial update payload for PUT /admin/achievements/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateAchievementRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_image_url: Option<String>,
}

/// UpdateProfileRequest
///
/// Partial update payload for PUT /me.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// ContactRequest
///
/// Input payload for POST /contact. The email shape is checked before any
/// backend call so malformed submissions never reach the network.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// SignUpRequest
///
/// Input payload for POST /auth/signup. The password passes through to the
/// hosted auth provider and is never persisted or logged here.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// LoginRequest
///
/// Input payload for POST /auth/login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// ImageUploadRequest
///
/// Input payload for requesting a short-lived direct-to-storage upload URL
/// for a portfolio image.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ImageUploadRequest {
    /// Original filename, used to derive the object extension.
    #[schema(example = "cover.webp")]
    pub filename: String,
    /// MIME type; must be an image type, enforced before a URL is issued.
    #[schema(example = "image/webp")]
    pub content_type: String,
}

/// ImageUploadResponse
///
/// The temporary signed URL plus the object key to store on the record.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ImageUploadResponse {
    pub upload_url: String,
    pub object_key: String,
}

// --- Session & Dashboard Schemas (Output) ---

/// SessionAccount
///
/// The identity slice of a sign-in response.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SessionAccount {
    pub id: Uuid,
    pub email: String,
}

/// SessionResponse
///
/// Output of POST /auth/login: the bearer token the client presents on
/// subsequent requests, plus the resolved identity and administrator flag.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SessionResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: SessionAccount,
    pub is_admin: bool,
}

/// SignUpResponse
///
/// Output of POST /auth/signup. The matching Profile row is provisioned by
/// the hosted backend's own trigger, not by this application.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SignUpResponse {
    pub id: Uuid,
    pub email: String,
}

/// PortfolioStats
///
/// Public counters for the landing page (GET /stats).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PortfolioStats {
    pub total_projects: i64,
    pub last_updated: Option<DateTime<Utc>>,
}

/// AdminDashboardStats
///
/// Counters for the admin dashboard (GET /admin/stats). Contact messages are
/// deliberately not counted: the reach table is write-only for this service.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminDashboardStats {
    pub total_projects: i64,
    pub featured_projects: i64,
    pub total_achievements: i64,
    pub last_updated: Option<DateTime<Utc>>,
}

// --- Validation ---

/// FieldError
///
/// One failed validation rule, addressed to a specific form field so the
/// client can render it inline.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// ValidationErrorBody
///
/// The 422 response body: every rule that failed, not just the first.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ValidationErrorBody {
    pub errors: Vec<FieldError>,
}

fn check_min(errors: &mut Vec<FieldError>, field: &str, value: &str, min: usize) {
    if value.trim().chars().count() < min {
        errors.push(FieldError::new(
            field,
            &format!("{} must be at least {} characters", field_label(field), min),
        ));
    }
}

fn check_required(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(
            field,
            &format!("{} is required", field_label(field)),
        ));
    }
}

/// Accepts only http(s) URLs; everything a browser would refuse to load as an
/// image or link target is rejected here.
fn check_url(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    let valid = url::Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !valid {
        errors.push(FieldError::new(field, "Please enter a valid URL"));
    }
}

fn check_optional_url(errors: &mut Vec<FieldError>, field: &str, value: &Option<String>) {
    if let Some(v) = value {
        if !v.trim().is_empty() {
            check_url(errors, field, v);
        }
    }
}

fn check_slug(errors: &mut Vec<FieldError>, value: &str) {
    check_min(errors, "slug", value, 3);
    if !value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        errors.push(FieldError::new(
            "slug",
            "Slug can only contain lowercase letters, numbers, and hyphens",
        ));
    }
}

fn field_label(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

impl CreateProjectRequest {
    /// Mirrors the admin form's submit-time rules; nothing reaches the
    /// repository unless this passes.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        check_min(&mut errors, "title", &self.title, 3);
        check_slug(&mut errors, &self.slug);
        check_min(&mut errors, "description", &self.description, 10);
        if let Some(content) = &self.content {
            if !content.trim().is_empty() {
                check_min(&mut errors, "content", content, 50);
            }
        }
        check_required(&mut errors, "image_url", &self.image_url);
        if !self.image_url.trim().is_empty() {
            check_url(&mut errors, "image_url", &self.image_url);
        }
        check_optional_url(&mut errors, "secondary_image_url", &self.secondary_image_url);
        check_optional_url(&mut errors, "demo_url", &self.demo_url);
        check_optional_url(&mut errors, "github_url", &self.github_url);
        check_required(&mut errors, "duration", &self.duration);
        check_required(&mut errors, "completion_date", &self.completion_date);
        check_required(&mut errors, "role", &self.role);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Technology tags as persisted: trimmed, empties dropped.
    pub fn clean_technologies(&self) -> Vec<String> {
        clean_technologies(&self.technologies)
    }
}

impl UpdateProjectRequest {
    /// Applies the creation rules to whichever fields are present.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if let Some(title) = &self.title {
            check_min(&mut errors, "title", title, 3);
        }
        if let Some(slug) = &self.slug {
            check_slug(&mut errors, slug);
        }
        if let Some(description) = &self.description {
            check_min(&mut errors, "description", description, 10);
        }
        if let Some(content) = &self.content {
            if !content.trim().is_empty() {
                check_min(&mut errors, "content", content, 50);
            }
        }
        check_optional_url(&mut errors, "image_url", &self.image_url);
        check_optional_url(&mut errors, "secondary_image_url", &self.secondary_image_url);
        check_optional_url(&mut errors, "demo_url", &self.demo_url);
        check_optional_url(&mut errors, "github_url", &self.github_url);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    pub fn clean_technologies(&self) -> Option<Vec<String>> {
        self.technologies.as_ref().map(|t| clean_technologies(t))
    }
}

impl CreateAchievementRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        check_min(&mut errors, "place", &self.place, 3);
        check_min(&mut errors, "product", &self.product, 3);
        check_min(&mut errors, "description", &self.description, 10);
        check_required(&mut errors, "image_url", &self.image_url);
        if !self.image_url.trim().is_empty() {
            check_url(&mut errors, "image_url", &self.image_url);
        }
        check_optional_url(&mut errors, "secondary_image_url", &self.secondary_image_url);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl UpdateAchievementRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if let Some(place) = &self.place {
            check_min(&mut errors, "place", place, 3);
        }
        if let Some(product) = &self.product {
            check_min(&mut errors, "product", product, 3);
        }
        if let Some(description) = &self.description {
            check_min(&mut errors, "description", description, 10);
        }
        check_optional_url(&mut errors, "image_url", &self.image_url);
        check_optional_url(&mut errors, "secondary_image_url", &self.secondary_image_url);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        check_optional_url(&mut errors, "avatar_url", &self.avatar_url);
        check_optional_url(&mut errors, "website", &self.website);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl ContactRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        check_required(&mut errors, "name", &self.name);
        if self.email.parse::<email_address::EmailAddress>().is_err() {
            errors.push(FieldError::new("email", "Please enter a valid email address"));
        }
        check_required(&mut errors, "message", &self.message);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn clean_technologies(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
