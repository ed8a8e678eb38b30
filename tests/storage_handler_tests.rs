use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use portfolio_api::{
    AppConfig, AppState, MockAuthBackend, create_router,
    auth::{Claims, LOCAL_ADMIN_ID, LOCAL_ISSUER},
    models::{
        Achievement, AdminDashboardStats, ContactRequest, CreateAchievementRequest,
        CreateProjectRequest, ImageUploadResponse, PortfolioStats, Profile, Project, Reach,
        UpdateAchievementRequest, UpdateProfileRequest, UpdateProjectRequest,
    },
    repository::Repository,
    storage::MockStorageService,
};
use std::sync::Arc;
use std::time::SystemTime;
use tower::util::ServiceExt;
use uuid::Uuid;

// Upload requests never touch persistence; every write here would be a bug.
struct StubRepository;

#[async_trait]
impl Repository for StubRepository {
    async fn list_projects(&self, _f: Option<bool>, _s: Option<String>) -> Vec<Project> {
        vec![]
    }
    async fn list_featured_projects(&self, _l: i64) -> Vec<Project> {
        vec![]
    }
    async fn get_project_by_slug(&self, _slug: &str) -> Option<Project> {
        None
    }
    async fn get_project(&self, _id: Uuid) -> Option<Project> {
        None
    }
    async fn create_project(&self, _r: CreateProjectRequest) -> Option<Project> {
        panic!("Stub called")
    }
    async fn update_project(&self, _id: Uuid, _r: UpdateProjectRequest) -> bool {
        panic!("Stub called")
    }
    async fn delete_project(&self, _id: Uuid) -> bool {
        panic!("Stub called")
    }
    async fn list_achievements(&self) -> Vec<Achievement> {
        vec![]
    }
    async fn get_achievement(&self, _id: Uuid) -> Option<Achievement> {
        None
    }
    async fn create_achievement(&self, _r: CreateAchievementRequest) -> Option<Achievement> {
        panic!("Stub called")
    }
    async fn update_achievement(&self, _id: Uuid, _r: UpdateAchievementRequest) -> bool {
        panic!("Stub called")
    }
    async fn delete_achievement(&self, _id: Uuid) -> bool {
        panic!("Stub called")
    }
    async fn get_profile(&self, _id: Uuid) -> Option<Profile> {
        None
    }
    async fn update_profile(&self, _id: Uuid, _r: UpdateProfileRequest) -> bool {
        panic!("Stub called")
    }
    async fn insert_reach(&self, _r: ContactRequest) -> Result<Reach, sqlx::Error> {
        panic!("Stub called")
    }
    async fn portfolio_stats(&self) -> PortfolioStats {
        PortfolioStats::default()
    }
    async fn admin_stats(&self) -> AdminDashboardStats {
        AdminDashboardStats::default()
    }
}

fn test_router(storage: MockStorageService) -> axum::Router {
    let state = AppState {
        repo: Arc::new(StubRepository),
        auth: Arc::new(MockAuthBackend::new()),
        storage: Arc::new(storage),
        config: AppConfig::default(),
    };
    create_router(state)
}

/// A local-override token satisfies the session guard without any profile row.
fn override_token() -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;
    let claims = Claims {
        sub: LOCAL_ADMIN_ID,
        iat: now,
        exp: now + 3600,
        email: Some("admin@example.com".to_string()),
        iss: Some(LOCAL_ISSUER.to_string()),
    };
    let key = EncodingKey::from_secret(b"super-secure-test-secret-value-local");
    encode(&Header::default(), &claims, &key).unwrap()
}

fn upload_request(filename: &str, content_type: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/uploads/presigned")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", override_token()))
        .body(Body::from(
            serde_json::json!({ "filename": filename, "content_type": content_type }).to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn test_upload_url_issued_for_image() {
    let router = test_router(MockStorageService::new());

    let response = router
        .oneshot(upload_request("cover.webp", "image/webp"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: ImageUploadResponse = serde_json::from_slice(&bytes).unwrap();

    assert!(body.object_key.starts_with("portfolio/"));
    assert!(body.object_key.ends_with(".webp"));
    assert!(body.upload_url.starts_with("http://localhost:9000/mock-bucket/"));
    assert!(body.upload_url.contains(&body.object_key));
}

#[tokio::test]
async fn test_upload_url_rejects_non_image_type() {
    let router = test_router(MockStorageService::new());

    let response = router
        .oneshot(upload_request("report.pdf", "application/pdf"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_upload_url_requires_session() {
    let router = test_router(MockStorageService::new());

    let request = Request::builder()
        .method("POST")
        .uri("/uploads/presigned")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({ "filename": "cover.webp", "content_type": "image/webp" })
                .to_string(),
        ))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();

    // The session guard redirects rather than erroring.
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get("location").unwrap(), "/login");
}

#[tokio::test]
async fn test_upload_url_storage_failure_maps_to_500() {
    let router = test_router(MockStorageService::new_failing());

    let response = router
        .oneshot(upload_request("cover.webp", "image/webp"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
