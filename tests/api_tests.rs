use async_trait::async_trait;
use jsonwebtoken::{EncodingKey, Header, encode};
use portfolio_api::{
    AppConfig, AppState, MockAuthBackend, MockStorageService, create_router,
    auth::{Claims, LOCAL_ISSUER},
    models::{
        Achievement, AdminDashboardStats, ContactRequest, CreateAchievementRequest,
        CreateProjectRequest, PortfolioStats, Profile, Project, Reach, UpdateAchievementRequest,
        UpdateProfileRequest, UpdateProjectRequest,
    },
    repository::Repository,
};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::net::TcpListener;
use uuid::Uuid;

// --- Mock Repository for Router-Level Tests ---

// The guard behavior is what these tests exercise, so only get_profile and
// the list reads carry real data.
#[derive(Default)]
struct MockRouterRepo {
    profile_to_return: Option<Profile>,
    projects_to_return: Vec<Project>,
}

#[async_trait]
impl Repository for MockRouterRepo {
    async fn get_profile(&self, _id: Uuid) -> Option<Profile> {
        self.profile_to_return.clone()
    }
    async fn list_projects(&self, _featured: Option<bool>, _search: Option<String>) -> Vec<Project> {
        self.projects_to_return.clone()
    }
    async fn list_featured_projects(&self, _limit: i64) -> Vec<Project> {
        self.projects_to_return.clone()
    }
    async fn get_project_by_slug(&self, _slug: &str) -> Option<Project> {
        None
    }
    async fn get_project(&self, _id: Uuid) -> Option<Project> {
        None
    }
    async fn create_project(&self, _req: CreateProjectRequest) -> Option<Project> {
        Some(Project::default())
    }
    async fn update_project(&self, _id: Uuid, _req: UpdateProjectRequest) -> bool {
        true
    }
    async fn delete_project(&self, _id: Uuid) -> bool {
        true
    }
    async fn list_achievements(&self) -> Vec<Achievement> {
        vec![]
    }
    async fn get_achievement(&self, _id: Uuid) -> Option<Achievement> {
        None
    }
    async fn create_achievement(&self, _req: CreateAchievementRequest) -> Option<Achievement> {
        Some(Achievement::default())
    }
    async fn update_achievement(&self, _id: Uuid, _req: UpdateAchievementRequest) -> bool {
        true
    }
    async fn delete_achievement(&self, _id: Uuid) -> bool {
        true
    }
    async fn update_profile(&self, _id: Uuid, _req: UpdateProfileRequest) -> bool {
        true
    }
    async fn insert_reach(&self, req: ContactRequest) -> Result<Reach, sqlx::Error> {
        Ok(Reach {
            id: Uuid::new_v4(),
            name: req.name,
            email: req.email,
            message: req.message,
            created_at: chrono::Utc::now(),
        })
    }
    async fn portfolio_stats(&self) -> PortfolioStats {
        PortfolioStats::default()
    }
    async fn admin_stats(&self) -> AdminDashboardStats {
        AdminDashboardStats::default()
    }
}

// --- Test App Harness ---

struct TestApp {
    address: String,
}

async fn spawn_app(repo: MockRouterRepo) -> TestApp {
    let state = AppState {
        repo: Arc::new(repo),
        auth: Arc::new(MockAuthBackend::new()),
        storage: Arc::new(MockStorageService::new()),
        config: AppConfig::default(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address }
}

/// Redirects are the assertion target here, so the client must not follow them.
fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

fn mint_token(user_id: Uuid, issuer: Option<&str>) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;
    let claims = Claims {
        sub: user_id,
        iat: now,
        exp: now + 3600,
        email: Some("owner@example.com".to_string()),
        iss: issuer.map(|s| s.to_string()),
    };
    // AppConfig::default's jwt secret, shared with the spawned app.
    let key = EncodingKey::from_secret(b"super-secure-test-secret-value-local");
    encode(&Header::default(), &claims, &key).unwrap()
}

fn admin_profile(id: Uuid) -> Profile {
    Profile {
        id,
        is_admin: true,
        ..Profile::default()
    }
}

// --- Tests ---

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app(MockRouterRepo::default()).await;
    let response = client()
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_public_projects_list_is_open() {
    let app = spawn_app(MockRouterRepo {
        projects_to_return: vec![Project::default()],
        ..MockRouterRepo::default()
    })
    .await;

    let response = client()
        .get(format!("{}/projects", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let projects: Vec<Project> = response.json().await.unwrap();
    assert_eq!(projects.len(), 1);
}

#[tokio::test]
async fn test_admin_routes_redirect_anonymous_visitor_to_login() {
    let app = spawn_app(MockRouterRepo::default()).await;

    let response = client()
        .get(format!("{}/admin/projects", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 303);
    assert_eq!(
        response.headers().get("location").unwrap().to_str().unwrap(),
        "/login"
    );
}

#[tokio::test]
async fn test_admin_routes_redirect_non_admin_session_to_login() {
    let user_id = Uuid::new_v4();
    let app = spawn_app(MockRouterRepo {
        profile_to_return: Some(Profile {
            id: user_id,
            is_admin: false,
            ..Profile::default()
        }),
        ..MockRouterRepo::default()
    })
    .await;

    let response = client()
        .get(format!("{}/admin/projects", app.address))
        .bearer_auth(mint_token(user_id, None))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 303);
    assert_eq!(
        response.headers().get("location").unwrap().to_str().unwrap(),
        "/login"
    );
}

#[tokio::test]
async fn test_admin_routes_render_for_admin_profile() {
    let user_id = Uuid::new_v4();
    let app = spawn_app(MockRouterRepo {
        profile_to_return: Some(admin_profile(user_id)),
        projects_to_return: vec![Project::default()],
    })
    .await;

    let response = client()
        .get(format!("{}/admin/projects", app.address))
        .bearer_auth(mint_token(user_id, None))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let projects: Vec<Project> = response.json().await.unwrap();
    assert_eq!(projects.len(), 1);
}

#[tokio::test]
async fn test_admin_routes_accept_local_override_token() {
    // The override identity has no profiles row at all; the guard must still
    // let it through as administrator.
    let app = spawn_app(MockRouterRepo::default()).await;

    let response = client()
        .get(format!("{}/admin/projects", app.address))
        .bearer_auth(mint_token(Uuid::nil(), Some(LOCAL_ISSUER)))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_authenticated_routes_redirect_anonymous_visitor() {
    let app = spawn_app(MockRouterRepo::default()).await;

    let response = client()
        .get(format!("{}/me", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 303);
    assert_eq!(
        response.headers().get("location").unwrap().to_str().unwrap(),
        "/login"
    );
}

#[tokio::test]
async fn test_authenticated_routes_allow_any_session() {
    let user_id = Uuid::new_v4();
    let app = spawn_app(MockRouterRepo {
        profile_to_return: Some(Profile {
            id: user_id,
            is_admin: false,
            ..Profile::default()
        }),
        ..MockRouterRepo::default()
    })
    .await;

    let response = client()
        .get(format!("{}/me", app.address))
        .bearer_auth(mint_token(user_id, None))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let profile: Profile = response.json().await.unwrap();
    assert_eq!(profile.id, user_id);
}

#[tokio::test]
async fn test_contact_round_trip_through_router() {
    let app = spawn_app(MockRouterRepo::default()).await;

    let response = client()
        .post(format!("{}/contact", app.address))
        .json(&serde_json::json!({
            "name": "Jane", "email": "jane@x.com", "message": "Hello"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 201);
    let reach: Reach = response.json().await.unwrap();
    assert_eq!(reach.name, "Jane");
}

#[tokio::test]
async fn test_login_round_trip_issues_admin_session() {
    let app = spawn_app(MockRouterRepo::default()).await;

    let response = client()
        .post(format!("{}/auth/login", app.address))
        .json(&serde_json::json!({
            "email": "admin@example.com", "password": "admin1234"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let session: portfolio_api::models::SessionResponse = response.json().await.unwrap();
    assert!(session.is_admin);

    // The issued token must satisfy the admin guard end-to-end.
    let admin_response = client()
        .get(format!("{}/admin/stats", app.address))
        .bearer_auth(session.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(admin_response.status(), 200);
}
