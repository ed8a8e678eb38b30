use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum::Json;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

use crate::{config::AppConfig, repository::RepositoryState};

/// Issuer claim stamped on tokens this service signs itself for the hardcoded
/// administrator identity. Backend-issued tokens carry the backend's own
/// issuer, so this one value is the entire override/backend discriminator.
pub const LOCAL_ISSUER: &str = "portfolio-local";

/// Synthetic identity id for the local administrator override. There is no
/// profiles row behind it; the extractor never looks one up for this identity.
pub const LOCAL_ADMIN_ID: Uuid = Uuid::nil();

/// Claims
///
/// Payload structure shared by backend session tokens and locally issued
/// override tokens. Both are HS256-signed with the same shared secret; the
/// `iss` claim tells them apart.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id, matching `public.profiles.id` for backend
    /// sessions.
    pub sub: Uuid,
    /// Expiration time; tokens past this instant are rejected.
    pub exp: usize,
    /// Issued-at timestamp.
    pub iat: usize,
    pub email: Option<String>,
    pub iss: Option<String>,
}

/// SessionUser
///
/// The resolved identity of an authenticated request: who they are and
/// whether they carry the administrator flag. This is what handlers and the
/// route guards consume.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub is_admin: bool,
}

/// AuthRedirect
///
/// Rejection type of the SessionUser extractor. The route guards are
/// redirection logic, not an API error surface: an unresolvable session sends
/// the visitor to the login page.
#[derive(Debug)]
pub struct AuthRedirect;

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        Redirect::to("/login").into_response()
    }
}

/// SessionUser Extractor Implementation
///
/// Resolves the request's bearer token into a SessionUser with a fixed
/// precedence order:
/// 1. Local override: a token this service issued for the hardcoded
///    administrator pair (recognized by its issuer claim) resolves
///    immediately as administrator, with no profile lookup.
/// 2. Backend session: any other valid token is treated as a hosted-backend
///    session; the profiles row supplies the administrator flag. A missing or
///    unreadable profile resolves to "not administrator" rather than
///    rejecting the request (the repository has already logged the failure).
///
/// Rejection: redirects to /login on a missing, malformed, or expired token.
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthRedirect)?;

        let token = auth_header.strip_prefix("Bearer ").ok_or(AuthRedirect)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = match decode::<Claims>(token, &decoding_key, &validation) {
            Ok(data) => data,
            Err(e) => {
                match e.kind() {
                    // The common case for a valid-but-old session.
                    ErrorKind::ExpiredSignature => return Err(AuthRedirect),
                    // Bad signature, malformed token, wrong algorithm, etc.
                    _ => return Err(AuthRedirect),
                }
            }
        };

        let claims = token_data.claims;

        // Override identity first: administrator by construction, no lookup.
        if claims.iss.as_deref() == Some(LOCAL_ISSUER) {
            return Ok(SessionUser {
                id: claims.sub,
                email: claims.email,
                is_admin: true,
            });
        }

        // Backend session: the profiles row is the only authorization signal.
        let is_admin = repo
            .get_profile(claims.sub)
            .await
            .map(|profile| profile.is_admin)
            .unwrap_or(false);

        Ok(SessionUser {
            id: claims.sub,
            email: claims.email,
            is_admin,
        })
    }
}

/// issue_local_admin_token
///
/// Signs a 24-hour session token for the hardcoded administrator identity.
/// This is the server-side replacement for the original's locally persisted
/// override identity: the token itself is the only session state.
pub fn issue_local_admin_token(config: &AppConfig) -> Result<String, AuthError> {
    let now = unix_now();
    let claims = Claims {
        sub: LOCAL_ADMIN_ID,
        exp: now + 24 * 3600,
        iat: now,
        email: Some(config.admin_email.clone()),
        iss: Some(LOCAL_ISSUER.to_string()),
    };
    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|e| {
        tracing::error!("failed to sign local admin token: {:?}", e);
        AuthError::TokenIssue
    })
}

fn unix_now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or(0)
}

// --- Hosted Auth Backend ---

/// AuthError
///
/// Sign-in and sign-up are the one surface where backend failures must reach
/// the caller for display (everything else degrades to conservative values),
/// so they get a real error type instead of a swallowed log line.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The backend rejected the request (bad credentials, duplicate email,
    /// weak password). The message is shown to the user as-is.
    #[error("{0}")]
    Rejected(String),
    /// The backend could not be reached at all.
    #[error("authentication service unreachable: {0}")]
    Unreachable(String),
    /// The backend answered with something we could not interpret.
    #[error("unexpected response from authentication service")]
    InvalidResponse,
    /// Local token signing failed.
    #[error("failed to issue session token")]
    TokenIssue,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::Rejected(_) => StatusCode::UNAUTHORIZED,
            AuthError::Unreachable(_) | AuthError::InvalidResponse => StatusCode::BAD_GATEWAY,
            AuthError::TokenIssue => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// BackendSession
///
/// The slice of the backend's password-grant response this application needs.
#[derive(Debug, Clone)]
pub struct BackendSession {
    pub access_token: String,
    pub user_id: Uuid,
    pub email: Option<String>,
}

/// AuthBackend
///
/// Abstract contract for the hosted identity provider, mirroring the
/// repository/storage seams: handlers depend on the trait, tests swap in the
/// mock, production uses the Supabase REST client.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Creates an account. The matching Profile row is provisioned by the
    /// backend's own trigger; this application never inserts one.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Uuid, AuthError>;

    /// Password sign-in. Failures carry the backend's message for display.
    async fn sign_in(&self, email: &str, password: &str) -> Result<BackendSession, AuthError>;

    /// Revokes the session behind the given access token.
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}

/// AuthState
///
/// The concrete type used to share the auth backend across the application
/// state.
pub type AuthState = Arc<dyn AuthBackend>;

/// SupabaseAuthClient
///
/// Talks to the hosted backend's auth REST endpoints (`/auth/v1/*`) with the
/// anonymous API key. One reqwest client is reused for every call.
#[derive(Clone)]
pub struct SupabaseAuthClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

#[derive(Deserialize)]
struct SupabaseUser {
    id: Uuid,
    email: Option<String>,
}

#[derive(Deserialize)]
struct SupabaseSession {
    access_token: String,
    user: SupabaseUser,
}

impl SupabaseAuthClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    /// Pulls a human-readable message out of a backend error body. The auth
    /// API is not consistent about the field name across endpoints.
    async fn rejection(response: reqwest::Response, fallback: &str) -> AuthError {
        let message = match response.json::<serde_json::Value>().await {
            Ok(body) => body
                .get("error_description")
                .and_then(|v| v.as_str())
                .or_else(|| body.get("msg").and_then(|v| v.as_str()))
                .or_else(|| body.get("error").and_then(|v| v.as_str()))
                .unwrap_or(fallback)
                .to_string(),
            Err(_) => fallback.to_string(),
        };
        AuthError::Rejected(message)
    }
}

#[async_trait]
impl AuthBackend for SupabaseAuthClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Uuid, AuthError> {
        let response = self
            .http
            .post(format!("{}/auth/v1/signup", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": { "full_name": full_name },
            }))
            .send()
            .await
            .map_err(|e| AuthError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response, "Sign up was rejected").await);
        }

        let user = response
            .json::<SupabaseUser>()
            .await
            .map_err(|_| AuthError::InvalidResponse)?;
        Ok(user.id)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<BackendSession, AuthError> {
        let response = self
            .http
            .post(format!(
                "{}/auth/v1/token?grant_type=password",
                self.base_url
            ))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response, "Invalid login credentials").await);
        }

        let session = response
            .json::<SupabaseSession>()
            .await
            .map_err(|_| AuthError::InvalidResponse)?;

        Ok(BackendSession {
            access_token: session.access_token,
            user_id: session.user.id,
            email: session.user.email,
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .http
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response, "Sign out was rejected").await);
        }
        Ok(())
    }
}

/// MockAuthBackend
///
/// Test double for the hosted identity provider, so handler tests never touch
/// the network.
#[derive(Clone)]
pub struct MockAuthBackend {
    /// When true, every operation returns a simulated rejection.
    pub should_fail: bool,
    /// The identity returned by successful sign-up/sign-in calls.
    pub user_id: Uuid,
}

impl MockAuthBackend {
    pub fn new() -> Self {
        Self {
            should_fail: false,
            user_id: Uuid::new_v4(),
        }
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            user_id: Uuid::new_v4(),
        }
    }
}

impl Default for MockAuthBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthBackend for MockAuthBackend {
    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _full_name: &str,
    ) -> Result<Uuid, AuthError> {
        if self.should_fail {
            return Err(AuthError::Rejected(
                "Mock auth error: sign up rejected".to_string(),
            ));
        }
        Ok(self.user_id)
    }

    async fn sign_in(&self, email: &str, _password: &str) -> Result<BackendSession, AuthError> {
        if self.should_fail {
            return Err(AuthError::Rejected(
                "Invalid login credentials".to_string(),
            ));
        }
        Ok(BackendSession {
            access_token: "mock-backend-token".to_string(),
            user_id: self.user_id,
            email: Some(email.to_string()),
        })
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), AuthError> {
        if self.should_fail {
            return Err(AuthError::Rejected(
                "Mock auth error: sign out rejected".to_string(),
            ));
        }
        Ok(())
    }
}
