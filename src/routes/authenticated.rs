use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Routes for any resolved identity, administrator or not. The session guard
/// layered above this router redirects visitors without a resolvable session
/// to /login, so every handler here can rely on a present `SessionUser`.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET/PUT /me
        // The caller's own Profile: read (fabricated for the local override
        // identity, which has no backing row) and partial update.
        .route("/me", get(handlers::get_me).put(handlers::update_me))
        // POST /auth/logout
        // Ends the session. Always invokes the hosted backend's sign-out with
        // the presented token so stale backend sessions cannot linger.
        .route("/auth/logout", post(handlers::sign_out))
        // POST /uploads/presigned
        // Short-lived direct-to-storage upload URL for portfolio images,
        // restricted to image content types.
        .route("/uploads/presigned", post(handlers::get_image_upload_url))
}
