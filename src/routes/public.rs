use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without any session: everything the portfolio's public
/// pages render, plus the contact form and the sign-in/sign-up gateway.
/// Read handlers here never error — backend failures degrade to empty results
/// at the repository layer and the pages fall back to their sample content.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /auth/signup
        // Account creation, delegated to the hosted auth provider. The
        // matching profile row is provisioned by the backend's own trigger.
        .route("/auth/signup", post(handlers::sign_up))
        // POST /auth/login
        // Session establishment. The hardcoded administrator pair is checked
        // before the hosted backend is consulted.
        .route("/auth/login", post(handlers::sign_in))
        // GET /projects?featured=...&search=...
        // Project grid data, newest first, each record with its technologies.
        .route("/projects", get(handlers::get_projects))
        // GET /projects/featured
        // The landing page's featured slice. Registered before the slug route
        // so "featured" is never interpreted as a slug.
        .route("/projects/featured", get(handlers::get_featured_projects))
        // GET /projects/{slug}
        // Project detail page data, addressed by the URL-safe slug.
        .route("/projects/{slug}", get(handlers::get_project_by_slug))
        // GET /achievements
        .route("/achievements", get(handlers::get_achievements))
        // GET /achievements/{id}
        .route("/achievements/{id}", get(handlers::get_achievement_details))
        // GET /stats
        // Landing-page counters (project total, last update).
        .route("/stats", get(handlers::get_portfolio_stats))
        // POST /contact
        // Contact-form intake. Validated before any backend call; the one
        // write path whose backend failure surfaces a specific message.
        .route("/contact", post(handlers::submit_contact))
}
