use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Admin Router Module
///
/// The content-management workflow, nested under /admin. The administrator
/// guard layered above this router is the authorization boundary: a visitor
/// without a session, or with a session whose profile lacks the administrator
/// flag, is redirected to /login before any handler runs.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/stats
        // Dashboard counters (projects, featured, achievements, last update).
        .route("/stats", get(handlers::get_admin_stats))
        // GET/POST /admin/projects
        // The project list view and the create half of the form workflow.
        .route(
            "/projects",
            get(handlers::get_admin_projects).post(handlers::create_project),
        )
        // PUT/DELETE /admin/projects/{id}
        // Edit-form submit and list-view delete. An update carrying a
        // technology set replaces the stored set atomically.
        .route(
            "/projects/{id}",
            put(handlers::update_project).delete(handlers::delete_project),
        )
        // GET/POST /admin/achievements
        .route(
            "/achievements",
            get(handlers::get_admin_achievements).post(handlers::create_achievement),
        )
        // PUT/DELETE /admin/achievements/{id}
        .route(
            "/achievements/{id}",
            put(handlers::update_achievement).delete(handlers::delete_achievement),
        )
}
