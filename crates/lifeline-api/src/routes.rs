use axum::{
    Router, middleware,
    routing::{get, patch, post, put},
};

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{auth, blogs, contact, funds, requests, stats, users};

/// Every HTTP route of the service. Cross-cutting layers (CORS, tracing) are
/// added by the binary.
///
/// Request creation (`/create-donation-request`), funding (`/create-fund`,
/// `/funds`) and `/dashboard-stats` sit behind the session check: requests
/// are owned by the caller, and the rest expose money or staff figures.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(root))
        .route("/jwt", post(auth::issue))
        .route("/logout", get(auth::logout))
        .route("/user", post(users::save_user))
        .route("/users/role/{email}", get(users::get_role))
        .route("/search-donors", get(users::search_donors))
        .route("/districts", get(users::list_districts))
        .route("/pending-donation-requests", get(requests::pending_requests))
        .route("/contact", post(contact::submit_contact))
        .route("/blogs", get(blogs::list_blogs))
        .route("/blogs/{id}", get(blogs::get_blog))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/profile", get(users::get_profile).patch(users::update_profile))
        .route("/users", get(users::list_users))
        .route("/users/{id}/status", patch(users::set_user_status))
        .route("/users/{id}/role", patch(users::set_user_role))
        .route("/requests/recent", get(requests::recent_requests))
        .route("/requests/{id}/status", put(requests::close_request))
        .route("/create-donation-request", post(requests::create_request))
        .route("/donation-requests", get(requests::my_requests))
        .route(
            "/donation-requests/{id}",
            get(requests::get_request)
                .put(requests::update_request)
                .delete(requests::delete_request),
        )
        .route("/donation-requests/{id}/status", put(requests::set_request_status))
        .route("/donation-requests/{id}/donate", put(requests::donate))
        .route("/all-donation-requests", get(requests::all_requests))
        .route("/dashboard-stats", get(stats::dashboard_stats))
        .route("/contact", get(contact::list_contacts))
        .route("/blogs", post(blogs::create_blog))
        .route("/blogs/{id}", axum::routing::delete(blogs::delete_blog))
        .route("/blogs/{id}/status", patch(blogs::set_blog_status))
        .route("/create-fund", post(funds::create_fund))
        .route("/funds", get(funds::list_funds))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

async fn root() -> &'static str {
    "Hello from Lifeline server.."
}
