pub mod health;
pub mod profiles;
pub mod provisioning;

use axum::{routing::get, routing::post, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes, relative to the API prefix
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        .route("/admin-signup", post(provisioning::admin_signup))
        // Admin routes
        .route("/create-employee", post(provisioning::create_employee))
        .route("/users", get(profiles::list_users))
        // Authenticated routes
        .route("/profile", get(profiles::get_profile))
        .route("/update-password", post(profiles::update_password))
}
