use crate::controller::{health_check_controller, webhook_controller};
use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(webhook_routes(app_state))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

// Deliveries authenticate by signature rather than session, so these routes carry no
// auth middleware.
fn webhook_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/webhooks/insurance",
            post(webhook_controller::insurance_claim_webhook),
        )
        .with_state(app_state)
}
