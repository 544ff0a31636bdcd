use domain::claim_webhook::WebhookProcessor;
use log::*;
use service::config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;

mod controller;
mod error;
pub(crate) mod router;

pub use error::{Error, Result};

// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub processor: Arc<WebhookProcessor>,
}

impl AppState {
    pub fn new(config: Config, processor: WebhookProcessor) -> Self {
        Self {
            config,
            processor: Arc::new(processor),
        }
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let host = app_state.config.interface().to_string();
    let port = app_state.config.port;
    let server_url = format!("{host}:{port}");

    info!(
        "Server starting... listening for connections on http://{server_url} ({})",
        app_state.config.runtime_env
    );

    let listener = TcpListener::bind(&server_url).await?;
    axum::serve(listener, router::define_routes(app_state)).await
}
