use domain::claim_webhook::{ProcessorSettings, WebhookProcessor};
use domain::{EstimateStore, InMemoryEstimateStore, SecretString};
use log::*;
use service::{config::Config, logging::Logger};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::new();

    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
        return ExitCode::FAILURE;
    }

    info!("Starting up claim intake service...");

    let Some(secret) = config.insurance_webhook_secret() else {
        error!("INSURANCE_WEBHOOK_SECRET must be set to a non-empty value; refusing to start");
        return ExitCode::FAILURE;
    };

    let store: Arc<dyn EstimateStore> = match config.estimates_seed_file() {
        Some(path) => match InMemoryEstimateStore::load_from_file(path) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                error!("Failed to load estimates from {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => {
            warn!("No estimates seed file configured, starting with an empty estimate store");
            Arc::new(InMemoryEstimateStore::new())
        }
    };

    let settings = ProcessorSettings {
        max_attempts: config.webhook_max_attempts,
        retry_delays: config.webhook_retry_delays(),
        deadline: config.webhook_deadline(),
    };
    info!(
        "Webhook linking: {} attempt(s), backoff {:?}, deadline {:?}",
        settings.max_attempts, settings.retry_delays, settings.deadline
    );

    let processor = match WebhookProcessor::new(SecretString::new(secret), store, settings) {
        Ok(processor) => processor,
        Err(e) => {
            error!("Failed to build webhook processor: {e}");
            return ExitCode::FAILURE;
        }
    };

    let app_state = web::AppState::new(config, processor);

    match web::init_server(app_state).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server exited with error: {e}");
            ExitCode::FAILURE
        }
    }
}
