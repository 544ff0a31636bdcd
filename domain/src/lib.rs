//! Insurance claim webhook ingestion and estimate reconciliation.
//!
//! [`claim_webhook::WebhookProcessor`] is the only entry point: it authenticates a
//! delivery, then links the claim to at most one estimate under a bounded retry
//! sequence that is itself bounded by an overall deadline.

// Re-exports so that `web` and the binary do not need to depend on `entity_api`
// or `webhook-auth` directly.
pub use entity_api::{
    claims, estimate_status, estimates, vin, EstimateStore, Id, InMemoryEstimateStore,
};
pub use secrecy::SecretString;

pub mod claim_webhook;
pub mod error;
pub mod resilience;
