//! The estimate store contract the claim webhook core reconciles against.

use super::error::Error;
use async_trait::async_trait;
use entity::claims::ClaimPayload;
use entity::estimates::Model;
use entity::vin::Vin;
use entity::Id;

/// Lookup and update operations on body-shop estimates.
///
/// The store owns and serializes estimate records. Every operation must be idempotent:
/// callers retry any of them on error and may run concurrently with other deliveries
/// of the same claim.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait EstimateStore: Send + Sync {
    /// Finds the estimate already reconciled with `claim_id`.
    async fn find_by_claim_id(&self, claim_id: &str) -> Result<Option<Model>, Error>;

    /// Finds the estimate for a vehicle. When several estimates share a VIN the store
    /// decides which one wins.
    async fn find_by_vin(&self, vin: &Vin) -> Result<Option<Model>, Error>;

    /// Applies the claim's identifiers and status to the estimate. Applying the same claim
    /// twice leaves the estimate unchanged apart from its last-modified marker.
    async fn apply_claim_update(&self, estimate_id: Id, claim: &ClaimPayload)
        -> Result<(), Error>;
}
