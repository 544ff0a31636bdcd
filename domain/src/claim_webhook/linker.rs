//! Reconciles an inbound claim with the body-shop estimate it belongs to.

use super::outcome::{LinkResult, MatchedBy};
use crate::claims::ClaimPayload;
use crate::EstimateStore;
use entity_api::error::Error as EntityApiError;
use std::sync::Arc;

/// Links a claim to at most one estimate.
///
/// A claim id match always wins over a VIN match. Every store call is idempotent, so a
/// whole `link` may be repeated after a failure at any step.
#[derive(Clone)]
pub struct EstimateLinker {
    store: Arc<dyn EstimateStore>,
}

impl EstimateLinker {
    pub fn new(store: Arc<dyn EstimateStore>) -> Self {
        Self { store }
    }

    /// Store errors are returned unchanged so that the caller can retry them.
    pub async fn link(&self, claim: &ClaimPayload) -> Result<LinkResult, EntityApiError> {
        let found = match claim.lookup_claim_id() {
            Some(claim_id) => self
                .store
                .find_by_claim_id(claim_id)
                .await?
                .map(|estimate| (estimate.id, MatchedBy::ClaimId)),
            None => None,
        };

        let found = match found {
            Some(found) => Some(found),
            None => self
                .store
                .find_by_vin(&claim.insured_vehicle.vin)
                .await?
                .map(|estimate| (estimate.id, MatchedBy::Vin)),
        };

        match found {
            Some((estimate_id, matched_by)) => {
                self.store.apply_claim_update(estimate_id, claim).await?;
                Ok(LinkResult::Linked {
                    estimate_id,
                    matched_by,
                })
            }
            None => Ok(LinkResult::Unlinked),
        }
    }
}
