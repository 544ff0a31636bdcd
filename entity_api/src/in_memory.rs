//! Process-local estimate store backed by a concurrent map.

use super::error::Error;
use super::estimate::EstimateStore;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use entity::claims::ClaimPayload;
use entity::estimate_status::EstimateStatus;
use entity::estimates::Model;
use entity::vin::Vin;
use entity::Id;
use log::*;
use std::path::Path;

#[derive(Debug, Default)]
pub struct InMemoryEstimateStore {
    estimates: DashMap<Id, Model>,
}

impl InMemoryEstimateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store preloaded with the JSON array of estimates in `path`.
    pub fn load_from_file(path: &Path) -> Result<Self, Error> {
        let bytes = std::fs::read(path)?;
        let estimates: Vec<Model> = serde_json::from_slice(&bytes)?;
        info!(
            "Loaded {} estimates from {}",
            estimates.len(),
            path.display()
        );

        let store = Self::new();
        for estimate in estimates {
            store.insert(estimate);
        }
        Ok(store)
    }

    pub fn insert(&self, estimate: Model) {
        self.estimates.insert(estimate.id, estimate);
    }

    pub fn get(&self, id: Id) -> Option<Model> {
        self.estimates.get(&id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }
}

#[async_trait]
impl EstimateStore for InMemoryEstimateStore {
    async fn find_by_claim_id(&self, claim_id: &str) -> Result<Option<Model>, Error> {
        Ok(self
            .estimates
            .iter()
            .find(|entry| entry.claim_id.as_deref() == Some(claim_id))
            .map(|entry| entry.value().clone()))
    }

    /// Estimates not yet linked to any claim win over ones linked to another claim, then
    /// open estimates win over rejected or closed ones, then the most recently created
    /// estimate wins.
    async fn find_by_vin(&self, vin: &Vin) -> Result<Option<Model>, Error> {
        Ok(self
            .estimates
            .iter()
            .filter(|entry| &entry.vin == vin)
            .max_by_key(|entry| {
                (
                    entry.claim_id.is_none(),
                    entry.status.is_open(),
                    entry.created_at,
                )
            })
            .map(|entry| entry.value().clone()))
    }

    async fn apply_claim_update(
        &self,
        estimate_id: Id,
        claim: &ClaimPayload,
    ) -> Result<(), Error> {
        let mut estimate = self.estimates.get_mut(&estimate_id).ok_or_else(|| {
            Error::record_not_found(&format!("estimate {estimate_id} does not exist"))
        })?;

        debug!(
            "Applying claim {} to estimate {estimate_id}",
            claim.claim_id
        );

        estimate.claim_id = Some(claim.claim_id.trim().to_string());
        if let Some(claim_status) = &claim.claim_status {
            if let Some(status) = EstimateStatus::from_claim_status(claim_status) {
                estimate.status = status;
            }
            estimate.insurer_claim_status = Some(claim_status.clone());
        }
        if claim.adjuster_name.is_some() {
            estimate.adjuster_name = claim.adjuster_name.clone();
        }
        if claim.damage_code.is_some() {
            estimate.damage_code = claim.damage_code.clone();
        }
        estimate.updated_at = Utc::now();

        Ok(())
    }
}
