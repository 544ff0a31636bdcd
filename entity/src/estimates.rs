//! Body-shop estimates: a shop's repair quote for a single vehicle.

use crate::estimate_status::EstimateStatus;
use crate::vin::Vin;
use crate::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: Id,

    /// Shop that wrote the estimate
    pub shop_id: Id,

    /// Insurance claim this estimate has been reconciled with, if any
    #[serde(default)]
    pub claim_id: Option<String>,

    pub vin: Vin,

    #[serde(default)]
    pub status: EstimateStatus,

    /// Raw status most recently reported by the insurer
    #[serde(default)]
    pub insurer_claim_status: Option<String>,

    #[serde(default)]
    pub adjuster_name: Option<String>,

    #[serde(default)]
    pub damage_code: Option<String>,

    pub created_at: DateTime<Utc>,

    /// Last-modified marker, bumped on every claim update
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// A fresh draft estimate for `vin`, not yet linked to any claim.
    pub fn new_draft(shop_id: Id, vin: Vin) -> Self {
        let now = Utc::now();
        Model {
            id: Id::new_v4(),
            shop_id,
            claim_id: None,
            vin,
            status: EstimateStatus::Draft,
            insurer_claim_status: None,
            adjuster_name: None,
            damage_code: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_claim_id(mut self, claim_id: impl Into<String>) -> Self {
        self.claim_id = Some(claim_id.into());
        self
    }

    pub fn with_status(mut self, status: EstimateStatus) -> Self {
        self.status = status;
        self
    }
}
