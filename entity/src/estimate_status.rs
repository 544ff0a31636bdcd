use serde::{Deserialize, Serialize};

/// Status of a body-shop estimate through its lifecycle.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateStatus {
    /// Shop is still writing up the quote
    #[default]
    Draft,
    /// Quote submitted, waiting on the insurer
    Pending,
    /// Insurer approved the repair
    Approved,
    /// Insurer denied the claim
    Rejected,
    /// Repair finished or quote withdrawn
    Closed,
}

impl EstimateStatus {
    /// Maps an insurer claim status onto the estimate lifecycle. Unrecognized insurer
    /// statuses leave the estimate status untouched.
    pub fn from_claim_status(claim_status: &str) -> Option<Self> {
        match claim_status.to_ascii_lowercase().as_str() {
            "open" | "submitted" | "under_review" | "in_review" => Some(EstimateStatus::Pending),
            "approved" | "authorized" => Some(EstimateStatus::Approved),
            "denied" | "rejected" => Some(EstimateStatus::Rejected),
            "closed" | "settled" | "paid" => Some(EstimateStatus::Closed),
            _ => None,
        }
    }

    /// Open estimates can still be matched to an incoming claim by VIN.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            EstimateStatus::Draft | EstimateStatus::Pending | EstimateStatus::Approved
        )
    }
}

impl std::fmt::Display for EstimateStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimateStatus::Draft => write!(fmt, "draft"),
            EstimateStatus::Pending => write!(fmt, "pending"),
            EstimateStatus::Approved => write!(fmt, "approved"),
            EstimateStatus::Rejected => write!(fmt, "rejected"),
            EstimateStatus::Closed => write!(fmt, "closed"),
        }
    }
}
