use crate::Id;
use serde::Serialize;

/// Which lookup resolved the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedBy {
    ClaimId,
    Vin,
}

/// Result of reconciling one claim against the estimate store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkResult {
    Linked { estimate_id: Id, matched_by: MatchedBy },
    /// No estimate matched. A normal outcome, not a failure.
    Unlinked,
}

impl LinkResult {
    pub fn is_linked(&self) -> bool {
        matches!(self, LinkResult::Linked { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Processed,
    ProcessedUnlinked,
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStatus::Processed => write!(f, "processed"),
            ProcessingStatus::ProcessedUnlinked => write!(f, "processed_unlinked"),
        }
    }
}

/// What the caller gets back for a successfully handled delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOutcome {
    claim_id: String,
    estimate_linked: bool,
    status: ProcessingStatus,
    message: String,
    correlation_id: Id,
}

impl ProcessingOutcome {
    pub fn new(claim_id: &str, link: LinkResult, correlation_id: Id) -> Self {
        let (status, message) = match link {
            LinkResult::Linked {
                estimate_id,
                matched_by: MatchedBy::ClaimId,
            } => (
                ProcessingStatus::Processed,
                format!("Claim linked to estimate {estimate_id} by claim id"),
            ),
            LinkResult::Linked {
                estimate_id,
                matched_by: MatchedBy::Vin,
            } => (
                ProcessingStatus::Processed,
                format!("Claim linked to estimate {estimate_id} by VIN"),
            ),
            LinkResult::Unlinked => (
                ProcessingStatus::ProcessedUnlinked,
                "No matching estimate found".to_string(),
            ),
        };

        Self {
            claim_id: claim_id.to_string(),
            estimate_linked: link.is_linked(),
            status,
            message,
            correlation_id,
        }
    }

    pub fn claim_id(&self) -> &str {
        &self.claim_id
    }

    pub fn estimate_linked(&self) -> bool {
        self.estimate_linked
    }

    pub fn status(&self) -> ProcessingStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn correlation_id(&self) -> Id {
        self.correlation_id
    }
}
