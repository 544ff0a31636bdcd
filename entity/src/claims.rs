//! Claim payloads delivered by the insurance provider's webhook.

use crate::vin::Vin;
use crate::Id;
use serde::{Deserialize, Deserializer, Serialize};

/// An insurance provider's record of a damage event.
///
/// Deserialized from the webhook body and never mutated afterwards. Field names on the
/// wire are camelCase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimPayload {
    /// Provider-assigned claim identifier. Must be non-empty. Surrounding whitespace is
    /// stripped on deserialization so the stored and looked-up ids always agree.
    #[serde(deserialize_with = "trimmed")]
    pub claim_id: String,

    /// Marketplace user that filed the claim, when the provider knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Id>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjuster_name: Option<String>,

    pub insured_vehicle: InsuredVehicle,

    /// Provider damage classification code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_code: Option<String>,

    /// Provider claim status, e.g. "approved" or "under_review"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_status: Option<String>,

    /// Body shops the insured would like quotes from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_shops: Option<Vec<Id>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuredVehicle {
    pub make: String,
    pub model: String,
    pub vin: Vin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimValidationError {
    EmptyClaimId,
}

impl std::fmt::Display for ClaimValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimValidationError::EmptyClaimId => write!(f, "claimId must not be empty"),
        }
    }
}

impl std::error::Error for ClaimValidationError {}

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(value.trim().to_string())
}

impl ClaimPayload {
    /// Checks invariants that serde cannot express. The VIN is already validated during
    /// deserialization.
    pub fn validate(&self) -> Result<(), ClaimValidationError> {
        if self.claim_id.trim().is_empty() {
            return Err(ClaimValidationError::EmptyClaimId);
        }
        Ok(())
    }

    /// The claim id when it can be used as a lookup key.
    pub fn lookup_claim_id(&self) -> Option<&str> {
        let claim_id = self.claim_id.trim();
        (!claim_id.is_empty()).then_some(claim_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_camel_case_payload_with_optional_fields() {
        let shop = Id::new_v4();
        let payload: ClaimPayload = serde_json::from_value(json!({
            "claimId": "CLM-1001",
            "adjusterName": "R. Alvarez",
            "insuredVehicle": {
                "make": "Honda",
                "model": "Accord",
                "vin": "1HGCM82633A004352"
            },
            "damageCode": "FRONT-02",
            "claimStatus": "approved",
            "preferredShops": [shop]
        }))
        .unwrap();

        assert_eq!(payload.claim_id, "CLM-1001");
        assert_eq!(payload.user_id, None);
        assert_eq!(payload.insured_vehicle.vin.as_str(), "1HGCM82633A004352");
        assert_eq!(payload.preferred_shops, Some(vec![shop]));
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn deserialization_fails_for_invalid_vin() {
        let result: Result<ClaimPayload, _> = serde_json::from_value(json!({
            "claimId": "CLM-1001",
            "insuredVehicle": { "make": "Honda", "model": "Accord", "vin": "SHORT" }
        }));

        assert!(result.is_err());
    }

    #[test]
    fn claim_id_is_trimmed_on_deserialization() {
        let payload: ClaimPayload = serde_json::from_value(json!({
            "claimId": " CLM-9 ",
            "insuredVehicle": { "make": "Ford", "model": "Focus", "vin": "1FAFP34P63W123456" }
        }))
        .unwrap();

        assert_eq!(payload.claim_id, "CLM-9");
        assert_eq!(payload.lookup_claim_id(), Some("CLM-9"));
    }

    #[test]
    fn blank_claim_id_fails_validation_and_is_not_a_lookup_key() {
        let payload: ClaimPayload = serde_json::from_value(json!({
            "claimId": "   ",
            "insuredVehicle": { "make": "Ford", "model": "Focus", "vin": "1FAFP34P63W123456" }
        }))
        .unwrap();

        assert_eq!(payload.validate(), Err(ClaimValidationError::EmptyClaimId));
        assert_eq!(payload.lookup_claim_id(), None);
    }
}
