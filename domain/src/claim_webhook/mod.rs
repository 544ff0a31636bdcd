//! Insurance claim webhook handling.
//!
//! A delivery is parsed by [`parse_claim`] and then handed to [`WebhookProcessor::process`]
//! together with the raw bytes it was parsed from, since the signature covers those
//! exact bytes.

pub mod linker;
pub mod outcome;
pub mod processor;

pub use linker::EstimateLinker;
pub use outcome::{LinkResult, MatchedBy, ProcessingOutcome, ProcessingStatus};
pub use processor::{ProcessorSettings, WebhookProcessor, INSURANCE_PROVIDER_ID};

use crate::claims::ClaimPayload;
use crate::error::Error;

/// The request body and signature header exactly as received.
#[derive(Debug, Clone, Copy)]
pub struct RawDeliveryContext<'a> {
    raw_body: &'a [u8],
    signature_header: &'a str,
}

impl<'a> RawDeliveryContext<'a> {
    pub fn new(raw_body: &'a [u8], signature_header: &'a str) -> Self {
        Self {
            raw_body,
            signature_header,
        }
    }

    pub fn raw_body(&self) -> &'a [u8] {
        self.raw_body
    }

    pub fn signature_header(&self) -> &'a str {
        self.signature_header
    }
}

/// Deserializes and validates a claim from the raw webhook body.
pub fn parse_claim(raw_body: &[u8]) -> Result<ClaimPayload, Error> {
    let claim: ClaimPayload = serde_json::from_slice(raw_body)?;
    claim.validate().map_err(Error::invalid_payload)?;
    Ok(claim)
}
