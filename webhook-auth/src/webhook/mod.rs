//! Webhook signature verification.

mod hmac_sha256;

pub use hmac_sha256::{
    parse_signature_header, sign_payload, verify_signature, HmacSignatureVerifier,
    SIGNATURE_PREFIX,
};

/// Trait for verifying that a webhook delivery was signed by its provider.
pub trait SignatureVerifier: Send + Sync {
    /// Verify a delivery against its signature header.
    ///
    /// # Arguments
    ///
    /// * `raw_body` - Request body bytes exactly as received
    /// * `signature_header` - Value of the provider's signature header
    ///
    /// # Returns
    ///
    /// `true` if the signature is valid. Malformed or missing signatures are simply
    /// invalid and yield `false`.
    fn verify(&self, raw_body: &[u8], signature_header: &str) -> bool;

    /// Get the provider identifier for this verifier.
    fn provider_id(&self) -> &str;
}
