//! HMAC-SHA256 webhook signature verification.

use hmac::{Hmac, Mac};
use log::*;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use super::SignatureVerifier;
use crate::error::{webhook_error, Error, WebhookErrorKind};

type HmacSha256 = Hmac<Sha256>;

/// Prefix of every signature header value, followed by the lowercase hex digest.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// HMAC-SHA256 signature verifier.
///
/// The secret is injected at construction time and never logged.
pub struct HmacSignatureVerifier {
    provider_id: String,
    secret: SecretString,
}

impl HmacSignatureVerifier {
    /// Create a new HMAC signature verifier.
    ///
    /// # Arguments
    ///
    /// * `provider_id` - Provider identifier used in log lines
    /// * `secret` - Shared webhook signing secret
    ///
    /// # Errors
    ///
    /// `MissingSecret` if the secret is empty, since an empty key would let anyone
    /// produce a valid signature.
    pub fn new(provider_id: &str, secret: SecretString) -> Result<Self, Error> {
        if secret.expose_secret().is_empty() {
            return Err(webhook_error(
                WebhookErrorKind::MissingSecret,
                &format!("Empty webhook secret for provider {provider_id}"),
            ));
        }

        Ok(Self {
            provider_id: provider_id.to_string(),
            secret,
        })
    }
}

impl SignatureVerifier for HmacSignatureVerifier {
    fn verify(&self, raw_body: &[u8], signature_header: &str) -> bool {
        let valid = verify_signature(
            self.secret.expose_secret().as_bytes(),
            raw_body,
            signature_header,
        );
        if !valid {
            warn!(
                "Webhook signature mismatch for provider {} ({} byte body)",
                self.provider_id,
                raw_body.len()
            );
        }
        valid
    }

    fn provider_id(&self) -> &str {
        &self.provider_id
    }
}

/// Parses a `sha256=<hex>` header value into the raw digest bytes.
pub fn parse_signature_header(signature_header: &str) -> Result<Vec<u8>, Error> {
    let hex_digest = signature_header
        .trim()
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or_else(|| {
            webhook_error(
                WebhookErrorKind::InvalidSignatureFormat,
                "Signature header is missing the sha256= prefix",
            )
        })?;

    hex::decode(hex_digest).map_err(|_| {
        webhook_error(
            WebhookErrorKind::InvalidSignatureFormat,
            "Signature digest is not valid hex",
        )
    })
}

/// Computes the `sha256=<hex>` header value for `raw_body`.
pub fn sign_payload(secret: &[u8], raw_body: &[u8]) -> Result<String, Error> {
    let mut mac = keyed_mac(secret)?;
    mac.update(raw_body);
    Ok(format!(
        "{SIGNATURE_PREFIX}{}",
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Verifies `signature_header` against the HMAC-SHA256 of `raw_body` keyed by `secret`.
///
/// The digest comparison is constant time. A malformed header is not an error, just an
/// invalid signature.
pub fn verify_signature(secret: &[u8], raw_body: &[u8], signature_header: &str) -> bool {
    let expected = match parse_signature_header(signature_header) {
        Ok(digest) => digest,
        Err(e) => {
            debug!("Rejecting webhook signature: {e:?}");
            return false;
        }
    };

    let mut mac = match keyed_mac(secret) {
        Ok(mac) => mac,
        Err(e) => {
            warn!("Rejecting webhook signature: {e}");
            return false;
        }
    };
    mac.update(raw_body);
    mac.verify_slice(&expected).is_ok()
}

fn keyed_mac(secret: &[u8]) -> Result<HmacSha256, Error> {
    HmacSha256::new_from_slice(secret)
        .map_err(|_| webhook_error(WebhookErrorKind::InvalidKey, "Invalid HMAC key"))
}
