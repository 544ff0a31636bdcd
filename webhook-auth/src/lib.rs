//! # webhook-auth
//!
//! Authentication of inbound webhook deliveries from third-party providers.
//!
//! Providers sign the raw request body with a shared secret. Verification must run
//! against the exact bytes received, before any JSON parsing, because re-serializing a
//! payload can change its byte content and invalidate the signature.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use webhook_auth::webhook::{HmacSignatureVerifier, SignatureVerifier};
//!
//! let verifier = HmacSignatureVerifier::new("insurance", secret)?;
//! if !verifier.verify(raw_body, signature_header) {
//!     // reject the delivery
//! }
//! ```

pub mod error;
pub mod webhook;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
