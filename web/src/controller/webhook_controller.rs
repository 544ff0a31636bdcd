//! Controller for webhooks from external services.
//!
//! Handles insurance provider claim deliveries.

use crate::{AppState, Error};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use domain::claim_webhook::RawDeliveryContext;
use log::*;

/// Header carrying the `sha256=<hex>` signature of the raw request body.
pub const SIGNATURE_HEADER: &str = "x-signature";

/// POST /webhooks/insurance
///
/// The body is taken as raw bytes so that the signature is checked against exactly what
/// the provider sent, before the body is parsed. A missing signature header is treated as
/// an invalid signature.
pub async fn insurance_claim_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, Error> {
    debug!("Received insurance claim webhook ({} bytes)", body.len());

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let outcome = app_state
        .processor
        .process_delivery(RawDeliveryContext::new(&body, signature))
        .await?;

    Ok((StatusCode::OK, Json(outcome)))
}
