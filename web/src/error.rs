use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{
    DomainErrorKind, Error as DomainError, InternalErrorKind, ProcessingErrorKind,
    ProcessingFailureKind,
};

use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{}", self.0)
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match &self.0.error_kind {
            DomainErrorKind::Processing(processing_error_kind) => match processing_error_kind {
                ProcessingErrorKind::AuthenticationFailure => StatusCode::UNAUTHORIZED,
                ProcessingErrorKind::ProcessingFailure(ProcessingFailureKind::RetriesExhausted) => {
                    StatusCode::BAD_GATEWAY
                }
                ProcessingErrorKind::ProcessingFailure(ProcessingFailureKind::DeadlineExceeded) => {
                    StatusCode::GATEWAY_TIMEOUT
                }
            },
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::InvalidPayload => StatusCode::UNPROCESSABLE_ENTITY,
                InternalErrorKind::Config => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Responding {status}: {self}");
        } else {
            debug!("Responding {status}: {self}");
        }

        let reason = status
            .canonical_reason()
            .unwrap_or("ERROR")
            .to_uppercase();
        (status, reason).into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
