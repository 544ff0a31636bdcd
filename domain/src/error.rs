//! Error types for the `domain` layer.
use std::error::Error as StdError;
use std::fmt;
use webhook_auth::error::Error as WebhookAuthError;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure with
/// `domain::error::Error` as the root type holding a tree of `error_kind` enums that
/// represent the kinds of errors that can occur in the domain layer or in lower layers.
/// The `source` field holds the original error that caused the domain error, so
/// diagnostics keep the root cause while `web` only inspects `error_kind` to pick an
/// HTTP status code.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    /// Terminal failures of a webhook processing invocation
    Processing(ProcessingErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    /// The processor could not be built from the supplied settings
    Config,
    /// Webhook body was not a valid claim payload
    InvalidPayload,
}

/// The two externally visible outcomes of a failed webhook invocation.
#[derive(Debug, PartialEq)]
pub enum ProcessingErrorKind {
    /// Signature did not verify. Never retried.
    AuthenticationFailure,
    ProcessingFailure(ProcessingFailureKind),
}

#[derive(Debug, PartialEq)]
pub enum ProcessingFailureKind {
    /// The overall deadline fired before linking finished
    DeadlineExceeded,
    /// Every linking attempt failed
    RetriesExhausted,
}

impl Error {
    pub fn authentication_failure(message: &str) -> Self {
        Error {
            source: Some(message.to_string().into()),
            error_kind: DomainErrorKind::Processing(ProcessingErrorKind::AuthenticationFailure),
        }
    }

    pub fn processing_failure<E>(kind: ProcessingFailureKind, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Error {
            source: Some(Box::new(cause)),
            error_kind: DomainErrorKind::Processing(ProcessingErrorKind::ProcessingFailure(kind)),
        }
    }

    pub fn invalid_payload<E>(cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Error {
            source: Some(Box::new(cause)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::InvalidPayload),
        }
    }

    pub fn is_authentication_failure(&self) -> bool {
        self.error_kind == DomainErrorKind::Processing(ProcessingErrorKind::AuthenticationFailure)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match &self.error_kind {
            DomainErrorKind::Processing(ProcessingErrorKind::AuthenticationFailure) => {
                "authentication failure".to_string()
            }
            DomainErrorKind::Processing(ProcessingErrorKind::ProcessingFailure(kind)) => {
                format!("processing failure ({kind:?})")
            }
            other => format!("{other:?}"),
        };
        match &self.source {
            Some(source) => write!(f, "Domain Error: {kind}: {source}"),
            None => write!(f, "Domain Error: {kind}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<WebhookAuthError> for Error {
    fn from(err: WebhookAuthError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::invalid_payload(err)
    }
}
