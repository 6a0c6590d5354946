use ipp::model::StatusCode;
use thiserror::Error;

/// An IPP-level failure carrying the status code and human-readable message
/// that a handler wants reflected straight into the response.
#[derive(Error, Debug, Clone)]
#[error("{code} {msg:?}")]
pub struct IppError {
    pub code: StatusCode,
    pub msg: String,
    /// Names of request attributes that should be echoed back in the
    /// `unsupported-attributes` group, if any.
    pub unsupported: Vec<String>,
}

impl IppError {
    pub fn new(code: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            unsupported: Vec::new(),
        }
    }

    pub fn with_unsupported(code: StatusCode, msg: impl Into<String>, unsupported: Vec<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            unsupported,
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::ClientErrorNotFound, msg)
    }

    pub fn not_possible(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::ClientErrorNotPossible, msg)
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::ClientErrorBadRequest, msg)
    }

    pub fn not_accepting_jobs(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::ClientErrorNotAcceptingJobs, msg)
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::ClientErrorForbidden, msg)
    }

    pub fn document_format_not_supported(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::ClientErrorDocumentFormatNotSupported, msg)
    }

    pub fn busy(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::ServerErrorBusy, msg)
    }

    pub fn operation_not_supported() -> Self {
        Self::new(
            StatusCode::ServerErrorOperationNotSupported,
            StatusCode::ServerErrorOperationNotSupported.to_string(),
        )
    }

    pub fn attributes_not_supported(msg: impl Into<String>, unsupported: Vec<String>) -> Self {
        Self::with_unsupported(
            StatusCode::ClientErrorAttributesOrValuesNotSupported,
            msg,
            unsupported,
        )
    }
}
