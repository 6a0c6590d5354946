use ipp::request::IppRequestResponse;

/// Result type returned by every operation handler: either a fully-formed
/// response, or an error that [`crate::service::common::IppService::build_error_response`]
/// turns into one.
pub type IppResult = anyhow::Result<IppRequestResponse>;
