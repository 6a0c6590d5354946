//! Operation Dispatcher (spec §4.1): routes a decoded request to the
//! handler for its operation code, threading the HTTP request head through
//! (carrying the transport details `ClientEnvelope` and the URI projector
//! needs to build `printer-uri-supported`).

use crate::error::IppError;
use crate::model::PrinterOperation;
use crate::result::IppResult;
use crate::system::ClientEnvelope;
use http::request::Parts as ReqParts;
use ipp::attribute::IppAttribute;
use ipp::model::{DelimiterTag, IppVersion, StatusCode};
use ipp::request::IppRequestResponse;
use ipp::value::IppValue;
use num_traits::FromPrimitive;

fn operation_not_supported() -> anyhow::Error {
    IppError::operation_not_supported().into()
}

fn client_envelope(head: &ReqParts) -> ClientEnvelope {
    let tls = matches!(head.uri.scheme_str(), Some("ipps") | Some("https"));
    let host = head
        .headers
        .get(http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| head.uri.host())
        .unwrap_or("")
        .to_string();
    ClientEnvelope {
        username: None,
        host,
        port: head.uri.port_u16().unwrap_or(if tls { 443 } else { 631 }),
        tls,
    }
}

/// Every printer-scoped IPP operation the core dispatches (spec §1, §4.6).
/// Default implementations respond `operation-not-supported`, matching the
/// host crate's existing `IppService` defaulting convention.
#[allow(async_fn_in_trait)]
pub trait IppService: Send + Sync + 'static {
    async fn print_job(&self, _head: ReqParts, _client: ClientEnvelope, _req: IppRequestResponse) -> IppResult {
        Err(operation_not_supported())
    }

    async fn validate_job(&self, _head: ReqParts, _client: ClientEnvelope, _req: IppRequestResponse) -> IppResult {
        Err(operation_not_supported())
    }

    async fn create_job(&self, _head: ReqParts, _client: ClientEnvelope, _req: IppRequestResponse) -> IppResult {
        Err(operation_not_supported())
    }

    async fn cancel_job(&self, _head: ReqParts, _client: ClientEnvelope, _req: IppRequestResponse) -> IppResult {
        Err(operation_not_supported())
    }

    async fn cancel_current_job(&self, _head: ReqParts, _client: ClientEnvelope, _req: IppRequestResponse) -> IppResult {
        Err(operation_not_supported())
    }

    async fn cancel_jobs(&self, _head: ReqParts, _client: ClientEnvelope, _req: IppRequestResponse) -> IppResult {
        Err(operation_not_supported())
    }

    async fn cancel_my_jobs(&self, _head: ReqParts, _client: ClientEnvelope, _req: IppRequestResponse) -> IppResult {
        Err(operation_not_supported())
    }

    async fn get_job_attributes(&self, _head: ReqParts, _client: ClientEnvelope, _req: IppRequestResponse) -> IppResult {
        Err(operation_not_supported())
    }

    async fn get_jobs(&self, _head: ReqParts, _client: ClientEnvelope, _req: IppRequestResponse) -> IppResult {
        Err(operation_not_supported())
    }

    async fn get_printer_attributes(&self, _head: ReqParts, _client: ClientEnvelope, _req: IppRequestResponse) -> IppResult {
        Err(operation_not_supported())
    }

    async fn set_printer_attributes(&self, _head: ReqParts, _client: ClientEnvelope, _req: IppRequestResponse) -> IppResult {
        Err(operation_not_supported())
    }

    async fn identify_printer(&self, _head: ReqParts, _client: ClientEnvelope, _req: IppRequestResponse) -> IppResult {
        Err(operation_not_supported())
    }

    async fn pause_printer(&self, _head: ReqParts, _client: ClientEnvelope, _req: IppRequestResponse) -> IppResult {
        Err(operation_not_supported())
    }

    async fn resume_printer(&self, _head: ReqParts, _client: ClientEnvelope, _req: IppRequestResponse) -> IppResult {
        Err(operation_not_supported())
    }

    async fn create_printer(&self, _head: ReqParts, _client: ClientEnvelope, _req: IppRequestResponse) -> IppResult {
        Err(operation_not_supported())
    }

    /// Extension hook for operation codes this core does not name (spec
    /// §4.1: an installer-provided extension callback gets first refusal
    /// on anything outside the named set). `None` means it declined.
    async fn extension(&self, _head: ReqParts, _client: ClientEnvelope, _req: IppRequestResponse) -> Option<IppResult> {
        None
    }

    fn version(&self) -> IppVersion {
        IppVersion::v2_0()
    }

    fn check_version(&self, req: &IppRequestResponse) -> bool {
        req.header().version.0 <= self.version().0
    }

    fn build_error_response(&self, version: IppVersion, req_id: u32, error: anyhow::Error) -> IppRequestResponse {
        let ipp_error = match error.downcast_ref::<IppError>() {
            Some(e) => e.clone(),
            None => {
                log::error!("internal error handling ipp request: {}", error);
                IppError::new(StatusCode::ServerErrorInternalError, error.to_string())
            }
        };
        if ipp_error.code != StatusCode::SuccessfulOk {
            log::warn!("{} {}", ipp_error.code, ipp_error.msg);
        }
        let mut resp = IppRequestResponse::new_response(version, ipp_error.code, req_id);
        resp.attributes_mut().add(
            DelimiterTag::OperationAttributes,
            IppAttribute::new(
                IppAttribute::STATUS_MESSAGE,
                IppValue::TextWithoutLanguage(ipp_error.msg),
            ),
        );
        for name in &ipp_error.unsupported {
            resp.attributes_mut().add(
                DelimiterTag::Unsupported,
                IppAttribute::new(name.clone(), IppValue::NoValue),
            );
        }
        resp
    }

    async fn handle_request(&self, head: ReqParts, req: IppRequestResponse) -> IppRequestResponse {
        let req_id = req.header().request_id;
        let version = req.header().version;
        if !self.check_version(&req) {
            return self.build_error_response(
                self.version(),
                req_id,
                IppError::new(StatusCode::ServerErrorVersionNotSupported, "unsupported IPP version").into(),
            );
        }

        let client = client_envelope(&head);
        let op_code = req.header().operation_or_status;
        let operation = PrinterOperation::from_u16(op_code);
        log::debug!(
            "dispatching ipp request {} op={}",
            req_id,
            operation.map_or("unknown", PrinterOperation::keyword)
        );

        let result = match operation {
            Some(PrinterOperation::PrintJob) => self.print_job(head, client, req).await,
            Some(PrinterOperation::ValidateJob) => self.validate_job(head, client, req).await,
            Some(PrinterOperation::CreateJob) => self.create_job(head, client, req).await,
            Some(PrinterOperation::CancelJob) => self.cancel_job(head, client, req).await,
            Some(PrinterOperation::CancelCurrentJob) => self.cancel_current_job(head, client, req).await,
            Some(PrinterOperation::CancelJobs) => self.cancel_jobs(head, client, req).await,
            Some(PrinterOperation::CancelMyJobs) => self.cancel_my_jobs(head, client, req).await,
            Some(PrinterOperation::GetJobAttributes) => self.get_job_attributes(head, client, req).await,
            Some(PrinterOperation::GetJobs) => self.get_jobs(head, client, req).await,
            Some(PrinterOperation::GetPrinterAttributes) => self.get_printer_attributes(head, client, req).await,
            Some(PrinterOperation::SetPrinterAttributes) => self.set_printer_attributes(head, client, req).await,
            Some(PrinterOperation::IdentifyPrinter) => self.identify_printer(head, client, req).await,
            Some(PrinterOperation::PausePrinter) => self.pause_printer(head, client, req).await,
            Some(PrinterOperation::ResumePrinter) => self.resume_printer(head, client, req).await,
            Some(PrinterOperation::CreatePrinter) => self.create_printer(head, client, req).await,
            None => match self.extension(head, client, req).await {
                Some(result) => result,
                None => Err(operation_not_supported()),
            },
        };

        result.unwrap_or_else(|error| self.build_error_response(version, req_id, error))
    }
}
