//! The concrete `IppService` implementation: wires the Operation Dispatcher
//! trait (`service::common::IppService`) to the Printer State Store, Job
//! Manager, Attribute Projector, and Attribute Validator/Applier.
//!
//! Grounded on `service/simple.rs`'s handler bodies (attribute extraction,
//! response assembly), generalized from its flat `PrinterInfo`/`JobInfo`
//! pair to the `Printer`/`Job` aggregates the rest of this core now uses.

use crate::error::IppError;
use crate::job::{Job, JobManager};
use crate::model::{IdentifyActions, WhichJob};
use crate::printer::{DriverData, Printer, PrinterHandle, PrinterManager};
use crate::projector::{project_job_attributes, project_printer_attributes, ProjectionContext};
use crate::result::IppResult;
use crate::service::common::IppService;
use crate::system::{AuthDecision, Authorize, ClientEnvelope, System};
use crate::utils::{
    decommpress_payload, get_ipp_attribute, get_requested_attributes, take_ipp_attribute, take_requesting_user_name,
};
use crate::validator::{apply_printer_attributes, job_template::validate_job_attributes};
use http::request::Parts as ReqParts;
use ipp::attribute::{IppAttribute, IppAttributeGroup, IppAttributes};
use ipp::model::{DelimiterTag, IppVersion, StatusCode};
use ipp::payload::IppPayload;
use ipp::request::IppRequestResponse;
use ipp::value::IppValue;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

fn now_secs() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64
}

/// Where a job's document bytes go once accepted (spec §1: the job
/// execution pipeline is an external collaborator; the core only streams
/// into it). The default drops the bytes, which is enough to exercise
/// every other part of the dispatcher.
pub trait DocumentSink: Send + Sync + 'static {
    fn accept(
        &self,
        _job_id: i32,
        _format: Option<String>,
        _payload: IppPayload,
    ) -> impl std::future::Future<Output = anyhow::Result<()>> + Send {
        async move { Ok(()) }
    }
}

pub struct DiscardDocuments;
impl DocumentSink for DiscardDocuments {}

/// Optional driver callbacks (spec §6 "Driver hooks"), invoked without any
/// printer lock held.
pub trait DriverHooks: Send + Sync + 'static {
    fn status(&self, _printer_id: i32) {}
    fn identify(&self, _printer_id: i32, _actions: IdentifyActions, _message: Option<&str>) {}
}

pub struct NoDriverHooks;
impl DriverHooks for NoDriverHooks {}

fn basic_attributes(resp: &mut IppRequestResponse) {
    resp.attributes_mut().add(
        DelimiterTag::OperationAttributes,
        IppAttribute::new(IppAttribute::ATTRIBUTES_CHARSET, IppValue::Charset("utf-8".to_string())),
    );
    resp.attributes_mut().add(
        DelimiterTag::OperationAttributes,
        IppAttribute::new(IppAttribute::ATTRIBUTES_NATURAL_LANGUAGE, IppValue::NaturalLanguage("en".to_string())),
    );
}

fn push_group(resp: &mut IppRequestResponse, tag: DelimiterTag, attrs: Vec<IppAttribute>) {
    let mut group = IppAttributeGroup::new(tag);
    group.attributes_mut().extend(attrs.into_iter().map(|a| (a.name().to_owned(), a)));
    resp.attributes_mut().groups_mut().push(group);
}

fn ok_response_for(version: IppVersion, req_id: u32) -> IppRequestResponse {
    let mut resp = IppRequestResponse::new_response(version, StatusCode::SuccessfulOk, req_id);
    basic_attributes(&mut resp);
    resp
}

fn ok_response(req: &IppRequestResponse) -> IppRequestResponse {
    ok_response_for(req.header().version, req.header().request_id)
}

/// Reads one byte to decide whether document data follows the attributes
/// (spec.md: Print-Job requires it present, Create-Job requires it absent),
/// then hands back an equivalent payload with that byte restored so the
/// caller can still stream the rest.
async fn peek_payload(payload: IppPayload) -> anyhow::Result<(bool, IppPayload)> {
    use futures::io::{AsyncReadExt, Cursor};
    let mut payload = payload;
    let mut probe = [0u8; 1];
    let n = payload.read(&mut probe).await?;
    if n == 0 {
        Ok((false, payload))
    } else {
        let prefix = Cursor::new(probe[..n].to_vec());
        Ok((true, IppPayload::new_async(prefix.chain(payload))))
    }
}

/// Ties the five components together behind the `IppService` dispatch
/// surface. Type parameters let a binary swap in real Job Manager/System/
/// Authorize/DocumentSink/DriverHooks implementations without this module
/// changing; the defaults are enough to run standalone.
pub struct PrinterApp<J = crate::job::InMemoryJobManager, Sy = crate::system::StandaloneSystem, Au = crate::system::AllowAll, D = DiscardDocuments, H = NoDriverHooks> {
    printers: PrinterManager,
    jobs: J,
    system: Sy,
    authorizer: Au,
    documents: D,
    driver_hooks: H,
}

impl<J, Sy, Au, D, H> PrinterApp<J, Sy, Au, D, H>
where
    J: JobManager,
    Sy: System,
    Au: Authorize,
    D: DocumentSink,
    H: DriverHooks,
{
    pub fn new(jobs: J, system: Sy, authorizer: Au, documents: D, driver_hooks: H) -> Self {
        Self {
            printers: PrinterManager::new(),
            jobs,
            system,
            authorizer,
            documents,
            driver_hooks,
        }
    }

    pub fn printers(&self) -> &PrinterManager {
        &self.printers
    }

    fn resolve_printer(&self) -> anyhow::Result<Arc<PrinterHandle>> {
        self.printers.primary().ok_or_else(|| IppError::not_found("no printer configured").into())
    }

    fn authorize(&self, client: &ClientEnvelope) -> anyhow::Result<()> {
        match self.authorizer.authorize(client) {
            AuthDecision::Continue => Ok(()),
            AuthDecision::Reject(_status) => Err(IppError::forbidden("not authorized").into()),
        }
    }

    fn base_urls(&self, head: &ReqParts, printer: &Printer) -> (String, Option<String>) {
        let host = head
            .headers
            .get(http::header::HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| head.uri.host())
            .unwrap_or("localhost");
        let ipp = format!("ipp://{}/{}", host, printer.resource_path);
        let ipps = if self.system.tls_disabled() {
            None
        } else {
            Some(format!("ipps://{}/{}", host, printer.resource_path))
        };
        (ipp, ipps)
    }

    fn job_uri(&self, base_ipp: &str, job_id: i32) -> String {
        format!("{}/job/{}", base_ipp.trim_end_matches('/'), job_id)
    }

    async fn maybe_refresh_status(&self, printer: &PrinterHandle, id: i32) {
        let should = {
            let snap = printer.read().await;
            !snap.device_in_use && snap.processing_job.is_none() && now_secs() - snap.status_time >= 1
        };
        if should {
            self.driver_hooks.status(id);
            printer.write().await.status_time = now_secs();
        }
    }

    async fn project(&self, head: &ReqParts, printer: &Printer, requested: &HashSet<&str>, document_format: Option<&str>) -> Vec<IppAttribute> {
        let (base_ipp, base_ipps) = self.base_urls(head, printer);
        let ctx = ProjectionContext {
            requested,
            document_format,
            base_url_ipp: base_ipp,
            base_url_ipps: base_ipps,
            natural_language: "en",
            auth_service_configured: self.system.auth_service_configured(),
            tls_only: self.system.tls_only(),
            tls_disabled: self.system.tls_disabled(),
            resources: self.system.resources(),
            shutdown_pending: self.system.is_shutdown_pending(),
        };
        project_printer_attributes(printer, &ctx)
    }

    async fn find_job(&self, req: &IppRequestResponse) -> anyhow::Result<Job> {
        let id = get_ipp_attribute(req.attributes(), DelimiterTag::OperationAttributes, IppAttribute::JOB_ID)
            .and_then(|v| v.as_integer())
            .copied();
        match id {
            Some(id) => self.jobs.job(id).await.ok_or_else(|| IppError::not_found("job not found").into()),
            None => Err(IppError::bad_request("missing job-id").into()),
        }
    }

    async fn run_job_template_validation(&self, printer: &PrinterHandle, attributes: &mut IppAttributes) -> anyhow::Result<Option<String>> {
        let shutdown_pending = self.system.is_shutdown_pending();
        let outcome = {
            let snap = printer.read().await;
            validate_job_attributes(&snap, shutdown_pending, attributes)
        };
        if shutdown_pending {
            return Err(IppError::not_accepting_jobs("printer is shutting down").into());
        }
        if !outcome.ok() {
            return Err(IppError::attributes_not_supported("job attributes not supported", outcome.unsupported).into());
        }
        if let Some(name) = &outcome.injected_job_name {
            attributes.add(
                DelimiterTag::JobAttributes,
                IppAttribute::new("job-name", IppValue::NameWithoutLanguage(name.clone())),
            );
        }
        Ok(outcome.injected_job_name)
    }

    fn job_name_of(attributes: &IppAttributes, injected: &Option<String>) -> String {
        get_ipp_attribute(attributes, DelimiterTag::JobAttributes, "job-name")
            .and_then(|v| match v {
                IppValue::NameWithoutLanguage(n) => Some(n.clone()),
                IppValue::Keyword(n) => Some(n.clone()),
                _ => None,
            })
            .or_else(|| injected.clone())
            .unwrap_or_else(|| "Untitled".to_string())
    }

    fn document_format_of(&self, printer: &Printer, attributes: &mut IppAttributes) -> anyhow::Result<Option<String>> {
        let format = take_ipp_attribute(attributes, DelimiterTag::OperationAttributes, "document-format")
            .and_then(|v| match v {
                IppValue::MimeMediaType(m) => Some(m),
                _ => None,
            });
        if let Some(ref f) = format {
            if f != "application/octet-stream" && !printer.driver.document_formats_supported.contains(f) {
                return Err(IppError::document_format_not_supported(format!("{} not supported", f)).into());
            }
        }
        Ok(format)
    }

    async fn lite_job_attrs(&self, head: &ReqParts, printer: &Printer, job: &Job) -> Vec<IppAttribute> {
        let (base_ipp, _) = self.base_urls(head, printer);
        let requested: HashSet<&str> = HashSet::from(["job-id", "job-uri", "job-state", "job-state-reasons", "job-state-message"]);
        project_job_attributes(job, self.job_uri(&base_ipp, job.id), &requested)
    }
}

impl<J, Sy, Au, D, H> IppService for PrinterApp<J, Sy, Au, D, H>
where
    J: JobManager,
    Sy: System,
    Au: Authorize,
    D: DocumentSink,
    H: DriverHooks,
{
    async fn print_job(&self, head: ReqParts, _client: ClientEnvelope, mut req: IppRequestResponse) -> IppResult {
        let printer = self.resolve_printer()?;
        let mut attributes = std::mem::take(req.attributes_mut());

        let injected = self.run_job_template_validation(&printer, &mut attributes).await?;
        let username = take_requesting_user_name(&mut attributes);
        let name = Self::job_name_of(&attributes, &injected);

        let format = {
            let snap = printer.read().await;
            self.document_format_of(&snap, &mut attributes)?
        };
        let compression = take_ipp_attribute(&mut attributes, DelimiterTag::OperationAttributes, "compression")
            .and_then(|v| match v {
                IppValue::Keyword(k) => Some(k),
                _ => None,
            });

        let version = req.header().version;
        let req_id = req.header().request_id;

        let (has_data, payload) = peek_payload(req.into_payload()).await?;
        if !has_data {
            return Err(IppError::bad_request("Print-Job requires document data").into());
        }
        let payload = decommpress_payload(payload, compression.as_deref())?;

        let printer_id = printer.read().await.id;
        let job = self
            .jobs
            .create_job(printer_id, username, name, format.clone(), attributes, false)
            .await
            .ok_or_else(|| anyhow::Error::from(IppError::busy("Currently printing another job")))?;
        printer.write().await.index_new_job(job.id);

        let outcome = self.documents.accept(job.id, format, payload).await;
        match &outcome {
            Ok(()) => self.jobs.complete_job(job.id, true, "Completed".to_string()).await,
            Err(e) => self.jobs.complete_job(job.id, false, format!("Aborted: {}", e)).await,
        }
        printer.write().await.index_job_completed(job.id);

        let job = self.jobs.job(job.id).await.unwrap_or(job);
        let mut resp = if let Err(e) = outcome {
            self.build_error_response(version, req_id, e)
        } else {
            ok_response_for(version, req_id)
        };
        let attrs = self.lite_job_attrs(&head, &*printer.read().await, &job).await;
        push_group(&mut resp, DelimiterTag::JobAttributes, attrs);
        Ok(resp)
    }

    async fn validate_job(&self, _head: ReqParts, _client: ClientEnvelope, mut req: IppRequestResponse) -> IppResult {
        let printer = self.resolve_printer()?;
        let mut attributes = std::mem::take(req.attributes_mut());
        self.run_job_template_validation(&printer, &mut attributes).await?;
        Ok(ok_response(&req))
    }

    async fn create_job(&self, head: ReqParts, _client: ClientEnvelope, mut req: IppRequestResponse) -> IppResult {
        let printer = self.resolve_printer()?;
        let mut attributes = std::mem::take(req.attributes_mut());

        let injected = self.run_job_template_validation(&printer, &mut attributes).await?;
        let username = take_requesting_user_name(&mut attributes);
        let name = Self::job_name_of(&attributes, &injected);
        let format = {
            let snap = printer.read().await;
            self.document_format_of(&snap, &mut attributes)?
        };

        let version = req.header().version;
        let req_id = req.header().request_id;
        let (has_data, _payload) = peek_payload(req.into_payload()).await?;
        if has_data {
            return Err(IppError::bad_request("Create-Job requires no document data").into());
        }

        let printer_id = printer.read().await.id;
        let job = self
            .jobs
            .create_job(printer_id, username, name, format, attributes, false)
            .await
            .ok_or_else(|| anyhow::Error::from(IppError::busy("Currently printing another job")))?;
        printer.write().await.index_new_job(job.id);

        let mut resp = ok_response_for(version, req_id);
        let attrs = self.lite_job_attrs(&head, &*printer.read().await, &job).await;
        push_group(&mut resp, DelimiterTag::JobAttributes, attrs);
        Ok(resp)
    }

    async fn cancel_job(&self, _head: ReqParts, _client: ClientEnvelope, req: IppRequestResponse) -> IppResult {
        let job = self.find_job(&req).await?;
        self.jobs.cancel_job(job.id).await;
        if let Some(printer) = self.printers.get(job.printer_id) {
            if let Some(updated) = self.jobs.job(job.id).await {
                if updated.state.is_terminal() {
                    printer.write().await.index_job_completed(job.id);
                }
            }
        }
        Ok(ok_response(&req))
    }

    async fn cancel_current_job(&self, _head: ReqParts, _client: ClientEnvelope, req: IppRequestResponse) -> IppResult {
        let printer = self.resolve_printer()?;
        let processing_job = printer.read().await.processing_job;
        let job_id = processing_job.ok_or_else(|| anyhow::Error::from(IppError::not_found("No currently printing job.")))?;
        let job = self
            .jobs
            .job(job_id)
            .await
            .ok_or_else(|| anyhow::Error::from(IppError::not_found("No currently printing job.")))?;
        if job.state.is_terminal() {
            return Err(IppError::not_possible(format!("Job {} is already {}.", job.id, job.state.keyword())).into());
        }
        self.jobs.cancel_job(job.id).await;
        printer.write().await.index_job_completed(job.id);
        Ok(ok_response(&req))
    }

    async fn cancel_jobs(&self, _head: ReqParts, client: ClientEnvelope, req: IppRequestResponse) -> IppResult {
        self.authorize(&client)?;
        let printer = self.resolve_printer()?;
        let id = printer.read().await.id;
        self.jobs.cancel_all(id, None).await;
        Ok(ok_response(&req))
    }

    async fn cancel_my_jobs(&self, _head: ReqParts, client: ClientEnvelope, mut req: IppRequestResponse) -> IppResult {
        self.authorize(&client)?;
        let printer = self.resolve_printer()?;
        let id = printer.read().await.id;
        let username = take_requesting_user_name(req.attributes_mut());
        self.jobs.cancel_all(id, Some(&username)).await;
        Ok(ok_response(&req))
    }

    async fn get_job_attributes(&self, head: ReqParts, _client: ClientEnvelope, req: IppRequestResponse) -> IppResult {
        let printer = self.resolve_printer()?;
        let job = self.find_job(&req).await?;
        let requested = get_requested_attributes(req.attributes());
        let mut resp = ok_response(&req);
        let (base_ipp, _) = self.base_urls(&head, &*printer.read().await);
        let attrs = project_job_attributes(&job, self.job_uri(&base_ipp, job.id), &requested);
        push_group(&mut resp, DelimiterTag::JobAttributes, attrs);
        Ok(resp)
    }

    async fn get_jobs(&self, head: ReqParts, client: ClientEnvelope, mut req: IppRequestResponse) -> IppResult {
        let printer = self.resolve_printer()?;

        let limit = take_ipp_attribute(req.attributes_mut(), DelimiterTag::OperationAttributes, "limit").and_then(|v| match v {
            IppValue::Integer(n) => Some(n),
            _ => None,
        });
        let which_keyword = take_ipp_attribute(req.attributes_mut(), DelimiterTag::OperationAttributes, "which-jobs").and_then(|v| match v {
            IppValue::Keyword(k) => Some(k),
            _ => None,
        });
        let which = WhichJob::parse(which_keyword.as_deref())
            .map_err(|other| IppError::attributes_not_supported(format!("unsupported which-jobs value: {}", other), vec!["which-jobs".to_string()]))?;

        let my_jobs = take_ipp_attribute(req.attributes_mut(), DelimiterTag::OperationAttributes, "my-jobs").and_then(|v| match v {
            IppValue::Boolean(b) => Some(b),
            _ => None,
        });
        let username = if my_jobs == Some(true) {
            let name = client.username.clone().unwrap_or_else(|| take_requesting_user_name(req.attributes_mut()));
            if name.is_empty() {
                return Err(IppError::bad_request("my-jobs=true requires requesting-user-name").into());
            }
            Some(name)
        } else {
            None
        };

        let requested = get_requested_attributes(req.attributes());
        let mut resp = ok_response(&req);
        let (base_ipp, _) = self.base_urls(&head, &*printer.read().await);

        let index: Vec<i32> = {
            let snap = printer.read().await;
            match which {
                WhichJob::NotCompleted => snap.active_jobs.clone(),
                WhichJob::Completed => snap.completed_jobs.clone(),
                WhichJob::All => snap.all_jobs.clone(),
            }
        };

        let mut count = 0;
        for job_id in index {
            let Some(job) = self.jobs.job(job_id).await else { continue };
            if !which.matches(job.state) {
                continue;
            }
            if let Some(ref u) = username {
                if !job.is_mine(u) {
                    continue;
                }
            }
            let attrs = project_job_attributes(&job, self.job_uri(&base_ipp, job.id), &requested);
            push_group(&mut resp, DelimiterTag::JobAttributes, attrs);
            count += 1;
            if limit.is_some_and(|l| count >= l) {
                break;
            }
        }
        Ok(resp)
    }

    async fn get_printer_attributes(&self, head: ReqParts, _client: ClientEnvelope, req: IppRequestResponse) -> IppResult {
        let printer = self.resolve_printer()?;
        let id = printer.read().await.id;
        self.maybe_refresh_status(&printer, id).await;

        let requested = get_requested_attributes(req.attributes());
        let document_format = get_ipp_attribute(req.attributes(), DelimiterTag::OperationAttributes, "document-format").and_then(|v| match v {
            IppValue::MimeMediaType(m) => Some(m.as_str()),
            _ => None,
        });

        let snap = printer.read().await;
        let attrs = self.project(&head, &snap, &requested, document_format).await;
        drop(snap);

        let mut resp = ok_response(&req);
        push_group(&mut resp, DelimiterTag::PrinterAttributes, attrs);
        Ok(resp)
    }

    async fn set_printer_attributes(&self, _head: ReqParts, client: ClientEnvelope, mut req: IppRequestResponse) -> IppResult {
        self.authorize(&client)?;
        let printer = self.resolve_printer()?;
        let mut attributes = std::mem::take(req.attributes_mut());

        let outcome = {
            let mut snap = printer.write().await;
            apply_printer_attributes(&mut snap, &mut attributes, false)
        };
        if !outcome.ok() {
            return Err(IppError::attributes_not_supported("printer attributes not supported", outcome.unsupported).into());
        }
        self.system.config_changed();
        Ok(ok_response(&req))
    }

    async fn identify_printer(&self, _head: ReqParts, _client: ClientEnvelope, mut req: IppRequestResponse) -> IppResult {
        let printer = self.resolve_printer()?;
        let mut attributes = std::mem::take(req.attributes_mut());

        let explicit = take_ipp_attribute(&mut attributes, DelimiterTag::OperationAttributes, "identify-actions").map(|v| match v {
            IppValue::Array(items) => items.into_iter().filter_map(|i| i.as_keyword().map(|k| k.to_string())).collect::<Vec<_>>(),
            other => other.as_keyword().map(|k| vec![k.to_string()]).unwrap_or_default(),
        });
        let message = take_ipp_attribute(&mut attributes, DelimiterTag::OperationAttributes, "message").and_then(|v| match v {
            IppValue::TextWithoutLanguage(m) => Some(m),
            _ => None,
        });

        let (id, actions) = {
            let snap = printer.read().await;
            let actions = match explicit {
                Some(keywords) => IdentifyActions::from_keywords(keywords.iter().map(String::as_str)),
                None => snap.driver.identify_actions_default,
            };
            (snap.id, actions)
        };
        self.driver_hooks.identify(id, actions, message.as_deref());
        Ok(ok_response(&req))
    }

    async fn pause_printer(&self, _head: ReqParts, client: ClientEnvelope, req: IppRequestResponse) -> IppResult {
        self.authorize(&client)?;
        let printer = self.resolve_printer()?;
        printer.write().await.pause();
        Ok(ok_response(&req))
    }

    async fn resume_printer(&self, _head: ReqParts, client: ClientEnvelope, req: IppRequestResponse) -> IppResult {
        self.authorize(&client)?;
        let printer = self.resolve_printer()?;
        printer.write().await.resume();
        Ok(ok_response(&req))
    }

    async fn create_printer(&self, _head: ReqParts, client: ClientEnvelope, mut req: IppRequestResponse) -> IppResult {
        self.authorize(&client)?;
        let mut attributes = std::mem::take(req.attributes_mut());
        let name = take_ipp_attribute(&mut attributes, DelimiterTag::PrinterAttributes, "printer-name")
            .and_then(|v| match v {
                IppValue::NameWithoutLanguage(n) => Some(n),
                _ => None,
            })
            .unwrap_or_else(|| "printer".to_string());

        let handle = self.printers.create_printer(name.clone(), name.clone(), DriverData::default());
        let outcome = {
            let mut snap = handle.write().await;
            apply_printer_attributes(&mut snap, &mut attributes, true)
        };
        if !outcome.ok() {
            return Err(IppError::attributes_not_supported("printer attributes not supported", outcome.unsupported).into());
        }

        let mut resp = ok_response(&req);
        let id = handle.read().await.id;
        resp.attributes_mut().add(
            DelimiterTag::PrinterAttributes,
            IppAttribute::new("printer-id", IppValue::Integer(id)),
        );
        Ok(resp)
    }
}
