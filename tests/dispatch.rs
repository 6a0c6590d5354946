//! Dispatcher integration tests (spec §4.1, §8): drive `PrinterApp` through
//! its real `IppService::handle_request` entry point with hand-built raw
//! IPP/1.1 wire bytes fed through the crate's own `AsyncIppParser`, the same
//! way `handler::http::handle_ipp_via_http` does over a live connection.

use http::request::Parts as ReqParts;
use ipp::attribute::IppAttributes;
use ipp::model::DelimiterTag;
use ipp::parser::AsyncIppParser;
use ipp::request::IppRequestResponse;
use ipp::value::IppValue;
use ipp_printer_core::job::InMemoryJobManager;
use ipp_printer_core::printer::DriverData;
use ipp_printer_core::service::{IppService, PrinterApp};
use ipp_printer_core::system::{AllowAll, StandaloneSystem};

const TAG_OPERATION_ATTRIBUTES: u8 = 0x01;
const TAG_END_OF_ATTRIBUTES: u8 = 0x03;
const VALUE_TAG_INTEGER: u8 = 0x21;
const VALUE_TAG_NAME: u8 = 0x42;
const VALUE_TAG_KEYWORD: u8 = 0x44;
const VALUE_TAG_CHARSET: u8 = 0x47;
const VALUE_TAG_NATURAL_LANGUAGE: u8 = 0x48;

const OP_PRINT_JOB: u16 = 0x0002;
const OP_CREATE_JOB: u16 = 0x0005;
const OP_CANCEL_JOB: u16 = 0x0008;
const OP_GET_PRINTER_ATTRIBUTES: u16 = 0x000b;
const OP_PAUSE_PRINTER: u16 = 0x0010;
const OP_CANCEL_CURRENT_JOB: u16 = 0x002d;

fn write_attr(buf: &mut Vec<u8>, value_tag: u8, name: &str, value: &[u8]) {
    buf.push(value_tag);
    buf.extend_from_slice(&(name.len() as u16).to_be_bytes());
    buf.extend_from_slice(name.as_bytes());
    buf.extend_from_slice(&(value.len() as u16).to_be_bytes());
    buf.extend_from_slice(value);
}

fn build_request(operation_id: u16, request_id: u32, attrs: &[(u8, &str, &[u8])], document_data: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.push(0x01);
    buf.push(0x01);
    buf.extend_from_slice(&operation_id.to_be_bytes());
    buf.extend_from_slice(&request_id.to_be_bytes());
    buf.push(TAG_OPERATION_ATTRIBUTES);
    write_attr(&mut buf, VALUE_TAG_CHARSET, "attributes-charset", b"utf-8");
    write_attr(&mut buf, VALUE_TAG_NATURAL_LANGUAGE, "attributes-natural-language", b"en");
    for &(tag, name, value) in attrs {
        write_attr(&mut buf, tag, name, value);
    }
    buf.push(TAG_END_OF_ATTRIBUTES);
    buf.extend_from_slice(document_data);
    buf
}

async fn parse(bytes: Vec<u8>) -> IppRequestResponse {
    AsyncIppParser::new(futures::io::Cursor::new(bytes))
        .parse()
        .await
        .expect("well-formed test request parses")
}

fn request_head() -> ReqParts {
    http::Request::builder()
        .method(http::Method::POST)
        .uri("http://localhost/ipp/print")
        .header(http::header::HOST, "localhost")
        .body(())
        .unwrap()
        .into_parts()
        .0
}

fn test_app() -> PrinterApp {
    let app = PrinterApp::new(InMemoryJobManager::new(), StandaloneSystem::default(), AllowAll, ipp_printer_core::service::DiscardDocuments, ipp_printer_core::service::NoDriverHooks);
    app.printers().create_printer("test-printer", "ipp/print", DriverData::default());
    app
}

fn job_id_of(attributes: &IppAttributes) -> i32 {
    attributes
        .groups_of(DelimiterTag::JobAttributes)
        .find_map(|g| g.attributes().get("job-id"))
        .and_then(|a| match a.value() {
            IppValue::Integer(n) => Some(*n),
            _ => None,
        })
        .expect("job-id present in response")
}

#[tokio::test]
async fn get_printer_attributes_succeeds() {
    let app = test_app();
    let req = parse(build_request(OP_GET_PRINTER_ATTRIBUTES, 1, &[], &[])).await;
    let resp = app.handle_request(request_head(), req).await;
    assert!(resp.header().status_code().is_success());
    assert!(resp
        .attributes()
        .groups_of(DelimiterTag::PrinterAttributes)
        .next()
        .is_some());
}

#[tokio::test]
async fn print_job_with_document_data_is_accepted() {
    let app = test_app();
    let attrs: Vec<(u8, &str, &[u8])> = vec![
        (VALUE_TAG_NAME, "job-name", b"Test Print Job"),
        (VALUE_TAG_KEYWORD, "document-format", b"application/pdf"),
    ];
    let req = parse(build_request(OP_PRINT_JOB, 2, &attrs, b"%PDF-1.4 fake body")).await;
    let resp = app.handle_request(request_head(), req).await;
    assert!(resp.header().status_code().is_success());
    job_id_of(resp.attributes());
}

#[tokio::test]
async fn print_job_without_document_data_is_rejected() {
    let app = test_app();
    let attrs: Vec<(u8, &str, &[u8])> = vec![(VALUE_TAG_NAME, "job-name", b"No Document")];
    let req = parse(build_request(OP_PRINT_JOB, 3, &attrs, &[])).await;
    let resp = app.handle_request(request_head(), req).await;
    assert_eq!(resp.header().status_code(), ipp::model::StatusCode::ClientErrorBadRequest);
}

#[tokio::test]
async fn create_job_without_document_data_is_accepted() {
    let app = test_app();
    let attrs: Vec<(u8, &str, &[u8])> = vec![(VALUE_TAG_NAME, "job-name", b"Held Job")];
    let req = parse(build_request(OP_CREATE_JOB, 4, &attrs, &[])).await;
    let resp = app.handle_request(request_head(), req).await;
    assert!(resp.header().status_code().is_success());
    job_id_of(resp.attributes());
}

#[tokio::test]
async fn create_job_with_document_data_is_rejected() {
    let app = test_app();
    let attrs: Vec<(u8, &str, &[u8])> = vec![(VALUE_TAG_NAME, "job-name", b"Held Job")];
    let req = parse(build_request(OP_CREATE_JOB, 5, &attrs, b"unexpected bytes")).await;
    let resp = app.handle_request(request_head(), req).await;
    assert_eq!(resp.header().status_code(), ipp::model::StatusCode::ClientErrorBadRequest);
}

#[tokio::test]
async fn cancel_job_roundtrip() {
    let app = test_app();
    let attrs: Vec<(u8, &str, &[u8])> = vec![(VALUE_TAG_NAME, "job-name", b"Held Job")];
    let create_req = parse(build_request(OP_CREATE_JOB, 6, &attrs, &[])).await;
    let create_resp = app.handle_request(request_head(), create_req).await;
    let job_id = job_id_of(create_resp.attributes());

    let job_id_bytes = job_id.to_be_bytes();
    let cancel_attrs: Vec<(u8, &str, &[u8])> = vec![(VALUE_TAG_INTEGER, "job-id", &job_id_bytes)];
    let cancel_req = parse(build_request(OP_CANCEL_JOB, 7, &cancel_attrs, &[])).await;
    let cancel_resp = app.handle_request(request_head(), cancel_req).await;
    assert!(cancel_resp.header().status_code().is_success());
}

#[tokio::test]
async fn cancel_current_job_with_nothing_processing_is_not_found() {
    let app = test_app();
    let req = parse(build_request(OP_CANCEL_CURRENT_JOB, 8, &[], &[])).await;
    let resp = app.handle_request(request_head(), req).await;
    assert_eq!(resp.header().status_code(), ipp::model::StatusCode::ClientErrorNotFound);
}

#[tokio::test]
async fn pause_printer_from_idle_reports_stopped_not_moving() {
    let app = test_app();
    let req = parse(build_request(OP_PAUSE_PRINTER, 9, &[], &[])).await;
    let resp = app.handle_request(request_head(), req).await;
    assert!(resp.header().status_code().is_success());

    let printer = app.printers().primary().expect("primary printer exists");
    let snap = printer.read().await;
    assert!(!snap.is_stopped);
    assert_eq!(snap.state, ipp_printer_core::model::PrinterState::Stopped);
}
