pub mod common;
pub mod printer_app;

pub use common::IppService;
pub use printer_app::{DiscardDocuments, DocumentSink, DriverHooks, NoDriverHooks, PrinterApp};
