use enum_primitive_derive::Primitive;

/// The printer-scoped subset of IPP operation codes this core dispatches.
/// Values are the real RFC 8011 / PWG 5100.11 / PWG 5100.13 operation ids;
/// kept as our own enum rather than relying on the wire-codec crate's
/// `Operation` (which only covers the RFC 2911 core set) so the extension
/// operations IPP Everywhere printer applications need are still typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Primitive)]
pub enum PrinterOperation {
    PrintJob = 0x0002,
    ValidateJob = 0x0004,
    CreateJob = 0x0005,
    CancelJob = 0x0008,
    GetJobAttributes = 0x0009,
    GetJobs = 0x000a,
    GetPrinterAttributes = 0x000b,
    PausePrinter = 0x0010,
    ResumePrinter = 0x0011,
    SetPrinterAttributes = 0x0013,
    CancelCurrentJob = 0x002d,
    CancelJobs = 0x0038,
    CancelMyJobs = 0x0039,
    IdentifyPrinter = 0x003c,
    CreatePrinter = 0x004c,
}

impl PrinterOperation {
    /// The RFC 8011 / PWG operation name, for logging.
    pub fn keyword(self) -> &'static str {
        match self {
            PrinterOperation::PrintJob => "Print-Job",
            PrinterOperation::ValidateJob => "Validate-Job",
            PrinterOperation::CreateJob => "Create-Job",
            PrinterOperation::CancelJob => "Cancel-Job",
            PrinterOperation::GetJobAttributes => "Get-Job-Attributes",
            PrinterOperation::GetJobs => "Get-Jobs",
            PrinterOperation::GetPrinterAttributes => "Get-Printer-Attributes",
            PrinterOperation::PausePrinter => "Pause-Printer",
            PrinterOperation::ResumePrinter => "Resume-Printer",
            PrinterOperation::SetPrinterAttributes => "Set-Printer-Attributes",
            PrinterOperation::CancelCurrentJob => "Cancel-Current-Job",
            PrinterOperation::CancelJobs => "Cancel-Jobs",
            PrinterOperation::CancelMyJobs => "Cancel-My-Jobs",
            PrinterOperation::IdentifyPrinter => "Identify-Printer",
            PrinterOperation::CreatePrinter => "Create-Printer",
        }
    }
}
