use ipp::value::IppValue;

/// Job lifecycle state, per RFC 8011 `job-state` (values 3..9). Named after
/// PWG's simplified vocabulary rather than the raw `pending-held` /
/// `processing-stopped` RFC keywords, to match the terms the rest of this
/// core uses (`HELD`, `STOPPED`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JobState {
    Pending = 3,
    Held = 4,
    Processing = 5,
    Stopped = 6,
    Canceled = 7,
    Aborted = 8,
    Completed = 9,
}

impl JobState {
    /// True once the job can never transition again.
    pub fn is_terminal(self) -> bool {
        self >= JobState::Canceled
    }

    pub fn keyword(self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Held => "pending-held",
            JobState::Processing => "processing",
            JobState::Stopped => "processing-stopped",
            JobState::Canceled => "canceled",
            JobState::Aborted => "aborted",
            JobState::Completed => "completed",
        }
    }
}

impl TryFrom<i32> for JobState {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, i32> {
        match value {
            3 => Ok(Self::Pending),
            4 => Ok(Self::Held),
            5 => Ok(Self::Processing),
            6 => Ok(Self::Stopped),
            7 => Ok(Self::Canceled),
            8 => Ok(Self::Aborted),
            9 => Ok(Self::Completed),
            _ => Err(value),
        }
    }
}

impl From<JobState> for IppValue {
    fn from(value: JobState) -> Self {
        IppValue::Enum(value as i32)
    }
}

/// Printer processing state, per RFC 8011 `printer-state` (values 3..5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrinterState {
    Idle = 3,
    Processing = 4,
    Stopped = 5,
}

impl From<PrinterState> for IppValue {
    fn from(value: PrinterState) -> Self {
        IppValue::Enum(value as i32)
    }
}

/// `print-quality` enum values, per RFC 8011.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrintQuality {
    Draft = 3,
    Normal = 4,
    High = 5,
}

impl PrintQuality {
    pub const MIN: i32 = PrintQuality::Draft as i32;
    pub const MAX: i32 = PrintQuality::High as i32;
}

impl TryFrom<i32> for PrintQuality {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, i32> {
        match value {
            3 => Ok(Self::Draft),
            4 => Ok(Self::Normal),
            5 => Ok(Self::High),
            _ => Err(value),
        }
    }
}

impl From<PrintQuality> for IppValue {
    fn from(value: PrintQuality) -> Self {
        IppValue::Enum(value as i32)
    }
}

impl Default for PrintQuality {
    fn default() -> Self {
        PrintQuality::Normal
    }
}
