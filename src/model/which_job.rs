use crate::model::JobState;

/// `which-jobs` operation attribute, selecting the job index Get-Jobs
/// iterates and the state-comparison rule applied to each entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WhichJob {
    /// Active jobs, state <= `processing-stopped`.
    NotCompleted,
    /// Completed jobs, state >= `canceled`.
    Completed,
    /// Every job regardless of state.
    All,
}

impl WhichJob {
    pub fn parse(keyword: Option<&str>) -> Result<Self, String> {
        match keyword {
            None | Some("not-completed") => Ok(Self::NotCompleted),
            Some("completed") => Ok(Self::Completed),
            Some("all") => Ok(Self::All),
            Some(other) => Err(other.to_string()),
        }
    }

    pub fn matches(self, state: JobState) -> bool {
        match self {
            WhichJob::NotCompleted => state <= JobState::Stopped,
            WhichJob::Completed => state >= JobState::Canceled,
            WhichJob::All => true,
        }
    }
}
