//! Job Manager: the external collaborator referenced by spec §3/§6. Owns job
//! records; the core reads job state through this interface and never holds
//! a job lock and a printer lock at the same time.

use crate::model::JobState;
use futures_locks::RwLock;
use ipp::attribute::IppAttributes;
use moka::future::{Cache, CacheBuilder};
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub struct Job {
    pub id: i32,
    pub printer_id: i32,
    pub state: JobState,
    pub state_message: String,
    pub username: String,
    pub name: String,
    pub submit_time: i64,
    pub processing_time: Option<i64>,
    pub completed_time: Option<i64>,
    pub document_format: Option<String>,
    pub attributes: IppAttributes,
}

impl Job {
    pub fn is_mine(&self, username: &str) -> bool {
        self.username == username
    }
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Outbound contract a Printer State Store dispatcher uses to create and
/// cancel jobs, per spec §6. A `None` from `create_job` means the Printer
/// Manager rejected the job (backpressure); the dispatcher maps that to
/// `server-error-busy`.
pub trait JobManager: Send + Sync {
    fn create_job(
        &self,
        printer_id: i32,
        username: String,
        name: String,
        document_format: Option<String>,
        attributes: IppAttributes,
        held: bool,
    ) -> impl std::future::Future<Output = Option<Job>> + Send;

    fn job(&self, id: i32) -> impl std::future::Future<Output = Option<Job>> + Send;

    fn cancel_job(&self, id: i32) -> impl std::future::Future<Output = ()> + Send;

    fn cancel_all(&self, printer_id: i32, username: Option<&str>) -> impl std::future::Future<Output = ()> + Send;

    fn complete_job(&self, id: i32, ok: bool, message: String) -> impl std::future::Future<Output = ()> + Send;
}

/// Reference in-memory `JobManager`, grounded on the host crate's
/// `job_snapshot: Cache<i32, RwLock<JobInfo>>` pattern in `service/simple.rs`,
/// generalized from one flat cache to a manager that also tracks
/// per-printer cancellation and the active/completed split the printer's own
/// index arrays mirror by id.
pub struct InMemoryJobManager {
    next_id: AtomicI32,
    jobs: Cache<i32, RwLock<Job>>,
}

impl Default for InMemoryJobManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryJobManager {
    pub fn new() -> Self {
        let jobs = CacheBuilder::new(10_000)
            .time_to_live(Duration::from_secs(60 * 60))
            .build();
        Self {
            next_id: AtomicI32::new(1),
            jobs,
        }
    }
}

impl JobManager for InMemoryJobManager {
    async fn create_job(
        &self,
        printer_id: i32,
        username: String,
        name: String,
        document_format: Option<String>,
        attributes: IppAttributes,
        held: bool,
    ) -> Option<Job> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let job = Job {
            id,
            printer_id,
            state: if held { JobState::Held } else { JobState::Pending },
            state_message: String::new(),
            username,
            name,
            submit_time: now_secs(),
            processing_time: None,
            completed_time: None,
            document_format,
            attributes,
        };
        self.jobs.insert(id, RwLock::new(job.clone())).await;
        Some(job)
    }

    async fn job(&self, id: i32) -> Option<Job> {
        match self.jobs.get(&id).await {
            Some(lock) => Some(lock.read().await.clone()),
            None => None,
        }
    }

    async fn cancel_job(&self, id: i32) {
        if let Some(lock) = self.jobs.get(&id).await {
            let mut job = lock.write().await;
            if !job.state.is_terminal() {
                job.state = JobState::Canceled;
                job.state_message = "Job canceled by operator.".to_string();
                job.completed_time = Some(now_secs());
            }
        }
    }

    async fn cancel_all(&self, printer_id: i32, username: Option<&str>) {
        for (_, lock) in self.jobs.iter() {
            let mut job = lock.write().await;
            if job.printer_id != printer_id || job.state.is_terminal() {
                continue;
            }
            if let Some(username) = username {
                if !job.is_mine(username) {
                    continue;
                }
            }
            job.state = JobState::Canceled;
            job.state_message = "Job canceled by operator.".to_string();
            job.completed_time = Some(now_secs());
        }
    }

    async fn complete_job(&self, id: i32, ok: bool, message: String) {
        if let Some(lock) = self.jobs.get(&id).await {
            let mut job = lock.write().await;
            job.state = if ok { JobState::Completed } else { JobState::Aborted };
            job.state_message = message;
            job.completed_time = Some(now_secs());
        }
    }
}
