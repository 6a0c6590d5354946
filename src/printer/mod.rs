//! Printer State Store: the mutable aggregate representing one printer
//! (spec §3, §4.2). Guarded by a reader-writer lock; mutation only happens
//! through Set-Printer-Attributes, Pause/Resume, and driver status
//! callbacks.

pub mod driver;
pub mod supply;

pub use driver::{DriverData, IntRange};
pub use supply::{Colorant, Supply, SupplyKind};

use crate::media::MediaCol;
use crate::model::{PrinterState, StateReasons};
use futures_locks::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub const READY_MEDIA_SLOTS: usize = 4;

#[derive(Debug, Clone, Default)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    pub telephone: String,
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// The root mutable entity, per spec §3.
#[derive(Debug, Clone)]
pub struct Printer {
    pub id: i32,
    pub name: String,
    pub uuid: Uuid,
    pub resource_path: String,

    pub contact: ContactInfo,
    pub location: String,
    pub geo_location: Option<String>,
    pub organization: String,
    pub organizational_unit: String,
    pub dnssd_name: String,

    pub driver: DriverData,

    /// Fixed-capacity ordered array; empties are contiguous at the tail.
    pub media_ready: [Option<MediaCol>; READY_MEDIA_SLOTS],
    pub supplies: Vec<Supply>,

    pub state: PrinterState,
    pub state_reasons: StateReasons,
    pub is_stopped: bool,

    pub start_time: i64,
    pub config_time: i64,
    pub state_time: i64,
    pub status_time: i64,

    pub active_jobs: Vec<i32>,
    pub completed_jobs: Vec<i32>,
    pub all_jobs: Vec<i32>,

    pub device_in_use: bool,
    pub processing_job: Option<i32>,

    pub vendor_values: BTreeMap<String, String>,
}

impl Printer {
    pub fn new(id: i32, name: impl Into<String>, resource_path: impl Into<String>, driver: DriverData) -> Self {
        let now = now_secs();
        let mut media_ready: [Option<MediaCol>; READY_MEDIA_SLOTS] = Default::default();
        if let Some(default_media) = &driver.media_default {
            media_ready[0] = Some(default_media.clone());
        }
        let supplies = driver.supplies.clone();
        Self {
            id,
            name: name.into(),
            uuid: Uuid::new_v4(),
            resource_path: resource_path.into(),
            contact: ContactInfo::default(),
            location: String::new(),
            geo_location: None,
            organization: String::new(),
            organizational_unit: String::new(),
            dnssd_name: String::new(),
            driver,
            media_ready,
            supplies,
            state: PrinterState::Idle,
            state_reasons: StateReasons::empty(),
            is_stopped: false,
            start_time: now,
            config_time: now,
            state_time: now,
            status_time: 0,
            active_jobs: Vec::new(),
            completed_jobs: Vec::new(),
            all_jobs: Vec::new(),
            device_in_use: false,
            processing_job: None,
            vendor_values: BTreeMap::new(),
        }
    }

    /// `accepting-jobs` is derived, not stored: a shutdown-pending system
    /// refuses new jobs regardless of the printer's own state (spec §3,
    /// "Operational flags").
    pub fn accepting_jobs(&self, shutdown_pending: bool) -> bool {
        !shutdown_pending
    }

    pub fn queued_job_count(&self) -> usize {
        self.active_jobs.len()
    }

    /// Record a newly created job in the active+all indexes (spec §3
    /// lifecycle: "added to active+all indexes").
    pub fn index_new_job(&mut self, job_id: i32) {
        self.active_jobs.push(job_id);
        self.all_jobs.push(job_id);
    }

    /// Move a job from active to completed once the Job Manager reports a
    /// terminal state. Idempotent: a job already moved is left alone.
    pub fn index_job_completed(&mut self, job_id: i32) {
        if let Some(pos) = self.active_jobs.iter().position(|&id| id == job_id) {
            self.active_jobs.remove(pos);
            self.completed_jobs.push(job_id);
        }
        if self.processing_job == Some(job_id) {
            self.processing_job = None;
        }
    }

    /// Advances `config_time` strictly past its previous value, per spec §3's
    /// "config_time monotonically non-decreasing" invariant and §8's "after a
    /// successful Set, config_time strictly exceeds its prior value".
    pub fn touch_config(&mut self) {
        let now = now_secs();
        self.config_time = if now > self.config_time { now } else { self.config_time + 1 };
    }

    pub fn touch_state(&mut self) {
        self.state_time = now_secs().max(self.state_time + 1);
    }

    pub fn pause(&mut self) {
        if self.device_in_use || self.processing_job.is_some() {
            self.is_stopped = true;
        } else {
            self.is_stopped = false;
            self.state = PrinterState::Stopped;
        }
        self.touch_state();
    }

    pub fn resume(&mut self) {
        self.is_stopped = false;
        self.state = PrinterState::Idle;
        self.touch_state();
    }
}

/// Guarded handle over a single printer, per spec §9 "expose this as a
/// value object behind a guarded handle". A thin newtype rather than a bare
/// `RwLock<Printer>` so call sites read `handle.read().await` the way the
/// host crate reads `job.read().await` in `service/simple.rs`.
#[derive(Clone)]
pub struct PrinterHandle(RwLock<Printer>);

impl PrinterHandle {
    pub fn new(printer: Printer) -> Self {
        Self(RwLock::new(printer))
    }

    pub async fn read(&self) -> futures_locks::RwLockReadGuard<Printer> {
        self.0.read().await
    }

    pub async fn write(&self) -> futures_locks::RwLockWriteGuard<Printer> {
        self.0.write().await
    }
}

/// Owns printers by id (spec §9, "the Printer Manager owns printers by
/// id"). A Printer Application process typically serves one printer behind
/// one HTTP resource path, but the manager keeps the door open for more
/// without the dispatcher needing to change.
pub struct PrinterManager {
    next_id: AtomicI32,
    printers: std::sync::RwLock<BTreeMap<i32, std::sync::Arc<PrinterHandle>>>,
}

impl Default for PrinterManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PrinterManager {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI32::new(1),
            printers: std::sync::RwLock::new(BTreeMap::new()),
        }
    }

    pub fn create_printer(
        &self,
        name: impl Into<String>,
        resource_path: impl Into<String>,
        driver: DriverData,
    ) -> std::sync::Arc<PrinterHandle> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = std::sync::Arc::new(PrinterHandle::new(Printer::new(id, name, resource_path, driver)));
        self.printers.write().unwrap().insert(id, handle.clone());
        handle
    }

    pub fn get(&self, id: i32) -> Option<std::sync::Arc<PrinterHandle>> {
        self.printers.read().unwrap().get(&id).cloned()
    }

    /// The lowest-id printer. A Printer Application process typically
    /// serves exactly one printer behind one resource path; handlers that
    /// do not themselves resolve a `printer-uri` fall back to this.
    pub fn primary(&self) -> Option<std::sync::Arc<PrinterHandle>> {
        self.printers.read().unwrap().values().next().cloned()
    }

    pub fn remove(&self, id: i32) {
        self.printers.write().unwrap().remove(&id);
    }
}
