//! The System, Authorize, and Resource-table collaborators, per spec §6.
//! Specified only at their interfaces here; a Printer Application binary
//! supplies a concrete implementation (shutdown coordination, auth backend,
//! TLS posture, persisted resource strings).

/// The authenticated request envelope every operation handler receives
/// alongside the decoded IPP attributes (spec §4.1, §6).
#[derive(Debug, Clone, Default)]
pub struct ClientEnvelope {
    pub username: Option<String>,
    pub host: String,
    pub port: u16,
    pub tls: bool,
}

impl ClientEnvelope {
    pub fn requesting_user_name(&self) -> &str {
        self.username.as_deref().unwrap_or("anonymous")
    }
}

/// Result of an authorization check, per spec §4.7: "Authorization failures
/// translate to HTTP responses (not IPP responses)".
pub enum AuthDecision {
    Continue,
    Reject(http::StatusCode),
}

/// Called by every mutating operation handler before it touches printer
/// state (spec §6 inbound contract).
pub trait Authorize: Send + Sync {
    fn authorize(&self, client: &ClientEnvelope) -> AuthDecision;
}

/// No-op authorizer: every request continues. The default for a Printer
/// Application that delegates access control entirely to its HTTP
/// transport layer (e.g. network-level trust).
pub struct AllowAll;

impl Authorize for AllowAll {
    fn authorize(&self, _client: &ClientEnvelope) -> AuthDecision {
        AuthDecision::Continue
    }
}

/// One entry of the shared resources table (`printer-strings-uri`
/// candidates), per spec §6: "iterable of {language, path}".
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    pub language: String,
    pub uri: String,
}

/// The shared, system-wide collaborator (spec §6 "System"). Guarded by its
/// own reader-writer lock, acquired after any printer lock already held
/// (spec §5 lock ordering).
pub trait System: Send + Sync {
    fn is_shutdown_pending(&self) -> bool;
    fn auth_service_configured(&self) -> bool;
    fn tls_only(&self) -> bool;
    fn tls_disabled(&self) -> bool;
    fn config_changed(&self);
    /// Resource entries available for `printer-strings-uri` projection,
    /// read under the system's own lock.
    fn resources(&self) -> Vec<ResourceEntry>;
}

/// A minimal standalone System for a Printer Application that does not
/// itself need shutdown coordination, an auth backend, or persisted
/// resource strings; `config_changed` is a no-op hook a real system would
/// wire to the persistence collaborator's save callback.
#[derive(Default)]
pub struct StandaloneSystem {
    pub shutdown_pending: std::sync::atomic::AtomicBool,
    pub tls_only: bool,
    pub tls_disabled: bool,
}

impl System for StandaloneSystem {
    fn is_shutdown_pending(&self) -> bool {
        self.shutdown_pending.load(std::sync::atomic::Ordering::Relaxed)
    }

    fn auth_service_configured(&self) -> bool {
        false
    }

    fn tls_only(&self) -> bool {
        self.tls_only
    }

    fn tls_disabled(&self) -> bool {
        self.tls_disabled
    }

    fn config_changed(&self) {
        log::debug!("printer configuration changed");
    }

    fn resources(&self) -> Vec<ResourceEntry> {
        Vec::new()
    }
}
