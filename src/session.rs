//! Per-session state shared by the page handlers.

use std::fmt;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Page {
    #[default]
    Login,
    Diagnosis,
    History,
}

impl Page {
    /// Pages offered by the sidebar once logged in.
    pub const NAVIGABLE: [Page; 2] = [Page::Diagnosis, Page::History];

    pub fn label(self) -> &'static str {
        match self {
            Page::Login => "Login",
            Page::Diagnosis => "Battery Diagnosis",
            Page::History => "History",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A completed scan. Immutable once it has been appended to the history.
#[derive(Clone, PartialEq)]
pub struct DiagnosticRecord {
    pub scan_id: u64,
    pub serial: String,
    pub soh: f64,
    pub soc: f64,
    /// PNG-encoded heat-map; empty if encoding failed.
    pub image: Arc<[u8]>,
}

impl fmt::Debug for DiagnosticRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticRecord")
            .field("scan_id", &self.scan_id)
            .field("serial", &self.serial)
            .field("soh", &self.soh)
            .field("soc", &self.soc)
            .field("image_bytes", &self.image.len())
            .finish()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Session {
    pub authenticated: bool,
    pub page: Page,
    /// Mirror of the sidebar selection; kept equal to `page` once logged in.
    pub nav_selection: Page,
    pub username: String,
    history: Vec<DiagnosticRecord>,
    pub last_result: Option<DiagnosticRecord>,
}

impl Session {
    pub fn history(&self) -> &[DiagnosticRecord] {
        &self.history
    }

    /// History only grows.
    pub fn append_history(&mut self, record: DiagnosticRecord) {
        self.history.push(record);
    }
}

/// Owns the one `Session` of an interactive run. The session is created with
/// defaults on first access and never re-initialised afterwards.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: Option<Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.is_some()
    }

    pub fn get(&mut self) -> &mut Session {
        self.inner.get_or_insert_with(|| {
            tracing::debug!("session initialised with defaults");
            Session::default()
        })
    }

    pub fn peek(&self) -> Option<&Session> {
        self.inner.as_ref()
    }
}
