//! Three-state page router: Login → Diagnosis ⇄ History.
//!
//! The router owns the session. Page handlers return a `Transition`, the sidebar
//! queues a pending page, and both take effect through `apply` at the start of
//! the next dispatch. While logged out the router is pinned at `Login`.

use tracing::debug;

use crate::pages::Transition;
use crate::session::{Page, Session, SessionStore};

#[derive(Debug, Default)]
pub struct Router {
    store: SessionStore,
    pending: Option<Page>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&mut self) -> &mut Session {
        self.store.get()
    }

    pub fn is_authenticated(&mut self) -> bool {
        self.session().authenticated
    }

    /// Sidebar selection. Dropped while logged out; only navigable pages count.
    pub fn navigate(&mut self, page: Page) {
        if !self.is_authenticated() || !Page::NAVIGABLE.contains(&page) {
            return;
        }
        if self.session().page != page {
            debug!("navigation queued: {page}");
            self.pending = Some(page);
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Page and sidebar selection always change together.
    pub fn apply(&mut self, transition: Transition) {
        if let Transition::GoTo(page) = transition {
            let session = self.session();
            if session.page != page {
                debug!("page {} -> {}", session.page, page);
            }
            session.page = page;
            session.nav_selection = page;
        }
    }

    /// Resolve the page to render this cycle.
    pub fn begin_cycle(&mut self) -> Page {
        if !self.is_authenticated() {
            self.pending = None;
            return Page::Login;
        }
        if let Some(page) = self.pending.take() {
            self.apply(Transition::GoTo(page));
        }
        self.session().page
    }
}
