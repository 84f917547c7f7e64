use std::fmt;

use tracing::{info, warn};

use crate::pages::{Notice, Rejection, Transition};
use crate::session::{Page, Session};

#[derive(Clone, Default)]
pub struct LoginPage {
    pub username: String,
    pub password: String,
    pub notice: Option<Notice>,
}

impl fmt::Debug for LoginPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginPage")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("notice", &self.notice)
            .finish()
    }
}

impl LoginPage {
    pub fn with_credentials(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            notice: None,
        }
    }

    /// Presence check only: any non-empty username/password pair is accepted.
    pub fn submit(&mut self, session: &mut Session) -> Result<Transition, Rejection> {
        if self.username.is_empty() || self.password.is_empty() {
            warn!("login rejected: empty credentials");
            let rejection = Rejection::EmptyCredentials;
            self.notice = Some(rejection.into());
            return Err(rejection);
        }
        session.authenticated = true;
        session.username = self.username.clone();
        self.password.clear();
        self.notice = None;
        info!(user = %session.username, "login accepted");
        Ok(Transition::GoTo(Page::Diagnosis))
    }
}
