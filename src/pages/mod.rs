//! Page handlers. They mutate the `Session` and report a `Transition` for the
//! router to apply; rendering lives in `ui`.

pub mod diagnosis;
pub mod history;
pub mod login;

use std::fmt;

use crate::session::Page;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Stay,
    GoTo(Page),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// User-visible message shown on the current page.
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// The user-correctable conditions. Neither changes session state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    EmptyCredentials,
    NoScanResult,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::EmptyCredentials => write!(f, "Enter both a username and a password."),
            Rejection::NoScanResult => {
                write!(f, "No diagnostic result yet. Run an acquisition first.")
            }
        }
    }
}

impl std::error::Error for Rejection {}

impl From<Rejection> for Notice {
    fn from(r: Rejection) -> Self {
        Notice::warning(r.to_string())
    }
}
