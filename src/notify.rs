//! User-facing notifications and loading/error status
//!
//! The orchestrator emits at most one notice per step. Callers choose the
//! channel: colored console output or an in-memory recorder.

use colored::Colorize;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);

    fn success(&self, message: &str) {
        self.notify(NoticeLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.notify(NoticeLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.notify(NoticeLevel::Error, message);
    }
}

/// Prints notices to the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Success => println!("{} {}", "✔".green().bold(), message),
            NoticeLevel::Warning => println!("{} {}", "⚠".yellow().bold(), message.yellow()),
            NoticeLevel::Error => eprintln!("{} {}", "✖".red().bold(), message.red()),
        }
    }
}

/// Keeps every notice in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }

    pub fn messages(&self, level: NoticeLevel) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|n| n.level == level)
            .map(|n| n.message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(Notice {
                level,
                message: message.to_string(),
            });
        }
    }
}

/// Loading flag and last error, as a UI would show them
pub trait StatusSink: Send + Sync {
    fn set_loading(&self, loading: bool);
    fn set_error(&self, error: Option<&str>);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStatus;

impl StatusSink for NoopStatus {
    fn set_loading(&self, _loading: bool) {}
    fn set_error(&self, _error: Option<&str>) {}
}

/// Remembers the current status and every loading transition
#[derive(Debug, Default)]
pub struct RecordingStatus {
    inner: Mutex<StatusState>,
}

#[derive(Debug, Default, Clone)]
pub struct StatusState {
    pub loading: bool,
    pub error: Option<String>,
    pub loading_transitions: Vec<bool>,
}

impl RecordingStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatusState {
        self.inner.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl StatusSink for RecordingStatus {
    fn set_loading(&self, loading: bool) {
        if let Ok(mut state) = self.inner.lock() {
            state.loading = loading;
            state.loading_transitions.push(loading);
        }
    }

    fn set_error(&self, error: Option<&str>) {
        if let Ok(mut state) = self.inner.lock() {
            state.error = error.map(str::to_string);
        }
    }
}
