//! Routing API failures to the user.

use std::fmt;
use std::sync::Mutex;

use tracing::error;

use crate::error::ApiError;

pub const FALLBACK_MESSAGE: &str = "An error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "success",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        })
    }
}

/// Receives user-facing messages.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, message: &str, level: NotificationLevel);
}

/// Keeps every notification in memory, oldest first.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Mutex<Vec<(NotificationLevel, String)>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(NotificationLevel, String)> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl NotificationSink for NotificationLog {
    fn notify(&self, message: &str, level: NotificationLevel) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }
}

/// Log `err`, show its message to the user and yield `None`.
///
/// ```
/// # use crm_client::{handle_api_error, ApiError, NotificationLog};
/// let sink = NotificationLog::new();
/// let err = ApiError::Http { status: 404, message: "Project not found".into() };
/// let value: Option<u32> = handle_api_error(&err, "projects", &sink);
/// assert!(value.is_none());
/// ```
pub fn handle_api_error<T>(err: &ApiError, context: &str, sink: &dyn NotificationSink) -> Option<T> {
    if context.is_empty() {
        error!(error = %err, "API error");
    } else {
        error!(context, error = %err, "API error");
    }

    let message = err.to_string();
    let message = if message.is_empty() { FALLBACK_MESSAGE } else { message.as_str() };
    sink.notify(message, NotificationLevel::Error);
    None
}
