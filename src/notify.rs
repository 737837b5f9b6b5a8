//! Short user-facing messages raised by edit operations.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Warning,
    Info,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Receives toast-style notifications.
pub trait Notifier {
    fn notify(&mut self, message: &str, severity: Severity);
}

/// Collects notifications in order; handy for tests and batch drivers.
impl Notifier for Vec<(String, Severity)> {
    fn notify(&mut self, message: &str, severity: Severity) {
        self.push((message.to_string(), severity));
    }
}
