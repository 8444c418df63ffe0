use std::fmt;
use std::io::Write;
use std::sync::Mutex;

use tracing::debug;

use crate::traits::Notifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Severity {
    Warning,
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Warning => "warning",
            Severity::Success => "success",
            Severity::Error => "error",
        };
        f.write_str(label)
    }
}

/// Prints each notice as a boxed line on a terminal-like writer.
pub(crate) struct ConsoleNotifier<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleNotifier<std::io::Stdout> {
    pub(crate) fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleNotifier<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out.into_inner().unwrap()
    }
}

impl<W: Write + Send> Notifier for ConsoleNotifier<W> {
    fn notify(&self, severity: Severity, message: &str) {
        debug!(%severity, "Showing notice");
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        let icon = match severity {
            Severity::Warning => "!",
            Severity::Success => "✓",
            Severity::Error => "✗",
        };
        let _ = writeln!(out, "[{icon}] {message}");
        let _ = out.flush();
    }
}
