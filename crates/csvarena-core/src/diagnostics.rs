use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Info,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticLevel::Error => "error",
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Info => "info",
        })
    }
}

/// A non-fatal observation made while parsing, tied to a 1-based input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn error(line: usize, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            line,
            message: message.into(),
        }
    }

    pub fn warning(line: usize, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            line,
            message: message.into(),
        }
    }

    pub fn info(line: usize, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}: {}", self.level, self.line, self.message)
    }
}

/// Trait for handling diagnostics
/// This allows for dependency injection and testing with mock handlers
pub trait DiagnosticHandler: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);

    fn error(&self, line: usize, message: &str) {
        self.report(Diagnostic::error(line, message));
    }

    fn warning(&self, line: usize, message: &str) {
        self.report(Diagnostic::warning(line, message));
    }

    fn info(&self, line: usize, message: &str) {
        self.report(Diagnostic::info(line, message));
    }

    fn has_errors(&self) -> bool;
    fn error_count(&self) -> usize;
    fn warning_count(&self) -> usize;
    fn get_diagnostics(&self) -> Vec<Diagnostic>;
}

#[derive(Debug, Default)]
struct DiagnosticLog {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticLog {
    fn lock(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        // a panicking reporter cannot leave the Vec half-written
        self.diagnostics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, diagnostic: Diagnostic) {
        self.lock().push(diagnostic);
    }

    fn count(&self, level: DiagnosticLevel) -> usize {
        self.lock().iter().filter(|d| d.level == level).count()
    }

    fn snapshot(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }
}

/// Forwards every diagnostic to `tracing` and keeps a copy
#[derive(Debug, Default)]
pub struct TracingDiagnosticHandler {
    log: DiagnosticLog,
}

impl TracingDiagnosticHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticHandler for TracingDiagnosticHandler {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic.level {
            DiagnosticLevel::Error => {
                tracing::error!(line = diagnostic.line, "{}", diagnostic.message)
            }
            DiagnosticLevel::Warning => {
                tracing::warn!(line = diagnostic.line, "{}", diagnostic.message)
            }
            DiagnosticLevel::Info => {
                tracing::info!(line = diagnostic.line, "{}", diagnostic.message)
            }
        }
        self.log.push(diagnostic);
    }

    fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    fn error_count(&self) -> usize {
        self.log.count(DiagnosticLevel::Error)
    }

    fn warning_count(&self) -> usize {
        self.log.count(DiagnosticLevel::Warning)
    }

    fn get_diagnostics(&self) -> Vec<Diagnostic> {
        self.log.snapshot()
    }
}

/// Collecting diagnostic handler for testing
/// Collects all diagnostics without logging them
#[derive(Debug, Default)]
pub struct CollectingDiagnosticHandler {
    log: DiagnosticLog,
}

impl CollectingDiagnosticHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticHandler for CollectingDiagnosticHandler {
    fn report(&self, diagnostic: Diagnostic) {
        self.log.push(diagnostic);
    }

    fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    fn error_count(&self) -> usize {
        self.log.count(DiagnosticLevel::Error)
    }

    fn warning_count(&self) -> usize {
        self.log.count(DiagnosticLevel::Warning)
    }

    fn get_diagnostics(&self) -> Vec<Diagnostic> {
        self.log.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_creation() {
        let diag = Diagnostic::error(3, "Test error");
        assert_eq!(diag.level, DiagnosticLevel::Error);
        assert_eq!(diag.line, 3);
        assert_eq!(diag.message, "Test error");
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::warning(7, "row padded");
        assert_eq!(diag.to_string(), "warning at line 7: row padded");
    }

    #[test]
    fn test_collecting_handler() {
        let handler = CollectingDiagnosticHandler::new();

        handler.error(1, "Error 1");
        handler.warning(2, "Warning 1");
        handler.error(3, "Error 2");
        handler.info(4, "Info 1");

        assert!(handler.has_errors());
        assert_eq!(handler.error_count(), 2);
        assert_eq!(handler.warning_count(), 1);
        assert_eq!(handler.get_diagnostics().len(), 4);
    }

    #[test]
    fn test_tracing_handler_records() {
        let handler = TracingDiagnosticHandler::new();
        handler.warning(5, "short row");

        assert!(!handler.has_errors());
        assert_eq!(handler.warning_count(), 1);
        assert_eq!(handler.get_diagnostics()[0].line, 5);
    }
}
