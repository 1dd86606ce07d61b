use std::fmt;

use crate::base::Location;

/// Severity level for diagnostics, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    /// Informational note
    Info,
    /// Suspicious but usable
    Warning,
    /// Fails the operation at the default threshold
    #[default]
    Error,
    /// Always fails the operation
    Critical,
}

impl Severity {
    /// Whether a diagnostic of this severity fails an operation run with `threshold`.
    pub fn meets(self, threshold: Severity) -> bool {
        self >= threshold || self == Severity::Critical
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message produced while building a grammar or parsing a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Present for parse diagnostics.
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            location: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(Severity::Critical, message)
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Render every diagnostic on its own line.
    pub fn render_log(diagnostics: &[Diagnostic]) -> String {
        diagnostics
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The first diagnostic of the highest severity.
    pub fn most_severe(diagnostics: &[Diagnostic]) -> Option<&Diagnostic> {
        diagnostics
            .iter()
            .min_by_key(|d| std::cmp::Reverse(d.severity))
    }
}

impl fmt::Display for Diagnostic {
    /// `[Error] message`, or `[Error@3:14] message` when located.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(
                f,
                "[{}@{}:{}] {}",
                self.severity,
                location.line() + 1,
                location.column() + 1,
                self.message
            ),
            None => write!(f, "[{}] {}", self.severity, self.message),
        }
    }
}
