//! Soft parse diagnostics.
//!
//! Hard failures come back as [`ParseError`](crate::ParseError). Anything a
//! caller might reasonably choose to live with (a missing optional section,
//! an unknown label, one malformed parameter among many) is recorded here
//! instead, alongside the best-effort result.

use serde::Serialize;
use std::fmt;

/// How bad a diagnostic is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("WARNING"),
            Severity::Error => f.write_str("ERROR"),
        }
    }
}

/// One recorded problem.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Where it happened, e.g. a parameter path or keyword name.
    pub location: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(ref loc) = self.location {
            write!(f, " (at {loc})")?;
        }
        Ok(())
    }
}

/// Ordered list of diagnostics gathered during a parse.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message.into(), None);
    }

    pub fn warn_at(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Warning, message.into(), Some(location.into()));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message.into(), None);
    }

    pub fn error_at(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Error, message.into(), Some(location.into()));
    }

    fn push(&mut self, severity: Severity, message: String, location: Option<String>) {
        match severity {
            Severity::Warning => tracing::warn!(location = ?location, "{message}"),
            Severity::Error => tracing::warn!(location = ?location, "error: {message}"),
        }
        self.0.push(Diagnostic {
            severity,
            message,
            location,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Error)
    }
}

/// One line per diagnostic, `ERROR: ...` / `WARNING: ...`.
impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in &self.0 {
            writeln!(f, "{d}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_in_order() {
        let mut diags = Diagnostics::new();
        diags.warn("Model specific parameters section not found!");
        diags.error_at("Reserved_Parameters", "Reserved parameter, 'GetWave_Exists', not found!");

        let text = diags.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "WARNING: Model specific parameters section not found!");
        assert!(lines[1].starts_with("ERROR: Reserved parameter, 'GetWave_Exists'"));
        assert!(lines[1].ends_with("(at Reserved_Parameters)"));
        assert!(diags.has_errors());
        assert_eq!(diags.warnings().count(), 1);
    }

    #[test]
    fn test_empty_renders_empty() {
        let diags = Diagnostics::new();
        assert!(diags.to_string().is_empty());
        assert!(!diags.has_errors());
    }
}
