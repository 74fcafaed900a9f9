//! Job diagnostics.
//!
//! Recoverable problems are collected, never thrown: the pipeline keeps
//! going where it sensibly can and the caller inspects the list. Every
//! diagnostic carries a stable code so tests and tooling can match on it
//! without parsing messages; severity drives the exit status only at the
//! CLI layer.

use texast::Span;
use units::Scaled;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Note,
    Warning,
    Error,
}

/// A structured numeric detail attached to a diagnostic, in sp unless
/// the name says otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
    pub name: &'static str,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Stable machine-matchable code, e.g. `"box-overfull"`.
    pub code: &'static str,
    pub severity: Severity,
    pub span: Option<Span>,
    pub message: String,
    pub details: Vec<Detail>,
}

impl Diagnostic {
    pub fn new(code: &'static str, severity: Severity, message: String) -> Diagnostic {
        Diagnostic {
            code,
            severity,
            span: None,
            message,
            details: Vec::new(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Diagnostic {
        self.span = Some(span);
        self
    }

    pub fn with_detail(mut self, name: &'static str, value: i64) -> Diagnostic {
        self.details.push(Detail { name, value });
        self
    }

    pub fn with_sp(self, name: &'static str, value: Scaled) -> Diagnostic {
        self.with_detail(name, value.0 as i64)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{severity}[{}]: {}", self.code, self.message)?;
        if let Some(span) = self.span {
            write!(f, " (bytes {}..{})", span.start, span.end)?;
        }
        for d in &self.details {
            write!(f, " {}={}", d.name, d.value)?;
        }
        Ok(())
    }
}

/// The job's diagnostic sink.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    /// (font, codepoint) pairs already warned about; missing glyphs warn
    /// once per pair.
    glyph_warned: Vec<(u32, u32)>,
}

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics::default()
    }

    pub fn push(&mut self, d: Diagnostic) {
        self.items.push(d);
    }

    pub fn missing_glyph(&mut self, font: u32, codepoint: u32) {
        if self.glyph_warned.contains(&(font, codepoint)) {
            return;
        }
        self.glyph_warned.push((font, codepoint));
        self.push(
            Diagnostic::new(
                "font-missing-glyph",
                Severity::Warning,
                format!("font {font} has no glyph for U+{codepoint:04X}; using .notdef"),
            )
            .with_detail("font", font as i64)
            .with_detail("codepoint", codepoint as i64),
        );
    }

    pub fn items(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Diagnostic> {
        self.items
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_glyph_warns_once_per_font_codepoint_pair() {
        let mut diags = Diagnostics::new();
        diags.missing_glyph(0, 0x1F4A9);
        diags.missing_glyph(0, 0x1F4A9);
        diags.missing_glyph(1, 0x1F4A9);
        assert_eq!(diags.items().len(), 2);
        assert!(diags.items().iter().all(|d| d.code == "font-missing-glyph"));
    }

    #[test]
    fn display_includes_code_and_details() {
        let d = Diagnostic::new("box-overfull", Severity::Warning, "line 3 overfull".into())
            .with_sp("overrun", Scaled(65536));
        assert_eq!(
            d.to_string(),
            "warning[box-overfull]: line 3 overfull overrun=65536"
        );
    }
}
