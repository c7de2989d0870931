use crate::parse::{Diagnostic, DiagnosticKind};
use owo_colors::{OwoColorize, Style};
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub info: Style,
    pub dim: Style,
    /// Source file paths in parse reports
    pub path: Style,
    /// `line:column` prefix of a diagnostic
    pub location: Style,
    /// Offending source text or the missing node kind
    pub snippet: Style,
}

impl Theme {
    /// Colors only when stdout is a terminal and `NO_COLOR` is unset.
    pub fn detect() -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self::for_terminal(console::Term::stdout().is_term(), no_color)
    }

    pub fn for_terminal(is_term: bool, no_color: bool) -> Self {
        if is_term && !no_color {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            warn: Style::new().yellow().bold(),
            info: Style::new().magenta(),
            dim: Style::new().white().dimmed(),
            path: Style::new().bold().underline(),
            location: Style::new().blue(),
            snippet: Style::new().yellow(),
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            error: Style::new(),
            warn: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            path: Style::new(),
            location: Style::new(),
            snippet: Style::new(),
        }
    }

    /// A diagnostic as printed under its file. Uncolored output matches the
    /// diagnostic's `Display`.
    pub fn diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let location = format!("{}:{}:", diagnostic.line, diagnostic.column);
        let (message, snippet) = match &diagnostic.kind {
            DiagnosticKind::Error => ("syntax error near", diagnostic.text.as_str()),
            DiagnosticKind::Missing(kind) => ("missing", kind.as_str()),
        };
        format!(
            "{} {} `{}`",
            location.style(self.location.clone()),
            message.style(self.error.clone()),
            snippet.style(self.snippet.clone())
        )
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Diagnostic> {
        vec![
            Diagnostic {
                kind: DiagnosticKind::Error,
                line: 2,
                column: 5,
                text: "ret )".to_string(),
            },
            Diagnostic {
                kind: DiagnosticKind::Missing("}".to_string()),
                line: 9,
                column: 1,
                text: String::new(),
            },
        ]
    }

    #[test]
    fn test_plain_diagnostic_matches_display() {
        let theme = Theme::plain();
        for d in sample() {
            assert_eq!(theme.diagnostic(&d), d.to_string());
        }
    }

    #[test]
    fn test_colored_diagnostic_is_styled() {
        let d = &sample()[0];
        let rendered = Theme::colored().diagnostic(d);
        assert!(rendered.contains('\u{1b}'));
        assert!(rendered.contains("ret )"));
        assert_ne!(rendered, d.to_string());
    }

    #[test]
    fn test_no_color_disables_styles() {
        let d = &sample()[1];
        assert_eq!(Theme::for_terminal(true, true).diagnostic(d), d.to_string());
        assert_eq!(Theme::for_terminal(false, false).diagnostic(d), d.to_string());
        assert_ne!(Theme::for_terminal(true, false).diagnostic(d), d.to_string());
    }
}
