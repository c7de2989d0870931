use crate::ParseMessage;
use crate::ui::{Icons, theme};
use indicatif::{HumanDuration, ProgressBar};
use owo_colors::OwoColorize;
use std::time::Duration;

/// Progress bar for batch parsing, hidden when stdout is not a terminal.
pub struct ParseProgress {
    bar: ProgressBar,
}

impl ParseProgress {
    pub fn new(total_files: usize) -> Self {
        let bar = if console::Term::stdout().is_term() && !crate::output::is_quiet() {
            ProgressBar::new(total_files as u64).with_message("Parsing files")
        } else {
            ProgressBar::hidden()
        };
        Self { bar }
    }

    pub fn observe(&self, msg: &ParseMessage) {
        match msg {
            ParseMessage::Parsed(report) => {
                self.bar.set_message(format!("Parsed: {}", report.path.display()));
            }
            ParseMessage::Error(path, _) => {
                self.bar.set_message(format!("Failed: {}", path));
            }
        }
        self.bar.inc(1);
    }

    pub fn finish_with_summary(&self, duration: Duration, files: usize, errors: usize) {
        self.bar.finish_and_clear();
        println!(
            "{} {}",
            Icons::CHECK.style(theme().success.clone()),
            format!("Parsed in {}", HumanDuration(duration)).style(theme().success.clone())
        );
        println!(
            "  {} {}  {} {}",
            Icons::FILE.style(theme().info.clone()),
            files,
            Icons::CROSS.style(theme().info.clone()),
            errors
        );
    }
}
