//! Colored terminal output on stderr.

use std::fmt::Display;

use console::{Style, Term};

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    dim: Style,
    green: Style,
    yellow: Style,
    red: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            dim: Style::new().dim(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    // Write failures on stderr are ignored.
    fn line(&self, text: impl Display) {
        let _ = self.term.write_line(&text.to_string());
    }

    pub(crate) fn info(&self, msg: &str) {
        self.line(msg);
    }

    /// Print an aligned `label: value` line with a dimmed label.
    pub(crate) fn field(&self, label: &str, value: impl Display) {
        let label = format!("{label:>12}:");
        self.line(format_args!("{} {value}", self.dim.apply_to(label)));
    }

    pub(crate) fn success(&self, msg: &str) {
        self.line(self.green.apply_to(msg));
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.line(self.yellow.apply_to(msg));
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(self.red.apply_to(msg));
    }
}
