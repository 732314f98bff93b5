//! Styled terminal output for the startup summary and fatal errors.

use std::fmt::Display;
use std::net::SocketAddr;

use console::{Style, Term};

/// Width of the label column in the startup summary.
const LABEL_WIDTH: usize = 12;

/// Terminal output formatter writing to stderr.
pub(crate) struct Output {
    term: Term,
    label: Style,
    accent: Style,
    enabled: Style,
    warning: Style,
    error: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            label: Style::new().dim(),
            accent: Style::new().cyan().bold(),
            enabled: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
        }
    }

    /// Print the first line of the startup summary.
    pub(crate) fn banner(&self, addr: SocketAddr) {
        self.line(format!(
            "{} serving at {}",
            self.accent.apply_to("devsite"),
            self.accent.apply_to(format!("http://{addr}"))
        ));
    }

    /// Print one `label value` row of the startup summary.
    pub(crate) fn field(&self, label: &str, value: impl Display) {
        self.line(format!(
            "  {} {value}",
            self.label.apply_to(format!("{label:<LABEL_WIDTH$}"))
        ));
    }

    /// Print the live reload row.
    pub(crate) fn live_reload(&self, enabled: bool) {
        if enabled {
            self.field("live reload", self.enabled.apply_to("enabled"));
        } else {
            self.field("live reload", self.label.apply_to("disabled"));
        }
    }

    /// Print a warning.
    pub(crate) fn warning(&self, msg: &str) {
        self.line(self.warning.apply_to(format!("warning: {msg}")));
    }

    /// Print a fatal error.
    pub(crate) fn error(&self, err: &dyn Display) {
        self.line(format!("{} {err}", self.error.apply_to("error:")));
    }

    fn line(&self, msg: impl Display) {
        // Nothing useful to do if stderr is gone.
        let _ = self.term.write_line(&msg.to_string());
    }
}
