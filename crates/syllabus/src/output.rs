//! Colored terminal output for check results.

use console::{Style, Term};
use syllabus_config::SidebarWarning;

/// Status reporter writing to stderr, so exported JSON on stdout stays clean.
pub(crate) struct Output {
    term: Term,
    heading: Style,
    ok: Style,
    warn: Style,
    failure: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            heading: Style::new().cyan().bold(),
            ok: Style::new().green(),
            warn: Style::new().yellow(),
            failure: Style::new().red(),
        }
    }

    fn line(&self, style: Option<&Style>, msg: &str) {
        let text = match style {
            Some(style) => style.apply_to(msg).to_string(),
            None => msg.to_owned(),
        };
        let _ = self.term.write_line(&text);
    }

    pub(crate) fn info(&self, msg: &str) {
        self.line(None, msg);
    }

    pub(crate) fn highlight(&self, msg: &str) {
        self.line(Some(&self.heading), msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.line(Some(&self.ok), msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(Some(&self.failure), msg);
    }

    /// Print one yellow line per sidebar warning, then a count.
    pub(crate) fn warnings(&self, warnings: &[SidebarWarning]) {
        for warning in warnings {
            self.line(Some(&self.warn), &format!("Warning: {warning}"));
        }
        if !warnings.is_empty() {
            self.line(
                Some(&self.warn),
                &format!("{} sidebar warning(s)", warnings.len()),
            );
        }
    }
}
