//! Terminal output: styled status lines, section headers, spinners.

pub mod progress;
pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::{OwoColorize as _, Style};
pub use reporter::TerminalReporter;
pub use styles::Styles;

use crate::domain::ServiceState;

/// Styling and verbosity shared by every command.
pub struct OutputContext {
    pub styles: Styles,
    /// stdout is a terminal.
    pub is_tty: bool,
    /// Only errors are printed.
    pub quiet: bool,
}

impl OutputContext {
    /// Colors are used only on a terminal, and never with `--no-color` or
    /// `NO_COLOR` set.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let mut styles = Styles::default();
        if !no_color && is_tty && std::env::var_os("NO_COLOR").is_none() {
            styles.colorize();
        }
        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Spinners only make sense on an interactive, non-quiet terminal.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    fn mark(&self, symbol: &str, style: Style, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", symbol.style(style));
        }
    }

    pub fn step(&self, msg: &str) {
        self.mark("→", self.styles.step, msg);
    }

    pub fn success(&self, msg: &str) {
        self.mark("✓", self.styles.success, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.mark("⚠", self.styles.warning, msg);
    }

    /// Written to stderr, even when quiet.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".style(self.styles.error));
    }

    pub fn info(&self, msg: &str) {
        self.mark("ℹ", self.styles.info, msg);
    }

    /// Blank line, then a styled title.
    pub fn header(&self, title: &str) {
        if !self.quiet {
            println!();
            println!("  {}", title.style(self.styles.header));
        }
    }

    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", key.style(self.styles.label));
        }
    }

    /// An indented shell command the operator can copy.
    pub fn command(&self, cmd: &str) {
        if !self.quiet {
            println!("    {}", cmd.style(self.styles.command));
        }
    }

    /// `unit  state`, green when active and yellow otherwise.
    pub fn service(&self, unit: &str, state: &ServiceState) {
        let style = if state.is_active() {
            self.styles.success
        } else {
            self.styles.warning
        };
        self.kv(unit, &state.to_string().style(style).to_string());
    }
}
