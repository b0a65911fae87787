//! Pipeline progress on the terminal.

use std::sync::Mutex;

use indicatif::ProgressBar;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, progress};

/// Prints stage lines through an [`OutputContext`] and mirrors each one to
/// the debug log, so `-v` output interleaves with the command traces.
///
/// Waits show a spinner on an interactive terminal and a plain step line
/// otherwise.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    spinner: Mutex<Option<ProgressBar>>,
}

impl<'a> TerminalReporter<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            spinner: Mutex::new(None),
        }
    }

    fn clear_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock()
            && let Some(pb) = slot.take()
        {
            progress::finish_clear(&pb);
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        tracing::debug!(target: "pitunnel_cli::stage", "{message}");
        self.ctx.step(message);
    }

    fn success(&self, message: &str) {
        tracing::debug!(target: "pitunnel_cli::stage", "{message}");
        self.clear_spinner();
        self.ctx.success(message);
    }

    fn warn(&self, message: &str) {
        tracing::debug!(target: "pitunnel_cli::stage", "{message}");
        self.clear_spinner();
        self.ctx.warn(message);
    }

    fn wait(&self, message: &str) {
        tracing::debug!(target: "pitunnel_cli::stage", "{message}");
        if !self.ctx.show_progress() {
            self.ctx.step(message);
            return;
        }
        self.clear_spinner();
        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(progress::spinner(message));
        }
    }
}
