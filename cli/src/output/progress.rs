//! indicatif spinners.

#![allow(clippy::expect_used)] // template is a literal

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// Steadily ticking spinner for waits of unknown length.
///
/// # Panics
///
/// Never in practice; the template is a constant.
#[must_use]
pub fn spinner(msg: &str) -> ProgressBar {
    let style = ProgressStyle::default_spinner()
        .tick_strings(TICKS)
        .template("  {spinner:.cyan} {msg}")
        .expect("valid template");
    let pb = ProgressBar::new_spinner()
        .with_style(style)
        .with_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Remove the spinner line; the caller prints the result.
pub fn finish_clear(pb: &ProgressBar) {
    pb.finish_and_clear();
}
