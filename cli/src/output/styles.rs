//! Terminal stylesheet built on owo-colors.

use owo_colors::Style;

/// Colors for every kind of line pitunnel prints. All plain by default.
#[derive(Default, Clone)]
pub struct Styles {
    /// Stage arrow.
    pub step: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub info: Style,
    /// Keys in key/value listings.
    pub label: Style,
    /// Copy-paste shell commands.
    pub command: Style,
    /// Section titles.
    pub header: Style,
}

impl Styles {
    /// Switch to the colored palette.
    pub fn colorize(&mut self) {
        *self = Self {
            step: Style::new().cyan(),
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red(),
            info: Style::new().blue(),
            label: Style::new().dimmed(),
            command: Style::new().bold(),
            header: Style::new().bold().cyan(),
        };
    }
}
