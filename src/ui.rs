//! Dialog surface consumed by the updater
//!
//! The GUI frontends implement this; the updater never draws anything itself.

/// Narrow interface to whatever dialog toolkit the host application uses
pub trait DialogSurface: Send + Sync {
    /// Present a list of options and return the selected index, or `None` if
    /// the dialog was closed without a choice.
    fn present_choice(&self, message: &str, title: &str, options: &[&str]) -> Option<usize>;

    /// Present an error message.
    fn present_error(&self, message: &str, title: &str);

    /// Present a yes/no confirmation.
    fn present_confirm(&self, message: &str, title: &str) -> bool;
}

/// Dialog surface for non-interactive contexts: never answers, never confirms.
#[derive(Debug, Default)]
pub struct SilentDialog;

impl DialogSurface for SilentDialog {
    fn present_choice(&self, _message: &str, _title: &str, _options: &[&str]) -> Option<usize> {
        None
    }

    fn present_error(&self, _message: &str, _title: &str) {}

    fn present_confirm(&self, _message: &str, _title: &str) -> bool {
        false
    }
}
