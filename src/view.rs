//! View Surface
//!
//! The external collaborator contract: everything the controller writes to
//! the user-facing layer goes through `ViewSurface`, so the controller
//! never reads its own prior state back out of a view. The binary ships a
//! terminal implementation; tests use a recording one.

use crate::presenter::{DisplayState, DownloadAffordance, Severity};
use tracing::warn;

pub const IDLE_SUBMIT_LABEL: &str = "Clean & Process Audio";
pub const BUSY_SUBMIT_LABEL: &str = "Cleaning Audio...";

/// Write-only interface to the presentation layer.
pub trait ViewSurface {
    /// Update the status line and progress indicator.
    fn render_status(&mut self, state: &DisplayState);
    /// Show the download link for a finished job.
    fn show_download(&mut self, link: &DownloadAffordance);
    /// Show a terminal error in the error panel.
    fn show_error(&mut self, message: &str);
    /// Show a transient warning banner without touching job state.
    fn show_transient(&mut self, message: &str);
    /// Enable or disable the submission controls and set the action label.
    fn set_controls_enabled(&mut self, enabled: bool, submit_label: &str);
    /// Clear any previous result link or error panel content.
    fn clear_results(&mut self);
}

/// Idempotent busy-flag wrapper over the view's submission surface.
/// Repeated calls with the same value never reach the view.
#[derive(Debug, Default)]
pub struct FormGate {
    busy: bool,
}

impl FormGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_busy(&mut self, view: &mut dyn ViewSurface, busy: bool, label: Option<&str>) {
        if self.busy == busy {
            return;
        }
        self.busy = busy;
        let label = if busy {
            label.unwrap_or(BUSY_SUBMIT_LABEL)
        } else {
            IDLE_SUBMIT_LABEL
        };
        view.set_controls_enabled(!busy, label);
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }
}

/// Terminal view used by the CLI binary.
#[derive(Debug, Default)]
pub struct ConsoleView;

impl ViewSurface for ConsoleView {
    fn render_status(&mut self, state: &DisplayState) {
        let marker = match state.severity {
            Severity::Info => " ",
            Severity::Success => "+",
            Severity::Danger => "!",
            Severity::Warning => "?",
        };
        println!("[{}] {:>3}% {}", marker, state.progress_percent, state.text);
    }

    fn show_download(&mut self, link: &DownloadAffordance) {
        println!("Download cleaned audio: {} ({})", link.filename, link.url);
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("error: {}", message);
    }

    fn show_transient(&mut self, message: &str) {
        warn!("{}", message);
    }

    fn set_controls_enabled(&mut self, _enabled: bool, _submit_label: &str) {
        // A one-shot CLI has no form to lock.
    }

    fn clear_results(&mut self) {}
}
