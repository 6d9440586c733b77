//! Upload Controller
//!
//! Top-level orchestrator for one submission surface: validates input,
//! locks the form, submits the work order, and folds the poll session's
//! event stream into presenter and view updates. Owns the single active
//! `PollSession`; starting a new submission tears the old session down
//! before installing its replacement, so only one timer is ever counting
//! down and no stale snapshot can reach the view.

use crate::client::CleanupClient;
use crate::options::UploadOptions;
use crate::poller::{PollEvent, PollSession};
use crate::presenter::{self, DisplayState};
use crate::types::{JobState, StatusSnapshot, UploadError};
use crate::view::{FormGate, ViewSurface};
use std::time::Duration;
use tracing::{info, warn};

/// Progress shown immediately after the server accepts a job, before the
/// first poll has reported anything.
pub const QUEUED_PROGRESS: u8 = 5;

const NO_FILE_MESSAGE: &str = "Please select an audio file to process.";
const TRANSIENT_MESSAGE: &str = "Error fetching status. Will retry.";

/// A file chosen for upload: its display name and raw bytes.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

pub struct UploadController<V: ViewSurface> {
    client: CleanupClient,
    view: V,
    gate: FormGate,
    poll_interval: Duration,
    session: Option<PollSession>,
    fallback_filename: Option<String>,
}

impl<V: ViewSurface> UploadController<V> {
    pub fn new(client: CleanupClient, view: V, poll_interval: Duration) -> Self {
        Self {
            client,
            view,
            gate: FormGate::new(),
            poll_interval,
            session: None,
            fallback_filename: None,
        }
    }

    /// Submit one cleanup job. Returns whether a poll session was started.
    ///
    /// A missing file fails locally with a UI warning and performs no
    /// network activity; the form stays enabled. Any submission-time
    /// failure unlocks the form before returning.
    pub async fn submit(
        &mut self,
        file: Option<UploadFile>,
        options: &UploadOptions,
    ) -> bool {
        let Some(file) = file else {
            self.view.render_status(&DisplayState::warning(NO_FILE_MESSAGE));
            return false;
        };

        // Replace-before-discard: the old session is fully torn down before
        // anything about the new attempt becomes visible.
        self.teardown_session();
        self.view.clear_results();
        self.gate
            .set_busy(&mut self.view, true, Some("Preparing audio..."));
        self.view
            .render_status(&DisplayState::info("Uploading your audio file... Please wait.", 0));

        match self.client.submit(&file.name, file.bytes, options).await {
            Ok(handle) => {
                info!(task_id = %handle.task_id, file = %file.name, "Job accepted, starting poll session");
                self.view.render_status(&DisplayState::info(
                    "Upload complete! Cleaning audio...",
                    QUEUED_PROGRESS,
                ));
                self.fallback_filename = Some(file.name);
                self.session = Some(PollSession::start(
                    self.client.clone(),
                    handle,
                    self.poll_interval,
                ));
                true
            }
            Err(err) => {
                let message = match &err {
                    UploadError::Transport(reason) => format!("Upload failed: {}", reason),
                    other => other.to_string(),
                };
                warn!(error = %err, "Submission failed");
                self.view.show_error(&message);
                self.gate.set_busy(&mut self.view, false, None);
                false
            }
        }
    }

    /// Wait for the active session to reach a terminal outcome, rendering
    /// every snapshot along the way. Returns the terminal snapshot, or
    /// `None` if no session is active or it was cancelled.
    pub async fn run_to_completion(&mut self) -> Option<StatusSnapshot> {
        while self.session.is_some() {
            if let Some(terminal) = self.step().await {
                return Some(terminal);
            }
        }
        None
    }

    /// Process the next poll event. Returns the terminal snapshot once the
    /// session finishes, `None` after a non-terminal event.
    pub async fn step(&mut self) -> Option<StatusSnapshot> {
        let event = match self.session.as_mut() {
            Some(session) => session.next_event().await,
            None => return None,
        };
        match event {
            Some(event) => self.handle_event(event),
            None => {
                // Channel closed without a terminal snapshot: the session
                // was cancelled out from under us.
                self.session = None;
                None
            }
        }
    }

    /// Cancel any active session without touching the form state.
    pub fn cancel(&mut self) {
        self.teardown_session();
    }

    pub fn active_task_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.handle().task_id.as_str())
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    fn handle_event(&mut self, event: PollEvent) -> Option<StatusSnapshot> {
        match event {
            PollEvent::Transient(_) => {
                // A failed poll is not progress information: the form stays
                // locked and the session keeps ticking.
                self.view.show_transient(TRANSIENT_MESSAGE);
                None
            }
            PollEvent::Snapshot(snapshot) => {
                let display = presenter::present(&snapshot, self.fallback_filename.as_deref());
                self.view.render_status(&display);

                if !snapshot.state.is_terminal() {
                    return None;
                }

                self.teardown_session();
                match snapshot.state {
                    JobState::Success => {
                        if let Some(link) = presenter::download_affordance(&snapshot) {
                            self.view.show_download(&link);
                        } else {
                            // Degraded success: terminal, unlocked, but no
                            // link can be offered.
                            warn!("SUCCESS snapshot missing download info, no link offered");
                        }
                    }
                    JobState::Failure => {
                        self.view.show_error(&display.text);
                    }
                    _ => unreachable!("non-terminal state after is_terminal check"),
                }
                self.gate.set_busy(&mut self.view, false, None);
                Some(snapshot)
            }
        }
    }

    fn teardown_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.cancel();
        }
    }
}
