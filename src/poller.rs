//! Task Poller
//!
//! Owns the repeating-timer lifecycle for one job handle. A `PollSession`
//! is a spawned task that fetches status on a fixed period and delivers
//! events over a channel until a terminal state is observed or the session
//! is cancelled. At most one session exists per controller; the controller
//! tears the old one down before installing a replacement.

use crate::client::CleanupClient;
use crate::types::{JobHandle, StatusSnapshot};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Default polling period, matching the service's expected cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2500);

/// An event delivered by a running poll session.
#[derive(Debug, Clone)]
pub enum PollEvent {
    /// A fresh status snapshot from the server.
    Snapshot(StatusSnapshot),
    /// One poll request failed; the session stays alive and retries.
    Transient(String),
}

/// Live binding between a job handle and a running poll timer.
///
/// Cancellation is cooperative and idempotent: the flag is checked before
/// every delivery, so a response already in flight when `cancel` is called
/// is discarded rather than observed.
#[derive(Debug)]
pub struct PollSession {
    handle: JobHandle,
    events: mpsc::Receiver<PollEvent>,
    cancelled: Arc<AtomicBool>,
    task: tokio::task::JoinHandle<()>,
}

impl PollSession {
    /// Start polling `handle` every `period`. The first request goes out
    /// one full period after start, never immediately.
    pub fn start(client: CleanupClient, handle: JobHandle, period: Duration) -> Self {
        let (tx, events) = mpsc::channel(16);
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let job = handle.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // tokio intervals fire immediately; swallow the first tick so the
            // session waits a full period before its first request.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                // One request outstanding at a time: the tick is awaited,
                // then the request, never both concurrently.
                match client.fetch_status(&job).await {
                    Ok(snapshot) => {
                        let terminal = snapshot.state.is_terminal();
                        if flag.load(Ordering::SeqCst) {
                            break;
                        }
                        if tx.send(PollEvent::Snapshot(snapshot)).await.is_err() {
                            break;
                        }
                        if terminal {
                            debug!(task_id = %job.task_id, "Terminal snapshot delivered, poller stopping");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(task_id = %job.task_id, error = %e, "Poll request failed, will retry");
                        if flag.load(Ordering::SeqCst) {
                            break;
                        }
                        if tx.send(PollEvent::Transient(e.to_string())).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            handle,
            events,
            cancelled,
            task,
        }
    }

    /// The job handle this session is bound to.
    pub fn handle(&self) -> &JobHandle {
        &self.handle
    }

    /// Receive the next event. Returns `None` once the session has stopped
    /// (terminal snapshot delivered, or cancelled).
    pub async fn next_event(&mut self) -> Option<PollEvent> {
        if self.cancelled.load(Ordering::SeqCst) {
            return None;
        }
        self.events.recv().await
    }

    /// Stop the session. Safe to call more than once; an already-stopped
    /// session is left alone. No event is observable after this returns:
    /// the channel is closed and anything already buffered is discarded.
    pub fn cancel(&mut self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            self.task.abort();
            debug!(task_id = %self.handle.task_id, "Poll session cancelled");
        }
        self.events.close();
        while self.events.try_recv().is_ok() {}
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for PollSession {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JobState;

    fn test_client(base_url: &str) -> CleanupClient {
        CleanupClient::new(base_url, Duration::from_secs(5)).unwrap()
    }

    fn test_handle() -> JobHandle {
        JobHandle {
            task_id: "t1".to_string(),
            status_url: "/status/t1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_terminal_snapshot_delivered_exactly_once_then_stops() {
        let mut server = mockito::Server::new_async().await;
        let _status = server
            .mock("GET", "/status/t1")
            .with_status(200)
            .with_body(r#"{"state": "SUCCESS", "download_url": "/download/t1.wav", "result_filename": "t1.wav"}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let mut session =
            PollSession::start(client, test_handle(), Duration::from_millis(10));

        let mut snapshots = Vec::new();
        while let Some(event) = session.next_event().await {
            if let PollEvent::Snapshot(s) = event {
                snapshots.push(s);
            }
        }
        // Channel closed right after the terminal snapshot: exactly one.
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].state, JobState::Success);
    }

    #[tokio::test]
    async fn test_transient_failures_keep_session_alive() {
        // Nothing listens here; every poll is a transport failure.
        let client = test_client("http://127.0.0.1:1");
        let handle = JobHandle {
            task_id: "t1".to_string(),
            status_url: "http://127.0.0.1:1/status/t1".to_string(),
        };
        let mut session = PollSession::start(client, handle, Duration::from_millis(10));

        // Two consecutive transient events prove the timer survived the
        // first failure and fired again.
        for _ in 0..2 {
            match session.next_event().await {
                Some(PollEvent::Transient(_)) => {}
                other => panic!("expected transient event, got {:?}", other),
            }
        }
        assert!(!session.is_cancelled());
        session.cancel();
    }

    #[tokio::test]
    async fn test_no_events_after_cancel() {
        let mut server = mockito::Server::new_async().await;
        let _status = server
            .mock("GET", "/status/t1")
            .with_status(200)
            .with_body(r#"{"state": "PROGRESS", "info": {"progress": 10}}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let mut session =
            PollSession::start(client, test_handle(), Duration::from_millis(10));

        session.cancel();
        assert!(session.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_buffered_events_discarded_on_cancel() {
        let mut server = mockito::Server::new_async().await;
        let _status = server
            .mock("GET", "/status/t1")
            .with_status(200)
            .with_body(r#"{"state": "PROGRESS", "info": {"progress": 10}}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let mut session =
            PollSession::start(client, test_handle(), Duration::from_millis(5));

        // Let several snapshots queue up in the channel before cancelling.
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.cancel();
        assert!(session.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let client = test_client("http://127.0.0.1:1");
        let handle = JobHandle {
            task_id: "t1".to_string(),
            status_url: "http://127.0.0.1:1/status/t1".to_string(),
        };
        let mut session = PollSession::start(client, handle, Duration::from_millis(10));
        session.cancel();
        session.cancel();
        assert!(session.is_cancelled());
    }

    #[tokio::test]
    async fn test_non_terminal_snapshots_keep_flowing() {
        let mut server = mockito::Server::new_async().await;
        let _status = server
            .mock("GET", "/status/t1")
            .with_status(200)
            .with_body(r#"{"state": "PROGRESS", "info": {"progress": 40, "status": "Denoising"}}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let mut session =
            PollSession::start(client, test_handle(), Duration::from_millis(10));

        for _ in 0..3 {
            match session.next_event().await {
                Some(PollEvent::Snapshot(s)) => {
                    assert_eq!(s.state, JobState::Progress);
                    assert_eq!(s.progress, 40);
                }
                other => panic!("expected snapshot, got {:?}", other),
            }
        }
        session.cancel();
    }
}
