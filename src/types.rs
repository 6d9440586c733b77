// Core job types and the error taxonomy shared across the crate.

/// State of a server-side cleanup job as reported by the status endpoint.
///
/// Wire states the server does not currently emit round-trip through
/// `Other` so the presenter can still render something sensible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Progress,
    Success,
    Failure,
    Other(String),
}

impl JobState {
    /// Parse a wire state string. Unknown states are preserved verbatim.
    pub fn from_wire(state: &str) -> Self {
        match state {
            "PENDING" => JobState::Pending,
            "PROGRESS" => JobState::Progress,
            "SUCCESS" => JobState::Success,
            "FAILURE" => JobState::Failure,
            other => JobState::Other(other.to_string()),
        }
    }

    /// A terminal job emits no further snapshots once observed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Success | JobState::Failure)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Pending => write!(f, "PENDING"),
            JobState::Progress => write!(f, "PROGRESS"),
            JobState::Success => write!(f, "SUCCESS"),
            JobState::Failure => write!(f, "FAILURE"),
            JobState::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Handle to one server-side unit of work, returned by a successful
/// submission. Immutable; owned by the active poll session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub task_id: String,
    pub status_url: String,
}

/// One point-in-time report of a job's state. Each poll produces a fresh
/// snapshot; snapshots are never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub state: JobState,
    /// Already normalized to 0..=100 at parse time.
    pub progress: u8,
    pub message: String,
    pub original_filename: Option<String>,
    pub download_url: Option<String>,
    pub result_filename: Option<String>,
    pub error_detail: Option<String>,
}

/// Normalize a raw progress value into 0..=100.
///
/// Missing or non-numeric values fall back to a state-derived default:
/// 100 for a successful job, 0 otherwise. Out-of-range values clamp.
pub fn clamp_progress(raw: Option<f64>, state: &JobState) -> u8 {
    let default = if matches!(state, JobState::Success) { 100.0 } else { 0.0 };
    let value = raw.unwrap_or(default);
    // NaN clamps to NaN and casts to 0, which is the defensive default anyway.
    value.clamp(0.0, 100.0) as u8
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Local input problem; surfaced as a UI warning, never sent anywhere.
    #[error("{0}")]
    Validation(String),

    /// The request could not complete or the body was unreadable.
    #[error("{0}")]
    Transport(String),

    /// The server rejected the submission with a structured error body.
    #[error("{message}")]
    ServerRejection { status: u16, message: String },

    /// A 2xx submission response carried neither a task id nor an error.
    #[error("Unexpected response from server.")]
    UnexpectedResponse,

    /// The status endpoint reported the job itself failed.
    #[error("{0}")]
    JobFailure(String),
}

pub type UploadResult<T> = std::result::Result<T, UploadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_wire_known_states() {
        assert_eq!(JobState::from_wire("PENDING"), JobState::Pending);
        assert_eq!(JobState::from_wire("PROGRESS"), JobState::Progress);
        assert_eq!(JobState::from_wire("SUCCESS"), JobState::Success);
        assert_eq!(JobState::from_wire("FAILURE"), JobState::Failure);
    }

    #[test]
    fn test_from_wire_unknown_state_preserved() {
        assert_eq!(
            JobState::from_wire("RETRY"),
            JobState::Other("RETRY".to_string())
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(JobState::Success.is_terminal());
        assert!(JobState::Failure.is_terminal());
        assert!(!JobState::Pending.is_terminal());
        assert!(!JobState::Progress.is_terminal());
        assert!(!JobState::Other("RETRY".to_string()).is_terminal());
    }

    #[test]
    fn test_clamp_progress_in_range() {
        assert_eq!(clamp_progress(Some(40.0), &JobState::Progress), 40);
        assert_eq!(clamp_progress(Some(0.0), &JobState::Pending), 0);
        assert_eq!(clamp_progress(Some(100.0), &JobState::Success), 100);
    }

    #[test]
    fn test_clamp_progress_out_of_range() {
        assert_eq!(clamp_progress(Some(-20.0), &JobState::Progress), 0);
        assert_eq!(clamp_progress(Some(250.0), &JobState::Progress), 100);
        assert_eq!(clamp_progress(Some(f64::NAN), &JobState::Progress), 0);
    }

    #[test]
    fn test_clamp_progress_missing_uses_state_default() {
        assert_eq!(clamp_progress(None, &JobState::Success), 100);
        assert_eq!(clamp_progress(None, &JobState::Pending), 0);
        assert_eq!(clamp_progress(None, &JobState::Failure), 0);
    }
}
