//! Status Presenter
//!
//! Pure mapping from a status snapshot to display attributes. Holds no
//! state of its own; the controller calls it once per snapshot and hands
//! the result to the view surface.

use crate::types::{JobState, StatusSnapshot};

/// Visual weight of a status line, mirroring the alert palette the web
/// front end uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Danger,
    Warning,
}

/// What the view should render for one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    pub text: String,
    pub severity: Severity,
    pub progress_percent: u8,
}

impl DisplayState {
    pub fn info(text: impl Into<String>, progress_percent: u8) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Info,
            progress_percent,
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Warning,
            progress_percent: 0,
        }
    }
}

/// Link to a finished result.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadAffordance {
    pub url: String,
    pub filename: String,
}

/// Map a snapshot to its display state.
///
/// `fallback_filename` is the locally-known name, used until the server
/// reports its own `original_filename`.
pub fn present(snapshot: &StatusSnapshot, fallback_filename: Option<&str>) -> DisplayState {
    let filename = snapshot
        .original_filename
        .as_deref()
        .or(fallback_filename);

    let severity = match snapshot.state {
        JobState::Success => Severity::Success,
        JobState::Failure => Severity::Danger,
        JobState::Pending | JobState::Progress => Severity::Info,
        // Unknown states render as a warning rather than crashing.
        JobState::Other(_) => Severity::Warning,
    };

    let text = match snapshot.state {
        JobState::Pending | JobState::Progress => match filename {
            Some(name) => format!("{} for \"{}\"", snapshot.message, name),
            None => snapshot.message.clone(),
        },
        JobState::Failure => {
            let detail = snapshot
                .error_detail
                .as_deref()
                .unwrap_or("Processing failed.");
            match filename {
                Some(name) => format!("Error processing {}: {}", name, detail),
                None => detail.to_string(),
            }
        }
        _ => snapshot.message.clone(),
    };

    DisplayState {
        text,
        severity,
        progress_percent: snapshot.progress.min(100),
    }
}

/// A download link is offered only when the success snapshot carries both
/// a URL and a result filename; a malformed success simply yields nothing.
pub fn download_affordance(snapshot: &StatusSnapshot) -> Option<DownloadAffordance> {
    if snapshot.state != JobState::Success {
        return None;
    }
    match (&snapshot.download_url, &snapshot.result_filename) {
        (Some(url), Some(filename)) => Some(DownloadAffordance {
            url: url.clone(),
            filename: filename.clone(),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(state: JobState) -> StatusSnapshot {
        StatusSnapshot {
            state,
            progress: 0,
            message: "msg".to_string(),
            original_filename: None,
            download_url: None,
            result_filename: None,
            error_detail: None,
        }
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(present(&snapshot(JobState::Success), None).severity, Severity::Success);
        assert_eq!(present(&snapshot(JobState::Failure), None).severity, Severity::Danger);
        assert_eq!(present(&snapshot(JobState::Pending), None).severity, Severity::Info);
        assert_eq!(present(&snapshot(JobState::Progress), None).severity, Severity::Info);
        assert_eq!(
            present(&snapshot(JobState::Other("RETRY".to_string())), None).severity,
            Severity::Warning
        );
    }

    #[test]
    fn test_progress_text_includes_filename_suffix() {
        let mut s = snapshot(JobState::Progress);
        s.message = "Denoising".to_string();
        let display = present(&s, Some("clip.wav"));
        assert_eq!(display.text, "Denoising for \"clip.wav\"");
    }

    #[test]
    fn test_server_filename_preferred_over_fallback() {
        let mut s = snapshot(JobState::Progress);
        s.message = "Denoising".to_string();
        s.original_filename = Some("server.wav".to_string());
        let display = present(&s, Some("local.wav"));
        assert_eq!(display.text, "Denoising for \"server.wav\"");
    }

    #[test]
    fn test_failure_text_composition() {
        let mut s = snapshot(JobState::Failure);
        s.error_detail = Some("decode error".to_string());
        let display = present(&s, Some("clip.wav"));
        assert_eq!(display.text, "Error processing clip.wav: decode error");
    }

    #[test]
    fn test_failure_without_detail_uses_generic_message() {
        let s = snapshot(JobState::Failure);
        assert_eq!(present(&s, None).text, "Processing failed.");
        assert_eq!(
            present(&s, Some("clip.wav")).text,
            "Error processing clip.wav: Processing failed."
        );
    }

    #[test]
    fn test_download_affordance_requires_both_fields() {
        let mut s = snapshot(JobState::Success);
        assert_eq!(download_affordance(&s), None);

        s.download_url = Some("/download/t1.wav".to_string());
        assert_eq!(download_affordance(&s), None);

        s.result_filename = Some("t1.wav".to_string());
        let link = download_affordance(&s).unwrap();
        assert_eq!(link.url, "/download/t1.wav");
        assert_eq!(link.filename, "t1.wav");
    }

    #[test]
    fn test_no_affordance_for_non_success() {
        let mut s = snapshot(JobState::Progress);
        s.download_url = Some("/download/t1.wav".to_string());
        s.result_filename = Some("t1.wav".to_string());
        assert_eq!(download_affordance(&s), None);
    }
}
