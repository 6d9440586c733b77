//! Cleanup Service Client
//!
//! HTTP edge of the controller: submits the multipart work order to
//! `POST /upload` and fetches job status from `GET /status/{task_id}`.
//! Status responses are normalized defensively — the server may nest
//! progress detail under `info` or flatten it to the top level, and a
//! snapshot is produced either way.

use crate::options::UploadOptions;
use crate::types::{clamp_progress, JobHandle, JobState, StatusSnapshot, UploadError, UploadResult};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Structured error body returned by the server on rejection.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for the Audio Clarity cleanup service.
#[derive(Debug, Clone)]
pub struct CleanupClient {
    http: reqwest::Client,
    base_url: String,
}

impl CleanupClient {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: &str, request_timeout: Duration) -> UploadResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Submit one cleanup job: the file bytes, the output format, and the
    /// per-tool cleanup options as a JSON text field.
    pub async fn submit(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> UploadResult<JobHandle> {
        let cleanup_blob = serde_json::to_string(&options.cleanup)
            .map_err(|e| UploadError::Transport(format!("failed to encode cleanup options: {}", e)))?;

        let mime = mime_guess::from_path(file_name).first_or_octet_stream();
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime.as_ref())
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("output_format", options.output_format.as_str())
            .text("cleanup_options", cleanup_blob);

        let url = format!("{}/upload", self.base_url);
        info!(url = %url, file = %file_name, "Submitting cleanup job");

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        if !status.is_success() {
            // Prefer the server-provided message; fall back to the bare code.
            if let Ok(body) = serde_json::from_str::<ErrorBody>(&text) {
                return Err(UploadError::ServerRejection {
                    status: status.as_u16(),
                    message: body.error,
                });
            }
            return Err(UploadError::ServerRejection {
                status: status.as_u16(),
                message: format!("Server error: {}", status.as_u16()),
            });
        }

        let body: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| UploadError::Transport(format!("unparseable response body: {}", e)))?;

        let task_id = body.get("task_id").and_then(|v| v.as_str());
        let status_url = body.get("status_url").and_then(|v| v.as_str());

        match (task_id, status_url) {
            (Some(task_id), Some(status_url)) => {
                info!(task_id = %task_id, "Cleanup job accepted");
                Ok(JobHandle {
                    task_id: task_id.to_string(),
                    status_url: status_url.to_string(),
                })
            }
            _ => {
                if let Some(error) = body.get("error").and_then(|v| v.as_str()) {
                    return Err(UploadError::ServerRejection {
                        status: status.as_u16(),
                        message: error.to_string(),
                    });
                }
                Err(UploadError::UnexpectedResponse)
            }
        }
    }

    /// Fetch the current status snapshot for a job.
    ///
    /// Any failure here is a transient transport problem from the caller's
    /// point of view, never a statement about the job itself.
    pub async fn fetch_status(&self, handle: &JobHandle) -> UploadResult<StatusSnapshot> {
        let url = self.absolute(&handle.status_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Transport(format!(
                "status endpoint returned {}",
                status.as_u16()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| UploadError::Transport(format!("unparseable status body: {}", e)))?;

        let snapshot = parse_status(&body);
        debug!(task_id = %handle.task_id, state = %snapshot.state, progress = snapshot.progress, "Status snapshot");
        Ok(snapshot)
    }

    fn absolute(&self, path_or_url: &str) -> String {
        if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            path_or_url.to_string()
        } else {
            format!("{}/{}", self.base_url, path_or_url.trim_start_matches('/'))
        }
    }
}

/// Normalize a raw status body into a snapshot.
///
/// Fields are looked up under `info` first, then at the top level, then
/// fall back to state-derived defaults. The failure detail resolution
/// order matches the server: `info.status_message`, `info.error_details`,
/// top-level `status_message`, top-level `error_details`.
pub(crate) fn parse_status(body: &serde_json::Value) -> StatusSnapshot {
    let state = body
        .get("state")
        .and_then(|v| v.as_str())
        .map(JobState::from_wire)
        .unwrap_or_else(|| JobState::Other("UNKNOWN".to_string()));

    let info = body.get("info");
    let field = |name: &str| {
        info.and_then(|i| i.get(name))
            .or_else(|| body.get(name))
    };

    let message = field("status")
        .and_then(|v| v.as_str())
        .map(String::from)
        .unwrap_or_else(|| format!("Task is {}", state));

    let progress = clamp_progress(field("progress").and_then(|v| v.as_f64()), &state);

    let original_filename = field("original_filename")
        .and_then(|v| v.as_str())
        .map(String::from);

    let download_url = field("download_url")
        .and_then(|v| v.as_str())
        .map(String::from);

    let result_filename = field("result_filename")
        .and_then(|v| v.as_str())
        .map(String::from);

    let error_detail = info
        .and_then(|i| i.get("status_message"))
        .or_else(|| info.and_then(|i| i.get("error_details")))
        .or_else(|| body.get("status_message"))
        .or_else(|| body.get("error_details"))
        .and_then(|v| v.as_str())
        .map(String::from);

    StatusSnapshot {
        state,
        progress,
        message,
        original_filename,
        download_url,
        result_filename,
        error_detail,
    }
}
