//! Upload Options
//!
//! The work order sent alongside the audio file: target container format
//! plus the per-tool cleanup configuration. Tools the user did not enable
//! are absent from the serialized blob entirely; the server treats absence
//! as "not requested", never as "disabled with defaults".

use serde::{Deserialize, Serialize};

/// Output container/codec formats accepted by the cleanup server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Wav,
    Mp3,
    Flac,
    Ogg,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Wav => "wav",
            OutputFormat::Mp3 => "mp3",
            OutputFormat::Flac => "flac",
            OutputFormat::Ogg => "ogg",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizeOptions {
    pub enabled: bool,
    pub target_dbfs: f64,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self { enabled: true, target_dbfs: -16.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseReduceOptions {
    pub enabled: bool,
    pub strength: f64,
}

impl Default for NoiseReduceOptions {
    fn default() -> Self {
        Self { enabled: true, strength: 0.8 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighPassOptions {
    pub enabled: bool,
    pub cutoff_hz: u32,
}

impl Default for HighPassOptions {
    fn default() -> Self {
        Self { enabled: true, cutoff_hz: 80 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimSilenceOptions {
    pub enabled: bool,
    pub min_silence_ms: u32,
    pub insert_ms: u32,
}

impl Default for TrimSilenceOptions {
    fn default() -> Self {
        Self { enabled: true, min_silence_ms: 500, insert_ms: 250 }
    }
}

/// Per-tool cleanup configuration. `None` means the tool was not requested
/// and the key is omitted from the serialized blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanupOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalize: Option<NormalizeOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise_reduce: Option<NoiseReduceOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_pass: Option<HighPassOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trim_silence: Option<TrimSilenceOptions>,
}

/// The complete work order for one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadOptions {
    pub output_format: OutputFormat,
    pub cleanup: CleanupOptions,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Wav,
            cleanup: CleanupOptions::default(),
        }
    }
}
