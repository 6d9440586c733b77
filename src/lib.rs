// Clarity Client - job-lifecycle controller for the Audio Clarity cleanup service

pub mod client;
pub mod config;
pub mod controller;
pub mod options;
pub mod poller;
pub mod presenter;
pub mod types;
pub mod view;

// Re-exports for convenience
pub use client::CleanupClient;
pub use config::Config;
pub use controller::{UploadController, UploadFile};
pub use options::UploadOptions;
pub use poller::{PollEvent, PollSession, DEFAULT_POLL_INTERVAL};
pub use types::{JobHandle, JobState, StatusSnapshot, UploadError, UploadResult};
