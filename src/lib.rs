//! Subgrab: resumable bulk downloader for video subtitles and audio.

pub mod batch;
pub mod engine;
pub mod fetch;
pub mod pipeline;
pub mod resume;
pub mod retrieval;
pub mod source;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use batch::run_batch;
pub use fetch::MediaFetcher;
pub use pipeline::{CancelToken, Coordinator, PipelineConfig, RunSummary, SubmitError};
pub use resume::{ResumeLog, load_completed};
pub use retrieval::retrieve;
pub use source::{ItemSource, load_manifest};

/// Result alias used by public subgrab API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;
