//! Pipeline components: context, workers, writer, coordinator.

pub mod context;
pub mod orchestrator;
pub mod worker;
pub mod writer;

pub use context::{
    CancelToken, ItemResult, PipelineConfig, ResultObserver, RunSummary, worker_name,
};
pub use orchestrator::{Coordinator, SubmitError};
pub use worker::spawn_workers;
pub use writer::{WriterParams, spawn_writer, writer_loop};
