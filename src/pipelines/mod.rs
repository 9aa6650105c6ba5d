//! Pipelines.
//!
//! [worker] processes a single file, [corpus] dispatches workers over a whole folder.
//! The module provides a light [Pipeline] trait.
pub mod corpus;
#[allow(clippy::module_inception)]
pub mod pipeline;
pub mod worker;

pub use corpus::{MergeCorpus, Summary, DEFAULT_WORKERS};
pub use pipeline::Pipeline;
pub use worker::{
    process_file, FileStats, MergeOptions, Outcome, DEFAULT_BATCH_SIZE, DEFAULT_THREADS,
};
