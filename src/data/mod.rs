//! Data module - CSV loading and pipeline stages

mod loader;
mod pipeline;

pub use loader::{LoaderError, SourceEncoding, TableLoader};
pub use pipeline::{ListingsPipeline, PipelineError, RELEVANT_COLUMNS};
