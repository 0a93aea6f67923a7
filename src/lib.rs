pub mod config;
pub mod errors;
pub mod loader;
pub mod parser;
pub mod pipeline;
pub mod preprocessing;
pub mod probe;
pub mod setup;
pub mod telemetry;
pub mod writer;

pub use config::PipelineConfig;
pub use pipeline::{run, RunSummary};
