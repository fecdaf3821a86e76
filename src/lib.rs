pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliArgs, Command};
pub use config::AppConfig;

pub use adapters::fs::{JsonStateStore, LocalArtifactStore};
pub use adapters::http::{BiptDirectory, HttpTextProvider};
pub use crate::core::{etl::PipelineRunner, pipeline::InclusionPipeline, Pipeline};
pub use utils::error::{InclusionError, Result};
