pub mod config;
pub mod core;
pub mod domain;
pub mod render;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{source::LocalLogSource, toml_config::TomlConfig, SummaryOptions};
pub use core::{engine::SummaryEngine, pipeline::SummaryPipeline};
pub use domain::ports::{ColorChoice, OutputFormat};
pub use utils::error::{Result, SummaryError};
