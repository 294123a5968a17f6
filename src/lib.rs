pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, CliConfig};
pub use crate::core::{client::OpenAiService, etl::EtlEngine, pipeline::ExtractionPipeline};
pub use utils::error::{EtlError, Result};
