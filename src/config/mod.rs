pub mod cli;

use crate::core::batcher::DEFAULT_BATCH_SIZE;
use crate::core::client::{DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_REQUEST_TIMEOUT};
use crate::core::retry::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_url, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "lit-entity-etl"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Extract catalysis entities from paper abstracts and tally their frequency")
)]
pub struct CliConfig {
    #[cfg_attr(feature = "cli", arg(long, help = "CSV with 'Article Title' and 'Abstract' columns"))]
    pub input: String,

    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_BATCH_SIZE))]
    pub batch_size: usize,

    #[cfg_attr(feature = "cli", arg(long, default_value = DEFAULT_MODEL))]
    pub model: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "."))]
    pub output_path: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = DEFAULT_API_BASE))]
    pub api_base: String,

    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS))]
    pub max_attempts: u32,

    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_RETRY_DELAY.as_secs()))]
    pub retry_delay_secs: u64,

    #[cfg_attr(feature = "cli", arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs()))]
    pub timeout_secs: u64,

    #[cfg_attr(feature = "cli", arg(long, help = "Also write a JSON run summary with this file name"))]
    pub summary_file: Option<String>,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Log CPU and memory usage per phase"))]
    pub monitor: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Emit logs as JSON"))]
    pub log_json: bool,
}

impl CliConfig {
    /// 以預設值建立設定，只需指定輸入檔
    pub fn with_input(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            model: DEFAULT_MODEL.to_string(),
            output_path: ".".to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay_secs: DEFAULT_RETRY_DELAY.as_secs(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            summary_file: None,
            verbose: false,
            monitor: false,
            log_json: false,
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        validate_path("output_path", &self.output_path)?;
        validate_positive_number("batch_size", self.batch_size, 1)?;
        validate_positive_number("max_attempts", self.max_attempts as usize, 1)?;
        validate_positive_number("timeout_secs", self.timeout_secs as usize, 1)?;
        validate_non_empty_string("model", &self.model)?;
        validate_url("api_base", &self.api_base)?;
        if let Some(summary_file) = &self.summary_file {
            validate_path("summary_file", summary_file)?;
        }
        Ok(())
    }
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn summary_file(&self) -> Option<&str> {
        self.summary_file.as_deref()
    }
}
