pub mod aggregator;
pub mod batcher;
pub mod client;
pub mod etl;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod reporter;
pub mod retry;
pub mod source;
pub mod summary;

pub use crate::domain::model::{
    BatchOutcome, BatchReport, EntityCategory, ExtractionReport, ExtractionResult,
    FrequencyTable, Record, SkipReason,
};
pub use crate::domain::ports::{
    CompletionRequest, ConfigProvider, ExtractionService, Pipeline, Storage,
};
pub use crate::utils::error::Result;
