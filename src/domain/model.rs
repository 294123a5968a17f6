use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// 一篇文獻：標題與摘要，載入後不再變動
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
}

impl Record {
    pub fn new(title: impl Into<String>, abstract_text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            abstract_text: abstract_text.into(),
        }
    }
}

/// One batch's decoded service response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub binary_systems: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub intermediates: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub descriptors: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    BinarySystems,
    Intermediates,
    Descriptors,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 3] = [
        EntityCategory::BinarySystems,
        EntityCategory::Intermediates,
        EntityCategory::Descriptors,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            EntityCategory::BinarySystems => "binary_systems_frequency.csv",
            EntityCategory::Intermediates => "intermediates_frequency.csv",
            EntityCategory::Descriptors => "descriptors_frequency.csv",
        }
    }

    pub fn label_column(&self) -> &'static str {
        match self {
            EntityCategory::BinarySystems => "Binary System",
            EntityCategory::Intermediates => "Intermediate",
            EntityCategory::Descriptors => "Descriptor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    ExtractionFailed { attempts: u32, last_error: String },
    ParseFailed { message: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::ExtractionFailed {
                attempts,
                last_error,
            } => write!(f, "extraction failed after {} attempts: {}", attempts, last_error),
            SkipReason::ParseFailed { message } => write!(f, "unparseable response: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Processed(ExtractionResult),
    Skipped(SkipReason),
}

impl BatchOutcome {
    pub fn is_processed(&self) -> bool {
        matches!(self, BatchOutcome::Processed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// 從 1 開始
    pub index: usize,
    pub record_count: usize,
    pub outcome: BatchOutcome,
}

/// (label, count) rows ordered by count, highest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    pub category: EntityCategory,
    pub rows: Vec<(String, u64)>,
}

/// Transform 階段的產出，交給 load 寫檔
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    pub started_at: DateTime<Utc>,
    pub total_records: usize,
    pub batches: Vec<BatchReport>,
    pub tables: Vec<FrequencyTable>,
}

impl ExtractionReport {
    pub fn processed_count(&self) -> usize {
        self.batches
            .iter()
            .filter(|b| b.outcome.is_processed())
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.batches.len() - self.processed_count()
    }

    pub fn table(&self, category: EntityCategory) -> Option<&FrequencyTable> {
        self.tables.iter().find(|t| t.category == category)
    }
}
