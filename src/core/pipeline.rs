use crate::core::aggregator::Aggregator;
use crate::core::batcher::make_batches;
use crate::core::client::ExtractionClient;
use crate::core::parser::parse_response;
use crate::core::prompt::build_prompt;
use crate::core::reporter::write_tables;
use crate::core::retry::RetryPolicy;
use crate::core::source::load_records_from_path;
use crate::core::summary::RunSummary;
use crate::core::{
    BatchOutcome, BatchReport, ConfigProvider, ExtractionReport, ExtractionService, Pipeline,
    Record, SkipReason, Storage,
};
use crate::utils::error::{EtlError, Result};
use chrono::Utc;

/// 讀取文獻、分批送交抽取服務、彙整頻率並輸出三張表
pub struct ExtractionPipeline<S: Storage, C: ConfigProvider, X: ExtractionService> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) client: ExtractionClient<X>,
}

impl<S: Storage, C: ConfigProvider, X: ExtractionService> ExtractionPipeline<S, C, X> {
    pub fn new(storage: S, config: C, service: X) -> Self {
        let retry = RetryPolicy::new(config.max_attempts(), config.retry_delay());
        let client =
            ExtractionClient::new(service, config.model(), config.request_timeout(), retry);
        Self {
            storage,
            config,
            client,
        }
    }

    /// Runs one batch through prompt → service → parser. Failures become a skip, never an error.
    pub async fn process_batch(&self, batch: &[Record]) -> BatchOutcome {
        let prompt = build_prompt(batch);

        let text = match self.client.extract(&prompt).await {
            Ok(text) => text,
            Err(EtlError::ExtractionFailed {
                attempts,
                last_error,
            }) => {
                return BatchOutcome::Skipped(SkipReason::ExtractionFailed {
                    attempts,
                    last_error,
                })
            }
            Err(other) => {
                return BatchOutcome::Skipped(SkipReason::ExtractionFailed {
                    attempts: 0,
                    last_error: other.to_string(),
                })
            }
        };

        match parse_response(&text) {
            Ok(result) => BatchOutcome::Processed(result),
            Err(e) => {
                tracing::debug!("Unparseable response: {}", text);
                BatchOutcome::Skipped(SkipReason::ParseFailed {
                    message: match e {
                        EtlError::ParseFailed { message } => message,
                        other => other.to_string(),
                    },
                })
            }
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, X: ExtractionService> Pipeline for ExtractionPipeline<S, C, X> {
    async fn extract(&self) -> Result<Vec<Record>> {
        tracing::info!("📥 Loading records from: {}", self.config.input_path());
        load_records_from_path(self.config.input_path())
    }

    async fn transform(&self, records: Vec<Record>) -> Result<ExtractionReport> {
        let started_at = Utc::now();
        let batches = make_batches(&records, self.config.batch_size())?;
        let total = batches.len();

        tracing::info!(
            "🚀 Processing {} records in {} batches of up to {}",
            records.len(),
            total,
            self.config.batch_size()
        );

        let mut aggregator = Aggregator::new();
        let mut reports = Vec::with_capacity(total);

        // 逐批依序處理，單一批次失敗只略過該批
        for (i, batch) in batches.into_iter().enumerate() {
            let index = i + 1;
            let outcome = self.process_batch(batch).await;

            match &outcome {
                BatchOutcome::Processed(result) => {
                    aggregator.absorb(result);
                    tracing::info!(
                        "✅ Batch {}/{} processed ({} records)",
                        index,
                        total,
                        batch.len()
                    );
                }
                BatchOutcome::Skipped(reason) => {
                    tracing::warn!("⏭️ Batch {}/{} skipped: {}", index, total, reason);
                }
            }

            reports.push(BatchReport {
                index,
                record_count: batch.len(),
                outcome,
            });
        }

        Ok(ExtractionReport {
            started_at,
            total_records: records.len(),
            batches: reports,
            tables: aggregator.into_tables(),
        })
    }

    async fn load(&self, report: ExtractionReport) -> Result<String> {
        for table in &report.tables {
            tracing::debug!(
                "{}: {} distinct labels",
                table.category.label_column(),
                table.rows.len()
            );
        }

        let written = write_tables(&self.storage, &report.tables).await?;

        if let Some(summary_file) = self.config.summary_file() {
            let summary = RunSummary::from_report(
                &report,
                self.config.model(),
                self.config.batch_size(),
                written,
            );
            let data = serde_json::to_vec_pretty(&summary)?;
            self.storage
                .write_file(summary_file, &data)
                .await
                .map_err(|e| match e {
                    EtlError::PersistError { .. } => e,
                    other => EtlError::PersistError {
                        path: summary_file.to_string(),
                        message: other.to_string(),
                    },
                })?;
            tracing::debug!("Run summary written to {}", summary_file);
        }

        Ok(self.config.output_path().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CompletionRequest, EntityCategory};
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<String> {
            let files = self.files.lock().await;
            files
                .get(path)
                .map(|data| String::from_utf8_lossy(data).into_owned())
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    /// 只有摘要檔寫入失敗
    struct SummaryRejectingStorage;

    impl Storage for SummaryRejectingStorage {
        async fn write_file(&self, path: &str, _data: &[u8]) -> Result<()> {
            if path.ends_with(".json") {
                return Err(EtlError::PersistError {
                    path: format!("/out/{}", path),
                    message: "disk full".to_string(),
                });
            }
            Ok(())
        }
    }

    struct MockConfig {
        batch_size: usize,
        summary_file: Option<String>,
    }

    impl MockConfig {
        fn new(batch_size: usize) -> Self {
            Self {
                batch_size,
                summary_file: None,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            "papers.csv"
        }

        fn batch_size(&self) -> usize {
            self.batch_size
        }

        fn model(&self) -> &str {
            "test-model"
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn max_attempts(&self) -> u32 {
            3
        }

        fn retry_delay(&self) -> Duration {
            Duration::ZERO
        }

        fn request_timeout(&self) -> Duration {
            Duration::from_secs(1)
        }

        fn summary_file(&self) -> Option<&str> {
            self.summary_file.as_deref()
        }
    }

    /// 依序回傳預先排好的回應；`None` 代表該次呼叫失敗
    struct ScriptedService {
        responses: std::sync::Mutex<VecDeque<Option<String>>>,
        calls: AtomicU32,
    }

    impl ScriptedService {
        fn new(responses: Vec<Option<&str>>) -> Self {
            Self {
                responses: std::sync::Mutex::new(
                    responses
                        .into_iter()
                        .map(|r| r.map(str::to_string))
                        .collect(),
                ),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl ExtractionService for ScriptedService {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            assert_eq!(request.temperature, 0.0);
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.responses.lock().unwrap().pop_front().flatten();
            next.ok_or_else(|| EtlError::ServiceError {
                status: 500,
                body: "scripted failure".to_string(),
            })
        }
    }

    fn records(n: usize) -> Vec<Record> {
        (1..=n)
            .map(|i| Record::new(format!("Paper {}", i), format!("Abstract {}", i)))
            .collect()
    }

    const GOOD: &str =
        r#"{"binary_systems":["Au-Cu","Au-Cu"],"intermediates":["*CO"],"descriptors":[]}"#;

    #[tokio::test]
    async fn test_malformed_batch_is_skipped_and_counts_unchanged() {
        let service = ScriptedService::new(vec![Some(GOOD), Some("not json at all")]);
        let pipeline = ExtractionPipeline::new(MockStorage::new(), MockConfig::new(2), service);

        let report = pipeline.transform(records(3)).await.unwrap();

        assert_eq!(report.batches.len(), 2);
        assert_eq!(report.batches[0].record_count, 2);
        assert_eq!(report.batches[1].record_count, 1);
        assert!(report.batches[0].outcome.is_processed());
        assert!(matches!(
            report.batches[1].outcome,
            BatchOutcome::Skipped(SkipReason::ParseFailed { .. })
        ));

        let binary = report.table(EntityCategory::BinarySystems).unwrap();
        assert_eq!(binary.rows, vec![("Au-Cu".to_string(), 2)]);
        let intermediates = report.table(EntityCategory::Intermediates).unwrap();
        assert_eq!(intermediates.rows, vec![("*CO".to_string(), 1)]);
        assert!(report
            .table(EntityCategory::Descriptors)
            .unwrap()
            .rows
            .is_empty());
    }

    #[tokio::test]
    async fn test_failing_service_is_tried_three_times_per_batch() {
        let service = ScriptedService::new(vec![None, None, None, Some(GOOD)]);
        let pipeline = ExtractionPipeline::new(MockStorage::new(), MockConfig::new(1), service);

        let report = pipeline.transform(records(2)).await.unwrap();

        assert_eq!(pipeline.client.service().calls.load(Ordering::SeqCst), 4);
        match &report.batches[0].outcome {
            BatchOutcome::Skipped(SkipReason::ExtractionFailed { attempts, .. }) => {
                assert_eq!(*attempts, 3)
            }
            other => panic!("expected extraction failure, got {:?}", other),
        }
        assert!(report.batches[1].outcome.is_processed());
        assert_eq!(report.processed_count(), 1);
        assert_eq!(report.skipped_count(), 1);
    }

    #[tokio::test]
    async fn test_load_writes_three_tables_and_summary() {
        let storage = MockStorage::new();
        let mut config = MockConfig::new(2);
        config.summary_file = Some("run_summary.json".to_string());
        let service = ScriptedService::new(vec![Some(GOOD), Some("oops")]);
        let pipeline = ExtractionPipeline::new(storage.clone(), config, service);

        let report = pipeline.transform(records(3)).await.unwrap();
        let output_path = pipeline.load(report).await.unwrap();

        assert_eq!(output_path, "test_output");
        assert_eq!(
            storage.get_file("binary_systems_frequency.csv").await.unwrap(),
            "Binary System,Count\nAu-Cu,2\n"
        );
        assert_eq!(
            storage.get_file("intermediates_frequency.csv").await.unwrap(),
            "Intermediate,Count\n*CO,1\n"
        );
        assert_eq!(
            storage.get_file("descriptors_frequency.csv").await.unwrap(),
            "Descriptor,Count\n"
        );

        let summary: serde_json::Value =
            serde_json::from_str(&storage.get_file("run_summary.json").await.unwrap()).unwrap();
        assert_eq!(summary["processed_batches"], 1);
        assert_eq!(summary["skipped_batches"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_summary_write_error_is_not_wrapped_twice() {
        let mut config = MockConfig::new(2);
        config.summary_file = Some("run_summary.json".to_string());
        let service = ScriptedService::new(vec![Some(GOOD)]);
        let pipeline = ExtractionPipeline::new(SummaryRejectingStorage, config, service);

        let report = pipeline.transform(records(1)).await.unwrap();
        let err = pipeline.load(report).await.unwrap_err();

        match err {
            EtlError::PersistError { path, message } => {
                assert_eq!(path, "/out/run_summary.json");
                assert_eq!(message, "disk full");
            }
            other => panic!("expected persist error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_input_produces_empty_tables() {
        let service = ScriptedService::new(vec![]);
        let pipeline = ExtractionPipeline::new(MockStorage::new(), MockConfig::new(200), service);

        let report = pipeline.transform(Vec::new()).await.unwrap();

        assert!(report.batches.is_empty());
        assert_eq!(pipeline.client.service().calls.load(Ordering::SeqCst), 0);
        assert!(report.tables.iter().all(|t| t.rows.is_empty()));
    }
}
