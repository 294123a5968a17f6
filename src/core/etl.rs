use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Drives a pipeline through load → batch processing → reporting.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// 載入或設定錯誤會在任何批次之前中止；批次錯誤已在 transform 內吞掉
    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting extraction run...");

        let records = self.pipeline.extract().await?;
        tracing::info!("Loaded {} records", records.len());
        self.monitor.log_stats("Load");

        let report = self.pipeline.transform(records).await?;
        tracing::info!(
            "Processed {} of {} batches ({} skipped)",
            report.processed_count(),
            report.batches.len(),
            report.skipped_count()
        );
        self.monitor.log_stats("Extraction");

        let output_path = self.pipeline.load(report).await?;
        tracing::info!("Frequency tables saved to: {}", output_path);
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
