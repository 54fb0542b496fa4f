use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::StageMonitor;

pub struct SummaryEngine<P: Pipeline> {
    pipeline: P,
    monitor: StageMonitor,
}

impl<P: Pipeline> SummaryEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: StageMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: StageMonitor::new(monitor_enabled),
        }
    }

    /// 依序執行 extract / transform / load，回傳輸出位置
    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting log summary");
        self.monitor.log_stats("Start");

        tracing::info!("📖 Reading logs...");
        let runs = self.pipeline.extract().await?;
        tracing::info!("Found {} exports", runs.len());
        self.monitor.log_stats("Parse");

        tracing::info!("🧮 Collating statistics...");
        let summary = self.pipeline.transform(runs).await?;
        tracing::info!("{} summaries to print", summary.stats.len());
        self.monitor.log_stats("Collate");

        let destination = self.pipeline.load(summary).await?;
        tracing::info!("📁 Output written to: {}", destination);
        self.monitor.log_stats("Render");

        self.monitor.log_final_stats();
        Ok(destination)
    }
}
