use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct AuditEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> AuditEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting follow audit...");

        // Extract
        tracing::info!("📥 Reading export...");
        let input = self.pipeline.extract().await?;
        tracing::info!("Read {}", input.describe());
        self.monitor.log_stats("Extract");

        // Transform
        tracing::info!("🔄 Comparing followers and following...");
        let result = self.pipeline.transform(input).await?;
        tracing::info!(
            "Found {} accounts not following back, {} accounts not followed by you",
            result.not_following_back.len(),
            result.not_followed_by_you.len()
        );
        self.monitor.log_stats("Transform");

        // Load
        tracing::info!("💾 Writing reports...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");

        if self.monitor.is_enabled() {
            self.monitor.log_final_stats();
        }

        Ok(output_path)
    }
}
