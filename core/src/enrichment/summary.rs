use crate::device::{Device, FleetCounts};
use crate::prelude::{EnrichmentError, FleetError, FleetResult};
use crate::telemetry::EngineMetrics;
use async_trait::async_trait;
use log::warn;
use std::sync::Arc;
use std::time::Duration;

/// Substituted whenever the summary backend fails.
pub const SUMMARY_FALLBACK: &str = "System analysis unavailable.";
/// Substituted when the backend answers with nothing.
pub const SUMMARY_EMPTY: &str = "System status normal.";
/// Substituted when the backend has no credentials to call out with.
pub const SUMMARY_UNCONFIGURED: &str = "API Key missing. Cannot generate report.";

/// External producer of a short natural-language fleet status.
#[async_trait]
pub trait SummaryBackend: Send + Sync {
    async fn summarize(&self, total: usize, at_risk: usize) -> Result<String, EnrichmentError>;
}

pub struct FleetSummarizer {
    backend: Arc<dyn SummaryBackend>,
    timeout: Duration,
    metrics: Arc<EngineMetrics>,
}

impl FleetSummarizer {
    pub fn new(
        backend: Arc<dyn SummaryBackend>,
        timeout: Duration,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            backend,
            timeout,
            metrics,
        }
    }

    /// Status line for `total` devices of which `at_risk` are not low risk.
    ///
    /// Only an impossible count is an error; backend failures yield
    /// [`SUMMARY_FALLBACK`].
    pub async fn summarize(&self, total: usize, at_risk: usize) -> FleetResult<String> {
        if at_risk > total {
            return Err(FleetError::InvariantViolation(format!(
                "at-risk count {} exceeds total {}",
                at_risk, total
            )));
        }
        let call = self.backend.summarize(total, at_risk);
        let outcome = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(EnrichmentError::Timeout(self.timeout.as_millis() as u64)),
        };
        Ok(match outcome {
            Ok(text) if text.trim().is_empty() => SUMMARY_EMPTY.to_string(),
            Ok(text) => text.trim().to_string(),
            Err(EnrichmentError::Unconfigured) => {
                self.metrics.record_summary_fallback();
                SUMMARY_UNCONFIGURED.to_string()
            }
            Err(err) => {
                warn!("fleet summary failed, using fallback: {}", err);
                self.metrics.record_summary_fallback();
                SUMMARY_FALLBACK.to_string()
            }
        })
    }

    pub async fn summarize_fleet(&self, devices: &[Device]) -> String {
        let counts = FleetCounts::from_devices(devices);
        self.summarize(counts.total, counts.at_risk)
            .await
            .unwrap_or_else(|_| SUMMARY_FALLBACK.to_string())
    }
}
