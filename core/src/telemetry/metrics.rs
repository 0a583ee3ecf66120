use serde::Serialize;
use std::sync::Mutex;

/// Running counters for the telemetry engine.
pub struct EngineMetrics {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub ticks: u64,
    pub failed_ticks: u64,
    pub classifier_fallbacks: u64,
    pub summary_fallbacks: u64,
    pub markers_created: u64,
    pub markers_updated: u64,
    pub markers_removed: u64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    fn with<F: FnOnce(&mut MetricsSnapshot)>(&self, apply: F) {
        if let Ok(mut metrics) = self.inner.lock() {
            apply(&mut metrics);
        }
    }

    pub fn record_tick(&self) {
        self.with(|m| m.ticks += 1);
    }

    pub fn record_failed_tick(&self) {
        self.with(|m| m.failed_ticks += 1);
    }

    pub fn record_classifier_fallback(&self) {
        self.with(|m| m.classifier_fallbacks += 1);
    }

    pub fn record_summary_fallback(&self) {
        self.with(|m| m.summary_fallbacks += 1);
    }

    pub fn record_render_plan(&self, created: usize, updated: usize, removed: usize) {
        self.with(|m| {
            m.markers_created += created as u64;
            m.markers_updated += updated as u64;
            m.markers_removed += removed as u64;
        });
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}
