use fleetcore::device::FleetCounts;
use fleetcore::telemetry::MetricsSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub identifier: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    pub summary: String,
    pub counts: FleetCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub active: bool,
    pub changed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub active: bool,
    pub counts: FleetCounts,
    pub metrics: MetricsSnapshot,
}
