use crate::clock::Clock;
use crate::device::{Device, DeviceStore, SIGNAL_CEILING_DBM, SIGNAL_FLOOR_DBM};
use crate::prelude::FleetResult;
use crate::simulation::drift::{DriftSample, DriftSource};
use crate::telemetry::EngineMetrics;
use log::{debug, warn};
use std::sync::Arc;

/// Outcome of one simulator tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub tick_ms: u64,
    pub devices: usize,
}

/// Advances the drift fields of every tracked device.
///
/// Each tick reads the whole fleet, computes the next value of every record
/// and writes them back in one store update.
pub struct TelemetrySimulator {
    drift: Box<dyn DriftSource>,
    clock: Arc<dyn Clock>,
    metrics: Arc<EngineMetrics>,
}

impl TelemetrySimulator {
    pub fn new(
        drift: Box<dyn DriftSource>,
        clock: Arc<dyn Clock>,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            drift,
            clock,
            metrics,
        }
    }

    pub fn tick(&mut self, store: &DeviceStore) -> FleetResult<TickReport> {
        let now = self.clock.now_ms();
        let drift = &mut self.drift;
        match store.update_all(|device| advance(device, drift.sample(), now)) {
            Ok(devices) => {
                self.metrics.record_tick();
                debug!("tick at {} advanced {} devices", now, devices);
                Ok(TickReport {
                    tick_ms: now,
                    devices,
                })
            }
            Err(err) => {
                self.metrics.record_failed_tick();
                warn!("tick at {} rejected: {}", now, err);
                Err(err)
            }
        }
    }
}

/// Applies one drift sample to a device observed at `now_ms`.
///
/// Signal is clamped to its domain; coordinates are not bounded here.
pub fn advance(device: &Device, sample: DriftSample, now_ms: u64) -> Device {
    let mut next = device.clone();
    next.signal_strength = (device.signal_strength + sample.signal_delta_dbm)
        .clamp(SIGNAL_FLOOR_DBM, SIGNAL_CEILING_DBM);
    next.latitude = device.latitude + sample.latitude_delta;
    next.longitude = device.longitude + sample.longitude_delta;
    if device.is_online() {
        next.last_seen = device.last_seen.max(now_ms);
    }
    next
}
