use crate::backend::{GenerativeClient, HttpClassifier, HttpSummarizer, UnconfiguredBackend};
use crate::workflow::config::FleetConfig;
use anyhow::Context;
use fleetcore::clock::{Clock, SystemClock};
use fleetcore::device::{Device, DeviceEdit, DeviceStore, FleetCounts};
use fleetcore::enrichment::{
    Classifier, EnrichmentPipeline, FleetSummarizer, ManualEntry, Registrar, SummaryBackend,
};
use fleetcore::projection::{
    build_projector, zones::zone_layout, ProjectionMode, Projector, ZoneRect,
};
use fleetcore::render::{RenderPlan, RenderReconciler};
use fleetcore::simulation::{DriftSource, RandomDrift, SimulatorTask, TelemetrySimulator};
use fleetcore::telemetry::{EngineMetrics, MetricsSnapshot};
use fleetcore::{FleetError, FleetResult};
use log::{info, warn};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};

/// External collaborators the runner talks to.
pub struct Collaborators {
    pub classifier: Arc<dyn Classifier>,
    pub summarizer: Arc<dyn SummaryBackend>,
}

impl Collaborators {
    pub fn from_config(config: &FleetConfig) -> anyhow::Result<Self> {
        match config.classifier.resolved_api_key() {
            Some(key) => {
                let client = GenerativeClient::new(&config.classifier, key)?;
                Ok(Self {
                    classifier: Arc::new(HttpClassifier::new(client.clone())),
                    summarizer: Arc::new(HttpSummarizer::new(client)),
                })
            }
            None => {
                warn!("no API key configured; classification and summaries use fallbacks");
                Ok(Self {
                    classifier: Arc::new(UnconfiguredBackend),
                    summarizer: Arc::new(UnconfiguredBackend),
                })
            }
        }
    }
}

/// One frame for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub mode: ProjectionMode,
    pub plan: RenderPlan,
    /// Zone overlays, only populated for the facility grid.
    pub zones: Vec<ZoneOverlay>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneOverlay {
    pub zone: String,
    pub rect: ZoneRect,
}

/// Owns the device store and everything that reads or mutates it.
pub struct Runner {
    store: Arc<DeviceStore>,
    projector: Arc<dyn Projector>,
    reconciler: Mutex<RenderReconciler>,
    simulator: SimulatorTask,
    pipeline: EnrichmentPipeline,
    registrar: Registrar,
    summarizer: FleetSummarizer,
    clock: Arc<dyn Clock>,
    metrics: Arc<EngineMetrics>,
}

impl Runner {
    pub fn new(
        config: &FleetConfig,
        clock: Arc<dyn Clock>,
        drift: Box<dyn DriftSource>,
        collaborators: Collaborators,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        let store = Arc::new(DeviceStore::new());
        let metrics = Arc::new(EngineMetrics::new());
        let projector =
            build_projector(&config.projection).context("building coordinate projector")?;
        let simulator = SimulatorTask::new(
            TelemetrySimulator::new(drift, clock.clone(), metrics.clone()),
            store.clone(),
            config.tick_interval(),
        )
        .context("creating simulator task")?;
        let timeout = config.classifier.timeout();
        let registrar = Registrar::new(config.projection.bounds, clock.clone(), config.drift.seed)
            .context("creating device registrar")?;

        Ok(Self {
            store,
            projector,
            reconciler: Mutex::new(RenderReconciler::new()),
            simulator,
            pipeline: EnrichmentPipeline::new(collaborators.classifier, timeout, metrics.clone()),
            registrar,
            summarizer: FleetSummarizer::new(collaborators.summarizer, timeout, metrics.clone()),
            clock,
            metrics,
        })
    }

    pub fn from_config(config: &FleetConfig) -> anyhow::Result<Self> {
        let drift = RandomDrift::from_config(&config.drift).context("creating drift source")?;
        Self::new(
            config,
            Arc::new(SystemClock),
            Box::new(drift),
            Collaborators::from_config(config)?,
        )
    }

    pub fn seed(&self, devices: Vec<Device>) -> FleetResult<usize> {
        let count = devices.len();
        for device in devices {
            self.store.upsert(device)?;
        }
        info!("seeded {} devices", count);
        Ok(count)
    }

    /// Starts drifting the fleet; a second call while active is a no-op.
    pub fn activate(&self) -> FleetResult<bool> {
        self.simulator.start()
    }

    /// Stops drifting the fleet and forgets rendered markers.
    pub fn deactivate(&self) -> bool {
        let stopped = self.simulator.stop();
        self.reconciler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reset();
        stopped
    }

    pub fn is_active(&self) -> bool {
        self.simulator.is_running()
    }

    pub fn tick_once(&self) -> FleetResult<()> {
        self.simulator.tick_now()
    }

    pub fn render_frame(&self) -> Frame {
        let devices = self.store.all();
        let now = self.clock.now_ms();
        let plan = self
            .reconciler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reconcile(&devices, self.projector.as_ref(), now);
        self.metrics.record_render_plan(
            plan.to_create.len(),
            plan.to_update.len(),
            plan.to_remove.len(),
        );
        let mode = self.projector.mode();
        let zones = match mode {
            ProjectionMode::Local => zone_layout()
                .map(|(zone, rect)| ZoneOverlay {
                    zone: zone.to_string(),
                    rect,
                })
                .collect(),
            ProjectionMode::TileMap => Vec::new(),
        };
        Frame { mode, plan, zones }
    }

    pub async fn register(&self, identifier: &str) -> FleetResult<Device> {
        self.registrar
            .register(identifier, &self.pipeline, &self.store)
            .await
    }

    pub fn register_manual(&self, entry: &ManualEntry) -> FleetResult<Device> {
        self.registrar.register_manual(entry, &self.store)
    }

    pub fn edit(&self, id: &str, edit: &DeviceEdit) -> FleetResult<Device> {
        self.store.edit(id, edit)
    }

    pub fn remove(&self, id: &str) -> FleetResult<Device> {
        self.store
            .remove(id)
            .ok_or_else(|| FleetError::UnknownDevice(id.to_string()))
    }

    pub fn devices(&self) -> Vec<Device> {
        self.store.all()
    }

    pub fn device(&self, id: &str) -> Option<Device> {
        self.store.get(id)
    }

    pub fn counts(&self) -> FleetCounts {
        FleetCounts::from_devices(&self.store.all())
    }

    pub async fn summary(&self) -> String {
        self.summarizer.summarize_fleet(&self.store.all()).await
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
