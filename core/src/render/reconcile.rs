use crate::device::Device;
use crate::projection::{ProjectedPosition, Projector};
use crate::render::marker::{MarkerState, PopupContent, VisualDescriptor};
use log::{debug, warn};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Marker state keyed by device id.
pub type MarkerTable = BTreeMap<String, MarkerState>;

/// Instruction to place or refresh one marker.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MarkerCommand {
    pub device_id: String,
    pub position: ProjectedPosition,
    pub descriptor: VisualDescriptor,
    pub popup: String,
    /// Position differs from the one last rendered. Always true on create.
    pub moved: bool,
}

/// Minimal set of renderer operations to go from the prior markers to the
/// current fleet.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RenderPlan {
    pub to_create: Vec<MarkerCommand>,
    pub to_update: Vec<MarkerCommand>,
    pub to_remove: Vec<String>,
}

impl RenderPlan {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_remove.is_empty()
    }
}

/// Diffs `devices` against `prior` and returns the plan plus the next table.
///
/// Positions are compared exactly: a device whose projection did not change is
/// not reissued, whatever happened to its raw coordinates.
pub fn reconcile(
    devices: &[Device],
    prior: &MarkerTable,
    projector: &dyn Projector,
    now_ms: u64,
) -> (RenderPlan, MarkerTable) {
    let mut plan = RenderPlan::default();
    let mut next = MarkerTable::new();
    let mut seen = HashSet::with_capacity(devices.len());

    for device in devices {
        if !seen.insert(device.id.as_str()) {
            warn!("duplicate device id {} in render input; keeping first", device.id);
            continue;
        }

        let position = projector.project(device.latitude, device.longitude);
        let popup = PopupContent::for_device(device, now_ms);
        let descriptor = VisualDescriptor::new(device, &popup);
        let state = MarkerState {
            device_id: device.id.clone(),
            position,
            descriptor,
        };

        match prior.get(&device.id) {
            None => plan.to_create.push(MarkerCommand {
                device_id: device.id.clone(),
                position,
                descriptor,
                popup: popup.render(),
                moved: true,
            }),
            Some(previous) => {
                let moved = previous.position != position;
                if moved || previous.descriptor != descriptor {
                    plan.to_update.push(MarkerCommand {
                        device_id: device.id.clone(),
                        position,
                        descriptor,
                        popup: popup.render(),
                        moved,
                    });
                }
            }
        }
        next.insert(device.id.clone(), state);
    }

    plan.to_remove = prior
        .keys()
        .filter(|id| !seen.contains(id.as_str()))
        .cloned()
        .collect();

    (plan, next)
}

/// Owns the marker table between frames.
#[derive(Debug, Default)]
pub struct RenderReconciler {
    markers: MarkerTable,
}

impl RenderReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reconcile(
        &mut self,
        devices: &[Device],
        projector: &dyn Projector,
        now_ms: u64,
    ) -> RenderPlan {
        let (plan, next) = reconcile(devices, &self.markers, projector, now_ms);
        debug!(
            "render plan: {} create, {} update, {} remove",
            plan.to_create.len(),
            plan.to_update.len(),
            plan.to_remove.len()
        );
        self.markers = next;
        plan
    }

    pub fn marker(&self, device_id: &str) -> Option<&MarkerState> {
        self.markers.get(device_id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Forgets every marker, e.g. when the map surface is torn down.
    pub fn reset(&mut self) {
        self.markers.clear();
    }
}
