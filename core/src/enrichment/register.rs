use crate::clock::Clock;
use crate::device::{Device, DeviceStatus, DeviceStore, RiskLevel, Zone};
use crate::enrichment::classify::{DeviceProfile, EnrichmentPipeline};
use crate::prelude::{FleetError, FleetResult};
use crate::projection::FacilityBounds;
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;
const ID_ATTEMPTS: usize = 8;
const PLACEHOLDER_MAC: &str = "00:00:00:00:00:00";
const UNNAMED_DEVICE: &str = "Unnamed Device";

/// Operator-supplied details for a device registered without classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ManualEntry {
    pub name: String,
    pub mac_address: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub manufacturer: String,
    pub zone: Zone,
    pub risk_level: RiskLevel,
    pub notes: String,
}

impl Default for ManualEntry {
    fn default() -> Self {
        Self {
            name: String::new(),
            mac_address: String::new(),
            device_type: "Generic Device".into(),
            manufacturer: "Unknown".into(),
            zone: Zone::Lobby,
            risk_level: RiskLevel::Low,
            notes: String::new(),
        }
    }
}

struct Descriptive<'a> {
    mac_address: &'a str,
    name: String,
    manufacturer: &'a str,
    device_type: &'a str,
    zone: Zone,
    risk_level: RiskLevel,
    notes: &'a str,
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.trim().is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

/// Turns a classified profile or a manual entry into a new tracked device.
///
/// New devices start Online somewhere in the inner 80 % of the facility.
/// Classified devices land in zone Unknown until someone places them.
pub struct Registrar {
    bounds: FacilityBounds,
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
}

impl Registrar {
    pub fn new(
        bounds: FacilityBounds,
        clock: Arc<dyn Clock>,
        seed: Option<u64>,
    ) -> FleetResult<Self> {
        bounds.validate()?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            bounds,
            clock,
            rng: Mutex::new(rng),
        })
    }

    pub fn build(&self, identifier: &str, profile: &DeviceProfile) -> Device {
        self.assemble(Descriptive {
            mac_address: identifier,
            name: format!("{} {}", profile.manufacturer, profile.device_type),
            manufacturer: &profile.manufacturer,
            device_type: &profile.device_type,
            zone: Zone::Unknown,
            risk_level: profile.risk_level,
            notes: &profile.usage_note,
        })
    }

    pub fn build_manual(&self, entry: &ManualEntry) -> Device {
        self.assemble(Descriptive {
            mac_address: &entry.mac_address,
            name: or_placeholder(&entry.name, UNNAMED_DEVICE),
            manufacturer: &entry.manufacturer,
            device_type: &entry.device_type,
            zone: entry.zone,
            risk_level: entry.risk_level,
            notes: &entry.notes,
        })
    }

    fn assemble(&self, fields: Descriptive<'_>) -> Device {
        let now = self.clock.now_ms();
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let id: String = (0..ID_LEN)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();
        let (latitude, longitude) = self
            .bounds
            .unproject(rng.gen_range(10.0..90.0), rng.gen_range(10.0..90.0));

        Device {
            id,
            mac_address: or_placeholder(fields.mac_address, PLACEHOLDER_MAC),
            ip_address: format!("192.168.1.{}", rng.gen_range(0..254)),
            name: fields.name,
            manufacturer: fields.manufacturer.to_string(),
            device_type: fields.device_type.to_string(),
            status: DeviceStatus::Online,
            zone: fields.zone,
            last_seen: now,
            first_seen: now,
            signal_strength: -rng.gen_range(30..70),
            latitude,
            longitude,
            risk_level: fields.risk_level,
            notes: fields.notes.to_string(),
        }
    }

    /// Classifies `identifier` and inserts the resulting device.
    pub async fn register(
        &self,
        identifier: &str,
        pipeline: &EnrichmentPipeline,
        store: &DeviceStore,
    ) -> FleetResult<Device> {
        let profile = pipeline.classify(identifier).await;
        self.insert_fresh(identifier, store, || self.build(identifier, &profile))
    }

    /// Inserts a device described entirely by the operator.
    pub fn register_manual(
        &self,
        entry: &ManualEntry,
        store: &DeviceStore,
    ) -> FleetResult<Device> {
        self.insert_fresh(&entry.mac_address, store, || self.build_manual(entry))
    }

    fn insert_fresh<F>(
        &self,
        label: &str,
        store: &DeviceStore,
        mut build: F,
    ) -> FleetResult<Device>
    where
        F: FnMut() -> Device,
    {
        for _ in 0..ID_ATTEMPTS {
            let device = build();
            match store.insert(device.clone()) {
                Ok(()) => {
                    info!("registered {} as {} ({})", label, device.id, device.name);
                    return Ok(device);
                }
                Err(FleetError::DuplicateDevice(_)) => continue,
                Err(err) => return Err(err),
            }
        }
        Err(FleetError::DuplicateDevice(format!(
            "no free id for {} after {} attempts",
            label, ID_ATTEMPTS
        )))
    }
}
