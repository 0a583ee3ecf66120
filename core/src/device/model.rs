use crate::prelude::{FleetError, FleetResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weakest signal a device may report, in dBm.
pub const SIGNAL_FLOOR_DBM: i32 = -95;
/// Strongest signal a device may report, in dBm.
pub const SIGNAL_CEILING_DBM: i32 = -30;

/// Connectivity state of a tracked device.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DeviceStatus {
    Online,
    Offline,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Reads a free-text assessment such as "High - unusual OUI".
    pub fn from_assessment(text: &str) -> Self {
        if text.contains("High") {
            RiskLevel::High
        } else if text.contains("Medium") {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Named facility areas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Zone {
    #[serde(rename = "Server Room")]
    ServerRoom,
    Lobby,
    #[serde(rename = "Office North")]
    OfficeNorth,
    #[serde(rename = "Office South")]
    OfficeSouth,
    Warehouse,
    #[serde(rename = "Parking Lot")]
    ParkingLot,
    Unknown,
}

impl Zone {
    pub const ALL: [Zone; 7] = [
        Zone::ServerRoom,
        Zone::Lobby,
        Zone::OfficeNorth,
        Zone::OfficeSouth,
        Zone::Warehouse,
        Zone::ParkingLot,
        Zone::Unknown,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Zone::ServerRoom => "Server Room",
            Zone::Lobby => "Lobby",
            Zone::OfficeNorth => "Office North",
            Zone::OfficeSouth => "Office South",
            Zone::Warehouse => "Warehouse",
            Zone::ParkingLot => "Parking Lot",
            Zone::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DeviceStatus::Online => "Online",
            DeviceStatus::Offline => "Offline",
            DeviceStatus::Warning => "Warning",
            DeviceStatus::Critical => "Critical",
        };
        f.write_str(label)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        };
        f.write_str(label)
    }
}

/// One tracked network asset.
///
/// Timestamps are milliseconds since the Unix epoch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub mac_address: String,
    pub ip_address: String,
    pub name: String,
    pub manufacturer: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub status: DeviceStatus,
    pub zone: Zone,
    pub last_seen: u64,
    pub first_seen: u64,
    pub signal_strength: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub risk_level: RiskLevel,
    pub notes: String,
}

impl Device {
    /// Checks the per-record invariants enforced at the store boundary.
    pub fn validate(&self) -> FleetResult<()> {
        if self.id.trim().is_empty() {
            return Err(FleetError::InvariantViolation("device id is empty".into()));
        }
        if self.last_seen < self.first_seen {
            return Err(FleetError::InvariantViolation(format!(
                "device {}: lastSeen {} precedes firstSeen {}",
                self.id, self.last_seen, self.first_seen
            )));
        }
        if !(SIGNAL_FLOOR_DBM..=SIGNAL_CEILING_DBM).contains(&self.signal_strength) {
            return Err(FleetError::InvariantViolation(format!(
                "device {}: signal {} dBm outside [{}, {}]",
                self.id, self.signal_strength, SIGNAL_FLOOR_DBM, SIGNAL_CEILING_DBM
            )));
        }
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(FleetError::InvariantViolation(format!(
                "device {}: non-finite coordinates",
                self.id
            )));
        }
        Ok(())
    }

    pub fn is_online(&self) -> bool {
        self.status == DeviceStatus::Online
    }

    pub fn is_at_risk(&self) -> bool {
        self.risk_level != RiskLevel::Low
    }
}

/// Manual change to the descriptive and classification fields of a record.
///
/// Identity and telemetry are not editable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceEdit {
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    #[serde(rename = "type")]
    pub device_type: Option<String>,
    pub notes: Option<String>,
    pub status: Option<DeviceStatus>,
    pub risk_level: Option<RiskLevel>,
    pub zone: Option<Zone>,
}

impl DeviceEdit {
    pub fn apply(&self, device: &Device) -> Device {
        let mut next = device.clone();
        if let Some(name) = &self.name {
            next.name = name.clone();
        }
        if let Some(manufacturer) = &self.manufacturer {
            next.manufacturer = manufacturer.clone();
        }
        if let Some(device_type) = &self.device_type {
            next.device_type = device_type.clone();
        }
        if let Some(notes) = &self.notes {
            next.notes = notes.clone();
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        if let Some(risk_level) = self.risk_level {
            next.risk_level = risk_level;
        }
        if let Some(zone) = self.zone {
            next.zone = zone;
        }
        next
    }
}

/// Aggregate counts over a fleet snapshot.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FleetCounts {
    pub total: usize,
    pub at_risk: usize,
    pub high_risk: usize,
    pub online: usize,
}

impl FleetCounts {
    pub fn from_devices(devices: &[Device]) -> Self {
        devices.iter().fold(Self::default(), |mut counts, device| {
            counts.total += 1;
            if device.is_at_risk() {
                counts.at_risk += 1;
            }
            if device.risk_level == RiskLevel::High {
                counts.high_risk += 1;
            }
            if device.is_online() {
                counts.online += 1;
            }
            counts
        })
    }
}
