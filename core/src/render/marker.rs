use crate::device::{Device, DeviceStatus, RiskLevel};
use crate::projection::ProjectedPosition;
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_HOUR: u64 = 3_600_000;

/// Colour class of a marker, driven by status and risk.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MarkerTone {
    Critical,
    Warning,
    Safe,
}

impl MarkerTone {
    pub fn for_device(device: &Device) -> Self {
        if device.status == DeviceStatus::Critical || device.risk_level == RiskLevel::High {
            MarkerTone::Critical
        } else if device.status == DeviceStatus::Warning || device.risk_level == RiskLevel::Medium
        {
            MarkerTone::Warning
        } else {
            MarkerTone::Safe
        }
    }
}

/// Everything about a marker's look that is not its position.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub struct VisualDescriptor {
    pub tone: MarkerTone,
    pub pulse: bool,
    pub popup_digest: u64,
}

impl VisualDescriptor {
    pub fn new(device: &Device, popup: &PopupContent) -> Self {
        Self {
            tone: MarkerTone::for_device(device),
            pulse: device.is_online(),
            popup_digest: popup.digest(),
        }
    }
}

/// Text shown when a marker is opened.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
pub struct PopupContent {
    pub name: String,
    pub risk_level: String,
    pub mac_address: String,
    pub zone: String,
    pub status: String,
    pub active_for: String,
    pub coordinates: String,
}

impl PopupContent {
    pub fn for_device(device: &Device, now_ms: u64) -> Self {
        Self {
            name: device.name.clone(),
            risk_level: device.risk_level.to_string(),
            mac_address: device.mac_address.clone(),
            zone: device.zone.to_string(),
            status: device.status.to_string(),
            active_for: format_duration(now_ms.saturating_sub(device.first_seen)),
            coordinates: format!("{:.4}, {:.4}", device.latitude, device.longitude),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "{} [{}]\n{}\nZone: {}\nStatus: {}\nActive for: {}\n{}",
            self.name,
            self.risk_level,
            self.mac_address,
            self.zone,
            self.status,
            self.active_for,
            self.coordinates
        )
    }

    pub fn digest(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

/// `"{d}d {h}h"` past a day, `"{h}h {m}m"` otherwise.
pub fn format_duration(ms: u64) -> String {
    let hours = ms / MS_PER_HOUR;
    let days = hours / 24;
    if days > 0 {
        format!("{}d {}h", days, hours % 24)
    } else {
        format!("{}h {}m", hours, (ms / MS_PER_MINUTE) % 60)
    }
}

/// Last state handed to the renderer for one device.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerState {
    pub device_id: String,
    pub position: ProjectedPosition,
    pub descriptor: VisualDescriptor,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::model::fixtures::device;

    #[test]
    fn durations_format_like_the_dashboard() {
        assert_eq!(format_duration(0), "0h 0m");
        assert_eq!(format_duration(59 * MS_PER_MINUTE), "0h 59m");
        assert_eq!(format_duration(3 * MS_PER_HOUR + 5 * MS_PER_MINUTE), "3h 5m");
        assert_eq!(format_duration(5 * 24 * MS_PER_HOUR + 2 * MS_PER_HOUR), "5d 2h");
    }

    #[test]
    fn tone_prefers_critical_over_warning() {
        let mut record = device("1");
        assert_eq!(MarkerTone::for_device(&record), MarkerTone::Safe);
        record.risk_level = RiskLevel::Medium;
        assert_eq!(MarkerTone::for_device(&record), MarkerTone::Warning);
        record.status = DeviceStatus::Critical;
        assert_eq!(MarkerTone::for_device(&record), MarkerTone::Critical);
        record.status = DeviceStatus::Warning;
        record.risk_level = RiskLevel::High;
        assert_eq!(MarkerTone::for_device(&record), MarkerTone::Critical);
    }

    #[test]
    fn popup_ignores_sub_display_coordinate_noise() {
        let record = device("1");
        let mut jittered = record.clone();
        jittered.latitude += 0.000001;
        let now = record.first_seen + 1_000;
        assert_eq!(
            PopupContent::for_device(&record, now).digest(),
            PopupContent::for_device(&jittered, now).digest()
        );
    }

    #[test]
    fn pulse_follows_online_status() {
        let mut record = device("1");
        let popup = PopupContent::for_device(&record, 0);
        assert!(VisualDescriptor::new(&record, &popup).pulse);
        record.status = DeviceStatus::Offline;
        assert!(!VisualDescriptor::new(&record, &popup).pulse);
    }

    #[test]
    fn rendered_popup_lists_fields() {
        let popup = PopupContent::for_device(&device("1"), 500 + 2 * MS_PER_HOUR);
        let text = popup.render();
        assert!(text.contains("HQ Server Node [Low]"));
        assert!(text.contains("Zone: Server Room"));
        assert!(text.contains("Active for: 2h 0m"));
        assert!(text.ends_with("34.0522, -118.2437"));
    }
}
