use fleetcore::device::{Device, DeviceStatus, RiskLevel, Zone};

const MINUTE_MS: u64 = 60_000;
const HOUR_MS: u64 = 60 * MINUTE_MS;
const DAY_MS: u64 = 24 * HOUR_MS;

struct SeedRecord {
    id: &'static str,
    mac: &'static str,
    ip: &'static str,
    name: &'static str,
    manufacturer: &'static str,
    device_type: &'static str,
    status: DeviceStatus,
    zone: Zone,
    seen_ago_ms: u64,
    first_seen_ago_ms: u64,
    signal: i32,
    latitude: f64,
    longitude: f64,
    risk: RiskLevel,
    notes: &'static str,
}

const DEMO_FLEET: [SeedRecord; 5] = [
    SeedRecord {
        id: "1",
        mac: "A4:C3:F0:89:12:34",
        ip: "192.168.1.105",
        name: "HQ Server Node",
        manufacturer: "Dell Inc.",
        device_type: "Server",
        status: DeviceStatus::Online,
        zone: Zone::ServerRoom,
        seen_ago_ms: 0,
        first_seen_ago_ms: 5 * DAY_MS,
        signal: -45,
        latitude: 34.0522,
        longitude: -118.2437,
        risk: RiskLevel::Low,
        notes: "Main backend infrastructure",
    },
    SeedRecord {
        id: "2",
        mac: "00:1B:44:11:3A:B7",
        ip: "10.0.5.20",
        name: "NYC Branch IoT",
        manufacturer: "Espressif Inc.",
        device_type: "Smart Sensor",
        status: DeviceStatus::Warning,
        zone: Zone::Lobby,
        seen_ago_ms: 5 * MINUTE_MS,
        first_seen_ago_ms: 2 * DAY_MS,
        signal: -72,
        latitude: 40.7128,
        longitude: -74.0060,
        risk: RiskLevel::Medium,
        notes: "Unauthorized firmware version",
    },
    SeedRecord {
        id: "3",
        mac: "BC:D1:12:88:99:00",
        ip: "172.16.0.45",
        name: "London Workstation",
        manufacturer: "Apple, Inc.",
        device_type: "MacBook Pro",
        status: DeviceStatus::Online,
        zone: Zone::OfficeNorth,
        seen_ago_ms: MINUTE_MS,
        first_seen_ago_ms: 3 * HOUR_MS,
        signal: -55,
        latitude: 51.5074,
        longitude: -0.1278,
        risk: RiskLevel::Low,
        notes: "Remote developer asset",
    },
    SeedRecord {
        id: "4",
        mac: "11:22:33:44:55:66",
        ip: "192.168.50.10",
        name: "Tokyo Gateway",
        manufacturer: "Cisco Systems",
        device_type: "Router",
        status: DeviceStatus::Critical,
        zone: Zone::Warehouse,
        seen_ago_ms: 10_000,
        first_seen_ago_ms: 30 * DAY_MS,
        signal: -30,
        latitude: 35.6762,
        longitude: 139.6503,
        risk: RiskLevel::High,
        notes: "Unusual traffic patterns detected",
    },
    SeedRecord {
        id: "5",
        mac: "AA:BB:CC:DD:EE:FF",
        ip: "10.5.1.99",
        name: "SG Logistics Pad",
        manufacturer: "Samsung",
        device_type: "Tablet",
        status: DeviceStatus::Online,
        zone: Zone::Warehouse,
        seen_ago_ms: 0,
        first_seen_ago_ms: HOUR_MS,
        signal: -60,
        latitude: 1.3521,
        longitude: 103.8198,
        risk: RiskLevel::Low,
        notes: "Inventory management",
    },
];

/// Demo fleet spread over five cities, timestamped relative to `now_ms`.
pub fn seed_fleet(now_ms: u64) -> Vec<Device> {
    DEMO_FLEET
        .iter()
        .map(|seed| Device {
            id: seed.id.into(),
            mac_address: seed.mac.into(),
            ip_address: seed.ip.into(),
            name: seed.name.into(),
            manufacturer: seed.manufacturer.into(),
            device_type: seed.device_type.into(),
            status: seed.status,
            zone: seed.zone,
            last_seen: now_ms.saturating_sub(seed.seen_ago_ms),
            first_seen: now_ms.saturating_sub(seed.first_seen_ago_ms),
            signal_strength: seed.signal,
            latitude: seed.latitude,
            longitude: seed.longitude,
            risk_level: seed.risk,
            notes: seed.notes.into(),
        })
        .collect()
}
