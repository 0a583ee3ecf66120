pub mod model;
pub mod store;

pub use model::{
    Device, DeviceEdit, DeviceStatus, FleetCounts, RiskLevel, Zone, SIGNAL_CEILING_DBM,
    SIGNAL_FLOOR_DBM,
};
pub use store::DeviceStore;
