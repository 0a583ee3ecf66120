//! Live telemetry core for a fleet of network-attached devices.
//!
//! The modules hold the authoritative device records, drift them on a fixed
//! cadence, project their coordinates into map space and reconcile the result
//! against the markers already on screen.

pub mod clock;
pub mod device;
pub mod enrichment;
pub mod prelude;
pub mod projection;
pub mod render;
pub mod simulation;
pub mod telemetry;

pub use prelude::{FleetError, FleetResult};
