pub mod drift;
pub mod simulator;
pub mod task;

pub use drift::{DriftConfig, DriftSample, DriftSource, FixedDrift, RandomDrift};
pub use simulator::{TelemetrySimulator, TickReport};
pub use task::SimulatorTask;
