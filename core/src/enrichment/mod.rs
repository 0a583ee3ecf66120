//! Contracts for the external classification and summary collaborators.
//!
//! Both collaborators may fail or hang. The pipeline and summarizer attempt
//! each call once, bound it with a timeout and substitute a fixed fallback.

pub mod classify;
pub mod register;
pub mod summary;

pub use classify::{Classifier, ClassifierResponse, DeviceProfile, EnrichmentPipeline};
pub use register::{ManualEntry, Registrar};
pub use summary::{
    FleetSummarizer, SummaryBackend, SUMMARY_EMPTY, SUMMARY_FALLBACK, SUMMARY_UNCONFIGURED,
};

pub use crate::prelude::EnrichmentError;

use std::time::Duration;

/// Default bound on a single collaborator call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(15);
