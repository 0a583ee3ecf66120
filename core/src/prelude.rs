/// Common error type for the telemetry core.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FleetError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    #[error("unknown device: {0}")]
    UnknownDevice(String),
    #[error("duplicate device: {0}")]
    DuplicateDevice(String),
    #[error("runtime unavailable: {0}")]
    Runtime(String),
}

pub type FleetResult<T> = Result<T, FleetError>;

/// Failures of the external classification and summary collaborators.
///
/// These never leave the enrichment boundary; callers receive fallback values.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EnrichmentError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unparseable response: {0}")]
    Parse(String),
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
    #[error("collaborator timed out after {0} ms")]
    Timeout(u64),
    #[error("collaborator has no credentials configured")]
    Unconfigured,
}
