use crate::prelude::{FleetError, FleetResult};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Noise parameters applied on every simulator tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DriftConfig {
    /// Magnitude of the per-tick signal step; the sign is a coin flip.
    pub signal_step_dbm: i32,
    /// Half-width of the uniform coordinate jitter, in degrees.
    pub coordinate_jitter_deg: f64,
    pub seed: Option<u64>,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            signal_step_dbm: 2,
            coordinate_jitter_deg: 0.00001,
            seed: None,
        }
    }
}

impl DriftConfig {
    pub fn validate(&self) -> FleetResult<()> {
        if self.signal_step_dbm < 0 {
            return Err(FleetError::Configuration(format!(
                "signal step must be non-negative, got {}",
                self.signal_step_dbm
            )));
        }
        if !self.coordinate_jitter_deg.is_finite() || self.coordinate_jitter_deg < 0.0 {
            return Err(FleetError::Configuration(format!(
                "coordinate jitter must be a non-negative number, got {}",
                self.coordinate_jitter_deg
            )));
        }
        Ok(())
    }
}

/// Per-device offsets for a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DriftSample {
    pub signal_delta_dbm: i32,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

/// Produces one independent drift sample per device per tick.
pub trait DriftSource: Send {
    fn sample(&mut self) -> DriftSample;
}

/// Coin-flip signal steps and uniform GPS jitter.
pub struct RandomDrift {
    rng: StdRng,
    signal_step_dbm: i32,
    jitter_deg: f64,
}

impl RandomDrift {
    pub fn from_config(config: &DriftConfig) -> FleetResult<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            rng,
            signal_step_dbm: config.signal_step_dbm,
            jitter_deg: config.coordinate_jitter_deg,
        })
    }

    fn jitter(&mut self) -> f64 {
        if self.jitter_deg == 0.0 {
            0.0
        } else {
            self.rng.gen_range(-self.jitter_deg..=self.jitter_deg)
        }
    }
}

impl DriftSource for RandomDrift {
    fn sample(&mut self) -> DriftSample {
        let signal_delta_dbm = if self.rng.gen_bool(0.5) {
            self.signal_step_dbm
        } else {
            -self.signal_step_dbm
        };
        DriftSample {
            signal_delta_dbm,
            latitude_delta: self.jitter(),
            longitude_delta: self.jitter(),
        }
    }
}

/// Returns the same sample every time; used for replayable scenarios.
#[derive(Debug, Clone, Copy)]
pub struct FixedDrift(pub DriftSample);

impl DriftSource for FixedDrift {
    fn sample(&mut self) -> DriftSample {
        self.0
    }
}
