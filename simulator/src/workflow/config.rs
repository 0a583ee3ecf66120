use anyhow::{bail, Context};
use fleetcore::projection::{ProjectionConfig, ProjectionMode};
use fleetcore::simulation::DriftConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Connection settings for the generative AI collaborator.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    pub endpoint: String,
    pub model: String,
    /// Falls back to the `API_KEY` environment variable when unset.
    pub api_key: Option<String>,
    pub timeout_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com".into(),
            model: "gemini-2.5-flash".into(),
            api_key: None,
            timeout_ms: 15_000,
        }
    }
}

impl ClassifierConfig {
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FleetConfig {
    pub tick_interval_ms: u64,
    pub drift: DriftConfig,
    pub projection: ProjectionConfig,
    pub classifier: ClassifierConfig,
    pub bind: String,
    /// Load the demo fleet at startup.
    pub seed_fleet: bool,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2_000,
            drift: DriftConfig::default(),
            projection: ProjectionConfig::default(),
            classifier: ClassifierConfig::default(),
            bind: "127.0.0.1:9000".into(),
            seed_fleet: true,
        }
    }
}

impl FleetConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading fleet config {}", path_ref.display()))?;
        let config: FleetConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing fleet config {}", path_ref.display()))?;
        config
            .validate()
            .with_context(|| format!("validating fleet config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.tick_interval_ms == 0 {
            bail!("tick_interval_ms must be greater than zero");
        }
        if self.classifier.timeout_ms == 0 {
            bail!("classifier.timeout_ms must be greater than zero");
        }
        self.drift.validate()?;
        // Registration places devices inside the facility even in tile-map mode.
        self.projection.bounds.validate()?;
        self.bind_address()?;
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn bind_address(&self) -> anyhow::Result<SocketAddr> {
        self.bind
            .parse()
            .with_context(|| format!("parsing bind address {}", self.bind))
    }

    pub fn with_overrides(
        mut self,
        interval_ms: Option<u64>,
        seed: Option<u64>,
        projection: Option<ProjectionMode>,
        bind: Option<String>,
    ) -> Self {
        if let Some(interval_ms) = interval_ms {
            self.tick_interval_ms = interval_ms;
        }
        if seed.is_some() {
            self.drift.seed = seed;
        }
        if let Some(mode) = projection {
            self.projection.mode = mode;
        }
        if let Some(bind) = bind {
            self.bind = bind;
        }
        self
    }
}
