use crate::device::RiskLevel;
use crate::prelude::EnrichmentError;
use crate::telemetry::EngineMetrics;
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Raw hypothesis returned by the external classifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierResponse {
    pub manufacturer: String,
    pub device_type: String,
    /// Free text such as "High - unregistered OUI".
    pub security_risk: String,
    pub likely_usage: String,
}

impl ClassifierResponse {
    pub fn from_json(text: &str) -> Result<Self, EnrichmentError> {
        if text.trim().is_empty() {
            return Err(EnrichmentError::Parse("empty classifier response".into()));
        }
        serde_json::from_str(text).map_err(|err| EnrichmentError::Parse(err.to_string()))
    }
}

/// Structured profile used to register a device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceProfile {
    pub manufacturer: String,
    pub device_type: String,
    pub risk_level: RiskLevel,
    pub usage_note: String,
}

impl DeviceProfile {
    /// Profile substituted whenever classification fails.
    pub fn fallback() -> Self {
        Self {
            manufacturer: "Unknown".into(),
            device_type: "Unidentified Generic Device".into(),
            risk_level: RiskLevel::Low,
            usage_note: "General Network Traffic".into(),
        }
    }
}

impl From<ClassifierResponse> for DeviceProfile {
    fn from(response: ClassifierResponse) -> Self {
        Self {
            risk_level: RiskLevel::from_assessment(&response.security_risk),
            manufacturer: response.manufacturer,
            device_type: response.device_type,
            usage_note: response.likely_usage,
        }
    }
}

/// External hardware-address classifier.
///
/// Identifiers are opaque; implementations must not validate their format.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, identifier: &str) -> Result<ClassifierResponse, EnrichmentError>;
}

/// Classification with a single bounded attempt and a fixed fallback.
#[derive(Clone)]
pub struct EnrichmentPipeline {
    classifier: Arc<dyn Classifier>,
    timeout: Duration,
    metrics: Arc<EngineMetrics>,
}

impl EnrichmentPipeline {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        timeout: Duration,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            classifier,
            timeout,
            metrics,
        }
    }

    /// Never fails: any error or timeout yields [`DeviceProfile::fallback`].
    pub async fn classify(&self, identifier: &str) -> DeviceProfile {
        let call = self.classifier.classify(identifier);
        let outcome = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(EnrichmentError::Timeout(self.timeout.as_millis() as u64)),
        };
        match outcome {
            Ok(response) => {
                debug!("classified {} as {}", identifier, response.device_type);
                response.into()
            }
            Err(err) => {
                warn!("classification of {} failed, using fallback: {}", identifier, err);
                self.metrics.record_classifier_fallback();
                DeviceProfile::fallback()
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::stubs::*;
    use super::*;
    use std::sync::atomic::Ordering;

    fn pipeline(classifier: Arc<dyn Classifier>) -> (EnrichmentPipeline, Arc<EngineMetrics>) {
        let metrics = Arc::new(EngineMetrics::new());
        (
            EnrichmentPipeline::new(classifier, Duration::from_secs(5), metrics.clone()),
            metrics,
        )
    }

    #[tokio::test]
    async fn failing_backend_yields_documented_fallback() {
        let backend = Arc::new(FailingClassifier::new());
        let (pipeline, metrics) = pipeline(backend.clone());
        let profile = pipeline.classify("invalid-mac").await;
        assert_eq!(
            profile,
            DeviceProfile {
                manufacturer: "Unknown".into(),
                device_type: "Unidentified Generic Device".into(),
                risk_level: RiskLevel::Low,
                usage_note: "General Network Traffic".into(),
            }
        );
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.snapshot().classifier_fallbacks, 1);
    }

    #[tokio::test]
    async fn successful_response_maps_risk_text() {
        let (pipeline, metrics) = pipeline(Arc::new(CannedClassifier(camera_response())));
        let profile = pipeline.classify("A4:C3:F0:00:00:01").await;
        assert_eq!(profile.manufacturer, "Hikvision");
        assert_eq!(profile.device_type, "IoT Camera");
        assert_eq!(profile.risk_level, RiskLevel::High);
        assert_eq!(profile.usage_note, "Perimeter surveillance");
        assert_eq!(metrics.snapshot().classifier_fallbacks, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_backend_times_out_to_fallback() {
        let (pipeline, _) = pipeline(Arc::new(HangingClassifier));
        assert_eq!(pipeline.classify("00:11:22:33:44:55").await, DeviceProfile::fallback());
    }

    #[test]
    fn response_parses_from_json_text() {
        let text = r#"{"manufacturer":"Apple, Inc.","deviceType":"Laptop","securityRisk":"Low","likelyUsage":"Personal use"}"#;
        let response = ClassifierResponse::from_json(text).unwrap();
        assert_eq!(response.device_type, "Laptop");
        assert!(matches!(
            ClassifierResponse::from_json("not json"),
            Err(EnrichmentError::Parse(_))
        ));
        assert!(ClassifierResponse::from_json("  ").is_err());
    }
}
