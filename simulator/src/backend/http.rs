use crate::workflow::config::ClassifierConfig;
use anyhow::Context;
use async_trait::async_trait;
use fleetcore::enrichment::{Classifier, ClassifierResponse, EnrichmentError, SummaryBackend};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Minimal client for a `generateContent`-style text generation endpoint.
#[derive(Clone)]
pub struct GenerativeClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize, Serialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize, Serialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

impl GenerativeClient {
    pub fn new(config: &ClassifierConfig, api_key: String) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("building HTTP client for AI collaborator")?;
        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }

    pub async fn generate(
        &self,
        prompt: &str,
        json_output: bool,
    ) -> Result<String, EnrichmentError> {
        let mut body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });
        if json_output {
            body["generationConfig"] = json!({ "responseMimeType": "application/json" });
        }

        let response = self
            .http
            .post(self.url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|err| EnrichmentError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Transport(format!(
                "{} responded {}",
                self.endpoint, status
            )));
        }
        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|err| EnrichmentError::Parse(err.to_string()))?;
        let text = payload.text();
        debug!("generated {} chars from {}", text.len(), self.model);
        Ok(text)
    }
}

fn classification_prompt(identifier: &str) -> String {
    format!(
        "Analyze this MAC Address (OUI): {identifier}.\n\
         Reply with a JSON object with string fields manufacturer, deviceType, securityRisk and likelyUsage.\n\
         securityRisk starts with Low, Medium or High followed by a brief reason.\n\
         If the MAC is a placeholder or invalid, provide a realistic hypothesis based on standard formats."
    )
}

fn summary_prompt(total: usize, at_risk: usize) -> String {
    format!(
        "Generate a short, professional, executive summary (2 sentences) for a network security dashboard. \
         There are {total} active tracked devices and {at_risk} potential high-risk anomalies detected."
    )
}

pub struct HttpClassifier {
    client: GenerativeClient,
}

impl HttpClassifier {
    pub fn new(client: GenerativeClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, identifier: &str) -> Result<ClassifierResponse, EnrichmentError> {
        let text = self
            .client
            .generate(&classification_prompt(identifier), true)
            .await?;
        ClassifierResponse::from_json(&text)
    }
}

pub struct HttpSummarizer {
    client: GenerativeClient,
}

impl HttpSummarizer {
    pub fn new(client: GenerativeClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SummaryBackend for HttpSummarizer {
    async fn summarize(&self, total: usize, at_risk: usize) -> Result<String, EnrichmentError> {
        self.client.generate(&summary_prompt(total, at_risk), false).await
    }
}

/// Stand-in used when no API key is configured; every call fails.
pub struct UnconfiguredBackend;

#[async_trait]
impl Classifier for UnconfiguredBackend {
    async fn classify(&self, _identifier: &str) -> Result<ClassifierResponse, EnrichmentError> {
        Err(EnrichmentError::Unconfigured)
    }
}

#[async_trait]
impl SummaryBackend for UnconfiguredBackend {
    async fn summarize(&self, _total: usize, _at_risk: usize) -> Result<String, EnrichmentError> {
        Err(EnrichmentError::Unconfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use warp::Filter;

    fn serve(reply_text: &'static str, status: u16) -> SocketAddr {
        let route = warp::path!("v1beta" / "models" / String)
            .and(warp::post())
            .and(warp::query::<HashMap<String, String>>())
            .and(warp::body::json())
            .map(move |model: String, query: HashMap<String, String>, body: serde_json::Value| {
                assert!(model.ends_with(":generateContent"));
                assert_eq!(query.get("key").map(String::as_str), Some("test-key"));
                assert!(body["contents"][0]["parts"][0]["text"].is_string());
                let payload = json!({
                    "candidates": [{ "content": { "parts": [{ "text": reply_text }] } }]
                });
                warp::reply::with_status(
                    warp::reply::json(&payload),
                    warp::http::StatusCode::from_u16(status).unwrap(),
                )
            });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }

    fn client(addr: SocketAddr) -> GenerativeClient {
        let config = ClassifierConfig {
            endpoint: format!("http://{}/", addr),
            timeout_ms: 2_000,
            ..Default::default()
        };
        GenerativeClient::new(&config, "test-key".into()).unwrap()
    }

    #[tokio::test]
    async fn classifier_parses_generated_json() {
        let addr = serve(
            r#"{"manufacturer":"Espressif Inc.","deviceType":"Smart Sensor","securityRisk":"Medium - outdated firmware","likelyUsage":"Building automation"}"#,
            200,
        );
        let classifier = HttpClassifier::new(client(addr));
        let response = classifier.classify("00:1B:44:11:3A:B7").await.unwrap();
        assert_eq!(response.manufacturer, "Espressif Inc.");
        assert_eq!(response.security_risk, "Medium - outdated firmware");
    }

    #[tokio::test]
    async fn non_json_generation_is_a_parse_error() {
        let addr = serve("I think this is a router.", 200);
        let classifier = HttpClassifier::new(client(addr));
        assert!(matches!(
            classifier.classify("invalid-mac").await,
            Err(EnrichmentError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn server_errors_are_transport_failures() {
        let addr = serve("unused", 503);
        let summarizer = HttpSummarizer::new(client(addr));
        assert!(matches!(
            summarizer.summarize(5, 2).await,
            Err(EnrichmentError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn summarizer_returns_generated_text() {
        let addr = serve("All systems nominal.", 200);
        let summarizer = HttpSummarizer::new(client(addr));
        assert_eq!(summarizer.summarize(5, 0).await.unwrap(), "All systems nominal.");
    }

    #[tokio::test]
    async fn unconfigured_backend_always_fails() {
        assert!(matches!(
            UnconfiguredBackend.classify("x").await,
            Err(EnrichmentError::Unconfigured)
        ));
        assert_eq!(
            UnconfiguredBackend.summarize(1, 0).await,
            Err(EnrichmentError::Unconfigured)
        );
    }

    #[test]
    fn response_text_joins_parts() {
        let payload: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "a" }, { "text": "b" }] } }]
        }))
        .unwrap();
        assert_eq!(payload.text(), "ab");
        let empty: GenerateResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.text(), "");
    }
}
