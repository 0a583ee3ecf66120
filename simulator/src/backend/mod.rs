pub mod http;

pub use http::{GenerativeClient, HttpClassifier, HttpSummarizer, UnconfiguredBackend};
