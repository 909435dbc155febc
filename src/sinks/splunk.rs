//! Splunk HTTP Event Collector preset for the HTTP sink

use super::http::{HttpConfig, HttpSink};
use crate::core::{ErrorCallback, Result};
use serde::Serialize;
use serde_json::{Map, Value as Json};

/// Default HEC endpoint
pub const DEFAULT_SPLUNK_URL: &str = "http://localhost:8088/services/collector";

/// Metadata merged into every HEC event
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SplunkMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sourcetype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
}

#[derive(Clone, Default)]
pub struct SplunkConfig {
    /// Defaults to [`DEFAULT_SPLUNK_URL`]
    pub url: Option<String>,
    /// HEC token, sent as `Authorization: Splunk <token>`
    pub token: Option<String>,
    pub metadata: SplunkMetadata,
    pub on_error: Option<ErrorCallback>,
}

/// Build an HTTP sink for a Splunk HTTP Event Collector.
///
/// Each line becomes one event. Lines produced by the JSON formatter are
/// embedded as objects; any other line is sent as a string event.
pub fn splunk(config: SplunkConfig) -> Result<HttpSink> {
    let url = config
        .url
        .unwrap_or_else(|| DEFAULT_SPLUNK_URL.to_string());
    let metadata = config.metadata;

    let mut http = HttpConfig::new(url)
        .header("Content-Type", "application/json")
        .body(move |lines: &[String]| splunk_body(&metadata, lines));
    if let Some(token) = config.token {
        http = http.header("Authorization", format!("Splunk {}", token));
    }
    http.on_error = config.on_error;
    HttpSink::new(http)
}

/// `[{...metadata, "event": line}, ...]`
pub fn splunk_body(metadata: &SplunkMetadata, lines: &[String]) -> String {
    let base = match serde_json::to_value(metadata) {
        Ok(Json::Object(map)) => map,
        _ => Map::new(),
    };
    let events: Vec<Json> = lines
        .iter()
        .map(|line| {
            let event = serde_json::from_str(line)
                .unwrap_or_else(|_| Json::String(line.trim_end().to_string()));
            let mut object = base.clone();
            object.insert("event".to_string(), event);
            Json::Object(object)
        })
        .collect();
    Json::Array(events).to_string()
}
