//! Logstash preset for the HTTP sink
//!
//! Posts each batch as a JSON array of the batch's lines, which is what the
//! Logstash `http` input expects when the lines come from the JSON
//! formatter.

use super::http::{HttpConfig, HttpSink};
use crate::core::{ErrorCallback, Result};

/// Default Logstash HTTP input endpoint
pub const DEFAULT_LOGSTASH_URL: &str = "http://localhost:5044";

#[derive(Clone, Default)]
pub struct LogstashConfig {
    /// Defaults to [`DEFAULT_LOGSTASH_URL`]
    pub url: Option<String>,
    pub on_error: Option<ErrorCallback>,
}

/// Build an HTTP sink for a Logstash `http` input
///
/// # Example
///
/// ```no_run
/// use rust_batch_logger::prelude::*;
/// use rust_batch_logger::sinks::{logstash, LogstashConfig};
///
/// let logger = Logger::builder()
///     .formatter(Formatter::named("json"))
///     .sink(logstash(LogstashConfig::default()).unwrap())
///     .buffer_size(100)
///     .build()
///     .unwrap();
/// ```
pub fn logstash(config: LogstashConfig) -> Result<HttpSink> {
    let url = config
        .url
        .unwrap_or_else(|| DEFAULT_LOGSTASH_URL.to_string());
    let mut http = HttpConfig::new(url)
        .header("Content-Type", "application/json")
        .body(logstash_body);
    http.on_error = config.on_error;
    HttpSink::new(http)
}

/// `[line,line,...]`
pub fn logstash_body(lines: &[String]) -> String {
    format!("[{}]", lines.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Sink;
    use crate::sinks::http::test_server;
    use std::time::Duration;

    #[test]
    fn test_body_is_json_array() {
        let lines = vec![
            "{\"level\":\"INFO\",\"a\":1}\n".to_string(),
            "{\"level\":\"WARN\",\"b\":2}\n".to_string(),
        ];
        let body = logstash_body(&lines);
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!([{"level": "INFO", "a": 1}, {"level": "WARN", "b": 2}])
        );
    }

    #[test]
    fn test_preset_headers_and_body() {
        let (url, requests) = test_server::spawn(200, 1);
        let sink = logstash(LogstashConfig {
            url: Some(url),
            on_error: None,
        })
        .unwrap();

        sink.write_batch(&["{\"n\":1}\n".to_string()]).unwrap();
        sink.flush().unwrap();

        let request = requests.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.body, "[{\"n\":1}\n]");
    }
}
