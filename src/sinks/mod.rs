//! Sink implementations

pub mod console;
#[cfg(feature = "file")]
pub mod file;
#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "http")]
pub mod logstash;
#[cfg(feature = "http")]
pub mod splunk;

pub use console::{ConsoleSink, ConsoleTarget};
#[cfg(feature = "file")]
pub use file::{FileSink, OpenMode};
#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpSink};
#[cfg(feature = "http")]
pub use logstash::{logstash, LogstashConfig};
#[cfg(feature = "http")]
pub use splunk::{splunk, SplunkConfig, SplunkMetadata};

pub use crate::core::{FnSink, Sink};
