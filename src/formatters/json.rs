//! JSON formatter
//!
//! Each record becomes one flat JSON object. Field order is `level`,
//! `caller`, `ts`, the context entries, then the entries derived from the
//! positional arguments. A single argument is emitted as `message`; more
//! than one are read as `key, value, key, value, ...`.

use super::{relative_caller, RecordFormatter};
use crate::core::error::LoggerError;
use crate::core::timestamp::JsonTimestamp;
use crate::core::{LogRecord, Value};
use serde_json::Value as Json;
use std::collections::HashSet;
use std::str::FromStr;

/// Top-level fields the JSON formatter can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonField {
    Level,
    Caller,
    Ts,
    Context,
    Args,
}

impl JsonField {
    pub const ALL: [JsonField; 5] = [
        JsonField::Level,
        JsonField::Caller,
        JsonField::Ts,
        JsonField::Context,
        JsonField::Args,
    ];
}

impl FromStr for JsonField {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "level" => Ok(JsonField::Level),
            "caller" => Ok(JsonField::Caller),
            "ts" => Ok(JsonField::Ts),
            "context" => Ok(JsonField::Context),
            "args" => Ok(JsonField::Args),
            _ => Err(LoggerError::config(
                "json formatter",
                format!("unknown field '{}'", s),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsonFormatter {
    fields: HashSet<JsonField>,
    ts_format: Option<String>,
    utc: bool,
    timestamp: JsonTimestamp,
}

impl JsonFormatter {
    /// All fields, epoch-millisecond timestamps
    pub fn new() -> Self {
        Self {
            fields: JsonField::ALL.into_iter().collect(),
            ts_format: None,
            utc: false,
            timestamp: JsonTimestamp::EpochMillis,
        }
    }

    /// Emit only `fields`
    #[must_use]
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = JsonField>) -> Self {
        self.fields = fields.into_iter().collect();
        self
    }

    /// Emit only the named fields. Unrecognized names are ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_batch_logger::core::{LogLevel, LogRecord, Value};
    /// use rust_batch_logger::formatters::{JsonFormatter, RecordFormatter};
    ///
    /// let formatter = JsonFormatter::new().with_field_names(["level", "args", "host"]);
    /// let line = formatter.format(
    ///     &LogRecord::new(LogLevel::Info),
    ///     &[Value::from("user"), Value::from(42)],
    /// );
    /// assert_eq!(line, "{\"level\":\"INFO\",\"user\":42}\n");
    /// ```
    #[must_use]
    pub fn with_field_names<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields: Vec<JsonField> = names
            .into_iter()
            .filter_map(|name| name.as_ref().parse().ok())
            .collect();
        self.with_fields(fields)
    }

    /// Format `ts` with a date pattern, in local time, instead of emitting
    /// epoch millis
    #[must_use]
    pub fn with_ts_format(mut self, pattern: impl Into<String>) -> Self {
        self.ts_format = Some(pattern.into());
        self.timestamp = JsonTimestamp::from_options(self.ts_format.as_deref(), self.utc);
        self
    }

    /// Render `ts` as an ISO 8601 UTC string. Has no effect once a
    /// pattern is set.
    #[must_use]
    pub fn with_utc(mut self, utc: bool) -> Self {
        self.utc = utc;
        self.timestamp = JsonTimestamp::from_options(self.ts_format.as_deref(), self.utc);
        self
    }

    pub fn emits(&self, field: JsonField) -> bool {
        self.fields.contains(&field)
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordFormatter for JsonFormatter {
    fn format(&self, record: &LogRecord, args: &[Value]) -> String {
        let mut out = OrderedFields::default();

        if self.emits(JsonField::Level) {
            out.set("level", Some(Json::String(record.level.to_str().to_string())));
        }
        if self.emits(JsonField::Caller) {
            if let Some(ref caller) = record.caller {
                out.set("caller", Some(Json::String(relative_caller(caller))));
            }
        }
        if self.emits(JsonField::Ts) {
            out.set("ts", Some(self.timestamp.to_json(&record.timestamp)));
        }
        if self.emits(JsonField::Context) {
            for (key, value) in record.context.iter() {
                out.set(key, value.to_json());
            }
        }
        if self.emits(JsonField::Args) {
            append_args(&mut out, args);
        }

        let mut line = serde_json::to_string(&out.into_json()).unwrap_or_default();
        line.push('\n');
        line
    }
}

fn append_args(out: &mut OrderedFields, args: &[Value]) {
    if let [message] = args {
        out.set("message", message.to_json());
        return;
    }
    for pair in args.chunks(2) {
        let Some(key) = pair[0].as_key() else {
            continue;
        };
        // An unpaired trailing key maps to an absent value.
        out.set(&key, pair.get(1).and_then(Value::to_json));
    }
}

/// Object under construction with assignment semantics: setting an
/// existing key replaces its value in place, and `None` marks a key whose
/// value is absent and will be left out of the output.
#[derive(Default)]
struct OrderedFields {
    entries: Vec<(String, Option<Json>)>,
}

impl OrderedFields {
    fn set(&mut self, key: &str, value: Option<Json>) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    fn into_json(self) -> Json {
        Json::Object(
            self.entries
                .into_iter()
                .filter_map(|(key, value)| value.map(|value| (key, value)))
                .collect(),
        )
    }
}
