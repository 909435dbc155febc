//! Timestamp formatting utilities
//!
//! Date placeholders in text templates and the `ts` field of JSON output use
//! day.js-style patterns (`YYYY-MM-DD HH:mm:ss.SSS`). A [`DatePattern`] is
//! translated into a chrono strftime string once, when it is created, and
//! can then render any instant in local time or UTC.

use chrono::{DateTime, Local, Utc};

/// Pattern used by `%date%` when none is given
pub const DEFAULT_DATE_PATTERN: &str = "YYYY-MM-DD HH:mm:ss.SSS";

/// ISO 8601 with milliseconds, as produced for UTC JSON timestamps
const ISO8601_MILLIS: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Pattern tokens, longest first so that `YYYY` wins over `YY`
const TOKENS: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("MMMM", "%B"),
    ("dddd", "%A"),
    ("MMM", "%b"),
    ("ddd", "%a"),
    ("SSS", "%3f"),
    ("YY", "%y"),
    ("MM", "%m"),
    ("DD", "%d"),
    ("HH", "%H"),
    ("hh", "%I"),
    ("mm", "%M"),
    ("ss", "%S"),
    ("ZZ", "%z"),
    ("M", "%-m"),
    ("D", "%-d"),
    ("H", "%-H"),
    ("h", "%-I"),
    ("m", "%-M"),
    ("s", "%-S"),
    ("A", "%p"),
    ("a", "%P"),
    ("Z", "%:z"),
    ("X", "%s"),
];

/// A compiled day.js-style date pattern
///
/// # Examples
///
/// ```
/// use rust_batch_logger::core::DatePattern;
/// use chrono::{TimeZone, Utc};
///
/// let ts = Utc.with_ymd_and_hms(1995, 3, 15, 8, 5, 0).unwrap();
/// let pattern = DatePattern::new("DD/MM/YYYY HH:mm");
/// assert_eq!(pattern.format(&ts, true), "15/03/1995 08:05");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    source: String,
    strftime: String,
}

impl DatePattern {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let strftime = translate(&source);
        Self { source, strftime }
    }

    /// The pattern as written
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render `timestamp` in UTC or in the local time zone
    pub fn format(&self, timestamp: &DateTime<Utc>, utc: bool) -> String {
        if utc {
            timestamp.format(&self.strftime).to_string()
        } else {
            timestamp
                .with_timezone(&Local)
                .format(&self.strftime)
                .to_string()
        }
    }
}

impl Default for DatePattern {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_PATTERN)
    }
}

/// Translate a day.js pattern into strftime. Text inside `[...]` is literal.
fn translate(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut rest = pattern;

    'scan: while let Some(c) = rest.chars().next() {
        if c == '[' {
            if let Some(end) = rest.find(']') {
                push_literal(&mut out, &rest[1..end]);
                rest = &rest[end + 1..];
                continue;
            }
        }
        for (token, spec) in TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(spec);
                rest = tail;
                continue 'scan;
            }
        }
        push_literal(&mut out, &rest[..c.len_utf8()]);
        rest = &rest[c.len_utf8()..];
    }

    out
}

fn push_literal(out: &mut String, text: &str) {
    for c in text.chars() {
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
    }
}

/// How the JSON formatter emits the record timestamp
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum JsonTimestamp {
    /// Raw milliseconds since the epoch, as a number
    #[default]
    EpochMillis,
    /// ISO 8601 string in UTC: `1995-03-15T00:00:00.000Z`
    Utc,
    /// Formatted with a date pattern
    Pattern { pattern: DatePattern, utc: bool },
}

impl JsonTimestamp {
    /// Resolve from the formatter options. A pattern takes precedence and
    /// renders in local time; the UTC flag only applies without one.
    pub fn from_options(ts_format: Option<&str>, utc: bool) -> Self {
        match ts_format {
            Some(pattern) => JsonTimestamp::Pattern {
                pattern: DatePattern::new(pattern),
                utc: false,
            },
            None if utc => JsonTimestamp::Utc,
            None => JsonTimestamp::EpochMillis,
        }
    }

    pub fn to_json(&self, timestamp: &DateTime<Utc>) -> serde_json::Value {
        match self {
            JsonTimestamp::EpochMillis => {
                serde_json::Value::Number(timestamp.timestamp_millis().into())
            }
            JsonTimestamp::Utc => {
                serde_json::Value::String(timestamp.format(ISO8601_MILLIS).to_string())
            }
            JsonTimestamp::Pattern { pattern, utc } => {
                serde_json::Value::String(pattern.format(timestamp, *utc))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Utc> {
        // 2025-01-08 10:30:45.123456 UTC
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_default_pattern() {
        let pattern = DatePattern::default();
        assert_eq!(pattern.format(&fixed_datetime(), true), "2025-01-08 10:30:45.123");
    }

    #[test]
    fn test_translation() {
        assert_eq!(translate("YYYY-MM-DD"), "%Y-%m-%d");
        assert_eq!(translate("HH:mm:ss.SSS"), "%H:%M:%S.%3f");
        assert_eq!(translate("[at] h A"), "at %-I %p");
        assert_eq!(translate("100%"), "100%%");
    }

    #[test]
    fn test_short_tokens() {
        let pattern = DatePattern::new("D/M/YY h:m:s a");
        assert_eq!(pattern.format(&fixed_datetime(), true), "8/1/25 10:30:45 am");
    }

    #[test]
    fn test_names_and_offset() {
        let pattern = DatePattern::new("dddd, MMMM D Z");
        assert_eq!(
            pattern.format(&fixed_datetime(), true),
            "Wednesday, January 8 +00:00"
        );
    }

    #[test]
    fn test_bracket_escape() {
        let pattern = DatePattern::new("[YYYY is] YYYY");
        assert_eq!(pattern.format(&fixed_datetime(), true), "YYYY is 2025");
    }

    #[test]
    fn test_json_timestamp_variants() {
        let ts = Utc.with_ymd_and_hms(1995, 3, 15, 0, 0, 0).unwrap();

        let raw = JsonTimestamp::from_options(None, false).to_json(&ts);
        assert_eq!(raw, serde_json::json!(795225600000_i64));

        let utc = JsonTimestamp::from_options(None, true).to_json(&ts);
        assert_eq!(utc, serde_json::json!("1995-03-15T00:00:00.000Z"));

        let pinned = JsonTimestamp::Pattern {
            pattern: DatePattern::new("DD/MM/YYYY"),
            utc: true,
        };
        assert_eq!(pinned.to_json(&ts), serde_json::json!("15/03/1995"));
    }

    #[test]
    fn test_pattern_ignores_utc_flag() {
        let ts = Utc.with_ymd_and_hms(1995, 3, 15, 0, 0, 0).unwrap();
        let local = ts.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string();

        for utc in [false, true] {
            let resolved = JsonTimestamp::from_options(Some("DD/MM/YYYY HH:mm"), utc);
            assert!(matches!(resolved, JsonTimestamp::Pattern { utc: false, .. }));
            assert_eq!(resolved.to_json(&ts), serde_json::json!(local));
        }
    }
}
