//! Template-driven text formatter
//!
//! Templates are literal text with `%name%` placeholders:
//!
//! | placeholder | output |
//! |---|---|
//! | `%lvl%` | level name, uppercase, coloured by level |
//! | `%date%` | timestamp, `YYYY-MM-DD HH:mm:ss.SSS` in local time |
//! | `%date.format(P)%` | timestamp with pattern `P` |
//! | `%date.utc%`, `%date.format(P).utc%` | same, in UTC |
//! | `%caller%` | call site, empty when unknown |
//! | `%ctx%` | context as `key=value, ...` |
//! | `%args%` | positional arguments |
//!
//! Unknown placeholders are kept verbatim.

use super::{relative_caller, RecordFormatter};
use crate::core::render::{render, RenderOptions};
use crate::core::style::{paint, paint_as, strip_ansi, Category};
use crate::core::timestamp::DatePattern;
use crate::core::{LogLevel, LogRecord, Value};
use regex::Regex;
use std::sync::LazyLock;

/// Template used when none is given
pub const DEFAULT_TEMPLATE: &str = "[%lvl%] %date% (%caller%) %ctx% %args%";

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("%([^%]+)%").expect("placeholder pattern is a valid regex"));

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^date(?:\.format\(([^)]*)\))?(?:\.(utc))?")
        .expect("date placeholder pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Level,
    Date { pattern: DatePattern, utc: bool },
    Caller,
    Context,
    Args,
}

/// Renders records through a `%placeholder%` template
#[derive(Debug, Clone)]
pub struct TextFormatter {
    template: String,
    segments: Vec<Segment>,
    styled: bool,
    inline: bool,
    depth: Option<usize>,
}

impl TextFormatter {
    /// Compile `template`. Styling on, multi-line maps, depth 3.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_batch_logger::core::{LogLevel, LogRecord, Value};
    /// use rust_batch_logger::formatters::{RecordFormatter, TextFormatter};
    ///
    /// let formatter = TextFormatter::new("[%lvl%] %args%").with_styled(false);
    /// let line = formatter.format(&LogRecord::new(LogLevel::Info), &[Value::from("ready")]);
    /// assert_eq!(line, "[INFO] ready\n");
    /// ```
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let segments = compile(&template);
        Self {
            template,
            segments,
            styled: true,
            inline: false,
            depth: Some(3),
        }
    }

    /// Emit colour escape sequences
    #[must_use]
    pub fn with_styled(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    /// Keep map arguments on one line
    #[must_use]
    pub fn with_inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    /// Depth limit for map arguments, `None` for unbounded
    #[must_use]
    pub fn with_depth(mut self, depth: Option<usize>) -> Self {
        self.depth = depth;
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn is_styled(&self) -> bool {
        self.styled
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            inline: self.inline,
            max_depth: self.depth,
            styled: self.styled,
        }
    }

    fn unstyle(&self, text: String) -> String {
        if self.styled {
            text
        } else {
            strip_ansi(&text).into_owned()
        }
    }

    fn format_args(&self, args: &[Value]) -> String {
        let options = self.render_options();
        let parts: Vec<String> = args
            .iter()
            .enumerate()
            .map(|(i, arg)| {
                if arg.is_object_like() {
                    let rendered = render(arg, &options);
                    if self.inline {
                        rendered
                    } else {
                        format!("\n{}", rendered)
                    }
                } else if i % 2 == 0 {
                    paint_as(&arg.to_plain_string(), Category::Label, self.styled)
                } else {
                    arg.to_plain_string()
                }
            })
            .collect();
        self.unstyle(parts.join(" "))
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl RecordFormatter for TextFormatter {
    fn format(&self, record: &LogRecord, args: &[Value]) -> String {
        let mut line = String::with_capacity(128);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => line.push_str(text),
                Segment::Level => line.push_str(&paint(
                    record.level.to_str(),
                    record.level.color_code(),
                    self.styled,
                )),
                Segment::Date { pattern, utc } => {
                    line.push_str(&pattern.format(&record.timestamp, *utc))
                }
                Segment::Caller => {
                    if let Some(ref caller) = record.caller {
                        line.push_str(&relative_caller(caller));
                    }
                }
                Segment::Context => line.push_str(&self.unstyle(record.context.format_fields())),
                Segment::Args => line.push_str(&self.format_args(args)),
            }
        }
        line.push('\n');

        if record.level == LogLevel::Fatal {
            paint_as(&line, Category::Fatal, self.styled)
        } else {
            line
        }
    }
}

fn compile(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut last = 0;

    for caps in PLACEHOLDER_RE.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        literal.push_str(&template[last..whole.start()]);
        last = whole.end();

        match placeholder(name.as_str()) {
            Some(segment) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(segment);
            }
            None => literal.push_str(whole.as_str()),
        }
    }

    literal.push_str(&template[last..]);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

fn placeholder(name: &str) -> Option<Segment> {
    match name {
        "lvl" => Some(Segment::Level),
        "caller" => Some(Segment::Caller),
        "ctx" => Some(Segment::Context),
        "args" => Some(Segment::Args),
        _ if name.starts_with("date") => {
            let caps = DATE_RE.captures(name)?;
            let pattern = caps
                .get(1)
                .map(|p| DatePattern::new(p.as_str()))
                .unwrap_or_default();
            Some(Segment::Date {
                pattern,
                utc: caps.get(2).is_some(),
            })
        }
        _ => None,
    }
}
