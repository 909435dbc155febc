//! Value renderer
//!
//! Turns any [`Value`] into readable text. Rendering is total: every value
//! produces output, nesting is cut off at the configured depth, and a map
//! reachable from itself is printed as [`CIRCULAR_MARKER`] instead of being
//! walked again.

use super::style::{paint_as, Category};
use super::value::{format_float, Object, Value, CIRCULAR_MARKER, FUNCTION_TOKEN};
use std::collections::HashSet;

/// Placeholder printed once the depth limit is reached
pub const DEPTH_PLACEHOLDER: &str = "...";

/// Options for [`render`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Keep maps on one line instead of one entry per line
    pub inline: bool,
    /// Maximum nesting depth, `None` for unbounded
    pub max_depth: Option<usize>,
    /// Emit colour escape sequences
    pub styled: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            inline: false,
            max_depth: Some(3),
            styled: true,
        }
    }
}

impl RenderOptions {
    /// Single-line, unbounded, unstyled. Used for context values.
    pub const fn compact() -> Self {
        Self {
            inline: true,
            max_depth: None,
            styled: false,
        }
    }

    #[must_use]
    pub fn with_inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_styled(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }
}

/// Render a value to text
pub fn render(value: &Value, options: &RenderOptions) -> String {
    RenderState::new(options).render(value, 0)
}

/// Scratch state for one top-level render call
struct RenderState<'a> {
    options: &'a RenderOptions,
    /// Identities of the objects on the active path
    visited: HashSet<usize>,
}

impl<'a> RenderState<'a> {
    fn new(options: &'a RenderOptions) -> Self {
        Self {
            options,
            visited: HashSet::new(),
        }
    }

    fn render(&mut self, value: &Value, depth: usize) -> String {
        if matches!(self.options.max_depth, Some(max) if depth >= max) {
            return DEPTH_PLACEHOLDER.to_string();
        }

        let styled = self.options.styled;
        match value {
            Value::Null => paint_as("null", Category::Null, styled),
            Value::Undefined => paint_as("undefined", Category::Undefined, styled),
            Value::Pattern(re) => paint_as(&format!("/{}/", re.as_str()), Category::Pattern, styled),
            Value::Array(items) => self.render_array(items, depth),
            Value::Object(object) => self.render_object(object, depth),
            Value::Str(s) => paint_as(&format!("\"{}\"", s), Category::Str, styled),
            Value::Int(i) => paint_as(&i.to_string(), Category::Number, styled),
            Value::Float(f) => paint_as(&format_float(*f), Category::Number, styled),
            Value::Bool(b) => paint_as(if *b { "true" } else { "false" }, Category::Boolean, styled),
            Value::Function => paint_as(FUNCTION_TOKEN, Category::Function, styled),
            Value::Raw(s) => s.clone(),
        }
    }

    /// Render a nested value, substituting the marker for back-references
    fn render_nested(&mut self, value: &Value, depth: usize) -> String {
        if value.is_back_reference(&self.visited) {
            return paint_as(CIRCULAR_MARKER, Category::Circular, self.options.styled);
        }
        self.render(value, depth)
    }

    // Sequences stay on one line whatever the layout option says. Empty
    // containers keep their padding: `[  ]`, `{  }`, `{ \n\n}`.
    fn render_array(&mut self, items: &[Value], depth: usize) -> String {
        let parts: Vec<String> = items
            .iter()
            .map(|item| self.render_nested(item, depth))
            .collect();
        format!("[ {} ]", parts.join(", "))
    }

    fn render_object(&mut self, object: &Object, depth: usize) -> String {
        let entries = object.read();
        let id = object.id();
        self.visited.insert(id);

        let inline = self.options.inline;
        let indent = if inline {
            String::new()
        } else {
            " ".repeat((depth + 1) * 2)
        };

        let mut parts = Vec::with_capacity(entries.len());
        for (key, value) in entries.iter() {
            let key = paint_as(key, Category::Key, self.options.styled);
            let rendered = self.render_nested(value, depth + 1);
            parts.push(format!("{}{}: {}", indent, key, rendered));
        }

        self.visited.remove(&id);

        if inline {
            format!("{{ {} }}", parts.join(", "))
        } else {
            format!("{{ \n{}\n{}}}", parts.join(", \n"), " ".repeat(depth * 2))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::style::has_escape;
    use regex::Regex;

    fn plain(inline: bool, max_depth: Option<usize>) -> RenderOptions {
        RenderOptions {
            inline,
            max_depth,
            styled: false,
        }
    }

    fn sample() -> Value {
        Value::object([
            ("foo", Value::from("bar")),
            ("test", Value::from(42)),
            ("obj", Value::object([("foo", "bar")])),
        ])
    }

    #[test]
    fn test_inline_object() {
        let out = render(&sample(), &plain(true, Some(3)));
        assert_eq!(out, r#"{ foo: "bar", test: 42, obj: { foo: "bar" } }"#);
    }

    #[test]
    fn test_multiline_object() {
        let out = render(&sample(), &plain(false, Some(3)));
        let expected = "{ \n".to_string()
            + "  foo: \"bar\", \n"
            + "  test: 42, \n"
            + "  obj: { \n"
            + "    foo: \"bar\"\n"
            + "  }\n"
            + "}";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_primitives() {
        let opts = plain(true, None);
        assert_eq!(render(&Value::Null, &opts), "null");
        assert_eq!(render(&Value::Undefined, &opts), "undefined");
        assert_eq!(render(&Value::from("hi"), &opts), "\"hi\"");
        assert_eq!(render(&Value::from(1.5), &opts), "1.5");
        assert_eq!(render(&Value::from(false), &opts), "false");
        assert_eq!(render(&Value::Function, &opts), "<function>");
        assert_eq!(render(&Value::Raw("12n".into()), &opts), "12n");
        let re = Regex::new("ab+c").unwrap();
        assert_eq!(render(&Value::from(re), &opts), "/ab+c/");
    }

    #[test]
    fn test_arrays_are_always_inline() {
        let value = Value::object([("list", Value::from(vec![1, 2, 3]))]);
        let out = render(&value, &plain(false, None));
        assert_eq!(out, "{ \n  list: [ 1, 2, 3 ]\n}");
    }

    #[test]
    fn test_empty_containers_keep_padding() {
        let empty = || Value::object(Vec::<(String, Value)>::new());
        assert_eq!(render(&Value::Array(vec![]), &plain(false, None)), "[  ]");
        assert_eq!(render(&Value::Array(vec![]), &plain(true, None)), "[  ]");
        assert_eq!(render(&empty(), &plain(true, None)), "{  }");
        assert_eq!(render(&empty(), &plain(false, None)), "{ \n\n}");

        let nested = Value::object([("inner", empty()), ("list", Value::Array(vec![]))]);
        assert_eq!(render(&nested, &plain(true, None)), "{ inner: {  }, list: [  ] }");
        assert_eq!(
            render(&nested, &plain(false, None)),
            "{ \n  inner: { \n\n  }, \n  list: [  ]\n}"
        );
    }

    #[test]
    fn test_depth_limit() {
        let deep = Value::object([("a", Value::object([("b", Value::object([("c", 1)]))]))]);
        assert_eq!(render(&deep, &plain(true, Some(0))), "...");
        assert_eq!(render(&deep, &plain(true, Some(1))), "{ a: ... }");
        assert_eq!(render(&deep, &plain(true, Some(2))), "{ a: { b: ... } }");
        assert_eq!(render(&deep, &plain(true, None)), "{ a: { b: { c: 1 } } }");
    }

    #[test]
    fn test_self_reference_terminates() {
        let object = Object::new();
        object.insert("name", "loop");
        object.insert("me", object.clone());
        let out = render(&Value::Object(object), &plain(true, None));
        assert_eq!(out, r#"{ name: "loop", me: <circular> }"#);
    }

    #[test]
    fn test_indirect_cycle_through_array() {
        let parent = Object::new();
        let child = Object::new();
        child.insert("parent", parent.clone());
        parent.insert("children", Value::Array(vec![Value::Object(child), Value::Object(parent.clone())]));
        let out = render(&Value::Object(parent), &plain(true, None));
        assert_eq!(out, "{ children: [ { parent: <circular> }, <circular> ] }");
    }

    #[test]
    fn test_shared_sibling_is_not_circular() {
        let shared = Object::from_entries([("x", 1)]);
        let value = Value::object([("a", shared.clone()), ("b", shared)]);
        let out = render(&value, &plain(true, None));
        assert_eq!(out, "{ a: { x: 1 }, b: { x: 1 } }");
    }

    #[test]
    fn test_styled_and_unstyled() {
        let object = Object::from_entries([("s", Value::from("x")), ("n", Value::Null)]);
        object.insert("me", object.clone());
        let value = Value::Object(object);

        let styled = render(&value, &RenderOptions::default().with_inline(true));
        assert!(styled.contains("\x1b[38;2;50;180;190m<circular>\x1b[0m"));
        assert!(styled.contains("\x1b[38;2;200;154;10ms\x1b[0m"));

        let unstyled = render(&value, &RenderOptions::compact());
        assert!(!has_escape(&unstyled));
        assert_eq!(crate::core::style::strip_ansi(&styled), unstyled);
    }
}
