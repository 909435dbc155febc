//! Structured logging context
//!
//! A [`Context`] is attached to a logger and included in every record it
//! produces. Contexts never change after construction: deriving a child
//! logger copies the parent's fields and merges the new ones in, so loggers
//! of the same lineage can read their contexts from any thread without
//! coordination.

use super::render::{render, RenderOptions};
use super::value::Value;
use std::fmt;
use std::sync::Arc;

/// Immutable, insertion-ordered key/value fields
#[derive(Debug, Clone, Default)]
pub struct Context {
    fields: Arc<Vec<(String, Value)>>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a context with `key` set, overriding an existing entry in place
    #[must_use]
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let key = key.into();
        let value = value.into();
        let fields = Arc::make_mut(&mut self.fields);
        match fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => fields.push((key, value)),
        }
        self
    }

    /// Copy-and-merge: fields of `child` override fields of `self`.
    ///
    /// Overridden keys keep their original position; new keys are appended.
    #[must_use]
    pub fn merge(&self, child: &Context) -> Context {
        if child.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return child.clone();
        }
        child
            .iter()
            .fold(self.clone(), |merged, (k, v)| merged.with_field(k.clone(), v.clone()))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Value)> {
        self.fields.iter()
    }

    /// Check if context has any fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Format fields as `key=value` pairs separated by `", "`
    pub fn format_fields(&self) -> String {
        let options = RenderOptions::compact();
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, render(v, &options)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<K, V> FromIterator<(K, V)> for Context
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Context::new(), |ctx, (k, v)| ctx.with_field(k, v))
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_fields())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_creation() {
        let ctx = Context::new();
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_context_with_fields() {
        let ctx = Context::new()
            .with_field("user_id", 123)
            .with_field("username", "john_doe")
            .with_field("active", true);

        assert_eq!(ctx.len(), 3);
        assert!(matches!(ctx.get("user_id"), Some(Value::Int(123))));
    }

    #[test]
    fn test_context_format() {
        let ctx = Context::new()
            .with_field("foo", "bar")
            .with_field("test", 42)
            .with_field("obj", Value::object([("foo", "bar")]));

        assert_eq!(ctx.format_fields(), r#"foo="bar", test=42, obj={ foo: "bar" }"#);
    }

    #[test]
    fn test_merge_child_overrides_in_place() {
        let parent: Context = [("service", "api"), ("region", "eu")].into_iter().collect();
        let child = Context::new()
            .with_field("region", "us")
            .with_field("request", 7);

        let merged = parent.merge(&child);
        let keys: Vec<&str> = merged.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["service", "region", "request"]);
        assert!(matches!(merged.get("region"), Some(Value::Str(s)) if s == "us"));
    }

    #[test]
    fn test_merge_leaves_parent_untouched() {
        let parent = Context::new().with_field("k", 1);
        let _merged = parent.merge(&Context::new().with_field("k", 2));
        assert!(matches!(parent.get("k"), Some(Value::Int(1))));
    }
}
