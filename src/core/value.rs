//! Dynamic values carried by log calls and contexts
//!
//! Log arguments are free-form: strings, numbers, nested maps, lists,
//! patterns, and so on. [`Value`] models them as a closed enum. Maps are
//! represented by [`Object`], a shared handle, so the same map can appear
//! in several places (including inside itself). Rendering keys cycle
//! detection on the handle's identity, never on structural equality.

use parking_lot::RwLock;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Marker substituted for a back-reference to an object on the active path
pub const CIRCULAR_MARKER: &str = "<circular>";

/// Token used for callables, which are never serialized
pub const FUNCTION_TOKEN: &str = "<function>";

#[derive(Debug, Clone, Default)]
pub enum Value {
    Null,
    /// Absent value, distinct from `Null`
    #[default]
    Undefined,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Pattern(Regex),
    Array(Vec<Value>),
    Object(Object),
    Function,
    /// Any other primitive, kept in its textual form
    Raw(String),
}

impl Value {
    /// Build an object value from key/value pairs
    pub fn object<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Object(Object::from_entries(entries))
    }

    /// Whether the value renders as structure (maps, lists, patterns, null)
    /// rather than as a bare token
    pub fn is_object_like(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Pattern(_) | Value::Array(_) | Value::Object(_)
        )
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Text used when the value stands for a key (string or number only)
    pub fn as_key(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(format_float(*f)),
            _ => None,
        }
    }

    /// Default textual conversion, used where a value is emitted as-is
    pub fn to_plain_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Undefined => "undefined".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Str(s) | Value::Raw(s) => s.clone(),
            Value::Pattern(re) => format!("/{}/", re.as_str()),
            Value::Function => FUNCTION_TOKEN.to_string(),
            Value::Array(_) | Value::Object(_) => self
                .to_json()
                .map(|json| json.to_string())
                .unwrap_or_default(),
        }
    }

    /// Convert to JSON.
    ///
    /// Returns `None` for values that have no JSON form (absent values and
    /// callables). Inside objects such entries are skipped, inside arrays
    /// they become `null`. Back-references become [`CIRCULAR_MARKER`].
    pub fn to_json(&self) -> Option<serde_json::Value> {
        let mut path = HashSet::new();
        self.to_json_on_path(&mut path)
    }

    fn to_json_on_path(&self, path: &mut HashSet<usize>) -> Option<serde_json::Value> {
        use serde_json::Value as Json;

        match self {
            Value::Undefined | Value::Function => None,
            Value::Null => Some(Json::Null),
            Value::Bool(b) => Some(Json::Bool(*b)),
            Value::Int(i) => Some(Json::Number((*i).into())),
            Value::Float(f) => Some(
                serde_json::Number::from_f64(*f)
                    .map(Json::Number)
                    .unwrap_or(Json::Null),
            ),
            Value::Str(s) | Value::Raw(s) => Some(Json::String(s.clone())),
            Value::Pattern(re) => Some(Json::String(format!("/{}/", re.as_str()))),
            Value::Array(items) => Some(Json::Array(
                items
                    .iter()
                    .map(|item| {
                        if item.is_back_reference(path) {
                            return Json::String(CIRCULAR_MARKER.to_string());
                        }
                        item.to_json_on_path(path).unwrap_or(Json::Null)
                    })
                    .collect(),
            )),
            Value::Object(object) => {
                let id = object.id();
                path.insert(id);
                let mut map = serde_json::Map::new();
                for (key, value) in object.read().iter() {
                    if value.is_back_reference(path) {
                        map.insert(key.clone(), Json::String(CIRCULAR_MARKER.to_string()));
                    } else if let Some(json) = value.to_json_on_path(path) {
                        map.insert(key.clone(), json);
                    }
                }
                path.remove(&id);
                Some(Json::Object(map))
            }
        }
    }

    /// Whether this value is an object already on the rendering path
    pub(crate) fn is_back_reference(&self, path: &HashSet<usize>) -> bool {
        matches!(self, Value::Object(object) if path.contains(&object.id()))
    }
}

/// Render a float the way dynamic runtimes print numbers: integral values
/// have no fractional part
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        let text = if f > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if f == 0.0 {
        "0".to_string()
    } else if f.fract() == 0.0 && f.abs() < 1e21 {
        format!("{:.0}", f)
    } else {
        f.to_string()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json()
            .unwrap_or(serde_json::Value::Null)
            .serialize(serializer)
    }
}

/// Shared, insertion-ordered map.
///
/// Cloning an `Object` clones the handle: both clones refer to the same
/// entries, exactly like references to a map in a dynamic language.
#[derive(Clone, Default)]
pub struct Object {
    entries: Arc<RwLock<Vec<(String, Value)>>>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let object = Self::new();
        for (key, value) in entries {
            object.insert(key, value);
        }
        object
    }

    /// Insert or overwrite. An existing key keeps its position.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        let mut entries = self.entries.write();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .read_recursive()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Snapshot of the entries in insertion order
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.entries.read_recursive().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read_recursive().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read_recursive().is_empty()
    }

    /// Identity of the shared allocation
    #[inline]
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.entries) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    /// Recursive read guard, safe to hold while nested objects are read
    pub(crate) fn read(&self) -> parking_lot::RwLockReadGuard<'_, Vec<(String, Value)>> {
        self.entries.read_recursive()
    }
}

impl fmt::Debug for Object {
    // Entries are not printed: the graph may be cyclic.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("id", &format_args!("{:#x}", self.id()))
            .field("len", &self.len())
            .finish()
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(i: $t) -> Self {
                Value::Int(i as i64)
            }
        })*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(i: u64) -> Self {
        i64::try_from(i)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Raw(i.to_string()))
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::from(i as u64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f as f64)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Undefined
    }
}

impl From<Regex> for Value {
    fn from(re: Regex) -> Self {
        Value::Pattern(re)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Raw(n.to_string())),
            },
            Json::String(s) => Value::Str(s),
            Json::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Value::object(map),
        }
    }
}
