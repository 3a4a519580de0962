//! Value types for yamlet documents.
//!
//! Every parsed document reduces to one [`Value`]:
//! - `null` (an empty document) is `Value::Null`
//! - `hello` is `Value::Scalar("hello")`
//! - `- a` / `[a]` is `Value::Sequence(...)`
//! - `a: 1` / `{a: 1}` is `Value::Mapping(...)`
//!
//! Mappings keep their entries in insertion order and allow any value as a
//! key. Assigning to an existing key replaces the value in place, so the
//! entry keeps the position of the key's first assignment.

/// A yamlet value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// The absent value: produced by an empty document.
    #[default]
    Null,
    /// A scalar: decoded UTF-8 text.
    Scalar(String),
    /// An ordered sequence of values.
    Sequence(Vec<Value>),
    /// A key-ordered mapping.
    Mapping(Mapping),
}

/// A mapping: entries in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mapping {
    /// Entries in the mapping.
    pub entries: Vec<Entry>,
}

/// An entry in a mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The key. Need not be a scalar.
    pub key: Value,
    /// The value.
    pub value: Value,
}

impl Value {
    /// Create a scalar value.
    pub fn scalar(text: impl Into<String>) -> Self {
        Value::Scalar(text.into())
    }

    /// Create a sequence with items.
    pub fn seq(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }

    /// Create a mapping from (key, value) pairs.
    pub fn map(pairs: Vec<(Value, Value)>) -> Self {
        let mut mapping = Mapping::new();
        for (key, value) in pairs {
            mapping.insert(key, value);
        }
        Value::Mapping(mapping)
    }

    /// Check if this is the absent value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the scalar text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(text) => Some(text),
            _ => None,
        }
    }

    /// Get as a sequence.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Get as a mutable sequence.
    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Get as a mapping.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    /// Get as a mutable mapping.
    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Value::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    /// Get a mapping entry by scalar key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// Get a value by dotted path.
    ///
    /// Path segments are separated by `.`; use `[n]` for sequence indexing:
    /// `value.get_path("server.hosts[0]")`. A key segment only descends into
    /// a mapping and an index segment only into a sequence; anything else
    /// finds nothing.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut current = self;
        let mut rest = path;
        while !rest.is_empty() {
            let tail;
            if let Some(after) = rest.strip_prefix('[') {
                let (index, remainder) = after.split_once(']')?;
                current = current.as_sequence()?.get(index.parse::<usize>().ok()?)?;
                tail = remainder;
            } else {
                let end = rest.find(['.', '[']).unwrap_or(rest.len());
                let (key, remainder) = rest.split_at(end);
                current = current.as_mapping()?.get(key)?;
                tail = remainder;
            }
            rest = tail.strip_prefix('.').unwrap_or(tail);
        }
        Some(current)
    }
}

impl Mapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Mapping {
            entries: Vec::new(),
        }
    }

    /// Get an entry's value by scalar key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|e| e.key.as_str() == Some(key))
            .map(|e| &e.value)
    }

    /// Get a mutable entry value by scalar key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|e| e.key.as_str() == Some(key))
            .map(|e| &mut e.value)
    }

    /// Check if a key exists. Compares full key values, not just scalars.
    pub fn contains_key(&self, key: &Value) -> bool {
        self.entries.iter().any(|e| &e.key == key)
    }

    /// Insert or update an entry.
    ///
    /// An existing entry with an equal key has its value replaced in place,
    /// keeping the position of the key's first assignment.
    pub fn insert(&mut self, key: Value, value: Value) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.key == key) {
            entry.value = value;
        } else {
            self.entries.push(Entry { key, value });
        }
    }

    /// Iterate over entries as (key, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|e| (&e.key, &e.value))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_value() {
        let v = Value::Null;
        assert!(v.is_null());
        assert_eq!(v.as_str(), None);
        assert_eq!(Value::default(), Value::Null);
    }

    #[test]
    fn test_scalar_value() {
        let v = Value::scalar("hello");
        assert!(!v.is_null());
        assert_eq!(v.as_str(), Some("hello"));
    }

    #[test]
    fn test_mapping_get() {
        let mut mapping = Mapping::new();
        mapping.insert(Value::scalar("name"), Value::scalar("Alice"));

        assert_eq!(mapping.get("name").and_then(|v| v.as_str()), Some("Alice"));
        assert_eq!(mapping.get("missing"), None);

        mapping.insert(Value::scalar("age"), Value::scalar("30"));
        assert_eq!(mapping.get("age").and_then(|v| v.as_str()), Some("30"));
    }

    #[test]
    fn test_mapping_insert_replaces_in_place() {
        let mut mapping = Mapping::new();
        mapping.insert(Value::scalar("a"), Value::scalar("1"));
        mapping.insert(Value::scalar("b"), Value::scalar("2"));
        mapping.insert(Value::scalar("a"), Value::scalar("3"));

        assert_eq!(mapping.len(), 2);
        // `a` keeps its first-assignment position.
        assert_eq!(mapping.entries[0].key.as_str(), Some("a"));
        assert_eq!(mapping.entries[0].value.as_str(), Some("3"));
        assert_eq!(mapping.entries[1].key.as_str(), Some("b"));
    }

    #[test]
    fn test_non_scalar_key() {
        let mut mapping = Mapping::new();
        let key = Value::seq(vec![Value::scalar("a"), Value::scalar("b")]);
        mapping.insert(key.clone(), Value::scalar("1"));

        assert!(mapping.contains_key(&key));
        // Scalar lookup does not match container keys.
        assert_eq!(mapping.get("a"), None);
    }

    #[test]
    fn test_path_access() {
        let value = Value::map(vec![
            (
                Value::scalar("user"),
                Value::map(vec![(Value::scalar("name"), Value::scalar("Alice"))]),
            ),
            (
                Value::scalar("items"),
                Value::seq(vec![
                    Value::scalar("a"),
                    Value::scalar("b"),
                    Value::scalar("c"),
                ]),
            ),
        ]);

        assert_eq!(
            value.get_path("user.name").and_then(|v| v.as_str()),
            Some("Alice")
        );
        assert_eq!(
            value.get_path("items[0]").and_then(|v| v.as_str()),
            Some("a")
        );
        assert_eq!(
            value.get_path("items[2]").and_then(|v| v.as_str()),
            Some("c")
        );
        assert_eq!(value.get_path("missing"), None);
        assert_eq!(value.get_path("user.name.deeper"), None);
    }

    #[test]
    fn test_path_edge_cases() {
        let value = Value::map(vec![(
            Value::scalar("hosts"),
            Value::seq(vec![Value::scalar("alpha"), Value::scalar("beta")]),
        )]);

        // The empty path addresses the value itself.
        assert_eq!(value.get_path(""), Some(&value));
        // Indexing a mapping or keying into a sequence finds nothing.
        assert_eq!(value.get_path("[0]"), None);
        assert_eq!(value.get_path("hosts.alpha"), None);
        // Out-of-range, non-numeric, and unclosed indices find nothing.
        assert_eq!(value.get_path("hosts[2]"), None);
        assert_eq!(value.get_path("hosts[x]"), None);
        assert_eq!(value.get_path("hosts[0"), None);
    }
}
