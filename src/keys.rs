use std::fmt;

use crate::{Error, ToSpanner, Value};

/// The primary key of a row: one value per key column, in key order.
#[derive(Debug, Clone, PartialEq)]
pub struct Key(Vec<Value>);

impl Key {
    pub fn new(parts: Vec<Value>) -> Self {
        Key(parts)
    }

    /// Builds a key from heterogeneous Rust values.
    pub fn of(parts: &[&dyn ToSpanner]) -> Result<Self, Error> {
        parts
            .iter()
            .map(|part| part.to_spanner())
            .collect::<Result<Vec<Value>, Error>>()
            .map(Key)
    }

    pub fn parts(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Value> for Key {
    fn from(v: Value) -> Self {
        Key(vec![v])
    }
}

impl From<(Value, Value)> for Key {
    fn from(v: (Value, Value)) -> Self {
        let (a, b) = v;
        Key(vec![a, b])
    }
}

impl FromIterator<Value> for Key {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Key(iter.into_iter().collect())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (idx, part) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, ",")?;
            }
            match part.try_to_text() {
                Ok(text) => write!(f, "{}", text)?,
                Err(_) if part.is_null() => write!(f, "<null>")?,
                Err(_) => write!(f, "{:?}", part)?,
            }
        }
        write!(f, "]")
    }
}

/// A set of primary keys, or every row of a table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeySet {
    all: bool,
    keys: Vec<Key>,
}

impl KeySet {
    pub fn all() -> Self {
        Self {
            all: true,
            keys: vec![],
        }
    }

    pub fn is_all(&self) -> bool {
        self.all
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }
}

impl From<Key> for KeySet {
    fn from(key: Key) -> Self {
        Self {
            all: false,
            keys: vec![key],
        }
    }
}

impl From<Vec<Key>> for KeySet {
    fn from(keys: Vec<Key>) -> Self {
        Self { all: false, keys }
    }
}

#[cfg(feature = "grpc")]
mod wire {
    use super::{Key, KeySet};
    use google_api_proto::google::spanner::v1::KeySet as SpannerKeySet;
    use prost_types::ListValue;

    impl From<Key> for ListValue {
        fn from(key: Key) -> Self {
            ListValue {
                values: key.0.into_iter().map(|v| v.into()).collect(),
            }
        }
    }

    impl From<KeySet> for SpannerKeySet {
        fn from(key_set: KeySet) -> Self {
            SpannerKeySet {
                all: key_set.all,
                keys: key_set.keys.into_iter().map(|v| v.into()).collect(),
                ranges: vec![],
            }
        }
    }
}
