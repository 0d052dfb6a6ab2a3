use crate::kind::RecordKind;
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Index;

pub use rmpv::Value as RecordValue;

/// Untyped record as decoded from the wire: string keys to MessagePack values.
///
/// Values keep their wire type (an `f32` stays an `f32`, NaN and infinities
/// included) and keys keep wire order, so a parsed record builds back into
/// the same content. Duplicate keys collapse to the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordMap {
    entries: Vec<(String, RecordValue)>,
}

impl RecordMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&RecordValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut RecordValue> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set a field, keeping its position if it already exists
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<RecordValue>,
    ) -> Option<RecordValue> {
        let key = key.into();
        let value = value.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<RecordValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RecordValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field-by-field equality with floats compared by bit pattern.
    ///
    /// Unlike `==`, a NaN field matches the same NaN on the other side.
    pub fn same_content(&self, other: &RecordMap) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|((ka, va), (kb, vb))| ka == kb && same_value(va, vb))
    }
}

/// Structural equality on MessagePack values, floats compared by bit pattern
pub fn same_value(a: &RecordValue, b: &RecordValue) -> bool {
    match (a, b) {
        (RecordValue::F32(x), RecordValue::F32(y)) => x.to_bits() == y.to_bits(),
        (RecordValue::F64(x), RecordValue::F64(y)) => x.to_bits() == y.to_bits(),
        (RecordValue::Array(x), RecordValue::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| same_value(x, y))
        }
        (RecordValue::Map(x), RecordValue::Map(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .zip(y)
                    .all(|((kx, vx), (ky, vy))| same_value(kx, ky) && same_value(vx, vy))
        }
        _ => a == b,
    }
}

impl Index<&str> for RecordMap {
    type Output = RecordValue;

    fn index(&self, key: &str) -> &RecordValue {
        match self.get(key) {
            Some(value) => value,
            None => panic!("no field `{key}` in record"),
        }
    }
}

impl<K: Into<String>, V: Into<RecordValue>> FromIterator<(K, V)> for RecordMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = RecordMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl IntoIterator for RecordMap {
    type Item = (String, RecordValue);
    type IntoIter = std::vec::IntoIter<(String, RecordValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for RecordMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RecordMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordMapVisitor;

        impl<'de> Visitor<'de> for RecordMapVisitor {
            type Value = RecordMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map with string keys")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RecordMap, A::Error> {
                let mut map = RecordMap {
                    entries: Vec::with_capacity(access.size_hint().unwrap_or(0).min(256)),
                };
                while let Some((key, value)) = access.next_entry::<String, RecordValue>()? {
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(RecordMapVisitor)
    }
}

/// A typed record bound to the guest export pair that parses and builds it.
pub trait SaveRecord: Serialize + DeserializeOwned {
    const KIND: RecordKind;
}
