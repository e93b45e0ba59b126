use std::collections::BTreeMap;

use fleet_codec::{Data, DataType, Value};

/// Key/value side-table of typed attributes attached to jobs and nodes.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Attributes(BTreeMap<String, Value>);

impl Attributes {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Insert or overwrite an attribute. Returns `self` for chaining.
    pub fn insert(&mut self, key: impl Into<String>, data: Data) -> &mut Self {
        let key = key.into();
        self.0.insert(key.clone(), Value::keyed(key, data));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Fetch an `Int32` attribute. `None` if absent or stored with another type.
    pub fn get_i32(&self, key: &str) -> Option<i32> {
        match self.unload(key, DataType::Int32)? {
            Data::Int32(v) => Some(v),
            _ => None,
        }
    }

    /// Fetch a `String` attribute. `None` if absent, null, or stored with another type.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.unload(key, DataType::String)? {
            Data::String(s) => s,
            _ => None,
        }
    }

    /// Fetch a `Bool` attribute. `None` if absent or stored with another type.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.unload(key, DataType::Bool)? {
            Data::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn unload(&self, key: &str, ty: DataType) -> Option<Data> {
        let value = self.0.get(key)?;
        let mut slot = Data::zeroed(ty);
        value.unload(Some(&mut slot), ty).ok()?;
        slot
    }
}
