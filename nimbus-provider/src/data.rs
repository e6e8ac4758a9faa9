//! Flat attribute map backing one resource definition.
//!
//! Transfer objects read from the API are flattened into the map by serde;
//! fields the API did not return stay unset.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::error::{ProviderError, Result};
use crate::filter::Filter;

/// Attribute map plus the resource identifier assigned on create.
#[derive(Debug, Clone, Default)]
pub struct ResourceData {
    id: Option<String>,
    attrs: Map<String, Value>,
}

impl ResourceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object of input attributes.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(attrs) => Ok(Self { id: None, attrs }),
            other => Err(ProviderError::InvalidAttributes(format!(
                "expected an attribute object, got {other}"
            ))),
        }
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            attrs: Map::new(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Mark the resource as absent (read found nothing).
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    pub fn attrs(&self) -> &Map<String, Value> {
        &self.attrs
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    pub fn get_string(&self, name: &str) -> Option<String> {
        self.attrs.get(name)?.as_str().map(str::to_string)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.attrs.get(name)?.as_i64()
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.attrs.get(name)?.as_bool()
    }

    pub fn get_string_list(&self, name: &str) -> Option<Vec<String>> {
        let items = self.attrs.get(name)?.as_array()?;
        Some(
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        )
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attrs.insert(name.into(), value.into());
    }

    /// Flatten a transfer object into the map. `None` fields serialize to
    /// null and are skipped, leaving any previous value in place.
    pub fn merge_flat<T: Serialize>(&mut self, obj: &T) -> Result<()> {
        let value = serde_json::to_value(obj).map_err(|e| {
            ProviderError::InvalidAttributes(format!("transfer object not serializable: {e}"))
        })?;
        let Value::Object(fields) = value else {
            return Err(ProviderError::InvalidAttributes(
                "transfer object did not flatten to an object".to_string(),
            ));
        };
        for (name, value) in fields {
            if !value.is_null() {
                self.attrs.insert(name, value);
            }
        }
        Ok(())
    }

    /// Parse the `filter` attribute into filter blocks, if present.
    pub fn filters(&self) -> Result<Vec<Filter>> {
        match self.attrs.get("filter") {
            None => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                ProviderError::InvalidFilter {
                    name: "filter".to_string(),
                    reason: e.to_string(),
                }
            }),
        }
    }

    /// Full JSON view: attributes plus the id.
    pub fn to_json(&self) -> Value {
        let mut out = self.attrs.clone();
        if let Some(id) = &self.id {
            out.insert("id".to_string(), json!(id));
        }
        Value::Object(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Dto {
        name: Option<String>,
        size: Option<i64>,
        status: Option<String>,
    }

    #[test]
    fn merge_flat_skips_unset_fields() {
        let mut d = ResourceData::from_value(serde_json::json!({"size": 10})).unwrap();
        d.merge_flat(&Dto {
            name: Some("disk".to_string()),
            size: None,
            status: Some("ATTAC".to_string()),
        })
        .unwrap();

        assert_eq!(d.get_string("name").as_deref(), Some("disk"));
        assert_eq!(d.get_string("status").as_deref(), Some("ATTAC"));
        // size was None in the response; input value survives
        assert_eq!(d.get_i64("size"), Some(10));
    }

    #[test]
    fn typed_getters() {
        let d = ResourceData::from_value(serde_json::json!({
            "name": "db",
            "port": 3306,
            "is_ha": true,
            "zones": ["KR-1", "KR-2"]
        }))
        .unwrap();
        assert_eq!(d.get_string("name").as_deref(), Some("db"));
        assert_eq!(d.get_i64("port"), Some(3306));
        assert_eq!(d.get_bool("is_ha"), Some(true));
        assert_eq!(
            d.get_string_list("zones").unwrap(),
            vec!["KR-1".to_string(), "KR-2".to_string()]
        );
        assert!(d.get_string("missing").is_none());
    }

    #[test]
    fn id_round_trip() {
        let mut d = ResourceData::new();
        assert!(d.id().is_none());
        d.set_id("1234");
        assert_eq!(d.id(), Some("1234"));
        assert_eq!(d.to_json()["id"], "1234");
        d.clear_id();
        assert!(d.id().is_none());
    }
}
