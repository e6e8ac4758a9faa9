//! Resource attribute schemas.
//!
//! The host framework contract: each resource declares its attributes by
//! name with a kind, required/optional/computed flags, deprecation markers,
//! conflict sets and validators. Definitions are validated against the
//! schema before any API call is issued.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::data::ResourceData;

/// Attribute value kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    String,
    Int,
    Bool,
    List,
}

impl AttrKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            AttrKind::String => value.is_string(),
            AttrKind::Int => value.is_i64() || value.is_u64(),
            AttrKind::Bool => value.is_boolean(),
            AttrKind::List => value.is_array(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            AttrKind::String => "string",
            AttrKind::Int => "int",
            AttrKind::Bool => "bool",
            AttrKind::List => "list",
        }
    }
}

/// Per-attribute validation rule.
#[derive(Debug, Clone, Copy)]
pub enum Validator {
    IntBetween(i64, i64),
}

/// One attribute declaration.
#[derive(Debug, Clone)]
pub struct Attr {
    kind: AttrKind,
    required: bool,
    /// Computed-only attributes are outputs; supplying them is an error.
    computed_only: bool,
    deprecated: Option<&'static str>,
    conflicts_with: &'static [&'static str],
    validator: Option<Validator>,
}

impl Attr {
    pub fn required(kind: AttrKind) -> Self {
        Self {
            kind,
            required: true,
            computed_only: false,
            deprecated: None,
            conflicts_with: &[],
            validator: None,
        }
    }

    /// Optional input; may also be filled in from the API response.
    pub fn optional(kind: AttrKind) -> Self {
        Self {
            required: false,
            ..Self::required(kind)
        }
    }

    /// Output-only attribute.
    pub fn computed(kind: AttrKind) -> Self {
        Self {
            required: false,
            computed_only: true,
            ..Self::required(kind)
        }
    }

    pub fn deprecated(mut self, note: &'static str) -> Self {
        self.deprecated = Some(note);
        self
    }

    pub fn conflicts_with(mut self, names: &'static [&'static str]) -> Self {
        self.conflicts_with = names;
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }
}

/// Schema validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unknown attribute {0}")]
    Unknown(String),

    #[error("missing required attribute {0}")]
    MissingRequired(&'static str),

    #[error("attribute {name} must be a {expected}")]
    WrongType {
        name: String,
        expected: &'static str,
    },

    #[error("attribute {0} is computed and cannot be set")]
    ComputedOnly(String),

    #[error("attributes {a} and {b} conflict")]
    Conflict { a: String, b: &'static str },

    #[error("attribute {name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: String,
        min: i64,
        max: i64,
        value: i64,
    },
}

/// Attribute schema for one resource type.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    attrs: BTreeMap<&'static str, Attr>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: &'static str, attr: Attr) -> Self {
        self.attrs.insert(name, attr);
        self
    }

    /// Validate a definition's input attributes.
    pub fn validate(&self, data: &ResourceData) -> Result<(), SchemaError> {
        for (name, value) in data.attrs() {
            let Some(attr) = self.attrs.get(name.as_str()) else {
                return Err(SchemaError::Unknown(name.clone()));
            };
            if attr.computed_only {
                return Err(SchemaError::ComputedOnly(name.clone()));
            }
            if !attr.kind.matches(value) {
                return Err(SchemaError::WrongType {
                    name: name.clone(),
                    expected: attr.kind.name(),
                });
            }
            if let Some(note) = attr.deprecated {
                warn!(attribute = %name, note, "deprecated attribute in use");
            }
            for other in attr.conflicts_with {
                if data.attrs().contains_key(*other) {
                    return Err(SchemaError::Conflict {
                        a: name.clone(),
                        b: other,
                    });
                }
            }
            if let Some(Validator::IntBetween(min, max)) = attr.validator {
                let v = value.as_i64().unwrap_or_default();
                if v < min || v > max {
                    return Err(SchemaError::OutOfRange {
                        name: name.clone(),
                        min,
                        max,
                        value: v,
                    });
                }
            }
        }

        for (name, attr) in &self.attrs {
            if attr.required && !data.attrs().contains_key(*name) {
                return Err(SchemaError::MissingRequired(name));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new()
            .attr("server_instance_no", Attr::required(AttrKind::String))
            .attr(
                "size",
                Attr::required(AttrKind::Int).validator(Validator::IntBetween(10, 1000)),
            )
            .attr("name", Attr::optional(AttrKind::String))
            .attr("status", Attr::computed(AttrKind::String))
            .attr(
                "configuration_no",
                Attr::optional(AttrKind::String)
                    .deprecated("use id instead")
                    .conflicts_with(&["id"]),
            )
            .attr("id", Attr::optional(AttrKind::String))
    }

    fn data(value: serde_json::Value) -> ResourceData {
        ResourceData::from_value(value).unwrap()
    }

    #[test]
    fn accepts_valid_definition() {
        let d = data(json!({"server_instance_no": "123", "size": 20, "name": "disk-a"}));
        schema().validate(&d).unwrap();
    }

    #[test]
    fn rejects_missing_required() {
        let d = data(json!({"size": 20}));
        assert_eq!(
            schema().validate(&d).unwrap_err(),
            SchemaError::MissingRequired("server_instance_no")
        );
    }

    #[test]
    fn rejects_unknown_attribute() {
        let d = data(json!({"server_instance_no": "1", "size": 20, "colour": "red"}));
        assert_eq!(
            schema().validate(&d).unwrap_err(),
            SchemaError::Unknown("colour".to_string())
        );
    }

    #[test]
    fn rejects_out_of_range() {
        let d = data(json!({"server_instance_no": "1", "size": 5000}));
        assert!(matches!(
            schema().validate(&d).unwrap_err(),
            SchemaError::OutOfRange { value: 5000, .. }
        ));
    }

    #[test]
    fn rejects_computed_input() {
        let d = data(json!({"server_instance_no": "1", "size": 20, "status": "ATTAC"}));
        assert_eq!(
            schema().validate(&d).unwrap_err(),
            SchemaError::ComputedOnly("status".to_string())
        );
    }

    #[test]
    fn rejects_conflicting_attributes() {
        let d = data(json!({
            "server_instance_no": "1",
            "size": 20,
            "configuration_no": "7",
            "id": "7"
        }));
        assert!(matches!(
            schema().validate(&d).unwrap_err(),
            SchemaError::Conflict { .. }
        ));
    }

    #[test]
    fn rejects_wrong_type() {
        let d = data(json!({"server_instance_no": "1", "size": "twenty"}));
        assert!(matches!(
            schema().validate(&d).unwrap_err(),
            SchemaError::WrongType { .. }
        ));
    }
}
