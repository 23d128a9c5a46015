//! Schemas, validators and diagnostics shared by resources and data sources.

pub mod diagnostics;
pub mod validate;

use serde::Serialize;

pub use diagnostics::{has_error, Diagnostic, Response, Severity};
pub use validate::NameFormat;

/// Value type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrKind {
    /// String
    String,
    /// Integer
    Int,
    /// Boolean
    Bool,
    /// List of strings
    StringList,
    /// Set of strings
    StringSet,
    /// Nested block(s)
    Block,
}

/// How an attribute is supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrMode {
    /// Must be set by the user
    Required,
    /// May be set by the user
    Optional,
    /// Set by the provider
    Computed,
    /// May be set, otherwise filled by the provider
    OptionalComputed,
}

/// Description of one attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    /// Attribute name
    pub name: &'static str,
    /// Value type
    pub kind: AttrKind,
    /// Who sets it
    pub mode: AttrMode,
    /// Changing it replaces the object
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub force_new: bool,
    /// Short description
    pub description: &'static str,
}

impl Attribute {
    fn new(name: &'static str, kind: AttrKind, mode: AttrMode, description: &'static str) -> Self {
        Self {
            name,
            kind,
            mode,
            force_new: false,
            description,
        }
    }

    /// Required attribute
    pub fn required(name: &'static str, kind: AttrKind, description: &'static str) -> Self {
        Self::new(name, kind, AttrMode::Required, description)
    }

    /// Optional attribute
    pub fn optional(name: &'static str, kind: AttrKind, description: &'static str) -> Self {
        Self::new(name, kind, AttrMode::Optional, description)
    }

    /// Computed attribute
    pub fn computed(name: &'static str, kind: AttrKind, description: &'static str) -> Self {
        Self::new(name, kind, AttrMode::Computed, description)
    }

    /// Optional attribute with a provider-chosen default
    pub fn optional_computed(
        name: &'static str,
        kind: AttrKind,
        description: &'static str,
    ) -> Self {
        Self::new(name, kind, AttrMode::OptionalComputed, description)
    }

    /// Mark the attribute as part of the object identity
    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }
}

/// Schema of a resource or data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    /// Schema version
    pub version: u64,
    /// Short description
    pub description: &'static str,
    /// Attributes, `id` first
    pub attributes: Vec<Attribute>,
}

impl Schema {
    /// Build a schema; a computed `id` attribute is prepended
    pub fn new(version: u64, description: &'static str, attributes: Vec<Attribute>) -> Self {
        let mut all = vec![Attribute::computed(
            "id",
            AttrKind::String,
            "Identifier of the object",
        )];
        all.extend(attributes);
        Self {
            version,
            description,
            attributes: all,
        }
    }

    /// Attribute by name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Names of the identity attributes
    pub fn force_new_attributes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes.iter().filter(|a| a.force_new).map(|a| a.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_prepends_id() {
        let schema = Schema::new(
            1,
            "test",
            vec![Attribute::required("name", AttrKind::String, "Name").force_new()],
        );
        assert_eq!(schema.attributes[0].name, "id");
        assert_eq!(schema.attribute("id").unwrap().mode, AttrMode::Computed);
        assert_eq!(schema.force_new_attributes().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn test_schema_serializes() {
        let schema = Schema::new(0, "x", vec![Attribute::optional("a", AttrKind::Bool, "")]);
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["attributes"][1]["mode"], "optional");
        assert!(json["attributes"][1].get("force_new").is_none());
    }
}
