//! `junos_policyoptions_prefix_list`: `policy-options prefix-list <name>`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ConfigResource;
use crate::error::{Error, Result};
use crate::junos::setline::{cut_prefix, quote, trim_quotes};
use crate::schema::validate::{self, parse_cidr};
use crate::schema::{AttrKind, Attribute, NameFormat, Schema};

/// A prefix list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrefixList {
    pub name: String,
    pub apply_path: Option<String>,
    pub dynamic_db: bool,
    pub prefix: Vec<String>,
}

#[async_trait]
impl ConfigResource for PrefixList {
    const TYPE_NAME: &'static str = "junos_policyoptions_prefix_list";
    const DISPLAY_NAME: &'static str = "policy-options prefix-list";
    const IMPORT_ID_FORMAT: &'static str = "<name>";

    fn schema() -> Schema {
        Schema::new(
            0,
            "Provides a prefix list.",
            vec![
                Attribute::required("name", AttrKind::String, "Prefix list name.").force_new(),
                Attribute::optional(
                    "apply_path",
                    AttrKind::String,
                    "Apply IP prefixes from a configuration statement.",
                ),
                Attribute::optional(
                    "dynamic_db",
                    AttrKind::Bool,
                    "Object may exist in dynamic database.",
                ),
                Attribute::optional("prefix", AttrKind::StringSet, "Address prefixes."),
            ],
        )
    }

    fn id(&self) -> String {
        self.name.clone()
    }

    fn from_id(id: &str) -> Option<Self> {
        (!id.is_empty()).then(|| Self {
            name: id.to_string(),
            ..Default::default()
        })
    }

    fn identity(&self) -> Self {
        Self {
            name: self.name.clone(),
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<()> {
        validate::name("name", &self.name, 250, NameFormat::Address)?;
        if let Some(path) = &self.apply_path {
            validate::length("apply_path", path, 1, 1024)?;
            validate::no_double_quotes("apply_path", path)?;
        }
        for prefix in &self.prefix {
            validate::cidr("prefix", prefix)?;
        }
        validate::unique("prefix", &self.prefix)?;
        if self.prefix.is_empty() && self.apply_path.is_none() && !self.dynamic_db {
            return Err(Error::validation(
                "prefix",
                "one of prefix, apply_path or dynamic_db must be set",
            ));
        }
        Ok(())
    }

    fn config_path(&self) -> String {
        format!("policy-options prefix-list {}", self.name)
    }

    fn statements(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(path) = &self.apply_path {
            lines.push(format!("apply-path {}", quote(path)));
        }
        if self.dynamic_db {
            lines.push("dynamic-db".to_string());
        }
        lines.extend(self.prefix.iter().cloned());
        lines
    }

    fn parse_line(&mut self, line: &str) -> Result<()> {
        if let Some(v) = cut_prefix(line, "apply-path") {
            self.apply_path = Some(trim_quotes(v).to_string());
        } else if line == "dynamic-db" {
            self.dynamic_db = true;
        } else if parse_cidr(line).is_some() {
            self.prefix.push(line.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::reparse;

    #[test]
    fn test_set_lines() {
        let list = PrefixList {
            name: "mgmt".to_string(),
            prefix: vec!["192.0.2.0/24".to_string(), "2001:db8::/32".to_string()],
            ..Default::default()
        };
        assert_eq!(
            list.set_lines(),
            vec![
                "set policy-options prefix-list mgmt",
                "set policy-options prefix-list mgmt 192.0.2.0/24",
                "set policy-options prefix-list mgmt 2001:db8::/32",
            ]
        );
        assert_eq!(reparse(&list), list);
    }

    #[test]
    fn test_apply_path_round_trip() {
        let list = PrefixList {
            name: "bgp-peers".to_string(),
            apply_path: Some("protocols bgp group <*> neighbor <*>".to_string()),
            dynamic_db: true,
            ..Default::default()
        };
        assert!(list.statements()[0].starts_with("apply-path \"protocols"));
        assert_eq!(reparse(&list), list);
    }

    #[test]
    fn test_validate() {
        let empty = PrefixList {
            name: "empty".to_string(),
            ..Default::default()
        };
        assert!(empty.validate().is_err());

        let duplicate = PrefixList {
            name: "dup".to_string(),
            prefix: vec!["192.0.2.0/24".to_string(), "192.0.2.0/24".to_string()],
            ..Default::default()
        };
        assert!(duplicate.validate().is_err());

        let quoted = PrefixList {
            name: "q".to_string(),
            apply_path: Some("a \"b\"".to_string()),
            ..Default::default()
        };
        assert!(quoted.validate().is_err());
    }
}
