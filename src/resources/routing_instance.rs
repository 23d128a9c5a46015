//! `junos_routing_instance`: `routing-instances <name>`.
//!
//! Only the options below are managed. Interfaces, protocols and other
//! statements configured elsewhere in the instance survive updates.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ConfigResource;
use crate::error::{Error, Result};
use crate::junos::setline::{cut_prefix, quote, trim_quotes};
use crate::junos::{Session, SetLines};
use crate::schema::{validate, AttrKind, Attribute, NameFormat, Schema};

/// Name of the master instance, which cannot be managed
pub const DEFAULT_INSTANCE: &str = "default";

const INSTANCE_TYPES: &[&str] = &[
    "",
    "evpn",
    "evpn-vpws",
    "forwarding",
    "l2backhaul-vpn",
    "l2vpn",
    "layer2-control",
    "mac-vrf",
    "mpls-forwarding",
    "mpls-internet-multicast",
    "no-forwarding",
    "virtual-router",
    "virtual-switch",
    "vpls",
    "vrf",
];

static ROUTE_DISTINGUISHER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d|\.)+L?:\d+$").expect("Invalid route distinguisher regex")
});

static VRF_TARGET_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^target:(\d|\.)+L?:\d+$").expect("Invalid vrf target regex")
});

/// Fail unless the routing instance is configured
pub async fn check_exists(session: &mut Session, name: &str) -> Result<()> {
    if name == DEFAULT_INSTANCE {
        return Ok(());
    }
    match session
        .show_set_lines(&format!("routing-instances {}", name))
        .await?
    {
        Some(_) => Ok(()),
        None => Err(Error::NotFound(format!(
            "routing instance {} doesn't exist",
            name
        ))),
    }
}

/// A routing instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutingInstance {
    pub name: String,
    /// `instance-type`; empty means none
    #[serde(rename = "type")]
    pub instance_type: String,
    pub description: Option<String>,
    pub instance_export: Vec<String>,
    pub instance_import: Vec<String>,
    pub route_distinguisher: Option<String>,
    pub router_id: Option<String>,
    pub vrf_export: Vec<String>,
    pub vrf_import: Vec<String>,
    pub vrf_target: Option<String>,
    pub vrf_target_auto: bool,
    pub vtep_source_interface: Option<String>,
}

impl Default for RoutingInstance {
    fn default() -> Self {
        Self {
            name: String::new(),
            instance_type: "virtual-router".to_string(),
            description: None,
            instance_export: Vec::new(),
            instance_import: Vec::new(),
            route_distinguisher: None,
            router_id: None,
            vrf_export: Vec::new(),
            vrf_import: Vec::new(),
            vrf_target: None,
            vrf_target_auto: false,
            vtep_source_interface: None,
        }
    }
}

impl RoutingInstance {
    /// Instance with only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instance_type: String::new(),
            ..Default::default()
        }
    }

    fn policy_names(attribute: &str, names: &[String]) -> Result<()> {
        for name in names {
            validate::no_whitespace(attribute, name)?;
            validate::no_double_quotes(attribute, name)?;
        }
        validate::unique(attribute, names)
    }
}

#[async_trait]
impl ConfigResource for RoutingInstance {
    const TYPE_NAME: &'static str = "junos_routing_instance";
    const DISPLAY_NAME: &'static str = "routing instance";
    const IMPORT_ID_FORMAT: &'static str = "<name>";

    fn schema() -> Schema {
        Schema::new(
            0,
            "Provides a routing instance.",
            vec![
                Attribute::required("name", AttrKind::String, "The name of routing instance.")
                    .force_new(),
                Attribute::optional_computed(
                    "type",
                    AttrKind::String,
                    "Type of routing instance (empty for none).",
                ),
                Attribute::optional("description", AttrKind::String, "Text description."),
                Attribute::optional(
                    "instance_export",
                    AttrKind::StringList,
                    "Export policy for instance RIBs.",
                ),
                Attribute::optional(
                    "instance_import",
                    AttrKind::StringList,
                    "Import policy for instance RIBs.",
                ),
                Attribute::optional(
                    "route_distinguisher",
                    AttrKind::String,
                    "Route distinguisher for this instance.",
                ),
                Attribute::optional("router_id", AttrKind::String, "Router identifier."),
                Attribute::optional("vrf_export", AttrKind::StringList, "Export policy for VRF."),
                Attribute::optional("vrf_import", AttrKind::StringList, "Import policy for VRF."),
                Attribute::optional("vrf_target", AttrKind::String, "Target community."),
                Attribute::optional(
                    "vrf_target_auto",
                    AttrKind::Bool,
                    "Auto derive import and export target community.",
                ),
                Attribute::optional(
                    "vtep_source_interface",
                    AttrKind::String,
                    "Source layer-3 IFL for VXLAN.",
                ),
            ],
        )
    }

    fn id(&self) -> String {
        self.name.clone()
    }

    fn from_id(id: &str) -> Option<Self> {
        (!id.is_empty() && id != DEFAULT_INSTANCE).then(|| Self::named(id))
    }

    fn identity(&self) -> Self {
        Self::named(self.name.clone())
    }

    fn validate(&self) -> Result<()> {
        validate::name("name", &self.name, 63, NameFormat::Default)?;
        if self.name == DEFAULT_INSTANCE {
            return Err(Error::validation(
                "name",
                "'default' is the master instance and cannot be managed",
            ));
        }
        validate::one_of("type", &self.instance_type, INSTANCE_TYPES)?;
        if let Some(description) = &self.description {
            validate::length("description", description, 1, 900)?;
            validate::no_double_quotes("description", description)?;
        }
        Self::policy_names("instance_export", &self.instance_export)?;
        Self::policy_names("instance_import", &self.instance_import)?;
        Self::policy_names("vrf_export", &self.vrf_export)?;
        Self::policy_names("vrf_import", &self.vrf_import)?;
        if let Some(rd) = &self.route_distinguisher {
            validate::matches(
                "route_distinguisher",
                rd,
                &ROUTE_DISTINGUISHER_REGEX,
                "in the format 'x:y'",
            )?;
        }
        if let Some(router_id) = &self.router_id {
            validate::ip_address("router_id", router_id)?;
        }
        if let Some(target) = &self.vrf_target {
            validate::matches(
                "vrf_target",
                target,
                &VRF_TARGET_REGEX,
                "in the format 'target:x:y'",
            )?;
        }
        if let Some(interface) = &self.vtep_source_interface {
            validate::no_whitespace("vtep_source_interface", interface)?;
        }
        Ok(())
    }

    fn config_path(&self) -> String {
        format!("routing-instances {}", self.name)
    }

    fn statements(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.instance_type.is_empty() {
            lines.push(format!("instance-type {}", self.instance_type));
        }
        if let Some(description) = &self.description {
            lines.push(format!("description {}", quote(description)));
        }
        for policy in &self.instance_export {
            lines.push(format!("routing-options instance-export {}", policy));
        }
        for policy in &self.instance_import {
            lines.push(format!("routing-options instance-import {}", policy));
        }
        if let Some(rd) = &self.route_distinguisher {
            lines.push(format!("route-distinguisher {}", rd));
        }
        if let Some(router_id) = &self.router_id {
            lines.push(format!("routing-options router-id {}", router_id));
        }
        for policy in &self.vrf_export {
            lines.push(format!("vrf-export {}", policy));
        }
        for policy in &self.vrf_import {
            lines.push(format!("vrf-import {}", policy));
        }
        if let Some(target) = &self.vrf_target {
            lines.push(format!("vrf-target {}", target));
        }
        if self.vrf_target_auto {
            lines.push("vrf-target auto".to_string());
        }
        if let Some(interface) = &self.vtep_source_interface {
            lines.push(format!("vtep-source-interface {}", interface));
        }
        lines
    }

    fn parse_line(&mut self, line: &str) -> Result<()> {
        if let Some(v) = cut_prefix(line, "instance-type") {
            self.instance_type = v.to_string();
        } else if let Some(v) = cut_prefix(line, "description") {
            self.description = Some(trim_quotes(v).to_string());
        } else if let Some(v) = cut_prefix(line, "routing-options instance-export") {
            self.instance_export.push(trim_quotes(v).to_string());
        } else if let Some(v) = cut_prefix(line, "routing-options instance-import") {
            self.instance_import.push(trim_quotes(v).to_string());
        } else if let Some(v) = cut_prefix(line, "route-distinguisher") {
            self.route_distinguisher = Some(v.to_string());
        } else if let Some(v) = cut_prefix(line, "routing-options router-id") {
            self.router_id = Some(v.to_string());
        } else if let Some(v) = cut_prefix(line, "vrf-export") {
            self.vrf_export.push(trim_quotes(v).to_string());
        } else if let Some(v) = cut_prefix(line, "vrf-import") {
            self.vrf_import.push(trim_quotes(v).to_string());
        } else if let Some(v) = cut_prefix(line, "vrf-target") {
            // `vrf-target import|export ...` is not managed here
            if v == "auto" {
                self.vrf_target_auto = true;
            } else if VRF_TARGET_REGEX.is_match(v) {
                self.vrf_target = Some(v.to_string());
            }
        } else if let Some(v) = cut_prefix(line, "vtep-source-interface") {
            self.vtep_source_interface = Some(v.to_string());
        }
        Ok(())
    }

    fn delete_options_lines(&self) -> Vec<String> {
        let mut lines = SetLines::delete(self.config_path());
        for statement in [
            "instance-type",
            "description",
            "routing-options instance-export",
            "routing-options instance-import",
            "route-distinguisher",
            "routing-options router-id",
            "vrf-export",
            "vrf-import",
            "vrf-target",
            "vtep-source-interface",
        ] {
            lines.push(statement);
        }
        lines.into_lines()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::reparse;

    fn full() -> RoutingInstance {
        RoutingInstance {
            name: "prod".to_string(),
            instance_type: "vrf".to_string(),
            description: Some("production vrf".to_string()),
            instance_export: vec!["exp1".to_string()],
            instance_import: vec!["imp1".to_string(), "imp2".to_string()],
            route_distinguisher: Some("65000:10".to_string()),
            router_id: Some("192.0.2.1".to_string()),
            vrf_export: vec!["vexp".to_string()],
            vrf_import: vec!["vimp".to_string()],
            vrf_target: Some("target:65000:10".to_string()),
            vrf_target_auto: false,
            vtep_source_interface: Some("lo0.10".to_string()),
        }
    }

    #[test]
    fn test_set_lines() {
        let lines = full().set_lines();
        assert_eq!(lines[0], "set routing-instances prod");
        assert!(lines.contains(&"set routing-instances prod instance-type vrf".to_string()));
        assert!(lines.contains(
            &"set routing-instances prod description \"production vrf\"".to_string()
        ));
        assert!(lines.contains(
            &"set routing-instances prod routing-options router-id 192.0.2.1".to_string()
        ));
    }

    #[test]
    fn test_parse_agrees_with_statements() {
        let instance = full();
        assert_eq!(reparse(&instance), instance);

        let mut auto = RoutingInstance::named("evpn1");
        auto.instance_type = "virtual-switch".to_string();
        auto.vrf_target_auto = true;
        assert_eq!(reparse(&auto), auto);
    }

    #[test]
    fn test_read_without_instance_type() {
        let mut read = RoutingInstance::named("bare").identity();
        read.parse_line("interface ge-0/0/3.0").unwrap();
        read.parse_line("protocols ospf area 0.0.0.0").unwrap();
        assert_eq!(read.instance_type, "");
        assert_eq!(read, RoutingInstance::named("bare"));
    }

    #[test]
    fn test_read_ignores_directional_vrf_target() {
        let mut read = RoutingInstance::named("prod").identity();
        read.parse_line("vrf-target import target:65000:20").unwrap();
        read.parse_line("vrf-target export target:65000:30").unwrap();
        assert_eq!(read.vrf_target, None);
        assert!(!read.vrf_target_auto);

        read.parse_line("vrf-target target:65000:10").unwrap();
        assert_eq!(read.vrf_target.as_deref(), Some("target:65000:10"));
    }

    #[test]
    fn test_validate() {
        assert!(full().validate().is_ok());
        assert!(RoutingInstance {
            name: "default".to_string(),
            ..Default::default()
        }
        .validate()
        .is_err());

        let mut bad = full();
        bad.route_distinguisher = Some("nope".to_string());
        assert!(bad.validate().is_err());

        let mut bad = full();
        bad.instance_type = "bogus".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_update_keeps_unmanaged_statements() {
        let lines = full().delete_options_lines();
        assert!(!lines.contains(&"delete routing-instances prod".to_string()));
        assert!(lines.contains(&"delete routing-instances prod vrf-target".to_string()));
    }

    #[test]
    fn test_from_id() {
        assert_eq!(RoutingInstance::from_id("prod").unwrap().name, "prod");
        assert!(RoutingInstance::from_id("default").is_none());
    }
}
