//! `junos_vlan`: `vlans <name>`, or `routing-instances <ri> vlans <name>`.
//!
//! Schema version 1. Version 0 stored `vxlan` as a list of at most one
//! block; the upgrade keeps its first element.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::routing_instance::{self, DEFAULT_INSTANCE};
use super::{parse_number, ConfigResource};
use crate::error::{Error, Result};
use crate::junos::setline::{cut_prefix, quote, trim_quotes};
use crate::junos::{join_id, split_id, Session, SetLines};
use crate::schema::{validate, AttrKind, Attribute, NameFormat, Schema};

/// VXLAN options of a vlan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Vxlan {
    pub vni: u32,
    pub encapsulate_inner_vlan: bool,
    pub ingress_node_replication: bool,
    pub multicast_group: Option<String>,
    pub ovsdb_managed: bool,
    pub unreachable_vtep_aging_timer: Option<u32>,
}

impl Vxlan {
    fn validate(&self) -> Result<()> {
        validate::int_range("vxlan.vni", i64::from(self.vni), 0, 16_777_214)?;
        if let Some(group) = &self.multicast_group {
            validate::ip_address("vxlan.multicast_group", group)?;
        }
        if let Some(timer) = self.unreachable_vtep_aging_timer {
            validate::int_range(
                "vxlan.unreachable_vtep_aging_timer",
                i64::from(timer),
                300,
                1800,
            )?;
        }
        Ok(())
    }

    fn statements(&self) -> Vec<String> {
        let mut lines = vec![format!("vxlan vni {}", self.vni)];
        if self.encapsulate_inner_vlan {
            lines.push("vxlan encapsulate-inner-vlan".to_string());
        }
        if self.ingress_node_replication {
            lines.push("vxlan ingress-node-replication".to_string());
        }
        if let Some(group) = &self.multicast_group {
            lines.push(format!("vxlan multicast-group {}", group));
        }
        if self.ovsdb_managed {
            lines.push("vxlan ovsdb-managed".to_string());
        }
        if let Some(timer) = self.unreachable_vtep_aging_timer {
            lines.push(format!("vxlan unreachable-vtep-aging-timer {}", timer));
        }
        lines
    }

    fn parse_line(&mut self, line: &str) -> Result<()> {
        if let Some(v) = cut_prefix(line, "vni") {
            self.vni = parse_number("vxlan vni", v)?;
        } else if line == "encapsulate-inner-vlan" {
            self.encapsulate_inner_vlan = true;
        } else if line == "ingress-node-replication" {
            self.ingress_node_replication = true;
        } else if let Some(v) = cut_prefix(line, "multicast-group") {
            self.multicast_group = Some(v.to_string());
        } else if line == "ovsdb-managed" {
            self.ovsdb_managed = true;
        } else if let Some(v) = cut_prefix(line, "unreachable-vtep-aging-timer") {
            self.unreachable_vtep_aging_timer = Some(parse_number("vxlan aging timer", v)?);
        }
        Ok(())
    }
}

/// A vlan (bridge domain on switches)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Vlan {
    pub name: String,
    pub routing_instance: String,
    pub description: Option<String>,
    pub forward_filter_input: Option<String>,
    pub forward_filter_output: Option<String>,
    pub forward_flood_input: Option<String>,
    pub l3_interface: Option<String>,
    pub no_arp_suppression: bool,
    pub private_vlan: Option<String>,
    pub service_id: Option<u32>,
    pub vlan_id: Option<String>,
    pub vlan_id_list: Vec<String>,
    pub vxlan: Option<Vxlan>,
}

impl Default for Vlan {
    fn default() -> Self {
        Self {
            name: String::new(),
            routing_instance: DEFAULT_INSTANCE.to_string(),
            description: None,
            forward_filter_input: None,
            forward_filter_output: None,
            forward_flood_input: None,
            l3_interface: None,
            no_arp_suppression: false,
            private_vlan: None,
            service_id: None,
            vlan_id: None,
            vlan_id_list: Vec::new(),
            vxlan: None,
        }
    }
}

fn valid_vlan_number(value: &str) -> bool {
    matches!(value.parse::<u16>(), Ok(id) if (1..=4094).contains(&id))
}

fn check_vlan_id(value: &str) -> Result<()> {
    if value == "all" || value == "none" || valid_vlan_number(value) {
        return Ok(());
    }
    Err(Error::validation(
        "vlan_id",
        format!("'{}' must be 1..4094, 'all' or 'none'", value),
    ))
}

fn check_vlan_range(value: &str) -> Result<()> {
    let valid = match value.split_once('-') {
        Some((low, high)) => {
            valid_vlan_number(low)
                && valid_vlan_number(high)
                && low.parse::<u16>().ok() < high.parse::<u16>().ok()
        }
        None => valid_vlan_number(value),
    };
    if !valid {
        return Err(Error::validation(
            "vlan_id_list",
            format!("'{}' must be a vlan id or a range 'low-high'", value),
        ));
    }
    Ok(())
}

#[async_trait]
impl ConfigResource for Vlan {
    const TYPE_NAME: &'static str = "junos_vlan";
    const DISPLAY_NAME: &'static str = "vlan";
    const SCHEMA_VERSION: u64 = 1;
    const IMPORT_ID_FORMAT: &'static str = "<name> or <name>_-_<routing_instance>";

    fn schema() -> Schema {
        Schema::new(
            Self::SCHEMA_VERSION,
            "Provides a vlan.",
            vec![
                Attribute::required("name", AttrKind::String, "The name of vlan.").force_new(),
                Attribute::optional_computed(
                    "routing_instance",
                    AttrKind::String,
                    "Routing instance for vlan (default: 'default').",
                )
                .force_new(),
                Attribute::optional("description", AttrKind::String, "A description for vlan."),
                Attribute::optional(
                    "forward_filter_input",
                    AttrKind::String,
                    "Input filter to apply for forwarded packets.",
                ),
                Attribute::optional(
                    "forward_filter_output",
                    AttrKind::String,
                    "Output filter to apply for forwarded packets.",
                ),
                Attribute::optional(
                    "forward_flood_input",
                    AttrKind::String,
                    "Input filter to apply for ethernet switching flood packets.",
                ),
                Attribute::optional("l3_interface", AttrKind::String, "L3 interface name."),
                Attribute::optional(
                    "no_arp_suppression",
                    AttrKind::Bool,
                    "Disable ARP/NDP suppression.",
                ),
                Attribute::optional(
                    "private_vlan",
                    AttrKind::String,
                    "Type of secondary vlan (community or isolated).",
                ),
                Attribute::optional("service_id", AttrKind::Int, "Service id."),
                Attribute::optional("vlan_id", AttrKind::String, "802.1q VLAN id or 'all' or 'none'."),
                Attribute::optional(
                    "vlan_id_list",
                    AttrKind::StringSet,
                    "List of vlan ids or ranges.",
                ),
                Attribute::optional("vxlan", AttrKind::Block, "Declare vxlan configuration."),
            ],
        )
    }

    fn id(&self) -> String {
        if self.routing_instance == DEFAULT_INSTANCE {
            self.name.clone()
        } else {
            join_id(&[&self.name, &self.routing_instance])
        }
    }

    fn from_id(id: &str) -> Option<Self> {
        let (name, routing_instance) = match split_id(id, 2) {
            Some(parts) => (parts[0].clone(), parts[1].clone()),
            None if !id.contains(crate::junos::ID_SEPARATOR) => {
                (id.to_string(), DEFAULT_INSTANCE.to_string())
            }
            None => return None,
        };
        (!name.is_empty()).then(|| Self {
            name,
            routing_instance,
            ..Default::default()
        })
    }

    fn identity(&self) -> Self {
        Self {
            name: self.name.clone(),
            routing_instance: self.routing_instance.clone(),
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<()> {
        validate::name("name", &self.name, 64, NameFormat::Default)?;
        validate::name("routing_instance", &self.routing_instance, 63, NameFormat::Default)?;
        if let Some(description) = &self.description {
            validate::length("description", description, 1, 900)?;
            validate::no_double_quotes("description", description)?;
        }
        for (attribute, filter) in [
            ("forward_filter_input", &self.forward_filter_input),
            ("forward_filter_output", &self.forward_filter_output),
            ("forward_flood_input", &self.forward_flood_input),
        ] {
            if let Some(filter) = filter {
                validate::name(attribute, filter, 64, NameFormat::Default)?;
            }
        }
        if let Some(interface) = &self.l3_interface {
            validate::no_whitespace("l3_interface", interface)?;
        }
        if let Some(private_vlan) = &self.private_vlan {
            validate::one_of("private_vlan", private_vlan, &["community", "isolated"])?;
        }
        if let Some(service_id) = self.service_id {
            validate::int_range("service_id", i64::from(service_id), 1, 65535)?;
        }
        validate::conflicts_with(
            "vlan_id",
            self.vlan_id.is_some(),
            "vlan_id_list",
            !self.vlan_id_list.is_empty(),
        )?;
        if let Some(vlan_id) = &self.vlan_id {
            check_vlan_id(vlan_id)?;
        }
        for range in &self.vlan_id_list {
            check_vlan_range(range)?;
        }
        validate::unique("vlan_id_list", &self.vlan_id_list)?;
        if let Some(vxlan) = &self.vxlan {
            vxlan.validate()?;
        }
        Ok(())
    }

    fn config_path(&self) -> String {
        if self.routing_instance == DEFAULT_INSTANCE {
            format!("vlans {}", self.name)
        } else {
            format!("routing-instances {} vlans {}", self.routing_instance, self.name)
        }
    }

    fn statements(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(description) = &self.description {
            lines.push(format!("description {}", quote(description)));
        }
        if let Some(filter) = &self.forward_filter_input {
            lines.push(format!("forwarding-options filter input {}", filter));
        }
        if let Some(filter) = &self.forward_filter_output {
            lines.push(format!("forwarding-options filter output {}", filter));
        }
        if let Some(filter) = &self.forward_flood_input {
            lines.push(format!("forwarding-options flood input {}", filter));
        }
        if let Some(interface) = &self.l3_interface {
            lines.push(format!("l3-interface {}", interface));
        }
        if self.no_arp_suppression {
            lines.push("no-arp-suppression".to_string());
        }
        if let Some(private_vlan) = &self.private_vlan {
            lines.push(format!("private-vlan {}", private_vlan));
        }
        if let Some(service_id) = self.service_id {
            lines.push(format!("service-id {}", service_id));
        }
        if let Some(vlan_id) = &self.vlan_id {
            lines.push(format!("vlan-id {}", vlan_id));
        }
        for range in &self.vlan_id_list {
            lines.push(format!("vlan-id-list {}", range));
        }
        if let Some(vxlan) = &self.vxlan {
            lines.extend(vxlan.statements());
        }
        lines
    }

    fn parse_line(&mut self, line: &str) -> Result<()> {
        if let Some(v) = cut_prefix(line, "description") {
            self.description = Some(trim_quotes(v).to_string());
        } else if let Some(v) = cut_prefix(line, "forwarding-options filter input") {
            self.forward_filter_input = Some(trim_quotes(v).to_string());
        } else if let Some(v) = cut_prefix(line, "forwarding-options filter output") {
            self.forward_filter_output = Some(trim_quotes(v).to_string());
        } else if let Some(v) = cut_prefix(line, "forwarding-options flood input") {
            self.forward_flood_input = Some(trim_quotes(v).to_string());
        } else if let Some(v) = cut_prefix(line, "l3-interface") {
            self.l3_interface = Some(v.to_string());
        } else if line == "no-arp-suppression" {
            self.no_arp_suppression = true;
        } else if let Some(v) = cut_prefix(line, "private-vlan") {
            self.private_vlan = Some(v.to_string());
        } else if let Some(v) = cut_prefix(line, "service-id") {
            self.service_id = Some(parse_number("service-id", v)?);
        } else if let Some(v) = cut_prefix(line, "vlan-id") {
            self.vlan_id = Some(v.to_string());
        } else if let Some(v) = cut_prefix(line, "vlan-id-list") {
            self.vlan_id_list.push(v.to_string());
        } else if let Some(v) = cut_prefix(line, "vxlan") {
            self.vxlan.get_or_insert_with(Vxlan::default).parse_line(v)?;
        }
        Ok(())
    }

    fn delete_options_lines(&self) -> Vec<String> {
        let mut lines = SetLines::delete(self.config_path());
        for statement in [
            "description",
            "forwarding-options",
            "l3-interface",
            "no-arp-suppression",
            "private-vlan",
            "service-id",
            "vlan-id",
            "vlan-id-list",
            "vxlan",
        ] {
            lines.push(statement);
        }
        lines.into_lines()
    }

    async fn pre_check(&self, session: &mut Session) -> Result<()> {
        routing_instance::check_exists(session, &self.routing_instance).await
    }

    fn upgrade(version: u64, state: Value) -> Result<Value> {
        if version != 0 {
            return Err(Error::StateUpgrade {
                resource: Self::TYPE_NAME.to_string(),
                version,
                message: "no upgrade path".to_string(),
            });
        }
        let mut state = state;
        if let Some(vxlan) = state.get_mut("vxlan") {
            if let Value::Array(blocks) = vxlan {
                let first = std::mem::take(blocks).into_iter().next();
                *vxlan = first.unwrap_or(Value::Null);
            }
        }
        Ok(state)
    }
}
