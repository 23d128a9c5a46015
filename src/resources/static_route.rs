//! `junos_static_route`: IPv4 or IPv6 static route in the default or a named
//! routing instance.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use super::routing_instance::{self, DEFAULT_INSTANCE};
use super::{parse_number, ConfigResource};
use crate::error::Result;
use crate::junos::setline::{cut_prefix, trim_quotes};
use crate::junos::{join_id, split_id, Session};
use crate::schema::validate::{self, parse_cidr};
use crate::schema::{AttrKind, Attribute, NameFormat, Schema};

/// Next hop with its own preference and metric
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QualifiedNextHop {
    pub next_hop: String,
    pub preference: Option<u32>,
    pub metric: Option<u32>,
}

/// A static route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticRoute {
    pub destination: String,
    pub routing_instance: String,
    pub preference: Option<u32>,
    pub metric: Option<u32>,
    pub next_hop: Vec<String>,
    pub qualified_next_hop: Vec<QualifiedNextHop>,
    pub discard: bool,
    pub receive: bool,
    pub reject: bool,
    pub next_table: Option<String>,
    pub community: Vec<String>,
    pub active: bool,
    pub passive: bool,
    pub install: bool,
    pub no_install: bool,
    pub readvertise: bool,
    pub no_readvertise: bool,
    pub resolve: bool,
    pub no_resolve: bool,
    pub retain: bool,
    pub no_retain: bool,
}

impl Default for StaticRoute {
    fn default() -> Self {
        Self {
            destination: String::new(),
            routing_instance: DEFAULT_INSTANCE.to_string(),
            preference: None,
            metric: None,
            next_hop: Vec::new(),
            qualified_next_hop: Vec::new(),
            discard: false,
            receive: false,
            reject: false,
            next_table: None,
            community: Vec::new(),
            active: false,
            passive: false,
            install: false,
            no_install: false,
            readvertise: false,
            no_readvertise: false,
            resolve: false,
            no_resolve: false,
            retain: false,
            no_retain: false,
        }
    }
}

/// Keyword flags as (statement, attribute), conflicting pairs adjacent
const FLAGS: [(&str, &str); 10] = [
    ("active", "active"),
    ("passive", "passive"),
    ("install", "install"),
    ("no-install", "no_install"),
    ("readvertise", "readvertise"),
    ("no-readvertise", "no_readvertise"),
    ("resolve", "resolve"),
    ("no-resolve", "no_resolve"),
    ("retain", "retain"),
    ("no-retain", "no_retain"),
];

impl StaticRoute {
    fn is_inet6(&self) -> bool {
        matches!(parse_cidr(&self.destination), Some((IpAddr::V6(_), _)))
    }

    fn flags(&self) -> [bool; 10] {
        [
            self.active,
            self.passive,
            self.install,
            self.no_install,
            self.readvertise,
            self.no_readvertise,
            self.resolve,
            self.no_resolve,
            self.retain,
            self.no_retain,
        ]
    }

    fn flag_mut(&mut self, keyword: &str) -> Option<&mut bool> {
        Some(match keyword {
            "active" => &mut self.active,
            "passive" => &mut self.passive,
            "install" => &mut self.install,
            "no-install" => &mut self.no_install,
            "readvertise" => &mut self.readvertise,
            "no-readvertise" => &mut self.no_readvertise,
            "resolve" => &mut self.resolve,
            "no-resolve" => &mut self.no_resolve,
            "retain" => &mut self.retain,
            "no-retain" => &mut self.no_retain,
            _ => return None,
        })
    }

    fn qualified_mut(&mut self, next_hop: &str) -> &mut QualifiedNextHop {
        let index = match self
            .qualified_next_hop
            .iter()
            .position(|q| q.next_hop == next_hop)
        {
            Some(index) => index,
            None => {
                self.qualified_next_hop.push(QualifiedNextHop {
                    next_hop: next_hop.to_string(),
                    ..Default::default()
                });
                self.qualified_next_hop.len() - 1
            }
        };
        &mut self.qualified_next_hop[index]
    }
}

fn check_next_hop(attribute: &str, value: &str) -> Result<()> {
    if value.parse::<IpAddr>().is_ok() {
        return Ok(());
    }
    // interface name
    validate::name(attribute, value, 64, NameFormat::Address)
}

#[async_trait]
impl ConfigResource for StaticRoute {
    const TYPE_NAME: &'static str = "junos_static_route";
    const DISPLAY_NAME: &'static str = "static route";
    const IMPORT_ID_FORMAT: &'static str = "<destination>_-_<routing_instance>";

    fn schema() -> Schema {
        let mut attributes = vec![
            Attribute::required("destination", AttrKind::String, "The destination for static route.")
                .force_new(),
            Attribute::optional_computed(
                "routing_instance",
                AttrKind::String,
                "Routing instance for static route (default: 'default').",
            )
            .force_new(),
            Attribute::optional("preference", AttrKind::Int, "Preference for static route."),
            Attribute::optional("metric", AttrKind::Int, "Metric for static route."),
            Attribute::optional("next_hop", AttrKind::StringList, "Next-hop to destination."),
            Attribute::optional(
                "qualified_next_hop",
                AttrKind::Block,
                "Next-hop with qualifiers (next_hop, preference, metric).",
            ),
            Attribute::optional("discard", AttrKind::Bool, "Drop packets to destination; send no ICMP unreachables."),
            Attribute::optional("receive", AttrKind::Bool, "Install a receive route for the destination."),
            Attribute::optional("reject", AttrKind::Bool, "Drop packets to destination; send ICMP unreachables."),
            Attribute::optional("next_table", AttrKind::String, "Next hop to another table."),
            Attribute::optional("community", AttrKind::StringList, "BGP community."),
        ];
        for (statement, attribute) in FLAGS {
            attributes.push(Attribute::optional(attribute, AttrKind::Bool, statement));
        }
        Schema::new(0, "Provides a static route.", attributes)
    }

    fn id(&self) -> String {
        join_id(&[&self.destination, &self.routing_instance])
    }

    fn from_id(id: &str) -> Option<Self> {
        let parts = split_id(id, 2)?;
        let [destination, routing_instance]: [String; 2] = parts.try_into().ok()?;
        (parse_cidr(&destination).is_some() && !routing_instance.is_empty()).then(|| Self {
            destination,
            routing_instance,
            ..Default::default()
        })
    }

    fn identity(&self) -> Self {
        Self {
            destination: self.destination.clone(),
            routing_instance: self.routing_instance.clone(),
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<()> {
        validate::cidr_network("destination", &self.destination)?;
        validate::name("routing_instance", &self.routing_instance, 63, NameFormat::Default)?;
        for next_hop in &self.next_hop {
            check_next_hop("next_hop", next_hop)?;
        }
        validate::unique("next_hop", &self.next_hop)?;
        let qualified: Vec<String> = self
            .qualified_next_hop
            .iter()
            .map(|q| q.next_hop.clone())
            .collect();
        for next_hop in &qualified {
            check_next_hop("qualified_next_hop.next_hop", next_hop)?;
        }
        validate::unique("qualified_next_hop.next_hop", &qualified)?;
        if let Some(table) = &self.next_table {
            validate::no_whitespace("next_table", table)?;
            validate::no_double_quotes("next_table", table)?;
        }
        for community in &self.community {
            validate::no_whitespace("community", community)?;
        }

        validate::exactly_one_of(&[
            (
                "next_hop",
                !self.next_hop.is_empty() || !self.qualified_next_hop.is_empty(),
            ),
            ("discard", self.discard),
            ("receive", self.receive),
            ("reject", self.reject),
            ("next_table", self.next_table.is_some()),
        ])?;

        let flags = self.flags();
        for pair in (0..FLAGS.len()).step_by(2) {
            validate::conflicts_with(
                FLAGS[pair].1,
                flags[pair],
                FLAGS[pair + 1].1,
                flags[pair + 1],
            )?;
        }
        Ok(())
    }

    fn config_path(&self) -> String {
        let instance = if self.routing_instance == DEFAULT_INSTANCE {
            String::new()
        } else {
            format!("routing-instances {} ", self.routing_instance)
        };
        let rib = match (self.is_inet6(), self.routing_instance.as_str()) {
            (false, _) => String::new(),
            (true, DEFAULT_INSTANCE) => "rib inet6.0 ".to_string(),
            (true, ri) => format!("rib {}.inet6.0 ", ri),
        };
        format!("{}routing-options {}static route {}", instance, rib, self.destination)
    }

    fn statements(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(preference) = self.preference {
            lines.push(format!("preference {}", preference));
        }
        if let Some(metric) = self.metric {
            lines.push(format!("metric {}", metric));
        }
        for next_hop in &self.next_hop {
            lines.push(format!("next-hop {}", next_hop));
        }
        for qualified in &self.qualified_next_hop {
            lines.push(format!("qualified-next-hop {}", qualified.next_hop));
            if let Some(preference) = qualified.preference {
                lines.push(format!(
                    "qualified-next-hop {} preference {}",
                    qualified.next_hop, preference
                ));
            }
            if let Some(metric) = qualified.metric {
                lines.push(format!(
                    "qualified-next-hop {} metric {}",
                    qualified.next_hop, metric
                ));
            }
        }
        if self.discard {
            lines.push("discard".to_string());
        }
        if self.receive {
            lines.push("receive".to_string());
        }
        if self.reject {
            lines.push("reject".to_string());
        }
        if let Some(table) = &self.next_table {
            lines.push(format!("next-table {}", table));
        }
        for community in &self.community {
            lines.push(format!("community {}", community));
        }
        for ((statement, _), set) in FLAGS.iter().zip(self.flags()) {
            if set {
                lines.push(statement.to_string());
            }
        }
        lines
    }

    fn parse_line(&mut self, line: &str) -> Result<()> {
        if let Some(v) = cut_prefix(line, "preference") {
            self.preference = Some(parse_number("preference", v)?);
        } else if let Some(v) = cut_prefix(line, "metric") {
            self.metric = Some(parse_number("metric", v)?);
        } else if let Some(v) = cut_prefix(line, "next-hop") {
            self.next_hop.push(v.to_string());
        } else if let Some(v) = cut_prefix(line, "qualified-next-hop") {
            let (next_hop, rest) = v.split_once(' ').unwrap_or((v, ""));
            let qualified = self.qualified_mut(next_hop);
            if let Some(p) = cut_prefix(rest, "preference") {
                qualified.preference = Some(parse_number("qualified-next-hop preference", p)?);
            } else if let Some(m) = cut_prefix(rest, "metric") {
                qualified.metric = Some(parse_number("qualified-next-hop metric", m)?);
            }
        } else if line == "discard" {
            self.discard = true;
        } else if line == "receive" {
            self.receive = true;
        } else if line == "reject" {
            self.reject = true;
        } else if let Some(v) = cut_prefix(line, "next-table") {
            self.next_table = Some(v.to_string());
        } else if let Some(v) = cut_prefix(line, "community") {
            self.community.push(trim_quotes(v).to_string());
        } else if let Some(flag) = self.flag_mut(line) {
            *flag = true;
        }
        Ok(())
    }

    async fn pre_check(&self, session: &mut Session) -> Result<()> {
        routing_instance::check_exists(session, &self.routing_instance).await
    }
}
