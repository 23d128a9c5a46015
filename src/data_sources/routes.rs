//! `junos_routes`: routing tables with their routes and entries.

use async_trait::async_trait;
use roxmltree::Node;
use serde::{Deserialize, Serialize};

use super::DeviceQuery;
use crate::error::{Error, Result};
use crate::junos::Session;
use crate::netconf::reply::{child_text, children_named, has_child};
use crate::netconf::{rpc, RpcReply};
use crate::schema::{validate, AttrKind, Attribute, Schema};

/// `<get-route-information>`
pub struct Routes;

/// Arguments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutesInput {
    /// Only this table (`inet.0`, `prod.inet6.0`, ...)
    pub table_name: Option<String>,
}

/// One next hop of a route entry
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteNextHop {
    pub local_interface: Option<String>,
    pub selected_next_hop: bool,
    pub to: Option<String>,
    pub via: Option<String>,
}

/// One entry (protocol contribution) of a route
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteEntry {
    pub as_path: Option<String>,
    pub current_active: bool,
    pub local_preference: Option<i64>,
    pub metric: Option<i64>,
    pub next_hop: Vec<RouteNextHop>,
    pub next_hop_type: Option<String>,
    pub preference: Option<i64>,
    pub protocol: Option<String>,
}

/// A destination with its entries
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Route {
    pub destination: String,
    pub entry: Vec<RouteEntry>,
}

/// A routing table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteTable {
    pub name: String,
    pub route: Vec<Route>,
}

/// Query result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteTables {
    pub table: Vec<RouteTable>,
}

fn number(node: Node<'_, '_>, name: &str) -> Option<i64> {
    child_text(node, name).and_then(|v| v.parse().ok())
}

fn parse_next_hop(node: Node<'_, '_>) -> RouteNextHop {
    RouteNextHop {
        local_interface: child_text(node, "nh-local-interface"),
        selected_next_hop: has_child(node, "selected-next-hop"),
        to: child_text(node, "to"),
        via: child_text(node, "via"),
    }
}

fn parse_entry(node: Node<'_, '_>) -> RouteEntry {
    RouteEntry {
        as_path: child_text(node, "as-path"),
        current_active: has_child(node, "current-active"),
        local_preference: number(node, "local-preference"),
        metric: number(node, "metric"),
        next_hop: children_named(node, "nh").map(parse_next_hop).collect(),
        next_hop_type: child_text(node, "nh-type"),
        preference: number(node, "preference"),
        protocol: child_text(node, "protocol-name"),
    }
}

fn parse_route(node: Node<'_, '_>) -> Route {
    Route {
        destination: child_text(node, "rt-destination").unwrap_or_default(),
        entry: children_named(node, "rt-entry").map(parse_entry).collect(),
    }
}

/// Extract routing tables from a route information reply
pub fn parse_route_information(reply: &RpcReply) -> Result<RouteTables> {
    let doc = reply.document()?;
    let info = doc
        .descendants()
        .find(|n| n.has_tag_name("route-information"))
        .ok_or_else(|| Error::Protocol("no route-information in reply".to_string()))?;

    let table = children_named(info, "route-table")
        .map(|node| RouteTable {
            name: child_text(node, "table-name").unwrap_or_default(),
            route: children_named(node, "rt").map(parse_route).collect(),
        })
        .collect();
    Ok(RouteTables { table })
}

#[async_trait]
impl DeviceQuery for Routes {
    const TYPE_NAME: &'static str = "junos_routes";

    type Input = RoutesInput;
    type Output = RouteTables;

    fn schema() -> Schema {
        Schema::new(
            0,
            "Get routing table(s) of the Junos device.",
            vec![
                Attribute::optional(
                    "table_name",
                    AttrKind::String,
                    "Get only routes of this table.",
                ),
                Attribute::computed(
                    "table",
                    AttrKind::Block,
                    "Routing tables: name and routes (destination and entries).",
                ),
            ],
        )
    }

    fn validate(input: &RoutesInput) -> Result<()> {
        if let Some(table) = &input.table_name {
            validate::length("table_name", table, 1, 64)?;
            validate::no_whitespace("table_name", table)?;
        }
        Ok(())
    }

    fn id(input: &RoutesInput, _output: &RouteTables) -> String {
        input
            .table_name
            .clone()
            .unwrap_or_else(|| "all".to_string())
    }

    async fn query(input: &RoutesInput, session: &mut Session) -> Result<RouteTables> {
        let reply = session
            .rpc(&rpc::get_route_information(input.table_name.as_deref()))
            .await?;
        parse_route_information(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ROUTES: &str = r#"<rpc-reply xmlns:junos="http://xml.juniper.net/junos/21.4R0/junos" message-id="7">
<route-information xmlns="http://xml.juniper.net/junos/21.4R0/junos-routing">
<route-table>
<table-name>inet.0</table-name>
<destination-count>2</destination-count>
<rt junos:style="brief">
<rt-destination>0.0.0.0/0</rt-destination>
<rt-entry>
<active-tag>*</active-tag>
<current-active/>
<last-active/>
<protocol-name>Static</protocol-name>
<preference>5</preference>
<age junos:seconds="100">00:01:40</age>
<nh>
<selected-next-hop/>
<to>192.0.2.254</to>
<via>ge-0/0/0.0</via>
</nh>
</rt-entry>
</rt>
<rt junos:style="brief">
<rt-destination>192.0.2.0/24</rt-destination>
<rt-entry>
<active-tag>*</active-tag>
<current-active/>
<protocol-name>Direct</protocol-name>
<preference>0</preference>
<nh>
<selected-next-hop/>
<via>ge-0/0/0.0</via>
</nh>
</rt-entry>
<rt-entry>
<protocol-name>BGP</protocol-name>
<preference>170</preference>
<local-preference>100</local-preference>
<as-path>65001 I</as-path>
<nh-type>Indirect</nh-type>
</rt-entry>
</rt>
</route-table>
<route-table>
<table-name>inet6.0</table-name>
</route-table>
</route-information>
</rpc-reply>"#;

    #[test]
    fn test_parse_tables() {
        let reply = RpcReply::parse(ROUTES).unwrap();
        let tables = parse_route_information(&reply).unwrap();
        assert_eq!(tables.table.len(), 2);
        assert_eq!(tables.table[1].name, "inet6.0");
        assert!(tables.table[1].route.is_empty());

        let inet = &tables.table[0];
        assert_eq!(inet.route.len(), 2);
        let default = &inet.route[0];
        assert_eq!(default.destination, "0.0.0.0/0");
        assert_eq!(
            default.entry[0].next_hop,
            vec![RouteNextHop {
                local_interface: None,
                selected_next_hop: true,
                to: Some("192.0.2.254".to_string()),
                via: Some("ge-0/0/0.0".to_string()),
            }]
        );
        assert!(default.entry[0].current_active);

        let bgp = &inet.route[1].entry[1];
        assert!(!bgp.current_active);
        assert_eq!(bgp.protocol.as_deref(), Some("BGP"));
        assert_eq!(bgp.local_preference, Some(100));
        assert_eq!(bgp.as_path.as_deref(), Some("65001 I"));
        assert_eq!(bgp.next_hop_type.as_deref(), Some("Indirect"));
        assert!(bgp.next_hop.is_empty());
    }

    #[test]
    fn test_id() {
        let output = RouteTables::default();
        assert_eq!(Routes::id(&RoutesInput::default(), &output), "all");
        let input = RoutesInput {
            table_name: Some("inet.0".to_string()),
        };
        assert_eq!(Routes::id(&input, &output), "inet.0");
    }
}
