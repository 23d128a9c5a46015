//! `junos_interfaces_physical_present`: physical interfaces present on the
//! device, filtered by name pattern and status.

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::DeviceQuery;
use crate::error::{Error, Result};
use crate::junos::{join_id, Session};
use crate::netconf::reply::{child_text, children_named};
use crate::netconf::{rpc, RpcReply};
use crate::schema::{AttrKind, Attribute, Schema};

/// `<get-interface-information><terse/>` with filters
pub struct InterfacesPhysicalPresent;

/// Filters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterfacesFilter {
    /// Regular expression the name must match
    pub match_name: Option<String>,
    /// Keep only interfaces administratively up
    pub match_admin_up: bool,
    /// Keep only interfaces operationally up
    pub match_oper_up: bool,
}

/// Status of one interface
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct InterfaceStatus {
    pub name: String,
    pub admin_status: String,
    pub oper_status: String,
}

/// Query result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PresentInterfaces {
    pub interface_names: Vec<String>,
    pub interface_statuses: Vec<InterfaceStatus>,
}

impl InterfacesFilter {
    fn regex(&self) -> Result<Option<Regex>> {
        self.match_name
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| Error::validation("match_name", e.to_string()))
            })
            .transpose()
    }
}

/// Filter the physical interfaces of a terse interface reply; results are
/// sorted by name
pub fn filter_interfaces(reply: &RpcReply, filter: &InterfacesFilter) -> Result<PresentInterfaces> {
    let regex = filter.regex()?;
    let doc = reply.document()?;
    let Some(info) = doc
        .descendants()
        .find(|n| n.has_tag_name("interface-information"))
    else {
        return Err(Error::Protocol(
            "no interface-information in reply".to_string(),
        ));
    };

    let mut statuses: Vec<InterfaceStatus> = children_named(info, "physical-interface")
        .map(|node| InterfaceStatus {
            name: child_text(node, "name").unwrap_or_default(),
            admin_status: child_text(node, "admin-status").unwrap_or_default(),
            oper_status: child_text(node, "oper-status").unwrap_or_default(),
        })
        .filter(|status| !status.name.is_empty())
        .filter(|status| regex.as_ref().map_or(true, |re| re.is_match(&status.name)))
        .filter(|status| !filter.match_admin_up || status.admin_status == "up")
        .filter(|status| !filter.match_oper_up || status.oper_status == "up")
        .collect();
    statuses.sort();

    Ok(PresentInterfaces {
        interface_names: statuses.iter().map(|s| s.name.clone()).collect(),
        interface_statuses: statuses,
    })
}

#[async_trait]
impl DeviceQuery for InterfacesPhysicalPresent {
    const TYPE_NAME: &'static str = "junos_interfaces_physical_present";

    type Input = InterfacesFilter;
    type Output = PresentInterfaces;

    fn schema() -> Schema {
        Schema::new(
            0,
            "Get list of filtered physical interfaces present on the Junos device.",
            vec![
                Attribute::optional(
                    "match_name",
                    AttrKind::String,
                    "A regexp to apply filter on name.",
                ),
                Attribute::optional(
                    "match_admin_up",
                    AttrKind::Bool,
                    "Filter on interfaces that have admin status `up`.",
                ),
                Attribute::optional(
                    "match_oper_up",
                    AttrKind::Bool,
                    "Filter on interfaces that have operational status `up`.",
                ),
                Attribute::computed(
                    "interface_names",
                    AttrKind::StringList,
                    "List of found interfaces names.",
                ),
                Attribute::computed(
                    "interface_statuses",
                    AttrKind::Block,
                    "Name, admin_status and oper_status of each found interface.",
                ),
            ],
        )
    }

    fn validate(input: &InterfacesFilter) -> Result<()> {
        input.regex().map(|_| ())
    }

    fn id(input: &InterfacesFilter, _output: &PresentInterfaces) -> String {
        join_id(&[
            &format!("match={}", input.match_name.as_deref().unwrap_or_default()),
            &format!("admin_up={}", input.match_admin_up),
            &format!("oper_up={}", input.match_oper_up),
        ])
    }

    async fn query(input: &InterfacesFilter, session: &mut Session) -> Result<PresentInterfaces> {
        let reply = session.rpc(&rpc::get_interface_information_terse()).await?;
        filter_interfaces(&reply, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TERSE: &str = r#"<rpc-reply message-id="5">
<interface-information style="terse">
<physical-interface>
<name>
ge-0/0/1
</name>
<admin-status>
up
</admin-status>
<oper-status>
down
</oper-status>
</physical-interface>
<physical-interface>
<name>
ge-0/0/0
</name>
<admin-status>
up
</admin-status>
<oper-status>
up
</oper-status>
<logical-interface>
<name>
ge-0/0/0.0
</name>
<admin-status>
up
</admin-status>
<oper-status>
up
</oper-status>
</logical-interface>
</physical-interface>
<physical-interface>
<name>
xe-0/0/0
</name>
<admin-status>
down
</admin-status>
<oper-status>
down
</oper-status>
</physical-interface>
</interface-information>
</rpc-reply>"#;

    fn run(filter: InterfacesFilter) -> PresentInterfaces {
        let reply = RpcReply::parse(TERSE).unwrap();
        filter_interfaces(&reply, &filter).unwrap()
    }

    #[test]
    fn test_no_filter_sorted() {
        let found = run(InterfacesFilter::default());
        assert_eq!(found.interface_names, vec!["ge-0/0/0", "ge-0/0/1", "xe-0/0/0"]);
        assert_eq!(found.interface_statuses[0].oper_status, "up");
    }

    #[test]
    fn test_filters() {
        let found = run(InterfacesFilter {
            match_name: Some("^ge-".to_string()),
            match_admin_up: true,
            ..Default::default()
        });
        assert_eq!(found.interface_names, vec!["ge-0/0/0", "ge-0/0/1"]);

        let found = run(InterfacesFilter {
            match_oper_up: true,
            ..Default::default()
        });
        assert_eq!(found.interface_names, vec!["ge-0/0/0"]);
    }

    #[test]
    fn test_bad_regex() {
        let filter = InterfacesFilter {
            match_name: Some("(".to_string()),
            ..Default::default()
        };
        assert!(InterfacesPhysicalPresent::validate(&filter).is_err());
    }
}
