//! `junos_system_information`: host name, model, version and serial number.

use async_trait::async_trait;
use serde::Serialize;

use super::{DeviceQuery, NoInput};
use crate::error::{Error, Result};
use crate::junos::Session;
use crate::netconf::reply::child_text;
use crate::netconf::{rpc, RpcReply};
use crate::schema::{AttrKind, Attribute, Schema};

/// `<get-system-information/>`
pub struct SystemInformation;

/// Parsed system information
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SystemInfo {
    pub hardware_model: String,
    pub os_name: String,
    pub os_version: String,
    pub serial_number: String,
    pub host_name: String,
    /// Reply came from a chassis cluster node
    pub cluster_node: bool,
}

/// Extract system information; cluster members wrap it in
/// `multi-routing-engine-results`.
pub fn parse_system_information(reply: &RpcReply) -> Result<SystemInfo> {
    let doc = reply.document()?;
    let node = doc
        .descendants()
        .find(|n| n.has_tag_name("system-information"))
        .ok_or_else(|| Error::Protocol("no system-information in reply".to_string()))?;
    let text = |name: &str| child_text(node, name).unwrap_or_default();

    Ok(SystemInfo {
        hardware_model: text("hardware-model"),
        os_name: text("os-name"),
        os_version: text("os-version"),
        serial_number: text("serial-number"),
        host_name: text("host-name"),
        cluster_node: doc
            .descendants()
            .any(|n| n.has_tag_name("multi-routing-engine-results")),
    })
}

#[async_trait]
impl DeviceQuery for SystemInformation {
    const TYPE_NAME: &'static str = "junos_system_information";

    type Input = NoInput;
    type Output = SystemInfo;

    fn schema() -> Schema {
        Schema::new(
            0,
            "Get information of the Junos device (host name, model, version, serial number).",
            vec![
                Attribute::computed("hardware_model", AttrKind::String, "Type of hardware/software of Junos device."),
                Attribute::computed("os_name", AttrKind::String, "Operating system name of Junos."),
                Attribute::computed("os_version", AttrKind::String, "Software version of Junos."),
                Attribute::computed("serial_number", AttrKind::String, "Serial number of the device."),
                Attribute::computed("host_name", AttrKind::String, "Hostname of the device."),
                Attribute::computed(
                    "cluster_node",
                    AttrKind::Bool,
                    "Boolean flag that indicates if device is part of a cluster or not.",
                ),
            ],
        )
    }

    fn id(_input: &NoInput, output: &SystemInfo) -> String {
        output.host_name.clone()
    }

    async fn query(_input: &NoInput, session: &mut Session) -> Result<SystemInfo> {
        let reply = session.rpc(&rpc::get_system_information()).await?;
        parse_system_information(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_standalone() {
        let reply = RpcReply::parse(
            r#"<rpc-reply message-id="2">
<system-information>
<hardware-model>vsrx</hardware-model>
<os-name>junos-es</os-name>
<os-version>21.4R3-S1.6</os-version>
<serial-number>ABC123</serial-number>
<host-name>fw1</host-name>
</system-information>
</rpc-reply>"#,
        )
        .unwrap();
        let info = parse_system_information(&reply).unwrap();
        assert_eq!(info.hardware_model, "vsrx");
        assert_eq!(info.os_version, "21.4R3-S1.6");
        assert_eq!(info.host_name, "fw1");
        assert!(!info.cluster_node);
    }

    #[test]
    fn test_parse_cluster_node() {
        let reply = RpcReply::parse(
            r#"<rpc-reply message-id="2">
<multi-routing-engine-results>
<multi-routing-engine-item>
<re-name>node0</re-name>
<system-information>
<hardware-model>srx345</hardware-model>
<host-name>fw-cluster</host-name>
</system-information>
</multi-routing-engine-item>
</multi-routing-engine-results>
</rpc-reply>"#,
        )
        .unwrap();
        let info = parse_system_information(&reply).unwrap();
        assert!(info.cluster_node);
        assert_eq!(info.host_name, "fw-cluster");
        assert_eq!(info.serial_number, "");
    }

    #[test]
    fn test_missing_information() {
        let reply = RpcReply::parse(r#"<rpc-reply message-id="2"><ok/></rpc-reply>"#).unwrap();
        assert!(parse_system_information(&reply).is_err());
    }
}
