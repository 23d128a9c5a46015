//! `junos_application`: `applications application <name>`.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{parse_number, ConfigResource};
use crate::error::Result;
use crate::junos::setline::{cut_prefix, quote, trim_quotes};
use crate::schema::{validate, AttrKind, Attribute, NameFormat, Schema};

static ETHER_TYPE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0[xX][0-9a-fA-F]{4}$").expect("Invalid ether type regex"));

static RPC_PROGRAM_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(-\d+)?$").expect("Invalid rpc program number regex"));

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("Invalid uuid regex")
});

/// A custom application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Application {
    pub name: String,
    pub application_protocol: Option<String>,
    pub description: Option<String>,
    pub destination_port: Option<String>,
    pub ether_type: Option<String>,
    pub inactivity_timeout: Option<u32>,
    pub inactivity_timeout_never: bool,
    pub protocol: Option<String>,
    pub rpc_program_number: Option<String>,
    pub source_port: Option<String>,
    pub uuid: Option<String>,
}

#[async_trait]
impl ConfigResource for Application {
    const TYPE_NAME: &'static str = "junos_application";
    const DISPLAY_NAME: &'static str = "application";
    const IMPORT_ID_FORMAT: &'static str = "<name>";

    fn schema() -> Schema {
        Schema::new(
            0,
            "Provides an application.",
            vec![
                Attribute::required("name", AttrKind::String, "Application name.").force_new(),
                Attribute::optional(
                    "application_protocol",
                    AttrKind::String,
                    "Application protocol type.",
                ),
                Attribute::optional("description", AttrKind::String, "Text description."),
                Attribute::optional(
                    "destination_port",
                    AttrKind::String,
                    "Port(s) destination used by application.",
                ),
                Attribute::optional("ether_type", AttrKind::String, "Match ether type."),
                Attribute::optional(
                    "inactivity_timeout",
                    AttrKind::Int,
                    "Application-specific inactivity timeout (4..86400 seconds).",
                ),
                Attribute::optional(
                    "inactivity_timeout_never",
                    AttrKind::Bool,
                    "Disables inactivity timeout.",
                ),
                Attribute::optional("protocol", AttrKind::String, "Match IP protocol type."),
                Attribute::optional(
                    "rpc_program_number",
                    AttrKind::String,
                    "Match range of RPC program numbers.",
                ),
                Attribute::optional(
                    "source_port",
                    AttrKind::String,
                    "Port(s) source used by application.",
                ),
                Attribute::optional("uuid", AttrKind::String, "Match universal unique identifier for DCE RPC objects."),
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
        validate::name("name", &self.name, 63, NameFormat::Default)?;
        if let Some(description) = &self.description {
            validate::length("description", description, 1, 900)?;
            validate::no_double_quotes("description", description)?;
        }
        for (attribute, value) in [
            ("application_protocol", &self.application_protocol),
            ("destination_port", &self.destination_port),
            ("protocol", &self.protocol),
            ("source_port", &self.source_port),
        ] {
            if let Some(value) = value {
                validate::no_whitespace(attribute, value)?;
                validate::no_double_quotes(attribute, value)?;
            }
        }
        if let Some(ether_type) = &self.ether_type {
            validate::matches(
                "ether_type",
                ether_type,
                &ETHER_TYPE_REGEX,
                "a hexadecimal value like 0x0800",
            )?;
        }
        if let Some(timeout) = self.inactivity_timeout {
            validate::int_range("inactivity_timeout", i64::from(timeout), 4, 86400)?;
        }
        validate::conflicts_with(
            "inactivity_timeout",
            self.inactivity_timeout.is_some(),
            "inactivity_timeout_never",
            self.inactivity_timeout_never,
        )?;
        if let Some(number) = &self.rpc_program_number {
            validate::matches(
                "rpc_program_number",
                number,
                &RPC_PROGRAM_REGEX,
                "a number or a range 'low-high'",
            )?;
        }
        if let Some(uuid) = &self.uuid {
            validate::matches("uuid", uuid, &UUID_REGEX, "a uuid")?;
        }
        Ok(())
    }

    fn config_path(&self) -> String {
        format!("applications application {}", self.name)
    }

    fn statements(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(protocol) = &self.application_protocol {
            lines.push(format!("application-protocol {}", protocol));
        }
        if let Some(description) = &self.description {
            lines.push(format!("description {}", quote(description)));
        }
        if let Some(port) = &self.destination_port {
            lines.push(format!("destination-port {}", port));
        }
        if let Some(ether_type) = &self.ether_type {
            lines.push(format!("ether-type {}", ether_type));
        }
        if let Some(timeout) = self.inactivity_timeout {
            lines.push(format!("inactivity-timeout {}", timeout));
        } else if self.inactivity_timeout_never {
            lines.push("inactivity-timeout never".to_string());
        }
        if let Some(protocol) = &self.protocol {
            lines.push(format!("protocol {}", protocol));
        }
        if let Some(number) = &self.rpc_program_number {
            lines.push(format!("rpc-program-number {}", number));
        }
        if let Some(port) = &self.source_port {
            lines.push(format!("source-port {}", port));
        }
        if let Some(uuid) = &self.uuid {
            lines.push(format!("uuid {}", uuid));
        }
        lines
    }

    fn parse_line(&mut self, line: &str) -> Result<()> {
        if let Some(v) = cut_prefix(line, "application-protocol") {
            self.application_protocol = Some(v.to_string());
        } else if let Some(v) = cut_prefix(line, "description") {
            self.description = Some(trim_quotes(v).to_string());
        } else if let Some(v) = cut_prefix(line, "destination-port") {
            self.destination_port = Some(v.to_string());
        } else if let Some(v) = cut_prefix(line, "ether-type") {
            self.ether_type = Some(v.to_string());
        } else if let Some(v) = cut_prefix(line, "inactivity-timeout") {
            if v == "never" {
                self.inactivity_timeout_never = true;
            } else {
                self.inactivity_timeout = Some(parse_number("inactivity-timeout", v)?);
            }
        } else if let Some(v) = cut_prefix(line, "protocol") {
            self.protocol = Some(v.to_string());
        } else if let Some(v) = cut_prefix(line, "rpc-program-number") {
            self.rpc_program_number = Some(v.to_string());
        } else if let Some(v) = cut_prefix(line, "source-port") {
            self.source_port = Some(v.to_string());
        } else if let Some(v) = cut_prefix(line, "uuid") {
            self.uuid = Some(v.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::reparse;

    fn ssh_alt() -> Application {
        Application {
            name: "ssh-2222".to_string(),
            description: Some("ssh on alternate port".to_string()),
            protocol: Some("tcp".to_string()),
            destination_port: Some("2222".to_string()),
            inactivity_timeout: Some(3600),
            ..Default::default()
        }
    }

    #[test]
    fn test_set_lines() {
        let lines = ssh_alt().set_lines();
        assert_eq!(lines[0], "set applications application ssh-2222");
        assert!(lines.contains(&"set applications application ssh-2222 protocol tcp".to_string()));
        assert!(lines.contains(
            &"set applications application ssh-2222 inactivity-timeout 3600".to_string()
        ));
    }

    #[test]
    fn test_parse_agrees_with_statements() {
        let app = ssh_alt();
        assert_eq!(reparse(&app), app);

        let never = Application {
            name: "rpc".to_string(),
            inactivity_timeout_never: true,
            rpc_program_number: Some("100000-100010".to_string()),
            ether_type: Some("0x0800".to_string()),
            uuid: Some("e1af8308-5d1f-11c9-91a4-08002b14a0fa".to_string()),
            ..Default::default()
        };
        assert!(never.validate().is_ok());
        assert_eq!(reparse(&never), never);
    }

    #[test]
    fn test_validate() {
        assert!(ssh_alt().validate().is_ok());

        let mut both = ssh_alt();
        both.inactivity_timeout_never = true;
        assert!(both.validate().is_err());

        let mut short = ssh_alt();
        short.inactivity_timeout = Some(3);
        assert!(short.validate().is_err());

        let mut ether = ssh_alt();
        ether.ether_type = Some("0800".to_string());
        assert!(ether.validate().is_err());

        let mut uuid = ssh_alt();
        uuid.uuid = Some("not-a-uuid".to_string());
        assert!(uuid.validate().is_err());
    }
}
