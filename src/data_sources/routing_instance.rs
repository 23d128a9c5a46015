//! `junos_routing_instance` data source: configuration of an existing
//! routing instance.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::DeviceQuery;
use crate::error::{Error, Result};
use crate::junos::Session;
use crate::resources::routing_instance::RoutingInstance;
use crate::resources::ConfigResource;
use crate::schema::{validate, AttrMode, NameFormat, Schema};

/// Reads a routing instance like the resource does
pub struct RoutingInstanceData;

/// Arguments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutingInstanceName {
    pub name: String,
}

#[async_trait]
impl DeviceQuery for RoutingInstanceData {
    const TYPE_NAME: &'static str = "junos_routing_instance";

    type Input = RoutingInstanceName;
    type Output = RoutingInstance;

    fn schema() -> Schema {
        let mut schema = RoutingInstance::schema();
        schema.description = "Get configuration from a routing instance.";
        for attribute in schema.attributes.iter_mut() {
            attribute.force_new = false;
            attribute.mode = if attribute.name == "name" {
                AttrMode::Required
            } else {
                AttrMode::Computed
            };
        }
        schema
    }

    fn validate(input: &RoutingInstanceName) -> Result<()> {
        validate::name("name", &input.name, 63, NameFormat::Default)
    }

    fn id(input: &RoutingInstanceName, _output: &RoutingInstance) -> String {
        input.name.clone()
    }

    async fn query(input: &RoutingInstanceName, session: &mut Session) -> Result<RoutingInstance> {
        RoutingInstance::named(input.name.clone())
            .read(session)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!("routing instance {} doesn't exist", input.name))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_is_read_only() {
        let schema = RoutingInstanceData::schema();
        assert_eq!(schema.force_new_attributes().count(), 0);
        assert_eq!(schema.attribute("name").unwrap().mode, AttrMode::Required);
        assert_eq!(schema.attribute("vrf_target").unwrap().mode, AttrMode::Computed);
        assert_eq!(schema.attribute("id").unwrap().mode, AttrMode::Computed);
    }
}
