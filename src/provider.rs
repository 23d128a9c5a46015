//! Provider: registries of resource and data source types plus the client
//! built by `configure`.

use std::sync::Arc;
use tracing::info;

use crate::config::ProviderConfig;
use crate::connection::Connector;
use crate::data_sources::{DataSource, DataSourceRegistry};
use crate::error::{Error, Result};
use crate::junos::Client;
use crate::resources::{Resource, ResourceRegistry};

/// The provider
pub struct Provider {
    resources: ResourceRegistry,
    data_sources: DataSourceRegistry,
    client: Option<Client>,
}

impl Provider {
    /// Unconfigured provider with all built-in types
    pub fn new() -> Self {
        Self {
            resources: ResourceRegistry::with_builtins(),
            data_sources: DataSourceRegistry::with_builtins(),
            client: None,
        }
    }

    /// Configure the provider to reach the device over SSH
    #[cfg(feature = "russh")]
    pub fn configure(&mut self, block: crate::config::ProviderBlock) -> Result<()> {
        let config = ProviderConfig::from_block(block)?;
        info!(
            device = %format!("{}:{}", config.ip, config.port),
            fake = config.fake_create_with_setfile.is_some(),
            "Provider configured"
        );
        self.client = Some(Client::new(config));
        Ok(())
    }

    /// Configure the provider with an arbitrary connector
    pub fn configure_with_connector(&mut self, config: ProviderConfig, connector: Arc<dyn Connector>) {
        info!(device = %format!("{}:{}", config.ip, config.port), "Provider configured");
        self.client = Some(Client::with_connector(config, connector));
    }

    /// Client of the configured provider
    pub fn client(&self) -> Result<&Client> {
        self.client.as_ref().ok_or_else(|| {
            Error::NotConfigured("configure the provider before using it".to_string())
        })
    }

    /// Whether `configure` has run
    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Resource type by name
    pub fn resource(&self, name: &str) -> Result<Arc<dyn Resource>> {
        self.resources
            .get(name)
            .ok_or_else(|| Error::UnknownResource(name.to_string()))
    }

    /// Data source type by name
    pub fn data_source(&self, name: &str) -> Result<Arc<dyn DataSource>> {
        self.data_sources
            .get(name)
            .ok_or_else(|| Error::UnknownDataSource(name.to_string()))
    }

    /// Registered resource types
    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    /// Registered data source types
    pub fn data_sources(&self) -> &DataSourceRegistry {
        &self.data_sources
    }
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_types() {
        let provider = Provider::new();
        assert!(matches!(
            provider.resource("junos_interface"),
            Err(Error::UnknownResource(_))
        ));
        assert!(matches!(
            provider.data_source("junos_vlan"),
            Err(Error::UnknownDataSource(_))
        ));
        assert!(provider.resource("junos_vlan").is_ok());
    }

    #[test]
    fn test_client_before_configure() {
        let provider = Provider::default();
        assert!(!provider.is_configured());
        assert!(matches!(provider.client(), Err(Error::NotConfigured(_))));
    }
}
