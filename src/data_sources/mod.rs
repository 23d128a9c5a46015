//! Data sources: read-only queries against the device.
//!
//! A [`DeviceQuery`] declares its input and output types and runs against
//! an open [`Session`]. [`Query`] adapts it to the object-safe
//! [`DataSource`] the provider dispatches on: decode and validate the
//! input, open a session under the process mutex, query, close, and merge
//! input, output and `id` into the resulting state.

pub mod interfaces_physical_present;
pub mod routes;
pub mod routing_instance;
pub mod system_information;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::junos::{mutex_lock, Client, Session};
use crate::resources::{close_session, decode, CONFIG_READ_ERROR, START_SESSION_ERROR, VALIDATION_ERROR};
use crate::schema::{Response, Schema};

/// Input of queries taking no arguments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoInput {}

/// A typed query against the device
#[async_trait]
pub trait DeviceQuery: Send + Sync + 'static {
    /// Data source type name
    const TYPE_NAME: &'static str;

    /// Query arguments
    type Input: Serialize + DeserializeOwned + Default + Send + Sync;
    /// Query result
    type Output: Serialize + Send;

    /// Attribute descriptions
    fn schema() -> Schema;

    /// Check the arguments
    fn validate(_input: &Self::Input) -> Result<()> {
        Ok(())
    }

    /// Identifier of a result
    fn id(input: &Self::Input, output: &Self::Output) -> String;

    /// Run the query
    async fn query(input: &Self::Input, session: &mut Session) -> Result<Self::Output>;
}

/// Object-safe interface the provider dispatches on
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Data source type name
    fn type_name(&self) -> &'static str;

    /// Attribute descriptions
    fn schema(&self) -> Schema;

    /// Run the query with the given arguments
    async fn read(&self, client: &Client, config: Value) -> Response;
}

/// Generic [`DataSource`] for any [`DeviceQuery`]
pub struct Query<D> {
    _marker: PhantomData<fn() -> D>,
}

impl<D: DeviceQuery> Query<D> {
    /// Create the adapter
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    fn merge(input: &D::Input, output: &D::Output) -> Result<Value> {
        let mut state = serde_json::to_value(input)?;
        let output_value = serde_json::to_value(output)?;
        if let (Value::Object(state), Value::Object(output_map)) = (&mut state, output_value) {
            state.extend(output_map);
            state.insert("id".to_string(), Value::String(D::id(input, output)));
        }
        Ok(state)
    }
}

impl<D: DeviceQuery> Default for Query<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<D: DeviceQuery> DataSource for Query<D> {
    fn type_name(&self) -> &'static str {
        D::TYPE_NAME
    }

    fn schema(&self) -> Schema {
        D::schema()
    }

    async fn read(&self, client: &Client, config: Value) -> Response {
        let config = match config {
            Value::Null => Value::Object(serde_json::Map::new()),
            config => config,
        };
        let input: D::Input = match decode(config) {
            Ok(input) => input,
            Err(e) => return Response::failed(VALIDATION_ERROR, &e),
        };
        if let Err(e) = D::validate(&input) {
            return Response::failed(VALIDATION_ERROR, &e);
        }

        let _guard = mutex_lock().await;
        let mut session = match client.start_new_session().await {
            Ok(session) => session,
            Err(e) => return Response::failed(START_SESSION_ERROR, &e),
        };
        let result = D::query(&input, &mut session).await;
        close_session(session).await;

        match result.and_then(|output| Self::merge(&input, &output)) {
            Ok(state) => {
                debug!(data_source = D::TYPE_NAME, "Read");
                Response::with_state(state)
            }
            Err(e) => Response::failed(CONFIG_READ_ERROR, &e),
        }
    }
}

/// Registry of data source types
pub struct DataSourceRegistry {
    data_sources: HashMap<String, Arc<dyn DataSource>>,
}

impl DataSourceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            data_sources: HashMap::new(),
        }
    }

    /// Create a registry with all built-in data sources
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(Query::<
            interfaces_physical_present::InterfacesPhysicalPresent,
        >::new()));
        registry.register(Arc::new(Query::<routes::Routes>::new()));
        registry.register(Arc::new(Query::<routing_instance::RoutingInstanceData>::new()));
        registry.register(Arc::new(Query::<system_information::SystemInformation>::new()));
        registry
    }

    /// Register a data source
    pub fn register(&mut self, data_source: Arc<dyn DataSource>) {
        self.data_sources
            .insert(data_source.type_name().to_string(), data_source);
    }

    /// Get a data source by type name
    pub fn get(&self, name: &str) -> Option<Arc<dyn DataSource>> {
        self.data_sources.get(name).cloned()
    }

    /// Check if a data source type exists
    pub fn contains(&self, name: &str) -> bool {
        self.data_sources.contains_key(name)
    }

    /// All type names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.data_sources.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for DataSourceRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_builtins() {
        let registry = DataSourceRegistry::with_builtins();
        assert_eq!(
            registry.names(),
            vec![
                "junos_interfaces_physical_present",
                "junos_routes",
                "junos_routing_instance",
                "junos_system_information",
            ]
        );
        assert!(registry.contains("junos_routes"));
    }

    #[test]
    fn test_merge_adds_id() {
        use interfaces_physical_present::{InterfacesFilter, InterfacesPhysicalPresent, PresentInterfaces};

        let input = InterfacesFilter {
            match_name: Some("^ge-".to_string()),
            ..Default::default()
        };
        let output = PresentInterfaces::default();
        let state = Query::<InterfacesPhysicalPresent>::merge(&input, &output).unwrap();
        assert_eq!(state["match_name"], "^ge-");
        assert_eq!(state["id"], "match=^ge-_-_admin_up=false_-_oper_up=false");
        assert!(state["interface_names"].as_array().unwrap().is_empty());
    }
}
