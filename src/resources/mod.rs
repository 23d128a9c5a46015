//! Resources: typed Junos configuration objects.
//!
//! A resource type implements [`ConfigResource`]: how its attributes map to
//! `set` statements under one configuration path and back. The generic
//! [`Adapter`] turns any such type into a [`Resource`], the object-safe
//! trait the provider dispatches on, and runs the shared workflows:
//!
//! - **create**: lock, pre-check, refuse existing objects, load, commit,
//!   check the object exists after the commit, clear and unlock
//! - **read**: read by identity under the process mutex, `None` if absent
//! - **update**: delete managed options, set again, commit
//! - **delete**: delete the object, commit
//! - **import**: parse the id and read the object
//!
//! In fake set-file mode create (and update/delete when enabled) write
//! their lines to the set file instead.

pub mod application;
pub mod null_commit_file;
pub mod prefix_list;
pub mod routing_instance;
pub mod static_route;
pub mod vlan;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{Error, ErrorContext, Result};
use crate::junos::{mutex_lock, Client, Session, SetLines};
use crate::schema::{Diagnostic, Response, Schema};

/// Diagnostic summary: plan or state failed validation
pub const VALIDATION_ERROR: &str = "Invalid Configuration";
/// Diagnostic summary: no session could be opened
pub const START_SESSION_ERROR: &str = "Start Session Error";
/// Diagnostic summary: the candidate could not be locked
pub const CONFIG_LOCK_ERROR: &str = "Config Lock Error";
/// Diagnostic summary: a pre-check failed
pub const PRE_CHECK_ERROR: &str = "Pre Check Error";
/// Diagnostic summary: the object already exists
pub const DUPLICATE_CONFIG_ERROR: &str = "Duplicate Configuration Error";
/// Diagnostic summary: loading set lines failed
pub const CONFIG_SET_ERROR: &str = "Config Set Error";
/// Diagnostic summary: the commit failed
pub const CONFIG_COMMIT_ERROR: &str = "Config Commit Error";
/// Diagnostic summary: the object is missing
pub const NOT_FOUND_ERROR: &str = "Not Found Error";
/// Diagnostic summary: reading configuration failed
pub const CONFIG_READ_ERROR: &str = "Config Read Error";
/// Diagnostic summary: loading delete lines failed
pub const CONFIG_DEL_ERROR: &str = "Config Del Error";
/// Diagnostic summary: an identity attribute changed
pub const REQUIRES_REPLACE_ERROR: &str = "Requires Replace";

/// A configuration object mapped to `set` statements under one path.
#[async_trait]
pub trait ConfigResource:
    Serialize + DeserializeOwned + Default + Clone + PartialEq + Send + Sync + 'static
{
    /// Resource type name (`junos_vlan`)
    const TYPE_NAME: &'static str;
    /// Name used in messages (`vlan`)
    const DISPLAY_NAME: &'static str;
    /// Current state schema version
    const SCHEMA_VERSION: u64 = 0;
    /// Expected import id format, shown when import fails
    const IMPORT_ID_FORMAT: &'static str;

    /// Attribute descriptions
    fn schema() -> Schema;

    /// Identity of the object
    fn id(&self) -> String;

    /// Object holding only the identity parsed from an import id
    fn from_id(id: &str) -> Option<Self>;

    /// Copy of the identity attributes, everything else defaulted
    fn identity(&self) -> Self;

    /// Check attribute values and combinations
    fn validate(&self) -> Result<()>;

    /// Configuration path of the object (`vlans v10`)
    fn config_path(&self) -> String;

    /// Statements below the path, without the `set <path>` prefix
    fn statements(&self) -> Vec<String>;

    /// Fold one relative statement read from the device into `self`;
    /// statements the resource does not manage are ignored.
    fn parse_line(&mut self, line: &str) -> Result<()>;

    /// Full `set` lines creating the object
    fn set_lines(&self) -> Vec<String> {
        let mut lines = SetLines::set(self.config_path());
        lines.base();
        for statement in self.statements() {
            lines.push(statement);
        }
        lines.into_lines()
    }

    /// `delete` lines removing the object
    fn delete_lines(&self) -> Vec<String> {
        let mut lines = SetLines::delete(self.config_path());
        lines.base();
        lines.into_lines()
    }

    /// `delete` lines run before setting the new values on update
    fn delete_options_lines(&self) -> Vec<String> {
        self.delete_lines()
    }

    /// Checks run inside the locked session before creating
    async fn pre_check(&self, _session: &mut Session) -> Result<()> {
        Ok(())
    }

    /// Read the object with the identity of `self`
    async fn read(&self, session: &mut Session) -> Result<Option<Self>> {
        let Some(lines) = session.show_set_lines(&self.config_path()).await? else {
            return Ok(None);
        };
        let mut found = self.identity();
        for line in &lines {
            found.parse_line(line)?;
        }
        Ok(Some(found))
    }

    /// Upgrade a state stored with an older schema version by one or more
    /// steps up to [`ConfigResource::SCHEMA_VERSION`]
    fn upgrade(version: u64, _state: Value) -> Result<Value> {
        Err(Error::StateUpgrade {
            resource: Self::TYPE_NAME.to_string(),
            version,
            message: "no upgrade path".to_string(),
        })
    }
}

/// Parse a number read from the device configuration
pub fn parse_number<T>(attribute: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("invalid {} '{}' in device configuration", attribute, value))
}

/// Object-safe interface the provider dispatches on.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Resource type name
    fn type_name(&self) -> &'static str;

    /// Attribute descriptions
    fn schema(&self) -> Schema;

    /// Set lines the plan would load, without touching a device
    fn plan_lines(&self, plan: &Value) -> Result<Vec<String>>;

    /// The identity attribute that differs between state and plan, if any
    fn requires_replace(&self, state: &Value, plan: &Value) -> Option<&'static str>;

    /// Bring a stored state up to the current schema version
    fn upgrade_state(&self, version: u64, raw: Value) -> Result<Value>;

    /// Create the object
    async fn create(&self, client: &Client, plan: Value) -> Response;

    /// Refresh a state; `state: None` in the response drops the object
    async fn read(&self, client: &Client, state: Value) -> Response;

    /// Update the object in place
    async fn update(&self, client: &Client, state: Value, plan: Value) -> Response;

    /// Remove the object
    async fn delete(&self, client: &Client, state: Value) -> Response;

    /// Build a state from an existing object
    async fn import(&self, client: &Client, id: &str) -> Response;
}

/// Decode a plan or state, ignoring the computed `id`; `null` attributes
/// take their default
pub fn decode<R: DeserializeOwned>(value: Value) -> Result<R> {
    let mut value = value;
    if let Value::Object(ref mut map) = value {
        map.retain(|key, v| key != "id" && !v.is_null());
    }
    Ok(serde_json::from_value(value)?)
}

/// Parse a resource's own statements back, as a read would
#[cfg(test)]
pub(crate) fn reparse<R: ConfigResource>(resource: &R) -> R {
    let mut parsed = resource.identity();
    for statement in resource.statements() {
        parsed.parse_line(&statement).unwrap();
    }
    parsed
}

/// Encode a resource as state, adding its `id`
pub fn encode<R: ConfigResource>(resource: &R) -> Result<Value> {
    let mut value = serde_json::to_value(resource)?;
    if let Value::Object(ref mut map) = value {
        map.insert("id".to_string(), Value::String(resource.id()));
    }
    Ok(value)
}

fn state_response<R: ConfigResource>(resource: &R) -> Response {
    match encode(resource) {
        Ok(state) => Response::with_state(state),
        Err(e) => Response::failed(CONFIG_READ_ERROR, &e),
    }
}

/// Close a session; failures only matter for the logs
pub(crate) async fn close_session(session: Session) {
    let device = session.device().to_string();
    if let Err(e) = session.close().await {
        warn!(device = %device, error = %e, "Failed to close session");
    }
}

type StepResult<T> = std::result::Result<T, (&'static str, Error)>;

async fn set_and_commit(
    session: &mut Session,
    lines: &[String],
    log: &str,
    set_summary: &'static str,
) -> StepResult<Vec<Diagnostic>> {
    session
        .config_set(lines)
        .await
        .map_err(|e| (set_summary, e))?;
    session
        .commit_conf(log)
        .await
        .map_err(|e| (CONFIG_COMMIT_ERROR, e))
}

/// Load lines and commit in a locked session of its own
pub(crate) async fn commit_lines(
    client: &Client,
    lines: &[String],
    log: &str,
    set_summary: &'static str,
) -> Response {
    let mut session = match client.start_new_session().await {
        Ok(session) => session,
        Err(e) => return Response::failed(START_SESSION_ERROR, &e),
    };

    let mut resp = Response::default();
    match session.config_lock().await {
        Ok(()) => {
            match set_and_commit(&mut session, lines, log, set_summary).await {
                Ok(warnings) => resp.diagnostics.extend(warnings),
                Err((summary, e)) => resp.add_error(summary, &e),
            }
            resp.diagnostics.extend(session.clear_and_unlock().await);
        }
        Err(e) => resp.add_error(CONFIG_LOCK_ERROR, &e),
    }
    close_session(session).await;
    resp
}

/// Generic [`Resource`] for any [`ConfigResource`]
pub struct Adapter<R> {
    _marker: PhantomData<fn() -> R>,
}

impl<R: ConfigResource> Adapter<R> {
    /// Create the adapter
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    fn decode_valid(value: Value) -> Result<R> {
        let resource: R = decode(value)?;
        resource.validate()?;
        Ok(resource)
    }

    async fn create_locked(
        resource: &R,
        session: &mut Session,
        resp: &mut Response,
    ) -> StepResult<()> {
        resource
            .pre_check(session)
            .await
            .map_err(|e| (PRE_CHECK_ERROR, e))?;
        if resource
            .read(session)
            .await
            .map_err(|e| (PRE_CHECK_ERROR, e))?
            .is_some()
        {
            return Err((
                DUPLICATE_CONFIG_ERROR,
                Error::already_exists(R::DISPLAY_NAME, resource.id()),
            ));
        }

        let warnings = set_and_commit(
            session,
            &resource.set_lines(),
            &format!("create resource {}", R::TYPE_NAME),
            CONFIG_SET_ERROR,
        )
        .await?;
        resp.diagnostics.extend(warnings);

        match resource.read(session).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err((
                NOT_FOUND_ERROR,
                Error::not_found_after_commit(R::DISPLAY_NAME, resource.id()),
            )),
            Err(e) => Err((CONFIG_READ_ERROR, e)),
        }
    }

    fn import_not_found(id: &str) -> Error {
        Error::ImportNotFound {
            resource: R::DISPLAY_NAME.to_string(),
            id: id.to_string(),
            format: R::IMPORT_ID_FORMAT.to_string(),
        }
    }

    /// Read under the process mutex in a session of its own
    async fn read_by_identity(client: &Client, resource: &R) -> Result<Option<R>> {
        let _guard = mutex_lock().await;
        let mut session = client.start_new_session().await?;
        let found = resource.read(&mut session).await;
        close_session(session).await;
        found
    }
}

impl<R: ConfigResource> Default for Adapter<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: ConfigResource> Resource for Adapter<R> {
    fn type_name(&self) -> &'static str {
        R::TYPE_NAME
    }

    fn schema(&self) -> Schema {
        R::schema()
    }

    fn plan_lines(&self, plan: &Value) -> Result<Vec<String>> {
        Ok(Self::decode_valid(plan.clone())?.set_lines())
    }

    fn requires_replace(&self, state: &Value, plan: &Value) -> Option<&'static str> {
        let normalize = |v: &Value| {
            decode::<R>(v.clone())
                .ok()
                .and_then(|r| serde_json::to_value(r).ok())
        };
        let (state, plan) = (normalize(state)?, normalize(plan)?);
        R::schema()
            .force_new_attributes()
            .find(|attr| state.get(*attr) != plan.get(*attr))
    }

    fn upgrade_state(&self, version: u64, raw: Value) -> Result<Value> {
        let upgrade_error = |message: String| Error::StateUpgrade {
            resource: R::TYPE_NAME.to_string(),
            version,
            message,
        };
        if version > R::SCHEMA_VERSION {
            return Err(upgrade_error(format!(
                "state is newer than the provider (current version {})",
                R::SCHEMA_VERSION
            )));
        }
        let upgraded = if version == R::SCHEMA_VERSION {
            raw
        } else {
            R::upgrade(version, raw)?
        };
        let resource: R = decode(upgraded).map_err(|e| upgrade_error(e.to_string()))?;
        encode(&resource)
    }

    async fn create(&self, client: &Client, plan: Value) -> Response {
        let resource = match Self::decode_valid(plan) {
            Ok(resource) => resource,
            Err(e) => return Response::failed(VALIDATION_ERROR, &e),
        };

        if client.fake_create_setfile().is_some() {
            if let Err(e) = client.append_fake_set_lines(&resource.set_lines()).await {
                return Response::failed(CONFIG_SET_ERROR, &e);
            }
            return state_response(&resource);
        }

        let mut session = match client.start_new_session().await {
            Ok(session) => session,
            Err(e) => return Response::failed(START_SESSION_ERROR, &e),
        };
        let mut resp = Response::default();
        if let Err(e) = session.config_lock().await {
            resp.add_error(CONFIG_LOCK_ERROR, &e);
            close_session(session).await;
            return resp;
        }

        let result = Self::create_locked(&resource, &mut session, &mut resp).await;
        if let Err((summary, e)) = &result {
            resp.add_error(*summary, e);
        }
        resp.diagnostics.extend(session.clear_and_unlock().await);
        close_session(session).await;

        if result.is_ok() {
            debug!(resource = R::TYPE_NAME, id = %resource.id(), "Created");
            if let Ok(state) = encode(&resource) {
                resp.state = Some(state);
            }
        }
        resp
    }

    async fn read(&self, client: &Client, state: Value) -> Response {
        let resource: R = match decode(state) {
            Ok(resource) => resource,
            Err(e) => return Response::failed(CONFIG_READ_ERROR, &e),
        };
        match Self::read_by_identity(client, &resource).await {
            Ok(Some(found)) => state_response(&found),
            Ok(None) => {
                debug!(resource = R::TYPE_NAME, id = %resource.id(), "Not found, removing from state");
                Response::default()
            }
            Err(e) => Response::failed(CONFIG_READ_ERROR, &e),
        }
    }

    async fn update(&self, client: &Client, state: Value, plan: Value) -> Response {
        if let Some(attribute) = self.requires_replace(&state, &plan) {
            return Response::failed(
                REQUIRES_REPLACE_ERROR,
                &Error::RequiresReplace {
                    resource: R::TYPE_NAME.to_string(),
                    attribute: attribute.to_string(),
                },
            );
        }
        let resource = match Self::decode_valid(plan) {
            Ok(resource) => resource,
            Err(e) => return Response::failed(VALIDATION_ERROR, &e),
        };

        let mut lines = resource.delete_options_lines();
        lines.extend(resource.set_lines());

        if client.fake_update_also() {
            if let Err(e) = client.append_fake_set_lines(&lines).await {
                return Response::failed(CONFIG_SET_ERROR, &e);
            }
            return state_response(&resource);
        }

        let mut resp = commit_lines(
            client,
            &lines,
            &format!("update resource {}", R::TYPE_NAME),
            CONFIG_SET_ERROR,
        )
        .await;
        if !resp.has_error() {
            if let Ok(state) = encode(&resource) {
                resp.state = Some(state);
            }
        }
        resp
    }

    async fn delete(&self, client: &Client, state: Value) -> Response {
        let resource: R = match decode(state) {
            Ok(resource) => resource,
            Err(e) => return Response::failed(CONFIG_DEL_ERROR, &e),
        };

        if client.fake_delete_also() {
            if let Err(e) = client.append_fake_set_lines(&resource.delete_lines()).await {
                return Response::failed(CONFIG_DEL_ERROR, &e);
            }
            return Response::default();
        }

        commit_lines(
            client,
            &resource.delete_lines(),
            &format!("delete resource {}", R::TYPE_NAME),
            CONFIG_DEL_ERROR,
        )
        .await
    }

    async fn import(&self, client: &Client, id: &str) -> Response {
        let Some(resource) = R::from_id(id) else {
            return Response::failed(NOT_FOUND_ERROR, &Self::import_not_found(id));
        };
        match Self::read_by_identity(client, &resource).await {
            Ok(Some(found)) => state_response(&found),
            Ok(None) => Response::failed(NOT_FOUND_ERROR, &Self::import_not_found(id)),
            Err(e) => Response::failed(CONFIG_READ_ERROR, &e),
        }
    }
}

/// Registry of resource types
pub struct ResourceRegistry {
    resources: HashMap<String, Arc<dyn Resource>>,
}

impl ResourceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            resources: HashMap::new(),
        }
    }

    /// Create a registry with all built-in resources
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(Adapter::<application::Application>::new()));
        registry.register(Arc::new(null_commit_file::NullCommitFileResource));
        registry.register(Arc::new(Adapter::<prefix_list::PrefixList>::new()));
        registry.register(Arc::new(Adapter::<routing_instance::RoutingInstance>::new()));
        registry.register(Arc::new(Adapter::<static_route::StaticRoute>::new()));
        registry.register(Arc::new(Adapter::<vlan::Vlan>::new()));
        registry
    }

    /// Register a resource
    pub fn register(&mut self, resource: Arc<dyn Resource>) {
        self.resources
            .insert(resource.type_name().to_string(), resource);
    }

    /// Get a resource by type name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Resource>> {
        self.resources.get(name).cloned()
    }

    /// Check if a resource type exists
    pub fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    /// All type names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.resources.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
