//! Error types for the Junos provider.
//!
//! Transport failures keep their own [`ConnectionError`] type; everything
//! above the transport reports through [`Error`].

use std::time::Duration;
use thiserror::Error;

use crate::connection::ConnectionError;
use crate::netconf::RpcErrors;

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the provider.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Provider Configuration Errors
    // ========================================================================
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid value for one provider attribute.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidConfig {
        /// Attribute name
        key: String,
        /// Error message
        message: String,
    },

    /// A resource or data source was used before the provider was configured.
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    // ========================================================================
    // Device Errors
    // ========================================================================
    /// Transport error.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// The device broke the NETCONF protocol.
    #[error("NETCONF protocol error: {0}")]
    Protocol(String),

    /// The device answered an RPC with one or more errors.
    #[error("{0}")]
    Rpc(RpcErrors),

    /// A reply was not well-formed XML.
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The candidate configuration stayed locked by someone else.
    #[error("Timed out after {}s waiting for the configuration lock", .0.as_secs())]
    LockTimeout(Duration),

    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// An attribute failed validation.
    #[error("Invalid attribute '{attribute}': {message}")]
    Validation {
        /// Attribute name
        attribute: String,
        /// Error message
        message: String,
    },

    /// The object to create is already configured.
    #[error("{resource} {id} already exists")]
    AlreadyExists {
        /// Resource type name
        resource: String,
        /// Object identity
        id: String,
    },

    /// The object is not in the configuration after the commit.
    #[error("{resource} {id} does not exists after commit => check your config")]
    NotFoundAfterCommit {
        /// Resource type name
        resource: String,
        /// Object identity
        id: String,
    },

    /// Import found nothing under the given id.
    #[error("don't find {resource} with id '{id}' (id must be {format})")]
    ImportNotFound {
        /// Resource type name
        resource: String,
        /// Requested id
        id: String,
        /// Expected id format
        format: String,
    },

    /// An object required by the resource is missing.
    #[error("{0}")]
    NotFound(String),

    /// An identity attribute changed; the object must be destroyed and created.
    #[error("{resource}: changing '{attribute}' requires replacement")]
    RequiresReplace {
        /// Resource type name
        resource: String,
        /// Changed attribute
        attribute: String,
    },

    /// Resource type not registered.
    #[error("Resource type '{0}' not found")]
    UnknownResource(String),

    /// Data source type not registered.
    #[error("Data source type '{0}' not found")]
    UnknownDataSource(String),

    /// State could not be upgraded to the current schema.
    #[error("Cannot upgrade state of {resource} from version {version}: {message}")]
    StateUpgrade {
        /// Resource type name
        resource: String,
        /// Stored schema version
        version: u64,
        /// Error message
        message: String,
    },

    // ========================================================================
    // I/O and Parsing Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// YAML error.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// TOML error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Generic error with source.
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
        /// Source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Creates a new validation error.
    pub fn validation(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// Creates a new invalid configuration error.
    pub fn invalid_config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Creates a new already-exists error.
    pub fn already_exists(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Creates a new not-found-after-commit error.
    pub fn not_found_after_commit(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFoundAfterCommit {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Returns true if the error came from the transport or the device
    /// refusing the session, as opposed to a rejected RPC.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Connection(_) | Error::Protocol(_) | Error::Xml(_))
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Rpc(_) | Error::AlreadyExists { .. } | Error::NotFoundAfterCommit { .. } => 2,
            Error::Connection(_) | Error::Protocol(_) | Error::LockTimeout(_) => 3,
            Error::Validation { .. } | Error::RequiresReplace { .. } => 4,
            Error::Config(_) | Error::InvalidConfig { .. } | Error::NotConfigured(_) => 5,
            _ => 1,
        }
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Adds context with a closure that is only evaluated on error.
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Other {
            message: message.into(),
            source: Some(Box::new(e)),
        })
    }

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| {
            let message = f().into();
            Error::Other {
                message: format!("{}: {}", message, e),
                source: Some(Box::new(e)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_messages() {
        assert_eq!(
            Error::already_exists("vlan", "v10").to_string(),
            "vlan v10 already exists"
        );
        assert_eq!(
            Error::not_found_after_commit("vlan", "v10").to_string(),
            "vlan v10 does not exists after commit => check your config"
        );
        let err = Error::ImportNotFound {
            resource: "static route".to_string(),
            id: "x".to_string(),
            format: "<destination>_-_<routing_instance>".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "don't find static route with id 'x' (id must be <destination>_-_<routing_instance>)"
        );
    }

    #[test]
    fn test_lock_timeout_message() {
        let err = Error::LockTimeout(Duration::from_secs(30));
        assert_eq!(
            err.to_string(),
            "Timed out after 30s waiting for the configuration lock"
        );
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_with_context_keeps_source_message() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        let err = result.with_context(|| "read set file").unwrap_err();
        assert_eq!(err.to_string(), "read set file: no such file");
    }
}
