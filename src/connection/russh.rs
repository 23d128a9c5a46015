//! Russh connection module
//!
//! Opens an SSH connection to a Junos device with russh and starts the
//! `netconf` subsystem on a session channel. The resulting
//! [`NetconfChannel`] implements [`Transport`] with end-of-message framing.

use async_trait::async_trait;
use bytes::BytesMut;
use russh::client::{Handle, Handler, Msg};
use russh::keys::key::PublicKey;
use russh::keys::{decode_secret_key, load_secret_key};
use russh::{Channel, ChannelMsg};
use russh_keys::agent::client::AgentClient;
use std::borrow::Cow;
use std::sync::Arc;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace, warn};

use super::config::{expand_path, SshOptions};
use super::framing::EomCodec;
use super::{ConnectionError, ConnectionResult, Connector, RusshError, Transport};

/// NETCONF SSH subsystem name
const NETCONF_SUBSYSTEM: &str = "netconf";

/// Map configured cipher names onto russh algorithm names
fn cipher_name(name: &str) -> Option<russh::cipher::Name> {
    match name {
        "chacha20-poly1305@openssh.com" => Some(russh::cipher::CHACHA20_POLY1305),
        "aes256-gcm@openssh.com" => Some(russh::cipher::AES_256_GCM),
        "aes128-ctr" => Some(russh::cipher::AES_128_CTR),
        "aes192-ctr" => Some(russh::cipher::AES_192_CTR),
        "aes256-ctr" => Some(russh::cipher::AES_256_CTR),
        _ => None,
    }
}

/// SSH client handler; Junos devices are reached by address so the host
/// key is accepted and its fingerprint logged.
struct ClientHandler {
    host: String,
}

#[async_trait]
impl Handler for ClientHandler {
    type Error = RusshError;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        debug!(
            host = %self.host,
            fingerprint = %server_public_key.fingerprint(),
            "Accepting device host key"
        );
        Ok(true)
    }
}

/// Connector that opens NETCONF-over-SSH transports
#[derive(Debug, Clone)]
pub struct SshConnector {
    options: SshOptions,
}

impl SshConnector {
    /// Create a connector for one device
    pub fn new(options: SshOptions) -> Self {
        Self { options }
    }

    /// The options this connector was built with
    pub fn options(&self) -> &SshOptions {
        &self.options
    }

    async fn do_connect(&self) -> ConnectionResult<Handle<ClientHandler>> {
        let options = &self.options;
        let ciphers: Vec<russh::cipher::Name> =
            options.ciphers.iter().filter_map(|c| cipher_name(c)).collect();
        if ciphers.is_empty() {
            return Err(ConnectionError::InvalidConfig(
                "no usable ssh cipher configured".to_string(),
            ));
        }

        let config = russh::client::Config {
            preferred: russh::Preferred {
                cipher: Cow::Owned(ciphers),
                ..Default::default()
            },
            ..Default::default()
        };
        let config = Arc::new(config);

        let addr = format!("{}:{}", options.host, options.port);
        let connect = tokio::net::TcpStream::connect(&addr);
        let socket = match options.timeout {
            Some(timeout) => tokio::time::timeout(timeout, connect)
                .await
                .map_err(|_| ConnectionError::Timeout(timeout.as_secs()))?,
            None => connect.await,
        }
        .map_err(|e| {
            ConnectionError::ConnectionFailed(format!("Failed to connect to {}: {}", addr, e))
        })?;

        socket.set_nodelay(true).map_err(|e| {
            ConnectionError::ConnectionFailed(format!("Failed to set TCP_NODELAY: {}", e))
        })?;

        let handler = ClientHandler {
            host: options.host.clone(),
        };
        let handshake = russh::client::connect_stream(config, socket, handler);
        let mut session = match options.timeout {
            Some(timeout) => tokio::time::timeout(timeout, handshake)
                .await
                .map_err(|_| ConnectionError::Timeout(timeout.as_secs()))?,
            None => handshake.await,
        }
        .map_err(|e| ConnectionError::ConnectionFailed(format!("SSH handshake failed: {}", e)))?;

        self.authenticate(&mut session).await?;
        Ok(session)
    }

    /// Try every configured authentication method in order
    async fn authenticate(&self, session: &mut Handle<ClientHandler>) -> ConnectionResult<()> {
        let user = self.options.username.as_str();
        let auth = &self.options.auth;
        let passphrase = auth.key_passphrase.as_deref();

        if let Some(pem) = &auth.key_pem {
            let key_pair = decode_secret_key(pem, passphrase).map_err(|e| {
                ConnectionError::AuthenticationFailed(format!("Failed to decode PEM key: {}", e))
            })?;
            if session
                .authenticate_publickey(user, Arc::new(key_pair))
                .await?
            {
                debug!("Authenticated using PEM key");
                return Ok(());
            }
            trace!("PEM key rejected");
        }

        if let Some(key_file) = &auth.key_file {
            let key_path = expand_path(key_file);
            let key_pair = load_secret_key(&key_path, passphrase).map_err(|e| {
                ConnectionError::AuthenticationFailed(format!(
                    "Failed to load key {}: {}",
                    key_path.display(),
                    e
                ))
            })?;
            if session
                .authenticate_publickey(user, Arc::new(key_pair))
                .await?
            {
                debug!(key = %key_path.display(), "Authenticated using key");
                return Ok(());
            }
            trace!(key = %key_path.display(), "Key file rejected");
        }

        if let Some(password) = &auth.password {
            if session.authenticate_password(user, password).await? {
                debug!("Authenticated using password");
                return Ok(());
            }
            trace!("Password rejected");
        }

        if auth.use_agent && std::env::var_os("SSH_AUTH_SOCK").is_some() {
            match Self::try_agent_auth(session, user).await {
                Ok(()) => {
                    debug!("Authenticated using SSH agent");
                    return Ok(());
                }
                Err(e) => trace!(error = %e, "SSH agent authentication failed"),
            }
        }

        Err(ConnectionError::AuthenticationFailed(format!(
            "All authentication methods failed for user '{}'",
            user
        )))
    }

    /// Try each identity held by the ssh-agent
    async fn try_agent_auth(
        session: &mut Handle<ClientHandler>,
        user: &str,
    ) -> ConnectionResult<()> {
        let mut agent = AgentClient::connect_env().await.map_err(|e| {
            ConnectionError::AuthenticationFailed(format!("Failed to connect to SSH agent: {}", e))
        })?;

        let identities = agent.request_identities().await.map_err(|e| {
            ConnectionError::AuthenticationFailed(format!("Failed to get agent identities: {}", e))
        })?;

        for identity in identities {
            let (returned_agent, result) = session
                .authenticate_future(user, identity.clone(), agent)
                .await;
            agent = returned_agent;

            match result {
                Ok(true) => return Ok(()),
                Ok(false) => trace!("Identity rejected, trying next"),
                Err(e) => trace!(error = %e, "Agent authentication attempt failed"),
            }
        }

        Err(ConnectionError::AuthenticationFailed(
            "All SSH agent identities rejected".to_string(),
        ))
    }
}

#[async_trait]
impl Connector for SshConnector {
    async fn connect(&self) -> ConnectionResult<Box<dyn Transport>> {
        let identifier = self.options.identifier();
        debug!(device = %identifier, "Connecting via SSH (russh)");

        let handle = self.do_connect().await?;

        let channel = handle.channel_open_session().await.map_err(|e| {
            ConnectionError::SubsystemFailed(format!("Failed to open channel: {}", e))
        })?;
        channel
            .request_subsystem(true, NETCONF_SUBSYSTEM)
            .await
            .map_err(|e| {
                ConnectionError::SubsystemFailed(format!(
                    "Failed to request '{}' subsystem: {}",
                    NETCONF_SUBSYSTEM, e
                ))
            })?;

        debug!(device = %identifier, "NETCONF subsystem started");
        Ok(Box::new(NetconfChannel {
            identifier,
            handle: Some(handle),
            channel,
            codec: EomCodec::new(),
            buffer: BytesMut::with_capacity(16 * 1024),
        }))
    }
}

/// SSH channel running the `netconf` subsystem
pub struct NetconfChannel {
    identifier: String,
    handle: Option<Handle<ClientHandler>>,
    channel: Channel<Msg>,
    codec: EomCodec,
    buffer: BytesMut,
}

#[async_trait]
impl Transport for NetconfChannel {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    async fn send(&mut self, message: &str) -> ConnectionResult<()> {
        if self.handle.is_none() {
            return Err(ConnectionError::ConnectionClosed);
        }
        let mut out = BytesMut::new();
        self.codec.encode(message, &mut out)?;
        self.channel
            .data(&out[..])
            .await
            .map_err(|e| ConnectionError::SshError(format!("Failed to write to channel: {}", e)))
    }

    async fn receive(&mut self) -> ConnectionResult<String> {
        loop {
            if let Some(frame) = self.codec.decode(&mut self.buffer)? {
                return Ok(frame);
            }
            match self.channel.wait().await {
                Some(ChannelMsg::Data { ref data }) => {
                    self.buffer.extend_from_slice(data);
                }
                Some(ChannelMsg::ExtendedData { ref data, ext }) => {
                    trace!(ext = %ext, data = %String::from_utf8_lossy(data), "Channel stderr");
                }
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                    return Err(ConnectionError::ConnectionClosed);
                }
                Some(_) => {}
            }
        }
    }

    async fn close(&mut self) -> ConnectionResult<()> {
        let _ = self.channel.eof().await;
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle
                .disconnect(
                    russh::Disconnect::ByApplication,
                    "Connection closed by client",
                    "en",
                )
                .await
            {
                warn!(device = %self.identifier, error = %e, "SSH disconnect failed");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::SUPPORTED_CIPHERS;

    #[test]
    fn test_every_supported_cipher_maps() {
        for name in SUPPORTED_CIPHERS {
            assert!(cipher_name(name).is_some(), "{} has no russh mapping", name);
        }
        assert!(cipher_name("aes128-cbc").is_none());
    }
}
