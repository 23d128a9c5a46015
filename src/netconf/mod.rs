//! NETCONF protocol session.
//!
//! A [`NetconfSession`] sits on top of a [`Transport`]: it performs the hello
//! exchange, numbers every `<rpc>` and parses replies. It knows nothing about
//! locking or commits; that lives in [`crate::junos`].

pub mod reply;
pub mod rpc;

use roxmltree::Document;
use tracing::{debug, trace};

use crate::connection::Transport;
use crate::error::{Error, Result};

pub use reply::{ErrorSeverity, RpcError, RpcErrors, RpcReply};

/// Capabilities and session id announced by the device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerHello {
    /// Advertised capability URIs
    pub capabilities: Vec<String>,
    /// Session id assigned by the device
    pub session_id: Option<String>,
}

impl ServerHello {
    /// Parse a `<hello>` message
    pub fn parse(message: &str) -> Result<Self> {
        let doc = Document::parse(message.trim())?;
        let root = doc.root_element();
        if !root.has_tag_name("hello") {
            return Err(Error::Protocol(format!(
                "expected <hello> from device, got <{}>",
                root.tag_name().name()
            )));
        }

        let capabilities = root
            .descendants()
            .filter(|n| n.has_tag_name("capability"))
            .filter_map(|n| n.text())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        let session_id = reply::child_text(root, "session-id");

        Ok(Self {
            capabilities,
            session_id,
        })
    }
}

/// One NETCONF session over an open transport
pub struct NetconfSession {
    transport: Box<dyn Transport>,
    hello: ServerHello,
    next_message_id: u32,
}

impl std::fmt::Debug for NetconfSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetconfSession")
            .field("device", &self.transport.identifier())
            .field("session_id", &self.hello.session_id)
            .field("next_message_id", &self.next_message_id)
            .finish()
    }
}

impl NetconfSession {
    /// Exchange hellos over a freshly connected transport
    pub async fn open(mut transport: Box<dyn Transport>) -> Result<Self> {
        let message = transport.receive().await?;
        trace!(device = %transport.identifier(), message = %message, "<< hello");
        let hello = ServerHello::parse(&message)?;

        if !hello
            .capabilities
            .iter()
            .any(|c| c.starts_with("urn:ietf:params:netconf:base:1.0"))
        {
            return Err(Error::Protocol(
                "device does not support NETCONF base:1.0".to_string(),
            ));
        }

        let client_hello = rpc::client_hello();
        trace!(device = %transport.identifier(), message = %client_hello, ">> hello");
        transport.send(&client_hello).await?;

        debug!(
            device = %transport.identifier(),
            session_id = hello.session_id.as_deref().unwrap_or("-"),
            capabilities = hello.capabilities.len(),
            "NETCONF session established"
        );

        Ok(Self {
            transport,
            hello,
            next_message_id: 1,
        })
    }

    /// Device identifier for logging
    pub fn device(&self) -> &str {
        self.transport.identifier()
    }

    /// Session id assigned by the device
    pub fn session_id(&self) -> Option<&str> {
        self.hello.session_id.as_deref()
    }

    /// Whether the device advertised a capability starting with `prefix`
    pub fn supports(&self, prefix: &str) -> bool {
        self.hello.capabilities.iter().any(|c| c.starts_with(prefix))
    }

    /// Send one RPC and wait for its reply.
    ///
    /// The reply is returned even when it holds `<rpc-error>` elements; call
    /// [`RpcReply::check`] to turn those into an error.
    pub async fn rpc(&mut self, body: &str) -> Result<RpcReply> {
        let message_id = self.next_message_id;
        self.next_message_id = self.next_message_id.wrapping_add(1);

        let request = rpc::envelope(message_id, body);
        trace!(device = %self.device(), message_id, message = %request, ">> rpc");
        self.transport.send(&request).await?;

        let message = self.transport.receive().await?;
        trace!(device = %self.device(), message_id, message = %message, "<< rpc-reply");
        let reply = RpcReply::parse(message)?;

        if let Some(echoed) = reply.message_id() {
            if echoed != message_id.to_string() {
                return Err(Error::Protocol(format!(
                    "reply message-id {} does not match request {}",
                    echoed, message_id
                )));
            }
        }
        Ok(reply)
    }

    /// Send `<close-session/>` and close the transport.
    ///
    /// The transport is closed even when the device rejects the close.
    pub async fn close(mut self) -> Result<()> {
        let result = self
            .rpc(&rpc::close_session())
            .await
            .and_then(RpcReply::check)
            .map(|_| ());
        self.transport.close().await?;
        debug!(device = %self.device(), "NETCONF session closed");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{ConnectionError, ConnectionResult};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    const HELLO: &str = r#"<!-- No zombies were killed during the creation of this user interface -->
<!-- user netconf, class super-user -->
<hello xmlns="urn:ietf:params:xml:ns:netconf:base:1.0">
  <capabilities>
    <capability>urn:ietf:params:netconf:base:1.0</capability>
    <capability>urn:ietf:params:netconf:capability:candidate:1.0</capability>
    <capability>http://xml.juniper.net/netconf/junos/1.0</capability>
  </capabilities>
  <session-id>27700</session-id>
</hello>"#;

    /// Replays canned replies and records what was sent
    struct ScriptedTransport {
        replies: VecDeque<String>,
        sent: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        fn identifier(&self) -> &str {
            "test@device:830"
        }

        async fn send(&mut self, message: &str) -> ConnectionResult<()> {
            self.sent.lock().unwrap().push(message.to_string());
            Ok(())
        }

        async fn receive(&mut self) -> ConnectionResult<String> {
            self.replies
                .pop_front()
                .ok_or(ConnectionError::ConnectionClosed)
        }

        async fn close(&mut self) -> ConnectionResult<()> {
            Ok(())
        }
    }

    fn scripted(replies: &[&str]) -> (Box<dyn Transport>, Arc<Mutex<Vec<String>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let transport = ScriptedTransport {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            sent: Arc::clone(&sent),
        };
        (Box::new(transport), sent)
    }

    #[test]
    fn test_parse_junos_hello() {
        let hello = ServerHello::parse(HELLO).unwrap();
        assert_eq!(hello.session_id.as_deref(), Some("27700"));
        assert_eq!(hello.capabilities.len(), 3);
    }

    #[tokio::test]
    async fn test_open_sends_client_hello() {
        let (transport, sent) = scripted(&[HELLO]);
        let session = NetconfSession::open(transport).await.unwrap();
        assert_eq!(session.session_id(), Some("27700"));
        assert!(session.supports("http://xml.juniper.net/netconf/junos"));

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("<hello"));
    }

    #[tokio::test]
    async fn test_rpc_numbers_messages() {
        let (transport, sent) = scripted(&[
            HELLO,
            r#"<rpc-reply message-id="1"><ok/></rpc-reply>"#,
            r#"<rpc-reply message-id="2"><ok/></rpc-reply>"#,
        ]);
        let mut session = NetconfSession::open(transport).await.unwrap();
        session.rpc(&rpc::lock_candidate()).await.unwrap();
        session.rpc(&rpc::unlock_candidate()).await.unwrap();

        let sent = sent.lock().unwrap();
        assert!(sent[1].contains("message-id=\"1\""));
        assert!(sent[2].contains("message-id=\"2\""));
    }

    #[tokio::test]
    async fn test_rpc_detects_message_id_mismatch() {
        let (transport, _) = scripted(&[HELLO, r#"<rpc-reply message-id="9"><ok/></rpc-reply>"#]);
        let mut session = NetconfSession::open(transport).await.unwrap();
        let err = session.rpc(&rpc::lock_candidate()).await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[tokio::test]
    async fn test_rejects_device_without_base_capability() {
        let (transport, _) = scripted(&[
            r#"<hello><capabilities><capability>urn:ietf:params:netconf:base:1.1</capability></capabilities></hello>"#,
        ]);
        let err = NetconfSession::open(transport).await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[tokio::test]
    async fn test_closed_transport_is_connection_error() {
        let (transport, _) = scripted(&[HELLO]);
        let mut session = NetconfSession::open(transport).await.unwrap();
        let err = session.rpc(&rpc::lock_candidate()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Connection(ConnectionError::ConnectionClosed)
        ));
    }
}
