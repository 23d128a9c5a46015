//! Parsing of `<rpc-reply>` messages.
//!
//! Errors come in two shapes on Junos: standard `<rpc-error>` elements and
//! the Junos-specific `xnm:error` / `xnm:warning` elements found inside
//! `<commit-results>` and `<load-configuration-results>`.

use roxmltree::{Document, Node};
use serde::Serialize;
use std::fmt;

use crate::error::{Error, Result};

/// Junos XNM namespace for `xnm:error` / `xnm:warning`
const XNM_NS: &str = "http://xml.juniper.net/xnm/1.1/xnm";

/// Severity of an error element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// The operation failed
    Error,
    /// The operation succeeded with a remark
    Warning,
}

/// One error or warning reported by the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcError {
    /// Error severity
    pub severity: ErrorSeverity,
    /// Error type (protocol, application, ...)
    pub error_type: Option<String>,
    /// Error tag (e.g. `lock-denied`, `operation-failed`)
    pub tag: Option<String>,
    /// Human readable message
    pub message: String,
    /// Configuration path the error refers to
    pub path: Option<String>,
    /// Offending element or statement
    pub bad_element: Option<String>,
}

impl RpcError {
    fn from_rpc_error(node: Node<'_, '_>) -> Self {
        let severity = match child_text(node, "error-severity").as_deref() {
            Some("warning") => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        };
        let bad_element = node
            .children()
            .find(|n| n.has_tag_name("error-info"))
            .and_then(|info| child_text(info, "bad-element"));
        RpcError {
            severity,
            error_type: child_text(node, "error-type"),
            tag: child_text(node, "error-tag"),
            message: child_text(node, "error-message").unwrap_or_default(),
            path: child_text(node, "error-path"),
            bad_element,
        }
    }

    fn from_xnm(node: Node<'_, '_>, severity: ErrorSeverity) -> Self {
        RpcError {
            severity,
            error_type: None,
            tag: None,
            message: child_text(node, "message").unwrap_or_default(),
            path: child_text(node, "edit-path"),
            bad_element: child_text(node, "statement"),
        }
    }

    /// Whether this entry fails the operation
    pub fn is_error(&self) -> bool {
        self.severity == ErrorSeverity::Error
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.tag.as_deref().unwrap_or("unknown error"))?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(ref path) = self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(ref bad) = self.bad_element {
            write!(f, " (statement: {})", bad)?;
        }
        Ok(())
    }
}

/// A list of device errors rendered one per line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RpcErrors(pub Vec<RpcError>);

impl RpcErrors {
    /// Whether any entry carries the given tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.0.iter().any(|e| e.tag.as_deref() == Some(tag))
    }

    /// Whether any message contains the given text
    pub fn message_contains(&self, needle: &str) -> bool {
        self.0.iter().any(|e| e.message.contains(needle))
    }
}

impl fmt::Display for RpcErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", rendered.join("\n"))
    }
}

/// Parsed `<rpc-reply>`
#[derive(Debug, Clone)]
pub struct RpcReply {
    raw: String,
    message_id: Option<String>,
    errors: Vec<RpcError>,
}

impl RpcReply {
    /// Parse a reply message
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let (message_id, errors) = {
            let doc = Document::parse(raw.trim())?;
            let root = doc.root_element();
            if !root.has_tag_name("rpc-reply") {
                return Err(Error::Protocol(format!(
                    "expected <rpc-reply>, got <{}>",
                    root.tag_name().name()
                )));
            }
            let message_id = root.attribute("message-id").map(str::to_string);

            let mut errors = Vec::new();
            for node in root.descendants().filter(Node::is_element) {
                let tag = node.tag_name();
                if tag.name() == "rpc-error" {
                    errors.push(RpcError::from_rpc_error(node));
                } else if tag.namespace() == Some(XNM_NS) {
                    match tag.name() {
                        "error" => errors.push(RpcError::from_xnm(node, ErrorSeverity::Error)),
                        "warning" => {
                            errors.push(RpcError::from_xnm(node, ErrorSeverity::Warning))
                        }
                        _ => {}
                    }
                }
            }
            (message_id, errors)
        };

        Ok(Self {
            raw,
            message_id,
            errors,
        })
    }

    /// Raw XML text of the reply
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// `message-id` attribute echoed by the device
    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    /// Every error and warning in document order
    pub fn errors(&self) -> &[RpcError] {
        &self.errors
    }

    /// Whether the reply holds at least one error-severity entry
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(RpcError::is_error)
    }

    /// Warning-severity entries
    pub fn warnings(&self) -> Vec<RpcError> {
        self.errors.iter().filter(|e| !e.is_error()).cloned().collect()
    }

    /// Fail with the error-severity entries, if any
    pub fn check(self) -> Result<Self> {
        if self.has_errors() {
            let errors = self.errors.iter().filter(|e| e.is_error()).cloned().collect();
            return Err(Error::Rpc(RpcErrors(errors)));
        }
        Ok(self)
    }

    /// Parse the reply for data extraction
    pub fn document(&self) -> Result<Document<'_>> {
        Ok(Document::parse(self.raw.trim())?)
    }

    /// Text of the first element with the given local name, untrimmed
    pub fn text_of(&self, name: &str) -> Result<Option<String>> {
        let doc = self.document()?;
        let text = doc
            .descendants()
            .find(|n| n.has_tag_name(name))
            .map(|n| n.text().unwrap_or_default().to_string());
        Ok(text)
    }
}

/// Trimmed text of the first child element with the given local name
pub fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.children()
        .find(|n| n.has_tag_name(name))
        .map(|n| n.text().unwrap_or_default().trim().to_string())
}

/// Whether the node has a child element with the given local name
pub fn has_child(node: Node<'_, '_>, name: &str) -> bool {
    node.children().any(|n| n.has_tag_name(name))
}

/// Child elements with the given local name
pub fn children_named<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |n| n.has_tag_name(name))
}
