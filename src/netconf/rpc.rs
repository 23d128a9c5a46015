//! RPC bodies sent inside `<rpc>` envelopes.
//!
//! Each function returns the operation element only; [`super::NetconfSession`]
//! adds the envelope and message-id.

/// NETCONF base namespace (RFC 6241)
pub const NETCONF_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// Capabilities advertised in the client hello
const CLIENT_CAPABILITIES: &[&str] = &[
    "urn:ietf:params:netconf:base:1.0",
    "urn:ietf:params:netconf:capability:candidate:1.0",
    "urn:ietf:params:netconf:capability:confirmed-commit:1.0",
    "urn:ietf:params:netconf:capability:validate:1.0",
    "http://xml.juniper.net/netconf/junos/1.0",
];

/// Escape text for use inside an XML element
pub fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Client hello message
pub fn client_hello() -> String {
    let capabilities: String = CLIENT_CAPABILITIES
        .iter()
        .map(|c| format!("    <capability>{}</capability>\n", c))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<hello xmlns=\"{}\">\n  <capabilities>\n{}  </capabilities>\n</hello>",
        NETCONF_NS, capabilities
    )
}

/// Wrap an operation in an `<rpc>` envelope
pub fn envelope(message_id: u32, operation: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rpc xmlns=\"{}\" message-id=\"{}\">\n{}\n</rpc>",
        NETCONF_NS, message_id, operation
    )
}

/// Lock the candidate datastore
pub fn lock_candidate() -> String {
    "<lock><target><candidate/></target></lock>".to_string()
}

/// Unlock the candidate datastore
pub fn unlock_candidate() -> String {
    "<unlock><target><candidate/></target></unlock>".to_string()
}

/// Drop uncommitted candidate changes
pub fn discard_changes() -> String {
    "<discard-changes/>".to_string()
}

/// End the NETCONF session
pub fn close_session() -> String {
    "<close-session/>".to_string()
}

/// Load `set`/`delete` lines into the candidate
pub fn load_set(lines: &[String]) -> String {
    format!(
        "<load-configuration action=\"set\" format=\"text\"><configuration-set>{}</configuration-set></load-configuration>",
        escape_xml(&lines.join("\n"))
    )
}

/// Commit the candidate, optionally with a log message
pub fn commit(log: Option<&str>) -> String {
    match log {
        Some(log) => format!(
            "<commit-configuration><log>{}</log></commit-configuration>",
            escape_xml(log)
        ),
        None => "<commit-configuration/>".to_string(),
    }
}

/// Commit with automatic rollback after `minutes` unless confirmed
pub fn commit_confirmed(minutes: u32, log: Option<&str>) -> String {
    let log = log
        .map(|l| format!("<log>{}</log>", escape_xml(l)))
        .unwrap_or_default();
    format!(
        "<commit-configuration><confirmed/><confirm-timeout>{}</confirm-timeout>{}</commit-configuration>",
        minutes, log
    )
}

/// `commit check`, which also confirms a pending confirmed commit
pub fn commit_check() -> String {
    "<commit-configuration><check/></commit-configuration>".to_string()
}

/// Run an operational or `show configuration` command with text output
pub fn command(cmd: &str) -> String {
    format!("<command format=\"text\">{}</command>", escape_xml(cmd))
}

/// Host, model, version and serial number
pub fn get_system_information() -> String {
    "<get-system-information/>".to_string()
}

/// Terse interface listing (`show interfaces terse`)
pub fn get_interface_information_terse() -> String {
    "<get-interface-information><terse/></get-interface-information>".to_string()
}

/// Route listing, optionally limited to one table
pub fn get_route_information(table: Option<&str>) -> String {
    match table {
        Some(table) => format!(
            "<get-route-information><table>{}</table></get-route-information>",
            escape_xml(table)
        ),
        None => "<get-route-information/>".to_string(),
    }
}
