//! Helpers for Junos `set` statements.
//!
//! Resources describe their configuration as full `set`/`delete` lines and
//! read it back from `show configuration <path> | display set relative`,
//! whose lines are relative to `<path>`.

/// Separator between the parts of a multi-part resource id
pub const ID_SEPARATOR: &str = "_-_";

/// Join id parts with [`ID_SEPARATOR`]
pub fn join_id(parts: &[&str]) -> String {
    parts.join(ID_SEPARATOR)
}

/// Split an id into exactly `count` parts
pub fn split_id(id: &str, count: usize) -> Option<Vec<String>> {
    let parts: Vec<String> = id.split(ID_SEPARATOR).map(str::to_string).collect();
    (parts.len() == count).then_some(parts)
}

/// Wrap a value in double quotes
pub fn quote(value: &str) -> String {
    format!("\"{}\"", value)
}

/// Strip one pair of surrounding double quotes, if present
pub fn trim_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Whether a `display set relative` output shows a configured stanza
pub fn stanza_exists(output: &str) -> bool {
    output.lines().map(str::trim).any(is_statement)
}

fn is_statement(line: &str) -> bool {
    !line.is_empty() && !line.starts_with('#')
}

/// Parse `display set relative` output into statements without the
/// leading `set `. A bare `set` (the stanza itself) yields nothing.
pub fn parse_relative(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| is_statement(line))
        .filter_map(|line| line.strip_prefix("set "))
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Remainder of `line` after the keyword sequence `prefix`.
///
/// `cut_prefix("vlan-id 10", "vlan-id")` gives `Some("10")`; an exact match
/// gives `Some("")`. Word boundaries are respected, so `"vlan-id-list 10"`
/// does not match `"vlan-id"`.
pub fn cut_prefix<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(prefix)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix(' ')
    }
}

/// Builds `set` or `delete` lines under one configuration path
#[derive(Debug, Clone)]
pub struct SetLines {
    prefix: String,
    lines: Vec<String>,
}

impl SetLines {
    /// `set <path> ...` lines
    pub fn set(path: impl AsRef<str>) -> Self {
        Self {
            prefix: format!("set {}", path.as_ref()),
            lines: Vec::new(),
        }
    }

    /// `delete <path> ...` lines
    pub fn delete(path: impl AsRef<str>) -> Self {
        Self {
            prefix: format!("delete {}", path.as_ref()),
            lines: Vec::new(),
        }
    }

    /// The statement for the path itself
    pub fn base(&mut self) -> &mut Self {
        self.lines.push(self.prefix.clone());
        self
    }

    /// One statement below the path
    pub fn push(&mut self, statement: impl AsRef<str>) -> &mut Self {
        self.lines
            .push(format!("{} {}", self.prefix, statement.as_ref()));
        self
    }

    /// Statement emitted only when `condition` holds
    pub fn push_if(&mut self, condition: bool, statement: impl AsRef<str>) -> &mut Self {
        if condition {
            self.push(statement);
        }
        self
    }

    /// Finished lines
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
