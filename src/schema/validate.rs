//! Attribute validators.
//!
//! Each validator takes the attribute name first so failures can name it.

use regex::Regex;
use std::net::IpAddr;

use crate::error::{Error, Result};

/// Allowed characters of an object name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameFormat {
    /// Letters, digits, `-` and `_`
    Default,
    /// [`NameFormat::Default`] plus `.`, `/` and `:`
    Address,
}

impl NameFormat {
    fn allows(self, c: char) -> bool {
        match self {
            NameFormat::Default => c.is_ascii_alphanumeric() || c == '-' || c == '_',
            NameFormat::Address => {
                c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':')
            }
        }
    }

    fn describe(self) -> &'static str {
        match self {
            NameFormat::Default => "letters, numbers, dashes and underscores",
            NameFormat::Address => {
                "letters, numbers, dashes, underscores, dots, slashes and colons"
            }
        }
    }
}

/// Validate an object name of `1..=max_len` characters
pub fn name(attribute: &str, value: &str, max_len: usize, format: NameFormat) -> Result<()> {
    length(attribute, value, 1, max_len)?;
    if let Some(bad) = value.chars().find(|c| !format.allows(*c)) {
        return Err(Error::validation(
            attribute,
            format!(
                "character '{}' not allowed in '{}' (must be {})",
                bad,
                value,
                format.describe()
            ),
        ));
    }
    Ok(())
}

/// Validate a string length in characters
pub fn length(attribute: &str, value: &str, min: usize, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(Error::validation(
            attribute,
            format!("length must be between {} and {}, got {}", min, max, len),
        ));
    }
    Ok(())
}

/// Validate an integer range (inclusive)
pub fn int_range(attribute: &str, value: i64, min: i64, max: i64) -> Result<()> {
    if value < min || value > max {
        return Err(Error::validation(
            attribute,
            format!("must be between {} and {}, got {}", min, max, value),
        ));
    }
    Ok(())
}

/// Parse `address/prefix`
pub fn parse_cidr(value: &str) -> Option<(IpAddr, u8)> {
    let (addr, prefix) = value.split_once('/')?;
    let addr: IpAddr = addr.parse().ok()?;
    let prefix: u8 = prefix.parse().ok()?;
    let max = if addr.is_ipv4() { 32 } else { 128 };
    (prefix <= max).then_some((addr, prefix))
}

fn host_bits_clear(addr: IpAddr, prefix: u8) -> bool {
    match addr {
        IpAddr::V4(v4) => {
            let bits = u32::from(v4);
            let mask = if prefix == 0 { 0 } else { u32::MAX << (32 - prefix) };
            bits & !mask == 0
        }
        IpAddr::V6(v6) => {
            let bits = u128::from(v6);
            let mask = if prefix == 0 { 0 } else { u128::MAX << (128 - prefix) };
            bits & !mask == 0
        }
    }
}

/// Validate an `address/prefix` value
pub fn cidr(attribute: &str, value: &str) -> Result<()> {
    parse_cidr(value).map(|_| ()).ok_or_else(|| {
        Error::validation(attribute, format!("'{}' is not a valid CIDR", value))
    })
}

/// Validate a network prefix (host bits zero)
pub fn cidr_network(attribute: &str, value: &str) -> Result<()> {
    match parse_cidr(value) {
        Some((addr, prefix)) if host_bits_clear(addr, prefix) => Ok(()),
        Some(_) => Err(Error::validation(
            attribute,
            format!("'{}' is not a network address (host bits set)", value),
        )),
        None => Err(Error::validation(
            attribute,
            format!("'{}' is not a valid CIDR network", value),
        )),
    }
}

/// Validate an IP address
pub fn ip_address(attribute: &str, value: &str) -> Result<()> {
    value.parse::<IpAddr>().map(|_| ()).map_err(|_| {
        Error::validation(attribute, format!("'{}' is not a valid IP address", value))
    })
}

/// Reject double quotes, which would break set lines
pub fn no_double_quotes(attribute: &str, value: &str) -> Result<()> {
    if value.contains('"') {
        return Err(Error::validation(
            attribute,
            format!("double quote not allowed in '{}'", value),
        ));
    }
    Ok(())
}

/// Reject whitespace
pub fn no_whitespace(attribute: &str, value: &str) -> Result<()> {
    if value.chars().any(char::is_whitespace) {
        return Err(Error::validation(
            attribute,
            format!("whitespace not allowed in '{}'", value),
        ));
    }
    Ok(())
}

/// Accept only one of the listed values
pub fn one_of(attribute: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if !allowed.contains(&value) {
        return Err(Error::validation(
            attribute,
            format!("'{}' must be one of: {}", value, allowed.join(", ")),
        ));
    }
    Ok(())
}

/// Reject two attributes set together
pub fn conflicts_with(attribute: &str, is_set: bool, other: &str, other_set: bool) -> Result<()> {
    if is_set && other_set {
        return Err(Error::validation(
            attribute,
            format!("conflicts with '{}'", other),
        ));
    }
    Ok(())
}

/// Require exactly one of several attributes
pub fn exactly_one_of(attributes: &[(&str, bool)]) -> Result<()> {
    let set = attributes.iter().filter(|(_, is_set)| *is_set).count();
    if set != 1 {
        let names: Vec<&str> = attributes.iter().map(|(name, _)| *name).collect();
        return Err(Error::validation(
            names.join("|"),
            format!("exactly one of {} must be set", names.join(", ")),
        ));
    }
    Ok(())
}

/// Match a regular expression; `expected` describes the format
pub fn matches(attribute: &str, value: &str, re: &Regex, expected: &str) -> Result<()> {
    if !re.is_match(value) {
        return Err(Error::validation(
            attribute,
            format!("'{}' must be {}", value, expected),
        ));
    }
    Ok(())
}

/// Reject duplicate entries in a list
pub fn unique(attribute: &str, values: &[String]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for value in values {
        if !seen.insert(value.as_str()) {
            return Err(Error::validation(
                attribute,
                format!("duplicate entry '{}'", value),
            ));
        }
    }
    Ok(())
}
