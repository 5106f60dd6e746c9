//! Namespaces and qualified names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProvError;

/// Prefix/URI pair for the PROV vocabulary; always declared.
pub const PROV_NAMESPACE: (&str, &str) = ("prov", "http://www.w3.org/ns/prov#");
/// Prefix/URI pair for XML Schema datatypes; always declared.
pub const XSD_NAMESPACE: (&str, &str) = ("xsd", "http://www.w3.org/2001/XMLSchema#");

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace {
    pub prefix: String,
    pub uri: String,
}

impl Namespace {
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }

    /// Build a qualified name in this namespace.
    pub fn qname(&self, local: &str) -> Result<QualifiedName, ProvError> {
        QualifiedName::new(&self.prefix, local)
    }
}

/// A `prefix:local` identifier.
///
/// The prefix must be resolvable through the document's namespace table;
/// the name itself does not carry the URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QualifiedName {
    prefix: String,
    local: String,
}

impl QualifiedName {
    pub fn new(prefix: &str, local: &str) -> Result<Self, ProvError> {
        if !is_valid_prefix(prefix) || !is_valid_local(local) {
            return Err(ProvError::InvalidQualifiedName(format!("{prefix}:{local}")));
        }
        Ok(Self {
            prefix: prefix.to_string(),
            local: local.to_string(),
        })
    }

    pub fn parse(s: &str) -> Result<Self, ProvError> {
        let Some((prefix, local)) = s.trim().split_once(':') else {
            return Err(ProvError::InvalidQualifiedName(s.to_string()));
        };
        Self::new(prefix, local)
    }

    /// `prov:<local>`, for the PROV vocabulary terms used as attribute keys and values.
    pub fn prov(local: &str) -> Self {
        Self {
            prefix: PROV_NAMESPACE.0.to_string(),
            local: local.to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn local(&self) -> &str {
        &self.local
    }
}

fn is_valid_prefix(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn is_valid_local(local: &str) -> bool {
    !local.is_empty()
        && !local
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | ',' | '[' | ']' | '=' | '"' | '\''))
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.prefix, self.local)
    }
}

impl FromStr for QualifiedName {
    type Err = ProvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for QualifiedName {
    type Error = ProvError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<QualifiedName> for String {
    fn from(value: QualifiedName) -> Self {
        value.to_string()
    }
}
