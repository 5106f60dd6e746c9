//! Attribute values attached to elements.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::namespace::QualifiedName;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttrValue {
    String(String),
    /// A PROV term or other namespaced constant, e.g. `prov:Person`.
    QualifiedName(QualifiedName),
    DateTime(DateTime<Utc>),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::DateTime(t) => Some(t),
            _ => None,
        }
    }

    /// Lexical form without quoting (used for labels and tooltips).
    pub fn lexical(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::QualifiedName(q) => q.to_string(),
            Self::DateTime(t) => format_instant(t),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<QualifiedName> for AttrValue {
    fn from(value: QualifiedName) -> Self {
        Self::QualifiedName(value)
    }
}

impl From<DateTime<Utc>> for AttrValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Attribute {
    pub key: QualifiedName,
    pub value: AttrValue,
}

impl Attribute {
    pub fn new(key: QualifiedName, value: impl Into<AttrValue>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

/// `xsd:dateTime` lexical form used by every serializer (RFC 3339, UTC, `Z` suffix).
pub fn format_instant(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s.trim()).map(|t| t.with_timezone(&Utc))
}
