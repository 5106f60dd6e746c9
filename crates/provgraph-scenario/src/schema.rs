//! Versioned attribute schema.
//!
//! A scenario table describes *what* is known about each party and source
//! (name, mailbox, title, URI, ...). The schema decides *how* those facts are
//! spelled as PROV attributes. Both versions share the Dublin Core and FOAF
//! vocabulary; they differ in a handful of keys and value formats:
//!
//! | fact              | v1                     | v2                   |
//! |-------------------|------------------------|----------------------|
//! | source URI        | `aip:uri`              | `dcterms:identifier` |
//! | person mailbox    | `"<mailto:addr>"`      | `"mailto:addr"`      |
//! | organization name | `foaf:givenName`       | `foaf:name`          |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScenarioError;

pub const TITLE_KEY: &str = "dcterms:title";
pub const DESCRIPTION_KEY: &str = "dcterms:description";
pub const LANGUAGE_KEY: &str = "dcterms:language";
pub const LICENSE_KEY: &str = "dcterms:license";
pub const CITATION_KEY: &str = "dcterms:bibliographicCitation";
pub const UPDATED_KEY: &str = "dcterms:modified";
pub const PERSON_NAME_KEY: &str = "foaf:givenName";
pub const MBOX_KEY: &str = "foaf:mbox";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeSchema {
    #[default]
    V1,
    V2,
}

impl AttributeSchema {
    pub fn parse(s: &str) -> Result<Self, ScenarioError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(Self::V1),
            "v2" | "2" => Ok(Self::V2),
            other => Err(ScenarioError::UnknownSchema(other.to_string())),
        }
    }

    pub fn source_key(self) -> &'static str {
        match self {
            Self::V1 => "aip:uri",
            Self::V2 => "dcterms:identifier",
        }
    }

    pub fn organization_name_key(self) -> &'static str {
        match self {
            Self::V1 => PERSON_NAME_KEY,
            Self::V2 => "foaf:name",
        }
    }

    pub fn mbox_value(self, address: &str) -> String {
        let address = address.trim().trim_start_matches("mailto:");
        match self {
            Self::V1 => format!("<mailto:{address}>"),
            Self::V2 => format!("mailto:{address}"),
        }
    }
}

impl FromStr for AttributeSchema {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AttributeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => f.write_str("v1"),
            Self::V2 => f.write_str("v2"),
        }
    }
}
