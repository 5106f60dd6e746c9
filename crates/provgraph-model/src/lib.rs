//! Provenance graph model (PROV subset)
//!
//! This crate defines the small slice of the W3C PROV data model that the
//! provenance records in this workspace need:
//!
//! - namespaces and qualified names (`aip:datasource1`)
//! - three element kinds: agents, entities, activities
//! - five relation kinds: generation, usage, delegation, attribution, derivation
//! - typed attribute values (strings, qualified names, instants)
//!
//! A [`ProvDocument`] is append-only. Every mutation goes through a checked
//! method, so a document always satisfies its invariants:
//! identifiers are unique, prefixes are declared, and relation endpoints
//! exist with the right kind before the relation is added.
//!
//! Serializers live in `provgraph-export`; this crate has no I/O.

pub mod document;
pub mod error;
pub mod namespace;
pub mod value;

pub use document::{Element, ElementKind, ProvDocument, Record, Relation, RelationKind};
pub use error::ProvError;
pub use namespace::{Namespace, QualifiedName, PROV_NAMESPACE, XSD_NAMESPACE};
pub use value::{format_instant, parse_instant, AttrValue, Attribute};
