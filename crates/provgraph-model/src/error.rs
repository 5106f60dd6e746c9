use thiserror::Error;

use crate::document::{ElementKind, RelationKind};
use crate::namespace::QualifiedName;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvError {
    #[error("invalid qualified name `{0}` (expected `prefix:local`)")]
    InvalidQualifiedName(String),

    #[error("namespace prefix `{prefix}` is not declared (used by `{name}`)")]
    UnknownNamespace { prefix: String, name: String },

    #[error("namespace prefix `{prefix}` is already bound to <{uri}>")]
    NamespaceConflict { prefix: String, uri: String },

    #[error("identifier `{0}` is already used by another element")]
    DuplicateIdentifier(QualifiedName),

    #[error("{0} does not carry a time")]
    UnsupportedTime(RelationKind),

    #[error("{relation} references `{id}`, which is not an element of the document")]
    UnknownNode {
        relation: RelationKind,
        id: QualifiedName,
    },

    #[error("{relation} {role} must be one of {expected:?}, but `{id}` is {found}")]
    KindMismatch {
        relation: RelationKind,
        role: &'static str,
        id: QualifiedName,
        expected: &'static [ElementKind],
        found: ElementKind,
    },
}
