//! The append-only provenance document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::ProvError;
use crate::namespace::{Namespace, QualifiedName, PROV_NAMESPACE, XSD_NAMESPACE};
use crate::value::{AttrValue, Attribute};

// ============================================================================
// Element and relation kinds
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Entity,
    Activity,
    Agent,
}

impl ElementKind {
    pub const ALL: [ElementKind; 3] = [Self::Entity, Self::Activity, Self::Agent];

    /// PROV-N keyword and PROV-JSON section name.
    pub fn prov_name(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Activity => "activity",
            Self::Agent => "agent",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prov_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelationKind {
    #[serde(rename = "wasGeneratedBy")]
    WasGeneratedBy,
    #[serde(rename = "used")]
    Used,
    #[serde(rename = "actedOnBehalfOf")]
    ActedOnBehalfOf,
    #[serde(rename = "wasAttributedTo")]
    WasAttributedTo,
    #[serde(rename = "wasDerivedFrom")]
    WasDerivedFrom,
}

const ENTITY_OR_AGENT: &[ElementKind] = &[ElementKind::Entity, ElementKind::Agent];
const AGENT_OR_ACTIVITY: &[ElementKind] = &[ElementKind::Agent, ElementKind::Activity];
const ACTIVITY_OR_AGENT: &[ElementKind] = &[ElementKind::Activity, ElementKind::Agent];
const ONLY_AGENT: &[ElementKind] = &[ElementKind::Agent];
const ONLY_ENTITY: &[ElementKind] = &[ElementKind::Entity];

impl RelationKind {
    pub const ALL: [RelationKind; 5] = [
        Self::WasGeneratedBy,
        Self::Used,
        Self::ActedOnBehalfOf,
        Self::WasAttributedTo,
        Self::WasDerivedFrom,
    ];

    pub fn prov_name(self) -> &'static str {
        match self {
            Self::WasGeneratedBy => "wasGeneratedBy",
            Self::Used => "used",
            Self::ActedOnBehalfOf => "actedOnBehalfOf",
            Self::WasAttributedTo => "wasAttributedTo",
            Self::WasDerivedFrom => "wasDerivedFrom",
        }
    }

    pub fn from_prov_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.prov_name() == name)
    }

    /// Element kinds accepted as the subject (first argument).
    ///
    /// Generation and usage also accept agents: software services are modelled
    /// as agents, and they both produce and consume other records.
    pub fn subject_kinds(self) -> &'static [ElementKind] {
        match self {
            Self::WasGeneratedBy => ENTITY_OR_AGENT,
            Self::Used => ACTIVITY_OR_AGENT,
            Self::ActedOnBehalfOf => ONLY_AGENT,
            Self::WasAttributedTo | Self::WasDerivedFrom => ONLY_ENTITY,
        }
    }

    /// Element kinds accepted as the object (second argument).
    pub fn object_kinds(self) -> &'static [ElementKind] {
        match self {
            Self::WasGeneratedBy => AGENT_OR_ACTIVITY,
            Self::Used => ENTITY_OR_AGENT,
            Self::ActedOnBehalfOf | Self::WasAttributedTo => ONLY_AGENT,
            Self::WasDerivedFrom => ONLY_ENTITY,
        }
    }

    /// PROV-JSON property names for (subject, object).
    pub fn roles(self) -> (&'static str, &'static str) {
        match self {
            Self::WasGeneratedBy => ("prov:entity", "prov:activity"),
            Self::Used => ("prov:activity", "prov:entity"),
            Self::ActedOnBehalfOf => ("prov:delegate", "prov:responsible"),
            Self::WasAttributedTo => ("prov:entity", "prov:agent"),
            Self::WasDerivedFrom => ("prov:generatedEntity", "prov:usedEntity"),
        }
    }

    pub fn supports_time(self) -> bool {
        matches!(self, Self::WasGeneratedBy | Self::Used)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prov_name())
    }
}

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: QualifiedName,
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Activities only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Activities only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl Element {
    pub fn new(kind: ElementKind, id: QualifiedName) -> Self {
        Self {
            id,
            kind,
            attributes: Vec::new(),
            start_time: None,
            end_time: None,
        }
    }

    pub fn with_attribute(mut self, key: QualifiedName, value: impl Into<AttrValue>) -> Self {
        self.attributes.push(Attribute::new(key, value));
        self
    }

    /// First value for `key` (compared in `prefix:local` form).
    pub fn attribute(&self, key: &str) -> Option<&AttrValue> {
        self.attributes
            .iter()
            .find(|a| a.key.to_string() == key)
            .map(|a| &a.value)
    }

    /// Best human label: `dcterms:title`, then `foaf:givenName`/`foaf:name`, then the local name.
    pub fn display_name(&self) -> String {
        ["dcterms:title", "foaf:givenName", "foaf:name"]
            .iter()
            .find_map(|k| self.attribute(k).and_then(AttrValue::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| self.id.local().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub kind: RelationKind,
    pub subject: QualifiedName,
    pub object: QualifiedName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
}

impl Relation {
    pub fn new(kind: RelationKind, subject: QualifiedName, object: QualifiedName) -> Self {
        Self {
            kind,
            subject,
            object,
            time: None,
        }
    }

    pub fn at(mut self, time: Option<DateTime<Utc>>) -> Self {
        self.time = time;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum Record {
    Element(Element),
    Relation(Relation),
}

// ============================================================================
// Document
// ============================================================================

/// An append-only provenance graph.
///
/// Records keep their insertion order (elements and relations interleaved),
/// which is the order serializers emit them in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvDocument {
    namespaces: Vec<Namespace>,
    records: Vec<Record>,
    element_index: HashMap<QualifiedName, usize>,
}

impl ProvDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a namespace. Re-declaring the same binding is a no-op.
    pub fn add_namespace(&mut self, ns: Namespace) -> Result<(), ProvError> {
        if let Some(uri) = self.resolve_prefix(&ns.prefix) {
            if uri == ns.uri {
                return Ok(());
            }
            return Err(ProvError::NamespaceConflict {
                prefix: ns.prefix,
                uri: uri.to_string(),
            });
        }
        if QualifiedName::new(&ns.prefix, "x").is_err() {
            return Err(ProvError::InvalidQualifiedName(format!("{}:", ns.prefix)));
        }
        self.namespaces.push(ns);
        Ok(())
    }

    /// User-declared namespaces, in declaration order (`prov`/`xsd` are implicit).
    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    pub fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        if prefix == PROV_NAMESPACE.0 {
            return Some(PROV_NAMESPACE.1);
        }
        if prefix == XSD_NAMESPACE.0 {
            return Some(XSD_NAMESPACE.1);
        }
        self.namespaces
            .iter()
            .find(|ns| ns.prefix == prefix)
            .map(|ns| ns.uri.as_str())
    }

    fn check_declared(&self, name: &QualifiedName) -> Result<(), ProvError> {
        if self.resolve_prefix(name.prefix()).is_none() {
            return Err(ProvError::UnknownNamespace {
                prefix: name.prefix().to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    pub fn add_element(&mut self, element: Element) -> Result<(), ProvError> {
        self.check_declared(&element.id)?;
        for attr in &element.attributes {
            self.check_declared(&attr.key)?;
            if let AttrValue::QualifiedName(q) = &attr.value {
                self.check_declared(q)?;
            }
        }
        if self.element_index.contains_key(&element.id) {
            return Err(ProvError::DuplicateIdentifier(element.id));
        }
        self.element_index.insert(element.id.clone(), self.records.len());
        self.records.push(Record::Element(element));
        Ok(())
    }

    pub fn agent(&mut self, id: QualifiedName, attributes: Vec<Attribute>) -> Result<(), ProvError> {
        let mut element = Element::new(ElementKind::Agent, id);
        element.attributes = attributes;
        self.add_element(element)
    }

    pub fn entity(&mut self, id: QualifiedName, attributes: Vec<Attribute>) -> Result<(), ProvError> {
        let mut element = Element::new(ElementKind::Entity, id);
        element.attributes = attributes;
        self.add_element(element)
    }

    pub fn activity(
        &mut self,
        id: QualifiedName,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
        attributes: Vec<Attribute>,
    ) -> Result<(), ProvError> {
        let mut element = Element::new(ElementKind::Activity, id);
        element.attributes = attributes;
        element.start_time = start_time;
        element.end_time = end_time;
        self.add_element(element)
    }

    fn check_endpoint(
        &self,
        relation: RelationKind,
        role: &'static str,
        id: &QualifiedName,
        expected: &'static [ElementKind],
    ) -> Result<(), ProvError> {
        let Some(found) = self.get(id).map(|e| e.kind) else {
            return Err(ProvError::UnknownNode {
                relation,
                id: id.clone(),
            });
        };
        if !expected.contains(&found) {
            return Err(ProvError::KindMismatch {
                relation,
                role,
                id: id.clone(),
                expected,
                found,
            });
        }
        Ok(())
    }

    /// Append a relation. Both endpoints must already be elements of the
    /// document, with kinds allowed by [`RelationKind::subject_kinds`] and
    /// [`RelationKind::object_kinds`].
    pub fn add_relation(&mut self, relation: Relation) -> Result<(), ProvError> {
        let kind = relation.kind;
        self.check_endpoint(kind, "subject", &relation.subject, kind.subject_kinds())?;
        self.check_endpoint(kind, "object", &relation.object, kind.object_kinds())?;
        if relation.time.is_some() && !kind.supports_time() {
            return Err(ProvError::UnsupportedTime(kind));
        }
        self.records.push(Record::Relation(relation));
        Ok(())
    }

    pub fn was_generated_by(
        &mut self,
        generated: &QualifiedName,
        generator: &QualifiedName,
        time: Option<DateTime<Utc>>,
    ) -> Result<(), ProvError> {
        self.add_relation(
            Relation::new(RelationKind::WasGeneratedBy, generated.clone(), generator.clone()).at(time),
        )
    }

    pub fn used(
        &mut self,
        user: &QualifiedName,
        used: &QualifiedName,
        time: Option<DateTime<Utc>>,
    ) -> Result<(), ProvError> {
        self.add_relation(Relation::new(RelationKind::Used, user.clone(), used.clone()).at(time))
    }

    pub fn acted_on_behalf_of(
        &mut self,
        delegate: &QualifiedName,
        responsible: &QualifiedName,
    ) -> Result<(), ProvError> {
        self.add_relation(Relation::new(
            RelationKind::ActedOnBehalfOf,
            delegate.clone(),
            responsible.clone(),
        ))
    }

    pub fn was_attributed_to(&mut self, entity: &QualifiedName, agent: &QualifiedName) -> Result<(), ProvError> {
        self.add_relation(Relation::new(
            RelationKind::WasAttributedTo,
            entity.clone(),
            agent.clone(),
        ))
    }

    pub fn was_derived_from(
        &mut self,
        generated: &QualifiedName,
        used: &QualifiedName,
    ) -> Result<(), ProvError> {
        self.add_relation(Relation::new(
            RelationKind::WasDerivedFrom,
            generated.clone(),
            used.clone(),
        ))
    }

    // ------------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------------

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: &QualifiedName) -> Option<&Element> {
        match self.records.get(*self.element_index.get(id)?)? {
            Record::Element(e) => Some(e),
            Record::Relation(_) => None,
        }
    }

    /// Lookup by `prefix:local` string.
    pub fn get_str(&self, id: &str) -> Option<&Element> {
        let id = QualifiedName::parse(id).ok()?;
        self.get(&id)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.records.iter().filter_map(|r| match r {
            Record::Element(e) => Some(e),
            Record::Relation(_) => None,
        })
    }

    pub fn elements_of(&self, kind: ElementKind) -> impl Iterator<Item = &Element> + '_ {
        self.elements().filter(move |e| e.kind == kind)
    }

    pub fn relations(&self) -> impl Iterator<Item = &Relation> + '_ {
        self.records.iter().filter_map(|r| match r {
            Record::Relation(rel) => Some(rel),
            Record::Element(_) => None,
        })
    }

    pub fn element_count(&self) -> usize {
        self.element_index.len()
    }

    pub fn relation_count(&self) -> usize {
        self.records.len() - self.element_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Relations of `kind` whose object is `id`.
    pub fn incoming<'a>(
        &'a self,
        id: &'a QualifiedName,
        kind: RelationKind,
    ) -> impl Iterator<Item = &'a Relation> + 'a {
        self.relations()
            .filter(move |r| r.kind == kind && &r.object == id)
    }

    /// Relations of `kind` whose subject is `id`.
    pub fn outgoing<'a>(
        &'a self,
        id: &'a QualifiedName,
        kind: RelationKind,
    ) -> impl Iterator<Item = &'a Relation> + 'a {
        self.relations()
            .filter(move |r| r.kind == kind && &r.subject == id)
    }

    pub fn has_relation(&self, kind: RelationKind, subject: &str, object: &str) -> bool {
        self.relations().any(|r| {
            r.kind == kind && r.subject.to_string() == subject && r.object.to_string() == object
        })
    }

    /// Re-check every invariant by replaying the records, in order, into an
    /// empty document with the same namespaces.
    pub fn validate(&self) -> Result<(), ProvError> {
        let mut replay = ProvDocument::new();
        for ns in &self.namespaces {
            replay.add_namespace(ns.clone())?;
        }
        for record in &self.records {
            match record {
                Record::Element(e) => replay.add_element(e.clone())?,
                Record::Relation(r) => replay.add_relation(r.clone())?,
            }
        }
        Ok(())
    }
}
