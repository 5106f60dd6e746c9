//! Scenario tables: an ordered list of records, each applied to a document
//! by the same generic [`apply`] step.

use provgraph_model::{
    Attribute, AttrValue, Element, ElementKind, Namespace, ProvDocument, QualifiedName, Relation,
    RelationKind,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::clock::{Clock, TimeSpec, Timeline};
use crate::error::ScenarioError;
use crate::schema::{
    AttributeSchema, CITATION_KEY, DESCRIPTION_KEY, LANGUAGE_KEY, LICENSE_KEY, MBOX_KEY,
    PERSON_NAME_KEY, TITLE_KEY, UPDATED_KEY,
};

/// A person or organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Party {
    pub id: QualifiedName,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mbox: Option<String>,
}

/// A service (agent) or data source (entity) described with Dublin Core terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Described {
    pub id: QualifiedName,
    pub title: String,
    pub description: String,
    pub language: String,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<TimeSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Artifact {
    pub id: QualifiedName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    pub id: QualifiedName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<TimeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended: Option<TimeSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Link {
    pub subject: QualifiedName,
    pub object: QualifiedName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "record")]
pub enum ScenarioRecord {
    #[serde(rename = "person")]
    Person(Party),
    #[serde(rename = "organization")]
    Organization(Party),
    #[serde(rename = "service")]
    Service(Described),
    #[serde(rename = "source")]
    Source(Described),
    #[serde(rename = "entity")]
    Entity(Artifact),
    #[serde(rename = "activity")]
    Activity(Step),
    #[serde(rename = "wasGeneratedBy")]
    WasGeneratedBy(Link),
    #[serde(rename = "used")]
    Used(Link),
    #[serde(rename = "actedOnBehalfOf")]
    ActedOnBehalfOf(Link),
    #[serde(rename = "wasAttributedTo")]
    WasAttributedTo(Link),
    #[serde(rename = "wasDerivedFrom")]
    WasDerivedFrom(Link),
}

impl ScenarioRecord {
    /// Relation kind and endpoints, for edge records.
    pub fn link(&self) -> Option<(RelationKind, &Link)> {
        match self {
            Self::WasGeneratedBy(l) => Some((RelationKind::WasGeneratedBy, l)),
            Self::Used(l) => Some((RelationKind::Used, l)),
            Self::ActedOnBehalfOf(l) => Some((RelationKind::ActedOnBehalfOf, l)),
            Self::WasAttributedTo(l) => Some((RelationKind::WasAttributedTo, l)),
            Self::WasDerivedFrom(l) => Some((RelationKind::WasDerivedFrom, l)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub namespaces: Vec<Namespace>,
    pub records: Vec<ScenarioRecord>,
}

const ANNOTATION_LOOKUP: &str = include_str!("../scenarios/annotation_lookup.json");

impl Scenario {
    /// The built-in ADAMA annotation-lookup scenario.
    pub fn annotation_lookup() -> Result<Self, ScenarioError> {
        Self::from_json(ANNOTATION_LOOKUP)
    }

    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Apply every record, in order, to a fresh document.
    pub fn build(&self, schema: AttributeSchema, clock: &dyn Clock) -> Result<ProvDocument, ScenarioError> {
        let mut doc = ProvDocument::new();
        for ns in &self.namespaces {
            doc.add_namespace(ns.clone())?;
        }
        let mut timeline = Timeline::new(clock);
        for record in &self.records {
            apply(record, &mut doc, schema, &mut timeline)?;
        }
        tracing::debug!(
            scenario = %self.name,
            %schema,
            elements = doc.element_count(),
            relations = doc.relation_count(),
            "built scenario"
        );
        Ok(doc)
    }
}

fn key(name: &str) -> Result<QualifiedName, ScenarioError> {
    Ok(QualifiedName::parse(name)?)
}

fn party_attributes(
    party: &Party,
    prov_type: &str,
    name_key: &str,
    schema: AttributeSchema,
) -> Result<Vec<Attribute>, ScenarioError> {
    let mut attrs = vec![
        Attribute::new(key("prov:type")?, QualifiedName::prov(prov_type)),
        Attribute::new(key(name_key)?, party.name.as_str()),
    ];
    if let Some(mbox) = &party.mbox {
        attrs.push(Attribute::new(key(MBOX_KEY)?, schema.mbox_value(mbox)));
    }
    Ok(attrs)
}

fn described_attributes(
    d: &Described,
    schema: AttributeSchema,
    timeline: &mut Timeline<'_>,
) -> Result<Vec<Attribute>, ScenarioError> {
    let mut attrs = vec![
        Attribute::new(key(TITLE_KEY)?, d.title.as_str()),
        Attribute::new(key(DESCRIPTION_KEY)?, d.description.as_str()),
        Attribute::new(key(LANGUAGE_KEY)?, d.language.as_str()),
        Attribute::new(key(schema.source_key())?, d.uri.as_str()),
    ];
    if let Some(license) = &d.license {
        attrs.push(Attribute::new(key(LICENSE_KEY)?, license.as_str()));
    }
    if let Some(citation) = &d.citation {
        attrs.push(Attribute::new(key(CITATION_KEY)?, citation.as_str()));
    }
    if let Some(updated) = d.updated {
        attrs.push(Attribute::new(key(UPDATED_KEY)?, AttrValue::DateTime(timeline.resolve(updated))));
    }
    Ok(attrs)
}

/// Add one scenario record to `doc`.
///
/// Node records become elements; edge records become relations and require
/// both endpoints to have been applied earlier.
pub fn apply(
    record: &ScenarioRecord,
    doc: &mut ProvDocument,
    schema: AttributeSchema,
    timeline: &mut Timeline<'_>,
) -> Result<(), ScenarioError> {
    let element = match record {
        ScenarioRecord::Person(p) => {
            let mut e = Element::new(ElementKind::Agent, p.id.clone());
            e.attributes = party_attributes(p, "Person", PERSON_NAME_KEY, schema)?;
            Some(e)
        }
        ScenarioRecord::Organization(p) => {
            let mut e = Element::new(ElementKind::Agent, p.id.clone());
            e.attributes = party_attributes(p, "Organization", schema.organization_name_key(), schema)?;
            Some(e)
        }
        ScenarioRecord::Service(d) => {
            let mut e = Element::new(ElementKind::Agent, d.id.clone());
            e.attributes = described_attributes(d, schema, timeline)?;
            Some(e)
        }
        ScenarioRecord::Source(d) => {
            let mut e = Element::new(ElementKind::Entity, d.id.clone());
            e.attributes = described_attributes(d, schema, timeline)?;
            Some(e)
        }
        ScenarioRecord::Entity(a) => Some(Element::new(ElementKind::Entity, a.id.clone())),
        ScenarioRecord::Activity(s) => {
            let mut e = Element::new(ElementKind::Activity, s.id.clone());
            e.start_time = s.started.map(|t| timeline.resolve(t));
            e.end_time = s.ended.map(|t| timeline.resolve(t));
            Some(e)
        }
        _ => None,
    };

    if let Some(element) = element {
        tracing::debug!(id = %element.id, kind = %element.kind, "apply element");
        doc.add_element(element)?;
        return Ok(());
    }

    // Node records returned above.
    let Some((kind, link)) = record.link() else {
        return Ok(());
    };
    let time = link.time.map(|t| timeline.resolve(t));
    tracing::debug!(%kind, subject = %link.subject, object = %link.object, "apply relation");
    doc.add_relation(Relation::new(kind, link.subject.clone(), link.object.clone()).at(time))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{TimeZone, Utc};

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2016, 5, 1, 12, 0, 0).unwrap())
    }

    const SMALL: &str = r#"{
        "name": "small",
        "namespaces": [
            { "prefix": "ex", "uri": "http://example.org/" },
            { "prefix": "aip", "uri": "https://araport.org/provenance/" },
            { "prefix": "dcterms", "uri": "http://purl.org/dc/terms/" },
            { "prefix": "foaf", "uri": "http://xmlns.com/foaf/0.1/" }
        ],
        "records": [
            { "record": "organization", "id": "ex:lab", "name": "The Lab" },
            { "record": "source", "id": "ex:db", "title": "DB", "description": "d", "language": "en",
              "uri": "http://example.org/db", "license": "CC-BY-4.0", "citation": "Lab (2016)",
              "updated": "2015-12-31T00:00:00Z" },
            { "record": "wasAttributedTo", "subject": "ex:db", "object": "ex:lab" }
        ]
    }"#;

    #[test]
    fn records_parse_by_tag() {
        let scenario = Scenario::from_json(SMALL).unwrap();
        assert_eq!(scenario.records.len(), 3);
        assert!(matches!(scenario.records[0], ScenarioRecord::Organization(_)));
        let (kind, link) = scenario.records[2].link().unwrap();
        assert_eq!(kind, RelationKind::WasAttributedTo);
        assert_eq!(link.subject.to_string(), "ex:db");
        assert!(scenario.records[1].link().is_none());
    }

    #[test]
    fn optional_source_facts_use_dublin_core_keys() {
        let doc = Scenario::from_json(SMALL)
            .unwrap()
            .build(AttributeSchema::V2, &clock())
            .unwrap();
        let db = doc.get_str("ex:db").unwrap();
        assert_eq!(db.attribute(LICENSE_KEY).and_then(AttrValue::as_str), Some("CC-BY-4.0"));
        assert_eq!(db.attribute(CITATION_KEY).and_then(AttrValue::as_str), Some("Lab (2016)"));
        assert_eq!(
            db.attribute(UPDATED_KEY).and_then(AttrValue::as_datetime),
            Some(&Utc.with_ymd_and_hms(2015, 12, 31, 0, 0, 0).unwrap())
        );
        assert!(db.attribute("dcterms:identifier").is_some());
        let lab = doc.get_str("ex:lab").unwrap();
        assert_eq!(lab.attribute("foaf:name").and_then(AttrValue::as_str), Some("The Lab"));
    }

    #[test]
    fn edges_before_their_nodes_are_rejected() {
        let text = r#"{
            "name": "broken",
            "namespaces": [{ "prefix": "ex", "uri": "http://example.org/" }],
            "records": [
                { "record": "entity", "id": "ex:a" },
                { "record": "wasDerivedFrom", "subject": "ex:a", "object": "ex:b" },
                { "record": "entity", "id": "ex:b" }
            ]
        }"#;
        let err = Scenario::from_json(text)
            .unwrap()
            .build(AttributeSchema::V1, &clock())
            .unwrap_err();
        assert!(matches!(err, ScenarioError::Model(_)));
    }

    #[test]
    fn unknown_fields_and_tags_are_rejected() {
        let unknown_tag = r#"{"name": "x", "namespaces": [], "records": [{ "record": "wasInformedBy", "subject": "a:b", "object": "a:c" }]}"#;
        assert!(matches!(Scenario::from_json(unknown_tag), Err(ScenarioError::Parse(_))));
        let bad_id = r#"{"name": "x", "namespaces": [], "records": [{ "record": "entity", "id": "no-prefix" }]}"#;
        assert!(matches!(Scenario::from_json(bad_id), Err(ScenarioError::Parse(_))));
    }

    #[test]
    fn scenario_files_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.json");
        std::fs::write(&path, SMALL).unwrap();
        assert_eq!(Scenario::from_path(&path).unwrap().name, "small");
        assert!(matches!(
            Scenario::from_path(&dir.path().join("missing.json")),
            Err(ScenarioError::Read { .. })
        ));
    }
}
