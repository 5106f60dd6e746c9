//! PROV-JSON writer and reader.
//!
//! Section layout follows the W3C PROV-JSON submission:
//!
//! ```json
//! {
//!   "prefix": { "aip": "https://araport.org/provenance/" },
//!   "agent": { "aip:eva_huala": { "prov:type": { "$": "prov:Person", "type": "prov:QUALIFIED_NAME" } } },
//!   "entity": { ... },
//!   "activity": { "aip:process_query": { "prov:startTime": "2016-01-02T03:04:05Z" } },
//!   "wasGeneratedBy": { "_:id1": { "prov:entity": "...", "prov:activity": "...", "prov:time": "..." } }
//! }
//! ```
//!
//! Relations get blank-node ids `_:id<N>` numbered in record order; the reader
//! replays them in that numeric order after all elements.

use provgraph_model::{
    format_instant, parse_instant, AttrValue, Attribute, Element, ElementKind, Namespace,
    ProvDocument, QualifiedName, Relation, RelationKind,
};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use crate::error::ExportError;

const QUALIFIED_NAME_TYPE: &str = "prov:QUALIFIED_NAME";
const DATETIME_TYPE: &str = "xsd:dateTime";
const STRING_TYPE: &str = "xsd:string";
const START_TIME: &str = "prov:startTime";
const END_TIME: &str = "prov:endTime";
const TIME: &str = "prov:time";

// ============================================================================
// Writer
// ============================================================================

pub fn to_prov_json_value(doc: &ProvDocument) -> Value {
    let mut sections: BTreeMap<&'static str, Map<String, Value>> = BTreeMap::new();

    for element in doc.elements() {
        let mut props = attributes_to_json(&element.attributes);
        if let Some(t) = &element.start_time {
            props.insert(START_TIME.to_string(), Value::String(format_instant(t)));
        }
        if let Some(t) = &element.end_time {
            props.insert(END_TIME.to_string(), Value::String(format_instant(t)));
        }
        sections
            .entry(element.kind.prov_name())
            .or_default()
            .insert(element.id.to_string(), Value::Object(props));
    }

    for (n, relation) in doc.relations().enumerate() {
        let (subject_role, object_role) = relation.kind.roles();
        let mut props = Map::new();
        props.insert(subject_role.to_string(), Value::String(relation.subject.to_string()));
        props.insert(object_role.to_string(), Value::String(relation.object.to_string()));
        if let Some(t) = &relation.time {
            props.insert(TIME.to_string(), Value::String(format_instant(t)));
        }
        sections
            .entry(relation.kind.prov_name())
            .or_default()
            .insert(format!("_:id{}", n + 1), Value::Object(props));
    }

    let mut root = Map::new();
    if !doc.namespaces().is_empty() {
        let prefixes: Map<String, Value> = doc
            .namespaces()
            .iter()
            .map(|ns| (ns.prefix.clone(), Value::String(ns.uri.clone())))
            .collect();
        root.insert("prefix".to_string(), Value::Object(prefixes));
    }
    for (name, section) in sections {
        root.insert(name.to_string(), Value::Object(section));
    }
    Value::Object(root)
}

pub fn to_prov_json(doc: &ProvDocument) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(&to_prov_json_value(doc))?)
}

fn attributes_to_json(attrs: &[Attribute]) -> Map<String, Value> {
    let mut props = Map::new();
    for attr in attrs {
        let value = value_to_json(&attr.value);
        match props.get_mut(&attr.key.to_string()) {
            None => {
                props.insert(attr.key.to_string(), value);
            }
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }
    props
}

fn value_to_json(value: &AttrValue) -> Value {
    match value {
        AttrValue::String(s) => Value::String(s.clone()),
        AttrValue::QualifiedName(q) => json!({ "$": q.to_string(), "type": QUALIFIED_NAME_TYPE }),
        AttrValue::DateTime(t) => json!({ "$": format_instant(t), "type": DATETIME_TYPE }),
    }
}

// ============================================================================
// Reader
// ============================================================================

fn malformed(msg: impl Into<String>) -> ExportError {
    ExportError::Malformed(msg.into())
}

/// Parse a PROV-JSON document produced by [`to_prov_json`] (or any document
/// restricted to the same constructs) back into a checked [`ProvDocument`].
pub fn from_prov_json(text: &str) -> Result<ProvDocument, ExportError> {
    let root: Value = serde_json::from_str(text)?;
    let Value::Object(root) = root else {
        return Err(malformed("top level is not an object"));
    };

    for key in root.keys() {
        let known = key == "prefix"
            || ElementKind::ALL.iter().any(|k| k.prov_name() == key)
            || RelationKind::from_prov_name(key).is_some();
        if !known {
            return Err(malformed(format!("unsupported section `{key}`")));
        }
    }

    let mut doc = ProvDocument::new();

    if let Some(prefixes) = root.get("prefix") {
        for (prefix, uri) in as_object(prefixes, "prefix")? {
            let uri = uri
                .as_str()
                .ok_or_else(|| malformed(format!("prefix `{prefix}` is not a string")))?;
            doc.add_namespace(Namespace::new(prefix.clone(), uri))?;
        }
    }

    for kind in ElementKind::ALL {
        let Some(section) = root.get(kind.prov_name()) else {
            continue;
        };
        for (id, props) in as_object(section, kind.prov_name())? {
            doc.add_element(element_from_json(kind, id, props)?)?;
        }
    }

    let mut relations: Vec<(u64, String, Relation)> = Vec::new();
    for kind in RelationKind::ALL {
        let Some(section) = root.get(kind.prov_name()) else {
            continue;
        };
        for (id, props) in as_object(section, kind.prov_name())? {
            relations.push((blank_id_ordinal(id), id.clone(), relation_from_json(kind, id, props)?));
        }
    }
    relations.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
    for (_, _, relation) in relations {
        doc.add_relation(relation)?;
    }

    Ok(doc)
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, ExportError> {
    value
        .as_object()
        .ok_or_else(|| malformed(format!("`{what}` is not an object")))
}

/// `_:id12` → 12; ids without a numeric suffix sort last.
fn blank_id_ordinal(id: &str) -> u64 {
    id.trim_start_matches("_:")
        .trim_start_matches(|c: char| !c.is_ascii_digit())
        .parse()
        .unwrap_or(u64::MAX)
}

fn element_from_json(kind: ElementKind, id: &str, props: &Value) -> Result<Element, ExportError> {
    let mut element = Element::new(kind, QualifiedName::parse(id)?);
    for (key, value) in as_object(props, id)? {
        if kind == ElementKind::Activity && (key == START_TIME || key == END_TIME) {
            let t = time_from_json(value, key)?;
            if key == START_TIME {
                element.start_time = Some(t);
            } else {
                element.end_time = Some(t);
            }
            continue;
        }
        let key_name = QualifiedName::parse(key)?;
        match value {
            Value::Array(values) => {
                for v in values {
                    element
                        .attributes
                        .push(Attribute::new(key_name.clone(), value_from_json(v, key)?));
                }
            }
            v => element.attributes.push(Attribute::new(key_name, value_from_json(v, key)?)),
        }
    }
    Ok(element)
}

fn relation_from_json(kind: RelationKind, id: &str, props: &Value) -> Result<Relation, ExportError> {
    let props = as_object(props, id)?;
    let (subject_role, object_role) = kind.roles();
    let endpoint = |role: &str| -> Result<QualifiedName, ExportError> {
        let v = props
            .get(role)
            .and_then(Value::as_str)
            .ok_or_else(|| malformed(format!("{kind} `{id}` is missing `{role}`")))?;
        Ok(QualifiedName::parse(v)?)
    };
    let mut relation = Relation::new(kind, endpoint(subject_role)?, endpoint(object_role)?);
    for (key, value) in props {
        if key == subject_role || key == object_role {
            continue;
        }
        if key == TIME {
            relation.time = Some(time_from_json(value, key)?);
            continue;
        }
        return Err(malformed(format!("{kind} `{id}`: unsupported property `{key}`")));
    }
    Ok(relation)
}

fn time_from_json(value: &Value, key: &str) -> Result<chrono::DateTime<chrono::Utc>, ExportError> {
    let s = match value {
        Value::String(s) => s.as_str(),
        Value::Object(obj) => obj
            .get("$")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed(format!("`{key}` has no lexical value")))?,
        _ => return Err(malformed(format!("`{key}` is not a time"))),
    };
    parse_instant(s).map_err(|e| malformed(format!("`{key}`: invalid time `{s}`: {e}")))
}

fn value_from_json(value: &Value, key: &str) -> Result<AttrValue, ExportError> {
    match value {
        Value::String(s) => Ok(AttrValue::String(s.clone())),
        Value::Object(obj) => {
            let lexical = obj
                .get("$")
                .and_then(Value::as_str)
                .ok_or_else(|| malformed(format!("`{key}` has no lexical value")))?;
            match obj.get("type").and_then(Value::as_str) {
                Some(QUALIFIED_NAME_TYPE) => Ok(AttrValue::QualifiedName(QualifiedName::parse(lexical)?)),
                Some(DATETIME_TYPE) => Ok(AttrValue::DateTime(time_from_json(value, key)?)),
                // Language-tagged strings keep only their lexical form.
                None | Some(STRING_TYPE) => Ok(AttrValue::String(lexical.to_string())),
                Some(other) => Err(malformed(format!("`{key}`: unsupported datatype `{other}`"))),
            }
        }
        _ => Err(malformed(format!("`{key}`: unsupported attribute value {value}"))),
    }
}
