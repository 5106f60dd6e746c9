//! PROV-N writer.
//!
//! Layout:
//!
//! ```text
//! document
//!   prefix aip <https://araport.org/provenance/>
//!
//!   agent(aip:eva_huala, [prov:type='prov:Person', foaf:givenName="Eva Huala"])
//!   wasGeneratedBy(aip:datasource2, aip:eva_huala, -)
//! endDocument
//! ```
//!
//! Every record occupies exactly one line; string values escape newlines.

use provgraph_model::{
    format_instant, AttrValue, Attribute, Element, ElementKind, ProvDocument, Record, Relation,
    RelationKind,
};

const INDENT: &str = "  ";

pub fn to_provn(doc: &ProvDocument) -> String {
    let mut out = String::new();
    out.push_str("document\n");
    for ns in doc.namespaces() {
        out.push_str(&format!("{INDENT}prefix {} <{}>\n", ns.prefix, ns.uri));
    }
    if !doc.namespaces().is_empty() && !doc.is_empty() {
        out.push('\n');
    }
    for record in doc.records() {
        out.push_str(INDENT);
        match record {
            Record::Element(e) => out.push_str(&element_line(e)),
            Record::Relation(r) => out.push_str(&relation_line(r)),
        }
        out.push('\n');
    }
    out.push_str("endDocument");
    out
}

fn element_line(e: &Element) -> String {
    let mut args = vec![e.id.to_string()];
    if e.kind == ElementKind::Activity {
        args.push(optional_time(e.start_time.as_ref()));
        args.push(optional_time(e.end_time.as_ref()));
    }
    if !e.attributes.is_empty() {
        args.push(attribute_list(&e.attributes));
    }
    format!("{}({})", e.kind.prov_name(), args.join(", "))
}

fn relation_line(r: &Relation) -> String {
    let mut args = vec![r.subject.to_string(), r.object.to_string()];
    match r.kind {
        RelationKind::WasGeneratedBy | RelationKind::Used => {
            args.push(optional_time(r.time.as_ref()));
        }
        // actedOnBehalfOf(delegate, responsible, activity)
        RelationKind::ActedOnBehalfOf => args.push("-".to_string()),
        RelationKind::WasAttributedTo | RelationKind::WasDerivedFrom => {}
    }
    format!("{}({})", r.kind.prov_name(), args.join(", "))
}

fn optional_time(t: Option<&chrono::DateTime<chrono::Utc>>) -> String {
    t.map(format_instant).unwrap_or_else(|| "-".to_string())
}

fn attribute_list(attrs: &[Attribute]) -> String {
    let items: Vec<String> = attrs
        .iter()
        .map(|a| format!("{}={}", a.key, literal(&a.value)))
        .collect();
    format!("[{}]", items.join(", "))
}

fn literal(value: &AttrValue) -> String {
    match value {
        AttrValue::String(s) => format!("\"{}\"", escape(s)),
        AttrValue::QualifiedName(q) => format!("'{q}'"),
        AttrValue::DateTime(t) => format!("\"{}\" %% xsd:dateTime", format_instant(t)),
    }
}

pub(crate) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}
