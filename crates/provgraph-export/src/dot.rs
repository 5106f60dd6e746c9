//! Graphviz DOT rendering.
//!
//! Styling follows the usual PROV diagram conventions: entities are yellow
//! ellipses, activities blue boxes, agents orange houses; edges are labelled
//! with the relation name and coloured per relation kind.

use provgraph_model::{format_instant, Element, ElementKind, ProvDocument, QualifiedName, RelationKind};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct DotOptions {
    /// Graphviz `rankdir`. PROV diagrams conventionally point upwards (`BT`).
    pub rankdir: String,
    /// Attach a note node listing each element's attributes.
    pub show_attributes: bool,
}

impl Default for DotOptions {
    fn default() -> Self {
        Self {
            rankdir: "BT".to_string(),
            show_attributes: false,
        }
    }
}

fn dot_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\r', "\\r")
        .replace('\n', "\\n")
}

fn node_style(kind: ElementKind) -> &'static [&'static str] {
    match kind {
        ElementKind::Entity => &[
            "shape=ellipse",
            "style=filled",
            "fillcolor=\"#FFFC87\"",
            "color=\"#808080\"",
        ],
        ElementKind::Activity => &[
            "shape=box",
            "style=filled",
            "fillcolor=\"#9FB1FC\"",
            "color=\"#0000FF\"",
        ],
        ElementKind::Agent => &["shape=house", "style=filled", "fillcolor=\"#FED37F\""],
    }
}

fn edge_style(kind: RelationKind) -> &'static [&'static str] {
    match kind {
        RelationKind::WasGeneratedBy => &["color=darkgreen", "fontcolor=darkgreen"],
        RelationKind::Used => &["color=red4", "fontcolor=red"],
        RelationKind::ActedOnBehalfOf | RelationKind::WasAttributedTo => &["color=\"#FED37F\""],
        RelationKind::WasDerivedFrom => &[],
    }
}

fn element_uri(doc: &ProvDocument, id: &QualifiedName) -> Option<String> {
    doc.resolve_prefix(id.prefix())
        .map(|base| format!("{base}{}", id.local()))
}

fn attribute_note(element: &Element) -> String {
    // Left-justified lines (`\l`) read better than centred ones in notes.
    let mut label = String::new();
    for attr in &element.attributes {
        label.push_str(&dot_escape(&format!("{}: {}", attr.key, attr.value.lexical())));
        label.push_str("\\l");
    }
    label
}

pub fn render_dot(doc: &ProvDocument, options: &DotOptions) -> String {
    let mut out = String::new();
    out.push_str("digraph provenance {\n");
    out.push_str(&format!("  rankdir={};\n", options.rankdir));
    out.push_str("  node [fontname=\"Helvetica\"];\n");
    out.push_str("  edge [fontname=\"Helvetica\", fontsize=10];\n\n");

    let mut node_ids: HashMap<&QualifiedName, String> = HashMap::new();
    for (n, element) in doc.elements().enumerate() {
        let node_id = format!("n{}", n + 1);
        let mut attrs: Vec<String> = node_style(element.kind).iter().map(|s| s.to_string()).collect();
        attrs.push(format!("label=\"{}\"", dot_escape(&element.display_name())));
        attrs.push(format!("tooltip=\"{}\"", dot_escape(&element.id.to_string())));
        if let Some(uri) = element_uri(doc, &element.id) {
            attrs.push(format!("URL=\"{}\"", dot_escape(&uri)));
        }
        out.push_str(&format!("  {node_id} [{}];\n", attrs.join(", ")));

        if options.show_attributes && !element.attributes.is_empty() {
            out.push_str(&format!(
                "  {node_id}_attrs [shape=note, fontsize=9, color=gray50, label=\"{}\"];\n",
                attribute_note(element)
            ));
            out.push_str(&format!(
                "  {node_id}_attrs -> {node_id} [style=dashed, color=gray50, arrowhead=none];\n"
            ));
        }
        node_ids.insert(&element.id, node_id);
    }
    out.push('\n');

    for relation in doc.relations() {
        // Endpoints always exist: the document rejects dangling relations.
        let (Some(src), Some(dst)) = (node_ids.get(&relation.subject), node_ids.get(&relation.object)) else {
            continue;
        };
        let mut attrs = vec![format!("label=\"{}\"", relation.kind.prov_name())];
        attrs.extend(edge_style(relation.kind).iter().map(|s| s.to_string()));
        if let Some(t) = &relation.time {
            attrs.push(format!("tooltip=\"{}\"", format_instant(t)));
        }
        out.push_str(&format!("  {src} -> {dst} [{}];\n", attrs.join(", ")));
    }

    out.push_str("}\n");
    out
}
