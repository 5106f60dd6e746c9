use proptest::prelude::*;
use provgraph_export::{from_prov_json, render_dot, to_prov_json, to_provn, DotOptions};
use provgraph_model::{
    AttrValue, Attribute, Element, ElementKind, Namespace, ProvDocument, QualifiedName, Relation,
    RelationKind,
};
use std::collections::BTreeSet;

fn q(s: &str) -> QualifiedName {
    QualifiedName::parse(s).expect("qualified name")
}

#[derive(Debug, Clone)]
struct DocSpec {
    kinds: Vec<ElementKind>,
    titles: Vec<String>,
    edges: Vec<(usize, usize, usize)>,
}

fn doc_spec() -> impl Strategy<Value = DocSpec> {
    (1usize..12).prop_flat_map(|n| {
        (
            prop::collection::vec(prop::sample::select(ElementKind::ALL.to_vec()), n),
            prop::collection::vec(any::<String>(), n),
            prop::collection::vec((0..n, 0..n, 0usize..5), 0..24),
        )
            .prop_map(|(kinds, titles, edges)| DocSpec { kinds, titles, edges })
    })
}

/// Build a document from the spec, silently skipping edges whose endpoint
/// kinds are not allowed for the chosen relation.
fn build(spec: &DocSpec) -> ProvDocument {
    let mut doc = ProvDocument::new();
    doc.add_namespace(Namespace::new("ex", "http://example.org/")).unwrap();
    doc.add_namespace(Namespace::new("dcterms", "http://purl.org/dc/terms/")).unwrap();
    for (i, (kind, title)) in spec.kinds.iter().zip(&spec.titles).enumerate() {
        let element = Element::new(*kind, q(&format!("ex:n{i}")))
            .with_attribute(q("dcterms:title"), title.as_str())
            .with_attribute(q("prov:type"), QualifiedName::prov("Thing"));
        doc.add_element(element).unwrap();
    }
    for (s, o, k) in &spec.edges {
        let kind = RelationKind::ALL[*k];
        if !kind.subject_kinds().contains(&spec.kinds[*s]) || !kind.object_kinds().contains(&spec.kinds[*o]) {
            continue;
        }
        doc.add_relation(Relation::new(kind, q(&format!("ex:n{s}")), q(&format!("ex:n{o}"))))
            .unwrap();
    }
    doc
}

fn record_lines(provn: &str) -> usize {
    provn
        .lines()
        .filter(|l| l.starts_with("  ") && !l.trim_start().starts_with("prefix "))
        .count()
}

/// Classify `  nK [..]` as a node statement and `  nK -> nJ [..]` as an edge.
fn dot_statement(line: &str) -> Option<&'static str> {
    let mut tokens = line.split_whitespace();
    let first = tokens.next()?;
    let is_node_id = first.len() > 1
        && first.starts_with('n')
        && first[1..].chars().all(|c| c.is_ascii_digit());
    if !is_node_id {
        return None;
    }
    match tokens.next()? {
        "->" => Some("edge"),
        t if t.starts_with('[') => Some("node"),
        _ => None,
    }
}

proptest! {
    #[test]
    fn provn_has_one_line_per_record(spec in doc_spec()) {
        let doc = build(&spec);
        let text = to_provn(&doc);
        prop_assert_eq!(record_lines(&text), doc.element_count() + doc.relation_count());
        prop_assert!(text.starts_with("document\n"));
        prop_assert!(text.ends_with("endDocument"));
    }

    #[test]
    fn prov_json_preserves_identifiers_and_attributes(spec in doc_spec()) {
        let doc = build(&spec);
        let back = from_prov_json(&to_prov_json(&doc).unwrap()).unwrap();
        back.validate().unwrap();

        prop_assert_eq!(back.element_count(), doc.element_count());
        prop_assert_eq!(back.relation_count(), doc.relation_count());

        let ids = |d: &ProvDocument| d.elements().map(|e| e.id.to_string()).collect::<BTreeSet<_>>();
        prop_assert_eq!(ids(&back), ids(&doc));

        for e in doc.elements() {
            let got = back.get(&e.id).unwrap();
            let mut want: Vec<Attribute> = e.attributes.clone();
            let mut have: Vec<Attribute> = got.attributes.clone();
            want.sort();
            have.sort();
            prop_assert_eq!(have, want);
        }
        let rels = |d: &ProvDocument| d.relations().cloned().collect::<Vec<_>>();
        prop_assert_eq!(rels(&back), rels(&doc));
    }

    #[test]
    fn dot_has_one_node_per_element_and_one_edge_per_relation(spec in doc_spec()) {
        let doc = build(&spec);
        let dot = render_dot(&doc, &DotOptions::default());
        let nodes = dot.lines().filter(|l| dot_statement(l) == Some("node")).count();
        let edges = dot.lines().filter(|l| dot_statement(l) == Some("edge")).count();
        prop_assert_eq!(nodes, doc.element_count());
        prop_assert_eq!(edges, doc.relation_count());
    }
}

#[test]
fn string_values_with_newlines_stay_on_one_provn_line() {
    let mut doc = ProvDocument::new();
    doc.add_namespace(Namespace::new("ex", "http://example.org/")).unwrap();
    doc.entity(
        q("ex:e"),
        vec![Attribute::new(q("ex:note"), AttrValue::from("line one\nline two\r\n"))],
    )
    .unwrap();
    let text = to_provn(&doc);
    assert_eq!(record_lines(&text), 1);
    assert!(text.contains(r#"ex:note="line one\nline two\r\n""#));
}
