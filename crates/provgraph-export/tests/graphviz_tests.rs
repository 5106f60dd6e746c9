//! Rendering through a real Graphviz installation.
//!
//! Skipped (with a note on stderr) when `dot` is not on PATH.

use provgraph_export::{render_image, RenderError};
use provgraph_model::{Namespace, ProvDocument, QualifiedName};
use std::process::{Command, Stdio};

fn graphviz_available() -> bool {
    Command::new("dot")
        .arg("-V")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn small_doc() -> ProvDocument {
    let q = |s: &str| QualifiedName::parse(s).unwrap();
    let mut doc = ProvDocument::new();
    doc.add_namespace(Namespace::new("ex", "http://example.org/")).unwrap();
    doc.entity(q("ex:response"), vec![]).unwrap();
    doc.activity(q("ex:query"), None, None, vec![]).unwrap();
    doc.was_generated_by(&q("ex:response"), &q("ex:query"), None).unwrap();
    doc
}

#[test]
fn renders_png_with_graphviz() {
    if !graphviz_available() {
        eprintln!("note: graphviz `dot` not found; skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Sources.png");
    render_image(&small_doc(), &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert!(!bytes.is_empty());
    assert!(bytes.starts_with(b"\x89PNG"));
}

#[test]
fn unwritable_path_fails_with_graphviz() {
    if !graphviz_available() {
        eprintln!("note: graphviz `dot` not found; skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("Sources.png");
    let err = render_image(&small_doc(), &path).unwrap_err();
    assert!(matches!(err, RenderError::Io { .. }));
    assert!(!path.exists());
}
