//! PNG rendering through an external layout engine (Graphviz `dot`).
//!
//! The image is produced fully in memory, checked to be a PNG, written to a
//! temporary file next to the target and only then persisted over the target
//! path. A failed render never leaves a partial file behind.

use provgraph_model::ProvDocument;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::dot::{render_dot, DotOptions};
use crate::error::RenderError;

/// Turns DOT source into PNG bytes.
pub trait LayoutEngine {
    fn layout_png(&self, dot: &str) -> Result<Vec<u8>, RenderError>;
}

/// Runs a Graphviz binary (`dot` by default) as `dot -Tpng`.
#[derive(Debug, Clone)]
pub struct GraphvizCli {
    pub program: PathBuf,
}

impl Default for GraphvizCli {
    fn default() -> Self {
        Self {
            program: PathBuf::from("dot"),
        }
    }
}

impl GraphvizCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl LayoutEngine for GraphvizCli {
    fn layout_png(&self, dot: &str) -> Result<Vec<u8>, RenderError> {
        let mut child = Command::new(&self.program)
            .arg("-Tpng")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RenderError::LayoutUnavailable {
                program: self.program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(dot.as_bytes()) {
                // The program exited without reading; its status says why.
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(source) => {
                    return Err(RenderError::LayoutUnavailable {
                        program: self.program.clone(),
                        source,
                    })
                }
                Ok(()) => {}
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|source| RenderError::LayoutUnavailable {
                program: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(RenderError::LayoutFailed {
                program: self.program.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

/// Render `doc` with the default styling and Graphviz `dot`, writing a PNG to `path`.
pub fn render_image(doc: &ProvDocument, path: &Path) -> Result<(), RenderError> {
    render_image_with(doc, path, &DotOptions::default(), &GraphvizCli::default())
}

pub fn render_image_with(
    doc: &ProvDocument,
    path: &Path,
    options: &DotOptions,
    engine: &dyn LayoutEngine,
) -> Result<(), RenderError> {
    let dot = render_dot(doc, options);
    let png = engine.layout_png(&dot)?;
    if png.is_empty() || !matches!(::image::guess_format(&png), Ok(::image::ImageFormat::Png)) {
        return Err(RenderError::UnexpectedFormat { len: png.len() });
    }
    write_atomically(path, &png)?;
    tracing::info!(path = %path.display(), bytes = png.len(), "wrote provenance image");
    Ok(())
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    let io_err = |source: std::io::Error| RenderError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut builder = tempfile::Builder::new();
    builder.prefix(".provgraph-").suffix(".png.tmp");
    // Same mode a plain create would get: 0o666 less the umask.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir).map_err(io_err)?;
    // An overwritten target keeps its mode.
    if let Ok(existing) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(io_err)?;
    }
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.flush().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use provgraph_model::{Namespace, QualifiedName};

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    struct FixedEngine(Vec<u8>);

    impl LayoutEngine for FixedEngine {
        fn layout_png(&self, dot: &str) -> Result<Vec<u8>, RenderError> {
            assert!(dot.starts_with("digraph"));
            Ok(self.0.clone())
        }
    }

    fn doc() -> ProvDocument {
        let mut doc = ProvDocument::new();
        doc.add_namespace(Namespace::new("ex", "http://example.org/")).unwrap();
        doc.entity(QualifiedName::parse("ex:e").unwrap(), vec![]).unwrap();
        doc
    }

    fn fake_png() -> Vec<u8> {
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.extend_from_slice(&[0, 0, 0, 13]);
        bytes.extend_from_slice(b"IHDR");
        bytes
    }

    #[test]
    fn writes_layout_output_to_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Sources.png");
        std::fs::write(&path, b"stale").unwrap();
        render_image_with(&doc(), &path, &DotOptions::default(), &FixedEngine(fake_png())).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), fake_png());
    }

    #[test]
    fn rejects_non_png_output_without_touching_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Sources.png");
        let err = render_image_with(
            &doc(),
            &path,
            &DotOptions::default(),
            &FixedEngine(b"<svg/>".to_vec()),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::UnexpectedFormat { len: 6 }));
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_target_fails_without_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("Sources.png");
        let err = render_image_with(&doc(), &path, &DotOptions::default(), &FixedEngine(fake_png()))
            .unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn overwritten_target_keeps_its_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Sources.png");
        for mode in [0o644, 0o640] {
            std::fs::write(&path, b"stale").unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
            render_image_with(&doc(), &path, &DotOptions::default(), &FixedEngine(fake_png()))
                .unwrap();
            let meta = std::fs::metadata(&path).unwrap();
            assert_eq!(meta.permissions().mode() & 0o777, mode);
            assert_eq!(std::fs::read(&path).unwrap(), fake_png());
        }
    }

    #[cfg(unix)]
    #[test]
    fn new_target_is_not_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Sources.png");
        // Whatever the umask, the image gets the mode a plain write would.
        let plain = dir.path().join("plain");
        std::fs::write(&plain, b"").unwrap();
        let plain_mode = std::fs::metadata(&plain).unwrap().permissions().mode() & 0o777;

        render_image_with(&doc(), &path, &DotOptions::default(), &FixedEngine(fake_png())).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, plain_mode);
    }

    #[cfg(unix)]
    #[test]
    fn failing_layout_program_reports_exit_status() {
        let engine = GraphvizCli::new("false");
        let err = engine.layout_png("digraph {}").unwrap_err();
        match err {
            RenderError::LayoutFailed { program, code, .. } => {
                assert_eq!(program, PathBuf::from("false"));
                assert_eq!(code, Some(1));
            }
            other => panic!("expected LayoutFailed, got {other:?}"),
        }
    }

    #[test]
    fn missing_layout_program_is_reported() {
        let engine = GraphvizCli::new("/nonexistent/bin/dot-provgraph");
        let err = engine.layout_png("digraph {}").unwrap_err();
        assert!(matches!(err, RenderError::LayoutUnavailable { .. }));
    }
}
