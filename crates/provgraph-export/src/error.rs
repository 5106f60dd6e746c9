use provgraph_model::ProvError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed PROV-JSON: {0}")]
    Malformed(String),

    #[error(transparent)]
    Model(#[from] ProvError),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("layout program `{program}` is not available: {source}")]
    LayoutUnavailable {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("layout program `{program}` failed (exit={code:?}): {stderr}")]
    LayoutFailed {
        program: PathBuf,
        code: Option<i32>,
        stderr: String,
    },

    #[error("layout output is not a PNG image ({len} bytes)")]
    UnexpectedFormat { len: usize },

    #[error("failed to write image `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
