use provgraph_model::ProvError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid scenario table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read scenario `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid time `{value}` (expected `now` or an RFC 3339 instant): {reason}")]
    InvalidTime { value: String, reason: String },

    #[error("unknown attribute schema `{0}` (expected v1|v2)")]
    UnknownSchema(String),

    #[error(transparent)]
    Model(#[from] ProvError),
}
