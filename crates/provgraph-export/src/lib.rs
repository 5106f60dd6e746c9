//! Emitters for provenance documents.
//!
//! - PROV-N (`to_provn`): one line per record, for humans and diffs
//! - PROV-JSON (`to_prov_json` / `from_prov_json`): machine-readable, round-trips
//! - Graphviz DOT (`render_dot`) and PNG (`render_image`) via an external layout engine
//!
//! All emitters are total over documents built through `ProvDocument`'s
//! checked API; the only fallible paths are JSON parsing and image rendering.

pub mod dot;
pub mod error;
pub mod json;
pub mod provn;
pub mod render;

pub use dot::{render_dot, DotOptions};
pub use error::{ExportError, RenderError};
pub use json::{from_prov_json, to_prov_json, to_prov_json_value};
pub use provn::to_provn;
pub use render::{render_image, render_image_with, GraphvizCli, LayoutEngine};
