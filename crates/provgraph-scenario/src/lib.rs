//! # provgraph-scenario
//!
//! Declarative provenance scenarios.
//!
//! A [`Scenario`] is a table of records (people, organizations, services,
//! data sources, activities and the relations between them). [`Scenario::build`]
//! applies each record in order to a fresh [`ProvDocument`], spelling the
//! attributes according to an [`AttributeSchema`] and drawing every `now`
//! from an injected [`Clock`].
//!
//! The built-in table, [`Scenario::annotation_lookup`], records how an ADAMA
//! response for a locus annotation query came to be: who built the platform
//! and the microservice, which data sources the microservice consulted, and
//! who is responsible for those sources.

pub mod clock;
pub mod error;
pub mod schema;
pub mod table;

pub use clock::{Clock, FixedClock, SystemClock, TimeSpec, Timeline};
pub use error::ScenarioError;
pub use schema::AttributeSchema;
pub use table::{apply, Scenario, ScenarioRecord};

use provgraph_model::ProvDocument;

/// Build the annotation-lookup record with the default (v1) schema.
pub fn build(clock: &dyn Clock) -> Result<ProvDocument, ScenarioError> {
    build_with_schema(AttributeSchema::default(), clock)
}

pub fn build_with_schema(
    schema: AttributeSchema,
    clock: &dyn Clock,
) -> Result<ProvDocument, ScenarioError> {
    Scenario::annotation_lookup()?.build(schema, clock)
}
