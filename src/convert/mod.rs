//! Semantic conversion
//!
//! Turns a loosely-typed record into an RDF graph under the SRI
//! vocabularies. Conversion is a pure function of (resource type, record):
//! every call builds its own graph and shares nothing but the read-only
//! namespace registry.

mod error;
mod literal;
mod measurements;
mod resource;
mod rows;
pub mod tables;

pub use error::{ConvertError, ItemFailure};
pub use literal::{canonical_timestamp, encode_key, float_lexical, parse_float};
pub use resource::{ResourceType, UnknownResourceType};
pub use tables::ConversionRule;

use crate::graph::SemanticGraph;
use crate::vocab::NamespaceRegistry;
use oxrdf::Triple;
use serde::{Deserialize, Serialize};

/// An input record as parsed from JSON, CSV or manual entry.
pub type RawRecord = serde_json::Value;

/// What happens to the rest of a record when one item fails to convert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowPolicy {
    /// Skip the failing item, keep converting the others
    #[default]
    Isolate,
    /// Stop at the first failing item
    Abort,
}

/// Result of a successful conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub resource_type: ResourceType,
    pub graph: SemanticGraph,
    /// Turtle serialization of `graph`
    pub payload: String,
    /// Items (measurements or rows) that made it into the graph
    pub items: usize,
    /// Items skipped under `RowPolicy::Isolate`
    pub failures: Vec<ItemFailure>,
}

impl Conversion {
    /// True if no item was skipped.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Collects per-item results under a row policy.
///
/// Items are committed whole: an item's triples reach the graph only if
/// the item converted without error.
pub(crate) struct Batch {
    policy: RowPolicy,
    graph: SemanticGraph,
    converted: usize,
    failures: Vec<ItemFailure>,
}

impl Batch {
    fn new(policy: RowPolicy) -> Self {
        Self {
            policy,
            graph: SemanticGraph::new(),
            converted: 0,
            failures: Vec::new(),
        }
    }

    pub(crate) fn accept(
        &mut self,
        index: usize,
        item: Result<Vec<Triple>, ConvertError>,
    ) -> Result<(), ConvertError> {
        match item {
            Ok(triples) => {
                self.graph.extend(triples);
                self.converted += 1;
                Ok(())
            }
            Err(error) => match self.policy {
                RowPolicy::Abort => Err(error),
                RowPolicy::Isolate => {
                    self.failures.push(ItemFailure { index, error });
                    Ok(())
                }
            },
        }
    }

    /// If every item failed, or the items that converted produced no
    /// triples, the first failure becomes the conversion error.
    fn finish(mut self) -> Result<(SemanticGraph, usize, Vec<ItemFailure>), ConvertError> {
        if !self.failures.is_empty() && (self.converted == 0 || self.graph.is_empty()) {
            return Err(self.failures.remove(0).error);
        }
        Ok((self.graph, self.converted, self.failures))
    }
}

/// Converts records into serialized semantic graphs.
#[derive(Debug, Clone, Copy)]
pub struct SemanticConverter {
    registry: &'static NamespaceRegistry,
    policy: RowPolicy,
}

impl SemanticConverter {
    pub fn new() -> Self {
        Self {
            registry: NamespaceRegistry::global(),
            policy: RowPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RowPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RowPolicy {
        self.policy
    }

    /// Convert a record and serialize the resulting graph as Turtle.
    pub fn convert(
        &self,
        resource: ResourceType,
        record: &RawRecord,
    ) -> Result<Conversion, ConvertError> {
        let mut batch = Batch::new(self.policy);
        match resource.rule() {
            ConversionRule::Measurements(table) => {
                measurements::convert(table, resource, record, &mut batch)?
            }
            ConversionRule::Rows(table) => rows::convert(table, resource, record, &mut batch)?,
            ConversionRule::Unsupported => return Err(ConvertError::UnsupportedType(resource)),
        }

        let (graph, items, failures) = batch.finish()?;
        let payload = graph.to_turtle(self.registry);
        Ok(Conversion {
            resource_type: resource,
            graph,
            payload,
            items,
            failures,
        })
    }
}

impl Default for SemanticConverter {
    fn default() -> Self {
        Self::new()
    }
}
