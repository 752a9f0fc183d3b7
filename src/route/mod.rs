//! Dispatch router: converts a record and publishes it on its topic
//!
//! One `route` call is one convert → resolve topic → publish sequence.
//! Failures never reach the transport: a record that does not convert is
//! not published at all.

mod table;

pub use table::{RoutingTable, BUILDING_TOPIC, DEFAULT_BASE, PV_TOPIC};

use crate::convert::{ConvertError, ItemFailure, RawRecord, ResourceType, SemanticConverter};
use crate::transport::{Transport, TransportError};
use std::sync::Arc;
use thiserror::Error;

/// Errors from a single `route` call.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("invalid resource type '{0}'")]
    InvalidResourceType(String),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error("publish failed: {0}")]
    Transport(#[from] TransportError),
}

/// What a successful `route` call published.
#[derive(Debug, Clone)]
pub struct RouteOutcome {
    pub resource_type: ResourceType,
    pub topic: String,
    /// Triples in the published graph
    pub triples: usize,
    /// Items (measurements or rows) in the published graph
    pub items: usize,
    /// Items skipped under row isolation
    pub failures: Vec<ItemFailure>,
}

/// Routes records through the converter to the transport.
pub struct DispatchRouter {
    converter: SemanticConverter,
    routes: RoutingTable,
    transport: Arc<dyn Transport>,
}

impl DispatchRouter {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            converter: SemanticConverter::new(),
            routes: RoutingTable::new(),
            transport,
        }
    }

    pub fn with_converter(mut self, converter: SemanticConverter) -> Self {
        self.converter = converter;
        self
    }

    pub fn with_routes(mut self, routes: RoutingTable) -> Self {
        self.routes = routes;
        self
    }

    pub fn routes(&self) -> &RoutingTable {
        &self.routes
    }

    pub fn converter(&self) -> &SemanticConverter {
        &self.converter
    }

    /// Route a record under a textual resource tag (case-insensitive).
    pub async fn route(
        &self,
        resource_type: &str,
        record: &RawRecord,
    ) -> Result<RouteOutcome, RouteError> {
        let resource: ResourceType = resource_type
            .parse()
            .map_err(|_| RouteError::InvalidResourceType(resource_type.to_string()))?;
        self.route_typed(resource, record).await
    }

    /// Route a record whose resource type is already known.
    ///
    /// Publishes exactly once on success and never on failure.
    pub async fn route_typed(
        &self,
        resource: ResourceType,
        record: &RawRecord,
    ) -> Result<RouteOutcome, RouteError> {
        let conversion = self.converter.convert(resource, record)?;
        for failure in &conversion.failures {
            tracing::warn!(
                resource = %resource,
                index = failure.index,
                error = %failure.error,
                "skipped item"
            );
        }

        let topic = self.routes.topic_for(resource);
        tracing::debug!(
            resource = %resource,
            topic = %topic,
            triples = conversion.graph.len(),
            "converted record"
        );

        self.transport.publish(&topic, &conversion.payload).await?;
        tracing::info!(
            resource = %resource,
            topic = %topic,
            items = conversion.items,
            "published graph"
        );

        Ok(RouteOutcome {
            resource_type: resource,
            topic,
            triples: conversion.graph.len(),
            items: conversion.items,
            failures: conversion.failures,
        })
    }
}
