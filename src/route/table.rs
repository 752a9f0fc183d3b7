//! Topic routing table

use crate::convert::ResourceType;
use std::collections::HashMap;

/// Base of the generic `{base}/{type}` topics.
pub const DEFAULT_BASE: &str = "resonance/sri";
/// Partner/site topic for photovoltaic production.
pub const PV_TOPIC: &str = "resonance/sri/partner1/site1/pv";
/// Partner/site topic for building telemetry.
pub const BUILDING_TOPIC: &str = "resonance/sri/partner2/site1/building";

/// Maps each resource type to the topic its graphs are published on.
///
/// Built once at startup and read-only afterwards. Routing depends only on
/// the resource type, never on record content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingTable {
    base: String,
    fixed: HashMap<ResourceType, String>,
}

impl RoutingTable {
    /// Table with the standard partner/site topics.
    pub fn new() -> Self {
        Self::with_base(DEFAULT_BASE)
            .with_topic(ResourceType::Pv, PV_TOPIC)
            .with_topic(ResourceType::Building, BUILDING_TOPIC)
    }

    /// Table with no fixed topics: every type routes to `{base}/{type}`.
    pub fn with_base(base: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
            fixed: HashMap::new(),
        }
    }

    /// Pin a resource type to a fixed topic.
    pub fn with_topic(mut self, resource: ResourceType, topic: impl Into<String>) -> Self {
        self.fixed.insert(resource, topic.into());
        self
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// The topic for a resource type.
    pub fn topic_for(&self, resource: ResourceType) -> String {
        match self.fixed.get(&resource) {
            Some(topic) => topic.clone(),
            None => format!("{}/{}", self.base, resource.as_str()),
        }
    }

    /// Every (type, topic) pair, in `ResourceType::ALL` order.
    pub fn entries(&self) -> Vec<(ResourceType, String)> {
        ResourceType::ALL
            .into_iter()
            .map(|t| (t, self.topic_for(t)))
            .collect()
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::new()
    }
}
