//! SRI: Semantic Resource Interface
//!
//! Converts heterogeneous energy and building readings into RDF graphs under
//! the SRI ontologies and publishes them on topic-routed MQTT channels.
//!
//! # Core Concepts
//!
//! - **ResourceType**: `ev`, `pv`, `hvac`, `building` or `weather`; picks the
//!   conversion rule and the output topic
//! - **SemanticConverter**: pure (resource type, record) → Turtle conversion
//! - **DispatchRouter**: converts, resolves the topic, publishes once
//! - **Transport**: the publish primitive (MQTT, or in-memory for dry runs)
//!
//! # Example
//!
//! ```
//! use sri::{ResourceType, SemanticConverter};
//! use serde_json::json;
//!
//! let record = json!({"powerMeasurements": [
//!     {"timestamp": "2024-01-01T00:00:00", "value": 5.2}
//! ]});
//! let conversion = SemanticConverter::new()
//!     .convert(ResourceType::Pv, &record)
//!     .unwrap();
//! assert!(conversion.payload.contains("sri4all:PowerMeasurement"));
//! ```

pub mod config;
pub mod convert;
pub mod graph;
pub mod input;
pub mod route;
pub mod transport;
pub mod vocab;

pub use config::{Config, ConfigError};
pub use convert::{
    Conversion, ConvertError, ItemFailure, RawRecord, ResourceType, RowPolicy, SemanticConverter,
};
pub use graph::{SemanticGraph, TurtleWriter};
pub use input::InputError;
pub use route::{DispatchRouter, RouteError, RouteOutcome, RoutingTable};
pub use transport::{MemoryTransport, MqttSettings, MqttTransport, Transport, TransportError};
pub use vocab::{Namespace, NamespaceRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
