//! Ontology namespaces shared by every conversion
//!
//! The registry is a fixed, process-wide table. It is never mutated after
//! compilation, so conversions running on different threads read it freely.

mod terms;

pub use terms::*;

use oxrdf::NamedNode;

/// Base IRI under which measurement subjects are minted.
pub const RESOURCE_BASE: &str = "https://w3id.org/resonance/";

/// A vocabulary prefix bound to its namespace IRI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace {
    prefix: &'static str,
    iri: &'static str,
}

impl Namespace {
    pub const fn new(prefix: &'static str, iri: &'static str) -> Self {
        Self { prefix, iri }
    }

    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    pub fn iri(&self) -> &'static str {
        self.iri
    }

    /// Build the IRI of a term in this namespace.
    pub fn term(&self, local: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("{}{}", self.iri, local))
    }
}

pub const SAREF: Namespace = Namespace::new("saref", "https://saref.etsi.org/core/");
pub const SAREF4ENER: Namespace = Namespace::new("saref4ener", "https://saref.etsi.org/saref4ener/");
pub const SRI4BUILDING: Namespace =
    Namespace::new("sri4building", "https://w3id.org/resonance/sri4building#");
// Downstream consumers bind the double hash; keep it.
pub const SRI4WEATHER: Namespace =
    Namespace::new("sri4weather", "https://w3id.org/resonance/sri4weather##");
pub const SRI4EV: Namespace = Namespace::new("sri4ev", "https://w3id.org/resonance/sri4ev#");
pub const SRI4PV: Namespace = Namespace::new("sri4pv", "https://w3id.org/resonance/sri4pv#");
pub const SRI4ALL: Namespace = Namespace::new("sri4all", "https://w3id.org/resonance/sri4all#");
pub const RDF: Namespace = Namespace::new("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");
pub const XSD: Namespace = Namespace::new("xsd", "http://www.w3.org/2001/XMLSchema#");

/// Prefix table used when serializing graphs.
#[derive(Debug, Clone, Copy)]
pub struct NamespaceRegistry {
    namespaces: &'static [Namespace],
}

static DEFAULT_NAMESPACES: [Namespace; 9] = [
    SAREF,
    SAREF4ENER,
    SRI4BUILDING,
    SRI4WEATHER,
    SRI4EV,
    SRI4PV,
    SRI4ALL,
    RDF,
    XSD,
];

impl NamespaceRegistry {
    /// The registry every conversion shares.
    pub fn global() -> &'static NamespaceRegistry {
        static GLOBAL: NamespaceRegistry = NamespaceRegistry {
            namespaces: &DEFAULT_NAMESPACES,
        };
        &GLOBAL
    }

    pub fn iter(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.iter()
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Look up a namespace by prefix.
    pub fn get(&self, prefix: &str) -> Option<&Namespace> {
        self.namespaces.iter().find(|ns| ns.prefix == prefix)
    }

    /// Split an IRI into (prefix, local part) using the longest matching
    /// namespace. Returns `None` when no namespace matches.
    pub fn split<'a>(&self, iri: &'a str) -> Option<(&'static str, &'a str)> {
        self.namespaces
            .iter()
            .filter(|ns| iri.starts_with(ns.iri))
            .max_by_key(|ns| ns.iri.len())
            .map(|ns| (ns.prefix, &iri[ns.iri.len()..]))
    }
}
