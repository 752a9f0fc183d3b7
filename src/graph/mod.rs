//! Semantic graph accumulator
//!
//! A `SemanticGraph` is built fresh for every conversion call and dropped
//! once it has been serialized. It never outlives the call that created it.

mod turtle;

pub use turtle::TurtleWriter;

use crate::vocab::NamespaceRegistry;
use oxrdf::{NamedNode, NamedNodeRef, Subject, Term, Triple};
use std::collections::HashSet;

/// Ordered set of triples.
///
/// Insertion order is preserved for serialization; inserting a triple that
/// is already present is a no-op.
#[derive(Debug, Clone, Default)]
pub struct SemanticGraph {
    triples: Vec<Triple>,
    seen: HashSet<Triple>,
}

impl SemanticGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a triple. Returns false if it was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.seen.contains(&triple) {
            return false;
        }
        self.seen.insert(triple.clone());
        self.triples.push(triple);
        true
    }

    /// Insert a triple about a named subject.
    pub fn add(
        &mut self,
        subject: &NamedNode,
        predicate: impl Into<NamedNode>,
        object: impl Into<Term>,
    ) -> bool {
        self.insert(Triple::new(subject.clone(), predicate, object))
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// Distinct subjects, in first-seen order.
    pub fn subjects(&self) -> Vec<&Subject> {
        let mut out: Vec<&Subject> = Vec::new();
        for triple in &self.triples {
            if !out.contains(&&triple.subject) {
                out.push(&triple.subject);
            }
        }
        out
    }

    /// Subjects that carry `rdf:type <class>`.
    pub fn subjects_of_type(&self, class: NamedNodeRef<'_>) -> Vec<&Subject> {
        self.triples
            .iter()
            .filter(|t| t.predicate.as_ref() == crate::vocab::RDF_TYPE)
            .filter(|t| matches!(&t.object, Term::NamedNode(n) if n.as_ref() == class))
            .map(|t| &t.subject)
            .collect()
    }

    /// Objects of every `(subject, predicate, ?)` triple.
    pub fn objects(&self, subject: &NamedNode, predicate: NamedNodeRef<'_>) -> Vec<&Term> {
        self.triples
            .iter()
            .filter(|t| matches!(&t.subject, Subject::NamedNode(s) if s == subject))
            .filter(|t| t.predicate.as_ref() == predicate)
            .map(|t| &t.object)
            .collect()
    }

    /// Serialize as Turtle using the given prefix table.
    pub fn to_turtle(&self, registry: &NamespaceRegistry) -> String {
        TurtleWriter::new(registry).serialize(&self.triples)
    }

    pub fn into_triples(self) -> Vec<Triple> {
        self.triples
    }
}

impl Extend<Triple> for SemanticGraph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        for triple in iter {
            self.insert(triple);
        }
    }
}
