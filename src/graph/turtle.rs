//! Turtle serialization
//!
//! Writes a `@prefix` line for every registered namespace, then the triples
//! with consecutive statements about the same subject folded with `;`.

use crate::vocab::{NamespaceRegistry, RDF_TYPE};
use oxrdf::{Literal, NamedNodeRef, Subject, Term, Triple};

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// Serializes triples to Turtle, compacting IRIs against a prefix table.
#[derive(Debug, Clone, Copy)]
pub struct TurtleWriter<'a> {
    registry: &'a NamespaceRegistry,
}

impl<'a> TurtleWriter<'a> {
    pub fn new(registry: &'a NamespaceRegistry) -> Self {
        Self { registry }
    }

    pub fn serialize(&self, triples: &[Triple]) -> String {
        let mut out = String::new();

        for ns in self.registry.iter() {
            out.push_str(&format!("@prefix {}: <{}> .\n", ns.prefix(), ns.iri()));
        }
        if triples.is_empty() {
            return out;
        }
        if !self.registry.is_empty() {
            out.push('\n');
        }

        let mut current: Option<&Subject> = None;
        for triple in triples {
            if current == Some(&triple.subject) {
                out.push_str(" ;\n    ");
            } else {
                if current.is_some() {
                    out.push_str(" .\n\n");
                }
                out.push_str(&self.subject(&triple.subject));
                out.push(' ');
                current = Some(&triple.subject);
            }
            out.push_str(&self.predicate(triple.predicate.as_ref()));
            out.push(' ');
            out.push_str(&self.object(&triple.object));
        }
        out.push_str(" .\n");
        out
    }

    fn subject(&self, subject: &Subject) -> String {
        match subject {
            Subject::NamedNode(node) => self.named_node(node.as_ref()),
            other => other.to_string(),
        }
    }

    fn predicate(&self, predicate: NamedNodeRef<'_>) -> String {
        if predicate == RDF_TYPE {
            "a".to_string()
        } else {
            self.named_node(predicate)
        }
    }

    fn object(&self, object: &Term) -> String {
        match object {
            Term::NamedNode(node) => self.named_node(node.as_ref()),
            Term::Literal(literal) => self.literal(literal),
            other => other.to_string(),
        }
    }

    fn named_node(&self, node: NamedNodeRef<'_>) -> String {
        let iri = node.as_str();
        match self.registry.split(iri) {
            Some((prefix, local)) if is_valid_local_name(local) => format!("{}:{}", prefix, local),
            _ => format!("<{}>", iri),
        }
    }

    fn literal(&self, literal: &Literal) -> String {
        let value = escape_string(literal.value());
        if let Some(lang) = literal.language() {
            return format!("\"{}\"@{}", value, lang);
        }
        let datatype = literal.datatype();
        if datatype.as_str() == XSD_STRING {
            format!("\"{}\"", value)
        } else {
            format!("\"{}\"^^{}", value, self.named_node(datatype))
        }
    }
}

fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// Whether `local` can follow `prefix:` without escaping.
fn is_valid_local_name(local: &str) -> bool {
    let mut chars = local.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return true,
    };
    if !(first.is_alphanumeric() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.')) && !local.ends_with('.')
}
