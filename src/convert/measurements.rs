//! Converter for records carrying an array of measurement objects (pv).

use super::error::ConvertError;
use super::literal::{describe, float_lexical, parse_float, plain_text};
use super::resource::ResourceType;
use super::tables::{FieldRule, LiteralKind, MeasurementTable, Presence};
use super::Batch;
use crate::vocab::{RESOURCE_BASE, XSD_DATE_TIME, XSD_FLOAT};
use oxrdf::{Literal, NamedNode, Triple};
use serde_json::Value;

pub(super) fn convert(
    table: &MeasurementTable,
    resource: ResourceType,
    record: &Value,
    batch: &mut Batch,
) -> Result<(), ConvertError> {
    let fields = record.as_object().ok_or_else(|| ConvertError::InvalidRecord {
        resource,
        reason: "expected an object".to_string(),
    })?;

    let items = match fields.get(table.list_key) {
        None | Some(Value::Null) => return Ok(()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(ConvertError::InvalidRecord {
                resource,
                reason: format!("'{}' must be an array", table.list_key),
            })
        }
    };

    for (i, item) in items.iter().enumerate() {
        let index = i + 1;
        batch.accept(index, measurement_triples(table, resource, index, item))?;
    }
    Ok(())
}

/// Triples for one measurement, built before anything touches the graph.
fn measurement_triples(
    table: &MeasurementTable,
    resource: ResourceType,
    index: usize,
    item: &Value,
) -> Result<Vec<Triple>, ConvertError> {
    let fields = item.as_object().ok_or_else(|| ConvertError::InvalidRecord {
        resource,
        reason: format!("measurement {} is not an object", index),
    })?;

    let subject = NamedNode::new_unchecked(format!(
        "{}{}/{}",
        RESOURCE_BASE, table.subject_path, index
    ));

    let mut triples = Vec::with_capacity(table.constants.len() + table.fields.len());
    for &(predicate, object) in table.constants {
        triples.push(Triple::new(subject.clone(), predicate, object.into_owned()));
    }
    for rule in table.fields {
        let literal = field_literal(rule, resource, index, fields.get(rule.field))?;
        triples.push(Triple::new(subject.clone(), rule.predicate, literal));
    }
    Ok(triples)
}

fn field_literal(
    rule: &FieldRule,
    resource: ResourceType,
    index: usize,
    value: Option<&Value>,
) -> Result<Literal, ConvertError> {
    let value = match (value, rule.presence) {
        (Some(v), _) if !v.is_null() => v.clone(),
        (_, Presence::Default(text)) => Value::String(text.to_string()),
        (_, Presence::Required) => {
            return Err(ConvertError::MissingField {
                resource,
                index,
                field: rule.field.to_string(),
            })
        }
    };

    match rule.kind {
        LiteralKind::Float => parse_float(&value)
            .map(|n| Literal::new_typed_literal(float_lexical(n), XSD_FLOAT))
            .ok_or_else(|| ConvertError::ValueCoercion {
                resource,
                index,
                field: rule.field.to_string(),
                value: describe(&value),
            }),
        LiteralKind::Plain => plain_text(&value)
            .map(Literal::new_simple_literal)
            .ok_or_else(|| ConvertError::InvalidRecord {
                resource,
                reason: format!("measurement {}: '{}' must be a scalar", index, rule.field),
            }),
        LiteralKind::DateTime => match &value {
            Value::String(s) => Ok(Literal::new_typed_literal(s.clone(), XSD_DATE_TIME)),
            other => Err(ConvertError::InvalidRecord {
                resource,
                reason: format!(
                    "measurement {}: '{}' must be a string, got {}",
                    index,
                    rule.field,
                    describe(other)
                ),
            }),
        },
    }
}
