//! Converter for batches of timestamped rows (building telemetry).

use super::error::ConvertError;
use super::literal::{canonical_timestamp, describe, encode_key, float_lexical, parse_float};
use super::resource::ResourceType;
use super::tables::RowTable;
use super::Batch;
use crate::vocab::{RDF_TYPE, RESOURCE_BASE, XSD_DATE_TIME, XSD_FLOAT};
use oxrdf::{Literal, NamedNode, Triple};
use serde_json::Value;

pub(super) fn convert(
    table: &RowTable,
    resource: ResourceType,
    record: &Value,
    batch: &mut Batch,
) -> Result<(), ConvertError> {
    let rows = record.as_array().ok_or_else(|| ConvertError::InvalidRecord {
        resource,
        reason: "expected an array of rows".to_string(),
    })?;

    for (i, row) in rows.iter().enumerate() {
        let index = i + 1;
        batch.accept(index, row_triples(table, resource, index, row))?;
    }
    Ok(())
}

/// Triples for every measurement column of one row.
///
/// The timestamp is resolved first: a row whose timestamp does not parse
/// yields no triples at all.
fn row_triples(
    table: &RowTable,
    resource: ResourceType,
    index: usize,
    row: &Value,
) -> Result<Vec<Triple>, ConvertError> {
    let columns = row.as_object().ok_or_else(|| ConvertError::InvalidRecord {
        resource,
        reason: format!("row {} is not an object", index),
    })?;

    let raw = match columns.get(table.timestamp_column) {
        Some(v) if !v.is_null() => v,
        _ => {
            return Err(ConvertError::MissingField {
                resource,
                index,
                field: table.timestamp_column.to_string(),
            })
        }
    };
    let timestamp = raw
        .as_str()
        .and_then(|s| canonical_timestamp(s, table.timestamp_format))
        .ok_or_else(|| ConvertError::TimestampParse {
            resource,
            index,
            value: describe(raw),
            expected: table.timestamp_format,
        })?;
    let timestamp = Literal::new_typed_literal(timestamp, XSD_DATE_TIME);

    let mut triples = Vec::new();
    for (column, value) in columns {
        if column == table.timestamp_column {
            continue;
        }
        let number = parse_float(value).ok_or_else(|| ConvertError::ValueCoercion {
            resource,
            index,
            field: column.clone(),
            value: describe(value),
        })?;

        let subject = NamedNode::new_unchecked(format!(
            "{}{}/{}/{}",
            RESOURCE_BASE,
            table.subject_path,
            encode_key(column),
            index
        ));
        triples.push(Triple::new(subject.clone(), RDF_TYPE, table.type_of(column).into_owned()));
        triples.push(Triple::new(
            subject.clone(),
            table.value_predicate,
            Literal::new_typed_literal(float_lexical(number), XSD_FLOAT),
        ));
        triples.push(Triple::new(subject, table.timestamp_predicate, timestamp.clone()));
    }
    Ok(triples)
}
