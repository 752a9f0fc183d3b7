//! Conversion errors

use super::resource::ResourceType;
use thiserror::Error;

/// Why a record, or one item of it, could not be converted.
///
/// Item-level variants carry the 1-based index of the offending
/// measurement or row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    #[error("no conversion rule for resource type '{0}'")]
    UnsupportedType(ResourceType),

    #[error("{resource} item {index}: timestamp {value} does not match '{expected}'")]
    TimestampParse {
        resource: ResourceType,
        index: usize,
        value: String,
        expected: &'static str,
    },

    #[error("{resource} item {index}: field '{field}' has non-numeric value {value}")]
    ValueCoercion {
        resource: ResourceType,
        index: usize,
        field: String,
        value: String,
    },

    #[error("{resource} item {index}: missing required field '{field}'")]
    MissingField {
        resource: ResourceType,
        index: usize,
        field: String,
    },

    #[error("malformed {resource} record: {reason}")]
    InvalidRecord {
        resource: ResourceType,
        reason: String,
    },
}

impl ConvertError {
    /// 1-based item index, when the error concerns a single item.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::TimestampParse { index, .. }
            | Self::ValueCoercion { index, .. }
            | Self::MissingField { index, .. } => Some(*index),
            Self::UnsupportedType(_) | Self::InvalidRecord { .. } => None,
        }
    }
}

/// An item skipped under row isolation.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFailure {
    pub index: usize,
    pub error: ConvertError,
}
