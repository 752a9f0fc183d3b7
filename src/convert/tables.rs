//! Declarative conversion tables
//!
//! Each resource type with a conversion rule is described as data: which
//! input field feeds which predicate, how its literal is typed, and what
//! happens when the field is absent. The converters in `measurements` and
//! `rows` interpret these tables.

use crate::vocab::{
    BUILDING_TIME_STAMP, BUILDING_VALUE, COMMODITY_QUANTITY, ENERGY_CONSUMPTION, HEAT_CONSUMPTION,
    INDOOR_TEMPERATURE, INDOOR_TEMPERATURE_MEAN, IS_ABOUT, IS_MEASURED_IN, OUTDOOR_TEMPERATURE,
    PHOTOVOLTAIC, POWER_MEASUREMENT, POWER_VALUE, PV_TIMESTAMP, RDF_TYPE, UNKNOWN_MEASUREMENT,
};
use oxrdf::NamedNodeRef;

/// Conversion strategy for a resource type.
#[derive(Debug, Clone, Copy)]
pub enum ConversionRule {
    /// An array of measurement objects under one key; one subject each.
    Measurements(&'static MeasurementTable),
    /// A batch of timestamped rows; one subject per (column, row).
    Rows(&'static RowTable),
    /// Valid tag without a conversion rule. Fails fast.
    Unsupported,
}

/// How a field's value becomes a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    /// `xsd:float`, parsed explicitly from a number or numeric string
    Float,
    /// Plain string literal
    Plain,
    /// `xsd:dateTime`, lexical form copied verbatim
    DateTime,
}

/// What to do when a field is absent (or null).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Default(&'static str),
}

/// One row of a declarative mapping: `field → (predicate, literal kind, default)`.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub predicate: NamedNodeRef<'static>,
    pub kind: LiteralKind,
    pub presence: Presence,
}

/// Mapping for records that carry a list of measurement objects.
#[derive(Debug)]
pub struct MeasurementTable {
    /// Key of the measurement array in the record
    pub list_key: &'static str,
    /// Path under the resource base; subjects are `{base}{path}/{index}`
    pub subject_path: &'static str,
    /// Triples emitted for every measurement regardless of its content
    pub constants: &'static [(NamedNodeRef<'static>, NamedNodeRef<'static>)],
    pub fields: &'static [FieldRule],
}

/// Mapping for batches of rows where every non-timestamp column is a measurement.
#[derive(Debug)]
pub struct RowTable {
    /// Path under the resource base; subjects are `{base}{path}/{column}/{index}`
    pub subject_path: &'static str,
    pub timestamp_column: &'static str,
    /// chrono format of the incoming timestamp
    pub timestamp_format: &'static str,
    pub value_predicate: NamedNodeRef<'static>,
    pub timestamp_predicate: NamedNodeRef<'static>,
    /// Column name → semantic type
    pub column_types: &'static [(&'static str, NamedNodeRef<'static>)],
    /// Type for columns missing from `column_types`
    pub unknown_type: NamedNodeRef<'static>,
}

impl RowTable {
    /// Resolve a column name to its semantic type, never failing.
    pub fn type_of(&self, column: &str) -> NamedNodeRef<'static> {
        self.column_types
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, ty)| *ty)
            .unwrap_or(self.unknown_type)
    }
}

pub static PV_MEASUREMENTS: MeasurementTable = MeasurementTable {
    list_key: "powerMeasurements",
    subject_path: "pv/measurement",
    constants: &[(RDF_TYPE, POWER_MEASUREMENT), (IS_ABOUT, PHOTOVOLTAIC)],
    fields: &[
        FieldRule {
            field: "value",
            predicate: POWER_VALUE,
            kind: LiteralKind::Float,
            presence: Presence::Required,
        },
        FieldRule {
            field: "unit",
            predicate: IS_MEASURED_IN,
            kind: LiteralKind::Plain,
            presence: Presence::Default("Watt"),
        },
        FieldRule {
            field: "commodityQuantity",
            predicate: COMMODITY_QUANTITY,
            kind: LiteralKind::Plain,
            presence: Presence::Default(""),
        },
        FieldRule {
            field: "timestamp",
            predicate: PV_TIMESTAMP,
            kind: LiteralKind::DateTime,
            presence: Presence::Required,
        },
    ],
};

pub static BUILDING_ROWS: RowTable = RowTable {
    subject_path: "building/measurement",
    timestamp_column: "timestamp",
    timestamp_format: "%d/%m/%Y %H:%M",
    value_predicate: BUILDING_VALUE,
    timestamp_predicate: BUILDING_TIME_STAMP,
    column_types: &[
        ("Electricity_consumption", ENERGY_CONSUMPTION),
        ("District_heating_consumption", HEAT_CONSUMPTION),
        ("Outdoor_temperature", OUTDOOR_TEMPERATURE),
        ("Indoor_temperature_measurement_point_1", INDOOR_TEMPERATURE),
        ("Indoor_temperature_measurement_point_2", INDOOR_TEMPERATURE),
        ("Indoor_temperature_measurement_point_3", INDOOR_TEMPERATURE),
        ("Indoor_temperature_mean_value", INDOOR_TEMPERATURE_MEAN),
    ],
    unknown_type: UNKNOWN_MEASUREMENT,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_building_columns_resolve() {
        assert_eq!(BUILDING_ROWS.type_of("Outdoor_temperature"), OUTDOOR_TEMPERATURE);
        assert_eq!(
            BUILDING_ROWS.type_of("Indoor_temperature_measurement_point_2"),
            INDOOR_TEMPERATURE
        );
        assert_eq!(BUILDING_ROWS.type_of("District_heating_consumption"), HEAT_CONSUMPTION);
    }

    #[test]
    fn unknown_building_columns_fall_back() {
        assert_eq!(BUILDING_ROWS.type_of("CO2_level"), UNKNOWN_MEASUREMENT);
        assert_eq!(BUILDING_ROWS.type_of(""), UNKNOWN_MEASUREMENT);
    }

    #[test]
    fn pv_value_and_timestamp_are_required() {
        let required: Vec<&str> = PV_MEASUREMENTS
            .fields
            .iter()
            .filter(|f| f.presence == Presence::Required)
            .map(|f| f.field)
            .collect();
        assert_eq!(required, vec!["value", "timestamp"]);
    }
}
