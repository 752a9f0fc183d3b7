//! Constant terms of the SRI vocabularies used by the converters.

use oxrdf::NamedNodeRef;

pub use oxrdf::vocab::rdf::TYPE as RDF_TYPE;
pub use oxrdf::vocab::xsd::{DATE_TIME as XSD_DATE_TIME, FLOAT as XSD_FLOAT};

// sri4all
pub const POWER_MEASUREMENT: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("https://w3id.org/resonance/sri4all#PowerMeasurement");
pub const POWER_VALUE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("https://w3id.org/resonance/sri4all#powerValue");
pub const IS_MEASURED_IN: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("https://w3id.org/resonance/sri4all#isMeasuredIn");

// sri4pv
pub const PHOTOVOLTAIC: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("https://w3id.org/resonance/sri4pv#Photovoltaic");
pub const IS_ABOUT: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("https://w3id.org/resonance/sri4pv#isAbout");
pub const PV_TIMESTAMP: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("https://w3id.org/resonance/sri4pv#timestamp");

// saref4ener
pub const COMMODITY_QUANTITY: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("https://saref.etsi.org/saref4ener/CommodityQuantity");

// sri4building
pub const BUILDING_VALUE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("https://w3id.org/resonance/sri4building#value");
pub const BUILDING_TIME_STAMP: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("https://w3id.org/resonance/sri4building#timeStamp");
pub const ENERGY_CONSUMPTION: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("https://w3id.org/resonance/sri4building#EnergyConsumption");
pub const HEAT_CONSUMPTION: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("https://w3id.org/resonance/sri4building#HeatConsumption");
pub const OUTDOOR_TEMPERATURE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("https://w3id.org/resonance/sri4building#OutdoorTemperature");
pub const INDOOR_TEMPERATURE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("https://w3id.org/resonance/sri4building#IndoorTemperature");
pub const INDOOR_TEMPERATURE_MEAN: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("https://w3id.org/resonance/sri4building#IndoorTemperatureMean");
pub const UNKNOWN_MEASUREMENT: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("https://w3id.org/resonance/sri4building#UnknownMeasurement");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{SAREF4ENER, SRI4ALL, SRI4BUILDING, SRI4PV};

    #[test]
    fn constants_live_in_their_namespaces() {
        assert_eq!(POWER_VALUE.into_owned(), SRI4ALL.term("powerValue"));
        assert_eq!(PV_TIMESTAMP.into_owned(), SRI4PV.term("timestamp"));
        assert_eq!(COMMODITY_QUANTITY.into_owned(), SAREF4ENER.term("CommodityQuantity"));
        assert_eq!(UNKNOWN_MEASUREMENT.into_owned(), SRI4BUILDING.term("UnknownMeasurement"));
    }
}
