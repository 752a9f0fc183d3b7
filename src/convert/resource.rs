//! Resource type tags

use super::tables::{ConversionRule, BUILDING_ROWS, PV_MEASUREMENTS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The kind of resource a record describes.
///
/// Fixed when a record is submitted; selects both the conversion rule and
/// the output topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Ev,
    Pv,
    Hvac,
    Building,
    Weather,
}

/// A tag that names none of the known resource types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown resource type '{0}'")]
pub struct UnknownResourceType(pub String);

impl ResourceType {
    pub const ALL: [ResourceType; 5] = [
        ResourceType::Ev,
        ResourceType::Pv,
        ResourceType::Hvac,
        ResourceType::Building,
        ResourceType::Weather,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ev => "ev",
            Self::Pv => "pv",
            Self::Hvac => "hvac",
            Self::Building => "building",
            Self::Weather => "weather",
        }
    }

    /// How records of this type are turned into triples.
    pub fn rule(&self) -> ConversionRule {
        match self {
            Self::Pv => ConversionRule::Measurements(&PV_MEASUREMENTS),
            Self::Building => ConversionRule::Rows(&BUILDING_ROWS),
            Self::Ev | Self::Hvac | Self::Weather => ConversionRule::Unsupported,
        }
    }
}

impl FromStr for ResourceType {
    type Err = UnknownResourceType;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == tag)
            .ok_or_else(|| UnknownResourceType(s.to_string()))
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_known_tag() {
        for t in ResourceType::ALL {
            assert_eq!(t.as_str().parse::<ResourceType>().unwrap(), t);
        }
    }

    #[test]
    fn parsing_ignores_case_and_whitespace() {
        assert_eq!("PV".parse::<ResourceType>().unwrap(), ResourceType::Pv);
        assert_eq!(" Building\n".parse::<ResourceType>().unwrap(), ResourceType::Building);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = "xyz".parse::<ResourceType>().unwrap_err();
        assert_eq!(err, UnknownResourceType("xyz".to_string()));
    }

    #[test]
    fn only_pv_and_building_have_rules() {
        assert!(matches!(ResourceType::Pv.rule(), ConversionRule::Measurements(_)));
        assert!(matches!(ResourceType::Building.rule(), ConversionRule::Rows(_)));
        for t in [ResourceType::Ev, ResourceType::Hvac, ResourceType::Weather] {
            assert!(matches!(t.rule(), ConversionRule::Unsupported));
        }
    }

    #[test]
    fn serde_uses_lowercase_tags() {
        let json = serde_json::to_string(&ResourceType::Hvac).unwrap();
        assert_eq!(json, "\"hvac\"");
        let parsed: ResourceType = serde_json::from_str("\"weather\"").unwrap();
        assert_eq!(parsed, ResourceType::Weather);
    }
}
