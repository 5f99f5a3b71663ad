use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ValidationError;

/// Taxonomy of curated real-world events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventCategory {
    Conflict,
    Economic,
    OpecPolicy,
    Sanctions,
    Health,
}

impl EventCategory {
    pub const ALL: [Self; 5] = [
        Self::Conflict,
        Self::Economic,
        Self::OpecPolicy,
        Self::Sanctions,
        Self::Health,
    ];

    /// Spelling used by the events feed.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Conflict => "Conflict",
            Self::Economic => "Economic",
            Self::OpecPolicy => "OPEC Policy",
            Self::Sanctions => "Sanctions",
            Self::Health => "Health",
        }
    }
}

impl Display for EventCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "conflict" => Ok(Self::Conflict),
            "economic" => Ok(Self::Economic),
            "opec policy" | "opec_policy" | "opec-policy" => Ok(Self::OpecPolicy),
            "sanctions" => Ok(Self::Sanctions),
            "health" => Ok(Self::Health),
            _ => Err(ValidationError::InvalidCategory {
                value: value.to_owned(),
            }),
        }
    }
}

impl Serialize for EventCategory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(D::Error::custom)
    }
}

/// Category restriction applied to event candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(EventCategory),
}

impl CategoryFilter {
    /// Selector options in display order.
    pub const OPTIONS: [Self; 6] = [
        Self::All,
        Self::Only(EventCategory::Conflict),
        Self::Only(EventCategory::Economic),
        Self::Only(EventCategory::OpecPolicy),
        Self::Only(EventCategory::Sanctions),
        Self::Only(EventCategory::Health),
    ];

    pub fn matches(self, category: EventCategory) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => only == category,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Only(category) => category.as_str(),
        }
    }
}

impl Display for CategoryFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryFilter {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        value.parse().map(Self::Only)
    }
}

impl Serialize for CategoryFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CategoryFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(D::Error::custom)
    }
}
