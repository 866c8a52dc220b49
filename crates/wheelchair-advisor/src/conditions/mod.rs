//! Structured recommendation conditions inferred from a free-text request.

mod extractor;
mod keywords;

pub use extractor::{ConditionExtractor, SHORT_QUERY_MAX_WORDS};
pub use keywords::KeywordTables;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Body weight assumed when the request names a gender but no weight.
    pub const fn default_weight_kg(self) -> u32 {
        match self {
            Self::Male => 70,
            Self::Female => 55,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "남",
            Self::Female => "여",
        }
    }
}

/// Age bracket that narrows seat width and frame weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeTier {
    Senior,
    Active,
}

impl AgeTier {
    pub const fn for_age(age: u32) -> Option<Self> {
        match age {
            70..=u32::MAX => Some(Self::Senior),
            60..=69 => Some(Self::Active),
            _ => None,
        }
    }

    pub const fn seat_width_max_cm(self) -> u32 {
        match self {
            Self::Senior => 44,
            Self::Active => 42,
        }
    }

    pub const fn weight_max_kg(self) -> f64 {
        match self {
            Self::Senior => 16.0,
            Self::Active => 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Usage {
    VehicleMount,
}

/// Frame weight ceiling applied when the request asks for a light chair.
pub const LIGHT_REQUEST_WEIGHT_MAX_KG: f64 = 14.0;

/// Attributes inferred from a request. Absent fields were not mentioned.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Conditions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_tier: Option<AgeTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_width_max_cm: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_max_kg: Option<f64>,
    pub light_request: bool,
    pub large_request: bool,
    pub large_wheel_request: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl Conditions {
    /// Body weight driving the primary scoring tier.
    pub fn effective_weight_kg(&self) -> u32 {
        self.weight_kg.unwrap_or(DEFAULT_WEIGHT_KG)
    }

    fn only_age(&self) -> Option<u32> {
        let age = self.age?;
        let without_age = Self {
            age: None,
            ..self.clone()
        };
        (without_age == Self::default()).then_some(age)
    }
}

/// Body weight assumed when nothing in the request implies one.
pub const DEFAULT_WEIGHT_KG: u32 = 70;

/// Outcome of condition extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConditionSet {
    /// The request carried an age and nothing else worth acting on.
    AgeOnly { age: u32 },
    Full(Conditions),
}

impl ConditionSet {
    pub fn from_conditions(conditions: Conditions) -> Self {
        match conditions.only_age() {
            Some(age) => Self::AgeOnly { age },
            None => Self::Full(conditions),
        }
    }

    pub fn age(&self) -> Option<u32> {
        match self {
            Self::AgeOnly { age } => Some(*age),
            Self::Full(conditions) => conditions.age,
        }
    }

    pub fn as_full(&self) -> Option<&Conditions> {
        match self {
            Self::AgeOnly { .. } => None,
            Self::Full(conditions) => Some(conditions),
        }
    }
}

impl From<Conditions> for ConditionSet {
    fn from(conditions: Conditions) -> Self {
        Self::from_conditions(conditions)
    }
}
