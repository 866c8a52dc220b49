use crate::catalog::{tags, CatalogEntry};
use crate::conditions::{Conditions, Gender};
use serde::Serialize;

/// Heaviest frame that still counts as car-portable.
pub const VEHICLE_MOUNT_MAX_WEIGHT_KG: f64 = 13.3;

/// Which rule produced a score contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    LightweightType,
    FrameWeight,
    BasicType,
    FemaleLightweight,
    LargeFrame,
    VehicleMount,
    VehicleWeightBand,
}

/// Discrete contribution to a product's score, kept for explanations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub score: i16,
    pub notes: String,
}

/// Catalog entry together with the score it earned for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntry {
    pub entry: CatalogEntry,
    pub score: i16,
    pub components: Vec<ScoreComponent>,
}

impl ScoredEntry {
    pub fn new(entry: CatalogEntry) -> Self {
        Self {
            entry,
            score: 0,
            components: Vec::new(),
        }
    }

    fn award(&mut self, factor: ScoreFactor, score: i16, notes: String) {
        self.score += score;
        self.components.push(ScoreComponent {
            factor,
            score,
            notes,
        });
    }

    pub fn score_for(&self, factor: ScoreFactor) -> i16 {
        self.components
            .iter()
            .filter(|component| component.factor == factor)
            .map(|component| component.score)
            .sum()
    }
}

/// Mutually exclusive first-stage scoring policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PrimaryTier {
    /// Explicit light request, or a user at or under 50 kg.
    Lightweight,
    /// 51 to 80 kg. Women also get a nudge toward lightweight frames.
    Standard { female: bool },
    /// Over 80 kg. Selection switches to a fixed large/basic split.
    HeavyUser,
}

impl PrimaryTier {
    pub fn for_conditions(conditions: &Conditions) -> Self {
        if conditions.light_request {
            return Self::Lightweight;
        }

        match conditions.effective_weight_kg() {
            0..=50 => Self::Lightweight,
            51..=80 => Self::Standard {
                female: conditions.gender == Some(Gender::Female),
            },
            _ => Self::HeavyUser,
        }
    }

    /// Frame weight ceiling the tier enforces, replacing any extracted one.
    pub const fn weight_cap_kg(self) -> Option<f64> {
        match self {
            Self::Lightweight => Some(14.0),
            Self::Standard { .. } => Some(16.0),
            Self::HeavyUser => None,
        }
    }
}

pub(crate) fn apply_primary_tier(tier: PrimaryTier, pool: &mut [ScoredEntry]) {
    match tier {
        PrimaryTier::Lightweight => apply_lightweight(pool),
        PrimaryTier::Standard { female } => apply_standard(pool, female),
        PrimaryTier::HeavyUser => apply_large_frame(pool),
    }
}

fn apply_lightweight(pool: &mut [ScoredEntry]) {
    for scored in pool.iter_mut() {
        if scored.entry.has_keyword(tags::LIGHTWEIGHT) {
            scored.award(
                ScoreFactor::LightweightType,
                8,
                format!("tagged {}", tags::LIGHTWEIGHT),
            );
        }

        let weight = scored.entry.weight_max();
        for (threshold, bonus) in [(13.0, 3), (12.0, 2), (11.0, 1)] {
            if weight <= threshold {
                scored.award(
                    ScoreFactor::FrameWeight,
                    bonus,
                    format!("frame {weight} kg within {threshold} kg"),
                );
            }
        }
    }
}

fn apply_standard(pool: &mut [ScoredEntry], female: bool) {
    for scored in pool.iter_mut() {
        if scored.entry.has_keyword(tags::BASIC) {
            scored.award(ScoreFactor::BasicType, 8, format!("tagged {}", tags::BASIC));
        }
        if female && scored.entry.has_keyword(tags::LIGHTWEIGHT) {
            scored.award(
                ScoreFactor::FemaleLightweight,
                4,
                format!("tagged {} for a female user", tags::LIGHTWEIGHT),
            );
        }
    }
}

fn apply_large_frame(pool: &mut [ScoredEntry]) {
    for scored in pool.iter_mut() {
        if scored.entry.is_large_frame() {
            let weight = scored.entry.weight_max();
            scored.award(
                ScoreFactor::LargeFrame,
                8,
                format!("large frame at {weight} kg"),
            );
        }
    }
}

/// Exactly one band applies: lower bound exclusive, upper bound inclusive.
pub fn vehicle_weight_band_bonus(weight_max: f64) -> Option<i16> {
    if weight_max <= 11.0 {
        Some(4)
    } else if weight_max <= 12.0 {
        Some(3)
    } else if weight_max <= 13.0 {
        Some(2)
    } else if weight_max <= VEHICLE_MOUNT_MAX_WEIGHT_KG {
        Some(1)
    } else {
        None
    }
}

pub(crate) fn apply_vehicle_mount(pool: &mut [ScoredEntry]) {
    for scored in pool.iter_mut() {
        let weight = scored.entry.weight_max();
        if weight > VEHICLE_MOUNT_MAX_WEIGHT_KG || !scored.entry.has_keyword(tags::VEHICLE_MOUNT) {
            continue;
        }

        scored.award(
            ScoreFactor::VehicleMount,
            3,
            format!("tagged {} within {VEHICLE_MOUNT_MAX_WEIGHT_KG} kg", tags::VEHICLE_MOUNT),
        );
        if let Some(bonus) = vehicle_weight_band_bonus(weight) {
            scored.award(
                ScoreFactor::VehicleWeightBand,
                bonus,
                format!("vehicle weight band for {weight} kg"),
            );
        }
    }
}
