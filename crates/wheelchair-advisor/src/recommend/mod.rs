//! Tiered scoring, hard filters, and randomized top-N selection over the catalog.

mod quick_pick;
mod scoring;
mod selection;

pub use quick_pick::{QuickPickCategory, QUICK_PICK_SIZE};
pub use scoring::{
    vehicle_weight_band_bonus, PrimaryTier, ScoreComponent, ScoreFactor, ScoredEntry,
    VEHICLE_MOUNT_MAX_WEIGHT_KG,
};
pub use selection::HEAVY_USER_LARGE_PICKS;

use crate::catalog::{tags, Catalog, CatalogError};
use crate::conditions::{ConditionSet, Conditions, Usage};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

/// Rows returned by a free-text recommendation.
pub const RECOMMENDATION_LIMIT: usize = 3;

/// Which selection rule produced a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "strategy")]
pub enum Strategy {
    /// Random basic models for an age-only request.
    BasicForAge,
    /// Filtered and ranked by score.
    Ranked { tier: PrimaryTier },
    /// Fixed two large frames plus one basic model.
    HeavyUser,
    QuickPick { category: QuickPickCategory },
}

/// Ranked picks plus the rule that selected them.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub strategy: Strategy,
    pub picks: Vec<ScoredEntry>,
}

impl Recommendation {
    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.picks
            .iter()
            .map(|scored| scored.entry.name.as_str())
            .collect()
    }
}

/// Reasons a recommendation request yields no rows.
#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("no catalog entry satisfies the request")]
    NoMatches,
    #[error("unknown quick-pick category {0:?}")]
    InvalidCategory(String),
    #[error("quick pick '{category}' needs {required} matching products, found {found}")]
    InsufficientMatches {
        category: QuickPickCategory,
        required: usize,
        found: usize,
    },
    #[error(transparent)]
    CatalogUnavailable(#[from] CatalogError),
}

/// Stateless engine; every call works on the catalog it is handed.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    limit: usize,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(RECOMMENDATION_LIMIT)
    }
}

impl RecommendationEngine {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Pick up to `limit` products for the conditions. An empty result is a valid outcome.
    pub fn recommend<R: Rng + ?Sized>(
        &self,
        conditions: &ConditionSet,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Recommendation {
        let recommendation = match conditions {
            ConditionSet::AgeOnly { .. } => self.basic_for_age(catalog, rng),
            ConditionSet::Full(conditions) => self.ranked(conditions, catalog, rng),
        };

        debug!(
            strategy = ?recommendation.strategy,
            picks = ?recommendation.names(),
            "recommendation selected"
        );
        recommendation
    }

    /// Primary tier and vehicle bonus for every eligible entry, before hard filters.
    pub fn score(
        &self,
        conditions: &Conditions,
        catalog: &Catalog,
    ) -> (PrimaryTier, Vec<ScoredEntry>) {
        let tier = PrimaryTier::for_conditions(conditions);
        let mut pool: Vec<ScoredEntry> = catalog
            .entries()
            .iter()
            .filter(|entry| {
                !conditions.large_wheel_request || entry.has_keyword(tags::LARGE_WHEEL)
            })
            .cloned()
            .map(ScoredEntry::new)
            .collect();

        scoring::apply_primary_tier(tier, &mut pool);
        if tier != PrimaryTier::HeavyUser && conditions.usage == Some(Usage::VehicleMount) {
            scoring::apply_vehicle_mount(&mut pool);
        }

        (tier, pool)
    }

    pub fn quick_pick<R: Rng + ?Sized>(
        &self,
        category: QuickPickCategory,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Result<Recommendation, RecommendError> {
        let picks = category.sample(catalog, rng)?;
        Ok(Recommendation {
            strategy: Strategy::QuickPick { category },
            picks,
        })
    }

    fn basic_for_age<R: Rng + ?Sized>(&self, catalog: &Catalog, rng: &mut R) -> Recommendation {
        let mut picks: Vec<ScoredEntry> = catalog
            .entries()
            .iter()
            .filter(|entry| entry.has_keyword(tags::BASIC))
            .cloned()
            .map(ScoredEntry::new)
            .collect();
        picks.shuffle(rng);
        picks.truncate(self.limit);

        Recommendation {
            strategy: Strategy::BasicForAge,
            picks,
        }
    }

    fn ranked<R: Rng + ?Sized>(
        &self,
        conditions: &Conditions,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Recommendation {
        let (tier, mut pool) = self.score(conditions, catalog);

        if pool.is_empty() {
            debug!(large_wheel = conditions.large_wheel_request, "no eligible products to score");
            return Recommendation {
                strategy: Strategy::Ranked { tier },
                picks: Vec::new(),
            };
        }

        if tier == PrimaryTier::HeavyUser {
            return Recommendation {
                strategy: Strategy::HeavyUser,
                picks: selection::heavy_user_split(pool, rng),
            };
        }

        let weight_cap = tier.weight_cap_kg();
        if weight_cap != conditions.weight_max_kg {
            debug!(
                extracted = ?conditions.weight_max_kg,
                applied = ?weight_cap,
                "scoring tier replaced frame weight ceiling"
            );
        }
        selection::retain_within_limits(&mut pool, weight_cap, conditions.seat_width_max_cm);

        Recommendation {
            strategy: Strategy::Ranked { tier },
            picks: selection::top_ranked(pool, self.limit, rng),
        }
    }
}
