use crate::catalog::CatalogProvider;
use crate::conditions::{ConditionExtractor, ConditionSet};
use crate::recommend::{QuickPickCategory, Recommendation, RecommendError, RecommendationEngine};
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

/// Composes the catalog source, condition extractor, and recommendation engine.
pub struct RecommendationService<P> {
    catalog: Arc<P>,
    extractor: ConditionExtractor,
    engine: RecommendationEngine,
}

impl<P> RecommendationService<P>
where
    P: CatalogProvider + 'static,
{
    pub fn new(catalog: Arc<P>) -> Self {
        Self::with_parts(catalog, ConditionExtractor::default(), RecommendationEngine::default())
    }

    pub fn with_parts(
        catalog: Arc<P>,
        extractor: ConditionExtractor,
        engine: RecommendationEngine,
    ) -> Self {
        Self {
            catalog,
            extractor,
            engine,
        }
    }

    pub fn catalog(&self) -> &P {
        &self.catalog
    }

    pub fn extract(&self, query: &str) -> ConditionSet {
        let conditions = self.extractor.extract(query);
        debug!(?conditions, "conditions extracted");
        conditions
    }

    /// Free-text recommendation. A request nothing satisfies is reported as [`RecommendError::NoMatches`].
    pub fn recommend<R: Rng + ?Sized>(
        &self,
        query: &str,
        rng: &mut R,
    ) -> Result<Recommendation, RecommendError> {
        let conditions = self.extract(query);
        self.recommend_for(&conditions, rng)
    }

    pub fn recommend_for<R: Rng + ?Sized>(
        &self,
        conditions: &ConditionSet,
        rng: &mut R,
    ) -> Result<Recommendation, RecommendError> {
        let catalog = self.catalog.load()?;
        let recommendation = self.engine.recommend(conditions, &catalog, rng);
        if recommendation.is_empty() {
            return Err(RecommendError::NoMatches);
        }
        Ok(recommendation)
    }

    /// Quick pick by English tag or on-screen label.
    pub fn quick_pick<R: Rng + ?Sized>(
        &self,
        tag: &str,
        rng: &mut R,
    ) -> Result<Recommendation, RecommendError> {
        let category: QuickPickCategory = tag.parse()?;
        let catalog = self.catalog.load()?;
        self.engine.quick_pick(category, &catalog, rng)
    }
}
