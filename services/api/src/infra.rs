use crate::images::ImageResolver;
use metrics_exporter_prometheus::PrometheusHandle;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use wheelchair_advisor::catalog::CatalogProvider;
use wheelchair_advisor::service::RecommendationService;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Everything the recommendation routes share across requests.
pub(crate) struct Advisor<P> {
    pub(crate) service: RecommendationService<P>,
    pub(crate) images: ImageResolver,
    rng: Mutex<StdRng>,
}

impl<P> Advisor<P>
where
    P: CatalogProvider + 'static,
{
    pub(crate) fn new(
        service: RecommendationService<P>,
        images: ImageResolver,
        seed: Option<u64>,
    ) -> Self {
        Self {
            service,
            images,
            rng: Mutex::new(seeded_rng(seed)),
        }
    }

    /// A panic while holding the generator leaves it in a usable state, so poisoning is ignored.
    pub(crate) fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Generator for one request, seeded from the shared one. The lock is released on return.
    pub(crate) fn request_rng(&self) -> StdRng {
        let seed: u64 = self.rng().gen();
        StdRng::seed_from_u64(seed)
    }
}

pub(crate) fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wheelchair_advisor::catalog::{Catalog, StaticCatalog};
    use wheelchair_advisor::config::ImageConfig;

    fn advisor(seed: Option<u64>) -> Advisor<StaticCatalog> {
        let service = RecommendationService::new(Arc::new(StaticCatalog::new(Catalog::default())));
        let images = ImageResolver::new(&ImageConfig {
            directory: "images".into(),
            max_bytes: 1024,
        });
        Advisor::new(service, images, seed)
    }

    #[test]
    fn request_generators_follow_the_configured_seed() {
        let first = advisor(Some(7));
        let second = advisor(Some(7));

        let a: u64 = first.request_rng().gen();
        let b: u64 = second.request_rng().gen();
        assert_eq!(a, b);

        let next: u64 = first.request_rng().gen();
        assert_ne!(a, next);
    }
}
