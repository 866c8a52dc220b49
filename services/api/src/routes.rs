use crate::images::{ImageLookup, IMAGE_CACHE_CONTROL};
use crate::infra::{Advisor, AppState};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{info, warn};
use wheelchair_advisor::catalog::CatalogProvider;
use wheelchair_advisor::recommend::{RecommendError, Recommendation};
use wheelchair_advisor::response::{RecommendationResponse, UNEXPECTED_ERROR_PREFIX};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RecommendRequest {
    #[serde(default)]
    pub(crate) query: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct QuickRecommendRequest {
    #[serde(default, rename = "type")]
    pub(crate) category: String,
}

pub(crate) fn recommendation_router<P>(advisor: Arc<Advisor<P>>) -> Router
where
    P: CatalogProvider + 'static,
{
    Router::new()
        .route("/api/recommend", post(recommend_endpoint::<P>))
        .route("/api/quick-recommend", post(quick_recommend_endpoint::<P>))
        .route("/static/images/*file", get(image_endpoint::<P>))
        .with_state(advisor)
}

pub(crate) fn with_recommendation_routes<P>(advisor: Arc<Advisor<P>>) -> Router
where
    P: CatalogProvider + 'static,
{
    recommendation_router(advisor)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn recommend_endpoint<P>(
    State(advisor): State<Arc<Advisor<P>>>,
    Json(request): Json<RecommendRequest>,
) -> Json<RecommendationResponse>
where
    P: CatalogProvider + 'static,
{
    let mut rng = advisor.request_rng();
    let worker = Arc::clone(&advisor);
    // Catalog loads hit the filesystem; keep them off the async workers.
    let joined = tokio::task::spawn_blocking(move || {
        worker.service.recommend(&request.query, &mut rng)
    })
    .await;
    respond("recommend", &advisor, joined)
}

pub(crate) async fn quick_recommend_endpoint<P>(
    State(advisor): State<Arc<Advisor<P>>>,
    Json(request): Json<QuickRecommendRequest>,
) -> Json<RecommendationResponse>
where
    P: CatalogProvider + 'static,
{
    let mut rng = advisor.request_rng();
    let worker = Arc::clone(&advisor);
    let joined = tokio::task::spawn_blocking(move || {
        worker.service.quick_pick(&request.category, &mut rng)
    })
    .await;
    respond("quick_recommend", &advisor, joined)
}

fn respond<P>(
    endpoint: &'static str,
    advisor: &Advisor<P>,
    joined: Result<Result<Recommendation, RecommendError>, JoinError>,
) -> Json<RecommendationResponse>
where
    P: CatalogProvider + 'static,
{
    match joined {
        Ok(outcome) => {
            log_outcome(endpoint, &outcome);
            Json(RecommendationResponse::from_outcome(outcome, |name| {
                advisor.images.resolve(name)
            }))
        }
        Err(err) => {
            warn!(endpoint, error = %err, "recommendation task failed");
            Json(RecommendationResponse::failure(format!(
                "{UNEXPECTED_ERROR_PREFIX}{err}"
            )))
        }
    }
}

fn log_outcome(endpoint: &'static str, outcome: &Result<Recommendation, RecommendError>) {
    match outcome {
        Ok(recommendation) => info!(
            endpoint,
            strategy = ?recommendation.strategy,
            picks = recommendation.picks.len(),
            "recommendation served"
        ),
        Err(RecommendError::CatalogUnavailable(err)) => {
            warn!(endpoint, error = %err, "catalog unavailable")
        }
        Err(err) => info!(endpoint, reason = %err, "no recommendation"),
    }
}

pub(crate) async fn image_endpoint<P>(
    State(advisor): State<Arc<Advisor<P>>>,
    Path(file): Path<String>,
) -> Response
where
    P: CatalogProvider + 'static,
{
    match advisor.images.lookup(&file) {
        ImageLookup::Found(path) => match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let mime = mime_guess::from_path(&path).first_or_octet_stream();
                (
                    StatusCode::OK,
                    [
                        (header::CONTENT_TYPE, mime.to_string()),
                        (header::CACHE_CONTROL, IMAGE_CACHE_CONTROL.to_string()),
                    ],
                    bytes,
                )
                    .into_response()
            }
            Err(err) => {
                warn!(file = %file, error = %err, "image read failed");
                StatusCode::NOT_FOUND.into_response()
            }
        },
        ImageLookup::TooLarge { bytes } => {
            warn!(file = %file, bytes, "image exceeds size limit");
            (StatusCode::PAYLOAD_TOO_LARGE, "이미지 파일이 너무 큽니다").into_response()
        }
        ImageLookup::Missing => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::ImageResolver;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::fs;
    use std::sync::atomic::AtomicBool;
    use std::time::{Duration, Instant};
    use tower::ServiceExt;
    use wheelchair_advisor::catalog::{Catalog, CatalogError, CsvCatalog, StaticCatalog};
    use wheelchair_advisor::config::ImageConfig;
    use wheelchair_advisor::service::RecommendationService;

    const CATALOG: &str = "제품명,제조사,무게(kg),좌폭(cm),추천 키워드1,추천 키워드2,추천 키워드3\n\
MSL-T(24),미키코리아,16.5,\"43, 46\",기본형,대형휠,\n\
MSL-200,미키코리아,15.5,42-44,기본형,,\n\
스탠다드 A,미키코리아,14.8,44,기본형,,\n\
트래블 13,대세엠케어,13.3~14.2,42,경량형,,\n";

    fn images(directory: &std::path::Path) -> ImageResolver {
        ImageResolver::new(&ImageConfig {
            directory: directory.to_path_buf(),
            max_bytes: 32,
        })
    }

    fn app_state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        }
    }

    fn router_with<P: CatalogProvider + 'static>(provider: P, image_dir: &std::path::Path) -> Router {
        let service = RecommendationService::new(Arc::new(provider));
        let advisor = Arc::new(Advisor::new(service, images(image_dir), Some(7)));
        with_recommendation_routes(advisor).layer(Extension(app_state(true)))
    }

    fn static_router(image_dir: &std::path::Path) -> Router {
        let catalog = Catalog::from_reader(CATALOG.as_bytes()).expect("catalog parses");
        router_with(StaticCatalog::new(catalog), image_dir)
    }

    /// Catalog whose loads block the calling thread, like a slow disk.
    struct SlowCatalog {
        catalog: Arc<Catalog>,
        delay: Duration,
    }

    impl CatalogProvider for SlowCatalog {
        fn load(&self) -> Result<Arc<Catalog>, CatalogError> {
            std::thread::sleep(self.delay);
            Ok(Arc::clone(&self.catalog))
        }
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body collects");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn recommend_returns_products_with_images() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("MSL-T-24.png"), b"png").expect("write image");
        let router = static_router(dir.path());

        let response = router
            .oneshot(post_json("/api/recommend", json!({ "query": "80대" })))
            .await
            .expect("request succeeds");
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["success"], json!(true));
        let products = body["recommendations"].as_array().expect("array");
        assert_eq!(products.len(), 3);
        let msl = products
            .iter()
            .find(|product| product["name"] == json!("MSL-T(24)"))
            .expect("all basic rows returned");
        assert_eq!(msl["image"], json!("/static/images/MSL-T-24.png"));
        assert_eq!(msl["seatWidth"], json!("43, 46"));
        assert_eq!(msl["weight"], json!(16.5));
    }

    #[tokio::test]
    async fn empty_results_still_answer_ok() {
        let dir = tempfile::tempdir().expect("tempdir");
        let router = static_router(dir.path());

        let response = router
            .oneshot(post_json("/api/recommend", json!({ "query": "큰 바퀴 남성" })))
            .await
            .expect("request succeeds");
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("조건에 맞는 휠체어를 찾을 수 없습니다."));
    }

    #[tokio::test]
    async fn missing_query_is_treated_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let router = static_router(dir.path());

        let response = router
            .oneshot(post_json("/api/recommend", json!({})))
            .await
            .expect("request succeeds");
        let body = json_body(response).await;
        assert_eq!(body["success"], json!(true));
    }

    #[tokio::test]
    async fn quick_recommend_reports_invalid_and_insufficient_categories() {
        let dir = tempfile::tempdir().expect("tempdir");

        let invalid = static_router(dir.path())
            .oneshot(post_json("/api/quick-recommend", json!({ "type": "초경량" })))
            .await
            .expect("request succeeds");
        assert_eq!(invalid.status(), StatusCode::OK);
        assert_eq!(json_body(invalid).await["message"], json!("잘못된 추천 유형입니다."));

        let short = static_router(dir.path())
            .oneshot(post_json("/api/quick-recommend", json!({ "type": "경량형" })))
            .await
            .expect("request succeeds");
        let body = json_body(short).await;
        assert_eq!(body["success"], json!(false));
        assert!(body["message"]
            .as_str()
            .expect("message string")
            .contains("필요 3개"));
    }

    #[tokio::test]
    async fn quick_recommend_samples_three_basic_models() {
        let dir = tempfile::tempdir().expect("tempdir");
        let response = static_router(dir.path())
            .oneshot(post_json("/api/quick-recommend", json!({ "type": "basic" })))
            .await
            .expect("request succeeds");
        let body = json_body(response).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["recommendations"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn unavailable_catalog_is_reported_in_the_envelope() {
        let dir = tempfile::tempdir().expect("tempdir");
        let router = router_with(CsvCatalog::new(dir.path().join("absent.csv")), dir.path());

        let response = router
            .oneshot(post_json("/api/recommend", json!({ "query": "80대" })))
            .await
            .expect("request succeeds");
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], json!(false));
        assert!(body["message"]
            .as_str()
            .expect("message string")
            .starts_with("오류가 발생했습니다: "));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn slow_catalog_loads_overlap_across_requests() {
        const DELAY: Duration = Duration::from_millis(300);
        let dir = tempfile::tempdir().expect("tempdir");
        let catalog = Catalog::from_reader(CATALOG.as_bytes()).expect("catalog parses");
        let router = router_with(
            SlowCatalog {
                catalog: Arc::new(catalog),
                delay: DELAY,
            },
            dir.path(),
        );

        let started = Instant::now();
        let requests: Vec<_> = (0..4)
            .map(|_| {
                let router = router.clone();
                tokio::spawn(async move {
                    router
                        .oneshot(post_json("/api/recommend", json!({ "query": "80대" })))
                        .await
                })
            })
            .collect();
        for request in requests {
            let response = request
                .await
                .expect("task joins")
                .expect("request succeeds");
            assert_eq!(json_body(response).await["success"], json!(true));
        }

        let elapsed = started.elapsed();
        assert!(
            elapsed < DELAY * 3,
            "four requests took {elapsed:?}; loads ran one after another"
        );
    }

    #[tokio::test]
    async fn serves_images_with_cache_headers() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("MSL-T-24.png"), b"png").expect("write image");
        fs::write(dir.path().join("huge.png"), vec![0u8; 64]).expect("write image");

        let ok = static_router(dir.path())
            .oneshot(
                Request::get("/static/images/MSL-T-24.png")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("request succeeds");
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(ok.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(ok.headers()[header::CACHE_CONTROL], IMAGE_CACHE_CONTROL);

        let large = static_router(dir.path())
            .oneshot(
                Request::get("/static/images/huge.png")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("request succeeds");
        assert_eq!(large.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let missing = static_router(dir.path())
            .oneshot(
                Request::get("/static/images/none.png")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("request succeeds");
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_and_readiness_report_status() {
        let dir = tempfile::tempdir().expect("tempdir");
        let health = static_router(dir.path())
            .oneshot(Request::get("/health").body(Body::empty()).expect("request builds"))
            .await
            .expect("request succeeds");
        assert_eq!(json_body(health).await, json!({ "status": "ok" }));

        let catalog = Catalog::from_reader(CATALOG.as_bytes()).expect("catalog parses");
        let service = RecommendationService::new(Arc::new(StaticCatalog::new(catalog)));
        let advisor = Arc::new(Advisor::new(service, images(dir.path()), None));
        let initializing = with_recommendation_routes(advisor)
            .layer(Extension(app_state(false)))
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request builds"))
            .await
            .expect("request succeeds");
        assert_eq!(initializing.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
