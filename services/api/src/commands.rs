use crate::infra::seeded_rng;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use wheelchair_advisor::catalog::{CsvCatalog, WeightCell};
use wheelchair_advisor::conditions::ConditionSet;
use wheelchair_advisor::config::AppConfig;
use wheelchair_advisor::error::AppError;
use wheelchair_advisor::recommend::{RecommendError, Recommendation, ScoreComponent, Strategy};
use wheelchair_advisor::service::RecommendationService;

#[derive(Args, Debug)]
pub(crate) struct RecommendArgs {
    /// Free-text request, e.g. "70대 여성 45kg"
    pub(crate) query: String,
    /// Catalog CSV (defaults to APP_CATALOG_PATH)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Seed for reproducible tie-breaking
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Print the conditions and picks as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct QuickPickArgs {
    /// Category tag (male, female, basic, lightweight, large) or its Korean label
    pub(crate) category: String,
    /// Catalog CSV (defaults to APP_CATALOG_PATH)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Seed for reproducible sampling
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Print the picks as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

fn build_service(
    catalog: Option<PathBuf>,
    seed: Option<u64>,
) -> Result<(RecommendationService<CsvCatalog>, Option<u64>), AppError> {
    let config = AppConfig::load()?;
    let path = catalog.unwrap_or(config.catalog.path);
    let service = RecommendationService::new(Arc::new(CsvCatalog::new(path)));
    Ok((service, seed.or(config.random_seed)))
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let RecommendArgs {
        query,
        catalog,
        seed,
        json,
    } = args;
    let (service, seed) = build_service(catalog, seed)?;
    let mut rng = seeded_rng(seed);

    let conditions = service.extract(&query);
    let outcome = service.recommend_for(&conditions, &mut rng);
    if json {
        println!("{}", render_report(Some(&conditions), outcome)?);
        return Ok(());
    }

    println!("Request: {query}");
    println!("{}", render_conditions(&conditions));
    println!("{}", render_outcome(outcome)?);
    Ok(())
}

pub(crate) fn run_quick_pick(args: QuickPickArgs) -> Result<(), AppError> {
    let QuickPickArgs {
        category,
        catalog,
        seed,
        json,
    } = args;
    let (service, seed) = build_service(catalog, seed)?;
    let mut rng = seeded_rng(seed);

    let outcome = service.quick_pick(&category, &mut rng);
    if json {
        println!("{}", render_report(None, outcome)?);
        return Ok(());
    }

    println!("Quick pick: {category}");
    println!("{}", render_outcome(outcome)?);
    Ok(())
}

pub(crate) fn render_conditions(conditions: &ConditionSet) -> String {
    let conditions = match conditions {
        ConditionSet::AgeOnly { age } => {
            return format!("Conditions: age {age} only (random basic models)");
        }
        ConditionSet::Full(conditions) => conditions,
    };

    let mut lines = vec!["Conditions:".to_string()];
    if let Some(gender) = conditions.gender {
        lines.push(format!("  gender: {}", gender.label()));
    }
    match conditions.weight_kg {
        Some(weight) => lines.push(format!("  body weight: {weight} kg")),
        None => lines.push(format!(
            "  body weight: {} kg (assumed)",
            conditions.effective_weight_kg()
        )),
    }
    if let Some(age) = conditions.age {
        lines.push(format!("  age: {age}"));
    }
    if let Some(width) = conditions.seat_width_max_cm {
        lines.push(format!("  seat width <= {width} cm"));
    }
    if let Some(weight) = conditions.weight_max_kg {
        lines.push(format!("  frame weight <= {weight} kg"));
    }
    let flags: Vec<&str> = [
        (conditions.light_request, "light"),
        (conditions.large_request, "large"),
        (conditions.large_wheel_request, "large wheel"),
        (conditions.usage.is_some(), "vehicle"),
    ]
    .into_iter()
    .filter_map(|(set, label)| set.then_some(label))
    .collect();
    if !flags.is_empty() {
        lines.push(format!("  requests: {}", flags.join(", ")));
    }
    lines.join("\n")
}

/// Catalog failures abort the command; other outcomes are reported the way the API reports them.
pub(crate) fn render_outcome(
    outcome: Result<Recommendation, RecommendError>,
) -> Result<String, AppError> {
    let recommendation = match outcome {
        Ok(recommendation) => recommendation,
        Err(RecommendError::CatalogUnavailable(err)) => return Err(AppError::Catalog(err)),
        Err(err) => return Ok(err.user_message()),
    };

    let mut lines = vec![format!("Strategy: {:?}", recommendation.strategy)];
    for (rank, scored) in recommendation.picks.iter().enumerate() {
        let entry = &scored.entry;
        lines.push(format!(
            "{}. {} ({}) weight {} seat {} score {}",
            rank + 1,
            entry.name,
            entry.manufacturer,
            entry.weight,
            entry.seat_width.as_deref().unwrap_or("-"),
            scored.score
        ));
        for component in &scored.components {
            lines.push(format!(
                "     {:+} {:?}: {}",
                component.score, component.factor, component.notes
            ));
        }
    }
    Ok(lines.join("\n"))
}

#[derive(Serialize)]
struct OutcomeReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    conditions: Option<&'a ConditionSet>,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(flatten)]
    strategy: Option<&'a Strategy>,
    picks: Vec<PickReport<'a>>,
}

#[derive(Serialize)]
struct PickReport<'a> {
    rank: usize,
    name: &'a str,
    manufacturer: &'a str,
    weight: &'a WeightCell,
    #[serde(rename = "seatWidth", skip_serializing_if = "Option::is_none")]
    seat_width: Option<&'a str>,
    score: i16,
    components: &'a [ScoreComponent],
}

/// JSON counterpart of [`render_outcome`], carrying the selection strategy and score breakdown.
pub(crate) fn render_report(
    conditions: Option<&ConditionSet>,
    outcome: Result<Recommendation, RecommendError>,
) -> Result<String, AppError> {
    let (recommendation, message) = match outcome {
        Ok(recommendation) => (Some(recommendation), None),
        Err(RecommendError::CatalogUnavailable(err)) => return Err(AppError::Catalog(err)),
        Err(err) => (None, Some(err.user_message())),
    };

    let picks = recommendation
        .iter()
        .flat_map(|recommendation| recommendation.picks.iter())
        .enumerate()
        .map(|(index, scored)| PickReport {
            rank: index + 1,
            name: &scored.entry.name,
            manufacturer: &scored.entry.manufacturer,
            weight: &scored.entry.weight,
            seat_width: scored.entry.seat_width.as_deref(),
            score: scored.score,
            components: &scored.components,
        })
        .collect();

    let report = OutcomeReport {
        conditions,
        success: recommendation.is_some(),
        message,
        strategy: recommendation.as_ref().map(|recommendation| &recommendation.strategy),
        picks,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;
    use wheelchair_advisor::conditions::{Conditions, Gender};

    #[test]
    fn renders_age_only_and_full_conditions() {
        assert!(render_conditions(&ConditionSet::AgeOnly { age: 80 }).contains("age 80 only"));

        let rendered = render_conditions(&ConditionSet::Full(Conditions {
            gender: Some(Gender::Female),
            light_request: true,
            ..Conditions::default()
        }));
        assert!(rendered.contains("gender: 여"));
        assert!(rendered.contains("body weight: 70 kg (assumed)"));
        assert!(rendered.contains("requests: light"));
    }

    #[test]
    fn renders_score_breakdown_from_a_csv_catalog() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "제품명,제조사,무게(kg),좌폭(cm),추천 키워드1,추천 키워드2,추천 키워드3\n\
에어라이트 11,에어텍,10.8,40,경량형,차량탑재,"
        )
        .expect("write catalog");

        let service = RecommendationService::new(Arc::new(CsvCatalog::new(file.path())));
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = service.recommend("가벼운 휠체어", &mut rng);
        let rendered = render_outcome(outcome).expect("catalog readable");

        assert!(rendered.contains("1. 에어라이트 11 (에어텍) weight 10.8 seat 40 score 14"));
        assert!(rendered.contains("+8 LightweightType"));
    }

    #[test]
    fn json_report_carries_strategy_and_tier() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "제품명,제조사,무게(kg),좌폭(cm),추천 키워드1,추천 키워드2,추천 키워드3\n\
에어라이트 11,에어텍,10.8,40,경량형,차량탑재,\n\
스탠다드 14,대세,14,42,경량형,,"
        )
        .expect("write catalog");

        let service = RecommendationService::new(Arc::new(CsvCatalog::new(file.path())));
        let mut rng = StdRng::seed_from_u64(1);
        let conditions = service.extract("가벼운 휠체어");
        let outcome = service.recommend_for(&conditions, &mut rng);
        let rendered = render_report(Some(&conditions), outcome).expect("catalog readable");
        let report: serde_json::Value = serde_json::from_str(&rendered).expect("valid json");

        assert_eq!(report["success"], true);
        assert_eq!(report["strategy"], "ranked");
        assert_eq!(report["tier"]["kind"], "lightweight");
        assert_eq!(report["conditions"]["kind"], "full");
        assert_eq!(report["picks"][0]["name"], "에어라이트 11");
        assert_eq!(report["picks"][0]["weight"], 10.8);
        assert_eq!(report["picks"][0]["components"][0]["factor"], "lightweight_type");
        assert_eq!(report["picks"][1]["weight"], 14);
    }

    #[test]
    fn json_report_explains_rejected_requests() {
        let service = RecommendationService::new(Arc::new(CsvCatalog::new("absent/catalog.csv")));
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = service.quick_pick("medium", &mut rng);
        let rendered = render_report(None, outcome).expect("rejected before loading");
        let report: serde_json::Value = serde_json::from_str(&rendered).expect("valid json");

        assert_eq!(report["success"], false);
        assert!(report["message"].is_string());
        assert!(report.get("strategy").is_none());
        assert!(report.get("conditions").is_none());
        assert_eq!(report["picks"], serde_json::json!([]));
    }

    #[test]
    fn missing_catalog_aborts_rendering() {
        let service = RecommendationService::new(Arc::new(CsvCatalog::new("absent/catalog.csv")));
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = service.quick_pick("basic", &mut rng);
        assert!(matches!(render_outcome(outcome), Err(AppError::Catalog(_))));
    }
}
