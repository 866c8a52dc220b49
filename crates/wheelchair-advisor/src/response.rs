use crate::catalog::{CatalogEntry, WeightCell};
use crate::recommend::{Recommendation, RecommendError};
use serde::Serialize;

pub const NO_MATCH_MESSAGE: &str = "조건에 맞는 휠체어를 찾을 수 없습니다.";
pub const INVALID_CATEGORY_MESSAGE: &str = "잘못된 추천 유형입니다.";
/// Prefix for failures outside the recommendation rules, followed by the error text.
pub const UNEXPECTED_ERROR_PREFIX: &str = "오류가 발생했습니다: ";

/// Public shape of one recommended product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationView {
    pub name: String,
    pub manufacturer: String,
    pub weight: WeightCell,
    #[serde(rename = "seatWidth")]
    pub seat_width: Option<String>,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl RecommendationView {
    pub fn from_entry(entry: &CatalogEntry, image: Option<String>) -> Self {
        Self {
            name: entry.name.clone(),
            manufacturer: entry.manufacturer.clone(),
            weight: entry.weight.clone(),
            seat_width: entry.seat_width.clone(),
            keywords: entry.keywords.clone(),
            image,
        }
    }
}

/// Envelope returned for both free-text and quick-pick requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<RecommendationView>>,
}

impl RecommendationResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            recommendations: None,
        }
    }

    /// Translate an engine outcome, resolving an image path per product name.
    pub fn from_outcome<F>(outcome: Result<Recommendation, RecommendError>, mut resolve_image: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        match outcome {
            Ok(recommendation) if recommendation.is_empty() => Self::failure(NO_MATCH_MESSAGE),
            Ok(recommendation) => Self {
                success: true,
                message: None,
                recommendations: Some(
                    recommendation
                        .picks
                        .iter()
                        .map(|scored| {
                            let image = resolve_image(&scored.entry.name);
                            RecommendationView::from_entry(&scored.entry, image)
                        })
                        .collect(),
                ),
            },
            Err(error) => Self::failure(error.user_message()),
        }
    }
}

impl RecommendError {
    /// Message shown to end users in the response envelope.
    pub fn user_message(&self) -> String {
        match self {
            RecommendError::NoMatches => NO_MATCH_MESSAGE.to_string(),
            RecommendError::InvalidCategory(_) => INVALID_CATEGORY_MESSAGE.to_string(),
            RecommendError::InsufficientMatches {
                required, found, ..
            } => format!(
                "조건에 맞는 휠체어가 부족합니다. (필요 {required}개, 검색 {found}개)"
            ),
            RecommendError::CatalogUnavailable(err) => format!("{UNEXPECTED_ERROR_PREFIX}{err}"),
        }
    }
}
