use super::scoring::ScoredEntry;
use super::RecommendError;
use crate::catalog::{tags, Catalog, CatalogEntry};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Rows returned by every quick pick.
pub const QUICK_PICK_SIZE: usize = 3;

/// Fixed shortcut categories offered next to the free-text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickPickCategory {
    Male,
    Female,
    Basic,
    Lightweight,
    Large,
}

impl QuickPickCategory {
    pub const ALL: [Self; 5] = [
        Self::Male,
        Self::Female,
        Self::Basic,
        Self::Lightweight,
        Self::Large,
    ];

    pub const fn tag(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Basic => "basic",
            Self::Lightweight => "lightweight",
            Self::Large => "large",
        }
    }

    /// Label shown on the quick-pick buttons.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "남성",
            Self::Female => "여성",
            Self::Basic => "기본형",
            Self::Lightweight => "경량형",
            Self::Large => "대형",
        }
    }

    pub fn matches(self, entry: &CatalogEntry) -> bool {
        match self {
            Self::Male | Self::Basic => entry.has_keyword(tags::BASIC),
            Self::Female | Self::Lightweight => entry.has_keyword(tags::LIGHTWEIGHT),
            Self::Large => entry.is_large_frame() && !entry.weight_range.is_unparseable(),
        }
    }

    pub(crate) fn sample<R: Rng + ?Sized>(
        self,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Result<Vec<ScoredEntry>, RecommendError> {
        let candidates: Vec<&CatalogEntry> = catalog
            .entries()
            .iter()
            .filter(|entry| self.matches(entry))
            .collect();

        if candidates.len() < QUICK_PICK_SIZE {
            return Err(RecommendError::InsufficientMatches {
                category: self,
                required: QUICK_PICK_SIZE,
                found: candidates.len(),
            });
        }

        Ok(candidates
            .choose_multiple(rng, QUICK_PICK_SIZE)
            .map(|entry| ScoredEntry::new((*entry).clone()))
            .collect())
    }
}

impl fmt::Display for QuickPickCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for QuickPickCategory {
    type Err = RecommendError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|category| {
                category.label() == trimmed || category.tag().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| RecommendError::InvalidCategory(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::WeightCell;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn entry(name: &str, weight: WeightCell, keywords: &[&str]) -> CatalogEntry {
        CatalogEntry::new(
            name,
            "테스트",
            weight,
            Some("44".to_string()),
            keywords.iter().map(|tag| tag.to_string()).collect(),
        )
    }

    #[test]
    fn parses_tags_and_labels() {
        assert_eq!("남성".parse::<QuickPickCategory>().ok(), Some(QuickPickCategory::Male));
        assert_eq!("경량형".parse::<QuickPickCategory>().ok(), Some(QuickPickCategory::Lightweight));
        assert_eq!("Large".parse::<QuickPickCategory>().ok(), Some(QuickPickCategory::Large));
        match "초경량".parse::<QuickPickCategory>() {
            Err(RecommendError::InvalidCategory(tag)) => assert_eq!(tag, "초경량"),
            other => panic!("expected invalid category, got {other:?}"),
        }
    }

    #[test]
    fn samples_three_distinct_rows() {
        let catalog = Catalog::from_entries(
            (0..6)
                .map(|index| entry(&format!("basic-{index}"), WeightCell::Number(15.0), &[tags::BASIC]))
                .collect(),
        );
        let mut rng = StdRng::seed_from_u64(3);
        let picks = QuickPickCategory::Basic
            .sample(&catalog, &mut rng)
            .expect("enough basic rows");

        let names: HashSet<_> = picks.iter().map(|scored| scored.entry.name.clone()).collect();
        assert_eq!(picks.len(), QUICK_PICK_SIZE);
        assert_eq!(names.len(), QUICK_PICK_SIZE);
    }

    #[test]
    fn large_ignores_unparseable_weights() {
        let catalog = Catalog::from_entries(vec![
            entry("a", WeightCell::Number(17.0), &[]),
            entry("b", WeightCell::Text("16.5~18".to_string()), &[]),
            entry("c", WeightCell::Text("미상".to_string()), &[]),
            entry("d", WeightCell::Number(15.0), &[]),
        ]);
        let mut rng = StdRng::seed_from_u64(3);
        match QuickPickCategory::Large.sample(&catalog, &mut rng) {
            Err(RecommendError::InsufficientMatches {
                category,
                required,
                found,
            }) => {
                assert_eq!(category, QuickPickCategory::Large);
                assert_eq!(required, 3);
                assert_eq!(found, 2);
            }
            other => panic!("expected insufficient matches, got {other:?}"),
        }
    }
}
