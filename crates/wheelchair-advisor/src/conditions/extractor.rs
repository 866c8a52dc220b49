use super::keywords::{contains_any, KeywordTables};
use super::{AgeTier, ConditionSet, Conditions, Gender, Usage, LIGHT_REQUEST_WEIGHT_MAX_KG};
use regex::Regex;
use std::sync::OnceLock;

/// Queries with at most this many words and no gender term reduce to their age.
pub const SHORT_QUERY_MAX_WORDS: usize = 3;

struct Patterns {
    weight: [Regex; 4],
    age: [Regex; 2],
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let compile = |pattern: &str| Regex::new(pattern).expect("extraction pattern");
        Patterns {
            weight: [
                compile(r"(\d+)\s*(?:kg|킬로|키로|㎏)"),
                compile(r"몸무게\s*(\d+)"),
                compile(r"체중\s*(\d+)"),
                compile(r"(\d+)\s*k"),
            ],
            age: [
                compile(r"(\d+)\s*(?:살|세|대)"),
                compile(r"(?:나이|연세|연령)[가이]?\s*(\d+)"),
            ],
        }
    })
}

/// ASCII and full-width (U+FF10..U+FF19) digits. Other scripts' digits are not read.
fn digit_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => c.to_digit(10),
        '０'..='９' => Some(c as u32 - '０' as u32),
        _ => None,
    }
}

/// Reads a run of digits as a `u32`; `None` on overflow or an unreadable digit.
fn read_number(digits: &str) -> Option<u32> {
    digits.chars().try_fold(0u32, |value, c| {
        value.checked_mul(10)?.checked_add(digit_value(c)?)
    })
}

/// First pattern, in priority order, whose capture reads as an integer.
fn first_capture(patterns: &[Regex], text: &str) -> Option<u32> {
    patterns.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|captures| captures.get(1))
            .and_then(|capture| read_number(capture.as_str()))
    })
}

/// Turns a free-text request into a [`ConditionSet`].
#[derive(Debug, Clone, Default)]
pub struct ConditionExtractor {
    tables: KeywordTables,
}

impl ConditionExtractor {
    pub fn new(tables: KeywordTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &KeywordTables {
        &self.tables
    }

    pub fn extract(&self, text: &str) -> ConditionSet {
        let tables = &self.tables;
        let patterns = patterns();
        let mut conditions = Conditions::default();

        let gender = if contains_any(text, tables.male) {
            Some(Gender::Male)
        } else if contains_any(text, tables.female) {
            Some(Gender::Female)
        } else {
            None
        };
        if let Some(gender) = gender {
            conditions.gender = Some(gender);
            conditions
                .weight_kg
                .get_or_insert(gender.default_weight_kg());
        }

        if let Some(weight) = first_capture(&patterns.weight, text) {
            conditions.weight_kg = Some(weight);
        }

        if let Some(age) = first_capture(&patterns.age, text) {
            conditions.age = Some(age);

            let word_count = text.split_whitespace().count();
            if word_count <= SHORT_QUERY_MAX_WORDS && !tables.mentions_gender(text) {
                return ConditionSet::AgeOnly { age };
            }

            if let Some(tier) = AgeTier::for_age(age) {
                conditions.age_tier = Some(tier);
                conditions.seat_width_max_cm = Some(tier.seat_width_max_cm());
                conditions.weight_max_kg = Some(tier.weight_max_kg());
            }
        }

        if contains_any(text, tables.lightweight) {
            conditions.light_request = true;
            conditions.weight_max_kg = Some(LIGHT_REQUEST_WEIGHT_MAX_KG);
        }

        if contains_any(text, tables.large_frame) {
            conditions.large_request = true;
        }

        if contains_any(text, tables.large_wheel) {
            conditions.large_wheel_request = true;
        }

        if contains_any(text, tables.vehicle) {
            conditions.usage = Some(Usage::VehicleMount);
        }

        ConditionSet::from_conditions(conditions)
    }
}
