/// Synonym tables consulted by the condition extractor.
///
/// Matching is plain substring containment against the raw query, so entries
/// are written exactly as users type them, spacing included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordTables {
    pub version: &'static str,
    pub male: &'static [&'static str],
    pub female: &'static [&'static str],
    pub lightweight: &'static [&'static str],
    pub large_frame: &'static [&'static str],
    pub large_wheel: &'static [&'static str],
    pub vehicle: &'static [&'static str],
}

impl KeywordTables {
    pub const KOREAN: Self = Self {
        version: "ko-1",
        male: &["남성", "남자", "할아버지", "아저씨", "남편"],
        female: &["여성", "여자", "할머니", "아주머니", "부인"],
        lightweight: &[
            "가벼운",
            "가볍",
            "경량",
            "가벼워",
            "무겁지 않은",
            "가벼웠으면",
            "가벼웠음",
            "가볍게",
            "가벼운게",
            "가벼운것",
            "끌기 쉬운",
            "끌기쉬운",
            "끌기편한",
            "이동하기 쉬운",
            "이동이 쉬운",
        ],
        large_frame: &["큰", "대형", "크게", "큰거", "큰 휠체어", "큰것", "큰게"],
        large_wheel: &["큰 바퀴", "바퀴가 큰", "큰바퀴", "24인치", "24", "8인치"],
        vehicle: &[
            "차에 실",
            "차량",
            "차에실",
            "차싣",
            "트렁크",
            "자동차",
            "차boot",
            "차 트렁크",
            "차에 넣",
            "차에넣",
            "차에 싣",
            "차에싣",
            "차로",
            "차타고",
            "운전",
            "드라이브",
        ],
    };

    pub fn mentions_gender(&self, text: &str) -> bool {
        contains_any(text, self.male) || contains_any(text, self.female)
    }
}

impl Default for KeywordTables {
    fn default() -> Self {
        Self::KOREAN
    }
}

pub(crate) fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}
