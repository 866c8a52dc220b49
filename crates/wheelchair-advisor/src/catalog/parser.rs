use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One catalog row exactly as written in the source sheet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ProductRow {
    #[serde(rename = "제품명")]
    pub(crate) name: String,
    #[serde(rename = "제조사", default, deserialize_with = "empty_string_as_none")]
    pub(crate) manufacturer: Option<String>,
    #[serde(rename = "무게(kg)", default, deserialize_with = "empty_string_as_none")]
    pub(crate) weight: Option<String>,
    #[serde(rename = "좌폭(cm)", default, deserialize_with = "empty_string_as_none")]
    pub(crate) seat_width: Option<String>,
    #[serde(
        rename = "추천 키워드1",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) keyword1: Option<String>,
    #[serde(
        rename = "추천 키워드2",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) keyword2: Option<String>,
    #[serde(
        rename = "추천 키워드3",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) keyword3: Option<String>,
}

impl ProductRow {
    pub(crate) fn keywords(&self) -> Vec<String> {
        [&self.keyword1, &self.keyword2, &self.keyword3]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<ProductRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    csv_reader.deserialize::<ProductRow>().collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
