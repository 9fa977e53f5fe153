//! Service Clients
//!
//! Thin, typed wrappers over [`crate::rest::RestClient`]: one for the reporting API (report
//! queries) and one for the warehouse API (tables of a dataset).

use serde::{Deserialize, Deserializer};

pub mod reporting;
pub mod warehouse;

pub use reporting::{ReportDefinition, ReportingClient};
pub use warehouse::{Lookup, Table, WarehouseClient};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(serde_json::Number),
    String(String),
}

impl NumberOrString {
    fn into_string(self) -> String {
        match self {
            NumberOrString::Number(n) => n.to_string(),
            NumberOrString::String(s) => s,
        }
    }
}

/// Google APIs encode int64 fields as JSON strings but accept numbers; take either.
pub(crate) fn optional_int64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrString>::deserialize(deserializer)?;
    raw.map(|value| {
        let text = value.into_string();
        text.parse::<i64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid int64 value: {}", text)))
    })
    .transpose()
}

pub(crate) fn optional_int64_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberOrString>::deserialize(deserializer)?.map(NumberOrString::into_string))
}
