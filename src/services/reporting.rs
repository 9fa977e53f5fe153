//! Reporting API client: report query definitions.

use crate::error::ApiError;
use crate::rest::{Method, RestClient};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const DEFAULT_BASE_URL: &str =
    "https://doubleclickbidmanager.googleapis.com/doubleclickbidmanager/v1.1";

/// Report query: what to group by, filter on and measure, plus title and date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDefinition {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "super::optional_int64"
    )]
    pub query_id: Option<i64>,
    pub metadata: ReportMetadata,
    pub params: ReportParams,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub title: String,
    #[serde(default)]
    pub data_range: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportParams {
    #[serde(rename = "type")]
    pub report_type: String,
    #[serde(default)]
    pub group_bys: Vec<String>,
    #[serde(default)]
    pub filters: Vec<ReportFilter>,
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ReportOptions>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportFilter {
    #[serde(rename = "type")]
    pub filter_type: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReportOptions {
    #[serde(default)]
    pub include_only_targeted_user_lists: bool,
}

/// Built-in spend report template. `${partnerId}` and `${partnerName}` are filled per partner.
pub fn default_report_template() -> Value {
    json!({
        "params": {
            "type": "TYPE_GENERAL",
            "groupBys": [
                "FILTER_PARTNER_NAME",
                "FILTER_PARTNER",
                "FILTER_ADVERTISER_NAME",
                "FILTER_ADVERTISER",
                "FILTER_ADVERTISER_CURRENCY",
                "FILTER_INSERTION_ORDER_NAME",
                "FILTER_INSERTION_ORDER",
                "FILTER_LINE_ITEM_NAME",
                "FILTER_LINE_ITEM",
                "FILTER_DATE",
                "FILTER_TIME_OF_DAY",
                "FILTER_ADVERTISER_TIMEZONE"
            ],
            "filters": [
                {"type": "FILTER_PARTNER", "value": "${partnerId}"}
            ],
            "metrics": [
                "METRIC_IMPRESSIONS",
                "METRIC_BILLABLE_IMPRESSIONS",
                "METRIC_REVENUE_ADVERTISER",
                "METRIC_MEDIA_COST_ADVERTISER"
            ],
            "options": {
                "includeOnlyTargetedUserLists": false
            }
        },
        "metadata": {
            "title": "DV360 Spend Report ${partnerName}",
            "dataRange": "PREVIOUS_DAY"
        }
    })
}

/// Client for report queries.
#[derive(Clone)]
pub struct ReportingClient {
    rest: RestClient,
}

impl ReportingClient {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    pub async fn get_query(&self, query_id: i64) -> Result<ReportDefinition, ApiError> {
        self.rest.get_as(&format!("query/{}", query_id)).await
    }

    /// Create a report query and return the identifier the API assigned to it.
    pub async fn create_query(&self, report: &ReportDefinition) -> Result<i64, ApiError> {
        let payload = serde_json::to_value(report)
            .map_err(|e| ApiError::Decode(format!("Failed to serialize report: {}", e)))?;
        let response = self
            .rest
            .mutate("query", Some(&payload), Method::POST)
            .await?;
        extract_query_id(&response)
    }
}

fn extract_query_id(response: &Value) -> Result<i64, ApiError> {
    match response.get("queryId") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        ApiError::Decode(format!(
            "Response did not contain a numeric queryId: {}",
            response
        ))
    })
}
