//! Warehouse API client: tables of one dataset.

use crate::error::ApiError;
use crate::rest::{Method, RestClient};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_BASE_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";

/// Base URL of the tables collection of a dataset.
pub fn dataset_url(api_base: &str, project_id: &str, dataset_id: &str) -> String {
    format!(
        "{}/projects/{}/datasets/{}",
        api_base.trim_end_matches('/'),
        project_id,
        dataset_id
    )
}

/// Outcome of looking up a remote resource. Keeps "absent" apart from "could not tell".
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Failed(ApiError),
}

impl<T> Lookup<T> {
    /// Classify a fetch result: 404 is `NotFound`, any other error is `Failed`.
    pub fn from_result(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => Lookup::Found(value),
            Err(e) if e.is_not_found() => Lookup::NotFound,
            Err(e) => Lookup::Failed(e),
        }
    }
}

/// Table resource. Only the fields this tool writes are typed; the rest is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub table_type: Option<String>,
    pub table_reference: TableReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_data_configuration: Option<ExternalDataConfiguration>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<String>,
    pub table_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalDataConfiguration {
    #[serde(default)]
    pub source_uris: Vec<String>,
    pub source_format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<TableSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_sheets_options: Option<GoogleSheetsOptions>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TableSchema {
    #[serde(default)]
    pub fields: Vec<TableFieldSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableFieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

/// Column storage type. Types this tool never writes keep their wire name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Other(String),
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "STRING" => FieldType::String,
            "INTEGER" => FieldType::Integer,
            "FLOAT" => FieldType::Float,
            _ => FieldType::Other(name),
        }
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::String => "STRING".to_string(),
            FieldType::Integer => "INTEGER".to_string(),
            FieldType::Float => "FLOAT".to_string(),
            FieldType::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GoogleSheetsOptions {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "super::optional_int64_string"
    )]
    pub skip_leading_rows: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
}

/// Client for the tables of one dataset. The REST client's base URL is the dataset URL.
#[derive(Clone)]
pub struct WarehouseClient {
    rest: RestClient,
}

impl WarehouseClient {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// Fetch a table. A missing table is `ApiError::Status { code: 404, .. }`.
    pub async fn get_table(&self, table_id: &str) -> Result<Table, ApiError> {
        self.rest.get_as(&format!("tables/{}", table_id)).await
    }

    pub async fn lookup_table(&self, table_id: &str) -> Lookup<Table> {
        Lookup::from_result(self.get_table(table_id).await)
    }

    /// Create a table and return the resource as sent back by the API, which may be `{}`.
    pub async fn create_table(&self, table: &Table) -> Result<Value, ApiError> {
        self.rest.mutate_as("tables", table, Method::POST).await
    }

    /// Replace the table definition (PUT, not PATCH).
    pub async fn update_table(&self, table_id: &str, table: &Table) -> Result<Value, ApiError> {
        self.rest
            .mutate_as(&format!("tables/{}", table_id), table, Method::PUT)
            .await
    }
}
