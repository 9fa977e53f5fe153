//! Configuration table layouts and the naming conventions derived from them.
//!
//! A field's suffix (text after its last `_`) decides both its warehouse type and its display
//! format in the workbook.

use crate::services::warehouse::{
    ExternalDataConfiguration, FieldType, GoogleSheetsOptions, Table, TableFieldSchema,
    TableReference, TableSchema,
};
use crate::sheet::field_suffix;
use serde_json::Map;
use std::collections::HashMap;
use tracing::debug;

pub const PARTNER_NAME: &str = "partner_name";
pub const PARTNER_ID: &str = "partner_id";
pub const REPORT_ID: &str = "report_id";

/// Name and ordered field list of a configuration table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub name: String,
    pub fields: Vec<String>,
}

impl TableLayout {
    pub fn new(name: &str, fields: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn partner() -> Self {
        Self::new(
            "Partner Config",
            &[
                PARTNER_NAME,
                PARTNER_ID,
                "partner_monthly_cap",
                "advertiser_monthly_cap",
                "warning1_threshold",
                "warning2_threshold",
                "action1_threshold",
                "action2_threshold",
                REPORT_ID,
            ],
        )
    }

    pub fn advertiser() -> Self {
        Self::new(
            "Advertiser Config",
            &[
                PARTNER_NAME,
                PARTNER_ID,
                "advertiser_name",
                "advertiser_id",
                "advertiser_monthly_cap",
            ],
        )
    }

    /// 1-indexed column of `field`.
    pub fn column_of(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field).map(|i| i + 1)
    }
}

/// Warehouse type for a field, by suffix. Unknown suffixes fall back to `STRING`.
pub fn field_type(field: &str) -> FieldType {
    match field_suffix(field) {
        "name" => FieldType::String,
        "id" => FieldType::Integer,
        "cap" | "threshold" => FieldType::Float,
        other => {
            debug!(field, suffix = other, "No type rule for suffix, using STRING");
            FieldType::String
        }
    }
}

pub fn remote_schema(fields: &[String]) -> TableSchema {
    TableSchema {
        fields: fields
            .iter()
            .map(|field| TableFieldSchema {
                name: field.clone(),
                field_type: field_type(field),
            })
            .collect(),
    }
}

/// Display formats keyed by field suffix.
pub fn format_rules() -> HashMap<&'static str, &'static str> {
    HashMap::from([("threshold", "#0.00%")])
}

/// Where the warehouse reads an external table from.
#[derive(Debug, Clone)]
pub struct ExternalSource {
    pub source_uri: String,
    pub source_format: String,
    pub skip_leading_rows: u32,
}

/// External table definition exposing `layout` as `table_id`.
pub fn external_table(layout: &TableLayout, table_id: &str, source: &ExternalSource) -> Table {
    Table {
        table_type: Some("EXTERNAL".to_string()),
        table_reference: TableReference {
            project_id: None,
            dataset_id: None,
            table_id: table_id.to_string(),
        },
        external_data_configuration: Some(ExternalDataConfiguration {
            source_uris: vec![source.source_uri.clone()],
            source_format: source.source_format.clone(),
            schema: Some(remote_schema(&layout.fields)),
            google_sheets_options: Some(GoogleSheetsOptions {
                skip_leading_rows: Some(source.skip_leading_rows.to_string()),
                range: Some(layout.name.clone()),
            }),
            extra: Map::new(),
        }),
        extra: Map::new(),
    }
}
