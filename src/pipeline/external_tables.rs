//! CreateOrUpdateExternalTables: register both configuration tables as external warehouse
//! tables reading from the workbook.

use super::Pipeline;
use crate::error::PipelineError;
use crate::services::{Lookup, Table};
use crate::tables::external_table;
use tracing::{debug, info};

/// What a sync does to one remote table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Table doesn't exist, needs to be created.
    Create,
    /// Table exists and its definition is replaced.
    Update,
    /// Table exists and is left untouched.
    Keep,
}

/// Pure function: decide what to do with a remote table given whether it was found.
pub fn plan_table_sync(exists: bool, update_if_existing: bool) -> SyncAction {
    match (exists, update_if_existing) {
        (false, _) => SyncAction::Create,
        (true, true) => SyncAction::Update,
        (true, false) => SyncAction::Keep,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSync {
    pub table_id: String,
    pub action: SyncAction,
}

/// Actions taken, partner table first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub tables: Vec<TableSync>,
}

impl SyncSummary {
    pub fn action_for(&self, table_id: &str) -> Option<SyncAction> {
        self.tables
            .iter()
            .find(|t| t.table_id == table_id)
            .map(|t| t.action)
    }
}

impl Pipeline {
    /// Create each external table that does not exist. Existing tables are replaced when
    /// `update_if_existing` is set and left alone otherwise.
    ///
    /// Only a 404 counts as "does not exist"; any other lookup failure stops the sync with
    /// [`PipelineError::TableLookup`].
    pub async fn sync_external_tables(
        &self,
        update_if_existing: bool,
    ) -> Result<SyncSummary, PipelineError> {
        let settings = &self.settings;
        let desired = [
            external_table(
                &settings.partner_layout,
                &settings.partner_table_id,
                &settings.source,
            ),
            external_table(
                &settings.advertiser_layout,
                &settings.advertiser_table_id,
                &settings.source,
            ),
        ];

        let mut summary = SyncSummary::default();
        for table in desired {
            let action = self.sync_table(&table, update_if_existing).await?;
            summary.tables.push(TableSync {
                table_id: table.table_reference.table_id.clone(),
                action,
            });
        }
        Ok(summary)
    }

    async fn sync_table(
        &self,
        table: &Table,
        update_if_existing: bool,
    ) -> Result<SyncAction, PipelineError> {
        let table_id = table.table_reference.table_id.as_str();
        let exists = match self.warehouse.lookup_table(table_id).await {
            Lookup::Found(_) => true,
            Lookup::NotFound => false,
            Lookup::Failed(source) => {
                return Err(PipelineError::TableLookup {
                    table_id: table_id.to_string(),
                    source,
                })
            }
        };

        let action = plan_table_sync(exists, update_if_existing);
        match action {
            SyncAction::Create => {
                self.warehouse.create_table(table).await?;
                info!(table_id, "External table created");
            }
            SyncAction::Update => {
                self.warehouse.update_table(table_id, table).await?;
                info!(table_id, "External table updated");
            }
            SyncAction::Keep => {
                debug!(table_id, "External table exists, leaving it unchanged");
            }
        }
        Ok(action)
    }
}
