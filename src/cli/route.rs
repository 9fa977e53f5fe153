//! CLI route: single route table and run context. Dispatches to the pipeline and presentation.

use crate::cli::help::command_name;
use crate::cli::parse::{Commands, OutputFormat, TableArg};
use crate::cli::presentation::{
    format_generate_outcome, format_initialize_outcome, format_partner_report,
    format_records_json, format_records_text, format_sync_summary,
};
use crate::config::{ConfigLoader, MonitorConfig};
use crate::error::PipelineError;
use crate::pipeline::{ConfigTable, Pipeline, PipelineSettings};
use crate::prompt::TerminalPrompt;
use crate::rest::{CommandToken, EnvToken, ReqwestTransport, RestClient, TokenSource};
use crate::services::warehouse::dataset_url;
use crate::services::{ReportingClient, WarehouseClient};
use crate::sheet::WorkbookFile;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Text to print plus, for partially failed runs, the error to exit with afterwards.
#[derive(Debug)]
pub struct CommandOutput {
    pub text: String,
    pub failure: Option<PipelineError>,
}

impl From<String> for CommandOutput {
    fn from(text: String) -> Self {
        Self {
            text,
            failure: None,
        }
    }
}

/// Runtime context for CLI execution: the pipeline wired to the configured workbook and APIs.
pub struct RunContext {
    pipeline: Pipeline,
}

impl RunContext {
    /// Load and validate configuration, then build the pipeline. `config_path` replaces the
    /// global and workspace config files.
    pub fn new(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        assume_yes: bool,
    ) -> Result<Self, PipelineError> {
        let config = load_config(&workspace_root, config_path.as_deref())?;
        let settings = PipelineSettings::from_config(&config, &workspace_root)?;

        let transport = Arc::new(ReqwestTransport::new(
            Duration::from_secs(config.http.connect_timeout_secs),
            Duration::from_secs(config.http.request_timeout_secs),
        )?);
        let tokens: Arc<dyn TokenSource> = match &config.auth.token_command {
            Some(command) => Arc::new(CommandToken::new(command)?),
            None => Arc::new(EnvToken::new(config.auth.token_env.clone())),
        };

        let reporting = ReportingClient::new(RestClient::new(
            config.reporting.base_url.clone(),
            transport.clone(),
            tokens.clone(),
        ));
        let warehouse = WarehouseClient::new(RestClient::new(
            dataset_url(
                &config.warehouse.base_url,
                &config.gcp.project_id,
                &config.gcp.dataset_id,
            ),
            transport,
            tokens,
        ));

        let workbook_path = config.workbook.resolve_path(&workspace_root);
        debug!(workbook = %workbook_path.display(), "Opening workbook");
        let store = WorkbookFile::open(workbook_path)?;

        let pipeline = Pipeline::new(
            settings,
            Box::new(store),
            Arc::new(TerminalPrompt::new(assume_yes)),
            reporting,
            warehouse,
        );
        Ok(Self { pipeline })
    }

    /// Run commands against an already assembled pipeline.
    pub fn with_pipeline(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn into_pipeline(self) -> Pipeline {
        self.pipeline
    }

    /// Execute a CLI command via the single route table.
    pub async fn execute(&mut self, command: &Commands) -> Result<CommandOutput, PipelineError> {
        let name = command_name(command);
        info!(command = %name, "Running command");

        let output = match command {
            Commands::GenerateReports => {
                let outcome = self.pipeline.generate_reports().await?;
                CommandOutput {
                    text: format_generate_outcome(&outcome),
                    failure: outcome.failure(),
                }
            }
            Commands::Init => {
                let outcome = self.pipeline.initialize_configuration().await?;
                format_initialize_outcome(&outcome).into()
            }
            Commands::SyncTables { create_only } => {
                let summary = self.pipeline.sync_external_tables(!create_only).await?;
                format_sync_summary(&summary).into()
            }
            Commands::Show { table, format } => {
                let table = match table {
                    TableArg::Partners => ConfigTable::Partners,
                    TableArg::Advertisers => ConfigTable::Advertisers,
                };
                let records = self.pipeline.records(table)?;
                match format {
                    OutputFormat::Json => format_records_json(&records)?.into(),
                    OutputFormat::Text => {
                        let fields = &self.pipeline.settings().layout(table).fields;
                        format_records_text(fields, &records).into()
                    }
                }
            }
            Commands::Report { partner_id, format } => {
                let (partner, report) = self.pipeline.partner_report(partner_id).await?;
                format_partner_report(&partner, &report, *format)?.into()
            }
        };

        info!(command = %name, "Command finished");
        Ok(output)
    }
}

fn load_config(
    workspace_root: &Path,
    config_path: Option<&Path>,
) -> Result<MonitorConfig, PipelineError> {
    let config = match config_path {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load(workspace_root)?,
    };
    config.validate().map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        PipelineError::Config(format!(
            "Configuration validation failed:\n{}",
            error_msgs.join("\n")
        ))
    })?;
    Ok(config)
}
