//! CLI help and command-name contract for logging and routing.

use crate::cli::parse::{Commands, TableArg};

/// Command name string for log events (e.g. "generate-reports", "show.partners").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::GenerateReports => "generate-reports".to_string(),
        Commands::Init => "init".to_string(),
        Commands::SyncTables { .. } => "sync-tables".to_string(),
        Commands::Show { table, .. } => format!("show.{}", table_name(*table)),
        Commands::Report { .. } => "report".to_string(),
    }
}

pub fn table_name(table: TableArg) -> &'static str {
    match table {
        TableArg::Partners => "partners",
        TableArg::Advertisers => "advertisers",
    }
}
