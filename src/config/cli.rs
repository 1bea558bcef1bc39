use crate::domain::model::AuditMode;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "countdown-audit")]
#[command(about = "Report wiki sections that use a countdown template and whether it has expired")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "countdown-audit.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Override the audit mode from the config file
    #[arg(long, value_enum)]
    pub mode: Option<AuditMode>,

    /// Print the report instead of writing it to the wiki
    #[arg(long)]
    pub dry_run: bool,
}
