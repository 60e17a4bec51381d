//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use quota_gate_domain::{Dimension, QuotaType};
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
}

impl From<OutputFormat> for quota_gate_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => quota_gate_domain::OutputFormat::Text,
            OutputFormat::Json => quota_gate_domain::OutputFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DimensionArg {
    Age,
    Gender,
    Location,
    Category,
}

impl From<DimensionArg> for Dimension {
    fn from(arg: DimensionArg) -> Self {
        match arg {
            DimensionArg::Age => Dimension::Age,
            DimensionArg::Gender => Dimension::Gender,
            DimensionArg::Location => Dimension::Location,
            DimensionArg::Category => Dimension::Category,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QuotaTypeArg {
    Count,
    Percentage,
}

impl From<QuotaTypeArg> for QuotaType {
    fn from(arg: QuotaTypeArg) -> Self {
        match arg {
            QuotaTypeArg::Count => QuotaType::Count,
            QuotaTypeArg::Percentage => QuotaType::Percentage,
        }
    }
}

/// CLI arguments for quota-gate
#[derive(Parser, Debug)]
#[command(name = "quota-gate")]
#[command(author, version, about = "Quota-gated survey screening and publishing")]
#[command(long_about = r#"
quota-gate configures audience quotas for surveys, derives the screening
questionnaire from them, and runs respondents through the fail-closed
qualification protocol against the quota oracle.

Quota files use the persisted document format of the survey backend
(`totaltarget`, `screeningquestions`, ...).

Configuration files are loaded from (in priority order):
1. QUOTA_GATE_* environment variables (e.g. QUOTA_GATE_API__BASE_URL)
2. --config <path>          Explicit config file
3. ./quota-gate.toml        Project-level config
4. ~/.config/quota-gate/config.toml   Global config

Example:
  quota-gate validate quota.json
  quota-gate convert quota.json --dimension age --to percentage
  quota-gate take 6f1c2b
  quota-gate publish s-123 quota.json --vendor cint.json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format (overrides [output] format)
    #[arg(long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Survey backend base URL (overrides [api] base_url)
    #[arg(long, value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Directory for diagnostic log files
    #[arg(long, value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a quota file against the quota invariants
    Validate {
        /// Quota document (JSON)
        quota: PathBuf,
    },

    /// Show the screening questionnaire derived from a quota file
    Screening {
        /// Quota document (JSON)
        quota: PathBuf,

        /// Category catalog: JSON array of {"id", "name"}
        #[arg(long, value_name = "PATH")]
        categories: Option<PathBuf>,
    },

    /// Convert one dimension between COUNT and PERCENTAGE targets
    Convert {
        /// Quota document (JSON)
        quota: PathBuf,

        #[arg(long, value_enum)]
        dimension: DimensionArg,

        #[arg(long, value_enum)]
        to: QuotaTypeArg,

        /// Write the converted document here instead of printing a summary
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Reconcile vendor screening criteria and report blocking problems
    VendorCheck {
        /// Vendor criteria file (JSON)
        criteria: PathBuf,
    },

    /// Take a survey interactively as a respondent
    Take {
        /// Share token of the survey link
        share_token: String,

        /// Restart after each submission even if the survey does not ask for it
        #[arg(long)]
        auto_restart: bool,

        /// Append protocol events to this JSONL file
        #[arg(long, value_name = "PATH")]
        event_log: Option<PathBuf>,
    },

    /// Validate, save and publish a survey's quota
    Publish {
        /// Survey id
        survey_id: String,

        /// Quota document (JSON)
        quota: PathBuf,

        /// Category catalog: JSON array of {"id", "name"}
        #[arg(long, value_name = "PATH")]
        categories: Option<PathBuf>,

        /// Vendor criteria file (JSON); publishes to a panel vendor
        #[arg(long, value_name = "PATH")]
        vendor: Option<PathBuf>,
    },

    /// Show the most recently published survey
    LastPublished {
        /// Leave the record in the store instead of consuming it
        #[arg(long)]
        peek: bool,
    },

    /// Show configuration file locations and effective values
    ShowConfig,
}
