//! CLI argument definitions.

use clap::{ArgAction, Parser, Subcommand};

use crate::commands::{cw::CwCommand, zbx::ZbxCommand};

#[derive(Parser)]
#[command(name = "fomo")]
#[command(about = "Administer CloudWatch alarms and Zabbix triggers from the command line", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  fomo cw alarm list --search checkout --search-by name\n  fomo cw alarm backup --path alarms.json\n  fomo cw alarm restore --path alarms.json cpu-high\n  fomo zbx host triggers web-01 --exclude-template\n  fomo zbx trigger cmdb 20001 --impacted-ci checkout --affected-ci web-01\n"
)]
pub struct Cli {
    /// AWS region for CloudWatch commands
    #[arg(long, global = true, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Static AWS access key id (used only together with the secret key and session token)
    #[arg(long, global = true, hide_env_values = true)]
    pub access_key: Option<String>,

    /// Static AWS secret access key
    #[arg(long, global = true, hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Static AWS session token
    #[arg(long, global = true, hide_env_values = true)]
    pub session_token: Option<String>,

    /// Zabbix frontend URL (e.g., https://zabbix.example.com)
    #[arg(long, global = true, env = "FOMO_ZABBIX_URL")]
    pub zabbix_url: Option<String>,

    /// Zabbix API token
    #[arg(long, global = true, env = "FOMO_ZABBIX_API_KEY", hide_env_values = true)]
    pub zabbix_api_key: Option<String>,

    /// Print results as pretty JSON instead of the text renderings
    #[arg(long, global = true)]
    pub json: bool,

    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// CloudWatch alarms, dashboards, SNS topics and metric filters
    Cw {
        #[command(subcommand)]
        command: CwCommand,
    },

    /// Zabbix hosts, templates, triggers, maintenance and items
    Zbx {
        #[command(subcommand)]
        command: ZbxCommand,
    },
}
