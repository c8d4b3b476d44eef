//! Command dispatch and the pieces every command shares.

pub mod cw;
pub mod zbx;

use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;

use fomo::aws::{StaticCredentials, DEFAULT_REGION};
use fomo::config::{self, FomoConfig};
use fomo::{cloudwatch, zabbix};

use crate::args::{Cli, Commands};

/// Global options as the command handlers see them.
pub struct Globals {
    pub region: Option<String>,
    pub credentials: StaticCredentials,
    pub zabbix_url: String,
    pub zabbix_api_key: String,
    pub json: bool,
}

pub async fn run(cli: Cli) -> Result<()> {
    let ctx = Globals {
        region: cli.region,
        credentials: StaticCredentials {
            access_key: cli.access_key.unwrap_or_default(),
            secret_key: cli.secret_key.unwrap_or_default(),
            session_token: cli.session_token.unwrap_or_default(),
        },
        zabbix_url: cli.zabbix_url.unwrap_or_default(),
        zabbix_api_key: cli.zabbix_api_key.unwrap_or_default(),
        json: cli.json,
    };

    match cli.command {
        Commands::Cw { command } => cw::run(&ctx, command).await,
        Commands::Zbx { command } => zbx::run(&ctx, command).await,
    }
}

impl Globals {
    pub async fn cloudwatch(&self) -> Result<cloudwatch::Session> {
        let (file, path) = FomoConfig::load().context("Failed to load configuration")?;
        let (region, source) = config::resolve(
            self.region.as_deref(),
            file.aws.region.as_deref(),
            path.as_deref(),
        );
        let region = if region.is_empty() {
            DEFAULT_REGION.to_string()
        } else {
            region
        };
        tracing::debug!("using region {region} from {source}");

        Ok(cloudwatch::Session::new(&region, &self.credentials).await)
    }

    pub async fn zabbix(&self) -> Result<zabbix::Session> {
        let session = zabbix::Session::connect(&self.zabbix_url, &self.zabbix_api_key)
            .await
            .context("Failed to connect to Zabbix")?;
        Ok(session)
    }

    /// Writes `value` as pretty JSON when `--json` is set, otherwise hands
    /// stdout to `render`.
    pub fn emit<T, F>(&self, value: &T, render: F) -> Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&mut io::StdoutLock<'static>) -> io::Result<()>,
    {
        let mut out = io::stdout().lock();
        if self.json {
            writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
        } else {
            render(&mut out)?;
        }
        out.flush()?;
        Ok(())
    }
}
