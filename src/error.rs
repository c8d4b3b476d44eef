//! Error types shared by the CloudWatch and Zabbix wrappers.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FomoError>;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum FomoError {
    #[error("Alarm '{0}' not found")]
    AlarmNotFound(String),

    #[error("SNS Topic '{0}' not found")]
    SnsNotFound(String),

    #[error("Dashboard '{0}' not found")]
    DashboardNotFound(String),

    #[error("Log Group '{0}' not found")]
    LogGroupNotFound(String),

    #[error("Metric Filter '{filter}' not found in log group '{log_group}'")]
    MetricFilterNotFound { filter: String, log_group: String },

    #[error("Host '{0}' not found")]
    HostNotFound(String),

    #[error("Template not found with given search criteria \"{0}\"")]
    TemplateNotFound(String),

    #[error("No triggers found with supplied trigger ids: {0}")]
    TriggerNotFound(String),

    #[error("No items found with supplied item ids: {0}")]
    ItemNotFound(String),

    #[error("Maintenance profiles \"{0}\" not found")]
    MaintenanceNotFound(String),

    #[error("{name} '{value}' invalid. Valid options: {valid:?}")]
    InvalidArgument {
        name: &'static str,
        value: String,
        valid: &'static [&'static str],
    },

    #[error("{0}")]
    BadAlarm(String),

    #[error("{kind} '{name}' already exists and overwrite is not set")]
    AlreadyExists { kind: &'static str, name: String },

    #[error("{kind} '{name}' not removed: confirmation is required to remove it")]
    ConfirmationRequired { kind: &'static str, name: String },

    #[error("The filepath '{0}' already exists and overwrite is not set")]
    FileExists(PathBuf),

    #[error("File '{0}' does not exist")]
    FileNotFound(PathBuf),

    #[error("Could not load JSON from '{path}': {source}")]
    InvalidSnapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Current {field} \"{current}\" does not match \"{requested}\" and overwrite is not set")]
    DescriptionConflict {
        field: &'static str,
        current: String,
        requested: String,
    },

    #[error("Trigger {trigger_id} already carries CMDB tags {tags:?} and overwrite is not set")]
    CmdbTagConflict {
        trigger_id: String,
        tags: Vec<String>,
    },

    #[error("{left} names given but {right} new names; the lists must line up")]
    ListLengthMismatch { left: usize, right: usize },

    #[error("Operation interrupted")]
    Interrupted,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("AWS {operation} failed: {source}")]
    Aws {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("Zabbix {method} failed ({code}): {message} {data}")]
    Zabbix {
        method: String,
        code: i64,
        message: String,
        data: String,
    },

    #[error("Zabbix authentication failed for url from {url_source} with api key from {key_source}: {reason}")]
    AuthFailed {
        url_source: String,
        key_source: String,
        reason: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FomoError {
    /// Wraps an AWS SDK failure with the name of the operation that raised it.
    pub fn aws<E>(operation: &'static str) -> impl FnOnce(E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        move |source| Self::Aws {
            operation,
            source: Box::new(source),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AlarmNotFound(_)
                | Self::SnsNotFound(_)
                | Self::DashboardNotFound(_)
                | Self::LogGroupNotFound(_)
                | Self::MetricFilterNotFound { .. }
                | Self::HostNotFound(_)
                | Self::TemplateNotFound(_)
                | Self::TriggerNotFound(_)
                | Self::ItemNotFound(_)
                | Self::MaintenanceNotFound(_)
        )
    }
}
