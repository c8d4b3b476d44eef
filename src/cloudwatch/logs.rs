use std::io::{BufRead, Write};
use std::path::Path;

use tracing::{debug, info};

use super::Session;
use crate::aws::CloudWatchApi;
use crate::core::{LogGroup, MetricFilter, RestoreOutcome};
use crate::error::{FomoError, Result};
use crate::helpers::snapshot;
use crate::prompt::Console;

impl<B: CloudWatchApi> Session<B> {
    pub async fn get_all_log_groups(&self) -> Result<Vec<LogGroup>> {
        self.backend.describe_log_groups().await
    }

    pub async fn get_log_group(&self, name: &str) -> Result<LogGroup> {
        self.get_all_log_groups()
            .await?
            .into_iter()
            .find(|lg| lg.log_group_name == name)
            .ok_or_else(|| FomoError::LogGroupNotFound(name.to_string()))
    }

    pub async fn get_all_metric_filters(&self) -> Result<Vec<MetricFilter>> {
        let filters = self.backend.describe_metric_filters().await?;
        debug!("found {} metric filters", filters.len());
        Ok(filters)
    }

    pub async fn get_metric_filter(&self, name: &str, log_group: &str) -> Result<MetricFilter> {
        self.get_log_group(log_group).await?;

        self.get_all_metric_filters()
            .await?
            .into_iter()
            .find(|f| f.filter_name == name && f.log_group_name == log_group)
            .ok_or_else(|| FomoError::MetricFilterNotFound {
                filter: name.to_string(),
                log_group: log_group.to_string(),
            })
    }

    pub async fn put_metric_filter(&self, filter: &MetricFilter, overwrite: bool) -> Result<()> {
        if !overwrite {
            match self
                .get_metric_filter(&filter.filter_name, &filter.log_group_name)
                .await
            {
                Ok(_) => {
                    return Err(FomoError::AlreadyExists {
                        kind: "Metric Filter",
                        name: filter.filter_name.clone(),
                    })
                }
                Err(FomoError::MetricFilterNotFound { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        self.backend.put_metric_filter(filter).await?;
        info!(
            "Metric Filter '{}' written to '{}'",
            filter.filter_name, filter.log_group_name
        );
        Ok(())
    }

    pub async fn delete_metric_filter(
        &self,
        name: &str,
        log_group: &str,
        confirm: bool,
    ) -> Result<()> {
        if !confirm {
            return Err(FomoError::ConfirmationRequired {
                kind: "Metric Filter",
                name: name.to_string(),
            });
        }

        self.get_metric_filter(name, log_group).await?;
        self.backend.delete_metric_filter(log_group, name).await?;
        info!("Metric Filter '{name}' deleted from '{log_group}'");
        Ok(())
    }

    pub async fn backup_all_metric_filters(&self, path: &Path, overwrite: bool) -> Result<()> {
        snapshot::ensure_writable(path, overwrite)?;
        let filters = self.get_all_metric_filters().await?;
        snapshot::write_snapshot(&filters, path, overwrite)
    }

    /// Restores every filter named `name`, optionally narrowed to one log
    /// group. A single yes covers all matches.
    pub async fn restore_metric_filter<R: BufRead, W: Write>(
        &self,
        path: &Path,
        name: &str,
        log_group: Option<&str>,
        confirm: bool,
        console: &mut Console<R, W>,
    ) -> Result<RestoreOutcome> {
        let matches: Vec<MetricFilter> = snapshot::load_metric_filters(path)?
            .into_iter()
            .filter(|f| f.filter_name == name)
            .filter(|f| log_group.map_or(true, |lg| f.log_group_name == lg))
            .collect();

        if matches.is_empty() {
            console.say(format!("Metric Filter '{name}' not found in {}", path.display()))?;
            return Ok(RestoreOutcome::NotFound);
        }

        if !confirm {
            let groups: Vec<&str> = matches.iter().map(|f| f.log_group_name.as_str()).collect();
            let question = format!(
                "Restore Metric Filter '{name}' to [{}] from {}?",
                groups.join(", "),
                path.display()
            );
            if !console.confirm(&question)? {
                console.say("Metric Filter not restored.")?;
                return Ok(RestoreOutcome::Declined);
            }
        }

        for filter in &matches {
            self.put_metric_filter(filter, true).await?;
        }
        console.say(format!("Metric Filter '{name}' restored."))?;
        Ok(RestoreOutcome::Restored)
    }
}
