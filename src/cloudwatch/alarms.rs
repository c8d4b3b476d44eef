use std::io::{BufRead, Write};
use std::path::Path;

use tokio::sync::mpsc::Receiver;
use tracing::{debug, info};

use super::description::compose_cmdb_description;
use super::Session;
use crate::aws::CloudWatchApi;
use crate::core::{
    ActionType, Alarm, AlarmSet, CompositeAlarm, MetricAlarm, ModifyAction, RestoreOutcome,
    TreatMissingData, DEFAULT_ALARM_DESCRIPTION,
};
use crate::error::{FomoError, Result};
use crate::helpers::{print_table, replace_object_string, snapshot};
use crate::prompt::Console;
use crate::termination::{interrupted, Interrupted};

const NON_EMPTY: &[&str] = &["a non-empty name"];

pub(super) fn require_name(arg: &'static str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(FomoError::InvalidArgument {
            name: arg,
            value: name.to_string(),
            valid: NON_EMPTY,
        });
    }
    Ok(())
}

impl<B: CloudWatchApi> Session<B> {
    pub async fn get_alarm(&self, name: &str) -> Result<Alarm> {
        let set = self.backend.describe_alarms(&[name.to_string()]).await?;
        set.find(name)
            .ok_or_else(|| FomoError::AlarmNotFound(name.to_string()))
    }

    pub async fn get_all_alarms(&self) -> Result<AlarmSet> {
        let set = self.backend.describe_alarms(&[]).await?;
        debug!(
            "found {} metric and {} composite alarms",
            set.metric_alarms.len(),
            set.composite_alarms.len()
        );
        Ok(set)
    }

    async fn alarm_exists(&self, name: &str) -> Result<bool> {
        match self.get_alarm(name).await {
            Ok(_) => Ok(true),
            Err(FomoError::AlarmNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn guard_alarm_overwrite(&self, name: &str, overwrite: bool) -> Result<()> {
        if !overwrite && self.alarm_exists(name).await? {
            return Err(FomoError::AlreadyExists {
                kind: "Alarm",
                name: name.to_string(),
            });
        }
        Ok(())
    }

    pub async fn put_metric_alarm(&self, alarm: &MetricAlarm, overwrite: bool) -> Result<()> {
        self.guard_alarm_overwrite(&alarm.alarm_name, overwrite).await?;

        let mut alarm = alarm.clone();
        alarm.apply_write_defaults();
        debug!("putting {:?} alarm {}", alarm.shape()?, alarm.alarm_name);
        self.backend.put_metric_alarm(&alarm).await?;

        info!("Alarm '{}' written", alarm.alarm_name);
        Ok(())
    }

    pub async fn put_composite_alarm(&self, alarm: &CompositeAlarm, overwrite: bool) -> Result<()> {
        self.guard_alarm_overwrite(&alarm.alarm_name, overwrite).await?;

        let mut alarm = alarm.clone();
        if alarm.alarm_description.is_none() {
            alarm.alarm_description = Some(DEFAULT_ALARM_DESCRIPTION.to_string());
        }
        self.backend.put_composite_alarm(&alarm).await?;

        info!("Alarm '{}' written", alarm.alarm_name);
        Ok(())
    }

    /// Writes an alarm through the put that matches its kind.
    pub async fn put_alarm(&self, alarm: &Alarm, overwrite: bool) -> Result<()> {
        match alarm {
            Alarm::Metric(a) => self.put_metric_alarm(a, overwrite).await,
            Alarm::Composite(a) => self.put_composite_alarm(a, overwrite).await,
        }
    }

    pub async fn rename_alarm(&self, old_name: &str, new_name: &str, keep_old: bool) -> Result<()> {
        require_name("new_name", new_name)?;

        let mut alarm = self.get_alarm(old_name).await?;
        alarm.set_name(new_name);
        self.put_alarm(&alarm, false).await?;

        if !keep_old {
            self.delete_alarm(old_name, true).await?;
        }
        info!("Alarm '{old_name}' renamed to '{new_name}'");
        Ok(())
    }

    pub async fn copy_alarm(&self, name: &str, new_name: &str) -> Result<()> {
        self.rename_alarm(name, new_name, true).await
    }

    pub fn read_list<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
        prompt: &str,
    ) -> Result<Vec<String>> {
        Ok(console.read_list(prompt)?)
    }

    /// Reads alarm names from the console and fetches each one.
    pub async fn get_alarms_from_list<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
    ) -> Result<Vec<Alarm>> {
        let names = self.read_list(console, "Please paste newline delimited list of Alarm Names.")?;

        let mut alarms = Vec::with_capacity(names.len());
        for name in &names {
            alarms.push(self.get_alarm(name).await?);
        }
        console.say("Successfully found all alarms.")?;

        Ok(alarms)
    }

    /// Interactive bulk rename. Returns `false` when the user declines.
    ///
    /// Renamed alarms stay disabled.
    pub async fn rename_alarms_by_list<R: BufRead, W: Write>(
        &self,
        console: &mut Console<R, W>,
        interrupts: &mut Receiver<Interrupted>,
    ) -> Result<bool> {
        let alarms = self.get_alarms_from_list(console).await?;
        let new_names =
            self.read_list(console, "Please paste newline delimited list of NEW Alarm Names.")?;

        if alarms.len() != new_names.len() {
            return Err(FomoError::ListLengthMismatch {
                left: alarms.len(),
                right: new_names.len(),
            });
        }
        for name in &new_names {
            require_name("new_name", name)?;
        }

        let rows: Vec<Vec<String>> = alarms
            .iter()
            .zip(&new_names)
            .map(|(a, new)| vec![a.name().to_string(), new.clone()])
            .collect();
        print_table(&["Alarm Name", "New Alarm Name"], &rows, console.output())?;

        if !console.confirm("Do you want to rename these alarms?")? {
            console.say("No alarms renamed.")?;
            return Ok(false);
        }

        for (alarm, new_name) in alarms.iter().zip(&new_names) {
            if let Some(signal) = interrupted(interrupts) {
                info!("stopping bulk rename: {signal:?}");
                return Err(FomoError::Interrupted);
            }

            console.say(format!("Disabling alarm '{}'...", alarm.name()))?;
            self.disable_alarm(alarm.name()).await?;
            tokio::time::sleep(self.settle_delay).await;

            console.say(format!("Renaming '{}' to '{new_name}'...", alarm.name()))?;
            self.rename_alarm(alarm.name(), new_name, false).await?;
        }

        console.say("All alarms renamed. Renamed alarms are disabled.")?;
        let (enabled, disabled): (Vec<_>, Vec<_>) = alarms
            .iter()
            .zip(&new_names)
            .partition(|(alarm, _)| alarm.actions_enabled());
        let to_rows = |pairs: Vec<(&Alarm, &String)>| -> Vec<Vec<String>> {
            pairs
                .into_iter()
                .map(|(alarm, new)| vec![alarm.name().to_string(), new.clone()])
                .collect()
        };
        let headers = ["Alarm Name", "New Alarm Name"];

        console.say("Alarms that were enabled before the rename:")?;
        print_table(&headers, &to_rows(enabled), console.output())?;
        console.say("Alarms that were disabled before the rename:")?;
        print_table(&headers, &to_rows(disabled), console.output())?;

        Ok(true)
    }

    pub async fn delete_alarm(&self, name: &str, confirm: bool) -> Result<()> {
        if !confirm {
            return Err(FomoError::ConfirmationRequired {
                kind: "Alarm",
                name: name.to_string(),
            });
        }

        self.get_alarm(name).await?;
        self.backend.delete_alarms(&[name.to_string()]).await?;

        info!("Alarm '{name}' deleted");
        Ok(())
    }

    async fn set_actions_enabled(&self, name: &str, enabled: bool) -> Result<()> {
        let mut alarm = self.get_alarm(name).await?;
        alarm.set_actions_enabled(enabled);
        self.put_alarm(&alarm, true).await
    }

    pub async fn enable_alarm(&self, name: &str) -> Result<()> {
        self.set_actions_enabled(name, true).await
    }

    pub async fn disable_alarm(&self, name: &str) -> Result<()> {
        self.set_actions_enabled(name, false).await
    }

    /// Text replacement over the whole alarm record. Written back only when
    /// `apply` is set.
    pub async fn replace_active_alarm_string(
        &self,
        name: &str,
        search: &str,
        replace: &str,
        apply: bool,
    ) -> Result<Alarm> {
        let alarm = self.get_alarm(name).await?;
        let replaced = replace_object_string(&alarm, search, replace)?;

        if apply {
            self.put_alarm(&replaced, true).await?;
        }
        Ok(replaced)
    }

    /// Returns whether the action list changed.
    pub async fn modify_alarm_action(
        &self,
        name: &str,
        action: ModifyAction,
        action_type: ActionType,
        sns_name: &str,
    ) -> Result<bool> {
        let topic_arn = self.get_sns(sns_name).await?;
        let mut alarm = self.get_alarm(name).await?;

        let actions = alarm.actions_mut(action_type);
        let changed = match action {
            ModifyAction::Add if !actions.contains(&topic_arn) => {
                actions.push(topic_arn);
                true
            }
            ModifyAction::Remove if actions.contains(&topic_arn) => {
                actions.retain(|arn| arn != &topic_arn);
                true
            }
            _ => false,
        };

        if changed {
            self.put_alarm(&alarm, true).await?;
            info!("{action} {sns_name} {action_type} on '{name}'");
        } else {
            debug!("{action_type} of '{name}' already as requested");
        }
        Ok(changed)
    }

    pub async fn modify_alarm_treat_missing_data(
        &self,
        name: &str,
        treat_missing_data: TreatMissingData,
    ) -> Result<()> {
        match self.get_alarm(name).await? {
            Alarm::Metric(mut alarm) => {
                alarm.treat_missing_data = Some(treat_missing_data.to_string());
                self.put_metric_alarm(&alarm, true).await
            }
            Alarm::Composite(_) => Err(FomoError::BadAlarm(format!(
                "'{name}' is a composite alarm and has no TreatMissingData"
            ))),
        }
    }

    pub async fn modify_alarm_description(
        &self,
        name: &str,
        impacted_ci: &str,
        affected_ci: &str,
        details: &str,
        overwrite: bool,
    ) -> Result<Alarm> {
        let mut alarm = self.get_alarm(name).await?;
        let (description, changes) = compose_cmdb_description(
            alarm.description().unwrap_or_default(),
            impacted_ci,
            affected_ci,
            details,
            overwrite,
        )?;

        for change in &changes {
            info!(
                "{}: {} changed from \"{}\" to \"{}\"",
                name, change.field, change.from, change.to
            );
        }

        alarm.set_description(description);
        self.put_alarm(&alarm, true).await?;
        Ok(alarm)
    }

    pub async fn backup_alarm(&self, name: &str, path: &Path, overwrite: bool) -> Result<()> {
        snapshot::ensure_writable(path, overwrite)?;
        let alarm = self.get_alarm(name).await?;
        snapshot::write_snapshot(&alarm, path, overwrite)
    }

    pub async fn backup_all_alarms(&self, path: &Path, overwrite: bool) -> Result<()> {
        snapshot::ensure_writable(path, overwrite)?;
        let alarms = self.get_all_alarms().await?;
        snapshot::backup_alarms(&alarms, path, overwrite)
    }

    /// Puts the named alarm from an `AlarmSet` snapshot back with overwrite.
    pub async fn restore_alarm<R: BufRead, W: Write>(
        &self,
        path: &Path,
        name: &str,
        confirm: bool,
        console: &mut Console<R, W>,
    ) -> Result<RestoreOutcome> {
        let alarms = snapshot::load_alarms(path)?;
        let Some(alarm) = alarms.find(name) else {
            console.say(format!("Alarm '{name}' not found in {}", path.display()))?;
            return Ok(RestoreOutcome::NotFound);
        };

        if !confirm {
            let question = format!("Restore {} '{name}' from {}?", alarm.kind(), path.display());
            if !console.confirm(&question)? {
                console.say("Alarm not restored.")?;
                return Ok(RestoreOutcome::Declined);
            }
        }

        self.put_alarm(&alarm, true).await?;
        console.say(format!("Alarm '{name}' restored."))?;
        Ok(RestoreOutcome::Restored)
    }
}
