//! Flat JSON snapshot files for alarms, dashboards and metric filters.

use std::{fs, path::Path};

use serde::{de::DeserializeOwned, de::Error as _, Deserialize, Serialize};

use crate::core::{Alarm, AlarmSet, CompositeAlarm, Dashboard, MetricAlarm, MetricFilter};
use crate::error::{FomoError, Result};

/// Fails with `FileExists` unless the path is free or `overwrite` is set.
pub fn ensure_writable(path: &Path, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        return Err(FomoError::FileExists(path.to_path_buf()));
    }
    Ok(())
}

pub fn write_snapshot<T: Serialize + ?Sized>(value: &T, path: &Path, overwrite: bool) -> Result<()> {
    ensure_writable(path, overwrite)?;

    let content = serde_json::to_string(value)?;
    fs::write(path, content)?;
    tracing::info!("wrote snapshot {}", path.display());

    Ok(())
}

pub fn read_snapshot<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(FomoError::FileNotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| FomoError::InvalidSnapshot {
        path: path.to_path_buf(),
        source,
    })
}

pub fn backup_alarms(alarms: &AlarmSet, path: &Path, overwrite: bool) -> Result<()> {
    write_snapshot(alarms, path, overwrite)
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AlarmBackup {
    metric_alarms: Option<Vec<MetricAlarm>>,
    composite_alarms: Option<Vec<CompositeAlarm>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AlarmFile {
    One(Alarm),
    All(AlarmBackup),
}

/// Accepts both a full alarm backup and a single-alarm file. An object with
/// neither alarm list is not an alarm backup.
pub fn load_alarms(path: &Path) -> Result<AlarmSet> {
    Ok(match read_snapshot(path)? {
        AlarmFile::All(AlarmBackup {
            metric_alarms: None,
            composite_alarms: None,
        }) => {
            return Err(FomoError::InvalidSnapshot {
                path: path.to_path_buf(),
                source: serde_json::Error::custom(
                    "expected MetricAlarms or CompositeAlarms, or a single alarm",
                ),
            })
        }
        AlarmFile::All(backup) => AlarmSet {
            metric_alarms: backup.metric_alarms.unwrap_or_default(),
            composite_alarms: backup.composite_alarms.unwrap_or_default(),
        },
        AlarmFile::One(Alarm::Metric(a)) => AlarmSet {
            metric_alarms: vec![a],
            ..Default::default()
        },
        AlarmFile::One(Alarm::Composite(a)) => AlarmSet {
            composite_alarms: vec![a],
            ..Default::default()
        },
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Accepts both a full dashboard backup and a single-dashboard file.
pub fn load_dashboards(path: &Path) -> Result<Vec<Dashboard>> {
    Ok(match read_snapshot(path)? {
        OneOrMany::Many(dashboards) => dashboards,
        OneOrMany::One(dashboard) => vec![dashboard],
    })
}

pub fn load_metric_filters(path: &Path) -> Result<Vec<MetricFilter>> {
    read_snapshot(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::{composite_alarm, metric_alarm};

    #[test]
    fn existing_file_needs_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alarms.json");
        let alarms = AlarmSet {
            metric_alarms: vec![metric_alarm("cpu-high")],
            composite_alarms: vec![composite_alarm("rollup")],
        };

        backup_alarms(&alarms, &path, false).unwrap();
        assert!(matches!(
            backup_alarms(&alarms, &path, false),
            Err(FomoError::FileExists(_))
        ));
        backup_alarms(&alarms, &path, true).unwrap();

        assert_eq!(load_alarms(&path).unwrap(), alarms);
    }

    #[test]
    fn missing_and_garbled_files_are_distinct_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(load_dashboards(&missing), Err(FomoError::FileNotFound(_))));

        let garbled = dir.path().join("garbled.json");
        fs::write(&garbled, "{\"MetricAlarms\": [").unwrap();
        assert!(matches!(
            load_alarms(&garbled),
            Err(FomoError::InvalidSnapshot { .. })
        ));
    }

    #[test]
    fn objects_without_alarm_lists_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for (file, content) in [("empty.json", "{}"), ("other.json", r#"{"foo": 1}"#)] {
            let path = dir.path().join(file);
            fs::write(&path, content).unwrap();
            assert!(matches!(
                load_alarms(&path),
                Err(FomoError::InvalidSnapshot { .. })
            ));
        }

        let path = dir.path().join("composites.json");
        fs::write(&path, r#"{"CompositeAlarms": []}"#).unwrap();
        assert!(load_alarms(&path).unwrap().is_empty());
    }

    #[test]
    fn single_alarm_file_loads_as_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rollup.json");
        write_snapshot(&composite_alarm("rollup"), &path, false).unwrap();

        let alarms = load_alarms(&path).unwrap();
        assert!(alarms.metric_alarms.is_empty());
        assert_eq!(alarms.composite_alarms[0].alarm_name, "rollup");
    }

    #[test]
    fn single_dashboard_file_loads_as_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkout.json");
        fs::write(
            &path,
            r#"{"DashboardName": "checkout", "DashboardBody": "{\"widgets\":[]}"}"#,
        )
        .unwrap();

        let dashboards = load_dashboards(&path).unwrap();
        assert_eq!(dashboards.len(), 1);
        assert_eq!(dashboards[0].dashboard_name, "checkout");
    }

    #[test]
    fn reads_vendor_shaped_metric_filter_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.json");
        fs::write(
            &path,
            r#"[{"filterName": "errors", "filterPattern": "ERROR", "logGroupName": "/app/web",
                "creationTime": 1700000000000,
                "metricTransformations": [{"metricName": "Errors", "metricNamespace": "App", "metricValue": "1"}]}]"#,
        )
        .unwrap();

        let filters = load_metric_filters(&path).unwrap();
        assert_eq!(filters[0].log_group_name, "/app/web");
        assert_eq!(filters[0].metric_transformations[0].metric_name, "Errors");
    }
}
