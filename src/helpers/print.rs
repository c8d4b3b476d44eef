//! Human-oriented renderings of alarms, log groups and metric filters.

use std::io::{self, Write};

use tabled::{builder::Builder, settings::Style};

use crate::core::{
    topic_name, AlarmField, CompositeAlarm, LogGroup, MetricAlarm, MetricFilter,
    DEFAULT_TREAT_MISSING_DATA,
};

fn list(items: &[String]) -> String {
    format!("[{}]", items.join(", "))
}

fn sorted(items: &[String]) -> Vec<String> {
    let mut items = items.to_vec();
    items.sort();
    items
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn metric_field(alarm: &MetricAlarm, field: AlarmField) -> String {
    match field {
        AlarmField::All | AlarmField::AlarmName => alarm.alarm_name.clone(),
        AlarmField::StateValue => or_dash(alarm.state_value.as_deref()),
        AlarmField::ActionsEnabled => alarm.actions_enabled.to_string(),
        AlarmField::TreatMissingData => alarm
            .treat_missing_data
            .clone()
            .unwrap_or_else(|| DEFAULT_TREAT_MISSING_DATA.to_string()),
    }
}

pub fn print_metric_alarms(
    alarms: &[MetricAlarm],
    field: AlarmField,
    out: &mut impl Write,
) -> io::Result<()> {
    if field != AlarmField::All {
        for a in alarms {
            if field == AlarmField::AlarmName {
                writeln!(out, "{}", a.alarm_name)?;
            } else {
                writeln!(out, "{},{}", metric_field(a, field), a.alarm_name)?;
            }
        }
        return Ok(());
    }

    for a in alarms {
        let datapoints = a.datapoints_to_alarm.unwrap_or(a.evaluation_periods);

        writeln!(out, "AlarmName : {}", a.alarm_name)?;
        writeln!(out, "  Overview: ")?;
        writeln!(out, "  - StateValue    : {}", or_dash(a.state_value.as_deref()))?;
        writeln!(out, "  - ActionsEnabled: {}", a.actions_enabled)?;
        writeln!(out, "  Conditions:")?;
        if a.threshold_metric_id.is_some() {
            // anomaly detection bands have no static threshold
            writeln!(out, "  - Threshold:  {}", a.comparison_operator)?;
            writeln!(
                out,
                "  - Datapoints: {}/{} datapoints",
                datapoints, a.evaluation_periods
            )?;
        } else {
            writeln!(
                out,
                "  - Threshold:        {} {}",
                a.comparison_operator,
                or_dash(a.threshold)
            )?;
            writeln!(
                out,
                "  - Datapoints:       {}/{} datapoints",
                datapoints, a.evaluation_periods
            )?;
        }
        writeln!(
            out,
            "  - TreatMissingData: {}",
            metric_field(a, AlarmField::TreatMissingData)
        )?;
        writeln!(out, "  Metrics:")?;
        if let Some(metric_name) = &a.metric_name {
            let dimensions: Vec<String> = a
                .dimensions
                .iter()
                .map(|d| format!("{}={}", d.name, d.value))
                .collect();
            writeln!(out, "  - Namespace : {}", or_dash(a.namespace.as_deref()))?;
            writeln!(out, "  - MetricName: {metric_name}")?;
            writeln!(out, "  - Dimensions: {}", list(&dimensions))?;
        } else {
            for m in &a.metrics {
                match (&m.expression, &m.metric_stat) {
                    (Some(expression), _) => writeln!(out, "    - {}: {}", m.id, expression)?,
                    (None, Some(stat)) => writeln!(
                        out,
                        "    - {}: {}/{} {} {}s",
                        m.id,
                        or_dash(stat.metric.namespace.as_deref()),
                        or_dash(stat.metric.metric_name.as_deref()),
                        stat.stat,
                        stat.period
                    )?,
                    (None, None) => writeln!(out, "    - {}: -", m.id)?,
                }
            }
        }
        writeln!(out, "  Actions:")?;
        writeln!(out, "  - AlarmActions  : {}", list(&sorted(&a.alarm_actions)))?;
        writeln!(out, "  - OKActions     : {}", list(&sorted(&a.ok_actions)))?;
        writeln!(
            out,
            "  - NoDataActions : {}",
            list(&sorted(&a.insufficient_data_actions))
        )?;
        writeln!(out)?;
    }

    Ok(())
}

pub fn print_composite_alarms(
    alarms: &[CompositeAlarm],
    field: AlarmField,
    out: &mut impl Write,
) -> io::Result<()> {
    if field != AlarmField::All {
        for a in alarms {
            let value = match field {
                AlarmField::All | AlarmField::AlarmName => {
                    writeln!(out, "{}", a.alarm_name)?;
                    continue;
                }
                AlarmField::StateValue => or_dash(a.state_value.as_deref()),
                AlarmField::ActionsEnabled => a.actions_enabled.to_string(),
                AlarmField::TreatMissingData => "-".to_string(),
            };
            writeln!(out, "{},{}", value, a.alarm_name)?;
        }
        return Ok(());
    }

    for a in alarms {
        writeln!(out, "AlarmName : {}", a.alarm_name)?;
        writeln!(out, "  Overview: ")?;
        writeln!(out, "  - StateValue    : {}", or_dash(a.state_value.as_deref()))?;
        writeln!(out, "  - ActionsEnabled: {}", a.actions_enabled)?;
        writeln!(out, "  Rule:")?;
        writeln!(out, "  - {}", a.alarm_rule)?;
        writeln!(out, "  Actions:")?;
        writeln!(out, "  - AlarmActions  : {}", list(&sorted(&a.alarm_actions)))?;
        writeln!(out, "  - OKActions     : {}", list(&sorted(&a.ok_actions)))?;
        writeln!(
            out,
            "  - NoDataActions : {}",
            list(&sorted(&a.insufficient_data_actions))
        )?;
        writeln!(out)?;
    }

    Ok(())
}

/// `AlarmName;[topic, ...]` rows for spreadsheet import.
pub fn print_alarms_for_csv(alarms: &[MetricAlarm], out: &mut impl Write) -> io::Result<()> {
    for a in alarms {
        let topics: Vec<String> = sorted(&a.alarm_actions)
            .iter()
            .map(|arn| topic_name(arn).to_string())
            .collect();
        writeln!(out, "{};{}", a.alarm_name, list(&topics))?;
    }
    Ok(())
}

pub fn print_log_groups(log_groups: &[LogGroup], out: &mut impl Write) -> io::Result<()> {
    for lg in log_groups {
        writeln!(out, "{}", lg.log_group_name)?;
    }
    Ok(())
}

pub fn print_metric_filters(filters: &[MetricFilter], out: &mut impl Write) -> io::Result<()> {
    for mf in filters {
        writeln!(out, "FilterName : {}", mf.filter_name)?;
        writeln!(out, "  Overview: ")?;
        writeln!(out, "  - LogGroup     : {}", mf.log_group_name)?;
        writeln!(out, "  - FilterPattern: {}", mf.filter_pattern)?;
        writeln!(out, "  Metric Transformations:")?;
        match mf.metric_transformations.first() {
            Some(t) => {
                let dimensions = t.dimensions.as_ref().map(|d| {
                    let pairs: Vec<String> = d.iter().map(|(k, v)| format!("{k}={v}")).collect();
                    list(&pairs)
                });
                writeln!(out, "  - Metric Name   : {}", t.metric_name)?;
                writeln!(out, "  - Namespace     : {}", t.metric_namespace)?;
                writeln!(out, "  - Metric Value  : {}", t.metric_value)?;
                writeln!(out, "  - Default Value : {}", or_dash(t.default_value))?;
                writeln!(out, "  - Units         : {}", or_dash(t.unit.as_deref()))?;
                writeln!(out, "  - Dimensions    : {}", or_dash(dimensions))?;
            }
            None => writeln!(out, "  - (none)")?,
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Renders rows under a header line as a plain text table.
pub fn print_table(
    headers: &[&str],
    rows: &[Vec<String>],
    out: &mut impl Write,
) -> io::Result<()> {
    let mut builder = Builder::new();
    builder.push_record(headers.iter().map(|h| h.to_string()));
    for row in rows {
        builder.push_record(row.iter().cloned());
    }

    let mut table = builder.build();
    writeln!(out, "{}", table.with(Style::psql()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::{composite_alarm, metric_alarm, metric_filter};
    use crate::core::MetricQuery;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn single_field_rows_end_with_alarm_name() {
        let alarms = vec![metric_alarm("cpu-high")];
        assert_eq!(
            render(|o| print_metric_alarms(&alarms, AlarmField::StateValue, o)),
            "OK,cpu-high\n"
        );
        assert_eq!(
            render(|o| print_metric_alarms(&alarms, AlarmField::TreatMissingData, o)),
            "missing,cpu-high\n"
        );
        assert_eq!(
            render(|o| print_metric_alarms(&alarms, AlarmField::AlarmName, o)),
            "cpu-high\n"
        );
    }

    #[test]
    fn full_block_defaults_datapoints_and_sorts_actions() {
        let mut alarm = metric_alarm("cpu-high");
        alarm.alarm_actions = vec!["arn:b".to_string(), "arn:a".to_string()];
        let text = render(|o| print_metric_alarms(&[alarm], AlarmField::All, o));

        assert!(text.starts_with("AlarmName : cpu-high\n"));
        assert!(text.contains("  - Threshold:        GreaterThanThreshold 80\n"));
        assert!(text.contains("  - Datapoints:       3/3 datapoints\n"));
        assert!(text.contains("  - Dimensions: [InstanceId=i-0abc]\n"));
        assert!(text.contains("  - AlarmActions  : [arn:a, arn:b]\n"));
    }

    #[test]
    fn math_alarm_lists_each_query() {
        let mut alarm = metric_alarm("error-rate");
        alarm.metric_name = None;
        alarm.metrics = vec![MetricQuery {
            id: "e1".to_string(),
            expression: Some("errors / requests * 100".to_string()),
            ..Default::default()
        }];
        let text = render(|o| print_metric_alarms(&[alarm], AlarmField::All, o));
        assert!(text.contains("    - e1: errors / requests * 100\n"));
    }

    #[test]
    fn composite_block_shows_rule() {
        let text = render(|o| print_composite_alarms(&[composite_alarm("rollup")], AlarmField::All, o));
        assert!(text.contains("  Rule:\n  - ALARM(\"cpu-high\") OR ALARM(\"disk-full\")\n"));
    }

    #[test]
    fn csv_rows_use_topic_names() {
        let text = render(|o| print_alarms_for_csv(&[metric_alarm("cpu-high")], o));
        assert_eq!(text, "cpu-high;[ops-pager]\n");
    }

    #[test]
    fn metric_filter_block_dashes_missing_values() {
        let text = render(|o| print_metric_filters(&[metric_filter("errors", "/app/web")], o));
        assert!(text.contains("  - Metric Name   : errorsCount\n"));
        assert!(text.contains("  - Default Value : -\n"));
        assert!(text.contains("  - Dimensions    : -\n"));
    }

    #[test]
    fn table_contains_every_cell() {
        let rows = vec![vec!["old-a".to_string(), "new-a".to_string()]];
        let text = render(|o| print_table(&["Alarm Name", "New Alarm Name"], &rows, o));
        assert!(text.contains("Alarm Name"));
        assert!(text.contains("old-a"));
        assert!(text.contains("new-a"));
    }
}
