use serde::{de::DeserializeOwned, Serialize};

use crate::core::{
    AlarmSearchBy, CompositeAlarm, FilterSearchBy, MatchMode, MetricAlarm, MetricFilter, SnsTopic,
};
use crate::error::Result;

/// Replaces every occurrence of `search` in the JSON text of `value`.
pub fn replace_object_string<T>(value: &T, search: &str, replace: &str) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let text = serde_json::to_string(value)?.replace(search, replace);
    Ok(serde_json::from_str(&text)?)
}

fn keep(haystack: &str, search: &str, mode: MatchMode) -> bool {
    match mode {
        MatchMode::Match => haystack.contains(search),
        MatchMode::Invert => !haystack.contains(search),
    }
}

fn filter_by<T, F>(items: &[T], search: &str, mode: MatchMode, haystack: F) -> Result<Vec<T>>
where
    T: Clone,
    F: Fn(&T) -> Result<String>,
{
    let mut found = Vec::new();
    for item in items {
        if keep(&haystack(item)?, search, mode) {
            found.push(item.clone());
        }
    }
    Ok(found)
}

fn metric_text(alarm: &MetricAlarm) -> Result<String> {
    let mut text = String::new();
    if let Some(namespace) = &alarm.namespace {
        text.push_str(namespace);
        text.push('\n');
    }
    if let Some(metric_name) = &alarm.metric_name {
        text.push_str(metric_name);
        text.push('\n');
    }
    text.push_str(&serde_json::to_string(&alarm.dimensions)?);
    text.push('\n');
    text.push_str(&serde_json::to_string(&alarm.metrics)?);
    Ok(text)
}

pub fn filter_metric_alarms(
    alarms: &[MetricAlarm],
    search: &str,
    mode: MatchMode,
    search_by: AlarmSearchBy,
) -> Result<Vec<MetricAlarm>> {
    filter_by(alarms, search, mode, |a| match search_by {
        AlarmSearchBy::All => Ok(serde_json::to_string(a)?),
        AlarmSearchBy::Name => Ok(a.alarm_name.clone()),
        AlarmSearchBy::Metrics => metric_text(a),
    })
}

/// Composite alarms have no metrics of their own; `Metrics` searches the rule.
pub fn filter_composite_alarms(
    alarms: &[CompositeAlarm],
    search: &str,
    mode: MatchMode,
    search_by: AlarmSearchBy,
) -> Result<Vec<CompositeAlarm>> {
    filter_by(alarms, search, mode, |a| match search_by {
        AlarmSearchBy::All => Ok(serde_json::to_string(a)?),
        AlarmSearchBy::Name => Ok(a.alarm_name.clone()),
        AlarmSearchBy::Metrics => Ok(a.alarm_rule.clone()),
    })
}

pub fn alarm_names<'a, I>(alarms: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a MetricAlarm>,
{
    alarms.into_iter().map(|a| a.alarm_name.clone()).collect()
}

/// Orders alarms by their reversed name, which groups alarms that share a
/// suffix such as `... [Checkout Service]`.
pub fn sort_alarms(alarms: &[MetricAlarm]) -> Vec<MetricAlarm> {
    let mut sorted = alarms.to_vec();
    sorted.sort_by_cached_key(|a| a.alarm_name.chars().rev().collect::<String>());
    sorted
}

pub fn filter_sns(topics: &[SnsTopic], search: &str, mode: MatchMode) -> Result<Vec<SnsTopic>> {
    filter_by(topics, search, mode, |t| Ok(serde_json::to_string(t)?))
}

pub fn filter_metric_filters(
    filters: &[MetricFilter],
    search: &str,
    mode: MatchMode,
    search_by: FilterSearchBy,
) -> Result<Vec<MetricFilter>> {
    filter_by(filters, search, mode, |f| match search_by {
        FilterSearchBy::All => Ok(serde_json::to_string(f)?),
        FilterSearchBy::Name => Ok(f.filter_name.clone()),
        FilterSearchBy::LogGroup => Ok(f.log_group_name.clone()),
    })
}

pub fn metric_filter_names(filters: &[MetricFilter]) -> Vec<String> {
    filters.iter().map(|f| f.filter_name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::{composite_alarm, metric_alarm, metric_filter};

    fn alarms() -> Vec<MetricAlarm> {
        let mut disk = metric_alarm("disk full [Checkout Service]");
        disk.metric_name = Some("disk_used_percent".to_string());
        disk.namespace = Some("CWAgent".to_string());
        vec![
            metric_alarm("cpu high [Checkout Service]"),
            metric_alarm("cpu high [Search Service]"),
            disk,
        ]
    }

    #[test]
    fn match_and_invert_partition_the_input() {
        let all = alarms();
        let hit = filter_metric_alarms(&all, "[Checkout Service]", MatchMode::Match, AlarmSearchBy::All)
            .unwrap();
        let miss =
            filter_metric_alarms(&all, "[Checkout Service]", MatchMode::Invert, AlarmSearchBy::All)
                .unwrap();
        assert_eq!(hit.len(), 2);
        assert_eq!(alarm_names(&miss), vec!["cpu high [Search Service]"]);
    }

    #[test]
    fn search_by_narrows_the_haystack() {
        let all = alarms();
        // the topic only appears in AlarmActions
        let by_all =
            filter_metric_alarms(&all, "ops-pager", MatchMode::Match, AlarmSearchBy::All).unwrap();
        let by_name =
            filter_metric_alarms(&all, "ops-pager", MatchMode::Match, AlarmSearchBy::Name).unwrap();
        assert_eq!(by_all.len(), 3);
        assert!(by_name.is_empty());

        let by_metric =
            filter_metric_alarms(&all, "CWAgent", MatchMode::Match, AlarmSearchBy::Metrics).unwrap();
        assert_eq!(alarm_names(&by_metric), vec!["disk full [Checkout Service]"]);
    }

    #[test]
    fn composite_metrics_search_uses_rule() {
        let composites = vec![composite_alarm("rollup")];
        let found =
            filter_composite_alarms(&composites, "disk-full", MatchMode::Match, AlarmSearchBy::Metrics)
                .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn sort_groups_by_suffix() {
        let sorted = sort_alarms(&alarms());
        assert_eq!(
            alarm_names(&sorted),
            vec![
                "cpu high [Search Service]",
                "cpu high [Checkout Service]",
                "disk full [Checkout Service]",
            ]
        );
    }

    #[test]
    fn replace_rewrites_nested_values() {
        let alarm = metric_alarm("cpu-high");
        let replaced = replace_object_string(&alarm, "i-0abc", "i-0def").unwrap();
        assert_eq!(replaced.dimensions[0].value, "i-0def");
        assert_eq!(replaced.alarm_name, "cpu-high");
    }

    #[test]
    fn metric_filters_filter_by_log_group() {
        let filters = vec![
            metric_filter("errors", "/app/web"),
            metric_filter("errors", "/app/worker"),
            metric_filter("timeouts", "/app/web"),
        ];
        let web =
            filter_metric_filters(&filters, "/app/web", MatchMode::Match, FilterSearchBy::LogGroup)
                .unwrap();
        assert_eq!(metric_filter_names(&web), vec!["errors", "timeouts"]);

        let not_errors =
            filter_metric_filters(&filters, "errors", MatchMode::Invert, FilterSearchBy::Name).unwrap();
        assert_eq!(metric_filter_names(&not_errors), vec!["timeouts"]);
    }

    #[test]
    fn sns_filter_matches_arn() {
        let topics = vec![
            SnsTopic {
                topic_arn: "arn:aws:sns:us-east-1:1:ops-pager".to_string(),
            },
            SnsTopic {
                topic_arn: "arn:aws:sns:us-east-1:1:billing".to_string(),
            },
        ];
        let found = filter_sns(&topics, "pager", MatchMode::Match).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name(), "ops-pager");
    }
}
