//! Typed mirrors of the vendor records `fomo` reads and writes.
//!
//! Field names follow the vendor JSON (PascalCase for CloudWatch, camelCase for
//! CloudWatch Logs) so snapshot files stay interchangeable with what the AWS
//! APIs and other tooling emit. Fields that are not modelled survive a
//! load/save cycle through the flattened `extra` maps.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FomoError, Result};

pub const DEFAULT_TREAT_MISSING_DATA: &str = "missing";
pub const DEFAULT_ALARM_DESCRIPTION: &str = "No description";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct MetricId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_name: Option<String>,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct MetricStat {
    pub metric: MetricId,
    pub period: i32,
    pub stat: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// One entry of an alarm's `Metrics` list: either a metric lookup or a math
/// expression over other entries.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct MetricQuery {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_stat: Option<MetricStat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_data: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MetricAlarm {
    pub alarm_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_description: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub actions_enabled: bool,
    #[serde(rename = "OKActions", default)]
    pub ok_actions: Vec<String>,
    #[serde(default)]
    pub alarm_actions: Vec<String>,
    #[serde(default)]
    pub insufficient_data_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_statistic: Option<String>,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub evaluation_periods: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datapoints_to_alarm: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    pub comparison_operator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treat_missing_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluate_low_sample_count_percentile: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<MetricQuery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_metric_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The four payload layouts `PutMetricAlarm` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmShape {
    StandardStatistic,
    ExtendedStatistic,
    AnomalyDetection,
    MetricMath,
}

impl MetricAlarm {
    /// Fills in the fields CloudWatch would otherwise reset on write-back.
    pub fn apply_write_defaults(&mut self) {
        if self.treat_missing_data.is_none() {
            self.treat_missing_data = Some(DEFAULT_TREAT_MISSING_DATA.to_string());
        }
        if self.datapoints_to_alarm.is_none() {
            self.datapoints_to_alarm = Some(self.evaluation_periods);
        }
        if self.alarm_description.is_none() {
            self.alarm_description = Some(DEFAULT_ALARM_DESCRIPTION.to_string());
        }
    }

    pub fn shape(&self) -> Result<AlarmShape> {
        let has = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());

        if has(&self.metric_name) {
            if has(&self.statistic) {
                return Ok(AlarmShape::StandardStatistic);
            }
            if has(&self.extended_statistic) {
                return Ok(AlarmShape::ExtendedStatistic);
            }
        }
        if !self.metrics.is_empty() {
            if self.threshold_metric_id.is_some() {
                return Ok(AlarmShape::AnomalyDetection);
            }
            return Ok(AlarmShape::MetricMath);
        }

        Err(FomoError::BadAlarm(format!(
            "alarm '{}' has neither a single metric with a statistic nor a Metrics list",
            self.alarm_name
        )))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CompositeAlarm {
    pub alarm_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_description: Option<String>,
    pub alarm_rule: String,
    #[serde(default = "enabled_by_default")]
    pub actions_enabled: bool,
    #[serde(rename = "OKActions", default)]
    pub ok_actions: Vec<String>,
    #[serde(default)]
    pub alarm_actions: Vec<String>,
    #[serde(default)]
    pub insufficient_data_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_reason: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmKind {
    MetricAlarm,
    CompositeAlarm,
}

impl fmt::Display for AlarmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MetricAlarm => write!(f, "MetricAlarm"),
            Self::CompositeAlarm => write!(f, "CompositeAlarm"),
        }
    }
}

/// A single alarm of either kind.
///
/// Untagged: a record with `ComparisonOperator` parses as a metric alarm, one
/// with `AlarmRule` as a composite alarm, and anything else is rejected.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Alarm {
    Metric(MetricAlarm),
    Composite(CompositeAlarm),
}

impl Alarm {
    pub fn kind(&self) -> AlarmKind {
        match self {
            Self::Metric(_) => AlarmKind::MetricAlarm,
            Self::Composite(_) => AlarmKind::CompositeAlarm,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Metric(a) => &a.alarm_name,
            Self::Composite(a) => &a.alarm_name,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        match self {
            Self::Metric(a) => a.alarm_name = name,
            Self::Composite(a) => a.alarm_name = name,
        }
    }

    pub fn actions_enabled(&self) -> bool {
        match self {
            Self::Metric(a) => a.actions_enabled,
            Self::Composite(a) => a.actions_enabled,
        }
    }

    pub fn set_actions_enabled(&mut self, enabled: bool) {
        match self {
            Self::Metric(a) => a.actions_enabled = enabled,
            Self::Composite(a) => a.actions_enabled = enabled,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Metric(a) => a.alarm_description.as_deref(),
            Self::Composite(a) => a.alarm_description.as_deref(),
        }
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        let description = Some(description.into());
        match self {
            Self::Metric(a) => a.alarm_description = description,
            Self::Composite(a) => a.alarm_description = description,
        }
    }

    pub fn actions_mut(&mut self, action_type: ActionType) -> &mut Vec<String> {
        let (ok, alarm, insufficient) = match self {
            Self::Metric(a) => (
                &mut a.ok_actions,
                &mut a.alarm_actions,
                &mut a.insufficient_data_actions,
            ),
            Self::Composite(a) => (
                &mut a.ok_actions,
                &mut a.alarm_actions,
                &mut a.insufficient_data_actions,
            ),
        };
        match action_type {
            ActionType::OkActions => ok,
            ActionType::AlarmActions => alarm,
            ActionType::InsufficientDataActions => insufficient,
        }
    }
}

/// Every alarm in a region, as `DescribeAlarms` returns them.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct AlarmSet {
    #[serde(default)]
    pub metric_alarms: Vec<MetricAlarm>,
    #[serde(default)]
    pub composite_alarms: Vec<CompositeAlarm>,
}

impl AlarmSet {
    pub fn is_empty(&self) -> bool {
        self.metric_alarms.is_empty() && self.composite_alarms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.metric_alarms.len() + self.composite_alarms.len()
    }

    /// Looks an alarm up by name, preferring metric alarms.
    pub fn find(&self, name: &str) -> Option<Alarm> {
        self.metric_alarms
            .iter()
            .find(|a| a.alarm_name == name)
            .cloned()
            .map(Alarm::Metric)
            .or_else(|| {
                self.composite_alarms
                    .iter()
                    .find(|a| a.alarm_name == name)
                    .cloned()
                    .map(Alarm::Composite)
            })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Dashboard {
    pub dashboard_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_arn: Option<String>,
    pub dashboard_body: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SnsTopic {
    pub topic_arn: String,
}

impl SnsTopic {
    /// The topic name, i.e. the last `:` segment of the ARN.
    pub fn name(&self) -> &str {
        topic_name(&self.topic_arn)
    }
}

pub fn topic_name(arn: &str) -> &str {
    arn.rsplit(':').next().unwrap_or(arn)
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct Subscription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_arn: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LogGroup {
    pub log_group_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_in_days: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_filter_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_bytes: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MetricTransformation {
    pub metric_name: String,
    pub metric_namespace: String,
    pub metric_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<std::collections::BTreeMap<String, String>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricFilter {
    pub filter_name: String,
    pub log_group_name: String,
    #[serde(default)]
    pub filter_pattern: String,
    #[serde(default)]
    pub metric_transformations: Vec<MetricTransformation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Declares a closed set of string options whose parse error lists every
/// accepted value.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $arg:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const VALID: &'static [&'static str] = &[$($text),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = FomoError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(FomoError::InvalidArgument {
                        name: $arg,
                        value: s.to_string(),
                        valid: Self::VALID,
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(ModifyAction, "modify_action" {
    Add => "add",
    Remove => "remove",
});

string_enum!(ActionType, "action_type" {
    OkActions => "OKActions",
    AlarmActions => "AlarmActions",
    InsufficientDataActions => "InsufficientDataActions",
});

string_enum!(TreatMissingData, "treat_missing_data" {
    Missing => "missing",
    Breaching => "breaching",
    NotBreaching => "notBreaching",
    Ignore => "ignore",
});

string_enum!(SubscriptionProtocol, "subscription_type" {
    Email => "email",
    Https => "https",
});

string_enum!(MatchMode, "match_invert" {
    Match => "match",
    Invert => "invert",
});

string_enum!(
    /// What part of an alarm a filter looks at.
    AlarmSearchBy, "search_by" {
    All => "all",
    Name => "name",
    Metrics => "metrics",
});

string_enum!(FilterSearchBy, "search_by" {
    All => "all",
    Name => "name",
    LogGroup => "logGroup",
});

string_enum!(AlarmField, "field" {
    All => "all",
    AlarmName => "AlarmName",
    StateValue => "StateValue",
    ActionsEnabled => "ActionsEnabled",
    TreatMissingData => "TreatMissingData",
});

string_enum!(TemplateSearchBy, "search_method" {
    Name => "name",
    TemplateIds => "template_ids",
    TriggerIds => "trigger_ids",
});

string_enum!(MaintenanceSearchBy, "search_method" {
    Name => "name",
    MaintenanceIds => "maintenance_ids",
});

/// What happened to a restore request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored,
    Declined,
    NotFound,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn metric_alarm(name: &str) -> MetricAlarm {
        MetricAlarm {
            alarm_name: name.to_string(),
            alarm_arn: Some(format!(
                "arn:aws:cloudwatch:us-east-1:123456789012:alarm:{name}"
            )),
            alarm_description: None,
            actions_enabled: true,
            ok_actions: vec![],
            alarm_actions: vec!["arn:aws:sns:us-east-1:123456789012:ops-pager".to_string()],
            insufficient_data_actions: vec![],
            state_value: Some("OK".to_string()),
            state_reason: None,
            metric_name: Some("CPUUtilization".to_string()),
            namespace: Some("AWS/EC2".to_string()),
            statistic: Some("Average".to_string()),
            extended_statistic: None,
            dimensions: vec![Dimension {
                name: "InstanceId".to_string(),
                value: "i-0abc".to_string(),
            }],
            period: Some(300),
            unit: None,
            evaluation_periods: 3,
            datapoints_to_alarm: None,
            threshold: Some(80.0),
            comparison_operator: "GreaterThanThreshold".to_string(),
            treat_missing_data: None,
            evaluate_low_sample_count_percentile: None,
            metrics: vec![],
            threshold_metric_id: None,
            extra: Map::new(),
        }
    }

    pub fn composite_alarm(name: &str) -> CompositeAlarm {
        CompositeAlarm {
            alarm_name: name.to_string(),
            alarm_arn: None,
            alarm_description: Some("rollup".to_string()),
            alarm_rule: "ALARM(\"cpu-high\") OR ALARM(\"disk-full\")".to_string(),
            actions_enabled: true,
            ok_actions: vec![],
            alarm_actions: vec![],
            insufficient_data_actions: vec![],
            state_value: Some("OK".to_string()),
            state_reason: None,
            extra: Map::new(),
        }
    }

    pub fn metric_filter(name: &str, log_group: &str) -> MetricFilter {
        MetricFilter {
            filter_name: name.to_string(),
            log_group_name: log_group.to_string(),
            filter_pattern: "ERROR".to_string(),
            metric_transformations: vec![MetricTransformation {
                metric_name: format!("{name}Count"),
                metric_namespace: "App".to_string(),
                metric_value: "1".to_string(),
                default_value: None,
                unit: None,
                dimensions: None,
            }],
            creation_time: None,
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn write_defaults_fill_only_missing_fields() {
        let mut alarm = metric_alarm("cpu-high");
        alarm.treat_missing_data = Some("breaching".to_string());
        alarm.apply_write_defaults();

        assert_eq!(alarm.treat_missing_data.as_deref(), Some("breaching"));
        assert_eq!(alarm.datapoints_to_alarm, Some(3));
        assert_eq!(alarm.alarm_description.as_deref(), Some("No description"));
    }

    #[test]
    fn shape_detection_covers_every_payload_layout() {
        let standard = metric_alarm("a");
        assert_eq!(standard.shape().unwrap(), AlarmShape::StandardStatistic);

        let mut extended = metric_alarm("b");
        extended.statistic = None;
        extended.extended_statistic = Some("p99".to_string());
        assert_eq!(extended.shape().unwrap(), AlarmShape::ExtendedStatistic);

        let mut math = metric_alarm("c");
        math.metric_name = None;
        math.statistic = None;
        math.metrics = vec![MetricQuery {
            id: "e1".to_string(),
            expression: Some("m1 + m2".to_string()),
            ..Default::default()
        }];
        assert_eq!(math.shape().unwrap(), AlarmShape::MetricMath);

        let mut anomaly = math.clone();
        anomaly.threshold_metric_id = Some("ad1".to_string());
        assert_eq!(anomaly.shape().unwrap(), AlarmShape::AnomalyDetection);

        let mut broken = metric_alarm("d");
        broken.metric_name = None;
        assert!(matches!(broken.shape(), Err(FomoError::BadAlarm(_))));
    }

    #[test]
    fn alarm_kind_follows_distinguishing_field() {
        let metric: Alarm = serde_json::from_value(json!({
            "AlarmName": "cpu-high",
            "ComparisonOperator": "GreaterThanThreshold",
            "EvaluationPeriods": 1,
            "MetricName": "CPUUtilization",
            "Statistic": "Average",
            "AlarmConfigurationUpdatedTimestamp": "2024-01-01 00:00:00+00:00"
        }))
        .unwrap();
        assert_eq!(metric.kind(), AlarmKind::MetricAlarm);

        let composite: Alarm = serde_json::from_value(json!({
            "AlarmName": "rollup",
            "AlarmRule": "ALARM(cpu-high)"
        }))
        .unwrap();
        assert_eq!(composite.kind(), AlarmKind::CompositeAlarm);

        let neither = serde_json::from_value::<Alarm>(json!({"AlarmName": "x"}));
        assert!(neither.is_err());
    }

    #[test]
    fn unknown_vendor_fields_survive_a_round_trip() {
        let raw = json!({
            "AlarmName": "cpu-high",
            "ComparisonOperator": "GreaterThanThreshold",
            "EvaluationPeriods": 1,
            "OKActions": ["arn:aws:sns:us-east-1:1:ok"],
            "StateUpdatedTimestamp": "2024-01-01 00:00:00+00:00"
        });
        let alarm: MetricAlarm = serde_json::from_value(raw).unwrap();
        assert_eq!(alarm.ok_actions, vec!["arn:aws:sns:us-east-1:1:ok"]);

        let back = serde_json::to_value(&alarm).unwrap();
        assert_eq!(back["StateUpdatedTimestamp"], "2024-01-01 00:00:00+00:00");
        assert_eq!(back["OKActions"][0], "arn:aws:sns:us-east-1:1:ok");
    }

    #[test]
    fn invalid_option_lists_valid_values() {
        let err = "sometimes".parse::<TreatMissingData>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("sometimes"));
        assert!(msg.contains("notBreaching"));

        assert_eq!(
            "InsufficientDataActions".parse::<ActionType>().unwrap(),
            ActionType::InsufficientDataActions
        );
    }

    #[test]
    fn alarm_set_prefers_metric_alarms() {
        let set = AlarmSet {
            metric_alarms: vec![metric_alarm("shared")],
            composite_alarms: vec![composite_alarm("shared"), composite_alarm("rollup")],
        };
        assert_eq!(set.find("shared").unwrap().kind(), AlarmKind::MetricAlarm);
        assert_eq!(set.find("rollup").unwrap().kind(), AlarmKind::CompositeAlarm);
        assert!(set.find("missing").is_none());
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn topic_name_is_last_arn_segment() {
        let topic = SnsTopic {
            topic_arn: "arn:aws:sns:us-east-1:123456789012:ops-pager".to_string(),
        };
        assert_eq!(topic.name(), "ops-pager");
    }
}
