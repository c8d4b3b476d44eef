use aws_sdk_cloudwatch::{
    error::SdkError,
    types::{
        builders::{MetricBuilder, MetricDataQueryBuilder, MetricStatBuilder},
        AlarmType, ComparisonOperator, Dimension as SdkDimension, MetricDataQuery, StandardUnit,
        Statistic,
    },
};
use serde_json::Map;

use crate::core::{
    AlarmSet, AlarmShape, CompositeAlarm, Dashboard, Dimension, MetricAlarm, MetricId,
    MetricQuery, MetricStat,
};
use crate::error::{FomoError, Result};

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

fn dimension_from_sdk(d: &SdkDimension) -> Dimension {
    Dimension {
        name: d.name().unwrap_or_default().to_string(),
        value: d.value().unwrap_or_default().to_string(),
    }
}

fn dimension_to_sdk(d: &Dimension) -> SdkDimension {
    SdkDimension::builder()
        .name(d.name.clone())
        .value(d.value.clone())
        .build()
}

pub(crate) fn metric_query_from_sdk(q: &MetricDataQuery) -> MetricQuery {
    MetricQuery {
        id: q.id().unwrap_or_default().to_string(),
        metric_stat: q.metric_stat().map(|stat| MetricStat {
            metric: stat
                .metric()
                .map(|m| MetricId {
                    namespace: owned(m.namespace()),
                    metric_name: owned(m.metric_name()),
                    dimensions: m.dimensions().iter().map(dimension_from_sdk).collect(),
                })
                .unwrap_or_default(),
            period: stat.period().unwrap_or_default(),
            stat: stat.stat().unwrap_or_default().to_string(),
            unit: stat.unit().map(|u| u.as_str().to_string()),
        }),
        expression: owned(q.expression()),
        label: owned(q.label()),
        return_data: q.return_data(),
        period: q.period(),
        account_id: owned(q.account_id()),
    }
}

pub(crate) fn metric_query_to_sdk(q: &MetricQuery) -> MetricDataQuery {
    let metric_stat = q.metric_stat.as_ref().map(|stat| {
        MetricStatBuilder::default()
            .metric(
                MetricBuilder::default()
                    .set_namespace(stat.metric.namespace.clone())
                    .set_metric_name(stat.metric.metric_name.clone())
                    .set_dimensions(Some(
                        stat.metric.dimensions.iter().map(dimension_to_sdk).collect(),
                    ))
                    .build(),
            )
            .period(stat.period)
            .stat(stat.stat.clone())
            .set_unit(stat.unit.as_deref().map(StandardUnit::from))
            .build()
    });

    MetricDataQueryBuilder::default()
        .id(q.id.clone())
        .set_metric_stat(metric_stat)
        .set_expression(q.expression.clone())
        .set_label(q.label.clone())
        .set_return_data(q.return_data)
        .set_period(q.period)
        .set_account_id(q.account_id.clone())
        .build()
}

pub(crate) fn metric_alarm_from_sdk(a: &aws_sdk_cloudwatch::types::MetricAlarm) -> MetricAlarm {
    MetricAlarm {
        alarm_name: a.alarm_name().unwrap_or_default().to_string(),
        alarm_arn: owned(a.alarm_arn()),
        alarm_description: owned(a.alarm_description()),
        actions_enabled: a.actions_enabled().unwrap_or(true),
        ok_actions: a.ok_actions().to_vec(),
        alarm_actions: a.alarm_actions().to_vec(),
        insufficient_data_actions: a.insufficient_data_actions().to_vec(),
        state_value: a.state_value().map(|s| s.as_str().to_string()),
        state_reason: owned(a.state_reason()),
        metric_name: owned(a.metric_name()),
        namespace: owned(a.namespace()),
        statistic: a.statistic().map(|s| s.as_str().to_string()),
        extended_statistic: owned(a.extended_statistic()),
        dimensions: a.dimensions().iter().map(dimension_from_sdk).collect(),
        period: a.period(),
        unit: a.unit().map(|u| u.as_str().to_string()),
        evaluation_periods: a.evaluation_periods().unwrap_or(1),
        datapoints_to_alarm: a.datapoints_to_alarm(),
        threshold: a.threshold(),
        comparison_operator: a
            .comparison_operator()
            .map(|c| c.as_str().to_string())
            .unwrap_or_default(),
        treat_missing_data: owned(a.treat_missing_data()),
        evaluate_low_sample_count_percentile: owned(a.evaluate_low_sample_count_percentile()),
        metrics: a.metrics().iter().map(metric_query_from_sdk).collect(),
        threshold_metric_id: owned(a.threshold_metric_id()),
        extra: Map::new(),
    }
}

pub(crate) fn composite_alarm_from_sdk(
    a: &aws_sdk_cloudwatch::types::CompositeAlarm,
) -> CompositeAlarm {
    CompositeAlarm {
        alarm_name: a.alarm_name().unwrap_or_default().to_string(),
        alarm_arn: owned(a.alarm_arn()),
        alarm_description: owned(a.alarm_description()),
        alarm_rule: a.alarm_rule().unwrap_or_default().to_string(),
        actions_enabled: a.actions_enabled().unwrap_or(true),
        ok_actions: a.ok_actions().to_vec(),
        alarm_actions: a.alarm_actions().to_vec(),
        insufficient_data_actions: a.insufficient_data_actions().to_vec(),
        state_value: a.state_value().map(|s| s.as_str().to_string()),
        state_reason: owned(a.state_reason()),
        extra: Map::new(),
    }
}

// every alarm of both kinds, or only the named ones when `names` is non-empty
pub async fn describe_alarms(
    client: &aws_sdk_cloudwatch::Client,
    names: &[String],
) -> Result<AlarmSet> {
    let mut alarms = AlarmSet::default();
    let mut next_token = None;
    let alarm_names = (!names.is_empty()).then(|| names.to_vec());

    loop {
        let response = client
            .describe_alarms()
            .set_alarm_names(alarm_names.clone())
            .alarm_types(AlarmType::MetricAlarm)
            .alarm_types(AlarmType::CompositeAlarm)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(FomoError::aws("DescribeAlarms"))?;

        alarms
            .metric_alarms
            .extend(response.metric_alarms().iter().map(metric_alarm_from_sdk));
        alarms
            .composite_alarms
            .extend(response.composite_alarms().iter().map(composite_alarm_from_sdk));

        next_token = response.next_token().map(|s| s.to_string());
        if next_token.is_none() {
            break;
        }
    }

    Ok(alarms)
}

pub async fn put_metric_alarm(
    client: &aws_sdk_cloudwatch::Client,
    alarm: &MetricAlarm,
) -> Result<()> {
    let mut request = client
        .put_metric_alarm()
        .alarm_name(alarm.alarm_name.clone())
        .actions_enabled(alarm.actions_enabled)
        .set_ok_actions(Some(alarm.ok_actions.clone()))
        .set_alarm_actions(Some(alarm.alarm_actions.clone()))
        .set_insufficient_data_actions(Some(alarm.insufficient_data_actions.clone()))
        .evaluation_periods(alarm.evaluation_periods)
        .set_datapoints_to_alarm(alarm.datapoints_to_alarm)
        .comparison_operator(ComparisonOperator::from(alarm.comparison_operator.as_str()))
        .set_treat_missing_data(alarm.treat_missing_data.clone())
        .set_alarm_description(alarm.alarm_description.clone());

    let shape = alarm.shape()?;
    request = match shape {
        AlarmShape::StandardStatistic | AlarmShape::ExtendedStatistic => {
            let request = request
                .set_metric_name(alarm.metric_name.clone())
                .set_namespace(alarm.namespace.clone())
                .set_dimensions(Some(alarm.dimensions.iter().map(dimension_to_sdk).collect()))
                .set_period(alarm.period)
                .set_threshold(alarm.threshold)
                .set_unit(alarm.unit.as_deref().map(StandardUnit::from));
            if shape == AlarmShape::StandardStatistic {
                request.set_statistic(alarm.statistic.as_deref().map(Statistic::from))
            } else {
                request
                    .set_extended_statistic(alarm.extended_statistic.clone())
                    .set_evaluate_low_sample_count_percentile(
                        alarm.evaluate_low_sample_count_percentile.clone(),
                    )
            }
        }
        AlarmShape::AnomalyDetection => request
            .set_metrics(Some(alarm.metrics.iter().map(metric_query_to_sdk).collect()))
            .set_threshold_metric_id(alarm.threshold_metric_id.clone()),
        AlarmShape::MetricMath => request
            .set_metrics(Some(alarm.metrics.iter().map(metric_query_to_sdk).collect()))
            .set_threshold(alarm.threshold),
    };

    request
        .send()
        .await
        .map_err(FomoError::aws("PutMetricAlarm"))?;

    Ok(())
}

pub async fn put_composite_alarm(
    client: &aws_sdk_cloudwatch::Client,
    alarm: &CompositeAlarm,
) -> Result<()> {
    client
        .put_composite_alarm()
        .actions_enabled(alarm.actions_enabled)
        .set_alarm_actions(Some(alarm.alarm_actions.clone()))
        .set_alarm_description(alarm.alarm_description.clone())
        .alarm_name(alarm.alarm_name.clone())
        .alarm_rule(alarm.alarm_rule.clone())
        .set_insufficient_data_actions(Some(alarm.insufficient_data_actions.clone()))
        .set_ok_actions(Some(alarm.ok_actions.clone()))
        .send()
        .await
        .map_err(FomoError::aws("PutCompositeAlarm"))?;

    Ok(())
}

pub async fn delete_alarms(client: &aws_sdk_cloudwatch::Client, names: &[String]) -> Result<()> {
    client
        .delete_alarms()
        .set_alarm_names(Some(names.to_vec()))
        .send()
        .await
        .map_err(FomoError::aws("DeleteAlarms"))?;

    Ok(())
}

pub async fn get_dashboard(
    client: &aws_sdk_cloudwatch::Client,
    name: &str,
) -> Result<Option<Dashboard>> {
    match client.get_dashboard().dashboard_name(name).send().await {
        Ok(response) => Ok(Some(Dashboard {
            dashboard_name: response.dashboard_name().unwrap_or(name).to_string(),
            dashboard_arn: owned(response.dashboard_arn()),
            dashboard_body: response.dashboard_body().unwrap_or_default().to_string(),
            extra: Map::new(),
        })),
        // CloudWatch answers unknown names with a service error
        Err(SdkError::ServiceError(e)) => {
            tracing::debug!("get_dashboard '{name}': {:?}", e.err());
            Ok(None)
        }
        Err(e) => Err(FomoError::aws("GetDashboard")(e)),
    }
}

pub async fn list_dashboards(client: &aws_sdk_cloudwatch::Client) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut next_token = None;

    loop {
        let response = client
            .list_dashboards()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(FomoError::aws("ListDashboards"))?;

        names.extend(
            response
                .dashboard_entries()
                .iter()
                .filter_map(|entry| entry.dashboard_name().map(str::to_string)),
        );

        next_token = response.next_token().map(|s| s.to_string());
        if next_token.is_none() {
            break;
        }
    }

    Ok(names)
}

pub async fn put_dashboard(
    client: &aws_sdk_cloudwatch::Client,
    dashboard: &Dashboard,
) -> Result<()> {
    let response = client
        .put_dashboard()
        .dashboard_name(dashboard.dashboard_name.clone())
        .dashboard_body(dashboard.dashboard_body.clone())
        .send()
        .await
        .map_err(FomoError::aws("PutDashboard"))?;

    for message in response.dashboard_validation_messages() {
        tracing::warn!(
            "dashboard '{}' validation: {}",
            dashboard.dashboard_name,
            message.message().unwrap_or_default()
        );
    }

    Ok(())
}

pub async fn delete_dashboards(
    client: &aws_sdk_cloudwatch::Client,
    names: &[String],
) -> Result<()> {
    client
        .delete_dashboards()
        .set_dashboard_names(Some(names.to_vec()))
        .send()
        .await
        .map_err(FomoError::aws("DeleteDashboards"))?;

    Ok(())
}
