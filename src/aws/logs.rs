use aws_sdk_cloudwatchlogs::types::{
    MetricTransformation as SdkMetricTransformation, StandardUnit,
};
use serde_json::Map;

use crate::core::{LogGroup, MetricFilter, MetricTransformation};
use crate::error::{FomoError, Result};

fn transformation_from_sdk(t: &SdkMetricTransformation) -> MetricTransformation {
    MetricTransformation {
        metric_name: t.metric_name().to_string(),
        metric_namespace: t.metric_namespace().to_string(),
        metric_value: t.metric_value().to_string(),
        default_value: t.default_value(),
        unit: t.unit().map(|u| u.as_str().to_string()),
        dimensions: t
            .dimensions()
            .map(|d| d.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
    }
}

fn transformation_to_sdk(t: &MetricTransformation) -> Result<SdkMetricTransformation> {
    SdkMetricTransformation::builder()
        .metric_name(t.metric_name.clone())
        .metric_namespace(t.metric_namespace.clone())
        .metric_value(t.metric_value.clone())
        .set_default_value(t.default_value)
        .set_unit(t.unit.as_deref().map(StandardUnit::from))
        .set_dimensions(
            t.dimensions
                .as_ref()
                .map(|d| d.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        )
        .build()
        .map_err(FomoError::aws("PutMetricFilter"))
}

pub async fn describe_log_groups(
    client: &aws_sdk_cloudwatchlogs::Client,
) -> Result<Vec<LogGroup>> {
    let mut log_groups = Vec::new();
    let mut next_token = None;

    loop {
        let response = client
            .describe_log_groups()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(FomoError::aws("DescribeLogGroups"))?;

        log_groups.extend(response.log_groups().iter().map(|lg| LogGroup {
            log_group_name: lg.log_group_name().unwrap_or_default().to_string(),
            arn: lg.arn().map(str::to_string),
            creation_time: lg.creation_time(),
            retention_in_days: lg.retention_in_days(),
            metric_filter_count: lg.metric_filter_count(),
            stored_bytes: lg.stored_bytes(),
        }));

        next_token = response.next_token().map(|s| s.to_string());
        if next_token.is_none() {
            break;
        }
    }

    Ok(log_groups)
}

pub async fn describe_metric_filters(
    client: &aws_sdk_cloudwatchlogs::Client,
) -> Result<Vec<MetricFilter>> {
    let mut filters = Vec::new();
    let mut next_token = None;

    loop {
        let response = client
            .describe_metric_filters()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(FomoError::aws("DescribeMetricFilters"))?;

        filters.extend(response.metric_filters().iter().map(|mf| MetricFilter {
            filter_name: mf.filter_name().unwrap_or_default().to_string(),
            log_group_name: mf.log_group_name().unwrap_or_default().to_string(),
            filter_pattern: mf.filter_pattern().unwrap_or_default().to_string(),
            metric_transformations: mf
                .metric_transformations()
                .iter()
                .map(transformation_from_sdk)
                .collect(),
            creation_time: mf.creation_time(),
            extra: Map::new(),
        }));

        next_token = response.next_token().map(|s| s.to_string());
        if next_token.is_none() {
            break;
        }
    }

    Ok(filters)
}

pub async fn put_metric_filter(
    client: &aws_sdk_cloudwatchlogs::Client,
    filter: &MetricFilter,
) -> Result<()> {
    let transformations = filter
        .metric_transformations
        .iter()
        .map(transformation_to_sdk)
        .collect::<Result<Vec<_>>>()?;

    client
        .put_metric_filter()
        .log_group_name(filter.log_group_name.clone())
        .filter_name(filter.filter_name.clone())
        .filter_pattern(filter.filter_pattern.clone())
        .set_metric_transformations(Some(transformations))
        .send()
        .await
        .map_err(FomoError::aws("PutMetricFilter"))?;

    Ok(())
}

pub async fn delete_metric_filter(
    client: &aws_sdk_cloudwatchlogs::Client,
    log_group_name: &str,
    filter_name: &str,
) -> Result<()> {
    client
        .delete_metric_filter()
        .log_group_name(log_group_name)
        .filter_name(filter_name)
        .send()
        .await
        .map_err(FomoError::aws("DeleteMetricFilter"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn transformation_survives_sdk_conversion() {
        let t = MetricTransformation {
            metric_name: "ErrorCount".to_string(),
            metric_namespace: "App".to_string(),
            metric_value: "1".to_string(),
            default_value: Some(0.0),
            unit: Some("Count".to_string()),
            dimensions: Some(BTreeMap::from([(
                "Service".to_string(),
                "$.service".to_string(),
            )])),
        };

        let back = transformation_from_sdk(&transformation_to_sdk(&t).unwrap());
        assert_eq!(back, t);
    }
}
