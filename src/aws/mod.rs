use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudwatch::config::Credentials;

use crate::core::{
    AlarmSet, CompositeAlarm, Dashboard, LogGroup, MetricAlarm, MetricFilter, SnsTopic,
    Subscription, SubscriptionProtocol,
};
use crate::error::Result;

pub(crate) mod cloudwatch;
pub(crate) mod logs;
pub(crate) mod sns;

pub const DEFAULT_REGION: &str = "us-east-1";

/// The vendor calls the CloudWatch session is built on.
///
/// List operations return every page.
#[async_trait]
pub trait CloudWatchApi: Send + Sync {
    async fn describe_alarms(&self, names: &[String]) -> Result<AlarmSet>;
    async fn put_metric_alarm(&self, alarm: &MetricAlarm) -> Result<()>;
    async fn put_composite_alarm(&self, alarm: &CompositeAlarm) -> Result<()>;
    async fn delete_alarms(&self, names: &[String]) -> Result<()>;

    /// `None` when CloudWatch rejects the lookup.
    async fn get_dashboard(&self, name: &str) -> Result<Option<Dashboard>>;
    async fn list_dashboards(&self) -> Result<Vec<String>>;
    async fn put_dashboard(&self, dashboard: &Dashboard) -> Result<()>;
    async fn delete_dashboards(&self, names: &[String]) -> Result<()>;

    async fn list_topics(&self) -> Result<Vec<SnsTopic>>;
    async fn create_topic(&self, name: &str) -> Result<String>;
    async fn delete_topic(&self, topic_arn: &str) -> Result<()>;
    async fn subscribe(
        &self,
        topic_arn: &str,
        protocol: SubscriptionProtocol,
        endpoint: &str,
    ) -> Result<()>;
    async fn list_subscriptions_by_topic(&self, topic_arn: &str) -> Result<Vec<Subscription>>;

    async fn describe_log_groups(&self) -> Result<Vec<LogGroup>>;
    async fn describe_metric_filters(&self) -> Result<Vec<MetricFilter>>;
    async fn put_metric_filter(&self, filter: &MetricFilter) -> Result<()>;
    async fn delete_metric_filter(&self, log_group_name: &str, filter_name: &str) -> Result<()>;
}

/// Optional static credentials. Used only when all three parts are present.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    pub access_key: String,
    pub secret_key: String,
    pub session_token: String,
}

impl StaticCredentials {
    fn is_complete(&self) -> bool {
        !self.access_key.is_empty() && !self.secret_key.is_empty() && !self.session_token.is_empty()
    }
}

pub struct AWS {
    pub sdk_config: aws_config::SdkConfig,
    pub cw_client: aws_sdk_cloudwatch::Client,
    pub sns_client: aws_sdk_sns::Client,
    pub logs_client: aws_sdk_cloudwatchlogs::Client,
}

impl AWS {
    pub async fn new(region: &str, credentials: &StaticCredentials) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::v2023_11_09())
            .region(Region::new(region.to_string()));

        if credentials.is_complete() {
            tracing::debug!("using specified static credentials");
            loader = loader.credentials_provider(Credentials::new(
                credentials.access_key.clone(),
                credentials.secret_key.clone(),
                Some(credentials.session_token.clone()),
                None,
                "fomo",
            ));
        } else {
            tracing::debug!("using credentials from the environment");
        }

        let sdk_config = loader.load().await;

        let cw_client = aws_sdk_cloudwatch::Client::new(&sdk_config);
        let sns_client = aws_sdk_sns::Client::new(&sdk_config);
        let logs_client = aws_sdk_cloudwatchlogs::Client::new(&sdk_config);

        Self {
            sdk_config,
            cw_client,
            sns_client,
            logs_client,
        }
    }
}

#[async_trait]
impl CloudWatchApi for AWS {
    async fn describe_alarms(&self, names: &[String]) -> Result<AlarmSet> {
        cloudwatch::describe_alarms(&self.cw_client, names).await
    }

    async fn put_metric_alarm(&self, alarm: &MetricAlarm) -> Result<()> {
        cloudwatch::put_metric_alarm(&self.cw_client, alarm).await
    }

    async fn put_composite_alarm(&self, alarm: &CompositeAlarm) -> Result<()> {
        cloudwatch::put_composite_alarm(&self.cw_client, alarm).await
    }

    async fn delete_alarms(&self, names: &[String]) -> Result<()> {
        cloudwatch::delete_alarms(&self.cw_client, names).await
    }

    async fn get_dashboard(&self, name: &str) -> Result<Option<Dashboard>> {
        cloudwatch::get_dashboard(&self.cw_client, name).await
    }

    async fn list_dashboards(&self) -> Result<Vec<String>> {
        cloudwatch::list_dashboards(&self.cw_client).await
    }

    async fn put_dashboard(&self, dashboard: &Dashboard) -> Result<()> {
        cloudwatch::put_dashboard(&self.cw_client, dashboard).await
    }

    async fn delete_dashboards(&self, names: &[String]) -> Result<()> {
        cloudwatch::delete_dashboards(&self.cw_client, names).await
    }

    async fn list_topics(&self) -> Result<Vec<SnsTopic>> {
        sns::list_topics(&self.sns_client).await
    }

    async fn create_topic(&self, name: &str) -> Result<String> {
        sns::create_topic(&self.sns_client, name).await
    }

    async fn delete_topic(&self, topic_arn: &str) -> Result<()> {
        sns::delete_topic(&self.sns_client, topic_arn).await
    }

    async fn subscribe(
        &self,
        topic_arn: &str,
        protocol: SubscriptionProtocol,
        endpoint: &str,
    ) -> Result<()> {
        sns::subscribe(&self.sns_client, topic_arn, protocol, endpoint).await
    }

    async fn list_subscriptions_by_topic(&self, topic_arn: &str) -> Result<Vec<Subscription>> {
        sns::list_subscriptions_by_topic(&self.sns_client, topic_arn).await
    }

    async fn describe_log_groups(&self) -> Result<Vec<LogGroup>> {
        logs::describe_log_groups(&self.logs_client).await
    }

    async fn describe_metric_filters(&self) -> Result<Vec<MetricFilter>> {
        logs::describe_metric_filters(&self.logs_client).await
    }

    async fn put_metric_filter(&self, filter: &MetricFilter) -> Result<()> {
        logs::put_metric_filter(&self.logs_client, filter).await
    }

    async fn delete_metric_filter(&self, log_group_name: &str, filter_name: &str) -> Result<()> {
        logs::delete_metric_filter(&self.logs_client, log_group_name, filter_name).await
    }
}
