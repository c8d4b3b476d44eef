//! In-memory stand-in for CloudWatch, SNS and CloudWatch Logs.

use std::collections::{BTreeMap, VecDeque};
use std::io::{self, BufRead, Read};
use std::sync::Mutex;

use async_trait::async_trait;

use super::Session;
use crate::aws::CloudWatchApi;
use crate::core::{
    AlarmSet, CompositeAlarm, Dashboard, LogGroup, MetricAlarm, MetricFilter, SnsTopic,
    Subscription, SubscriptionProtocol,
};
use crate::error::Result;
use crate::prompt::Console;

const ACCOUNT_PREFIX: &str = "arn:aws:sns:us-east-1:123456789012";

#[derive(Default)]
struct State {
    metric_alarms: BTreeMap<String, MetricAlarm>,
    composite_alarms: BTreeMap<String, CompositeAlarm>,
    dashboards: BTreeMap<String, Dashboard>,
    topics: Vec<String>,
    subscriptions: Vec<Subscription>,
    log_groups: Vec<LogGroup>,
    metric_filters: Vec<MetricFilter>,
    puts: usize,
    dashboard_reads_in_flight: usize,
    peak_dashboard_reads: usize,
}

#[derive(Default)]
pub struct FakeCloudWatch {
    state: Mutex<State>,
}

impl FakeCloudWatch {
    fn with<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn insert_metric_alarm(&self, alarm: MetricAlarm) {
        self.with(|s| s.metric_alarms.insert(alarm.alarm_name.clone(), alarm));
    }

    pub fn insert_composite_alarm(&self, alarm: CompositeAlarm) {
        self.with(|s| s.composite_alarms.insert(alarm.alarm_name.clone(), alarm));
    }

    pub fn insert_dashboard(&self, name: &str, body: &str) {
        let dashboard = Dashboard {
            dashboard_name: name.to_string(),
            dashboard_arn: Some(format!(
                "arn:aws:cloudwatch::123456789012:dashboard/{name}"
            )),
            dashboard_body: body.to_string(),
            extra: Default::default(),
        };
        self.with(|s| s.dashboards.insert(name.to_string(), dashboard));
    }

    pub fn insert_topic(&self, name: &str) -> String {
        let arn = format!("{ACCOUNT_PREFIX}:{name}");
        self.with(|s| s.topics.push(arn.clone()));
        arn
    }

    pub fn insert_log_group(&self, name: &str) {
        self.with(|s| {
            s.log_groups.push(LogGroup {
                log_group_name: name.to_string(),
                ..Default::default()
            })
        });
    }

    pub fn insert_metric_filter(&self, filter: MetricFilter) {
        self.with(|s| s.metric_filters.push(filter));
    }

    /// Highest number of `get_dashboard` calls that overlapped.
    pub fn peak_dashboard_reads(&self) -> usize {
        self.with(|s| s.peak_dashboard_reads)
    }

    /// Number of alarm, dashboard and metric filter writes seen so far.
    pub fn put_count(&self) -> usize {
        self.with(|s| s.puts)
    }
}

#[async_trait]
impl CloudWatchApi for FakeCloudWatch {
    async fn describe_alarms(&self, names: &[String]) -> Result<AlarmSet> {
        let wanted = |name: &String| names.is_empty() || names.contains(name);
        Ok(self.with(|s| AlarmSet {
            metric_alarms: s
                .metric_alarms
                .values()
                .filter(|a| wanted(&a.alarm_name))
                .cloned()
                .collect(),
            composite_alarms: s
                .composite_alarms
                .values()
                .filter(|a| wanted(&a.alarm_name))
                .cloned()
                .collect(),
        }))
    }

    async fn put_metric_alarm(&self, alarm: &MetricAlarm) -> Result<()> {
        self.with(|s| {
            s.puts += 1;
            s.metric_alarms
                .insert(alarm.alarm_name.clone(), alarm.clone());
        });
        Ok(())
    }

    async fn put_composite_alarm(&self, alarm: &CompositeAlarm) -> Result<()> {
        self.with(|s| {
            s.puts += 1;
            s.composite_alarms
                .insert(alarm.alarm_name.clone(), alarm.clone());
        });
        Ok(())
    }

    async fn delete_alarms(&self, names: &[String]) -> Result<()> {
        self.with(|s| {
            for name in names {
                s.metric_alarms.remove(name);
                s.composite_alarms.remove(name);
            }
        });
        Ok(())
    }

    async fn get_dashboard(&self, name: &str) -> Result<Option<Dashboard>> {
        self.with(|s| {
            s.dashboard_reads_in_flight += 1;
            s.peak_dashboard_reads = s.peak_dashboard_reads.max(s.dashboard_reads_in_flight);
        });
        // let any concurrently polled reads start before this one finishes
        tokio::task::yield_now().await;
        Ok(self.with(|s| {
            s.dashboard_reads_in_flight -= 1;
            s.dashboards.get(name).cloned()
        }))
    }

    async fn list_dashboards(&self) -> Result<Vec<String>> {
        Ok(self.with(|s| s.dashboards.keys().cloned().collect()))
    }

    async fn put_dashboard(&self, dashboard: &Dashboard) -> Result<()> {
        self.with(|s| {
            s.puts += 1;
            s.dashboards
                .insert(dashboard.dashboard_name.clone(), dashboard.clone());
        });
        Ok(())
    }

    async fn delete_dashboards(&self, names: &[String]) -> Result<()> {
        self.with(|s| {
            for name in names {
                s.dashboards.remove(name);
            }
        });
        Ok(())
    }

    async fn list_topics(&self) -> Result<Vec<SnsTopic>> {
        Ok(self.with(|s| {
            s.topics
                .iter()
                .map(|arn| SnsTopic {
                    topic_arn: arn.clone(),
                })
                .collect()
        }))
    }

    async fn create_topic(&self, name: &str) -> Result<String> {
        Ok(self.insert_topic(name))
    }

    async fn delete_topic(&self, topic_arn: &str) -> Result<()> {
        self.with(|s| {
            s.topics.retain(|arn| arn != topic_arn);
            s.subscriptions
                .retain(|sub| sub.topic_arn.as_deref() != Some(topic_arn));
        });
        Ok(())
    }

    async fn subscribe(
        &self,
        topic_arn: &str,
        protocol: SubscriptionProtocol,
        endpoint: &str,
    ) -> Result<()> {
        self.with(|s| {
            s.subscriptions.push(Subscription {
                subscription_arn: Some("PendingConfirmation".to_string()),
                owner: Some("123456789012".to_string()),
                protocol: Some(protocol.to_string()),
                endpoint: Some(endpoint.to_string()),
                topic_arn: Some(topic_arn.to_string()),
            })
        });
        Ok(())
    }

    async fn list_subscriptions_by_topic(&self, topic_arn: &str) -> Result<Vec<Subscription>> {
        Ok(self.with(|s| {
            s.subscriptions
                .iter()
                .filter(|sub| sub.topic_arn.as_deref() == Some(topic_arn))
                .cloned()
                .collect()
        }))
    }

    async fn describe_log_groups(&self) -> Result<Vec<LogGroup>> {
        Ok(self.with(|s| s.log_groups.clone()))
    }

    async fn describe_metric_filters(&self) -> Result<Vec<MetricFilter>> {
        Ok(self.with(|s| s.metric_filters.clone()))
    }

    async fn put_metric_filter(&self, filter: &MetricFilter) -> Result<()> {
        self.with(|s| {
            s.puts += 1;
            s.metric_filters.retain(|f| {
                f.filter_name != filter.filter_name || f.log_group_name != filter.log_group_name
            });
            s.metric_filters.push(filter.clone());
        });
        Ok(())
    }

    async fn delete_metric_filter(&self, log_group_name: &str, filter_name: &str) -> Result<()> {
        self.with(|s| {
            s.metric_filters
                .retain(|f| f.filter_name != filter_name || f.log_group_name != log_group_name)
        });
        Ok(())
    }
}

pub fn session(fake: FakeCloudWatch) -> Session<FakeCloudWatch> {
    Session::with_backend(fake, "us-east-1")
}

pub fn console(input: &str) -> Console<&[u8], Vec<u8>> {
    Console::new(input.as_bytes(), Vec::new())
}

/// Input that hits EOF after each part, like pressing Ctrl+D at a terminal.
pub struct Segmented {
    parts: VecDeque<&'static [u8]>,
}

impl Read for Segmented {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = {
            let available = self.fill_buf()?;
            let n = available.len().min(buf.len());
            buf[..n].copy_from_slice(&available[..n]);
            n
        };
        self.consume(n);
        Ok(n)
    }
}

impl BufRead for Segmented {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.parts.front().is_some_and(|p| p.is_empty()) {
            self.parts.pop_front();
            return Ok(&[]);
        }
        Ok(self.parts.front().copied().unwrap_or(&[]))
    }

    fn consume(&mut self, amt: usize) {
        if let Some(front) = self.parts.front_mut() {
            *front = &front[amt..];
        }
    }
}

pub fn scripted_console(parts: &[&'static str]) -> Console<Segmented, Vec<u8>> {
    let parts = parts.iter().map(|p| p.as_bytes()).collect();
    Console::new(Segmented { parts }, Vec::new())
}
