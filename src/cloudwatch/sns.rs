use std::io::Write;

use tracing::info;

use super::Session;
use crate::aws::CloudWatchApi;
use crate::core::{SnsTopic, Subscription, SubscriptionProtocol};
use crate::error::{FomoError, Result};

impl<B: CloudWatchApi> Session<B> {
    pub async fn get_all_sns(&self) -> Result<Vec<SnsTopic>> {
        self.backend.list_topics().await
    }

    /// Resolves a topic name to its ARN.
    pub async fn get_sns(&self, name: &str) -> Result<String> {
        self.get_all_sns()
            .await?
            .into_iter()
            .find(|t| t.name() == name)
            .map(|t| t.topic_arn)
            .ok_or_else(|| FomoError::SnsNotFound(name.to_string()))
    }

    pub async fn create_sns(&self, name: &str) -> Result<String> {
        let arn = self.backend.create_topic(name).await?;
        info!("SNS Topic '{name}' created: {arn}");
        Ok(arn)
    }

    pub async fn delete_sns(&self, name: &str) -> Result<()> {
        let arn = self.get_sns(name).await?;
        self.backend.delete_topic(&arn).await?;
        info!("SNS Topic '{name}' deleted");
        Ok(())
    }

    pub async fn add_sns_subscription(
        &self,
        name: &str,
        protocol: SubscriptionProtocol,
        target: &str,
    ) -> Result<()> {
        let arn = self.get_sns(name).await?;
        self.backend.subscribe(&arn, protocol, target).await?;
        info!("{protocol} subscription '{target}' added to '{name}'");
        Ok(())
    }

    pub async fn get_sns_subscriptions(&self, name: &str) -> Result<Vec<Subscription>> {
        let arn = self.get_sns(name).await?;
        self.backend.list_subscriptions_by_topic(&arn).await
    }

    /// Writes `name,[endpoint, ...]` per topic.
    pub async fn print_sns(&self, topics: &[SnsTopic], out: &mut impl Write) -> Result<()> {
        for topic in topics {
            let mut endpoints: Vec<String> = self
                .backend
                .list_subscriptions_by_topic(&topic.topic_arn)
                .await?
                .into_iter()
                .filter_map(|s| s.endpoint)
                .collect();
            endpoints.sort();
            writeln!(out, "{},[{}]", topic.name(), endpoints.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloudwatch::fake::{session, FakeCloudWatch};

    #[tokio::test]
    async fn topics_are_resolved_by_name() {
        let fake = FakeCloudWatch::default();
        let arn = fake.insert_topic("ops-pager");
        let s = session(fake);

        assert_eq!(s.get_sns("ops-pager").await.unwrap(), arn);
        assert!(matches!(
            s.get_sns("ops").await,
            Err(FomoError::SnsNotFound(n)) if n == "ops"
        ));
    }

    #[tokio::test]
    async fn create_subscribe_print_delete() {
        let s = session(FakeCloudWatch::default());
        s.create_sns("billing").await.unwrap();
        s.add_sns_subscription("billing", SubscriptionProtocol::Https, "https://hooks.example.com/b")
            .await
            .unwrap();
        s.add_sns_subscription("billing", SubscriptionProtocol::Email, "finance@example.com")
            .await
            .unwrap();

        let subs = s.get_sns_subscriptions("billing").await.unwrap();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[1].protocol.as_deref(), Some("email"));

        let mut out = Vec::new();
        let topics = s.get_all_sns().await.unwrap();
        s.print_sns(&topics, &mut out).await.unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "billing,[finance@example.com, https://hooks.example.com/b]\n"
        );

        s.delete_sns("billing").await.unwrap();
        assert!(s.get_all_sns().await.unwrap().is_empty());
        assert!(matches!(
            s.delete_sns("billing").await,
            Err(FomoError::SnsNotFound(_))
        ));
    }
}
