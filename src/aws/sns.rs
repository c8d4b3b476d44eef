use crate::core::{SnsTopic, Subscription, SubscriptionProtocol};
use crate::error::{FomoError, Result};

pub async fn list_topics(client: &aws_sdk_sns::Client) -> Result<Vec<SnsTopic>> {
    let mut topics = Vec::new();
    let mut next_token = None;

    loop {
        let response = client
            .list_topics()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(FomoError::aws("ListTopics"))?;

        topics.extend(response.topics().iter().filter_map(|t| {
            t.topic_arn().map(|arn| SnsTopic {
                topic_arn: arn.to_string(),
            })
        }));

        next_token = response.next_token().map(|s| s.to_string());
        if next_token.is_none() {
            break;
        }
    }

    Ok(topics)
}

pub async fn create_topic(client: &aws_sdk_sns::Client, name: &str) -> Result<String> {
    let response = client
        .create_topic()
        .name(name)
        .send()
        .await
        .map_err(FomoError::aws("CreateTopic"))?;

    Ok(response.topic_arn().unwrap_or_default().to_string())
}

pub async fn delete_topic(client: &aws_sdk_sns::Client, topic_arn: &str) -> Result<()> {
    client
        .delete_topic()
        .topic_arn(topic_arn)
        .send()
        .await
        .map_err(FomoError::aws("DeleteTopic"))?;

    Ok(())
}

pub async fn subscribe(
    client: &aws_sdk_sns::Client,
    topic_arn: &str,
    protocol: SubscriptionProtocol,
    endpoint: &str,
) -> Result<()> {
    client
        .subscribe()
        .topic_arn(topic_arn)
        .protocol(protocol.as_str())
        .endpoint(endpoint)
        .send()
        .await
        .map_err(FomoError::aws("Subscribe"))?;

    Ok(())
}

pub async fn list_subscriptions_by_topic(
    client: &aws_sdk_sns::Client,
    topic_arn: &str,
) -> Result<Vec<Subscription>> {
    let mut subscriptions = Vec::new();
    let mut next_token = None;

    loop {
        let response = client
            .list_subscriptions_by_topic()
            .topic_arn(topic_arn)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(FomoError::aws("ListSubscriptionsByTopic"))?;

        subscriptions.extend(response.subscriptions().iter().map(|s| Subscription {
            subscription_arn: s.subscription_arn().map(str::to_string),
            owner: s.owner().map(str::to_string),
            protocol: s.protocol().map(str::to_string),
            endpoint: s.endpoint().map(str::to_string),
            topic_arn: s.topic_arn().map(str::to_string),
        }));

        next_token = response.next_token().map(|s| s.to_string());
        if next_token.is_none() {
            break;
        }
    }

    Ok(subscriptions)
}
