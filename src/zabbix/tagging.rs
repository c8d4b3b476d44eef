use serde_json::{json, Value};
use tracing::{info, warn};

use super::models::{CmdbTagGap, Tag, Trigger, AFFECTED_CI_TAG, IMPACTED_CI_TAG};
use super::Session;
use crate::error::{FomoError, Result};

/// Replaces the two CMDB tags on `trigger`, keeping every other tag.
pub fn with_cmdb_tags(
    trigger: &Trigger,
    impacted_ci: &str,
    affected_ci: &str,
    overwrite: bool,
) -> Result<Vec<Tag>> {
    let (existing, mut tags): (Vec<Tag>, Vec<Tag>) = trigger
        .tags
        .iter()
        .cloned()
        .partition(|t| t.tag == IMPACTED_CI_TAG || t.tag == AFFECTED_CI_TAG);

    for t in &existing {
        warn!(
            "trigger {}: {}={} already defined",
            trigger.triggerid, t.tag, t.value
        );
    }
    if !existing.is_empty() && !overwrite {
        return Err(FomoError::CmdbTagConflict {
            trigger_id: trigger.triggerid.clone(),
            tags: existing
                .iter()
                .map(|t| format!("{}={}", t.tag, t.value))
                .collect(),
        });
    }

    tags.push(Tag::new(IMPACTED_CI_TAG, impacted_ci));
    tags.push(Tag::new(AFFECTED_CI_TAG, affected_ci));
    Ok(tags)
}

fn single(mut triggers: Vec<Trigger>, id: &str) -> Result<Trigger> {
    if triggers.is_empty() {
        return Err(FomoError::TriggerNotFound(format!("[{id}]")));
    }
    Ok(triggers.swap_remove(0))
}

impl Session {
    async fn update_tags(&self, method: &str, trigger_id: &str, tags: &[Tag]) -> Result<()> {
        let _: Value = self
            .api
            .call(method, json!({"triggerid": trigger_id, "tags": tags}))
            .await?;
        info!("{method}: trigger {trigger_id} now has {} tags", tags.len());
        Ok(())
    }

    pub async fn add_tag_trigger(
        &self,
        trigger_id: &str,
        key: &str,
        value: &str,
    ) -> Result<Vec<Tag>> {
        let trigger = single(self.get_triggers(&[trigger_id.to_string()]).await?, trigger_id)?;
        let mut tags = trigger.tags;
        tags.push(Tag::new(key, value));
        self.update_tags("trigger.update", &trigger.triggerid, &tags).await?;
        Ok(tags)
    }

    pub async fn add_tag_triggerprototype(
        &self,
        prototype_id: &str,
        key: &str,
        value: &str,
    ) -> Result<Vec<Tag>> {
        let prototype = single(
            self.get_trigger_prototypes(&[prototype_id.to_string()]).await?,
            prototype_id,
        )?;
        let mut tags = prototype.tags;
        tags.push(Tag::new(key, value));
        self.update_tags("triggerprototype.update", &prototype.triggerid, &tags).await?;
        Ok(tags)
    }

    pub async fn tag_trigger_for_cmdb(
        &self,
        trigger_id: &str,
        impacted_ci: &str,
        affected_ci: &str,
        overwrite: bool,
    ) -> Result<Vec<Tag>> {
        let trigger = single(self.get_triggers(&[trigger_id.to_string()]).await?, trigger_id)?;
        let tags = with_cmdb_tags(&trigger, impacted_ci, affected_ci, overwrite)?;
        self.update_tags("trigger.update", &trigger.triggerid, &tags).await?;
        Ok(tags)
    }

    pub async fn tag_triggerprototype_for_cmdb(
        &self,
        prototype_id: &str,
        impacted_ci: &str,
        affected_ci: &str,
        overwrite: bool,
    ) -> Result<Vec<Tag>> {
        let prototype = single(
            self.get_trigger_prototypes(&[prototype_id.to_string()]).await?,
            prototype_id,
        )?;
        let tags = with_cmdb_tags(&prototype, impacted_ci, affected_ci, overwrite)?;
        self.update_tags("triggerprototype.update", &prototype.triggerid, &tags).await?;
        Ok(tags)
    }

    /// Triggers attached to hosts that lack `impacted_ci` or `affected_ci`,
    /// one row per host and trigger.
    pub async fn get_host_trigger_cmdb_tags(&self) -> Result<Vec<CmdbTagGap>> {
        let hosts = self.get_all_hosts_with_triggers().await?;
        let mut ids: Vec<String> = hosts
            .iter()
            .flat_map(|h| h.triggers.iter().map(|t| t.triggerid.clone()))
            .collect();
        ids.sort();
        ids.dedup();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let triggers = self.get_triggers(&ids).await?;
        let mut gaps = Vec::new();
        for host in &hosts {
            for t in triggers
                .iter()
                .filter(|t| host.triggers.iter().any(|r| r.triggerid == t.triggerid))
            {
                let impacted_ci = t.tag(IMPACTED_CI_TAG).map(|tag| tag.value.clone());
                let affected_ci = t.tag(AFFECTED_CI_TAG).map(|tag| tag.value.clone());
                if impacted_ci.is_some() && affected_ci.is_some() {
                    continue;
                }
                gaps.push(CmdbTagGap {
                    host: host.host.clone(),
                    triggerid: t.triggerid.clone(),
                    description: t.description.clone(),
                    impacted_ci,
                    affected_ci,
                });
            }
        }
        Ok(gaps)
    }

    async fn get_all_hosts_with_triggers(&self) -> Result<Vec<super::Host>> {
        self.get(
            "host.get",
            json!({"output": ["hostid", "host"], "selectTriggers": "triggerid"}),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zabbix::models::fixtures::trigger;
    use crate::zabbix::testing::{answer, session};
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tagged(tags: Value) -> Trigger {
        serde_json::from_value(trigger("20001", "0", "0", tags)).unwrap()
    }

    #[test]
    fn cmdb_tags_replace_only_their_own_keys() {
        let t = tagged(json!([
            {"tag": "scope", "value": "performance"},
            {"tag": "impacted_ci", "value": "checkout"}
        ]));

        assert!(matches!(
            with_cmdb_tags(&t, "payments", "web-01", false),
            Err(FomoError::CmdbTagConflict { tags, .. }) if tags == vec!["impacted_ci=checkout"]
        ));

        let tags = with_cmdb_tags(&t, "payments", "web-01", true).unwrap();
        assert_eq!(
            tags,
            vec![
                Tag::new("scope", "performance"),
                Tag::new("impacted_ci", "payments"),
                Tag::new("affected_ci", "web-01"),
            ]
        );
    }

    #[tokio::test]
    async fn prototype_tagging_uses_prototype_methods() {
        let server = MockServer::start().await;
        answer(
            &server,
            json!({"method": "triggerprototype.get", "params": {"triggerids": ["30001"]}}),
            json!([trigger("30001", "0", "2", json!([]))]),
        )
        .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "method": "triggerprototype.update",
                "params": {"triggerid": "30001", "tags": [{"tag": "team", "value": "sre"}]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "result": {"triggerids": ["30001"]}, "id": 2
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tags = session(&server)
            .add_tag_triggerprototype("30001", "team", "sre")
            .await
            .unwrap();
        assert_eq!(tags, vec![Tag::new("team", "sre")]);
    }

    #[tokio::test]
    async fn trigger_cmdb_tagging_writes_both_tags() {
        let server = MockServer::start().await;
        answer(
            &server,
            json!({"method": "trigger.get"}),
            json!([trigger("20001", "0", "0", json!([{"tag": "scope", "value": "cpu"}]))]),
        )
        .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "method": "trigger.update",
                "params": {"triggerid": "20001", "tags": [
                    {"tag": "scope", "value": "cpu"},
                    {"tag": "impacted_ci", "value": "checkout"},
                    {"tag": "affected_ci", "value": "web-01"}
                ]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "result": {"triggerids": ["20001"]}, "id": 2
            })))
            .expect(1)
            .mount(&server)
            .await;

        session(&server)
            .tag_trigger_for_cmdb("20001", "checkout", "web-01", false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cmdb_report_lists_untagged_host_triggers() {
        let server = MockServer::start().await;
        answer(
            &server,
            json!({"method": "host.get"}),
            json!([
                {"hostid": "1", "host": "web-01", "triggers": [{"triggerid": "11"}, {"triggerid": "12"}]},
                {"hostid": "2", "host": "web-02", "triggers": [{"triggerid": "12"}]},
                {"hostid": "3", "host": "idle", "triggers": []}
            ]),
        )
        .await;
        answer(
            &server,
            json!({"method": "trigger.get", "params": {"triggerids": ["11", "12"]}}),
            json!([
                trigger("11", "0", "0", json!([
                    {"tag": "impacted_ci", "value": "checkout"},
                    {"tag": "affected_ci", "value": "web-01"}
                ])),
                trigger("12", "0", "0", json!([{"tag": "impacted_ci", "value": "checkout"}]))
            ]),
        )
        .await;

        let gaps = session(&server).get_host_trigger_cmdb_tags().await.unwrap();
        let rows: Vec<(&str, &str)> = gaps
            .iter()
            .map(|g| (g.host.as_str(), g.triggerid.as_str()))
            .collect();
        assert_eq!(rows, vec![("web-01", "12"), ("web-02", "12")]);
        assert_eq!(gaps[0].impacted_ci.as_deref(), Some("checkout"));
        assert!(gaps[0].affected_ci.is_none());
    }
}
