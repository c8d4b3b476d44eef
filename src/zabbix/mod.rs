//! Zabbix host, template, trigger and maintenance lookups plus trigger tagging.

use std::collections::HashSet;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::{self, FomoConfig};
use crate::core::{MaintenanceSearchBy, TemplateSearchBy};
use crate::error::{FomoError, Result};

pub mod client;
pub mod models;
pub mod print;
mod tagging;

pub use client::ZabbixApi;
pub use models::{CmdbTagGap, Host, Item, Maintenance, Tag, Template, Trigger};

pub struct Session {
    api: ZabbixApi,
}

fn describe(values: &[String]) -> String {
    format!("[{}]", values.join(", "))
}

impl Session {
    /// Connects with the given url and key, falling back to `~/.fomo.toml`
    /// for empty values.
    pub async fn connect(url: &str, api_key: &str) -> Result<Self> {
        let (config, path) = FomoConfig::load()?;
        Self::connect_with(url, api_key, &config, path.as_deref()).await
    }

    pub async fn connect_with(
        url: &str,
        api_key: &str,
        config: &FomoConfig,
        config_path: Option<&Path>,
    ) -> Result<Self> {
        let (url, url_source) =
            config::resolve(Some(url), config.zabbix.url.as_deref(), config_path);
        let (api_key, key_source) =
            config::resolve(Some(api_key), config.zabbix.api_key.as_deref(), config_path);

        if url.is_empty() {
            return Err(FomoError::Config(
                "no Zabbix url given and none configured under [zabbix] url".to_string(),
            ));
        }

        let session = Self::with_api(ZabbixApi::new(&url, &api_key));
        let verified: Result<Value> = session
            .api
            .call("token.get", json!({"output": ["tokenid"], "limit": 1}))
            .await;
        if let Err(e) = verified {
            return Err(FomoError::AuthFailed {
                url_source: url_source.to_string(),
                key_source: key_source.to_string(),
                reason: e.to_string(),
            });
        }

        info!("connected to {}", session.api.endpoint());
        Ok(session)
    }

    pub fn with_api(api: ZabbixApi) -> Self {
        Self { api }
    }

    async fn get<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<Vec<T>> {
        let found: Vec<T> = self.api.call(method, params).await?;
        debug!("{method} returned {} objects", found.len());
        Ok(found)
    }

    fn host_params(filter: Option<Value>) -> Value {
        let mut params = json!({"output": "extend", "selectTags": "extend"});
        if let Some(filter) = filter {
            params["filter"] = filter;
        }
        params
    }

    pub async fn get_host(&self, name: &str, with_triggers: bool) -> Result<Host> {
        let mut params = Self::host_params(Some(json!({"host": name})));
        if with_triggers {
            params["selectTriggers"] = json!("triggerid");
        }

        self.get::<Host>("host.get", params)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| FomoError::HostNotFound(name.to_string()))
    }

    pub async fn get_all_hosts(&self) -> Result<Vec<Host>> {
        self.get("host.get", Self::host_params(None)).await
    }

    pub async fn get_hosts_in_maintenance(&self) -> Result<Vec<Host>> {
        self.get(
            "host.get",
            Self::host_params(Some(json!({"maintenance_status": 1}))),
        )
        .await
    }

    pub async fn get_hosts_disabled(&self) -> Result<Vec<Host>> {
        self.get("host.get", Self::host_params(Some(json!({"status": 1})))).await
    }

    /// Hosts in maintenance or disabled, each listed once.
    pub async fn get_unmonitored_hosts(&self) -> Result<Vec<Host>> {
        let mut hosts = self.get_hosts_in_maintenance().await?;
        let mut seen: HashSet<String> = hosts.iter().map(|h| h.hostid.clone()).collect();
        for host in self.get_hosts_disabled().await? {
            if seen.insert(host.hostid.clone()) {
                hosts.push(host);
            }
        }
        Ok(hosts)
    }

    pub async fn get_templates(
        &self,
        search_by: TemplateSearchBy,
        values: &[String],
    ) -> Result<Vec<Template>> {
        let mut params = json!({
            "output": "extend",
            "selectDiscoveries": "extend",
            "selectTriggers": "triggerid",
            "selectTags": "extend",
        });
        match search_by {
            TemplateSearchBy::Name => params["filter"] = json!({"host": values}),
            TemplateSearchBy::TemplateIds => params["templateids"] = json!(values),
            TemplateSearchBy::TriggerIds => params["triggerids"] = json!(values),
        }

        let templates: Vec<Template> = self.get("template.get", params).await?;
        if templates.is_empty() {
            return Err(FomoError::TemplateNotFound(format!(
                "{search_by}={}",
                describe(values)
            )));
        }
        Ok(templates)
    }

    pub async fn get_all_templates(&self) -> Result<Vec<Template>> {
        self.get(
            "template.get",
            json!({"output": "extend", "selectTags": "extend", "selectTriggers": "extend"}),
        )
        .await
    }

    fn trigger_params(ids: &[String]) -> Value {
        json!({
            "output": "extend",
            "selectTags": "extend",
            "selectHosts": "extend",
            "selectTriggerDiscovery": "extend",
            "expandExpression": true,
            "expandDescription": true,
            "expandComment": true,
            "sortfield": "priority",
            "triggerids": ids,
        })
    }

    async fn triggers_or_not_found(
        &self,
        method: &str,
        params: Value,
        ids: &[String],
    ) -> Result<Vec<Trigger>> {
        let triggers: Vec<Trigger> = self.get(method, params).await?;
        if triggers.is_empty() {
            return Err(FomoError::TriggerNotFound(describe(ids)));
        }
        Ok(triggers)
    }

    pub async fn get_triggers(&self, ids: &[String]) -> Result<Vec<Trigger>> {
        self.triggers_or_not_found("trigger.get", Self::trigger_params(ids), ids).await
    }

    /// Only triggers that belong to templates.
    pub async fn get_triggers_templated(&self, ids: &[String]) -> Result<Vec<Trigger>> {
        let mut params = Self::trigger_params(ids);
        params["templated"] = json!(true);
        self.triggers_or_not_found("trigger.get", params, ids).await
    }

    /// Only triggers created by low-level discovery.
    pub async fn get_triggers_discovered(&self, ids: &[String]) -> Result<Vec<Trigger>> {
        let mut params = Self::trigger_params(ids);
        params["filter"] = json!({"flags": models::FLAG_DISCOVERED});
        self.triggers_or_not_found("trigger.get", params, ids).await
    }

    pub async fn get_trigger_prototypes(&self, ids: &[String]) -> Result<Vec<Trigger>> {
        let params = json!({
            "output": "extend",
            "selectTags": "extend",
            "expandExpression": true,
            "triggerids": ids,
        });
        self.triggers_or_not_found("triggerprototype.get", params, ids).await
    }

    pub async fn get_host_triggers(
        &self,
        host_name: &str,
        exclude_template: bool,
        exclude_discovered: bool,
    ) -> Result<Vec<Trigger>> {
        let host = self.get_host(host_name, true).await?;
        let ids: Vec<String> = host.triggers.into_iter().map(|t| t.triggerid).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let triggers = self.get_triggers(&ids).await?;
        Ok(triggers
            .into_iter()
            .filter(|t| !(exclude_template && t.is_templated()))
            .filter(|t| !(exclude_discovered && t.is_discovered()))
            .collect())
    }

    pub async fn get_template_triggers(&self, template_name: &str) -> Result<Vec<Trigger>> {
        let templates = self
            .get_templates(TemplateSearchBy::Name, &[template_name.to_string()])
            .await?;
        let ids: Vec<String> = templates
            .into_iter()
            .flat_map(|t| t.triggers)
            .map(|t| t.triggerid)
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.get_triggers(&ids).await
    }

    pub async fn get_items(&self, ids: &[String]) -> Result<Vec<Item>> {
        let items: Vec<Item> = self
            .get("item.get", json!({"output": "extend", "itemids": ids}))
            .await?;
        if items.is_empty() {
            return Err(FomoError::ItemNotFound(describe(ids)));
        }
        Ok(items)
    }

    fn maintenance_params() -> Value {
        json!({
            "output": "extend",
            "selectHosts": ["hostid", "host"],
            "selectGroups": "extend",
            "selectTags": "extend",
            "selectTimeperiods": "extend",
        })
    }

    pub async fn get_maint_profiles(
        &self,
        search_by: MaintenanceSearchBy,
        values: &[String],
    ) -> Result<Vec<Maintenance>> {
        let mut params = Self::maintenance_params();
        match search_by {
            MaintenanceSearchBy::Name => params["filter"] = json!({"name": values}),
            MaintenanceSearchBy::MaintenanceIds => params["maintenanceids"] = json!(values),
        }

        let profiles: Vec<Maintenance> = self.get("maintenance.get", params).await?;
        if profiles.is_empty() {
            return Err(FomoError::MaintenanceNotFound(describe(values)));
        }
        Ok(profiles)
    }

    pub async fn get_all_maint_profiles(&self, only_active: bool) -> Result<Vec<Maintenance>> {
        let profiles: Vec<Maintenance> = self
            .get("maintenance.get", Self::maintenance_params())
            .await?;
        if !only_active {
            return Ok(profiles);
        }

        let now = chrono::Utc::now().timestamp();
        Ok(profiles
            .into_iter()
            .filter(|m| m.is_active_at(now))
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use serde_json::{json, Value};
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{Session, ZabbixApi};

    /// Answers calls whose body contains `matcher` with `result`.
    pub async fn answer(server: &MockServer, matcher: Value, result: Value) {
        Mock::given(method("POST"))
            .and(body_partial_json(matcher))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"jsonrpc": "2.0", "result": result, "id": 1})),
            )
            .mount(server)
            .await;
    }

    pub fn session(server: &MockServer) -> Session {
        Session::with_api(ZabbixApi::new(&server.uri(), "test-token"))
    }
}
