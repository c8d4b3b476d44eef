//! Zabbix API objects. Zabbix encodes ids, flags and timestamps as strings.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const IMPACTED_CI_TAG: &str = "impacted_ci";
pub const AFFECTED_CI_TAG: &str = "affected_ci";

/// `flags` of a trigger created by low-level discovery.
pub const FLAG_DISCOVERED: &str = "4";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Number(i64),
    String(String),
}

fn i64_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Number(v) => Ok(v),
        StringOrNumber::String(s) => s.parse::<i64>().map_err(D::Error::custom),
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Tag {
    pub tag: String,
    #[serde(default)]
    pub value: String,
}

impl Tag {
    pub fn new(tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TriggerRef {
    pub triggerid: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HostRef {
    pub hostid: String,
    #[serde(default)]
    pub host: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Host {
    pub hostid: String,
    pub host: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub maintenance_status: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<TriggerRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Template {
    pub templateid: String,
    pub host: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub triggers: Vec<TriggerRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discoveries: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A trigger or trigger prototype.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Trigger {
    pub triggerid: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expression: String,
    #[serde(default)]
    pub recovery_expression: String,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default = "no_template")]
    pub templateid: String,
    #[serde(default)]
    pub flags: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<HostRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn no_template() -> String {
    "0".to_string()
}

impl Trigger {
    pub fn is_templated(&self) -> bool {
        self.templateid != "0"
    }

    pub fn is_discovered(&self) -> bool {
        self.flags == FLAG_DISCOVERED
    }

    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.tag == name)
    }

    pub fn priority_name(&self) -> &'static str {
        priority_name(&self.priority)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Item {
    pub itemid: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "key_", default)]
    pub key: String,
    #[serde(default)]
    pub hostid: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Maintenance {
    pub maintenanceid: String,
    pub name: String,
    #[serde(deserialize_with = "i64_from_string_or_number")]
    pub active_since: i64,
    #[serde(deserialize_with = "i64_from_string_or_number")]
    pub active_till: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hosts: Vec<HostRef>,
    #[serde(default)]
    pub groups: Vec<Value>,
    #[serde(default)]
    pub tags: Vec<Value>,
    #[serde(default)]
    pub timeperiods: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Maintenance {
    /// Whether `now` (unix seconds) falls inside the active window.
    pub fn is_active_at(&self, now: i64) -> bool {
        self.active_since <= now && now <= self.active_till
    }
}

pub fn priority_name(priority: &str) -> &'static str {
    match priority {
        "0" => "Not Classified",
        "1" => "INFO",
        "2" => "WARN",
        "3" => "MINOR",
        "4" => "MAJOR",
        "5" => "CRIT",
        _ => "Unknown",
    }
}

/// A host trigger missing one or both CMDB tags.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CmdbTagGap {
    pub host: String,
    pub triggerid: String,
    pub description: String,
    pub impacted_ci: Option<String>,
    pub affected_ci: Option<String>,
}
