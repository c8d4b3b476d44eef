//! Minimal Zabbix JSON-RPC 2.0 client.
//!
//! Authentication uses an API token sent as a bearer header. The token is
//! never logged.

use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::header::CONTENT_TYPE;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{FomoError, Result};

const RPC_PATH: &str = "api_jsonrpc.php";
const RPC_CONTENT_TYPE: &str = "application/json-rpc";

#[derive(Serialize)]
struct Request<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u64,
}

#[derive(Deserialize)]
struct Response<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: String,
}

pub struct ZabbixApi {
    http: reqwest::Client,
    endpoint: String,
    token: String,
    next_id: AtomicU64,
}

/// `https://zbx.example.com` and `https://zbx.example.com/api_jsonrpc.php`
/// both name the same endpoint.
pub fn endpoint_for(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.ends_with(RPC_PATH) {
        url.to_string()
    } else {
        format!("{url}/{RPC_PATH}")
    }
}

impl ZabbixApi {
    pub fn new(url: &str, token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint_for(url),
            token: token.to_string(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Calls `method` and decodes its `result`.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!("zabbix call {method} (id {id})");

        let body = serde_json::to_vec(&Request {
            jsonrpc: "2.0",
            method,
            params,
            id,
        })?;

        let response: Response<T> = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, RPC_CONTENT_TYPE)
            .body(body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match (response.result, response.error) {
            (_, Some(e)) => Err(FomoError::Zabbix {
                method: method.to_string(),
                code: e.code,
                message: e.message,
                data: e.data,
            }),
            (Some(result), None) => Ok(result),
            (None, None) => Err(FomoError::Zabbix {
                method: method.to_string(),
                code: 0,
                message: "response carried neither result nor error".to_string(),
                data: String::new(),
            }),
        }
    }
}
