//! Base JSON-RPC 2.0 HTTP client.
//!
//! Provides `call()` over POST with a configurable timeout and bounded retry
//! with exponential backoff for transient transport failures. Retries happen
//! only here, at the transport layer; the wallet engine never retries a
//! financial operation.

use crate::error::RpcError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// JSON-RPC 2.0 request envelope.
#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

/// JSON-RPC 2.0 response envelope.
#[derive(Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Configuration for an RPC client.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Base URL (e.g., `http://localhost:10332`).
    pub url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Number of retry attempts on transient transport failure.
    pub retries: u32,
    /// Initial delay between retries (doubles each attempt).
    pub retry_delay: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:10332".to_string(),
            timeout: Duration::from_secs(30),
            retries: 2,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Async JSON-RPC client for a Meridian node.
pub struct RpcClient {
    client: reqwest::Client,
    config: RpcConfig,
    request_id: AtomicU64,
}

impl RpcClient {
    /// Create a new client with the given URL.
    pub fn new(url: &str) -> Self {
        Self::with_config(RpcConfig {
            url: url.trim_end_matches('/').to_string(),
            ..Default::default()
        })
    }

    /// Create a new client with full configuration.
    pub fn with_config(config: RpcConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(4)
            .build()
            .expect("failed to create HTTP client");

        Self {
            client,
            config,
            request_id: AtomicU64::new(0),
        }
    }

    /// Get the configured base URL.
    pub fn url(&self) -> &str {
        &self.config.url
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Call a JSON-RPC 2.0 method.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let req = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id(),
            method,
            params,
        };

        let attempts = self.config.retries + 1;
        let mut last_err = RpcError::NoResult;

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.config.retry_delay * 2u32.saturating_pow(attempt - 1);
                log::debug!("retrying {method} (attempt {}) after {delay:?}", attempt + 1);
                tokio::time::sleep(delay).await;
            }

            match self.do_call(&req, method).await {
                Ok(val) => return Ok(val),
                Err(e) => {
                    let should_retry = e.is_transient() && attempt + 1 < attempts;
                    if !should_retry {
                        return Err(e);
                    }
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }

    async fn do_call(&self, req: &JsonRpcRequest<'_>, method: &str) -> Result<Value, RpcError> {
        let resp = self
            .client
            .post(&self.config.url)
            .json(req)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RpcError::Timeout
                } else {
                    RpcError::Http(e)
                }
            })?;

        let body: JsonRpcResponse = resp.json().await.map_err(RpcError::Http)?;

        if let Some(err) = body.error {
            if err.message == "BUSY" {
                return Err(RpcError::Busy);
            }
            log::debug!("{method} failed: {} {}", err.code, err.message);
            return Err(RpcError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        body.result.ok_or(RpcError::NoResult)
    }
}
