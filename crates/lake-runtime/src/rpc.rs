//! JSON-RPC lookup of a network's latest final block height.

use std::time::Duration;

use lake_framework::{BlockHeight, Network};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Errors from the RPC lookup.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON-RPC error: {0}")]
    Rpc(String),
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: &'static str,
    id: &'static str,
    method: &'static str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<Value>,
}

/// Public RPC endpoint of `network`.
pub fn rpc_url(network: Network) -> String {
    format!("https://rpc.{}.near.org", network)
}

/// Height of the latest final block on `network`.
pub async fn fetch_latest_final_height(network: Network) -> Result<BlockHeight, RpcError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(10))
        .connect_timeout(Duration::from_secs(5))
        .build()?;

    let request = JsonRpcRequest {
        jsonrpc: "2.0",
        id: "dontcare",
        method: "block",
        params: json!({ "finality": "final" }),
    };

    let body: Value = client
        .post(rpc_url(network))
        .json(&request)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    parse_final_height(body)
}

/// Extract `result.header.height` from a `block` response.
pub fn parse_final_height(body: Value) -> Result<BlockHeight, RpcError> {
    let response: JsonRpcResponse =
        serde_json::from_value(body).map_err(|e| RpcError::Parse(e.to_string()))?;

    if let Some(error) = response.error {
        return Err(RpcError::Rpc(error.to_string()));
    }

    let height = response
        .result
        .as_ref()
        .and_then(|result| result.pointer("/header/height"))
        .ok_or_else(|| RpcError::Parse("Missing result.header.height".to_string()))?;

    match height {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| RpcError::Parse(format!("Invalid height: {}", n))),
        Value::String(s) => s
            .parse()
            .map_err(|_| RpcError::Parse(format!("Invalid height: {}", s))),
        other => Err(RpcError::Parse(format!("Invalid height: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_url() {
        assert_eq!(rpc_url(Network::Mainnet), "https://rpc.mainnet.near.org");
        assert_eq!(rpc_url(Network::Testnet), "https://rpc.testnet.near.org");
    }

    #[test]
    fn test_parse_final_height() {
        let body = json!({
            "jsonrpc": "2.0",
            "id": "dontcare",
            "result": { "author": "node0", "header": { "height": 105_123_456u64 } }
        });
        assert_eq!(parse_final_height(body).unwrap(), 105_123_456);
    }

    #[test]
    fn test_parse_height_written_as_string() {
        let body = json!({ "result": { "header": { "height": "42" } } });
        assert_eq!(parse_final_height(body).unwrap(), 42);
    }

    #[test]
    fn test_rpc_error_is_reported() {
        let body = json!({ "error": { "code": -32000, "message": "Server error" } });
        assert!(matches!(parse_final_height(body), Err(RpcError::Rpc(_))));
    }

    #[test]
    fn test_missing_height() {
        let body = json!({ "result": { "header": {} } });
        assert!(matches!(parse_final_height(body), Err(RpcError::Parse(_))));
    }
}
