use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::BridgeError;

/// Request to bridge the settled SOL to the destination chain.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeRequest {
    pub from_chain: String,
    pub to_chain: String,
    pub amount: Decimal,
    pub destination_address: String,
    /// On-chain settlement signature, passed as proof of the source leg
    pub source_signature: String,
}

impl BridgeRequest {
    pub fn sol_to_btc(amount: Decimal, destination_address: &str, source_signature: &str) -> Self {
        Self {
            from_chain: "solana".to_string(),
            to_chain: "bitcoin".to_string(),
            amount,
            destination_address: destination_address.to_string(),
            source_signature: source_signature.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeHandle {
    pub bridge_transaction_id: String,
    /// Provider's completion estimate, in seconds
    pub estimated_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeState {
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeStatus {
    pub bridge_transaction_id: String,
    pub state: BridgeState,
    #[serde(default)]
    pub btc_tx_id: Option<String>,
    #[serde(default)]
    pub failure_reason: Option<String>,
}

/// External cross-chain bridge (step 2 of the pipeline). Opaque provider
/// behind a small HTTP contract.
#[async_trait]
pub trait BridgeClient: Send + Sync {
    async fn initiate(&self, request: &BridgeRequest) -> Result<BridgeHandle, BridgeError>;
    async fn check_status(&self, bridge_transaction_id: &str)
        -> Result<BridgeStatus, BridgeError>;
}

/// Bridge provider client over plain JSON HTTP with bearer auth.
pub struct HttpBridgeClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl HttpBridgeClient {
    pub fn new(api_url: &str, api_key: &str, timeout: Duration) -> Result<Self, BridgeError> {
        if api_url.is_empty() || api_key.is_empty() {
            return Err(BridgeError::Unavailable(
                "bridge API not configured; set BRIDGE_API_URL and BRIDGE_API_KEY".to_string(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BridgeError::Unavailable(format!("HTTP client init failed: {}", e)))?;
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl BridgeClient for HttpBridgeClient {
    async fn initiate(&self, request: &BridgeRequest) -> Result<BridgeHandle, BridgeError> {
        info!(
            "🌉 Initiating bridge: {} {} -> {}",
            request.amount, request.from_chain, request.to_chain
        );

        let response = self
            .http
            .post(format!("{}/bridge", self.api_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| BridgeError::Unavailable(format!("bridge request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::Rejected(format!("{}: {}", status, body)));
        }

        let handle: BridgeHandle = response
            .json()
            .await
            .map_err(|e| BridgeError::Rejected(format!("malformed bridge response: {}", e)))?;

        info!("✅ Bridge accepted: {}", handle.bridge_transaction_id);
        Ok(handle)
    }

    async fn check_status(
        &self,
        bridge_transaction_id: &str,
    ) -> Result<BridgeStatus, BridgeError> {
        let response = self
            .http
            .get(format!("{}/bridge/{}", self.api_url, bridge_transaction_id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| BridgeError::Unavailable(format!("bridge status failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::Rejected(format!("{}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| BridgeError::Rejected(format!("malformed bridge status: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn unconfigured_bridge_refuses_to_build() {
        assert!(HttpBridgeClient::new("", "", Duration::from_secs(30)).is_err());
        assert!(HttpBridgeClient::new("https://bridge.example", "", Duration::from_secs(30))
            .is_err());
    }

    #[test]
    fn request_serializes_to_provider_contract() {
        let request = BridgeRequest::sol_to_btc(
            dec!(0.1),
            "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq",
            "sig123",
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["fromChain"], "solana");
        assert_eq!(json["toChain"], "bitcoin");
        assert_eq!(json["sourceSignature"], "sig123");
    }

    #[test]
    fn status_deserializes_with_optional_fields() {
        let status: BridgeStatus = serde_json::from_str(
            r#"{"bridgeTransactionId":"br_1","state":"processing"}"#,
        )
        .unwrap();
        assert_eq!(status.state, BridgeState::Processing);
        assert!(status.btc_tx_id.is_none());

        let done: BridgeStatus = serde_json::from_str(
            r#"{"bridgeTransactionId":"br_1","state":"completed","btcTxId":"btc_abc"}"#,
        )
        .unwrap();
        assert_eq!(done.state, BridgeState::Completed);
        assert_eq!(done.btc_tx_id.as_deref(), Some("btc_abc"));
    }
}
