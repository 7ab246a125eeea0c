//! Wallet agent client.
//!
//! The user's keys live in an external wallet agent, reached over a local
//! HTTP capability API: connection status, permission request, address
//! disclosure and transaction signing. This application never sees a key.

use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::debug;

/// Default address of the local wallet agent.
pub const DEFAULT_WALLET_URL: &str = "http://127.0.0.1:8317";

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("wallet agent unreachable: {0}")]
    Http(#[from] reqwest::Error),
    #[error("wallet agent refused the request: {0}")]
    Refused(String),
}

/// Narrow capability surface of the external wallet.
///
/// Kept minimal so tests can substitute a deterministic fake.
pub trait WalletProvider: Send + Sync {
    /// Queries whether the agent already holds a grant for this client.
    fn is_connected(&self) -> impl Future<Output = Result<bool, WalletError>> + Send;

    /// Asks the agent for permission to use the wallet.
    fn request_access(&self) -> impl Future<Output = Result<(), WalletError>> + Send;

    /// Fetches the active public address.
    fn get_address(&self) -> impl Future<Output = Result<String, WalletError>> + Send;

    /// Requests a signature over a serialized unsigned envelope.
    ///
    /// Returns the serialized signed envelope, or `None` when the agent
    /// answered without a payload.
    fn sign_transaction(
        &self,
        envelope_b64: &str,
        network_passphrase: &str,
    ) -> impl Future<Output = Result<Option<String>, WalletError>> + Send;
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    connected: bool,
}

#[derive(Debug, Deserialize)]
struct AddressResponse {
    address: String,
}

#[derive(Debug, Serialize)]
struct SignRequest<'a> {
    envelope: &'a str,
    network_passphrase: &'a str,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    signed_envelope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AgentError {
    error: String,
}

/// HTTP client for a local wallet agent.
#[derive(Debug, Clone)]
pub struct WalletAgent {
    http: reqwest::Client,
    base_url: String,
}

impl WalletAgent {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Maps a non-success agent response to [`WalletError::Refused`],
    /// carrying the agent's own message when it sent one.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, WalletError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let message = match response.json::<AgentError>().await {
            Ok(body) => body.error,
            Err(_) => format!("status {status}"),
        };
        Err(WalletError::Refused(message))
    }
}

impl WalletProvider for WalletAgent {
    async fn is_connected(&self) -> Result<bool, WalletError> {
        let url = format!("{}/v1/status", self.base_url);
        let response = Self::check(self.http.get(&url).send().await?).await?;
        let status: StatusResponse = response.json().await?;
        debug!(connected = status.connected, "wallet status checked");
        Ok(status.connected)
    }

    async fn request_access(&self) -> Result<(), WalletError> {
        let url = format!("{}/v1/access", self.base_url);
        Self::check(self.http.post(&url).send().await?).await?;
        Ok(())
    }

    async fn get_address(&self) -> Result<String, WalletError> {
        let url = format!("{}/v1/address", self.base_url);
        let response = Self::check(self.http.get(&url).send().await?).await?;
        let body: AddressResponse = response.json().await?;
        Ok(body.address)
    }

    async fn sign_transaction(
        &self,
        envelope_b64: &str,
        network_passphrase: &str,
    ) -> Result<Option<String>, WalletError> {
        let url = format!("{}/v1/sign", self.base_url);
        let request = SignRequest {
            envelope: envelope_b64,
            network_passphrase,
        };
        let response = Self::check(self.http.post(&url).json(&request).send().await?).await?;
        let body: SignResponse = response.json().await?;
        Ok(body.signed_envelope)
    }
}
