//! Horizon ledger client.
//!
//! Thin wrapper over the two Horizon endpoints this application needs:
//! loading an account's current state before building a transaction, and
//! submitting a signed envelope.

use serde::Deserialize;
use std::future::Future;
use tracing::debug;

use crate::stellar::{AccountState, Network, VoteReceipt};

#[derive(Debug, thiserror::Error)]
pub enum HorizonError {
    #[error("network request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("horizon rejected the request ({status}): {detail}")]
    Api { status: u16, detail: String },
    #[error("unexpected horizon response: {0}")]
    Parse(String),
}

/// Ledger capability surface: account loading and submission.
pub trait LedgerClient: Send + Sync {
    fn load_account(
        &self,
        account_id: &str,
    ) -> impl Future<Output = Result<AccountState, HorizonError>> + Send;

    fn submit_transaction(
        &self,
        signed_envelope_b64: &str,
    ) -> impl Future<Output = Result<VoteReceipt, HorizonError>> + Send;
}

#[derive(Debug, Deserialize)]
struct AccountRecord {
    id: String,
    sequence: String,
    balances: Vec<BalanceRecord>,
}

#[derive(Debug, Deserialize)]
struct BalanceRecord {
    balance: String,
    asset_type: String,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    hash: String,
    ledger: u64,
}

#[derive(Debug, Deserialize)]
struct ProblemResponse {
    #[serde(default)]
    title: String,
    #[serde(default)]
    detail: String,
}

/// HTTP client for a Horizon instance.
#[derive(Debug, Clone)]
pub struct HorizonClient {
    http: reqwest::Client,
    base_url: String,
}

impl HorizonClient {
    pub fn new(network: Network) -> Self {
        Self::with_url(network.horizon_url())
    }

    pub fn with_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, HorizonError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let detail = match response.json::<ProblemResponse>().await {
            Ok(problem) if !problem.detail.is_empty() => problem.detail,
            Ok(problem) if !problem.title.is_empty() => problem.title,
            _ => "no further detail".to_string(),
        };
        Err(HorizonError::Api { status, detail })
    }
}

impl LedgerClient for HorizonClient {
    async fn load_account(&self, account_id: &str) -> Result<AccountState, HorizonError> {
        let url = format!("{}/accounts/{}", self.base_url, account_id);
        let response = Self::check(
            self.http
                .get(&url)
                .header("accept", "application/json")
                .send()
                .await?,
        )
        .await?;
        let record: AccountRecord = response.json().await?;

        let sequence = record
            .sequence
            .parse::<i64>()
            .map_err(|_| HorizonError::Parse(format!("bad sequence '{}'", record.sequence)))?;
        let balance = native_balance_stroops(&record.balances)?;

        debug!(account = %record.id, sequence, "account loaded");
        Ok(AccountState {
            account_id: record.id,
            sequence,
            balance,
        })
    }

    async fn submit_transaction(
        &self,
        signed_envelope_b64: &str,
    ) -> Result<VoteReceipt, HorizonError> {
        let url = format!("{}/transactions", self.base_url);
        let response = Self::check(
            self.http
                .post(&url)
                .form(&[("tx", signed_envelope_b64)])
                .send()
                .await?,
        )
        .await?;
        let result: SubmitResponse = response.json().await?;

        debug!(hash = %result.hash, ledger = result.ledger, "transaction accepted");
        Ok(VoteReceipt {
            hash: result.hash,
            ledger: result.ledger,
        })
    }
}

/// Extracts the native-asset balance from an account's balance list,
/// converted to stroops.
fn native_balance_stroops(balances: &[BalanceRecord]) -> Result<i64, HorizonError> {
    let native = balances
        .iter()
        .find(|b| b.asset_type == "native")
        .ok_or_else(|| HorizonError::Parse("account has no native balance".to_string()))?;
    let xlm = native
        .balance
        .parse::<f64>()
        .map_err(|_| HorizonError::Parse(format!("bad balance '{}'", native.balance)))?;
    Ok((xlm * crate::constants::STROOPS_PER_XLM as f64).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_record_parsing() {
        let json = r#"{
            "id": "GAVL36HP7MNDIOCQABGSNLC7NUSYSUD7GU3AOSAQNOMHWM66YZFAFLHV",
            "sequence": "123456789",
            "balances": [
                {"balance": "12.5000000", "asset_type": "native"},
                {"balance": "7.0000000", "asset_type": "credit_alphanum4"}
            ]
        }"#;
        let record: AccountRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.sequence, "123456789");
        assert_eq!(native_balance_stroops(&record.balances).unwrap(), 125_000_000);
    }

    #[test]
    fn test_native_balance_missing() {
        let balances = vec![BalanceRecord {
            balance: "1.0".to_string(),
            asset_type: "credit_alphanum4".to_string(),
        }];
        assert!(native_balance_stroops(&balances).is_err());
    }

    #[test]
    fn test_submit_response_parsing() {
        let json = r#"{"hash": "deadbeef", "ledger": 54321}"#;
        let result: SubmitResponse = serde_json::from_str(json).unwrap();
        assert_eq!(result.hash, "deadbeef");
        assert_eq!(result.ledger, 54321);
    }

    #[test]
    fn test_problem_response_defaults() {
        let problem: ProblemResponse = serde_json::from_str("{}").unwrap();
        assert!(problem.title.is_empty());
        assert!(problem.detail.is_empty());
    }
}
