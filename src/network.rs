//! Background wallet and ledger tasks.
//!
//! Every user action that touches an external capability runs as a spawned
//! task and reports back to the main loop through an mpsc channel. Within a
//! single vote submission the steps are strictly sequential: load account,
//! build, sign, submit.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::constants::TX_VALIDITY_SECS;
use crate::event::WalletUpdateEvent;
use crate::horizon::{HorizonError, LedgerClient};
use crate::stellar::{
    Memo, Network, PaymentOperation, TransactionBuilder, TxError, VoteReceipt, VotingOption,
};
use crate::wallet::{WalletError, WalletProvider};

/// Everything needed to turn one vote into one payment transaction.
#[derive(Debug, Clone)]
pub struct VoteRequest {
    pub public_key: String,
    pub option: &'static VotingOption,
    pub amount: f64,
    pub network: Network,
}

#[derive(Debug, thiserror::Error)]
pub enum VoteError {
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Horizon(#[from] HorizonError),
    #[error(transparent)]
    Tx(#[from] TxError),
    #[error("failed to serialize envelope: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("wallet returned no signed envelope")]
    SigningFailed,
}

/// Runs one vote submission end to end.
///
/// Any failing step aborts the rest of the pipeline; in particular a signing
/// response without a payload never reaches submission.
pub async fn submit_vote<L, W>(
    ledger: &L,
    wallet: &W,
    request: &VoteRequest,
) -> Result<VoteReceipt, VoteError>
where
    L: LedgerClient,
    W: WalletProvider,
{
    let account = ledger.load_account(&request.public_key).await?;

    let payment =
        PaymentOperation::native(&request.public_key, request.option.address, request.amount)?;
    let envelope = TransactionBuilder::new(&account)
        .add_operation(payment)
        .memo(Memo::text(format!("Vote for option {}", request.option.id))?)
        .timeout(TX_VALIDITY_SECS)
        .build()?;

    let signed = wallet
        .sign_transaction(&envelope.to_base64()?, request.network.passphrase())
        .await?
        .ok_or(VoteError::SigningFailed)?;

    let receipt = ledger.submit_transaction(&signed).await?;
    debug!(hash = %receipt.hash, option = request.option.id, "vote submitted");
    Ok(receipt)
}

/// Spawns wallet and ledger tasks and reports their outcomes as
/// [`WalletUpdateEvent`]s on the main-loop channel.
pub struct TaskRunner<L, W> {
    ledger: Arc<L>,
    wallet: Arc<W>,
    runtime: tokio::runtime::Handle,
    sender: mpsc::Sender<WalletUpdateEvent>,
}

impl<L, W> TaskRunner<L, W>
where
    L: LedgerClient + 'static,
    W: WalletProvider + 'static,
{
    pub fn new(
        ledger: Arc<L>,
        wallet: Arc<W>,
        runtime: tokio::runtime::Handle,
        sender: mpsc::Sender<WalletUpdateEvent>,
    ) -> Self {
        Self {
            ledger,
            wallet,
            runtime,
            sender,
        }
    }

    /// One-shot startup check: does the wallet already hold a grant?
    ///
    /// Errors are treated as "not connected" so the shell can leave its
    /// loading state either way.
    pub fn check_connection(&self) {
        let wallet = Arc::clone(&self.wallet);
        let ledger = Arc::clone(&self.ledger);
        let sender = self.sender.clone();

        self.runtime.spawn(async move {
            let address = match wallet.is_connected().await {
                Ok(true) => match wallet.get_address().await {
                    Ok(address) => Some(address),
                    Err(e) => {
                        error!("failed to fetch wallet address: {e}");
                        None
                    }
                },
                Ok(false) => None,
                Err(e) => {
                    error!("wallet connection check failed: {e}");
                    None
                }
            };

            let _ = sender
                .send(WalletUpdateEvent::ConnectionChecked(address.clone()))
                .await;

            if let Some(address) = address {
                load_account_task(&*ledger, &sender, &address).await;
            }
        });
    }

    /// Requests wallet access, then fetches the active address.
    pub fn connect(&self) {
        let wallet = Arc::clone(&self.wallet);
        let ledger = Arc::clone(&self.ledger);
        let sender = self.sender.clone();

        self.runtime.spawn(async move {
            let result = async {
                wallet.request_access().await?;
                wallet.get_address().await
            }
            .await;

            let payload = result.map_err(|e| {
                error!("wallet connect failed: {e}");
                e.to_string()
            });
            let connected = payload.as_ref().ok().cloned();
            let _ = sender.send(WalletUpdateEvent::Connected(payload)).await;

            if let Some(address) = connected {
                load_account_task(&*ledger, &sender, &address).await;
            }
        });
    }

    /// Spawns the sequential vote pipeline for one request.
    pub fn submit_vote(&self, request: VoteRequest) {
        let ledger = Arc::clone(&self.ledger);
        let wallet = Arc::clone(&self.wallet);
        let sender = self.sender.clone();

        self.runtime.spawn(async move {
            let result = submit_vote(&*ledger, &*wallet, &request).await;
            let payload = result.map_err(|e| {
                error!("vote submission failed: {e}");
                e.to_string()
            });
            let succeeded = payload.is_ok();
            let _ = sender.send(WalletUpdateEvent::VoteSubmitted(payload)).await;

            // Refresh the displayed balance after a successful payment.
            if succeeded {
                load_account_task(&*ledger, &sender, &request.public_key).await;
            }
        });
    }
}

async fn load_account_task<L: LedgerClient>(
    ledger: &L,
    sender: &mpsc::Sender<WalletUpdateEvent>,
    address: &str,
) {
    let payload = ledger.load_account(address).await.map_err(|e| {
        error!("account load failed: {e}");
        e.to_string()
    });
    let _ = sender.send(WalletUpdateEvent::AccountLoaded(payload)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stellar::voting_option;
    use crate::test_utils::{FakeLedger, FakeWallet};
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as BASE64;

    fn request_for(option_id: u8, amount: f64) -> VoteRequest {
        VoteRequest {
            public_key: "GVOTER".to_string(),
            option: voting_option(option_id).unwrap(),
            amount,
            network: Network::TestNet,
        }
    }

    #[tokio::test]
    async fn test_submit_vote_success_pipeline() {
        let ledger = FakeLedger::with_sequence(41);
        let wallet = FakeWallet::connected("GVOTER");
        let request = request_for(2, 5.0);

        let receipt = submit_vote(&ledger, &wallet, &request).await.unwrap();

        assert_eq!(receipt.hash, FakeLedger::RECEIPT_HASH);
        assert_eq!(ledger.submissions(), 1);

        // The wallet saw exactly the envelope the builder produced.
        let signed = ledger.last_submission().unwrap();
        let decoded = BASE64.decode(signed.strip_prefix("signed:").unwrap()).unwrap();
        let envelope: crate::stellar::TransactionEnvelope =
            serde_json::from_slice(&decoded).unwrap();
        assert_eq!(envelope.sequence, 42);
        assert_eq!(envelope.operations.len(), 1);
        assert_eq!(envelope.operations[0].destination, request.option.address);
        assert_eq!(envelope.operations[0].amount, "5.0000000");
        assert_eq!(
            envelope.memo,
            Memo::Text("Vote for option 2".to_string())
        );
    }

    #[tokio::test]
    async fn test_submit_vote_signing_failure_skips_submission() {
        let ledger = FakeLedger::with_sequence(41);
        let wallet = FakeWallet::connected("GVOTER").refusing_signatures();
        let request = request_for(1, 1.0);

        let err = submit_vote(&ledger, &wallet, &request).await.unwrap_err();

        assert!(matches!(err, VoteError::SigningFailed));
        assert_eq!(ledger.submissions(), 0);
    }

    #[tokio::test]
    async fn test_submit_vote_account_load_failure_aborts() {
        let ledger = FakeLedger::unavailable();
        let wallet = FakeWallet::connected("GVOTER");
        let request = request_for(3, 2.0);

        let err = submit_vote(&ledger, &wallet, &request).await.unwrap_err();

        assert!(matches!(err, VoteError::Horizon(_)));
        assert_eq!(wallet.signatures_requested(), 0);
        assert_eq!(ledger.submissions(), 0);
    }

    #[tokio::test]
    async fn test_submit_vote_rejects_bad_amount_before_signing() {
        let ledger = FakeLedger::with_sequence(41);
        let wallet = FakeWallet::connected("GVOTER");
        let request = request_for(1, 0.0);

        let err = submit_vote(&ledger, &wallet, &request).await.unwrap_err();

        assert!(matches!(err, VoteError::Tx(_)));
        assert_eq!(wallet.signatures_requested(), 0);
        assert_eq!(ledger.submissions(), 0);
    }
}
