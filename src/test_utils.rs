//! Shared test doubles for the external wallet and ledger capabilities.
//!
//! Deterministic in-memory fakes implementing [`WalletProvider`] and
//! [`LedgerClient`], with call counters so tests can assert which external
//! calls were (or were not) made.
#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::horizon::{HorizonError, LedgerClient};
use crate::stellar::{AccountState, VoteReceipt};
use crate::wallet::{WalletError, WalletProvider};

/// Fake wallet agent with a fixed address.
pub struct FakeWallet {
    connected: bool,
    address: String,
    refuse_signatures: bool,
    sign_calls: AtomicUsize,
}

impl FakeWallet {
    pub fn connected(address: &str) -> Self {
        Self {
            connected: true,
            address: address.to_string(),
            refuse_signatures: false,
            sign_calls: AtomicUsize::new(0),
        }
    }

    pub fn disconnected(address: &str) -> Self {
        Self {
            connected: false,
            ..Self::connected(address)
        }
    }

    /// The agent will answer signing requests without a payload.
    pub fn refusing_signatures(mut self) -> Self {
        self.refuse_signatures = true;
        self
    }

    pub fn signatures_requested(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }
}

impl WalletProvider for FakeWallet {
    async fn is_connected(&self) -> Result<bool, WalletError> {
        Ok(self.connected)
    }

    async fn request_access(&self) -> Result<(), WalletError> {
        Ok(())
    }

    async fn get_address(&self) -> Result<String, WalletError> {
        Ok(self.address.clone())
    }

    async fn sign_transaction(
        &self,
        envelope_b64: &str,
        _network_passphrase: &str,
    ) -> Result<Option<String>, WalletError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        if self.refuse_signatures {
            return Ok(None);
        }
        Ok(Some(format!("signed:{envelope_b64}")))
    }
}

/// Fake ledger with one account and a submission log.
pub struct FakeLedger {
    sequence: i64,
    available: bool,
    submit_calls: AtomicUsize,
    submitted: Mutex<Vec<String>>,
}

impl FakeLedger {
    pub const RECEIPT_HASH: &'static str = "f00dfeed";

    pub fn with_sequence(sequence: i64) -> Self {
        Self {
            sequence,
            available: true,
            submit_calls: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails, as if Horizon were unreachable.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::with_sequence(0)
        }
    }

    pub fn submissions(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn last_submission(&self) -> Option<String> {
        self.submitted.lock().unwrap().last().cloned()
    }
}

impl LedgerClient for FakeLedger {
    async fn load_account(&self, account_id: &str) -> Result<AccountState, HorizonError> {
        if !self.available {
            return Err(HorizonError::Api {
                status: 504,
                detail: "fake ledger unavailable".to_string(),
            });
        }
        Ok(AccountState {
            account_id: account_id.to_string(),
            sequence: self.sequence,
            balance: 100 * crate::constants::STROOPS_PER_XLM,
        })
    }

    async fn submit_transaction(
        &self,
        signed_envelope_b64: &str,
    ) -> Result<VoteReceipt, HorizonError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if !self.available {
            return Err(HorizonError::Api {
                status: 504,
                detail: "fake ledger unavailable".to_string(),
            });
        }
        self.submitted
            .lock()
            .unwrap()
            .push(signed_envelope_b64.to_string());
        Ok(VoteReceipt {
            hash: Self::RECEIPT_HASH.to_string(),
            ledger: 1234,
        })
    }
}
