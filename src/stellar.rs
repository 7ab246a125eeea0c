use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::constants::{BASE_FEE_STROOPS, MEMO_TEXT_MAX_BYTES, TX_VALIDITY_SECS};

// Network types
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum Network {
    TestNet,
    MainNet,
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Network::TestNet => "testnet",
            Network::MainNet => "mainnet",
        })
    }
}

impl Network {
    pub fn as_str(&self) -> &str {
        match self {
            Network::TestNet => "TestNet",
            Network::MainNet => "MainNet",
        }
    }

    /// Network passphrase signed into every envelope for this network.
    pub fn passphrase(&self) -> &str {
        match self {
            Network::TestNet => "Test SDF Network ; September 2015",
            Network::MainNet => "Public Global Stellar Network ; September 2015",
        }
    }

    pub fn horizon_url(&self) -> &str {
        match self {
            Network::TestNet => "https://horizon-testnet.stellar.org",
            Network::MainNet => "https://horizon.stellar.org",
        }
    }
}

/// A fixed voting choice rendered as one card in the voting panel.
///
/// The list is defined at build time; an option's address is the payment
/// destination for votes cast on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VotingOption {
    pub id: u8,
    pub name: &'static str,
    pub description: &'static str,
    pub address: &'static str,
    pub icon: &'static str,
    pub color: ratatui::style::Color,
}

// All three options currently share one collection address.
const VOTE_ADDRESS: &str = "GAVL36HP7MNDIOCQABGSNLC7NUSYSUD7GU3AOSAQNOMHWM66YZFAFLHV";

const VOTING_OPTIONS: [VotingOption; 3] = [
    VotingOption {
        id: 1,
        name: "Option A",
        description: "Support for innovative technology projects",
        address: VOTE_ADDRESS,
        icon: "🚀",
        color: ratatui::style::Color::Cyan,
    },
    VotingOption {
        id: 2,
        name: "Option B",
        description: "Environmentally sustainable projects",
        address: VOTE_ADDRESS,
        icon: "🌱",
        color: ratatui::style::Color::Green,
    },
    VotingOption {
        id: 3,
        name: "Option C",
        description: "Education and social benefit projects",
        address: VOTE_ADDRESS,
        icon: "📚",
        color: ratatui::style::Color::Magenta,
    },
];

/// Returns the fixed list of voting options.
pub fn voting_options() -> &'static [VotingOption; 3] {
    &VOTING_OPTIONS
}

/// Looks up a voting option by its id.
pub fn voting_option(id: u8) -> Option<&'static VotingOption> {
    VOTING_OPTIONS.iter().find(|opt| opt.id == id)
}

/// Account state loaded from the ledger before building a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountState {
    pub account_id: String,
    pub sequence: i64,
    /// Native-asset balance in stroops.
    pub balance: i64,
}

/// Result record of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteReceipt {
    pub hash: String,
    pub ledger: u64,
}

/// Errors raised while assembling a transaction envelope.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TxError {
    #[error("text memo exceeds {MEMO_TEXT_MAX_BYTES} bytes")]
    MemoTooLong,
    #[error("transaction has no operations")]
    NoOperations,
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

/// A small note attached to the envelope. Votes carry the chosen option id
/// as a text memo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Memo {
    None,
    Text(String),
}

impl Memo {
    /// Builds a text memo, enforcing the ledger's byte limit.
    pub fn text(value: impl Into<String>) -> Result<Self, TxError> {
        let value = value.into();
        if value.len() > MEMO_TEXT_MAX_BYTES {
            return Err(TxError::MemoTooLong);
        }
        Ok(Memo::Text(value))
    }
}

/// A single native-asset transfer instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOperation {
    pub source: String,
    pub destination: String,
    /// Decimal amount string with seven fractional digits.
    pub amount: String,
}

impl PaymentOperation {
    pub fn native(source: &str, destination: &str, amount: f64) -> Result<Self, TxError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(TxError::InvalidAmount(amount.to_string()));
        }
        Ok(Self {
            source: source.to_string(),
            destination: destination.to_string(),
            amount: crate::constants::format_amount(amount),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBounds {
    pub min_time: u64,
    pub max_time: u64,
}

/// An unsigned, fee-bearing, time-bounded bundle of operations.
///
/// The envelope is handed to the wallet agent in serialized form; the agent
/// produces the signed wire-format payload, which this application treats as
/// an opaque blob from then on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEnvelope {
    pub source_account: String,
    pub fee: u32,
    pub sequence: i64,
    pub time_bounds: TimeBounds,
    pub memo: Memo,
    pub operations: Vec<PaymentOperation>,
}

impl TransactionEnvelope {
    /// Serializes the unsigned envelope for transport to the wallet agent.
    pub fn to_base64(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        Ok(BASE64.encode(json))
    }
}

/// Assembles a [`TransactionEnvelope`] from loaded account state.
#[derive(Debug)]
pub struct TransactionBuilder {
    source_account: String,
    sequence: i64,
    fee: u32,
    memo: Memo,
    timeout_secs: u64,
    operations: Vec<PaymentOperation>,
}

impl TransactionBuilder {
    /// Starts a builder for the next transaction of `account`.
    pub fn new(account: &AccountState) -> Self {
        Self {
            source_account: account.account_id.clone(),
            sequence: account.sequence + 1,
            fee: BASE_FEE_STROOPS,
            memo: Memo::None,
            timeout_secs: TX_VALIDITY_SECS,
            operations: Vec::new(),
        }
    }

    pub fn add_operation(mut self, operation: PaymentOperation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn memo(mut self, memo: Memo) -> Self {
        self.memo = memo;
        self
    }

    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<TransactionEnvelope, TxError> {
        if self.operations.is_empty() {
            return Err(TxError::NoOperations);
        }
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        Ok(TransactionEnvelope {
            source_account: self.source_account,
            fee: self.fee,
            sequence: self.sequence,
            time_bounds: TimeBounds {
                min_time: 0,
                max_time: now + self.timeout_secs,
            },
            memo: self.memo,
            operations: self.operations,
        })
    }
}
