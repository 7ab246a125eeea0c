use crate::stellar::{AccountState, VoteReceipt};

/// Events reported back from wallet and ledger tasks.
#[derive(Debug)]
pub enum WalletUpdateEvent {
    /// Result of the one-shot startup connection check: the active address
    /// when a grant already exists, `None` otherwise.
    ConnectionChecked(Option<String>),
    Connected(Result<String, String>),
    AccountLoaded(Result<AccountState, String>),
    VoteSubmitted(Result<VoteReceipt, String>),
}

/// Application actions triggered by user input or task events.
#[derive(Debug)]
pub enum Action {
    Quit,
    Connect,
    Disconnect,
    SwitchFocus,
    SelectOption(u8),
    SelectNextOption,
    SelectPrevOption,
    AmountInput(char),
    AmountBackspace,
    SubmitVote,
    CopyAddress,
    CopyLastHash,
    ShowMessage(String),
    ClearPopup,

    UpdateConnectionChecked(Option<String>),
    UpdateConnected(Result<String, String>),
    UpdateAccount(Result<AccountState, String>),
    UpdateVoteResult(Result<VoteReceipt, String>),
}

impl From<WalletUpdateEvent> for Action {
    fn from(event: WalletUpdateEvent) -> Self {
        match event {
            WalletUpdateEvent::ConnectionChecked(res) => Action::UpdateConnectionChecked(res),
            WalletUpdateEvent::Connected(res) => Action::UpdateConnected(res),
            WalletUpdateEvent::AccountLoaded(res) => Action::UpdateAccount(res),
            WalletUpdateEvent::VoteSubmitted(res) => Action::UpdateVoteResult(res),
        }
    }
}
