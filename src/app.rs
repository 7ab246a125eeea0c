use arboard::Clipboard;
use color_eyre::Result;
use std::collections::HashMap;
use tracing::warn;

use crate::{
    constants::truncate_address,
    event::Action,
    horizon::LedgerClient,
    network::{TaskRunner, VoteRequest},
    stellar::{AccountState, Network, VoteReceipt, voting_option},
    wallet::WalletProvider,
};

/// Focus area inside the voting panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Options,
    Amount,
}

impl Focus {
    fn toggle(self) -> Self {
        match self {
            Self::Options => Self::Amount,
            Self::Amount => Self::Options,
        }
    }
}

/// State for popups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupState {
    None,
    Message(String),
    Error(String),
}

/// The in-progress vote: chosen option and amount as typed.
///
/// Owned by the voting panel. Reset only after a successful submission;
/// failures leave it exactly as entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteDraft {
    pub selected: Option<u8>,
    pub amount: String,
}

impl Default for VoteDraft {
    fn default() -> Self {
        Self {
            selected: None,
            amount: "1".to_string(),
        }
    }
}

impl VoteDraft {
    const MAX_AMOUNT_LEN: usize = 12;

    /// Parses the amount field; `None` unless it is a finite number > 0.
    pub fn amount_value(&self) -> Option<f64> {
        let value: f64 = self.amount.trim().parse().ok()?;
        (value.is_finite() && value > 0.0).then_some(value)
    }

    pub fn input_char(&mut self, c: char) {
        if self.amount.len() >= Self::MAX_AMOUNT_LEN {
            return;
        }
        if c.is_ascii_digit() || (c == '.' && !self.amount.contains('.')) {
            self.amount.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.amount.pop();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Top-level application state.
///
/// The connected address is the single piece of shared state; it lives here
/// and is only mutated through [`App::update`].
pub struct App {
    pub network: Network,
    /// True until the one-shot startup wallet check resolves.
    pub checking_wallet: bool,
    /// Connected wallet address. Present exactly when connected.
    pub session: Option<String>,
    /// Loaded ledger state of the connected account, for display.
    pub account: Option<AccountState>,
    pub draft: VoteDraft,
    /// Guard against overlapping submissions.
    pub submitting: bool,
    /// Placeholder result percentages per option id. Populated once; no
    /// tallying source exists yet.
    pub results: HashMap<u8, u8>,
    pub focus: Focus,
    pub popup: PopupState,
    pub last_receipt: Option<VoteReceipt>,
    pub exit: bool,
    clipboard: Option<Clipboard>,
}

impl App {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            checking_wallet: true,
            session: None,
            account: None,
            draft: VoteDraft::default(),
            submitting: false,
            results: HashMap::from([(1, 45), (2, 32), (3, 23)]),
            focus: Focus::Options,
            popup: PopupState::None,
            last_receipt: None,
            exit: false,
            clipboard: Clipboard::new().ok(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Truncated address for the wallet panel, when connected.
    pub fn display_address(&self) -> Option<String> {
        self.session.as_deref().map(truncate_address)
    }

    pub fn result_percent(&self, option_id: u8) -> u8 {
        self.results.get(&option_id).copied().unwrap_or(0)
    }

    fn show_message(&mut self, message: impl Into<String>) {
        self.popup = PopupState::Message(message.into());
    }

    fn show_error(&mut self, message: impl Into<String>) {
        self.popup = PopupState::Error(message.into());
    }

    /// Dispatches one action against the state.
    pub fn update<L, W>(&mut self, action: Action, runner: &TaskRunner<L, W>) -> Result<()>
    where
        L: LedgerClient + 'static,
        W: WalletProvider + 'static,
    {
        match action {
            Action::Quit => self.exit = true,
            Action::Connect => {
                if self.session.is_none() {
                    runner.connect();
                }
            }
            Action::Disconnect => self.disconnect(),
            Action::SwitchFocus => {
                if self.is_connected() {
                    self.focus = self.focus.toggle();
                }
            }
            Action::SelectOption(id) => {
                if self.is_connected() && voting_option(id).is_some() {
                    self.draft.selected = Some(id);
                }
            }
            Action::SelectNextOption => self.cycle_selection(1),
            Action::SelectPrevOption => self.cycle_selection(-1),
            Action::AmountInput(c) => {
                if self.is_connected() {
                    self.draft.input_char(c);
                }
            }
            Action::AmountBackspace => {
                if self.is_connected() {
                    self.draft.backspace();
                }
            }
            Action::SubmitVote => self.handle_vote(runner),
            Action::CopyAddress => {
                let address = self.session.clone();
                self.copy_to_clipboard(address, "address");
            }
            Action::CopyLastHash => {
                let hash = self.last_receipt.as_ref().map(|r| r.hash.clone());
                self.copy_to_clipboard(hash, "transaction hash");
            }
            Action::ShowMessage(message) => self.show_message(message),
            Action::ClearPopup => self.popup = PopupState::None,

            Action::UpdateConnectionChecked(address) => {
                self.checking_wallet = false;
                self.session = address;
            }
            Action::UpdateConnected(Ok(address)) => self.session = Some(address),
            Action::UpdateConnected(Err(_)) => {
                // Already logged at the task level; session stays as it was.
                self.show_error(
                    "Could not connect to the wallet agent. \
                     Make sure it is installed and running.",
                );
            }
            Action::UpdateAccount(Ok(account)) => self.account = Some(account),
            Action::UpdateAccount(Err(e)) => warn!("account refresh failed: {e}"),
            Action::UpdateVoteResult(result) => self.finish_vote(result),
        }
        Ok(())
    }

    fn disconnect(&mut self) {
        // Local only; the wallet agent's grant is not revoked.
        self.session = None;
        self.account = None;
        self.draft.reset();
        self.focus = Focus::Options;
    }

    fn cycle_selection(&mut self, step: i8) {
        if !self.is_connected() {
            return;
        }
        let count = crate::stellar::voting_options().len() as i8;
        let next = match self.draft.selected {
            None => 1,
            Some(id) => (id as i8 - 1 + step).rem_euclid(count) + 1,
        };
        self.draft.selected = Some(next as u8);
    }

    /// Validates the draft and spawns the submission pipeline.
    ///
    /// Invalid input never reaches the network; a submission already in
    /// flight makes this a no-op.
    fn handle_vote<L, W>(&mut self, runner: &TaskRunner<L, W>)
    where
        L: LedgerClient + 'static,
        W: WalletProvider + 'static,
    {
        if self.submitting {
            return;
        }
        let Some(public_key) = self.session.clone() else {
            return;
        };
        let (Some(option), Some(amount)) = (
            self.draft.selected.and_then(voting_option),
            self.draft.amount_value(),
        ) else {
            self.show_error("Select an option and enter a valid amount.");
            return;
        };

        self.submitting = true;
        runner.submit_vote(VoteRequest {
            public_key,
            option,
            amount,
            network: self.network,
        });
    }

    fn finish_vote(&mut self, result: Result<VoteReceipt, String>) {
        self.submitting = false;
        match result {
            Ok(receipt) => {
                let detail = match (
                    self.draft.selected.and_then(voting_option),
                    self.draft.amount_value(),
                ) {
                    (Some(option), Some(amount)) => {
                        format!("{amount} XLM sent to {}.", option.name)
                    }
                    _ => String::new(),
                };
                self.show_message(format!(
                    "Your vote has been recorded! {detail} Transaction {}",
                    truncate_address(&receipt.hash)
                ));
                self.last_receipt = Some(receipt);
                self.draft.reset();
            }
            Err(_) => {
                // Draft stays as entered so the user can retry.
                self.show_error("Something went wrong while voting. Please try again.");
            }
        }
    }

    fn copy_to_clipboard(&mut self, value: Option<String>, what: &str) {
        let Some(value) = value else {
            self.show_message(format!("No {what} to copy."));
            return;
        };
        match self.clipboard.as_mut() {
            Some(clipboard) => match clipboard.set_text(value.clone()) {
                Ok(()) => self.show_message(format!("Copied: {value}")),
                Err(e) => self.show_error(format!("Clipboard error: {e}")),
            },
            None => self.show_error("Clipboard not available"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::WalletUpdateEvent;
    use crate::test_utils::{FakeLedger, FakeWallet};
    use rstest::rstest;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    struct Harness {
        app: App,
        runner: TaskRunner<FakeLedger, FakeWallet>,
        receiver: mpsc::Receiver<WalletUpdateEvent>,
        ledger: Arc<FakeLedger>,
        wallet: Arc<FakeWallet>,
    }

    impl Harness {
        fn new(wallet: FakeWallet) -> Self {
            let ledger = Arc::new(FakeLedger::with_sequence(41));
            Self::with_ledger(wallet, ledger)
        }

        fn with_ledger(wallet: FakeWallet, ledger: Arc<FakeLedger>) -> Self {
            let wallet = Arc::new(wallet);
            let (sender, receiver) = mpsc::channel(16);
            let runner = TaskRunner::new(
                Arc::clone(&ledger),
                Arc::clone(&wallet),
                tokio::runtime::Handle::current(),
                sender,
            );
            Self {
                app: App::new(Network::TestNet),
                runner,
                receiver,
                ledger,
                wallet,
            }
        }

        fn dispatch(&mut self, action: Action) {
            self.app.update(action, &self.runner).unwrap();
        }

        fn connect_as(&mut self, address: &str) {
            self.dispatch(Action::UpdateConnectionChecked(Some(address.to_string())));
        }

        /// Waits for the next task event and feeds it back into the app.
        async fn pump(&mut self) {
            let event = self.receiver.recv().await.expect("task event");
            self.dispatch(event.into());
        }
    }

    #[tokio::test]
    async fn test_startup_check_resolves_loading_state() {
        let mut h = Harness::new(FakeWallet::connected("GVOTER"));
        assert!(h.app.checking_wallet);
        assert!(!h.app.is_connected());

        h.runner.check_connection();
        h.pump().await; // ConnectionChecked
        assert!(!h.app.checking_wallet);
        assert_eq!(h.app.session.as_deref(), Some("GVOTER"));

        h.pump().await; // AccountLoaded
        assert!(h.app.account.is_some());
    }

    #[tokio::test]
    async fn test_startup_check_with_disconnected_wallet() {
        let mut h = Harness::new(FakeWallet::disconnected("GVOTER"));
        h.runner.check_connection();
        h.pump().await;
        assert!(!h.app.checking_wallet);
        assert!(!h.app.is_connected());
    }

    #[tokio::test]
    async fn test_connect_then_disconnect_clears_session() {
        let mut h = Harness::new(FakeWallet::connected(
            "GAVL36HP7MNDIOCQABGSNLC7NUSYSUD7GU3AOSAQNOMHWM66YZFAFLHV",
        ));
        h.dispatch(Action::Connect);
        h.pump().await; // Connected
        assert!(h.app.is_connected());
        assert_eq!(h.app.display_address().as_deref(), Some("GAVL36...FAFLHV"));

        h.dispatch(Action::Disconnect);
        assert!(!h.app.is_connected());
        assert!(h.app.account.is_none());
        assert_eq!(h.app.draft, VoteDraft::default());
    }

    #[tokio::test]
    async fn test_failed_connect_leaves_session_unchanged() {
        let mut h = Harness::new(FakeWallet::connected("GVOTER"));
        h.dispatch(Action::UpdateConnected(Err("agent missing".to_string())));
        assert!(!h.app.is_connected());
        assert!(matches!(h.app.popup, PopupState::Error(_)));
    }

    #[rstest]
    #[case(None, "1")]
    #[case(Some(1), "0")]
    #[case(Some(2), "-3")]
    #[case(Some(3), "abc")]
    #[case(Some(1), "")]
    #[tokio::test]
    async fn test_invalid_draft_makes_no_external_call(
        #[case] selected: Option<u8>,
        #[case] amount: &str,
    ) {
        let mut h = Harness::new(FakeWallet::connected("GVOTER"));
        h.connect_as("GVOTER");

        h.app.draft.selected = selected;
        h.app.draft.amount = amount.to_string();
        h.dispatch(Action::SubmitVote);

        assert!(matches!(h.app.popup, PopupState::Error(_)));
        assert!(!h.app.submitting);
        assert_eq!(h.wallet.signatures_requested(), 0);
        assert_eq!(h.ledger.submissions(), 0);
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    #[tokio::test]
    async fn test_valid_draft_enables_submission(#[case] option_id: u8) {
        let mut h = Harness::new(FakeWallet::connected("GVOTER"));
        h.connect_as("GVOTER");

        h.dispatch(Action::SelectOption(option_id));
        h.dispatch(Action::SubmitVote);
        assert!(h.app.submitting);

        h.pump().await; // VoteSubmitted
        assert_eq!(h.ledger.submissions(), 1);
    }

    #[tokio::test]
    async fn test_successful_vote_resets_draft() {
        let mut h = Harness::new(FakeWallet::connected("GVOTER"));
        h.connect_as("GVOTER");

        h.dispatch(Action::SelectOption(2));
        h.app.draft.amount = "5".to_string();
        h.dispatch(Action::SubmitVote);
        h.pump().await; // VoteSubmitted(Ok)

        assert!(!h.app.submitting);
        assert_eq!(h.app.draft.selected, None);
        assert_eq!(h.app.draft.amount, "1");
        match &h.app.popup {
            PopupState::Message(text) => {
                assert!(text.contains("5 XLM"));
                assert!(text.contains("Option B"));
            }
            other => panic!("expected success popup, got {other:?}"),
        }
        assert_eq!(
            h.app.last_receipt.as_ref().map(|r| r.hash.as_str()),
            Some(FakeLedger::RECEIPT_HASH)
        );
    }

    #[tokio::test]
    async fn test_signing_failure_keeps_draft() {
        let mut h = Harness::new(FakeWallet::connected("GVOTER").refusing_signatures());
        h.connect_as("GVOTER");

        h.dispatch(Action::SelectOption(3));
        h.app.draft.amount = "2.5".to_string();
        h.dispatch(Action::SubmitVote);
        h.pump().await; // VoteSubmitted(Err)

        assert!(!h.app.submitting);
        assert!(matches!(h.app.popup, PopupState::Error(_)));
        assert_eq!(h.app.draft.selected, Some(3));
        assert_eq!(h.app.draft.amount, "2.5");
        assert_eq!(h.ledger.submissions(), 0);
    }

    #[tokio::test]
    async fn test_double_submit_sends_once() {
        let mut h = Harness::new(FakeWallet::connected("GVOTER"));
        h.connect_as("GVOTER");

        h.dispatch(Action::SelectOption(1));
        h.dispatch(Action::SubmitVote);
        h.dispatch(Action::SubmitVote); // ignored: one already in flight

        h.pump().await; // VoteSubmitted for the single spawned attempt
        h.pump().await; // AccountLoaded refresh
        assert_eq!(h.ledger.submissions(), 1);
        assert_eq!(h.wallet.signatures_requested(), 1);
    }

    #[tokio::test]
    async fn test_selection_ignored_while_disconnected() {
        let mut h = Harness::new(FakeWallet::connected("GVOTER"));
        h.dispatch(Action::SelectOption(2));
        h.dispatch(Action::AmountInput('7'));
        assert_eq!(h.app.draft.selected, None);
        assert_eq!(h.app.draft.amount, "1");
    }

    #[tokio::test]
    async fn test_selection_cycling_wraps() {
        let mut h = Harness::new(FakeWallet::connected("GVOTER"));
        h.connect_as("GVOTER");

        h.dispatch(Action::SelectNextOption);
        assert_eq!(h.app.draft.selected, Some(1));
        h.dispatch(Action::SelectNextOption);
        assert_eq!(h.app.draft.selected, Some(2));
        h.dispatch(Action::SelectPrevOption);
        assert_eq!(h.app.draft.selected, Some(1));
        h.dispatch(Action::SelectPrevOption);
        assert_eq!(h.app.draft.selected, Some(3));
    }

    #[test]
    fn test_draft_amount_editing() {
        let mut draft = VoteDraft::default();
        assert_eq!(draft.amount, "1");

        draft.input_char('.');
        draft.input_char('5');
        assert_eq!(draft.amount, "1.5");

        // Second dot is rejected.
        draft.input_char('.');
        assert_eq!(draft.amount, "1.5");

        // Non-numeric input is rejected.
        draft.input_char('x');
        assert_eq!(draft.amount, "1.5");

        draft.backspace();
        draft.backspace();
        assert_eq!(draft.amount, "1");
        assert_eq!(draft.amount_value(), Some(1.0));
    }

    #[rstest]
    #[case("1", Some(1.0))]
    #[case("5.5", Some(5.5))]
    #[case("0", None)]
    #[case("-2", None)]
    #[case("", None)]
    #[case("nan", None)]
    #[case("inf", None)]
    fn test_draft_amount_validation(#[case] amount: &str, #[case] expected: Option<f64>) {
        let draft = VoteDraft {
            selected: Some(1),
            amount: amount.to_string(),
        };
        assert_eq!(draft.amount_value(), expected);
    }

    #[test]
    fn test_placeholder_results() {
        let app = App::new(Network::TestNet);
        assert_eq!(app.result_percent(1), 45);
        assert_eq!(app.result_percent(2), 32);
        assert_eq!(app.result_percent(3), 23);
        assert_eq!(app.result_percent(9), 0);
    }
}
