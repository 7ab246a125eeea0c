//! Application constants for the lumenvote TUI.
//!
//! Centralizes UI dimensions, ledger numeric constants and small formatting
//! helpers shared across the application.

use std::time::Duration;

// ============================================================================
// Event Loop
// ============================================================================

/// How often the main loop wakes up when idle.
pub const TICK_RATE: Duration = Duration::from_millis(250);

// ============================================================================
// UI Dimension Constants
// ============================================================================

/// Height of the application header area (in rows).
pub const HEADER_HEIGHT: u16 = 3;

/// Height of the wallet status panel (in rows).
pub const WALLET_PANEL_HEIGHT: u16 = 5;

/// Height of the amount input / submit row inside the voting panel.
pub const AMOUNT_ROW_HEIGHT: u16 = 5;

/// Height of the static informational cards at the bottom.
pub const INFO_PANEL_HEIGHT: u16 = 5;

/// Height of the footer key-hint line.
pub const FOOTER_HEIGHT: u16 = 1;

// ============================================================================
// Ledger Constants
// ============================================================================

/// Base network fee per operation, in stroops.
pub const BASE_FEE_STROOPS: u32 = 100;

/// Validity window passed to the transaction builder, in seconds.
pub const TX_VALIDITY_SECS: u64 = 300;

/// Maximum byte length of a text memo.
pub const MEMO_TEXT_MAX_BYTES: usize = 28;

/// Number of stroops per lumen (XLM).
pub const STROOPS_PER_XLM: i64 = 10_000_000;

/// Decimal places carried by ledger amount strings.
pub const XLM_DECIMALS: usize = 7;

/// Unicode symbol used for lumen amounts in the UI.
pub const XLM_SYMBOL: &str = "✦";

// ============================================================================
// Formatting Helpers
// ============================================================================

/// Truncates a public address to its first and last six characters.
///
/// Addresses shorter than 13 characters are returned unchanged.
#[must_use]
pub fn truncate_address(address: &str) -> String {
    if address.len() <= 12 {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 6..])
}

/// Converts stroops to lumens.
#[must_use]
pub const fn stroops_to_xlm(stroops: i64) -> f64 {
    stroops as f64 / STROOPS_PER_XLM as f64
}

/// Formats a stroop amount as a human-readable lumen string.
#[must_use]
pub fn format_xlm(stroops: i64) -> String {
    format!("{:.7} XLM", stroops_to_xlm(stroops))
}

/// Formats a lumen amount the way the ledger expects it: a decimal
/// string with seven fractional digits.
#[must_use]
pub fn format_amount(xlm: f64) -> String {
    format!("{xlm:.0$}", XLM_DECIMALS)
}

// ============================================================================
// Tests
// ============================================================================
