//! chocbot-core - Reward Ledger and Quiz Sessions
//!
//! Platform-independent core for the chocbot chat bot:
//!
//! - [`ledger`]: the persisted mapping from user id to chocolate bar count,
//!   backed by a single JSON document on disk.
//! - [`quiz`]: one-shot arithmetic challenges with a fixed answer window,
//!   generated options, and first-submission-wins resolution.
//!
//! Everything that touches the chat platform (commands, buttons, the
//! websocket connection) lives in `chocbot-gateway`; this crate only knows
//! about bars and sums.

pub mod error;
pub mod ledger;
pub mod quiz;

pub use error::{CoreError, Result};
pub use ledger::{Ledger, LedgerStore};
pub use quiz::{QuizParams, QuizSession, QuizState, SubmitOutcome};

/// Core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
