//! chocbot-gateway - Chat Platform Glue
//!
//! Everything between the chat platform and the chocbot core lives here.
//! The platform's own gateway (connection handling, command sync, message
//! rendering) is an external collaborator reached over a JSON websocket
//! envelope; this crate turns its events into core operations and its
//! replies back into wire actions.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                    chocbot-gateway                     │
//! ├────────────────────────────────────────────────────────┤
//! │   platform gateway ──► PlatformClient ──► InboundEvent │
//! │                                               │        │
//! │                                       ┌───────▼──────┐ │
//! │                                       │     Bot      │ │
//! │                                       │  (dispatch)  │ │
//! │                                       └───┬──────┬───┘ │
//! │                                           │      │     │
//! │                              ┌────────────▼─┐ ┌──▼───┐ │
//! │                              │ CommandRegistry│ │ Quiz │ │
//! │                              │  (4 commands)  │ │ Reg. │ │
//! │                              └────────────┬─┘ └──┬───┘ │
//! │                                           │      │     │
//! │                                     ┌─────▼──────▼───┐ │
//! │                                     │  chocbot-core  │ │
//! │                                     │ Ledger / Quiz  │ │
//! │                                     └────────────────┘ │
//! └────────────────────────────────────────────────────────┘
//! ```

pub mod bot;
pub mod commands;
pub mod config;
pub mod error;
pub mod event;
pub mod platform;
pub mod registry;

pub use bot::{Bot, BotState};
pub use commands::{CommandRegistry, SlashCommand};
pub use config::BotConfig;
pub use error::{GatewayError, Result};
pub use event::{Button, CommandInvocation, ComponentClick, InboundEvent, OutboundAction, Reply};
pub use platform::PlatformClient;
pub use registry::QuizRegistry;

/// Gateway version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the platform auth token
pub const TOKEN_ENV_VAR: &str = "CHOCBOT_TOKEN";
