//! Slash commands
//!
//! Each command is a small handler behind the [`SlashCommand`] trait; the
//! [`CommandRegistry`] maps names to handlers and exposes descriptors for
//! the platform side to sync. Handlers only ever touch the core through
//! [`BotState`]: a ledger read, a ledger write via a quiz session, or a
//! pure response.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chocbot_core::QuizSession;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::bot::BotState;
use crate::event::{quiz_custom_id, Button, CommandInvocation, Reply};
use crate::{GatewayError, Result};

/// A named slash command.
#[async_trait]
pub trait SlashCommand: Send + Sync {
    /// Command name as registered on the platform
    fn name(&self) -> &'static str;

    /// Short description shown in the command picker
    fn description(&self) -> &'static str;

    /// Handle one invocation
    async fn run(&self, state: &BotState, invocation: &CommandInvocation) -> Result<Reply>;
}

/// Command metadata handed to the platform for registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    pub name: String,
    pub description: String,
}

/// Command registry
pub struct CommandRegistry {
    commands: Arc<RwLock<HashMap<String, Arc<dyn SlashCommand>>>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registry pre-populated with the built-in commands.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(Arc::new(ExtraCredit));
        registry.register(Arc::new(YesOrNo));
        registry.register(Arc::new(Equation));
        registry.register(Arc::new(BarCount));
        registry
    }

    /// Register a command
    pub fn register(&self, command: Arc<dyn SlashCommand>) {
        let name = command.name().to_string();
        let mut commands = self.commands.write();
        commands.insert(name.clone(), command);
        tracing::info!("Command registered: {}", name);
    }

    /// Get a command by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn SlashCommand>> {
        let commands = self.commands.read();
        commands.get(name).cloned()
    }

    /// Descriptors for every registered command, name-sorted.
    pub fn descriptors(&self) -> Vec<CommandDescriptor> {
        let commands = self.commands.read();
        let mut descriptors: Vec<CommandDescriptor> = commands
            .values()
            .map(|c| CommandDescriptor {
                name: c.name().to_string(),
                description: c.description().to_string(),
            })
            .collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    pub fn len(&self) -> usize {
        self.commands.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.read().is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// `/extracredit` — ask for extra credit
pub struct ExtraCredit;

#[async_trait]
impl SlashCommand for ExtraCredit {
    fn name(&self) -> &'static str {
        "extracredit"
    }

    fn description(&self) -> &'static str {
        "Ask for extra credit"
    }

    async fn run(&self, _state: &BotState, _invocation: &CommandInvocation) -> Result<Reply> {
        Ok(Reply::text("No extra credit in this class!"))
    }
}

/// `/yesorno question:<string>` — create a poll with reactions
pub struct YesOrNo;

#[async_trait]
impl SlashCommand for YesOrNo {
    fn name(&self) -> &'static str {
        "yesorno"
    }

    fn description(&self) -> &'static str {
        "Create a poll with reactions"
    }

    async fn run(&self, _state: &BotState, invocation: &CommandInvocation) -> Result<Reply> {
        let question = invocation
            .arg("question")
            .ok_or_else(|| GatewayError::MissingArgument("question".to_string()))?;

        Ok(Reply::text(format!("**Poll:** {}", question))
            .with_reaction("👍")
            .with_reaction("👎"))
    }
}

/// `/equation` — solve a math problem for chocolate bars
pub struct Equation;

#[async_trait]
impl SlashCommand for Equation {
    fn name(&self) -> &'static str {
        "equation"
    }

    fn description(&self) -> &'static str {
        "Solve a math problem for chocolate bars"
    }

    async fn run(&self, state: &BotState, invocation: &CommandInvocation) -> Result<Reply> {
        let session = QuizSession::generate(&state.config.quiz)?;

        let mut reply = Reply::text(format!(
            "Solve: **{}**\nReward: {} 🍫",
            session.prompt(),
            session.reward
        ));
        for option in &session.options {
            reply = reply.with_button(Button::new(
                quiz_custom_id(session.id, *option),
                option.to_string(),
            ));
        }

        state
            .quizzes
            .insert(session, invocation.interaction_id.clone());
        Ok(reply)
    }
}

/// `/barcount` — check the leaderboard
pub struct BarCount;

#[async_trait]
impl SlashCommand for BarCount {
    fn name(&self) -> &'static str {
        "barcount"
    }

    fn description(&self) -> &'static str {
        "Check the leaderboard"
    }

    async fn run(&self, state: &BotState, _invocation: &CommandInvocation) -> Result<Reply> {
        let board = state.ledger.leaderboard().await?;
        if board.is_empty() {
            return Ok(Reply::text("The jar is empty! No chocolate bars found."));
        }

        let mut content = String::from("**🍫 Current Chocolate Bar Counts:**\n");
        for (user_id, count) in board {
            content.push_str(&format!("• <@{}>: {} bars\n", user_id, count));
        }
        Ok(Reply::text(content))
    }
}
