//! Bot dispatch loop
//!
//! [`BotState`] is the application context built once at startup and passed
//! to every handler; [`Bot`] drives the loop that turns inbound platform
//! events into replies and ledger mutations. A background sweeper expires
//! overdue quiz sessions and strips their buttons.

use std::sync::Arc;
use std::time::Duration;

use chocbot_core::{LedgerStore, SubmitOutcome};
use tokio::sync::{broadcast, mpsc};

use crate::commands::CommandRegistry;
use crate::config::BotConfig;
use crate::event::{
    parse_quiz_custom_id, CommandInvocation, ComponentClick, InboundEvent, OutboundAction, Reply,
};
use crate::registry::QuizRegistry;
use crate::{GatewayError, Result};

/// How often the sweeper looks for overdue quiz sessions
const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Bot state shared across handlers
pub struct BotState {
    pub config: BotConfig,
    pub ledger: Arc<LedgerStore>,
    pub quizzes: Arc<QuizRegistry>,
    pub commands: Arc<CommandRegistry>,
    pub shutdown_tx: broadcast::Sender<()>,
}

impl BotState {
    pub fn new(config: BotConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let ledger = Arc::new(LedgerStore::new(&config.data_dir, &config.data_file));

        Self {
            config,
            ledger,
            quizzes: Arc::new(QuizRegistry::new()),
            commands: Arc::new(CommandRegistry::with_defaults()),
            shutdown_tx,
        }
    }
}

/// Main bot
pub struct Bot {
    state: Arc<BotState>,
}

impl Bot {
    /// Create a bot with the given configuration
    pub fn new(config: BotConfig) -> Self {
        Self {
            state: Arc::new(BotState::new(config)),
        }
    }

    /// Get the bot state
    pub fn state(&self) -> Arc<BotState> {
        self.state.clone()
    }

    /// Touch the ledger once so storage problems surface at startup
    /// instead of on the first command.
    pub async fn warm_up(&self) -> Result<()> {
        let ledger = self.state.ledger.load().await?;
        tracing::info!(entries = ledger.len(), "Ledger loaded");
        Ok(())
    }

    /// Run the dispatch loop until the inbound stream ends or shutdown is
    /// signalled. Handler failures are logged and answered; they never end
    /// the loop.
    pub async fn run(
        &self,
        mut inbound: mpsc::Receiver<InboundEvent>,
        outbound: mpsc::Sender<OutboundAction>,
    ) {
        self.spawn_sweeper(outbound.clone());

        let mut shutdown_rx = self.state.shutdown_tx.subscribe();
        loop {
            tokio::select! {
                event = inbound.recv() => {
                    match event {
                        Some(event) => self.handle_event(event, &outbound).await,
                        None => {
                            tracing::info!("Inbound stream closed, stopping bot");
                            break;
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Shutdown signalled, stopping bot");
                    break;
                }
            }
        }
    }

    /// Signal the dispatch loop and sweeper to stop.
    pub fn shutdown(&self) {
        let _ = self.state.shutdown_tx.send(());
    }

    async fn handle_event(&self, event: InboundEvent, outbound: &mpsc::Sender<OutboundAction>) {
        match event {
            InboundEvent::Command(invocation) => {
                self.handle_command(invocation, outbound).await;
            }
            InboundEvent::Component(click) => {
                self.handle_component(click, outbound).await;
            }
            InboundEvent::Ping => {}
        }
    }

    async fn handle_command(
        &self,
        invocation: CommandInvocation,
        outbound: &mpsc::Sender<OutboundAction>,
    ) {
        let reply = match self.run_command(&invocation).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(
                    command = %invocation.command,
                    user_id = %invocation.user_id,
                    error = %e,
                    "Command invocation failed"
                );
                Self::failure_reply(&e)
            }
        };

        let action = OutboundAction::Respond {
            interaction_id: invocation.interaction_id,
            reply,
        };
        if outbound.send(action).await.is_err() {
            tracing::warn!("Outbound channel closed, dropping response");
        }
    }

    async fn run_command(&self, invocation: &CommandInvocation) -> Result<Reply> {
        let command = self
            .state
            .commands
            .get(&invocation.command)
            .ok_or_else(|| GatewayError::UnknownCommand(invocation.command.clone()))?;

        tracing::debug!(
            command = %invocation.command,
            user_id = %invocation.user_id,
            "Dispatching command"
        );
        command.run(&self.state, invocation).await
    }

    async fn handle_component(
        &self,
        click: ComponentClick,
        outbound: &mpsc::Sender<OutboundAction>,
    ) {
        let Some((session_id, chosen)) = parse_quiz_custom_id(&click.custom_id) else {
            tracing::debug!(custom_id = %click.custom_id, "Ignoring non-quiz component");
            return;
        };

        // Unknown session (already resolved, already swept): acknowledge
        // silently, no state change.
        let Some(verdict) = self.state.quizzes.submit(session_id, chosen) else {
            tracing::debug!(%session_id, "Click on unknown quiz session ignored");
            return;
        };

        let reply = match verdict.outcome {
            SubmitOutcome::Correct { reward } => {
                match self.state.ledger.add(&click.user_id, reward).await {
                    Ok(total) => {
                        tracing::info!(
                            user_id = %click.user_id,
                            reward,
                            total,
                            "Correct answer, bars credited"
                        );
                        Reply::text(format!(
                            "✅ You are correct! You earned **{}** chocolate bars!",
                            reward
                        ))
                    }
                    Err(e) => {
                        tracing::error!(user_id = %click.user_id, error = %e, "Ledger credit failed");
                        Reply::text("⚠️ Correct, but the bar jar is unreachable right now.")
                    }
                }
            }
            SubmitOutcome::Incorrect { answer } => {
                Reply::text(format!("❌ Incorrect. The right answer was {}.", answer))
            }
            // The click itself expired the session; strip the buttons now
            // rather than leaving them for the sweeper.
            SubmitOutcome::Closed => Reply::text(format!("Solve: **{}**", verdict.prompt)),
        };

        let action = OutboundAction::Edit {
            interaction_id: verdict.interaction_id,
            reply,
        };
        if outbound.send(action).await.is_err() {
            tracing::warn!("Outbound channel closed, dropping edit");
        }
    }

    /// Expire overdue sessions and strip their buttons; passive timeout
    /// surface, no explicit notification.
    fn spawn_sweeper(&self, outbound: mpsc::Sender<OutboundAction>) {
        let quizzes = self.state.quizzes.clone();
        let mut shutdown_rx = self.state.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        for expired in quizzes.sweep_expired() {
                            let action = OutboundAction::Edit {
                                interaction_id: expired.interaction_id,
                                reply: Reply::text(format!("Solve: **{}**", expired.prompt)),
                            };
                            if outbound.send(action).await.is_err() {
                                return;
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => return,
                }
            }
        });
    }

    fn failure_reply(error: &GatewayError) -> Reply {
        match error {
            GatewayError::MissingArgument(name) => {
                Reply::text(format!("⚠️ Missing argument `{}`.", name))
            }
            GatewayError::UnknownCommand(name) => {
                Reply::text(format!("⚠️ I don't know the command `{}`.", name))
            }
            _ => Reply::text("⚠️ Something went wrong, try again later."),
        }
    }
}
