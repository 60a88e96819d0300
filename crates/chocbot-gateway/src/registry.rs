//! Outstanding quiz sessions
//!
//! Button interactions arrive detached from the command that created the
//! quiz, so sessions are kept in a registry keyed by their generated id and
//! looked up when a click comes in. A background sweep expires overdue
//! sessions and reports which messages need their buttons stripped.

use std::collections::HashMap;
use std::sync::Arc;

use chocbot_core::{QuizSession, SubmitOutcome};
use parking_lot::RwLock;
use uuid::Uuid;

/// One registered session plus the interaction it was posted under.
#[derive(Debug, Clone)]
struct QuizEntry {
    session: QuizSession,
    interaction_id: String,
}

/// An expired session, reported by [`QuizRegistry::sweep_expired`] so the
/// dispatcher can disable the message's answer affordance.
#[derive(Debug, Clone)]
pub struct ExpiredQuiz {
    pub session_id: Uuid,
    pub interaction_id: String,
    pub prompt: String,
}

/// Outcome of routing a click, plus what the dispatcher needs to update
/// the originating message.
#[derive(Debug, Clone)]
pub struct SubmitVerdict {
    pub outcome: SubmitOutcome,
    pub interaction_id: String,
    pub prompt: String,
}

/// Registry of outstanding quiz sessions.
pub struct QuizRegistry {
    entries: Arc<RwLock<HashMap<Uuid, QuizEntry>>>,
}

impl QuizRegistry {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a freshly generated session under the interaction that will
    /// carry its buttons.
    pub fn insert(&self, session: QuizSession, interaction_id: impl Into<String>) {
        let id = session.id;
        let mut entries = self.entries.write();
        entries.insert(
            id,
            QuizEntry {
                session,
                interaction_id: interaction_id.into(),
            },
        );
        tracing::debug!(session_id = %id, "Quiz session registered");
    }

    /// Route a submission to its session; unknown ids are no-ops.
    ///
    /// The registry only ever holds open sessions, and a submission either
    /// resolves the session or, when the click lands past the deadline,
    /// expires it on the spot. Either way the entry leaves the registry
    /// here rather than waiting for the sweeper, so a late click can never
    /// strand an entry in the map.
    pub fn submit(&self, session_id: Uuid, chosen: i64) -> Option<SubmitVerdict> {
        let mut entries = self.entries.write();
        let mut entry = entries.remove(&session_id)?;
        let outcome = entry.session.submit(chosen);

        if matches!(outcome, SubmitOutcome::Closed) {
            tracing::info!(%session_id, "Quiz session expired by a late click");
        }

        Some(SubmitVerdict {
            outcome,
            interaction_id: entry.interaction_id,
            prompt: entry.session.prompt(),
        })
    }

    /// Expire and remove every overdue session.
    pub fn sweep_expired(&self) -> Vec<ExpiredQuiz> {
        let mut entries = self.entries.write();
        let overdue: Vec<Uuid> = entries
            .iter()
            .filter(|(_, e)| e.session.is_expired())
            .map(|(id, _)| *id)
            .collect();

        let mut expired = Vec::with_capacity(overdue.len());
        for id in overdue {
            if let Some(mut entry) = entries.remove(&id) {
                entry.session.expire();
                tracing::info!(session_id = %id, "Quiz session expired");
                expired.push(ExpiredQuiz {
                    session_id: id,
                    interaction_id: entry.interaction_id,
                    prompt: entry.session.prompt(),
                });
            }
        }
        expired
    }

    /// Number of outstanding sessions.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for QuizRegistry {
    fn default() -> Self {
        Self::new()
    }
}
