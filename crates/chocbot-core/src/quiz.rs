//! Arithmetic quiz sessions
//!
//! One session is one outstanding challenge: two random operands, the
//! correct sum, a random reward, and three shuffled options (the sum plus
//! two distinct positive distractors). A session is an explicit finite
//! state machine: the first submission resolves it, or the deadline expires
//! it, and every later submission is a no-op.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};

/// How many candidates may be rejected before the perturbation spread
/// widens. Keeps distractor generation terminating even for the minimum
/// sum of 2, where few positive-and-distinct offsets exist.
const REJECTIONS_BEFORE_WIDENING: u32 = 32;

/// Upper bound on the answer window; keeps the deadline arithmetic well
/// inside `i64` seconds.
const MAX_TIMEOUT_SECS: u64 = 86_400;

/// Generation parameters for a quiz session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizParams {
    /// Smallest operand (inclusive)
    pub operand_min: i64,

    /// Largest operand (inclusive)
    pub operand_max: i64,

    /// Smallest reward (inclusive)
    pub reward_min: i64,

    /// Largest reward (inclusive)
    pub reward_max: i64,

    /// Distractors are `answer + offset` with a nonzero offset in
    /// `[-offset_spread, offset_spread]`
    pub offset_spread: i64,

    /// Answer window before the session expires
    pub timeout_secs: u64,
}

impl Default for QuizParams {
    fn default() -> Self {
        Self {
            operand_min: 1,
            operand_max: 20,
            reward_min: 1,
            reward_max: 3,
            offset_spread: 5,
            timeout_secs: 30,
        }
    }
}

impl QuizParams {
    /// Set the operand range
    pub fn with_operands(mut self, min: i64, max: i64) -> Self {
        self.operand_min = min;
        self.operand_max = max;
        self
    }

    /// Set the reward range
    pub fn with_reward(mut self, min: i64, max: i64) -> Self {
        self.reward_min = min;
        self.reward_max = max;
        self
    }

    /// Set the answer window
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.operand_min < 1 || self.operand_min > self.operand_max {
            return Err(CoreError::InvalidParams(format!(
                "operand range [{}, {}] is empty or non-positive",
                self.operand_min, self.operand_max
            )));
        }
        if self.reward_min < 1 || self.reward_min > self.reward_max {
            return Err(CoreError::InvalidParams(format!(
                "reward range [{}, {}] is empty or non-positive",
                self.reward_min, self.reward_max
            )));
        }
        if self.offset_spread < 1 {
            return Err(CoreError::InvalidParams(
                "offset_spread must be at least 1".to_string(),
            ));
        }
        if self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(CoreError::InvalidParams(format!(
                "timeout_secs {} exceeds the maximum of {}",
                self.timeout_secs, MAX_TIMEOUT_SECS
            )));
        }
        Ok(())
    }
}

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizState {
    /// Waiting for the first submission
    Open,
    /// Resolved by a submission; no further effect possible
    Resolved,
    /// Deadline passed without a submission
    Expired,
}

/// Result of a submission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// First submission matched the sum; credit `reward` exactly once
    Correct { reward: i64 },
    /// First submission missed; `answer` is the value that was correct
    Incorrect { answer: i64 },
    /// Session was already resolved or expired; nothing happened
    Closed,
}

/// One outstanding arithmetic challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSession {
    /// Session ID, used to key button interactions back to this session
    pub id: Uuid,

    /// Left operand
    pub lhs: i64,

    /// Right operand
    pub rhs: i64,

    /// Correct sum
    pub answer: i64,

    /// Bars credited on a correct answer
    pub reward: i64,

    /// Presented options: the answer plus two distractors, shuffled
    pub options: Vec<i64>,

    /// Lifecycle state
    pub state: QuizState,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Submissions after this instant expire the session instead
    pub deadline: DateTime<Utc>,
}

impl QuizSession {
    /// Generate a session using the thread-local RNG.
    pub fn generate(params: &QuizParams) -> Result<Self> {
        Self::generate_with(params, &mut rand::thread_rng())
    }

    /// Generate a session from an explicit RNG (seedable in tests).
    pub fn generate_with<R: Rng + ?Sized>(params: &QuizParams, rng: &mut R) -> Result<Self> {
        params.validate()?;

        let lhs = rng.gen_range(params.operand_min..=params.operand_max);
        let rhs = rng.gen_range(params.operand_min..=params.operand_max);
        let answer = lhs + rhs;
        let reward = rng.gen_range(params.reward_min..=params.reward_max);

        let mut options = Self::distractors(answer, params.offset_spread, rng);
        options.push(answer);
        options.shuffle(rng);

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            lhs,
            rhs,
            answer,
            reward,
            options,
            state: QuizState::Open,
            created_at: now,
            deadline: now + Duration::seconds(params.timeout_secs as i64),
        })
    }

    /// Two distinct wrong answers near `answer`, all positive.
    fn distractors<R: Rng + ?Sized>(answer: i64, spread: i64, rng: &mut R) -> Vec<i64> {
        let mut wrongs: Vec<i64> = Vec::with_capacity(2);
        let mut spread = spread.max(1);
        let mut rejected = 0u32;

        while wrongs.len() < 2 {
            let offset = rng.gen_range(-spread..=spread);
            let candidate = answer + offset;
            if offset == 0 || candidate <= 0 || wrongs.contains(&candidate) {
                rejected += 1;
                if rejected >= REJECTIONS_BEFORE_WIDENING {
                    spread = (spread * 2).min(1_000_000);
                    rejected = 0;
                }
                continue;
            }
            wrongs.push(candidate);
        }

        wrongs
    }

    /// Submit an answer. Only the first call on an open, in-window session
    /// has an effect; retries, double-clicks, and late submissions all get
    /// [`SubmitOutcome::Closed`].
    pub fn submit(&mut self, chosen: i64) -> SubmitOutcome {
        match self.state {
            QuizState::Resolved | QuizState::Expired => SubmitOutcome::Closed,
            QuizState::Open => {
                if Utc::now() > self.deadline {
                    self.state = QuizState::Expired;
                    return SubmitOutcome::Closed;
                }
                self.state = QuizState::Resolved;
                if chosen == self.answer {
                    SubmitOutcome::Correct {
                        reward: self.reward,
                    }
                } else {
                    SubmitOutcome::Incorrect {
                        answer: self.answer,
                    }
                }
            }
        }
    }

    /// Whether the deadline has passed on a still-open session.
    pub fn is_expired(&self) -> bool {
        self.state == QuizState::Open && Utc::now() > self.deadline
    }

    /// Force the session into the expired state.
    pub fn expire(&mut self) {
        if self.state == QuizState::Open {
            self.state = QuizState::Expired;
        }
    }

    /// Problem text as presented to the user, e.g. `4 + 9 = ?`.
    pub fn prompt(&self) -> String {
        format!("{} + {} = ?", self.lhs, self.rhs)
    }
}
