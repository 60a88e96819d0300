//! Platform wire events
//!
//! The JSON envelope exchanged with the chat platform's gateway. Inbound
//! events are what the platform tells us happened (a slash command ran, a
//! button was pressed); outbound actions are what we ask the platform to do
//! (respond to an interaction, edit a message, attach a reaction).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix for quiz button custom ids
const QUIZ_CUSTOM_ID_PREFIX: &str = "quiz";

/// Event received from the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// A slash command was invoked
    Command(CommandInvocation),

    /// A message component (button) was clicked
    Component(ComponentClick),

    /// Keep-alive from the platform; answered by the connection layer
    Ping,
}

/// One slash-command invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandInvocation {
    /// Platform-assigned interaction id, echoed back in the response
    pub interaction_id: String,

    /// Invoking user's platform id
    pub user_id: String,

    /// Command name, e.g. `equation`
    pub command: String,

    /// Typed arguments by name
    #[serde(default)]
    pub args: HashMap<String, String>,
}

impl CommandInvocation {
    pub fn new(
        interaction_id: impl Into<String>,
        user_id: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            interaction_id: interaction_id.into(),
            user_id: user_id.into(),
            command: command.into(),
            args: HashMap::new(),
        }
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    /// Look up a required string argument
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).map(String::as_str)
    }
}

/// One button press
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentClick {
    /// Interaction id of the message the button lives on
    pub interaction_id: String,

    /// Clicking user's platform id
    pub user_id: String,

    /// The button's custom id, e.g. `quiz:<uuid>:13`
    pub custom_id: String,
}

/// A button attached to a reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    /// Custom id echoed back when the button is clicked
    pub custom_id: String,

    /// Visible label
    pub label: String,
}

impl Button {
    pub fn new(custom_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            custom_id: custom_id.into(),
            label: label.into(),
        }
    }
}

/// Content we hand back to the platform for rendering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    /// Message text
    pub content: String,

    /// Buttons to attach (empty = none)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Button>,

    /// Reactions to attach after sending (empty = none)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reactions: Vec<String>,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_button(mut self, button: Button) -> Self {
        self.buttons.push(button);
        self
    }

    pub fn with_reaction(mut self, emoji: impl Into<String>) -> Self {
        self.reactions.push(emoji.into());
        self
    }
}

/// Action sent to the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundAction {
    /// Respond to an interaction with a fresh message
    Respond {
        interaction_id: String,
        reply: Reply,
    },

    /// Replace the message belonging to an interaction (content and
    /// buttons both; an empty button list strips the affordance)
    Edit {
        interaction_id: String,
        reply: Reply,
    },
}

/// Encode a quiz option button id: `quiz:<session>:<option>`.
pub fn quiz_custom_id(session_id: Uuid, option: i64) -> String {
    format!("{}:{}:{}", QUIZ_CUSTOM_ID_PREFIX, session_id, option)
}

/// Decode a quiz button id back into session id and chosen option.
/// Non-quiz ids return `None`.
pub fn parse_quiz_custom_id(custom_id: &str) -> Option<(Uuid, i64)> {
    let mut parts = custom_id.splitn(3, ':');
    if parts.next()? != QUIZ_CUSTOM_ID_PREFIX {
        return None;
    }
    let session_id = Uuid::parse_str(parts.next()?).ok()?;
    let option = parts.next()?.parse().ok()?;
    Some((session_id, option))
}
