//! Turn model: what happened while handling one inbound message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::intent::Intent;
use super::message::Reply;
use super::session::DialogState;

/// How the router disposed of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RouteKind {
    /// A dialog was started (possibly replacing another)
    Activated,
    /// The waiting dialog received the text as its slot value
    Resumed,
    /// The paused dialog's interruption handler ran
    Interrupted,
    /// The default handler ran
    Fallback,
    /// Nothing handled the turn
    Dropped,
}

impl RouteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activated => "activated",
            Self::Resumed => "resumed",
            Self::Interrupted => "interrupted",
            Self::Fallback => "fallback",
            Self::Dropped => "dropped",
        }
    }
}

/// Context shared by every step of a turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnInfo {
    pub conversation_id: String,
    /// Text exactly as received
    pub raw_text: String,
    /// Text after correction, when the corrector ran and changed it
    pub corrected_text: Option<String>,
}

impl TurnInfo {
    pub fn new(conversation_id: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            raw_text: raw_text.into(),
            corrected_text: None,
        }
    }

    /// The text dialogs should read: corrected if available, raw otherwise.
    pub fn text(&self) -> &str {
        self.corrected_text.as_deref().unwrap_or(&self.raw_text)
    }
}

/// Result of handling one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    pub conversation_id: String,
    pub route: RouteKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrected_text: Option<String>,
    /// Outbound messages in emission order
    pub replies: Vec<Reply>,
    /// Names of the steps executed this turn, in order
    pub steps: Vec<String>,
    /// Session state after the turn
    pub state: DialogState,
    pub handled_at: DateTime<Utc>,
}

impl TurnOutcome {
    /// Text of every text reply, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.replies.iter().filter_map(Reply::as_text).collect()
    }
}
