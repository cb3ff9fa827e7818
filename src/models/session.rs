//! Session model for per-conversation dialog state.
//!
//! A session records which dialog (if any) is active, where in its step
//! chain the conversation is, and the slot values collected so far.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Slot name -> captured value for the active dialog.
pub type DialogData = BTreeMap<String, String>;

// ============================================================================
// DialogState
// ============================================================================

/// Where a session sits in the engine's state machine between turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum DialogState {
    Idle,
    /// Active dialog that is not waiting on the user. Only observable
    /// mid-turn, or in a session persisted by an interrupted process.
    Running { dialog: String, position: usize },
    AwaitingInput {
        dialog: String,
        position: usize,
        slot: String,
    },
}

impl DialogState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running { .. } => "running",
            Self::AwaitingInput { .. } => "awaitingInput",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

// ============================================================================
// ActiveDialog
// ============================================================================

/// One activation of a dialog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveDialog {
    /// Registered dialog name
    pub dialog: String,
    /// Distinguishes activations of the same dialog
    pub activation_id: Uuid,
    /// Index of the step to run next
    pub position: usize,
    /// Slot values collected by earlier steps
    pub data: DialogData,
    /// Slot the dialog is waiting on, when suspended
    pub awaiting: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl ActiveDialog {
    pub fn new(dialog: impl Into<String>) -> Self {
        Self {
            dialog: dialog.into(),
            activation_id: Uuid::new_v4(),
            position: 0,
            data: DialogData::new(),
            awaiting: None,
            started_at: Utc::now(),
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// Persistent state for one conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub conversation_id: String,
    /// At most one dialog is active per conversation
    pub active_dialog: Option<ActiveDialog>,
    /// Suspended parent dialogs for nested invocation (not used by the engine yet)
    #[serde(default)]
    pub parent_dialogs: Vec<ActiveDialog>,
    /// Number of turns handled for this conversation
    pub turn_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new idle session
    pub fn new(conversation_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            conversation_id: conversation_id.into(),
            active_dialog: None,
            parent_dialogs: Vec::new(),
            turn_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn state(&self) -> DialogState {
        match &self.active_dialog {
            None => DialogState::Idle,
            Some(active) => match &active.awaiting {
                Some(slot) => DialogState::AwaitingInput {
                    dialog: active.dialog.clone(),
                    position: active.position,
                    slot: slot.clone(),
                },
                None => DialogState::Running {
                    dialog: active.dialog.clone(),
                    position: active.position,
                },
            },
        }
    }

    pub fn is_awaiting_input(&self) -> bool {
        self.active_dialog
            .as_ref()
            .is_some_and(|a| a.awaiting.is_some())
    }

    /// Data of the active dialog, if any
    pub fn dialog_data(&self) -> Option<&DialogData> {
        self.active_dialog.as_ref().map(|a| &a.data)
    }

    /// Drop the active dialog and everything it collected
    pub fn end_dialog(&mut self) {
        self.active_dialog = None;
    }

    /// Mark the start of a turn
    pub fn touch(&mut self) {
        self.turn_count += 1;
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// Tests
// ============================================================================
