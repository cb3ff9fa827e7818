use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown dialog: {0}")]
    UnknownDialog(String),

    #[error("Duplicate dialog name: {0}")]
    DuplicateDialog(String),

    #[error("Intent '{intent}' triggers both '{first}' and '{second}'")]
    DuplicateTrigger {
        intent: String,
        first: String,
        second: String,
    },

    #[error("Dialog '{dialog}' writes slot '{slot}' from more than one step")]
    DuplicateSlot { dialog: String, slot: String },

    #[error("Dialog '{0}' has no steps")]
    EmptyDialog(String),

    #[error("Step '{step}' wrote undeclared slot '{slot}'")]
    UndeclaredSlot { step: String, slot: String },

    #[error("Step '{step}' failed: {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Session state error: {0}")]
    SessionState(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BotError {
    /// Errors raised while building the dialog registry; these abort startup.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::UnknownDialog(_)
                | Self::DuplicateDialog(_)
                | Self::DuplicateTrigger { .. }
                | Self::DuplicateSlot { .. }
                | Self::EmptyDialog(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
