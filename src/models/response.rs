use serde::Serialize;

use super::session::{DialogState, Session};

// ============================================================================
// Base Response Types
// ============================================================================

/// Wrapper for successful responses with data
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

// ============================================================================
// Session Responses
// ============================================================================

/// Response for `session show`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub state: DialogState,
    /// None when the conversation has never been seen
    pub session: Option<Session>,
}

/// Response for `session reset`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetSessionData {
    pub conversation_id: String,
    pub reset: bool,
}

/// Response for `chat`, printed when the conversation ends
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatData {
    pub conversation_id: String,
    pub turns: usize,
}

// ============================================================================
// Registry Responses
// ============================================================================

/// Summary of one registered dialog
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogInfo {
    pub name: String,
    pub triggers: Vec<String>,
    pub steps: Vec<String>,
    pub slots: Vec<String>,
    pub priority: i32,
    pub handles_interruption: bool,
}

/// Response for `dialogs`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogsData {
    pub dialogs: Vec<DialogInfo>,
    pub confidence_threshold: f64,
    pub count: usize,
}

// ============================================================================
// Log Responses
// ============================================================================

/// Single log entry
#[derive(Debug, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub operation: String,
    #[serde(flatten)]
    pub details: serde_json::Value,
}

/// Response for reading logs
#[derive(Debug, Serialize)]
pub struct LogsData {
    pub entries: Vec<LogEntry>,
    pub count: usize,
}

/// Response for clearing logs
#[derive(Debug, Serialize)]
pub struct ClearLogsData {
    pub cleared: usize,
}

// ============================================================================
// Tests
// ============================================================================
