use std::path::Path;

use crate::bot::Bot;
use crate::error::Result;
use crate::logging;
use crate::models::{DialogState, ResetSessionData, SessionData, SuccessResponse};

/// Show the stored session for a conversation
pub async fn show_session(bot: &Bot, conversation_id: &str) -> Result<serde_json::Value> {
    let session = bot.session(conversation_id).await?;
    let state = session
        .as_ref()
        .map(|s| s.state())
        .unwrap_or(DialogState::Idle);

    Ok(serde_json::to_value(SuccessResponse::new(SessionData {
        state,
        session,
    }))?)
}

/// Delete the stored session for a conversation
pub async fn reset_session(
    bot: &Bot,
    conversation_id: &str,
    log_dir: &Path,
) -> Result<serde_json::Value> {
    let reset = bot.reset(conversation_id).await?;

    if let Err(e) = logging::log(
        log_dir,
        "sessionReset",
        Some(format!("conversation={} reset={}", conversation_id, reset)),
        true,
    ) {
        tracing::warn!(error = %e, "failed to write log entry");
    }

    Ok(serde_json::to_value(SuccessResponse::new(ResetSessionData {
        conversation_id: conversation_id.to_string(),
        reset,
    }))?)
}
