use crate::dialog::DialogRegistry;
use crate::error::Result;
use crate::models::{DialogsData, SuccessResponse};

/// List registered dialogs with their triggers, steps and slots
pub fn list_dialogs(registry: &DialogRegistry) -> Result<serde_json::Value> {
    let dialogs = registry.describe();

    Ok(serde_json::to_value(SuccessResponse::new(DialogsData {
        count: dialogs.len(),
        dialogs,
        confidence_threshold: registry.confidence_threshold(),
    }))?)
}
