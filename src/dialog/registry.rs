//! Immutable table of dialogs, built once at startup.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{BotError, Result};
use crate::models::{DialogInfo, Reply, TurnInfo};

use super::definition::DialogDefinition;

/// Produces the acknowledgement for turns no dialog handles.
pub type DefaultHandler = Box<dyn Fn(&TurnInfo) -> Reply + Send + Sync>;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;
pub const DEFAULT_INTERRUPT_THRESHOLD: f64 = 0.9;

pub struct DialogRegistry {
    dialogs: Vec<DialogDefinition>,
    by_name: HashMap<String, usize>,
    by_trigger: HashMap<String, usize>,
    confidence_threshold: f64,
    interrupt_threshold: f64,
    resume_priority: i32,
    default_handler: DefaultHandler,
}

pub struct RegistryBuilder {
    dialogs: Vec<DialogDefinition>,
    confidence_threshold: f64,
    interrupt_threshold: f64,
    resume_priority: i32,
    default_handler: Option<DefaultHandler>,
}

impl DialogRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder {
            dialogs: Vec::new(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            interrupt_threshold: DEFAULT_INTERRUPT_THRESHOLD,
            resume_priority: 0,
            default_handler: None,
        }
    }

    /// Look up a dialog by name. Unknown names are configuration errors.
    pub fn get(&self, name: &str) -> Result<&DialogDefinition> {
        self.by_name
            .get(name)
            .map(|&i| &self.dialogs[i])
            .ok_or_else(|| BotError::UnknownDialog(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Dialog triggered by an intent name. Exact match only.
    pub fn for_intent(&self, intent: &str) -> Option<&DialogDefinition> {
        self.by_trigger.get(intent).map(|&i| &self.dialogs[i])
    }

    pub fn dialogs(&self) -> impl Iterator<Item = &DialogDefinition> {
        self.dialogs.iter()
    }

    pub fn len(&self) -> usize {
        self.dialogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dialogs.is_empty()
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    /// Score an intent needs to pull a waiting dialog away from its answer.
    pub fn interrupt_threshold(&self) -> f64 {
        self.interrupt_threshold
    }

    /// Priority an incoming intent must exceed to interrupt a waiting dialog.
    pub fn resume_priority(&self) -> i32 {
        self.resume_priority
    }

    pub fn default_reply(&self, turn: &TurnInfo) -> Reply {
        (self.default_handler)(turn)
    }

    pub fn describe(&self) -> Vec<DialogInfo> {
        self.dialogs
            .iter()
            .map(|d| DialogInfo {
                name: d.name().to_string(),
                triggers: d.triggers().to_vec(),
                steps: d.steps().iter().map(|s| s.name().to_string()).collect(),
                slots: d.slot_keys().into_iter().map(String::from).collect(),
                priority: d.priority(),
                handles_interruption: d.handles_interruption(),
            })
            .collect()
    }
}

impl RegistryBuilder {
    pub fn register(mut self, dialog: DialogDefinition) -> Self {
        self.dialogs.push(dialog);
        self
    }

    pub fn confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn interrupt_threshold(mut self, threshold: f64) -> Self {
        self.interrupt_threshold = threshold;
        self
    }

    pub fn resume_priority(mut self, priority: i32) -> Self {
        self.resume_priority = priority;
        self
    }

    pub fn default_handler(
        mut self,
        handler: impl Fn(&TurnInfo) -> Reply + Send + Sync + 'static,
    ) -> Self {
        self.default_handler = Some(Box::new(handler));
        self
    }

    /// Validate every definition and index names and triggers.
    pub fn build(self) -> Result<DialogRegistry> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(BotError::Config(format!(
                "confidence threshold must be between 0 and 1, got {}",
                self.confidence_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.interrupt_threshold) {
            return Err(BotError::Config(format!(
                "interrupt threshold must be between 0 and 1, got {}",
                self.interrupt_threshold
            )));
        }

        let mut by_name = HashMap::new();
        let mut by_trigger: HashMap<String, usize> = HashMap::new();

        for (index, dialog) in self.dialogs.iter().enumerate() {
            dialog.validate()?;

            if by_name.insert(dialog.name().to_string(), index).is_some() {
                return Err(BotError::DuplicateDialog(dialog.name().to_string()));
            }

            for trigger in dialog.triggers() {
                if let Some(&existing) = by_trigger.get(trigger) {
                    return Err(BotError::DuplicateTrigger {
                        intent: trigger.clone(),
                        first: self.dialogs[existing].name().to_string(),
                        second: dialog.name().to_string(),
                    });
                }
                by_trigger.insert(trigger.clone(), index);
            }

            debug!(dialog = dialog.name(), steps = dialog.steps().len(), "registered dialog");
        }

        let default_handler: DefaultHandler = match self.default_handler {
            Some(handler) => handler,
            None => Box::new(|turn: &TurnInfo| Reply::text(format!("You said '{}'.", turn.text()))),
        };

        Ok(DialogRegistry {
            dialogs: self.dialogs,
            by_name,
            by_trigger,
            confidence_threshold: self.confidence_threshold,
            interrupt_threshold: self.interrupt_threshold,
            resume_priority: self.resume_priority,
            default_handler,
        })
    }
}

impl std::fmt::Debug for DialogRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogRegistry")
            .field("dialogs", &self.dialogs)
            .field("confidence_threshold", &self.confidence_threshold)
            .field("interrupt_threshold", &self.interrupt_threshold)
            .field("resume_priority", &self.resume_priority)
            .finish()
    }
}
