use std::collections::HashSet;

use crate::error::{BotError, Result};
use crate::models::{Reply, TurnInfo};

use super::step::Step;

/// Produces the notice sent when a paused dialog is interrupted.
pub type InterruptionHandler = Box<dyn Fn(&TurnInfo) -> Reply + Send + Sync>;

/// A registered conversational flow: ordered steps plus trigger intents.
pub struct DialogDefinition {
    name: String,
    triggers: Vec<String>,
    steps: Vec<Box<dyn Step>>,
    priority: i32,
    on_interrupted: Option<InterruptionHandler>,
}

impl DialogDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            triggers: Vec::new(),
            steps: Vec::new(),
            priority: 0,
            on_interrupted: None,
        }
    }

    /// Add an intent name that activates this dialog.
    pub fn triggered_by(mut self, intent: impl Into<String>) -> Self {
        self.triggers.push(intent.into());
        self
    }

    pub fn step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Priority used when this dialog's intent arrives while another dialog
    /// is waiting for input.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn on_interrupted(
        mut self,
        handler: impl Fn(&TurnInfo) -> Reply + Send + Sync + 'static,
    ) -> Self {
        self.on_interrupted = Some(Box::new(handler));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    pub fn steps(&self) -> &[Box<dyn Step>] {
        &self.steps
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn handles_interruption(&self) -> bool {
        self.on_interrupted.is_some()
    }

    pub fn interruption_reply(&self, turn: &TurnInfo) -> Option<Reply> {
        self.on_interrupted.as_ref().map(|handler| handler(turn))
    }

    /// All slot keys written by the steps, in step order.
    pub fn slot_keys(&self) -> Vec<&str> {
        self.steps.iter().flat_map(|s| s.slots()).collect()
    }

    /// Definition-time checks: at least one step, no slot written twice.
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(BotError::EmptyDialog(self.name.clone()));
        }

        let mut seen = HashSet::new();
        for slot in self.slot_keys() {
            if !seen.insert(slot) {
                return Err(BotError::DuplicateSlot {
                    dialog: self.name.clone(),
                    slot: slot.to_string(),
                });
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for DialogDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogDefinition")
            .field("name", &self.name)
            .field("triggers", &self.triggers)
            .field("steps", &self.steps.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("priority", &self.priority)
            .field("handles_interruption", &self.handles_interruption())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::step::{ReplyStep, StepContext, StepInput, StepResult};
    use async_trait::async_trait;

    struct SlotStep {
        name: &'static str,
        slot: &'static str,
        extra: &'static [&'static str],
    }

    #[async_trait]
    impl Step for SlotStep {
        fn name(&self) -> &str {
            self.name
        }

        fn slot(&self) -> Option<&str> {
            Some(self.slot)
        }

        fn extra_slots(&self) -> &[&str] {
            self.extra
        }

        async fn run(&self, _ctx: &mut StepContext<'_>, _input: StepInput) -> anyhow::Result<StepResult> {
            Ok(StepResult::Advance(String::new()))
        }
    }

    #[test]
    fn test_builder_collects_fields() {
        let def = DialogDefinition::new("Help")
            .triggered_by("Help")
            .triggered_by("Assist")
            .with_priority(3)
            .step(ReplyStep::new("help", |_| "help".to_string()));

        assert_eq!(def.name(), "Help");
        assert_eq!(def.triggers(), &["Help".to_string(), "Assist".to_string()]);
        assert_eq!(def.priority(), 3);
        assert_eq!(def.steps().len(), 1);
        assert!(!def.handles_interruption());
        assert!(def.validate().is_ok());
    }

    #[test]
    fn test_empty_dialog_rejected() {
        let def = DialogDefinition::new("Nothing").triggered_by("Nothing");
        assert!(matches!(def.validate(), Err(BotError::EmptyDialog(name)) if name == "Nothing"));
    }

    #[test]
    fn test_duplicate_slot_across_steps_rejected() {
        let def = DialogDefinition::new("Search")
            .step(SlotStep { name: "a", slot: "destination", extra: &[] })
            .step(SlotStep { name: "b", slot: "destination", extra: &[] });

        match def.validate() {
            Err(BotError::DuplicateSlot { dialog, slot }) => {
                assert_eq!(dialog, "Search");
                assert_eq!(slot, "destination");
            }
            other => panic!("expected duplicate slot, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_between_extra_and_primary_rejected() {
        let def = DialogDefinition::new("Search")
            .step(SlotStep { name: "a", slot: "destination", extra: &["searchType"] })
            .step(SlotStep { name: "b", slot: "searchType", extra: &[] });
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_slot_keys_in_step_order() {
        let def = DialogDefinition::new("Search")
            .step(SlotStep { name: "a", slot: "destination", extra: &["searchType"] })
            .step(ReplyStep::new("done", |_| String::new()));
        assert_eq!(def.slot_keys(), vec!["destination", "searchType"]);
    }

    #[test]
    fn test_interruption_reply() {
        let def = DialogDefinition::new("Search")
            .on_interrupted(|_| Reply::text("Please provide a destination"));
        let turn = TurnInfo::new("c", "help");
        assert_eq!(
            def.interruption_reply(&turn),
            Some(Reply::text("Please provide a destination"))
        );
    }
}
