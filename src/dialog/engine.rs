//! Slot-filling dialog engine.
//!
//! Drives a dialog's step chain for one turn. Steps run back to back while
//! they return `Advance`; the chain stops at the first `Suspend` (the session
//! keeps its position and waits for the user) or `Terminate` (the dialog and
//! its data are dropped). A session is therefore never left mid-chain when a
//! call returns `Ok`.
//!
//! Each step's slot writes and replies are applied together with its
//! position change, only once the step has returned. On error the session
//! may hold the effects of earlier steps of the same turn; callers that need
//! all-or-nothing turns restore their own snapshot.

use tracing::{debug, info};

use crate::error::{BotError, Result};
use crate::models::{ActiveDialog, Intent, Reply, Session, TurnInfo};

use super::definition::DialogDefinition;
use super::registry::DialogRegistry;
use super::step::{StepContext, StepInput, StepResult};

/// Everything the engine produced during a turn.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TurnTrace {
    pub replies: Vec<Reply>,
    /// Step names in execution order
    pub steps: Vec<String>,
}

pub struct DialogEngine<'r> {
    registry: &'r DialogRegistry,
}

impl<'r> DialogEngine<'r> {
    pub fn new(registry: &'r DialogRegistry) -> Self {
        Self { registry }
    }

    /// Start `dialog` from its first step, replacing any active dialog.
    pub async fn activate(
        &self,
        dialog: &str,
        session: &mut Session,
        turn: &TurnInfo,
        intent: Intent,
        trace: &mut TurnTrace,
    ) -> Result<()> {
        let def = self.registry.get(dialog)?;

        if let Some(previous) = session.active_dialog.take() {
            info!(
                conversation = %session.conversation_id,
                cancelled = %previous.dialog,
                started = def.name(),
                "replacing active dialog"
            );
        }

        session.active_dialog = Some(ActiveDialog::new(def.name()));
        debug!(conversation = %session.conversation_id, dialog = def.name(), "activated");

        self.run_from(def, session, turn, StepInput::Triggered(intent), trace)
            .await
    }

    /// Hand the turn's text to the step the session is waiting on.
    pub async fn resume(
        &self,
        session: &mut Session,
        turn: &TurnInfo,
        trace: &mut TurnTrace,
    ) -> Result<()> {
        let dialog = match &session.active_dialog {
            Some(active) if active.awaiting.is_some() => active.dialog.clone(),
            _ => {
                return Err(BotError::SessionState(format!(
                    "conversation {} is not waiting for input",
                    session.conversation_id
                )))
            }
        };

        let def = self.registry.get(&dialog)?;
        let input = StepInput::Reply(turn.text().to_string());
        self.run_from(def, session, turn, input, trace).await
    }

    /// Run the active dialog's interruption handler, leaving the session as is.
    ///
    /// Returns false when there is no active dialog or it has no handler.
    pub fn interrupt(&self, session: &Session, turn: &TurnInfo, trace: &mut TurnTrace) -> Result<bool> {
        let Some(active) = &session.active_dialog else {
            return Ok(false);
        };

        let def = self.registry.get(&active.dialog)?;
        match def.interruption_reply(turn) {
            Some(reply) => {
                debug!(conversation = %session.conversation_id, dialog = def.name(), "interrupted");
                trace.replies.push(reply);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn run_from(
        &self,
        def: &DialogDefinition,
        session: &mut Session,
        turn: &TurnInfo,
        mut input: StepInput,
        trace: &mut TurnTrace,
    ) -> Result<()> {
        while let Some(next) = self.execute_step(def, session, turn, input, trace).await? {
            input = next;
        }
        Ok(())
    }

    /// Run the step at the active dialog's position and apply its result.
    ///
    /// Returns the input for the following step when the step advanced, or
    /// None once the dialog suspended or ended.
    pub async fn execute_step(
        &self,
        def: &DialogDefinition,
        session: &mut Session,
        turn: &TurnInfo,
        input: StepInput,
        trace: &mut TurnTrace,
    ) -> Result<Option<StepInput>> {
        let active = session.active_dialog.as_mut().ok_or_else(|| {
            BotError::SessionState(format!("no active dialog for {}", def.name()))
        })?;

        let Some(step) = def.steps().get(active.position) else {
            debug!(dialog = def.name(), "ran past last step, terminating");
            session.end_dialog();
            return Ok(None);
        };

        active.awaiting = None;
        trace.steps.push(step.name().to_string());

        let mut ctx = StepContext::new(turn, &active.data);
        let result = step
            .run(&mut ctx, input)
            .await
            .map_err(|e| BotError::StepFailed {
                step: step.name().to_string(),
                reason: format!("{:#}", e),
            })?;
        let (staged, replies) = ctx.into_parts();

        let declared = step.slots();
        if let Some(key) = staged.keys().find(|k| !declared.contains(&k.as_str())) {
            return Err(BotError::UndeclaredSlot {
                step: step.name().to_string(),
                slot: key.clone(),
            });
        }

        trace.replies.extend(replies);

        match result {
            StepResult::Advance(value) => {
                active.data.extend(staged);
                if let Some(slot) = step.slot() {
                    active.data.insert(slot.to_string(), value.clone());
                }
                active.position += 1;
                debug!(dialog = def.name(), step = step.name(), "advanced");
                Ok(Some(StepInput::Advanced(value)))
            }
            StepResult::Suspend(prompt) => {
                active.data.extend(staged);
                active.awaiting = Some(step.slot().unwrap_or(step.name()).to_string());
                trace.replies.push(Reply::text(prompt));
                debug!(dialog = def.name(), step = step.name(), "suspended for input");
                Ok(None)
            }
            StepResult::Terminate(output) => {
                trace.replies.extend(output);
                session.end_dialog();
                debug!(dialog = def.name(), step = step.name(), "terminated");
                Ok(None)
            }
        }
    }
}
