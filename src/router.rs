//! Intent router: decides what a turn does before any dialog runs.

use crate::dialog::{DialogDefinition, DialogRegistry};
use crate::models::{DialogState, Intent, Recognition, Session};

/// Routing decision for one turn.
#[derive(Debug)]
pub enum Route<'r> {
    /// Start `dialog` (replacing any active one) with the triggering intent
    Activate {
        dialog: &'r DialogDefinition,
        intent: Intent,
    },
    /// Feed the text to the step the session is waiting on
    Resume,
    /// Run the active dialog's interruption handler; session unchanged
    Interrupt,
    /// Run the registry's default handler
    Fallback,
    /// Nothing to do; session unchanged
    Drop,
}

pub struct IntentRouter<'r> {
    registry: &'r DialogRegistry,
}

impl<'r> IntentRouter<'r> {
    pub fn new(registry: &'r DialogRegistry) -> Self {
        Self { registry }
    }

    /// Top candidate of a recognition, subject to the registry threshold.
    pub fn select_intent(&self, recognition: &Recognition) -> Option<Intent> {
        recognition.top_intent(self.registry.confidence_threshold())
    }

    /// Decide what `intent` means for `session`. Never mutates anything.
    ///
    /// While a dialog waits for input, the text is its answer unless the
    /// intent names a different dialog whose priority beats the registry's
    /// resume priority and whose score reaches the interrupt threshold. A
    /// weak match such as a hotel name containing "hotel" stays an answer.
    /// On interruption the waiting dialog's interruption
    /// handler runs if it has one; without a handler the new dialog takes
    /// over.
    pub fn route(&self, intent: Option<&Intent>, session: &Session) -> Route<'r> {
        let matched = intent.and_then(|i| self.registry.for_intent(&i.name).map(|d| (d, i)));

        match session.state() {
            DialogState::Idle => match matched {
                Some((dialog, intent)) => Route::Activate {
                    dialog,
                    intent: intent.clone(),
                },
                None => Route::Fallback,
            },
            DialogState::AwaitingInput { dialog: waiting, .. } => match matched {
                Some((dialog, intent))
                    if dialog.name() != waiting
                        && dialog.priority() > self.registry.resume_priority()
                        && intent.score >= self.registry.interrupt_threshold() =>
                {
                    if self.handles_interruption(&waiting) {
                        Route::Interrupt
                    } else {
                        Route::Activate {
                            dialog,
                            intent: intent.clone(),
                        }
                    }
                }
                _ => Route::Resume,
            },
            DialogState::Running { dialog: active, .. } => match matched {
                Some((dialog, intent)) => Route::Activate {
                    dialog,
                    intent: intent.clone(),
                },
                None if self.handles_interruption(&active) => Route::Interrupt,
                None => Route::Drop,
            },
        }
    }

    fn handles_interruption(&self, dialog: &str) -> bool {
        self.registry
            .get(dialog)
            .map(|d| d.handles_interruption())
            .unwrap_or(false)
    }
}
