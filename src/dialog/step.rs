//! The step contract interpreted by the dialog engine.
//!
//! A step never calls the next step itself. It returns a [`StepResult`] and
//! the engine decides whether to keep going, pause for the user, or finish.

use async_trait::async_trait;

use crate::models::{DialogData, Entity, Intent, Reply, TurnInfo};

/// What a step receives when it runs.
#[derive(Debug, Clone, PartialEq)]
pub enum StepInput {
    /// First step of a fresh activation: the intent that triggered it
    Triggered(Intent),
    /// Value handed over by the previous step in the same turn
    Advanced(String),
    /// The user's answer after the step suspended
    Reply(String),
}

impl StepInput {
    /// Entities of the triggering intent; empty for later inputs.
    pub fn entities(&self) -> &[Entity] {
        match self {
            Self::Triggered(intent) => &intent.entities,
            Self::Advanced(_) | Self::Reply(_) => &[],
        }
    }

    /// Captured value, if this input carries one.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Triggered(_) => None,
            Self::Advanced(value) | Self::Reply(value) => Some(value),
        }
    }
}

/// Outcome of one step attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum StepResult {
    /// Store the value under the step's slot and run the next step now
    Advance(String),
    /// Send the prompt and wait for the user's next message
    Suspend(String),
    /// End the dialog, optionally with a final message
    Terminate(Option<Reply>),
}

/// Per-step view of the turn.
///
/// Writes and replies are staged here and only applied when the step
/// returns successfully.
pub struct StepContext<'a> {
    turn: &'a TurnInfo,
    data: &'a DialogData,
    staged: DialogData,
    replies: Vec<Reply>,
}

impl<'a> StepContext<'a> {
    pub fn new(turn: &'a TurnInfo, data: &'a DialogData) -> Self {
        Self {
            turn,
            data,
            staged: DialogData::new(),
            replies: Vec::new(),
        }
    }

    pub fn turn(&self) -> &TurnInfo {
        self.turn
    }

    /// Read a slot, seeing this step's own staged writes first.
    pub fn get(&self, slot: &str) -> Option<&str> {
        self.staged
            .get(slot)
            .or_else(|| self.data.get(slot))
            .map(String::as_str)
    }

    /// Stage an auxiliary slot write. The key must be declared by the step.
    pub fn remember(&mut self, slot: impl Into<String>, value: impl Into<String>) {
        self.staged.insert(slot.into(), value.into());
    }

    /// Queue a message for the user.
    pub fn send(&mut self, reply: Reply) {
        self.replies.push(reply);
    }

    pub(crate) fn into_parts(self) -> (DialogData, Vec<Reply>) {
        (self.staged, self.replies)
    }
}

#[async_trait]
pub trait Step: Send + Sync {
    fn name(&self) -> &str;

    /// Slot that receives the value of `Advance`, if any.
    fn slot(&self) -> Option<&str> {
        None
    }

    /// Further slots the step may write through [`StepContext::remember`].
    fn extra_slots(&self) -> &[&str] {
        &[]
    }

    /// Every slot key this step writes.
    fn slots(&self) -> Vec<&str> {
        self.slot()
            .into_iter()
            .chain(self.extra_slots().iter().copied())
            .collect()
    }

    async fn run(&self, ctx: &mut StepContext<'_>, input: StepInput) -> anyhow::Result<StepResult>;
}

type RenderFn = Box<dyn Fn(&TurnInfo) -> String + Send + Sync>;

/// Single-shot step: render one message from the turn and terminate.
pub struct ReplyStep {
    name: String,
    render: RenderFn,
}

impl ReplyStep {
    pub fn new(
        name: impl Into<String>,
        render: impl Fn(&TurnInfo) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            render: Box::new(render),
        }
    }
}

#[async_trait]
impl Step for ReplyStep {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: &mut StepContext<'_>, _input: StepInput) -> anyhow::Result<StepResult> {
        let text = (self.render)(ctx.turn());
        Ok(StepResult::Terminate(Some(Reply::text(text))))
    }
}
