//! Turn handling.
//!
//! `Bot` wires the collaborators to the router and engine:
//! inbound message -> (corrector) -> NLU -> router -> engine -> replies.
//! Turns for one conversation are serialized; turns for different
//! conversations run concurrently.

use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info, warn};

use crate::config::BotConfig;
use crate::dialog::{DialogEngine, DialogRegistry, TurnTrace};
use crate::error::Result;
use crate::hotels::build_registry;
use crate::logging;
use crate::models::{InboundMessage, Intent, Reply, RouteKind, Session, TurnInfo, TurnOutcome};
use crate::router::{IntentRouter, Route};
use crate::services::{
    DictionaryCorrector, KeywordRecognizer, NluClient, SampleHotelStore, TextCorrector,
};
use crate::session::{FileSessionStore, SessionStore};

/// Sent in place of a turn's replies when a step fails.
pub const APOLOGY: &str = "Sorry, something went wrong on my side. Please try again.";

// ============================================================================
// ConversationLocks
// ============================================================================

/// One async mutex per conversation ID, dropped once nobody holds or
/// waits on it.
#[derive(Debug, Default)]
pub struct ConversationLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ConversationLocks {
    pub async fn acquire(&self, conversation_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Only the map references an idle entry
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(conversation_id.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}

// ============================================================================
// Bot
// ============================================================================

pub struct Bot {
    registry: Arc<DialogRegistry>,
    nlu: Arc<dyn NluClient>,
    corrector: Option<Arc<dyn TextCorrector>>,
    sessions: Arc<dyn SessionStore>,
    locks: ConversationLocks,
    log_dir: Option<PathBuf>,
}

impl Bot {
    pub fn new(
        registry: Arc<DialogRegistry>,
        nlu: Arc<dyn NluClient>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            registry,
            nlu,
            corrector: None,
            sessions,
            locks: ConversationLocks::default(),
            log_dir: None,
        }
    }

    /// Run `corrector` on every inbound text before recognition.
    pub fn with_corrector(mut self, corrector: Arc<dyn TextCorrector>) -> Self {
        self.corrector = Some(corrector);
        self
    }

    /// Append one line per turn to the turn log in `dir`.
    pub fn with_turn_log(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// The hotel bot as configured: sample store, keyword recognizer,
    /// file sessions and the turn log.
    pub fn from_config(config: &BotConfig) -> Result<Self> {
        let store = SampleHotelStore::new().with_latency(Duration::from_millis(config.store_latency_ms));
        let registry = build_registry(Arc::new(store), config)?;

        let mut bot = Self::new(
            Arc::new(registry),
            Arc::new(KeywordRecognizer::hotel_model()),
            Arc::new(FileSessionStore::new(config.session_dir())),
        )
        .with_turn_log(config.log_dir());

        if config.spell_correction_enabled {
            bot = bot.with_corrector(Arc::new(DictionaryCorrector::new(&config.corrections)));
        }

        Ok(bot)
    }

    pub fn registry(&self) -> &DialogRegistry {
        &self.registry
    }

    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }

    /// Handle one inbound message.
    ///
    /// Collaborator failures degrade (raw text, no intent, empty results).
    /// A failing step rolls the session back to where the turn started and
    /// answers with an apology. Only configuration and storage errors are
    /// returned.
    pub async fn handle(&self, message: InboundMessage) -> Result<TurnOutcome> {
        let InboundMessage {
            conversation_id,
            text,
        } = message;

        let _turn_guard = self.locks.acquire(&conversation_id).await;

        let mut session = self
            .sessions
            .load(&conversation_id)
            .await?
            .unwrap_or_else(|| Session::new(conversation_id.clone()));
        session.touch();
        let snapshot = session.clone();

        let mut turn = TurnInfo::new(conversation_id.clone(), text);
        self.correct(&mut turn).await;
        let intent = self.recognize(&turn).await;

        if let Some(active) = &session.active_dialog {
            if !self.registry.contains(&active.dialog) {
                warn!(
                    conversation = %conversation_id,
                    dialog = %active.dialog,
                    "session references an unregistered dialog, discarding it"
                );
                session.end_dialog();
            }
        }

        let router = IntentRouter::new(&self.registry);
        let route = router.route(intent.as_ref(), &session);
        let kind = route_kind(&route);
        debug!(conversation = %conversation_id, route = kind.as_str(), "routed turn");

        let mut trace = TurnTrace::default();
        let dispatched = self.dispatch(route, &mut session, &turn, &mut trace).await;

        let (kind, succeeded) = match dispatched {
            Ok(kind) => (kind, true),
            Err(e) if e.is_configuration() => return Err(e),
            Err(e) => {
                error!(conversation = %conversation_id, error = %e, "turn failed, rolling back");
                session = snapshot;
                trace.replies = vec![Reply::text(APOLOGY)];
                (kind, false)
            }
        };

        self.sessions.save(&session).await?;

        let outcome = TurnOutcome {
            conversation_id,
            route: kind,
            intent,
            corrected_text: turn.corrected_text.clone(),
            replies: trace.replies,
            steps: trace.steps,
            state: session.state(),
            handled_at: Utc::now(),
        };

        self.log_turn(&outcome, succeeded);
        Ok(outcome)
    }

    /// Current session for a conversation, if one was ever saved.
    pub async fn session(&self, conversation_id: &str) -> Result<Option<Session>> {
        let _guard = self.locks.acquire(conversation_id).await;
        self.sessions.load(conversation_id).await
    }

    /// Forget a conversation's session. Returns whether one existed.
    pub async fn reset(&self, conversation_id: &str) -> Result<bool> {
        let _guard = self.locks.acquire(conversation_id).await;
        let cleared = self.sessions.clear(conversation_id).await?;
        if cleared {
            info!(conversation = conversation_id, "session reset");
        }
        Ok(cleared)
    }

    async fn correct(&self, turn: &mut TurnInfo) {
        let Some(corrector) = &self.corrector else {
            return;
        };

        match corrector.correct(&turn.raw_text).await {
            Ok(corrected) if corrected != turn.raw_text => {
                debug!(raw = %turn.raw_text, corrected = %corrected, "corrected text");
                turn.corrected_text = Some(corrected);
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "text correction failed, using raw text"),
        }
    }

    async fn recognize(&self, turn: &TurnInfo) -> Option<Intent> {
        match self.nlu.recognize(turn.text()).await {
            Ok(recognition) => IntentRouter::new(&self.registry).select_intent(&recognition),
            Err(e) => {
                warn!(error = %e, "intent recognition failed, treating as no intent");
                None
            }
        }
    }

    async fn dispatch(
        &self,
        route: Route<'_>,
        session: &mut Session,
        turn: &TurnInfo,
        trace: &mut TurnTrace,
    ) -> Result<RouteKind> {
        let engine = DialogEngine::new(&self.registry);

        match route {
            Route::Activate { dialog, intent } => {
                engine
                    .activate(dialog.name(), session, turn, intent, trace)
                    .await?;
                Ok(RouteKind::Activated)
            }
            Route::Resume => {
                engine.resume(session, turn, trace).await?;
                Ok(RouteKind::Resumed)
            }
            Route::Interrupt => {
                if engine.interrupt(session, turn, trace)? {
                    Ok(RouteKind::Interrupted)
                } else {
                    Ok(RouteKind::Dropped)
                }
            }
            Route::Fallback => {
                trace.replies.push(self.registry.default_reply(turn));
                Ok(RouteKind::Fallback)
            }
            Route::Drop => {
                debug!(conversation = %session.conversation_id, "turn dropped");
                Ok(RouteKind::Dropped)
            }
        }
    }

    fn log_turn(&self, outcome: &TurnOutcome, succeeded: bool) {
        let Some(dir) = &self.log_dir else {
            return;
        };

        let details = format!(
            "conversation={} route={} intent={} state={} replies={}",
            outcome.conversation_id,
            outcome.route.as_str(),
            outcome.intent.as_ref().map_or("-", |i| i.name.as_str()),
            outcome.state.as_str(),
            outcome.replies.len()
        );
        if let Err(e) = logging::log(dir, "turn", Some(details), succeeded) {
            warn!(error = %e, "failed to write turn log");
        }
    }
}

fn route_kind(route: &Route<'_>) -> RouteKind {
    match route {
        Route::Activate { .. } => RouteKind::Activated,
        Route::Resume => RouteKind::Resumed,
        Route::Interrupt => RouteKind::Interrupted,
        Route::Fallback => RouteKind::Fallback,
        Route::Drop => RouteKind::Dropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::{DialogDefinition, ReplyStep, Step, StepContext, StepInput, StepResult};
    use crate::models::{ActiveDialog, DialogState, Recognition, ScoredIntent};
    use crate::session::MemorySessionStore;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Recognizes exactly one intent name, given as the whole text.
    struct EchoNlu;

    #[async_trait]
    impl NluClient for EchoNlu {
        async fn recognize(&self, text: &str) -> anyhow::Result<Recognition> {
            Ok(Recognition {
                intents: vec![ScoredIntent {
                    name: text.to_string(),
                    score: 0.9,
                }],
                entities: Vec::new(),
            })
        }
    }

    struct DownNlu;

    #[async_trait]
    impl NluClient for DownNlu {
        async fn recognize(&self, _text: &str) -> anyhow::Result<Recognition> {
            Err(anyhow!("service unavailable"))
        }
    }

    struct DownCorrector;

    #[async_trait]
    impl TextCorrector for DownCorrector {
        async fn correct(&self, _text: &str) -> anyhow::Result<String> {
            Err(anyhow!("timeout"))
        }
    }

    struct Ask;

    #[async_trait]
    impl Step for Ask {
        fn name(&self) -> &str {
            "ask"
        }

        fn slot(&self) -> Option<&str> {
            Some("answer")
        }

        async fn run(&self, _ctx: &mut StepContext<'_>, input: StepInput) -> anyhow::Result<StepResult> {
            Ok(match input {
                StepInput::Triggered(_) => StepResult::Suspend("Answer?".to_string()),
                other => StepResult::Advance(other.value().unwrap_or_default().to_string()),
            })
        }
    }

    /// Fails whenever the answer is "boom".
    struct Finish;

    #[async_trait]
    impl Step for Finish {
        fn name(&self) -> &str {
            "finish"
        }

        async fn run(&self, _ctx: &mut StepContext<'_>, input: StepInput) -> anyhow::Result<StepResult> {
            match input.value() {
                Some("boom") => Err(anyhow!("exploded")),
                value => Ok(StepResult::Terminate(Some(Reply::text(format!(
                    "Got {}",
                    value.unwrap_or_default()
                ))))),
            }
        }
    }

    fn registry() -> Arc<DialogRegistry> {
        Arc::new(
            DialogRegistry::builder()
                .register(
                    DialogDefinition::new("Quiz")
                        .triggered_by("quiz")
                        .with_priority(1)
                        .step(Ask)
                        .step(Finish),
                )
                .register(
                    DialogDefinition::new("Hello")
                        .triggered_by("hello")
                        .step(ReplyStep::new("hello", |_| "Hi".to_string())),
                )
                .build()
                .unwrap(),
        )
    }

    fn bot(nlu: Arc<dyn NluClient>) -> Bot {
        Bot::new(registry(), nlu, Arc::new(MemorySessionStore::new()))
    }

    #[tokio::test]
    async fn test_fallback_when_nothing_matches() {
        let bot = bot(Arc::new(EchoNlu));
        let outcome = bot.handle(InboundMessage::new("c1", "weather")).await.unwrap();

        assert_eq!(outcome.route, RouteKind::Fallback);
        assert_eq!(outcome.texts(), vec!["You said 'weather'."]);
        assert_eq!(outcome.state, DialogState::Idle);
    }

    #[tokio::test]
    async fn test_nlu_failure_falls_back() {
        let bot = bot(Arc::new(DownNlu));
        let outcome = bot.handle(InboundMessage::new("c1", "hello")).await.unwrap();
        assert_eq!(outcome.route, RouteKind::Fallback);
        assert!(outcome.intent.is_none());
    }

    #[tokio::test]
    async fn test_corrector_failure_uses_raw_text() {
        let bot = bot(Arc::new(EchoNlu)).with_corrector(Arc::new(DownCorrector));
        let outcome = bot.handle(InboundMessage::new("c1", "hello")).await.unwrap();
        assert_eq!(outcome.route, RouteKind::Activated);
        assert!(outcome.corrected_text.is_none());
        assert_eq!(outcome.texts(), vec!["Hi"]);
    }

    #[tokio::test]
    async fn test_session_persists_between_turns() {
        let bot = bot(Arc::new(EchoNlu));

        let first = bot.handle(InboundMessage::new("c1", "quiz")).await.unwrap();
        assert_eq!(first.texts(), vec!["Answer?"]);
        assert!(matches!(first.state, DialogState::AwaitingInput { .. }));

        let second = bot.handle(InboundMessage::new("c1", "42")).await.unwrap();
        assert_eq!(second.route, RouteKind::Resumed);
        assert_eq!(second.steps, vec!["ask", "finish"]);
        assert_eq!(second.texts(), vec!["Got 42"]);

        let session = bot.session("c1").await.unwrap().unwrap();
        assert_eq!(session.turn_count, 2);
        assert!(session.active_dialog.is_none());
    }

    #[tokio::test]
    async fn test_step_failure_rolls_back_and_apologizes() {
        let bot = bot(Arc::new(EchoNlu));
        bot.handle(InboundMessage::new("c1", "quiz")).await.unwrap();
        let waiting = bot.session("c1").await.unwrap().unwrap();

        let outcome = bot.handle(InboundMessage::new("c1", "boom")).await.unwrap();
        assert_eq!(outcome.texts(), vec![APOLOGY]);
        assert_eq!(outcome.state, waiting.state());

        let after = bot.session("c1").await.unwrap().unwrap();
        assert_eq!(after.active_dialog, waiting.active_dialog);
        assert_eq!(after.turn_count, waiting.turn_count + 1);

        let retry = bot.handle(InboundMessage::new("c1", "7")).await.unwrap();
        assert_eq!(retry.texts(), vec!["Got 7"]);
    }

    #[tokio::test]
    async fn test_unregistered_dialog_in_session_is_discarded() {
        let sessions = Arc::new(MemorySessionStore::new());
        let mut stale = Session::new("c1");
        let mut active = ActiveDialog::new("Retired");
        active.awaiting = Some("x".to_string());
        stale.active_dialog = Some(active);
        sessions.save(&stale).await.unwrap();

        let bot = Bot::new(registry(), Arc::new(EchoNlu), sessions);
        let outcome = bot.handle(InboundMessage::new("c1", "hello")).await.unwrap();
        assert_eq!(outcome.route, RouteKind::Activated);
        assert_eq!(outcome.texts(), vec!["Hi"]);
        assert_eq!(outcome.state, DialogState::Idle);
    }

    #[tokio::test]
    async fn test_reset_forgets_session() {
        let bot = bot(Arc::new(EchoNlu));
        bot.handle(InboundMessage::new("c1", "quiz")).await.unwrap();

        assert!(bot.reset("c1").await.unwrap());
        assert!(bot.session("c1").await.unwrap().is_none());
        assert!(!bot.reset("c1").await.unwrap());
    }

    #[tokio::test]
    async fn test_turn_log_written() {
        let dir = TempDir::new().unwrap();
        let bot = bot(Arc::new(EchoNlu)).with_turn_log(dir.path());

        bot.handle(InboundMessage::new("c1", "hello")).await.unwrap();

        let entries = logging::read_logs(dir.path(), 10, Some("turn")).unwrap();
        assert_eq!(entries.len(), 1);
        let details = entries[0].details.as_deref().unwrap();
        assert!(details.contains("conversation=c1"));
        assert!(details.contains("route=activated"));
        assert!(details.contains("intent=hello"));
        assert!(entries[0].success);
    }

    #[tokio::test]
    async fn test_locks_are_pruned_after_use() {
        let locks = ConversationLocks::default();
        {
            let _a = locks.acquire("a").await;
            let _b = locks.acquire("b").await;
            assert_eq!(locks.len().await, 2);
        }
        let _c = locks.acquire("c").await;
        assert_eq!(locks.len().await, 1);
    }

    #[tokio::test]
    async fn test_same_conversation_turns_are_serialized() {
        let locks = Arc::new(ConversationLocks::default());
        let guard = locks.acquire("c1").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire("c1").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        // Other conversations are not blocked
        let _other = locks.acquire("c2").await;

        drop(guard);
        waiter.await.unwrap();
    }

    #[test]
    fn test_from_config_builds_hotel_bot() {
        let dir = TempDir::new().unwrap();
        let config = BotConfig {
            session_dir: Some(dir.path().join("sessions")),
            log_dir: Some(dir.path().join("logs")),
            spell_correction_enabled: true,
            ..BotConfig::default()
        };

        let bot = Bot::from_config(&config).unwrap();
        assert_eq!(bot.registry().len(), 5);
        assert!(bot.corrector.is_some());
    }
}
