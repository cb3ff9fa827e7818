pub mod bot;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dialog;
pub mod error;
pub mod hotels;
pub mod logging;
pub mod models;
pub mod router;
pub mod services;
pub mod session;

pub use bot::{Bot, ConversationLocks, APOLOGY};
pub use cli::{Cli, Command};
pub use config::BotConfig;
pub use dialog::{
    DialogDefinition, DialogEngine, DialogRegistry, ReplyStep, Step, StepContext, StepInput,
    StepResult, TurnTrace,
};
pub use error::{BotError, Result};
pub use hotels::build_registry;
pub use logging::{clear_logs, log, read_logs, LogEntry};
pub use router::{IntentRouter, Route};
pub use services::{
    DictionaryCorrector, HotelStore, KeywordRecognizer, NluClient, SampleHotelStore,
    TextCorrector,
};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
