// CLI Parser - Clap derive definitions

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Conversation used by `say` when none is given, so consecutive calls
/// continue the same dialog.
pub const DEFAULT_CONVERSATION: &str = "cli";

/// Hotel Bot: slot-filling hotel search assistant
#[derive(Parser, Debug)]
#[command(name = "hotel-bot")]
#[command(version)]
#[command(about = "Multi-turn hotel search bot with slot-filling dialogs")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file path (defaults to ~/.hotel-bot/config.json)
    #[arg(long, env = "HOTEL_BOT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one message and print the turn outcome
    Say {
        /// Message text (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Conversation ID
        #[arg(long, short = 'c', default_value = DEFAULT_CONVERSATION)]
        conversation: String,
    },

    /// Read one inbound message as JSON from stdin and print the outcome
    Turn,

    /// Interactive conversation over stdin, one message per line
    Chat {
        /// Conversation ID (a new one is generated when omitted)
        #[arg(long, short = 'c')]
        conversation: Option<String>,
    },

    /// Inspect or reset stored sessions
    Session {
        #[command(subcommand)]
        action: SessionCommand,
    },

    /// List registered dialogs
    Dialogs,

    /// View turn logs
    Logs {
        /// Number of log entries
        #[arg(default_value = "50")]
        n: usize,
        /// Filter by operation type
        operation: Option<String>,
    },

    /// Clear all logs
    ClearLogs,
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Show a conversation's session
    Show {
        /// Conversation ID
        conversation: String,
    },
    /// Delete a conversation's session
    Reset {
        /// Conversation ID
        conversation: String,
    },
}

/// Join `say` arguments into one message.
pub fn join_text(words: &[String]) -> String {
    words.join(" ")
}

// ============================================================================
// Tests
// ============================================================================
