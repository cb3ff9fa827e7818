//! Hotel Bot CLI
//!
//! Main entry point for the CLI application.
//! Dispatches commands to the appropriate handlers and outputs JSON results.

use clap::Parser;
use tokio::io::{AsyncReadExt, BufReader};
use uuid::Uuid;

use hotel_bot::cli::{join_text, Cli, Command, SessionCommand};
use hotel_bot::commands;
use hotel_bot::logging::init_tracing;
use hotel_bot::models::ErrorResponse;
use hotel_bot::{Bot, BotConfig, Result};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(json) => {
            println!("{}", to_pretty(&json));
        }
        Err(e) => {
            tracing::error!("command failed: {}", e);
            let error_response = ErrorResponse::new(e.to_string());
            println!("{}", to_pretty(&error_response));
            std::process::exit(1);
        }
    }
}

fn to_pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"success\":false,\"error\":\"{}\"}}", e))
}

/// Run the dispatched command
async fn run(cli: Cli) -> Result<serde_json::Value> {
    let config = BotConfig::load(cli.config.as_deref())?;
    let log_dir = config.log_dir();

    match cli.command {
        // Commands that don't need the bot
        Command::Logs { n, operation } => commands::logs(&log_dir, n, operation.as_deref()),
        Command::ClearLogs => commands::clear_logs(&log_dir),

        command => {
            let bot = Bot::from_config(&config)?;
            dispatch(command, &bot, &log_dir).await
        }
    }
}

async fn dispatch(
    command: Command,
    bot: &Bot,
    log_dir: &std::path::Path,
) -> Result<serde_json::Value> {
    match command {
        Command::Say { text, conversation } => {
            commands::say(bot, &conversation, &join_text(&text)).await
        }

        Command::Turn => {
            let mut input = String::new();
            tokio::io::stdin().read_to_string(&mut input).await?;
            commands::turn(bot, &input).await
        }

        Command::Chat { conversation } => {
            let conversation = conversation.unwrap_or_else(|| Uuid::new_v4().to_string());
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            commands::chat(bot, &conversation, stdin, &mut stdout).await
        }

        Command::Session { action } => match action {
            SessionCommand::Show { conversation } => {
                commands::show_session(bot, &conversation).await
            }
            SessionCommand::Reset { conversation } => {
                commands::reset_session(bot, &conversation, log_dir).await
            }
        },

        Command::Dialogs => commands::list_dialogs(bot.registry()),

        // Handled in run() before the bot is built
        Command::Logs { .. } | Command::ClearLogs => {
            unreachable!("log commands are handled before bot construction")
        }
    }
}
