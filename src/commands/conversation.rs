use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::bot::Bot;
use crate::error::Result;
use crate::models::{ChatData, InboundMessage, Reply, SuccessResponse};

const QUIT_COMMANDS: [&str; 2] = ["/quit", "/exit"];

/// Handle one message and return the turn outcome
pub async fn say(bot: &Bot, conversation_id: &str, text: &str) -> Result<serde_json::Value> {
    let outcome = bot
        .handle(InboundMessage::new(conversation_id, text))
        .await?;
    Ok(serde_json::to_value(SuccessResponse::new(outcome))?)
}

/// Handle an inbound message given as JSON (`{"conversationId", "text"}`)
pub async fn turn(bot: &Bot, input: &str) -> Result<serde_json::Value> {
    let message: InboundMessage = serde_json::from_str(input.trim())?;
    let outcome = bot.handle(message).await?;
    Ok(serde_json::to_value(SuccessResponse::new(outcome))?)
}

/// Run a conversation over `input` lines, writing bot replies to `out`
pub async fn chat<R, W>(
    bot: &Bot,
    conversation_id: &str,
    input: R,
    out: &mut W,
) -> Result<serde_json::Value>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(
        out,
        "Chatting as '{}'. Type {} to leave.",
        conversation_id, QUIT_COMMANDS[0]
    )?;
    out.flush()?;

    let mut lines = input.lines();
    let mut turns = 0;

    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if QUIT_COMMANDS.contains(&text) {
            break;
        }

        let outcome = bot
            .handle(InboundMessage::new(conversation_id, text))
            .await?;
        turns += 1;

        for reply in &outcome.replies {
            writeln!(out, "{}", render_reply(reply))?;
        }
        out.flush()?;
    }

    Ok(serde_json::to_value(SuccessResponse::new(ChatData {
        conversation_id: conversation_id.to_string(),
        turns,
    }))?)
}

/// Plain-text rendering of a reply for the terminal
pub fn render_reply(reply: &Reply) -> String {
    match reply {
        Reply::Text { text } => format!("bot> {}", text),
        Reply::Cards { cards } => cards
            .iter()
            .map(|card| {
                let mut line = format!("  * {}", card.title);
                if let Some(subtitle) = &card.subtitle {
                    line.push_str(&format!(" - {}", subtitle));
                }
                if let Some(text) = &card.text {
                    line.push_str(&format!("\n    {}", text));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
