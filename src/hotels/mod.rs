//! The hotel bot's dialog table.
//!
//! | Dialog              | Intent              | Steps                          |
//! |---------------------|---------------------|--------------------------------|
//! | `GreetingDialog`    | `Greeting`          | greet                          |
//! | `SearchHotels`      | `SearchHotels`      | askDestination, searchHotels   |
//! | `ShowHotelsReviews` | `ShowHotelsReviews` | askHotel, showReviews          |
//! | `HelpDialog`        | `Help`              | help                           |
//! | `CancelDialog`      | `Cancel`            | cancel                         |

pub mod reviews;
pub mod search;

use std::sync::Arc;

use crate::config::BotConfig;
use crate::dialog::{DialogDefinition, DialogRegistry, ReplyStep};
use crate::error::Result;
use crate::models::Reply;
use crate::services::HotelStore;

pub use reviews::{AskHotel, ShowReviews};
pub use search::{AskDestination, SearchHotelsStep};

// Slot keys
pub const DESTINATION: &str = "destination";
pub const SEARCH_TYPE: &str = "searchType";
pub const HOTEL: &str = "hotel";

const DIALOG_PRIORITY: i32 = 1;

pub const HELP_TEXT: &str = "Hi! Try asking me things like 'search hotels in Seattle', \
'search hotels near LAX airport' or 'show me the reviews of The Bot Resort'";

/// Build the registry of hotel dialogs on top of `store`.
pub fn build_registry(store: Arc<dyn HotelStore>, config: &BotConfig) -> Result<DialogRegistry> {
    DialogRegistry::builder()
        .confidence_threshold(config.confidence_threshold)
        .interrupt_threshold(config.interrupt_threshold)
        .resume_priority(config.resume_priority)
        .default_handler(|turn| {
            Reply::text(format!(
                "You reached the default message handler. You said '{}'.",
                turn.text()
            ))
        })
        .register(
            DialogDefinition::new("GreetingDialog")
                .triggered_by("Greeting")
                .with_priority(DIALOG_PRIORITY)
                .step(ReplyStep::new("greet", |turn| {
                    format!("You reached the Greeting intent. You said '{}'.", turn.text())
                })),
        )
        .register(
            DialogDefinition::new("SearchHotels")
                .triggered_by("SearchHotels")
                .with_priority(DIALOG_PRIORITY)
                .step(AskDestination)
                .step(SearchHotelsStep::new(Arc::clone(&store)))
                .on_interrupted(|_| Reply::text("Please provide a destination")),
        )
        .register(
            DialogDefinition::new("ShowHotelsReviews")
                .triggered_by("ShowHotelsReviews")
                .with_priority(DIALOG_PRIORITY)
                .step(AskHotel)
                .step(ShowReviews::new(store)),
        )
        .register(
            DialogDefinition::new("HelpDialog")
                .triggered_by("Help")
                .with_priority(DIALOG_PRIORITY)
                .step(ReplyStep::new("help", |_| HELP_TEXT.to_string())),
        )
        .register(
            DialogDefinition::new("CancelDialog")
                .triggered_by("Cancel")
                .with_priority(DIALOG_PRIORITY)
                .step(ReplyStep::new("cancel", |turn| {
                    format!("You reached the Cancel intent. You said '{}'.", turn.text())
                })),
        )
        .build()
}
