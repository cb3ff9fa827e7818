//! `SearchHotels`: find a destination, then list hotels there.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::dialog::{Step, StepContext, StepInput, StepResult};
use crate::models::entity::{AIRPORT_CODE, LOCATION};
use crate::models::{find_entity, Reply};
use crate::services::HotelStore;

use super::{DESTINATION, SEARCH_TYPE};

pub const DESTINATION_PROMPT: &str = "Please enter your destination";

const CITY: &str = "city";
const AIRPORT: &str = "airport";

/// Takes the destination from the triggering entities, or asks for it.
pub struct AskDestination;

#[async_trait]
impl Step for AskDestination {
    fn name(&self) -> &str {
        "askDestination"
    }

    fn slot(&self) -> Option<&str> {
        Some(DESTINATION)
    }

    fn extra_slots(&self) -> &[&str] {
        &[SEARCH_TYPE]
    }

    async fn run(&self, ctx: &mut StepContext<'_>, input: StepInput) -> anyhow::Result<StepResult> {
        if let StepInput::Triggered(intent) = &input {
            ctx.send(Reply::text(format!(
                "Welcome to the Hotels finder! We are analyzing your message: '{}'",
                ctx.turn().text()
            )));

            let found = find_entity(&intent.entities, LOCATION)
                .map(|e| (CITY, e))
                .or_else(|| find_entity(&intent.entities, AIRPORT_CODE).map(|e| (AIRPORT, e)));

            return Ok(match found {
                Some((search_type, entity)) => {
                    ctx.remember(SEARCH_TYPE, search_type);
                    StepResult::Advance(entity.value.clone())
                }
                None => StepResult::Suspend(DESTINATION_PROMPT.to_string()),
            });
        }

        // A typed answer is always treated as a city name
        match input.value().map(str::trim).filter(|v| !v.is_empty()) {
            Some(destination) => {
                ctx.remember(SEARCH_TYPE, CITY);
                Ok(StepResult::Advance(destination.to_string()))
            }
            None => Ok(StepResult::Suspend(DESTINATION_PROMPT.to_string())),
        }
    }
}

/// Searches the store and lists the hotels found.
pub struct SearchHotelsStep {
    store: Arc<dyn HotelStore>,
}

impl SearchHotelsStep {
    pub fn new(store: Arc<dyn HotelStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Step for SearchHotelsStep {
    fn name(&self) -> &str {
        "searchHotels"
    }

    async fn run(&self, ctx: &mut StepContext<'_>, input: StepInput) -> anyhow::Result<StepResult> {
        let destination = input
            .value()
            .or_else(|| ctx.get(DESTINATION))
            .unwrap_or_default()
            .to_string();

        let looking = if ctx.get(SEARCH_TYPE) == Some(AIRPORT) {
            format!("Looking for hotels near {} airport...", destination)
        } else {
            format!("Looking for hotels in {}...", destination)
        };
        ctx.send(Reply::text(looking));

        let hotels = match self.store.search_hotels(&destination).await {
            Ok(hotels) => hotels,
            Err(e) => {
                warn!(destination = %destination, error = %e, "hotel search failed");
                Vec::new()
            }
        };

        if hotels.is_empty() {
            return Ok(StepResult::Terminate(Some(Reply::text(format!(
                "Sorry, I couldn't find any hotels for '{}'.",
                destination
            )))));
        }

        ctx.send(Reply::text(format!("I found {} hotels:", hotels.len())));
        let cards = hotels.iter().map(|h| h.to_card()).collect();
        Ok(StepResult::Terminate(Some(Reply::cards(cards))))
    }
}
