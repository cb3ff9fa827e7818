//! `ShowHotelsReviews`: find a hotel name, then list its reviews.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::dialog::{Step, StepContext, StepInput, StepResult};
use crate::models::entity::HOTEL as HOTEL_ENTITY;
use crate::models::{find_entity, Reply};
use crate::services::HotelStore;

use super::HOTEL;

pub const HOTEL_PROMPT: &str = "Which hotel would you like to see reviews for?";

pub struct AskHotel;

#[async_trait]
impl Step for AskHotel {
    fn name(&self) -> &str {
        "askHotel"
    }

    fn slot(&self) -> Option<&str> {
        Some(HOTEL)
    }

    async fn run(&self, _ctx: &mut StepContext<'_>, input: StepInput) -> anyhow::Result<StepResult> {
        let hotel = match &input {
            StepInput::Triggered(intent) => {
                find_entity(&intent.entities, HOTEL_ENTITY).map(|e| e.value.trim().to_string())
            }
            StepInput::Advanced(value) | StepInput::Reply(value) => Some(value.trim().to_string()),
        };

        Ok(match hotel.filter(|h| !h.is_empty()) {
            Some(hotel) => StepResult::Advance(hotel),
            None => StepResult::Suspend(HOTEL_PROMPT.to_string()),
        })
    }
}

pub struct ShowReviews {
    store: Arc<dyn HotelStore>,
}

impl ShowReviews {
    pub fn new(store: Arc<dyn HotelStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Step for ShowReviews {
    fn name(&self) -> &str {
        "showReviews"
    }

    async fn run(&self, ctx: &mut StepContext<'_>, input: StepInput) -> anyhow::Result<StepResult> {
        let hotel = input
            .value()
            .or_else(|| ctx.get(HOTEL))
            .unwrap_or_default()
            .to_string();

        ctx.send(Reply::text(format!("Looking for reviews of '{}'...", hotel)));

        let reviews = match self.store.search_reviews(&hotel).await {
            Ok(reviews) => reviews,
            Err(e) => {
                warn!(hotel = %hotel, error = %e, "review search failed");
                Vec::new()
            }
        };

        if reviews.is_empty() {
            return Ok(StepResult::Terminate(Some(Reply::text(format!(
                "Sorry, I couldn't find any reviews of '{}'.",
                hotel
            )))));
        }

        let cards = reviews.iter().map(|r| r.to_card()).collect();
        Ok(StepResult::Terminate(Some(Reply::cards(cards))))
    }
}
