//! Hotel result store.
//!
//! `SampleHotelStore` fabricates a deterministic catalog: five hotels for
//! any destination and five reviews for any hotel. Ratings, prices and
//! review picks derive from a hash of the query so repeated searches agree.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::models::{Hotel, Review};

const RESULTS_PER_QUERY: usize = 5;

const REVIEW_TITLES: [&str; 6] = [
    "Very stylish, great stay, great staff",
    "Good hotel, awful meals",
    "Needs more attention to little things",
    "Lovely small hotel ideally situated to explore the area",
    "Positive surprise",
    "Beautiful suite and resort",
];

const REVIEW_TEXT: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. \
Mauris odio magna, sodales vel ligula sit amet, vulputate vehicula velit.";

#[async_trait]
pub trait HotelStore: Send + Sync {
    async fn search_hotels(&self, destination: &str) -> anyhow::Result<Vec<Hotel>>;
    async fn search_reviews(&self, hotel: &str) -> anyhow::Result<Vec<Review>>;
}

#[derive(Debug, Clone, Default)]
pub struct SampleHotelStore {
    latency: Duration,
}

impl SampleHotelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every lookup, to mimic a remote backend.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn wait(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl HotelStore for SampleHotelStore {
    async fn search_hotels(&self, destination: &str) -> anyhow::Result<Vec<Hotel>> {
        self.wait().await;

        let destination = destination.trim();
        if destination.is_empty() {
            return Ok(Vec::new());
        }

        let hotels = (1..=RESULTS_PER_QUERY)
            .map(|i| {
                let name = format!("{} Hotel {}", destination, i);
                let seed = fnv1a(&name);
                Hotel {
                    rating: (seed % 5) as u8 + 1,
                    number_of_reviews: ((seed >> 8) % 5000) as u32 + 1,
                    price_starting: ((seed >> 24) % 450) as u32 + 80,
                    image: format!(
                        "https://placeholdit.imgix.net/~text?txtsize=35&txt=Hotel+{}&w=500&h=260",
                        i
                    ),
                    location: destination.to_string(),
                    name,
                }
            })
            .collect::<Vec<_>>();

        debug!(destination, count = hotels.len(), "hotel search");
        Ok(hotels)
    }

    async fn search_reviews(&self, hotel: &str) -> anyhow::Result<Vec<Review>> {
        self.wait().await;

        let hotel = hotel.trim();
        if hotel.is_empty() {
            return Ok(Vec::new());
        }

        let seed = fnv1a(hotel) as usize;
        let reviews = (0..RESULTS_PER_QUERY)
            .map(|i| Review {
                title: REVIEW_TITLES[seed.wrapping_add(i) % REVIEW_TITLES.len()].to_string(),
                text: REVIEW_TEXT.to_string(),
                image: format!(
                    "https://upload.wikimedia.org/wikipedia/en/e/ee/Unknown-person.gif?review={}",
                    i + 1
                ),
            })
            .collect::<Vec<_>>();

        debug!(hotel, count = reviews.len(), "review search");
        Ok(reviews)
    }
}

/// 64-bit FNV-1a.
fn fnv1a(value: &str) -> u64 {
    value.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}
