//! Intent recognition.
//!
//! `NluClient` is the seam to a language-understanding service. The bundled
//! `KeywordRecognizer` is a rule-based stand-in: each intent has weighted
//! phrases, and a handful of extractors pull out the entities the hotel
//! dialogs look for.

use async_trait::async_trait;

use crate::models::entity::{AIRPORT_CODE, HOTEL, LOCATION};
use crate::models::{Entity, Recognition, ScoredIntent};

use super::tokens;

#[async_trait]
pub trait NluClient: Send + Sync {
    async fn recognize(&self, text: &str) -> anyhow::Result<Recognition>;
}

#[derive(Debug, Clone)]
struct IntentRule {
    intent: String,
    /// Lowercased phrase words and the score a match yields
    phrases: Vec<(Vec<String>, f64)>,
}

#[derive(Debug, Clone, Default)]
pub struct KeywordRecognizer {
    rules: Vec<IntentRule>,
}

impl KeywordRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add phrases for an intent. Phrases match whole, contiguous words,
    /// case-insensitively.
    pub fn rule(mut self, intent: impl Into<String>, phrases: &[(&str, f64)]) -> Self {
        self.rules.push(IntentRule {
            intent: intent.into(),
            phrases: phrases
                .iter()
                .map(|(phrase, score)| {
                    let words = phrase
                        .split_whitespace()
                        .map(|w| w.to_lowercase())
                        .collect();
                    (words, *score)
                })
                .collect(),
        });
        self
    }

    /// Rules for the five hotel bot intents.
    pub fn hotel_model() -> Self {
        Self::new()
            .rule(
                "Greeting",
                &[("hi", 0.9), ("hello", 0.9), ("hey", 0.8), ("good morning", 0.9), ("good evening", 0.9)],
            )
            .rule(
                "Help",
                &[("help", 0.95), ("what can you do", 0.9), ("how does this work", 0.8)],
            )
            .rule(
                "Cancel",
                &[("cancel", 0.95), ("nevermind", 0.9), ("never mind", 0.9), ("stop", 0.7)],
            )
            .rule(
                "SearchHotels",
                &[("hotel", 0.8), ("hotels", 0.85), ("search hotels", 0.95), ("place to stay", 0.8), ("room", 0.6)],
            )
            .rule(
                "ShowHotelsReviews",
                &[("review", 0.9), ("reviews", 0.92), ("show me the reviews", 0.97)],
            )
    }

    /// Score every intent against the text, best first.
    pub fn score(&self, text: &str) -> Vec<ScoredIntent> {
        let words: Vec<String> = tokens(text)
            .into_iter()
            .map(|(_, w)| w.to_lowercase())
            .collect();

        let mut scored: Vec<ScoredIntent> = self
            .rules
            .iter()
            .filter_map(|rule| {
                rule.phrases
                    .iter()
                    .filter(|(phrase, _)| contains_phrase(&words, phrase))
                    .map(|(_, score)| *score)
                    .max_by(f64::total_cmp)
                    .map(|score| ScoredIntent {
                        name: rule.intent.clone(),
                        score,
                    })
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored
    }
}

#[async_trait]
impl NluClient for KeywordRecognizer {
    async fn recognize(&self, text: &str) -> anyhow::Result<Recognition> {
        Ok(Recognition {
            intents: self.score(text),
            entities: extract_entities(text),
        })
    }
}

fn contains_phrase(words: &[String], phrase: &[String]) -> bool {
    !phrase.is_empty() && words.windows(phrase.len()).any(|window| window == phrase)
}

/// Pull location, airport and hotel entities out of free text.
pub fn extract_entities(text: &str) -> Vec<Entity> {
    let toks = tokens(text);
    let mut entities = Vec::new();

    entities.extend(extract_hotel(text, &toks));
    entities.extend(extract_location(text, &toks));
    entities.extend(
        toks.iter()
            .filter(|(_, w)| w.len() == 3 && w.chars().all(|c| c.is_ascii_uppercase()))
            .map(|(start, w)| Entity::new(AIRPORT_CODE, *w, *start, start + w.len())),
    );

    entities
}

/// Everything after "reviews of" / "reviews for" / "review of".
fn extract_hotel(text: &str, toks: &[(usize, &str)]) -> Option<Entity> {
    let anchor = toks.windows(2).position(|pair| {
        let first = pair[0].1.to_lowercase();
        let second = pair[1].1.to_lowercase();
        (first == "review" || first == "reviews") && (second == "of" || second == "for")
    })?;

    let (start, _) = *toks.get(anchor + 2)?;
    let value = text[start..].trim_end_matches(|c: char| c.is_whitespace() || ".?!".contains(c));
    if value.is_empty() {
        return None;
    }
    Some(Entity::new(HOTEL, value, start, start + value.len()))
}

/// Capitalized words after "in"; a single lowercase word when none are.
fn extract_location(text: &str, toks: &[(usize, &str)]) -> Option<Entity> {
    let anchor = toks.iter().position(|(_, w)| w.eq_ignore_ascii_case("in"))?;
    let rest = &toks[anchor + 1..];
    let first = rest.first()?;

    let capitalized = rest
        .iter()
        .take_while(|(_, w)| w.chars().next().is_some_and(char::is_uppercase))
        .count();
    let span = &rest[..capitalized.max(1)];

    let start = first.0;
    let (last_start, last_word) = span[span.len() - 1];
    let end = last_start + last_word.len();
    Some(Entity::new(LOCATION, &text[start..end], start, end))
}
