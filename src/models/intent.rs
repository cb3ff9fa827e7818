//! Recognition results returned by the NLU client.

use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// One candidate intent with its confidence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredIntent {
    pub name: String,
    pub score: f64,
}

/// Full recognizer output: ranked candidates plus extracted entities.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Recognition {
    pub intents: Vec<ScoredIntent>,
    pub entities: Vec<Entity>,
}

/// The intent that drives routing for a turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Intent {
    pub name: String,
    pub score: f64,
    pub entities: Vec<Entity>,
}

impl Recognition {
    /// The highest scoring candidate, if it reaches `threshold`.
    ///
    /// Only the top candidate is considered; a weaker runner-up never
    /// matches even when the top one is filtered out. NaN scores are not
    /// candidates.
    pub fn top_intent(&self, threshold: f64) -> Option<Intent> {
        let top = self
            .intents
            .iter()
            .filter(|candidate| !candidate.score.is_nan())
            .max_by(|a, b| a.score.total_cmp(&b.score))?;

        if top.score < threshold {
            return None;
        }

        Some(Intent {
            name: top.name.clone(),
            score: top.score,
            entities: self.entities.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entity::LOCATION;

    fn recognition(candidates: &[(&str, f64)]) -> Recognition {
        Recognition {
            intents: candidates
                .iter()
                .map(|(name, score)| ScoredIntent {
                    name: name.to_string(),
                    score: *score,
                })
                .collect(),
            entities: vec![Entity::new(LOCATION, "Seattle", 0, 7)],
        }
    }

    #[test]
    fn test_top_intent_picks_highest_score() {
        let r = recognition(&[("Help", 0.6), ("SearchHotels", 0.9), ("Greeting", 0.2)]);
        let intent = r.top_intent(0.5).unwrap();
        assert_eq!(intent.name, "SearchHotels");
        assert_eq!(intent.score, 0.9);
        assert_eq!(intent.entities.len(), 1);
    }

    #[test]
    fn test_top_intent_below_threshold_is_none() {
        let r = recognition(&[("SearchHotels", 0.4)]);
        assert!(r.top_intent(0.5).is_none());
    }

    #[test]
    fn test_top_intent_at_threshold_matches() {
        let r = recognition(&[("Greeting", 0.5)]);
        assert_eq!(r.top_intent(0.5).unwrap().name, "Greeting");
    }

    #[test]
    fn test_top_intent_ignores_nan_scores() {
        let r = recognition(&[("Help", f64::NAN)]);
        assert!(r.top_intent(0.5).is_none());

        let r = recognition(&[("Help", f64::NAN), ("Greeting", 0.7)]);
        assert_eq!(r.top_intent(0.5).unwrap().name, "Greeting");
    }

    #[test]
    fn test_top_intent_empty() {
        assert!(Recognition::default().top_intent(0.0).is_none());
    }
}
