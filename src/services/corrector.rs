use async_trait::async_trait;
use std::collections::HashMap;

use super::tokens;

#[async_trait]
pub trait TextCorrector: Send + Sync {
    async fn correct(&self, text: &str) -> anyhow::Result<String>;
}

/// Replaces known misspellings word by word, leaving everything else intact.
#[derive(Debug, Clone, Default)]
pub struct DictionaryCorrector {
    /// Lowercased misspelling -> replacement
    words: HashMap<String, String>,
}

impl DictionaryCorrector {
    pub fn new(words: &HashMap<String, String>) -> Self {
        Self {
            words: words
                .iter()
                .map(|(from, to)| (from.to_lowercase(), to.clone()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;

        for (start, word) in tokens(text) {
            if let Some(replacement) = self.words.get(&word.to_lowercase()) {
                out.push_str(&text[cursor..start]);
                out.push_str(replacement);
                cursor = start + word.len();
            }
        }
        out.push_str(&text[cursor..]);

        out
    }
}

#[async_trait]
impl TextCorrector for DictionaryCorrector {
    async fn correct(&self, text: &str) -> anyhow::Result<String> {
        Ok(self.apply(text))
    }
}
