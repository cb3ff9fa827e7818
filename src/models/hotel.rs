//! Result store records.

use serde::{Deserialize, Serialize};

use super::message::Card;

const SEARCH_URL: &str = "https://www.bing.com/search?q=hotels+in+";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub name: String,
    pub location: String,
    pub rating: u8,
    pub number_of_reviews: u32,
    pub price_starting: u32,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub title: String,
    pub text: String,
    pub image: String,
}

impl Hotel {
    pub fn to_card(&self) -> Card {
        Card {
            title: self.name.clone(),
            subtitle: Some(format!(
                "{} stars. {} reviews. From ${} per night.",
                self.rating, self.number_of_reviews, self.price_starting
            )),
            text: None,
            image_url: Some(self.image.clone()),
            link: Some(format!("{}{}", SEARCH_URL, encode_query(&self.location))),
        }
    }
}

impl Review {
    pub fn to_card(&self) -> Card {
        Card {
            title: self.title.clone(),
            subtitle: None,
            text: Some(self.text.clone()),
            image_url: Some(self.image.clone()),
            link: None,
        }
    }
}

/// Percent-encode everything outside the unreserved URL characters.
fn encode_query(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
