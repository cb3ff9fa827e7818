//! Typed entities extracted from utterance text.

use serde::{Deserialize, Serialize};

/// Entity type for a city or other absolute place name.
pub const LOCATION: &str = "Places.AbsoluteLocation";
/// Entity type for a three-letter airport code.
pub const AIRPORT_CODE: &str = "AirportCode";
/// Entity type for a hotel name.
pub const HOTEL: &str = "Hotel";

/// A typed span extracted from the user's text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Type tag, e.g. `Places.AbsoluteLocation`
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Extracted text
    pub value: String,
    /// Byte offset of the first character
    pub start_index: usize,
    /// Byte offset one past the last character
    pub end_index: usize,
}

impl Entity {
    pub fn new(entity_type: impl Into<String>, value: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            entity_type: entity_type.into(),
            value: value.into(),
            start_index: start,
            end_index: end,
        }
    }
}

/// Return the first entity of the given type, if any.
pub fn find_entity<'a>(entities: &'a [Entity], entity_type: &str) -> Option<&'a Entity> {
    entities.iter().find(|e| e.entity_type == entity_type)
}
