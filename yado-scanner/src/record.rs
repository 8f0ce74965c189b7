use serde::{Deserialize, Serialize};

/// One hotel, as written to the output table.
///
/// Only built once every field has been scraped; there is no partially
/// filled record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelRecord {
    #[serde(rename = "hotel_name")]
    pub name: String,
    #[serde(rename = "hotelurl")]
    pub source_url: String,
    #[serde(rename = "hotel_location")]
    pub location: String,
    #[serde(rename = "price")]
    pub price_text: String,
    pub hotel_type: String,
}

impl HotelRecord {
    pub fn new(
        name: impl Into<String>,
        source_url: impl Into<String>,
        location: impl Into<String>,
        price_text: impl Into<String>,
        hotel_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source_url: source_url.into(),
            location: location.into(),
            price_text: price_text.into(),
            hotel_type: hotel_type.into(),
        }
    }
}
