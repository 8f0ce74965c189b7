use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use yado_scanner::HotelRecord;

/// The one-row aggregate written next to the record table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    #[serde(rename = "Total Hotels")]
    pub total_count: usize,
    #[serde(rename = "Average Price")]
    pub average_price: f64,
    #[serde(rename = "Most Common Hotel Type")]
    pub most_common_type: String,
}

/// Numeric value of a scraped price such as `¥12,345`.
///
/// Full-width digits (`１２,３４５円`) count as digits. Everything else
/// but periods is dropped. `None` when what remains is not a number.
pub fn clean_price(text: &str) -> Option<f64> {
    let digits: String = text
        .chars()
        .filter_map(|c| match c {
            '0'..='9' | '.' => Some(c),
            '０'..='９' => char::from_digit(c as u32 - '０' as u32, 10),
            _ => None,
        })
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

pub fn summarize(records: &[HotelRecord]) -> SummaryStats {
    let prices: Vec<f64> = records
        .iter()
        .filter_map(|r| clean_price(&r.price_text))
        .collect();
    let average_price = if prices.is_empty() {
        0.0
    } else {
        prices.iter().sum::<f64>() / prices.len() as f64
    };

    SummaryStats {
        total_count: records.len(),
        average_price,
        most_common_type: most_common_type(records).unwrap_or_else(|| "N/A".to_string()),
    }
}

/// Mode of `hotel_type`; the value seen first wins a tie.
fn most_common_type(records: &[HotelRecord]) -> Option<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, record) in records.iter().enumerate() {
        counts
            .entry(record.hotel_type.as_str())
            .or_insert((0, position))
            .0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(hotel_type, _)| hotel_type.to_string())
}
