// Tests for the record aggregate

use yado_core::summary::{SummaryStats, clean_price, summarize};
use yado_scanner::HotelRecord;

fn record(price: &str, hotel_type: &str) -> HotelRecord {
    HotelRecord::new("宿", "https://www.jalan.net/yad1/", "東京都", price, hotel_type)
}

#[test]
fn test_clean_price_examples() {
    assert_eq!(clean_price("¥12,345"), Some(12345.0));
    assert_eq!(clean_price(""), None);
    assert_eq!(clean_price("N/A"), None);
}

#[test]
fn test_clean_price_reads_full_width_digits() {
    assert_eq!(clean_price("１２,３４５円"), Some(12345.0));
    assert_eq!(clean_price("¥９,８００〜"), Some(9800.0));
}

#[test]
fn test_summarize_mode_and_average() {
    let records = vec![
        record("¥10,000", "A"),
        record("20,000円", "B"),
        record("30000", "A"),
        record("満室", "A"),
    ];

    let summary = summarize(&records);

    assert_eq!(summary.total_count, 4);
    assert_eq!(summary.average_price, 20000.0);
    assert_eq!(summary.most_common_type, "A");
}

#[test]
fn test_summarize_tie_goes_to_first_seen() {
    let records = vec![
        record("1", "洋室"),
        record("1", "和室"),
        record("1", "和室"),
        record("1", "洋室"),
    ];
    assert_eq!(summarize(&records).most_common_type, "洋室");
}

#[test]
fn test_summarize_empty() {
    assert_eq!(
        summarize(&[]),
        SummaryStats {
            total_count: 0,
            average_price: 0.0,
            most_common_type: "N/A".to_string(),
        }
    );
}

#[test]
fn test_summarize_without_any_clean_price() {
    let summary = summarize(&[record("要問合せ", "和室")]);
    assert_eq!(summary.total_count, 1);
    assert_eq!(summary.average_price, 0.0);
    assert_eq!(summary.most_common_type, "和室");
}

#[test]
fn test_summary_serializes_with_column_names() {
    let summary = summarize(&[record("100", "和室")]);
    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["Total Hotels"], 1);
    assert_eq!(json["Average Price"], 100.0);
    assert_eq!(json["Most Common Hotel Type"], "和室");
}
