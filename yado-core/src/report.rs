// Record and summary sinks

use crate::error::Result;
use crate::summary::SummaryStats;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use yado_scanner::{CrawlReport, HotelRecord};

/// Column order of the record table.
pub const RECORD_COLUMNS: [&str; 5] = [
    "hotel_name",
    "hotelurl",
    "hotel_location",
    "price",
    "hotel_type",
];

pub const SUMMARY_COLUMNS: [&str; 3] = ["Total Hotels", "Average Price", "Most Common Hotel Type"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(ReportFormat::Csv),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Writes the record table as CSV, preceded by a UTF-8 BOM.
///
/// The header row is written even when there are no records.
pub fn write_records_csv<W: Write>(mut out: W, records: &[HotelRecord]) -> Result<()> {
    out.write_all(UTF8_BOM)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(RECORD_COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_summary_csv<W: Write>(mut out: W, summary: &SummaryStats) -> Result<()> {
    out.write_all(UTF8_BOM)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(SUMMARY_COLUMNS)?;
    writer.serialize(summary)?;
    writer.flush()?;
    Ok(())
}

pub fn write_records_json<W: Write>(out: W, records: &[HotelRecord]) -> Result<()> {
    serde_json::to_writer_pretty(out, records)?;
    Ok(())
}

pub fn write_summary_json<W: Write>(out: W, summary: &SummaryStats) -> Result<()> {
    let document = serde_json::json!({
        "metadata": {
            "generator": "Yado",
            "version": env!("CARGO_PKG_VERSION"),
            "generated_at": chrono::Utc::now().to_rfc3339(),
        },
        "summary": summary,
    });
    serde_json::to_writer_pretty(out, &document)?;
    Ok(())
}

pub fn save_records(path: &Path, format: ReportFormat, records: &[HotelRecord]) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    match format {
        ReportFormat::Csv => write_records_csv(&mut file, records)?,
        ReportFormat::Json => write_records_json(&mut file, records)?,
    }
    file.flush()?;
    Ok(())
}

pub fn save_summary(path: &Path, format: ReportFormat, summary: &SummaryStats) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    match format {
        ReportFormat::Csv => write_summary_csv(&mut file, summary)?,
        ReportFormat::Json => write_summary_json(&mut file, summary)?,
    }
    file.flush()?;
    Ok(())
}

/// Terminal rendering of a finished crawl.
pub fn generate_text_report(summary: &SummaryStats, crawl: &CrawlReport) -> String {
    let rule = "━".repeat(60);
    let mut report = String::new();

    report.push_str(&format!("{}\n", rule.bright_black()));
    report.push_str(&format!("{}\n", "  YADO CRAWL SUMMARY".bold()));
    report.push_str(&format!("{}\n\n", rule.bright_black()));

    report.push_str(&format!(
        "  {:<24}{}\n",
        "Total Hotels:",
        summary.total_count.to_string().green().bold()
    ));
    report.push_str(&format!(
        "  {:<24}{}\n",
        "Average Price:",
        format!("{:.2}", summary.average_price).cyan()
    ));
    report.push_str(&format!(
        "  {:<24}{}\n\n",
        "Most Common Hotel Type:",
        summary.most_common_type.yellow()
    ));

    report.push_str(&format!("  {:<24}{}\n", "Listings:", crawl.listings_total));
    if crawl.listings_resumed > 0 {
        report.push_str(&format!(
            "  {:<24}{}\n",
            "  resumed:",
            crawl.listings_resumed.to_string().cyan()
        ));
    }
    if crawl.listings_failed > 0 {
        report.push_str(&format!(
            "  {:<24}{}\n",
            "  failed:",
            crawl.listings_failed.to_string().red()
        ));
    }
    if crawl.details_failed > 0 {
        report.push_str(&format!(
            "  {:<24}{}\n",
            "Dropped records:",
            crawl.details_failed.to_string().red()
        ));
    }

    report.push_str(&format!("\n{}\n", rule.bright_black()));
    report
}
