use crate::data::{Database, SessionCheckpoint};
use crate::error::Result;
use crate::summary::{SummaryStats, summarize};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{error, info};
use yado_scanner::crawler::{ProgressCallback, ResultCallback};
use yado_scanner::{CrawlEvent, CrawlReport, Crawler, HotelRecord, SiteConfig};

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub config: SiteConfig,
    /// SQLite resume file; `None` crawls from scratch without recording.
    pub checkpoint: Option<PathBuf>,
    pub show_progress_bars: bool,
}

/// Callback for human-readable progress lines
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Callback for each record as it is extracted
pub type CrawlResultCallback = Arc<dyn Fn(&HotelRecord) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub report: CrawlReport,
    pub summary: SummaryStats,
    pub session_id: Option<String>,
}

/// One line per event, for logs and progress output.
pub fn describe_event(event: &CrawlEvent) -> String {
    match event {
        CrawlEvent::SeedsLoaded {
            regions,
            prefectures,
            listings,
        } => format!(
            "{} regions, {} prefectures, {} listings to walk",
            regions, prefectures, listings
        ),
        CrawlEvent::ListingStarted { url } => format!("Walking {}", url),
        CrawlEvent::ListingResumed { url, records } => {
            format!("Resumed {} ({} records from checkpoint)", url, records)
        }
        CrawlEvent::ListingFinished {
            url,
            records,
            failed_details,
        } => format!(
            "Finished {} ({} records, {} dropped)",
            url, records, failed_details
        ),
        CrawlEvent::ListingFailed { url, error } => format!("[!] Skipped {}: {}", url, error),
        CrawlEvent::DetailFailed { url, error } => format!("[!] Dropped {}: {}", url, error),
    }
}

/// Runs the crawl and summarizes its records.
///
/// A seed failure is the only crawl error returned; the session is marked
/// failed in the checkpoint file first.
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
    result_callback: Option<CrawlResultCallback>,
) -> Result<CrawlOutcome> {
    let CrawlOptions {
        config,
        checkpoint,
        show_progress_bars,
    } = options;

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Loading regions...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let listings_done = Arc::new(AtomicUsize::new(0));
    let listings_total = Arc::new(AtomicUsize::new(0));
    let records_seen = Arc::new(AtomicUsize::new(0));

    let internal_progress: ProgressCallback = {
        let pb = progress_bar.clone();
        let done = listings_done.clone();
        let total = listings_total.clone();
        let records = records_seen.clone();
        let forward = progress_callback.clone();
        Arc::new(move |event: CrawlEvent| {
            match &event {
                CrawlEvent::SeedsLoaded { listings, .. } => total.store(*listings, Ordering::Relaxed),
                CrawlEvent::ListingFinished { .. }
                | CrawlEvent::ListingResumed { .. }
                | CrawlEvent::ListingFailed { .. } => {
                    done.fetch_add(1, Ordering::Relaxed);
                }
                _ => {}
            }
            if let Some(ref pb) = pb {
                pb.set_message(format!(
                    "Crawling... {}/{} listings, {} hotels",
                    done.load(Ordering::Relaxed),
                    total.load(Ordering::Relaxed),
                    records.load(Ordering::Relaxed)
                ));
                pb.tick();
            }
            if let Some(ref callback) = forward {
                callback(describe_event(&event));
            }
        })
    };

    let internal_result: ResultCallback = {
        let records = records_seen.clone();
        Arc::new(move |record: &HotelRecord| {
            records.fetch_add(1, Ordering::Relaxed);
            if let Some(ref callback) = result_callback {
                callback(record);
            }
        })
    };

    let configuration = serde_json::to_string(&config)?;
    let mut crawler = Crawler::new(config)?
        .with_progress_callback(internal_progress)
        .with_result_callback(internal_result);

    let session = match checkpoint {
        Some(path) => {
            let db = Arc::new(Database::new(&path)?);
            let session_id = db.create_session(&configuration)?;
            info!("Checkpoint session {} in {}", session_id, path.display());
            crawler = crawler.with_checkpoint(Arc::new(SessionCheckpoint::new(
                db.clone(),
                session_id.clone(),
            )));
            Some((db, session_id))
        }
        None => None,
    };

    let report = match crawler.crawl().await {
        Ok(report) => report,
        Err(e) => {
            if let Some(ref pb) = progress_bar {
                pb.abandon_with_message("Crawl aborted");
            }
            if let Some((ref db, ref session_id)) = session
                && let Err(db_err) = db.fail_session(session_id)
            {
                error!("Could not mark session {} failed: {}", session_id, db_err);
            }
            return Err(e.into());
        }
    };

    if let Some((ref db, ref session_id)) = session {
        db.complete_session(session_id)?;
    }

    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!(
            "Crawl complete! {} hotels from {} listings",
            report.records.len(),
            report.listings_total
        ));
    }

    let summary = summarize(&report.records);
    Ok(CrawlOutcome {
        report,
        summary,
        session_id: session.map(|(_, id)| id),
    })
}
