use rusqlite::{Connection, OptionalExtension, Result, params};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};
use yado_scanner::{HotelRecord, ListingCheckpoint};

/// SQLite resume file. Listings are keyed by URL across sessions, so a
/// rerun against the same file skips what an earlier run finished.
pub struct Database {
    conn: Mutex<Connection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Running,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "running" => Some(SessionStatus::Running),
            "completed" => Some(SessionStatus::Completed),
            "failed" => Some(SessionStatus::Failed),
            _ => None,
        }
    }
}

fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

impl Database {
    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn remove(path: &Path) -> std::io::Result<()> {
        std::fs::remove_file(path)
    }

    pub fn new(path: &Path) -> Result<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        let db = Database {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock leaves SQLite itself consistent.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn init_schema(&self) -> Result<()> {
        self.conn().execute_batch(
            "
CREATE TABLE IF NOT EXISTS crawl_sessions (
    id TEXT PRIMARY KEY,
    start_time INTEGER NOT NULL,
    end_time INTEGER,
    status TEXT NOT NULL CHECK(status IN ('running', 'completed', 'failed')),
    configuration TEXT        -- JSON SiteConfig used
);

CREATE TABLE IF NOT EXISTS listings (
    url TEXT PRIMARY KEY,
    session_id TEXT NOT NULL,
    completed_at INTEGER NOT NULL,
    record_count INTEGER NOT NULL,
    FOREIGN KEY(session_id) REFERENCES crawl_sessions(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    listing_url TEXT NOT NULL,
    position INTEGER NOT NULL,
    hotel_name TEXT NOT NULL,
    hotelurl TEXT NOT NULL,
    hotel_location TEXT NOT NULL,
    price TEXT NOT NULL,
    hotel_type TEXT NOT NULL,
    FOREIGN KEY(listing_url) REFERENCES listings(url) ON DELETE CASCADE,
    UNIQUE(listing_url, position)
);

CREATE INDEX IF NOT EXISTS idx_records_listing ON records(listing_url);
CREATE INDEX IF NOT EXISTS idx_listings_session ON listings(session_id);
            ",
        )?;
        Ok(())
    }

    // Session management
    pub fn create_session(&self, configuration: &str) -> Result<String> {
        let session_id = uuid::Uuid::new_v4().to_string();
        self.conn().execute(
            "INSERT INTO crawl_sessions (id, start_time, status, configuration) VALUES (?1, ?2, ?3, ?4)",
            params![
                &session_id,
                current_timestamp(),
                SessionStatus::Running.as_str(),
                configuration
            ],
        )?;
        Ok(session_id)
    }

    pub fn complete_session(&self, session_id: &str) -> Result<()> {
        self.finish_session(session_id, SessionStatus::Completed)
    }

    pub fn fail_session(&self, session_id: &str) -> Result<()> {
        self.finish_session(session_id, SessionStatus::Failed)
    }

    fn finish_session(&self, session_id: &str, status: SessionStatus) -> Result<()> {
        self.conn().execute(
            "UPDATE crawl_sessions SET status = ?1, end_time = ?2 WHERE id = ?3",
            params![status.as_str(), current_timestamp(), session_id],
        )?;
        Ok(())
    }

    pub fn session_status(&self, session_id: &str) -> Result<Option<SessionStatus>> {
        let status: Option<String> = self
            .conn()
            .query_row(
                "SELECT status FROM crawl_sessions WHERE id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(status.as_deref().and_then(SessionStatus::parse))
    }

    /// Every session in the file, oldest first.
    pub fn session_ids(&self) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id FROM crawl_sessions ORDER BY start_time, rowid")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>>>()?;
        Ok(ids)
    }

    // Listing checkpoints
    /// Stores a finished listing with its records, replacing an older entry.
    pub fn save_listing(
        &self,
        session_id: &str,
        listing_url: &str,
        records: &[HotelRecord],
    ) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM listings WHERE url = ?1", params![listing_url])?;
        tx.execute(
            "INSERT INTO listings (url, session_id, completed_at, record_count) VALUES (?1, ?2, ?3, ?4)",
            params![listing_url, session_id, current_timestamp(), records.len() as i64],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO records (
                    listing_url, position, hotel_name, hotelurl, hotel_location, price, hotel_type
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (position, record) in records.iter().enumerate() {
                stmt.execute(params![
                    listing_url,
                    position as i64,
                    &record.name,
                    &record.source_url,
                    &record.location,
                    &record.price_text,
                    &record.hotel_type,
                ])?;
            }
        }

        tx.commit()
    }

    /// Records of a listing stored by any session, in their original order.
    pub fn listing_records(&self, listing_url: &str) -> Result<Option<Vec<HotelRecord>>> {
        let conn = self.conn();
        let known: Option<i64> = conn
            .query_row(
                "SELECT record_count FROM listings WHERE url = ?1",
                params![listing_url],
                |row| row.get(0),
            )
            .optional()?;
        if known.is_none() {
            return Ok(None);
        }

        let mut stmt = conn.prepare(
            "SELECT hotel_name, hotelurl, hotel_location, price, hotel_type
             FROM records WHERE listing_url = ?1 ORDER BY position",
        )?;
        let records = stmt
            .query_map(params![listing_url], |row| {
                Ok(HotelRecord {
                    name: row.get(0)?,
                    source_url: row.get(1)?,
                    location: row.get(2)?,
                    price_text: row.get(3)?,
                    hotel_type: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(records))
    }

    pub fn listing_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM listings", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Ties a crawl session to the listing checkpoint hook.
pub struct SessionCheckpoint {
    db: Arc<Database>,
    session_id: String,
}

impl SessionCheckpoint {
    pub fn new(db: Arc<Database>, session_id: impl Into<String>) -> Self {
        Self {
            db,
            session_id: session_id.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl ListingCheckpoint for SessionCheckpoint {
    fn completed(&self, listing_url: &str) -> Option<Vec<HotelRecord>> {
        match self.db.listing_records(listing_url) {
            Ok(records) => records,
            Err(e) => {
                warn!("Could not read checkpoint for {}: {}", listing_url, e);
                None
            }
        }
    }

    fn complete(&self, listing_url: &str, records: &[HotelRecord]) {
        match self.db.save_listing(&self.session_id, listing_url, records) {
            Ok(()) => debug!("Checkpointed {} ({} records)", listing_url, records.len()),
            Err(e) => warn!("Could not checkpoint {}: {}", listing_url, e),
        }
    }
}
