// Tests for the checkpoint store

use std::sync::Arc;
use tempfile::TempDir;
use yado_core::data::{Database, SessionCheckpoint, SessionStatus};
use yado_scanner::{HotelRecord, ListingCheckpoint};

const LISTING: &str = "https://www.jalan.net/130000/LRG_131000/";

fn create_test_db() -> (TempDir, Database) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("checkpoint.db");
    let db = Database::new(&db_path).unwrap();
    (temp_dir, db)
}

fn records() -> Vec<HotelRecord> {
    vec![
        HotelRecord::new("一の宿", "https://www.jalan.net/yad1/", "新宿区", "9,000", "和室"),
        HotelRecord::new("二の宿", "https://www.jalan.net/yad2/", "渋谷区", "12,000", "洋室"),
    ]
}

// ============================================================================
// Database Creation Tests
// ============================================================================

#[test]
fn test_database_creation() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("checkpoint.db");

    assert!(!Database::exists(&db_path));
    let db = Database::new(&db_path);
    assert!(db.is_ok());
    assert!(Database::exists(&db_path));
}

#[test]
fn test_database_remove() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("checkpoint.db");

    drop(Database::new(&db_path).unwrap());
    Database::remove(&db_path).unwrap();
    assert!(!Database::exists(&db_path));
}

#[test]
fn test_reopening_keeps_schema_and_data() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("checkpoint.db");

    {
        let db = Database::new(&db_path).unwrap();
        let session = db.create_session("{}").unwrap();
        db.save_listing(&session, LISTING, &records()).unwrap();
    }

    let db = Database::new(&db_path).unwrap();
    assert_eq!(db.listing_count().unwrap(), 1);
    assert_eq!(db.listing_records(LISTING).unwrap(), Some(records()));
}

// ============================================================================
// Session Tests
// ============================================================================

#[test]
fn test_session_lifecycle() {
    let (_temp_dir, db) = create_test_db();

    let session = db.create_session(r#"{"base_url":"https://www.jalan.net/"}"#).unwrap();
    assert_eq!(session.len(), 36);
    assert_eq!(db.session_status(&session).unwrap(), Some(SessionStatus::Running));

    db.complete_session(&session).unwrap();
    assert_eq!(db.session_status(&session).unwrap(), Some(SessionStatus::Completed));
}

#[test]
fn test_fail_session() {
    let (_temp_dir, db) = create_test_db();
    let session = db.create_session("{}").unwrap();

    db.fail_session(&session).unwrap();
    assert_eq!(db.session_status(&session).unwrap(), Some(SessionStatus::Failed));
}

#[test]
fn test_unknown_session_has_no_status() {
    let (_temp_dir, db) = create_test_db();
    assert_eq!(db.session_status("nope").unwrap(), None);
}

// ============================================================================
// Listing Checkpoint Tests
// ============================================================================

#[test]
fn test_unknown_listing_is_not_completed() {
    let db = Database::in_memory().unwrap();
    assert_eq!(db.listing_records(LISTING).unwrap(), None);
}

#[test]
fn test_listing_with_no_records_is_still_completed() {
    let db = Database::in_memory().unwrap();
    let session = db.create_session("{}").unwrap();

    db.save_listing(&session, LISTING, &[]).unwrap();
    assert_eq!(db.listing_records(LISTING).unwrap(), Some(Vec::new()));
}

#[test]
fn test_saving_a_listing_again_replaces_its_records() {
    let db = Database::in_memory().unwrap();
    let session = db.create_session("{}").unwrap();

    db.save_listing(&session, LISTING, &records()).unwrap();
    db.save_listing(&session, LISTING, &records()[1..]).unwrap();

    assert_eq!(db.listing_count().unwrap(), 1);
    assert_eq!(db.listing_records(LISTING).unwrap(), Some(records()[1..].to_vec()));
}

#[test]
fn test_session_checkpoint_round_trip() {
    let db = Arc::new(Database::in_memory().unwrap());
    let session = db.create_session("{}").unwrap();
    let checkpoint = SessionCheckpoint::new(db.clone(), session.clone());

    assert_eq!(checkpoint.session_id(), session);
    assert!(checkpoint.completed(LISTING).is_none());

    checkpoint.complete(LISTING, &records());
    assert_eq!(checkpoint.completed(LISTING), Some(records()));
}

#[test]
fn test_checkpoint_is_shared_across_sessions() {
    let db = Arc::new(Database::in_memory().unwrap());
    let first = SessionCheckpoint::new(db.clone(), db.create_session("{}").unwrap());
    first.complete(LISTING, &records());

    let second = SessionCheckpoint::new(db.clone(), db.create_session("{}").unwrap());
    assert_eq!(second.completed(LISTING), Some(records()));
}
