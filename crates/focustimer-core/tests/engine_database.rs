//! Integration tests for the timer engine driving a real SQLite store.

use focustimer_core::storage::{Database, SessionFilter, Settings};
use focustimer_core::{Phase, SessionStatus, TimerEngine};
use tempfile::TempDir;

fn open_db(dir: &TempDir) -> Database {
    Database::open_at(&dir.path().join("focustimer.db")).unwrap()
}

#[test]
fn interrupted_focus_lands_in_database() {
    let dir = TempDir::new().unwrap();
    let mut engine = TimerEngine::new(open_db(&dir));

    engine.start_focus(25, 5, None).unwrap();
    assert_eq!(engine.phase(), Phase::Focus);
    engine.stop().unwrap();
    assert_eq!(engine.phase(), Phase::Idle);

    let records = engine
        .store()
        .list_sessions(&SessionFilter::default())
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, SessionStatus::Interrupted);
    assert_eq!(records[0].planned_seconds, 1500);
    assert_eq!(records[0].actual_seconds, 0);
}

#[test]
fn category_id_flows_into_records() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);
    let coding = db.find_category("Coding").unwrap().unwrap();
    let id = coding.id.unwrap();

    let mut engine = TimerEngine::new(db);
    engine
        .start_focus(
            coding.default_focus_minutes,
            coding.default_break_minutes,
            Some(id),
        )
        .unwrap();
    engine.stop().unwrap();

    let records = engine
        .store()
        .list_sessions(&SessionFilter {
            category_id: Some(id),
            ..SessionFilter::default()
        })
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].category_id, Some(id));
}

#[test]
fn log_breaks_setting_read_fresh_from_database() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);
    db.save_settings(&Settings {
        log_breaks: true,
        ..Settings::default()
    })
    .unwrap();

    let mut engine = TimerEngine::new(db);
    engine.start_focus(25, 5, None).unwrap();
    engine.start_break().unwrap();
    engine.skip_break().unwrap();

    let records = engine
        .store()
        .list_sessions(&SessionFilter {
            include_breaks: true,
            ..SessionFilter::default()
        })
        .unwrap();
    // One completed focus (manual break start), one interrupted break.
    assert_eq!(records.len(), 2);
    assert!(records.iter().any(|r| r.is_break));

    // Flipping the setting off is picked up by the next decision.
    engine
        .store()
        .save_settings(&Settings::default())
        .unwrap();
    engine.start_focus(25, 5, None).unwrap();
    engine.start_break().unwrap();
    engine.skip_break().unwrap();

    let records = engine
        .store()
        .list_sessions(&SessionFilter {
            include_breaks: true,
            ..SessionFilter::default()
        })
        .unwrap();
    assert_eq!(records.iter().filter(|r| r.is_break).count(), 1);
}

#[test]
fn parked_context_survives_engine_rebuild() {
    let dir = TempDir::new().unwrap();

    let mut engine = TimerEngine::new(open_db(&dir));
    engine.start_focus(25, 5, None).unwrap();
    let parked = serde_json::to_string(engine.context()).unwrap();
    engine.store().kv_set("timer_context", &parked).unwrap();
    drop(engine);

    let db = open_db(&dir);
    let json = db.kv_get("timer_context").unwrap().unwrap();
    let ctx = serde_json::from_str(&json).unwrap();
    let mut revived = TimerEngine::with_context(db, ctx);
    assert_eq!(revived.phase(), Phase::Focus);
    revived.tick().unwrap();
    assert!(revived.context().remaining_seconds <= 1500);
    assert!(revived.context().remaining_seconds > 0);
}

#[test]
fn stats_accumulate_per_category() {
    let dir = TempDir::new().unwrap();
    let db = open_db(&dir);
    let study = db.find_category("Study").unwrap().unwrap().id;

    let mut engine = TimerEngine::new(db);
    engine.start_focus(25, 5, study).unwrap();
    engine.stop().unwrap();
    engine.start_focus(25, 5, None).unwrap();
    engine.stop().unwrap();

    let totals = engine.store().category_totals(None, None).unwrap();
    let study_total = totals
        .iter()
        .find(|t| t.category.id == study)
        .unwrap();
    assert_eq!(study_total.session_count, 1);
}
