//! Command-layer tests against on-disk SQLite databases.

use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;
use vocab_cli::commands;
use vocab_cli::db::SqliteStore;
use vocab_cli::state::AppState;
use vocab_core::{FlagKind, HomeworkStatus, ImportOutcome, PartOfSpeech};

fn open(dir: &TempDir, name: &str) -> AppState {
    let store = SqliteStore::open(dir.path().join(name)).unwrap();
    AppState::new(store, Utc.with_ymd_and_hms(2024, 10, 7, 8, 0, 0).unwrap()).unwrap()
}

#[test]
fn words_and_flags_persist_across_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let state = open(&dir, "kid.db");
        assert!(commands::add_word(&state, PartOfSpeech::Noun, "Kite", "风筝").unwrap());
        assert!(!commands::add_word(&state, PartOfSpeech::Noun, "kite ", "风筝").unwrap());
        commands::set_flag(&state, FlagKind::Favorite, PartOfSpeech::Noun, "kite", "风筝", true)
            .unwrap();
    }

    let state = open(&dir, "kid.db");
    let cards = commands::list_words(&state, PartOfSpeech::Noun).unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].card.word, "Kite");
    assert!(cards[0].favorite);
    assert!(!cards[0].learned);
}

#[test]
fn edit_then_delete_word() {
    let dir = TempDir::new().unwrap();
    let state = open(&dir, "kid.db");
    commands::add_word(&state, PartOfSpeech::Verb, "swim", "游").unwrap();
    commands::set_flag(&state, FlagKind::Learned, PartOfSpeech::Verb, "swim", "游", true).unwrap();

    let edited = commands::edit_word(&state, PartOfSpeech::Verb, "swim", "游", None, Some("游泳"))
        .unwrap()
        .unwrap();
    assert_eq!(edited.meaning, "游泳");
    assert_eq!(commands::flagged_words(&state, FlagKind::Learned).unwrap(), vec![edited]);

    assert!(commands::delete_word(&state, PartOfSpeech::Verb, "swim", "游泳").unwrap());
    assert!(commands::list_words(&state, PartOfSpeech::Verb).unwrap().is_empty());
    assert!(commands::flagged_words(&state, FlagKind::Learned).unwrap().is_empty());
}

#[test]
fn homework_overview_lists_active_pair() {
    let dir = TempDir::new().unwrap();
    let state = open(&dir, "kid.db");
    commands::autofill(&state, PartOfSpeech::Noun, 20).unwrap();
    commands::autofill(&state, PartOfSpeech::Adjective, 8).unwrap();

    let start = Utc.with_ymd_and_hms(2024, 10, 7, 8, 0, 0).unwrap();
    let overview = commands::get_homework(&state, start + Duration::days(1)).unwrap();
    assert!(!overview.advanced);
    assert_eq!(overview.cycle_end, start + Duration::days(7));
    assert_eq!(overview.assignments.len(), 2);
    assert_eq!(overview.assignments[0].pos, PartOfSpeech::Noun);
    assert_eq!(overview.assignments[0].words.len(), 12);
    assert_eq!(overview.assignments[1].words.len(), 8);

    let overview = commands::get_homework(&state, start + Duration::days(8)).unwrap();
    assert!(overview.advanced);
    assert_eq!(overview.state.cycle_index, 1);
    assert_eq!(overview.assignments[0].pos, PartOfSpeech::Verb);
    assert!(overview.assignments[0].words.is_empty());

    let stopped =
        commands::set_homework_status(&state, HomeworkStatus::Unassigned, start + Duration::days(8))
            .unwrap();
    assert_eq!(stopped.status, HomeworkStatus::Unassigned);
    let overview = commands::get_homework(&state, start + Duration::days(30)).unwrap();
    assert!(!overview.advanced);
    assert!(overview.assignments.is_empty());

    let history = commands::homework_history(&state).unwrap();
    assert!(history.iter().any(|h| h.entry.cycle_index == 0 && h.words.len() == 20));
}

#[test]
fn pack_moves_from_teacher_to_student_once() {
    let dir = TempDir::new().unwrap();
    let teacher = open(&dir, "teacher.db");
    commands::autofill(&teacher, PartOfSpeech::Noun, 15).unwrap();
    commands::autofill(&teacher, PartOfSpeech::Adjective, 15).unwrap();

    let exports = dir.path().join("exports");
    let exported = commands::export_pack(&teacher, &exports).unwrap();
    assert_eq!(exported.total_count, 24);
    assert_eq!(exported.path, exports.join(format!("{}.json", exported.id)));

    let text = fs::read_to_string(&exported.path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["totalCount"], 24);
    assert_eq!(value["pair"], 0);

    let student = open(&dir, "student.db");
    let now = Utc.with_ymd_and_hms(2024, 10, 8, 16, 0, 0).unwrap();
    let first = commands::import_pack(&student, &exported.path, now).unwrap();
    assert_eq!(
        first,
        ImportOutcome::Imported { id: exported.id.clone(), added: 24, items: 24 }
    );

    let second = commands::import_pack(&student, &exported.path, now).unwrap();
    assert_eq!(second, ImportOutcome::AlreadyImported { id: exported.id.clone() });

    let nouns = commands::homework_words(&student, PartOfSpeech::Noun).unwrap();
    let adjectives = commands::homework_words(&student, PartOfSpeech::Adjective).unwrap();
    assert_eq!(nouns.len() + adjectives.len(), 24);
}

#[test]
fn malformed_pack_is_reported() {
    let dir = TempDir::new().unwrap();
    let state = open(&dir, "kid.db");
    let path = dir.path().join("broken.json");
    fs::write(&path, "{\"id\": 12").unwrap();

    let err = commands::import_pack(&state, &path, Utc::now()).unwrap_err();
    assert!(err.message.starts_with("invalid homework pack"));
}
