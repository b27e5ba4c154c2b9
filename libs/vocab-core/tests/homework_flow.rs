//! End-to-end homework flows across a teacher and a student device.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use vocab_core::{
    HomeworkExportPayload, HomeworkPackStore, HomeworkStore, ImportOutcome, MemoryStore,
    PartOfSpeech, RotationPair,
};

struct Device {
    kv: Arc<MemoryStore>,
    homework: HomeworkStore<MemoryStore>,
    packs: HomeworkPackStore<MemoryStore>,
}

impl Device {
    fn new(seed: u64, now: DateTime<Utc>) -> Self {
        let kv = Arc::new(MemoryStore::new());
        Self {
            homework: HomeworkStore::with_rng(Arc::clone(&kv), now, StdRng::seed_from_u64(seed))
                .unwrap(),
            packs: HomeworkPackStore::new(Arc::clone(&kv)),
            kv,
        }
    }

    /// Simulate an app restart on the same storage.
    fn restart(&mut self, seed: u64, now: DateTime<Utc>) {
        self.homework =
            HomeworkStore::with_rng(Arc::clone(&self.kv), now, StdRng::seed_from_u64(seed))
                .unwrap();
    }
}

fn monday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 2, 7, 0, 0).unwrap()
}

#[test]
fn thirty_verbs_give_twelve_stable_words_per_cycle() {
    let mut device = Device::new(11, monday());
    for i in 0..30 {
        device
            .homework
            .words()
            .add(&format!("verb-{i}"), "动作", PartOfSpeech::Verb)
            .unwrap();
    }
    let all: HashSet<_> = device
        .homework
        .words()
        .all()
        .unwrap()
        .into_iter()
        .map(|w| w.id)
        .collect();

    let first = device.homework.homework_words(PartOfSpeech::Verb).unwrap();
    assert_eq!(first.len(), 12);
    assert!(first.iter().all(|w| all.contains(&w.id)));
    let distinct: HashSet<_> = first.iter().map(|w| w.id).collect();
    assert_eq!(distinct.len(), 12);

    assert_eq!(device.homework.homework_words(PartOfSpeech::Verb).unwrap(), first);

    device.homework.advance_cycle(monday() + Duration::days(7)).unwrap();
    let next = device.homework.homework_words(PartOfSpeech::Verb).unwrap();
    assert_eq!(next.len(), 12);
    assert_eq!(device.homework.homework_words(PartOfSpeech::Verb).unwrap(), next);
}

#[test]
fn teacher_pack_imports_once_on_student() {
    let mut teacher = Device::new(1, monday());
    teacher.homework.words().autofill(PartOfSpeech::Noun, 20).unwrap();
    teacher.homework.words().autofill(PartOfSpeech::Adjective, 20).unwrap();

    let payload = teacher.packs.export(&mut teacher.homework).unwrap();
    assert_eq!(payload.total_count, 24);
    assert_eq!(payload.items.len(), 24);
    assert_eq!(payload.pair, RotationPair::NounAdjective);

    // Exporting again within the cycle produces the same file.
    let again = teacher.packs.export(&mut teacher.homework).unwrap();
    assert_eq!(payload.to_json().unwrap(), again.to_json().unwrap());

    let json = payload.to_json().unwrap();
    let later = monday() + Duration::days(2);
    let mut student = Device::new(2, later);
    student.homework.words().add("apple", "苹果", PartOfSpeech::Noun).unwrap();

    let outcome = student
        .packs
        .import_json(&mut student.homework, &json, later)
        .unwrap();
    let ImportOutcome::Imported { added, items, .. } = outcome else {
        panic!("expected first import to apply");
    };
    assert_eq!(items, 24);
    let had_apple = payload.items.iter().any(|i| i.word == "apple");
    assert_eq!(added, if had_apple { 23 } else { 24 });
    assert!(student.packs.is_imported(&payload.id).unwrap());

    let state = student.homework.state().unwrap();
    assert_eq!(state.cycle_index, payload.cycle_index);
    assert_eq!(state.pair, payload.pair);
    assert_eq!(state.cycle_start, payload.created_at);

    // The student's homework is exactly the teacher's list, in order.
    let teacher_nouns: Vec<String> = payload
        .items
        .iter()
        .filter(|i| i.pos == PartOfSpeech::Noun)
        .map(|i| i.word.to_lowercase())
        .collect();
    let student_nouns: Vec<String> = student
        .homework
        .homework_words(PartOfSpeech::Noun)
        .unwrap()
        .into_iter()
        .map(|w| w.word.to_lowercase())
        .collect();
    assert_eq!(student_nouns, teacher_nouns);

    let words_before = student.homework.words().all().unwrap();
    let history_before = student.homework.history().unwrap();

    let outcome = student
        .packs
        .import_json(&mut student.homework, &json, later + Duration::hours(1))
        .unwrap();
    assert_eq!(outcome, ImportOutcome::AlreadyImported { id: payload.id.clone() });
    assert_eq!(student.homework.words().all().unwrap(), words_before);
    assert_eq!(student.homework.history().unwrap(), history_before);
    assert_eq!(student.homework.state().unwrap(), state);
}

#[test]
fn import_overrides_local_schedule() {
    let mut student = Device::new(5, monday());
    student.homework.advance_cycle(monday()).unwrap();
    student.homework.advance_cycle(monday()).unwrap();
    student.homework.advance_cycle(monday()).unwrap();
    assert_eq!(student.homework.state().unwrap().pair, RotationPair::VerbAdverb);

    let text = r#"{
        "id": "hw-remote",
        "createdAt": "2024-08-30T10:00:00Z",
        "pair": 0,
        "daysPerCycle": 3,
        "cycleIndex": 1,
        "totalCount": 1,
        "items": [{"pos": "adjective", "word": "brave", "meanings": ["勇敢的"]}]
    }"#;
    let payload = HomeworkExportPayload::decode(text, monday()).unwrap();
    student.packs.import(&mut student.homework, &payload).unwrap();

    let state = student.homework.state().unwrap();
    assert_eq!(state.pair, RotationPair::NounAdjective);
    assert_eq!(state.cycle_index, 1);
    assert_eq!(student.homework.settings().unwrap().days_per_cycle, 3);

    // Pack started on friday with a three day cycle.
    assert!(!student.homework.refresh(monday()).unwrap());
    assert!(student.homework.refresh(monday() + Duration::days(1)).unwrap());
    assert_eq!(student.homework.state().unwrap().cycle_index, 2);

    let entry = student
        .homework
        .history()
        .unwrap()
        .into_iter()
        .find(|e| e.cycle_index == 1 && e.pair == RotationPair::NounAdjective)
        .unwrap();
    assert_eq!(entry.word_count, 1);
    assert_eq!(entry.timestamp, payload.created_at);
}

#[test]
fn imported_words_survive_restart_over_local_pick() {
    let mut teacher = Device::new(21, monday());
    teacher.homework.words().autofill(PartOfSpeech::Noun, 25).unwrap();
    teacher.homework.words().autofill(PartOfSpeech::Adjective, 25).unwrap();
    let payload = teacher.packs.export(&mut teacher.homework).unwrap();

    // Student is on the same cycle but already drew its own words on tuesday.
    let tuesday = monday() + Duration::days(1);
    let mut student = Device::new(22, tuesday);
    student.homework.words().autofill(PartOfSpeech::Noun, 25).unwrap();
    let local = student.homework.homework_words(PartOfSpeech::Noun).unwrap();
    assert_eq!(local.len(), 12);

    student.packs.import(&mut student.homework, &payload).unwrap();

    let payload_nouns: Vec<String> = payload
        .items
        .iter()
        .filter(|i| i.pos == PartOfSpeech::Noun)
        .map(|i| i.word.clone())
        .collect();
    let nouns = |device: &mut Device| -> Vec<String> {
        device
            .homework
            .homework_words(PartOfSpeech::Noun)
            .unwrap()
            .into_iter()
            .map(|w| w.word)
            .collect()
    };
    assert_eq!(nouns(&mut student), payload_nouns);

    student.restart(23, tuesday + Duration::hours(2));
    assert_eq!(nouns(&mut student), payload_nouns);

    // Only the imported entry still holds words for cycle 0.
    let with_words: Vec<_> = student
        .homework
        .history()
        .unwrap()
        .into_iter()
        .filter(|e| e.cycle_index == 0 && !e.word_ids.is_empty())
        .collect();
    assert_eq!(with_words.len(), 1);
    assert_eq!(with_words[0].timestamp, payload.created_at);
    assert_eq!(with_words[0].word_count, 24);
}
