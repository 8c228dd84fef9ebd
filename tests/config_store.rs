use std::fs;

use serde_json::json;
use tempfile::tempdir;

use dartdrill::config::{
    find_preset, presets, ConfigStore, FileConfigStore, PracticeConfig, QuestionType, ThrowUnit,
};
use dartdrill::practice::PracticeSession;
use dartdrill::session::SessionConfig;
use dartdrill::target::Target;

#[test]
fn saved_settings_drive_the_next_session() {
    let dir = tempdir().unwrap();
    let store = FileConfigStore::with_path(dir.path().join("nested").join("config.json"));

    let mut cfg = find_preset("remaining-501").unwrap();
    cfg.target = Some(Target::Triple(19));
    store.save(&cfg).unwrap();

    let loaded = store.load();
    assert_eq!(loaded, cfg);

    let mut session = PracticeSession::seeded(loaded, SessionConfig::default(), 9);
    session.start_practice().unwrap();
    let question = session.question().unwrap();
    assert_eq!(question.starting_score, Some(501));
    assert_eq!(question.throws.len(), 3);
}

#[test]
fn every_preset_survives_a_save() {
    let dir = tempdir().unwrap();
    let store = FileConfigStore::with_path(dir.path().join("config.json"));
    for preset in presets() {
        store.save(&preset.config).unwrap();
        assert_eq!(store.load(), preset.config, "preset {}", preset.id);
    }
}

#[test]
fn legacy_file_is_migrated_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let legacy = json!({
        "throwUnit": 3,
        "questionType": "remaining",
        "startingScore": 301,
        "stdDevMM": 12.0,
        "targetType": "DOUBLE",
        "targetNumber": 16
    });
    fs::write(&path, serde_json::to_vec(&legacy).unwrap()).unwrap();

    let cfg = FileConfigStore::with_path(&path).load();
    assert_eq!(cfg.throw_unit, ThrowUnit::Three);
    assert_eq!(cfg.question_type, QuestionType::Remaining);
    assert_eq!(cfg.starting_score, Some(301));
    assert_eq!(cfg.target, Some(Target::Double(16)));
}

#[test]
fn unreadable_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, b"{ not json").unwrap();
    assert_eq!(FileConfigStore::with_path(&path).load(), PracticeConfig::default());

    fs::write(&path, br#"{"version": 2, "practice": {"throw_unit": 2}}"#).unwrap();
    assert_eq!(FileConfigStore::with_path(&path).load(), PracticeConfig::default());
}
