use std::fs;

use crease_terminal::engine::{
    apply, EngineConfig, MatchSetup, MatchState, ScoringEvent, TeamSlot,
};
use crease_terminal::persist::{
    self, append_history, clear_saved_match, load_history, load_saved_match, save_live_match,
};

fn sample_state(id: &str) -> MatchState {
    let setup = MatchSetup {
        team1_name: "Lions".to_string(),
        team2_name: "Tigers".to_string(),
        team1_players: vec!["Asha".into(), "Bina".into(), "Chitra".into()],
        team2_players: vec!["Dev".into(), "Esha".into(), "Farid".into()],
        total_overs: 2,
        config: EngineConfig::default(),
    };
    MatchState::new(id.to_string(), &setup, TeamSlot::Team1)
}

fn record(id: &str) -> persist::MatchRecord {
    persist::MatchRecord {
        id: id.to_string(),
        completed_at: "2026-08-28T12:00:00+00:00".to_string(),
        state: sample_state(id),
    }
}

#[test]
fn undo_slot_is_stripped_from_serialized_state() {
    let state = sample_state("m1");
    let with_undo = apply(&state, &ScoringEvent::Runs(4)).unwrap();
    assert!(with_undo.last_event.is_some());

    let json = serde_json::to_string(&with_undo).unwrap();
    assert!(!json.contains("last_event"));

    let back: MatchState = serde_json::from_str(&json).unwrap();
    assert!(back.last_event.is_none());
    assert_eq!(back.score, 4);
    // A just-loaded state has nothing to undo.
    let undone = apply(&back, &ScoringEvent::Undo).unwrap();
    assert_eq!(undone.score, 4);
}

// All the on-disk checks share one test so the cache location env var is only
// touched from a single thread.
#[test]
fn cache_files_round_trip() {
    let dir = std::env::temp_dir().join(format!("crease_cache_test_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    unsafe { std::env::set_var("XDG_CACHE_HOME", &dir) };

    // Nothing on disk yet.
    assert!(load_saved_match().is_none());
    assert!(load_history().is_empty());

    // Live match: save, reload, clear.
    let state = apply(&sample_state("m1"), &ScoringEvent::Runs(6)).unwrap();
    save_live_match(&state).unwrap();
    let loaded = load_saved_match().expect("saved match loads");
    assert_eq!(loaded.id, "m1");
    assert_eq!(loaded.score, 6);
    assert!(loaded.last_event.is_none());

    clear_saved_match();
    assert!(load_saved_match().is_none());

    // A corrupt live file reads as "no saved match".
    let live_path = dir.join("crease_terminal").join("live_match.json");
    fs::write(&live_path, "{ not json").unwrap();
    assert!(load_saved_match().is_none());

    // A version we do not understand reads the same way.
    let future = format!(
        "{{\"version\":99,\"state\":{}}}",
        serde_json::to_string(&sample_state("m2")).unwrap()
    );
    fs::write(&live_path, future).unwrap();
    assert!(load_saved_match().is_none());

    // History: newest first, de-duplicated by id.
    let updated = append_history(&record("a")).unwrap();
    assert_eq!(updated.len(), 1);
    let updated = append_history(&record("b")).unwrap();
    assert_eq!(updated[0].id, "b");
    assert_eq!(updated[1].id, "a");

    let updated = append_history(&record("a")).unwrap();
    assert_eq!(updated.len(), 2);
    assert_eq!(updated[0].id, "a");

    let reloaded = load_history();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded[0].id, "a");

    // A corrupt history file reads as empty.
    fs::write(dir.join("crease_terminal").join("match_history.json"), "[]").unwrap();
    assert!(load_history().is_empty());

    let _ = fs::remove_dir_all(&dir);
}
