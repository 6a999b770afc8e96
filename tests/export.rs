use std::fs;

use crease_terminal::engine::{
    apply, EngineConfig, MatchSetup, MatchState, ScoringEvent, TeamSlot,
};
use crease_terminal::export::{export_scorecard, scorecard_csv};
use crease_terminal::persist::MatchRecord;

fn finished_record() -> MatchRecord {
    let setup = MatchSetup {
        team1_name: "Lions".to_string(),
        team2_name: "Tigers, \"B\" XI".to_string(),
        team1_players: vec!["Asha".into(), "Bina".into(), "Chitra".into()],
        team2_players: vec!["Dev".into(), "Esha".into(), "Farid".into()],
        total_overs: 1,
        config: EngineConfig::default(),
    };
    let mut state = MatchState::new("m1".to_string(), &setup, TeamSlot::Team1);
    for event in [
        // Innings 1: Lions 6-0 off six singles.
        ScoringEvent::Runs(1),
        ScoringEvent::Runs(1),
        ScoringEvent::Runs(1),
        ScoringEvent::Runs(1),
        ScoringEvent::Runs(1),
        ScoringEvent::Runs(1),
        ScoringEvent::StartSecondInnings,
        // Innings 2: Tigers chase it down with a six and a single.
        ScoringEvent::Runs(6),
        ScoringEvent::Runs(1),
    ] {
        state = apply(&state, &event).expect("non-reset event");
    }
    assert!(state.is_match_over);
    MatchRecord {
        id: "m1".to_string(),
        completed_at: "2026-08-28T18:30:00+00:00".to_string(),
        state,
    }
}

#[test]
fn scorecard_covers_only_players_who_took_part() {
    let csv = scorecard_csv(&finished_record());
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[0], "Match,\"Lions vs Tigers, \"\"B\"\" XI\"");
    assert_eq!(lines[1], "Date,2026-08-28");
    assert!(lines[2].starts_with("Result,"));
    assert_eq!(
        lines[4],
        "Player Name,Team,Runs,Balls,4s,6s,SR,Overs,Maidens,Runs Conceded,Wickets,Economy"
    );

    // Only players who faced a ball, lost their wicket, or bowled make the
    // sheet. Chitra never got in, Esha never faced, Farid never got on.
    assert!(csv.contains("\"Asha\""));
    assert!(csv.contains("\"Bina\""));
    assert!(csv.contains("\"Dev\""));
    assert!(!csv.contains("\"Chitra\""));
    assert!(!csv.contains("\"Esha\""));
    assert!(!csv.contains("\"Farid\""));
}

#[test]
fn scorecard_rows_carry_both_disciplines() {
    let record = finished_record();
    let csv = scorecard_csv(&record);

    // Dev opened the bowling in innings 1 and opened the bat in innings 2:
    // 7 runs off 2 balls, plus 1.0-0-6-0 with the ball.
    let dev = csv
        .lines()
        .find(|l| l.starts_with("\"Dev\""))
        .expect("Dev has a row");
    assert_eq!(dev, "\"Dev\",\"Tigers, \"\"B\"\" XI\",7,2,0,1,350,1.0,0,6,0,6");
}

#[test]
fn export_writes_the_csv_file() {
    let dir = std::env::temp_dir().join(format!("crease_export_test_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);

    let record = finished_record();
    let path = export_scorecard(&record, &dir).unwrap();
    assert_eq!(path.file_name().unwrap(), "match_m1.csv");

    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written, scorecard_csv(&record));

    let _ = fs::remove_dir_all(&dir);
}
