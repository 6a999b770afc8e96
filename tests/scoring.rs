use crease_terminal::engine::{
    apply, EngineConfig, ExtraKind, MatchSetup, MatchState, ScoringEvent, TeamSlot, WarningKind,
    BALLS_PER_OVER,
};

fn setup() -> MatchSetup {
    MatchSetup {
        team1_name: "Lions".to_string(),
        team2_name: "Tigers".to_string(),
        team1_players: vec!["Asha".into(), "Bina".into(), "Chitra".into(), "Divya".into()],
        team2_players: vec!["Esha".into(), "Farid".into(), "Gita".into(), "Hari".into()],
        total_overs: 4,
        config: EngineConfig::default(),
    }
}

fn fresh() -> MatchState {
    MatchState::new("m1".to_string(), &setup(), TeamSlot::Team1)
}

fn play(state: MatchState, events: &[ScoringEvent]) -> MatchState {
    events.iter().fold(state, |s, e| apply(&s, e).expect("non-reset event"))
}

fn dots(n: usize) -> Vec<ScoringEvent> {
    vec![ScoringEvent::Runs(0); n]
}

fn dot_over(state: MatchState) -> MatchState {
    play(state, &dots(BALLS_PER_OVER as usize))
}

#[test]
fn six_legal_balls_complete_the_over() {
    let state = play(fresh(), &vec![ScoringEvent::Runs(1); 5]);
    assert_eq!(state.current_over, 0);
    assert_eq!(state.current_ball, 5);
    assert_eq!(state.current_over_history.len(), 5);

    let state = apply(&state, &ScoringEvent::Runs(1)).unwrap();
    assert_eq!(state.current_over, 1);
    assert_eq!(state.current_ball, 0);
    assert!(state.current_over_history.is_empty());
    assert_eq!(state.all_overs_history.len(), 1);
    assert_eq!(state.all_overs_history[0].len(), 6);
    assert_eq!(state.overs_display(), "1.0");
}

#[test]
fn strike_flips_at_the_end_of_an_over() {
    // Six dot balls: nobody rotated mid-over, so the over-end flip leaves the
    // opener at the non-striker end.
    let state = dot_over(fresh());
    assert_eq!(state.striker_id.as_deref(), Some("t1p1"));
    assert_eq!(state.non_striker_id.as_deref(), Some("t1p0"));
}

#[test]
fn single_off_the_last_ball_keeps_the_striker_on() {
    // In-over rotation and the over-end flip cancel out.
    let state = play(fresh(), &dots(5));
    let state = apply(&state, &ScoringEvent::Runs(1)).unwrap();
    assert_eq!(state.striker_id.as_deref(), Some("t1p0"));
}

#[test]
fn wides_extend_the_over() {
    let state = play(
        fresh(),
        &[
            ScoringEvent::Runs(0),
            ScoringEvent::Extra(ExtraKind::Wide),
            ScoringEvent::Extra(ExtraKind::NoBall),
            ScoringEvent::Runs(0),
        ],
    );
    assert_eq!(state.current_ball, 2);
    assert_eq!(state.current_over_history.len(), 4);
    assert_eq!(state.score, 2);
}

#[test]
fn all_dot_over_is_a_maiden() {
    let state = dot_over(fresh());
    assert_eq!(state.bowler_stats["t2p0"].maiden_overs, 1);
    assert_eq!(state.bowler_stats["t2p0"].economy, 0.0);
}

#[test]
fn an_extra_disqualifies_the_maiden() {
    // Zero runs off the bat, but a wide leaked one: not a maiden.
    let mut events = vec![ScoringEvent::Extra(ExtraKind::Wide)];
    events.extend(dots(BALLS_PER_OVER as usize));
    let state = play(fresh(), &events);
    assert_eq!(state.current_over, 1);
    assert_eq!(state.bowler_stats["t2p0"].maiden_overs, 0);
}

#[test]
fn a_wicket_in_a_scoreless_over_still_counts_as_a_maiden() {
    let mut events = vec![ScoringEvent::Wicket];
    events.extend(dots(5));
    let state = play(fresh(), &events);
    assert_eq!(state.bowler_stats["t2p0"].maiden_overs, 1);
}

#[test]
fn bowlers_rotate_round_robin_and_wrap() {
    let mut state = fresh();
    let expected = ["t2p1", "t2p2", "t2p3", "t2p0"];
    for id in expected {
        state = dot_over(state);
        assert_eq!(state.bowler_id.as_deref(), Some(id));
        // Keep the innings alive across all four overs of the loop.
        state.total_overs += 1;
    }
}

#[test]
fn wicket_brings_in_the_next_batsman_at_the_striker_end() {
    let state = apply(&fresh(), &ScoringEvent::Wicket).unwrap();
    assert_eq!(state.wickets, 1);
    assert!(state.batsman_stats["t1p0"].is_out);
    assert_eq!(state.batsman_stats["t1p0"].balls, 1);
    assert_eq!(state.striker_id.as_deref(), Some("t1p2"));
    assert_eq!(state.non_striker_id.as_deref(), Some("t1p1"));
    assert_eq!(state.bowler_stats["t2p0"].wickets, 1);
    assert_eq!(state.next_batsman_index, 3);
}

#[test]
fn dismissed_batsmen_cannot_be_reassigned() {
    let state = apply(&fresh(), &ScoringEvent::Wicket).unwrap();
    let next = apply(&state, &ScoringEvent::SetStriker("t1p0".to_string())).unwrap();
    assert_eq!(next.striker_id.as_deref(), Some("t1p2"));
}

#[test]
fn strike_rate_and_economy_update_per_delivery() {
    let state = play(
        fresh(),
        &[ScoringEvent::Runs(4), ScoringEvent::Runs(0), ScoringEvent::Runs(2)],
    );
    let bat = &state.batsman_stats["t1p0"];
    assert_eq!(bat.runs, 6);
    assert_eq!(bat.balls, 3);
    assert_eq!(bat.strike_rate, 200.0);
    let bowl = &state.bowler_stats["t2p0"];
    assert_eq!(bowl.runs_conceded, 6);
    assert_eq!(bowl.economy, 12.0);
}

#[test]
fn undo_restores_the_previous_state_for_every_event_kind() {
    let events = [
        ScoringEvent::Runs(4),
        ScoringEvent::Extra(ExtraKind::NoBall),
        ScoringEvent::Wicket,
        ScoringEvent::Warning(WarningKind::FirstBounce),
        ScoringEvent::SetBowler("t2p2".to_string()),
        ScoringEvent::SetStriker("t1p1".to_string()),
    ];
    for event in &events {
        let before = apply(&fresh(), &ScoringEvent::Runs(1)).unwrap();
        let after = apply(&before, event).unwrap();
        let undone = apply(&after, &ScoringEvent::Undo).unwrap();
        assert_eq!(
            serde_json::to_value(&undone).unwrap(),
            serde_json::to_value(&before).unwrap(),
            "undo failed to invert {event:?}"
        );
    }
}

#[test]
fn undo_depth_is_exactly_one() {
    let a = fresh();
    let b = apply(&a, &ScoringEvent::Runs(4)).unwrap();
    let c = apply(&b, &ScoringEvent::Runs(6)).unwrap();

    let once = apply(&c, &ScoringEvent::Undo).unwrap();
    assert_eq!(once.score, 4);
    // The parked snapshot has no history of its own, so a second undo holds.
    let twice = apply(&once, &ScoringEvent::Undo).unwrap();
    assert_eq!(twice.score, 4);
}

#[test]
fn undo_reverses_an_over_boundary() {
    let before = play(fresh(), &dots(5));
    let after = apply(&before, &ScoringEvent::Runs(0)).unwrap();
    assert_eq!(after.current_over, 1);

    let undone = apply(&after, &ScoringEvent::Undo).unwrap();
    assert_eq!(undone.current_over, 0);
    assert_eq!(undone.current_ball, 5);
    assert_eq!(undone.bowler_id.as_deref(), Some("t2p0"));
    assert_eq!(undone.bowler_stats["t2p0"].maiden_overs, 0);
}

#[test]
fn noop_events_do_not_consume_the_undo_slot() {
    let state = apply(&fresh(), &ScoringEvent::Runs(4)).unwrap();
    // Invalid run value: unchanged clone, undo slot intact.
    let state = apply(&state, &ScoringEvent::Runs(5)).unwrap();
    let undone = apply(&state, &ScoringEvent::Undo).unwrap();
    assert_eq!(undone.score, 0);
}
