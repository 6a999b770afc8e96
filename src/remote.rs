use std::env;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use serde::Serialize;

use crate::engine::{FirstInningsResult, MatchState, TeamSlot};
use crate::persist::MatchRecord;

const REQUEST_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchRow {
    pub user_id: String,
    pub match_id: String,
    pub team1_name: String,
    pub team2_name: String,
    pub total_overs: u32,
    pub winner_team: String,
    pub is_completed: bool,
    pub final_score_team1: u32,
    pub final_wickets_team1: u32,
    pub final_score_team2: u32,
    pub final_wickets_team2: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct InningsRow {
    pub match_id: String,
    pub innings_number: u8,
    pub batting_team: String,
    pub total_runs: u32,
    pub total_wickets: u32,
}

/// Maps a finished match onto the backend rows: one match summary keyed by
/// the winner, plus one row per innings.
pub fn build_summary(record: &MatchRecord, user_id: &str) -> (MatchRow, [InningsRow; 2]) {
    let state = &record.state;
    let first = state
        .first_innings_result
        .unwrap_or(FirstInningsResult { score: 0, wickets: 0 });
    // Innings 2 batting side is whoever holds the bat at match end.
    let innings2_key = slot_key(state.batting_team);
    let innings1_key = slot_key(state.batting_team.other());

    let match_row = MatchRow {
        user_id: user_id.to_string(),
        match_id: record.id.clone(),
        team1_name: state.team1.name.clone(),
        team2_name: state.team2.name.clone(),
        total_overs: state.total_overs,
        winner_team: winner_key(state),
        is_completed: true,
        final_score_team1: first.score,
        final_wickets_team1: first.wickets,
        final_score_team2: state.score,
        final_wickets_team2: state.wickets,
    };

    let innings = [
        InningsRow {
            match_id: record.id.clone(),
            innings_number: 1,
            batting_team: innings1_key.to_string(),
            total_runs: first.score,
            total_wickets: first.wickets,
        },
        InningsRow {
            match_id: record.id.clone(),
            innings_number: 2,
            batting_team: innings2_key.to_string(),
            total_runs: state.score,
            total_wickets: state.wickets,
        },
    ];

    (match_row, innings)
}

fn winner_key(state: &MatchState) -> String {
    if state.match_over_message.contains(&state.team1.name) {
        "team1".to_string()
    } else if state.match_over_message.contains(&state.team2.name) {
        "team2".to_string()
    } else {
        "tie".to_string()
    }
}

fn slot_key(slot: TeamSlot) -> &'static str {
    match slot {
        TeamSlot::Team1 => "team1",
        TeamSlot::Team2 => "team2",
    }
}

/// Fire-and-forget push of a finished match to the configured backend.
/// Skipped entirely when `CREASE_SYNC_URL` / `CREASE_SYNC_USER` are unset;
/// success and failure alike are reported back through `tx` for the console.
/// Local state is authoritative either way.
pub fn spawn_remote_sync(record: MatchRecord, tx: Sender<String>) {
    let Ok(base_url) = env::var("CREASE_SYNC_URL") else {
        return;
    };
    let Ok(user_id) = env::var("CREASE_SYNC_USER") else {
        return;
    };
    if base_url.trim().is_empty() || user_id.trim().is_empty() {
        return;
    }

    thread::spawn(move || {
        let result = push_match(&base_url, &record, &user_id);
        let msg = match result {
            Ok(()) => format!("[INFO] Synced match {} to backend", record.id),
            Err(err) => format!("[WARN] Remote sync failed for {}: {err:#}", record.id),
        };
        let _ = tx.send(msg);
    });
}

fn push_match(base_url: &str, record: &MatchRecord, user_id: &str) -> Result<()> {
    let client = http_client()?;
    let (match_row, innings) = build_summary(record, user_id);

    let url = format!("{}/matches", base_url.trim_end_matches('/'));
    client
        .post(&url)
        .json(&match_row)
        .send()
        .and_then(|resp| resp.error_for_status())
        .with_context(|| format!("post {url}"))?;

    let url = format!("{}/innings", base_url.trim_end_matches('/'));
    for row in &innings {
        client
            .post(&url)
            .json(row)
            .send()
            .and_then(|resp| resp.error_for_status())
            .with_context(|| format!("post {url}"))?;
    }
    Ok(())
}
