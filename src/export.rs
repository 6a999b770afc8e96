use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::DateTime;

use crate::engine::{MatchState, Player, BALLS_PER_OVER};
use crate::persist::MatchRecord;

/// Writes the per-player scorecard for one finished match as
/// `match_<id>.csv` in `dir`. One row per player who batted or bowled.
pub fn export_scorecard(record: &MatchRecord, dir: &Path) -> Result<PathBuf> {
    let csv = scorecard_csv(record);
    let path = dir.join(format!("match_{}.csv", record.id));

    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let tmp = path.with_extension("csv.tmp");
    fs::write(&tmp, csv).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, &path).with_context(|| format!("swap {}", path.display()))?;
    Ok(path)
}

pub fn scorecard_csv(record: &MatchRecord) -> String {
    let state = &record.state;
    let mut out = String::new();

    out.push_str(&format!(
        "Match,{}\n",
        csv_quote(&format!("{} vs {}", state.team1.name, state.team2.name))
    ));
    out.push_str(&format!("Date,{}\n", display_date(&record.completed_at)));
    out.push_str(&format!("Result,{}\n\n", csv_quote(&state.match_over_message)));
    out.push_str(
        "Player Name,Team,Runs,Balls,4s,6s,SR,Overs,Maidens,Runs Conceded,Wickets,Economy\n",
    );

    for (team_name, player) in state
        .team1
        .players
        .iter()
        .map(|p| (&state.team1.name, p))
        .chain(state.team2.players.iter().map(|p| (&state.team2.name, p)))
    {
        if let Some(row) = player_row(state, team_name, player) {
            out.push_str(&row);
            out.push('\n');
        }
    }
    out
}

fn player_row(state: &MatchState, team_name: &str, player: &Player) -> Option<String> {
    let bat = state.batsman_stats.get(&player.id);
    let bowl = state.bowler_stats.get(&player.id);

    // Only players who did something make the sheet.
    let batted = bat.is_some_and(|b| b.balls > 0 || b.is_out);
    let bowled = bowl.is_some_and(|b| b.balls_delivered > 0);
    if !batted && !bowled {
        return None;
    }

    let (runs, balls, fours, sixes, sr) = bat
        .map(|b| (b.runs, b.balls, b.bonus4, b.bonus6, b.strike_rate))
        .unwrap_or_default();
    let (overs, maidens, conceded, wickets, econ) = bowl
        .map(|b| {
            (
                format!(
                    "{}.{}",
                    b.balls_delivered / BALLS_PER_OVER as u32,
                    b.balls_delivered % BALLS_PER_OVER as u32
                ),
                b.maiden_overs,
                b.runs_conceded,
                b.wickets,
                b.economy,
            )
        })
        .unwrap_or_else(|| ("0.0".to_string(), 0, 0, 0, 0.0));

    Some(format!(
        "{},{},{runs},{balls},{fours},{sixes},{sr},{overs},{maidens},{conceded},{wickets},{econ}",
        csv_quote(&player.name),
        csv_quote(team_name),
    ))
}

fn display_date(completed_at: &str) -> String {
    match DateTime::parse_from_rfc3339(completed_at) {
        Ok(ts) => ts.format("%Y-%m-%d").to_string(),
        Err(_) => completed_at.to_string(),
    }
}

fn csv_quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
