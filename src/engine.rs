use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const BALLS_PER_OVER: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSlot {
    Team1,
    Team2,
}

impl TeamSlot {
    pub fn other(self) -> Self {
        match self {
            TeamSlot::Team1 => TeamSlot::Team2,
            TeamSlot::Team2 => TeamSlot::Team1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub players: Vec<Player>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatsmanStats {
    pub runs: u32,
    pub balls: u32,
    pub bonus4: u32,
    pub bonus6: u32,
    pub is_out: bool,
    pub strike_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BowlerStats {
    pub balls_delivered: u32,
    pub runs_conceded: u32,
    pub wickets: u32,
    pub maiden_overs: u32,
    pub economy: f64,
    #[serde(default)]
    pub first_bounce_warning: bool,
}

impl BowlerStats {
    /// Overs in the usual `completed.balls` notation, e.g. 19 deliveries -> "3.1".
    pub fn overs_display(&self) -> String {
        format!(
            "{}.{}",
            self.balls_delivered / BALLS_PER_OVER as u32,
            self.balls_delivered % BALLS_PER_OVER as u32
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverEvent {
    pub runs: u32,
    pub is_extra: bool,
    pub is_wicket: bool,
    pub display: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtraKind {
    Wide,
    NoBall,
}

impl ExtraKind {
    pub fn label(self) -> &'static str {
        match self {
            ExtraKind::Wide => "Wd",
            ExtraKind::NoBall => "Nb",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    FirstBounce,
}

/// Rule-variant switches, fixed at match creation.
///
/// `last_man_standing = false` is the traditional game: the innings closes when
/// only one batsman is left not out. With it enabled the final batsman carries
/// on alone and the innings closes when they are dismissed too.
///
/// `bowler_auto_rotate = true` advances the bowler round-robin at the end of an
/// over; disabled, the bowler slot is cleared and scoring no-ops until an
/// explicit reassignment arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub last_man_standing: bool,
    pub bowler_auto_rotate: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            last_man_standing: false,
            bowler_auto_rotate: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstInningsResult {
    pub score: u32,
    pub wickets: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSetup {
    pub team1_name: String,
    pub team2_name: String,
    pub team1_players: Vec<String>,
    pub team2_players: Vec<String>,
    pub total_overs: u32,
    pub config: EngineConfig,
}

/// One scoring input from the UI surface. Applying an event never mutates the
/// input state; `apply` builds a full replacement value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoringEvent {
    Runs(u8),
    Extra(ExtraKind),
    Wicket,
    Warning(WarningKind),
    SetBowler(String),
    SetStriker(String),
    SetNonStriker(String),
    StartSecondInnings,
    Undo,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub id: String,
    pub team1: Team,
    pub team2: Team,
    pub total_overs: u32,
    pub config: EngineConfig,

    pub batting_team: TeamSlot,
    pub bowling_team: TeamSlot,

    pub striker_id: Option<String>,
    pub non_striker_id: Option<String>,
    pub bowler_id: Option<String>,

    pub batsman_stats: HashMap<String, BatsmanStats>,
    pub bowler_stats: HashMap<String, BowlerStats>,

    pub score: u32,
    pub wickets: u32,
    pub current_over: u32,
    pub current_ball: u8,

    pub current_over_history: Vec<OverEvent>,
    pub all_overs_history: Vec<Vec<OverEvent>>,
    /// Innings-1 over history, archived at the innings transition.
    #[serde(default)]
    pub first_innings_overs: Vec<Vec<OverEvent>>,

    pub next_batsman_index: usize,
    pub current_innings: u8,
    pub first_innings_result: Option<FirstInningsResult>,

    pub is_match_over: bool,
    pub match_over_message: String,

    // Single-slot undo buffer. Skipped by serde so persisted state never
    // carries undo history; loads come back with the slot empty.
    #[serde(skip)]
    pub last_event: Option<Box<MatchState>>,
}

impl MatchState {
    /// Builds the full initial state post-toss: zeroed stats for every player
    /// on both sides, openers in, first bowler from the fielding side.
    pub fn new(id: String, setup: &MatchSetup, batting_team: TeamSlot) -> Self {
        let make_players = |prefix: &str, names: &[String]| -> Vec<Player> {
            names
                .iter()
                .enumerate()
                .map(|(i, name)| Player {
                    id: format!("{prefix}{i}"),
                    name: name.clone(),
                })
                .collect()
        };
        let team1 = Team {
            name: setup.team1_name.clone(),
            players: make_players("t1p", &setup.team1_players),
        };
        let team2 = Team {
            name: setup.team2_name.clone(),
            players: make_players("t2p", &setup.team2_players),
        };

        let mut batsman_stats = HashMap::new();
        let mut bowler_stats = HashMap::new();
        for player in team1.players.iter().chain(team2.players.iter()) {
            batsman_stats.insert(player.id.clone(), BatsmanStats::default());
            bowler_stats.insert(player.id.clone(), BowlerStats::default());
        }

        let bowling_team = batting_team.other();
        let batting = match batting_team {
            TeamSlot::Team1 => &team1,
            TeamSlot::Team2 => &team2,
        };
        let bowling = match bowling_team {
            TeamSlot::Team1 => &team1,
            TeamSlot::Team2 => &team2,
        };

        let striker_id = batting.players.first().map(|p| p.id.clone());
        let non_striker_id = batting.players.get(1).map(|p| p.id.clone());
        let bowler_id = bowling.players.first().map(|p| p.id.clone());

        Self {
            id,
            team1,
            team2,
            total_overs: setup.total_overs,
            config: setup.config,
            batting_team,
            bowling_team,
            striker_id,
            non_striker_id,
            bowler_id,
            batsman_stats,
            bowler_stats,
            score: 0,
            wickets: 0,
            current_over: 0,
            current_ball: 0,
            current_over_history: Vec::new(),
            all_overs_history: Vec::new(),
            first_innings_overs: Vec::new(),
            next_batsman_index: 2,
            current_innings: 1,
            first_innings_result: None,
            is_match_over: false,
            match_over_message: String::new(),
            last_event: None,
        }
    }

    pub fn team(&self, slot: TeamSlot) -> &Team {
        match slot {
            TeamSlot::Team1 => &self.team1,
            TeamSlot::Team2 => &self.team2,
        }
    }

    pub fn batting_side(&self) -> &Team {
        self.team(self.batting_team)
    }

    pub fn bowling_side(&self) -> &Team {
        self.team(self.bowling_team)
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.team1
            .players
            .iter()
            .chain(self.team2.players.iter())
            .find(|p| p.id == id)
    }

    pub fn max_wickets(&self) -> u32 {
        let lineup = self.batting_side().players.len() as u32;
        if self.config.last_man_standing {
            lineup
        } else {
            lineup.saturating_sub(1)
        }
    }

    /// First-innings score + 1, once a first innings has been recorded.
    pub fn target(&self) -> Option<u32> {
        self.first_innings_result.map(|r| r.score + 1)
    }

    pub fn overs_display(&self) -> String {
        format!("{}.{}", self.current_over, self.current_ball)
    }

    fn innings_complete(&self) -> bool {
        if self.wickets >= self.max_wickets() || self.current_over >= self.total_overs {
            return true;
        }
        self.current_innings == 2
            && self
                .first_innings_result
                .is_some_and(|r| self.score > r.score)
    }

    /// Innings 1 has finished but the second innings has not been started yet.
    /// Derived, never stored; the collaborator offers the explicit transition.
    pub fn innings_break_pending(&self) -> bool {
        self.current_innings == 1 && !self.is_match_over && self.innings_complete()
    }
}

/// Rounded to 2 decimals, half away from zero. 0 when no balls faced.
pub fn strike_rate(runs: u32, balls: u32) -> f64 {
    if balls == 0 {
        return 0.0;
    }
    round2(runs as f64 / balls as f64 * 100.0)
}

/// Runs conceded per 6 legal deliveries, rounded to 2 decimals. 0 when no
/// deliveries bowled.
pub fn economy(runs_conceded: u32, balls_delivered: u32) -> f64 {
    if balls_delivered == 0 {
        return 0.0;
    }
    round2(runs_conceded as f64 / balls_delivered as f64 * 6.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Applies one scoring event and returns the replacement state.
///
/// `None` is returned only for `Reset`; every invalid or out-of-turn event is
/// a silent no-op that hands back an unchanged clone, per the UI contract.
pub fn apply(state: &MatchState, event: &ScoringEvent) -> Option<MatchState> {
    match event {
        ScoringEvent::Reset => return None,
        ScoringEvent::Undo => {
            return Some(match &state.last_event {
                Some(prev) => (**prev).clone(),
                None => state.clone(),
            });
        }
        _ => {}
    }

    if state.is_match_over {
        return Some(state.clone());
    }

    if let ScoringEvent::StartSecondInnings = event {
        return Some(start_second_innings(state));
    }

    // Only the explicit transition moves the match forward once the innings
    // break is pending; everything else waits.
    if state.innings_break_pending() {
        return Some(state.clone());
    }

    match event {
        ScoringEvent::SetBowler(id) => return Some(set_bowler(state, id)),
        ScoringEvent::SetStriker(id) => return Some(set_batting_slot(state, id, true)),
        ScoringEvent::SetNonStriker(id) => return Some(set_batting_slot(state, id, false)),
        _ => {}
    }

    // Delivery and warning events need both active roles in place.
    let (Some(striker_id), Some(bowler_id)) = (state.striker_id.clone(), state.bowler_id.clone())
    else {
        return Some(state.clone());
    };

    if let ScoringEvent::Warning(kind) = event {
        let mut next = snapshot(state);
        match kind {
            WarningKind::FirstBounce => {
                if let Some(stats) = next.bowler_stats.get_mut(&bowler_id) {
                    stats.first_bounce_warning = true;
                }
            }
        }
        return Some(next);
    }

    let (runs_scored, legal_delivery, mut rotate_strike, ball) = match event {
        ScoringEvent::Runs(runs) => {
            let runs = *runs;
            if !matches!(runs, 0 | 1 | 2 | 3 | 4 | 6) {
                return Some(state.clone());
            }
            let ball = OverEvent {
                runs: runs as u32,
                is_extra: false,
                is_wicket: false,
                display: runs.to_string(),
            };
            (runs as u32, true, runs % 2 == 1, ball)
        }
        ScoringEvent::Extra(kind) => {
            let ball = OverEvent {
                runs: 1,
                is_extra: true,
                is_wicket: false,
                display: kind.label().to_string(),
            };
            (1, false, false, ball)
        }
        ScoringEvent::Wicket => {
            let ball = OverEvent {
                runs: 0,
                is_extra: false,
                is_wicket: true,
                display: "W".to_string(),
            };
            (0, true, false, ball)
        }
        _ => unreachable!("handled above"),
    };

    let mut next = snapshot(state);

    if let ScoringEvent::Runs(runs) = event {
        if let Some(stats) = next.batsman_stats.get_mut(&striker_id) {
            if *runs == 4 {
                stats.bonus4 += 1;
            }
            if *runs == 6 {
                stats.bonus6 += 1;
            }
        }
    }

    if matches!(event, ScoringEvent::Wicket) {
        next.wickets += 1;
        if let Some(stats) = next.batsman_stats.get_mut(&striker_id) {
            stats.is_out = true;
        }
        if let Some(stats) = next.bowler_stats.get_mut(&bowler_id) {
            stats.wickets += 1;
        }

        if next.wickets < next.max_wickets() {
            let lineup = next.batting_side().players.clone();
            if let Some(incoming) = lineup.get(next.next_batsman_index) {
                next.striker_id = Some(incoming.id.clone());
                next.next_batsman_index += 1;
            } else if next.config.last_man_standing {
                // Lineup exhausted: the last batsman stays on alone.
                next.striker_id = next.non_striker_id.take();
            } else {
                next.striker_id = None;
            }
        } else {
            next.striker_id = None;
        }
    }

    next.score += runs_scored;
    if let Some(stats) = next.batsman_stats.get_mut(&striker_id) {
        stats.runs += runs_scored;
    }
    if let Some(stats) = next.bowler_stats.get_mut(&bowler_id) {
        stats.runs_conceded += runs_scored;
    }

    if legal_delivery {
        next.current_ball += 1;
        if let Some(stats) = next.batsman_stats.get_mut(&striker_id) {
            stats.balls += 1;
        }
        if let Some(stats) = next.bowler_stats.get_mut(&bowler_id) {
            stats.balls_delivered += 1;
        }
    }

    if let Some(stats) = next.batsman_stats.get_mut(&striker_id) {
        stats.strike_rate = strike_rate(stats.runs, stats.balls);
    }
    if let Some(stats) = next.bowler_stats.get_mut(&bowler_id) {
        stats.economy = economy(stats.runs_conceded, stats.balls_delivered);
    }

    next.current_over_history.push(ball);

    if next.current_ball >= BALLS_PER_OVER {
        // End of over always flips strike relative to the in-over rotation.
        rotate_strike = !rotate_strike;

        let maiden = next
            .current_over_history
            .iter()
            .all(|b| b.runs == 0 && !b.is_extra);
        if maiden {
            if let Some(stats) = next.bowler_stats.get_mut(&bowler_id) {
                stats.maiden_overs += 1;
            }
        }

        let finished = std::mem::take(&mut next.current_over_history);
        next.all_overs_history.push(finished);
        next.current_over += 1;
        next.current_ball = 0;

        if next.config.bowler_auto_rotate {
            let lineup = &next.bowling_side().players;
            if let Some(pos) = lineup.iter().position(|p| p.id == bowler_id) {
                next.bowler_id = Some(lineup[(pos + 1) % lineup.len()].id.clone());
            }
        } else {
            next.bowler_id = None;
        }
    }

    if rotate_strike && next.striker_id.is_some() && next.non_striker_id.is_some() {
        std::mem::swap(&mut next.striker_id, &mut next.non_striker_id);
    }

    if next.innings_complete() && next.current_innings == 2 {
        finish_match(&mut next);
    }

    Some(next)
}

/// Clone of `state` with the prior state parked in the undo slot. The parked
/// snapshot has its own slot cleared, keeping undo depth at exactly one.
fn snapshot(state: &MatchState) -> MatchState {
    let mut prev = state.clone();
    prev.last_event = None;
    let mut next = state.clone();
    next.last_event = Some(Box::new(prev));
    next
}

fn set_bowler(state: &MatchState, id: &str) -> MatchState {
    if !state.bowling_side().players.iter().any(|p| p.id == id) {
        return state.clone();
    }
    let mut next = snapshot(state);
    next.bowler_id = Some(id.to_string());
    next
}

fn set_batting_slot(state: &MatchState, id: &str, striker: bool) -> MatchState {
    let eligible = state
        .batting_side()
        .players
        .iter()
        .any(|p| p.id == id && !state.batsman_stats.get(&p.id).is_some_and(|s| s.is_out));
    if !eligible {
        return state.clone();
    }

    let mut next = snapshot(state);
    let other = if striker {
        next.non_striker_id.clone()
    } else {
        next.striker_id.clone()
    };
    if other.as_deref() == Some(id) {
        // Picking the player in the other slot swaps the two roles.
        std::mem::swap(&mut next.striker_id, &mut next.non_striker_id);
    } else if striker {
        next.striker_id = Some(id.to_string());
    } else {
        next.non_striker_id = Some(id.to_string());
    }
    next
}

fn start_second_innings(state: &MatchState) -> MatchState {
    if !state.innings_break_pending() {
        return state.clone();
    }

    let mut next = snapshot(state);
    next.first_innings_result = Some(FirstInningsResult {
        score: next.score,
        wickets: next.wickets,
    });

    let mut archived = std::mem::take(&mut next.all_overs_history);
    if !next.current_over_history.is_empty() {
        archived.push(std::mem::take(&mut next.current_over_history));
    }
    next.first_innings_overs = archived;

    std::mem::swap(&mut next.batting_team, &mut next.bowling_team);
    next.score = 0;
    next.wickets = 0;
    next.current_over = 0;
    next.current_ball = 0;
    next.next_batsman_index = 2;
    next.current_innings = 2;

    let batting = next.batting_side();
    let striker_id = batting.players.first().map(|p| p.id.clone());
    let non_striker_id = batting.players.get(1).map(|p| p.id.clone());
    next.striker_id = striker_id;
    next.non_striker_id = non_striker_id;
    next.bowler_id = next.bowling_side().players.first().map(|p| p.id.clone());

    next
}

fn finish_match(next: &mut MatchState) {
    let Some(first) = next.first_innings_result else {
        return;
    };
    next.is_match_over = true;
    next.match_over_message = if next.score > first.score {
        let margin = next.max_wickets().saturating_sub(next.wickets);
        format!("{} won by {} wickets!", next.batting_side().name, margin)
    } else if first.score > next.score {
        let margin = first.score - next.score;
        format!("{} won by {} runs!", next.bowling_side().name, margin)
    } else {
        "Match tied!".to_string()
    };
}
