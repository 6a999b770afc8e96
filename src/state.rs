use std::collections::VecDeque;
use std::env;

use chrono::Utc;
use rand::Rng;

use crate::engine::{self, EngineConfig, MatchSetup, MatchState, Player, ScoringEvent};
use crate::persist::{self, MatchRecord};
use crate::toss::TossFlow;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 11;
pub const MAX_OVERS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Setup,
    Toss,
    Live,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    Team1Name,
    Team1Player(usize),
    Team2Name,
    Team2Player(usize),
    Overs,
}

/// The match-setup form: two rosters, team names and the over count, edited
/// one focused text field at a time.
#[derive(Debug, Clone)]
pub struct SetupForm {
    pub team1_name: String,
    pub team2_name: String,
    pub team1_players: Vec<String>,
    pub team2_players: Vec<String>,
    pub overs_text: String,
    pub field: SetupField,
}

impl Default for SetupForm {
    fn default() -> Self {
        Self::new()
    }
}

impl SetupForm {
    pub fn new() -> Self {
        Self {
            team1_name: String::new(),
            team2_name: String::new(),
            team1_players: vec![String::new(), String::new()],
            team2_players: vec![String::new(), String::new()],
            overs_text: "2".to_string(),
            field: SetupField::Team1Name,
        }
    }

    fn field_order(&self) -> Vec<SetupField> {
        let mut order = vec![SetupField::Team1Name];
        order.extend((0..self.team1_players.len()).map(SetupField::Team1Player));
        order.push(SetupField::Team2Name);
        order.extend((0..self.team2_players.len()).map(SetupField::Team2Player));
        order.push(SetupField::Overs);
        order
    }

    pub fn next_field(&mut self) {
        let order = self.field_order();
        let pos = order.iter().position(|f| *f == self.field).unwrap_or(0);
        self.field = order[(pos + 1) % order.len()];
    }

    pub fn prev_field(&mut self) {
        let order = self.field_order();
        let pos = order.iter().position(|f| *f == self.field).unwrap_or(0);
        self.field = order[(pos + order.len() - 1) % order.len()];
    }

    /// Adds a roster slot to whichever side holds the focus.
    pub fn add_player(&mut self) {
        match self.field {
            SetupField::Team1Name | SetupField::Team1Player(_) => {
                if self.team1_players.len() < MAX_PLAYERS {
                    self.team1_players.push(String::new());
                    self.field = SetupField::Team1Player(self.team1_players.len() - 1);
                }
            }
            _ => {
                if self.team2_players.len() < MAX_PLAYERS {
                    self.team2_players.push(String::new());
                    self.field = SetupField::Team2Player(self.team2_players.len() - 1);
                }
            }
        }
    }

    pub fn remove_player(&mut self) {
        match self.field {
            SetupField::Team1Player(idx) if self.team1_players.len() > MIN_PLAYERS => {
                self.team1_players.remove(idx);
                self.field = SetupField::Team1Player(idx.min(self.team1_players.len() - 1));
            }
            SetupField::Team2Player(idx) if self.team2_players.len() > MIN_PLAYERS => {
                self.team2_players.remove(idx);
                self.field = SetupField::Team2Player(idx.min(self.team2_players.len() - 1));
            }
            _ => {}
        }
    }

    pub fn active_text_mut(&mut self) -> &mut String {
        match self.field {
            SetupField::Team1Name => &mut self.team1_name,
            SetupField::Team1Player(idx) => &mut self.team1_players[idx],
            SetupField::Team2Name => &mut self.team2_name,
            SetupField::Team2Player(idx) => &mut self.team2_players[idx],
            SetupField::Overs => &mut self.overs_text,
        }
    }

    pub fn push_char(&mut self, c: char) {
        let numeric = matches!(self.field, SetupField::Overs);
        if numeric && !c.is_ascii_digit() {
            return;
        }
        self.active_text_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.active_text_mut().pop();
    }

    /// Validates the form into a `MatchSetup`, or an error string for the
    /// console. Blank roster slots are dropped; blank team names get defaults.
    pub fn build(&self, config: EngineConfig) -> Result<MatchSetup, String> {
        let clean = |players: &[String]| -> Vec<String> {
            players
                .iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect()
        };
        let team1_players = clean(&self.team1_players);
        let team2_players = clean(&self.team2_players);
        if team1_players.len() < MIN_PLAYERS || team2_players.len() < MIN_PLAYERS {
            return Err(format!("Each team needs at least {MIN_PLAYERS} named players"));
        }

        let total_overs = self
            .overs_text
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| (1..=MAX_OVERS).contains(n))
            .ok_or_else(|| format!("Overs must be between 1 and {MAX_OVERS}"))?;

        let name_or = |name: &str, fallback: &str| -> String {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                fallback.to_string()
            } else {
                trimmed.to_string()
            }
        };

        Ok(MatchSetup {
            team1_name: name_or(&self.team1_name, "Team 1"),
            team2_name: name_or(&self.team2_name, "Team 2"),
            team1_players,
            team2_players,
            total_overs,
            config,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickRole {
    Bowler,
    Striker,
    NonStriker,
}

impl PickRole {
    pub fn title(self) -> &'static str {
        match self {
            PickRole::Bowler => "Select Bowler",
            PickRole::Striker => "Select Striker",
            PickRole::NonStriker => "Select Non-Striker",
        }
    }
}

/// Overlay for reassigning a role to another player.
#[derive(Debug, Clone)]
pub struct RolePicker {
    pub role: PickRole,
    pub options: Vec<Player>,
    pub selected: usize,
}

impl RolePicker {
    pub fn open(role: PickRole, state: &MatchState) -> Self {
        let options = match role {
            PickRole::Bowler => state.bowling_side().players.clone(),
            PickRole::Striker | PickRole::NonStriker => state
                .batting_side()
                .players
                .iter()
                .filter(|p| !state.batsman_stats.get(&p.id).is_some_and(|s| s.is_out))
                .cloned()
                .collect(),
        };
        Self {
            role,
            options,
            selected: 0,
        }
    }

    pub fn select_next(&mut self) {
        if !self.options.is_empty() {
            self.selected = (self.selected + 1) % self.options.len();
        }
    }

    pub fn select_prev(&mut self) {
        if self.options.is_empty() {
            return;
        }
        if self.selected == 0 {
            self.selected = self.options.len() - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn chosen(&self) -> Option<&Player> {
        self.options.get(self.selected)
    }
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub setup: SetupForm,
    pub toss: TossFlow,
    pub pending_setup: Option<MatchSetup>,
    pub config: EngineConfig,
    pub current: Option<MatchState>,
    pub history: Vec<MatchRecord>,
    pub history_selected: usize,
    pub picker: Option<RolePicker>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        let config = EngineConfig {
            last_man_standing: parse_bool_env("CREASE_LAST_MAN_STANDING", false),
            bowler_auto_rotate: parse_bool_env("CREASE_BOWLER_AUTO_ROTATE", true),
        };
        Self {
            screen: Screen::Setup,
            setup: SetupForm::new(),
            toss: TossFlow::new(),
            pending_setup: None,
            config,
            current: None,
            history: Vec::new(),
            history_selected: 0,
            picker: None,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Setup screen submit: validate the form and move on to the toss.
    pub fn submit_setup(&mut self) {
        match self.setup.build(self.config) {
            Ok(setup) => {
                self.pending_setup = Some(setup);
                self.toss = TossFlow::new();
                self.screen = Screen::Toss;
            }
            Err(err) => self.push_log(format!("[WARN] {err}")),
        }
    }

    /// Toss screen finish: mint the match and enter live scoring.
    pub fn start_match(&mut self) {
        let Some(batting) = self.toss.batting_slot() else {
            return;
        };
        let Some(setup) = self.pending_setup.take() else {
            return;
        };
        let id = format!(
            "m{}-{:04}",
            Utc::now().timestamp_millis(),
            rand::thread_rng().gen_range(0..10_000)
        );
        let state = MatchState::new(id, &setup, batting);
        if let Err(err) = persist::save_live_match(&state) {
            self.push_log(format!("[WARN] Save failed: {err:#}"));
        }
        self.push_log(format!(
            "[INFO] {} vs {} underway, {} bat first",
            state.team1.name,
            state.team2.name,
            state.batting_side().name
        ));
        self.current = Some(state);
        self.screen = Screen::Live;
    }

    pub fn select_history_next(&mut self) {
        let total = self.history.len();
        if total == 0 {
            self.history_selected = 0;
            return;
        }
        self.history_selected = (self.history_selected + 1) % total;
    }

    pub fn select_history_prev(&mut self) {
        let total = self.history.len();
        if total == 0 {
            self.history_selected = 0;
            return;
        }
        if self.history_selected == 0 {
            self.history_selected = total - 1;
        } else {
            self.history_selected -= 1;
        }
    }

    pub fn selected_record(&self) -> Option<&MatchRecord> {
        self.history.get(self.history_selected)
    }
}

/// Applies one scoring event to the live match and publishes the result.
/// Persistence runs after publish as an observer and never blocks or fails
/// the transition. Returns the finalized record when this event ended the
/// match, so the caller can hand it to the sync worker.
pub fn dispatch(state: &mut AppState, event: &ScoringEvent) -> Option<MatchRecord> {
    let current = state.current.as_ref()?;
    let was_over = current.is_match_over;

    let Some(next) = engine::apply(current, event) else {
        // Reset: destroy the match; the final snapshot is already in the
        // history log if it completed.
        persist::clear_saved_match();
        state.current = None;
        state.picker = None;
        state.pending_setup = None;
        state.setup = SetupForm::new();
        state.toss = TossFlow::new();
        state.screen = Screen::Setup;
        state.push_log("[INFO] Match reset");
        return None;
    };

    let finished = next.is_match_over && !was_over;
    let message = next.match_over_message.clone();
    state.current = Some(next);

    if let Some(published) = &state.current {
        if let Err(err) = persist::save_live_match(published) {
            state.push_log(format!("[WARN] Save failed: {err:#}"));
        }
    }

    if !finished {
        return None;
    }

    state.push_log(format!("[INFO] {message}"));
    let record = MatchRecord {
        id: state.current.as_ref().map(|m| m.id.clone())?,
        completed_at: Utc::now().to_rfc3339(),
        state: state.current.clone()?,
    };
    match persist::append_history(&record) {
        Ok(updated) => {
            state.history = updated;
            state.history_selected = 0;
        }
        Err(err) => state.push_log(format!("[WARN] History write failed: {err:#}")),
    }
    Some(record)
}

fn parse_bool_env(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|val| match val.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}
