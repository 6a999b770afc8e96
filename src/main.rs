use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crease_terminal::engine::{ExtraKind, MatchState, ScoringEvent, TeamSlot, WarningKind};
use crease_terminal::export;
use crease_terminal::persist;
use crease_terminal::remote;
use crease_terminal::state::{self, AppState, PickRole, RolePicker, Screen, SetupField};
use crease_terminal::toss::{CoinFace, TossDecision, TossStage};

struct App {
    state: AppState,
    should_quit: bool,
    sync_tx: mpsc::Sender<String>,
    export_dir: PathBuf,
}

impl App {
    fn new(sync_tx: mpsc::Sender<String>) -> Self {
        let export_dir = std::env::var("CREASE_EXPORT_DIR")
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut state = AppState::new();
        state.history = persist::load_history();
        if let Some(saved) = persist::load_saved_match() {
            state.push_log(format!(
                "[INFO] Resumed saved match: {} vs {}",
                saved.team1.name, saved.team2.name
            ));
            state.current = Some(saved);
            state.screen = Screen::Live;
        }

        Self {
            state,
            should_quit: false,
            sync_tx,
            export_dir,
        }
    }

    fn apply_event(&mut self, event: ScoringEvent) {
        if let Some(record) = state::dispatch(&mut self.state, &event) {
            remote::spawn_remote_sync(record, self.sync_tx.clone());
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay {
            self.state.help_overlay = false;
            return;
        }
        match self.state.screen {
            Screen::Setup => self.on_setup_key(key),
            Screen::Toss => self.on_toss_key(key),
            Screen::Live => self.on_live_key(key),
            Screen::History => self.on_history_key(key),
        }
    }

    fn on_setup_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('n') => self.state.setup.add_player(),
                KeyCode::Char('r') => self.state.setup.remove_player(),
                _ => {}
            }
            return;
        }
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Down => self.state.setup.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.state.setup.prev_field(),
            KeyCode::Backspace => self.state.setup.backspace(),
            KeyCode::Enter => {
                if self.state.setup.field == SetupField::Overs {
                    self.state.submit_setup();
                } else {
                    self.state.setup.next_field();
                }
            }
            KeyCode::F(1) => self.state.help_overlay = true,
            KeyCode::Char(c) => self.state.setup.push_char(c),
            _ => {}
        }
    }

    fn on_toss_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => self.state.screen = Screen::Setup,
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
        match self.state.toss.stage {
            TossStage::Call => match key.code {
                KeyCode::Char('h') => self.state.toss.call(CoinFace::Heads),
                KeyCode::Char('t') => self.state.toss.call(CoinFace::Tails),
                KeyCode::Char('f') | KeyCode::Enter => self.state.toss.flip(Instant::now()),
                _ => {}
            },
            TossStage::Decision => match key.code {
                KeyCode::Char('b') => self.state.toss.choose(TossDecision::Bat),
                KeyCode::Char('w') => self.state.toss.choose(TossDecision::Bowl),
                KeyCode::Enter => self.state.start_match(),
                _ => {}
            },
            _ => {}
        }
    }

    fn on_live_key(&mut self, key: KeyEvent) {
        if let Some(picker) = &mut self.state.picker {
            match key.code {
                KeyCode::Char('j') | KeyCode::Down => picker.select_next(),
                KeyCode::Char('k') | KeyCode::Up => picker.select_prev(),
                KeyCode::Enter => {
                    let event = picker.chosen().map(|p| match picker.role {
                        PickRole::Bowler => ScoringEvent::SetBowler(p.id.clone()),
                        PickRole::Striker => ScoringEvent::SetStriker(p.id.clone()),
                        PickRole::NonStriker => ScoringEvent::SetNonStriker(p.id.clone()),
                    });
                    self.state.picker = None;
                    if let Some(event) = event {
                        self.apply_event(event);
                    }
                }
                KeyCode::Esc => self.state.picker = None,
                _ => {}
            }
            return;
        }

        let break_pending = self
            .state
            .current
            .as_ref()
            .is_some_and(|m| m.innings_break_pending());

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = true,
            KeyCode::Char('h') => self.state.screen = Screen::History,
            KeyCode::Char(c @ ('0' | '1' | '2' | '3' | '4' | '6')) => {
                self.apply_event(ScoringEvent::Runs(c as u8 - b'0'));
            }
            KeyCode::Char('w') => self.apply_event(ScoringEvent::Extra(ExtraKind::Wide)),
            KeyCode::Char('n') => self.apply_event(ScoringEvent::Extra(ExtraKind::NoBall)),
            KeyCode::Char('x') => self.apply_event(ScoringEvent::Wicket),
            KeyCode::Char('v') => {
                self.apply_event(ScoringEvent::Warning(WarningKind::FirstBounce));
            }
            KeyCode::Char('u') => self.apply_event(ScoringEvent::Undo),
            KeyCode::Char('r') => self.apply_event(ScoringEvent::Reset),
            KeyCode::Char('o') => self.open_picker(PickRole::Bowler),
            KeyCode::Char('s') => self.open_picker(PickRole::Striker),
            KeyCode::Char('S') => self.open_picker(PickRole::NonStriker),
            KeyCode::Enter if break_pending => {
                self.apply_event(ScoringEvent::StartSecondInnings);
            }
            _ => {}
        }
    }

    fn on_history_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_history_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_history_prev(),
            KeyCode::Char('e') => self.export_selected(),
            KeyCode::Char('b') | KeyCode::Esc => {
                self.state.screen = if self.state.current.is_some() {
                    Screen::Live
                } else {
                    Screen::Setup
                };
            }
            _ => {}
        }
    }

    fn open_picker(&mut self, role: PickRole) {
        let Some(current) = &self.state.current else {
            return;
        };
        if current.is_match_over {
            return;
        }
        self.state.picker = Some(RolePicker::open(role, current));
    }

    fn export_selected(&mut self) {
        let Some(record) = self.state.selected_record().cloned() else {
            self.state.push_log("[INFO] No match selected for export");
            return;
        };
        match export::export_scorecard(&record, &self.export_dir) {
            Ok(path) => self
                .state
                .push_log(format!("[INFO] Scorecard written to {}", path.display())),
            Err(err) => self.state.push_log(format!("[WARN] Export failed: {err:#}")),
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (sync_tx, sync_rx) = mpsc::channel();
    let mut app = App::new(sync_tx);
    let res = run_app(&mut terminal, &mut app, sync_rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    sync_rx: mpsc::Receiver<String>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(note) = sync_rx.try_recv() {
            app.state.push_log(note);
        }

        app.state.toss.tick(Instant::now());

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(header_text(&app.state))
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Setup => render_setup(frame, chunks[1], &app.state),
        Screen::Toss => render_toss(frame, chunks[1], &app.state),
        Screen::Live => render_live(frame, chunks[1], &app.state),
        Screen::History => render_history(frame, chunks[1], &app.state),
    }

    let footer =
        Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);

    if let Some(picker) = &app.state.picker {
        render_picker_overlay(frame, area, picker);
    }

    if app.state.help_overlay {
        render_help_overlay(frame, area);
    }
}

fn header_text(state: &AppState) -> String {
    let title = match state.screen {
        Screen::Setup => "CREASE SETUP".to_string(),
        Screen::Toss => "CREASE TOSS".to_string(),
        Screen::Live => match &state.current {
            Some(m) => format!(
                "CREASE LIVE | {} vs {} | Innings {}",
                m.team1.name, m.team2.name, m.current_innings
            ),
            None => "CREASE LIVE".to_string(),
        },
        Screen::History => "CREASE HISTORY".to_string(),
    };
    let line1 = format!("  .-.  {title}");
    let line2 = " (   )".to_string();
    let line3 = "  `-'".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    if state.picker.is_some() {
        return "j/k/↑/↓ Move | Enter Assign | Esc Cancel".to_string();
    }
    match state.screen {
        Screen::Setup => {
            "Tab/↑/↓ Field | Enter Next (on Overs: start) | Ctrl-n Add player | Ctrl-r Remove | F1 Help | Esc Quit"
                .to_string()
        }
        Screen::Toss => match state.toss.stage {
            TossStage::Call => "h Heads | t Tails | f/Enter Flip | Esc Back | q Quit".to_string(),
            TossStage::Decision => "b Bat | w Bowl | Enter Start Match | q Quit".to_string(),
            _ => "Flipping... | q Quit".to_string(),
        },
        Screen::Live => {
            let break_pending = state
                .current
                .as_ref()
                .is_some_and(|m| m.innings_break_pending());
            if break_pending {
                "Enter Start 2nd Innings | u Undo | r Reset | h History | ? Help | q Quit"
                    .to_string()
            } else {
                "0-4,6 Runs | w Wd | n Nb | x Wicket | v Warn | u Undo | o/s/S Reassign | r Reset | h History | ? Help | q Quit"
                    .to_string()
            }
        }
        Screen::History => "j/k Move | e Export CSV | b/Esc Back | q Quit".to_string(),
    }
}

fn render_setup(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(40),
            Constraint::Min(20),
        ])
        .split(area);

    let form = &state.setup;
    let marker = |field: SetupField| if form.field == field { "> " } else { "  " };

    let mut team1_lines = vec![format!(
        "{}Team name: {}",
        marker(SetupField::Team1Name),
        form.team1_name
    )];
    for (idx, name) in form.team1_players.iter().enumerate() {
        team1_lines.push(format!(
            "{}Player {}: {}",
            marker(SetupField::Team1Player(idx)),
            idx + 1,
            name
        ));
    }
    let team1 = Paragraph::new(team1_lines.join("\n"))
        .block(Block::default().title("Team 1").borders(Borders::ALL));
    frame.render_widget(team1, columns[0]);

    let mut team2_lines = vec![format!(
        "{}Team name: {}",
        marker(SetupField::Team2Name),
        form.team2_name
    )];
    for (idx, name) in form.team2_players.iter().enumerate() {
        team2_lines.push(format!(
            "{}Player {}: {}",
            marker(SetupField::Team2Player(idx)),
            idx + 1,
            name
        ));
    }
    let team2 = Paragraph::new(team2_lines.join("\n"))
        .block(Block::default().title("Team 2").borders(Borders::ALL));
    frame.render_widget(team2, columns[1]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(columns[2]);

    let overs = Paragraph::new(format!(
        "{}{}",
        marker(SetupField::Overs),
        form.overs_text
    ))
    .block(Block::default().title("Overs").borders(Borders::ALL));
    frame.render_widget(overs, side[0]);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, side[1]);
}

fn render_toss(frame: &mut Frame, area: Rect, state: &AppState) {
    let toss = &state.toss;
    let (team1, team2) = match &state.pending_setup {
        Some(setup) => (setup.team1_name.clone(), setup.team2_name.clone()),
        None => ("Team 1".to_string(), "Team 2".to_string()),
    };

    let mut lines = Vec::new();
    match toss.stage {
        TossStage::Call => {
            lines.push(format!("{team1}, make your call:"));
            lines.push(String::new());
            let mark = |face| if toss.team1_call == Some(face) { "[x]" } else { "[ ]" };
            lines.push(format!(
                "  {} heads    {} tails",
                mark(CoinFace::Heads),
                mark(CoinFace::Tails)
            ));
        }
        TossStage::Flipping { .. } => {
            lines.push("Flipping...".to_string());
            lines.push(String::new());
            lines.push("      _.-._".to_string());
            lines.push("     ( \\ / )".to_string());
            lines.push("      `-.-'".to_string());
        }
        TossStage::Result { .. } => {
            if let Some(face) = toss.result {
                lines.push(format!("It's {}!", face.label()));
            }
            if let Some(winner) = toss.winner {
                let name = match winner {
                    TeamSlot::Team1 => &team1,
                    TeamSlot::Team2 => &team2,
                };
                lines.push(format!("{name} won the toss!"));
            }
        }
        TossStage::Decision => {
            if let Some(winner) = toss.winner {
                let name = match winner {
                    TeamSlot::Team1 => &team1,
                    TeamSlot::Team2 => &team2,
                };
                lines.push(format!("{name}: bat or bowl first?"));
            }
            lines.push(String::new());
            let mark = |d| if toss.decision == Some(d) { "[x]" } else { "[ ]" };
            lines.push(format!(
                "  {} bat    {} bowl",
                mark(TossDecision::Bat),
                mark(TossDecision::Bowl)
            ));
            if toss.decision.is_some() {
                lines.push(String::new());
                lines.push("Press Enter to start the match.".to_string());
            }
        }
    }

    let body = Paragraph::new(lines.join("\n"))
        .block(Block::default().title("Coin Toss").borders(Borders::ALL));
    frame.render_widget(body, centered_rect(50, 40, area));
}

fn render_live(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(m) = &state.current else {
        let empty =
            Paragraph::new("No live match").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(6)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(36),
            Constraint::Min(30),
            Constraint::Length(32),
        ])
        .split(rows[0]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(1)])
        .split(columns[0]);

    let scoreboard = Paragraph::new(scoreboard_text(m))
        .block(Block::default().title("Scoreboard").borders(Borders::ALL));
    frame.render_widget(scoreboard, left[0]);

    let chase = Paragraph::new(chase_text(m))
        .block(Block::default().title("Chase").borders(Borders::ALL));
    frame.render_widget(chase, left[1]);

    let middle = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Min(1),
        ])
        .split(columns[1]);

    let batting = Paragraph::new(batting_text(m))
        .block(Block::default().title("Batting").borders(Borders::ALL));
    frame.render_widget(batting, middle[0]);

    let bowling = Paragraph::new(bowling_text(m))
        .block(Block::default().title("Bowling").borders(Borders::ALL));
    frame.render_widget(bowling, middle[1]);

    let this_over = Paragraph::new(this_over_text(m))
        .block(Block::default().title("This Over").borders(Borders::ALL));
    frame.render_widget(this_over, middle[2]);

    let overs = Paragraph::new(recent_overs_text(m))
        .block(Block::default().title("Recent Overs").borders(Borders::ALL));
    frame.render_widget(overs, columns[2]);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, rows[1]);

    let full = frame.size();
    if m.is_match_over {
        render_match_over_overlay(frame, full, m);
    } else if m.innings_break_pending() {
        render_innings_break_overlay(frame, full, m);
    }
}

fn scoreboard_text(m: &MatchState) -> String {
    let mut lines = vec![
        format!("{} are batting", m.batting_side().name),
        String::new(),
        format!("{} - {}", m.score, m.wickets),
        format!("Overs: {} ({})", m.overs_display(), m.total_overs),
        format!("Innings: {}", m.current_innings),
    ];
    if let Some(first) = m.first_innings_result {
        lines.push(format!(
            "1st innings: {}-{}",
            first.score, first.wickets
        ));
    }
    lines.join("\n")
}

fn chase_text(m: &MatchState) -> String {
    let Some(target) = m.target() else {
        return "First innings in progress".to_string();
    };
    if m.is_match_over {
        return m.match_over_message.clone();
    }
    let need = target.saturating_sub(m.score);
    let legal_bowled = m.current_over * 6 + m.current_ball as u32;
    let remaining = (m.total_overs * 6).saturating_sub(legal_bowled);
    format!("Target: {target}\nNeed {need} runs off {remaining} balls")
}

fn batting_text(m: &MatchState) -> String {
    let mut lines = Vec::new();
    let describe = |id: &Option<String>, star: &str| -> String {
        let Some(id) = id else {
            return format!("{star}-");
        };
        let name = m.player(id).map(|p| p.name.as_str()).unwrap_or(id);
        match m.batsman_stats.get(id) {
            Some(s) => format!(
                "{star}{name}  {} ({})  SR {:.2}",
                s.runs, s.balls, s.strike_rate
            ),
            None => format!("{star}{name}"),
        }
    };
    lines.push(describe(&m.striker_id, "* "));
    lines.push(describe(&m.non_striker_id, "  "));
    lines.join("\n")
}

fn bowling_text(m: &MatchState) -> String {
    let Some(id) = &m.bowler_id else {
        return "No bowler - press o to select".to_string();
    };
    let name = m.player(id).map(|p| p.name.as_str()).unwrap_or(id);
    match m.bowler_stats.get(id) {
        Some(s) => {
            let mut line = format!(
                "{name}  {}-{}-{}-{}  Econ {:.2}",
                s.overs_display(),
                s.maiden_overs,
                s.runs_conceded,
                s.wickets,
                s.economy
            );
            if s.first_bounce_warning {
                line.push_str("\nWarned: first bounce");
            }
            line
        }
        None => name.to_string(),
    }
}

fn this_over_text(m: &MatchState) -> String {
    if m.current_over_history.is_empty() {
        return "-".to_string();
    }
    m.current_over_history
        .iter()
        .map(|b| b.display.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn recent_overs_text(m: &MatchState) -> String {
    if m.all_overs_history.is_empty() {
        return "No completed overs yet".to_string();
    }
    let mut lines = Vec::new();
    for (idx, over) in m.all_overs_history.iter().enumerate().rev().take(12) {
        let runs: u32 = over.iter().map(|b| b.runs).sum();
        let balls = over
            .iter()
            .map(|b| b.display.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(format!("Ov {:>2}: {balls}  ({runs})", idx + 1));
    }
    lines.join("\n")
}

fn render_history(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Min(30)])
        .split(area);

    let list_text = if state.history.is_empty() {
        "No matches recorded yet".to_string()
    } else {
        state
            .history
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                let prefix = if idx == state.history_selected { "> " } else { "  " };
                let date = record
                    .completed_at
                    .split('T')
                    .next()
                    .unwrap_or(&record.completed_at);
                format!(
                    "{prefix}{date}  {} vs {}",
                    record.state.team1.name, record.state.team2.name
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let list = Paragraph::new(list_text)
        .block(Block::default().title("Match History").borders(Borders::ALL));
    frame.render_widget(list, columns[0]);

    let detail_text = match state.selected_record() {
        Some(record) => history_detail_text(record),
        None => "Select a match".to_string(),
    };
    let detail = Paragraph::new(detail_text)
        .block(Block::default().title("Summary").borders(Borders::ALL));
    frame.render_widget(detail, columns[1]);
}

fn history_detail_text(record: &persist::MatchRecord) -> String {
    let m = &record.state;
    let mut lines = vec![
        format!("{} vs {}", m.team1.name, m.team2.name),
        format!("Result: {}", m.match_over_message),
    ];
    if let Some(first) = m.first_innings_result {
        lines.push(format!(
            "{}: {}-{}",
            m.bowling_side().name,
            first.score,
            first.wickets
        ));
    }
    lines.push(format!(
        "{}: {}-{}",
        m.batting_side().name,
        m.score,
        m.wickets
    ));

    // Post-match highlights, derived from the stats maps.
    let top_scorer = m
        .batsman_stats
        .iter()
        .filter(|(_, s)| s.balls > 0)
        .max_by_key(|(_, s)| s.runs)
        .and_then(|(id, s)| m.player(id).map(|p| (p.name.clone(), s.runs)));
    if let Some((name, runs)) = top_scorer {
        lines.push(format!("Top scorer: {name} ({runs})"));
    }
    let best_bowler = m
        .bowler_stats
        .iter()
        .filter(|(_, s)| s.balls_delivered > 0)
        .max_by(|(_, a), (_, b)| {
            a.wickets
                .cmp(&b.wickets)
                .then(b.runs_conceded.cmp(&a.runs_conceded))
        })
        .and_then(|(id, s)| {
            m.player(id)
                .map(|p| (p.name.clone(), s.wickets, s.runs_conceded))
        });
    if let Some((name, wickets, conceded)) = best_bowler {
        lines.push(format!("Best bowler: {name} ({wickets}/{conceded})"));
    }
    lines.push(String::new());
    lines.push("e exports this scorecard as CSV".to_string());
    lines.join("\n")
}

fn console_text(state: &AppState) -> String {
    let lines: Vec<&str> = state
        .logs
        .iter()
        .rev()
        .take(4)
        .map(|s| s.as_str())
        .collect();
    lines
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_picker_overlay(frame: &mut Frame, area: Rect, picker: &RolePicker) {
    let rect = centered_rect(40, 50, area);
    frame.render_widget(Clear, rect);

    let lines = if picker.options.is_empty() {
        "No eligible players".to_string()
    } else {
        picker
            .options
            .iter()
            .enumerate()
            .map(|(idx, p)| {
                let prefix = if idx == picker.selected { "> " } else { "  " };
                format!("{prefix}{}", p.name)
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let body = Paragraph::new(lines)
        .block(Block::default().title(picker.role.title()).borders(Borders::ALL));
    frame.render_widget(body, rect);
}

fn render_innings_break_overlay(frame: &mut Frame, area: Rect, m: &MatchState) {
    let rect = centered_rect(50, 30, area);
    frame.render_widget(Clear, rect);
    let text = format!(
        "Innings over!\n\n{} finished on {}-{}.\nTarget for {}: {}\n\nPress Enter to start the second innings.",
        m.batting_side().name,
        m.score,
        m.wickets,
        m.bowling_side().name,
        m.score + 1
    );
    let body = Paragraph::new(text)
        .block(Block::default().title("Innings Break").borders(Borders::ALL))
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(body, rect);
}

fn render_match_over_overlay(frame: &mut Frame, area: Rect, m: &MatchState) {
    let rect = centered_rect(50, 30, area);
    frame.render_widget(Clear, rect);
    let text = format!(
        "Match Over\n\n{}\n\nr New match | h History | u Undo last ball",
        m.match_over_message
    );
    let body = Paragraph::new(text)
        .block(Block::default().title("Result").borders(Borders::ALL))
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(body, rect);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let rect = centered_rect(60, 70, area);
    frame.render_widget(Clear, rect);
    let text = [
        "Setup:   Tab/arrows move, Enter next field, Ctrl-n/Ctrl-r add/remove player",
        "Toss:    h/t call, f flip, b bat, w bowl, Enter start",
        "Live:    0 1 2 3 4 6 score runs off the bat",
        "         w wide, n no-ball (1 run, ball does not count)",
        "         x wicket, v first-bounce warning",
        "         o bowler, s striker, S non-striker reassignment",
        "         u undo last event, r reset match",
        "History: j/k move, e export CSV",
        "",
        "Any key closes this help.",
    ]
    .join("\n");
    let body = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL));
    frame.render_widget(body, rect);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
