use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, Borders, Clear, Gauge, Paragraph, Sparkline, Wrap,
};

use wc26_roster::config::{AppConfig, app_cache_dir, load_dotenv};
use wc26_roster::dashboard::{Dashboard, TopPerformer, format_metric_value};
use wc26_roster::export::{
    WORKBOOK_FILE_NAME, clipboard_sequence, export_roster_workbook, write_text_export,
};
use wc26_roster::player::{
    Player, count_or_zero, display_decimal, display_int, display_percent,
};
use wc26_roster::position::{category_cap, category_label, category_short_label};
use wc26_roster::provider::spawn_provider;
use wc26_roster::roster::{STARTER_CAPACITY, grouped_by_category};
use wc26_roster::session::load_or_create_session;
use wc26_roster::state::{AppState, BuilderFocus, Delta, ProviderCommand, Screen, apply_delta};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    export_dir: PathBuf,
}

impl App {
    fn new(config: &AppConfig, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        let session = load_or_create_session(app_cache_dir().as_deref());
        Self {
            state: AppState::new(session, &config.roster_name),
            should_quit: false,
            cmd_tx,
            export_dir: config.export_dir.clone(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.notice.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.state.dismiss_notice();
            }
            return;
        }
        if self.state.search_active {
            self.on_search_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Char('1') => self.state.screen = Screen::Builder,
            KeyCode::Char('2') => {
                self.state.screen = Screen::Dashboard;
                if self.state.dashboard.is_none() && !self.state.dashboard_loading {
                    self.request_dashboard();
                }
            }
            KeyCode::Char('r') => match self.state.screen {
                Screen::Dashboard => self.request_dashboard(),
                _ => self.request_catalog(),
            },
            _ => match self.state.screen {
                Screen::Builder => self.on_builder_key(key),
                Screen::Dashboard => {}
                Screen::PlayerDetail => {
                    if matches!(key.code, KeyCode::Char('b') | KeyCode::Esc) {
                        self.state.close_player_detail();
                    }
                }
            },
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.search_clear(),
            KeyCode::Enter => self.state.search_active = false,
            KeyCode::Backspace => self.state.search_pop(),
            KeyCode::Char(ch) => self.state.search_push(ch),
            _ => {}
        }
    }

    fn on_builder_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab => self.state.toggle_focus(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('/') => {
                self.state.focus = BuilderFocus::Pool;
                self.state.search_active = true;
            }
            KeyCode::Esc => self.state.search_clear(),
            KeyCode::Char('f') => self.state.cycle_category_filter(),
            KeyCode::Enter | KeyCode::Char('a') => match self.state.focus {
                BuilderFocus::Pool => self.state.add_selected(),
                BuilderFocus::Squad => self.state.toggle_selected_starter(),
            },
            KeyCode::Char('x') | KeyCode::Delete => {
                if self.state.focus == BuilderFocus::Squad {
                    self.state.remove_selected();
                }
            }
            KeyCode::Char('s') => {
                if self.state.focus == BuilderFocus::Squad {
                    self.state.toggle_selected_starter();
                }
            }
            KeyCode::Char('C') => self.state.clear_roster(),
            KeyCode::Char('d') => {
                if let Some(player_id) = self.state.open_player_detail() {
                    self.send(ProviderCommand::FetchPlayerForm { player_id }, None);
                }
            }
            KeyCode::Char('e') => self.export_text(),
            KeyCode::Char('y') => self.copy_to_clipboard(),
            KeyCode::Char('X') => self.export_workbook(),
            KeyCode::Char('w') => self.request_save(),
            KeyCode::Char('L') => {
                let session = self.state.session.clone();
                self.send(
                    ProviderCommand::LoadLatestRoster { session },
                    Some("[INFO] Loading saved roster"),
                );
            }
            _ => {}
        }
    }

    fn send(&mut self, cmd: ProviderCommand, announce: Option<&str>) -> bool {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[WARN] Provider unavailable");
            return false;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Provider request failed");
            return false;
        }
        if let Some(msg) = announce {
            self.state.push_log(msg);
        }
        true
    }

    fn request_catalog(&mut self) {
        if self.send(ProviderCommand::LoadCatalog, Some("[INFO] Loading players")) {
            self.state.catalog_loading = true;
            self.state.catalog_error = None;
        }
    }

    fn request_dashboard(&mut self) {
        if self.send(ProviderCommand::LoadDashboard, Some("[INFO] Loading dashboard")) {
            self.state.dashboard_loading = true;
            self.state.dashboard_error = None;
        }
    }

    fn request_save(&mut self) {
        if self.state.saving {
            return;
        }
        if self.state.roster.is_empty() {
            self.state.push_log("[INFO] Nothing to save yet");
            return;
        }
        let cmd = ProviderCommand::SaveRoster {
            session: self.state.session.clone(),
            name: self.state.roster_name.clone(),
            roster_id: self.state.roster_id.clone(),
            snapshot: self.state.roster.clone(),
        };
        if self.send(cmd, Some("[INFO] Saving roster")) {
            self.state.saving = true;
        }
    }

    fn export_text(&mut self) {
        if self.state.roster.is_empty() {
            self.state.push_log("[INFO] Nothing to export yet");
            return;
        }
        match write_text_export(&self.export_dir, self.state.roster.squad()) {
            Ok(path) => self
                .state
                .push_log(format!("[INFO] Exported to {}", path.display())),
            Err(err) => self.state.push_log(format!("[WARN] Export failed: {err:#}")),
        }
    }

    fn export_workbook(&mut self) {
        if self.state.roster.is_empty() {
            self.state.push_log("[INFO] Nothing to export yet");
            return;
        }
        let path = self.export_dir.join(WORKBOOK_FILE_NAME);
        match export_roster_workbook(&path, &self.state.roster) {
            Ok(rows) => self.state.push_log(format!(
                "[INFO] Workbook with {rows} players at {}",
                path.display()
            )),
            Err(err) => self
                .state
                .push_log(format!("[WARN] Workbook export failed: {err:#}")),
        }
    }

    fn copy_to_clipboard(&mut self) {
        if self.state.roster.is_empty() {
            self.state.push_log("[INFO] Nothing to copy yet");
            return;
        }
        let sequence = clipboard_sequence(self.state.roster.squad());
        let mut stdout = io::stdout();
        let written = stdout
            .write_all(sequence.as_bytes())
            .and_then(|_| stdout.flush());
        match written {
            Ok(()) => self.state.push_log("[INFO] Roster copied to clipboard"),
            Err(err) => self.state.push_log(format!("[WARN] Clipboard failed: {err}")),
        }
    }
}

fn main() -> io::Result<()> {
    load_dotenv();
    let config = AppConfig::from_env();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(config.clone(), tx, cmd_rx);

    let mut app = App::new(&config, Some(cmd_tx));
    app.request_catalog();
    let res = run_app(&mut terminal, &mut app, rx);

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
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
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
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Builder => render_builder(frame, chunks[1], &app.state),
        Screen::Dashboard => render_dashboard(frame, chunks[1], &app.state),
        Screen::PlayerDetail => render_player_detail(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::Gray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
    if let Some(notice) = &app.state.notice {
        render_notice(frame, frame.size(), notice);
    }
}

fn header_text(state: &AppState) -> String {
    let title = match state.screen {
        Screen::Builder => {
            let summary = state.summary();
            format!(
                "ROSTER BUILDER | {} | {}/{} | XI {}/{}",
                state.roster_name,
                summary.total,
                summary.capacity,
                summary.starters,
                STARTER_CAPACITY
            )
        }
        Screen::Dashboard => "USMNT DASHBOARD".to_string(),
        Screen::PlayerDetail => "PLAYER DETAIL".to_string(),
    };
    let line1 = format!("  .-.  {title}");
    let line2 = format!(" /___\\  session {}", state.session);
    let line3 = "  |_|".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    if state.search_active {
        return "Type to search | Enter Done | Esc Clear".to_string();
    }
    match state.screen {
        Screen::Builder => match state.focus {
            BuilderFocus::Pool => {
                "Tab Squad | j/k Move | Enter/a Add | / Search | f Filter | d Detail | w Save | e Export | y Copy | ? Help | q Quit".to_string()
            }
            BuilderFocus::Squad => {
                "Tab Pool | j/k Move | s Starter | x Remove | C Clear | d Detail | w Save | X Workbook | ? Help | q Quit".to_string()
            }
        },
        Screen::Dashboard => "1 Builder | r Refresh | ? Help | q Quit".to_string(),
        Screen::PlayerDetail => "b/Esc Back | 1 Builder | 2 Dashboard | q Quit".to_string(),
    }
}

fn render_builder(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(48), Constraint::Percentage(52)])
        .split(area);

    render_pool(frame, columns[0], state);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(columns[1]);

    let summary = state.summary();
    let gauge_color = if summary.is_complete {
        Color::Green
    } else {
        Color::Cyan
    };
    let gauge = Gauge::default()
        .block(Block::default().title("Squad").borders(Borders::ALL))
        .gauge_style(Style::default().fg(gauge_color))
        .percent(summary.progress_pct.min(100))
        .label(format!(
            "{}/{} players, {} open",
            summary.total, summary.capacity, summary.open_slots
        ));
    frame.render_widget(gauge, right[0]);

    let counts = summary
        .counts
        .iter()
        .map(|(category, n)| match category_cap(*category) {
            Some(cap) => format!("{} {n}/{cap}", category_short_label(*category)),
            None => format!("{} {n}", category_short_label(*category)),
        })
        .collect::<Vec<_>>()
        .join("  ");
    let counts = Paragraph::new(counts)
        .block(Block::default().title("Positions").borders(Borders::ALL));
    frame.render_widget(counts, right[1]);

    render_squad(frame, right[2], state);
}

fn focused_block(title: String, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(style)
}

fn render_pool(frame: &mut Frame, area: Rect, state: &AppState) {
    let filter = state
        .roster
        .filters
        .category
        .map(category_label)
        .unwrap_or("All");
    let search = &state.roster.filters.search;
    let title = if search.is_empty() && !state.search_active {
        format!("Players [{filter}]")
    } else {
        format!("Players [{filter}] /{search}")
    };
    let block = focused_block(title, state.focus == BuilderFocus::Pool);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.catalog_loading {
        frame.render_widget(Paragraph::new("Loading players..."), inner);
        return;
    }
    if let Some(err) = &state.catalog_error {
        let text = format!("{err}\n\nPress r to retry");
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
        return;
    }

    let pool = state.pool();
    if pool.is_empty() {
        let empty = Paragraph::new("No players match").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let visible = inner.height as usize;
    let (start, end) = visible_range(state.pool_selected, pool.len(), visible);
    let lines: Vec<Line> = (start..end)
        .map(|idx| {
            let p = pool[idx];
            let position = p.position.as_deref().unwrap_or("Unknown");
            let text = format!(
                "{:<24} {:<7} {:>3} apps {:>2} g",
                truncate(&p.full_name, 24),
                truncate(position, 7),
                count_or_zero(p.stats.matches_played),
                count_or_zero(p.stats.total_goals)
            );
            let style = if idx == state.pool_selected && state.focus == BuilderFocus::Pool {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Line::styled(text, style)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_squad(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = focused_block(
        "Selected (grouped)".to_string(),
        state.focus == BuilderFocus::Squad,
    );
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.roster.is_empty() {
        let empty = Paragraph::new("No players selected yet. Add from the pool.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    let mut selected_line = 0;
    let mut row = 0;
    for group in grouped_by_category(state.roster.squad()) {
        let heading = match category_cap(group.category) {
            Some(cap) => format!(
                "-- {} ({}/{cap})",
                category_label(group.category),
                group.players.len()
            ),
            None => format!(
                "-- {} ({})",
                category_label(group.category),
                group.players.len()
            ),
        };
        lines.push(Line::styled(
            heading,
            Style::default().add_modifier(Modifier::BOLD),
        ));
        for p in group.players {
            let marker = if state.roster.is_starter(p.id) {
                "*"
            } else {
                " "
            };
            let text = format!(
                "{marker} {:<26} {}",
                truncate(&p.full_name, 26),
                p.position_code()
            );
            let style = if row == state.squad_selected && state.focus == BuilderFocus::Squad {
                selected_line = lines.len();
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else if state.roster.is_starter(p.id) {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            lines.push(Line::styled(text, style));
            row += 1;
        }
    }

    let (start, end) = visible_range(selected_line, lines.len(), inner.height as usize);
    let window: Vec<Line> = lines.into_iter().skip(start).take(end - start).collect();
    frame.render_widget(Paragraph::new(window), inner);
}

fn render_dashboard(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(dashboard) = &state.dashboard else {
        let text = if state.dashboard_loading {
            "Loading dashboard...".to_string()
        } else if let Some(err) = &state.dashboard_error {
            format!("{err}\n\nPress r to retry")
        } else {
            "Press r to load the dashboard".to_string()
        };
        let paragraph = Paragraph::new(text)
            .block(Block::default().title("Dashboard").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Min(6),
        ])
        .split(area);

    let stats = Paragraph::new(team_stats_text(dashboard))
        .block(Block::default().title("Team").borders(Borders::ALL));
    frame.render_widget(stats, rows[0]);

    let performer_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(rows[1]);
    let perf = &dashboard.performers;
    render_performers(frame, performer_cols[0], "Top Scorers", &perf.top_scorers, 0);
    render_performers(frame, performer_cols[1], "Top Assists", &perf.top_assisters, 0);
    render_performers(frame, performer_cols[2], "Top Rated", &perf.top_rated, 2);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[2]);
    render_trends(frame, bottom[0], dashboard);

    let drivers = Paragraph::new(drivers_text(dashboard))
        .block(Block::default().title("Win/Loss Drivers").borders(Borders::ALL));
    frame.render_widget(drivers, bottom[1]);
}

fn team_stats_text(dashboard: &Dashboard) -> String {
    let t = &dashboard.team;
    [
        format!(
            "Matches {}   W {}  D {}  L {}   Clean sheets {}",
            t.matches_played, t.wins, t.draws, t.losses, t.clean_sheets
        ),
        format!(
            "Goals {}-{} ({:+})   Avg goals {:.2}",
            t.goals_for, t.goals_against, t.goal_difference, t.avg_goals_per_match
        ),
        format!(
            "Possession {}   Avg rating {}",
            display_percent(t.avg_possession),
            display_decimal(t.avg_player_rating, 2)
        ),
    ]
    .join("\n")
}

fn render_performers(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    rows: &[TopPerformer],
    decimals: usize,
) {
    let text = if rows.is_empty() {
        "No data".to_string()
    } else {
        rows.iter()
            .enumerate()
            .map(|(idx, p)| {
                format!(
                    "{}. {} ({}) {:.*}",
                    idx + 1,
                    truncate(&p.full_name, 18),
                    p.position,
                    decimals,
                    p.value
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let paragraph =
        Paragraph::new(text).block(Block::default().title(title.to_string()).borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn render_trends(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let block = Block::default().title("Results").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if dashboard.trends.is_empty() || inner.height < 4 {
        frame.render_widget(Paragraph::new("No finished matches"), inner);
        return;
    }

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(inner);

    let max_bars = (parts[0].width / 4).max(1) as usize;
    let start = dashboard.trends.len().saturating_sub(max_bars);
    let bars: Vec<Bar> = dashboard.trends[start..]
        .iter()
        .map(|t| {
            let color = match t.points {
                3 => Color::Green,
                1 => Color::Yellow,
                _ => Color::Red,
            };
            Bar::default()
                .value(u64::from(t.points))
                .label(Line::from(truncate(&t.opponent, 3)))
                .text_value(format!("{}-{}", t.goals_for, t.goals_against))
                .style(Style::default().fg(color))
        })
        .collect();
    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(3)
        .bar_gap(1)
        .max(3);
    frame.render_widget(chart, parts[0]);

    let goals: Vec<u64> = dashboard.trends[start..]
        .iter()
        .map(|t| t.goals_for.max(0) as u64)
        .collect();
    let sparkline = Sparkline::default()
        .block(Block::default().title("Goals for"))
        .data(&goals)
        .style(Style::default().fg(Color::Cyan));
    frame.render_widget(sparkline, parts[1]);
}

fn drivers_text(dashboard: &Dashboard) -> String {
    if dashboard.drivers.is_empty() {
        return "No data".to_string();
    }
    dashboard
        .drivers
        .iter()
        .map(|m| {
            let label = m
                .metric_label
                .as_deref()
                .or(m.metric_key.as_deref())
                .unwrap_or("-");
            format!(
                "{:<22} {:>8}",
                truncate(label, 22),
                format_metric_value(m.delta_win_loss, m.metric_key.as_deref())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_player_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(player) = state.detail_player() else {
        let empty = Paragraph::new("No player selected")
            .block(Block::default().title("Player").borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(40), Constraint::Min(30)])
        .split(area);

    let info = Paragraph::new(player_info_text(state, player))
        .block(Block::default().title(player.full_name.clone()).borders(Borders::ALL));
    frame.render_widget(info, columns[0]);

    let block = Block::default().title("Form").borders(Borders::ALL);
    let inner = block.inner(columns[1]);
    frame.render_widget(block, columns[1]);

    let Some(form) = &state.player_form else {
        frame.render_widget(Paragraph::new("No match timeline"), inner);
        return;
    };
    if form.timeline.is_empty() {
        frame.render_widget(Paragraph::new("No match timeline"), inner);
        return;
    }

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(1)])
        .split(inner);

    let ratings: Vec<u64> = form
        .timeline
        .iter()
        .map(|row| {
            row.match_rating
                .map(|r| (r * 10.0).round().max(0.0) as u64)
                .unwrap_or(0)
        })
        .collect();
    let sparkline = Sparkline::default()
        .block(Block::default().title("Match rating"))
        .data(&ratings)
        .style(Style::default().fg(Color::Green));
    frame.render_widget(sparkline, parts[0]);

    let start = form.timeline.len().saturating_sub(parts[1].height as usize);
    let lines = form.timeline[start..]
        .iter()
        .zip(&form.rating_trend[start..])
        .map(|(row, trend)| {
            let date = row
                .kickoff_utc
                .as_deref()
                .map(|k| k.get(..10).unwrap_or(k))
                .unwrap_or("-");
            format!(
                "{date} {:<14} rtg {:>4} avg {:>4} pass {:>6} def {:>4}",
                truncate(row.opponent_name.as_deref().unwrap_or("Unknown"), 14),
                display_decimal(row.match_rating, 1),
                display_decimal(*trend, 1),
                display_percent(row.pass_completion_pct),
                display_decimal(row.def_actions_per_90, 1)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    frame.render_widget(Paragraph::new(lines), parts[1]);
}

fn player_info_text(state: &AppState, player: &Player) -> String {
    let s = &player.stats;
    let status = if state.roster.is_starter(player.id) {
        "Starting XI"
    } else if state.roster.contains(player.id) {
        "In squad"
    } else {
        "Available"
    };
    [
        format!("Position   {}", player.position_code()),
        format!("Category   {}", category_label(player.category())),
        format!("Status     {status}"),
        String::new(),
        format!("Apps       {}", display_int(s.matches_played)),
        format!("Minutes    {}", display_int(s.total_minutes)),
        format!("Goals      {}", display_int(s.total_goals)),
        format!("Assists    {}", display_int(s.total_assists)),
        format!("Rating     {}", display_decimal(s.avg_match_rating, 2)),
        format!("Pass %     {}", display_percent(s.pass_completion_pct)),
        format!("Tkl/90     {}", display_decimal(s.tackles_per_90, 2)),
        format!("Int/90     {}", display_decimal(s.interceptions_per_90, 2)),
    ]
    .join("\n")
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('~');
    out
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_notice(frame: &mut Frame, area: Rect, notice: &str) {
    let popup_area = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup_area);
    let text = format!("{notice}\n\nPress Enter to continue");
    let popup = Paragraph::new(text)
        .block(Block::default().title("Notice").borders(Borders::ALL))
        .style(Style::default().fg(Color::Yellow))
        .wrap(Wrap { trim: true });
    frame.render_widget(popup, popup_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "WC26 Roster - Help",
        "",
        "Global:",
        "  1            Roster builder",
        "  2            Dashboard",
        "  r            Reload players / dashboard",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Builder:",
        "  Tab          Switch pool / squad",
        "  j/k or ↑/↓   Move",
        "  Enter / a    Add player (pool) or toggle starter (squad)",
        "  s            Toggle starter",
        "  x            Remove from squad",
        "  /            Search by name",
        "  f            Cycle position filter",
        "  C            Clear roster",
        "  d            Player detail",
        "  w            Save roster",
        "  L            Load last saved roster",
        "  e / y / X    Export text / copy / workbook",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
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
