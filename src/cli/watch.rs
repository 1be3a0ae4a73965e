//! Watch command implementation - Interactive TUI viewer.

use super::{CliError, PolicyArg};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use skirmish::rollout::{PolicyKind, TeamPolicies, run_episode};
use skirmish::{BattleWorld, Coord, ReplayEngine, Status, Team, TerrainCell, Unit};
use std::io::stdout;
use std::path::Path;
use std::time::{Duration, Instant};

/// Execute the watch command.
///
/// The episode is played to the end first, then viewed as a replay so the
/// viewer can step backwards.
///
/// # Errors
///
/// Returns an error if the episode or the TUI fails.
pub(crate) fn execute(
    config_path: Option<&Path>,
    seed: Option<u64>,
    max_steps: Option<u32>,
    left: PolicyArg,
    right: PolicyArg,
    speed: u64,
) -> Result<(), CliError> {
    let config = super::load_config(config_path, max_steps, None)?;
    let seed = super::seed_or_clock(seed);
    let (left, right) = (PolicyKind::from(left), PolicyKind::from(right));

    let mut world = BattleWorld::create(config)?;
    let mut policies = TeamPolicies::from_kinds(left, right, seed);
    let summary = run_episode(&mut world, seed, &mut policies)?;

    let engine = ReplayEngine::new(summary.to_recording(&config))?;
    let title = format!("Skirmish {} vs {} (seed {seed})", left.name(), right.name());
    run_tui(engine, title, speed)
}

/// App state for the TUI.
struct App {
    engine: ReplayEngine,
    title: String,
    paused: bool,
    speed_ms: u64,
    last_step: Instant,
}

impl App {
    fn new(engine: ReplayEngine, title: String, speed_ms: u64) -> Self {
        Self {
            engine,
            title,
            paused: true, // Start paused
            speed_ms,
            last_step: Instant::now(),
        }
    }

    fn step_forward(&mut self) {
        if !self.engine.is_finished() {
            let _ = self.engine.step_forward();
            self.last_step = Instant::now();
        }
    }

    fn step_backward(&mut self) {
        let _ = self.engine.step_backward();
        self.last_step = Instant::now();
    }

    fn jump(&mut self, step: u32) {
        let _ = self.engine.goto_step(step);
        self.paused = true;
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    fn increase_speed(&mut self) {
        self.speed_ms = self.speed_ms.saturating_sub(50).max(20);
    }

    fn decrease_speed(&mut self) {
        self.speed_ms = (self.speed_ms + 50).min(2000);
    }

    fn should_auto_step(&self) -> bool {
        !self.paused
            && !self.engine.is_finished()
            && self.last_step.elapsed() >= Duration::from_millis(self.speed_ms)
    }
}

/// Run the interactive viewer over a replay engine until the user quits.
///
/// The viewer opens paused on the engine's current step.
///
/// # Errors
///
/// Returns an error if the terminal cannot be driven.
pub(super) fn run_tui(engine: ReplayEngine, title: String, speed: u64) -> Result<(), CliError> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| CliError::new(e.to_string()))?;

    let mut app = App::new(engine, title, speed);

    loop {
        terminal
            .draw(|f| ui(f, &app))
            .map_err(|e| CliError::new(e.to_string()))?;

        if app.should_auto_step() {
            app.step_forward();
        }

        // Handle input with timeout
        if event::poll(Duration::from_millis(20))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char(' ') => app.toggle_pause(),
                KeyCode::Right | KeyCode::Char('l') => {
                    app.paused = true;
                    app.step_forward();
                }
                KeyCode::Left | KeyCode::Char('h') => {
                    app.paused = true;
                    app.step_backward();
                }
                KeyCode::Char('+' | '=') => app.increase_speed(),
                KeyCode::Char('-') => app.decrease_speed(),
                KeyCode::Char('r') | KeyCode::Home => app.jump(0),
                KeyCode::End => {
                    let last = app.engine.max_step();
                    app.jump(last);
                }
                _ => {}
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Main content
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    render_header(f, chunks[0], app);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(chunks[1]);

    render_map(f, main_chunks[0], app);
    render_stats(f, main_chunks[1], app);

    render_footer(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let world = app.engine.world();
    let status = if world.is_done() {
        "EPISODE OVER"
    } else if app.engine.is_finished() {
        "END OF RECORDING"
    } else if app.paused {
        "PAUSED"
    } else {
        "RUNNING"
    };

    let title = format!(
        " {} | Step {}/{} | {} | Speed: {}ms ",
        app.title,
        app.engine.step(),
        world.config().max_steps,
        status,
        app.speed_ms
    );

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

fn render_map(f: &mut Frame, area: Rect, app: &App) {
    let world = app.engine.world();
    let grid = world.grid();

    // Later roster entries win a shared cell, as in the text renderer.
    let mut occupant: Vec<Option<&Unit>> =
        vec![None; usize::from(grid.width()) * usize::from(grid.height())];
    for unit in world.units().iter().filter(|u| u.is_active()) {
        let pos = unit.pos();
        if let Some(slot) = occupant
            .get_mut(usize::from(pos.y) * usize::from(grid.width()) + usize::from(pos.x))
        {
            *slot = Some(unit);
        }
    }

    let visible_width = area.width.saturating_sub(2).min(grid.width());
    let visible_height = area.height.saturating_sub(2).min(grid.height());

    let mut lines: Vec<Line> = Vec::with_capacity(usize::from(visible_height));
    for y in 0..visible_height {
        let mut spans = Vec::with_capacity(usize::from(visible_width));
        for x in 0..visible_width {
            let index = usize::from(y) * usize::from(grid.width()) + usize::from(x);
            let span = match occupant.get(index).copied().flatten() {
                Some(unit) => unit_span(unit),
                None => terrain_span(grid.get(Coord::new(x, y))),
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }

    let map_widget =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Battlefield "));

    f.render_widget(map_widget, area);
}

fn terrain_span(cell: Option<TerrainCell>) -> Span<'static> {
    let (ch, color) = match cell {
        Some(TerrainCell::Obstacle) => ("X", Color::DarkGray),
        Some(TerrainCell::Hideout) => ("H", Color::Yellow),
        Some(TerrainCell::Hill) => (",", Color::Green),
        Some(TerrainCell::Plain) | None => (".", Color::Gray),
    };
    Span::styled(ch, Style::default().fg(color))
}

fn unit_span(unit: &Unit) -> Span<'static> {
    let (ch, base) = match unit.team {
        Team::Left => ("0", Color::Red),
        Team::Right => ("1", Color::Blue),
    };
    let style = match unit.status() {
        Status::Healthy => Style::default().fg(base).add_modifier(Modifier::BOLD),
        Status::Injured => Style::default().fg(base),
        Status::CriticallyInjured | Status::Captured => Style::default()
            .fg(base)
            .add_modifier(Modifier::DIM | Modifier::UNDERLINED),
    };
    Span::styled(ch, style)
}

fn team_color(team: Team) -> Color {
    match team {
        Team::Left => Color::Red,
        Team::Right => Color::Blue,
    }
}

fn render_stats(f: &mut Frame, area: Rect, app: &App) {
    let world = app.engine.world();
    let mut lines = vec![Line::from("")];

    for team in Team::ALL {
        let counters = world.counters(team);
        let mut by_status = [0usize; 4];
        let mut team_return = 0.0;
        for (unit, ret) in world.units().iter().zip(world.returns()) {
            if unit.team == team {
                by_status[usize::from(unit.status().code())] += 1;
                team_return += ret;
            }
        }

        lines.push(Line::from(Span::styled(
            format!("{} ", super::output::team_label(team)),
            Style::default()
                .fg(team_color(team))
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!(
            "  Healthy {}  Injured {}  Critical {}",
            by_status[0], by_status[1], by_status[2]
        )));
        lines.push(Line::from(format!("  Captured: {}", counters.captured)));
        lines.push(Line::from(format!(
            "  Kills: {}  Heals: {}",
            counters.kills, counters.heals
        )));
        lines.push(Line::from(format!("  Return: {team_return:.1}")));
        lines.push(Line::from(""));
    }

    let stats_widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Teams "))
        .wrap(Wrap { trim: false });

    f.render_widget(stats_widget, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let controls = if app.engine.is_finished() {
        " [q] Quit  [r] Restart  [←/→] Step  [End] Last step "
    } else {
        " [q] Quit  [Space] Pause  [←/→] Step  [+/-] Speed  [r] Restart  [End] Last step "
    };

    let footer = Paragraph::new(controls)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}
