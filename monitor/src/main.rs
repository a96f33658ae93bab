use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dotenv::dotenv;
use moment_tracker_common::{
    Category, FeedConfig, FetchOrchestrator, FetchOutcome, MomentFeedClient, PublishedState,
};
use ratatui::{
    prelude::*,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Paragraph},
};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

struct App {
    feed_url: String,
    state: PublishedState,
    in_flight: usize,
    scroll: u16,
}

impl App {
    fn new(feed_url: String) -> Self {
        Self {
            feed_url,
            state: PublishedState::new(),
            in_flight: 0,
            scroll: 0,
        }
    }

    fn max_scroll(&self) -> u16 {
        self.state
            .snapshot()
            .map(|s| s.records.len() as u16)
            .unwrap_or(0)
            .saturating_sub(1)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = FeedConfig::from_env();
    let client = MomentFeedClient::new(&config)?;
    let feed_url = client.url().to_string();
    let (orchestrator, outcomes) = FetchOrchestrator::new(Arc::new(client));

    // Terminal initialization
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, orchestrator, outcomes, App::new(feed_url));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    orchestrator: FetchOrchestrator,
    mut outcomes: UnboundedReceiver<FetchOutcome>,
    mut app: App,
) -> Result<()> {
    loop {
        // Apply every completed cycle before drawing; a failed cycle keeps
        // the previous list and chart on screen.
        while let Ok(outcome) = outcomes.try_recv() {
            app.in_flight = app.in_flight.saturating_sub(1);
            app.state.apply(outcome);
        }

        terminal.draw(|f| ui(f, &app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        // Exit
                        KeyCode::Char('q') => break,
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            break;
                        }
                        // Refresh; pressing again before the reply lands
                        // just races another fetch
                        KeyCode::Char('r') | KeyCode::Enter => {
                            orchestrator.trigger();
                            app.in_flight += 1;
                        }
                        // Scrolling
                        KeyCode::Up => {
                            app.scroll = app.scroll.saturating_sub(1);
                        }
                        KeyCode::Down => {
                            if app.scroll < app.max_scroll() {
                                app.scroll += 1;
                            }
                        }
                        KeyCode::PageUp => {
                            app.scroll = app.scroll.saturating_sub(10);
                        }
                        KeyCode::PageDown => {
                            app.scroll = std::cmp::min(app.scroll + 10, app.max_scroll());
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Status line
            Constraint::Length(12), // Bar chart
            Constraint::Min(0),     // Record list
        ])
        .split(f.size());

    let status_widget = Paragraph::new(status_line(app))
        .block(Block::default().borders(Borders::ALL).title("Moment Feed"));
    f.render_widget(status_widget, chunks[0]);

    let data: Vec<(&str, u64)> = match app.state.snapshot() {
        Some(snapshot) => snapshot
            .counts
            .iter()
            .map(|(category, count)| (category.label(), count))
            .collect(),
        None => Category::ALL.iter().map(|c| (c.label(), 0)).collect(),
    };

    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title("Moments"))
        .data(&data)
        .bar_width(7)
        .bar_gap(2);
    f.render_widget(chart, chunks[1]);

    let records_widget = Paragraph::new(record_rows(app))
        .block(Block::default().borders(Borders::ALL).title("History"))
        .scroll((app.scroll, 0));
    f.render_widget(records_widget, chunks[2]);
}

fn status_line(app: &App) -> String {
    let mut parts = vec![format!("feed: {}", app.feed_url)];

    if app.in_flight > 0 {
        parts.push(format!("{} fetch(es) in flight", app.in_flight));
    }

    match app.state.snapshot() {
        Some(snapshot) => parts.push(format!(
            "fetched at {}",
            snapshot.fetched_at.format("%H:%M:%S")
        )),
        None => parts.push("press r to fetch".to_string()),
    }

    if let Some(error) = app.state.last_error() {
        parts.push(format!("last error: {}", error));
    }

    parts.join("  |  ")
}

fn record_rows(app: &App) -> Vec<Line<'static>> {
    match app.state.snapshot() {
        Some(snapshot) if !snapshot.records.is_empty() => snapshot
            .records
            .iter()
            .map(|record| {
                Line::from(vec![
                    Span::styled(
                        format!("{:<10}", record.state),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(format!(
                        "{}  {}  {}",
                        record.entity_id, record.last_changed, record.last_updated
                    )),
                ])
            })
            .collect(),
        Some(_) => vec![Line::from("the history feed returned no records")],
        None => vec![Line::from("no history yet")],
    }
}
