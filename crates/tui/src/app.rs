use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line as TextLine, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use rotation_core::{
    export::{ExportEntry, ScheduleExporter},
    models::{Line, Station},
    print,
    registry::StationRegistry,
    rotation::{generate_schedule, LineRotation, Schedule},
    session::FormSession,
};
use tokio::sync::mpsc;
use tracing::{error, info};

const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    selection_fg: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            selection_fg: Color::White,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Form,
    Preview,
}

enum AppEvent {
    Input(Event),
    Tick,
}

struct Preview {
    schedule: Schedule,
    export: Option<ExportEntry>,
}

/// Station selection form and schedule preview.
pub struct RotationApp {
    registry: StationRegistry,
    lines: Vec<Line>,
    exporter: ScheduleExporter,
    session: FormSession,
    state: UiState,
    screen: Screen,
    preview: Option<Preview>,
    theme: Theme,
}

impl RotationApp {
    pub fn new(registry: StationRegistry, exporter: ScheduleExporter, today: NaiveDate) -> Self {
        let lines = registry.lines().collect();
        Self {
            registry,
            lines,
            exporter,
            session: FormSession::new(today),
            state: UiState::default(),
            screen: Screen::Form,
            preview: None,
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        self.state.set_status(format!(
            "Loaded {} lines • schedules are written to {}",
            self.lines.len(),
            self.exporter.root().display()
        ));

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }
            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                if let Err(err) = self.handle_input(event) {
                    self.state.set_status(format!("Error: {err}"));
                }
                true
            }
            Some(AppEvent::Tick) => {
                self.handle_tick(Local::now().date_naive());
                true
            }
            None => false,
        }
    }

    fn handle_tick(&mut self, today: NaiveDate) {
        if self.session.roll_over(today) {
            self.preview = None;
            self.screen = Screen::Form;
            self.state.station_cursor = 0;
            self.state
                .set_status("New day: station selections were cleared".to_string());
        }
    }

    fn handle_input(&mut self, event: Event) -> Result<()> {
        let Event::Key(key) = event else {
            return Ok(());
        };
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            self.state.should_quit = true;
            return Ok(());
        }
        match self.screen {
            Screen::Form => self.handle_form_key(key),
            Screen::Preview => self.handle_preview_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.state.should_quit = true;
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => self.move_line(-1),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => self.move_line(1),
            KeyCode::Down | KeyCode::Char('j') => self.move_station(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_station(-1),
            KeyCode::Home => self.state.station_cursor = 0,
            KeyCode::End => {
                self.state.station_cursor = self.current_stations().len().saturating_sub(1);
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => self.toggle_exclusion()?,
            KeyCode::Char('a') => self.toggle_accommodation()?,
            KeyCode::Char('c') => self.clear_current_line(),
            KeyCode::Enter | KeyCode::Char('g') => self.generate()?,
            _ => {}
        }
        Ok(())
    }

    fn handle_preview_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.state.should_quit = true;
            }
            KeyCode::Esc | KeyCode::Char('b') => {
                self.screen = Screen::Form;
                self.state.set_status("Back to station configuration".to_string());
            }
            _ => {}
        }
        Ok(())
    }

    fn current_line(&self) -> Option<Line> {
        self.lines.get(self.state.line_cursor).copied()
    }

    fn current_stations(&self) -> &[Station] {
        self.current_line()
            .and_then(|line| self.registry.stations_for(line).ok())
            .unwrap_or(&[])
    }

    fn current_station(&self) -> Option<Station> {
        self.current_stations().get(self.state.station_cursor).copied()
    }

    fn move_line(&mut self, delta: isize) {
        if self.lines.is_empty() {
            return;
        }
        let len = self.lines.len() as isize;
        let next = (self.state.line_cursor as isize + delta).rem_euclid(len);
        self.state.line_cursor = next as usize;
        let max = self.current_stations().len().saturating_sub(1);
        self.state.station_cursor = self.state.station_cursor.min(max);
    }

    fn move_station(&mut self, delta: isize) {
        let len = self.current_stations().len();
        if len == 0 {
            self.state.station_cursor = 0;
            return;
        }
        let next = (self.state.station_cursor as isize + delta).clamp(0, len as isize - 1);
        self.state.station_cursor = next as usize;
    }

    fn toggle_exclusion(&mut self) -> Result<()> {
        let Some(station) = self.current_station() else {
            return Ok(());
        };
        let excluded = self
            .session
            .selection
            .toggle_exclusion(&self.registry, station)?;
        let message = if excluded {
            format!("Station {station} marked unavailable")
        } else {
            format!("Station {station} back in rotation")
        };
        self.state.set_status(message);
        Ok(())
    }

    fn toggle_accommodation(&mut self) -> Result<()> {
        let Some(station) = self.current_station() else {
            return Ok(());
        };
        let accommodated = self
            .session
            .selection
            .toggle_accommodation(&self.registry, station)?;
        let message = if accommodated {
            format!("Station {station} needs accommodation today")
        } else {
            format!("Station {station} no longer needs accommodation")
        };
        self.state.set_status(message);
        Ok(())
    }

    fn clear_current_line(&mut self) {
        if let Some(line) = self.current_line() {
            self.session.selection.clear_line(line);
            self.state
                .set_status(format!("Cleared selections on {}", line.display_name()));
        }
    }

    fn generate(&mut self) -> Result<()> {
        let schedule = generate_schedule(
            &self.registry,
            &self.session.selection,
            self.session.date(),
        )?;
        schedule.ensure_printable()?;

        let export = match self.exporter.export(&schedule) {
            Ok(entry) => {
                info!(path = %entry.html_path.display(), "Schedule ready");
                self.state.set_status(format!(
                    "Schedule written to {}",
                    entry.html_path.display()
                ));
                Some(entry)
            }
            Err(err) => {
                error!(?err, "Schedule export failed");
                self.state
                    .set_status(format!("Schedule generated but export failed: {err}"));
                None
            }
        };
        self.preview = Some(Preview { schedule, export });
        self.screen = Screen::Preview;
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(8),
                Constraint::Length(3),
                Constraint::Length(4),
            ])
            .split(area);

        self.render_header(frame, chunks[0]);
        match self.screen {
            Screen::Form => self.draw_form(frame, chunks[1]),
            Screen::Preview => self.draw_preview(frame, chunks[1]),
        }
        self.render_help(frame, chunks[2]);
        self.render_status(frame, chunks[3]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let date = self.exporter.options().format_date(self.session.date());
        let lines = vec![
            TextLine::from(Span::styled(
                self.exporter.options().title.to_uppercase(),
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            TextLine::from(Span::styled(
                format!("Date: {date}"),
                Style::default().fg(self.theme.muted),
            )),
        ];
        let header = Paragraph::new(lines)
            .block(Block::default().borders(Borders::BOTTOM))
            .alignment(Alignment::Center);
        frame.render_widget(header, area);
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect) {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);
        self.render_line_list(frame, body[0]);
        self.render_station_list(frame, body[1]);
    }

    fn render_line_list(&self, frame: &mut Frame, area: Rect) {
        let selection = &self.session.selection;
        let items: Vec<ListItem> = self
            .lines
            .iter()
            .map(|line| {
                let down = selection.exclusions(*line).len();
                let mut spans = vec![
                    Span::styled(
                        line.display_name(),
                        Style::default()
                            .fg(self.theme.primary_fg)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  down: {down}"),
                        Style::default().fg(if down > 0 {
                            self.theme.danger
                        } else {
                            self.theme.muted
                        }),
                    ),
                ];
                if line.supports_accommodations() {
                    let accommodated = selection.accommodations().len();
                    spans.push(Span::styled(
                        format!("  accommodation: {accommodated}"),
                        Style::default().fg(if accommodated > 0 {
                            self.theme.warning
                        } else {
                            self.theme.muted
                        }),
                    ));
                }
                ListItem::new(TextLine::from(spans))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Lines"))
            .highlight_style(
                Style::default()
                    .bg(self.theme.selection_bg)
                    .fg(self.theme.selection_fg),
            )
            .highlight_symbol("▶ ");
        let mut list_state = ListState::default().with_selected(Some(self.state.line_cursor));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_station_list(&self, frame: &mut Frame, area: Rect) {
        let Some(line) = self.current_line() else {
            let empty = Paragraph::new("No lines configured")
                .block(Block::default().borders(Borders::ALL).title("Stations"));
            frame.render_widget(empty, area);
            return;
        };
        let selection = &self.session.selection;
        let items: Vec<ListItem> = self
            .current_stations()
            .iter()
            .map(|station| {
                let (marker, label, color) = if selection.is_accommodated(station) {
                    ("[A]", "accommodation", self.theme.warning)
                } else if selection.is_excluded(station) {
                    ("[x]", "unavailable", self.theme.danger)
                } else {
                    ("[ ]", "", self.theme.success)
                };
                ListItem::new(TextLine::from(vec![
                    Span::styled(format!("{marker} "), Style::default().fg(color)),
                    Span::styled(
                        format!("Station {:>2}", station.number),
                        Style::default().fg(self.theme.primary_fg),
                    ),
                    Span::styled(format!("  {label}"), Style::default().fg(color)),
                ]))
            })
            .collect();

        let title = if line.supports_accommodations() {
            format!("{} stations (space: down, a: accommodation)", line.display_name())
        } else {
            format!("{} stations (space: down)", line.display_name())
        };
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(
                Style::default()
                    .bg(self.theme.selection_bg)
                    .fg(self.theme.selection_fg)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        let mut list_state = ListState::default().with_selected(Some(self.state.station_cursor));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn draw_preview(&self, frame: &mut Frame, area: Rect) {
        let Some(preview) = &self.preview else {
            let empty = Paragraph::new("No schedule generated yet")
                .block(Block::default().borders(Borders::ALL).title("Schedule"));
            frame.render_widget(empty, area);
            return;
        };

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        for (column, column_area) in Line::COLUMNS.iter().zip(columns.iter()) {
            let lines: Vec<TextLine> = column
                .iter()
                .filter_map(|line| preview.schedule.line(*line))
                .flat_map(|rotation| self.rotation_lines(rotation))
                .collect();
            let paragraph = Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL).title("Schedule"))
                .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, *column_area);
        }
    }

    fn rotation_lines(&self, rotation: &LineRotation) -> Vec<TextLine<'static>> {
        let text = print::render_line_text(rotation);
        let last = text.len().saturating_sub(1);
        let mut lines: Vec<TextLine<'static>> = text
            .into_iter()
            .enumerate()
            .map(|(idx, content)| {
                let style = if idx == 0 {
                    Style::default()
                        .fg(self.theme.accent)
                        .add_modifier(Modifier::BOLD)
                } else if idx == last && !rotation.accommodations.is_empty() {
                    Style::default()
                        .fg(self.theme.warning)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(self.theme.primary_fg)
                };
                TextLine::from(Span::styled(content, style))
            })
            .collect();
        lines.push(TextLine::from(""));
        lines
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let help = match self.screen {
            Screen::Form => {
                "←/→ line  ↑/↓ station  space down  a accommodation (C)  c clear  g generate  q quit"
            }
            Screen::Preview => "esc/b back to form  q quit",
        };
        let paragraph = Paragraph::new(TextLine::from(Span::styled(
            help,
            Style::default().fg(self.theme.muted),
        )))
        .block(Block::default().borders(Borders::ALL).title("Keys"));
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let primary = self.state.status.clone();
        let secondary = match self.preview.as_ref().and_then(|p| p.export.as_ref()) {
            Some(entry) => format!("Last export: {}", entry.html_path.display()),
            None => format!("Output folder: {}", self.exporter.root().display()),
        };
        let paragraph = Paragraph::new(vec![TextLine::from(primary), TextLine::from(secondary)])
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

struct UiState {
    line_cursor: usize,
    station_cursor: usize,
    status: String,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            line_cursor: 0,
            station_cursor: 0,
            status: "Ready".to_string(),
            should_quit: false,
        }
    }
}

impl UiState {
    fn set_status(&mut self, message: String) {
        self.status = message;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use rotation_core::{print::PrintOptions, RotationError};
    use tempfile::{tempdir, TempDir};

    fn sample_app() -> (RotationApp, TempDir) {
        let dir = tempdir().expect("temp dir");
        let registry = StationRegistry::from_sizes([(Line::B, 5), (Line::C, 6)]);
        let exporter = ScheduleExporter::new(dir.path(), PrintOptions::default());
        let today = NaiveDate::from_ymd_opt(2024, 5, 6).expect("valid date");
        (RotationApp::new(registry, exporter, today), dir)
    }

    fn press(app: &mut RotationApp, code: KeyCode) -> Result<()> {
        app.handle_input(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn screen_text(app: &mut RotationApp) -> Result<String> {
        let mut terminal = Terminal::new(TestBackend::new(120, 40))?;
        terminal.draw(|frame| app.draw(frame))?;
        Ok(terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect())
    }

    #[test]
    fn space_marks_station_unavailable() -> Result<()> {
        let (mut app, _dir) = sample_app();
        press(&mut app, KeyCode::Down)?;
        press(&mut app, KeyCode::Down)?;
        press(&mut app, KeyCode::Char(' '))?;
        assert!(app.session.selection.is_excluded(&Station::new(Line::B, 3)));
        assert_eq!(app.state.status, "Station B3 marked unavailable");

        press(&mut app, KeyCode::Char(' '))?;
        assert!(app.session.selection.is_empty());
        Ok(())
    }

    #[test]
    fn accommodation_outside_line_c_is_reported() -> Result<()> {
        let (mut app, _dir) = sample_app();
        let err = press(&mut app, KeyCode::Char('a')).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RotationError>(),
            Some(RotationError::InvalidSelection { line: Line::B, .. })
        ));

        app.process_app_event(Some(AppEvent::Input(Event::Key(KeyEvent::new(
            KeyCode::Char('a'),
            KeyModifiers::NONE,
        )))));
        assert!(app.state.status.starts_with("Error: invalid selection on line B"));

        press(&mut app, KeyCode::Right)?;
        press(&mut app, KeyCode::Down)?;
        press(&mut app, KeyCode::Char('a'))?;
        assert!(app
            .session
            .selection
            .is_accommodated(&Station::new(Line::C, 2)));
        Ok(())
    }

    #[test]
    fn generate_writes_schedule_and_shows_preview() -> Result<()> {
        let (mut app, dir) = sample_app();
        press(&mut app, KeyCode::Down)?;
        press(&mut app, KeyCode::Down)?;
        press(&mut app, KeyCode::Char('x'))?;
        press(&mut app, KeyCode::Tab)?;
        press(&mut app, KeyCode::Char('a'))?;
        press(&mut app, KeyCode::Char('g'))?;

        assert_eq!(app.screen, Screen::Preview);
        let preview = app.preview.as_ref().expect("preview present");
        let entry = preview.export.as_ref().expect("export written");
        assert!(entry.html_path.starts_with(dir.path()));
        assert!(entry.html_path.exists());

        let screen = screen_text(&mut app)?;
        assert!(screen.contains("1-2  4-5"));
        assert!(screen.contains("Accommodation: 3"));

        press(&mut app, KeyCode::Esc)?;
        assert_eq!(app.screen, Screen::Form);
        Ok(())
    }

    #[test]
    fn empty_schedule_stays_on_form() -> Result<()> {
        let dir = tempdir()?;
        let registry = StationRegistry::from_sizes([(Line::M, 1)]);
        let exporter = ScheduleExporter::new(dir.path().join("out"), PrintOptions::default());
        let today = NaiveDate::from_ymd_opt(2024, 5, 6).expect("valid date");
        let mut app = RotationApp::new(registry, exporter, today);

        press(&mut app, KeyCode::Char(' '))?;
        let err = press(&mut app, KeyCode::Enter).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RotationError>(),
            Some(&RotationError::EmptySchedule)
        );
        assert_eq!(app.screen, Screen::Form);
        assert!(!dir.path().join("out").exists());
        Ok(())
    }

    #[test]
    fn new_day_resets_form() -> Result<()> {
        let (mut app, _dir) = sample_app();
        press(&mut app, KeyCode::Char(' '))?;
        press(&mut app, KeyCode::Char('g'))?;
        assert_eq!(app.screen, Screen::Preview);

        let today = app.session.date();
        app.handle_tick(today);
        assert_eq!(app.screen, Screen::Preview);

        app.handle_tick(today.succ_opt().expect("valid date"));
        assert_eq!(app.screen, Screen::Form);
        assert!(app.preview.is_none());
        assert!(app.session.selection.is_empty());
        Ok(())
    }

    #[test]
    fn form_lists_station_markers() -> Result<()> {
        let (mut app, _dir) = sample_app();
        press(&mut app, KeyCode::Char(' '))?;
        let screen = screen_text(&mut app)?;
        assert!(screen.contains("STATION ROTATION"));
        assert!(screen.contains("Date: 05/06/2024"));
        assert!(screen.contains("[x] Station  1"));
        assert!(screen.contains("down: 1"));
        Ok(())
    }
}
