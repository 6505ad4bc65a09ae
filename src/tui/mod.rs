//! TUI module - terminal viewer for stored weekly plans

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use std::io::{stdout, Stdout};

use crate::db::{Database, Submission};
use crate::planner::{DailySchedule, SlotEntry};

type Tui = Terminal<CrosstermBackend<Stdout>>;

const SUBMISSION_LIMIT: usize = 50;
const DAYS: u32 = 7;

/// App state for TUI
pub struct App {
    db: Database,
    submissions: Vec<Submission>,
    selected: usize,
    day: u32,
    schedule: Option<DailySchedule>,
    should_quit: bool,
}

impl App {
    pub fn new(db: Database) -> Result<Self> {
        let submissions = db.get_submissions(SUBMISSION_LIMIT)?;
        let mut app = Self {
            db,
            submissions,
            selected: 0,
            day: 0,
            schedule: None,
            should_quit: false,
        };
        app.load_schedule()?;
        Ok(app)
    }

    /// Start on a specific submission if it is among the recent ones
    pub fn select(&mut self, profile_id: i64) -> Result<()> {
        if let Some(pos) = self.submissions.iter().position(|s| s.id == profile_id) {
            self.selected = pos;
            self.load_schedule()?;
        }
        Ok(())
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }

        restore_terminal()?;
        Ok(())
    }

    fn load_schedule(&mut self) -> Result<()> {
        self.schedule = match self.submissions.get(self.selected) {
            Some(s) => self.db.get_schedule(s.id, self.day)?,
            None => None,
        };
        Ok(())
    }

    fn header_text(&self) -> String {
        match self.submissions.get(self.selected) {
            Some(s) => format!(
                "fitplan - plan #{} from {} | goal: {} | diet: {} | day {} of {}",
                s.id,
                s.reference_date,
                s.goal.as_deref().unwrap_or("fitness"),
                s.diet.as_deref().unwrap_or("non-vegetarian"),
                self.day,
                DAYS - 1
            ),
            None => "fitplan - no plans yet, run `fitplan plan`".to_string(),
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        // Header
        let header = Paragraph::new(self.header_text())
            .style(Style::default().fg(Color::Cyan).bold())
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        // Schedule table
        let rows: Vec<Row> = self
            .schedule
            .iter()
            .flat_map(|schedule| schedule.iter())
            .flat_map(|(key, entry)| schedule_rows(&key.to_string(), entry))
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(13),
                Constraint::Length(9),
                Constraint::Length(32),
                Constraint::Min(20),
            ],
        )
        .header(Row::new(vec!["Time", "Kind", "Name", "Detail"])
            .style(Style::default().bold()))
        .block(Block::default().borders(Borders::ALL).title("Schedule"));

        frame.render_widget(table, chunks[1]);

        // Footer
        let footer = Paragraph::new("q: quit | ←/→: day | ↑/↓: plan | r: reload")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[2]);
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => self.should_quit = true,
                        KeyCode::Left => self.move_day(-1)?,
                        KeyCode::Right => self.move_day(1)?,
                        KeyCode::Up => self.move_selection(-1)?,
                        KeyCode::Down => self.move_selection(1)?,
                        KeyCode::Char('r') => {
                            self.submissions = self.db.get_submissions(SUBMISSION_LIMIT)?;
                            self.selected = self.selected.min(self.submissions.len().saturating_sub(1));
                            self.load_schedule()?;
                        }
                        _ => {}
                    }
                }
        Ok(())
    }

    fn move_day(&mut self, delta: i32) -> Result<()> {
        self.day = (self.day as i32 + delta).rem_euclid(DAYS as i32) as u32;
        self.load_schedule()
    }

    fn move_selection(&mut self, delta: i32) -> Result<()> {
        if self.submissions.is_empty() {
            return Ok(());
        }
        let len = self.submissions.len() as i32;
        self.selected = (self.selected as i32 + delta).rem_euclid(len) as usize;
        self.load_schedule()
    }
}

/// One row per meal; a workout block expands to the block plus its exercises
fn schedule_rows(time: &str, entry: &SlotEntry) -> Vec<Row<'static>> {
    match entry {
        SlotEntry::Meal(meal) => vec![Row::new(vec![
            Cell::from(time.to_string()),
            Cell::from("meal"),
            Cell::from(meal.name.clone()),
            Cell::from(format!("{} kcal, P{} C{} F{} - {}", meal.calories, meal.protein, meal.carbs, meal.fat, meal.purpose)),
        ])],
        SlotEntry::Workout(block) => {
            let mut rows = vec![Row::new(vec![
                Cell::from(time.to_string()),
                Cell::from("workout"),
                Cell::from(block.name.clone()),
                Cell::from(block.warmup.clone()),
            ])
            .style(Style::default().fg(Color::Yellow))];
            rows.extend(block.details.iter().map(|d| {
                Row::new(vec![
                    Cell::from(""),
                    Cell::from(""),
                    Cell::from(format!("{} {}x{}", d.workout.name, d.workout.sets, d.workout.reps)),
                    Cell::from(d.instructions.clone()),
                ])
            }));
            rows
        }
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
