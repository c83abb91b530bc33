pub mod charting;
pub mod forms;
pub mod history;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::session::WorkoutSession;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

/// Draw the current screen plus the status line.
pub fn draw(app: &App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(f.area());

    screen::current_screen(&app.state).render(app, f, chunks[0]);
    render_status(app, f, chunks[1]);
}

fn render_status(app: &App, f: &mut Frame, area: Rect) {
    let Some(status) = &app.status else {
        return;
    };
    let style = if status.is_error {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };
    f.render_widget(
        Paragraph::new(Span::styled(status.text.clone(), style)).alignment(Alignment::Center),
        area,
    );
}

/// Template list plus member counters.
pub struct DashboardView<'a>(pub &'a App);

impl Widget for DashboardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let app = self.0;
        let bold_style = Style::default().add_modifier(Modifier::BOLD);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(3), // profile
                Constraint::Min(3),    // templates
                Constraint::Length(1), // legend
            ])
            .split(area);

        let who = match app.auth.member() {
            Some(m) => m.display_name.clone(),
            None => "not logged in".to_string(),
        };
        let mut header = vec![
            Span::styled(who, bold_style.fg(Color::Cyan)),
            Span::raw(format!(
                "   {} workouts   {} streak",
                app.profile.total_workouts, app.profile.current_streak
            )),
        ];
        if let Some(session) = app.controller.session() {
            header.push(Span::styled(
                format!(
                    "   ● {} {}",
                    session.template.name,
                    session.formatted_elapsed()
                ),
                Style::default().fg(Color::Green),
            ));
        }
        Paragraph::new(Line::from(header))
            .block(Block::default().borders(Borders::ALL).title("gymdash"))
            .render(chunks[0], buf);

        if app.templates.is_empty() {
            Paragraph::new("No workouts yet. Press (n) to build one.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray))
                .block(Block::default().borders(Borders::ALL).title("My Workouts"))
                .render(chunks[1], buf);
        } else {
            let rows: Vec<Row> = app
                .templates
                .iter()
                .enumerate()
                .map(|(idx, t)| {
                    let style = if idx == app.selected_template {
                        Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    Row::new(vec![
                        Cell::from(t.name.clone()),
                        Cell::from(t.muscle_group.clone()),
                        Cell::from(t.duration_label.clone()),
                        Cell::from(t.exercise_count().to_string()),
                    ])
                    .style(style)
                })
                .collect();

            let header = Row::new(vec!["Workout", "Focus", "Duration", "Exercises"]).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );

            Table::new(
                rows,
                [
                    Constraint::Min(16),
                    Constraint::Length(12),
                    Constraint::Length(12),
                    Constraint::Length(10),
                ],
            )
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("My Workouts"))
            .render(chunks[1], buf);
        }

        let legend = if app.controller.is_running() {
            "(enter) start  (w) back to workout  (n)ew  (e)dit  (d)elete  (c)atalog  (h)istory  (q)uit"
        } else {
            "(enter) start  (n)ew  (e)dit  (d)elete  (c)atalog  (h)istory  (q)uit"
        };
        Paragraph::new(Span::styled(
            legend,
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .render(chunks[2], buf);
    }
}

/// The running session: timer, progress and exercise checklist.
pub struct WorkoutView<'a> {
    pub session: &'a WorkoutSession,
    pub selected: usize,
}

impl Widget for WorkoutView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = self.session;
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let dim_style = Style::default().add_modifier(Modifier::DIM);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Length(3), // timer
                Constraint::Length(1), // progress
                Constraint::Min(1),    // checklist
                Constraint::Length(1), // legend
            ])
            .split(area);

        Paragraph::new(Span::styled(
            format!(
                "{}  ·  {}",
                session.template.name, session.template.muscle_group
            ),
            bold_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        let timer = session.formatted_elapsed();
        let padded = format!("{timer:^width$}", width = timer.width() + 4);
        Paragraph::new(Span::styled(padded, green_bold_style))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("elapsed"))
            .render(chunks[1], buf);

        let total = session.template.exercises.len();
        let done = session.completed_count();
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Magenta))
            .ratio(charting::completion_ratio(done, total))
            .label(format!("{done}/{total} done"))
            .render(chunks[2], buf);

        let lines: Vec<Line> = session
            .template
            .exercises
            .iter()
            .enumerate()
            .map(|(idx, ex)| {
                let complete = session.is_complete(idx);
                let mark = if complete { "[x]" } else { "[ ]" };
                let mut style = if complete { dim_style } else { Style::default() };
                if idx == self.selected {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                Line::from(Span::styled(
                    format!("{mark} {}  {} x {}", ex.name, ex.sets, ex.reps),
                    style,
                ))
            })
            .collect();

        let checklist = if lines.is_empty() {
            Paragraph::new("This workout has no exercises. Finish whenever you are done.")
        } else {
            Paragraph::new(lines)
        };
        checklist
            .block(Block::default().borders(Borders::ALL).title("Exercises"))
            .wrap(Wrap { trim: true })
            .render(chunks[3], buf);

        Paragraph::new(Span::styled(
            "(space) mark done  (f)inish  (c)ancel  (esc) dashboard",
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .render(chunks[4], buf);
    }
}

pub fn render_dashboard(app: &App, f: &mut Frame, area: Rect) {
    f.render_widget(DashboardView(app), area);
}

pub fn render_workout(app: &App, f: &mut Frame, area: Rect) {
    match app.controller.session() {
        Some(session) => f.render_widget(
            WorkoutView {
                session,
                selected: app.selected_exercise,
            },
            area,
        ),
        None => render_dashboard(app, f, area),
    }
}
