use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{BarChart, Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::models::WorkoutHistoryRecord;
use crate::ui::charting::daily_counts;
use crate::util::time_ago;

const CHART_DAYS: usize = 7;

/// Pure presenter for one history row
pub fn present_row(record: &WorkoutHistoryRecord, now: DateTime<Utc>) -> Row<'static> {
    let when = record.completed_at.with_timezone(&Local);
    Row::new(vec![
        Cell::from(record.workout_name.clone())
            .style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(record.muscle_group.clone()),
        Cell::from(record.duration.clone()).style(Style::default().fg(Color::Green)),
        Cell::from(record.exercise_count.to_string()),
        Cell::from(format!(
            "{} ({})",
            when.format("%Y-%m-%d %H:%M"),
            time_ago(record.completed_at, now)
        )),
    ])
}

/// Render the History screen
pub fn render_history(app: &App, f: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(8), // weekly chart
            Constraint::Min(0),    // records
            Constraint::Length(1), // instructions
        ])
        .split(area);

    let now = Utc::now();
    let counts = daily_counts(&app.history, now.with_timezone(&Local).date_naive(), CHART_DAYS);
    let bars: Vec<(&str, u64)> = counts.iter().map(|(l, c)| (l.as_str(), *c)).collect();
    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Last 7 days"),
        )
        .data(bars.as_slice())
        .bar_width(5)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Magenta))
        .value_style(Style::default().fg(Color::Black).bg(Color::Magenta));
    f.render_widget(chart, chunks[0]);

    if app.history.is_empty() {
        let no_data = Paragraph::new("No workouts logged yet. Finish a session to see it here.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(no_data, chunks[1]);
    } else {
        let header = Row::new(vec!["Workout", "Focus", "Time", "Exercises", "Completed"]).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let table_height = chunks[1].height.saturating_sub(3) as usize; // borders + header
        let rows: Vec<Row> = app
            .history
            .iter()
            .skip(app.history_scroll)
            .take(table_height)
            .map(|r| present_row(r, now))
            .collect();

        let widths = [
            Constraint::Min(16),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Min(28), // date + relative label
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("History ({} workouts)", app.history.len())),
            )
            .column_spacing(2);
        f.render_widget(table, chunks[1]);
    }

    let instructions = Paragraph::new("(↑/↓) scroll  (Home) top  (b/esc) back")
        .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use crate::auth::{AuthState, Member};
    use crate::models::{NewHistoryRecord, WorkoutTemplate};
    use crate::store::SqliteGateway;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen_lines(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buf = terminal.backend().buffer();
        let width = buf.area.width as usize;
        let symbols: Vec<&str> = buf.content().iter().map(|c| c.symbol()).collect();
        symbols.chunks(width).map(|row| row.concat()).collect()
    }

    #[test]
    fn test_history_screen_shows_finished_workout() {
        let auth = AuthState::LoggedIn(Member {
            user_id: "u1".into(),
            display_name: "Lee".into(),
        });
        let mut app = App::new(
            Box::new(SqliteGateway::open_in_memory().unwrap()),
            auth,
            true,
        )
        .unwrap();

        let template = WorkoutTemplate {
            id: "t".into(),
            user_id: "u1".into(),
            name: "Deadlift Day".into(),
            muscle_group: "Back".into(),
            duration_label: "50 min".into(),
            exercises: Vec::new(),
            created_at: Utc::now(),
        };
        let mut record = NewHistoryRecord::from_template(&template, "48:07".into());
        record.exercise_count = 7;
        app.gateway().create_history_record("u1", record).unwrap();
        app.refresh();
        app.state = AppState::History;

        let mut terminal = Terminal::new(TestBackend::new(110, 30)).unwrap();
        terminal
            .draw(|f| render_history(&app, f, f.area()))
            .unwrap();

        let lines = screen_lines(&terminal);
        let row = lines
            .iter()
            .find(|l| l.contains("Deadlift Day"))
            .expect("history row rendered");
        assert!(row.contains("Back"), "row: {row}");
        assert!(row.contains("48:07"), "row: {row}");
        assert!(row.contains(" 7 "), "row: {row}");
        assert!(row.contains("(just now)"), "row: {row}");
        assert!(!row.contains("now ago"), "row: {row}");
        assert!(lines.iter().any(|l| l.contains("History (1 workouts)")));
    }

    #[test]
    fn test_history_screen_empty_state() {
        let app = App::new(
            Box::new(SqliteGateway::open_in_memory().unwrap()),
            AuthState::LoggedOut,
            true,
        )
        .unwrap();

        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal
            .draw(|f| render_history(&app, f, f.area()))
            .unwrap();

        assert!(screen_lines(&terminal)
            .iter()
            .any(|l| l.contains("No workouts logged yet")));
    }
}
