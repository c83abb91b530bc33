use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, BuilderField};

fn field_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn text_field<'a>(label: &'a str, value: &str, active: bool) -> Paragraph<'a> {
    let cursor = if active { "▏" } else { "" };
    Paragraph::new(Line::from(vec![
        Span::raw(value.to_string()),
        Span::styled(cursor, Style::default().fg(Color::Yellow)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(label, field_style(active))),
    )
}

/// Render the template builder form
pub fn render_builder(app: &App, f: &mut Frame, area: Rect) {
    let draft = &app.builder;
    let field = app.builder_field;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // name
            Constraint::Length(3), // duration + focus
            Constraint::Min(3),    // exercises
            Constraint::Length(2), // instructions
        ])
        .split(area);

    f.render_widget(
        text_field("Name", &draft.name, field == BuilderField::Name),
        chunks[0],
    );

    let row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    f.render_widget(
        text_field(
            "Estimated duration",
            &draft.duration_label,
            field == BuilderField::Duration,
        ),
        row[0],
    );
    f.render_widget(
        text_field(
            "Focus (space to change)",
            &draft.muscle_group,
            field == BuilderField::MuscleGroup,
        ),
        row[1],
    );

    let exercises_active = matches!(
        field,
        BuilderField::Exercises | BuilderField::Sets | BuilderField::Reps
    );
    let items: Vec<ListItem> = draft
        .exercises
        .iter()
        .map(|ex| {
            let sets_style = field_style(field == BuilderField::Sets);
            let reps_style = field_style(field == BuilderField::Reps);
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<24}", ex.name)),
                Span::styled(format!(" sets: {}", ex.sets), sets_style),
                Span::styled(format!("  reps: {}", ex.reps), reps_style),
            ]))
        })
        .collect();

    let title = if draft.is_editing() {
        "Exercises (editing saved workout)"
    } else {
        "Exercises"
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title, field_style(exercises_active))),
        )
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(
        (!draft.exercises.is_empty()).then_some(app.builder_selected),
    );
    f.render_stateful_widget(list, chunks[2], &mut state);

    let instructions = Paragraph::new(
        "(tab) next field  (a) add from catalog  (x) remove  (↑/↓) select\n(ctrl+s) save  (esc) discard draft",
    )
    .alignment(Alignment::Center)
    .style(Style::default().add_modifier(Modifier::ITALIC))
    .wrap(Wrap { trim: true });
    f.render_widget(instructions, chunks[3]);
}

/// Render the exercise catalog
pub fn render_catalog(app: &App, f: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(3),    // list
            Constraint::Length(4), // detail
            Constraint::Length(1), // instructions
        ])
        .split(area);

    let visible = app.visible_catalog();
    let items: Vec<ListItem> = visible
        .iter()
        .map(|e| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<24}", e.name),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{:<10}", e.muscle_group.to_string()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(e.equipment.clone(), Style::default().fg(Color::Gray)),
            ]))
        })
        .collect();

    let filter = app
        .catalog_filter
        .map_or_else(|| "All".to_string(), |g| g.to_string());
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Exercises: {filter}")),
        )
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");
    let mut state =
        ListState::default().with_selected((!visible.is_empty()).then_some(app.selected_catalog));
    f.render_stateful_widget(list, chunks[0], &mut state);

    if let Some(ex) = visible.get(app.selected_catalog) {
        let detail = Paragraph::new(ex.description.clone())
            .block(Block::default().borders(Borders::ALL).title(ex.name.clone()))
            .wrap(Wrap { trim: true });
        f.render_widget(detail, chunks[1]);
    }

    let instructions = if app.catalog_adds_to_draft() {
        "(enter) add to workout  (g) next muscle group  (←) all  (esc) back"
    } else {
        "(g) next muscle group  (←) all  (esc) back"
    };
    f.render_widget(
        Paragraph::new(instructions).alignment(Alignment::Center),
        chunks[2],
    );
}

