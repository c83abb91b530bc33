use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{info, warn};

use crate::auth::AuthState;
use crate::builder::TemplateBuilder;
use crate::catalog::{Catalog, Exercise, MuscleGroup};
use crate::controller::SessionController;
use crate::error::{GymError, Result};
use crate::gateway::{PersistenceGateway, Subscription};
use crate::models::{UserProfile, WorkoutHistoryRecord, WorkoutTemplate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Dashboard,
    Catalog,
    Builder,
    Workout,
    History,
}

/// Which part of the builder form receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderField {
    Name,
    Duration,
    MuscleGroup,
    Exercises,
    Sets,
    Reps,
}

impl BuilderField {
    fn next(self) -> Self {
        match self {
            BuilderField::Name => BuilderField::Duration,
            BuilderField::Duration => BuilderField::MuscleGroup,
            BuilderField::MuscleGroup => BuilderField::Exercises,
            BuilderField::Exercises => BuilderField::Sets,
            BuilderField::Sets => BuilderField::Reps,
            BuilderField::Reps => BuilderField::Name,
        }
    }
}

/// Pending yes/no question shown on the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirm {
    CancelWorkout,
    DeleteTemplate { id: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Everything the dashboard needs, in one place.
pub struct App {
    gateway: Box<dyn PersistenceGateway>,
    pub catalog: Catalog,
    pub auth: AuthState,
    pub profile: UserProfile,
    pub controller: SessionController,
    pub builder: TemplateBuilder,
    pub state: AppState,
    pub templates: Vec<WorkoutTemplate>,
    pub history: Vec<WorkoutHistoryRecord>,
    template_sub: Option<Subscription<Vec<WorkoutTemplate>>>,
    history_sub: Option<Subscription<Vec<WorkoutHistoryRecord>>>,
    pub selected_template: usize,
    pub selected_exercise: usize,
    pub selected_catalog: usize,
    pub catalog_filter: Option<MuscleGroup>,
    catalog_return: AppState,
    pub builder_field: BuilderField,
    pub builder_selected: usize,
    pub history_scroll: usize,
    pub confirm_cancel: bool,
    pub confirm: Option<Confirm>,
    pub status: Option<StatusMessage>,
    pub should_quit: bool,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("state", &self.state)
            .field("auth", &self.auth)
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}

impl App {
    pub fn new(
        gateway: Box<dyn PersistenceGateway>,
        auth: AuthState,
        confirm_cancel: bool,
    ) -> Result<Self> {
        let catalog = Catalog::load()?;

        let (profile, template_sub, history_sub) = match auth.member() {
            Some(m) => (
                gateway.load_profile(&m.user_id, &m.display_name)?,
                Some(gateway.subscribe_templates(&m.user_id)?),
                Some(gateway.subscribe_history(&m.user_id)?),
            ),
            None => (UserProfile::default(), None, None),
        };

        let mut app = Self {
            gateway,
            catalog,
            auth,
            profile,
            controller: SessionController::new(),
            builder: TemplateBuilder::new(),
            state: AppState::Dashboard,
            templates: Vec::new(),
            history: Vec::new(),
            template_sub,
            history_sub,
            selected_template: 0,
            selected_exercise: 0,
            selected_catalog: 0,
            catalog_filter: None,
            catalog_return: AppState::Dashboard,
            builder_field: BuilderField::Name,
            builder_selected: 0,
            history_scroll: 0,
            confirm_cancel,
            confirm: None,
            status: None,
            should_quit: false,
        };
        app.refresh();
        Ok(app)
    }

    pub fn gateway(&self) -> &dyn PersistenceGateway {
        self.gateway.as_ref()
    }

    /// Pull the latest snapshots from the live subscriptions.
    pub fn refresh(&mut self) {
        if let Some(templates) = self.template_sub.as_ref().and_then(Subscription::try_next) {
            self.templates = templates;
        }
        if let Some(history) = self.history_sub.as_ref().and_then(Subscription::try_next) {
            self.history = history;
        }
        self.selected_template = clamp(self.selected_template, self.templates.len());
        self.history_scroll = clamp(self.history_scroll, self.history.len());
    }

    pub fn on_tick(&mut self) {
        self.controller.tick();
        self.refresh();
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        let result = if self.confirm.is_some() {
            self.on_confirm_key(key)
        } else {
            match self.state {
                AppState::Dashboard => self.on_dashboard_key(key),
                AppState::Catalog => self.on_catalog_key(key),
                AppState::Builder => self.on_builder_key(key),
                AppState::Workout => self.on_workout_key(key),
                AppState::History => self.on_history_key(key),
            }
        };

        if let Err(e) = result {
            self.set_error(&e);
        }
        self.refresh();
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    fn set_error(&mut self, err: &GymError) {
        let text = match err {
            GymError::NotLoggedIn => format!("{err} (restart with --user <ID>)"),
            _ => err.to_string(),
        };
        self.status = Some(StatusMessage {
            text,
            is_error: true,
        });
    }

    pub fn selected_template(&self) -> Option<&WorkoutTemplate> {
        self.templates.get(self.selected_template)
    }

    /// Whether the catalog was opened from the builder and picks go into the draft.
    pub fn catalog_adds_to_draft(&self) -> bool {
        self.catalog_return == AppState::Builder
    }

    /// Catalog entries under the current muscle-group filter.
    pub fn visible_catalog(&self) -> Vec<&Exercise> {
        match self.catalog_filter {
            Some(group) => self.catalog.by_muscle_group(group),
            None => self.catalog.all().iter().collect(),
        }
    }

    pub fn start_workout(&mut self, template: WorkoutTemplate) -> Result<()> {
        self.auth.require_member()?;
        if self.controller.is_running() {
            self.set_info(format!("Replaced the running workout with {}", template.name));
        } else {
            self.status = None;
        }
        self.controller.start(template);
        self.selected_exercise = 0;
        self.state = AppState::Workout;
        Ok(())
    }

    pub fn finish_workout(&mut self) -> Result<()> {
        self.auth.require_member()?;
        let report = self
            .controller
            .finish(self.gateway.as_ref(), &mut self.profile)?;

        let mut text = format!(
            "Saved {} ({}, {} exercises)",
            report.workout_name, report.duration, report.exercise_count
        );
        if !report.fully_synced() {
            text.push_str(" - counters will catch up later");
        }
        self.set_info(text);
        self.state = AppState::Dashboard;
        Ok(())
    }

    pub fn cancel_workout(&mut self) -> Result<()> {
        self.controller.cancel()?;
        self.set_info("Workout discarded");
        self.state = AppState::Dashboard;
        Ok(())
    }

    pub fn save_template(&mut self) -> Result<()> {
        let member = self.auth.require_member()?;
        let saved = self.builder.save(self.gateway.as_ref(), member)?;
        self.set_info(format!("Saved template {}", saved.name));
        self.builder = TemplateBuilder::new();
        self.state = AppState::Dashboard;
        Ok(())
    }

    fn open_builder(&mut self, builder: TemplateBuilder) -> Result<()> {
        self.auth.require_member()?;
        self.builder = builder;
        self.builder_field = BuilderField::Name;
        self.builder_selected = 0;
        self.status = None;
        self.state = AppState::Builder;
        Ok(())
    }

    fn open_catalog(&mut self, return_to: AppState) {
        self.catalog_return = return_to;
        self.selected_catalog = 0;
        self.state = AppState::Catalog;
    }

    fn on_confirm_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(confirm) = self.confirm.take() else {
            return Ok(());
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => match confirm {
                Confirm::CancelWorkout => self.cancel_workout(),
                Confirm::DeleteTemplate { id, name } => {
                    let member = self.auth.require_member()?;
                    self.gateway.delete_template(&member.user_id, &id)?;
                    info!(template_id = %id, "template deleted");
                    self.set_info(format!("Deleted {name}"));
                    Ok(())
                }
            },
            _ => {
                self.status = None;
                Ok(())
            }
        }
    }

    fn on_dashboard_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up => self.selected_template = self.selected_template.saturating_sub(1),
            KeyCode::Down => {
                self.selected_template = clamp(self.selected_template + 1, self.templates.len())
            }
            KeyCode::Enter | KeyCode::Char('s') => {
                if let Some(t) = self.selected_template().cloned() {
                    self.start_workout(t)?;
                }
            }
            KeyCode::Char('w') if self.controller.is_running() => self.state = AppState::Workout,
            KeyCode::Char('n') => self.open_builder(TemplateBuilder::new())?,
            KeyCode::Char('e') => {
                if let Some(t) = self.selected_template().cloned() {
                    self.open_builder(TemplateBuilder::edit(t))?;
                }
            }
            KeyCode::Char('d') => {
                self.auth.require_member()?;
                if let Some(t) = self.selected_template() {
                    let (id, name) = (t.id.clone(), t.name.clone());
                    self.set_info(format!("Delete {name}? (y/n)"));
                    self.confirm = Some(Confirm::DeleteTemplate { id, name });
                }
            }
            KeyCode::Char('c') => self.open_catalog(AppState::Dashboard),
            KeyCode::Char('h') => {
                self.history_scroll = 0;
                self.state = AppState::History;
            }
            _ => {}
        }
        Ok(())
    }

    fn on_catalog_key(&mut self, key: KeyEvent) -> Result<()> {
        let visible = self.visible_catalog().len();
        match key.code {
            KeyCode::Esc | KeyCode::Char('b') => self.state = self.catalog_return,
            KeyCode::Up => self.selected_catalog = self.selected_catalog.saturating_sub(1),
            KeyCode::Down => self.selected_catalog = clamp(self.selected_catalog + 1, visible),
            KeyCode::Right | KeyCode::Char('g') => {
                self.catalog_filter = match self.catalog_filter {
                    None => Some(MuscleGroup::ALL[0]),
                    Some(g) if g == MuscleGroup::ALL[MuscleGroup::ALL.len() - 1] => None,
                    Some(g) => Some(g.next()),
                };
                self.selected_catalog = 0;
            }
            KeyCode::Left => {
                self.catalog_filter = None;
                self.selected_catalog = 0;
            }
            KeyCode::Enter if self.catalog_adds_to_draft() => {
                let picked = self
                    .visible_catalog()
                    .get(self.selected_catalog)
                    .map(|e| (*e).clone());
                if let Some(exercise) = picked {
                    self.builder.add_exercise(&exercise);
                    self.builder_selected = self.builder.exercises.len() - 1;
                    self.set_info(format!("Added {}", exercise.name));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn on_builder_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
            return self.save_template();
        }

        match key.code {
            KeyCode::Esc => {
                self.builder = TemplateBuilder::new();
                self.state = AppState::Dashboard;
            }
            KeyCode::Tab => self.builder_field = self.builder_field.next(),
            KeyCode::Up => self.builder_selected = self.builder_selected.saturating_sub(1),
            KeyCode::Down => {
                self.builder_selected =
                    clamp(self.builder_selected + 1, self.builder.exercises.len())
            }
            _ => match self.builder_field {
                BuilderField::Name => edit_text(&mut self.builder.name, key.code),
                BuilderField::Duration => edit_text(&mut self.builder.duration_label, key.code),
                BuilderField::MuscleGroup => {
                    if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                        let current = MuscleGroup::ALL
                            .into_iter()
                            .find(|g| g.to_string() == self.builder.muscle_group);
                        let next = current.map_or(MuscleGroup::ALL[0], MuscleGroup::next);
                        self.builder.set_muscle_group(next);
                    }
                }
                BuilderField::Exercises => match key.code {
                    KeyCode::Char('a') | KeyCode::Enter => self.open_catalog(AppState::Builder),
                    KeyCode::Char('x') | KeyCode::Delete | KeyCode::Backspace => {
                        self.builder.remove_exercise(self.builder_selected);
                        self.builder_selected =
                            clamp(self.builder_selected, self.builder.exercises.len());
                    }
                    _ => {}
                },
                BuilderField::Sets => {
                    if let Some(ex) = self.builder.exercises.get_mut(self.builder_selected) {
                        edit_text(&mut ex.sets, key.code);
                    }
                }
                BuilderField::Reps => {
                    if let Some(ex) = self.builder.exercises.get_mut(self.builder_selected) {
                        edit_text(&mut ex.reps, key.code);
                    }
                }
            },
        }
        Ok(())
    }

    fn on_workout_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(session) = self.controller.session() else {
            self.state = AppState::Dashboard;
            return Ok(());
        };
        let count = session.template.exercises.len();

        match key.code {
            KeyCode::Esc => self.state = AppState::Dashboard,
            KeyCode::Up => self.selected_exercise = self.selected_exercise.saturating_sub(1),
            KeyCode::Down => self.selected_exercise = clamp(self.selected_exercise + 1, count),
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.controller.toggle_exercise_complete(self.selected_exercise)
            }
            KeyCode::Char('f') => {
                if let Err(e) = self.finish_workout() {
                    warn!(error = %e, "finish failed");
                    return Err(e);
                }
            }
            KeyCode::Char('c') => {
                if self.confirm_cancel {
                    self.set_info("Discard this workout? (y/n)");
                    self.confirm = Some(Confirm::CancelWorkout);
                } else {
                    self.cancel_workout()?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn on_history_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('b') => self.state = AppState::Dashboard,
            KeyCode::Up => self.history_scroll = self.history_scroll.saturating_sub(1),
            KeyCode::Down => self.history_scroll = clamp(self.history_scroll + 1, self.history.len()),
            KeyCode::Home => self.history_scroll = 0,
            _ => {}
        }
        Ok(())
    }
}

/// Keep a cursor inside a list of `len` items.
fn clamp(idx: usize, len: usize) -> usize {
    idx.min(len.saturating_sub(1))
}

fn edit_text(field: &mut String, code: KeyCode) {
    match code {
        KeyCode::Char(c) => field.push(c),
        KeyCode::Backspace => {
            field.pop();
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Member;
    use crate::store::SqliteGateway;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.on_key(key(KeyCode::Char(c)));
        }
    }

    fn logged_in() -> App {
        let auth = AuthState::LoggedIn(Member {
            user_id: "u1".into(),
            display_name: "Dee".into(),
        });
        App::new(
            Box::new(SqliteGateway::open_in_memory().unwrap()),
            auth,
            true,
        )
        .unwrap()
    }

    fn build_template(app: &mut App, name: &str) {
        app.on_key(key(KeyCode::Char('n')));
        type_str(app, name);
        app.on_key(key(KeyCode::Tab));
        type_str(app, "45 min");
        app.on_key(key(KeyCode::Tab));
        app.on_key(key(KeyCode::Tab));
        app.on_key(key(KeyCode::Char('a')));
        app.on_key(key(KeyCode::Enter));
        app.on_key(key(KeyCode::Down));
        app.on_key(key(KeyCode::Enter));
        app.on_key(key(KeyCode::Esc));
        app.on_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
    }

    #[test]
    fn test_new_app_starts_on_dashboard() {
        let app = logged_in();
        assert_eq!(app.state, AppState::Dashboard);
        assert!(app.templates.is_empty());
        assert_eq!(app.profile.display_name, "Dee");
    }

    #[test]
    fn test_builder_flow_saves_template() {
        let mut app = logged_in();
        build_template(&mut app, "Push");

        assert_eq!(app.state, AppState::Dashboard);
        assert_eq!(app.templates.len(), 1);
        assert_eq!(app.templates[0].name, "Push");
        assert_eq!(app.templates[0].duration_label, "45 min");
        assert_eq!(app.templates[0].exercises.len(), 2);
    }

    #[test]
    fn test_builder_validation_shows_error() {
        let mut app = logged_in();
        app.on_key(key(KeyCode::Char('n')));
        app.on_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));

        assert_eq!(app.state, AppState::Builder);
        let status = app.status.clone().unwrap();
        assert!(status.is_error);
        assert_eq!(status.text, "workout name is required");
        assert!(app.templates.is_empty());
    }

    #[test]
    fn test_workout_finish_flow() {
        let mut app = logged_in();
        build_template(&mut app, "Pull");

        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Workout);
        app.on_key(key(KeyCode::Char(' ')));
        for _ in 0..65 {
            app.on_tick();
        }
        app.on_key(key(KeyCode::Char('f')));

        assert_eq!(app.state, AppState::Dashboard);
        assert!(!app.controller.is_running());
        assert_eq!(app.history.len(), 1);
        assert_eq!(app.history[0].duration, "01:05");
        assert_eq!(app.history[0].exercise_count, 2);
        assert_eq!(app.profile.total_workouts, 1);
    }

    #[test]
    fn test_cancel_needs_confirmation() {
        let mut app = logged_in();
        build_template(&mut app, "Legs");
        app.on_key(key(KeyCode::Enter));

        app.on_key(key(KeyCode::Char('c')));
        assert!(app.controller.is_running());
        app.on_key(key(KeyCode::Char('n')));
        assert!(app.controller.is_running());
        assert_eq!(app.state, AppState::Workout);

        app.on_key(key(KeyCode::Char('c')));
        app.on_key(key(KeyCode::Char('y')));
        assert!(!app.controller.is_running());
        assert_eq!(app.state, AppState::Dashboard);
        assert!(app.history.is_empty());
    }

    #[test]
    fn test_leaving_workout_keeps_timer_running() {
        let mut app = logged_in();
        build_template(&mut app, "Core");
        app.on_key(key(KeyCode::Enter));
        app.on_key(key(KeyCode::Esc));
        app.on_tick();
        app.on_tick();

        assert_eq!(app.state, AppState::Dashboard);
        assert_eq!(app.controller.session().unwrap().elapsed_secs, 2);
        app.on_key(key(KeyCode::Char('w')));
        assert_eq!(app.state, AppState::Workout);
    }

    #[test]
    fn test_delete_template_with_confirmation() {
        let mut app = logged_in();
        build_template(&mut app, "Old");
        app.on_key(key(KeyCode::Char('d')));
        assert_eq!(app.templates.len(), 1);
        app.on_key(key(KeyCode::Char('y')));
        assert!(app.templates.is_empty());
    }

    #[test]
    fn test_logged_out_is_prompted_to_log_in() {
        let mut app = App::new(
            Box::new(SqliteGateway::open_in_memory().unwrap()),
            AuthState::LoggedOut,
            true,
        )
        .unwrap();

        app.on_key(key(KeyCode::Char('n')));
        assert_eq!(app.state, AppState::Dashboard);
        let status = app.status.clone().unwrap();
        assert!(status.is_error);
        assert!(status.text.starts_with("please log in first"));
    }

    #[test]
    fn test_catalog_filter_cycles() {
        let mut app = logged_in();
        app.on_key(key(KeyCode::Char('c')));
        assert_eq!(app.state, AppState::Catalog);
        assert_eq!(app.visible_catalog().len(), app.catalog.all().len());

        app.on_key(key(KeyCode::Char('g')));
        assert_eq!(app.catalog_filter, Some(MuscleGroup::Chest));
        assert!(app
            .visible_catalog()
            .iter()
            .all(|e| e.muscle_group == MuscleGroup::Chest));

        for _ in 0..MuscleGroup::ALL.len() {
            app.on_key(key(KeyCode::Char('g')));
        }
        assert_eq!(app.catalog_filter, None);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = logged_in();
        app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5, 3), 2);
        assert_eq!(clamp(0, 0), 0);
        assert_eq!(clamp(1, 3), 1);
    }
}
