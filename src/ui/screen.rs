use ratatui::{layout::Rect, Frame};

use crate::app::{App, AppState};
use crate::ui::{forms, history, render_dashboard, render_workout};

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect);
}

pub struct DashboardScreen;

impl Screen for DashboardScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        render_dashboard(app, f, area);
    }
}

/// Falls back to the dashboard when no session is running
pub struct WorkoutScreen;

impl Screen for WorkoutScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        render_workout(app, f, area);
    }
}

pub struct CatalogScreen;

impl Screen for CatalogScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        forms::render_catalog(app, f, area);
    }
}

pub struct BuilderScreen;

impl Screen for BuilderScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        forms::render_builder(app, f, area);
    }
}

pub struct HistoryScreen;

impl Screen for HistoryScreen {
    fn render(&self, app: &App, f: &mut Frame, area: Rect) {
        history::render_history(app, f, area);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Dashboard => Box::new(DashboardScreen),
        AppState::Workout => Box::new(WorkoutScreen),
        AppState::Catalog => Box::new(CatalogScreen),
        AppState::Builder => Box::new(BuilderScreen),
        AppState::History => Box::new(HistoryScreen),
    }
}
