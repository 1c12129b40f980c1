use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, ChangeKind, TICK_MS};
use crate::ui::layout::terminal_engine_options;
use log::{error, info};
use tourneyview_engine::{Bracket, BracketRenderer, Error, Field, PreviousRenderState};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Bracket,
    Changes,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    renderer: BracketRenderer,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let options = terminal_engine_options();

        let app = Self {
            state: AppState::new(options.swiss),
            renderer: BracketRenderer::new(options),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    /// Runs the engine on a fresh snapshot. A failed render leaves the
    /// current view and the remembered render state untouched.
    pub fn on_snapshot_loaded(&mut self, bracket: Bracket, rebuild: bool) {
        if rebuild {
            self.renderer.reset();
        }

        let outcome = match self.renderer.set_data(&bracket) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.on_error(e.into());
                return;
            }
        };
        self.state.last_error = None;

        if outcome.reconciliation.rebuild {
            let title = format!("{} ({})", outcome.bracket_name, outcome.bracket_type.label());
            info!("Showing {title}");
            self.state.animation.restart_reveal();
            self.state.changes.push(ChangeKind::Rebuild { title, fields: outcome.reconciliation.actions.len() });
        }
        for action in outcome.reconciliation.updates() {
            self.state.changes.push(ChangeKind::Update(action.clone()));
        }

        let matches = bracket.match_groups.into_iter().flat_map(|g| g.matches);
        let updated = self.state.view.apply(outcome, matches);
        if updated > 0 {
            info!("{updated} field(s) updated");
        }
    }

    /// Shows the error over the current view, which stays as it was.
    pub fn on_error(&mut self, error: Error) {
        match &error {
            Error::Source(e) => error!("Snapshot error: {e}"),
            Error::Layout(e) => error!("Render failed: {e}"),
        }
        self.state.last_error = Some(error.to_string());
    }

    /// Current text of a field, as last rendered.
    pub fn field_text(&self, id: &str, field: Field) -> Option<&str> {
        self.renderer.state().text(id, field)
    }

    pub fn render_state(&self) -> &PreviousRenderState {
        self.renderer.state()
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        if self.state.active_tab == MenuItem::Changes {
            self.state.changes.scroll_offset = 0;
        }
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Animation tick, once per AnimationTick event
    // -----------------------------------------------------------------------

    pub fn advance_animation(&mut self) {
        self.state.animation.advance();
        self.state.view.highlights.decay();
        if self.state.view.is_swiss() {
            self.state.view.autoscroll.advance(TICK_MS as f64);
        }
    }
}
