use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Bracket),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Changes),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Bracket panning
        (MenuItem::Bracket, Char('l') | KeyCode::Right, _) => guard.state.view.pan(1, 0),
        (MenuItem::Bracket, Char('h') | KeyCode::Left, _) => guard.state.view.pan(-1, 0),
        (MenuItem::Bracket, Char('j') | KeyCode::Down, _) => guard.state.view.pan(0, 1),
        (MenuItem::Bracket, Char('k') | KeyCode::Up, _) => guard.state.view.pan(0, -1),
        (MenuItem::Bracket, Char('g'), _) => guard.state.view.reset_scroll(),

        // Change feed
        (MenuItem::Changes, Char('j') | KeyCode::Down, _) => guard.state.changes.scroll_down(),
        (MenuItem::Changes, Char('k') | KeyCode::Up, _) => guard.state.changes.scroll_up(),

        // Manual reload redraws from scratch
        (_, Char('r'), _) => {
            drop(guard);
            let _ = network_requests.send(NetworkRequest::LoadSnapshot).await;
        }

        // Global
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }
}
