use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use tourneyview_engine::{Bracket, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkRequest {
    /// Startup or manual reload; the result is drawn from scratch.
    LoadSnapshot,
    /// Periodic poll; the result is reconciled against what is on screen.
    RefreshSnapshot,
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    SnapshotLoaded { bracket: Bracket, rebuild: bool },
    Error { error: Error },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    AnimationTick,
}
