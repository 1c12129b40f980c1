use crate::app::MenuItem;
use chrono::Local;
use std::collections::{HashMap, VecDeque};
use tourneyview_engine::swiss::{Autoscroller, SwissOptions};
use tourneyview_engine::{BracketView, Field, FieldAction, Match, RenderOutcome};

// ---------------------------------------------------------------------------
// Animation clock
// ---------------------------------------------------------------------------

/// Milliseconds per animation tick (80ms ≈ 12.5 FPS).
pub const TICK_MS: u64 = 80;

#[derive(Debug, Default)]
pub struct AnimationState {
    /// Monotonic tick counter.
    pub tick: u64,
    /// Time since the view was last rebuilt. Drives the staggered reveal.
    pub since_rebuild_ms: u64,
}

impl AnimationState {
    pub fn advance(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        self.since_rebuild_ms = self.since_rebuild_ms.saturating_add(TICK_MS);
    }

    pub fn restart_reveal(&mut self) {
        self.since_rebuild_ms = 0;
    }

    pub fn is_revealed(&self, delay_ms: u64) -> bool {
        self.since_rebuild_ms >= delay_ms
    }
}

// ---------------------------------------------------------------------------
// Update highlights
// ---------------------------------------------------------------------------

/// How long a changed field stays highlighted, in ticks (~2s).
pub const HIGHLIGHT_TICKS: u8 = 25;

/// Fields whose text changed recently, keyed like the engine keys them.
#[derive(Debug, Default)]
pub struct Highlights {
    remaining: HashMap<(String, Field), u8>,
}

impl Highlights {
    pub fn mark(&mut self, id: &str, field: Field) {
        self.remaining.insert((id.to_string(), field), HIGHLIGHT_TICKS);
    }

    pub fn is_active(&self, id: &str, field: Field) -> bool {
        self.remaining.contains_key(&(id.to_string(), field))
    }

    pub fn decay(&mut self) {
        self.remaining.retain(|_, ticks| {
            *ticks = ticks.saturating_sub(1);
            *ticks > 0
        });
    }

    pub fn clear(&mut self) {
        self.remaining.clear();
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }
}

// ---------------------------------------------------------------------------
// Change feed
// ---------------------------------------------------------------------------

pub const CHANGE_FEED_CAPACITY: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub enum ChangeKind {
    Rebuild { title: String, fields: usize },
    Update(FieldAction),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEntry {
    /// Local wall-clock time, `HH:MM:SS`.
    pub at: String,
    pub kind: ChangeKind,
}

/// Newest-first log of rebuilds and field updates.
#[derive(Debug, Default)]
pub struct ChangeFeed {
    entries: VecDeque<ChangeEntry>,
    pub scroll_offset: u16,
}

impl ChangeFeed {
    pub fn push(&mut self, kind: ChangeKind) {
        let at = Local::now().format("%H:%M:%S").to_string();
        self.entries.push_front(ChangeEntry { at, kind });
        self.entries.truncate(CHANGE_FEED_CAPACITY);
    }

    pub fn entries(&self) -> impl Iterator<Item = &ChangeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn scroll_down(&mut self) {
        let max = self.entries.len().saturating_sub(1) as u16;
        self.scroll_offset = (self.scroll_offset + 1).min(max);
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// Rendered view
// ---------------------------------------------------------------------------

/// Columns and rows moved per pan key press.
const PAN_STEP_X: i32 = 4;
const PAN_STEP_Y: i32 = 2;

#[derive(Debug)]
pub struct ViewState {
    /// Latest successful engine output. Kept as-is when a snapshot fails.
    pub outcome: Option<RenderOutcome>,
    /// Source matches of the shown group, for result styling.
    pub matches: HashMap<String, Match>,
    pub highlights: Highlights,
    /// Manual pan offset, in terminal cells.
    pub scroll_x: u16,
    pub scroll_y: u16,
    pub autoscroll: Autoscroller,
    pub last_loaded_at: Option<String>,
}

impl ViewState {
    pub fn new(swiss: SwissOptions) -> Self {
        Self {
            outcome: None,
            matches: HashMap::new(),
            highlights: Highlights::default(),
            scroll_x: 0,
            scroll_y: 0,
            autoscroll: Autoscroller::new(swiss),
            last_loaded_at: None,
        }
    }

    /// Takes over a fresh engine result. Returns the number of updated fields.
    pub fn apply(&mut self, outcome: RenderOutcome, matches: impl IntoIterator<Item = Match>) -> usize {
        if outcome.reconciliation.rebuild {
            self.highlights.clear();
            self.reset_scroll();
            self.autoscroll.stop();
        }

        let mut updated = 0;
        for action in outcome.reconciliation.updates() {
            self.highlights.mark(&action.id, action.field);
            updated += 1;
        }

        let content_height = match &outcome.view {
            BracketView::Swiss(list) => list.height,
            _ => 0.0,
        };
        self.autoscroll.set_content_height(content_height);

        self.matches = matches.into_iter().map(|m| (m.id.clone(), m)).collect();
        self.outcome = Some(outcome);
        self.last_loaded_at = Some(Local::now().format("%H:%M:%S").to_string());
        updated
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.scroll_x = self.scroll_x.saturating_add_signed((dx * PAN_STEP_X) as i16);
        self.scroll_y = self.scroll_y.saturating_add_signed((dy * PAN_STEP_Y) as i16);
    }

    /// Pulls the pan offsets back to the far edge of the content, so panning
    /// back moves the view on the first key press.
    pub fn clamp_scroll(&mut self, max_x: u16, max_y: u16) {
        self.scroll_x = self.scroll_x.min(max_x);
        self.scroll_y = self.scroll_y.min(max_y);
    }

    pub fn reset_scroll(&mut self) {
        self.scroll_x = 0;
        self.scroll_y = 0;
    }

    pub fn is_swiss(&self) -> bool {
        matches!(self.outcome.as_ref().map(|o| &o.view), Some(BracketView::Swiss(_)))
    }
}

// ---------------------------------------------------------------------------
// Top-level app state
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub view: ViewState,
    pub changes: ChangeFeed,
    pub animation: AnimationState,
}

impl AppState {
    pub fn new(swiss: SwissOptions) -> Self {
        Self {
            active_tab: MenuItem::default(),
            previous_tab: MenuItem::default(),
            show_logs: false,
            last_error: None,
            view: ViewState::new(swiss),
            changes: ChangeFeed::default(),
            animation: AnimationState::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourneyview_engine::ActionKind;

    #[test]
    fn highlights_fade_after_their_ticks() {
        let mut h = Highlights::default();
        h.mark("m1", Field::TopScore);
        for _ in 0..HIGHLIGHT_TICKS - 1 {
            h.decay();
        }
        assert!(h.is_active("m1", Field::TopScore));
        h.decay();
        assert!(!h.is_active("m1", Field::TopScore));
        assert_eq!(h.len(), 0);
    }

    #[test]
    fn remarking_restarts_the_fade() {
        let mut h = Highlights::default();
        h.mark("m1", Field::TopScore);
        h.decay();
        h.mark("m1", Field::TopScore);
        for _ in 0..HIGHLIGHT_TICKS - 1 {
            h.decay();
        }
        assert!(h.is_active("m1", Field::TopScore));
    }

    #[test]
    fn change_feed_is_capped_and_newest_first() {
        let mut feed = ChangeFeed::default();
        for i in 0..CHANGE_FEED_CAPACITY + 10 {
            feed.push(ChangeKind::Update(FieldAction {
                id: format!("m{i}"),
                field: Field::TopScore,
                kind: ActionKind::Update,
                old_value: None,
                new_value: i.to_string(),
            }));
        }
        assert_eq!(feed.len(), CHANGE_FEED_CAPACITY);
        let ChangeKind::Update(newest) = &feed.entries().next().unwrap().kind else { panic!("update expected") };
        assert_eq!(newest.id, format!("m{}", CHANGE_FEED_CAPACITY + 9));
    }

    #[test]
    fn reveal_follows_the_clock() {
        let mut a = AnimationState::default();
        assert!(a.is_revealed(0));
        assert!(!a.is_revealed(200));
        a.advance();
        a.advance();
        a.advance();
        assert!(a.is_revealed(200));
        a.restart_reveal();
        assert!(!a.is_revealed(200));
    }

    #[test]
    fn pan_never_goes_negative() {
        let mut v = ViewState::new(SwissOptions::default());
        v.pan(-1, -1);
        assert_eq!((v.scroll_x, v.scroll_y), (0, 0));
        v.pan(2, 1);
        assert_eq!((v.scroll_x, v.scroll_y), (8, 2));
    }

    #[test]
    fn panning_back_from_the_far_edge_moves_at_once() {
        let mut v = ViewState::new(SwissOptions::default());
        for _ in 0..10 {
            v.pan(1, 1);
        }
        v.clamp_scroll(6, 3);
        assert_eq!((v.scroll_x, v.scroll_y), (6, 3));
        v.pan(-1, -1);
        assert_eq!((v.scroll_x, v.scroll_y), (2, 1));
    }
}
