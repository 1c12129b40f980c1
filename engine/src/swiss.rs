use crate::{MatchGroup, MatchState, MatchTeam};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwissOptions {
    pub row_height: f64,
    pub row_gap: f64,
}

impl Default for SwissOptions {
    fn default() -> Self {
        Self { row_height: 50.0, row_gap: 5.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwissRow {
    pub match_id: String,
    pub index: usize,
    pub y: f64,
    pub height: f64,
    pub state: MatchState,
    pub top_team: MatchTeam,
    pub bottom_team: MatchTeam,
}

/// The current round's matches, one row each, in input order. Without a
/// round number every match is listed.
#[derive(Debug, Clone, PartialEq)]
pub struct SwissList {
    pub group_id: String,
    pub round_number: Option<u32>,
    pub rows: Vec<SwissRow>,
    pub height: f64,
}

impl SwissList {
    pub fn build(group: &MatchGroup, round_number: Option<u32>, opts: &SwissOptions) -> Self {
        let pitch = opts.row_height + opts.row_gap;
        let rows: Vec<SwissRow> = group
            .matches
            .iter()
            .filter(|m| round_number.is_none_or(|round| m.round_number == Some(round)))
            .enumerate()
            .map(|(index, m)| SwissRow {
                match_id: m.id.clone(),
                index,
                y: index as f64 * pitch,
                height: opts.row_height,
                state: m.state,
                top_team: m.top_team.clone(),
                bottom_team: m.bottom_team.clone(),
            })
            .collect();
        let height = if rows.is_empty() { 0.0 } else { rows.len() as f64 * pitch - opts.row_gap };
        Self { group_id: group.id.clone(), round_number, rows, height }
    }
}

// ---------------------------------------------------------------------------
// Viewport pacing
// ---------------------------------------------------------------------------

/// How many whole rows fit in `available` height, and the height those rows
/// occupy.
pub fn rows_per_screen(available: f64, opts: &SwissOptions) -> (usize, f64) {
    let pitch = opts.row_height + opts.row_gap;
    let rows = ((available + opts.row_gap) / pitch).floor().max(0.0) as usize;
    let inner = (rows as f64 * pitch - opts.row_gap).max(0.0);
    (rows, inner)
}

pub const SCROLL_HOLD_MS: f64 = 5000.0;
pub const SCROLL_DURATION_MS: f64 = 750.0;
pub const SCROLL_MASK_OFFSET: f64 = 35.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Stopped,
    Holding { elapsed: f64 },
    Scrolling { elapsed: f64 },
}

/// Pages a Swiss list that does not fit its viewport: hold, scroll down a
/// screen less one row, repeat, and run back to the top once the end is
/// reached.
#[derive(Debug, Clone, PartialEq)]
pub struct Autoscroller {
    opts: SwissOptions,
    rows_per_screen: usize,
    viewport_height: f64,
    content_height: f64,
    direction: ScrollDirection,
    scroll_top: f64,
    from: f64,
    to: f64,
    phase: Phase,
}

impl Autoscroller {
    pub fn new(opts: SwissOptions) -> Self {
        Self {
            opts,
            rows_per_screen: 0,
            viewport_height: 0.0,
            content_height: 0.0,
            direction: ScrollDirection::Up,
            scroll_top: 0.0,
            from: 0.0,
            to: 0.0,
            phase: Phase::Stopped,
        }
    }

    /// Resizes the viewport, snapping it to whole rows. Returns the snapped height.
    pub fn set_viewport(&mut self, available: f64) -> f64 {
        let (rows, inner) = rows_per_screen(available, &self.opts);
        self.rows_per_screen = rows;
        self.viewport_height = inner;
        self.scroll_top = self.scroll_top.min(self.max_scroll_top());
        inner
    }

    pub fn set_content_height(&mut self, height: f64) {
        self.content_height = height;
        self.scroll_top = self.scroll_top.min(self.max_scroll_top());
    }

    pub fn start(&mut self) {
        if self.phase == Phase::Stopped {
            self.begin_cycle();
        }
    }

    /// Cancels any pending scroll and returns to the top.
    pub fn stop(&mut self) {
        self.phase = Phase::Stopped;
        self.scroll_top = 0.0;
        self.from = 0.0;
        self.to = 0.0;
        self.direction = ScrollDirection::Up;
    }

    pub fn is_running(&self) -> bool {
        self.phase != Phase::Stopped
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub fn direction(&self) -> ScrollDirection {
        self.direction
    }

    pub fn rows_per_screen(&self) -> usize {
        self.rows_per_screen
    }

    pub fn mask(&self) -> MaskEdges {
        MaskEdges::compute(self.scroll_top, self.content_height, self.viewport_height)
    }

    /// Moves time forward by `dt_ms`.
    pub fn advance(&mut self, dt_ms: f64) {
        let mut remaining = dt_ms;
        while remaining > 0.0 {
            match self.phase {
                Phase::Stopped => return,
                Phase::Holding { elapsed } => {
                    let left = SCROLL_HOLD_MS - elapsed;
                    if remaining < left {
                        self.phase = Phase::Holding { elapsed: elapsed + remaining };
                        return;
                    }
                    remaining -= left;
                    self.phase = Phase::Scrolling { elapsed: 0.0 };
                }
                Phase::Scrolling { elapsed } => {
                    let now = (elapsed + remaining).min(SCROLL_DURATION_MS);
                    remaining -= now - elapsed;
                    let t = now / SCROLL_DURATION_MS;
                    self.scroll_top = self.from + (self.to - self.from) * ease_cubic_in_out(t);
                    if now >= SCROLL_DURATION_MS {
                        self.scroll_top = self.to;
                        self.begin_cycle();
                    } else {
                        self.phase = Phase::Scrolling { elapsed: now };
                        return;
                    }
                }
            }
        }
    }

    fn begin_cycle(&mut self) {
        if self.scrolling_finished() {
            self.direction = match self.direction {
                ScrollDirection::Up => ScrollDirection::Down,
                ScrollDirection::Down => ScrollDirection::Up,
            };
        }
        self.from = self.to;
        self.to = self.next_scroll_top();
        self.phase = Phase::Holding { elapsed: 0.0 };
    }

    fn next_scroll_top(&self) -> f64 {
        match self.direction {
            ScrollDirection::Up => 0.0,
            ScrollDirection::Down => {
                let page = (self.opts.row_height + self.opts.row_gap) * self.rows_per_screen.saturating_sub(1) as f64;
                (self.to + page).min(self.max_scroll_top())
            }
        }
    }

    fn scrolling_finished(&self) -> bool {
        match self.direction {
            ScrollDirection::Up => self.scroll_top <= 0.0,
            ScrollDirection::Down => (self.max_scroll_top() - self.scroll_top).abs() < 1.0,
        }
    }

    fn max_scroll_top(&self) -> f64 {
        (self.content_height - self.viewport_height).max(0.0)
    }
}

fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// Which edges of a scrolled list should fade out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaskEdges {
    pub top: bool,
    pub bottom: bool,
}

impl MaskEdges {
    pub fn compute(scroll_top: f64, content_height: f64, viewport_height: f64) -> Self {
        let hidden_below = (content_height - viewport_height).max(0.0) - scroll_top;
        Self { top: scroll_top > SCROLL_MASK_OFFSET, bottom: hidden_below.abs() >= SCROLL_MASK_OFFSET }
    }
}
