use tourneyview_engine::EngineOptions;
use tourneyview_engine::layout::EliminationOptions;
use tourneyview_engine::round_robin::RoundRobinOptions;
use tourneyview_engine::swiss::SwissOptions;
use tourneyview_engine::viewport::{DEFAULT_MAX_SCALE, Size as ContentSize, ViewTransform, fit_transform};
use tui::layout::{Constraint, Layout, Rect, Size};

pub const TAB_BAR_HEIGHT: u16 = 3;
pub const LOG_PANE_HEIGHT: u16 = 8;

// ---------------------------------------------------------------------------
// Engine units ↔ terminal cells
// ---------------------------------------------------------------------------

/// Engine pixels per terminal column / row. A cell is about twice as tall as
/// it is wide.
pub const PX_PER_COL: f64 = 8.0;
pub const PX_PER_ROW: f64 = 16.0;

/// Engine geometry sized so that cells, gaps and headers land on whole
/// terminal rows.
pub fn terminal_engine_options() -> EngineOptions {
    EngineOptions {
        elimination: EliminationOptions {
            // Three rows: top team, status, bottom team.
            cell_height: 3.0 * PX_PER_ROW,
            min_cell_width: 22.0 * PX_PER_COL,
            max_cell_width: 30.0 * PX_PER_COL,
            link_width: 6.0 * PX_PER_COL,
            third_place_label_height: PX_PER_ROW,
            // Side title, round labels, one blank row.
            header_height: 3.0 * PX_PER_ROW,
            header_spacing: 0.0,
            ..EliminationOptions::default()
        },
        round_robin: RoundRobinOptions { row_height: PX_PER_ROW, row_width: 14.0 * PX_PER_COL, gap: PX_PER_ROW },
        swiss: SwissOptions { row_height: 2.0 * PX_PER_ROW, row_gap: PX_PER_ROW },
        max_scale: DEFAULT_MAX_SCALE,
    }
}

pub fn to_col(px: f64) -> i32 {
    (px / PX_PER_COL).floor() as i32
}

pub fn to_row(px: f64) -> i32 {
    (px / PX_PER_ROW).floor() as i32
}

pub fn area_in_px(area: Rect) -> ContentSize {
    ContentSize::new(f64::from(area.width) * PX_PER_COL, f64::from(area.height) * PX_PER_ROW)
}

/// Where content lands in `area`. Content that fits is centred the way the
/// fit-to-viewport zoom centres it; text cannot be scaled in a terminal, so
/// the scale stays at 1 and oversized content is panned instead.
pub fn content_transform(area: Rect, content: ContentSize, scroll_x: u16, scroll_y: u16) -> ViewTransform {
    let container = area_in_px(area);
    let fit = fit_transform(container, content, DEFAULT_MAX_SCALE);

    let axis = |container: f64, content: f64, scroll: u16, unit: f64| {
        if fit.k >= 1.0 || content <= container {
            ((container - content) / 2.0).max(0.0)
        } else {
            -(f64::from(scroll) * unit).min(content - container)
        }
    };

    ViewTransform {
        k: 1.0,
        x: axis(container.width, content.width, scroll_x, PX_PER_COL),
        y: axis(container.height, content.height, scroll_y, PX_PER_ROW),
    }
}

/// Largest pan offsets, in cells, that still move the view in `area`.
pub fn max_scroll(area: Rect, content: ContentSize) -> (u16, u16) {
    let container = area_in_px(area);
    let axis = |container: f64, content: f64, unit: f64| ((content - container).max(0.0) / unit).ceil() as u16;
    (axis(container.width, content.width, PX_PER_COL), axis(container.height, content.height, PX_PER_ROW))
}

// ---------------------------------------------------------------------------
// Screen areas
// ---------------------------------------------------------------------------

/// Pre-computed layout areas for the main draw loop.
pub struct LayoutAreas {
    pub tab_bar: [Rect; 2],
    pub main: Rect,
    pub logs: Option<Rect>,
}

impl LayoutAreas {
    pub fn new(size: Size) -> Self {
        let rect = Rect::new(0, 0, size.width, size.height);
        Self::from_rect(rect, false, false)
    }

    pub fn update(&mut self, area: Rect, full_screen: bool, show_logs: bool) {
        *self = Self::from_rect(area, full_screen, show_logs);
    }

    fn from_rect(area: Rect, full_screen: bool, show_logs: bool) -> Self {
        let (body, logs) = if show_logs && area.height > LOG_PANE_HEIGHT * 2 {
            let [body, logs] = Layout::vertical([Constraint::Fill(1), Constraint::Length(LOG_PANE_HEIGHT)]).areas(area);
            (body, Some(logs))
        } else {
            (area, None)
        };

        if full_screen {
            let [main] = Layout::vertical([Constraint::Fill(1)]).areas(body);
            return LayoutAreas {
                tab_bar: [Rect::ZERO, Rect::ZERO],
                main,
                logs,
            };
        }

        let [tab, main] = Layout::vertical([
            Constraint::Length(TAB_BAR_HEIGHT),
            Constraint::Fill(1),
        ])
        .areas(body);

        LayoutAreas {
            tab_bar: Self::split_tab_bar(tab),
            main,
            logs,
        }
    }

    fn split_tab_bar(area: Rect) -> [Rect; 2] {
        Layout::horizontal([Constraint::Percentage(85), Constraint::Percentage(15)]).areas(area)
    }
}
