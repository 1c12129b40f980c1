use std::collections::HashMap;

use tourneyview_engine::layout::{EliminationLayout, PositionedMatch, SideLayout, THIRD_PLACE_CAPTION};
use tourneyview_engine::round_robin::{CellHighlight, GridCell, GridCellContent, RoundRobinGrid};
use tourneyview_engine::swiss::{MaskEdges, SwissList};
use tourneyview_engine::viewport::ViewTransform;
use tourneyview_engine::{Field, Match, MatchState, PreviousRenderState};
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::Style;
use tui::widgets::Widget;

use crate::components::theme::{Role, resolve};
use crate::state::app_state::{AnimationState, Highlights};
use crate::ui::layout::{to_col, to_row};

// ---------------------------------------------------------------------------
// Shared render inputs
// ---------------------------------------------------------------------------

/// What every bracket widget reads besides its own positioned structure.
pub struct RenderContext<'a> {
    /// Field text exactly as the engine formatted it.
    pub fields: &'a PreviousRenderState,
    pub highlights: &'a Highlights,
    /// Source matches by id, for result styling.
    pub matches: &'a HashMap<String, Match>,
    pub animation: &'a AnimationState,
    /// Content pixels to area-relative pixels.
    pub transform: ViewTransform,
}

impl RenderContext<'_> {
    fn text(&self, id: &str, field: Field) -> &str {
        self.fields.text(id, field).unwrap_or("-")
    }

    fn field_style(&self, id: &str, field: Field, base: Style) -> Style {
        if self.highlights.is_active(id, field) { resolve(Role::Changed) } else { base }
    }

    /// Absolute screen cell of a content-space point. May lie outside `area`.
    fn project(&self, area: Rect, x: f64, y: f64) -> (i32, i32) {
        let (sx, sy) = self.transform.apply(x, y);
        (i32::from(area.x) + to_col(sx), i32::from(area.y) + to_row(sy))
    }
}

// ---------------------------------------------------------------------------
// Elimination bracket widget
// ---------------------------------------------------------------------------

/// Rows per match cell: top team, status line, bottom team.
const MATCH_ROWS: i32 = 3;

/// Screen box of one match, used to anchor connectors.
#[derive(Debug, Clone, Copy)]
struct CellBox {
    left: i32,
    right: i32,
    center_row: i32,
}

/// Renders one or both sides of an elimination layout.
pub struct EliminationView<'a> {
    pub layout: &'a EliminationLayout,
    pub ctx: &'a RenderContext<'a>,
}

impl Widget for EliminationView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        for side in &self.layout.sides {
            draw_side_header(side, self.ctx, area, buf);

            let mut boxes: HashMap<&str, CellBox> = HashMap::with_capacity(side.nodes.len());

            // Pass 1: match cells
            for node in &side.nodes {
                let cell = draw_match_cell(node, self.ctx, area, buf);
                boxes.insert(node.id.as_str(), cell);
            }

            // Pass 2: connectors, anchored on the cells as drawn
            let link_style = resolve(Role::Dim);
            for link in &side.links {
                if !self.ctx.animation.is_revealed(link.reveal_delay_ms) {
                    continue;
                }
                let (Some(child), Some(parent)) = (boxes.get(link.child_id.as_str()), boxes.get(link.parent_id.as_str())) else {
                    continue;
                };
                draw_connector(*child, *parent, area, link_style, buf);
            }
        }
    }
}

fn draw_side_header(side: &SideLayout, ctx: &RenderContext<'_>, area: Rect, buf: &mut Buffer) {
    let (x, title_row) = ctx.project(area, 0.0, side.y_offset);
    let label_row = match &side.title {
        Some(title) => {
            put_str(buf, area, x, title_row, title, resolve(Role::Header));
            title_row + 1
        }
        None => title_row,
    };

    for label in &side.labels {
        if !ctx.animation.is_revealed(label.reveal_delay_ms) {
            continue;
        }
        let (lx, _) = ctx.project(area, label.x, label.y);
        let width = to_col(label.width).max(0) as usize;
        put_str(buf, area, lx, label_row, &center(&label.text, width), resolve(Role::Dim));
    }
}

fn draw_match_cell(node: &PositionedMatch, ctx: &RenderContext<'_>, area: Rect, buf: &mut Buffer) -> CellBox {
    let (x, mut top) = ctx.project(area, node.x, node.y);
    let width = to_col(node.width).max(1);

    if node.is_third_place_match {
        if ctx.animation.is_revealed(node.reveal_delay_ms) {
            put_str(buf, area, x, top, THIRD_PLACE_CAPTION, resolve(Role::Dim));
        }
        top += 1;
    }

    let cell = CellBox { left: x, right: x + width, center_row: top + MATCH_ROWS / 2 };
    if !ctx.animation.is_revealed(node.reveal_delay_ms) {
        return cell;
    }

    let m = ctx.matches.get(&node.id);
    let id = node.id.as_str();
    let w = width as usize;

    for (row, name_field, score_field, is_top) in [
        (top, Field::TopTeamName, Field::TopScore, true),
        (top + MATCH_ROWS - 1, Field::BottomTeamName, Field::BottomScore, false),
    ] {
        let base = resolve(team_role(m, is_top));
        let name = ctx.text(id, name_field);
        let score = ctx.text(id, score_field);
        let (name_part, score_part) = split_team_line(name, score, w);
        put_str(buf, area, x, row, &name_part, ctx.field_style(id, name_field, base));
        put_str(buf, area, x + name_part.chars().count() as i32, row, &score_part, ctx.field_style(id, score_field, base));
    }

    let state = m.map_or(MatchState::Unknown, |m| m.state);
    let status_style = if state == MatchState::InProgress { resolve(Role::Live) } else { resolve(Role::Dim) };
    put_str(buf, area, x, top + MATCH_ROWS / 2, &format_status_line(state, w), status_style);

    cell
}

/// Name padded to fill the line, then the score right-aligned.
fn split_team_line(name: &str, score: &str, width: usize) -> (String, String) {
    let score_w = score.chars().count().max(2);
    let name_w = width.saturating_sub(score_w + 1);
    let name_trunc: String = name.chars().take(name_w).collect();
    (format!("{name_trunc:<name_w$} "), format!("{score:>score_w$}"))
}

fn format_status_line(state: MatchState, width: usize) -> String {
    let tag = match state {
        MatchState::InProgress => " live ",
        MatchState::Completed => " final ",
        MatchState::NotStarted | MatchState::Unknown => "",
    };
    let rule = width.saturating_sub(tag.chars().count() + 1);
    let line = format!("─{tag}{}", "─".repeat(rule));
    line.chars().take(width).collect()
}

fn team_role(m: Option<&Match>, is_top: bool) -> Role {
    let Some(m) = m else {
        return Role::Primary;
    };
    let (team, opponent) = if is_top { (&m.top_team, &m.bottom_team) } else { (&m.bottom_team, &m.top_team) };
    if team.is_disqualified {
        return Role::Loser;
    }
    if m.state != MatchState::Completed {
        return Role::Primary;
    }
    let won = team.is_winner || matches!((team.score, opponent.score), (Some(a), Some(b)) if a > b);
    if won { Role::Winner } else { Role::Primary }
}

/// Child's right edge to parent's left edge with a bend halfway:
///
/// ```text
/// child ─┐
///        ├─ parent
/// child ─┘
/// ```
fn draw_connector(child: CellBox, parent: CellBox, area: Rect, style: Style, buf: &mut Buffer) {
    let (fx, fy) = (child.right, child.center_row);
    let (tx, ty) = (parent.left - 1, parent.center_row);
    if tx <= fx {
        return;
    }
    let mid = fx + (tx - fx) / 2;

    for x in fx..mid {
        put_box_char(buf, area, x, fy, '─', style);
    }
    let (bend_from, bend_to) = match fy.cmp(&ty) {
        std::cmp::Ordering::Less => ('┐', '└'),
        std::cmp::Ordering::Greater => ('┘', '┌'),
        std::cmp::Ordering::Equal => ('─', '─'),
    };
    put_box_char(buf, area, mid, fy, bend_from, style);
    for y in fy.min(ty) + 1..fy.max(ty) {
        put_box_char(buf, area, mid, y, '│', style);
    }
    put_box_char(buf, area, mid, ty, bend_to, style);
    for x in mid + 1..=tx {
        put_box_char(buf, area, x, ty, '─', style);
    }
}

/// Merges a connector glyph into what is already in the cell, so two
/// children meeting at one parent form a tee.
fn join_box(existing: &str, new: char) -> char {
    match (existing, new) {
        ("└", '┌') | ("┌", '└') | ("├", '┌' | '└') => '├',
        ("┘", '┐') | ("┐", '┘') | ("┤", '┐' | '┘') => '┤',
        _ => new,
    }
}

// ---------------------------------------------------------------------------
// Round-robin grid widget
// ---------------------------------------------------------------------------

pub struct RoundRobinView<'a> {
    pub grid: &'a RoundRobinGrid,
    pub ctx: &'a RenderContext<'a>,
}

impl Widget for RoundRobinView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        for cell in &self.grid.cells {
            draw_grid_cell(cell, self.ctx, area, buf);
        }
    }
}

fn draw_grid_cell(cell: &GridCell, ctx: &RenderContext<'_>, area: Rect, buf: &mut Buffer) {
    let (x, y) = ctx.project(area, cell.x, cell.y);
    let width = to_col(cell.width).max(1) as usize;
    let key = cell.key();

    match &cell.content {
        GridCellContent::Blank => {}
        GridCellContent::TeamName(_) => {
            let name = ctx.text(&key, Field::TeamName);
            let style = ctx.field_style(&key, Field::TeamName, resolve(Role::Header));
            let text = if cell.col == 0 { truncate(name, width) } else { center(name, width) };
            put_str(buf, area, x, y, &text, style);
        }
        GridCellContent::NoMatch => {
            put_str(buf, area, x, y, &center("╳", width), resolve(Role::Dim));
        }
        GridCellContent::Pairing(pairing) => {
            let base = resolve(match pairing.highlight {
                CellHighlight::LeftWinner => Role::Winner,
                CellHighlight::TopWinner => Role::Loser,
                CellHighlight::InProgress => Role::Live,
                CellHighlight::None => Role::Primary,
            });
            draw_pairing(&key, ctx, base, x, y, width, area, buf);
        }
        GridCellContent::Unpaired => draw_pairing(&key, ctx, resolve(Role::Dim), x, y, width, area, buf),
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_pairing(key: &str, ctx: &RenderContext<'_>, base: Style, x: i32, y: i32, width: usize, area: Rect, buf: &mut Buffer) {
    let left = ctx.text(key, Field::LeftScore);
    let top = ctx.text(key, Field::TopScore);
    let left_part = format!("{left} - ");
    let start = x + (width.saturating_sub(left_part.chars().count() + top.chars().count()) / 2) as i32;
    put_str(buf, area, start, y, &left_part, ctx.field_style(key, Field::LeftScore, base));
    put_str(buf, area, start + left_part.chars().count() as i32, y, top, ctx.field_style(key, Field::TopScore, base));
}

// ---------------------------------------------------------------------------
// Swiss round widget
// ---------------------------------------------------------------------------

/// Widest a Swiss row is drawn, in columns.
const SWISS_ROW_WIDTH: u16 = 48;

pub struct SwissView<'a> {
    pub list: &'a SwissList,
    pub ctx: &'a RenderContext<'a>,
    /// Autoscroll position, in content pixels.
    pub scroll_top: f64,
    pub mask: MaskEdges,
}

impl Widget for SwissView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let width = area.width.min(SWISS_ROW_WIDTH);
        let x = i32::from(area.x + (area.width - width) / 2);
        let w = width as usize;

        for row in &self.list.rows {
            let y = i32::from(area.y) + to_row(row.y - self.scroll_top);
            let m = self.ctx.matches.get(&row.match_id);
            let id = row.match_id.as_str();
            for (line, name_field, score_field, is_top) in [
                (y, Field::TopTeamName, Field::TopScore, true),
                (y + 1, Field::BottomTeamName, Field::BottomScore, false),
            ] {
                let base = if row.state == MatchState::InProgress { resolve(Role::Live) } else { resolve(team_role(m, is_top)) };
                let (name_part, score_part) = split_team_line(self.ctx.text(id, name_field), self.ctx.text(id, score_field), w);
                put_str(buf, area, x, line, &name_part, self.ctx.field_style(id, name_field, base));
                put_str(buf, area, x + name_part.chars().count() as i32, line, &score_part, self.ctx.field_style(id, score_field, base));
            }
        }

        let right = x + i32::from(width) - 1;
        if self.mask.top {
            put_str(buf, area, right, i32::from(area.y), "▲", resolve(Role::Dim));
        }
        if self.mask.bottom {
            put_str(buf, area, right, i32::from(area.bottom()) - 1, "▼", resolve(Role::Dim));
        }
    }
}

// ---------------------------------------------------------------------------
// Shared drawing helpers
// ---------------------------------------------------------------------------

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn center(text: &str, width: usize) -> String {
    let text = truncate(text, width);
    let pad = width.saturating_sub(text.chars().count()) / 2;
    format!("{}{text}", " ".repeat(pad))
}

/// Writes `text` at an absolute position, clipped to `area` on all sides.
fn put_str(buf: &mut Buffer, area: Rect, x: i32, y: i32, text: &str, style: Style) {
    let (left, right) = (i32::from(area.x), i32::from(area.right()));
    if y < i32::from(area.y) || y >= i32::from(area.bottom()) || x >= right {
        return;
    }
    let skip = (left - x).max(0) as usize;
    let start = x.max(left);
    let visible: String = text.chars().skip(skip).take((right - start) as usize).collect();
    if !visible.is_empty() {
        buf.set_string(start as u16, y as u16, visible, style);
    }
}

fn put_box_char(buf: &mut Buffer, area: Rect, x: i32, y: i32, ch: char, style: Style) {
    if x < i32::from(area.x) || x >= i32::from(area.right()) || y < i32::from(area.y) || y >= i32::from(area.bottom()) {
        return;
    }
    if let Some(cell) = buf.cell_mut((x as u16, y as u16)) {
        let merged = join_box(cell.symbol(), ch);
        cell.set_char(merged);
        cell.set_style(style);
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::layout::terminal_engine_options;
    use tourneyview_engine::{Bracket, BracketRenderer, BracketType, BracketView, MatchGroup, MatchTeam};

    fn rows(buf: &Buffer) -> Vec<String> {
        let area = buf.area;
        (area.top()..area.bottom())
            .map(|y| (area.left()..area.right()).map(|x| buf[(x, y)].symbol()).collect())
            .collect()
    }

    fn team(id: &str, name: &str, score: i64) -> MatchTeam {
        MatchTeam::new(id, name).with_score(score)
    }

    fn cup() -> Bracket {
        let semi = |id: &str, top: MatchTeam, bottom: MatchTeam| Match {
            id: id.into(),
            next_match_id: Some("final".into()),
            round_number: Some(1),
            state: MatchState::Completed,
            top_team: top,
            bottom_team: bottom,
            ..Match::default()
        };
        Bracket {
            name: "Cup".into(),
            bracket_type: BracketType::SingleElimination,
            match_groups: vec![MatchGroup {
                id: "main".into(),
                matches: vec![
                    semi("s1", team("a", "Alpha", 3), team("b", "Bravo", 1)),
                    semi("s2", team("c", "Charlie", 0), team("d", "Delta", 2)),
                    Match {
                        id: "final".into(),
                        round_number: Some(2),
                        state: MatchState::InProgress,
                        top_team: team("a", "Alpha", 1),
                        bottom_team: team("d", "Delta", 1),
                        ..Match::default()
                    },
                ],
                ..MatchGroup::default()
            }],
            ..Bracket::default()
        }
    }

    fn revealed() -> AnimationState {
        AnimationState { tick: 0, since_rebuild_ms: u64::MAX }
    }

    #[test]
    fn elimination_cells_and_connectors() {
        let bracket = cup();
        let mut renderer = BracketRenderer::new(terminal_engine_options());
        let outcome = renderer.set_data(&bracket).unwrap();
        let BracketView::Elimination(layout) = &outcome.view else { panic!("elimination view expected") };

        let matches = bracket.match_groups[0].matches.iter().map(|m| (m.id.clone(), m.clone())).collect();
        let highlights = Highlights::default();
        let animation = revealed();
        let ctx = RenderContext {
            fields: renderer.state(),
            highlights: &highlights,
            matches: &matches,
            animation: &animation,
            transform: ViewTransform::default(),
        };

        let area = Rect::new(0, 0, 90, 24);
        let mut buf = Buffer::empty(area);
        EliminationView { layout, ctx: &ctx }.render(area, &mut buf);
        let text = rows(&buf).join("\n");

        for name in ["Alpha", "Bravo", "Charlie", "Delta"] {
            assert!(text.contains(name), "{name} missing from\n{text}");
        }
        assert!(text.contains("Semi-Finals"));
        assert!(text.contains("Finals"));
        assert!(text.contains('├'), "no tee in\n{text}");
        assert!(text.contains("live"));
    }

    #[test]
    fn hidden_until_revealed() {
        let bracket = cup();
        let mut renderer = BracketRenderer::new(terminal_engine_options());
        let outcome = renderer.set_data(&bracket).unwrap();
        let BracketView::Elimination(layout) = &outcome.view else { panic!("elimination view expected") };

        let matches = HashMap::new();
        let highlights = Highlights::default();
        let animation = AnimationState::default();
        let ctx = RenderContext {
            fields: renderer.state(),
            highlights: &highlights,
            matches: &matches,
            animation: &animation,
            transform: ViewTransform::default(),
        };

        let area = Rect::new(0, 0, 90, 24);
        let mut buf = Buffer::empty(area);
        EliminationView { layout, ctx: &ctx }.render(area, &mut buf);
        let text = rows(&buf).join("\n");

        // First-round cells reveal at 0ms, the final 200ms later.
        assert!(text.contains("Bravo"));
        assert!(!text.contains('├'));
    }

    #[test]
    fn team_line_keeps_the_score_visible() {
        let (name, score) = split_team_line("An Extremely Long Team Name", "12", 12);
        assert_eq!(format!("{name}{score}"), "An Extrem 12");
        let (name, score) = split_team_line("Ox", "DQ", 8);
        assert_eq!(format!("{name}{score}"), "Ox    DQ");
    }

    #[test]
    fn status_line_fills_the_width() {
        assert_eq!(format_status_line(MatchState::InProgress, 10).chars().count(), 10);
        assert!(format_status_line(MatchState::Completed, 12).contains("final"));
        assert_eq!(format_status_line(MatchState::NotStarted, 4), "────");
    }

    #[test]
    fn tees_form_where_two_children_meet() {
        assert_eq!(join_box("└", '┌'), '├');
        assert_eq!(join_box("┐", '┘'), '┤');
        assert_eq!(join_box(" ", '│'), '│');
    }

    #[test]
    fn text_is_clipped_to_the_area() {
        let area = Rect::new(2, 1, 5, 2);
        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 4));
        put_str(&mut buf, area, 0, 1, "abcdefghij", Style::default());
        put_str(&mut buf, area, 3, 5, "zzz", Style::default());
        let r = rows(&buf);
        assert_eq!(r[1], "  cdefg   ");
        assert!(r.iter().all(|line| !line.contains('z')));
    }
}
