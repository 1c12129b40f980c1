use log::debug;

use crate::error::LayoutResult;
use crate::hierarchy::{MatchTree, ROOT};
use crate::labels::{LabelContext, round_labels};
use crate::{ContainedMatchType, EliminationKind, Match, MatchGroup};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Geometry parameters for elimination brackets, in abstract pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EliminationOptions {
    pub cell_height: f64,
    pub min_cell_width: f64,
    pub max_cell_width: f64,
    /// Horizontal gap between round columns, where links are drawn.
    pub link_width: f64,
    /// Fixed canvas extent the cell width is derived from.
    pub canvas_size: f64,
    /// Extra strip above a third-place match for its caption.
    pub third_place_label_height: f64,
    /// Title and round-label band above each side.
    pub header_height: f64,
    pub header_spacing: f64,
}

impl Default for EliminationOptions {
    fn default() -> Self {
        Self {
            cell_height: 65.0,
            min_cell_width: 175.0,
            max_cell_width: 250.0,
            link_width: 50.0,
            canvas_size: 2048.0,
            third_place_label_height: 20.0,
            header_height: 30.0,
            header_spacing: 8.0,
        }
    }
}

pub const CELL_REVEAL_STEP_MS: u64 = 200;
pub const LABEL_REVEAL_STEP_MS: u64 = 200;
pub const LINK_REVEAL_STEP_MS: u64 = 300;
pub const LINK_REVEAL_BASE_MS: u64 = 100;

pub const THIRD_PLACE_CAPTION: &str = "Third place match";

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One match cell, top-left anchored.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedMatch {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// 1 for the final round, growing toward round 1.
    pub depth: usize,
    pub is_third_place_match: bool,
    /// Stagger applied when the whole bracket is revealed; earliest rounds first.
    pub reveal_delay_ms: u64,
}

/// Connector from a match to the match its winner advances to.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkCurve {
    pub child_id: String,
    pub parent_id: String,
    /// Child's right edge, vertical midline.
    pub from: Point,
    /// Parent's left edge, vertical midline.
    pub to: Point,
    pub parent_depth: usize,
    pub reveal_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundLabelPosition {
    /// Column index, 0 = earliest round.
    pub index: usize,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub reveal_delay_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BracketSide {
    /// Single elimination, or one side of a double elimination bracket shown alone.
    Main,
    Winners,
    Losers,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SideLayout {
    pub side: BracketSide,
    pub title: Option<String>,
    /// Top of this side's header band.
    pub y_offset: f64,
    pub nodes: Vec<PositionedMatch>,
    pub links: Vec<LinkCurve>,
    pub labels: Vec<RoundLabelPosition>,
    pub width: f64,
    pub height: f64,
    /// Number of rounds.
    pub depth: usize,
}

/// Positioned output for a single or double elimination group.
#[derive(Debug, Clone, PartialEq)]
pub struct EliminationLayout {
    /// Winners side first when both are shown.
    pub sides: Vec<SideLayout>,
    pub cell_width: f64,
    pub width: f64,
    pub height: f64,
}

impl EliminationLayout {
    pub fn nodes(&self) -> impl Iterator<Item = &PositionedMatch> {
        self.sides.iter().flat_map(|s| s.nodes.iter())
    }

    pub fn depth(&self) -> usize {
        self.sides.iter().map(|s| s.depth).max().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Sizing rules
// ---------------------------------------------------------------------------

/// Width of every cell for a tree of `height` rounds. A losers side drawn
/// under a winners side starts one column in, so it reserves one more column.
pub fn cell_width(height: usize, shares_canvas_as_losers: bool, opts: &EliminationOptions) -> f64 {
    if height == 0 {
        return opts.max_cell_width;
    }
    let h = height as f64;
    let raw = if shares_canvas_as_losers {
        (opts.canvas_size - opts.link_width * h) / (h + 1.0)
    } else {
        (opts.canvas_size - opts.link_width * (h - 1.0)) / h
    };
    raw.min(opts.max_cell_width).max(opts.min_cell_width)
}

/// Sibling spacing, as a multiple of the cell height. Shallow brackets get
/// more air; deep ones are packed tight.
pub fn cell_separation(height: usize) -> f64 {
    match height {
        2 => 3.0,
        3 => 2.0,
        4 => 1.25,
        _ => 1.1,
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn layout_elimination(kind: EliminationKind, group: &MatchGroup, opts: &EliminationOptions) -> LayoutResult<EliminationLayout> {
    let contained = group.contained_match_type.unwrap_or_default();

    if kind == EliminationKind::Double && contained == ContainedMatchType::AllMatches {
        return layout_both_sides(group, opts);
    }

    let (side, title, matches): (BracketSide, Option<&str>, Vec<&Match>) = match (kind, contained) {
        (EliminationKind::Double, ContainedMatchType::Winners) => {
            (BracketSide::Winners, Some("Winners Bracket"), group.matches.iter().filter(|m| !m.is_losers()).collect())
        }
        (EliminationKind::Double, _) => (BracketSide::Losers, Some("Losers Bracket"), group.matches.iter().filter(|m| m.is_losers()).collect()),
        (EliminationKind::Single, _) => (BracketSide::Main, None, group.matches.iter().collect()),
    };

    let has_third_place_match = kind == EliminationKind::Single && group.matches.iter().any(Match::is_losers);
    let mut tree = MatchTree::build(matches, &group.id)?;
    if has_third_place_match {
        tree.sort_losers_last();
    }

    let cw = cell_width(tree.height(), false, opts);
    let params = SideParams {
        side,
        title,
        cell_width: cw,
        cell_offset: 0,
        y_offset: 0.0,
        has_third_place_match,
        labels: LabelContext {
            kind,
            is_losers_side: side == BracketSide::Losers,
            has_bracket_reset: group.has_bracket_reset,
            has_third_place_match,
        },
    };
    let laid = layout_side(&tree, &params, opts);
    debug!("laid out {:?} side of {}: {} rounds, {:.0}x{:.0}", side, group.id, laid.depth, laid.width, laid.height);

    Ok(EliminationLayout { cell_width: cw, width: laid.width, height: laid.height, sides: vec![laid] })
}

fn layout_both_sides(group: &MatchGroup, opts: &EliminationOptions) -> LayoutResult<EliminationLayout> {
    let winners = MatchTree::build(group.matches.iter().filter(|m| !m.is_losers()), &group.id)?;
    let losers = MatchTree::build(group.matches.iter().filter(|m| m.is_losers()), &group.id)?;

    let cw = cell_width(winners.height(), false, opts).min(cell_width(losers.height(), true, opts));
    let labels = |is_losers_side| LabelContext {
        kind: EliminationKind::Double,
        is_losers_side,
        has_bracket_reset: group.has_bracket_reset,
        has_third_place_match: false,
    };

    let top = layout_side(
        &winners,
        &SideParams {
            side: BracketSide::Winners,
            title: Some("Winners Bracket"),
            cell_width: cw,
            cell_offset: 0,
            y_offset: 0.0,
            has_third_place_match: false,
            labels: labels(false),
        },
        opts,
    );
    let gap = opts.cell_height / 2.0;
    let bottom = layout_side(
        &losers,
        &SideParams {
            side: BracketSide::Losers,
            title: Some("Losers Bracket"),
            cell_width: cw,
            cell_offset: 1,
            y_offset: top.height + gap,
            has_third_place_match: false,
            labels: labels(true),
        },
        opts,
    );

    debug!(
        "laid out both sides of {}: winners {} rounds, losers {} rounds, cell width {cw:.0}",
        group.id, top.depth, bottom.depth
    );

    Ok(EliminationLayout {
        cell_width: cw,
        width: top.width.max(bottom.width),
        height: top.height + gap + bottom.height,
        sides: vec![top, bottom],
    })
}

// ---------------------------------------------------------------------------
// One side
// ---------------------------------------------------------------------------

struct SideParams<'t> {
    side: BracketSide,
    title: Option<&'t str>,
    cell_width: f64,
    /// Columns to skip on the left.
    cell_offset: usize,
    y_offset: f64,
    has_third_place_match: bool,
    labels: LabelContext,
}

fn layout_side(tree: &MatchTree<'_>, params: &SideParams<'_>, opts: &EliminationOptions) -> SideLayout {
    let height = tree.height();
    let cw = params.cell_width;
    let ch = opts.cell_height;
    let lw = opts.link_width;
    let column = cw + lw;
    let header = opts.header_height + opts.header_spacing;
    let offset = params.cell_offset as f64;

    let spacing = cell_separation(height);
    let is_losers_node = |idx: usize| tree.node(idx).data.is_some_and(Match::is_losers);
    let vertical = tidy_offsets(tree, |a, b| {
        if params.has_third_place_match && (is_losers_node(a) || is_losers_node(b)) { 2.0 } else { spacing }
    });

    let x0 = tree.descendants().map(|(idx, _)| vertical[idx] * ch).fold(f64::INFINITY, f64::min);
    let bracket_width = if height == 0 { 0.0 } else { cw * (height as f64 + offset) + lw * (height as f64 - 1.0 + offset) };

    let mut nodes = Vec::with_capacity(tree.node_count().saturating_sub(1));
    let mut lefts = vec![0.0; tree.node_count()];
    let mut tops = vec![0.0; tree.node_count()];

    for (idx, node) in tree.descendants() {
        let Some(m) = node.data else { continue };
        let is_third_place_match = params.has_third_place_match && m.is_losers();
        let left = bracket_width - node.depth as f64 * column + lw;
        let top = vertical[idx] * ch - x0 + params.y_offset + header;
        lefts[idx] = left;
        tops[idx] = top;
        nodes.push(PositionedMatch {
            id: m.id.clone(),
            x: left,
            y: top,
            width: cw,
            height: if is_third_place_match { ch + opts.third_place_label_height } else { ch },
            depth: node.depth,
            is_third_place_match,
            reveal_delay_ms: (height - node.depth) as u64 * CELL_REVEAL_STEP_MS,
        });
    }

    let links = tree
        .links()
        .into_iter()
        .filter_map(|link| {
            let child = tree.node(link.child);
            let parent = tree.node(link.parent);
            Some(LinkCurve {
                child_id: child.id()?.to_string(),
                parent_id: parent.id()?.to_string(),
                from: Point { x: lefts[link.child] + cw, y: tops[link.child] + ch / 2.0 },
                to: Point { x: lefts[link.parent], y: tops[link.parent] + ch / 2.0 },
                parent_depth: parent.depth,
                reveal_delay_ms: (height - parent.depth) as u64 * LINK_REVEAL_STEP_MS + LINK_REVEAL_BASE_MS,
            })
        })
        .collect();

    let labels = round_labels(&tree.round_histogram(), params.labels)
        .into_iter()
        .enumerate()
        .map(|(index, text)| RoundLabelPosition {
            index,
            text,
            x: (offset + index as f64) * column,
            y: params.y_offset,
            width: cw,
            reveal_delay_ms: index as u64 * LABEL_REVEAL_STEP_MS,
        })
        .collect();

    let content_height = nodes
        .iter()
        .map(|n| n.y + n.height)
        .fold(None, |acc: Option<f64>, b| Some(acc.map_or(b, |a| a.max(b))))
        .map_or(0.0, |bottom| bottom - params.y_offset - header);

    SideLayout {
        side: params.side,
        title: params.title.map(str::to_string),
        y_offset: params.y_offset,
        nodes,
        links,
        labels,
        width: bracket_width,
        height: content_height + header,
        depth: height,
    }
}

// ---------------------------------------------------------------------------
// Tidy tree
// ---------------------------------------------------------------------------

/// Per-depth extreme nodes of a subtree, relative to the subtree root.
#[derive(Debug, Default)]
struct Contour {
    left: Vec<(f64, usize)>,
    right: Vec<(f64, usize)>,
}

/// Vertical offset of every node in units of the cell height.
///
/// Children are packed top to bottom so that neighbouring nodes at every
/// shared depth sit at least `separation(upper, lower)` apart, and each parent
/// is centred between its first and last child.
fn tidy_offsets(tree: &MatchTree<'_>, separation: impl Fn(usize, usize) -> f64) -> Vec<f64> {
    let n = tree.node_count();
    let mut relative = vec![0.0; n];
    let mut contours: Vec<Contour> = (0..n).map(|_| Contour::default()).collect();

    // Children always have larger indices than their parent.
    for idx in (0..n).rev() {
        let children = &tree.node(idx).children;
        let mut left = vec![(0.0, idx)];
        let mut right = vec![(0.0, idx)];

        if !children.is_empty() {
            let mut placed: Vec<f64> = Vec::with_capacity(children.len());
            let mut merged_left: Vec<(f64, usize)> = Vec::new();
            let mut merged_right: Vec<(f64, usize)> = Vec::new();

            for &child in children {
                let contour = std::mem::take(&mut contours[child]);
                let shift = if placed.is_empty() {
                    0.0
                } else {
                    merged_right
                        .iter()
                        .zip(&contour.left)
                        .map(|(&(upper_x, upper), &(lower_x, lower))| upper_x - lower_x + separation(upper, lower))
                        .fold(f64::NEG_INFINITY, f64::max)
                };
                placed.push(shift);

                for (d, &(x, node)) in contour.right.iter().enumerate() {
                    if d < merged_right.len() {
                        merged_right[d] = (x + shift, node);
                    } else {
                        merged_right.push((x + shift, node));
                    }
                }
                let known = merged_left.len();
                merged_left.extend(contour.left.iter().skip(known).map(|&(x, node)| (x + shift, node)));
            }

            let mid = (placed[0] + placed[placed.len() - 1]) / 2.0;
            for (&child, &pos) in children.iter().zip(&placed) {
                relative[child] = pos - mid;
            }
            left.extend(merged_left.into_iter().map(|(x, node)| (x - mid, node)));
            right.extend(merged_right.into_iter().map(|(x, node)| (x - mid, node)));
        }

        contours[idx] = Contour { left, right };
    }

    let mut absolute = vec![0.0; n];
    for idx in 1..n {
        if let Some(parent) = tree.node(idx).parent {
            absolute[idx] = absolute[parent] + relative[idx];
        }
    }
    debug_assert_eq!(absolute[ROOT], 0.0);
    absolute
}
