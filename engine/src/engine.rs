use std::collections::HashMap;

use log::{debug, info};

use crate::error::{LayoutError, LayoutResult};
use crate::formatter::{BaseTextFormatter, ScoreContext, TextFormatter};
use crate::layout::{EliminationLayout, EliminationOptions, layout_elimination};
use crate::reconcile::{Field, PreviousRenderState, Reconciliation, RenderScope, RenderedField, reconcile};
use crate::round_robin::{GridCellContent, RoundRobinGrid, RoundRobinOptions};
use crate::swiss::{SwissList, SwissOptions};
use crate::viewport::{DEFAULT_MAX_SCALE, Size};
use crate::{Bracket, BracketType, EliminationKind, Match, MatchGroup, MatchState, MatchTeam};

/// Which layout builder a bracket type is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    Elimination(EliminationKind),
    RoundRobin,
    Swiss,
}

impl EngineKind {
    pub fn for_bracket_type(bracket_type: BracketType) -> LayoutResult<Self> {
        match bracket_type {
            BracketType::SingleElimination => Ok(EngineKind::Elimination(EliminationKind::Single)),
            BracketType::DoubleElimination => Ok(EngineKind::Elimination(EliminationKind::Double)),
            BracketType::RoundRobin => Ok(EngineKind::RoundRobin),
            BracketType::Swiss => Ok(EngineKind::Swiss),
            BracketType::Ladder => Err(LayoutError::UnsupportedBracketType(bracket_type)),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            EngineKind::Elimination(_) => "elimination",
            EngineKind::RoundRobin => "round robin",
            EngineKind::Swiss => "swiss",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineOptions {
    pub elimination: EliminationOptions,
    pub round_robin: RoundRobinOptions,
    pub swiss: SwissOptions,
    /// Upper bound for fit-to-viewport zoom.
    pub max_scale: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            elimination: EliminationOptions::default(),
            round_robin: RoundRobinOptions::default(),
            swiss: SwissOptions::default(),
            max_scale: DEFAULT_MAX_SCALE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BracketView {
    Elimination(EliminationLayout),
    RoundRobin(RoundRobinGrid),
    Swiss(SwissList),
}

impl BracketView {
    pub fn content_size(&self) -> Size {
        match self {
            BracketView::Elimination(layout) => Size::new(layout.width, layout.height),
            BracketView::RoundRobin(grid) => Size::new(grid.width, grid.height),
            BracketView::Swiss(list) => Size::new(0.0, list.height),
        }
    }
}

/// Everything a renderer needs for one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    pub kind: EngineKind,
    pub bracket_type: BracketType,
    pub bracket_name: String,
    pub group_name: String,
    pub view: BracketView,
    /// Per-field actions, including the current text of every field.
    pub reconciliation: Reconciliation,
    pub content_size: Size,
}

/// Lays out one snapshot and diffs it against `prev`.
///
/// On error nothing is produced and the caller keeps `prev` as it was.
pub fn render(
    prev: &PreviousRenderState,
    bracket: &Bracket,
    opts: &EngineOptions,
    formatter: &dyn TextFormatter,
) -> LayoutResult<(RenderOutcome, PreviousRenderState)> {
    let kind = EngineKind::for_bracket_type(bracket.bracket_type)?;
    let group = single_group(bracket, kind)?;

    let (view, scope, fields) = match kind {
        EngineKind::Elimination(elim) => {
            let layout = layout_elimination(elim, group, &opts.elimination)?;
            let scope = RenderScope::Elimination { group_id: group.id.clone(), contained: group.contained_match_type };
            let fields = elimination_fields(&layout, group, bracket.bracket_type, formatter);
            (BracketView::Elimination(layout), scope, fields)
        }
        EngineKind::RoundRobin => {
            let grid = RoundRobinGrid::build(group, &opts.round_robin);
            let scope = RenderScope::RoundRobin { group_id: group.id.clone(), grid_size: grid.size };
            let fields = round_robin_fields(&grid, formatter);
            (BracketView::RoundRobin(grid), scope, fields)
        }
        EngineKind::Swiss => {
            let list = SwissList::build(group, bracket.round_number, &opts.swiss);
            let scope = RenderScope::Swiss { group_id: group.id.clone(), round_number: bracket.round_number };
            let fields = list
                .rows
                .iter()
                .flat_map(|row| match_fields(&row.match_id, &row.top_team, &row.bottom_team, row.state, BracketType::Swiss, formatter))
                .collect();
            (BracketView::Swiss(list), scope, fields)
        }
    };

    let (reconciliation, next) = reconcile(prev, scope, fields);
    if reconciliation.rebuild {
        info!("rendering {} group {} ({})", kind.name(), group.id, bracket.name);
    } else {
        debug!("{} field(s) changed in group {}", reconciliation.updates().count(), group.id);
    }

    let content_size = view.content_size();
    Ok((
        RenderOutcome {
            kind,
            bracket_type: bracket.bracket_type,
            bracket_name: bracket.name.clone(),
            group_name: group.name.clone(),
            view,
            reconciliation,
            content_size,
        },
        next,
    ))
}

fn single_group(bracket: &Bracket, kind: EngineKind) -> LayoutResult<&MatchGroup> {
    match bracket.match_groups.as_slice() {
        [group] => Ok(group),
        groups => Err(LayoutError::GroupCount { kind: kind.name(), found: groups.len() }),
    }
}

fn match_fields(
    id: &str,
    top: &MatchTeam,
    bottom: &MatchTeam,
    state: MatchState,
    bracket_type: BracketType,
    formatter: &dyn TextFormatter,
) -> [RenderedField; 4] {
    let score = |team: &MatchTeam, opponent: &MatchTeam| {
        formatter.format_score(&ScoreContext { team: Some(team), opponent: Some(opponent), bracket_type, match_state: state })
    };
    [
        RenderedField::new(id, Field::TopTeamName, formatter.format_team_name(top.name.as_deref())),
        RenderedField::new(id, Field::TopScore, score(top, bottom)),
        RenderedField::new(id, Field::BottomTeamName, formatter.format_team_name(bottom.name.as_deref())),
        RenderedField::new(id, Field::BottomScore, score(bottom, top)),
    ]
}

fn elimination_fields(
    layout: &EliminationLayout,
    group: &MatchGroup,
    bracket_type: BracketType,
    formatter: &dyn TextFormatter,
) -> Vec<RenderedField> {
    let by_id: HashMap<&str, &Match> = group.matches.iter().map(|m| (m.id.as_str(), m)).collect();
    layout
        .nodes()
        .filter_map(|node| by_id.get(node.id.as_str()))
        .flat_map(|m| match_fields(&m.id, &m.top_team, &m.bottom_team, m.state, bracket_type, formatter))
        .collect()
}

fn round_robin_fields(grid: &RoundRobinGrid, formatter: &dyn TextFormatter) -> Vec<RenderedField> {
    let mut fields = Vec::new();
    for cell in &grid.cells {
        let key = cell.key();
        match &cell.content {
            GridCellContent::TeamName(team) => {
                fields.push(RenderedField::new(key, Field::TeamName, formatter.format_team_name(Some(&team.name))));
            }
            GridCellContent::Pairing(pairing) => {
                let score = |team: &MatchTeam, opponent: &MatchTeam| {
                    formatter.format_score(&ScoreContext {
                        team: Some(team),
                        opponent: Some(opponent),
                        bracket_type: BracketType::RoundRobin,
                        match_state: pairing.state,
                    })
                };
                let left = score(&pairing.left_team, &pairing.top_team);
                let top = score(&pairing.top_team, &pairing.left_team);
                fields.push(RenderedField::new(key.clone(), Field::LeftScore, left));
                fields.push(RenderedField::new(key, Field::TopScore, top));
            }
            GridCellContent::Unpaired => {
                let empty = ScoreContext { team: None, opponent: None, bracket_type: BracketType::RoundRobin, match_state: MatchState::Unknown };
                fields.push(RenderedField::new(key.clone(), Field::LeftScore, formatter.format_score(&empty)));
                fields.push(RenderedField::new(key, Field::TopScore, formatter.format_score(&empty)));
            }
            GridCellContent::Blank | GridCellContent::NoMatch => {}
        }
    }
    fields
}

/// Owns the previous render state for callers that prefer to hand over
/// snapshots one at a time.
#[derive(Debug)]
pub struct BracketRenderer<F: TextFormatter = BaseTextFormatter> {
    options: EngineOptions,
    formatter: F,
    state: PreviousRenderState,
}

impl BracketRenderer<BaseTextFormatter> {
    pub fn new(options: EngineOptions) -> Self {
        Self::with_formatter(options, BaseTextFormatter)
    }
}

impl<F: TextFormatter> BracketRenderer<F> {
    pub fn with_formatter(options: EngineOptions, formatter: F) -> Self {
        Self { options, formatter, state: PreviousRenderState::default() }
    }

    /// Renders `bracket`. The remembered state only advances on success.
    pub fn set_data(&mut self, bracket: &Bracket) -> LayoutResult<RenderOutcome> {
        let (outcome, next) = render(&self.state, bracket, &self.options, &self.formatter)?;
        self.state = next;
        Ok(outcome)
    }

    pub fn state(&self) -> &PreviousRenderState {
        &self.state
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Forgets the previous render so the next snapshot is a full rebuild.
    pub fn reset(&mut self) {
        self.state = PreviousRenderState::default();
    }
}
