use std::collections::HashSet;

use crate::{Match, MatchGroup, MatchState, MatchTeam};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundRobinOptions {
    pub row_height: f64,
    pub row_width: f64,
    pub gap: f64,
}

impl Default for RoundRobinOptions {
    fn default() -> Self {
        Self { row_height: 45.0, row_width: 125.0, gap: 4.0 }
    }
}

/// A participant with a resolved id and a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridTeam {
    pub id: String,
    pub name: String,
}

/// Result styling of a pairing cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CellHighlight {
    #[default]
    None,
    InProgress,
    LeftWinner,
    TopWinner,
}

/// A pairing seen from the row team ("left") against the column team ("top").
#[derive(Debug, Clone, PartialEq)]
pub struct PairingCell {
    pub match_id: String,
    pub state: MatchState,
    pub left_team: MatchTeam,
    pub top_team: MatchTeam,
    pub highlight: CellHighlight,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridCellContent {
    /// Top-left corner.
    Blank,
    TeamName(GridTeam),
    /// A team against itself.
    NoMatch,
    Pairing(PairingCell),
    /// Two teams that have not been paired yet.
    Unpaired,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub content: GridCellContent,
}

impl GridCell {
    /// Position key, stable for as long as the grid size is.
    pub fn key(&self) -> String {
        format!("{}:{}", self.row, self.col)
    }
}

/// The `(N+1)×(N+1)` results matrix of one pool, cells in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundRobinGrid {
    pub group_id: String,
    pub teams: Vec<GridTeam>,
    pub size: usize,
    pub cells: Vec<GridCell>,
    pub width: f64,
    pub height: f64,
}

impl RoundRobinGrid {
    pub fn build(group: &MatchGroup, opts: &RoundRobinOptions) -> Self {
        let teams = unique_teams(&group.matches);
        let size = teams.len() + 1;
        let span = |unit: f64| size as f64 * unit + opts.gap * (size as f64 - 1.0);

        let mut cells = Vec::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                let content = match (row, col) {
                    (0, 0) => GridCellContent::Blank,
                    (0, c) => GridCellContent::TeamName(teams[c - 1].clone()),
                    (r, 0) => GridCellContent::TeamName(teams[r - 1].clone()),
                    (r, c) if r == c => GridCellContent::NoMatch,
                    (r, c) => pairing(&group.matches, &teams[r - 1], &teams[c - 1])
                        .map_or(GridCellContent::Unpaired, GridCellContent::Pairing),
                };
                cells.push(GridCell {
                    row,
                    col,
                    x: col as f64 * (opts.row_width + opts.gap),
                    y: row as f64 * (opts.row_height + opts.gap),
                    width: opts.row_width,
                    height: opts.row_height,
                    content,
                });
            }
        }

        Self { group_id: group.id.clone(), teams, size, cells, width: span(opts.row_width), height: span(opts.row_height) }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&GridCell> {
        (row < self.size && col < self.size).then(|| &self.cells[row * self.size + col])
    }
}

/// Participants in first-appearance order over each match's bottom then top
/// slot. Byes and nameless slots are skipped.
pub fn unique_teams(matches: &[Match]) -> Vec<GridTeam> {
    let mut seen = HashSet::new();
    let mut teams = Vec::new();
    for m in matches {
        for team in [&m.bottom_team, &m.top_team] {
            let (Some(id), Some(name)) = (&team.id, &team.name) else { continue };
            if seen.insert(id.as_str()) {
                teams.push(GridTeam { id: id.clone(), name: name.clone() });
            }
        }
    }
    teams
}

fn pairing(matches: &[Match], row_team: &GridTeam, col_team: &GridTeam) -> Option<PairingCell> {
    let m = matches.iter().find(|m| m.involves(&row_team.id) && m.involves(&col_team.id))?;

    // Whichever slot the source recorded the row team in becomes "left".
    let (left_team, top_team) = if m.bottom_team.id.as_deref() == Some(row_team.id.as_str()) {
        (&m.bottom_team, &m.top_team)
    } else {
        (&m.top_team, &m.bottom_team)
    };

    let highlight = match (m.state, left_team.score, top_team.score) {
        (MatchState::InProgress, _, _) => CellHighlight::InProgress,
        (MatchState::Completed, Some(left), Some(top)) if left > top => CellHighlight::LeftWinner,
        (MatchState::Completed, Some(_), Some(_)) => CellHighlight::TopWinner,
        _ => CellHighlight::None,
    };

    Some(PairingCell {
        match_id: m.id.clone(),
        state: m.state,
        left_team: left_team.clone(),
        top_team: top_team.clone(),
        highlight,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: Option<&str>, name: &str, score: Option<i64>) -> MatchTeam {
        MatchTeam { id: id.map(str::to_string), name: Some(name.to_string()), score, ..MatchTeam::default() }
    }

    fn game(id: &str, bottom: MatchTeam, top: MatchTeam, state: MatchState) -> Match {
        Match { id: id.to_string(), bottom_team: bottom, top_team: top, state, ..Match::default() }
    }

    fn pool() -> MatchGroup {
        MatchGroup {
            id: "pool-a".into(),
            name: "Pool A".into(),
            matches: vec![
                game("m0", team(Some("x"), "X", None), team(None, "BYE", None), MatchState::Completed),
                game("m1", team(Some("y"), "Y", Some(1)), team(Some("x"), "X", Some(2)), MatchState::Completed),
                game("m2", team(Some("z"), "Z", None), team(Some("y"), "Y", None), MatchState::NotStarted),
            ],
            ..MatchGroup::default()
        }
    }

    #[test]
    fn teams_in_first_appearance_order_without_byes() {
        let names: Vec<_> = unique_teams(&pool().matches).into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn grid_has_headers_and_diagonal() {
        let group = pool();
        let opts = RoundRobinOptions::default();
        let grid = RoundRobinGrid::build(&group, &opts);
        let cells = &grid.cells;

        assert_eq!(grid.size, 4);
        assert_eq!(cells.len(), 16);
        assert_eq!(cells.iter().filter(|c| c.content == GridCellContent::NoMatch).count(), 3);
        assert_eq!(cells[0].content, GridCellContent::Blank);
        assert!(matches!(&cells[1].content, GridCellContent::TeamName(t) if t.name == "X"));
        assert!(matches!(&cells[4].content, GridCellContent::TeamName(t) if t.name == "X"));
    }

    #[test]
    fn row_team_is_always_left() {
        let group = pool();
        let opts = RoundRobinOptions::default();
        let grid = RoundRobinGrid::build(&group, &opts);

        // Row Y, column X.
        let Some(GridCellContent::Pairing(cell)) = grid.cell(2, 1).map(|c| &c.content) else { panic!("expected pairing") };
        assert_eq!(cell.left_team.name.as_deref(), Some("Y"));
        assert_eq!(cell.left_team.score, Some(1));
        assert_eq!(cell.top_team.score, Some(2));
        assert_eq!(cell.highlight, CellHighlight::TopWinner);

        // Mirror cell: row X, column Y.
        let Some(GridCellContent::Pairing(cell)) = grid.cell(1, 2).map(|c| &c.content) else { panic!("expected pairing") };
        assert_eq!(cell.left_team.name.as_deref(), Some("X"));
        assert_eq!(cell.highlight, CellHighlight::LeftWinner);
    }

    #[test]
    fn unpaired_teams_get_placeholder() {
        let group = pool();
        let opts = RoundRobinOptions::default();
        let grid = RoundRobinGrid::build(&group, &opts);
        // Row X, column Z.
        assert_eq!(grid.cell(1, 3).map(|c| &c.content), Some(&GridCellContent::Unpaired));
    }

    #[test]
    fn content_size_includes_gaps() {
        let group = pool();
        let grid = RoundRobinGrid::build(&group, &RoundRobinOptions::default());
        assert_eq!(grid.width, 4.0 * 125.0 + 12.0);
        assert_eq!(grid.height, 4.0 * 45.0 + 12.0);
    }
}
