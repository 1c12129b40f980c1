use std::collections::BTreeSet;

use tourneyview_engine::hierarchy::MatchTree;
use tourneyview_engine::layout::BracketSide;
use tourneyview_engine::round_robin::GridCellContent;
use tourneyview_engine::source::{Selector, select};
use tourneyview_engine::{
    ActionKind, BaseTextFormatter, Bracket, BracketRenderer, BracketType, BracketView, EngineOptions, Field, LayoutError, Match,
    MatchGroup, MatchState, MatchTeam, PreviousRenderState, render,
};

const SINGLE: &str = include_str!("../../data/single_elimination.json");
const DOUBLE: &str = include_str!("../../data/double_elimination.json");
const ROUND_ROBIN: &str = include_str!("../../data/round_robin.json");
const SWISS: &str = include_str!("../../data/swiss.json");

fn load(raw: &str) -> Bracket {
    let bracket: Bracket = serde_json::from_str(raw).expect("fixture parses");
    select(bracket, &Selector::default()).expect("fixture selects")
}

fn m(id: &str, round: u32, next: Option<&str>) -> Match {
    Match { id: id.into(), round_number: Some(round), next_match_id: next.map(str::to_string), ..Match::default() }
}

#[test]
fn identical_snapshots_produce_no_updates() {
    for raw in [SINGLE, DOUBLE, ROUND_ROBIN, SWISS] {
        let bracket = load(raw);
        let mut renderer = BracketRenderer::new(EngineOptions::default());
        let first = renderer.set_data(&bracket).unwrap();
        assert!(first.reconciliation.rebuild);
        assert_eq!(first.reconciliation.count(ActionKind::Enter), first.reconciliation.actions.len());

        let second = renderer.set_data(&bracket).unwrap();
        assert!(!second.reconciliation.rebuild, "{}", bracket.name);
        assert_eq!(second.reconciliation.updates().count(), 0, "{}", bracket.name);
        assert_eq!(second.reconciliation.count(ActionKind::Enter), 0, "{}", bracket.name);
    }
}

#[test]
fn tree_height_matches_distinct_rounds() {
    let bracket = load(SINGLE);
    let group = &bracket.match_groups[0];
    let tree = MatchTree::build(&group.matches, &group.id).unwrap();

    let rounds: BTreeSet<_> = group.matches.iter().filter_map(|m| m.round_number).collect();
    assert_eq!(tree.height(), rounds.len());

    for (leaf, _) in tree.leaves() {
        let mut path = vec![leaf];
        while let Some(parent) = tree.node(*path.last().unwrap()).parent {
            path.push(parent);
        }
        assert_eq!(*path.last().unwrap(), 0);
        let unique: BTreeSet<_> = path.iter().collect();
        assert_eq!(unique.len(), path.len());
    }
}

#[test]
fn one_label_per_round_on_every_side() {
    for raw in [SINGLE, DOUBLE] {
        let bracket = load(raw);
        let outcome = render(&PreviousRenderState::default(), &bracket, &EngineOptions::default(), &BaseTextFormatter).unwrap().0;
        let BracketView::Elimination(layout) = outcome.view else { panic!("elimination view expected") };
        for side in &layout.sides {
            let rounds: BTreeSet<_> = bracket.match_groups[0]
                .matches
                .iter()
                .filter(|m| match side.side {
                    BracketSide::Losers => m.is_losers(),
                    BracketSide::Winners => !m.is_losers(),
                    BracketSide::Main => true,
                })
                .filter_map(|m| m.round_number)
                .collect();
            assert_eq!(side.labels.len(), rounds.len(), "{:?} side of {}", side.side, bracket.name);
        }
    }
}

#[test]
fn double_elimination_fixture_labels() {
    let bracket = load(DOUBLE);
    let outcome = render(&PreviousRenderState::default(), &bracket, &EngineOptions::default(), &BaseTextFormatter).unwrap().0;
    let BracketView::Elimination(layout) = outcome.view else { panic!("elimination view expected") };
    let names = |i: usize| layout.sides[i].labels.iter().map(|l| l.text.clone()).collect::<Vec<_>>();
    assert_eq!(names(0), vec!["Semi-Finals", "Finals", "Grand Finals", "Bracket Reset"]);
    assert_eq!(names(1), vec!["Semi-Finals", "Finals"]);
}

#[test]
fn three_match_bracket_is_semis_and_finals() {
    let bracket = Bracket {
        bracket_type: BracketType::SingleElimination,
        match_groups: vec![MatchGroup {
            id: "g".into(),
            matches: vec![m("A", 1, Some("C")), m("B", 1, Some("C")), m("C", 2, None)],
            ..MatchGroup::default()
        }],
        ..Bracket::default()
    };
    let outcome = render(&PreviousRenderState::default(), &bracket, &EngineOptions::default(), &BaseTextFormatter).unwrap().0;
    let BracketView::Elimination(layout) = outcome.view else { panic!("elimination view expected") };
    assert_eq!(layout.depth(), 2);
    let labels: Vec<_> = layout.sides[0].labels.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(labels, vec!["Semi-Finals", "Finals"]);
}

#[test]
fn round_robin_grid_is_square_with_one_diagonal() {
    let bracket = load(ROUND_ROBIN);
    let outcome = render(&PreviousRenderState::default(), &bracket, &EngineOptions::default(), &BaseTextFormatter).unwrap().0;
    let BracketView::RoundRobin(grid) = outcome.view else { panic!("grid expected") };

    let n = grid.teams.len();
    assert_eq!(n, 4);
    assert_eq!(grid.cells.len(), (n + 1) * (n + 1));
    assert_eq!(grid.cells.iter().filter(|c| c.content == GridCellContent::NoMatch).count(), n);

    let group = &bracket.match_groups[0];
    for cell in &grid.cells {
        if let GridCellContent::Pairing(p) = &cell.content {
            let row = &grid.teams[cell.row - 1];
            let col = &grid.teams[cell.col - 1];
            let candidates = group.matches.iter().filter(|m| m.involves(&row.id) && m.involves(&col.id)).count();
            assert_eq!(candidates, 1);
            assert_eq!(p.left_team.id.as_deref(), Some(row.id.as_str()));
        }
    }
}

#[test]
fn round_robin_orientation_follows_row_team() {
    let x = MatchTeam::new("x", "X").with_score(2);
    let y = MatchTeam::new("y", "Y").with_score(1);
    let z = MatchTeam::new("z", "Z");
    let bye = MatchTeam::default();
    let matches = vec![
        Match { id: "x-bye".into(), bottom_team: MatchTeam::new("x", "X"), top_team: bye.clone(), ..Match::default() },
        Match { id: "xy".into(), state: MatchState::Completed, bottom_team: y, top_team: x, ..Match::default() },
        Match { id: "z-bye".into(), bottom_team: z, top_team: bye, ..Match::default() },
    ];
    let bracket = Bracket {
        bracket_type: BracketType::RoundRobin,
        match_groups: vec![MatchGroup { id: "pool".into(), matches, ..MatchGroup::default() }],
        ..Bracket::default()
    };
    let outcome = render(&PreviousRenderState::default(), &bracket, &EngineOptions::default(), &BaseTextFormatter).unwrap().0;
    let BracketView::RoundRobin(grid) = &outcome.view else { panic!("grid expected") };

    let names: Vec<_> = grid.teams.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["X", "Y", "Z"]);

    // Row Y, column X.
    let cell = grid.cell(2, 1).unwrap();
    let GridCellContent::Pairing(p) = &cell.content else { panic!("pairing expected") };
    assert_eq!(p.left_team.name.as_deref(), Some("Y"));
    assert_eq!(p.top_team.name.as_deref(), Some("X"));
    assert_eq!(outcome.reconciliation.text(&cell.key(), Field::LeftScore), Some("1"));
    assert_eq!(outcome.reconciliation.text(&cell.key(), Field::TopScore), Some("2"));

    // Unplayed pairing shows the placeholder score.
    let unplayed = grid.cell(1, 3).unwrap();
    assert_eq!(unplayed.content, GridCellContent::Unpaired);
    assert_eq!(outcome.reconciliation.text(&unplayed.key(), Field::LeftScore), Some("?"));
}

#[test]
fn byes_never_become_rows() {
    let bracket = load(ROUND_ROBIN);
    let outcome = render(&PreviousRenderState::default(), &bracket, &EngineOptions::default(), &BaseTextFormatter).unwrap().0;
    let BracketView::RoundRobin(grid) = outcome.view else { panic!("grid expected") };
    assert!(grid.teams.iter().all(|t| !t.id.is_empty() && !t.name.is_empty()));
    assert_eq!(grid.size, 5);
}

#[test]
fn score_change_updates_only_the_score() {
    let mut bracket = load(SINGLE);
    let mut renderer = BracketRenderer::new(EngineOptions::default());
    renderer.set_data(&bracket).unwrap();

    let live = bracket.match_groups[0].matches.iter_mut().find(|m| m.id == "r2-2").unwrap();
    assert_eq!(live.top_team.score, Some(1));
    live.top_team.score = Some(2);

    let outcome = renderer.set_data(&bracket).unwrap();
    let updates: Vec<_> = outcome.reconciliation.updates().collect();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].id, "r2-2");
    assert_eq!(updates[0].field, Field::TopScore);
    assert_eq!(updates[0].old_value.as_deref(), Some("1"));
    assert_eq!(updates[0].new_value, "2");
    assert_eq!(outcome.reconciliation.text("r2-2", Field::TopTeamName), Some("Octo Crew"));
}

#[test]
fn switching_double_elimination_side_rebuilds() {
    let full = load(DOUBLE);
    let mut renderer = BracketRenderer::new(EngineOptions::default());
    renderer.set_data(&full).unwrap();

    let losers: Bracket = serde_json::from_str(DOUBLE).unwrap();
    let losers = select(
        losers,
        &Selector { match_type: Some(tourneyview_engine::ContainedMatchType::Losers), ..Selector::default() },
    )
    .unwrap();
    let outcome = renderer.set_data(&losers).unwrap();
    assert!(outcome.reconciliation.rebuild);
    let BracketView::Elimination(layout) = outcome.view else { panic!("elimination view expected") };
    assert_eq!(layout.sides.len(), 1);
    assert_eq!(layout.sides[0].title.as_deref(), Some("Losers Bracket"));
}

#[test]
fn swiss_rows_follow_the_active_round() {
    let bracket = load(SWISS);
    let outcome = render(&PreviousRenderState::default(), &bracket, &EngineOptions::default(), &BaseTextFormatter).unwrap().0;
    let BracketView::Swiss(list) = outcome.view else { panic!("swiss view expected") };
    assert_eq!(list.round_number, Some(2));
    let ids: Vec<_> = list.rows.iter().map(|r| r.match_id.as_str()).collect();
    assert_eq!(ids, vec!["s2-1", "s2-2", "s2-3", "s2-4"]);
    assert_eq!(outcome.reconciliation.text("s2-2", Field::TopScore), Some("-"));
}

#[test]
fn cyclic_pointers_are_rejected() {
    let bracket = Bracket {
        bracket_type: BracketType::SingleElimination,
        match_groups: vec![MatchGroup {
            id: "g".into(),
            matches: vec![m("A", 2, Some("B")), m("B", 2, Some("A"))],
            ..MatchGroup::default()
        }],
        ..Bracket::default()
    };
    let err = render(&PreviousRenderState::default(), &bracket, &EngineOptions::default(), &BaseTextFormatter).unwrap_err();
    assert!(matches!(err, LayoutError::Cycle { .. }));
}
