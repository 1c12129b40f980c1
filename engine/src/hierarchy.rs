use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use log::warn;

use crate::Match;
use crate::error::{LayoutError, LayoutResult};

pub const ROOT: usize = 0;

#[derive(Debug, Clone)]
pub struct TreeNode<'a> {
    /// `None` only for the synthetic root.
    pub data: Option<&'a Match>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Distance from the synthetic root. Finals sit at depth 1.
    pub depth: usize,
    /// Longest distance down to a leaf.
    pub height: usize,
}

impl<'a> TreeNode<'a> {
    pub fn id(&self) -> Option<&'a str> {
        self.data.map(|m| m.id.as_str())
    }
}

/// One bracket side, rebuilt from forward `next_match_id` pointers.
///
/// Node 0 is always the synthetic root; its children are the matches of the
/// final round.
#[derive(Debug, Clone)]
pub struct MatchTree<'a> {
    nodes: Vec<TreeNode<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeLink {
    pub parent: usize,
    pub child: usize,
}

impl<'a> MatchTree<'a> {
    pub fn build<I>(matches: I, group_id: &str) -> LayoutResult<Self>
    where
        I: IntoIterator<Item = &'a Match>,
    {
        let matches: Vec<&'a Match> = matches.into_iter().collect();
        let mut nodes = vec![TreeNode { data: None, parent: None, children: Vec::new(), depth: 0, height: 0 }];

        if matches.is_empty() {
            return Ok(Self { nodes });
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(matches.len());
        if let Some(dup) = matches.iter().find(|m| !seen.insert(m.id.as_str())) {
            return Err(LayoutError::DuplicateMatchId { match_id: dup.id.clone(), group_id: group_id.to_string() });
        }

        for m in matches.iter().filter(|m| m.round_number.is_none()) {
            warn!("match {} in group {group_id} has no round number; counting it at its tree height", m.id);
        }

        let final_round = matches.iter().filter_map(|m| m.round_number).max().ok_or_else(|| LayoutError::NoFinalRound {
            group_id: group_id.to_string(),
        })?;

        let mut children_of: HashMap<&str, Vec<&'a Match>> = HashMap::new();
        for &m in &matches {
            if let Some(next) = m.next_match_id.as_deref() {
                children_of.entry(next).or_default().push(m);
            }
        }

        let mut visited: HashSet<&'a str> = HashSet::new();
        let mut queue: VecDeque<usize> = VecDeque::new();

        for m in matches.iter().copied().filter(|m| m.round_number == Some(final_round)) {
            Self::attach(&mut nodes, &mut visited, &mut queue, ROOT, m)?;
        }

        while let Some(idx) = queue.pop_front() {
            let Some(id) = nodes[idx].id() else { continue };
            let Some(children) = children_of.get(id) else { continue };
            for &child in children {
                Self::attach(&mut nodes, &mut visited, &mut queue, idx, child)?;
            }
        }

        let unreachable: Vec<&str> = matches.iter().map(|m| m.id.as_str()).filter(|id| !visited.contains(id)).collect();
        if !unreachable.is_empty() {
            warn!(
                "group {group_id}: {} match(es) do not lead to round {final_round} and were dropped: {}",
                unreachable.len(),
                unreachable.join(", ")
            );
        }

        let mut tree = Self { nodes };
        tree.compute_heights();
        Ok(tree)
    }

    fn attach(
        nodes: &mut Vec<TreeNode<'a>>,
        visited: &mut HashSet<&'a str>,
        queue: &mut VecDeque<usize>,
        parent: usize,
        m: &'a Match,
    ) -> LayoutResult<()> {
        if !visited.insert(m.id.as_str()) {
            return Err(LayoutError::Cycle { match_id: m.id.clone() });
        }
        let idx = nodes.len();
        let depth = nodes[parent].depth + 1;
        nodes.push(TreeNode { data: Some(m), parent: Some(parent), children: Vec::new(), depth, height: 0 });
        nodes[parent].children.push(idx);
        queue.push_back(idx);
        Ok(())
    }

    // Nodes are pushed breadth first, so every child comes after its parent.
    fn compute_heights(&mut self) {
        for idx in (1..self.nodes.len()).rev() {
            let h = self.nodes[idx].height + 1;
            if let Some(parent) = self.nodes[idx].parent
                && self.nodes[parent].height < h
            {
                self.nodes[parent].height = h;
            }
        }
    }

    pub fn root(&self) -> &TreeNode<'a> {
        &self.nodes[ROOT]
    }

    pub fn node(&self, idx: usize) -> &TreeNode<'a> {
        &self.nodes[idx]
    }

    /// Number of elimination rounds on this side.
    pub fn height(&self) -> usize {
        self.nodes[ROOT].height
    }

    /// Node count, synthetic root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Match nodes in breadth-first order, root excluded.
    pub fn descendants(&self) -> impl Iterator<Item = (usize, &TreeNode<'a>)> {
        self.nodes.iter().enumerate().skip(1)
    }

    /// Parent/child pairs between two real matches.
    pub fn links(&self) -> Vec<TreeLink> {
        self.descendants()
            .filter_map(|(child, node)| node.parent.filter(|&p| p != ROOT).map(|parent| TreeLink { parent, child }))
            .collect()
    }

    pub fn leaves(&self) -> impl Iterator<Item = (usize, &TreeNode<'a>)> {
        self.descendants().filter(|(_, n)| n.children.is_empty())
    }

    /// Match count per round. A match without a round number is counted at
    /// its height, which is where it would sit in a regular bracket.
    pub fn round_histogram(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for (_, node) in self.descendants() {
            let Some(m) = node.data else { continue };
            let round = m.round_number.unwrap_or(node.height as u32);
            *counts.entry(round).or_insert(0) += 1;
        }
        counts
    }

    /// Moves losers-side matches after their winners-side siblings, which is
    /// where a third-place match is drawn.
    pub fn sort_losers_last(&mut self) {
        for idx in 0..self.nodes.len() {
            let mut children = std::mem::take(&mut self.nodes[idx].children);
            children.sort_by_key(|&c| self.nodes[c].data.is_some_and(Match::is_losers));
            self.nodes[idx].children = children;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(id: &str, round: Option<u32>, next: Option<&str>) -> Match {
        Match {
            id: id.to_string(),
            round_number: round,
            next_match_id: next.map(str::to_string),
            ..Match::default()
        }
    }

    #[test]
    fn three_match_bracket_has_final_on_top() {
        let matches = vec![m("A", Some(1), Some("C")), m("B", Some(1), Some("C")), m("C", Some(2), None)];
        let tree = MatchTree::build(&matches, "g").unwrap();

        assert_eq!(tree.height(), 2);
        assert_eq!(tree.root().children.len(), 1);
        let final_idx = tree.root().children[0];
        assert_eq!(tree.node(final_idx).id(), Some("C"));
        let kids: Vec<_> = tree.node(final_idx).children.iter().map(|&c| tree.node(c).id().unwrap()).collect();
        assert_eq!(kids, vec!["A", "B"]);
        assert_eq!(tree.links().len(), 2);
    }

    #[test]
    fn every_leaf_walks_up_to_the_root_once() {
        let matches = vec![
            m("1", Some(1), Some("5")),
            m("2", Some(1), Some("5")),
            m("3", Some(1), Some("6")),
            m("4", Some(1), Some("6")),
            m("5", Some(2), Some("7")),
            m("6", Some(2), Some("7")),
            m("7", Some(3), None),
        ];
        let tree = MatchTree::build(&matches, "g").unwrap();
        assert_eq!(tree.height(), 3);
        for (idx, _) in tree.leaves() {
            let mut hops = 0;
            let mut cur = Some(idx);
            while let Some(i) = cur {
                cur = tree.node(i).parent;
                hops += 1;
            }
            assert_eq!(hops, 4);
        }
    }

    #[test]
    fn no_round_numbers_is_an_error() {
        let matches = vec![m("A", None, Some("B")), m("B", None, None)];
        let err = MatchTree::build(&matches, "g").unwrap_err();
        assert!(matches!(err, LayoutError::NoFinalRound { .. }));
    }

    #[test]
    fn cycle_through_final_round_is_rejected() {
        let matches = vec![m("A", Some(2), Some("B")), m("B", Some(2), Some("A"))];
        let err = MatchTree::build(&matches, "g").unwrap_err();
        assert!(matches!(err, LayoutError::Cycle { .. }));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let matches = vec![m("A", Some(1), None), m("A", Some(1), None)];
        let err = MatchTree::build(&matches, "g").unwrap_err();
        assert!(matches!(err, LayoutError::DuplicateMatchId { ref match_id, .. } if match_id == "A"));
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn disconnected_matches_are_dropped() {
        let matches = vec![m("A", Some(1), Some("C")), m("C", Some(2), None), m("X", Some(1), Some("nowhere"))];
        let tree = MatchTree::build(&matches, "g").unwrap();
        assert_eq!(tree.descendants().count(), 2);
    }

    #[test]
    fn empty_side_builds_an_empty_tree() {
        let matches: Vec<Match> = Vec::new();
        let tree = MatchTree::build(&matches, "g").unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn histogram_counts_per_round() {
        let matches = vec![m("A", Some(1), Some("C")), m("B", Some(1), Some("C")), m("C", Some(2), None)];
        let tree = MatchTree::build(&matches, "g").unwrap();
        let hist = tree.round_histogram();
        assert_eq!(hist.get(&1), Some(&2));
        assert_eq!(hist.get(&2), Some(&1));
    }

    #[test]
    fn round_less_leaf_is_counted_at_its_height() {
        use crate::EliminationKind;
        use crate::labels::{LabelContext, round_labels};

        let matches = vec![m("A", None, Some("C")), m("B", Some(1), Some("C")), m("C", Some(2), None)];
        let tree = MatchTree::build(&matches, "g").unwrap();
        assert_eq!(tree.height(), 2);

        // A is a leaf, so it lands in round 0 and the histogram sees one
        // more round than the tree has columns.
        let hist = tree.round_histogram();
        assert_eq!(hist, BTreeMap::from([(0, 1), (1, 1), (2, 1)]));

        let ctx = LabelContext {
            kind: EliminationKind::Single,
            is_losers_side: false,
            has_bracket_reset: false,
            has_third_place_match: false,
        };
        assert_eq!(round_labels(&hist, ctx), vec!["Finals", "Grand Finals", "Bracket Reset"]);
    }
}
