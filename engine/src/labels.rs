use std::collections::BTreeMap;

use crate::EliminationKind;

/// Inputs to [`round_labels`] besides the histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelContext {
    pub kind: EliminationKind,
    pub is_losers_side: bool,
    /// Carried for callers; the histogram already shows a reset as a third
    /// single-match round.
    pub has_bracket_reset: bool,
    pub has_third_place_match: bool,
}

/// Names every round of one bracket side, earliest first.
///
/// This is a best-effort reading of the per-round match counts. Irregular
/// brackets fall back to "Round N" instead of failing.
pub fn round_labels(histogram: &BTreeMap<u32, usize>, ctx: LabelContext) -> Vec<String> {
    let total_rounds = histogram.len();
    let Some(&max_round) = histogram.keys().next_back() else {
        return Vec::new();
    };

    let count = |offset: usize| -> Option<usize> {
        i64::from(max_round)
            .checked_sub(offset as i64)
            .and_then(|r| u32::try_from(r).ok())
            .and_then(|r| histogram.get(&r).copied())
    };
    // A missing round never passes a `<=` test.
    let at_most = |offset: usize, limit: usize| count(offset).is_some_and(|c| c <= limit);

    let mut labels: Vec<&'static str> = Vec::new();

    if ctx.is_losers_side {
        if total_rounds >= 2 && count(0) == Some(1) {
            labels.push("Semi-Finals");
            if count(1) == Some(1) {
                labels.push("Finals");
            }
        }

        // The round two back may not exist on a short losers side.
        if at_most(labels.len(), 2) && count(labels.len() + 1).unwrap_or(0) <= 2 {
            labels.insert(0, "Quarter-Finals");
        }
    } else {
        let finals_size = if ctx.kind == EliminationKind::Single && ctx.has_third_place_match { 2 } else { 1 };

        if total_rounds >= 3 && count(0) == Some(1) && count(1) == Some(1) && count(2) == Some(1) {
            labels.extend(["Finals", "Grand Finals", "Bracket Reset"]);
        } else if total_rounds >= 2 && count(0) == Some(1) && count(1) == Some(1) {
            labels.extend(["Finals", "Grand Finals"]);
        } else if count(0) == Some(finals_size) {
            labels.push("Finals");
        }

        if at_most(labels.len(), 2) {
            labels.insert(0, "Semi-Finals");
        }
        if at_most(labels.len(), 4) {
            labels.insert(0, "Quarter-Finals");
        }
    }

    // Gaps in the round numbering can leave more names than rounds.
    if labels.len() > total_rounds {
        labels.drain(..labels.len() - total_rounds);
    }

    let numbered = total_rounds - labels.len();
    (1..=numbered)
        .map(|n| format!("Round {n}"))
        .chain(labels.into_iter().map(str::to_string))
        .collect()
}
