use crate::{BracketType, MatchState, MatchTeam};

/// Everything a formatter may consult to render one team's score.
#[derive(Debug, Clone, Copy)]
pub struct ScoreContext<'a> {
    /// `None` for round-robin cells with no match between the two teams yet.
    pub team: Option<&'a MatchTeam>,
    pub opponent: Option<&'a MatchTeam>,
    pub bracket_type: BracketType,
    pub match_state: MatchState,
}

/// Text policy for scores and team names.
///
/// The strings returned here are exactly what reconciliation compares, so two
/// snapshots that format identically never produce an update.
pub trait TextFormatter {
    fn format_score(&self, ctx: &ScoreContext<'_>) -> String;

    fn format_team_name(&self, name: Option<&str>) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BaseTextFormatter;

impl TextFormatter for BaseTextFormatter {
    fn format_score(&self, ctx: &ScoreContext<'_>) -> String {
        let Some(team) = ctx.team else {
            return match ctx.bracket_type {
                BracketType::RoundRobin => "?".to_string(),
                _ => "-".to_string(),
            };
        };

        if team.is_disqualified {
            return "DQ".to_string();
        }
        if let Some(score) = team.score {
            return score.to_string();
        }
        if ctx.match_state == MatchState::Completed {
            let won = team.is_winner || ctx.opponent.is_some_and(|o| o.is_disqualified);
            return if won { "W" } else { "L" }.to_string();
        }

        match ctx.bracket_type {
            BracketType::RoundRobin => "?".to_string(),
            _ => "-".to_string(),
        }
    }

    fn format_team_name(&self, name: Option<&str>) -> String {
        name.map(str::to_string).unwrap_or_else(|| "-".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(team: Option<&'a MatchTeam>, opponent: Option<&'a MatchTeam>, bracket_type: BracketType, state: MatchState) -> ScoreContext<'a> {
        ScoreContext { team, opponent, bracket_type, match_state: state }
    }

    #[test]
    fn score_present_is_printed() {
        let team = MatchTeam::new("a", "Alpha").with_score(3);
        let f = BaseTextFormatter;
        assert_eq!(f.format_score(&ctx(Some(&team), None, BracketType::Swiss, MatchState::InProgress)), "3");
    }

    #[test]
    fn disqualification_wins_over_score() {
        let mut team = MatchTeam::new("a", "Alpha").with_score(3);
        team.is_disqualified = true;
        let f = BaseTextFormatter;
        assert_eq!(f.format_score(&ctx(Some(&team), None, BracketType::SingleElimination, MatchState::Completed)), "DQ");
    }

    #[test]
    fn completed_without_score_is_win_or_loss() {
        let mut winner = MatchTeam::new("a", "Alpha");
        winner.is_winner = true;
        let loser = MatchTeam::new("b", "Beta");
        let f = BaseTextFormatter;
        let state = MatchState::Completed;
        assert_eq!(f.format_score(&ctx(Some(&winner), Some(&loser), BracketType::DoubleElimination, state)), "W");
        assert_eq!(f.format_score(&ctx(Some(&loser), Some(&winner), BracketType::DoubleElimination, state)), "L");
    }

    #[test]
    fn unresolved_round_robin_cell_is_question_mark() {
        let f = BaseTextFormatter;
        assert_eq!(f.format_score(&ctx(None, None, BracketType::RoundRobin, MatchState::Unknown)), "?");
        let team = MatchTeam::new("a", "Alpha");
        assert_eq!(f.format_score(&ctx(Some(&team), None, BracketType::RoundRobin, MatchState::NotStarted)), "?");
        assert_eq!(f.format_score(&ctx(Some(&team), None, BracketType::SingleElimination, MatchState::NotStarted)), "-");
    }

    #[test]
    fn missing_team_name_is_dash() {
        assert_eq!(BaseTextFormatter.format_team_name(None), "-");
        assert_eq!(BaseTextFormatter.format_team_name(Some("Alpha")), "Alpha");
    }
}
