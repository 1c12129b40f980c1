pub mod engine;
pub mod error;
pub mod formatter;
pub mod hierarchy;
pub mod labels;
pub mod layout;
pub mod reconcile;
pub mod round_robin;
pub mod source;
pub mod swiss;
pub mod viewport;

pub use engine::{BracketRenderer, BracketView, EngineKind, EngineOptions, RenderOutcome, render};
pub use error::{Error, LayoutError, SourceError};
pub use formatter::{BaseTextFormatter, ScoreContext, TextFormatter};
pub use reconcile::{ActionKind, Field, FieldAction, PreviousRenderState, Reconciliation, RenderScope};
pub use source::{BracketQuery, Selector, SnapshotClient, SnapshotLocation};

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Normalized data model, produced fresh per snapshot by an importer
// ---------------------------------------------------------------------------

/// One stage of a tournament, as handed to the engine in a single call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bracket {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub bracket_type: BracketType,
    #[serde(default)]
    pub name: String,
    /// Active round for Swiss brackets.
    #[serde(default)]
    pub round_number: Option<u32>,
    #[serde(default)]
    pub match_groups: Vec<MatchGroup>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BracketType {
    DoubleElimination,
    #[default]
    SingleElimination,
    /// Known to upstream importers; no engine renders it.
    Ladder,
    Swiss,
    RoundRobin,
}

impl BracketType {
    pub fn label(&self) -> &'static str {
        match self {
            BracketType::DoubleElimination => "Double Elimination",
            BracketType::SingleElimination => "Single Elimination",
            BracketType::Ladder => "Ladder",
            BracketType::Swiss => "Swiss",
            BracketType::RoundRobin => "Round Robin",
        }
    }

    pub fn elimination_kind(&self) -> Option<EliminationKind> {
        match self {
            BracketType::SingleElimination => Some(EliminationKind::Single),
            BracketType::DoubleElimination => Some(EliminationKind::Double),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EliminationKind {
    Single,
    Double,
}

/// A renderable sub-bracket: one pool, or one or both sides of a double elimination bracket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchGroup {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub has_bracket_reset: bool,
    #[serde(default)]
    pub contained_match_type: Option<ContainedMatchType>,
    #[serde(default)]
    pub matches: Vec<Match>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContainedMatchType {
    #[default]
    AllMatches,
    Winners,
    Losers,
}

impl ContainedMatchType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" | "all_matches" => Some(ContainedMatchType::AllMatches),
            "winners" => Some(ContainedMatchType::Winners),
            "losers" => Some(ContainedMatchType::Losers),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    /// Match the winner advances to. `None` = terminal.
    #[serde(default)]
    pub next_match_id: Option<String>,
    /// 1-based, increasing toward the finals on each side.
    #[serde(default)]
    pub round_number: Option<u32>,
    #[serde(default, rename = "type")]
    pub match_type: Option<MatchType>,
    #[serde(default)]
    pub state: MatchState,
    #[serde(default)]
    pub top_team: MatchTeam,
    #[serde(default)]
    pub bottom_team: MatchTeam,
}

impl Match {
    pub fn is_losers(&self) -> bool {
        self.match_type == Some(MatchType::Losers)
    }

    /// True when either slot belongs to the team with this id.
    pub fn involves(&self, team_id: &str) -> bool {
        self.top_team.id.as_deref() == Some(team_id) || self.bottom_team.id.as_deref() == Some(team_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    Winners,
    Losers,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchState {
    #[default]
    Unknown,
    NotStarted,
    InProgress,
    Completed,
}

impl MatchState {
    pub fn has_result(&self) -> bool {
        matches!(self, MatchState::InProgress | MatchState::Completed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchTeam {
    /// `None` = bye / unresolved slot.
    #[serde(default, deserialize_with = "deserialize_team_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub is_disqualified: bool,
    #[serde(default)]
    pub is_winner: bool,
}

impl MatchTeam {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: Some(id.into()), name: Some(name.into()), ..Self::default() }
    }

    pub fn with_score(mut self, score: i64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.id.is_some()
    }
}

/// Importers disagree on whether team ids are strings or numbers.
fn deserialize_team_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Float(n) => n.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_json_uses_camel_case_and_screaming_enums() {
        let raw = r#"{
            "id": "m1",
            "nextMatchId": "m3",
            "roundNumber": 1,
            "type": "LOSERS",
            "state": "IN_PROGRESS",
            "topTeam": { "id": 17, "name": "Squid", "score": 2, "isDisqualified": false, "isWinner": false },
            "bottomTeam": { "id": null, "isDisqualified": false, "isWinner": false }
        }"#;
        let m: Match = serde_json::from_str(raw).unwrap();
        assert_eq!(m.next_match_id.as_deref(), Some("m3"));
        assert_eq!(m.match_type, Some(MatchType::Losers));
        assert_eq!(m.state, MatchState::InProgress);
        assert_eq!(m.top_team.id.as_deref(), Some("17"));
        assert!(!m.bottom_team.is_resolved());
    }

    #[test]
    fn missing_state_defaults_to_unknown() {
        let m: Match = serde_json::from_str(r#"{ "id": "x" }"#).unwrap();
        assert_eq!(m.state, MatchState::Unknown);
        assert!(m.round_number.is_none());
    }

    #[test]
    fn bracket_type_round_trips_through_json_names() {
        let b: Bracket = serde_json::from_str(
            r#"{ "type": "ROUND_ROBIN", "name": "Pools", "matchGroups": [] }"#,
        )
        .unwrap();
        assert_eq!(b.bracket_type, BracketType::RoundRobin);
        assert_eq!(b.bracket_type.elimination_kind(), None);
    }

    #[test]
    fn contained_match_type_parses_user_input() {
        assert_eq!(ContainedMatchType::parse("Winners"), Some(ContainedMatchType::Winners));
        assert_eq!(ContainedMatchType::parse("all"), Some(ContainedMatchType::AllMatches));
        assert_eq!(ContainedMatchType::parse("grand"), None);
    }
}
