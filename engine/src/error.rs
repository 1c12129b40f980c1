use crate::BracketType;

/// Failures computing a layout. The engine never returns partial output.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("no renderer for bracket type {0:?}")]
    UnsupportedBracketType(BracketType),
    #[error("{kind} rendering requires exactly one match group (found {found})")]
    GroupCount { kind: &'static str, found: usize },
    #[error("no match in group {group_id} carries a round number; cannot find the final round")]
    NoFinalRound { group_id: String },
    #[error("match id {match_id} appears more than once in group {group_id}")]
    DuplicateMatchId { match_id: String, group_id: String },
    #[error("match {match_id} is reachable twice from the final round (next-match cycle)")]
    Cycle { match_id: String },
}

/// Failures at the snapshot boundary, before the engine sees any data.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("network error for {1}: {0}")]
    Network(#[source] reqwest::Error, String),
    #[error("API error for {1}: {0}")]
    Api(#[source] reqwest::Error, String),
    #[error("parse error for {1}: {0}")]
    Parsing(#[source] serde_json::Error, String),
    #[error("could not read {1}: {0}")]
    Io(#[source] std::io::Error, String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{bracket_type:?} brackets require the `{parameter}` selector")]
    MissingParameter {
        bracket_type: BracketType,
        parameter: &'static str,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

pub type LayoutResult<T> = Result<T, LayoutError>;

pub type SourceResult<T> = Result<T, SourceError>;
