use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info};
use reqwest::{Client, StatusCode};

use crate::error::{SourceError, SourceResult};
use crate::{Bracket, BracketType, ContainedMatchType};

/// Where a normalized snapshot lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotLocation {
    File(PathBuf),
    Url(String),
}

impl SnapshotLocation {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            SnapshotLocation::Url(raw.to_string())
        } else {
            SnapshotLocation::File(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for SnapshotLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotLocation::File(path) => write!(f, "{}", path.display()),
            SnapshotLocation::Url(url) => f.write_str(url),
        }
    }
}

/// Narrows a snapshot down to what one view shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    pub group_id: Option<String>,
    /// Swiss round; falls back to the snapshot's own active round.
    pub round_number: Option<u32>,
    /// Double elimination side.
    pub match_type: Option<ContainedMatchType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketQuery {
    pub location: SnapshotLocation,
    pub selector: Selector,
}

impl BracketQuery {
    pub fn new(location: SnapshotLocation) -> Self {
        Self { location, selector: Selector::default() }
    }
}

/// Loads normalized `Bracket` documents from disk or over HTTP.
#[derive(Debug, Clone)]
pub struct SnapshotClient {
    client: Client,
    timeout: Duration,
}

impl Default for SnapshotClient {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("tourneyview/", env!("CARGO_PKG_VERSION"), " (terminal bracket viewer)"))
                .build()
                .unwrap_or_default(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl SnapshotClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches the snapshot and applies the query's selector.
    pub async fn load(&self, query: &BracketQuery) -> SourceResult<Bracket> {
        let where_from = query.location.to_string();
        let body = match &query.location {
            SnapshotLocation::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| SourceError::Io(e, where_from.clone()))?,
            SnapshotLocation::Url(url) => self.get(url).await?,
        };

        let bracket: Bracket = serde_json::from_str(&body).map_err(|e| SourceError::Parsing(e, where_from.clone()))?;
        debug!("loaded {} group(s) from {where_from}", bracket.match_groups.len());
        select(bracket, &query.selector)
    }

    async fn get(&self, url: &str) -> SourceResult<String> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| SourceError::Network(e, url.to_owned()))?;

        match response.error_for_status() {
            Ok(res) => res.text().await.map_err(|e| SourceError::Network(e, url.to_owned())),
            Err(e) if e.status() == Some(StatusCode::NOT_FOUND) => Err(SourceError::NotFound(url.to_owned())),
            Err(e) => Err(SourceError::Api(e, url.to_owned())),
        }
    }
}

/// Applies group, round and side selection.
///
/// Round robin and Swiss views need a single group; Swiss also needs a round.
/// A missing selector is reported here, before the engine runs.
pub fn select(mut bracket: Bracket, selector: &Selector) -> SourceResult<Bracket> {
    if let Some(group_id) = &selector.group_id {
        bracket.match_groups.retain(|g| &g.id == group_id);
        if bracket.match_groups.is_empty() {
            return Err(SourceError::NotFound(format!("group {group_id} in {}", bracket.name)));
        }
    }

    let needs_single_group = matches!(bracket.bracket_type, BracketType::RoundRobin | BracketType::Swiss);
    if needs_single_group && bracket.match_groups.len() > 1 {
        return Err(SourceError::MissingParameter { bracket_type: bracket.bracket_type, parameter: "group" });
    }

    match bracket.bracket_type {
        BracketType::Swiss => {
            let round = selector.round_number.or(bracket.round_number).ok_or(SourceError::MissingParameter {
                bracket_type: BracketType::Swiss,
                parameter: "roundNumber",
            })?;
            bracket.round_number = Some(round);
            for group in &mut bracket.match_groups {
                group.matches.retain(|m| m.round_number == Some(round));
            }
        }
        BracketType::DoubleElimination => {
            if let Some(side) = selector.match_type {
                for group in &mut bracket.match_groups {
                    group.contained_match_type = Some(side);
                    match side {
                        ContainedMatchType::Winners => group.matches.retain(|m| !m.is_losers()),
                        ContainedMatchType::Losers => group.matches.retain(|m| m.is_losers()),
                        ContainedMatchType::AllMatches => {}
                    }
                }
            }
        }
        _ => {}
    }

    info!("selected {} ({})", bracket.name, bracket.bracket_type.label());
    Ok(bracket)
}
