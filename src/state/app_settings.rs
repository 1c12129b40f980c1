use anyhow::{Context, bail};
use log::LevelFilter;
use std::str::FromStr;
use std::time::Duration;
use tourneyview_engine::{BracketQuery, ContainedMatchType, Selector, SnapshotLocation};

pub const DEFAULT_REFRESH_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub snapshot: Option<SnapshotLocation>,
    pub selector: Selector,
    pub refresh: Duration,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            snapshot: None,
            selector: Selector::default(),
            refresh: Duration::from_secs(DEFAULT_REFRESH_SECS),
        }
    }
}

impl AppSettings {
    /// Reads `TOURNEYVIEW_*` environment variables.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut settings = Self::default();

        settings.snapshot = var("TOURNEYVIEW_SNAPSHOT").map(|raw| SnapshotLocation::parse(&raw));
        settings.selector.group_id = var("TOURNEYVIEW_GROUP");

        if let Some(raw) = var("TOURNEYVIEW_ROUND") {
            let round = raw.parse::<u32>().with_context(|| format!("TOURNEYVIEW_ROUND must be a round number, got {raw:?}"))?;
            settings.selector.round_number = Some(round);
        }

        if let Some(raw) = var("TOURNEYVIEW_MATCH_TYPE") {
            let Some(side) = ContainedMatchType::parse(&raw) else {
                bail!("TOURNEYVIEW_MATCH_TYPE must be one of all, winners, losers; got {raw:?}");
            };
            settings.selector.match_type = Some(side);
        }

        if let Some(raw) = var("TOURNEYVIEW_REFRESH_SECS") {
            let secs = raw.parse::<u64>().with_context(|| format!("TOURNEYVIEW_REFRESH_SECS must be whole seconds, got {raw:?}"))?;
            settings.refresh = Duration::from_secs(secs.max(1));
        }

        if let Some(raw) = var("TOURNEYVIEW_LOG") {
            let level = LevelFilter::from_str(&raw).with_context(|| format!("TOURNEYVIEW_LOG is not a log level: {raw:?}"))?;
            settings.log_level = Some(level);
        }

        Ok(settings)
    }

    /// The snapshot query, or `None` when no snapshot was configured.
    pub fn query(&self) -> Option<BracketQuery> {
        let location = self.snapshot.clone()?;
        Some(BracketQuery { location, selector: self.selector.clone() })
    }
}
