pub mod http;

use futures::future::BoxFuture;
use serde::Deserialize;
use thiserror::Error;

use crate::state::round::StandingsEntry;

pub use self::http::HttpStandingsSource;

/// Convenient result alias returning [`StandingsError`] failures.
pub type StandingsResult<T> = Result<T, StandingsError>;

/// Failures while fetching published standings.
#[derive(Debug, Error)]
pub enum StandingsError {
    #[error("failed to build standings client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to fetch standings from `{url}`")]
    RequestSend {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected standings response status {status} for `{url}`")]
    RequestStatus {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed to decode standings from `{url}`")]
    DecodeResponse {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Source of the standings published after each round.
pub trait StandingsSource: Send + Sync {
    /// Standings of `round` in published order, or `None` when not yet published.
    fn fetch(&self, round: usize) -> BoxFuture<'static, StandingsResult<Option<Vec<StandingsEntry>>>>;
}

/// One published row; `place` is omitted for teams tied with the row above.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StandingsRow {
    pub team: String,
    pub score: i32,
    #[serde(default)]
    pub place: Option<u32>,
}

/// Fill in missing places: a team tied with the previous row shares its place,
/// any other gap takes its position in the list.
pub fn rank_rows(rows: Vec<StandingsRow>) -> Vec<StandingsEntry> {
    let mut entries: Vec<StandingsEntry> = Vec::with_capacity(rows.len());
    for (position, row) in rows.into_iter().enumerate() {
        let place = match (row.place, entries.last()) {
            (Some(place), _) => place,
            (None, Some(previous)) if previous.score == row.score => previous.place,
            (None, _) => u32::try_from(position + 1).unwrap_or(u32::MAX),
        };
        entries.push(StandingsEntry {
            team: row.team.trim().to_string(),
            score: row.score,
            place,
        });
    }
    entries
}

/// Row of the team named `team_name`, compared case-insensitively.
pub fn find_team<'a>(standings: &'a [StandingsEntry], team_name: &str) -> Option<&'a StandingsEntry> {
    let wanted = team_name.trim().to_lowercase();
    standings
        .iter()
        .find(|entry| entry.team.to_lowercase() == wanted)
}
