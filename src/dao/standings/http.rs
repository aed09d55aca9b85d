use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};

use crate::state::round::StandingsEntry;

use super::{StandingsError, StandingsResult, StandingsRow, StandingsSource, rank_rows};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Reads `{base_url}{NN}.json` where `NN` is the two-digit round number.
#[derive(Clone)]
pub struct HttpStandingsSource {
    client: Client,
    base_url: Arc<str>,
}

impl HttpStandingsSource {
    pub fn new(base_url: &str) -> StandingsResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| StandingsError::ClientBuilder { source })?;
        Ok(Self {
            client,
            base_url: Arc::from(base_url),
        })
    }

    pub fn url_for(&self, round: usize) -> String {
        format!("{}{round:02}.json", self.base_url)
    }

    async fn fetch_round(&self, round: usize) -> StandingsResult<Option<Vec<StandingsEntry>>> {
        let url = self.url_for(round);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| StandingsError::RequestSend {
                url: url.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let rows = response
                    .json::<Vec<StandingsRow>>()
                    .await
                    .map_err(|source| StandingsError::DecodeResponse { url, source })?;
                Ok(Some(rank_rows(rows)))
            }
            status => Err(StandingsError::RequestStatus { url, status }),
        }
    }
}

impl StandingsSource for HttpStandingsSource {
    fn fetch(&self, round: usize) -> BoxFuture<'static, StandingsResult<Option<Vec<StandingsEntry>>>> {
        let source = self.clone();
        Box::pin(async move { source.fetch_round(round).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_number_is_zero_padded() {
        let source = HttpStandingsSource::new("http://scores.example/Rd").unwrap();
        assert_eq!(source.url_for(7), "http://scores.example/Rd07.json");
        assert_eq!(source.url_for(12), "http://scores.example/Rd12.json");
    }
}
