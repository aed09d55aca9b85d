use tracing::{debug, info, warn};

use crate::{
    dao::standings::{StandingsSource, find_team},
    state::SharedState,
};

/// Fetch standings for every finished round that has no announcement yet.
///
/// Fetches run with the contest lock released; each result is recorded through a
/// regular mutation. Returns how many rounds were announced.
pub async fn poll_announcements(state: &SharedState, source: &dyn StandingsSource) -> usize {
    let (pending, team_name) = state
        .read(|contest| {
            let pending: Vec<usize> = contest
                .rounds()
                .iter()
                .filter(|round| round.number() < contest.current_round() && !round.is_announced())
                .map(|round| round.number())
                .collect();
            (pending, contest.settings().team_name.clone())
        })
        .await;

    let mut announced = 0;
    for round in pending {
        let standings = match source.fetch(round).await {
            Ok(Some(standings)) => standings,
            Ok(None) => {
                debug!(round, "standings not published yet");
                continue;
            }
            Err(err) => {
                warn!(round, error = %err, "failed to fetch standings");
                continue;
            }
        };

        let ours = find_team(&standings, &team_name).cloned();
        let recorded = state
            .mutate(|contest| {
                contest.record_standings(round, standings)?;
                if let Some(entry) = &ours {
                    contest.set_announced(round, entry.score, entry.place)?;
                }
                Ok(())
            })
            .await;

        match (recorded, ours) {
            (Ok(()), Some(entry)) => {
                info!(round, score = entry.score, place = entry.place, "round standings announced");
                announced += 1;
            }
            (Ok(()), None) => {
                warn!(round, team = %team_name, "team missing from published standings");
            }
            (Err(err), _) => warn!(round, error = %err, "failed to record standings"),
        }
    }
    announced
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use futures::future::BoxFuture;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::standings::{StandingsError, StandingsResult},
        state::{AppState, contest::ContestSettings, round::StandingsEntry},
    };

    #[derive(Default)]
    struct FakeSource {
        published: Vec<usize>,
        asked: Mutex<Vec<usize>>,
    }

    impl StandingsSource for FakeSource {
        fn fetch(
            &self,
            round: usize,
        ) -> BoxFuture<'static, StandingsResult<Option<Vec<StandingsEntry>>>> {
            self.asked.lock().unwrap().push(round);
            let published = self.published.contains(&round);
            Box::pin(async move {
                if round == 99 {
                    return Err(StandingsError::RequestStatus {
                        url: "x".into(),
                        status: reqwest::StatusCode::BAD_GATEWAY,
                    });
                }
                Ok(published.then(|| {
                    vec![
                        StandingsEntry {
                            team: "Owls".into(),
                            score: 30,
                            place: 1,
                        },
                        StandingsEntry {
                            team: "team".into(),
                            score: 20,
                            place: 2,
                        },
                    ]
                }))
            })
        }
    }

    #[tokio::test]
    async fn only_finished_unannounced_rounds_are_polled() {
        let state = AppState::new(AppConfig::default().with_contest(ContestSettings {
            n_rounds: 4,
            ..ContestSettings::default()
        }));
        for _ in 0..3 {
            state.mutate(|contest| contest.new_round()).await.unwrap();
        }
        state
            .mutate(|contest| contest.set_announced(2, 5, 9))
            .await
            .unwrap();

        let source = Arc::new(FakeSource {
            published: vec![1],
            ..FakeSource::default()
        });
        let announced = poll_announcements(&state, source.as_ref()).await;

        assert_eq!(announced, 1);
        assert_eq!(*source.asked.lock().unwrap(), vec![1, 3]);
        let (round_one, n_teams) = state
            .read(|contest| {
                let round = &contest.rounds()[0];
                ((round.announced_score(), round.announced_place()), contest.n_teams())
            })
            .await;
        assert_eq!(round_one, (20, 2));
        assert_eq!(n_teams, 2);
    }
}
