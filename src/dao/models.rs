use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::state::answer_queue::{Agreement, AnswerStatus};

/// Full contest snapshot as written to storage.
///
/// Everything except the round list is optional so older snapshots keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContestEntity {
    /// Team the contest is tracked for.
    #[serde(default)]
    pub team_name: String,
    /// Round the contest was on when saved.
    #[serde(default = "first_round")]
    pub current_round: usize,
    /// Number of teams playing; `None` keeps the configured default.
    #[serde(default)]
    pub n_teams: Option<usize>,
    /// Number of teams shown on visual standings; `None` keeps the configured default.
    #[serde(default)]
    pub n_visual: Option<usize>,
    /// Every round, in ascending order.
    pub rounds: Vec<RoundEntity>,
}

/// One round of a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundEntity {
    pub number: usize,
    #[serde(default)]
    pub speed: bool,
    #[serde(default)]
    pub announced: bool,
    #[serde(default)]
    pub announced_score: i32,
    #[serde(default)]
    pub announced_place: u32,
    #[serde(default)]
    pub show_name: String,
    #[serde(default)]
    pub show_host: String,
    #[serde(default)]
    pub discrepancy_text: String,
    #[serde(default)]
    pub standings: Vec<StandingsEntryEntity>,
    #[serde(default)]
    pub questions: Vec<QuestionEntity>,
    /// Answer queue in insertion order.
    #[serde(default)]
    pub answers: Vec<AnswerEntity>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntity {
    pub number: usize,
    #[serde(default)]
    pub value: i32,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub correct: bool,
    #[serde(default)]
    pub submitter: String,
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub been_open: bool,
    #[serde(default)]
    pub is_open: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerEntity {
    pub question_number: usize,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub submitter: String,
    #[serde(default)]
    pub confidence: i32,
    #[serde(default = "not_called_in")]
    pub status: AnswerStatus,
    #[serde(default)]
    pub caller: String,
    #[serde(default)]
    pub operator: String,
    /// Submission time; preserved across save and load.
    #[serde(default = "unix_epoch")]
    pub created_at: SystemTime,
    #[serde(default)]
    pub agreement: IndexMap<String, Agreement>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StandingsEntryEntity {
    pub team: String,
    pub score: i32,
    pub place: u32,
}

/// Listing entry for a stored snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveListItemEntity {
    /// Name to pass back when loading.
    pub name: String,
    /// Last modification time reported by the store.
    pub saved_at: SystemTime,
}

fn first_round() -> usize {
    1
}

fn not_called_in() -> AnswerStatus {
    AnswerStatus::NotCalledIn
}

fn unix_epoch() -> SystemTime {
    SystemTime::UNIX_EPOCH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_snapshot_fills_defaults() {
        let raw = r#"{
            "rounds": [
                {
                    "number": 1,
                    "questions": [{ "number": 1, "been_open": true }],
                    "answers": [{ "question_number": 1, "text": "Paris" }]
                }
            ]
        }"#;

        let entity: ContestEntity = serde_json::from_str(raw).unwrap();
        assert_eq!(entity.current_round, 1);
        assert_eq!(entity.n_teams, None);
        let round = &entity.rounds[0];
        assert!(!round.speed && round.standings.is_empty());
        assert!(round.questions[0].been_open && !round.questions[0].is_open);
        let answer = &round.answers[0];
        assert_eq!(answer.status, AnswerStatus::NotCalledIn);
        assert_eq!(answer.created_at, SystemTime::UNIX_EPOCH);
        assert!(answer.agreement.is_empty());
    }
}
