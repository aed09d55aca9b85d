use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::format_system_time,
    state::{
        answer_queue::{Agreement, Answer, AnswerStatus},
        contest::{Contest, ContestHeader},
        round::{Question, Round, StandingsEntry},
        sync::SyncDiff,
    },
};

/// Contest-level fields sent with every snapshot and diff.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct HeaderSnapshot {
    pub team_name: String,
    pub n_rounds: usize,
    pub current_round: usize,
    pub n_teams: usize,
    pub n_visual: usize,
    /// Bumped whenever one of the header fields changes.
    pub version: u64,
}

impl From<ContestHeader> for HeaderSnapshot {
    fn from(header: ContestHeader) -> Self {
        Self {
            team_name: header.team_name,
            n_rounds: header.n_rounds,
            current_round: header.current_round,
            n_teams: header.n_teams,
            n_visual: header.n_visual,
            version: header.version,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct QuestionSnapshot {
    pub number: usize,
    pub value: i32,
    pub text: String,
    pub answer: String,
    pub correct: bool,
    pub submitter: String,
    pub operator: String,
    pub been_open: bool,
    pub is_open: bool,
}

impl From<&Question> for QuestionSnapshot {
    fn from(question: &Question) -> Self {
        Self {
            number: question.number,
            value: question.value,
            text: question.text.clone(),
            answer: question.answer.clone(),
            correct: question.correct,
            submitter: question.submitter.clone(),
            operator: question.operator.clone(),
            been_open: question.been_open,
            is_open: question.is_open,
        }
    }
}

/// One user's opinion on a queued answer.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct AgreementVote {
    pub user: String,
    pub agreement: Agreement,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct AnswerSnapshot {
    /// Stable position in the round's queue; used to address the answer.
    pub queue_index: usize,
    pub question_number: usize,
    pub text: String,
    pub submitter: String,
    pub confidence: i32,
    pub status: AnswerStatus,
    pub caller: String,
    pub operator: String,
    /// RFC 3339 submission time.
    pub created_at: String,
    pub agreement: Vec<AgreementVote>,
    /// Agrees minus disagrees.
    pub agreement_score: i32,
}

impl AnswerSnapshot {
    fn from_answer(queue_index: usize, answer: &Answer) -> Self {
        Self {
            queue_index,
            question_number: answer.question_number,
            text: answer.text.clone(),
            submitter: answer.submitter.clone(),
            confidence: answer.confidence,
            status: answer.status,
            caller: answer.caller.clone(),
            operator: answer.operator.clone(),
            created_at: format_system_time(answer.created_at),
            agreement: answer
                .agreement
                .iter()
                .map(|(user, agreement)| AgreementVote {
                    user: user.clone(),
                    agreement: *agreement,
                })
                .collect(),
            agreement_score: answer.agreement_score(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct StandingsEntrySnapshot {
    pub team: String,
    pub score: i32,
    pub place: u32,
}

impl From<&StandingsEntry> for StandingsEntrySnapshot {
    fn from(entry: &StandingsEntry) -> Self {
        Self {
            team: entry.team.clone(),
            score: entry.score,
            place: entry.place,
        }
    }
}

/// Full round payload; a changed round is always shipped whole.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct RoundSnapshot {
    pub number: usize,
    pub version: u64,
    pub speed: bool,
    pub announced: bool,
    pub announced_score: i32,
    pub announced_place: u32,
    pub show_name: String,
    pub show_host: String,
    pub discrepancy_text: String,
    /// Points credited this round.
    pub earned: i32,
    /// Total value of the questions opened this round.
    pub value: i32,
    /// Points credited from round 1 through this round.
    pub cumulative_earned: i32,
    pub open_questions: Vec<usize>,
    pub next_to_open: Option<usize>,
    pub is_over: bool,
    /// Announced score differs from our own tally.
    pub mismatch: bool,
    pub standings: Vec<StandingsEntrySnapshot>,
    pub questions: Vec<QuestionSnapshot>,
    pub answers: Vec<AnswerSnapshot>,
}

impl RoundSnapshot {
    pub fn from_round(round: &Round, cumulative_earned: i32) -> Self {
        Self {
            number: round.number(),
            version: round.version(),
            speed: round.is_speed(),
            announced: round.is_announced(),
            announced_score: round.announced_score(),
            announced_place: round.announced_place(),
            show_name: round.show_name().to_string(),
            show_host: round.show_host().to_string(),
            discrepancy_text: round.discrepancy_text().to_string(),
            earned: round.earned(),
            value: round.value(),
            cumulative_earned,
            open_questions: round.open_question_numbers(),
            next_to_open: round.next_to_open(),
            is_over: round.is_over(),
            mismatch: round.is_mismatch(),
            standings: round.standings().iter().map(Into::into).collect(),
            questions: round.questions().iter().map(Into::into).collect(),
            answers: round
                .queue()
                .iter()
                .enumerate()
                .map(|(index, answer)| AnswerSnapshot::from_answer(index, answer))
                .collect(),
        }
    }
}

/// Entire contest, returned on first connect or explicit fetch.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct ContestSnapshot {
    pub header: HeaderSnapshot,
    pub earned: i32,
    pub rounds: Vec<RoundSnapshot>,
}

impl From<&Contest> for ContestSnapshot {
    fn from(contest: &Contest) -> Self {
        let mut cumulative = 0;
        let rounds = contest
            .rounds()
            .iter()
            .map(|round| {
                cumulative += round.earned();
                RoundSnapshot::from_round(round, cumulative)
            })
            .collect();
        Self {
            header: contest.header().into(),
            earned: contest.earned(),
            rounds,
        }
    }
}

/// Per-round versions plus the header version.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct VersionsResponse {
    pub header_version: u64,
    pub versions: Vec<u64>,
}

impl From<&Contest> for VersionsResponse {
    fn from(contest: &Contest) -> Self {
        Self {
            header_version: contest.header().version,
            versions: contest.versions(),
        }
    }
}

/// Rounds changed since the caller's known versions.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct SyncResponse {
    pub header: HeaderSnapshot,
    /// Versions the caller should send next time.
    pub versions: Vec<u64>,
    pub rounds: Vec<RoundSnapshot>,
}

impl SyncResponse {
    /// Render a diff taken from `contest`; must be called under the same read lock.
    pub fn from_diff(contest: &Contest, diff: SyncDiff) -> Self {
        Self {
            header: diff.header.into(),
            versions: diff.versions,
            rounds: diff
                .rounds
                .iter()
                .map(|round| {
                    RoundSnapshot::from_round(round, contest.cumulative_earned(round.number()))
                })
                .collect(),
        }
    }
}
