use std::time::SystemTime;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Workflow status of a proposed answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    /// Proposed but nobody is phoning it in yet.
    NotCalledIn,
    /// A caller is currently phoning the answer in.
    Calling,
    /// Accepted by the contest; credits the question's value.
    Correct,
    /// Rejected by the contest.
    Incorrect,
    /// Partially accepted; does not credit points.
    Partial,
    /// Same answer already queued for the same question.
    Duplicate,
}

/// A teammate's opinion on a queued answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Agreement {
    Disagree,
    #[default]
    Neutral,
    Agree,
}

/// Operator actions that move an answer through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerEvent {
    CallIn,
    MarkCorrect,
    MarkIncorrect,
    MarkPartial,
    MarkDuplicate,
    MarkUncalled,
}

/// Error returned when an answer cannot take the requested action from its current status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied to answer {queue_index} while {from:?}")]
pub struct InvalidTransition {
    /// Queue position of the answer.
    pub queue_index: usize,
    /// Status the answer was in.
    pub from: AnswerStatus,
    /// Rejected action.
    pub event: AnswerEvent,
}

/// Queue entry proposed by a teammate for one question of the round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// Question the answer targets.
    pub question_number: usize,
    /// Proposed answer text.
    pub text: String,
    /// Who proposed it.
    pub submitter: String,
    /// Submitter's self-rated certainty.
    pub confidence: i32,
    pub status: AnswerStatus,
    /// Who is calling (or called) it in; empty when uncalled.
    pub caller: String,
    /// Operator who accepted it; only set on correct answers.
    pub operator: String,
    pub created_at: SystemTime,
    /// Votes keyed by user name, in first-vote order.
    pub agreement: IndexMap<String, Agreement>,
}

impl Answer {
    /// Build a fresh, uncalled answer.
    pub fn new(
        question_number: usize,
        text: String,
        submitter: String,
        confidence: i32,
        created_at: SystemTime,
    ) -> Self {
        Self {
            question_number,
            text,
            submitter,
            confidence,
            status: AnswerStatus::NotCalledIn,
            caller: String::new(),
            operator: String::new(),
            created_at,
            agreement: IndexMap::new(),
        }
    }

    /// Net agreement: agrees minus disagrees.
    pub fn agreement_score(&self) -> i32 {
        self.agreement.values().fold(0, |acc, vote| match vote {
            Agreement::Agree => acc + 1,
            Agreement::Disagree => acc - 1,
            Agreement::Neutral => acc,
        })
    }
}

/// Compute the status an answer moves to, if `event` is legal from `from`.
///
/// Undo (`MarkUncalled`) and every verdict are accepted from any status, so a
/// verdict can be corrected in place. Call-in only starts from `NotCalledIn`.
pub fn compute_transition(
    queue_index: usize,
    from: AnswerStatus,
    event: AnswerEvent,
) -> Result<AnswerStatus, InvalidTransition> {
    use AnswerStatus::*;

    let next = match (from, event) {
        (_, AnswerEvent::MarkUncalled) => NotCalledIn,
        (NotCalledIn, AnswerEvent::CallIn) => Calling,
        (_, AnswerEvent::MarkCorrect) => Correct,
        (_, AnswerEvent::MarkIncorrect) => Incorrect,
        (_, AnswerEvent::MarkPartial) => Partial,
        (_, AnswerEvent::MarkDuplicate) => Duplicate,
        (from, event) => {
            return Err(InvalidTransition {
                queue_index,
                from,
                event,
            });
        }
    };

    Ok(next)
}

/// Insertion-ordered queue of answers for a single round.
///
/// Entries are never removed, so a queue index stays valid for the life of the round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerQueue {
    entries: Vec<Answer>,
}

impl AnswerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, queue_index: usize) -> Option<&Answer> {
        self.entries.get(queue_index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Answer> {
        self.entries.iter()
    }

    /// Append an answer and return its queue index.
    pub fn push(&mut self, answer: Answer) -> usize {
        self.entries.push(answer);
        self.entries.len() - 1
    }

    pub(crate) fn get_mut(&mut self, queue_index: usize) -> Option<&mut Answer> {
        self.entries.get_mut(queue_index)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Answer> {
        self.entries.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [AnswerStatus; 6] = [
        AnswerStatus::NotCalledIn,
        AnswerStatus::Calling,
        AnswerStatus::Correct,
        AnswerStatus::Incorrect,
        AnswerStatus::Partial,
        AnswerStatus::Duplicate,
    ];

    #[test]
    fn happy_path_through_calling() {
        let calling = compute_transition(0, AnswerStatus::NotCalledIn, AnswerEvent::CallIn).unwrap();
        assert_eq!(calling, AnswerStatus::Calling);
        let correct = compute_transition(0, calling, AnswerEvent::MarkCorrect).unwrap();
        assert_eq!(correct, AnswerStatus::Correct);
    }

    #[test]
    fn verdicts_allowed_directly_from_not_called_in() {
        for (event, expected) in [
            (AnswerEvent::MarkCorrect, AnswerStatus::Correct),
            (AnswerEvent::MarkIncorrect, AnswerStatus::Incorrect),
            (AnswerEvent::MarkPartial, AnswerStatus::Partial),
            (AnswerEvent::MarkDuplicate, AnswerStatus::Duplicate),
        ] {
            assert_eq!(
                compute_transition(3, AnswerStatus::NotCalledIn, event).unwrap(),
                expected
            );
        }
    }

    #[test]
    fn undo_succeeds_from_every_status() {
        for from in ALL {
            assert_eq!(
                compute_transition(1, from, AnswerEvent::MarkUncalled).unwrap(),
                AnswerStatus::NotCalledIn
            );
        }
    }

    #[test]
    fn call_in_only_from_not_called_in() {
        for from in ALL.into_iter().filter(|s| *s != AnswerStatus::NotCalledIn) {
            let err = compute_transition(2, from, AnswerEvent::CallIn).unwrap_err();
            assert_eq!(err.from, from);
            assert_eq!(err.queue_index, 2);
            assert_eq!(err.event, AnswerEvent::CallIn);
        }
    }

    #[test]
    fn verdicts_overwrite_any_status() {
        for from in ALL {
            assert_eq!(
                compute_transition(0, from, AnswerEvent::MarkCorrect).unwrap(),
                AnswerStatus::Correct
            );
            assert_eq!(
                compute_transition(0, from, AnswerEvent::MarkIncorrect).unwrap(),
                AnswerStatus::Incorrect
            );
            assert_eq!(
                compute_transition(0, from, AnswerEvent::MarkPartial).unwrap(),
                AnswerStatus::Partial
            );
            assert_eq!(
                compute_transition(0, from, AnswerEvent::MarkDuplicate).unwrap(),
                AnswerStatus::Duplicate
            );
        }
    }

    #[test]
    fn agreement_score_counts_net_votes() {
        let mut answer = Answer::new(1, "A".into(), "sam".into(), 3, SystemTime::now());
        answer.agreement.insert("a".into(), Agreement::Agree);
        answer.agreement.insert("b".into(), Agreement::Agree);
        answer.agreement.insert("c".into(), Agreement::Disagree);
        answer.agreement.insert("d".into(), Agreement::Neutral);
        assert_eq!(answer.agreement_score(), 1);
    }

    #[test]
    fn queue_indices_are_stable() {
        let mut queue = AnswerQueue::new();
        let first = queue.push(Answer::new(1, "x".into(), "s".into(), 1, SystemTime::now()));
        let second = queue.push(Answer::new(1, "y".into(), "s".into(), 1, SystemTime::now()));
        assert_eq!((first, second), (0, 1));
        assert_eq!(queue.get(1).map(|a| a.text.as_str()), Some("y"));
        assert!(queue.get(2).is_none());
    }
}
