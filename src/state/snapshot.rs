use crate::dao::models::{
    AnswerEntity, ContestEntity, QuestionEntity, RoundEntity, StandingsEntryEntity,
};

use super::{
    answer_queue::{Answer, AnswerEvent, AnswerStatus},
    contest::{Contest, ContestError},
    round::{Gate, Question, QuestionEdit, Round, StandingsEntry},
};

impl From<&Question> for QuestionEntity {
    fn from(value: &Question) -> Self {
        Self {
            number: value.number,
            value: value.value,
            text: value.text.clone(),
            answer: value.answer.clone(),
            correct: value.correct,
            submitter: value.submitter.clone(),
            operator: value.operator.clone(),
            been_open: value.been_open,
            is_open: value.is_open,
        }
    }
}

impl From<&Answer> for AnswerEntity {
    fn from(value: &Answer) -> Self {
        Self {
            question_number: value.question_number,
            text: value.text.clone(),
            submitter: value.submitter.clone(),
            confidence: value.confidence,
            status: value.status,
            caller: value.caller.clone(),
            operator: value.operator.clone(),
            created_at: value.created_at,
            agreement: value.agreement.clone(),
        }
    }
}

impl From<&StandingsEntry> for StandingsEntryEntity {
    fn from(value: &StandingsEntry) -> Self {
        Self {
            team: value.team.clone(),
            score: value.score,
            place: value.place,
        }
    }
}

impl From<StandingsEntryEntity> for StandingsEntry {
    fn from(value: StandingsEntryEntity) -> Self {
        Self {
            team: value.team,
            score: value.score,
            place: value.place,
        }
    }
}

impl From<&Round> for RoundEntity {
    fn from(value: &Round) -> Self {
        Self {
            number: value.number(),
            speed: value.is_speed(),
            announced: value.is_announced(),
            announced_score: value.announced_score(),
            announced_place: value.announced_place(),
            show_name: value.show_name().to_string(),
            show_host: value.show_host().to_string(),
            discrepancy_text: value.discrepancy_text().to_string(),
            standings: value.standings().iter().map(Into::into).collect(),
            questions: value.questions().iter().map(Into::into).collect(),
            answers: value.queue().iter().map(Into::into).collect(),
        }
    }
}

impl From<&Contest> for ContestEntity {
    fn from(value: &Contest) -> Self {
        Self {
            team_name: value.settings().team_name.clone(),
            current_round: value.current_round(),
            n_teams: Some(value.n_teams()),
            n_visual: Some(value.n_visual()),
            rounds: value.rounds().iter().map(Into::into).collect(),
        }
    }
}

impl Contest {
    /// Replace the whole contest with a snapshot.
    ///
    /// The contest is reset and every opening, answer, verdict and edit is
    /// replayed through the regular round operations, so a snapshot that breaks
    /// an invariant is rejected. On error the contest is left reset.
    pub fn restore(&mut self, snapshot: ContestEntity) -> Result<(), ContestError> {
        self.reset();
        for round in snapshot.rounds {
            self.replay_round(round)?;
        }
        if let Some(n_teams) = snapshot.n_teams {
            self.set_n_teams(n_teams);
        }
        if let Some(n_visual) = snapshot.n_visual {
            self.set_n_visual(n_visual);
        }
        self.restore_current_round(snapshot.current_round)
    }

    fn replay_round(&mut self, entity: RoundEntity) -> Result<(), ContestError> {
        let number = entity.number;

        if entity.speed {
            self.replay(number, |r| r.set_speed(true))?;
        }

        let opened: Vec<&QuestionEntity> = entity.questions.iter().filter(|q| q.been_open).collect();
        for question in &opened {
            self.replay(number, |r| {
                r.open_question(question.number, question.value, question.text.clone())
            })?;
        }

        for answer in &entity.answers {
            self.replay_answer(number, answer)?;
        }

        // verdicts may have closed or credited questions; the saved fields win
        for question in &opened {
            let edit = QuestionEdit {
                value: question.value,
                text: question.text.clone(),
                answer: question.answer.clone(),
                correct: question.correct,
                submitter: question.submitter.clone(),
                operator: question.operator.clone(),
            };
            let now = self.round(number)?.question(question.number)?;
            if question.is_open && !now.is_open {
                // a replayed verdict may have credited it; reopening needs the credit gone
                if now.correct {
                    let uncredit = edit.clone();
                    self.replay(number, |r| r.edit_question(question.number, uncredit))?;
                }
                self.replay(number, |r| r.reopen_question(question.number))?;
            }
            self.replay(number, |r| r.edit_question(question.number, edit))?;
            if !question.is_open && self.round(number)?.question(question.number)?.is_open {
                self.replay(number, |r| r.close_question(question.number))?;
            }
        }

        if entity.announced {
            self.set_announced(number, entity.announced_score, entity.announced_place)?;
        }
        if !entity.standings.is_empty() {
            let standings = entity.standings.into_iter().map(Into::into).collect();
            self.replay(number, |r| {
                r.set_standings(standings);
                Ok(())
            })?;
        }
        if !entity.discrepancy_text.is_empty() {
            self.set_discrepancy_text(number, entity.discrepancy_text)?;
        }
        if !entity.show_name.is_empty() {
            self.set_show_name(number, entity.show_name)?;
        }
        if !entity.show_host.is_empty() {
            self.set_show_host(number, entity.show_host)?;
        }
        Ok(())
    }

    fn replay<T>(
        &mut self,
        round: usize,
        apply: impl FnOnce(&mut Round) -> Result<T, ContestError>,
    ) -> Result<T, ContestError> {
        self.with_round(round, Gate::Replay, false, apply)
    }

    fn replay_answer(
        &mut self,
        round: usize,
        entity: &AnswerEntity,
    ) -> Result<(), ContestError> {
        let mut answer = Answer::new(
            entity.question_number,
            entity.text.clone(),
            entity.submitter.clone(),
            entity.confidence,
            entity.created_at,
        );
        answer.agreement = entity.agreement.clone();
        let queue_index = self.replay(round, |r| r.propose(answer, Gate::Replay))?;

        let event = match entity.status {
            AnswerStatus::NotCalledIn => return Ok(()),
            AnswerStatus::Calling => AnswerEvent::CallIn,
            AnswerStatus::Correct => AnswerEvent::MarkCorrect,
            AnswerStatus::Incorrect => AnswerEvent::MarkIncorrect,
            AnswerStatus::Partial => AnswerEvent::MarkPartial,
            AnswerStatus::Duplicate => AnswerEvent::MarkDuplicate,
        };
        self.replay(round, |r| {
            r.apply_answer_event(queue_index, event, &entity.caller, &entity.operator)
                .map(drop)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{answer_queue::Agreement, contest::ContestSettings};

    fn contest() -> Contest {
        Contest::new(ContestSettings {
            n_rounds: 3,
            ..ContestSettings::default()
        })
    }

    fn played() -> Contest {
        let mut contest = contest();
        contest.open(1, 1, 10, "Capital of France?".into()).unwrap();
        contest.open(1, 2, 20, "Tallest peak?".into()).unwrap();
        contest.propose_answer(1, "Paris".into(), "sam".into(), 80).unwrap();
        contest.propose_answer(2, "K2".into(), "kim".into(), 10).unwrap();
        contest.propose_answer(2, "Everest".into(), "lee".into(), 90).unwrap();
        contest.call_in(0, "Alice").unwrap();
        contest.mark_correct(0, "Alice", "Bob").unwrap();
        contest.mark_incorrect(1, "Carol").unwrap();
        contest.call_in(2, "Carol").unwrap();
        contest.set_agreement(2, "kim", Agreement::Agree).unwrap();
        contest.set_discrepancy_text(1, "q2 disputed".into()).unwrap();
        contest.new_round().unwrap();
        contest.set_speed().unwrap();
        contest.open(2, 5, 50, "Speed q5".into()).unwrap();
        contest.close(2, 5).unwrap();
        contest.set_announced(1, 10, 7).unwrap();
        contest.set_n_visual(12);
        contest
    }

    #[test]
    fn snapshot_restore_snapshot_is_lossless() {
        let original = played();
        let saved = ContestEntity::from(&original);

        let mut restored = contest();
        restored.restore(saved.clone()).unwrap();

        assert_eq!(ContestEntity::from(&restored), saved);
        assert_eq!(restored.current_round(), 2);
        assert_eq!(restored.earned(), 10);
        assert_eq!(restored.round(2).unwrap().question_count(), 18);
    }

    #[test]
    fn restore_keeps_versions_ahead_of_clients() {
        let original = played();
        let before = original.versions();
        let mut restored = original.clone();
        restored.restore(ContestEntity::from(&original)).unwrap();
        for (old, new) in before.iter().zip(restored.versions()) {
            assert!(new > *old);
        }
    }

    fn assert_round_trips(original: &Contest) {
        let saved = ContestEntity::from(original);
        let mut restored = contest();
        restored.restore(saved.clone()).unwrap();
        assert_eq!(ContestEntity::from(&restored), saved);
    }

    #[test]
    fn remapped_and_reset_questions_round_trip() {
        let mut contest = contest();
        contest.open(1, 1, 10, "moved".into()).unwrap();
        contest.propose_answer(1, "A".into(), "sam".into(), 5).unwrap();
        contest.mark_correct(0, "Alice", "Bob").unwrap();
        contest.remap_question(1, 3).unwrap();
        contest.open(1, 2, 20, "dropped".into()).unwrap();
        contest.reset_question(2).unwrap();
        assert_round_trips(&contest);

        let round = contest.round(1).unwrap();
        assert!(!round.question(1).unwrap().been_open);
        assert!(!round.question(2).unwrap().been_open);
        assert!(round.question(3).unwrap().correct);
    }

    #[test]
    fn reset_with_queued_answers_is_rejected_and_state_still_saves() {
        let mut contest = contest();
        contest.open(1, 1, 10, "Q?".into()).unwrap();
        contest.propose_answer(1, "A".into(), "sam".into(), 5).unwrap();
        let before = contest.clone();

        assert!(matches!(
            contest.reset_question(1),
            Err(ContestError::InvalidQuestion { question: 1, .. })
        ));
        assert_eq!(contest, before);
        assert_round_trips(&contest);
    }

    #[test]
    fn reopened_question_with_a_correct_answer_round_trips() {
        let mut contest = contest();
        contest.open(1, 1, 10, "Q?".into()).unwrap();
        contest.propose_answer(1, "A".into(), "sam".into(), 5).unwrap();
        contest.mark_correct(0, "Alice", "Bob").unwrap();
        contest
            .edit_question(
                1,
                1,
                QuestionEdit {
                    value: 10,
                    text: "Q?".into(),
                    ..QuestionEdit::default()
                },
            )
            .unwrap();
        contest.reopen(1).unwrap();
        assert_round_trips(&contest);
    }

    #[test]
    fn corrected_verdicts_round_trip() {
        let mut contest = contest();
        contest.open(1, 1, 10, "Q?".into()).unwrap();
        contest.propose_answer(1, "A".into(), "sam".into(), 5).unwrap();
        contest.mark_incorrect(0, "Carol").unwrap();
        contest.mark_correct(0, "Alice", "Bob").unwrap();
        contest.mark_partial(0, "Alice").unwrap();
        assert_round_trips(&contest);
        assert!(contest.round(1).unwrap().question(1).unwrap().is_open);
    }

    #[test]
    fn snapshot_breaking_an_invariant_is_rejected() {
        let saved = ContestEntity::from(&played());

        let mut out_of_range = saved.clone();
        out_of_range.rounds[0].answers.push(AnswerEntity {
            question_number: 42,
            ..saved.rounds[0].answers[0].clone()
        });
        let mut restored = contest();
        assert!(matches!(
            restored.restore(out_of_range),
            Err(ContestError::InvalidQuestion { question: 42, .. })
        ));

        let mut never_opened = saved;
        never_opened.rounds[0].questions[0].been_open = false;
        assert!(matches!(
            restored.restore(never_opened),
            Err(ContestError::InvalidQuestion { question: 1, .. })
        ));
    }
}
