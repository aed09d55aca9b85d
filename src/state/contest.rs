use thiserror::Error;

use super::{
    answer_queue::{Agreement, AnswerEvent, AnswerStatus, InvalidTransition},
    round::{Gate, QuestionEdit, Round, StandingsEntry, new_answer},
};

/// Errors raised by contest mutations. State is left untouched whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContestError {
    /// Round number out of range, or not the current round when that is required.
    #[error("invalid round {round}: {reason}")]
    InvalidRound {
        /// Offending round number.
        round: usize,
        /// What was wrong with it.
        reason: &'static str,
    },
    /// Question number out of range, or an open/closed precondition failed.
    #[error("invalid question {question} in round {round}: {reason}")]
    InvalidQuestion {
        /// Round the question belongs to.
        round: usize,
        /// Offending question number.
        question: usize,
        /// What was wrong with it.
        reason: &'static str,
    },
    /// No answer at this position of the round's queue.
    #[error("invalid queue index {queue_index} in round {round} (queue holds {len} answers)")]
    InvalidQueueIndex {
        /// Round whose queue was addressed.
        round: usize,
        /// Offending index.
        queue_index: usize,
        /// Queue length at the time of the call.
        len: usize,
    },
    /// Answer status change not permitted from the current status.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    /// Round configuration cannot change in its current state.
    #[error("configuration conflict in round {round}: {reason}")]
    ConfigurationConflict {
        /// Round whose configuration was rejected.
        round: usize,
        /// What blocked the change.
        reason: &'static str,
    },
}

/// Sizing and defaults applied when a contest is created or reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestSettings {
    pub team_name: String,
    pub n_rounds: usize,
    pub n_questions_normal: usize,
    pub n_questions_speed: usize,
    pub n_teams: usize,
    pub n_visual: usize,
}

impl Default for ContestSettings {
    fn default() -> Self {
        Self {
            team_name: "Team".into(),
            n_rounds: 50,
            n_questions_normal: 9,
            n_questions_speed: 18,
            n_teams: 100,
            n_visual: 20,
        }
    }
}

/// Contest-level fields shipped with every synchronization response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestHeader {
    pub team_name: String,
    pub n_rounds: usize,
    pub current_round: usize,
    pub n_teams: usize,
    pub n_visual: usize,
    /// Bumped whenever one of the fields above changes.
    pub version: u64,
}

/// Top-level aggregate: every round of the contest plus the current-round pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contest {
    settings: ContestSettings,
    n_teams: usize,
    n_visual: usize,
    current_round: usize,
    header_version: u64,
    rounds: Vec<Round>,
}

impl Contest {
    /// Build an empty contest. At least one round is always created.
    pub fn new(settings: ContestSettings) -> Self {
        let n_rounds = settings.n_rounds.max(1);
        let rounds = (1..=n_rounds)
            .map(|n| Round::new(n, settings.n_questions_normal, settings.n_questions_speed))
            .collect();
        Self {
            n_teams: settings.n_teams,
            n_visual: settings.n_visual,
            current_round: 1,
            header_version: 0,
            rounds,
            settings,
        }
    }

    pub fn settings(&self) -> &ContestSettings {
        &self.settings
    }

    pub fn current_round(&self) -> usize {
        self.current_round
    }

    pub fn n_rounds(&self) -> usize {
        self.rounds.len()
    }

    pub fn n_teams(&self) -> usize {
        self.n_teams
    }

    pub fn n_visual(&self) -> usize {
        self.n_visual
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn header(&self) -> ContestHeader {
        ContestHeader {
            team_name: self.settings.team_name.clone(),
            n_rounds: self.rounds.len(),
            current_round: self.current_round,
            n_teams: self.n_teams,
            n_visual: self.n_visual,
            version: self.header_version,
        }
    }

    /// Current version of every round, indexed by round number - 1.
    pub fn versions(&self) -> Vec<u64> {
        self.rounds.iter().map(Round::version).collect()
    }

    pub fn round(&self, number: usize) -> Result<&Round, ContestError> {
        self.rounds
            .get(number.wrapping_sub(1))
            .ok_or(ContestError::InvalidRound {
                round: number,
                reason: "round number out of range",
            })
    }

    /// Points earned across the whole contest.
    pub fn earned(&self) -> i32 {
        self.rounds.iter().map(Round::earned).sum()
    }

    /// Points earned in rounds `1..=through`.
    pub fn cumulative_earned(&self, through: usize) -> i32 {
        self.rounds
            .iter()
            .take(through)
            .map(Round::earned)
            .sum()
    }

    /// Run `apply` against one round and bump that round's version once on success.
    ///
    /// Round methods validate before writing, so an error leaves the round as it was.
    pub(crate) fn with_round<T>(
        &mut self,
        number: usize,
        gate: Gate,
        require_current: bool,
        apply: impl FnOnce(&mut Round) -> Result<T, ContestError>,
    ) -> Result<T, ContestError> {
        if require_current && gate == Gate::Live && number != self.current_round {
            // range errors win over "not current"
            self.round(number)?;
            return Err(ContestError::InvalidRound {
                round: number,
                reason: "only the current round accepts this operation",
            });
        }
        let round = self
            .rounds
            .get_mut(number.wrapping_sub(1))
            .ok_or(ContestError::InvalidRound {
                round: number,
                reason: "round number out of range",
            })?;
        let outcome = apply(round)?;
        round.bump();
        Ok(outcome)
    }

    fn with_current<T>(
        &mut self,
        apply: impl FnOnce(&mut Round) -> Result<T, ContestError>,
    ) -> Result<T, ContestError> {
        self.with_round(self.current_round, Gate::Live, true, apply)
    }

    fn bump_header(&mut self) {
        self.header_version += 1;
    }

    pub fn open(
        &mut self,
        round: usize,
        question: usize,
        value: i32,
        text: String,
    ) -> Result<(), ContestError> {
        self.with_round(round, Gate::Live, true, |r| {
            r.open_question(question, value, text)
        })
    }

    pub fn close(&mut self, round: usize, question: usize) -> Result<(), ContestError> {
        self.with_round(round, Gate::Live, false, |r| r.close_question(question))
    }

    /// Rewrite an already-opened question of any round.
    pub fn edit_question(
        &mut self,
        round: usize,
        question: usize,
        edit: QuestionEdit,
    ) -> Result<(), ContestError> {
        self.with_round(round, Gate::Live, false, |r| r.edit_question(question, edit))
    }

    /// Reopen a closed question of the current round that was not answered correctly.
    pub fn reopen(&mut self, question: usize) -> Result<(), ContestError> {
        self.with_current(|r| r.reopen_question(question))
    }

    /// Return a question of the current round to its never-opened state.
    pub fn reset_question(&mut self, question: usize) -> Result<(), ContestError> {
        self.with_current(|r| r.reset_question(question))
    }

    pub fn remap_question(&mut self, from: usize, to: usize) -> Result<(), ContestError> {
        self.with_current(|r| r.remap_question(from, to))
    }

    /// Queue an answer for an open question of the current round; returns its queue index.
    pub fn propose_answer(
        &mut self,
        question: usize,
        text: String,
        submitter: String,
        confidence: i32,
    ) -> Result<usize, ContestError> {
        self.with_current(|r| {
            r.propose(new_answer(question, text, submitter, confidence), Gate::Live)
        })
    }

    fn answer_event(
        &mut self,
        queue_index: usize,
        event: AnswerEvent,
        caller: &str,
        operator: &str,
    ) -> Result<AnswerStatus, ContestError> {
        self.with_current(|r| r.apply_answer_event(queue_index, event, caller, operator))
    }

    pub fn call_in(&mut self, queue_index: usize, caller: &str) -> Result<(), ContestError> {
        self.answer_event(queue_index, AnswerEvent::CallIn, caller, "")
            .map(drop)
    }

    pub fn mark_correct(
        &mut self,
        queue_index: usize,
        caller: &str,
        operator: &str,
    ) -> Result<(), ContestError> {
        self.answer_event(queue_index, AnswerEvent::MarkCorrect, caller, operator)
            .map(drop)
    }

    pub fn mark_incorrect(&mut self, queue_index: usize, caller: &str) -> Result<(), ContestError> {
        self.answer_event(queue_index, AnswerEvent::MarkIncorrect, caller, "")
            .map(drop)
    }

    pub fn mark_partial(&mut self, queue_index: usize, caller: &str) -> Result<(), ContestError> {
        self.answer_event(queue_index, AnswerEvent::MarkPartial, caller, "")
            .map(drop)
    }

    pub fn mark_duplicate(&mut self, queue_index: usize) -> Result<(), ContestError> {
        self.answer_event(queue_index, AnswerEvent::MarkDuplicate, "", "")
            .map(drop)
    }

    /// Operator undo: back to `NotCalledIn` from any status.
    pub fn mark_uncalled(&mut self, queue_index: usize) -> Result<(), ContestError> {
        self.answer_event(queue_index, AnswerEvent::MarkUncalled, "", "")
            .map(drop)
    }

    pub fn set_agreement(
        &mut self,
        queue_index: usize,
        user: &str,
        agreement: Agreement,
    ) -> Result<(), ContestError> {
        self.with_current(|r| r.set_agreement(queue_index, user, agreement))
    }

    /// Advance to the next round.
    pub fn new_round(&mut self) -> Result<usize, ContestError> {
        if self.current_round >= self.rounds.len() {
            return Err(ContestError::InvalidRound {
                round: self.current_round,
                reason: "already at the last round",
            });
        }
        self.current_round += 1;
        self.bump_header();
        Ok(self.current_round)
    }

    pub fn set_speed(&mut self) -> Result<(), ContestError> {
        self.with_current(|r| r.set_speed(true))
    }

    pub fn unset_speed(&mut self) -> Result<(), ContestError> {
        self.with_current(|r| r.set_speed(false))
    }

    /// Record the score and place the contest announced for a round; overwrites prior values.
    pub fn set_announced(
        &mut self,
        round: usize,
        score: i32,
        place: u32,
    ) -> Result<(), ContestError> {
        self.with_round(round, Gate::Live, false, |r| {
            r.set_announced(score, place);
            Ok(())
        })
    }

    /// Store the full standings list of a round. A non-empty list also fixes the team count.
    pub fn record_standings(
        &mut self,
        round: usize,
        standings: Vec<StandingsEntry>,
    ) -> Result<(), ContestError> {
        let teams = standings.len();
        self.with_round(round, Gate::Live, false, |r| {
            r.set_standings(standings);
            Ok(())
        })?;
        if teams > 0 && teams != self.n_teams {
            self.n_teams = teams;
            self.bump_header();
        }
        Ok(())
    }

    pub fn set_discrepancy_text(&mut self, round: usize, text: String) -> Result<(), ContestError> {
        self.with_round(round, Gate::Live, false, |r| {
            r.set_discrepancy_text(text);
            Ok(())
        })
    }

    pub fn set_show_name(&mut self, round: usize, name: String) -> Result<(), ContestError> {
        self.with_round(round, Gate::Live, false, |r| {
            r.set_show_name(name);
            Ok(())
        })
    }

    pub fn set_show_host(&mut self, round: usize, host: String) -> Result<(), ContestError> {
        self.with_round(round, Gate::Live, false, |r| {
            r.set_show_host(host);
            Ok(())
        })
    }

    pub fn set_n_teams(&mut self, n_teams: usize) {
        self.n_teams = n_teams;
        self.bump_header();
    }

    pub fn set_n_visual(&mut self, n_visual: usize) {
        self.n_visual = n_visual;
        self.bump_header();
    }

    /// Clear every round and go back to round 1 with default team counts.
    ///
    /// Round versions keep increasing across a reset.
    pub fn reset(&mut self) {
        self.rounds = self.rounds.iter().map(Round::cleared).collect();
        self.current_round = 1;
        self.n_teams = self.settings.n_teams;
        self.n_visual = self.settings.n_visual;
        self.bump_header();
    }

    /// Move the current-round pointer directly; used when restoring a snapshot.
    pub(crate) fn restore_current_round(&mut self, round: usize) -> Result<(), ContestError> {
        self.round(round)?;
        self.current_round = round;
        self.bump_header();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(n_rounds: usize) -> ContestSettings {
        ContestSettings {
            n_rounds,
            ..ContestSettings::default()
        }
    }

    fn contest() -> Contest {
        Contest::new(settings(3))
    }

    #[test]
    fn scored_answer_walkthrough_bumps_once_per_call() {
        let mut contest = contest();
        let start = contest.round(1).unwrap().version();

        contest.open(1, 1, 10, "Q?".into()).unwrap();
        let question = &contest.round(1).unwrap().questions()[0];
        assert!(question.is_open && question.been_open);

        let index = contest
            .propose_answer(1, "A".into(), "sam".into(), 80)
            .unwrap();
        assert_eq!(index, 0);
        assert_eq!(
            contest.round(1).unwrap().queue().get(0).unwrap().status,
            AnswerStatus::NotCalledIn
        );

        contest.call_in(0, "Alice").unwrap();
        assert_eq!(
            contest.round(1).unwrap().queue().get(0).unwrap().status,
            AnswerStatus::Calling
        );

        contest.mark_correct(0, "Alice", "Bob").unwrap();
        let round = contest.round(1).unwrap();
        let answer = round.queue().get(0).unwrap();
        assert_eq!(answer.status, AnswerStatus::Correct);
        let question = &round.questions()[0];
        assert!(question.correct && question.been_open && !question.is_open);
        assert_eq!(question.submitter, "sam");
        assert_eq!(question.operator, "Bob");
        assert_eq!(round.version(), start + 4);
        assert_eq!(contest.earned(), 10);
    }

    #[test]
    fn rejected_operations_do_not_bump() {
        let mut contest = contest();
        contest.open(1, 1, 10, "Q?".into()).unwrap();
        let before = contest.clone();

        assert!(matches!(
            contest.open(1, 1, 10, "again".into()),
            Err(ContestError::InvalidQuestion { .. })
        ));
        assert!(matches!(
            contest.call_in(5, "Alice"),
            Err(ContestError::InvalidQueueIndex { queue_index: 5, len: 0, .. })
        ));
        assert!(matches!(
            contest.open(2, 1, 10, "later".into()),
            Err(ContestError::InvalidRound { round: 2, .. })
        ));
        assert!(matches!(
            contest.open(9, 1, 10, "nowhere".into()),
            Err(ContestError::InvalidRound { round: 9, .. })
        ));
        assert!(matches!(
            contest.propose_answer(2, "x".into(), "s".into(), 1),
            Err(ContestError::InvalidQuestion { question: 2, .. })
        ));
        assert_eq!(contest, before);
    }

    #[test]
    fn repeated_call_in_is_an_invalid_transition() {
        let mut contest = contest();
        contest.open(1, 1, 10, "Q?".into()).unwrap();
        contest.propose_answer(1, "A".into(), "s".into(), 1).unwrap();
        contest.call_in(0, "Alice").unwrap();
        assert!(matches!(
            contest.call_in(0, "Carol"),
            Err(ContestError::InvalidTransition(_))
        ));
        contest.mark_uncalled(0).unwrap();
        contest.call_in(0, "Carol").unwrap();
    }

    #[test]
    fn speed_toggle_only_before_first_open() {
        let mut contest = contest();
        contest.set_speed().unwrap();
        assert_eq!(contest.round(1).unwrap().question_count(), 18);
        contest.unset_speed().unwrap();
        contest.open(1, 1, 5, "q".into()).unwrap();
        assert!(matches!(
            contest.set_speed(),
            Err(ContestError::ConfigurationConflict { round: 1, .. })
        ));
    }

    #[test]
    fn new_round_stops_at_last_round() {
        let mut contest = contest();
        assert_eq!(contest.new_round().unwrap(), 2);
        assert_eq!(contest.new_round().unwrap(), 3);
        assert!(matches!(
            contest.new_round(),
            Err(ContestError::InvalidRound { round: 3, .. })
        ));
        assert_eq!(contest.header().version, 2);
    }

    #[test]
    fn past_rounds_still_accept_metadata_and_close() {
        let mut contest = contest();
        contest.open(1, 1, 10, "Q?".into()).unwrap();
        contest.new_round().unwrap();
        contest.close(1, 1).unwrap();
        contest.set_announced(1, 10, 4).unwrap();
        contest.set_announced(1, 8, 5).unwrap();
        contest.set_discrepancy_text(1, "question 1 disputed".into()).unwrap();

        let round = contest.round(1).unwrap();
        assert_eq!((round.announced_score(), round.announced_place()), (8, 5));
        assert!(round.is_mismatch());
        assert_eq!(round.version(), 5);
    }

    #[test]
    fn reset_restores_defaults_and_keeps_versions_increasing() {
        let mut contest = contest();
        contest.open(1, 1, 10, "Q?".into()).unwrap();
        contest.new_round().unwrap();
        contest.set_n_teams(42);
        contest.reset();

        assert_eq!(contest.current_round(), 1);
        assert_eq!(contest.n_teams(), 100);
        assert_eq!(contest.versions(), vec![2, 1, 1]);
        assert!(!contest.round(1).unwrap().questions()[0].been_open);
    }

    #[test]
    fn recorded_standings_set_team_count() {
        let mut contest = contest();
        let standings = (1..=3)
            .map(|place| StandingsEntry {
                team: format!("team {place}"),
                score: 100 - place as i32,
                place,
            })
            .collect();
        contest.record_standings(1, standings).unwrap();
        assert_eq!(contest.n_teams(), 3);
        assert_eq!(contest.round(1).unwrap().standings().len(), 3);
    }
}
