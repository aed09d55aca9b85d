use std::time::SystemTime;

use super::{
    answer_queue::{Agreement, Answer, AnswerEvent, AnswerQueue, AnswerStatus, compute_transition},
    contest::ContestError,
};

/// Whether an operation is a live operator action or a replay of saved state.
///
/// Replays skip the timing checks (current round, question currently open)
/// but never the structural ones (ranges, lifecycle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Gate {
    Live,
    Replay,
}

/// One question slot of a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// 1-based number, unique within the round.
    pub number: usize,
    /// Point value announced when the question was opened.
    pub value: i32,
    pub text: String,
    /// Accepted answer text (or the answer given when closed).
    pub answer: String,
    /// True once an answer has been accepted as correct.
    pub correct: bool,
    /// Who proposed the accepted answer.
    pub submitter: String,
    /// Operator who took the accepted answer.
    pub operator: String,
    /// Sticky: once opened, stays true until the question is reset.
    pub been_open: bool,
    pub is_open: bool,
}

impl Question {
    fn new(number: usize) -> Self {
        Self {
            number,
            value: 0,
            text: String::new(),
            answer: String::new(),
            correct: false,
            submitter: String::new(),
            operator: String::new(),
            been_open: false,
            is_open: false,
        }
    }

    /// Points credited by this question.
    pub fn earned(&self) -> i32 {
        if self.correct { self.value } else { 0 }
    }

    fn clear_result(&mut self) {
        self.correct = false;
        self.answer.clear();
        self.submitter.clear();
        self.operator.clear();
    }

    fn mark_correct(&mut self, answer: &str, submitter: &str, operator: &str) {
        self.correct = true;
        self.is_open = false;
        self.answer = answer.to_string();
        self.submitter = submitter.to_string();
        self.operator = operator.to_string();
    }
}

/// Field values written by an explicit question edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionEdit {
    pub value: i32,
    pub text: String,
    pub answer: String,
    pub correct: bool,
    pub submitter: String,
    pub operator: String,
}

/// One row of externally published standings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingsEntry {
    pub team: String,
    pub score: i32,
    pub place: u32,
}

/// One contest round: its questions, answer queue, metadata, and change counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    number: usize,
    normal_questions: usize,
    speed_questions: usize,
    speed: bool,
    announced: bool,
    announced_score: i32,
    announced_place: u32,
    show_name: String,
    show_host: String,
    discrepancy_text: String,
    standings: Vec<StandingsEntry>,
    questions: Vec<Question>,
    queue: AnswerQueue,
    version: u64,
}

impl Round {
    /// Create an empty, non-speed round.
    pub fn new(number: usize, normal_questions: usize, speed_questions: usize) -> Self {
        Self {
            number,
            normal_questions,
            speed_questions,
            speed: false,
            announced: false,
            announced_score: 0,
            announced_place: 0,
            show_name: String::new(),
            show_host: String::new(),
            discrepancy_text: String::new(),
            standings: Vec::new(),
            questions: (1..=normal_questions).map(Question::new).collect(),
            queue: AnswerQueue::new(),
            version: 0,
        }
    }

    /// Replacement round used by a contest reset; the version keeps counting
    /// so clients that already saw this round still detect the change.
    pub(crate) fn cleared(&self) -> Self {
        let mut fresh = Self::new(self.number, self.normal_questions, self.speed_questions);
        fresh.version = self.version + 1;
        fresh
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_speed(&self) -> bool {
        self.speed
    }

    pub fn is_announced(&self) -> bool {
        self.announced
    }

    pub fn announced_score(&self) -> i32 {
        self.announced_score
    }

    pub fn announced_place(&self) -> u32 {
        self.announced_place
    }

    pub fn show_name(&self) -> &str {
        &self.show_name
    }

    pub fn show_host(&self) -> &str {
        &self.show_host
    }

    pub fn discrepancy_text(&self) -> &str {
        &self.discrepancy_text
    }

    pub fn standings(&self) -> &[StandingsEntry] {
        &self.standings
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn queue(&self) -> &AnswerQueue {
        &self.queue
    }

    /// Number of questions in play (depends on the speed flag).
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Points earned so far this round.
    pub fn earned(&self) -> i32 {
        self.questions.iter().map(Question::earned).sum()
    }

    /// Total value of every question opened this round.
    pub fn value(&self) -> i32 {
        self.questions.iter().map(|q| q.value).sum()
    }

    pub fn open_question_numbers(&self) -> Vec<usize> {
        self.questions
            .iter()
            .filter(|q| q.is_open)
            .map(|q| q.number)
            .collect()
    }

    /// Lowest question number never opened, if any remain.
    pub fn next_to_open(&self) -> Option<usize> {
        self.questions.iter().find(|q| !q.been_open).map(|q| q.number)
    }

    /// Every question has been opened and none is still open.
    pub fn is_over(&self) -> bool {
        self.questions.iter().all(|q| q.been_open && !q.is_open)
    }

    /// Announced score disagrees with our own tally.
    pub fn is_mismatch(&self) -> bool {
        self.announced && self.announced_score != self.earned()
    }

    pub fn question(&self, number: usize) -> Result<&Question, ContestError> {
        self.questions
            .get(number.wrapping_sub(1))
            .ok_or(ContestError::InvalidQuestion {
                round: self.number,
                question: number,
                reason: "question number out of range",
            })
    }

    fn question_mut(&mut self, number: usize) -> Result<&mut Question, ContestError> {
        let round = self.number;
        self.questions
            .get_mut(number.wrapping_sub(1))
            .ok_or(ContestError::InvalidQuestion {
                round,
                question: number,
                reason: "question number out of range",
            })
    }

    fn question_error(&self, question: usize, reason: &'static str) -> ContestError {
        ContestError::InvalidQuestion {
            round: self.number,
            question,
            reason,
        }
    }

    /// Record a successful mutation and return the new version.
    pub(crate) fn bump(&mut self) -> u64 {
        self.version += 1;
        self.version
    }

    pub(crate) fn open_question(
        &mut self,
        number: usize,
        value: i32,
        text: String,
    ) -> Result<(), ContestError> {
        if self.question(number)?.been_open {
            return Err(self.question_error(number, "question has already been opened"));
        }
        let question = self.question_mut(number)?;
        question.clear_result();
        question.value = value;
        question.text = text;
        question.been_open = true;
        question.is_open = true;
        Ok(())
    }

    pub(crate) fn close_question(&mut self, number: usize) -> Result<(), ContestError> {
        if !self.question(number)?.is_open {
            return Err(self.question_error(number, "question is not open"));
        }
        self.question_mut(number)?.is_open = false;
        Ok(())
    }

    pub(crate) fn reopen_question(&mut self, number: usize) -> Result<(), ContestError> {
        let question = self.question(number)?;
        if !question.been_open {
            return Err(self.question_error(number, "question has never been opened"));
        }
        if question.is_open {
            return Err(self.question_error(number, "question is already open"));
        }
        if question.correct {
            return Err(self.question_error(number, "question has a correct answer"));
        }
        let question = self.question_mut(number)?;
        question.clear_result();
        question.is_open = true;
        Ok(())
    }

    pub(crate) fn reset_question(&mut self, number: usize) -> Result<(), ContestError> {
        self.question(number)?;
        if self.queue.iter().any(|answer| answer.question_number == number) {
            return Err(self.question_error(number, "question still has queued answers"));
        }
        let question = self.question_mut(number)?;
        *question = Question::new(number);
        Ok(())
    }

    pub(crate) fn edit_question(
        &mut self,
        number: usize,
        edit: QuestionEdit,
    ) -> Result<(), ContestError> {
        if !self.question(number)?.been_open {
            return Err(self.question_error(number, "only opened questions can be edited"));
        }
        let question = self.question_mut(number)?;
        question.value = edit.value;
        question.text = edit.text;
        question.answer = edit.answer;
        question.submitter = edit.submitter;
        question.operator = edit.operator;
        question.correct = edit.correct;
        if edit.correct {
            question.is_open = false;
        }
        Ok(())
    }

    /// Move question `from` (state and queued answers) onto the unopened slot `to`.
    pub(crate) fn remap_question(&mut self, from: usize, to: usize) -> Result<(), ContestError> {
        if !self.question(from)?.been_open {
            return Err(self.question_error(from, "only opened questions can be remapped"));
        }
        if from == to || self.question(to)?.been_open {
            return Err(self.question_error(to, "remap target must be an unopened question"));
        }
        let mut moved = self.question(from)?.clone();
        moved.number = to;
        *self.question_mut(to)? = moved;
        *self.question_mut(from)? = Question::new(from);
        for answer in self.queue.iter_mut() {
            if answer.question_number == from {
                answer.question_number = to;
            }
        }
        Ok(())
    }

    pub(crate) fn propose(
        &mut self,
        answer: Answer,
        gate: Gate,
    ) -> Result<usize, ContestError> {
        let question = self.question(answer.question_number)?;
        if !question.been_open {
            return Err(self.question_error(answer.question_number, "question has never been opened"));
        }
        if gate == Gate::Live && !question.is_open {
            return Err(self.question_error(answer.question_number, "question is not open"));
        }
        Ok(self.queue.push(answer))
    }

    fn answer(&self, queue_index: usize) -> Result<&Answer, ContestError> {
        self.queue
            .get(queue_index)
            .ok_or(ContestError::InvalidQueueIndex {
                round: self.number,
                queue_index,
                len: self.queue.len(),
            })
    }

    /// Apply a lifecycle event to the answer at `queue_index`.
    ///
    /// `caller` and `operator` are recorded where the event uses them.
    /// A correct verdict credits the target question. Moving the last correct
    /// answer for a question to any other status un-credits it and reopens it,
    /// unless the question has been reset since.
    pub(crate) fn apply_answer_event(
        &mut self,
        queue_index: usize,
        event: AnswerEvent,
        caller: &str,
        operator: &str,
    ) -> Result<AnswerStatus, ContestError> {
        let answer = self.answer(queue_index)?;
        let previous = answer.status;
        let next = compute_transition(queue_index, previous, event)?;
        let question_number = answer.question_number;
        let text = answer.text.clone();
        let submitter = answer.submitter.clone();
        let question = self.question(question_number)?;
        if next == AnswerStatus::Correct && !question.been_open {
            return Err(self.question_error(question_number, "question has never been opened"));
        }
        let uncredit = previous == AnswerStatus::Correct
            && next != AnswerStatus::Correct
            && !self.queue.iter().enumerate().any(|(index, other)| {
                index != queue_index
                    && other.question_number == question_number
                    && other.status == AnswerStatus::Correct
            });
        let reopen = uncredit && question.been_open;

        // Everything below is infallible: the answer and its question exist.
        if let Some(answer) = self.queue.get_mut(queue_index) {
            answer.status = next;
            match event {
                AnswerEvent::CallIn
                | AnswerEvent::MarkIncorrect
                | AnswerEvent::MarkPartial => {
                    answer.caller = caller.to_string();
                    answer.operator.clear();
                }
                AnswerEvent::MarkCorrect => {
                    answer.caller = caller.to_string();
                    answer.operator = operator.to_string();
                }
                AnswerEvent::MarkDuplicate | AnswerEvent::MarkUncalled => {
                    answer.caller.clear();
                    answer.operator.clear();
                }
            }
        }
        if let Some(question) = self.questions.get_mut(question_number - 1) {
            if next == AnswerStatus::Correct {
                question.mark_correct(&text, &submitter, operator);
            } else if uncredit {
                question.clear_result();
                question.is_open = reopen;
            }
        }

        Ok(next)
    }

    pub(crate) fn set_agreement(
        &mut self,
        queue_index: usize,
        user: &str,
        agreement: Agreement,
    ) -> Result<(), ContestError> {
        self.answer(queue_index)?;
        if let Some(answer) = self.queue.get_mut(queue_index) {
            answer.agreement.insert(user.to_string(), agreement);
        }
        Ok(())
    }

    pub(crate) fn set_speed(&mut self, speed: bool) -> Result<(), ContestError> {
        if self.questions.iter().any(|q| q.been_open) {
            return Err(ContestError::ConfigurationConflict {
                round: self.number,
                reason: "speed flag cannot change once a question has been opened",
            });
        }
        if !self.queue.is_empty() {
            return Err(ContestError::ConfigurationConflict {
                round: self.number,
                reason: "speed flag cannot change while answers are queued",
            });
        }
        let count = if speed {
            self.speed_questions
        } else {
            self.normal_questions
        };
        self.questions = (1..=count).map(Question::new).collect();
        self.speed = speed;
        Ok(())
    }

    pub(crate) fn set_announced(&mut self, score: i32, place: u32) {
        self.announced = true;
        self.announced_score = score;
        self.announced_place = place;
    }

    pub(crate) fn set_standings(&mut self, standings: Vec<StandingsEntry>) {
        self.standings = standings;
    }

    pub(crate) fn set_discrepancy_text(&mut self, text: String) {
        self.discrepancy_text = text;
    }

    pub(crate) fn set_show_name(&mut self, name: String) {
        self.show_name = name;
    }

    pub(crate) fn set_show_host(&mut self, host: String) {
        self.show_host = host;
    }
}

/// Build a queue entry stamped with the current time.
pub(crate) fn new_answer(
    question_number: usize,
    text: String,
    submitter: String,
    confidence: i32,
) -> Answer {
    Answer::new(question_number, text, submitter, confidence, SystemTime::now())
}
