use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::validation::validate_user_name,
    state::{answer_queue::Agreement, presence::Role},
};

/// Open a question of the current round.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct OpenQuestionRequest {
    #[validate(custom(function = "validate_user_name"))]
    pub user: String,
    #[validate(range(min = 1))]
    pub round: usize,
    #[validate(range(min = 1))]
    pub question: usize,
    #[validate(range(min = 0))]
    pub value: i32,
    #[serde(default)]
    pub text: String,
}

/// Address one question of a given round.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct RoundQuestionRequest {
    #[validate(custom(function = "validate_user_name"))]
    pub user: String,
    #[validate(range(min = 1))]
    pub round: usize,
    #[validate(range(min = 1))]
    pub question: usize,
}

/// Address one question of the current round.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct QuestionRequest {
    #[validate(custom(function = "validate_user_name"))]
    pub user: String,
    #[validate(range(min = 1))]
    pub question: usize,
}

/// Overwrite the stored fields of an opened question.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct EditQuestionRequest {
    #[validate(custom(function = "validate_user_name"))]
    pub user: String,
    #[validate(range(min = 1))]
    pub round: usize,
    #[validate(range(min = 1))]
    pub question: usize,
    #[validate(range(min = 0))]
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
}

/// Move a question of the current round onto an unopened slot.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct RemapQuestionRequest {
    #[validate(custom(function = "validate_user_name"))]
    pub user: String,
    #[validate(range(min = 1))]
    pub from: usize,
    #[validate(range(min = 1))]
    pub to: usize,
}

/// Queue an answer; `user` is recorded as the submitter.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct ProposeAnswerRequest {
    #[validate(custom(function = "validate_user_name"))]
    pub user: String,
    #[validate(range(min = 1))]
    pub question: usize,
    #[validate(length(min = 1, max = 500))]
    pub text: String,
    pub confidence: i32,
}

/// Act on one queued answer of the current round; `user` is recorded as the caller.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct AnswerActionRequest {
    #[validate(custom(function = "validate_user_name"))]
    pub user: String,
    pub queue_index: usize,
}

/// Accept a queued answer.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct MarkCorrectRequest {
    #[validate(custom(function = "validate_user_name"))]
    pub caller: String,
    #[validate(custom(function = "validate_user_name"))]
    pub operator: String,
    pub queue_index: usize,
}

/// Record `user`'s opinion on a queued answer.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct AgreementRequest {
    #[validate(custom(function = "validate_user_name"))]
    pub user: String,
    pub queue_index: usize,
    pub agreement: Agreement,
}

/// Set a free-text field (discrepancy note, show name or host) on a round.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct RoundTextRequest {
    #[validate(custom(function = "validate_user_name"))]
    pub user: String,
    #[validate(range(min = 1))]
    pub round: usize,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub text: String,
}

/// Record the score and place announced for a round.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct AnnouncedRequest {
    #[validate(custom(function = "validate_user_name"))]
    pub user: String,
    #[validate(range(min = 1))]
    pub round: usize,
    pub score: i32,
    #[validate(range(min = 1))]
    pub place: u32,
}

/// Set a contest-wide count (teams or visual teams).
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct CountRequest {
    #[validate(custom(function = "validate_user_name"))]
    pub user: String,
    #[validate(range(min = 1, max = 10000))]
    pub value: usize,
}

/// Operation that only needs to know who issued it.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct UserRequest {
    #[validate(custom(function = "validate_user_name"))]
    pub user: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct SetRoleRequest {
    #[validate(custom(function = "validate_user_name"))]
    pub user: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct RenameUserRequest {
    #[validate(custom(function = "validate_user_name"))]
    pub old_name: String,
    #[validate(custom(function = "validate_user_name"))]
    pub new_name: String,
}

/// Versions the caller already holds, indexed by round number - 1.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct SyncRequest {
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub known_versions: Vec<u64>,
}

/// Result of an accepted mutation.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct MutationAck {
    pub header_version: u64,
    pub versions: Vec<u64>,
    /// Queue position of a newly proposed answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_index: Option<usize>,
    /// Round the contest is on after the mutation.
    pub current_round: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_user_fails_validation() {
        let request = UserRequest { user: " ".into() };
        assert!(request.validate().is_err());
    }

    #[test]
    fn zero_round_fails_validation() {
        let request = RoundQuestionRequest {
            user: "alice".into(),
            round: 0,
            question: 1,
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("round"));
    }

    #[test]
    fn empty_answer_text_fails_validation() {
        let request = ProposeAnswerRequest {
            user: "sam".into(),
            question: 1,
            text: String::new(),
            confidence: 3,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn agreement_request_parses_snake_case_vote() {
        let request: AgreementRequest =
            serde_json::from_str(r#"{"user":"kim","queue_index":2,"agreement":"disagree"}"#)
                .unwrap();
        assert_eq!(request.agreement, Agreement::Disagree);
        assert!(request.validate().is_ok());
    }
}
