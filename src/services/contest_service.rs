use tracing::{info, warn};
use validator::Validate;

use crate::{
    dto::{
        contest::{ContestSnapshot, VersionsResponse},
        rpc::{
            AgreementRequest, AnnouncedRequest, AnswerActionRequest, CountRequest,
            EditQuestionRequest, MarkCorrectRequest, MutationAck, OpenQuestionRequest,
            ProposeAnswerRequest, QuestionRequest, RemapQuestionRequest, RoundQuestionRequest,
            RoundTextRequest, UserRequest,
        },
    },
    error::ServiceError,
    state::{
        SharedState,
        contest::{Contest, ContestError},
        round::QuestionEdit,
    },
};

pub(crate) fn validate(request: &impl Validate) -> Result<(), ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))
}

fn ack(contest: &Contest, queue_index: Option<usize>) -> MutationAck {
    MutationAck {
        header_version: contest.header().version,
        versions: contest.versions(),
        queue_index,
        current_round: contest.current_round(),
    }
}

/// Touch the issuing user, run `mutation` under the contest lock and log the outcome.
async fn apply(
    state: &SharedState,
    user: &str,
    action: &'static str,
    mutation: impl FnOnce(&mut Contest) -> Result<Option<usize>, ContestError>,
) -> Result<MutationAck, ServiceError> {
    state.presence().touch(user);
    let outcome = state
        .mutate(|contest| {
            let queue_index = mutation(contest)?;
            Ok(ack(contest, queue_index))
        })
        .await;

    match outcome {
        Ok(ack) => {
            info!(user, action, current_round = ack.current_round, "contest updated");
            Ok(ack)
        }
        Err(err) => {
            warn!(user, action, error = %err, "contest operation rejected");
            Err(err.into())
        }
    }
}

/// Full contest snapshot.
pub async fn contest_snapshot(state: &SharedState) -> ContestSnapshot {
    state.read(|contest| ContestSnapshot::from(contest)).await
}

pub async fn versions(state: &SharedState) -> VersionsResponse {
    state.read(|contest| VersionsResponse::from(contest)).await
}

pub async fn open_question(
    state: &SharedState,
    request: OpenQuestionRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    let OpenQuestionRequest {
        user,
        round,
        question,
        value,
        text,
    } = request;
    apply(state, &user, "open_question", |contest| {
        contest.open(round, question, value, text).map(|_| None)
    })
    .await
}

pub async fn close_question(
    state: &SharedState,
    request: RoundQuestionRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    apply(state, &request.user, "close_question", |contest| {
        contest.close(request.round, request.question).map(|_| None)
    })
    .await
}

pub async fn edit_question(
    state: &SharedState,
    request: EditQuestionRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    let edit = QuestionEdit {
        value: request.value,
        text: request.text,
        answer: request.answer,
        correct: request.correct,
        submitter: request.submitter,
        operator: request.operator,
    };
    apply(state, &request.user, "edit_question", |contest| {
        contest
            .edit_question(request.round, request.question, edit)
            .map(|_| None)
    })
    .await
}

pub async fn reopen_question(
    state: &SharedState,
    request: QuestionRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    apply(state, &request.user, "reopen_question", |contest| {
        contest.reopen(request.question).map(|_| None)
    })
    .await
}

pub async fn reset_question(
    state: &SharedState,
    request: QuestionRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    apply(state, &request.user, "reset_question", |contest| {
        contest.reset_question(request.question).map(|_| None)
    })
    .await
}

pub async fn remap_question(
    state: &SharedState,
    request: RemapQuestionRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    apply(state, &request.user, "remap_question", |contest| {
        contest.remap_question(request.from, request.to).map(|_| None)
    })
    .await
}

pub async fn propose_answer(
    state: &SharedState,
    request: ProposeAnswerRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    let ProposeAnswerRequest {
        user,
        question,
        text,
        confidence,
    } = request;
    let submitter = user.clone();
    apply(state, &user, "propose_answer", |contest| {
        contest
            .propose_answer(question, text, submitter, confidence)
            .map(Some)
    })
    .await
}

pub async fn call_in(
    state: &SharedState,
    request: AnswerActionRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    apply(state, &request.user, "call_in", |contest| {
        contest.call_in(request.queue_index, &request.user).map(|_| None)
    })
    .await
}

pub async fn mark_correct(
    state: &SharedState,
    request: MarkCorrectRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    state.presence().touch(&request.caller);
    apply(state, &request.operator, "mark_correct", |contest| {
        contest
            .mark_correct(request.queue_index, &request.caller, &request.operator)
            .map(|_| None)
    })
    .await
}

pub async fn mark_incorrect(
    state: &SharedState,
    request: AnswerActionRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    apply(state, &request.user, "mark_incorrect", |contest| {
        contest
            .mark_incorrect(request.queue_index, &request.user)
            .map(|_| None)
    })
    .await
}

pub async fn mark_partial(
    state: &SharedState,
    request: AnswerActionRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    apply(state, &request.user, "mark_partial", |contest| {
        contest
            .mark_partial(request.queue_index, &request.user)
            .map(|_| None)
    })
    .await
}

pub async fn mark_duplicate(
    state: &SharedState,
    request: AnswerActionRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    apply(state, &request.user, "mark_duplicate", |contest| {
        contest.mark_duplicate(request.queue_index).map(|_| None)
    })
    .await
}

pub async fn mark_uncalled(
    state: &SharedState,
    request: AnswerActionRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    apply(state, &request.user, "mark_uncalled", |contest| {
        contest.mark_uncalled(request.queue_index).map(|_| None)
    })
    .await
}

pub async fn set_agreement(
    state: &SharedState,
    request: AgreementRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    apply(state, &request.user, "set_agreement", |contest| {
        contest
            .set_agreement(request.queue_index, &request.user, request.agreement)
            .map(|_| None)
    })
    .await
}

pub async fn new_round(
    state: &SharedState,
    request: UserRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    apply(state, &request.user, "new_round", |contest| {
        contest.new_round().map(|_| None)
    })
    .await
}

pub async fn set_speed(
    state: &SharedState,
    request: UserRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    apply(state, &request.user, "set_speed", |contest| {
        contest.set_speed().map(|_| None)
    })
    .await
}

pub async fn unset_speed(
    state: &SharedState,
    request: UserRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    apply(state, &request.user, "unset_speed", |contest| {
        contest.unset_speed().map(|_| None)
    })
    .await
}

pub async fn set_announced(
    state: &SharedState,
    request: AnnouncedRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    apply(state, &request.user, "set_announced", |contest| {
        contest
            .set_announced(request.round, request.score, request.place)
            .map(|_| None)
    })
    .await
}

pub async fn set_discrepancy_text(
    state: &SharedState,
    request: RoundTextRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    apply(state, &request.user, "set_discrepancy_text", |contest| {
        contest
            .set_discrepancy_text(request.round, request.text)
            .map(|_| None)
    })
    .await
}

pub async fn set_show_name(
    state: &SharedState,
    request: RoundTextRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    apply(state, &request.user, "set_show_name", |contest| {
        contest.set_show_name(request.round, request.text).map(|_| None)
    })
    .await
}

pub async fn set_show_host(
    state: &SharedState,
    request: RoundTextRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    apply(state, &request.user, "set_show_host", |contest| {
        contest.set_show_host(request.round, request.text).map(|_| None)
    })
    .await
}

pub async fn set_n_teams(
    state: &SharedState,
    request: CountRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    apply(state, &request.user, "set_n_teams", |contest| {
        contest.set_n_teams(request.value);
        Ok(None)
    })
    .await
}

pub async fn set_n_visual(
    state: &SharedState,
    request: CountRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    apply(state, &request.user, "set_n_visual", |contest| {
        contest.set_n_visual(request.value);
        Ok(None)
    })
    .await
}

/// Wipe every round and return to round 1.
pub async fn reset_contest(
    state: &SharedState,
    request: UserRequest,
) -> Result<MutationAck, ServiceError> {
    validate(&request)?;
    apply(state, &request.user, "reset", |contest| {
        contest.reset();
        Ok(None)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, state::AppState};

    fn user() -> UserRequest {
        UserRequest {
            user: "alice".into(),
        }
    }

    #[tokio::test]
    async fn proposing_returns_queue_index_and_touches_user() {
        let state = AppState::new(AppConfig::default());
        open_question(
            &state,
            OpenQuestionRequest {
                user: "alice".into(),
                round: 1,
                question: 1,
                value: 10,
                text: "Q?".into(),
            },
        )
        .await
        .unwrap();

        let ack = propose_answer(
            &state,
            ProposeAnswerRequest {
                user: "sam".into(),
                question: 1,
                text: "A".into(),
                confidence: 4,
            },
        )
        .await
        .unwrap();

        assert_eq!(ack.queue_index, Some(0));
        assert_eq!(ack.versions[0], 2);
        let names: Vec<_> = state
            .presence()
            .recent(std::time::Duration::from_secs(60))
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["alice".to_string(), "sam".to_string()]);
    }

    #[tokio::test]
    async fn engine_errors_map_to_service_errors() {
        let state = AppState::new(AppConfig::default());
        let err = call_in(
            &state,
            AnswerActionRequest {
                user: "alice".into(),
                queue_index: 3,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        set_speed(&state, user()).await.unwrap();
        open_question(
            &state,
            OpenQuestionRequest {
                user: "alice".into(),
                round: 1,
                question: 18,
                value: 5,
                text: String::new(),
            },
        )
        .await
        .unwrap();
        let err = unset_speed(&state, user()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_the_engine() {
        let state = AppState::new(AppConfig::default());
        let err = new_round(&state, UserRequest { user: String::new() })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert_eq!(state.read(|c| c.current_round()).await, 1);
    }
}
