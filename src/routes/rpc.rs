use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::{
        contest::{ContestSnapshot, SyncResponse, VersionsResponse},
        rpc::{
            AgreementRequest, AnnouncedRequest, AnswerActionRequest, CountRequest,
            EditQuestionRequest, MarkCorrectRequest, MutationAck, OpenQuestionRequest,
            ProposeAnswerRequest, QuestionRequest, RemapQuestionRequest,
            RoundQuestionRequest, RoundTextRequest, SyncRequest, UserRequest,
        },
    },
    error::AppError,
    services::{contest_service, sync_service},
    state::SharedState,
};

/// Contest reads, synchronization and one endpoint per contest mutation.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rpc/contest", get(contest))
        .route("/rpc/versions", get(versions))
        .route("/rpc/sync", post(sync))
        .route("/rpc/open_question", post(open_question))
        .route("/rpc/close_question", post(close_question))
        .route("/rpc/edit_question", post(edit_question))
        .route("/rpc/reopen_question", post(reopen_question))
        .route("/rpc/reset_question", post(reset_question))
        .route("/rpc/remap_question", post(remap_question))
        .route("/rpc/propose_answer", post(propose_answer))
        .route("/rpc/call_in", post(call_in))
        .route("/rpc/mark_correct", post(mark_correct))
        .route("/rpc/mark_incorrect", post(mark_incorrect))
        .route("/rpc/mark_partial", post(mark_partial))
        .route("/rpc/mark_duplicate", post(mark_duplicate))
        .route("/rpc/mark_uncalled", post(mark_uncalled))
        .route("/rpc/set_agreement", post(set_agreement))
        .route("/rpc/new_round", post(new_round))
        .route("/rpc/set_speed", post(set_speed))
        .route("/rpc/unset_speed", post(unset_speed))
        .route("/rpc/set_announced", post(set_announced))
        .route("/rpc/set_discrepancy_text", post(set_discrepancy_text))
        .route("/rpc/set_show_name", post(set_show_name))
        .route("/rpc/set_show_host", post(set_show_host))
        .route("/rpc/set_n_teams", post(set_n_teams))
        .route("/rpc/set_n_visual", post(set_n_visual))
        .route("/rpc/reset", post(reset))
}

/// Full contest snapshot.
#[utoipa::path(
    get,
    path = "/rpc/contest",
    tag = "contest",
    responses((status = 200, description = "Current contest", body = ContestSnapshot))
)]
pub async fn contest(State(state): State<SharedState>) -> Json<ContestSnapshot> {
    Json(contest_service::contest_snapshot(&state).await)
}

#[utoipa::path(
    get,
    path = "/rpc/versions",
    tag = "contest",
    responses((status = 200, description = "Per-round versions", body = VersionsResponse))
)]
pub async fn versions(State(state): State<SharedState>) -> Json<VersionsResponse> {
    Json(contest_service::versions(&state).await)
}

/// Rounds changed since the versions the caller already holds.
#[utoipa::path(
    post,
    path = "/rpc/sync",
    tag = "contest",
    request_body = SyncRequest,
    responses(
        (status = 200, description = "Changed rounds", body = SyncResponse),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn sync(
    State(state): State<SharedState>,
    Json(payload): Json<SyncRequest>,
) -> Result<Json<SyncResponse>, AppError> {
    let response = sync_service::sync(&state, payload).await?;
    Ok(Json(response))
}

/// Open a question of the current round.
#[utoipa::path(
    post,
    path = "/rpc/open_question",
    tag = "contest",
    request_body = OpenQuestionRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn open_question(
    State(state): State<SharedState>,
    Json(payload): Json<OpenQuestionRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::open_question(&state, payload).await?;
    Ok(Json(ack))
}

/// Close an open question of any round.
#[utoipa::path(
    post,
    path = "/rpc/close_question",
    tag = "contest",
    request_body = RoundQuestionRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn close_question(
    State(state): State<SharedState>,
    Json(payload): Json<RoundQuestionRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::close_question(&state, payload).await?;
    Ok(Json(ack))
}

/// Overwrite the stored fields of an opened question.
#[utoipa::path(
    post,
    path = "/rpc/edit_question",
    tag = "contest",
    request_body = EditQuestionRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn edit_question(
    State(state): State<SharedState>,
    Json(payload): Json<EditQuestionRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::edit_question(&state, payload).await?;
    Ok(Json(ack))
}

/// Reopen a closed question that was not answered correctly.
#[utoipa::path(
    post,
    path = "/rpc/reopen_question",
    tag = "contest",
    request_body = QuestionRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn reopen_question(
    State(state): State<SharedState>,
    Json(payload): Json<QuestionRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::reopen_question(&state, payload).await?;
    Ok(Json(ack))
}

/// Return a question of the current round to its never-opened state.
#[utoipa::path(
    post,
    path = "/rpc/reset_question",
    tag = "contest",
    request_body = QuestionRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn reset_question(
    State(state): State<SharedState>,
    Json(payload): Json<QuestionRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::reset_question(&state, payload).await?;
    Ok(Json(ack))
}

/// Move a question and its answers onto an unopened number.
#[utoipa::path(
    post,
    path = "/rpc/remap_question",
    tag = "contest",
    request_body = RemapQuestionRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn remap_question(
    State(state): State<SharedState>,
    Json(payload): Json<RemapQuestionRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::remap_question(&state, payload).await?;
    Ok(Json(ack))
}

/// Queue a proposed answer for an opened question.
#[utoipa::path(
    post,
    path = "/rpc/propose_answer",
    tag = "contest",
    request_body = ProposeAnswerRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn propose_answer(
    State(state): State<SharedState>,
    Json(payload): Json<ProposeAnswerRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::propose_answer(&state, payload).await?;
    Ok(Json(ack))
}

/// Mark a queued answer as being called in.
#[utoipa::path(
    post,
    path = "/rpc/call_in",
    tag = "contest",
    request_body = AnswerActionRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn call_in(
    State(state): State<SharedState>,
    Json(payload): Json<AnswerActionRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::call_in(&state, payload).await?;
    Ok(Json(ack))
}

/// Accept a queued answer and credit its question.
#[utoipa::path(
    post,
    path = "/rpc/mark_correct",
    tag = "contest",
    request_body = MarkCorrectRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn mark_correct(
    State(state): State<SharedState>,
    Json(payload): Json<MarkCorrectRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::mark_correct(&state, payload).await?;
    Ok(Json(ack))
}

#[utoipa::path(
    post,
    path = "/rpc/mark_incorrect",
    tag = "contest",
    request_body = AnswerActionRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn mark_incorrect(
    State(state): State<SharedState>,
    Json(payload): Json<AnswerActionRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::mark_incorrect(&state, payload).await?;
    Ok(Json(ack))
}

#[utoipa::path(
    post,
    path = "/rpc/mark_partial",
    tag = "contest",
    request_body = AnswerActionRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn mark_partial(
    State(state): State<SharedState>,
    Json(payload): Json<AnswerActionRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::mark_partial(&state, payload).await?;
    Ok(Json(ack))
}

#[utoipa::path(
    post,
    path = "/rpc/mark_duplicate",
    tag = "contest",
    request_body = AnswerActionRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn mark_duplicate(
    State(state): State<SharedState>,
    Json(payload): Json<AnswerActionRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::mark_duplicate(&state, payload).await?;
    Ok(Json(ack))
}

/// Undo any status of a queued answer.
#[utoipa::path(
    post,
    path = "/rpc/mark_uncalled",
    tag = "contest",
    request_body = AnswerActionRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn mark_uncalled(
    State(state): State<SharedState>,
    Json(payload): Json<AnswerActionRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::mark_uncalled(&state, payload).await?;
    Ok(Json(ack))
}

/// Record a user's opinion of a queued answer.
#[utoipa::path(
    post,
    path = "/rpc/set_agreement",
    tag = "contest",
    request_body = AgreementRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn set_agreement(
    State(state): State<SharedState>,
    Json(payload): Json<AgreementRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::set_agreement(&state, payload).await?;
    Ok(Json(ack))
}

/// Advance to the next round.
#[utoipa::path(
    post,
    path = "/rpc/new_round",
    tag = "contest",
    request_body = UserRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn new_round(
    State(state): State<SharedState>,
    Json(payload): Json<UserRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::new_round(&state, payload).await?;
    Ok(Json(ack))
}

/// Turn the current round into a speed round.
#[utoipa::path(
    post,
    path = "/rpc/set_speed",
    tag = "contest",
    request_body = UserRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn set_speed(
    State(state): State<SharedState>,
    Json(payload): Json<UserRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::set_speed(&state, payload).await?;
    Ok(Json(ack))
}

#[utoipa::path(
    post,
    path = "/rpc/unset_speed",
    tag = "contest",
    request_body = UserRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn unset_speed(
    State(state): State<SharedState>,
    Json(payload): Json<UserRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::unset_speed(&state, payload).await?;
    Ok(Json(ack))
}

/// Record the score and place announced for a round.
#[utoipa::path(
    post,
    path = "/rpc/set_announced",
    tag = "contest",
    request_body = AnnouncedRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn set_announced(
    State(state): State<SharedState>,
    Json(payload): Json<AnnouncedRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::set_announced(&state, payload).await?;
    Ok(Json(ack))
}

#[utoipa::path(
    post,
    path = "/rpc/set_discrepancy_text",
    tag = "contest",
    request_body = RoundTextRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn set_discrepancy_text(
    State(state): State<SharedState>,
    Json(payload): Json<RoundTextRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::set_discrepancy_text(&state, payload).await?;
    Ok(Json(ack))
}

#[utoipa::path(
    post,
    path = "/rpc/set_show_name",
    tag = "contest",
    request_body = RoundTextRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn set_show_name(
    State(state): State<SharedState>,
    Json(payload): Json<RoundTextRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::set_show_name(&state, payload).await?;
    Ok(Json(ack))
}

#[utoipa::path(
    post,
    path = "/rpc/set_show_host",
    tag = "contest",
    request_body = RoundTextRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn set_show_host(
    State(state): State<SharedState>,
    Json(payload): Json<RoundTextRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::set_show_host(&state, payload).await?;
    Ok(Json(ack))
}

#[utoipa::path(
    post,
    path = "/rpc/set_n_teams",
    tag = "contest",
    request_body = CountRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn set_n_teams(
    State(state): State<SharedState>,
    Json(payload): Json<CountRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::set_n_teams(&state, payload).await?;
    Ok(Json(ack))
}

#[utoipa::path(
    post,
    path = "/rpc/set_n_visual",
    tag = "contest",
    request_body = CountRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn set_n_visual(
    State(state): State<SharedState>,
    Json(payload): Json<CountRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::set_n_visual(&state, payload).await?;
    Ok(Json(ack))
}

/// Wipe every round and return to round 1.
#[utoipa::path(
    post,
    path = "/rpc/reset",
    tag = "contest",
    request_body = UserRequest,
    responses(
        (status = 200, description = "Mutation accepted", body = MutationAck),
        (status = 400, description = "Out-of-range round, question or queue index"),
        (status = 409, description = "Rejected by the current contest state")
    )
)]
pub async fn reset(
    State(state): State<SharedState>,
    Json(payload): Json<UserRequest>,
) -> Result<Json<MutationAck>, AppError> {
    let ack = contest_service::reset_contest(&state, payload).await?;
    Ok(Json(ack))
}
