use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Trivia Hub Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::websocket::ws_handler,
        crate::routes::rpc::contest,
        crate::routes::rpc::versions,
        crate::routes::rpc::sync,
        crate::routes::rpc::open_question,
        crate::routes::rpc::close_question,
        crate::routes::rpc::edit_question,
        crate::routes::rpc::reopen_question,
        crate::routes::rpc::reset_question,
        crate::routes::rpc::remap_question,
        crate::routes::rpc::propose_answer,
        crate::routes::rpc::call_in,
        crate::routes::rpc::mark_correct,
        crate::routes::rpc::mark_incorrect,
        crate::routes::rpc::mark_partial,
        crate::routes::rpc::mark_duplicate,
        crate::routes::rpc::mark_uncalled,
        crate::routes::rpc::set_agreement,
        crate::routes::rpc::new_round,
        crate::routes::rpc::set_speed,
        crate::routes::rpc::unset_speed,
        crate::routes::rpc::set_announced,
        crate::routes::rpc::set_discrepancy_text,
        crate::routes::rpc::set_show_name,
        crate::routes::rpc::set_show_host,
        crate::routes::rpc::set_n_teams,
        crate::routes::rpc::set_n_visual,
        crate::routes::rpc::reset,
        crate::routes::users::list_users,
        crate::routes::users::set_role,
        crate::routes::users::rename_user,
        crate::routes::saves::list_saves,
        crate::routes::saves::save_now,
        crate::routes::saves::load_save,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::contest::HeaderSnapshot,
            crate::dto::contest::QuestionSnapshot,
            crate::dto::contest::AgreementVote,
            crate::dto::contest::AnswerSnapshot,
            crate::dto::contest::StandingsEntrySnapshot,
            crate::dto::contest::RoundSnapshot,
            crate::dto::contest::ContestSnapshot,
            crate::dto::contest::VersionsResponse,
            crate::dto::contest::SyncResponse,
            crate::dto::rpc::OpenQuestionRequest,
            crate::dto::rpc::RoundQuestionRequest,
            crate::dto::rpc::QuestionRequest,
            crate::dto::rpc::EditQuestionRequest,
            crate::dto::rpc::RemapQuestionRequest,
            crate::dto::rpc::ProposeAnswerRequest,
            crate::dto::rpc::AnswerActionRequest,
            crate::dto::rpc::MarkCorrectRequest,
            crate::dto::rpc::AgreementRequest,
            crate::dto::rpc::RoundTextRequest,
            crate::dto::rpc::AnnouncedRequest,
            crate::dto::rpc::CountRequest,
            crate::dto::rpc::UserRequest,
            crate::dto::rpc::SetRoleRequest,
            crate::dto::rpc::RenameUserRequest,
            crate::dto::rpc::SyncRequest,
            crate::dto::rpc::MutationAck,
            crate::dto::presence::UserSummary,
            crate::dto::presence::UsersResponse,
            crate::dto::saves::SaveSummary,
            crate::dto::saves::SaveListResponse,
            crate::dto::saves::SaveResponse,
            crate::dto::saves::LoadSaveRequest,
            crate::dto::ws::ClientMessage,
            crate::dto::ws::ServerMessage,
            crate::state::answer_queue::AnswerStatus,
            crate::state::answer_queue::Agreement,
            crate::state::presence::Role,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "contest", description = "Contest reads, synchronization and mutations"),
        (name = "presence", description = "Connected users and their roles"),
        (name = "saves", description = "Contest snapshots"),
        (name = "sync", description = "WebSocket message channel with pushed round updates"),
    )
)]
pub struct ApiDoc;
