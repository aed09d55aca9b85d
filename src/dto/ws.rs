use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dto::{
    contest::{ContestSnapshot, SyncResponse},
    presence::UsersResponse,
    rpc::{
        AgreementRequest, AnnouncedRequest, AnswerActionRequest, CountRequest, EditQuestionRequest,
        MarkCorrectRequest, MutationAck, OpenQuestionRequest, ProposeAnswerRequest,
        QuestionRequest, RemapQuestionRequest, RenameUserRequest, RoundQuestionRequest,
        RoundTextRequest, SetRoleRequest, UserRequest,
    },
};

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
/// Frames accepted on the message channel.
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Name the user behind this connection.
    Identify { user: String },
    /// Full contest; also resets the versions this connection is assumed to hold.
    FetchContest,
    /// Rounds changed since `known_versions`.
    Sync {
        #[serde(default)]
        known_versions: Vec<u64>,
    },
    OpenQuestion(OpenQuestionRequest),
    CloseQuestion(RoundQuestionRequest),
    EditQuestion(EditQuestionRequest),
    ReopenQuestion(QuestionRequest),
    ResetQuestion(QuestionRequest),
    RemapQuestion(RemapQuestionRequest),
    ProposeAnswer(ProposeAnswerRequest),
    CallIn(AnswerActionRequest),
    MarkCorrect(MarkCorrectRequest),
    MarkIncorrect(AnswerActionRequest),
    MarkPartial(AnswerActionRequest),
    MarkDuplicate(AnswerActionRequest),
    MarkUncalled(AnswerActionRequest),
    SetAgreement(AgreementRequest),
    NewRound(UserRequest),
    SetSpeed(UserRequest),
    UnsetSpeed(UserRequest),
    SetAnnounced(AnnouncedRequest),
    SetDiscrepancyText(RoundTextRequest),
    SetShowName(RoundTextRequest),
    SetShowHost(RoundTextRequest),
    SetNTeams(CountRequest),
    SetNVisual(CountRequest),
    Reset(UserRequest),
    SetRole(SetRoleRequest),
    RenameUser(RenameUserRequest),
    ListUsers {
        #[serde(default)]
        window_secs: Option<u64>,
    },
}

impl ClientMessage {
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Wire name of the command, echoed back in replies.
    pub fn command(&self) -> &'static str {
        match self {
            Self::Identify { .. } => "identify",
            Self::FetchContest => "fetch_contest",
            Self::Sync { .. } => "sync",
            Self::OpenQuestion(_) => "open_question",
            Self::CloseQuestion(_) => "close_question",
            Self::EditQuestion(_) => "edit_question",
            Self::ReopenQuestion(_) => "reopen_question",
            Self::ResetQuestion(_) => "reset_question",
            Self::RemapQuestion(_) => "remap_question",
            Self::ProposeAnswer(_) => "propose_answer",
            Self::CallIn(_) => "call_in",
            Self::MarkCorrect(_) => "mark_correct",
            Self::MarkIncorrect(_) => "mark_incorrect",
            Self::MarkPartial(_) => "mark_partial",
            Self::MarkDuplicate(_) => "mark_duplicate",
            Self::MarkUncalled(_) => "mark_uncalled",
            Self::SetAgreement(_) => "set_agreement",
            Self::NewRound(_) => "new_round",
            Self::SetSpeed(_) => "set_speed",
            Self::UnsetSpeed(_) => "unset_speed",
            Self::SetAnnounced(_) => "set_announced",
            Self::SetDiscrepancyText(_) => "set_discrepancy_text",
            Self::SetShowName(_) => "set_show_name",
            Self::SetShowHost(_) => "set_show_host",
            Self::SetNTeams(_) => "set_n_teams",
            Self::SetNVisual(_) => "set_n_visual",
            Self::Reset(_) => "reset",
            Self::SetRole(_) => "set_role",
            Self::RenameUser(_) => "rename_user",
            Self::ListUsers { .. } => "list_users",
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
/// Frames pushed to message-channel clients.
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Contest { contest: ContestSnapshot },
    /// Rounds changed since the versions this connection last received.
    UpdateRounds(SyncResponse),
    /// A mutation was accepted.
    Ack { command: String, ack: MutationAck },
    /// A command without a contest effect was accepted.
    Done { command: String },
    Users(UsersResponse),
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        command: Option<String>,
        message: String,
    },
}
