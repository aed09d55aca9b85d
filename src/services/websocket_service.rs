use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{
    sync::{broadcast::error::RecvError, mpsc},
    task::JoinHandle,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::{
        contest::ContestSnapshot,
        presence::UsersQuery,
        ws::{ClientMessage, ServerMessage},
    },
    error::ServiceError,
    services::{contest_service, presence_service, sync_service},
    state::SharedState,
};

/// The writer side of a connection is gone.
#[derive(Debug, Error)]
#[error("connection closed")]
struct ConnectionClosed;

/// What one connection believes the contest looks like.
#[derive(Debug, Default)]
struct Session {
    user: Option<String>,
    header_version: Option<u64>,
    known_versions: Vec<u64>,
}

/// Handle the full lifecycle of one message-channel connection.
///
/// Inbound commands and change notifications are served from one loop, so the
/// versions this connection holds are only ever updated in order.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let id = state.register_client();
    info!(%id, "client connected");

    let mut changes = state.subscribe_changes();
    let mut session = Session::default();

    loop {
        tokio::select! {
            inbound = receiver.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    if handle_text(&state, &mut session, &outbound_tx, &text).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Ping(payload))) => {
                    let _ = outbound_tx.send(Message::Pong(payload));
                }
                Some(Ok(Message::Close(frame))) => {
                    let _ = outbound_tx.send(Message::Close(frame));
                    break;
                }
                Some(Ok(Message::Binary(_) | Message::Pong(_))) => {}
                Some(Err(err)) => {
                    warn!(%id, error = %err, "websocket error");
                    break;
                }
                None => break,
            },
            change = changes.recv() => match change {
                Ok(_) | Err(RecvError::Lagged(_)) => {
                    if push_updates(&state, &mut session, &outbound_tx).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    state.unregister_client(&id);
    info!(%id, user = ?session.user, "client disconnected");

    finalize(writer_task, outbound_tx).await;
}

async fn handle_text(
    state: &SharedState,
    session: &mut Session,
    tx: &mpsc::UnboundedSender<Message>,
    text: &str,
) -> Result<(), ConnectionClosed> {
    let message = match ClientMessage::from_json_str(text) {
        Ok(message) => message,
        Err(err) => {
            warn!(error = %err, "failed to parse client message");
            return send_message_to_websocket(
                tx,
                &ServerMessage::Error {
                    command: None,
                    message: format!("malformed message: {err}"),
                },
            );
        }
    };

    let command = message.command();
    debug!(command, user = ?session.user, "received client message");
    let reply = match dispatch(state, session, message).await {
        Ok(reply) => reply,
        Err(err) => ServerMessage::Error {
            command: Some(command.to_string()),
            message: err.to_string(),
        },
    };
    send_message_to_websocket(tx, &reply)
}

/// Ship every round this connection has not seen yet and remember the new versions.
async fn push_updates(
    state: &SharedState,
    session: &mut Session,
    tx: &mpsc::UnboundedSender<Message>,
) -> Result<(), ConnectionClosed> {
    let update = sync_service::diff_since(state, &session.known_versions).await;
    let header_changed = session.header_version != Some(update.header.version);
    if update.rounds.is_empty() && !header_changed {
        return Ok(());
    }
    session.header_version = Some(update.header.version);
    session.known_versions = update.versions.clone();
    send_message_to_websocket(tx, &ServerMessage::UpdateRounds(update))
}

async fn dispatch(
    state: &SharedState,
    session: &mut Session,
    message: ClientMessage,
) -> Result<ServerMessage, ServiceError> {
    let command = message.command().to_string();
    let ack = match message {
        ClientMessage::Identify { user } => {
            let user = user.trim().to_string();
            if user.is_empty() {
                return Err(ServiceError::InvalidInput("user name must not be blank".into()));
            }
            state.presence().touch(&user);
            info!(user = %user, "client identified");
            session.user = Some(user);
            return Ok(ServerMessage::Done { command });
        }
        ClientMessage::FetchContest => {
            let contest = state.read(|contest| ContestSnapshot::from(contest)).await;
            session.header_version = Some(contest.header.version);
            session.known_versions = contest.rounds.iter().map(|round| round.version).collect();
            return Ok(ServerMessage::Contest { contest });
        }
        ClientMessage::Sync { known_versions } => {
            let update = sync_service::diff_since(state, &known_versions).await;
            session.header_version = Some(update.header.version);
            session.known_versions = update.versions.clone();
            return Ok(ServerMessage::UpdateRounds(update));
        }
        ClientMessage::SetRole(request) => {
            presence_service::set_role(state, request)?;
            return Ok(ServerMessage::Done { command });
        }
        ClientMessage::RenameUser(request) => {
            let new_name = request.new_name.clone();
            let renamed_self = session.user.as_deref() == Some(request.old_name.as_str());
            presence_service::rename_user(state, request)?;
            if renamed_self {
                session.user = Some(new_name);
            }
            return Ok(ServerMessage::Done { command });
        }
        ClientMessage::ListUsers { window_secs } => {
            if let Some(user) = &session.user {
                state.presence().touch(user);
            }
            return Ok(ServerMessage::Users(presence_service::list_users(
                state,
                UsersQuery { window_secs },
            )));
        }
        ClientMessage::OpenQuestion(request) => contest_service::open_question(state, request).await,
        ClientMessage::CloseQuestion(request) => {
            contest_service::close_question(state, request).await
        }
        ClientMessage::EditQuestion(request) => contest_service::edit_question(state, request).await,
        ClientMessage::ReopenQuestion(request) => {
            contest_service::reopen_question(state, request).await
        }
        ClientMessage::ResetQuestion(request) => {
            contest_service::reset_question(state, request).await
        }
        ClientMessage::RemapQuestion(request) => {
            contest_service::remap_question(state, request).await
        }
        ClientMessage::ProposeAnswer(request) => {
            contest_service::propose_answer(state, request).await
        }
        ClientMessage::CallIn(request) => contest_service::call_in(state, request).await,
        ClientMessage::MarkCorrect(request) => contest_service::mark_correct(state, request).await,
        ClientMessage::MarkIncorrect(request) => {
            contest_service::mark_incorrect(state, request).await
        }
        ClientMessage::MarkPartial(request) => contest_service::mark_partial(state, request).await,
        ClientMessage::MarkDuplicate(request) => {
            contest_service::mark_duplicate(state, request).await
        }
        ClientMessage::MarkUncalled(request) => {
            contest_service::mark_uncalled(state, request).await
        }
        ClientMessage::SetAgreement(request) => contest_service::set_agreement(state, request).await,
        ClientMessage::NewRound(request) => contest_service::new_round(state, request).await,
        ClientMessage::SetSpeed(request) => contest_service::set_speed(state, request).await,
        ClientMessage::UnsetSpeed(request) => contest_service::unset_speed(state, request).await,
        ClientMessage::SetAnnounced(request) => contest_service::set_announced(state, request).await,
        ClientMessage::SetDiscrepancyText(request) => {
            contest_service::set_discrepancy_text(state, request).await
        }
        ClientMessage::SetShowName(request) => contest_service::set_show_name(state, request).await,
        ClientMessage::SetShowHost(request) => contest_service::set_show_host(state, request).await,
        ClientMessage::SetNTeams(request) => contest_service::set_n_teams(state, request).await,
        ClientMessage::SetNVisual(request) => contest_service::set_n_visual(state, request).await,
        ClientMessage::Reset(request) => contest_service::reset_contest(state, request).await,
    }?;
    Ok(ServerMessage::Ack { command, ack })
}

/// Serialize a payload and push it onto the connection's writer channel.
///
/// A serialization failure is logged and swallowed; only a closed writer is an error.
fn send_message_to_websocket<T>(
    tx: &mpsc::UnboundedSender<Message>,
    value: &T,
) -> Result<(), ConnectionClosed>
where
    T: ?Sized + serde::Serialize + std::fmt::Debug,
{
    let payload = match serde_json::to_string(value) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "failed to serialize message `{value:?}`");
            return Ok(());
        }
    };

    tx.send(Message::Text(payload.into()))
        .map_err(|_| ConnectionClosed)
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dto::rpc::{OpenQuestionRequest, UserRequest},
        state::AppState,
    };

    fn open(question: usize) -> ClientMessage {
        ClientMessage::OpenQuestion(OpenQuestionRequest {
            user: "alice".into(),
            round: 1,
            question,
            value: 10,
            text: String::new(),
        })
    }

    fn next_frame(rx: &mut mpsc::UnboundedReceiver<Message>) -> serde_json::Value {
        match rx.try_recv().unwrap() {
            Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("unexpected frame {other:?}"),
        }
    }

    #[tokio::test]
    async fn mutations_are_acknowledged_with_versions() {
        let state = AppState::new(AppConfig::default());
        let mut session = Session::default();

        let reply = dispatch(&state, &mut session, open(1)).await.unwrap();
        let ServerMessage::Ack { command, ack } = reply else {
            panic!("expected ack");
        };
        assert_eq!(command, "open_question");
        assert_eq!(ack.versions[0], 1);

        let err = dispatch(
            &state,
            &mut session,
            ClientMessage::UnsetSpeed(UserRequest { user: "alice".into() }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn updates_only_ship_unseen_rounds() {
        let state = AppState::new(AppConfig::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = Session::default();

        dispatch(&state, &mut session, ClientMessage::FetchContest)
            .await
            .unwrap();
        push_updates(&state, &mut session, &tx).await.unwrap();
        assert!(rx.try_recv().is_err());

        dispatch(&state, &mut session, open(2)).await.unwrap();
        push_updates(&state, &mut session, &tx).await.unwrap();
        let frame = next_frame(&mut rx);
        assert_eq!(frame["type"], "update_rounds");
        assert_eq!(frame["rounds"].as_array().unwrap().len(), 1);
        assert_eq!(frame["rounds"][0]["number"], 1);
        assert_eq!(session.known_versions[0], 1);

        push_updates(&state, &mut session, &tx).await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn malformed_frames_get_an_error_reply() {
        let state = AppState::new(AppConfig::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = Session::default();

        handle_text(&state, &mut session, &tx, "{not json").await.unwrap();
        let frame = next_frame(&mut rx);
        assert_eq!(frame["type"], "error");

        handle_text(&state, &mut session, &tx, r#"{"command":"identify","user":"kim"}"#)
            .await
            .unwrap();
        assert_eq!(next_frame(&mut rx)["type"], "done");
        assert_eq!(session.user.as_deref(), Some("kim"));
    }
}
