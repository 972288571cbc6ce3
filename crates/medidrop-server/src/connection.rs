//! Per-connection handler: create a session, serve frames one at a time,
//! discard the session on disconnect.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use medidrop_ai::{ChatError, ChatSession, TurnKind};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::protocol::{ClientMessage, NoticeLevel, ServerMessage};
use crate::state::ServerState;

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;

/// Handle a single WebSocket connection.
pub async fn handle_connection(
    ws: WebSocketStream<TcpStream>,
    addr: SocketAddr,
    state: Arc<ServerState>,
) {
    let (mut sink, mut stream) = ws.split();

    // 1. Create and register the session.
    let mut session = new_session(&state);
    let active = state.registry.register(session.id(), addr).await;
    tracing::info!(peer = %addr, session = %session.id(), active, "Session created");

    // 2. Send session_ready.
    if send_message(&mut sink, &session_ready(&session)).await.is_err() {
        state.registry.unregister(session.id()).await;
        return;
    }

    // 3. Serve frames sequentially; each is handled to completion first.
    let idle = state.idle_timeout();
    'serve: loop {
        let frame = match tokio::time::timeout(idle, stream.next()).await {
            Ok(frame) => frame,
            Err(_) => {
                tracing::info!(peer = %addr, session = %session.id(), "Idle timeout");
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
        };

        match frame {
            Some(Ok(Message::Text(text))) => {
                let replies = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(msg) => handle_client_message(&mut session, &state, msg).await,
                    Err(e) => {
                        tracing::debug!(peer = %addr, error = %e, "Invalid client frame");
                        vec![ServerMessage::error(format!("invalid message: {e}"))]
                    }
                };
                for reply in &replies {
                    if send_message(&mut sink, reply).await.is_err() {
                        break 'serve;
                    }
                }
            }
            Some(Ok(Message::Ping(data))) => {
                let _ = sink.send(Message::Pong(data)).await;
            }
            Some(Ok(Message::Close(_))) | None => break,
            Some(Err(e)) => {
                tracing::debug!(peer = %addr, error = %e, "WS error");
                break;
            }
            _ => {}
        }
    }

    // 4. Discard.
    let connected_for = state.registry.unregister(session.id()).await;
    tracing::info!(
        peer = %addr,
        session = %session.id(),
        messages = session.visible_messages().len(),
        connected_secs = connected_for.map(|d| d.as_secs()).unwrap_or_default(),
        "Session discarded"
    );
}

/// Apply one client frame to the session and produce the frames to send back.
pub async fn handle_client_message(
    session: &mut ChatSession,
    state: &ServerState,
    msg: ClientMessage,
) -> Vec<ServerMessage> {
    match msg {
        ClientMessage::Send { text } => {
            match session
                .send(state.client.as_ref(), state.sleeper.as_ref(), &text)
                .await
            {
                Ok(outcome) => {
                    let banner = match outcome.kind {
                        TurnKind::Answered => None,
                        TurnKind::RateLimitRecovered { .. } => Some(
                            "Rate limiting (HTTP 429) kept recurring; older messages were dropped.",
                        ),
                        TurnKind::UpstreamFailed { .. } | TurnKind::Unreachable => {
                            Some("The API call failed.")
                        }
                    };
                    let mut replies = vec![ServerMessage::Reply {
                        message: outcome.reply,
                        kind: outcome.kind,
                    }];
                    if let Some(text) = banner {
                        replies.push(ServerMessage::notice(NoticeLevel::Error, text));
                    }
                    if let Some(warning) = outcome.log_warning {
                        replies.push(ServerMessage::notice(NoticeLevel::Warning, warning));
                    }
                    replies
                }
                Err(ChatError::EmptyMessage) => Vec::new(),
                Err(e) => vec![ServerMessage::error(e.to_string())],
            }
        }
        ClientMessage::Reset => {
            session.reset();
            vec![
                ServerMessage::notice(NoticeLevel::Success, "The conversation was reset."),
                history(session),
            ]
        }
        ClientMessage::Export => match session.export_csv() {
            Ok(csv) => vec![ServerMessage::Export {
                file_name: session.export_file_name(),
                csv,
            }],
            Err(e) => {
                tracing::warn!(session = %session.id(), error = %e, "Export failed");
                vec![ServerMessage::notice(
                    NoticeLevel::Warning,
                    format!("Export failed: {e}"),
                )]
            }
        },
        ClientMessage::History => vec![history(session)],
        ClientMessage::Settings(update) => match session.apply_settings(&update) {
            Ok(settings) => vec![ServerMessage::Settings {
                settings: settings.clone(),
            }],
            Err(e) => vec![ServerMessage::error(e.to_string())],
        },
    }
}

fn new_session(state: &ServerState) -> ChatSession {
    ChatSession::from_config(&state.config).with_csv_log(state.csv_log.clone())
}

fn session_ready(session: &ChatSession) -> ServerMessage {
    ServerMessage::SessionReady {
        session_id: session.id().to_string(),
        started_at: session.started_at(),
        settings: session.settings().clone(),
    }
}

fn history(session: &ChatSession) -> ServerMessage {
    ServerMessage::History {
        started_at: session.started_at(),
        messages: session.visible_messages().to_vec(),
    }
}

/// Send a ServerMessage as a JSON text frame.
async fn send_message(
    sink: &mut WsSink,
    message: &ServerMessage,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serialize server message");
            return Ok(());
        }
    };
    sink.send(Message::Text(json.into())).await
}
