use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use bingoals_core::types::DbId;
use futures::{SinkExt, StreamExt};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::ws::hub::BoardHub;

/// GET /api/v1/boards/{id}/ws
///
/// Upgrade to a WebSocket subscribed to the board's room. The caller must
/// be able to see the board; otherwise the upgrade is refused with 404.
pub async fn board_socket(
    auth: AuthUser,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(board_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.engine.board_for(auth.user_id, board_id).await?;
    let hub = Arc::clone(&state.hub);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, hub, board_id, auth.user_id)))
}

/// Drive one room connection until either side closes it.
///
/// Outbound messages flow from the hub channel through a spawned sender
/// task. Inbound frames are only read to notice closure.
async fn handle_socket(socket: WebSocket, hub: Arc<BoardHub>, board_id: DbId, user_id: DbId) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let mut rx = hub.join(board_id, conn_id.clone(), user_id).await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() || closing {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    hub.leave(board_id, &conn_id).await;
    send_task.abort();
}
