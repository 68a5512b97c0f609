use std::sync::Arc;

use axum::{extract::Path, Extension, Json};

use crate::error::AppError;
use crate::ids::SessionId;
use crate::lobby::{Lobby, LobbySummary, SessionInfo};

/// GET /api/sessions
pub async fn list_sessions(Extension(lobby): Extension<Arc<Lobby>>) -> Json<LobbySummary> {
    Json(lobby.summary().await)
}

/// GET /api/sessions/{session_id}
pub async fn get_session(
    Extension(lobby): Extension<Arc<Lobby>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionInfo>, AppError> {
    let id: SessionId = session_id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid session id: {session_id}")))?;
    lobby
        .session(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Session not found".to_string()))
}
