//! Community message endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use super::ApiResult;
use crate::models::{CommunityMessage, CreateMessageRequest, ToggleLikeRequest};
use crate::AppState;

/// GET /api/community/messages - List all messages, newest first.
pub async fn list_messages(State(state): State<AppState>) -> ApiResult<Vec<CommunityMessage>> {
    Ok(Json(state.messages.list().await?))
}

/// POST /api/community/messages - Create a message.
pub async fn create_message(
    State(state): State<AppState>,
    payload: Result<Json<CreateMessageRequest>, JsonRejection>,
) -> ApiResult<CommunityMessage> {
    let Json(request) = payload?;
    Ok(Json(state.messages.create(&request).await?))
}

/// POST /api/community/messages/:id/like - Toggle a user's like.
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ToggleLikeRequest>, JsonRejection>,
) -> ApiResult<CommunityMessage> {
    let Json(request) = payload?;
    Ok(Json(state.messages.toggle_like(&id, &request.user_id).await?))
}
