//! Room lifecycle endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use connect_core::models::{ParticipantId, RoomPolicyUpdate};
use serde::{Deserialize, Serialize};

use crate::http::{
    error::AppResult,
    views::{parse_room_id, Credentials, RoomCheckView, RoomView},
    AppState,
};

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateRoomRequest {
    pub title: Option<String>,
    pub created_by: Option<String>,
    pub waiting_room_enabled: Option<bool>,
    pub locked: Option<bool>,
    pub mute_on_join: Option<bool>,
    pub camera_off_on_join: Option<bool>,
    pub allow_screen_share: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room: RoomView,
    pub join_url: String,
}

/// POST /api/rooms
pub async fn create_room(
    State(state): State<AppState>,
    Json(req): Json<CreateRoomRequest>,
) -> AppResult<(StatusCode, Json<CreateRoomResponse>)> {
    let policy = RoomPolicyUpdate {
        waiting_room_enabled: req.waiting_room_enabled,
        locked: req.locked,
        mute_on_join: req.mute_on_join,
        camera_off_on_join: req.camera_off_on_join,
        allow_screen_share: req.allow_screen_share,
    };

    let created = state
        .room_service
        .create_room(req.title.as_deref(), req.created_by, policy)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateRoomResponse {
            room: RoomView::from(&created.room),
            join_url: created.join_url,
        }),
    ))
}

/// GET /api/rooms/{room_id}
///
/// Public pre-join lookup; no credentials required, so the response is the
/// trimmed view without participant identifiers.
pub async fn check_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> AppResult<Json<RoomCheckView>> {
    let room = state.room_service.get_room(&parse_room_id(&room_id)).await?;
    Ok(Json(RoomCheckView::from(&room)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[serde(flatten)]
    pub credentials: Credentials,
    pub waiting_room_enabled: Option<bool>,
    pub locked: Option<bool>,
    pub mute_on_join: Option<bool>,
    pub camera_off_on_join: Option<bool>,
    pub allow_screen_share: Option<bool>,
}

/// POST /api/rooms/{room_id}/settings (host only)
pub async fn update_settings(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(req): Json<UpdateSettingsRequest>,
) -> AppResult<Json<RoomView>> {
    let update = RoomPolicyUpdate {
        waiting_room_enabled: req.waiting_room_enabled,
        locked: req.locked,
        mute_on_join: req.mute_on_join,
        camera_off_on_join: req.camera_off_on_join,
        allow_screen_share: req.allow_screen_share,
    };

    let room = state
        .room_service
        .update_settings(
            &parse_room_id(&room_id),
            &ParticipantId::from_string(req.credentials.participant_id),
            &req.credentials.secret,
            update,
        )
        .await?;

    Ok(Json(RoomView::from(&room)))
}

#[derive(Debug, Deserialize)]
pub struct EndRoomRequest {
    #[serde(flatten)]
    pub credentials: Credentials,
}

/// POST /api/rooms/{room_id}/end (host only, idempotent)
pub async fn end_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(req): Json<EndRoomRequest>,
) -> AppResult<StatusCode> {
    state
        .room_service
        .end_room(
            &parse_room_id(&room_id),
            &ParticipantId::from_string(req.credentials.participant_id),
            &req.credentials.secret,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
