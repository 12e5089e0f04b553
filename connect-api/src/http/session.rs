//! Join, waiting room and departure endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use connect_core::models::ParticipantId;
use serde::{Deserialize, Serialize};

use crate::http::{
    error::AppResult,
    views::{parse_room_id, Credentials, ParticipantView, RoomView},
    AppState,
};

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct JoinRequest {
    pub display_name: Option<String>,
    /// Opaque authenticated-identity reference; absent for guests
    pub identity_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    pub room: RoomView,
    pub participant_id: String,
    /// The capability secret for this participant. Returned here and never
    /// again.
    pub secret: String,
    pub status: String,
    pub pending: bool,
    pub others: Vec<ParticipantView>,
}

/// POST /api/rooms/{room_id}/join
pub async fn join_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(req): Json<JoinRequest>,
) -> AppResult<Json<JoinResponse>> {
    let outcome = state
        .admission_service
        .join(
            &parse_room_id(&room_id),
            req.display_name.as_deref(),
            req.identity_id,
        )
        .await?;

    Ok(Json(JoinResponse {
        room: RoomView::from(&outcome.room),
        participant_id: outcome.participant.id.as_str().to_string(),
        secret: outcome.participant.secret.clone(),
        status: outcome.participant.status.to_string(),
        pending: outcome.pending,
        others: outcome.others.iter().map(ParticipantView::from).collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct LeaveRequest {
    #[serde(flatten)]
    pub credentials: Credentials,
}

/// POST /api/rooms/{room_id}/leave (idempotent)
pub async fn leave_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(req): Json<LeaveRequest>,
) -> AppResult<StatusCode> {
    state
        .admission_service
        .leave(
            &parse_room_id(&room_id),
            &ParticipantId::from_string(req.credentials.participant_id),
            &req.credentials.secret,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ListWaitingRequest {
    #[serde(flatten)]
    pub credentials: Credentials,
}

#[derive(Debug, Serialize)]
pub struct ListWaitingResponse {
    pub waiting: Vec<ParticipantView>,
}

/// POST /api/rooms/{room_id}/waiting (host only)
///
/// POST rather than GET because the credentials travel in the body.
pub async fn list_waiting(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(req): Json<ListWaitingRequest>,
) -> AppResult<Json<ListWaitingResponse>> {
    let waiting = state
        .admission_service
        .list_waiting(
            &parse_room_id(&room_id),
            &ParticipantId::from_string(req.credentials.participant_id),
            &req.credentials.secret,
        )
        .await?;

    Ok(Json(ListWaitingResponse {
        waiting: waiting.iter().map(ParticipantView::from).collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct AdmissionDecisionRequest {
    #[serde(flatten)]
    pub credentials: Credentials,
}

/// POST /api/rooms/{room_id}/waiting/{participant_id}/approve (host only)
pub async fn approve_participant(
    State(state): State<AppState>,
    Path((room_id, target_id)): Path<(String, String)>,
    Json(req): Json<AdmissionDecisionRequest>,
) -> AppResult<StatusCode> {
    state
        .admission_service
        .approve(
            &parse_room_id(&room_id),
            &ParticipantId::from_string(req.credentials.participant_id),
            &req.credentials.secret,
            &ParticipantId::from_string(target_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/rooms/{room_id}/waiting/{participant_id}/deny (host only)
pub async fn deny_participant(
    State(state): State<AppState>,
    Path((room_id, target_id)): Path<(String, String)>,
    Json(req): Json<AdmissionDecisionRequest>,
) -> AppResult<StatusCode> {
    state
        .admission_service
        .deny(
            &parse_room_id(&room_id),
            &ParticipantId::from_string(req.credentials.participant_id),
            &req.credentials.secret,
            &ParticipantId::from_string(target_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
