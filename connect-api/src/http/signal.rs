//! Signal relay endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use connect_core::models::{ParticipantId, Signal};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::http::{
    error::AppResult,
    views::{parse_room_id, Credentials},
    AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSignalRequest {
    #[serde(flatten)]
    pub credentials: Credentials,
    /// Recipient participant; absent means broadcast
    pub to: Option<String>,
    pub kind: String,
    #[serde(default)]
    pub payload: JsonValue,
}

#[derive(Debug, Serialize)]
pub struct PostSignalResponse {
    pub seq: i64,
}

/// POST /api/rooms/{room_id}/signals
pub async fn post_signal(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(req): Json<PostSignalRequest>,
) -> AppResult<Json<PostSignalResponse>> {
    let to = req.to.map(ParticipantId::from_string);

    let seq = state
        .relay_service
        .post_signal(
            &parse_room_id(&room_id),
            &ParticipantId::from_string(req.credentials.participant_id),
            &req.credentials.secret,
            to.as_ref(),
            &req.kind,
            req.payload,
        )
        .await?;

    Ok(Json(PostSignalResponse { seq }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollSignalsRequest {
    #[serde(flatten)]
    pub credentials: Credentials,
    #[serde(default)]
    pub after_seq: i64,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalView {
    pub seq: i64,
    pub from_participant_id: String,
    pub to_participant_id: Option<String>,
    pub kind: String,
    pub payload: JsonValue,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Signal> for SignalView {
    fn from(s: Signal) -> Self {
        Self {
            seq: s.seq,
            from_participant_id: s.from_participant_id.as_str().to_string(),
            to_participant_id: s.to_participant_id.map(|id| id.as_str().to_string()),
            kind: s.kind,
            payload: s.payload,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollSignalsResponse {
    pub signals: Vec<SignalView>,
    /// Cursor to pass as `afterSeq` on the next poll
    pub next_after_seq: i64,
}

/// POST /api/rooms/{room_id}/signals/poll
pub async fn poll_signals(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(req): Json<PollSignalsRequest>,
) -> AppResult<Json<PollSignalsResponse>> {
    let batch = state
        .relay_service
        .poll_signals(
            &parse_room_id(&room_id),
            &ParticipantId::from_string(req.credentials.participant_id),
            &req.credentials.secret,
            req.after_seq,
            req.limit,
        )
        .await?;

    Ok(Json(PollSignalsResponse {
        next_after_seq: batch.next_after_seq,
        signals: batch.signals.into_iter().map(SignalView::from).collect(),
    }))
}
