use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::id::{ParticipantId, RoomId};

/// One signaling message in a room's append-only log.
///
/// `seq` is assigned by the store and is the sole ordering guarantee.
/// `to_participant_id = None` means broadcast to the whole room. The payload
/// is opaque to this core; clients key on `kind` (offer/answer/ice/...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub seq: i64,
    pub room_id: RoomId,
    pub from_participant_id: ParticipantId,
    pub to_participant_id: Option<ParticipantId>,
    pub kind: String,
    pub payload: JsonValue,
    pub created_at: DateTime<Utc>,
}

/// A signal not yet assigned a sequence number
#[derive(Debug, Clone)]
pub struct NewSignal {
    pub room_id: RoomId,
    pub from_participant_id: ParticipantId,
    pub to_participant_id: Option<ParticipantId>,
    pub kind: String,
    pub payload: JsonValue,
}

impl NewSignal {
    pub fn broadcast(
        room_id: RoomId,
        from: ParticipantId,
        kind: impl Into<String>,
        payload: JsonValue,
    ) -> Self {
        Self {
            room_id,
            from_participant_id: from,
            to_participant_id: None,
            kind: kind.into(),
            payload,
        }
    }

    pub fn addressed(
        room_id: RoomId,
        from: ParticipantId,
        to: ParticipantId,
        kind: impl Into<String>,
        payload: JsonValue,
    ) -> Self {
        Self {
            room_id,
            from_participant_id: from,
            to_participant_id: Some(to),
            kind: kind.into(),
            payload,
        }
    }
}

/// Advance a poll cursor: the seq of the last returned signal, or the
/// caller's own cursor unchanged when nothing new arrived.
#[must_use]
pub fn next_after_seq(after_seq: i64, signals: &[Signal]) -> i64 {
    signals.last().map_or(after_seq, |s| s.seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(seq: i64) -> Signal {
        Signal {
            seq,
            room_id: RoomId::from_string("ab2cd".to_string()),
            from_participant_id: ParticipantId::new(),
            to_participant_id: None,
            kind: "ice".to_string(),
            payload: serde_json::json!({}),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_cursor_advances_to_last_seq() {
        let batch = vec![signal(4), signal(7), signal(9)];
        assert_eq!(next_after_seq(3, &batch), 9);
    }

    #[test]
    fn test_cursor_unchanged_when_empty() {
        assert_eq!(next_after_seq(42, &[]), 42);
    }

    #[test]
    fn test_broadcast_vs_addressed() {
        let room = RoomId::from_string("ab2cd".to_string());
        let from = ParticipantId::new();
        let to = ParticipantId::new();

        let b = NewSignal::broadcast(room.clone(), from.clone(), "leave", serde_json::json!({}));
        assert!(b.to_participant_id.is_none());

        let a = NewSignal::addressed(room, from, to.clone(), "offer", serde_json::json!({}));
        assert_eq!(a.to_participant_id, Some(to));
    }
}
