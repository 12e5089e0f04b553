//! Wire representations shared across handlers
//!
//! The participant secret is deliberately absent from every view here; it
//! appears exactly once on the wire, in the join response.

use connect_core::models::{Participant, Room, RoomId};
use serde::{Deserialize, Serialize};

/// Credentials presented with every participant-authenticated request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub participant_id: String,
    pub secret: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPolicyView {
    pub waiting_room_enabled: bool,
    pub locked: bool,
    pub mute_on_join: bool,
    pub camera_off_on_join: bool,
    pub allow_screen_share: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub room_id: String,
    pub title: Option<String>,
    pub host_participant_id: Option<String>,
    pub policy: RoomPolicyView,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub ended_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<&Room> for RoomView {
    fn from(room: &Room) -> Self {
        Self {
            room_id: room.id.as_str().to_string(),
            title: room.title.clone(),
            host_participant_id: room
                .host_participant_id
                .as_ref()
                .map(|id| id.as_str().to_string()),
            policy: RoomPolicyView {
                waiting_room_enabled: room.policy.waiting_room_enabled,
                locked: room.policy.locked,
                mute_on_join: room.policy.mute_on_join,
                camera_off_on_join: room.policy.camera_off_on_join,
                allow_screen_share: room.policy.allow_screen_share,
            },
            created_at: room.created_at,
            ended_at: room.ended_at,
        }
    }
}

/// Pre-join lookup view for the unauthenticated room check.
///
/// Carries only what a prospective joiner needs to render the join screen;
/// in particular no participant identifiers, host included.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCheckView {
    pub room_id: String,
    pub title: Option<String>,
    pub waiting_room_enabled: bool,
    pub locked: bool,
    pub ended: bool,
}

impl From<&Room> for RoomCheckView {
    fn from(room: &Room) -> Self {
        Self {
            room_id: room.id.as_str().to_string(),
            title: room.title.clone(),
            waiting_room_enabled: room.policy.waiting_room_enabled,
            locked: room.policy.locked,
            ended: room.ended_at.is_some(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    pub participant_id: String,
    pub display_name: String,
    pub status: String,
    pub is_guest: bool,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Participant> for ParticipantView {
    fn from(p: &Participant) -> Self {
        Self {
            participant_id: p.id.as_str().to_string(),
            display_name: p.display_name.clone(),
            status: p.status.to_string(),
            is_guest: p.is_guest,
            joined_at: p.created_at,
        }
    }
}

/// Normalize a human-typed room code from the path
pub fn parse_room_id(raw: &str) -> RoomId {
    RoomId::from_string(raw.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_room_id_normalizes() {
        assert_eq!(parse_room_id("  AB2cD ").as_str(), "ab2cd");
    }

    #[test]
    fn test_room_check_view_omits_participant_data() {
        let mut room = Room::new(
            RoomId::from_string("ab2cd".to_string()),
            Some("Standup".to_string()),
            None,
        );
        room.policy.waiting_room_enabled = true;
        room.host_participant_id = Some(connect_core::models::ParticipantId::new());

        let json = serde_json::to_value(RoomCheckView::from(&room)).unwrap();
        assert!(json.get("hostParticipantId").is_none());
        assert_eq!(json["roomId"], "ab2cd");
        assert_eq!(json["waitingRoomEnabled"], true);
        assert_eq!(json["ended"], false);
    }

    #[test]
    fn test_participant_view_has_no_secret() {
        let p = Participant::new(
            RoomId::from_string("ab2cd".to_string()),
            None,
            "Ada".to_string(),
            connect_core::models::ParticipantStatus::Approved,
        );
        let json = serde_json::to_value(ParticipantView::from(&p)).unwrap();
        assert!(json.get("secret").is_none());
        assert_eq!(json["displayName"], "Ada");
        assert_eq!(json["status"], "approved");
    }
}
