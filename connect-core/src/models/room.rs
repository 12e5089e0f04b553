use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ParticipantId, RoomId};

/// Per-room policy flags, owned by the host after creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomPolicy {
    pub waiting_room_enabled: bool,
    pub locked: bool,
    pub mute_on_join: bool,
    pub camera_off_on_join: bool,
    pub allow_screen_share: bool,
}

impl Default for RoomPolicy {
    fn default() -> Self {
        Self {
            waiting_room_enabled: false,
            locked: false,
            mute_on_join: false,
            camera_off_on_join: false,
            allow_screen_share: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub title: Option<String>,
    /// Opaque reference to the creating identity; null for guest-created rooms
    pub created_by: Option<String>,
    /// Current host; null until the first participant is admitted, and
    /// transiently null after the last connected participant leaves
    pub host_participant_id: Option<ParticipantId>,
    pub policy: RoomPolicy,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Room {
    pub fn new(id: RoomId, title: Option<String>, created_by: Option<String>) -> Self {
        Self {
            id,
            title,
            created_by,
            host_participant_id: None,
            policy: RoomPolicy::default(),
            created_at: Utc::now(),
            ended_at: None,
        }
    }

    /// An ended room is permanently terminal
    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }

    pub fn is_host(&self, participant_id: &ParticipantId) -> bool {
        self.host_participant_id.as_ref() == Some(participant_id)
    }
}

/// Requested policy changes; None leaves the flag untouched
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RoomPolicyUpdate {
    pub waiting_room_enabled: Option<bool>,
    pub locked: Option<bool>,
    pub mute_on_join: Option<bool>,
    pub camera_off_on_join: Option<bool>,
    pub allow_screen_share: Option<bool>,
}

impl RoomPolicyUpdate {
    /// Apply this update on top of an existing policy
    #[must_use]
    pub fn apply(&self, mut policy: RoomPolicy) -> RoomPolicy {
        if let Some(v) = self.waiting_room_enabled {
            policy.waiting_room_enabled = v;
        }
        if let Some(v) = self.locked {
            policy.locked = v;
        }
        if let Some(v) = self.mute_on_join {
            policy.mute_on_join = v;
        }
        if let Some(v) = self.camera_off_on_join {
            policy.camera_off_on_join = v;
        }
        if let Some(v) = self.allow_screen_share {
            policy.allow_screen_share = v;
        }
        policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_room_has_no_host() {
        let room = Room::new(RoomId::from_string("ab2cd".to_string()), None, None);
        assert!(room.host_participant_id.is_none());
        assert!(!room.is_ended());
        assert!(!room.policy.locked);
        assert!(room.policy.allow_screen_share);
    }

    #[test]
    fn test_policy_update_applies_only_set_fields() {
        let policy = RoomPolicy::default();
        let update = RoomPolicyUpdate {
            locked: Some(true),
            ..RoomPolicyUpdate::default()
        };

        let updated = update.apply(policy);
        assert!(updated.locked);
        assert_eq!(updated.waiting_room_enabled, policy.waiting_room_enabled);
        assert_eq!(updated.allow_screen_share, policy.allow_screen_share);
    }

    #[test]
    fn test_is_host() {
        let pid = ParticipantId::new();
        let mut room = Room::new(RoomId::from_string("ab2cd".to_string()), None, None);
        assert!(!room.is_host(&pid));
        room.host_participant_id = Some(pid.clone());
        assert!(room.is_host(&pid));
    }
}
