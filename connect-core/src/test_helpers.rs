//! Test helpers and fixtures for connect-core tests
//!
//! Common fixtures to reduce boilerplate across the crate's tests.

use chrono::Utc;

use crate::models::{
    generate_room_code, Participant, ParticipantId, ParticipantStatus, Room, RoomId, RoomPolicy,
};

/// Create a room ID from a literal code
pub fn test_room_id(code: &str) -> RoomId {
    RoomId::from_string(code.to_string())
}

/// Generate a random room ID for testing
pub fn random_room_id() -> RoomId {
    generate_room_code(5)
}

/// Test fixture builder for Room
pub struct RoomFixture {
    id: RoomId,
    title: Option<String>,
    host: Option<ParticipantId>,
    policy: RoomPolicy,
    ended: bool,
}

impl RoomFixture {
    pub fn new() -> Self {
        Self {
            id: random_room_id(),
            title: Some("Test Room".to_string()),
            host: None,
            policy: RoomPolicy::default(),
            ended: false,
        }
    }

    pub fn with_id(mut self, id: RoomId) -> Self {
        self.id = id;
        self
    }

    pub fn with_host(mut self, host: ParticipantId) -> Self {
        self.host = Some(host);
        self
    }

    pub fn with_waiting_room(mut self) -> Self {
        self.policy.waiting_room_enabled = true;
        self
    }

    pub fn locked(mut self) -> Self {
        self.policy.locked = true;
        self
    }

    pub fn ended(mut self) -> Self {
        self.ended = true;
        self
    }

    pub fn build(self) -> Room {
        let now = Utc::now();
        Room {
            id: self.id,
            title: self.title,
            created_by: None,
            host_participant_id: self.host,
            policy: self.policy,
            created_at: now,
            ended_at: if self.ended { Some(now) } else { None },
        }
    }
}

impl Default for RoomFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Test fixture builder for Participant
pub struct ParticipantFixture {
    room_id: RoomId,
    display_name: String,
    status: ParticipantStatus,
    left: bool,
}

impl ParticipantFixture {
    pub fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            display_name: "Test Participant".to_string(),
            status: ParticipantStatus::Approved,
            left: false,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.display_name = name.to_string();
        self
    }

    pub fn with_status(mut self, status: ParticipantStatus) -> Self {
        self.status = status;
        self
    }

    pub fn departed(mut self) -> Self {
        self.left = true;
        self
    }

    pub fn build(self) -> Participant {
        let mut p = Participant::new(self.room_id, None, self.display_name, self.status);
        if self.left {
            p.left_at = Some(Utc::now());
        }
        p
    }
}
