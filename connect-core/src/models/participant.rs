use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use subtle::ConstantTimeEq;

use super::id::{ParticipantId, RoomId};

/// Admission status of a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum ParticipantStatus {
    /// In the waiting room, awaiting a host decision
    #[default]
    Waiting,
    /// Admitted to the room
    Approved,
    /// Rejected by the host; terminal
    Denied,
}

impl ParticipantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl FromStr for ParticipantStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "waiting" => Ok(Self::Waiting),
            "approved" => Ok(Self::Approved),
            "denied" => Ok(Self::Denied),
            _ => Err(format!("Unknown participant status: {s}")),
        }
    }
}

impl std::fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Number of random bytes behind each participant secret
const SECRET_BYTES: usize = 32;

/// Mint a fresh capability secret. Issued exactly once, at join time.
#[must_use]
pub fn generate_secret() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Constant-time secret comparison; never short-circuits on a prefix match
#[must_use]
pub fn secrets_match(stored: &str, presented: &str) -> bool {
    stored.as_bytes().ct_eq(presented.as_bytes()).into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub room_id: RoomId,
    /// Opaque reference to an authenticated identity; null for guests
    pub identity_id: Option<String>,
    pub display_name: String,
    pub is_guest: bool,
    /// Capability token; the sole authentication mechanism for this
    /// participant. Never serialized into API responses by the http layer.
    pub secret: String,
    pub status: ParticipantStatus,
    pub admitted_at: Option<DateTime<Utc>>,
    pub denied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub left_at: Option<DateTime<Utc>>,
}

impl Participant {
    pub fn new(
        room_id: RoomId,
        identity_id: Option<String>,
        display_name: String,
        status: ParticipantStatus,
    ) -> Self {
        let now = Utc::now();
        let is_guest = identity_id.is_none();
        Self {
            id: ParticipantId::new(),
            room_id,
            identity_id,
            display_name,
            is_guest,
            secret: generate_secret(),
            status,
            admitted_at: if status.is_approved() { Some(now) } else { None },
            denied_at: None,
            created_at: now,
            last_seen_at: now,
            left_at: None,
        }
    }

    /// Currently in the room (has not left)
    pub fn is_connected(&self) -> bool {
        self.left_at.is_none()
    }
}

/// Pick the replacement host after a departure: the longest-tenured
/// still-connected approved participant, excluding the one leaving.
#[must_use]
pub fn pick_new_host<'a>(
    participants: &'a [Participant],
    leaving: &ParticipantId,
) -> Option<&'a Participant> {
    participants
        .iter()
        .filter(|p| p.status.is_approved() && p.is_connected() && &p.id != leaving)
        .min_by_key(|p| (p.created_at, p.id.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn participant(room: &RoomId, status: ParticipantStatus, age_secs: i64) -> Participant {
        let mut p = Participant::new(room.clone(), None, "p".to_string(), status);
        p.created_at -= Duration::seconds(age_secs);
        p
    }

    #[test]
    fn test_secret_round_trip() {
        let secret = generate_secret();
        assert!(secrets_match(&secret, &secret));
        assert!(!secrets_match(&secret, &generate_secret()));
        assert!(!secrets_match(&secret, &secret[..secret.len() - 1]));
    }

    #[test]
    fn test_secrets_are_unique_and_opaque() {
        let a = generate_secret();
        let b = generate_secret();
        assert_ne!(a, b);
        // 32 bytes of url-safe base64 without padding
        assert_eq!(a.len(), 43);
    }

    #[test]
    fn test_new_approved_participant_has_admitted_at() {
        let room = RoomId::from_string("ab2cd".to_string());
        let p = Participant::new(room.clone(), None, "a".to_string(), ParticipantStatus::Approved);
        assert!(p.admitted_at.is_some());
        assert!(p.is_guest);

        let q = Participant::new(room, Some("u1".to_string()), "b".to_string(), ParticipantStatus::Waiting);
        assert!(q.admitted_at.is_none());
        assert!(!q.is_guest);
    }

    #[test]
    fn test_pick_new_host_prefers_longest_tenure() {
        let room = RoomId::from_string("ab2cd".to_string());
        let oldest = participant(&room, ParticipantStatus::Approved, 300);
        let newer = participant(&room, ParticipantStatus::Approved, 100);
        let leaving = participant(&room, ParticipantStatus::Approved, 500);

        let pool = vec![newer.clone(), oldest.clone(), leaving.clone()];
        let next = pick_new_host(&pool, &leaving.id).map(|p| p.id.clone());
        assert_eq!(next, Some(oldest.id));
    }

    #[test]
    fn test_pick_new_host_skips_waiting_and_departed() {
        let room = RoomId::from_string("ab2cd".to_string());
        let waiting = participant(&room, ParticipantStatus::Waiting, 600);
        let mut departed = participant(&room, ParticipantStatus::Approved, 400);
        departed.left_at = Some(Utc::now());
        let leaving = participant(&room, ParticipantStatus::Approved, 500);

        let pool = vec![waiting, departed, leaving.clone()];
        assert!(pick_new_host(&pool, &leaving.id).is_none());
    }
}
