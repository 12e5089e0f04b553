//! Poll-based signal relay
//!
//! Approved participants exchange opaque signaling payloads (offers,
//! answers, ICE candidates) through an append-only per-room log. Delivery is
//! pull-only: each client polls with the last sequence number it has seen.

use serde_json::Value as JsonValue;
use sqlx::PgPool;
use tracing::{instrument, warn};

use crate::{
    config::SignalsConfig,
    models::{next_after_seq, NewSignal, Participant, ParticipantId, RoomId, Signal},
    repository::{ParticipantRepository, RoomRepository, SignalRepository},
    service::auth::ParticipantAuthenticator,
    Error, Result,
};

/// Longest signal kind accepted from clients
pub const SIGNAL_KIND_MAX: usize = 32;

/// One poll window plus the cursor to resume from
#[derive(Debug, Clone)]
pub struct SignalBatch {
    pub signals: Vec<Signal>,
    pub next_after_seq: i64,
}

pub struct RelayService {
    participant_repo: ParticipantRepository,
    signal_repo: SignalRepository,
    auth: ParticipantAuthenticator,
    config: SignalsConfig,
}

impl RelayService {
    #[must_use]
    pub fn new(pool: PgPool, config: SignalsConfig) -> Self {
        let room_repo = RoomRepository::new(pool.clone());
        let participant_repo = ParticipantRepository::new(pool.clone());
        let signal_repo = SignalRepository::new(pool);
        let auth = ParticipantAuthenticator::new(room_repo, participant_repo.clone());
        Self {
            participant_repo,
            signal_repo,
            auth,
            config,
        }
    }

    /// Append a signal to the room log and return its sequence number.
    ///
    /// Only admitted participants may post; waiting and denied participants
    /// answer Forbidden. An addressed signal requires the target to be a
    /// participant of the same room, though not necessarily a connected one:
    /// a signal racing a departure is accepted and simply never delivered.
    #[instrument(skip(self, secret, payload))]
    pub async fn post_signal(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        secret: &str,
        to: Option<&ParticipantId>,
        kind: &str,
        payload: JsonValue,
    ) -> Result<i64> {
        let (room, participant) = self.auth.authenticate(room_id, participant_id, secret).await?;
        require_approved(&participant)?;

        let kind = kind.trim();
        if kind.is_empty() || kind.len() > SIGNAL_KIND_MAX {
            return Err(Error::InvalidArgument(format!(
                "Signal kind must be 1..={SIGNAL_KIND_MAX} characters"
            )));
        }

        let to = match to {
            Some(target_id) => {
                let target = self
                    .participant_repo
                    .get_by_id(target_id)
                    .await?
                    .filter(|t| t.room_id == room.id)
                    .ok_or_else(|| {
                        Error::NotFound("Target participant not found".to_string())
                    })?;
                Some(target.id)
            }
            None => None,
        };

        let signal = NewSignal {
            room_id: room.id,
            from_participant_id: participant.id,
            to_participant_id: to,
            kind: kind.to_string(),
            payload,
        };

        self.signal_repo.append(&signal).await
    }

    /// Fetch signals after the caller's cursor, oldest first.
    ///
    /// The window never contains the caller's own posts nor signals
    /// addressed to someone else. Polling also doubles as the liveness
    /// heartbeat; the timestamp refresh is advisory and never fails the
    /// poll.
    #[instrument(skip(self, secret))]
    pub async fn poll_signals(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        secret: &str,
        after_seq: i64,
        limit: Option<i64>,
    ) -> Result<SignalBatch> {
        let (room, participant) = self.auth.authenticate(room_id, participant_id, secret).await?;
        require_approved(&participant)?;

        if after_seq < 0 {
            return Err(Error::InvalidArgument(
                "after_seq must be non-negative".to_string(),
            ));
        }
        let limit = limit
            .unwrap_or(self.config.default_poll_limit)
            .clamp(1, self.config.max_poll_limit);

        let signals = self
            .signal_repo
            .poll(&room.id, &participant.id, after_seq, limit)
            .await?;

        if let Err(e) = self.participant_repo.refresh_last_seen(&participant.id).await {
            warn!(participant_id = %participant.id, "Failed to refresh liveness: {e}");
        }

        let next = next_after_seq(after_seq, &signals);
        Ok(SignalBatch {
            signals,
            next_after_seq: next,
        })
    }
}

fn require_approved(participant: &Participant) -> Result<()> {
    if participant.status.is_approved() {
        Ok(())
    } else {
        Err(Error::Forbidden(
            "Participant is not admitted to the room".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ParticipantStatus;

    #[test]
    fn test_require_approved() {
        let room = RoomId::from_string("ab2cd".to_string());
        let approved = Participant::new(
            room.clone(),
            None,
            "a".to_string(),
            ParticipantStatus::Approved,
        );
        assert!(require_approved(&approved).is_ok());

        let waiting = Participant::new(room, None, "b".to_string(), ParticipantStatus::Waiting);
        assert!(matches!(
            require_approved(&waiting),
            Err(Error::Forbidden(_))
        ));
    }

    #[tokio::test]
    #[ignore = "Requires database"]
    async fn test_poll_never_returns_own_posts() {
        // Integration test placeholder
    }
}
