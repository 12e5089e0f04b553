use sqlx::{postgres::PgRow, PgPool, Row};

use crate::{
    models::{Participant, ParticipantId, ParticipantStatus, RoomId},
    Result,
};

/// Participant repository for database operations
#[derive(Clone)]
pub struct ParticipantRepository {
    pool: PgPool,
}

const PARTICIPANT_COLUMNS: &str = "id, room_id, identity_id, display_name, is_guest, secret, \
     status, admitted_at, denied_at, created_at, last_seen_at, left_at";

impl ParticipantRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new participant using a provided executor (pool or transaction)
    pub async fn create_with_executor<'e, E>(
        &self,
        participant: &Participant,
        executor: E,
    ) -> Result<()>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query(
            "INSERT INTO participants (id, room_id, identity_id, display_name, is_guest, \
             secret, status, admitted_at, denied_at, created_at, last_seen_at, left_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(&participant.id)
        .bind(&participant.room_id)
        .bind(&participant.identity_id)
        .bind(&participant.display_name)
        .bind(participant.is_guest)
        .bind(&participant.secret)
        .bind(status_to_i16(participant.status))
        .bind(participant.admitted_at)
        .bind(participant.denied_at)
        .bind(participant.created_at)
        .bind(participant.last_seen_at)
        .bind(participant.left_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Get participant by ID
    pub async fn get_by_id(&self, participant_id: &ParticipantId) -> Result<Option<Participant>> {
        let row = sqlx::query(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE id = $1"
        ))
        .bind(participant_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row_to_participant(&row)?)),
            None => Ok(None),
        }
    }

    /// Downgrade a freshly-inserted participant to the waiting room after a
    /// lost host race.
    pub async fn set_waiting_with_executor<'e, E>(
        &self,
        participant_id: &ParticipantId,
        executor: E,
    ) -> Result<()>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query("UPDATE participants SET status = $2, admitted_at = NULL WHERE id = $1")
            .bind(participant_id)
            .bind(status_to_i16(ParticipantStatus::Waiting))
            .execute(executor)
            .await?;

        Ok(())
    }

    /// Conditionally approve a waiting participant. Returns false when the
    /// participant was not in a deniable/approvable state (race lost).
    pub async fn approve(&self, room_id: &RoomId, participant_id: &ParticipantId) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE participants \
             SET status = $3, admitted_at = CURRENT_TIMESTAMP \
             WHERE id = $1 AND room_id = $2 AND status = $4 AND left_at IS NULL",
        )
        .bind(participant_id)
        .bind(room_id)
        .bind(status_to_i16(ParticipantStatus::Approved))
        .bind(status_to_i16(ParticipantStatus::Waiting))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Conditionally deny a waiting participant. A denial is also a
    /// departure, so `left_at` is set in the same statement.
    pub async fn deny(&self, room_id: &RoomId, participant_id: &ParticipantId) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE participants \
             SET status = $3, denied_at = CURRENT_TIMESTAMP, left_at = CURRENT_TIMESTAMP \
             WHERE id = $1 AND room_id = $2 AND status = $4 AND left_at IS NULL",
        )
        .bind(participant_id)
        .bind(room_id)
        .bind(status_to_i16(ParticipantStatus::Denied))
        .bind(status_to_i16(ParticipantStatus::Waiting))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Mark a participant departed. Returns false when they had already left.
    pub async fn mark_left_with_executor<'e, E>(
        &self,
        participant_id: &ParticipantId,
        executor: E,
    ) -> Result<bool>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE participants SET left_at = CURRENT_TIMESTAMP \
             WHERE id = $1 AND left_at IS NULL",
        )
        .bind(participant_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Mark every connected participant of a room departed (room ending)
    pub async fn mark_all_left_with_executor<'e, E>(
        &self,
        room_id: &RoomId,
        executor: E,
    ) -> Result<u64>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE participants SET left_at = CURRENT_TIMESTAMP \
             WHERE room_id = $1 AND left_at IS NULL",
        )
        .bind(room_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// All still-connected participants of a room, oldest first. Used inside
    /// the hand-off transaction so election sees a consistent snapshot.
    pub async fn list_connected_with_executor<'e, E>(
        &self,
        room_id: &RoomId,
        executor: E,
    ) -> Result<Vec<Participant>>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let rows = sqlx::query(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants \
             WHERE room_id = $1 AND left_at IS NULL \
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(room_id)
        .fetch_all(executor)
        .await?;

        rows.iter().map(row_to_participant).collect()
    }

    /// Connected, approved participants of a room, oldest first
    pub async fn list_connected_approved(&self, room_id: &RoomId) -> Result<Vec<Participant>> {
        let rows = sqlx::query(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants \
             WHERE room_id = $1 AND status = $2 AND left_at IS NULL \
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(room_id)
        .bind(status_to_i16(ParticipantStatus::Approved))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_participant).collect()
    }

    /// Waiting-room queue, oldest join first (FIFO fairness)
    pub async fn list_waiting(&self, room_id: &RoomId) -> Result<Vec<Participant>> {
        let rows = sqlx::query(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants \
             WHERE room_id = $1 AND status = $2 AND left_at IS NULL \
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(room_id)
        .bind(status_to_i16(ParticipantStatus::Waiting))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_participant).collect()
    }

    /// Liveness heartbeat, refreshed on each successful poll
    pub async fn refresh_last_seen(&self, participant_id: &ParticipantId) -> Result<()> {
        sqlx::query("UPDATE participants SET last_seen_at = CURRENT_TIMESTAMP WHERE id = $1")
            .bind(participant_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

const fn status_to_i16(status: ParticipantStatus) -> i16 {
    match status {
        ParticipantStatus::Waiting => 1,
        ParticipantStatus::Approved => 2,
        ParticipantStatus::Denied => 3,
    }
}

fn i16_to_status(val: i16) -> ParticipantStatus {
    match val {
        1 => ParticipantStatus::Waiting,
        2 => ParticipantStatus::Approved,
        3 => ParticipantStatus::Denied,
        _ => {
            tracing::warn!("Unknown participant status value: {val}, defaulting to Waiting");
            ParticipantStatus::Waiting
        }
    }
}

/// Convert database row to Participant model
fn row_to_participant(row: &PgRow) -> Result<Participant> {
    let status_i16: i16 = row.try_get("status")?;

    Ok(Participant {
        id: row.try_get("id")?,
        room_id: row.try_get("room_id")?,
        identity_id: row.try_get("identity_id")?,
        display_name: row.try_get("display_name")?,
        is_guest: row.try_get("is_guest")?,
        secret: row.try_get("secret")?,
        status: i16_to_status(status_i16),
        admitted_at: row.try_get("admitted_at")?,
        denied_at: row.try_get("denied_at")?,
        created_at: row.try_get("created_at")?,
        last_seen_at: row.try_get("last_seen_at")?,
        left_at: row.try_get("left_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            ParticipantStatus::Waiting,
            ParticipantStatus::Approved,
            ParticipantStatus::Denied,
        ] {
            assert_eq!(i16_to_status(status_to_i16(status)), status);
        }
    }

    #[tokio::test]
    #[ignore = "Requires database"]
    async fn test_deny_is_conditional() {
        // Integration test placeholder
    }
}
