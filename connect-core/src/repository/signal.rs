use sqlx::{postgres::PgRow, PgPool, Row};

use crate::{
    models::{NewSignal, ParticipantId, RoomId, Signal},
    Result,
};

/// Signal repository: append-only log with a store-assigned sequence
#[derive(Clone)]
pub struct SignalRepository {
    pool: PgPool,
}

impl SignalRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a signal and return its store-assigned seq
    pub async fn append(&self, signal: &NewSignal) -> Result<i64> {
        let seq: i64 = sqlx::query_scalar(
            "INSERT INTO signals (room_id, from_participant_id, to_participant_id, kind, payload) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING seq",
        )
        .bind(&signal.room_id)
        .bind(&signal.from_participant_id)
        .bind(signal.to_participant_id.as_ref())
        .bind(&signal.kind)
        .bind(&signal.payload)
        .fetch_one(&self.pool)
        .await?;

        Ok(seq)
    }

    /// Cursor window for one participant: signals after `after_seq` that are
    /// broadcast or addressed to them, never their own posts, ascending.
    pub async fn poll(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        after_seq: i64,
        limit: i64,
    ) -> Result<Vec<Signal>> {
        let rows = sqlx::query(
            "SELECT seq, room_id, from_participant_id, to_participant_id, kind, payload, created_at \
             FROM signals \
             WHERE room_id = $1 \
               AND seq > $2 \
               AND from_participant_id <> $3 \
               AND (to_participant_id IS NULL OR to_participant_id = $3) \
             ORDER BY seq ASC \
             LIMIT $4",
        )
        .bind(room_id)
        .bind(after_seq)
        .bind(participant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_signal).collect()
    }
}

/// Convert database row to Signal model
fn row_to_signal(row: &PgRow) -> Result<Signal> {
    Ok(Signal {
        seq: row.try_get("seq")?,
        room_id: row.try_get("room_id")?,
        from_participant_id: row.try_get("from_participant_id")?,
        to_participant_id: row.try_get("to_participant_id")?,
        kind: row.try_get("kind")?,
        payload: row.try_get("payload")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {

    #[tokio::test]
    #[ignore = "Requires database"]
    async fn test_seq_is_strictly_increasing() {
        // Integration test placeholder
    }

    #[tokio::test]
    #[ignore = "Requires database"]
    async fn test_poll_excludes_own_and_foreign_addressed() {
        // Integration test placeholder
    }
}
