//! Transactional scope for multi-row units of work
//!
//! Admission, denial and host hand-off all require read-then-write against
//! several rows at once; the store transaction is the only synchronization
//! point in the system.

use sqlx::{PgPool, Postgres, Transaction};

use crate::Result;

/// Run a closure inside a transaction, committing on success and rolling
/// back on error.
pub async fn with_transaction<F, R>(pool: &PgPool, f: F) -> Result<R>
where
    F: for<'e> FnOnce(&'e mut Transaction<'static, Postgres>) -> futures::future::BoxFuture<'e, Result<R>>
        + Send,
    R: Send + 'static,
{
    let mut tx = pool.begin().await?;

    match f(&mut tx).await {
        Ok(result) => {
            tx.commit().await?;
            Ok(result)
        }
        Err(e) => {
            tx.rollback().await?;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {

    #[tokio::test]
    #[ignore = "Requires database"]
    async fn test_transaction_commit() {
        // Integration test placeholder
    }

    #[tokio::test]
    #[ignore = "Requires database"]
    async fn test_transaction_rollback() {
        // Integration test placeholder
    }
}
