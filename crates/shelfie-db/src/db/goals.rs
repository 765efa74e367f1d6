//! Goal submission records.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use shelfie_core::error::StoreError;
use shelfie_core::ports::GoalLedger;

#[derive(Clone)]
pub struct GoalRepository {
    pool: PgPool,
}

impl GoalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GoalLedger for GoalRepository {
    /// Append the post id to the goal's submission record. The goal row must
    /// already exist; submissions are append-only.
    #[tracing::instrument(
        skip(self),
        fields(db.table = "goal_submissions", db.operation = "update", db.record_id = %goal_id)
    )]
    async fn record_submission(&self, goal_id: Uuid, post_id: Uuid) -> Result<(), StoreError> {
        let updated = sqlx::query::<Postgres>(
            "UPDATE goal_submissions \
             SET post_ids = array_append(post_ids, $2), updated_at = now() \
             WHERE goal_id = $1",
        )
        .bind(goal_id)
        .bind(post_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(StoreError::NotFound(goal_id));
        }
        tracing::debug!(goal_id = %goal_id, post_id = %post_id, "goal submission recorded");
        Ok(())
    }
}
