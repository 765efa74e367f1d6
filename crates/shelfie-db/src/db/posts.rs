//! Post document repository.
//!
//! The post lifecycle performed here is deliberately narrow: `stage` creates
//! a placeholder row with empty image URLs, `attach_images` is the single
//! further mutation (URLs + server-stamped `created_at`), `delete` removes a
//! staged row during compensation. Nothing else writes these columns.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use shelfie_core::error::StoreError;
use shelfie_core::models::post::{DraftPost, PersistedPost, PostImageUrls};
use shelfie_core::ports::PostStore;

#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PostRepository {
    #[tracing::instrument(skip(self, draft), fields(db.table = "posts", db.operation = "insert"))]
    async fn stage(&self, draft: &DraftPost) -> Result<Uuid, StoreError> {
        let id: Uuid = sqlx::query_scalar::<Postgres, Uuid>(
            "INSERT INTO posts (id, author_id, author_name, account_id, account_name, brands, description, image_url, original_image_url, goal_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, '', '', $8) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(draft.author_id)
        .bind(&draft.author_name)
        .bind(draft.account_id)
        .bind(&draft.account_name)
        .bind(&draft.brands)
        .bind(&draft.description)
        .bind(draft.goal.as_ref().map(|g| g.goal_id))
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(post_id = %id, "post staged");
        Ok(id)
    }

    #[tracing::instrument(
        skip(self, urls),
        fields(db.table = "posts", db.operation = "update", db.record_id = %post_id)
    )]
    async fn attach_images(
        &self,
        post_id: Uuid,
        urls: &PostImageUrls,
    ) -> Result<PersistedPost, StoreError> {
        let post: Option<PersistedPost> = sqlx::query_as::<Postgres, PersistedPost>(
            "UPDATE posts SET image_url = $2, original_image_url = $3, created_at = now() \
             WHERE id = $1 \
             RETURNING id, author_id, author_name, account_id, account_name, brands, description, image_url, original_image_url, goal_id, created_at",
        )
        .bind(post_id)
        .bind(&urls.resized)
        .bind(&urls.original)
        .fetch_optional(&self.pool)
        .await?;

        post.ok_or(StoreError::NotFound(post_id))
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "posts", db.operation = "delete", db.record_id = %post_id)
    )]
    async fn delete(&self, post_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
