//! Database seeding utilities.

use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use tracing::info;

use segment_analytics::models::{Segment, User};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Batch size must be positive")]
    EmptyBatch,
}

/// Database seeder for inserting generated test data.
pub struct Seeder {
    pool: PgPool,
    batch_size: usize,
}

impl Seeder {
    /// Creates a new seeder with the given database pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            batch_size: 500,
        }
    }

    /// Sets the batch size for bulk operations.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Seeds segments first, then the users referencing them.
    pub async fn seed(&self, segments: &[Segment], users: &[User]) -> Result<(), SeedError> {
        self.seed_segments(segments).await?;
        self.seed_users(users).await
    }

    /// Seeds segments into the database.
    pub async fn seed_segments(&self, segments: &[Segment]) -> Result<(), SeedError> {
        if self.batch_size == 0 {
            return Err(SeedError::EmptyBatch);
        }
        info!("Seeding {} segments...", segments.len());

        for chunk in segments.chunks(self.batch_size) {
            let mut tx = self.pool.begin().await?;
            for segment in chunk {
                insert_segment(&mut tx, segment).await?;
            }
            tx.commit().await?;
        }

        info!("Seeded {} segments", segments.len());
        Ok(())
    }

    /// Seeds users into the database.
    pub async fn seed_users(&self, users: &[User]) -> Result<(), SeedError> {
        if self.batch_size == 0 {
            return Err(SeedError::EmptyBatch);
        }
        info!("Seeding {} users...", users.len());

        let mut seeded = 0;
        for chunk in users.chunks(self.batch_size) {
            let mut tx = self.pool.begin().await?;
            for user in chunk {
                insert_user(&mut tx, user).await?;
            }
            tx.commit().await?;

            seeded += chunk.len();
            info!("  Seeded {}/{} users", seeded, users.len());
        }

        info!("Seeded {} users", users.len());
        Ok(())
    }
}

async fn insert_segment(
    tx: &mut Transaction<'_, Postgres>,
    segment: &Segment,
) -> Result<(), SeedError> {
    sqlx::query(
        r#"
        INSERT INTO segments (id, name, description, criteria, created_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(segment.id)
    .bind(&segment.name)
    .bind(&segment.description)
    .bind(&segment.criteria)
    .bind(segment.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_user(tx: &mut Transaction<'_, Postgres>, user: &User) -> Result<(), SeedError> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, gender, income_level, income_type, segment_ids, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.gender)
    .bind(user.income_level)
    .bind(&user.income_type)
    .bind(&user.segment_ids)
    .bind(user.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
