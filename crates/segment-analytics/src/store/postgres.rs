use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{SegmentRepository, UserAggregation};
use crate::{
    aggregation::{GenderGroupRow, SegmentGroupRow},
    errors::AppError,
    models::Segment,
    pagination::Page,
    query_builder::{GenderBreakdownQuery, SegmentStatsQuery},
    types::UpdateSegmentRequest,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    scan_cap: Option<i64>,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            scan_cap: None,
        }
    }

    /// Restricts both aggregations to the first `cap` users in insertion order.
    pub fn with_scan_cap(mut self, cap: Option<i64>) -> Self {
        self.scan_cap = cap;
        self
    }
}

#[async_trait]
impl SegmentRepository for PgStore {
    async fn list_segments(&self, page: Page) -> Result<(Vec<Segment>, i64), AppError> {
        let segments: Vec<Segment> = sqlx::query_as(
            r#"
            SELECT id, name, description, criteria, created_at
            FROM segments
            ORDER BY seq
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM segments")
            .fetch_one(&self.pool)
            .await?;

        Ok((segments, total))
    }

    async fn get_segment(&self, id: Uuid) -> Result<Option<Segment>, AppError> {
        let segment = sqlx::query_as(
            r#"
            SELECT id, name, description, criteria, created_at
            FROM segments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(segment)
    }

    async fn update_segment(
        &self,
        id: Uuid,
        _patch: &UpdateSegmentRequest,
    ) -> Result<Option<Segment>, AppError> {
        self.get_segment(id).await
    }
}

#[async_trait]
impl UserAggregation for PgStore {
    async fn segment_group_rows(
        &self,
        segment_ids: &[Uuid],
    ) -> Result<Vec<SegmentGroupRow>, AppError> {
        let sql = SegmentStatsQuery::new(self.scan_cap).sql();
        let mut query = sqlx::query_as::<_, SegmentGroupRow>(&sql).bind(segment_ids);
        if let Some(cap) = self.scan_cap {
            query = query.bind(cap);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn gender_group_rows(&self, segment_id: Uuid) -> Result<Vec<GenderGroupRow>, AppError> {
        let sql = GenderBreakdownQuery::new(self.scan_cap).sql();
        let mut query = sqlx::query_as::<_, GenderGroupRow>(&sql).bind(segment_id);
        if let Some(cap) = self.scan_cap {
            query = query.bind(cap);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }
}
