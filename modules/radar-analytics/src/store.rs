//! Postgres implementation of the aggregation and classification core.
//!
//! Grouping happens in SQL; unlabeled sentiment/subtopic/location fold
//! into the empty-string bucket via COALESCE so every row lands in
//! exactly one group.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::aggregates::{DailyCount, ProvinceBreakdown, TweetAggregates};
use crate::cohort::{CohortClassifier, SELF_REPORTED_USAGE_PHRASES};
use crate::error::{AnalyticsError, Result};

/// Analytics store backed by the `tweets` table.
#[derive(Clone)]
pub struct TweetStore {
    pool: PgPool,
}

impl TweetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AnalyticsError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl TweetAggregates for TweetStore {
    async fn sentiment_distribution(&self) -> Result<HashMap<String, i64>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT COALESCE(sentiment, ''), COUNT(*)
            FROM tweets
            GROUP BY COALESCE(sentiment, '')
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn tweets_over_time(&self) -> Result<Vec<DailyCount>> {
        let rows = sqlx::query_as::<_, DailyCount>(
            r#"
            SELECT created_at::date AS date, COUNT(*) AS count
            FROM tweets
            WHERE created_at IS NOT NULL
            GROUP BY created_at::date
            ORDER BY created_at::date ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn subtopic_distribution(&self) -> Result<HashMap<String, i64>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT COALESCE(subtopic, ''), COUNT(*)
            FROM tweets
            GROUP BY COALESCE(subtopic, '')
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn tweets_per_province(&self) -> Result<Vec<ProvinceBreakdown>> {
        let rows = sqlx::query_as::<_, ProvinceBreakdown>(
            r#"
            SELECT COALESCE(location, '') AS location,
                   COALESCE(sentiment, '') AS sentiment,
                   COALESCE(subtopic, '') AS subtopic,
                   COUNT(*) AS count
            FROM tweets
            GROUP BY 1, 2, 3
            ORDER BY 1, 2, 3
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn sentiment_distribution_for_bpjs_users(&self) -> Result<HashMap<String, i64>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT COALESCE(sentiment, ''), COUNT(*)
            FROM tweets
            WHERE is_bpjs_user
            GROUP BY COALESCE(sentiment, '')
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn sentiment_distribution_for_subtopic(
        &self,
        subtopic: &str,
    ) -> Result<HashMap<String, i64>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT COALESCE(sentiment, ''), COUNT(*)
            FROM tweets
            WHERE COALESCE(subtopic, '') = $1
            GROUP BY COALESCE(sentiment, '')
            "#,
        )
        .bind(subtopic)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}

#[async_trait]
impl CohortClassifier for TweetStore {
    /// One UPDATE statement, so flags land all-or-nothing. Skipping
    /// already-flagged rows keeps the returned count meaningful and the
    /// flag monotone — nothing here ever sets it back to false.
    async fn flag_bpjs_users(&self) -> Result<u64> {
        let matches = (1..=SELF_REPORTED_USAGE_PHRASES.len())
            .map(|i| format!("full_text ILIKE ${i}"))
            .collect::<Vec<_>>()
            .join(" OR ");
        let sql = format!(
            "UPDATE tweets SET is_bpjs_user = TRUE \
             WHERE NOT is_bpjs_user AND ({matches})"
        );

        let mut query = sqlx::query(&sql);
        for phrase in SELF_REPORTED_USAGE_PHRASES {
            query = query.bind(format!("%{phrase}%"));
        }
        let result = query.execute(&self.pool).await?;

        Ok(result.rows_affected())
    }
}
