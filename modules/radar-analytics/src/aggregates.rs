//! Read-side capability: the analytical grouping queries.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tweet volume for one calendar date (time-of-day truncated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

/// One cell of the location × sentiment × subtopic cross-tabulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProvinceBreakdown {
    pub location: String,
    pub sentiment: String,
    pub subtopic: String,
    pub count: i64,
}

/// The aggregate queries the API serves. All read-only, all computed
/// over the full table per call, all returning empty collections (not
/// errors) when nothing matches. Sentiment and subtopic labels are
/// opaque strings grouped by exact value; unlabeled rows surface under
/// the empty-string key.
#[async_trait]
pub trait TweetAggregates: Send + Sync {
    /// Count of tweets per sentiment label, over all tweets.
    async fn sentiment_distribution(&self) -> Result<HashMap<String, i64>>;

    /// Tweets per day, ascending by date. Sparse: dates with no tweets
    /// are absent, and tweets without a creation timestamp are skipped.
    async fn tweets_over_time(&self) -> Result<Vec<DailyCount>>;

    /// Count of tweets per subtopic label, over all tweets.
    async fn subtopic_distribution(&self) -> Result<HashMap<String, i64>>;

    /// Tweet counts per distinct (location, sentiment, subtopic)
    /// combination, ordered by location then sentiment then subtopic.
    async fn tweets_per_province(&self) -> Result<Vec<ProvinceBreakdown>>;

    /// Sentiment distribution restricted to the self-reported-user
    /// cohort. Empty if the classifier never ran or nothing matched.
    async fn sentiment_distribution_for_bpjs_users(&self) -> Result<HashMap<String, i64>>;

    /// Sentiment distribution restricted to one subtopic label.
    async fn sentiment_distribution_for_subtopic(
        &self,
        subtopic: &str,
    ) -> Result<HashMap<String, i64>>;
}
