//! In-memory implementation of the analytics capabilities.
//!
//! Same observable semantics as the Postgres store, minus the store
//! itself. Lets handler and behavior tests run without a database.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use radar_common::Tweet;

use crate::aggregates::{DailyCount, ProvinceBreakdown, TweetAggregates};
use crate::cohort::{mentions_bpjs_usage, CohortClassifier};
use crate::error::Result;

/// Tweet store double backed by a Vec.
#[derive(Default)]
pub struct MemoryStore {
    tweets: Mutex<Vec<Tweet>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, tweet: Tweet) {
        self.tweets.lock().await.push(tweet);
    }

    /// Replace a tweet's raw text in place. Test control surface for
    /// exercising flag stickiness after content changes.
    pub async fn update_full_text(&self, id_str: i64, full_text: impl Into<String>) {
        let mut tweets = self.tweets.lock().await;
        if let Some(tweet) = tweets.iter_mut().find(|t| t.id_str == id_str) {
            tweet.full_text = full_text.into();
        }
    }
}

/// Unlabeled values group under the empty-string bucket, matching the
/// COALESCE in the SQL queries.
fn bucket(label: &Option<String>) -> String {
    label.clone().unwrap_or_default()
}

#[async_trait]
impl TweetAggregates for MemoryStore {
    async fn sentiment_distribution(&self) -> Result<HashMap<String, i64>> {
        let tweets = self.tweets.lock().await;
        let mut counts = HashMap::new();
        for tweet in tweets.iter() {
            *counts.entry(bucket(&tweet.sentiment)).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn tweets_over_time(&self) -> Result<Vec<DailyCount>> {
        let tweets = self.tweets.lock().await;
        let mut by_date = BTreeMap::new();
        for ts in tweets.iter().filter_map(|t| t.created_at) {
            *by_date.entry(ts.date_naive()).or_insert(0i64) += 1;
        }
        Ok(by_date
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect())
    }

    async fn subtopic_distribution(&self) -> Result<HashMap<String, i64>> {
        let tweets = self.tweets.lock().await;
        let mut counts = HashMap::new();
        for tweet in tweets.iter() {
            *counts.entry(bucket(&tweet.subtopic)).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn tweets_per_province(&self) -> Result<Vec<ProvinceBreakdown>> {
        let tweets = self.tweets.lock().await;
        let mut cells = BTreeMap::new();
        for tweet in tweets.iter() {
            let key = (
                bucket(&tweet.location),
                bucket(&tweet.sentiment),
                bucket(&tweet.subtopic),
            );
            *cells.entry(key).or_insert(0i64) += 1;
        }
        Ok(cells
            .into_iter()
            .map(|((location, sentiment, subtopic), count)| ProvinceBreakdown {
                location,
                sentiment,
                subtopic,
                count,
            })
            .collect())
    }

    async fn sentiment_distribution_for_bpjs_users(&self) -> Result<HashMap<String, i64>> {
        let tweets = self.tweets.lock().await;
        let mut counts = HashMap::new();
        for tweet in tweets.iter().filter(|t| t.is_bpjs_user) {
            *counts.entry(bucket(&tweet.sentiment)).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn sentiment_distribution_for_subtopic(
        &self,
        subtopic: &str,
    ) -> Result<HashMap<String, i64>> {
        let tweets = self.tweets.lock().await;
        let mut counts = HashMap::new();
        for tweet in tweets.iter().filter(|t| bucket(&t.subtopic) == subtopic) {
            *counts.entry(bucket(&tweet.sentiment)).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

#[async_trait]
impl CohortClassifier for MemoryStore {
    async fn flag_bpjs_users(&self) -> Result<u64> {
        let mut tweets = self.tweets.lock().await;
        let mut flagged = 0;
        for tweet in tweets.iter_mut() {
            if !tweet.is_bpjs_user && mentions_bpjs_usage(&tweet.full_text) {
                tweet.is_bpjs_user = true;
                flagged += 1;
            }
        }
        Ok(flagged)
    }
}
