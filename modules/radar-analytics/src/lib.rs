//! Aggregation and classification core for BPJS tweet analytics.
//!
//! One denormalized `tweets` table, read by a handful of grouping
//! queries and written by a single idempotent cohort-flagging rule.
//! Consumers depend on the [`TweetAggregates`] and [`CohortClassifier`]
//! capability traits; [`TweetStore`] is the Postgres implementation and
//! [`MemoryStore`] the in-memory double.

pub mod aggregates;
pub mod cohort;
pub mod error;
pub mod memory;
pub mod store;

pub use aggregates::{DailyCount, ProvinceBreakdown, TweetAggregates};
pub use cohort::{mentions_bpjs_usage, CohortClassifier, SELF_REPORTED_USAGE_PHRASES};
pub use error::{AnalyticsError, Result};
pub use memory::MemoryStore;
pub use store::TweetStore;
