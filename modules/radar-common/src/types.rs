use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One scored tweet as stored in the `tweets` table.
///
/// Rows arrive fully populated from the upstream labeling pipeline —
/// this system never writes content or engagement fields. `sentiment`
/// and `subtopic` are opaque labels; `is_bpjs_user` is the only field
/// mutated here, and only ever from false to true.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tweet {
    pub id_str: i64,
    pub conversation_id_str: i64,
    pub user_id_str: i64,
    pub username: String,
    pub full_text: String,
    pub cleaned_text: Option<String>,
    pub lang: Option<String>,
    pub image_url: Option<String>,
    pub in_reply_to_screen_name: Option<String>,
    pub tweet_url: Option<String>,
    pub location: Option<String>,
    pub favorite_count: i32,
    pub reply_count: i32,
    pub retweet_count: i32,
    pub quote_count: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub sentiment: Option<String>,
    pub subtopic: Option<String>,
    pub is_bpjs_user: bool,
}
