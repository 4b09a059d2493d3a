use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use tracing::warn;

use crate::AppState;

// --- Query structs ---

#[derive(Deserialize)]
pub struct SubtopicQuery {
    subtopic: String,
}

// --- Handlers ---

pub async fn api_sentiment_distribution(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.aggregates.sentiment_distribution().await {
        Ok(dist) => Json(dist).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to load sentiment distribution");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub async fn api_tweets_over_time(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.aggregates.tweets_over_time().await {
        Ok(series) => Json(series).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to load tweets over time");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub async fn api_subtopics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.aggregates.subtopic_distribution().await {
        Ok(dist) => Json(dist).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to load subtopic distribution");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub async fn api_tweets_per_province(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.aggregates.tweets_per_province().await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to load province breakdown");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub async fn api_sentiment_distribution_bpjs_users(
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    match state.aggregates.sentiment_distribution_for_bpjs_users().await {
        Ok(dist) => Json(dist).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to load BPJS user sentiment distribution");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub async fn api_sentiment_distribution_per_subtopic(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SubtopicQuery>,
) -> impl IntoResponse {
    match state
        .aggregates
        .sentiment_distribution_for_subtopic(&params.subtopic)
        .await
    {
        Ok(dist) => Json(dist).into_response(),
        Err(e) => {
            warn!(error = %e, subtopic = %params.subtopic, "Failed to load subtopic sentiment");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

// --- Router tests (in-memory store) ---

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use radar_analytics::{
        AnalyticsError, CohortClassifier, DailyCount, MemoryStore, ProvinceBreakdown,
        Result as AnalyticsResult, TweetAggregates,
    };
    use radar_common::Tweet;

    use crate::{app, AppState};

    fn tweet(id: i64, text: &str, sentiment: Option<&str>) -> Tweet {
        Tweet {
            id_str: id,
            username: format!("user{id}"),
            full_text: text.to_string(),
            sentiment: sentiment.map(str::to_string),
            ..Tweet::default()
        }
    }

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());

        let mut a = tweet(1, "saya pakai bpjs", Some("positive"));
        a.created_at = Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
        a.location = Some("Jawa Barat".into());
        a.subtopic = Some("layanan".into());

        let mut b = tweet(2, "no mention", Some("negative"));
        b.created_at = Some(Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap());
        b.location = Some("Aceh".into());
        b.subtopic = Some("iuran".into());

        let mut c = tweet(3, "saya daftar BPJS sekarang", Some("positive"));
        c.created_at = Some(Utc.with_ymd_and_hms(2024, 3, 1, 14, 0, 0).unwrap());
        c.location = Some("Jawa Barat".into());
        c.subtopic = Some("layanan".into());

        store.insert(a).await;
        store.insert(b).await;
        store.insert(c).await;
        store
    }

    fn state_for(store: Arc<MemoryStore>) -> Arc<AppState> {
        Arc::new(AppState { aggregates: store })
    }

    async fn get(router: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn health_check_responds_ok() {
        let (status, body) = get(app(state_for(seeded_store().await)), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok".to_vec());
    }

    #[tokio::test]
    async fn sentiment_distribution_is_a_json_map() {
        let (status, body) =
            get(app(state_for(seeded_store().await)), "/api/sentiment-distribution").await;

        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({"positive": 2, "negative": 1}));
    }

    #[tokio::test]
    async fn tweets_over_time_is_an_ascending_array() {
        let (status, body) =
            get(app(state_for(seeded_store().await)), "/api/tweets-over-time").await;

        assert_eq!(status, StatusCode::OK);
        let series: Vec<DailyCount> = serde_json::from_slice(&body).unwrap();
        assert_eq!(series.len(), 2);
        assert!(series[0].date < series[1].date);
        assert_eq!(series[0].count, 2);

        // Wire format: dates as ISO strings.
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value[0]["date"], "2024-03-01");
    }

    #[tokio::test]
    async fn subtopics_is_a_json_map() {
        let (status, body) = get(app(state_for(seeded_store().await)), "/api/subtopics").await;

        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({"layanan": 2, "iuran": 1}));
    }

    #[tokio::test]
    async fn tweets_per_province_is_a_cross_tab_array() {
        let (status, body) =
            get(app(state_for(seeded_store().await)), "/api/tweets-per-province").await;

        assert_eq!(status, StatusCode::OK);
        let rows: Vec<ProvinceBreakdown> = serde_json::from_slice(&body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].location, "Aceh");
        assert_eq!(rows[1].location, "Jawa Barat");
        assert_eq!(rows[1].count, 2);
    }

    #[tokio::test]
    async fn cohort_endpoint_is_empty_before_classification() {
        let (status, body) = get(
            app(state_for(seeded_store().await)),
            "/api/sentiment-distribution-bpjs-users",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({}));
    }

    #[tokio::test]
    async fn cohort_endpoint_reflects_classification() {
        let store = seeded_store().await;
        store.flag_bpjs_users().await.unwrap();

        let (status, body) = get(
            app(state_for(store)),
            "/api/sentiment-distribution-bpjs-users",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({"positive": 2}));
    }

    #[tokio::test]
    async fn per_subtopic_endpoint_filters_by_query_param() {
        let (status, body) = get(
            app(state_for(seeded_store().await)),
            "/api/sentiment-distribution-per-subtopic?subtopic=layanan",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({"positive": 2}));
    }

    #[tokio::test]
    async fn per_subtopic_endpoint_requires_the_param() {
        let (status, _body) = get(
            app(state_for(seeded_store().await)),
            "/api/sentiment-distribution-per-subtopic",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // --- Failure shape ---

    struct FailingStore;

    #[async_trait::async_trait]
    impl TweetAggregates for FailingStore {
        async fn sentiment_distribution(&self) -> AnalyticsResult<HashMap<String, i64>> {
            Err(AnalyticsError::StoreUnavailable("connection refused".into()))
        }

        async fn tweets_over_time(&self) -> AnalyticsResult<Vec<DailyCount>> {
            Err(AnalyticsError::StoreUnavailable("connection refused".into()))
        }

        async fn subtopic_distribution(&self) -> AnalyticsResult<HashMap<String, i64>> {
            Err(AnalyticsError::StoreUnavailable("connection refused".into()))
        }

        async fn tweets_per_province(&self) -> AnalyticsResult<Vec<ProvinceBreakdown>> {
            Err(AnalyticsError::StoreUnavailable("connection refused".into()))
        }

        async fn sentiment_distribution_for_bpjs_users(
            &self,
        ) -> AnalyticsResult<HashMap<String, i64>> {
            Err(AnalyticsError::ReadFailure("unexpected column type".into()))
        }

        async fn sentiment_distribution_for_subtopic(
            &self,
            _subtopic: &str,
        ) -> AnalyticsResult<HashMap<String, i64>> {
            Err(AnalyticsError::StoreUnavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn store_failures_become_500_with_plain_text_body() {
        let state = Arc::new(AppState {
            aggregates: Arc::new(FailingStore),
        });

        for uri in [
            "/api/sentiment-distribution",
            "/api/tweets-over-time",
            "/api/subtopics",
            "/api/tweets-per-province",
        ] {
            let (status, body) = get(app(state.clone()), uri).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
            let body = String::from_utf8(body).unwrap();
            assert_eq!(body, "store unavailable: connection refused", "{uri}");
        }

        let (status, body) = get(app(state), "/api/sentiment-distribution-bpjs-users").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "could not decode row: unexpected column type"
        );
    }
}
