//! Sources and caches against a local stand-in for the GraphQL APIs.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use folio_stats::{
    GithubSource, LeetcodeModel, LeetcodeSource, StatCache, StatsError, View, view::Intensity,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Clone)]
struct Mock {
    status: StatusCode,
    body: Value,
    hits: Arc<AtomicUsize>,
    seen: Arc<std::sync::Mutex<Vec<(HeaderMap, Value)>>>,
}

impl Mock {
    fn new(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body,
            hits: Arc::new(AtomicUsize::new(0)),
            seen: Arc::default(),
        }
    }

    /// Serve on an ephemeral port and return the endpoint URL.
    async fn serve(&self) -> String {
        async fn graphql(
            State(mock): State<Mock>,
            headers: HeaderMap,
            Json(request): Json<Value>,
        ) -> (StatusCode, Json<Value>) {
            mock.hits.fetch_add(1, Ordering::SeqCst);
            mock.seen.lock().unwrap().push((headers, request));
            (mock.status, Json(mock.body.clone()))
        }

        let app = Router::new()
            .route("/graphql", post(graphql))
            .with_state(self.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}/graphql")
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn leetcode_body() -> Value {
    json!({"data": {
        "matchedUser": {
            "username": "jane",
            "profile": {"ranking": 52000},
            "submitStatsGlobal": {"acSubmissionNum": [
                {"difficulty": "All", "count": 30},
                {"difficulty": "Easy", "count": 20},
                {"difficulty": "Medium", "count": 8},
                {"difficulty": "Hard", "count": 2}
            ]}
        },
        "allQuestionsCount": [
            {"difficulty": "All", "count": 300},
            {"difficulty": "Easy", "count": 100},
            {"difficulty": "Medium", "count": 150},
            {"difficulty": "Hard", "count": 50}
        ]
    }})
}

#[tokio::test]
async fn test_leetcode_fetch_populates_cache() {
    let mock = Mock::new(StatusCode::OK, leetcode_body());
    let endpoint = mock.serve().await;
    let cache = StatCache::new(LeetcodeSource::new(endpoint, "jane").unwrap());

    assert_eq!(View::<LeetcodeModel>::initial(&cache), View::Loading);

    let snapshot = cache.ensure().await.unwrap();
    assert_eq!(snapshot.total_solved, 30);
    assert_eq!(snapshot.acceptance_rate, "10.0%");
    assert_eq!(snapshot.ranking, Some(52000));

    // Served from cache from here on.
    cache.ensure().await.unwrap();
    assert_eq!(mock.hits(), 1);

    let View::Ready(model) = View::<LeetcodeModel>::initial(&cache) else {
        panic!("cache should be warm");
    };
    assert_eq!(model.ranking.as_deref(), Some("#52,000"));

    let (headers, request) = mock.seen.lock().unwrap()[0].clone();
    assert_eq!(headers["referer"], "https://leetcode.com");
    assert_eq!(request["variables"]["username"], "jane");
}

#[tokio::test]
async fn test_http_error_leaves_cache_unpopulated() {
    let mock = Mock::new(StatusCode::SERVICE_UNAVAILABLE, json!({}));
    let endpoint = mock.serve().await;
    let cache = StatCache::new(LeetcodeSource::new(endpoint, "jane").unwrap());

    let err = cache.ensure().await.unwrap_err();
    assert_eq!(err, StatsError::Status { status: 503 });
    assert!(err.to_string().contains("503"));
    assert!(cache.read().is_none());

    let view = View::<LeetcodeModel>::settle(&cache).await;
    assert_eq!(view, View::Error("HTTP error! status: 503".into()));
    assert_eq!(mock.hits(), 2);
}

#[tokio::test]
async fn test_unknown_leetcode_user() {
    let mock = Mock::new(
        StatusCode::OK,
        json!({"data": {"matchedUser": null, "allQuestionsCount": []}}),
    );
    let endpoint = mock.serve().await;
    let cache = StatCache::new(LeetcodeSource::new(endpoint, "nobody").unwrap());

    let err = cache.ensure().await.unwrap_err();
    assert_eq!(err.to_string(), "User not found or invalid response");
}

#[tokio::test]
async fn test_github_fetch() {
    let mock = Mock::new(
        StatusCode::OK,
        json!({"data": {"user": {
            "contributionsCollection": {"contributionCalendar": {
                "totalContributions": 11,
                "weeks": [{"contributionDays": [
                    {"date": "2025-01-01", "contributionCount": 0},
                    {"date": "2025-01-02", "contributionCount": 11}
                ]}]
            }},
            "repositories": {"totalCount": 7}
        }}}),
    );
    let endpoint = mock.serve().await;
    let cache = StatCache::new(GithubSource::new(endpoint, "jane", "secret").unwrap());

    let view = View::<folio_stats::GithubModel>::settle(&cache).await;
    let View::Ready(model) = view else {
        panic!("expected a ready view");
    };
    assert_eq!(model.repo_count, 7);
    assert_eq!(model.weeks[0][1].intensity, Intensity::Max);

    let (headers, request) = mock.seen.lock().unwrap()[0].clone();
    assert_eq!(headers["authorization"], "bearer secret");
    assert_eq!(request["variables"]["login"], "jane");
    assert!(
        request["variables"]["from"]
            .as_str()
            .unwrap()
            .ends_with("-01-01T00:00:00Z")
    );
}

#[tokio::test]
async fn test_github_graphql_errors() {
    let mock = Mock::new(
        StatusCode::OK,
        json!({"data": null, "errors": [{"message": "Bad credentials"}]}),
    );
    let endpoint = mock.serve().await;
    let cache = StatCache::new(GithubSource::new(endpoint, "jane", "bad").unwrap());

    let err = cache.ensure().await.unwrap_err();
    assert!(err.to_string().contains("Bad credentials"));
    assert!(cache.read().is_none());
}

#[tokio::test]
async fn test_settle_until_cancelled_then_ready() {
    let mock = Mock::new(StatusCode::OK, leetcode_body());
    let endpoint = mock.serve().await;
    let cache = StatCache::new(LeetcodeSource::new(endpoint, "jane").unwrap());

    // Giving up at once still leaves the fetch running.
    let view = View::<LeetcodeModel>::settle_until(&cache, async {}).await;
    assert!(view.is_none());

    let view = View::<LeetcodeModel>::settle_until(&cache, std::future::pending()).await;
    let Some(View::Ready(model)) = view else {
        panic!("expected a ready view");
    };
    assert_eq!(model.total_solved, 30);
    assert_eq!(model.tiers[0].percent, "20.0%");
    assert_eq!(mock.hits(), 1);
}
