//! HTTP server: stats endpoints plus the built site.

use std::{path::Path, time::Duration};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderValue, StatusCode, header::CACHE_CONTROL},
    response::{IntoResponse, Response},
    routing::get,
};
use folio_core::Config;
use folio_stats::{
    GithubModel, GithubSource, LeetcodeModel, LeetcodeSource, StatCache, StatSource, StatsError,
    View,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Caching policy advertised for LeetCode responses.
pub const LEETCODE_CACHE_CONTROL: &str = "public, s-maxage=300, stale-while-revalidate=600";

/// Longest a panel request waits for a cold cache before answering `loading`.
pub const PANEL_WAIT: Duration = Duration::from_secs(10);

/// Stats caches shared by every request.
#[derive(Clone, Debug)]
pub struct AppState {
    /// `None` when no GitHub token is configured.
    pub github: Option<StatCache<GithubSource>>,
    pub leetcode: StatCache<LeetcodeSource>,
}

impl AppState {
    /// Create caches for the sources named in `config`.
    pub fn from_config(config: &Config) -> Result<Self, StatsError> {
        let github = match GithubSource::from_config(&config.stats.github) {
            Ok(source) => Some(StatCache::new(source)),
            Err(StatsError::MissingToken) => {
                tracing::warn!(
                    env = %config.stats.github.token_env,
                    "GitHub token not set, /api/github-stats will fail"
                );
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            github,
            leetcode: StatCache::new(LeetcodeSource::from_config(&config.stats.leetcode)?),
        })
    }
}

/// Create the server router.
pub fn create_router(output_dir: &Path, state: AppState) -> Router {
    Router::new()
        .route(
            "/api/github-stats",
            get(github_stats).fallback(method_not_allowed),
        )
        .route(
            "/api/leetcode-stats",
            get(leetcode_stats).fallback(method_not_allowed),
        )
        .route(
            "/api/github-panel",
            get(github_panel).fallback(method_not_allowed),
        )
        .route(
            "/api/leetcode-panel",
            get(leetcode_panel).fallback(method_not_allowed),
        )
        .fallback_service(ServeDir::new(output_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn github_stats(State(state): State<AppState>) -> Response {
    match &state.github {
        Some(cache) => snapshot_response(cache).await,
        None => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &StatsError::MissingToken.to_string(),
        ),
    }
}

async fn leetcode_stats(State(state): State<AppState>) -> Response {
    let mut response = snapshot_response(&state.leetcode).await;
    if response.status().is_success() {
        response.headers_mut().insert(
            CACHE_CONTROL,
            HeaderValue::from_static(LEETCODE_CACHE_CONTROL),
        );
    }
    response
}

/// Query string of the panel endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PanelQuery {
    /// Milliseconds to wait for a cold cache; `0` only reports the current
    /// state without fetching. Capped at [`PANEL_WAIT`].
    wait_ms: Option<u64>,
}

async fn github_panel(
    State(state): State<AppState>,
    Query(query): Query<PanelQuery>,
) -> Json<View<GithubModel>> {
    let view = match &state.github {
        Some(cache) => panel(cache, &query).await,
        None => View::Error(StatsError::MissingToken.to_string()),
    };
    Json(view)
}

async fn leetcode_panel(
    State(state): State<AppState>,
    Query(query): Query<PanelQuery>,
) -> Json<View<LeetcodeModel>> {
    Json(panel(&state.leetcode, &query).await)
}

/// Panel state for `cache`, waiting at most the requested time for a fetch.
async fn panel<S, M>(cache: &StatCache<S>, query: &PanelQuery) -> View<M>
where
    S: StatSource,
    M: for<'a> From<&'a S::Snapshot>,
{
    match query.wait_ms {
        Some(0) => View::initial(cache),
        wait => {
            let wait = wait.map_or(PANEL_WAIT, Duration::from_millis).min(PANEL_WAIT);
            View::settle_until(cache, tokio::time::sleep(wait))
                .await
                .unwrap_or(View::Loading)
        }
    }
}

async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

/// The cached snapshot as JSON, fetching it on first use.
///
/// A dropped request stops waiting; the fetch still completes and fills the cache.
async fn snapshot_response<S: StatSource>(cache: &StatCache<S>) -> Response {
    match cache.ensure().await {
        Ok(snapshot) => Json(snapshot.as_ref()).into_response(),
        Err(e) => error_response(StatusCode::BAD_GATEWAY, &e.to_string()),
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request},
        routing::post,
    };
    use serde_json::Value;
    use tempfile::TempDir;
    use tokio::net::TcpListener;
    use tower::ServiceExt;

    use super::*;

    /// Stand-in GraphQL endpoint answering every request with `status` and `body`.
    async fn mock_api(status: StatusCode, body: Value) -> String {
        let app = Router::new().route(
            "/graphql",
            post(move || {
                let body = body.clone();
                async move { (status, Json(body)) }
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}/graphql")
    }

    fn state(leetcode_endpoint: &str) -> AppState {
        AppState {
            github: None,
            leetcode: StatCache::new(LeetcodeSource::new(leetcode_endpoint, "jane").unwrap()),
        }
    }

    async fn call(app: Router, method: Method, uri: &str) -> (StatusCode, Response) {
        let response = app
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        (response.status(), response)
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_non_get_is_rejected() {
        let dir = TempDir::new().unwrap();
        let app = create_router(dir.path(), state("http://127.0.0.1:9/graphql"));

        for uri in [
            "/api/github-stats",
            "/api/leetcode-stats",
            "/api/github-panel",
            "/api/leetcode-panel",
        ] {
            let (status, response) = call(app.clone(), Method::POST, uri).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(json_body(response).await, json!({"error": "Method not allowed"}));
        }
    }

    #[tokio::test]
    async fn test_missing_github_token() {
        let dir = TempDir::new().unwrap();
        let app = create_router(dir.path(), state("http://127.0.0.1:9/graphql"));

        let (status, response) = call(app, Method::GET, "/api/github-stats").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({"error": "GitHub token not configured"})
        );
    }

    #[tokio::test]
    async fn test_leetcode_success_sets_cache_control() {
        let endpoint = mock_api(
            StatusCode::OK,
            json!({"data": {
                "matchedUser": {"profile": {"ranking": 10},
                    "submitStatsGlobal": {"acSubmissionNum": [{"difficulty": "Easy", "count": 1}]}},
                "allQuestionsCount": [{"difficulty": "Easy", "count": 4}]
            }}),
        )
        .await;
        let dir = TempDir::new().unwrap();
        let app = create_router(dir.path(), state(&endpoint));

        let (status, response) = call(app, Method::GET, "/api/leetcode-stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.headers()[CACHE_CONTROL], LEETCODE_CACHE_CONTROL);

        let body = json_body(response).await;
        assert_eq!(body["easySolved"], 1);
        assert_eq!(body["acceptanceRate"], "25.0%");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let endpoint = mock_api(StatusCode::SERVICE_UNAVAILABLE, json!({})).await;
        let dir = TempDir::new().unwrap();
        let state = state(&endpoint);
        let app = create_router(dir.path(), state.clone());

        let (status, response) = call(app, Method::GET, "/api/leetcode-stats").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(response.headers().get(CACHE_CONTROL).is_none());
        assert_eq!(
            json_body(response).await,
            json!({"error": "HTTP error! status: 503"})
        );
        assert!(state.leetcode.read().is_none());
    }

    #[tokio::test]
    async fn test_panel_peek_does_not_fetch() {
        let dir = TempDir::new().unwrap();
        let state = state("http://127.0.0.1:9/graphql");
        let app = create_router(dir.path(), state.clone());

        let (status, response) = call(app, Method::GET, "/api/leetcode-panel?wait_ms=0").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"state": "loading"}));
        assert!(!state.leetcode.is_fetching());
    }

    #[tokio::test]
    async fn test_panel_ready_after_fetch() {
        let endpoint = mock_api(
            StatusCode::OK,
            json!({"data": {
                "matchedUser": {"profile": {"ranking": 12345},
                    "submitStatsGlobal": {"acSubmissionNum": [{"difficulty": "Hard", "count": 1}]}},
                "allQuestionsCount": [{"difficulty": "Hard", "count": 3}]
            }}),
        )
        .await;
        let dir = TempDir::new().unwrap();
        let app = create_router(dir.path(), state(&endpoint));

        let (status, response) = call(app, Method::GET, "/api/leetcode-panel").await;
        assert_eq!(status, StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["state"], "ready");
        assert_eq!(body["data"]["ranking"], "#12,345");
        assert_eq!(body["data"]["tiers"][2]["percent"], "33.3%");
    }

    #[tokio::test]
    async fn test_panel_reports_errors_in_view() {
        let endpoint = mock_api(StatusCode::SERVICE_UNAVAILABLE, json!({})).await;
        let dir = TempDir::new().unwrap();
        let app = create_router(dir.path(), state(&endpoint));

        let (status, response) = call(app.clone(), Method::GET, "/api/leetcode-panel").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"state": "error", "data": "HTTP error! status: 503"})
        );

        let (_, response) = call(app, Method::GET, "/api/github-panel").await;
        assert_eq!(
            json_body(response).await,
            json!({"state": "error", "data": "GitHub token not configured"})
        );
    }

    #[tokio::test]
    async fn test_static_files_served() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("projects")).unwrap();
        fs::write(dir.path().join("projects/index.html"), "<h1>Projects</h1>").unwrap();
        let app = create_router(dir.path(), state("http://127.0.0.1:9/graphql"));

        let (status, response) = call(app, Method::GET, "/projects/index.html").await;
        assert_eq!(status, StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<h1>Projects</h1>");
    }
}
