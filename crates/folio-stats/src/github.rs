//! GitHub contribution activity via the GraphQL API.

use chrono::{Datelike, Utc};
use folio_core::config::GithubConfig;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderValue},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::{Result, StatSource, StatsError, http_client};

const CONTRIBUTIONS_QUERY: &str = r#"
query ($login: String!, $from: DateTime!) {
    user(login: $login) {
        contributionsCollection(from: $from) {
            contributionCalendar {
                totalContributions
                weeks {
                    contributionDays {
                        date
                        contributionCount
                    }
                }
            }
        }
        repositories(privacy: PUBLIC, first: 100) {
            totalCount
        }
    }
}
"#;

/// One day of the contribution calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionDay {
    pub date: String,
    pub contribution_count: u32,
}

/// Year-to-date activity for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubSnapshot {
    /// Calendar weeks, each a run of days.
    pub contributions: Vec<Vec<ContributionDay>>,
    pub total_contributions: u32,
    pub repo_count: u32,
}

/// Fetches [`GithubSnapshot`]s for a single user.
#[derive(Debug, Clone)]
pub struct GithubSource {
    client: Client,
    endpoint: String,
    username: String,
    auth: HeaderValue,
}

impl GithubSource {
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        token: &str,
    ) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("bearer {token}"))
            .map_err(|_| StatsError::Request("token is not a valid header value".into()))?;
        auth.set_sensitive(true);

        Ok(Self {
            client: http_client()?,
            endpoint: endpoint.into(),
            username: username.into(),
            auth,
        })
    }

    /// Build from configuration, reading the token from the environment.
    ///
    /// Fails with [`StatsError::MissingToken`] when no token is set.
    pub fn from_config(config: &GithubConfig) -> Result<Self> {
        let token = config.token().ok_or(StatsError::MissingToken)?;
        Self::new(&config.endpoint, &config.username, &token)
    }
}

impl StatSource for GithubSource {
    type Snapshot = GithubSnapshot;
    const NAME: &'static str = "github";

    async fn fetch(&self) -> Result<GithubSnapshot> {
        let from = format!("{}-01-01T00:00:00Z", Utc::now().year());
        debug!(user = %self.username, %from, "querying GitHub contributions");

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, self.auth.clone())
            .json(&json!({
                "query": CONTRIBUTIONS_QUERY,
                "variables": { "login": self.username, "from": from },
            }))
            .send()
            .await?
            .error_for_status()?;

        let body: GraphqlResponse = response.json().await?;
        body.into_snapshot()
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<ResponseData>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    user: Option<User>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct User {
    contributions_collection: ContributionsCollection,
    repositories: Repositories,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionsCollection {
    contribution_calendar: ContributionCalendar,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionCalendar {
    total_contributions: u32,
    weeks: Vec<Week>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Week {
    contribution_days: Vec<ContributionDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Repositories {
    total_count: u32,
}

impl GraphqlResponse {
    fn into_snapshot(self) -> Result<GithubSnapshot> {
        if let Some(errors) = self.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
            return Err(StatsError::Api(messages.join("; ")));
        }

        let user = self
            .data
            .and_then(|d| d.user)
            .ok_or(StatsError::UserNotFound)?;
        let calendar = user.contributions_collection.contribution_calendar;

        Ok(GithubSnapshot {
            contributions: calendar
                .weeks
                .into_iter()
                .map(|w| w.contribution_days)
                .collect(),
            total_contributions: calendar.total_contributions,
            repo_count: user.repositories.total_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<GithubSnapshot> {
        serde_json::from_str::<GraphqlResponse>(body)
            .unwrap()
            .into_snapshot()
    }

    #[test]
    fn test_parse_calendar() {
        let snapshot = parse(
            r#"{"data":{"user":{
                "contributionsCollection":{"contributionCalendar":{
                    "totalContributions":5,
                    "weeks":[
                        {"contributionDays":[{"date":"2025-01-01","contributionCount":2}]},
                        {"contributionDays":[{"date":"2025-01-08","contributionCount":3},
                                             {"date":"2025-01-09","contributionCount":0}]}
                    ]}},
                "repositories":{"totalCount":12}}}}"#,
        )
        .unwrap();

        assert_eq!(snapshot.total_contributions, 5);
        assert_eq!(snapshot.repo_count, 12);
        assert_eq!(snapshot.contributions.len(), 2);
        assert_eq!(snapshot.contributions[1][0].contribution_count, 3);
    }

    #[test]
    fn test_graphql_errors_fail() {
        let err = parse(r#"{"data":null,"errors":[{"message":"Bad credentials"}]}"#).unwrap_err();
        assert_eq!(err, StatsError::Api("Bad credentials".into()));
    }

    #[test]
    fn test_missing_user() {
        let err = parse(r#"{"data":{"user":null}}"#).unwrap_err();
        assert_eq!(err, StatsError::UserNotFound);
    }

    #[test]
    fn test_snapshot_json_is_camel_case() {
        let snapshot = GithubSnapshot {
            contributions: vec![vec![ContributionDay {
                date: "2025-02-01".into(),
                contribution_count: 1,
            }]],
            total_contributions: 1,
            repo_count: 2,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["repoCount"], 2);
        assert_eq!(json["contributions"][0][0]["contributionCount"], 1);
    }
}
