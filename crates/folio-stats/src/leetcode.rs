//! LeetCode solve counts via the public GraphQL endpoint.

use folio_core::config::LeetcodeConfig;
use reqwest::{Client, header::REFERER};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::{Result, StatSource, StatsError, http_client};

const PROFILE_QUERY: &str = r#"
query getUserProfile($username: String!) {
    matchedUser(username: $username) {
        username
        profile {
            ranking
        }
        submitStatsGlobal {
            acSubmissionNum {
                difficulty
                count
            }
        }
    }
    allQuestionsCount {
        difficulty
        count
    }
}
"#;

const LEETCODE_ORIGIN: &str = "https://leetcode.com";

/// Solve counts per difficulty tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeetcodeSnapshot {
    pub total_solved: u32,
    pub easy_solved: u32,
    pub medium_solved: u32,
    pub hard_solved: u32,
    pub total_problems: u32,
    pub easy_total: u32,
    pub medium_total: u32,
    pub hard_total: u32,
    /// Share of all problems solved, e.g. `"12.5%"`.
    pub acceptance_rate: String,
    pub ranking: Option<u64>,
}

/// `part / total` as a percentage with one decimal, `"0%"` for an empty total.
pub fn percentage(part: u32, total: u32) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", f64::from(part) / f64::from(total) * 100.0)
}

/// Fetches [`LeetcodeSnapshot`]s for a single profile.
#[derive(Debug, Clone)]
pub struct LeetcodeSource {
    client: Client,
    endpoint: String,
    username: String,
}

impl LeetcodeSource {
    pub fn new(endpoint: impl Into<String>, username: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            endpoint: endpoint.into(),
            username: username.into(),
        })
    }

    pub fn from_config(config: &LeetcodeConfig) -> Result<Self> {
        Self::new(&config.endpoint, &config.username)
    }
}

impl StatSource for LeetcodeSource {
    type Snapshot = LeetcodeSnapshot;
    const NAME: &'static str = "leetcode";

    async fn fetch(&self) -> Result<LeetcodeSnapshot> {
        debug!(user = %self.username, "querying LeetCode profile");

        let response = self
            .client
            .post(&self.endpoint)
            .header(REFERER, LEETCODE_ORIGIN)
            .json(&json!({
                "query": PROFILE_QUERY,
                "variables": { "username": self.username },
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatsError::Status {
                status: status.as_u16(),
            });
        }

        let body: GraphqlResponse = response.json().await?;
        body.into_snapshot()
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<ResponseData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    matched_user: Option<MatchedUser>,
    #[serde(default)]
    all_questions_count: Vec<DifficultyCount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchedUser {
    profile: Option<Profile>,
    submit_stats_global: SubmitStats,
}

#[derive(Debug, Deserialize)]
struct Profile {
    ranking: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitStats {
    ac_submission_num: Vec<DifficultyCount>,
}

#[derive(Debug, Deserialize)]
struct DifficultyCount {
    difficulty: String,
    count: u32,
}

/// Easy, medium and hard counts; other rows (such as "All") are ignored.
fn tiers(counts: &[DifficultyCount]) -> [u32; 3] {
    let mut tiers = [0; 3];
    for row in counts {
        match row.difficulty.as_str() {
            "Easy" => tiers[0] = row.count,
            "Medium" => tiers[1] = row.count,
            "Hard" => tiers[2] = row.count,
            _ => {}
        }
    }
    tiers
}

impl GraphqlResponse {
    fn into_snapshot(self) -> Result<LeetcodeSnapshot> {
        let data = self.data.ok_or(StatsError::UserNotFound)?;
        let user = data.matched_user.ok_or(StatsError::UserNotFound)?;

        let [easy_solved, medium_solved, hard_solved] =
            tiers(&user.submit_stats_global.ac_submission_num);
        let [easy_total, medium_total, hard_total] = tiers(&data.all_questions_count);

        let total_solved = easy_solved + medium_solved + hard_solved;
        let total_problems = easy_total + medium_total + hard_total;

        Ok(LeetcodeSnapshot {
            total_solved,
            easy_solved,
            medium_solved,
            hard_solved,
            total_problems,
            easy_total,
            medium_total,
            hard_total,
            acceptance_rate: percentage(total_solved, total_problems),
            // A zero ranking means unranked.
            ranking: user.profile.and_then(|p| p.ranking).filter(|r| *r > 0),
        })
    }
}
