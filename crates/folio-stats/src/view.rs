//! Presentation models derived from cached snapshots.

use std::future::Future;

use serde::Serialize;

use crate::{
    StatCache, StatSource,
    github::GithubSnapshot,
    leetcode::{LeetcodeSnapshot, percentage},
};

/// What a stats panel should show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "lowercase")]
pub enum View<M> {
    Loading,
    Error(String),
    Ready(M),
}

impl<M> View<M> {
    /// Initial state: ready if the cache is warm, loading otherwise.
    pub fn initial<S>(cache: &StatCache<S>) -> Self
    where
        S: StatSource,
        M: for<'a> From<&'a S::Snapshot>,
    {
        match cache.read() {
            Some(snapshot) => Self::Ready(M::from(snapshot.as_ref())),
            None => Self::Loading,
        }
    }

    /// Settled state after making sure the cache is populated.
    pub async fn settle<S>(cache: &StatCache<S>) -> Self
    where
        S: StatSource,
        M: for<'a> From<&'a S::Snapshot>,
    {
        match cache.ensure().await {
            Ok(snapshot) => Self::Ready(M::from(snapshot.as_ref())),
            Err(e) => Self::Error(e.to_string()),
        }
    }

    /// [`settle`](Self::settle), abandoned when `cancel` completes first.
    pub async fn settle_until<S, F>(cache: &StatCache<S>, cancel: F) -> Option<Self>
    where
        S: StatSource,
        M: for<'a> From<&'a S::Snapshot>,
        F: Future<Output = ()>,
    {
        cache.ensure_until(cancel).await.map(|result| match result {
            Ok(snapshot) => Self::Ready(M::from(snapshot.as_ref())),
            Err(e) => Self::Error(e.to_string()),
        })
    }
}

/// Contribution heat level of a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    None,
    Low,
    Medium,
    High,
    Max,
}

impl Intensity {
    pub fn for_count(count: u32) -> Self {
        match count {
            0 => Self::None,
            1 => Self::Low,
            2..=4 => Self::Medium,
            5..=9 => Self::High,
            _ => Self::Max,
        }
    }

    /// Cell fill color.
    pub fn color(self) -> &'static str {
        match self {
            Self::None => "#3a3a3c",
            Self::Low => "#9a3412",
            Self::Medium => "#c2410c",
            Self::High => "#ea580c",
            Self::Max => "#f97316",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub date: String,
    pub count: u32,
    pub intensity: Intensity,
    pub color: &'static str,
    /// Hover text, e.g. `"2025-01-03: 4 contributions"`.
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GithubModel {
    pub repo_count: u32,
    pub total_contributions: u32,
    pub weeks: Vec<Vec<DayCell>>,
}

impl From<&GithubSnapshot> for GithubModel {
    fn from(snapshot: &GithubSnapshot) -> Self {
        let weeks = snapshot
            .contributions
            .iter()
            .map(|week| {
                week.iter()
                    .map(|day| {
                        let intensity = Intensity::for_count(day.contribution_count);
                        DayCell {
                            date: day.date.clone(),
                            count: day.contribution_count,
                            intensity,
                            color: intensity.color(),
                            title: format!("{}: {} contributions", day.date, day.contribution_count),
                        }
                    })
                    .collect()
            })
            .collect();

        Self {
            repo_count: snapshot.repo_count,
            total_contributions: snapshot.total_contributions,
            weeks,
        }
    }
}

/// One difficulty row of the LeetCode panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tier {
    pub name: &'static str,
    pub solved: u32,
    pub total: u32,
    pub percent: String,
    /// Progress bar fill, clamped to 0..=100.
    pub fill: f64,
}

impl Tier {
    fn new(name: &'static str, solved: u32, total: u32) -> Self {
        let fill = if total == 0 {
            0.0
        } else {
            (f64::from(solved) / f64::from(total) * 100.0).min(100.0)
        };
        Self {
            name,
            solved,
            total,
            percent: percentage(solved, total),
            fill,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeetcodeModel {
    pub total_solved: u32,
    pub acceptance_rate: String,
    /// Ranking with thousands separators, e.g. `"#12,345"`.
    pub ranking: Option<String>,
    pub tiers: [Tier; 3],
}

impl From<&LeetcodeSnapshot> for LeetcodeModel {
    fn from(s: &LeetcodeSnapshot) -> Self {
        Self {
            total_solved: s.total_solved,
            acceptance_rate: s.acceptance_rate.clone(),
            ranking: s.ranking.map(|r| format!("#{}", group_thousands(r))),
            tiers: [
                Tier::new("Easy", s.easy_solved, s.easy_total),
                Tier::new("Medium", s.medium_solved, s.medium_total),
                Tier::new("Hard", s.hard_solved, s.hard_total),
            ],
        }
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::ContributionDay;

    #[test]
    fn test_intensity_levels() {
        let levels: Vec<_> = [0, 1, 2, 4, 5, 9, 10, 50]
            .into_iter()
            .map(Intensity::for_count)
            .collect();
        assert_eq!(
            levels,
            vec![
                Intensity::None,
                Intensity::Low,
                Intensity::Medium,
                Intensity::Medium,
                Intensity::High,
                Intensity::High,
                Intensity::Max,
                Intensity::Max,
            ]
        );
        assert_eq!(Intensity::None.color(), "#3a3a3c");
        assert_eq!(Intensity::Max.color(), "#f97316");
    }

    #[test]
    fn test_github_model() {
        let model = GithubModel::from(&GithubSnapshot {
            contributions: vec![vec![ContributionDay {
                date: "2025-01-03".into(),
                contribution_count: 4,
            }]],
            total_contributions: 4,
            repo_count: 9,
        });

        let cell = &model.weeks[0][0];
        assert_eq!(cell.intensity, Intensity::Medium);
        assert_eq!(cell.title, "2025-01-03: 4 contributions");
        assert_eq!(model.repo_count, 9);
    }

    #[test]
    fn test_leetcode_model() {
        let model = LeetcodeModel::from(&LeetcodeSnapshot {
            total_solved: 3,
            easy_solved: 2,
            medium_solved: 1,
            hard_solved: 0,
            total_problems: 10,
            easy_total: 4,
            medium_total: 6,
            hard_total: 0,
            acceptance_rate: "30.0%".into(),
            ranking: Some(1_234_567),
        });

        assert_eq!(model.ranking.as_deref(), Some("#1,234,567"));
        assert_eq!(model.tiers[0].percent, "50.0%");
        assert_eq!(model.tiers[1].percent, "16.7%");
        assert_eq!(model.tiers[2].percent, "0%");
        assert_eq!(model.tiers[2].fill, 0.0);
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(123_456), "123,456");
    }
}
