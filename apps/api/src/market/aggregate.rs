//! Market aggregator — per-skill job-market snapshots from the search API.
//!
//! Sequential: one national query per skill plus one per requested city. The
//! API is treated as possibly-missing data, not a hard dependency: a failed
//! query yields zero counts and empty summaries for that slice, marks the
//! snapshot partial, and never aborts the rest of the batch.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::market::client::{JobPosting, JobSearch, SearchPage, SearchQuery};

/// Well-known technology terms scanned against posting descriptions for the
/// trending ranking. Substring scan over the lower-cased description, one
/// increment per posting per term.
const TRENDING_TERMS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "react",
    "aws",
    "azure",
    "docker",
    "kubernetes",
    "sql",
    "nosql",
    "machine learning",
    "ai",
];

/// Knobs the duplicated front-end revisions used to disagree on, collapsed
/// into one place with the baseline defaults.
#[derive(Debug, Clone)]
pub struct AggregatorOptions {
    pub top_companies: usize,
    pub trending_limit: usize,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            top_companies: 5,
            trending_limit: 10,
        }
    }
}

/// Salary statistics over postings that disclosed both bounds. `min`/`max`
/// come from the raw salary fields; `mean`/`median`/`p25`/`p75` from
/// per-posting averages. Absent entirely when no posting carried salary data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalarySummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub p25: f64,
    pub p75: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInsight {
    pub name: String,
    pub job_count: u32,
    /// Average over disclosed `salary_max` values; absent when none disclosed.
    pub avg_salary: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingSkill {
    pub skill: String,
    pub mentions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityJobCount {
    pub city: String,
    pub job_count: u64,
}

/// Everything the report shows for one skill. Recomputed per request; never
/// cached across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub skill: String,
    pub total_jobs: u64,
    pub salary: Option<SalarySummary>,
    pub top_companies: Vec<CompanyInsight>,
    pub trending: Vec<TrendingSkill>,
    pub by_city: Vec<CityJobCount>,
    /// True when at least one API query for this skill failed and the
    /// corresponding slice is zeroed rather than real.
    pub partial: bool,
}

pub struct MarketAggregator {
    api: Arc<dyn JobSearch>,
    options: AggregatorOptions,
}

impl MarketAggregator {
    pub fn new(api: Arc<dyn JobSearch>, options: AggregatorOptions) -> Self {
        Self { api, options }
    }

    /// Builds one snapshot per skill, in input order, querying the API
    /// sequentially. Never returns an error: failures degrade per slice.
    pub async fn analyze(&self, skills: &[String], cities: &[String]) -> Vec<MarketSnapshot> {
        let mut snapshots = Vec::with_capacity(skills.len());
        for skill in skills {
            snapshots.push(self.snapshot_for(skill, cities).await);
        }
        snapshots
    }

    async fn snapshot_for(&self, skill: &str, cities: &[String]) -> MarketSnapshot {
        let mut partial = false;

        let national = match self.api.search(&SearchQuery::national(skill)).await {
            Ok(page) => page,
            Err(e) => {
                warn!("National job search failed for {skill:?}: {e}");
                partial = true;
                SearchPage::default()
            }
        };

        let mut by_city = Vec::with_capacity(cities.len());
        for city in cities {
            let job_count = match self.api.search(&SearchQuery::in_city(skill, city)).await {
                Ok(page) => page.count,
                Err(e) => {
                    warn!("City job search failed for {skill:?} in {city:?}: {e}");
                    partial = true;
                    0
                }
            };
            by_city.push(CityJobCount {
                city: city.clone(),
                job_count,
            });
        }

        MarketSnapshot {
            skill: skill.to_string(),
            total_jobs: national.count,
            salary: salary_summary(&national.results),
            top_companies: top_companies(&national.results, self.options.top_companies),
            trending: trending_skills(&national.results, self.options.trending_limit),
            by_city,
            partial,
        }
    }
}

/// Salary summary over postings disclosing both bounds, or `None` when there
/// are none — never a synthetic zero summary.
pub fn salary_summary(postings: &[JobPosting]) -> Option<SalarySummary> {
    let mut averages: Vec<f64> = Vec::new();
    let mut raw_min = f64::INFINITY;
    let mut raw_max = f64::NEG_INFINITY;

    for posting in postings {
        if let (Some(min), Some(max), Some(avg)) =
            (posting.salary_min, posting.salary_max, posting.salary_average())
        {
            averages.push(avg);
            raw_min = raw_min.min(min);
            raw_max = raw_max.max(max);
        }
    }

    if averages.is_empty() {
        return None;
    }

    averages.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mean = averages.iter().sum::<f64>() / averages.len() as f64;

    Some(SalarySummary {
        min: raw_min,
        max: raw_max,
        mean,
        median: percentile(&averages, 0.5),
        p25: percentile(&averages, 0.25),
        p75: percentile(&averages, 0.75),
    })
}

/// Linear-interpolation percentile over a sorted slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let frac = pos - lower as f64;
    if lower + 1 >= sorted.len() {
        return sorted[sorted.len() - 1];
    }
    sorted[lower] + frac * (sorted[lower + 1] - sorted[lower])
}

/// Top-N companies by posting count. Ties keep first-observed order (stable
/// sort over the accumulation order).
pub fn top_companies(postings: &[JobPosting], limit: usize) -> Vec<CompanyInsight> {
    struct Acc {
        name: String,
        count: u32,
        salaries: Vec<f64>,
    }

    let mut companies: Vec<Acc> = Vec::new();
    for posting in postings {
        let name = posting.company_name();
        match companies.iter_mut().find(|c| c.name == name) {
            Some(acc) => {
                acc.count += 1;
                if let Some(max) = posting.salary_max {
                    acc.salaries.push(max);
                }
            }
            None => companies.push(Acc {
                name: name.to_string(),
                count: 1,
                salaries: posting.salary_max.into_iter().collect(),
            }),
        }
    }

    companies.sort_by(|a, b| b.count.cmp(&a.count));
    companies
        .into_iter()
        .take(limit)
        .map(|acc| CompanyInsight {
            avg_salary: if acc.salaries.is_empty() {
                None
            } else {
                Some(acc.salaries.iter().sum::<f64>() / acc.salaries.len() as f64)
            },
            name: acc.name,
            job_count: acc.count,
        })
        .collect()
}

/// Top-N co-mentioned technology terms across posting descriptions. Ties keep
/// the order in which a term was first observed in the response stream.
pub fn trending_skills(postings: &[JobPosting], limit: usize) -> Vec<TrendingSkill> {
    let mut mentions: Vec<TrendingSkill> = Vec::new();

    for posting in postings {
        let Some(description) = posting.description.as_deref() else {
            continue;
        };
        let description = description.to_lowercase();
        for term in TRENDING_TERMS {
            if description.contains(term) {
                match mentions.iter_mut().find(|m| m.skill == *term) {
                    Some(m) => m.mentions += 1,
                    None => mentions.push(TrendingSkill {
                        skill: term.to_string(),
                        mentions: 1,
                    }),
                }
            }
        }
    }

    mentions.sort_by(|a, b| b.mentions.cmp(&a.mentions));
    mentions.truncate(limit);
    mentions
}
