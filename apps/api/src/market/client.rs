//! Adzuna client — the single point of entry for all job-search API calls.
//!
//! No other module talks to the job market directly; the aggregator depends on
//! the [`JobSearch`] trait so tests can substitute canned responses. The client
//! performs no caching and no retries: a failed query surfaces as a
//! [`MarketError`] that the aggregator absorbs per slice.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const RESULTS_PER_PAGE: u32 = 20;

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// One free-text job search, optionally narrowed to a city.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub what: String,
    pub city: Option<String>,
    pub page: u32,
}

impl SearchQuery {
    pub fn national(what: &str) -> Self {
        Self {
            what: what.to_string(),
            city: None,
            page: 1,
        }
    }

    pub fn in_city(what: &str, city: &str) -> Self {
        Self {
            what: what.to_string(),
            city: Some(city.to_string()),
            page: 1,
        }
    }
}

/// One page of search results as the API reports them. `count` is the API's
/// total across all pages, not the length of `results`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub results: Vec<JobPosting>,
}

/// A single posting record. Salary fields, company, and description are all
/// optional in the wire format; absence means the posting did not disclose.
#[derive(Debug, Clone, Deserialize)]
pub struct JobPosting {
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub company: Option<Company>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Company {
    pub display_name: Option<String>,
}

impl JobPosting {
    /// Per-posting salary average, present only when both bounds are disclosed.
    pub fn salary_average(&self) -> Option<f64> {
        match (self.salary_min, self.salary_max) {
            (Some(min), Some(max)) => Some((min + max) / 2.0),
            _ => None,
        }
    }

    pub fn company_name(&self) -> &str {
        self.company
            .as_ref()
            .and_then(|c| c.display_name.as_deref())
            .unwrap_or("Unknown")
    }
}

/// The job-search seam. Carried in `AppState` as `Arc<dyn JobSearch>`.
#[async_trait]
pub trait JobSearch: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, MarketError>;
}

/// Reqwest-backed Adzuna client.
#[derive(Clone)]
pub struct AdzunaClient {
    client: Client,
    base_url: String,
    country: String,
    app_id: String,
    app_key: String,
}

impl AdzunaClient {
    pub fn new(base_url: String, country: String, app_id: String, app_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
            country,
            app_id,
            app_key,
        }
    }

    fn search_url(&self, page: u32) -> String {
        format!("{}/jobs/{}/search/{}", self.base_url, self.country, page)
    }
}

#[async_trait]
impl JobSearch for AdzunaClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, MarketError> {
        let mut params: Vec<(&str, String)> = vec![
            ("app_id", self.app_id.clone()),
            ("app_key", self.app_key.clone()),
            ("what", query.what.clone()),
            ("results_per_page", RESULTS_PER_PAGE.to_string()),
            ("content-type", "application/json".to_string()),
        ];
        if let Some(city) = &query.city {
            params.push(("where", city.clone()));
        }

        debug!("Searching jobs: what={:?} city={:?}", query.what, query.city);

        let response = self
            .client
            .get(self.search_url(query.page))
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MarketError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<SearchPage>().await?)
    }
}
