//! Closed issues from the GitHub REST API.
//!
//! Pages through `GET /repos/{owner}/{repo}/issues?state=closed` until a page
//! comes back shorter than the page size. The issues endpoint also lists pull
//! requests; they are skipped unless explicitly included.

use crate::error::{Result, TrackerError};
use crate::repository::Repository;
use crate::source::IssueSource;
use changelog::{Issue, RawIssue, RawLabel};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const USER_AGENT_VALUE: &str = "autochangelog";

/// GitHub's maximum page size
const MAX_PER_PAGE: u32 = 100;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct GitHubIssue {
    number: Option<u64>,
    title: Option<String>,
    #[serde(default)]
    labels: Vec<RawLabel>,
    html_url: Option<String>,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
    closed_at: Option<DateTime<Utc>>,
}

impl GitHubIssue {
    fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    fn into_raw(self) -> RawIssue {
        RawIssue {
            number: self.number,
            title: self.title,
            labels: Some(self.labels),
            url: self.html_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

pub struct GitHubIssueSource {
    client: Client,
    repository: Repository,
    token: Option<String>,
    api_base: String,
    per_page: u32,
    include_pull_requests: bool,
    closed_since: Option<DateTime<Utc>>,
}

// Keeps the token out of debug output
impl std::fmt::Debug for GitHubIssueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubIssueSource")
            .field("repository", &self.repository)
            .field("has_token", &self.token.is_some())
            .field("api_base", &self.api_base)
            .field("per_page", &self.per_page)
            .field("include_pull_requests", &self.include_pull_requests)
            .field("closed_since", &self.closed_since)
            .finish()
    }
}

impl GitHubIssueSource {
    /// Creates a source for `repository` against the public GitHub API
    ///
    /// # Errors
    /// Returns `Http` if the HTTP client cannot be built
    pub fn new(repository: Repository) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            repository,
            token: None,
            api_base: DEFAULT_API_BASE.to_string(),
            per_page: MAX_PER_PAGE,
            include_pull_requests: false,
            closed_since: None,
        })
    }

    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Points the source at another API root, such as GitHub Enterprise
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    #[must_use]
    pub const fn include_pull_requests(mut self, include: bool) -> Self {
        self.include_pull_requests = include;
        self
    }

    /// Only keep issues closed at or after `since`
    #[must_use]
    pub const fn closed_since(mut self, since: Option<DateTime<Utc>>) -> Self {
        self.closed_since = since;
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert("x-github-api-version", HeaderValue::from_static("2022-11-28"));

        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| TrackerError::AuthFailed("token contains invalid characters".into()))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    fn issues_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/issues",
            self.api_base, self.repository.owner, self.repository.name
        )
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<GitHubIssue>> {
        let mut query = vec![
            ("state", "closed".to_string()),
            ("sort", "created".to_string()),
            ("direction", "asc".to_string()),
            ("per_page", self.per_page.to_string()),
            ("page", page.to_string()),
        ];
        // `since` filters on update time, which is never earlier than close time
        if let Some(since) = self.closed_since {
            query.push(("since", since.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }

        let response = self
            .client
            .get(self.issues_url())
            .headers(self.headers()?)
            .query(&query)
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(&self, response: Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(TrackerError::from)
        } else {
            self.handle_error_response(response, status).await
        }
    }

    async fn handle_error_response<T>(&self, response: Response, status: StatusCode) -> Result<T> {
        let rate_limit_exhausted = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|remaining| remaining.trim() == "0");

        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };

        Err(match status {
            StatusCode::UNAUTHORIZED => TrackerError::AuthFailed(message),
            StatusCode::FORBIDDEN if rate_limit_exhausted => TrackerError::RateLimited,
            StatusCode::TOO_MANY_REQUESTS => TrackerError::RateLimited,
            StatusCode::NOT_FOUND => {
                TrackerError::NotFound(format!("repository {} ({message})", self.repository))
            }
            _ => TrackerError::api(status.as_u16(), message),
        })
    }

    fn keep(&self, issue: &GitHubIssue) -> bool {
        if issue.is_pull_request() && !self.include_pull_requests {
            return false;
        }
        match (self.closed_since, issue.closed_at) {
            (Some(since), Some(closed_at)) => closed_at >= since,
            _ => true,
        }
    }
}

impl IssueSource for GitHubIssueSource {
    fn describe(&self) -> String {
        format!("GitHub repository {}", self.repository)
    }

    async fn fetch_closed_issues(&self) -> Result<Vec<Issue>> {
        let mut issues = Vec::new();
        let mut page = 1;

        loop {
            let batch = self.fetch_page(page).await?;
            let page_len = batch.len();

            for entry in batch {
                if self.keep(&entry) {
                    issues.push(Issue::try_from(entry.into_raw())?);
                }
            }

            if page_len < self.per_page as usize {
                break;
            }
            page += 1;
        }

        Ok(issues)
    }
}
