use super::graphql::{
    ASSIGNABLE_USERS_QUERY, COUNT_QUERY, CountData, CountVariables, RepositoryData, RepositoryVariables, Request, Response,
    SEARCH_QUERY, SearchData, SearchNode, SearchVariables,
};
use super::{LOG_TARGET, SEARCH_RESULT_CAP};
use crate::Result;
use crate::data::Issue;
use crate::port::SearchPort;
use crate::query::QueryPredicate;
use crate::throttler::Throttler;
use chrono::{DateTime, Utc};
use core::time::Duration;
use ohno::{IntoAppError, app_err, bail};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use std::collections::BTreeMap;
use std::sync::Arc;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Attempts per request, counting the first one, before a rate limit is reported as an error.
const MAX_ATTEMPTS: u32 = 5;

/// Pause applied when GitHub signals a rate limit without saying when it resets.
const DEFAULT_RATE_LIMIT_PAUSE: Duration = Duration::from_secs(60);

/// Longest error body excerpt included in error messages.
const MAX_BODY_EXCERPT: usize = 200;

/// GitHub GraphQL client implementing [`SearchPort`].
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    endpoint: String,
    throttler: Arc<Throttler>,
}

impl GitHubClient {
    /// Creates a client authenticating with `token` against the GraphQL `endpoint`.
    ///
    /// At most `max_concurrent` requests are in flight at any time.
    pub fn new(token: &str, endpoint: impl Into<String>, max_concurrent: usize) -> Result<Self> {
        let mut auth_val = HeaderValue::from_str(&format!("Bearer {token}"))?;
        auth_val.set_sensitive(true);

        let mut headers = HeaderMap::new();
        let _ = headers.insert(AUTHORIZATION, auth_val);

        let client = reqwest::Client::builder()
            .user_agent(concat!("issue-scorecard/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            throttler: Throttler::new(max_concurrent),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Lists the logins of every user who can be assigned issues in `org/name`.
    pub async fn assignable_users(&self, org: &str, name: &str) -> Result<Vec<String>> {
        let description = format!("assignable users query for '{org}/{name}'");
        let mut logins = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let variables = RepositoryVariables {
                owner: org,
                name,
                after: cursor.as_deref(),
            };

            let data: RepositoryData = self.execute(&description, ASSIGNABLE_USERS_QUERY, variables).await?;
            let Some(repository) = data.repository else {
                bail!("repository '{org}/{name}' was not found");
            };

            let users = repository.assignable_users;
            logins.extend(users.nodes.into_iter().flatten().map(|actor| actor.login));

            match next_cursor(users.page_info.has_next_page, users.page_info.end_cursor, &description)? {
                Some(next) => cursor = Some(next),
                None => return Ok(logins),
            }
        }
    }

    /// Posts one GraphQL query, pausing and retrying while GitHub reports a rate limit.
    async fn execute<V, T>(&self, description: &str, query: &str, variables: V) -> Result<T>
    where
        V: Serialize + Send + Sync,
        T: DeserializeOwned,
    {
        let body = Request { query, variables };
        let mut attempt = 0;

        loop {
            attempt += 1;

            let permit = self.throttler.acquire().await?;
            log::debug!(target: LOG_TARGET, "Sending {description} (attempt {attempt})");

            let response = self
                .client
                .post(&self.endpoint)
                .json(&body)
                .send()
                .await
                .into_app_err_with(|| format!("sending {description}"))?;

            let status = response.status();
            let headers = response.headers().clone();
            let text = response
                .text()
                .await
                .into_app_err_with(|| format!("reading the response to {description}"))?;
            drop(permit);

            if let Some(pause) = rate_limit_pause(status, &headers, &text, Utc::now()) {
                if attempt >= MAX_ATTEMPTS {
                    bail!("GitHub rate limit still in effect after {attempt} attempts of {description}");
                }

                if self.throttler.pause_for(pause) {
                    log::warn!(
                        target: LOG_TARGET,
                        "Hit the GitHub rate limit, pausing requests for {}s",
                        pause.as_secs()
                    );
                }

                continue;
            }

            if !status.is_success() {
                bail!("{description} failed with HTTP status {status}: {}", excerpt(&text));
            }

            let response: Response<T> =
                serde_json::from_str(&text).into_app_err_with(|| format!("parsing the response to {description}"))?;

            if !response.errors.is_empty() {
                let messages: Vec<_> = response.errors.iter().map(|e| e.message.as_str()).collect();
                bail!("{description} failed: {}", messages.join("; "));
            }

            return response.data.ok_or_else(|| app_err!("{description} returned no data"));
        }
    }
}

impl SearchPort for GitHubClient {
    async fn count(&self, predicate: &QueryPredicate) -> Result<u64> {
        let search = predicate.build();
        let description = format!("count query '{search}'");
        let data: CountData = self.execute(&description, COUNT_QUERY, CountVariables { query: &search }).await?;
        Ok(data.search.issue_count)
    }

    async fn fetch(&self, predicate: &QueryPredicate) -> Result<Vec<Issue>> {
        let search = predicate.build();
        let description = format!("search query '{search}'");
        let mut issues = BTreeMap::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0_u32;

        loop {
            let variables = SearchVariables {
                query: &search,
                after: cursor.as_deref(),
            };

            let data: SearchData = self.execute(&description, SEARCH_QUERY, variables).await?;
            let connection = data.search;
            pages += 1;

            if connection.issue_count > SEARCH_RESULT_CAP {
                bail!(
                    "{description} matches {} issues but GitHub search returns at most {SEARCH_RESULT_CAP}, use a narrower date window",
                    connection.issue_count
                );
            }

            for issue in connection.nodes.into_iter().flatten().filter_map(SearchNode::into_issue) {
                let _ = issues.insert(issue.number, issue);
            }

            match next_cursor(connection.page_info.has_next_page, connection.page_info.end_cursor, &description)? {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        log::debug!(target: LOG_TARGET, "Fetched {} issues in {pages} pages for '{search}'", issues.len());
        Ok(issues.into_values().collect())
    }
}

fn next_cursor(has_next_page: bool, end_cursor: Option<String>, description: &str) -> Result<Option<String>> {
    match (has_next_page, end_cursor) {
        (false, _) => Ok(None),
        (true, Some(cursor)) => Ok(Some(cursor)),
        (true, None) => bail!("{description} reported another page without a cursor"),
    }
}

/// Decides whether a response signals a rate limit, and if so how long to pause.
fn rate_limit_pause(status: StatusCode, headers: &HeaderMap, body: &str, now: DateTime<Utc>) -> Option<Duration> {
    let limited = match status {
        StatusCode::TOO_MANY_REQUESTS => true,
        StatusCode::FORBIDDEN => headers.contains_key(RETRY_AFTER) || remaining_requests(headers) == Some(0),
        s if s.is_success() => serde_json::from_str::<Response<IgnoredAny>>(body)
            .is_ok_and(|response| response.errors.iter().any(|e| e.is_rate_limit())),
        _ => false,
    };

    if !limited {
        return None;
    }

    let pause = retry_after(headers)
        .or_else(|| reset_at(headers).map(|reset| (reset - now).to_std().unwrap_or(Duration::ZERO)))
        .unwrap_or(DEFAULT_RATE_LIMIT_PAUSE);

    Some(pause.max(Duration::from_secs(1)))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)?.to_str().ok()
}

fn remaining_requests(headers: &HeaderMap) -> Option<u64> {
    header_str(headers, "x-ratelimit-remaining")?.parse().ok()
}

fn reset_at(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    let timestamp = header_str(headers, "x-ratelimit-reset")?.parse::<i64>().ok()?;
    DateTime::from_timestamp(timestamp, 0)
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    header_str(headers, RETRY_AFTER.as_str())?.parse::<u64>().ok().map(Duration::from_secs)
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() > MAX_BODY_EXCERPT {
        format!("{}...", trimmed.chars().take(MAX_BODY_EXCERPT).collect::<String>())
    } else {
        trimmed.to_string()
    }
}
