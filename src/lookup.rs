use std::time::Duration;

use anyhow::Context as _;
use reqwest::StatusCode;

use crate::credentials::AccessToken;
use crate::formats::{BookRecord, BookStub, Volume, VolumeSearch};

pub const VOLUMES_ENDPOINT: &str = "https://www.googleapis.com/books/v1/volumes";
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How one volume is chosen when a search returns several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Take the first item and say nothing about the rest.
    #[default]
    FirstMatch,
}

impl MatchPolicy {
    pub fn select(self, items: Vec<serde_json::Value>) -> Option<serde_json::Value> {
        match self {
            Self::FirstMatch => items.into_iter().next(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub policy: MatchPolicy,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            endpoint: VOLUMES_ENDPOINT.to_owned(),
            connect_timeout: CONNECT_TIMEOUT,
            request_timeout: REQUEST_TIMEOUT,
            policy: MatchPolicy::default(),
        }
    }
}

pub fn build_http_client(config: &LookupConfig) -> anyhow::Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .build()
        .context("build http client")
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    Found(BookRecord),
    NotFound(BookStub),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupOutcome {
    /// `None` when no HTTP response was received at all.
    pub status: Option<StatusCode>,
    pub result: LookupResult,
}

impl LookupOutcome {
    fn not_found(status: Option<StatusCode>, stub: BookStub) -> Self {
        Self {
            status,
            result: LookupResult::NotFound(stub),
        }
    }

    pub fn is_found(&self) -> bool {
        self.status == Some(StatusCode::OK) && matches!(self.result, LookupResult::Found(_))
    }

    /// Record title when found, otherwise the title from the book list.
    pub fn title(&self) -> &str {
        match &self.result {
            LookupResult::Found(record) => &record.title,
            LookupResult::NotFound(stub) => &stub.title,
        }
    }
}

/// Maps one search response onto an outcome for `stub`.
///
/// Only `200 OK` is inspected; any other status is a miss whatever the body says.
/// An undecodable `200` body is logged and reported as a miss.
pub fn classify(
    status: StatusCode,
    body: &str,
    stub: BookStub,
    policy: MatchPolicy,
) -> LookupOutcome {
    if status != StatusCode::OK {
        return LookupOutcome::not_found(Some(status), stub);
    }

    let search: VolumeSearch = match serde_json::from_str(body) {
        Ok(search) => search,
        Err(err) => {
            tracing::warn!(title = %stub.title, error = %err, "undecodable search response");
            return LookupOutcome::not_found(Some(status), stub);
        }
    };

    let Some(item) = policy.select(search.items) else {
        return LookupOutcome::not_found(Some(status), stub);
    };

    match serde_json::from_value::<Volume>(item) {
        Ok(volume) => LookupOutcome {
            status: Some(status),
            result: LookupResult::Found(BookRecord::from(volume.volume_info)),
        },
        Err(err) => {
            tracing::warn!(title = %stub.title, error = %err, "undecodable search item");
            LookupOutcome::not_found(Some(status), stub)
        }
    }
}

pub struct LookupClient {
    client: reqwest::blocking::Client,
    config: LookupConfig,
    token: AccessToken,
}

impl LookupClient {
    pub fn new(client: reqwest::blocking::Client, config: LookupConfig, token: AccessToken) -> Self {
        Self {
            client,
            config,
            token,
        }
    }

    /// One outcome per stub, in input order, produced as the iterator is driven.
    pub fn lookup_all<'a, I>(&'a self, stubs: I) -> impl Iterator<Item = LookupOutcome> + 'a
    where
        I: IntoIterator<Item = BookStub>,
        I::IntoIter: 'a,
    {
        stubs.into_iter().map(move |stub| self.lookup(stub))
    }

    pub fn lookup(&self, stub: BookStub) -> LookupOutcome {
        let response = match self.send_search(&stub) {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(title = %stub.title, error = %format!("{err:#}"), "search request failed");
                return LookupOutcome::not_found(None, stub);
            }
        };

        let status = response.status();
        let body = if status == StatusCode::OK {
            match response.text().context("read search response body") {
                Ok(body) => body,
                Err(err) => {
                    tracing::warn!(title = %stub.title, error = %format!("{err:#}"), "read search response failed");
                    return LookupOutcome::not_found(Some(status), stub);
                }
            }
        } else {
            tracing::debug!(title = %stub.title, %status, "search returned non-OK status");
            String::new()
        };

        let outcome = classify(status, &body, stub, self.config.policy);
        if let LookupResult::Found(record) = &outcome.result {
            match serde_json::to_string(record) {
                Ok(json) => tracing::debug!(record = %json, "matched volume"),
                Err(err) => tracing::debug!(?err, "serialize matched volume"),
            }
        }
        outcome
    }

    fn send_search(&self, stub: &BookStub) -> anyhow::Result<reqwest::blocking::Response> {
        let endpoint = self.config.endpoint.as_str();
        self.client
            .get(endpoint)
            .query(&[("q", stub.search_query())])
            .bearer_auth(self.token.secret())
            .send()
            .with_context(|| format!("GET {endpoint}"))
    }
}
