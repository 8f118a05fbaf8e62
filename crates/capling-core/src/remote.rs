//! Read-only client for a hosted Supabase store
//!
//! Reads transaction classifications through the PostgREST interface so the
//! mascot can be derived from data held in the hosted product.
//!
//! # Configuration
//!
//! Environment variables:
//! - `SUPABASE_URL` or `NEXT_PUBLIC_SUPABASE_URL`: project URL
//!   (default: `http://127.0.0.1:54321`, the local Supabase stack)
//! - `SUPABASE_SERVICE_ROLE_KEY`, `SUPABASE_ANON_KEY` or
//!   `NEXT_PUBLIC_SUPABASE_ANON_KEY`: API key, first one set wins (required)

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::Classification;

/// Project URL environment variables, in priority order
pub const SUPABASE_URL_ENVS: &[&str] = &["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"];

/// API key environment variables, in priority order
pub const SUPABASE_KEY_ENVS: &[&str] = &[
    "SUPABASE_SERVICE_ROLE_KEY",
    "SUPABASE_ANON_KEY",
    "NEXT_PUBLIC_SUPABASE_ANON_KEY",
];

/// URL of a locally running Supabase stack
pub const DEFAULT_SUPABASE_URL: &str = "http://127.0.0.1:54321";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Default rows per request, matching PostgREST's default `max-rows`
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// PostgREST client for the hosted store
#[derive(Clone)]
pub struct SupabaseClient {
    http_client: Client,
    base_url: String,
    api_key: String,
    page_size: usize,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct ClassificationRow {
    classification: Option<String>,
}

impl SupabaseClient {
    /// Create a client for a project URL and API key
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let http_client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let url = first_env(SUPABASE_URL_ENVS).unwrap_or_else(|| DEFAULT_SUPABASE_URL.to_string());
        let key = first_env(SUPABASE_KEY_ENVS).ok_or_else(|| {
            Error::Config(format!(
                "No Supabase API key set. Set one of: {}",
                SUPABASE_KEY_ENVS.join(", ")
            ))
        })?;
        Self::new(&url, &key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Rows requested per page. Hosted projects cap responses at their
    /// `max-rows` setting, so a page may come back shorter than asked.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Fetch a user's classifications, most recent first.
    ///
    /// `limit` of `None` fetches the whole history. Rows with no
    /// classification count as neutral, the column default. Rows with an
    /// unknown value are skipped and do not count toward `limit`.
    pub async fn fetch_classifications(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Classification>> {
        let mut classifications = Vec::new();
        let mut offset = 0;
        let mut skipped = 0;

        loop {
            let wanted = match limit {
                Some(limit) if classifications.len() >= limit => break,
                Some(limit) => (limit - classifications.len()).min(self.page_size),
                None => self.page_size,
            };

            let rows = self.fetch_page(user_id, wanted, offset).await?;
            if rows.is_empty() {
                break;
            }
            offset += rows.len();

            for row in rows {
                match row.classification {
                    None => classifications.push(Classification::Neutral),
                    Some(value) => match value.parse() {
                        Ok(c) => classifications.push(c),
                        Err(e) => {
                            warn!("Skipping transaction: {}", e);
                            skipped += 1;
                        }
                    },
                }
            }
        }

        debug!(
            user_id,
            rows = offset,
            skipped,
            returned = classifications.len(),
            "Fetched classifications from Supabase"
        );
        Ok(classifications)
    }

    async fn fetch_page(
        &self,
        user_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ClassificationRow>> {
        let query = [
            ("select", "classification".to_string()),
            ("user_id", format!("eq.{}", user_id)),
            ("order", "date.desc,timestamp.desc,id.desc".to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];

        let response = self
            .http_client
            .get(format!("{}/rest/v1/transactions", self.base_url))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .query(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote(format!(
                "PostgREST error {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capling::ClassificationSource;
    use crate::test_utils::MockSupabaseServer;

    use crate::models::Classification::{Irresponsible as I, Neutral as N, Responsible as R};

    #[tokio::test]
    async fn test_fetch_all_classifications() {
        let server = MockSupabaseServer::start().await;
        server.set_history("user-1", &[Some("responsible"), None, Some("irresponsible")]);

        let client = SupabaseClient::new(&server.url(), "test-key").unwrap();
        let history = client.fetch_classifications("user-1", None).await.unwrap();
        assert_eq!(history, vec![R, N, I]);
    }

    #[tokio::test]
    async fn test_fetch_respects_limit_and_user() {
        let server = MockSupabaseServer::start().await;
        server.set_history(
            "user-1",
            &[Some("irresponsible"), Some("responsible"), Some("neutral")],
        );

        let client = SupabaseClient::new(&server.url(), "test-key").unwrap();
        let history = client.fetch_classifications("user-1", Some(2)).await.unwrap();
        assert_eq!(history, vec![I, R]);

        let other = client.fetch_classifications("user-2", None).await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_values_skipped() {
        let server = MockSupabaseServer::start().await;
        server.set_history("user-1", &[Some("splurge"), Some("responsible")]);

        let client = SupabaseClient::new(&server.url(), "test-key").unwrap();
        let history = client.fetch_classifications("user-1", None).await.unwrap();
        assert_eq!(history, vec![R]);
    }

    #[tokio::test]
    async fn test_history_paged_past_server_row_cap() {
        let server = MockSupabaseServer::start().await;
        let history: Vec<Option<&str>> = (0..7)
            .map(|i| Some(if i % 2 == 0 { "responsible" } else { "irresponsible" }))
            .collect();
        server.set_history("user-1", &history);
        server.set_max_rows(3);

        let client = SupabaseClient::new(&server.url(), "test-key").unwrap();
        let all = client.fetch_classifications("user-1", None).await.unwrap();
        assert_eq!(all, vec![R, I, R, I, R, I, R]);

        let counts = ClassificationSource::counts(&client, "user-1").await.unwrap();
        assert_eq!(counts.responsible, 4);
        assert_eq!(counts.irresponsible, 3);
        assert_eq!(counts.total(), 7);
    }

    #[tokio::test]
    async fn test_client_page_size() {
        let server = MockSupabaseServer::start().await;
        server.set_history("user-1", &[Some("neutral"); 5]);

        let client = SupabaseClient::new(&server.url(), "test-key")
            .unwrap()
            .with_page_size(2);
        let all = client.fetch_classifications("user-1", None).await.unwrap();
        assert_eq!(all.len(), 5);
        // 2 + 2 + 1, then an empty page ends the scan
        assert_eq!(server.request_count(), 4);
    }

    #[tokio::test]
    async fn test_limit_refills_after_unknown_values() {
        let server = MockSupabaseServer::start().await;
        server.set_history(
            "user-1",
            &[
                Some("splurge"),
                Some("responsible"),
                Some("treat"),
                Some("irresponsible"),
                Some("neutral"),
                Some("responsible"),
            ],
        );

        let client = SupabaseClient::new(&server.url(), "test-key").unwrap();
        let recent = client.fetch_classifications("user-1", Some(3)).await.unwrap();
        assert_eq!(recent, vec![R, I, N]);
    }

    #[tokio::test]
    async fn test_bad_key_is_remote_error() {
        let server = MockSupabaseServer::start().await;

        let client = SupabaseClient::new(&server.url(), "wrong-key").unwrap();
        let err = client
            .fetch_classifications("user-1", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Remote(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_http_error() {
        // Port 9 (discard) is not expected to run a PostgREST server
        let client = SupabaseClient::new("http://127.0.0.1:9", "test-key").unwrap();
        let err = client
            .fetch_classifications("user-1", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = SupabaseClient::new("http://localhost:54321/", "k").unwrap();
        assert_eq!(client.base_url(), "http://localhost:54321");
    }
}
