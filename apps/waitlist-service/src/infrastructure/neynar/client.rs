//! Neynar HTTP client with retry logic.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::api_types::{BulkUsersResponse, NeynarErrorResponse};
use super::backoff::ExponentialBackoff;
use crate::application::ports::{LookupError, Profile, ProfileLookupPort};
use crate::domain::waitlist::IdentityId;
use crate::infrastructure::config::{NeynarSettings, RetrySettings};
use crate::infrastructure::metrics::record_profile_lookup;

const BULK_USERS_PATH: &str = "/v2/farcaster/user/bulk";

/// Neynar user lookup client.
#[derive(Debug, Clone)]
pub struct NeynarClient {
    client: Client,
    api_key: String,
    base_url: String,
    retry: RetrySettings,
}

impl NeynarClient {
    /// Create a new client from settings.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::Transport` if the HTTP client cannot be built.
    pub fn new(settings: &NeynarSettings) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_key: settings.api_key().to_string(),
            base_url: settings.base_url.clone(),
            retry: settings.retry.clone(),
        })
    }

    /// Fetch one user, retrying transient failures.
    async fn fetch_user(&self, fid: IdentityId) -> Result<Profile, LookupError> {
        let url = format!("{}{BULK_USERS_PATH}", self.base_url);
        let mut backoff = ExponentialBackoff::new(&self.retry);

        loop {
            let sent = self
                .client
                .get(&url)
                .query(&[("fids", fid)])
                .header("accept", "application/json")
                .header("api_key", &self.api_key)
                .send()
                .await;

            let response = match sent {
                Ok(resp) => resp,
                Err(e) => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            fid,
                            error = %e,
                            delay_ms = delay.as_millis(),
                            attempt = backoff.attempt,
                            "Neynar network error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    if backoff.attempt <= 1 {
                        return Err(LookupError::Transport(e.to_string()));
                    }
                    return Err(LookupError::MaxRetriesExceeded {
                        attempts: backoff.attempt,
                    });
                }
            };

            let status = response.status();

            if status.is_success() {
                let body: BulkUsersResponse = response
                    .json()
                    .await
                    .map_err(|e| LookupError::Decode(e.to_string()))?;

                return body
                    .users
                    .into_iter()
                    .next()
                    .map(Profile::from)
                    .ok_or(LookupError::NotFound { fid });
            }

            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());

            let error_body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<NeynarErrorResponse>(&error_body)
                .map_or(error_body, |err| err.message);

            if is_retryable(status) {
                let delay = backoff
                    .next_backoff()
                    .map(|d| {
                        retry_after
                            .map_or(d, Duration::from_secs)
                            .min(self.retry.max_backoff)
                    });
                if let Some(delay) = delay {
                    tracing::warn!(
                        fid,
                        status = status.as_u16(),
                        message = %message,
                        delay_ms = delay.as_millis(),
                        "Neynar retryable error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Err(LookupError::MaxRetriesExceeded {
                    attempts: backoff.attempt,
                });
            }

            return match status {
                StatusCode::NOT_FOUND => Err(LookupError::NotFound { fid }),
                _ => Err(LookupError::Upstream {
                    status: status.as_u16(),
                    message,
                }),
            };
        }
    }
}

#[async_trait]
impl ProfileLookupPort for NeynarClient {
    #[tracing::instrument(skip(self))]
    async fn lookup(&self, fid: IdentityId) -> Result<Profile, LookupError> {
        let started = Instant::now();
        let result = self.fetch_user(fid).await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        record_profile_lookup(outcome, started.elapsed());

        result
    }
}

/// Whether a status is worth retrying.
const fn is_retryable(status: StatusCode) -> bool {
    matches!(status.as_u16(), 408 | 429 | 500 | 502 | 503 | 504)
}
