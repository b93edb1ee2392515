// Reddit API client — app-only OAuth plus the `/new` listing.
//
// Uses the client-credentials grant, which needs no Reddit user account:
// the script app's id and secret are exchanged for a bearer token that is
// cached until shortly before it expires. Every API call goes through the
// shared rate limiter.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::{debug, info};

use super::listing::{self, Listing, RedditSubmission, SubmissionData};
use super::rate_limiter::RateLimiter;

/// OAuth API host for authenticated requests.
pub const DEFAULT_API_URL: &str = "https://oauth.reddit.com";

/// Host that issues access tokens.
pub const DEFAULT_AUTH_URL: &str = "https://www.reddit.com";

/// Reddit refuses listing limits above this.
pub const MAX_LISTING_LIMIT: u32 = 100;

/// Refresh the token this long before Reddit says it expires.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Everything needed to talk to Reddit. Built from `Config`.
#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub api_url: String,
    pub auth_url: String,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

pub struct RedditClient {
    client: reqwest::Client,
    credentials: RedditCredentials,
    token: Mutex<Option<CachedToken>>,
    limiter: RateLimiter,
}

impl RedditClient {
    pub fn new(credentials: RedditCredentials) -> Result<Self> {
        Self::with_rate_limiter(credentials, RateLimiter::default())
    }

    pub fn with_rate_limiter(credentials: RedditCredentials, limiter: RateLimiter) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(credentials.user_agent.clone())
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        let credentials = RedditCredentials {
            api_url: credentials.api_url.trim_end_matches('/').to_string(),
            auth_url: credentials.auth_url.trim_end_matches('/').to_string(),
            ..credentials
        };

        Ok(Self {
            client,
            credentials,
            token: Mutex::new(None),
            limiter,
        })
    }

    /// Fetch the newest submissions in a subreddit.
    ///
    /// `limit` is clamped to 1..=100 (one listing page).
    pub async fn fetch_new(&self, subreddit: &str, limit: u32) -> Result<Vec<RedditSubmission>> {
        let name = subreddit_name(subreddit);
        let limit = limit.clamp(1, MAX_LISTING_LIMIT).to_string();
        let path = format!("/r/{name}/new");

        let listing: Listing<SubmissionData> = self
            .get_json(&path, &[("limit", &limit), ("raw_json", "1")])
            .await
            .with_context(|| format!("Failed to fetch new posts for r/{name}"))?;

        let submissions = listing::submissions(listing, name);
        info!(
            subreddit = name,
            count = submissions.len(),
            "Fetched newest submissions"
        );
        Ok(submissions)
    }

    /// Authenticated GET against the OAuth API host.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let token = self.access_token().await?;
        let url = format!("{}{}", self.credentials.api_url, path);

        self.limiter.acquire().await;
        debug!(path = path, "Reddit GET request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .query(params)
            .send()
            .await
            .with_context(|| format!("Reddit request failed: {path}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Reddit {path} returned {status}: {body}");
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to deserialize Reddit {path} response"))
    }

    /// Return a valid bearer token, requesting a new one when needed.
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        let fresh = self.request_token().await?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }

    async fn request_token(&self) -> Result<CachedToken> {
        let url = format!("{}/api/v1/access_token", self.credentials.auth_url);

        self.limiter.acquire().await;
        debug!("Requesting Reddit access token");

        let response = self
            .client
            .post(&url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context("Reddit token request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Reddit token endpoint returned {status}: {body}\n\
                 Check REDDIT_CLIENT_ID and REDDIT_CLIENT_SECRET."
            );
        }

        let body: TokenResponse = response
            .json()
            .await
            .context("Failed to parse Reddit token response")?;
        body.into_cached(Instant::now())
    }
}

/// Strip an optional `r/` or `/r/` prefix and surrounding whitespace.
pub fn subreddit_name(raw: &str) -> &str {
    let trimmed = raw.trim().trim_start_matches('/');
    trimmed
        .strip_prefix("r/")
        .unwrap_or(trimmed)
        .trim_end_matches('/')
}

// -- Serde types for /api/v1/access_token --

/// Reddit answers bad credentials with 200 and an `error` field, so every
/// field is optional.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
}

impl TokenResponse {
    fn into_cached(self, now: Instant) -> Result<CachedToken> {
        if let Some(error) = self.error {
            anyhow::bail!("Reddit rejected the credentials: {error}");
        }
        let access_token = self
            .access_token
            .context("Reddit token response had no access_token")?;
        let lifetime = Duration::from_secs(self.expires_in.unwrap_or(3600));
        Ok(CachedToken {
            access_token,
            expires_at: now + lifetime.saturating_sub(TOKEN_EXPIRY_MARGIN),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subreddit_name_strips_prefixes() {
        assert_eq!(subreddit_name("arduino"), "arduino");
        assert_eq!(subreddit_name("r/esp32"), "esp32");
        assert_eq!(subreddit_name("/r/stm32/"), "stm32");
        assert_eq!(subreddit_name("  embedded "), "embedded");
    }

    #[test]
    fn token_response_error_is_reported() {
        let body: TokenResponse =
            serde_json::from_str(r#"{"error": "invalid_grant"}"#).unwrap();
        let err = body.into_cached(Instant::now()).err().unwrap();
        assert!(err.to_string().contains("invalid_grant"));
    }

    #[test]
    fn token_expiry_keeps_a_margin() {
        let body: TokenResponse = serde_json::from_str(
            r#"{"access_token": "abc", "token_type": "bearer", "expires_in": 86400, "scope": "*"}"#,
        )
        .unwrap();
        let now = Instant::now();
        let token = body.into_cached(now).unwrap();
        assert_eq!(token.access_token, "abc");
        assert_eq!(
            token.expires_at,
            now + Duration::from_secs(86400) - TOKEN_EXPIRY_MARGIN
        );
    }

    #[test]
    fn trailing_slashes_trimmed_from_hosts() {
        let client = RedditClient::new(RedditCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            user_agent: "test".to_string(),
            api_url: "https://oauth.reddit.com/".to_string(),
            auth_url: "https://www.reddit.com//".to_string(),
        })
        .unwrap();
        assert_eq!(client.credentials.api_url, "https://oauth.reddit.com");
        assert_eq!(client.credentials.auth_url, "https://www.reddit.com");
    }
}
