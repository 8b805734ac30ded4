//! HTTP client for the RapidAPI social-profile scrapers.
//!
//! Each platform is served by a different RapidAPI host. Every request
//! carries the `X-RapidAPI-Key` / `X-RapidAPI-Host` header pair.

use std::time::Duration;

use kreativa_core::Platform;
use reqwest::{Client, StatusCode, Url};

use crate::error::SocialError;
use crate::types::{parse_stats, AllPlatformStats, PlatformHandles, SocialStats};

const INSTAGRAM_HOST: &str = "instagram-scraper-2022.p.rapidapi.com";
const TIKTOK_HOST: &str = "tiktok-api23.p.rapidapi.com";
const TWITTER_HOST: &str = "twitter154.p.rapidapi.com";

struct Endpoint {
    host: &'static str,
    base_url: Url,
    path: &'static str,
    param: &'static str,
}

/// Client for the RapidAPI social-stats providers.
///
/// Use [`SocialStatsClient::new`] for production or
/// [`SocialStatsClient::with_base_url`] to route every platform to a mock
/// server in tests. A client without a key answers every lookup with
/// [`SocialError::NotConfigured`] and never touches the network.
pub struct SocialStatsClient {
    client: Client,
    api_key: Option<String>,
    instagram: Endpoint,
    tiktok: Endpoint,
    twitter: Endpoint,
}

fn parse_base(raw: &str) -> Result<Url, SocialError> {
    let normalised = format!("{}/", raw.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| SocialError::InvalidBaseUrl(format!("{raw}: {e}")))
}

impl SocialStatsClient {
    /// Creates a client pointed at the production RapidAPI hosts.
    ///
    /// # Errors
    ///
    /// Returns [`SocialError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: Option<&str>, timeout_secs: u64) -> Result<Self, SocialError> {
        Self::build(
            api_key,
            timeout_secs,
            parse_base(&format!("https://{INSTAGRAM_HOST}"))?,
            parse_base(&format!("https://{TIKTOK_HOST}"))?,
            parse_base(&format!("https://{TWITTER_HOST}"))?,
        )
    }

    /// Creates a client that sends every platform's requests to `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SocialError::InvalidBaseUrl`] if `base_url` does not parse,
    /// or [`SocialError::Http`] if the client cannot be constructed.
    pub fn with_base_url(
        api_key: Option<&str>,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, SocialError> {
        let base = parse_base(base_url)?;
        Self::build(api_key, timeout_secs, base.clone(), base.clone(), base)
    }

    fn build(
        api_key: Option<&str>,
        timeout_secs: u64,
        instagram: Url,
        tiktok: Url,
        twitter: Url,
    ) -> Result<Self, SocialError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("kreativa/0.1 (creative-directory)")
            .build()?;

        Ok(Self {
            client,
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(ToOwned::to_owned),
            instagram: Endpoint {
                host: INSTAGRAM_HOST,
                base_url: instagram,
                path: "ig/info_username/",
                param: "user",
            },
            tiktok: Endpoint {
                host: TIKTOK_HOST,
                base_url: tiktok,
                path: "api/user/info",
                param: "uniqueId",
            },
            twitter: Endpoint {
                host: TWITTER_HOST,
                base_url: twitter,
                path: "user/details",
                param: "username",
            },
        })
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self, platform: Platform) -> &Endpoint {
        match platform {
            Platform::Instagram => &self.instagram,
            Platform::TikTok => &self.tiktok,
            Platform::Twitter => &self.twitter,
        }
    }

    fn build_url(&self, platform: Platform, handle: &str) -> Result<Url, SocialError> {
        let endpoint = self.endpoint(platform);
        let mut url = endpoint
            .base_url
            .join(endpoint.path)
            .map_err(|e| SocialError::InvalidBaseUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair(endpoint.param, handle)
            .append_pair("ts", &chrono::Utc::now().timestamp_millis().to_string());
        Ok(url)
    }

    /// Fetches public stats for `handle` on `platform`. A leading `@` is
    /// ignored.
    ///
    /// # Errors
    ///
    /// - [`SocialError::NotConfigured`] if no API key is set.
    /// - [`SocialError::Status`] if the provider returns a non-2xx status.
    /// - [`SocialError::Http`] on network failure.
    /// - [`SocialError::Deserialize`] if the body is not JSON.
    pub async fn fetch(&self, platform: Platform, handle: &str) -> Result<SocialStats, SocialError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(SocialError::NotConfigured);
        };

        let clean = handle.trim();
        let clean = clean.strip_prefix('@').unwrap_or(clean);
        let url = self.build_url(platform, clean)?;

        let response = self
            .client
            .get(url)
            .header("X-RapidAPI-Key", api_key)
            .header("X-RapidAPI-Host", self.endpoint(platform).host)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            if status == StatusCode::TOO_MANY_REQUESTS {
                tracing::warn!(%platform, handle = clean, "social stats provider rate limited");
            }
            return Err(SocialError::Status {
                platform: platform.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| SocialError::Deserialize {
                context: format!("{platform} stats for {clean}"),
                source: e,
            })?;

        Ok(parse_stats(platform, &value))
    }
}

/// Looks up every non-blank handle concurrently and rejoins the results.
pub async fn fetch_all_platform_stats(
    client: &SocialStatsClient,
    handles: &PlatformHandles,
) -> AllPlatformStats {
    async fn lookup(
        client: &SocialStatsClient,
        platform: Platform,
        handle: Option<&str>,
    ) -> Option<Result<SocialStats, SocialError>> {
        let handle = handle.map(str::trim).filter(|h| !h.is_empty())?;
        Some(client.fetch(platform, handle).await)
    }

    let (instagram, tiktok, twitter) = tokio::join!(
        lookup(client, Platform::Instagram, handles.instagram.as_deref()),
        lookup(client, Platform::TikTok, handles.tiktok.as_deref()),
        lookup(client, Platform::Twitter, handles.twitter.as_deref()),
    );

    AllPlatformStats {
        instagram,
        tiktok,
        twitter,
    }
}
