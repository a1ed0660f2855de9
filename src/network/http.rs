//! `reqwest`-backed implementation of [`NetworkService`]

use super::{NetworkService, ResponseCache};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{PageReply, PageRequest};
use async_trait::async_trait;
use tracing::{debug, trace};
use url::Url;

/// HTTP client for a dummyjson-style product API
///
/// Pages are requested as `GET {base_url}/{products_path}?limit=N&skip=M`.
/// Byte fetches go to the absolute URL given and, when the cache is enabled,
/// are served from memory on repeat.
pub struct HttpNetworkService {
    /// HTTP client shared by page and byte fetches
    client: reqwest::Client,

    /// Fully resolved products endpoint
    products_url: Url,

    /// Byte cache (None when disabled)
    cache: Option<ResponseCache>,
}

impl HttpNetworkService {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the HTTP client cannot be created
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.api.timeout)
            .user_agent(config.api.user_agent.clone())
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        let products_url = resolve_endpoint(&config.api.base_url, &config.api.products_path)?;

        let cache = config
            .cache
            .enabled
            .then(|| ResponseCache::new(config.cache.capacity_bytes));

        debug!(
            endpoint = %products_url,
            cache_enabled = cache.is_some(),
            "HTTP network service initialized"
        );

        Ok(Self {
            client,
            products_url,
            cache,
        })
    }

    /// The byte cache, if enabled
    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    /// The resolved products endpoint
    pub fn products_url(&self) -> &Url {
        &self.products_url
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl NetworkService for HttpNetworkService {
    async fn fetch_products_page(&self, request: PageRequest) -> Result<PageReply> {
        let mut url = self.products_url.clone();
        url.query_pairs_mut()
            .append_pair("limit", &request.limit.to_string())
            .append_pair("skip", &request.skip.to_string());

        debug!(limit = request.limit, skip = request.skip, "Fetching products page");

        let body = self.get(url).await?.bytes().await?;
        let reply: PageReply = serde_json::from_slice(&body)?;

        trace!(
            returned = reply.products.len(),
            total = reply.total,
            "Products page decoded"
        );

        Ok(reply)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(url)) {
            trace!(url, "Serving bytes from cache");
            return Ok(cached.to_vec());
        }

        let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let bytes = self.get(parsed).await?.bytes().await?;

        if let Some(cache) = &self.cache {
            cache.insert(url, &bytes);
        }

        debug!(url, size = bytes.len(), "Fetched bytes");
        Ok(bytes.to_vec())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Join `path` onto `base`, treating `base` as a directory
fn resolve_endpoint(base: &str, path: &str) -> Result<Url> {
    let invalid = |e: url::ParseError| Error::InvalidUrl {
        url: format!("{}/{}", base, path),
        reason: e.to_string(),
    };

    let mut base = Url::parse(base).map_err(invalid)?;
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    base.join(path.trim_start_matches('/')).map_err(invalid)
}
