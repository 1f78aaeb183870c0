use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::kv_store::{self, KeyValueStore};

mod error;
mod http_fetcher;

pub use error::Error;
pub use http_fetcher::{HttpConfig, HttpFetcher};

/// Retrieves the body of the page at a URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, Error>;
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PageCacheConfig {
    #[serde(default = "PageCacheConfig::default_expires_in")]
    pub expires_in: u64,
    /// Reset the request counter of a URL to zero whenever its page is fetched again
    #[serde(default)]
    pub reset_count_on_miss: bool,
}

impl PageCacheConfig {
    fn default_expires_in() -> u64 {
        10
    }
}

impl Default for PageCacheConfig {
    fn default() -> Self {
        PageCacheConfig {
            expires_in: PageCacheConfig::default_expires_in(),
            reset_count_on_miss: false,
        }
    }
}

pub fn count_key(url: &str) -> String {
    format!("count:{url}")
}

pub fn result_key(url: &str) -> String {
    format!("result:{url}")
}

/// Wrap `fetcher` so that pages are served from `store` while their cached copy is live.
pub fn memoize<F: Fetch>(
    fetcher: F,
    store: Arc<dyn KeyValueStore>,
    config: &PageCacheConfig,
) -> PageCache<F> {
    PageCache {
        store,
        fetcher,
        expires_in: config.expires_in,
        reset_count_on_miss: config.reset_count_on_miss,
    }
}

/// Memoizing [`Fetch`] decorator that also counts requests per URL.
pub struct PageCache<F> {
    store: Arc<dyn KeyValueStore>,
    fetcher: F,
    expires_in: u64,
    reset_count_on_miss: bool,
}

impl<F: Fetch> PageCache<F> {
    #[instrument(skip(self))]
    pub async fn get_page(&self, url: &str) -> Result<String, Error> {
        let count = self.store.incr(&count_key(url)).await?;
        debug!("Page requested {count} times");

        if let Some(body) = self.store.get(&result_key(url)).await? {
            debug!("Using cached page");
            return Ok(body);
        }

        let body = self.fetcher.fetch(url).await?;

        if self.reset_count_on_miss {
            self.store.set(&count_key(url), "0").await?;
        }
        self.store
            .set_ex(&result_key(url), &body, self.expires_in)
            .await?;
        debug!("Cached page for {} seconds", self.expires_in);

        Ok(body)
    }

    pub async fn request_count(&self, url: &str) -> Result<i64, Error> {
        match self.store.get(&count_key(url)).await? {
            Some(count) => count.parse::<i64>().map_err(|e| {
                Error::Store(kv_store::Error::Execution(format!(
                    "Invalid request counter for {url}: {e}"
                )))
            }),
            None => Ok(0),
        }
    }
}

#[async_trait]
impl<F: Fetch> Fetch for PageCache<F> {
    async fn fetch(&self, url: &str) -> Result<String, Error> {
        self.get_page(url).await
    }
}
