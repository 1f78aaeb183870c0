use argh::FromArgs;
use tracing::info;

use crate::command;
use crate::kv_store::KeyValueStoreConfig;
use crate::web::{memoize, HttpConfig, HttpFetcher, PageCache, PageCacheConfig};

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "get-page",
    description = "Fetch a page through the page cache and print its body"
)]
pub struct Options {
    #[argh(positional)]
    /// the URL of the page
    pub url: String,
}

pub struct Command {
    pages: PageCache<HttpFetcher>,
}

impl Command {
    pub fn new(
        store_config: &KeyValueStoreConfig,
        page_cache_config: &PageCacheConfig,
        http_config: &HttpConfig,
    ) -> Result<Self, command::Error> {
        let store = store_config.to_backend()?;
        let fetcher = HttpFetcher::new(http_config)?;
        Ok(Self {
            pages: memoize(fetcher, store, page_cache_config),
        })
    }

    pub async fn run(&self, options: &Options) -> Result<String, command::Error> {
        let body = self.pages.get_page(&options.url).await?;
        let count = self.pages.request_count(&options.url).await?;
        info!("{} requested {count} times", options.url);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url() {
        let command = Command::new(
            &KeyValueStoreConfig::Memory,
            &PageCacheConfig::default(),
            &HttpConfig::default(),
        )
        .unwrap();

        let result = command
            .run(&Options {
                url: "not a url".to_string(),
            })
            .await;

        assert!(matches!(result, Err(command::Error::Web(_))));
    }
}
