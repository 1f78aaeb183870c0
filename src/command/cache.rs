use argh::FromArgs;
use tracing::info;

use crate::cache::{Cache, CacheConfig};
use crate::command;
use crate::kv_store::KeyValueStoreConfig;

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "store",
    description = "Store a value under a generated key and print the key"
)]
pub struct StoreOptions {
    #[argh(positional)]
    /// the value to store
    pub value: String,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "get", description = "Print the value stored under a key")]
pub struct GetOptions {
    #[argh(positional)]
    /// the key to read
    pub key: String,
    #[argh(switch, short = 'i')]
    /// read the value as an integer
    pub int: bool,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "replay",
    description = "Print the call history of the store operation"
)]
pub struct ReplayOptions {}

pub struct Command {
    cache: Cache,
}

impl Command {
    pub async fn new(
        store_config: &KeyValueStoreConfig,
        cache_config: &CacheConfig,
    ) -> Result<Self, command::Error> {
        let store = store_config.to_backend()?;
        let cache = Cache::new(store, cache_config).await?;
        Ok(Self { cache })
    }

    pub async fn store(&self, options: &StoreOptions) -> Result<String, command::Error> {
        let key = self.cache.store(options.value.as_str()).await?;
        info!("Stored value under {key}");
        Ok(key)
    }

    pub async fn get(&self, options: &GetOptions) -> Result<Option<String>, command::Error> {
        if options.int {
            let value = self.cache.get_int(&options.key).await?;
            return Ok(value.map(|value| value.to_string()));
        }

        Ok(self.cache.get_str(&options.key).await?)
    }

    pub async fn replay(&self, _options: &ReplayOptions) -> Result<String, command::Error> {
        Ok(self.cache.replay().await?.to_string())
    }
}
