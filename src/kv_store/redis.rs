use async_trait::async_trait;
use redis::AsyncCommands;
use serde::Deserialize;
use tracing::{debug, info};

use crate::kv_store::{Error, KeyValueStore};

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct BackendConfig {
    pub url: String,
    #[serde(default)]
    pub key_prefix: String,
}

#[derive(Debug)]
pub struct Backend {
    client: redis::Client,
    key_prefix: String,
}

impl Backend {
    pub fn new(config: &BackendConfig) -> Result<Self, Error> {
        info!("Using Redis key-value store");
        let client = redis::Client::open(config.url.as_str())?;
        Ok(Backend {
            client,
            key_prefix: config.key_prefix.clone(),
        })
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, Error> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }

    fn key(&self, key: &str) -> String {
        format!("{}{key}", self.key_prefix)
    }
}

#[async_trait]
impl KeyValueStore for Backend {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let mut conn = self.get_connection().await?;
        let value: Option<String> = conn.get(self.key(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut conn = self.get_connection().await?;
        Ok(conn.set(self.key(key), value).await?)
    }

    async fn set_ex(&self, key: &str, value: &str, expires_in: u64) -> Result<(), Error> {
        let mut conn = self.get_connection().await?;
        Ok(conn.set_ex(self.key(key), value, expires_in).await?)
    }

    async fn incr(&self, key: &str) -> Result<i64, Error> {
        let mut conn = self.get_connection().await?;
        let value: i64 = conn.incr(self.key(key), 1).await?;
        Ok(value)
    }

    async fn push(&self, key: &str, value: &str) -> Result<u64, Error> {
        let mut conn = self.get_connection().await?;
        let length: u64 = conn.rpush(self.key(key), value).await?;
        Ok(length)
    }

    async fn range(&self, key: &str) -> Result<Vec<String>, Error> {
        let mut conn = self.get_connection().await?;
        let values: Vec<String> = conn.lrange(self.key(key), 0, -1).await?;
        Ok(values)
    }

    async fn flush(&self) -> Result<(), Error> {
        let mut conn = self.get_connection().await?;

        if self.key_prefix.is_empty() {
            debug!("Flushing Redis database");
            let _: () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
            return Ok(());
        }

        let pattern = format!("{}*", escape_pattern(&self.key_prefix));
        let mut cursor = 0_u64;
        let mut flushed = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .cursor_arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                flushed += keys.len();
                let _: () = conn.del(keys).await?;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!("Flushed {flushed} keys under prefix {}", self.key_prefix);
        Ok(())
    }
}

const SCAN_COUNT: usize = 100;

/// Escapes the glob characters of a `SCAN MATCH` pattern so the key prefix matches literally.
fn escape_pattern(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
