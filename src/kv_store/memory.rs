use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::info;

use crate::kv_store::{Error, KeyValueStore};

#[derive(Clone, Debug)]
enum Value {
    Text(String),
    List(Vec<String>),
}

#[derive(Clone, Debug)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expiry| expiry > now)
    }
}

#[derive(Debug)]
pub struct Backend {
    store: Arc<RwLock<HashMap<String, Entry>>>,
    counter: Arc<AtomicUsize>,
}

impl Default for Backend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend {
    pub fn new() -> Self {
        info!("Using in-memory key-value store");
        Backend {
            store: Arc::new(RwLock::new(HashMap::new())),
            counter: Arc::new(AtomicUsize::new(0)),
        }
    }

    async fn cleanup_expired(&self) {
        let count = self.counter.fetch_add(1, Ordering::Relaxed);

        if count.is_multiple_of(1000) {
            let mut store = self.store.write().await;
            let now = Instant::now();
            store.retain(|_, entry| entry.is_live(now));
        }
    }

    async fn live_entry(&self, key: &str) -> Option<Entry> {
        self.cleanup_expired().await;

        let store = self.store.read().await;
        store
            .get(key)
            .filter(|entry| entry.is_live(Instant::now()))
            .cloned()
    }
}

#[async_trait]
impl KeyValueStore for Backend {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        match self.live_entry(key).await {
            Some(Entry {
                value: Value::Text(value),
                ..
            }) => Ok(Some(value)),
            Some(_) => Err(Error::Backend(format!("Key {key} does not hold a string"))),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.cleanup_expired().await;

        let mut store = self.store.write().await;
        store.insert(
            key.to_string(),
            Entry {
                value: Value::Text(value.to_string()),
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn set_ex(&self, key: &str, value: &str, expires_in: u64) -> Result<(), Error> {
        self.cleanup_expired().await;

        let mut store = self.store.write().await;
        store.insert(
            key.to_string(),
            Entry {
                value: Value::Text(value.to_string()),
                expires_at: Some(Instant::now() + Duration::from_secs(expires_in)),
            },
        );
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64, Error> {
        self.cleanup_expired().await;

        let mut store = self.store.write().await;
        let now = Instant::now();

        match store.get_mut(key).filter(|entry| entry.is_live(now)) {
            Some(Entry {
                value: Value::Text(value),
                ..
            }) => {
                let current = value.parse::<i64>().map_err(|_| {
                    Error::Backend(format!("Value of key {key} is not an integer"))
                })?;
                let next = current
                    .checked_add(1)
                    .ok_or_else(|| Error::Backend(format!("Increment of key {key} overflows")))?;
                *value = next.to_string();
                Ok(next)
            }
            Some(_) => Err(Error::Backend(format!("Key {key} does not hold a string"))),
            None => {
                store.insert(
                    key.to_string(),
                    Entry {
                        value: Value::Text("1".to_string()),
                        expires_at: None,
                    },
                );
                Ok(1)
            }
        }
    }

    async fn push(&self, key: &str, value: &str) -> Result<u64, Error> {
        self.cleanup_expired().await;

        let mut store = self.store.write().await;
        let now = Instant::now();

        match store.get_mut(key).filter(|entry| entry.is_live(now)) {
            Some(Entry {
                value: Value::List(list),
                ..
            }) => {
                list.push(value.to_string());
                Ok(list.len() as u64)
            }
            Some(_) => Err(Error::Backend(format!("Key {key} does not hold a list"))),
            None => {
                store.insert(
                    key.to_string(),
                    Entry {
                        value: Value::List(vec![value.to_string()]),
                        expires_at: None,
                    },
                );
                Ok(1)
            }
        }
    }

    async fn range(&self, key: &str) -> Result<Vec<String>, Error> {
        match self.live_entry(key).await {
            Some(Entry {
                value: Value::List(list),
                ..
            }) => Ok(list),
            Some(_) => Err(Error::Backend(format!("Key {key} does not hold a list"))),
            None => Ok(Vec::new()),
        }
    }

    async fn flush(&self) -> Result<(), Error> {
        self.store.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time;

    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = Backend::new();

        assert_eq!(store.get("key").await, Ok(None));
        store.set("key", "value").await.unwrap();
        assert_eq!(store.get("key").await, Ok(Some("value".to_string())));
    }

    #[tokio::test]
    async fn test_set_ex_expires() {
        let store = Backend::new();

        store.set_ex("key", "value", 1).await.unwrap();
        assert_eq!(store.get("key").await, Ok(Some("value".to_string())));

        time::sleep(Duration::from_millis(1050)).await;
        assert_eq!(store.get("key").await, Ok(None));
    }

    #[tokio::test]
    async fn test_set_clears_expiry() {
        let store = Backend::new();

        store.set_ex("key", "short", 1).await.unwrap();
        store.set("key", "long").await.unwrap();

        time::sleep(Duration::from_millis(1050)).await;
        assert_eq!(store.get("key").await, Ok(Some("long".to_string())));
    }

    #[tokio::test]
    async fn test_incr() {
        let store = Backend::new();

        assert_eq!(store.incr("counter").await, Ok(1));
        assert_eq!(store.incr("counter").await, Ok(2));
        assert_eq!(store.get("counter").await, Ok(Some("2".to_string())));

        store.set("counter", "41").await.unwrap();
        assert_eq!(store.incr("counter").await, Ok(42));
    }

    #[tokio::test]
    async fn test_incr_not_an_integer() {
        let store = Backend::new();

        store.set("key", "hello").await.unwrap();
        assert!(matches!(store.incr("key").await, Err(Error::Backend(_))));
    }

    #[tokio::test]
    async fn test_push_and_range() {
        let store = Backend::new();

        assert_eq!(store.range("list").await, Ok(Vec::new()));
        assert_eq!(store.push("list", "a").await, Ok(1));
        assert_eq!(store.push("list", "b").await, Ok(2));
        assert_eq!(store.push("list", "c").await, Ok(3));
        assert_eq!(
            store.range("list").await,
            Ok(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[tokio::test]
    async fn test_wrong_type() {
        let store = Backend::new();

        store.push("list", "a").await.unwrap();
        store.set("text", "a").await.unwrap();

        assert!(matches!(store.get("list").await, Err(Error::Backend(_))));
        assert!(matches!(store.incr("list").await, Err(Error::Backend(_))));
        assert!(matches!(store.push("text", "b").await, Err(Error::Backend(_))));
        assert!(matches!(store.range("text").await, Err(Error::Backend(_))));
    }

    #[tokio::test]
    async fn test_flush() {
        let store = Backend::new();

        store.set("key", "value").await.unwrap();
        store.push("list", "value").await.unwrap();
        store.flush().await.unwrap();

        assert_eq!(store.get("key").await, Ok(None));
        assert_eq!(store.range("list").await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn test_cleanup_on_counter() {
        let store = Backend::new();

        for i in 0..500 {
            store
                .set_ex(&format!("short_{i}"), "value", 1)
                .await
                .unwrap();
        }

        for i in 0..5 {
            store
                .set_ex(&format!("long_{i}"), "value", 100)
                .await
                .unwrap();
        }

        time::sleep(Duration::from_millis(1100)).await;

        for i in 0..495 {
            let _ = store.get(&format!("nonexistent_{i}")).await;
        }

        assert_eq!(store.get("long_0").await, Ok(Some("value".to_string())));
        assert_eq!(store.store.read().await.len(), 5);
        assert_eq!(store.get("short_0").await, Ok(None));
    }
}
