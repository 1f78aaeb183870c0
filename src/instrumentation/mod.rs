//! Call counting and call history decorators.
//!
//! A [`Method`] is any named async operation. [`CountCalls`] and [`CallHistory`] wrap a method
//! and implement [`Method`] themselves, so they stack the same way as the wrapped operation is
//! called:
//!
//! ```ignore
//! let method = StoreData::new(store.clone())
//!     .count_calls(store.clone())
//!     .call_history(store.clone());
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::kv_store::{self, serializing, KeyValueStore};

mod replay;

pub use replay::{replay, Replay};

#[async_trait]
pub trait Method: Send + Sync {
    type Input: Serialize + Send + Sync + 'static;
    type Output: Serialize + Send + 'static;
    type Error: From<kv_store::Error> + Send;

    /// Identity under which counters and call records are kept, e.g. `Cache.store`
    fn qualified_name(&self) -> &str;

    async fn call(&self, input: Self::Input) -> Result<Self::Output, Self::Error>;
}

pub fn inputs_key(qualified_name: &str) -> String {
    format!("{qualified_name}:inputs")
}

pub fn outputs_key(qualified_name: &str) -> String {
    format!("{qualified_name}:outputs")
}

/// Increments the counter named after the wrapped method on every call.
pub struct CountCalls<M> {
    store: Arc<dyn KeyValueStore>,
    inner: M,
}

impl<M: Method> CountCalls<M> {
    pub fn new(store: Arc<dyn KeyValueStore>, inner: M) -> Self {
        Self { store, inner }
    }
}

#[async_trait]
impl<M: Method> Method for CountCalls<M> {
    type Input = M::Input;
    type Output = M::Output;
    type Error = M::Error;

    fn qualified_name(&self) -> &str {
        self.inner.qualified_name()
    }

    async fn call(&self, input: Self::Input) -> Result<Self::Output, Self::Error> {
        let count = self.store.incr(self.qualified_name()).await?;
        debug!("{} called {count} times", self.qualified_name());
        self.inner.call(input).await
    }
}

/// Appends the input and the output of every call to the method's call records.
///
/// The wrapped method is invoked exactly once per call; the recorded output is the value
/// returned to the caller. A failed call leaves its input recorded and no output.
pub struct CallHistory<M> {
    store: Arc<dyn KeyValueStore>,
    inner: M,
}

impl<M: Method> CallHistory<M> {
    pub fn new(store: Arc<dyn KeyValueStore>, inner: M) -> Self {
        Self { store, inner }
    }
}

#[async_trait]
impl<M: Method> Method for CallHistory<M> {
    type Input = M::Input;
    type Output = M::Output;
    type Error = M::Error;

    fn qualified_name(&self) -> &str {
        self.inner.qualified_name()
    }

    async fn call(&self, input: Self::Input) -> Result<Self::Output, Self::Error> {
        let name = self.qualified_name();

        serializing::push(self.store.as_ref(), &inputs_key(name), &input).await?;
        let output = self.inner.call(input).await?;

        let record = serializing::to_record(&output)?;
        self.store.push(&outputs_key(name), &record).await?;

        Ok(output)
    }
}

pub trait MethodExt: Method + Sized {
    fn count_calls(self, store: Arc<dyn KeyValueStore>) -> CountCalls<Self> {
        CountCalls::new(store, self)
    }

    fn call_history(self, store: Arc<dyn KeyValueStore>) -> CallHistory<Self> {
        CallHistory::new(store, self)
    }
}

impl<M: Method> MethodExt for M {}
