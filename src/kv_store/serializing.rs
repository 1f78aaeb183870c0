use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::kv_store::{Error, KeyValueStore};

/// JSON-encode `value` and append it to the list at `key`.
pub async fn push<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<u64, Error>
where
    T: Serialize + ?Sized,
{
    let serialized = match serde_json::to_string(value) {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to serialize value for key {key}: {e}");
            let msg = format!("Failed to serialize value: {e}");
            return Err(Error::Execution(msg));
        }
    };

    store.push(key, &serialized).await
}

/// Read every entry of the list at `key`, decoding each one as JSON.
pub async fn range<T>(store: &dyn KeyValueStore, key: &str) -> Result<Vec<T>, Error>
where
    T: DeserializeOwned,
{
    store
        .range(key)
        .await?
        .iter()
        .map(|entry| {
            serde_json::from_str::<T>(entry).map_err(|e| {
                warn!("Failed to deserialize list entry for key {key}: {e}");
                Error::Execution(format!("Failed to deserialize list entry: {e}"))
            })
        })
        .collect()
}

/// Textual form of a value as written to a call record: strings verbatim, anything else as JSON.
pub fn to_record<T>(value: &T) -> Result<String, Error>
where
    T: Serialize + ?Sized,
{
    match serde_json::to_value(value) {
        Ok(Value::String(s)) => Ok(s),
        Ok(other) => Ok(other.to_string()),
        Err(e) => {
            warn!("Failed to serialize value for recording: {e}");
            Err(Error::Execution(format!("Failed to serialize value: {e}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv_store::memory::Backend;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[derive(Debug, Serialize)]
    struct UnserializableData {
        #[serde(serialize_with = "fail_serialization")]
        value: i32,
    }

    fn fail_serialization<S>(_: &i32, _: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        Err(serde::ser::Error::custom(
            "Intentional serialization failure",
        ))
    }

    #[tokio::test]
    async fn test_push_and_range() {
        let store = Backend::new();
        let first = TestData {
            name: "first".to_string(),
            value: 1,
        };
        let second = TestData {
            name: "second".to_string(),
            value: 2,
        };

        push(&store, "list", &first).await.unwrap();
        push(&store, "list", &second).await.unwrap();

        let values: Vec<TestData> = range(&store, "list").await.unwrap();
        assert_eq!(values, vec![first, second]);
    }

    #[tokio::test]
    async fn test_push_serialization_error() {
        let store = Backend::new();
        let bad_data = UnserializableData { value: 42 };

        let result = push(&store, "list", &bad_data).await;

        match result {
            Err(Error::Execution(msg)) => {
                assert!(msg.contains("Failed to serialize value"));
            }
            other => panic!("Expected Execution error, got {other:?}"),
        }
        assert_eq!(store.range("list").await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn test_range_deserialization_error() {
        let store = Backend::new();
        store.push("list", "invalid json").await.unwrap();

        let result: Result<Vec<TestData>, Error> = range(&store, "list").await;

        assert!(matches!(result, Err(Error::Execution(_))));
    }

    #[test]
    fn test_to_record() {
        assert_eq!(to_record("abc"), Ok("abc".to_string()));
        assert_eq!(to_record(&42), Ok("42".to_string()));
        assert_eq!(to_record(&("hello",)), Ok("[\"hello\"]".to_string()));
        assert!(to_record(&UnserializableData { value: 1 }).is_err());
    }
}
