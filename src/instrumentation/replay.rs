use std::fmt;

use serde_json::Value;

use crate::instrumentation::{inputs_key, outputs_key};
use crate::kv_store::{serializing, Error, KeyValueStore};

/// Counter and call records of one method, as read back from the store.
#[derive(Clone, Debug, PartialEq)]
pub struct Replay {
    pub qualified_name: String,
    pub count: i64,
    pub inputs: Vec<Value>,
    pub outputs: Vec<String>,
}

impl Replay {
    /// Recorded calls as `(arguments, output)` pairs in call order
    pub fn calls(&self) -> impl Iterator<Item = (&Value, &str)> {
        self.inputs
            .iter()
            .zip(self.outputs.iter())
            .map(|(input, output)| (input, output.as_str()))
    }
}

fn format_arguments(input: &Value) -> String {
    match input {
        Value::Array(arguments) => arguments
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

impl fmt::Display for Replay {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} was called {} times:",
            self.qualified_name, self.count
        )?;
        for (input, output) in self.calls() {
            write!(
                f,
                "\n{}({}) -> {output}",
                self.qualified_name,
                format_arguments(input)
            )?;
        }
        Ok(())
    }
}

pub async fn replay(store: &dyn KeyValueStore, qualified_name: &str) -> Result<Replay, Error> {
    let count = match store.get(qualified_name).await? {
        Some(count) => count.parse::<i64>().map_err(|e| {
            Error::Execution(format!("Invalid call counter for {qualified_name}: {e}"))
        })?,
        None => 0,
    };

    Ok(Replay {
        qualified_name: qualified_name.to_string(),
        count,
        inputs: serializing::range(store, &inputs_key(qualified_name)).await?,
        outputs: store.range(&outputs_key(qualified_name)).await?,
    })
}
