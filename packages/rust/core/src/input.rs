//! Raw input classification.

use anyload_markup::NodeCollection;
use serde_json::Value;

/// One raw argument to a load call.
///
/// Inputs are read-only and classified exactly once per parse. Text may turn
/// out to be JSON, markup, a remote reference, or a plain string; structured
/// values and node collections skip straight to their dispatch branch.
#[derive(Debug, Clone)]
pub enum Input {
    /// A nullish argument — skipped by the call aggregator.
    Null,
    /// Raw text of an as-yet-unknown kind.
    Text(String),
    /// A markup-derived node collection.
    Nodes(NodeCollection),
    /// An already-structured value (mapping, sequence, or scalar).
    Value(Value),
}

impl Input {
    /// Classify an already-parsed value back into an input.
    ///
    /// Strings are re-read as raw text so that nested loaders can decode
    /// embedded markup or JSON; everything else passes through structurally.
    pub fn reparse(value: Value) -> Self {
        match value {
            Value::Null => Input::Null,
            Value::String(text) => Input::Text(text),
            other => Input::Value(other),
        }
    }
}

impl From<&str> for Input {
    fn from(text: &str) -> Self {
        Input::Text(text.to_string())
    }
}

impl From<String> for Input {
    fn from(text: String) -> Self {
        Input::Text(text)
    }
}

impl From<NodeCollection> for Input {
    fn from(nodes: NodeCollection) -> Self {
        Input::Nodes(nodes)
    }
}

impl From<Value> for Input {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Input::Null,
            other => Input::Value(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_value_becomes_null_input() {
        assert!(matches!(Input::from(Value::Null), Input::Null));
    }

    #[test]
    fn reparse_reads_strings_as_text() {
        let input = Input::reparse(json!("<i>a</i>"));
        assert!(matches!(input, Input::Text(t) if t == "<i>a</i>"));

        let input = Input::reparse(json!({"k": "v"}));
        assert!(matches!(input, Input::Value(Value::Object(_))));
    }
}
