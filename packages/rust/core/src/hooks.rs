//! Hook dispatch table, hook context, and built-in defaults.
//!
//! The registry is a typed dispatch table resolved at construction: one slot
//! per parse/compose kind, a map of per-key compose hooks, and catch-alls for
//! values that match no more specific slot. Every hook receives a [`Ctx`]
//! carrying the built-in [`Defaults`] (so overrides can delegate) and an
//! optional caller-supplied context value.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::{Map, Value};

use anyload_fetch::Fetcher;
use anyload_markup::NodeCollection;
use anyload_shared::{FetchPolicy, Result};

use crate::input::Input;

/// Boxed future returned by every hook.
pub type HookFuture<T> = BoxFuture<'static, Result<T>>;

/// Replaces the whole parse dispatch. Returning `None` drops the argument.
pub type ParseHook = Arc<dyn Fn(Input, Ctx) -> HookFuture<Option<Value>> + Send + Sync>;

/// Per-kind override for a text-shaped parse branch (string, JSON, reference).
/// Returning `None` falls through to the next branch in dispatch order.
pub type TextHook = Arc<dyn Fn(String, Ctx) -> HookFuture<Option<Value>> + Send + Sync>;

/// Override for the markup-decode branch. The returned collection continues
/// through the node-collection branch.
pub type MarkupHook =
    Arc<dyn Fn(String, Ctx) -> HookFuture<Option<NodeCollection>> + Send + Sync>;

/// Override for the node-collection branch.
pub type NodesHook = Arc<dyn Fn(NodeCollection, Ctx) -> HookFuture<Option<Value>> + Send + Sync>;

/// Override for already-structured sequences.
pub type SeqHook = Arc<dyn Fn(Vec<Value>, Ctx) -> HookFuture<Option<Value>> + Send + Sync>;

/// Override for already-structured mappings.
pub type MapHook =
    Arc<dyn Fn(Map<String, Value>, Ctx) -> HookFuture<Option<Value>> + Send + Sync>;

/// Catch-all compose hook. Returning `None` drops the value.
pub type ComposeHook = Arc<dyn Fn(Value, Ctx) -> HookFuture<Option<Value>> + Send + Sync>;

/// Compose hook for a single value (string, or each sequence element).
pub type ValueHook = Arc<dyn Fn(Value, Ctx) -> HookFuture<Value> + Send + Sync>;

/// Compose hook for one mapping entry; may rename the key.
pub type EntryHook = Arc<dyn Fn(String, Value, Ctx) -> HookFuture<(String, Value)> + Send + Sync>;

/// The resolved dispatch table. Immutable after construction, shared by every
/// recursive call within one loader.
#[derive(Default, Clone)]
pub(crate) struct Hooks {
    pub parse: Option<ParseHook>,
    pub parse_string: Option<TextHook>,
    pub parse_json: Option<TextHook>,
    pub parse_markup: Option<MarkupHook>,
    pub parse_uri: Option<TextHook>,
    pub parse_nodes: Option<NodesHook>,
    pub parse_seq: Option<SeqHook>,
    pub parse_map: Option<MapHook>,
    pub compose: Option<ComposeHook>,
    pub compose_string: Option<ValueHook>,
    pub compose_element: Option<ValueHook>,
    pub compose_entry: Option<EntryHook>,
    pub compose_keys: HashMap<String, EntryHook>,
}

// ---------------------------------------------------------------------------
// Hook context
// ---------------------------------------------------------------------------

/// Explicit context passed to every hook invocation.
///
/// Carries the built-in [`Defaults`] and an optional caller context value set
/// at construction with [`LoaderBuilder::context`](crate::LoaderBuilder::context).
#[derive(Clone)]
pub struct Ctx {
    pub(crate) defaults: Arc<Defaults>,
    pub(crate) user: Option<Arc<dyn Any + Send + Sync>>,
}

impl Ctx {
    /// The built-in default behaviors, for hooks that want to delegate.
    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// The caller-supplied context value, if one of type `T` was configured.
    pub fn user<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.user.clone().and_then(|ctx| ctx.downcast::<T>().ok())
    }
}

// ---------------------------------------------------------------------------
// Built-in defaults
// ---------------------------------------------------------------------------

/// Built-in default behaviors, queryable by overriding hooks through [`Ctx`].
pub struct Defaults {
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) policy: FetchPolicy,
}

impl Defaults {
    /// Default JSON decode: strips embedded newlines, carriage returns, and
    /// tabs before decoding, so JSON formatted inside other contexts still
    /// parses. Returns `None` on decode failure.
    pub fn parse_json(&self, text: &str) -> Option<Value> {
        let compact = text.replace(['\n', '\r', '\t'], "");
        serde_json::from_str(&compact).ok()
    }

    /// Default markup decode. Returns `None` when the text yields no elements.
    pub fn parse_markup(&self, text: &str) -> Option<NodeCollection> {
        anyload_markup::decode(text).ok()
    }

    /// Default node-collection normalization.
    ///
    /// If any node carries a name, the result is a mapping of named nodes and
    /// unnamed nodes are dropped; otherwise it is the positional sequence of
    /// node contents. An empty collection yields an empty sequence.
    pub fn parse_nodes(&self, nodes: NodeCollection) -> Value {
        if nodes.has_named() {
            let mut map = Map::new();
            for node in nodes {
                if let Some(name) = node.name {
                    map.insert(name, Value::String(node.content));
                }
            }
            Value::Object(map)
        } else {
            Value::Array(
                nodes
                    .into_iter()
                    .map(|node| Value::String(node.content))
                    .collect(),
            )
        }
    }

    /// Default string parse: the text itself.
    pub fn parse_string(&self, text: &str) -> Value {
        Value::String(text.to_string())
    }

    /// The configured remote-failure policy.
    pub fn fetch_policy(&self) -> FetchPolicy {
        self.policy
    }
}
