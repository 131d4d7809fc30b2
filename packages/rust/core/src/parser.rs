//! First pipeline stage: classify one raw input and normalize it.
//!
//! Dispatch order (first match wins, each branch independently overridable):
//! 1. null input → skip
//! 2. text containing `{ } < > [ ]` → JSON decode, then markup decode
//! 3. other text → remote reference, falling back to a literal string
//! 4. node collection → named mapping or positional sequence
//! 5. already-structured sequence / mapping → identity override points
//!
//! Remote references are resolved here: fetched content is fed back through
//! the full parse recursively, so a parsed value handed to the composer never
//! contains an unresolved address.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use anyload_fetch::{FetchOutcome, extract_address};
use anyload_markup::NodeCollection;
use anyload_shared::{AnyloadError, FetchPolicy, Result};

use crate::hooks::{Ctx, HookFuture, Hooks};
use crate::input::Input;

/// Characters that mark text as a JSON/markup literal rather than a reference.
const LITERAL_MARKERS: [char; 6] = ['{', '}', '<', '>', '[', ']'];

/// Parse one raw input into a normalized value, or `None` to skip it.
pub(crate) fn parse(hooks: Arc<Hooks>, ctx: Ctx, input: Input) -> HookFuture<Option<Value>> {
    Box::pin(async move {
        if let Some(hook) = &hooks.parse {
            return hook(input, ctx.clone()).await;
        }
        dispatch(&hooks, &ctx, input).await
    })
}

async fn dispatch(hooks: &Arc<Hooks>, ctx: &Ctx, input: Input) -> Result<Option<Value>> {
    let value = match input {
        Input::Null => return Ok(None),
        Input::Text(text) => {
            if text.contains(LITERAL_MARKERS) {
                match parse_literal(hooks, ctx, text).await? {
                    Some(value) => value,
                    None => return Ok(None),
                }
            } else {
                // Remote results are already fully parsed by the recursive
                // re-parse; they skip the structured override points below.
                return parse_reference(hooks, ctx, text).await;
            }
        }
        Input::Nodes(nodes) => match parse_node_collection(hooks, ctx, nodes).await? {
            Some(value) => value,
            None => return Ok(None),
        },
        Input::Value(value) => value,
    };

    finish_structured(hooks, ctx, value).await
}

/// Text literal: JSON first, markup second, null on both failures.
async fn parse_literal(hooks: &Arc<Hooks>, ctx: &Ctx, text: String) -> Result<Option<Value>> {
    let json = match &hooks.parse_json {
        Some(hook) => hook(text.clone(), ctx.clone()).await?,
        None => ctx.defaults().parse_json(&text),
    };
    if let Some(value) = json {
        debug!("parsed text as JSON");
        return Ok(Some(value));
    }

    let nodes = match &hooks.parse_markup {
        Some(hook) => hook(text.clone(), ctx.clone()).await?,
        None => ctx.defaults().parse_markup(&text),
    };
    match nodes {
        Some(nodes) => {
            debug!(count = nodes.len(), "parsed text as markup");
            parse_node_collection(hooks, ctx, nodes).await
        }
        None => {
            debug!("text decoded as neither JSON nor markup");
            Ok(None)
        }
    }
}

/// Text without literal markers: a possible remote reference, otherwise the
/// string itself.
async fn parse_reference(hooks: &Arc<Hooks>, ctx: &Ctx, text: String) -> Result<Option<Value>> {
    if let Some(hook) = &hooks.parse_uri {
        if let Some(value) = hook(text.clone(), ctx.clone()).await? {
            return Ok(Some(value));
        }
    } else if let Some(address) = extract_address(&text) {
        return resolve_remote(hooks, ctx, text, address).await;
    }

    match &hooks.parse_string {
        Some(hook) => hook(text, ctx.clone()).await,
        None => Ok(Some(ctx.defaults().parse_string(&text))),
    }
}

/// Fetch an address and feed the content back through the full parse.
async fn resolve_remote(
    hooks: &Arc<Hooks>,
    ctx: &Ctx,
    original: String,
    address: String,
) -> Result<Option<Value>> {
    debug!(%address, "resolving remote reference");
    match ctx.defaults().fetcher.fetch(&address).await {
        FetchOutcome::Text(content) => parse(hooks.clone(), ctx.clone(), Input::Text(content)).await,
        FetchOutcome::Failed(reason) => match ctx.defaults().fetch_policy() {
            FetchPolicy::DegradeToLiteral => {
                debug!(%address, %reason, "fetch failed, degrading to literal");
                Ok(Some(Value::String(original)))
            }
            FetchPolicy::Fail => Err(AnyloadError::remote(address, reason)),
        },
    }
}

async fn parse_node_collection(
    hooks: &Arc<Hooks>,
    ctx: &Ctx,
    nodes: NodeCollection,
) -> Result<Option<Value>> {
    match &hooks.parse_nodes {
        Some(hook) => hook(nodes, ctx.clone()).await,
        None => Ok(Some(ctx.defaults().parse_nodes(nodes))),
    }
}

/// Run a normalized value through the sequence/mapping override points.
async fn finish_structured(hooks: &Arc<Hooks>, ctx: &Ctx, value: Value) -> Result<Option<Value>> {
    match value {
        Value::Array(items) => match &hooks.parse_seq {
            Some(hook) => hook(items, ctx.clone()).await,
            None => Ok(Some(Value::Array(items))),
        },
        Value::Object(map) => match &hooks.parse_map {
            Some(hook) => hook(map, ctx.clone()).await,
            None => Ok(Some(Value::Object(map))),
        },
        other => Ok(Some(other)),
    }
}
