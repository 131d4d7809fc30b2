//! Second pipeline stage: walk a parsed value and apply structural hooks.
//!
//! Recursion is driven by the post-parse `compose` hook family: an element
//! hook applies to every sequence position, per-key and blanket entry hooks
//! apply per mapping key (and may rename keys), and the catch-all hook covers
//! values that matched no more specific slot. Hooks may suspend; every
//! container join is a fan-in barrier that preserves order and key set.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::join_all;
use serde_json::{Map, Value};

use anyload_shared::Result;

use crate::hooks::{Ctx, HookFuture, Hooks};

/// Compose one parsed value, or `None` to drop it.
pub(crate) fn compose(hooks: Arc<Hooks>, ctx: Ctx, value: Value) -> HookFuture<Option<Value>> {
    Box::pin(async move {
        match value {
            Value::String(_) => match &hooks.compose_string {
                Some(hook) => hook(value, ctx.clone()).await.map(Some),
                None => catch_all(&hooks, &ctx, value).await,
            },
            Value::Array(items) => compose_seq(&hooks, &ctx, items).await,
            Value::Object(map) => compose_map(&hooks, &ctx, map).await,
            other => catch_all(&hooks, &ctx, other).await,
        }
    })
}

/// Apply the element hook to every position, joining in order.
async fn compose_seq(hooks: &Arc<Hooks>, ctx: &Ctx, items: Vec<Value>) -> Result<Option<Value>> {
    let Some(hook) = &hooks.compose_element else {
        return catch_all(hooks, ctx, Value::Array(items)).await;
    };

    let joined = join_all(items.into_iter().map(|item| hook(item, ctx.clone()))).await;
    let composed = joined.into_iter().collect::<Result<Vec<Value>>>()?;
    Ok(Some(Value::Array(composed)))
}

/// Apply per-key hooks (specific over blanket), joining all entries while
/// preserving the (possibly renamed) key order.
async fn compose_map(
    hooks: &Arc<Hooks>,
    ctx: &Ctx,
    map: Map<String, Value>,
) -> Result<Option<Value>> {
    let any_specific = map.keys().any(|key| hooks.compose_keys.contains_key(key));
    if !any_specific && hooks.compose_entry.is_none() {
        return catch_all(hooks, ctx, Value::Object(map)).await;
    }

    let entries = map.into_iter().map(|(key, value)| {
        if let Some(hook) = hooks.compose_keys.get(&key) {
            hook(key, value, ctx.clone())
        } else if let Some(hook) = &hooks.compose_entry {
            hook(key, value, ctx.clone())
        } else {
            futures::future::ready(Ok((key, value))).boxed()
        }
    });

    let mut composed = Map::new();
    for entry in join_all(entries).await {
        let (key, value) = entry?;
        composed.insert(key, value);
    }
    Ok(Some(Value::Object(composed)))
}

/// Catch-all hook for values that matched no more specific slot.
async fn catch_all(hooks: &Arc<Hooks>, ctx: &Ctx, value: Value) -> Result<Option<Value>> {
    match &hooks.compose {
        Some(hook) => hook(value, ctx.clone()).await,
        None => Ok(Some(value)),
    }
}
