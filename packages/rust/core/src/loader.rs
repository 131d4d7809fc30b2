//! Loader construction and the call aggregator.
//!
//! A [`Loader`] is built once from a [`LoaderBuilder`] (hooks, fetcher,
//! failure policy, caller context) and is then immutable: the dispatch table
//! is shared via `Arc` across every recursive call. Configuration errors
//! surface at [`LoaderBuilder::build`], never at call time.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::join_all;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use anyload_fetch::{Fetcher, HttpFetcher};
use anyload_markup::NodeCollection;
use anyload_shared::{AnyloadError, FetchConfig, FetchPolicy, Result};

use crate::composer;
use crate::hooks::{Ctx, Defaults, EntryHook, Hooks};
use crate::input::Input;
use crate::parser;

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// A configured content loader.
///
/// Cheap to clone; clones share the same immutable dispatch table and
/// collaborators. Nested loaders are constructed independently and inherit
/// nothing from the loader they are installed into.
#[derive(Clone)]
pub struct Loader {
    hooks: Arc<Hooks>,
    ctx: Ctx,
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader").finish_non_exhaustive()
    }
}

impl Loader {
    /// Start building a loader.
    pub fn builder() -> LoaderBuilder {
        LoaderBuilder::default()
    }

    /// A loader with all-default behavior.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Load any number of inputs.
    ///
    /// Each input is independently parsed then composed; inputs producing
    /// `None` are dropped from the output rather than left as holes. If every
    /// input drops, the result is `Ok(None)` — never an empty list. The join
    /// preserves call order and resolves only once every input has resolved.
    #[instrument(skip_all)]
    pub async fn load<I, T>(&self, inputs: I) -> Result<Option<Vec<Value>>>
    where
        I: IntoIterator<Item = T>,
        T: Into<Input>,
    {
        let tasks = inputs.into_iter().map(|input| {
            let hooks = self.hooks.clone();
            let ctx = self.ctx.clone();
            let input = input.into();
            async move {
                match parser::parse(hooks.clone(), ctx.clone(), input).await? {
                    Some(value) => composer::compose(hooks, ctx, value).await,
                    None => Ok(None),
                }
            }
        });

        let results: Vec<Value> = join_all(tasks)
            .await
            .into_iter()
            .collect::<Result<Vec<Option<Value>>>>()?
            .into_iter()
            .flatten()
            .collect();

        debug!(count = results.len(), "load complete");
        if results.is_empty() {
            Ok(None)
        } else {
            Ok(Some(results))
        }
    }

    /// Load a single input, returning its composed value (or `None` if the
    /// input was dropped). This is the entry point nested loaders use.
    pub async fn load_one(&self, input: impl Into<Input>) -> Result<Option<Value>> {
        let results = self.load([input.into()]).await?;
        Ok(results.map(|mut values| values.remove(0)))
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`Loader`]; see the crate docs for the hook catalog.
#[derive(Default)]
pub struct LoaderBuilder {
    hooks: Hooks,
    compose_keys: Vec<(String, EntryHook)>,
    fetch: FetchConfig,
    fetcher: Option<Arc<dyn Fetcher>>,
    user: Option<Arc<dyn Any + Send + Sync>>,
}

impl LoaderBuilder {
    /// Replace the entire parse dispatch. Returning `Ok(None)` drops the
    /// argument.
    pub fn parse<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Input, Ctx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>>> + Send + 'static,
    {
        self.hooks.parse = Some(Arc::new(move |input, ctx| hook(input, ctx).boxed()));
        self
    }

    /// Override the plain-string branch.
    pub fn parse_string<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(String, Ctx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>>> + Send + 'static,
    {
        self.hooks.parse_string = Some(Arc::new(move |text, ctx| hook(text, ctx).boxed()));
        self
    }

    /// Override the JSON-decode branch. Returning `Ok(None)` falls through to
    /// markup decoding.
    pub fn parse_json<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(String, Ctx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>>> + Send + 'static,
    {
        self.hooks.parse_json = Some(Arc::new(move |text, ctx| hook(text, ctx).boxed()));
        self
    }

    /// Override the markup-decode branch. The returned node collection
    /// continues through the node-collection branch.
    pub fn parse_markup<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(String, Ctx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<NodeCollection>>> + Send + 'static,
    {
        self.hooks.parse_markup = Some(Arc::new(move |text, ctx| hook(text, ctx).boxed()));
        self
    }

    /// Override the remote-reference branch. Returning `Ok(None)` falls
    /// through to the plain-string branch.
    pub fn parse_uri<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(String, Ctx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>>> + Send + 'static,
    {
        self.hooks.parse_uri = Some(Arc::new(move |text, ctx| hook(text, ctx).boxed()));
        self
    }

    /// Override the node-collection branch.
    pub fn parse_nodes<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(NodeCollection, Ctx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>>> + Send + 'static,
    {
        self.hooks.parse_nodes = Some(Arc::new(move |nodes, ctx| hook(nodes, ctx).boxed()));
        self
    }

    /// Override the already-structured sequence branch (identity by default).
    pub fn parse_seq<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Vec<Value>, Ctx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>>> + Send + 'static,
    {
        self.hooks.parse_seq = Some(Arc::new(move |items, ctx| hook(items, ctx).boxed()));
        self
    }

    /// Override the already-structured mapping branch (identity by default).
    pub fn parse_map<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Map<String, Value>, Ctx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>>> + Send + 'static,
    {
        self.hooks.parse_map = Some(Arc::new(move |map, ctx| hook(map, ctx).boxed()));
        self
    }

    /// Catch-all compose hook for values matching no more specific slot.
    /// Returning `Ok(None)` drops the value.
    pub fn compose<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Value, Ctx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>>> + Send + 'static,
    {
        self.hooks.compose = Some(Arc::new(move |value, ctx| hook(value, ctx).boxed()));
        self
    }

    /// Compose hook for string values.
    pub fn compose_string<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Value, Ctx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        self.hooks.compose_string = Some(Arc::new(move |value, ctx| hook(value, ctx).boxed()));
        self
    }

    /// Compose hook applied to every element of a sequence.
    pub fn compose_element<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Value, Ctx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        self.hooks.compose_element = Some(Arc::new(move |value, ctx| hook(value, ctx).boxed()));
        self
    }

    /// Blanket compose hook applied to every mapping entry not covered by a
    /// per-key hook. May rename the key.
    pub fn compose_entry<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(String, Value, Ctx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(String, Value)>> + Send + 'static,
    {
        self.hooks.compose_entry =
            Some(Arc::new(move |key, value, ctx| hook(key, value, ctx).boxed()));
        self
    }

    /// Compose hook for one specific mapping key. May rename the key.
    pub fn compose_key<F, Fut>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(String, Value, Ctx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(String, Value)>> + Send + 'static,
    {
        self.compose_keys.push((
            name.into(),
            Arc::new(move |key, value, ctx| hook(key, value, ctx).boxed()),
        ));
        self
    }

    /// Install an independently built loader as the compose hook for one key.
    /// String values are re-read as raw text, so embedded markup decomposes.
    pub fn nested_key(self, name: impl Into<String>, loader: Loader) -> Self {
        self.compose_key(name, move |key, value, _ctx| {
            let loader = loader.clone();
            async move {
                let composed = loader.load_one(Input::reparse(value)).await?;
                Ok((key, composed.unwrap_or(Value::Null)))
            }
        })
    }

    /// Install an independently built loader as the compose hook for every
    /// sequence element.
    pub fn nested_element(self, loader: Loader) -> Self {
        self.compose_element(move |value, _ctx| {
            let loader = loader.clone();
            async move {
                let composed = loader.load_one(Input::reparse(value)).await?;
                Ok(composed.unwrap_or(Value::Null))
            }
        })
    }

    /// Replace the remote fetcher (defaults to [`HttpFetcher`]).
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Set the fetch configuration used to build the default fetcher.
    pub fn fetch_config(mut self, config: FetchConfig) -> Self {
        self.fetch = config;
        self
    }

    /// Set the remote-failure policy.
    pub fn fetch_policy(mut self, policy: FetchPolicy) -> Self {
        self.fetch.policy = policy;
        self
    }

    /// Attach a caller context value, surfaced to every hook via
    /// [`Ctx::user`].
    pub fn context<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.user = Some(Arc::new(value));
        self
    }

    /// Validate the configuration and build the loader.
    pub fn build(self) -> Result<Loader> {
        let mut hooks = self.hooks;
        for (name, hook) in self.compose_keys {
            if name.is_empty() {
                return Err(AnyloadError::config("compose hook key is empty"));
            }
            if hooks.compose_keys.insert(name.clone(), hook).is_some() {
                return Err(AnyloadError::config(format!(
                    "duplicate compose hook for key {name:?}"
                )));
            }
        }

        let policy = self.fetch.policy;
        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new(&self.fetch)?),
        };

        Ok(Loader {
            hooks: Arc::new(hooks),
            ctx: Ctx {
                defaults: Arc::new(Defaults { fetcher, policy }),
                user: self.user,
            },
        })
    }
}
