//! Content-loading and normalization pipeline.
//!
//! Heterogeneous inputs — raw text that may be JSON, markup, a plain string,
//! or a reference to a remote resource, as well as already-structured values
//! and markup-derived node collections — are normalized into one uniform
//! [`Value`]. Remote references resolve asynchronously, and every dispatch
//! branch of the two-stage parse → compose engine can be overridden by a
//! caller-supplied hook, keyed by kind and, recursively, by structural
//! position (object key or array element).
//!
//! This crate provides:
//! - [`Loader`] / [`LoaderBuilder`] — construction API and hook catalog
//! - [`Input`] — raw input classification
//! - [`Ctx`] / [`Defaults`] — the explicit context every hook receives
//!
//! Collaborators live in their own crates: `anyload-markup` (node
//! collections) and `anyload-fetch` (the [`Fetcher`] boundary and address
//! grammar).

mod composer;
pub mod hooks;
mod input;
mod loader;
mod parser;

pub use hooks::{
    ComposeHook, Ctx, Defaults, EntryHook, HookFuture, MapHook, MarkupHook, NodesHook, ParseHook,
    SeqHook, TextHook, ValueHook,
};
pub use input::Input;
pub use loader::{Loader, LoaderBuilder};

// Re-export the collaborator surface so most callers need only this crate.
pub use anyload_fetch::{FetchOutcome, Fetcher, HttpFetcher, extract_address};
pub use anyload_markup::{Node, NodeCollection};
pub use anyload_shared::{AnyloadError, FetchConfig, FetchPolicy, Result};
pub use serde_json::Value;
