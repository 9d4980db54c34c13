//! # Storage Layer
//!
//! The bookmark store itself belongs to the host (a browser, or a JSON file
//! standing in for one). This module splits access to it in two:
//!
//! - [`BookmarkBackend`]: the raw host capability, one async call per host
//!   operation (get tree, create, move, remove, ...). Backends decide *how*
//!   nodes are kept.
//! - [`adapter::BookmarksAdapter`]: the thin facade the engine talks to. It
//!   fills in defaults (parent group, append position) and logs each call, but
//!   never retries and never rewrites an error.
//!
//! ## Implementations
//!
//! - [`mem_backend::MemBackend`]: in-memory host for tests, with failure
//!   injection and a mutation counter.
//! - [`fs_backend::FsBackend`]: JSON-file host used by the CLI
//!   (`bookmarks.json`, written atomically after every mutation).
//!
//! Both delegate the actual tree semantics to [`tree::BookmarkTree`].

use crate::error::Result;
use crate::model::BookmarkNode;

pub mod adapter;
pub mod fs_backend;
pub mod mem_backend;
pub mod tree;

/// What to create: a leaf when `url` is set, a group otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDetails {
    pub parent_id: String,
    pub title: String,
    pub url: Option<String>,
    /// Position under the parent; `None` appends.
    pub index: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateChanges {
    pub title: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub parent_id: String,
    pub index: Option<usize>,
}

/// Host-provided bookmark store.
///
/// Every call either resolves with the host's result or fails with the host's
/// error. Callers issue one call at a time and await it before the next.
#[allow(async_fn_in_trait)]
pub trait BookmarkBackend {
    /// The full tree: a one-element list holding the super-root.
    async fn get_tree(&self) -> Result<Vec<BookmarkNode>>;

    /// Direct children of a group. Child groups carry an empty `children` list.
    async fn get_children(&self, parent_id: &str) -> Result<Vec<BookmarkNode>>;

    /// A node with its whole subtree, as a one-element list.
    async fn get_subtree(&self, id: &str) -> Result<Vec<BookmarkNode>>;

    /// The `count` most recently added leaf bookmarks, newest first.
    async fn get_recent(&self, count: usize) -> Result<Vec<BookmarkNode>>;

    async fn create(&self, details: CreateDetails) -> Result<BookmarkNode>;

    async fn update(&self, id: &str, changes: UpdateChanges) -> Result<BookmarkNode>;

    async fn move_node(&self, id: &str, destination: Destination) -> Result<BookmarkNode>;

    /// Removes a leaf or an empty group. Fails on a non-empty group.
    async fn remove(&self, id: &str) -> Result<()>;

    /// Removes a group and everything beneath it.
    async fn remove_tree(&self, id: &str) -> Result<()>;
}
