use super::tree::BookmarkTree;
use super::{BookmarkBackend, CreateDetails, Destination, UpdateChanges};
use crate::error::{BookmarkError, Result};
use crate::model::BookmarkNode;
use std::cell::{Cell, RefCell};

/// In-memory bookmark host for testing.
///
/// Uses `RefCell` for interior mutability since the engine issues one call at
/// a time on a single task. This keeps `BookmarkBackend` on `&self`.
#[derive(Default)]
pub struct MemBackend {
    tree: RefCell<BookmarkTree>,
    mutations: Cell<usize>,
    fail_after: Cell<Option<usize>>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tree(tree: BookmarkTree) -> Self {
        Self {
            tree: RefCell::new(tree),
            ..Self::default()
        }
    }

    /// Number of successful mutating calls so far.
    pub fn mutation_count(&self) -> usize {
        self.mutations.get()
    }

    /// Make every mutation after the next `successes` ones fail with a store error.
    /// `None` turns failure injection off.
    pub fn fail_mutations_after(&self, successes: Option<usize>) {
        self.fail_after.set(successes.map(|n| self.mutations.get() + n));
    }

    fn mutate<T>(&self, op: impl FnOnce(&mut BookmarkTree) -> Result<T>) -> Result<T> {
        if let Some(limit) = self.fail_after.get() {
            if self.mutations.get() >= limit {
                return Err(BookmarkError::Store("Simulated write error".to_string()));
            }
        }
        let value = op(&mut *self.tree.borrow_mut())?;
        self.mutations.set(self.mutations.get() + 1);
        Ok(value)
    }
}

impl BookmarkBackend for MemBackend {
    async fn get_tree(&self) -> Result<Vec<BookmarkNode>> {
        self.tree.borrow().tree()
    }

    async fn get_children(&self, parent_id: &str) -> Result<Vec<BookmarkNode>> {
        self.tree.borrow().children(parent_id)
    }

    async fn get_subtree(&self, id: &str) -> Result<Vec<BookmarkNode>> {
        self.tree.borrow().subtree(id)
    }

    async fn get_recent(&self, count: usize) -> Result<Vec<BookmarkNode>> {
        self.tree.borrow().recent(count)
    }

    async fn create(&self, details: CreateDetails) -> Result<BookmarkNode> {
        self.mutate(|tree| {
            tree.create(
                &details.parent_id,
                &details.title,
                details.url.as_deref(),
                details.index,
            )
        })
    }

    async fn update(&self, id: &str, changes: UpdateChanges) -> Result<BookmarkNode> {
        self.mutate(|tree| tree.update(id, changes.title.as_deref(), changes.url.as_deref()))
    }

    async fn move_node(&self, id: &str, destination: Destination) -> Result<BookmarkNode> {
        self.mutate(|tree| tree.move_node(id, &destination.parent_id, destination.index))
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.mutate(|tree| tree.remove(id))
    }

    async fn remove_tree(&self, id: &str) -> Result<()> {
        self.mutate(|tree| tree.remove_tree(id))
    }
}
