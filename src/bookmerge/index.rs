//! # Flattened list and duplicate index
//!
//! The engine works on two views derived from the store's tree:
//!
//! - the **bookmark list**: every node (groups and leaves) in depth-first
//!   pre-order, parents before their descendants. The order decides traversal
//!   order for clear/dedup and which copy counts as the "first occurrence".
//! - the **duplicate index**: leaves bucketed by exact URL, largest bucket
//!   first. Bucket order is only for reporting; dedup does not depend on it.

use crate::model::{BookmarkNode, ImportNode};
use std::collections::HashMap;

/// Flattens a tree into a depth-first, pre-order list.
pub fn flatten(tree: &[BookmarkNode]) -> Vec<BookmarkNode> {
    let mut list = Vec::new();
    flatten_into(tree, &mut list);
    list
}

fn flatten_into(tree: &[BookmarkNode], list: &mut Vec<BookmarkNode>) {
    for node in tree {
        list.push(node.clone());
        if let Some(children) = &node.children {
            flatten_into(children, list);
        }
    }
}

/// Flattens an import tree into pre-order references.
pub fn flatten_import(tree: &[ImportNode]) -> Vec<&ImportNode> {
    let mut list = Vec::new();
    let mut stack: Vec<&ImportNode> = tree.iter().rev().collect();
    while let Some(node) = stack.pop() {
        list.push(node);
        stack.extend(node.children().iter().rev());
    }
    list
}

/// Leaves sharing one URL, in list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBucket {
    pub url: String,
    pub bookmarks: Vec<BookmarkNode>,
}

impl UrlBucket {
    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    pub fn is_duplicated(&self) -> bool {
        self.bookmarks.len() > 1
    }
}

/// URL → same-URL leaves, ordered by descending bucket size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateIndex {
    buckets: Vec<UrlBucket>,
}

impl DuplicateIndex {
    pub fn from_list(list: &[BookmarkNode]) -> Self {
        group_by_url(list)
    }

    pub fn buckets(&self) -> &[UrlBucket] {
        &self.buckets
    }

    pub fn iter(&self) -> impl Iterator<Item = &UrlBucket> {
        self.buckets.iter()
    }

    /// Buckets holding more than one bookmark.
    pub fn duplicated(&self) -> impl Iterator<Item = &UrlBucket> {
        self.buckets.iter().filter(|b| b.is_duplicated())
    }

    pub fn get(&self, url: &str) -> Option<&UrlBucket> {
        self.buckets.iter().find(|b| b.url == url)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Sum over buckets of (bucket size - 1).
    pub fn duplicate_count(&self) -> usize {
        self.buckets.iter().map(|b| b.len() - 1).sum()
    }
}

/// Buckets the leaves of `list` by exact URL.
///
/// Groups never participate. Buckets are sorted by descending size; equal-sized
/// buckets keep the order in which their URL first appeared.
pub fn group_by_url(list: &[BookmarkNode]) -> DuplicateIndex {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<UrlBucket> = Vec::new();

    for bookmark in list.iter().filter(|n| !n.is_group()) {
        let url = bookmark.url_str();
        match positions.get(url) {
            Some(&pos) => buckets[pos].bookmarks.push(bookmark.clone()),
            None => {
                positions.insert(url, buckets.len());
                buckets.push(UrlBucket {
                    url: url.to_string(),
                    bookmarks: vec![bookmark.clone()],
                });
            }
        }
    }

    // sort_by is stable
    buckets.sort_by(|a, b| b.len().cmp(&a.len()));
    DuplicateIndex { buckets }
}
