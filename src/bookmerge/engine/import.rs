//! Import pipeline: merge an external bookmark tree into the store.
//!
//! Nodes are merged in pre-order, each one counted and notified before its own
//! merge step runs:
//!
//! - a top-level root group (e.g. "Bookmarks bar") is dissolved: its children
//!   merge into the existing root group of the same name,
//! - any other group is matched by title against the pre-import snapshot and
//!   reused when found, created under its declared parent otherwise,
//! - a leaf whose URL already exists is created and then moved right after the
//!   existing copy; other leaves are created under their declared parent.
//!
//! Matching only ever looks at the snapshot taken before the import started,
//! never at nodes created during the import.

use super::BookmarkEngine;
use crate::error::Result;
use crate::html::parse_bookmarks_html;
use crate::index::flatten_import;
use crate::model::ImportNode;
use crate::progress::{Counter, ProgressEvent, ProgressKind, ProgressObserver};
use crate::store::BookmarkBackend;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Groups created because no group with the same title existed.
    pub groups_created: usize,
    /// Groups (root groups included) whose children went into an existing group.
    pub groups_merged: usize,
    /// Leaves created where the import declared them.
    pub bookmarks_created: usize,
    /// Leaves created next to an existing bookmark with the same URL.
    pub bookmarks_placed_with_duplicate: usize,
}

/// One pending node of the merge worklist.
struct PendingNode<'a> {
    node: &'a ImportNode,
    parent_id: String,
    top_level: bool,
}

impl<B: BookmarkBackend> BookmarkEngine<B> {
    /// Parses an exported bookmarks document and merges it into the store.
    ///
    /// The document is fully parsed before the store is touched, so a malformed
    /// file never leads to a partial import.
    pub async fn import_bookmarks<O: ProgressObserver>(
        &mut self,
        contents: &str,
        observer: &mut O,
    ) -> Result<ImportReport> {
        let incoming = parse_bookmarks_html(contents)?;
        self.import_tree(&incoming, observer).await
    }

    /// Merges an already parsed tree into the store, then reloads the model.
    pub async fn import_tree<O: ProgressObserver>(
        &mut self,
        incoming: &[ImportNode],
        observer: &mut O,
    ) -> Result<ImportReport> {
        self.ensure_fresh().await?;
        let total = flatten_import(incoming).len();
        info!(nodes = total, "importing bookmarks");
        self.import_progress = Counter::new(total);

        let outcome = self.merge(incoming, observer).await;
        let report = self.finish(outcome).await?;
        info!(?report, "import finished");
        Ok(report)
    }

    async fn merge<O: ProgressObserver>(
        &mut self,
        incoming: &[ImportNode],
        observer: &mut O,
    ) -> Result<ImportReport> {
        let mut report = ImportReport::default();
        let default_parent = self.adapter.default_group_id().to_string();
        let mut stack: Vec<PendingNode> = incoming
            .iter()
            .rev()
            .map(|node| PendingNode {
                node,
                parent_id: default_parent.clone(),
                top_level: true,
            })
            .collect();

        while let Some(PendingNode {
            node,
            parent_id,
            top_level,
        }) = stack.pop()
        {
            self.import_progress.step();
            observer.notify(ProgressEvent::new(ProgressKind::Import, self.import_progress));

            let children_parent = if top_level && self.roots.is_import_root(node) {
                report.groups_merged += 1;
                match self.find_root_group_by_title(&node.title) {
                    Some(root) => root.id.clone(),
                    None => parent_id,
                }
            } else if node.is_group() {
                match self.find_group_by_title(&node.title).map(|g| g.id.clone()) {
                    Some(existing) => {
                        debug!(title = %node.title, id = %existing, "merging into existing group");
                        report.groups_merged += 1;
                        existing
                    }
                    None => {
                        let created = self
                            .adapter
                            .create_group(&node.title, Some(&parent_id), None)
                            .await?;
                        report.groups_created += 1;
                        created.id
                    }
                }
            } else {
                self.merge_bookmark(node, &parent_id, &mut report).await?;
                continue;
            };

            stack.extend(node.children().iter().rev().map(|child| PendingNode {
                node: child,
                parent_id: children_parent.clone(),
                top_level: false,
            }));
        }

        Ok(report)
    }

    async fn merge_bookmark(
        &self,
        node: &ImportNode,
        parent_id: &str,
        report: &mut ImportReport,
    ) -> Result<()> {
        let url = node.url.as_deref().unwrap_or_default();
        let existing = self
            .find_bookmark_by_url(url)
            .map(|b| (b.id.clone(), b.parent_id.clone(), b.index));

        match existing {
            Some((existing_id, existing_parent, snapshot_index)) => {
                let created = self
                    .adapter
                    .create_bookmark(&node.title, url, None, None)
                    .await?;
                let destination = existing_parent.as_deref().unwrap_or(parent_id);
                // earlier placements may have shifted the existing copy
                let current_index = self
                    .adapter
                    .get_children_by_parent(Some(destination))
                    .await?
                    .iter()
                    .position(|n| n.id == existing_id)
                    .unwrap_or(snapshot_index);
                self.adapter
                    .move_bookmark(&created.id, Some(destination), Some(current_index + 1))
                    .await?;
                report.bookmarks_placed_with_duplicate += 1;
            }
            None => {
                self.adapter
                    .create_bookmark(&node.title, url, Some(parent_id), None)
                    .await?;
                report.bookmarks_created += 1;
            }
        }
        Ok(())
    }
}
