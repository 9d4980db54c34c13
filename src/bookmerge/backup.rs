//! Best-effort snapshot of the flattened list, taken before destructive runs.
//!
//! There is exactly one backup: writing a new one replaces the previous file.
//! Nodes are stored flat; groups keep an empty `children` list so they still
//! read back as groups.

use crate::error::Result;
use crate::model::BookmarkNode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Backup {
    pub created_at: DateTime<Utc>,
    pub nodes: Vec<BookmarkNode>,
}

impl Backup {
    pub fn from_list(list: &[BookmarkNode]) -> Self {
        let nodes = list
            .iter()
            .map(|node| BookmarkNode {
                children: node.children.as_ref().map(|_| Vec::new()),
                ..node.clone()
            })
            .collect();
        Self {
            created_at: Utc::now(),
            nodes,
        }
    }

    pub fn bookmark_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_bookmark()).count()
    }
}

/// Writes the snapshot to `path`, replacing any previous backup.
pub fn write_backup(path: &Path, list: &[BookmarkNode]) -> Result<Backup> {
    let backup = Backup::from_list(list);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, serde_json::to_string_pretty(&backup)?)?;
    info!(path = %path.display(), nodes = backup.nodes.len(), "backup written");
    Ok(backup)
}

/// Reads the last backup, `None` if there is none.
pub fn read_backup(path: &Path) -> Result<Option<Backup>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}
