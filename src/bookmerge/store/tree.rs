use crate::error::{BookmarkError, Result};
use crate::model::{BookmarkNode, DEFAULT_ROOT_TITLES, ROOT_ID};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredNode {
    id: String,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
    date_added: i64,
    /// Creation sequence, breaks `date_added` ties in `recent`.
    #[serde(default)]
    seq: u64,
    /// Child ids in order. `None` for leaves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<String>>,
}

/// The bookmark tree as a browser host keeps it.
///
/// Shared by [`MemBackend`](super::mem_backend::MemBackend) and
/// [`FsBackend`](super::fs_backend::FsBackend). Ids are decimal strings minted
/// from a counter. The super-root `"0"` and its direct children are permanent:
/// they can't be updated, moved or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkTree {
    nodes: HashMap<String, StoredNode>,
    next_id: u64,
}

impl Default for BookmarkTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BookmarkTree {
    /// A tree with the default root groups.
    pub fn new() -> Self {
        Self::with_root_titles(&DEFAULT_ROOT_TITLES)
    }

    /// A tree whose permanent root groups ("1", "2", ...) carry the given titles.
    pub fn with_root_titles<S: AsRef<str>>(titles: &[S]) -> Self {
        let mut tree = Self {
            nodes: HashMap::new(),
            next_id: 1,
        };
        tree.nodes.insert(
            ROOT_ID.to_string(),
            StoredNode {
                id: ROOT_ID.to_string(),
                title: String::new(),
                url: None,
                parent_id: None,
                date_added: Utc::now().timestamp_millis(),
                seq: 0,
                children: Some(Vec::new()),
            },
        );
        for title in titles {
            let id = tree.mint_id();
            tree.insert(id, ROOT_ID, title.as_ref(), None, None);
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The full tree, as a one-element list holding the super-root.
    pub fn tree(&self) -> Result<Vec<BookmarkNode>> {
        Ok(vec![self.materialize(ROOT_ID, true)?])
    }

    /// Direct children of `id`. Groups come back with an empty `children` list.
    pub fn children(&self, id: &str) -> Result<Vec<BookmarkNode>> {
        let node = self.get(id)?;
        let child_ids = node
            .children
            .as_ref()
            .ok_or_else(|| BookmarkError::InvalidDestination(format!("{} is not a group", id)))?;
        child_ids
            .iter()
            .map(|child| self.materialize(child, false))
            .collect()
    }

    /// `id` with its full subtree, as a one-element list.
    pub fn subtree(&self, id: &str) -> Result<Vec<BookmarkNode>> {
        Ok(vec![self.materialize(id, true)?])
    }

    /// The `count` most recently created leaf bookmarks, newest first.
    pub fn recent(&self, count: usize) -> Result<Vec<BookmarkNode>> {
        let mut leaves: Vec<&StoredNode> =
            self.nodes.values().filter(|n| n.url.is_some()).collect();
        leaves.sort_by(|a, b| (b.date_added, b.seq).cmp(&(a.date_added, a.seq)));
        leaves
            .into_iter()
            .take(count)
            .map(|n| self.materialize(&n.id, false))
            .collect()
    }

    pub fn create(
        &mut self,
        parent_id: &str,
        title: &str,
        url: Option<&str>,
        index: Option<usize>,
    ) -> Result<BookmarkNode> {
        if parent_id == ROOT_ID {
            return Err(BookmarkError::RootGroup(ROOT_ID.to_string()));
        }
        let len = self.group_children(parent_id)?.len();
        if let Some(index) = index {
            if index > len {
                return Err(BookmarkError::IndexOutOfRange {
                    parent: parent_id.to_string(),
                    index,
                    len,
                });
            }
        }
        let id = self.mint_id();
        self.insert(id.clone(), parent_id, title, url, index);
        self.materialize(&id, true)
    }

    pub fn update(
        &mut self,
        id: &str,
        title: Option<&str>,
        url: Option<&str>,
    ) -> Result<BookmarkNode> {
        self.ensure_mutable(id)?;
        let node = self.get_mut(id)?;
        if url.is_some() && node.url.is_none() {
            return Err(BookmarkError::InvalidDestination(format!(
                "{} is a group and can't have a URL",
                id
            )));
        }
        if let Some(title) = title {
            node.title = title.to_string();
        }
        if let Some(url) = url {
            node.url = Some(url.to_string());
        }
        self.materialize(id, true)
    }

    /// Moves `id` under `parent_id`. Within the same parent the index refers to
    /// the ordering before the move; otherwise an absent index appends.
    pub fn move_node(
        &mut self,
        id: &str,
        parent_id: &str,
        index: Option<usize>,
    ) -> Result<BookmarkNode> {
        self.ensure_mutable(id)?;
        if parent_id == ROOT_ID {
            return Err(BookmarkError::RootGroup(ROOT_ID.to_string()));
        }
        self.group_children(parent_id)?;
        if self.is_ancestor_or_self(id, parent_id) {
            return Err(BookmarkError::InvalidDestination(format!(
                "can't move {} into its own subtree",
                id
            )));
        }

        let old_parent = self.get(id)?.parent_id.clone().unwrap_or_default();
        let old_pos = self.detach(id, &old_parent);
        let siblings = self.group_children_mut(parent_id)?;
        let pos = match (index, old_pos) {
            (Some(i), Some(old)) if old_parent == parent_id && old < i => i - 1,
            (Some(i), _) => i,
            (None, _) => siblings.len(),
        };
        let pos = pos.min(siblings.len());
        siblings.insert(pos, id.to_string());
        self.get_mut(id)?.parent_id = Some(parent_id.to_string());
        self.materialize(id, true)
    }

    /// Removes a leaf or an empty group.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        self.ensure_mutable(id)?;
        let node = self.get(id)?;
        if node.children.as_ref().is_some_and(|c| !c.is_empty()) {
            return Err(BookmarkError::NonEmptyGroup(id.to_string()));
        }
        let parent = node.parent_id.clone().unwrap_or_default();
        self.detach(id, &parent);
        self.nodes.remove(id);
        Ok(())
    }

    /// Removes a node and everything beneath it.
    pub fn remove_tree(&mut self, id: &str) -> Result<()> {
        self.ensure_mutable(id)?;
        let parent = self.get(id)?.parent_id.clone().unwrap_or_default();
        self.detach(id, &parent);

        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children.unwrap_or_default());
            }
        }
        Ok(())
    }

    fn mint_id(&mut self) -> String {
        let id = self.next_id.to_string();
        self.next_id += 1;
        id
    }

    fn insert(
        &mut self,
        id: String,
        parent_id: &str,
        title: &str,
        url: Option<&str>,
        index: Option<usize>,
    ) {
        let seq = self.next_id;
        self.nodes.insert(
            id.clone(),
            StoredNode {
                id: id.clone(),
                title: title.to_string(),
                url: url.map(str::to_string),
                parent_id: Some(parent_id.to_string()),
                date_added: Utc::now().timestamp_millis(),
                seq,
                children: if url.is_none() { Some(Vec::new()) } else { None },
            },
        );
        if let Some(siblings) = self.nodes.get_mut(parent_id).and_then(|p| p.children.as_mut()) {
            let pos = index.unwrap_or(siblings.len()).min(siblings.len());
            siblings.insert(pos, id);
        }
    }

    fn get(&self, id: &str) -> Result<&StoredNode> {
        self.nodes
            .get(id)
            .ok_or_else(|| BookmarkError::NodeNotFound(id.to_string()))
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut StoredNode> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| BookmarkError::NodeNotFound(id.to_string()))
    }

    fn group_children(&self, id: &str) -> Result<&Vec<String>> {
        self.get(id)?
            .children
            .as_ref()
            .ok_or_else(|| BookmarkError::InvalidDestination(format!("{} is not a group", id)))
    }

    fn group_children_mut(&mut self, id: &str) -> Result<&mut Vec<String>> {
        self.get_mut(id)?
            .children
            .as_mut()
            .ok_or_else(|| BookmarkError::InvalidDestination(format!("{} is not a group", id)))
    }

    fn ensure_mutable(&self, id: &str) -> Result<()> {
        let node = self.get(id)?;
        if node.id == ROOT_ID || node.parent_id.as_deref() == Some(ROOT_ID) {
            return Err(BookmarkError::RootGroup(id.to_string()));
        }
        Ok(())
    }

    fn is_ancestor_or_self(&self, ancestor: &str, id: &str) -> bool {
        let mut current = Some(id.to_string());
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            current = self.nodes.get(&cur).and_then(|n| n.parent_id.clone());
        }
        false
    }

    /// Unlinks `id` from its parent's child list, returning its old position.
    fn detach(&mut self, id: &str, parent_id: &str) -> Option<usize> {
        let siblings = self.nodes.get_mut(parent_id)?.children.as_mut()?;
        let pos = siblings.iter().position(|c| c == id)?;
        siblings.remove(pos);
        Some(pos)
    }

    fn position_in_parent(&self, node: &StoredNode) -> usize {
        node.parent_id
            .as_deref()
            .and_then(|p| self.nodes.get(p))
            .and_then(|p| p.children.as_ref())
            .and_then(|siblings| siblings.iter().position(|c| *c == node.id))
            .unwrap_or(0)
    }

    fn materialize(&self, id: &str, deep: bool) -> Result<BookmarkNode> {
        let node = self.get(id)?;
        let children = match &node.children {
            Some(child_ids) if deep => Some(
                child_ids
                    .iter()
                    .map(|c| self.materialize(c, true))
                    .collect::<Result<Vec<_>>>()?,
            ),
            Some(_) => Some(Vec::new()),
            None => None,
        };
        Ok(BookmarkNode {
            id: node.id.clone(),
            title: node.title.clone(),
            url: node.url.clone(),
            parent_id: node.parent_id.clone(),
            index: self.position_in_parent(node),
            date_added: node.date_added,
            children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child_titles(tree: &BookmarkTree, id: &str) -> Vec<String> {
        tree.children(id).unwrap().into_iter().map(|n| n.title).collect()
    }

    #[test]
    fn test_new_tree_has_roots() {
        let tree = BookmarkTree::new();
        let root = &tree.tree().unwrap()[0];
        assert_eq!(root.id, ROOT_ID);
        let titles: Vec<&str> = root.children().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, DEFAULT_ROOT_TITLES.to_vec());
        assert_eq!(root.children()[0].id, "1");
    }

    #[test]
    fn test_create_appends_and_inserts() {
        let mut tree = BookmarkTree::new();
        tree.create("1", "a", Some("https://a.test/"), None).unwrap();
        tree.create("1", "c", Some("https://c.test/"), None).unwrap();
        let b = tree.create("1", "b", Some("https://b.test/"), Some(1)).unwrap();
        assert_eq!(b.index, 1);
        assert_eq!(child_titles(&tree, "1"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_create_rejects_bad_parents() {
        let mut tree = BookmarkTree::new();
        let leaf = tree.create("1", "a", Some("https://a.test/"), None).unwrap();
        assert!(matches!(
            tree.create(&leaf.id, "x", None, None),
            Err(BookmarkError::InvalidDestination(_))
        ));
        assert!(matches!(
            tree.create("404", "x", None, None),
            Err(BookmarkError::NodeNotFound(_))
        ));
        assert!(matches!(
            tree.create(ROOT_ID, "x", None, None),
            Err(BookmarkError::RootGroup(_))
        ));
        assert!(matches!(
            tree.create("1", "x", None, Some(5)),
            Err(BookmarkError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_remove_rejects_non_empty_group() {
        let mut tree = BookmarkTree::new();
        let group = tree.create("1", "g", None, None).unwrap();
        tree.create(&group.id, "a", Some("https://a.test/"), None).unwrap();
        assert!(matches!(tree.remove(&group.id), Err(BookmarkError::NonEmptyGroup(_))));
        tree.remove_tree(&group.id).unwrap();
        assert_eq!(tree.len(), 4);
        assert!(tree.children("1").unwrap().is_empty());
    }

    #[test]
    fn test_roots_are_permanent() {
        let mut tree = BookmarkTree::new();
        assert!(matches!(tree.remove("1"), Err(BookmarkError::RootGroup(_))));
        assert!(matches!(tree.remove_tree(ROOT_ID), Err(BookmarkError::RootGroup(_))));
        assert!(matches!(tree.update("2", Some("x"), None), Err(BookmarkError::RootGroup(_))));
    }

    #[test]
    fn test_move_within_same_parent_uses_pre_move_index() {
        let mut tree = BookmarkTree::new();
        let a = tree.create("1", "a", Some("https://a.test/"), None).unwrap();
        tree.create("1", "b", Some("https://b.test/"), None).unwrap();
        tree.create("1", "c", Some("https://c.test/"), None).unwrap();
        tree.move_node(&a.id, "1", Some(2)).unwrap();
        assert_eq!(child_titles(&tree, "1"), vec!["b", "a", "c"]);

        tree.move_node(&a.id, "1", None).unwrap();
        assert_eq!(child_titles(&tree, "1"), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_move_across_parents() {
        let mut tree = BookmarkTree::new();
        let g = tree.create("2", "g", None, None).unwrap();
        tree.create(&g.id, "x", Some("https://x.test/"), None).unwrap();
        let a = tree.create("1", "a", Some("https://a.test/"), None).unwrap();
        let moved = tree.move_node(&a.id, &g.id, Some(1)).unwrap();
        assert_eq!(moved.parent_id.as_deref(), Some(g.id.as_str()));
        assert_eq!(moved.index, 1);
        assert!(tree.children("1").unwrap().is_empty());
    }

    #[test]
    fn test_move_into_own_subtree_fails() {
        let mut tree = BookmarkTree::new();
        let outer = tree.create("1", "outer", None, None).unwrap();
        let inner = tree.create(&outer.id, "inner", None, None).unwrap();
        assert!(matches!(
            tree.move_node(&outer.id, &inner.id, None),
            Err(BookmarkError::InvalidDestination(_))
        ));
    }

    #[test]
    fn test_update_changes_title_and_url() {
        let mut tree = BookmarkTree::new();
        let a = tree.create("1", "a", Some("https://a.test/"), None).unwrap();
        let updated = tree.update(&a.id, Some("A"), Some("https://b.test/")).unwrap();
        assert_eq!(updated.title, "A");
        assert_eq!(updated.url.as_deref(), Some("https://b.test/"));

        let g = tree.create("1", "g", None, None).unwrap();
        assert!(tree.update(&g.id, None, Some("https://x.test/")).is_err());
    }

    #[test]
    fn test_recent_is_newest_first_and_leaves_only() {
        let mut tree = BookmarkTree::new();
        tree.create("1", "a", Some("https://a.test/"), None).unwrap();
        tree.create("1", "g", None, None).unwrap();
        tree.create("1", "b", Some("https://b.test/"), None).unwrap();
        let recent: Vec<String> = tree.recent(5).unwrap().into_iter().map(|n| n.title).collect();
        assert_eq!(recent, vec!["b", "a"]);
    }

    #[test]
    fn test_children_are_shallow() {
        let mut tree = BookmarkTree::new();
        let g = tree.create("1", "g", None, None).unwrap();
        tree.create(&g.id, "x", Some("https://x.test/"), None).unwrap();
        let children = tree.children("1").unwrap();
        assert!(children[0].is_group());
        assert!(children[0].children().is_empty());
        assert_eq!(tree.subtree(&g.id).unwrap()[0].children().len(), 1);
    }

    #[test]
    fn test_serde_roundtrip_keeps_structure() {
        let mut tree = BookmarkTree::new();
        tree.create("1", "a", Some("https://a.test/"), None).unwrap();
        let json = serde_json::to_string(&tree).unwrap();
        let loaded: BookmarkTree = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.tree().unwrap(), tree.tree().unwrap());
    }
}
