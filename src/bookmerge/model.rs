use serde::{Deserialize, Serialize};

/// Id of the implicit super-root every bookmark tree hangs from.
pub const ROOT_ID: &str = "0";

/// Id of the group new bookmarks land in when no parent is given (the bookmarks bar).
pub const DEFAULT_GROUP_ID: &str = "1";

/// Root group titles of the deployed locale, in store order.
pub const DEFAULT_ROOT_TITLES: [&str; 3] = ["Bookmarks Bar", "Other Bookmarks", "Mobile Bookmarks"];

/// A node of the bookmark tree as returned by the store.
///
/// A node is a group iff it has no `url` and carries a `children` list (even an
/// empty one). Everything else is a leaf bookmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkNode {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub date_added: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<BookmarkNode>>,
}

impl BookmarkNode {
    pub fn is_group(&self) -> bool {
        self.url.is_none() && self.children.is_some()
    }

    pub fn is_bookmark(&self) -> bool {
        !self.is_group()
    }

    pub fn children(&self) -> &[BookmarkNode] {
        self.children.as_deref().unwrap_or_default()
    }

    pub fn url_str(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }
}

/// A node of an externally supplied tree, before it exists in the store.
///
/// Same shape contract as [`BookmarkNode`]: groups have `children` and no `url`,
/// leaves have a `url` and no `children`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportNode {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ImportNode>>,
}

impl ImportNode {
    pub fn group(title: impl Into<String>, children: Vec<ImportNode>) -> Self {
        Self {
            title: title.into(),
            url: None,
            children: Some(children),
        }
    }

    pub fn bookmark(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: Some(url.into()),
            children: None,
        }
    }

    pub fn is_group(&self) -> bool {
        self.url.is_none() && self.children.is_some()
    }

    pub fn children(&self) -> &[ImportNode] {
        self.children.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, url: Option<&str>, children: Option<Vec<BookmarkNode>>) -> BookmarkNode {
        BookmarkNode {
            id: id.to_string(),
            title: String::new(),
            url: url.map(str::to_string),
            parent_id: None,
            index: 0,
            date_added: 0,
            children,
        }
    }

    #[test]
    fn test_empty_children_is_still_a_group() {
        assert!(node("5", None, Some(vec![])).is_group());
    }

    #[test]
    fn test_node_without_children_is_a_leaf() {
        assert!(!node("5", None, None).is_group());
        assert!(!node("6", Some("https://a.test/"), None).is_group());
    }

    #[test]
    fn test_url_wins_over_children() {
        assert!(!node("7", Some("https://a.test/"), Some(vec![])).is_group());
    }

    #[test]
    fn test_deserializes_store_json() {
        let json =
            r#"{"id":"4","title":"Rust","url":"https://rust-lang.org/","parentId":"1","index":2}"#;
        let parsed: BookmarkNode = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.parent_id.as_deref(), Some("1"));
        assert_eq!(parsed.index, 2);
        assert!(parsed.is_bookmark());
    }

    #[test]
    fn test_import_constructors() {
        let tree = ImportNode::group("Work", vec![ImportNode::bookmark("Site", "https://a.test/")]);
        assert!(tree.is_group());
        assert_eq!(tree.children().len(), 1);
        assert!(!tree.children()[0].is_group());
    }
}
