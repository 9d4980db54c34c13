//! # Configuration
//!
//! Stored as `config.json` in the data directory. A missing file means
//! defaults; unknown fields are ignored and absent ones take their default.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `default-group` | `1` | Group receiving new nodes when no parent is given |
//! | `root-titles` | `Bookmarks Bar,Other Bookmarks,Mobile Bookmarks` | Names of the root groups |
//! | `root-match` | `structural` | `structural` or `title` root-group classification |
//! | `backup-before-clear` | `true` | Snapshot the list to `backup.json` before `clear` |

use crate::error::{BookmarkError, Result};
use crate::model::{DEFAULT_GROUP_ID, DEFAULT_ROOT_TITLES};
use crate::roots::{RootGroups, RootMatch};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILENAME: &str = "config.json";
pub const STORE_FILENAME: &str = "bookmarks.json";
pub const BACKUP_FILENAME: &str = "backup.json";

/// Keys accepted by [`BookmergeConfig::get`] and [`BookmergeConfig::set`].
pub const CONFIG_KEYS: [&str; 4] = [
    "default-group",
    "root-titles",
    "root-match",
    "backup-before-clear",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookmergeConfig {
    #[serde(default = "default_group_id")]
    pub default_group_id: String,

    #[serde(default = "default_root_titles")]
    pub root_titles: Vec<String>,

    #[serde(default)]
    pub root_match: RootMatch,

    #[serde(default = "default_true")]
    pub backup_before_clear: bool,
}

fn default_group_id() -> String {
    DEFAULT_GROUP_ID.to_string()
}

fn default_root_titles() -> Vec<String> {
    DEFAULT_ROOT_TITLES.iter().map(|t| t.to_string()).collect()
}

fn default_true() -> bool {
    true
}

impl Default for BookmergeConfig {
    fn default() -> Self {
        Self {
            default_group_id: default_group_id(),
            root_titles: default_root_titles(),
            root_match: RootMatch::default(),
            backup_before_clear: true,
        }
    }
}

impl BookmergeConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let path = data_dir.as_ref().join(CONFIG_FILENAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save<P: AsRef<Path>>(&self, data_dir: P) -> Result<()> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(data_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    pub fn root_groups(&self) -> RootGroups {
        RootGroups::new(self.root_titles.clone(), self.root_match)
    }

    /// Display value for a key, `None` for unknown keys.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "default-group" => Some(self.default_group_id.clone()),
            "root-titles" => Some(self.root_titles.join(",")),
            "root-match" => Some(self.root_match.to_string()),
            "backup-before-clear" => Some(self.backup_before_clear.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "default-group" => {
                if value.is_empty() {
                    return Err(BookmarkError::Config("default-group can't be empty".to_string()));
                }
                self.default_group_id = value.to_string();
            }
            "root-titles" => {
                let titles: Vec<String> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect();
                if titles.is_empty() {
                    return Err(BookmarkError::Config(
                        "root-titles needs at least one title".to_string(),
                    ));
                }
                self.root_titles = titles;
            }
            "root-match" => self.root_match = value.parse().map_err(BookmarkError::Config)?,
            "backup-before-clear" => {
                self.backup_before_clear = match value.to_ascii_lowercase().as_str() {
                    "true" | "yes" | "on" | "1" => true,
                    "false" | "no" | "off" | "0" => false,
                    _ => {
                        return Err(BookmarkError::Config(format!(
                            "backup-before-clear expects true or false, got '{}'",
                            value
                        )))
                    }
                };
            }
            _ => return Err(BookmarkError::Config(format!("Unknown config key: {}", key))),
        }
        Ok(())
    }
}
