//! # Bookmerge Architecture
//!
//! Bookmerge keeps a browser-style bookmark collection tidy: it imports exported
//! bookmark files without duplicating groups, clears everything below the root
//! groups, and removes repeated bookmarks. It's a library with a CLI on top; the
//! core never touches stdout or assumes a terminal.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, renders trees and progress, backups    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engine (engine/)                                           │
//! │  - Snapshot model: tree, pre-order list, duplicate index    │
//! │  - import / clear / dedup pipelines with progress events    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Adapter (store/adapter.rs)                         │
//! │  - Async facade, default parent group, append semantics     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Host store (store/)                                        │
//! │  - BookmarkBackend trait                                    │
//! │  - FsBackend (production), MemBackend (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ids and root groups
//!
//! Ids are opaque strings minted by the store. `"0"` is the implicit super-root;
//! its direct children are the root groups (bookmarks bar, other bookmarks,
//! mobile bookmarks). Root groups are never created, renamed or deleted. See
//! [`roots`] for how they are recognized.
//!
//! ## Pipelines are sequential
//!
//! Every store call is awaited before the next one is issued, and every unit of
//! work emits exactly one [`progress::ProgressEvent`]. A failed call aborts the
//! pipeline; what was already written stays written.
//!
//! ## Module Overview
//!
//! - [`engine`]: the model and the import / clear / dedup pipelines
//! - [`store`]: host store trait, host semantics, backends and the adapter
//! - [`html`]: parser for exported bookmark files
//! - [`index`]: pre-order flattening and the duplicate-by-URL index
//! - [`roots`]: root-group classification
//! - [`progress`]: progress counters, events and observers
//! - [`model`]: node types and sentinel ids
//! - [`config`]: configuration management
//! - [`backup`]: single backup taken before a clear
//! - [`error`]: error types
//! - `cli`: argument parsing and terminal output for the binary (not part of the lib API)

pub mod backup;
pub mod config;
pub mod engine;
pub mod error;
pub mod html;
pub mod index;
pub mod model;
pub mod progress;
pub mod roots;
pub mod store;
