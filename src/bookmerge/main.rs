//! # Bookmerge CLI
//!
//! The binary is intentionally thin: argument parsing, dispatch and rendering
//! live in `cli/`, this file only starts the runtime, calls `cli::run()` and
//! turns an error into an exit code.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  cli/setup.rs     clap definitions, logging, data directory │
//! │  cli/commands.rs  context wiring, dispatch, prompts, backup │
//! │  cli/print.rs     colored output and the progress bar       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!              bookmerge library (engine, store, ...)
//! ```
//!
//! Everything the store can fail with comes back as a `BookmarkError` and is
//! printed once, here.

mod cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
