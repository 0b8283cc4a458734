//! # CLI Behavior
//!
//! This is **one possible client** for a reelbox library. The CLI is the only
//! place that knows about terminal I/O, exit codes, and output formatting;
//! everything it does goes through `reelbox::LibraryStore`.
//!
//! ## Start-up
//!
//! Every invocation resolves the library root (`--root`, then `root` in
//! `reelbox.toml`), opens the store, and imports a pending legacy store before
//! running the command. A missing root is reported with a hint on how to pick
//! one rather than a bare error.
//!
//! Running `reelbox` with no arguments defaults to `reelbox status`.
//!
//! ## Addressing
//!
//! - Folders by their path from the root: `Beats/Trap`. `/` or nothing is the root.
//! - Recordings by id, a unique id prefix (the 8 characters `rec ls` shows), or a
//!   unique title.
//!
//! ## Module Structure
//!
//! - `commands`: Per-command handlers that call the store
//! - `render`: Output formatting (trees, lists, reports)
//! - `setup`: Argument parsing via clap, help text

mod commands;
mod render;
pub mod setup;

pub use commands::run;
