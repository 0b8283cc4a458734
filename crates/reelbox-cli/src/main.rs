//! # Reelbox CLI
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, while this
//! file only invokes `cli::run()` and handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/reelbox/`: Core library: index, folder tree, file mirroring, migration
//! - `crates/reelbox-cli/`: This CLI tool, depends on the `reelbox` library
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │  CLI Layer (crates/reelbox-cli/src/cli/)      │
//! │  - clap argument parsing (setup.rs)           │
//! │  - Handlers + name resolution (commands.rs)   │
//! │  - Terminal output (render.rs)                │
//! └───────────────────────────────────────────────┘
//!                         │
//!                         ▼
//! ┌───────────────────────────────────────────────┐
//! │  reelbox::init / reelbox::LibraryStore        │
//! │  - Config, root resolution, migration         │
//! │  - All library state and file operations      │
//! └───────────────────────────────────────────────┘
//! ```

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
