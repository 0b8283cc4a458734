use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format for releases: "v0.3.0"
/// Format for dev builds: "v0.3.0\ndev: abc1234 2024-01-15 14:30"
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            format!("v{}", VERSION)
        } else {
            format!("v{}\ndev: {} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "reelbox",
    bin_name = "reelbox",
    version = get_version(),
    disable_help_subcommand = true
)]
#[command(about = "Folder-mirrored library for captured audio recordings", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Library root directory (overrides `root` in reelbox.toml)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub root: Option<PathBuf>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the library location and its contents at a glance
    Status,

    /// Manage folders
    #[command(subcommand)]
    Folder(FolderCommands),

    /// Manage recordings
    #[command(subcommand)]
    Rec(RecCommands),

    /// Import a legacy flat store
    Migrate {
        /// Legacy store directory (defaults to `legacy_dir` from config)
        #[arg(long, value_name = "DIR")]
        from: Option<PathBuf>,
    },

    /// Report files that drifted away from where the index expects them
    Doctor,
}

/// Folders are addressed by their path from the root, e.g. `Beats/Trap`.
#[derive(Subcommand, Debug)]
pub enum FolderCommands {
    /// Create a folder, and any missing parents
    Add {
        path: String,
        /// Display color, e.g. "#ff8800"
        #[arg(long)]
        color: Option<String>,
    },

    /// Rename a folder in place
    Rename { path: String, new_name: String },

    /// Move a folder under another one (omit the destination for the root)
    Mv { path: String, dest: Option<String> },

    /// Delete a folder. Contents move up to the parent unless --recursive
    Rm {
        path: String,
        #[arg(short, long)]
        recursive: bool,
    },

    /// Show the folder tree
    #[command(alias = "list")]
    Ls { path: Option<String> },
}

/// Recordings are addressed by id, a unique id prefix, or a unique title.
#[derive(Subcommand, Debug)]
pub enum RecCommands {
    /// Add an audio file to the library
    Add {
        file: PathBuf,
        /// Destination folder path
        #[arg(short, long)]
        folder: Option<String>,
        /// Title (defaults to the file name without extension)
        #[arg(short, long)]
        title: Option<String>,
        /// Mark as a crop of another recording
        #[arg(long, value_name = "REC")]
        crop_of: Option<String>,
    },

    /// Move a recording to another folder (omit the folder for the root)
    Mv {
        recording: String,
        folder: Option<String>,
        /// Give the recording a new title while moving
        #[arg(long)]
        title: Option<String>,
    },

    /// Rename a recording's file
    Rename { recording: String, new_filename: String },

    /// Delete a recording
    Rm {
        recording: String,
        /// Also delete crops taken from it
        #[arg(long)]
        with_crops: bool,
    },

    /// Write a recording's audio to stdout or a file
    Cat {
        recording: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print where a recording's file is on disk
    Where { recording: String },

    /// Edit tags and other metadata
    Tag(TagArgs),

    /// List recordings in a folder (the root when omitted)
    #[command(alias = "list")]
    Ls {
        folder: Option<String>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct TagArgs {
    pub recording: String,
    /// Tags to add
    #[arg(short, long = "add", value_name = "TAG")]
    pub add: Vec<String>,
    /// Tags to remove
    #[arg(short, long = "remove", value_name = "TAG")]
    pub remove: Vec<String>,
    /// Rating from 0 to 5
    #[arg(long)]
    pub rating: Option<u8>,
    #[arg(long)]
    pub bpm: Option<f64>,
    /// Musical key, e.g. "F#m"
    #[arg(long)]
    pub key: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
    #[arg(long)]
    pub title: Option<String>,
}
