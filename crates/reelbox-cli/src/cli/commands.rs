use super::render;
use super::setup::{Cli, Commands, FolderCommands, RecCommands, TagArgs};
use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use reelbox::init::{self, ReelboxContext};
use reelbox::migration::{self, JsonLegacyStore, PassthroughTranscoder};
use reelbox::store::fs_backend::FsBackend;
use reelbox::{LibraryStore, Recording, RecordingPatch, UNCATEGORIZED};
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

type Store = LibraryStore<FsBackend>;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    dispatch(cli)
}

/// Logs go to stderr so `rec cat` output stays clean. `RUST_LOG` wins over
/// the `--verbose` default.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn dispatch(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Commands::Status);
    let mut ctx = open(cli.root)?;
    if let Some(report) = &ctx.migration {
        render::migration(report);
    }
    debug!(?command, "Dispatching");

    match command {
        Commands::Status => status(&ctx),
        Commands::Folder(cmd) => folder(&mut ctx.store, cmd),
        Commands::Rec(cmd) => rec(&mut ctx.store, cmd),
        Commands::Migrate { from } => migrate(&mut ctx, from),
        Commands::Doctor => {
            render::doctor(&ctx.store.doctor()?);
            Ok(())
        }
    }
}

fn open(root: Option<PathBuf>) -> Result<ReelboxContext> {
    init::initialize(root).map_err(|e| {
        if e.needs_root_selection() {
            anyhow!("{}\nPass --root <DIR> or set `root` in reelbox.toml", e)
        } else {
            e.into()
        }
    })
}

fn status(ctx: &ReelboxContext) -> Result<()> {
    let root = ctx
        .store
        .backend()
        .root()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    println!("Library:    {}", root);
    println!("Folders:    {}", ctx.store.folders().len());
    println!("Recordings: {}", ctx.store.recordings().len());
    println!("Config:     {}", ctx.config_dir.display());
    Ok(())
}

fn migrate(ctx: &mut ReelboxContext, from: Option<PathBuf>) -> Result<()> {
    let dir = from.unwrap_or_else(|| ctx.config.legacy_dir_or(&ctx.config_dir));
    let mut legacy = JsonLegacyStore::new(dir);
    if !migration::needs_migration(&legacy)? {
        // An automatic run at start-up has already been reported.
        if ctx.migration.is_none() {
            println!("Nothing to migrate in {}", legacy.dir().display());
        }
        return Ok(());
    }
    let transcoder = PassthroughTranscoder::new(ctx.config.target_mime.clone());
    let report = migration::migrate(&mut ctx.store, &mut legacy, &transcoder)?;
    render::migration(&report);
    Ok(())
}

// --- Folders ---

fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// `None` for the root (`/`, empty or absent), else the folder at that path.
fn folder_at(store: &Store, path: Option<&str>) -> Result<Option<String>> {
    let segments = split_path(path.unwrap_or_default());
    if segments.is_empty() {
        return Ok(None);
    }
    store
        .find_folder_by_path(&segments)
        .map(|f| Some(f.id.clone()))
        .ok_or_else(|| anyhow!("No folder at '{}'", segments.join("/")))
}

fn existing_folder(store: &Store, path: &str) -> Result<String> {
    folder_at(store, Some(path))?.ok_or_else(|| anyhow!("The library root is not a folder"))
}

fn folder(store: &mut Store, cmd: FolderCommands) -> Result<()> {
    match cmd {
        FolderCommands::Add { path, color } => {
            let segments = split_path(&path);
            if segments.is_empty() {
                bail!("Folder path cannot be empty");
            }
            let mut parent: Option<String> = None;
            for depth in 1..=segments.len() {
                if let Some(existing) = store.find_folder_by_path(&segments[..depth]) {
                    parent = Some(existing.id.clone());
                    continue;
                }
                let color = if depth == segments.len() { color.as_deref() } else { None };
                let created = store.create_folder(&segments[depth - 1], parent.as_deref(), color)?;
                parent = Some(created.id);
            }
            render::success(&format!("Folder {}", segments.join("/")));
        }
        FolderCommands::Rename { path, new_name } => {
            let id = existing_folder(store, &path)?;
            let report = store.rename_folder(&id, &new_name)?;
            render::success(&format!(
                "Renamed to {}",
                render::display_path(&store.folder_path(Some(&id)))
            ));
            render::relocation(&report);
        }
        FolderCommands::Mv { path, dest } => {
            let id = existing_folder(store, &path)?;
            let dest = folder_at(store, dest.as_deref())?;
            let report = store.move_folder(&id, dest.as_deref())?;
            render::success(&format!(
                "Moved to {}",
                render::display_path(&store.folder_path(Some(&id)))
            ));
            render::relocation(&report);
        }
        FolderCommands::Rm { path, recursive } => {
            let id = existing_folder(store, &path)?;
            let report = store.delete_folder(&id, recursive)?;
            render::deletion(&report);
        }
        FolderCommands::Ls { path } => {
            let start = folder_at(store, path.as_deref())?;
            let start = start.as_deref().map(|id| store.folder(id)).transpose()?;
            render::folder_tree(store, start);
        }
    }
    Ok(())
}

// --- Recordings ---

/// Resolves an exact id, then a unique id prefix, then a unique title.
fn find_recording(store: &Store, query: &str) -> Result<String> {
    if store.recording(query).is_ok() {
        return Ok(query.to_string());
    }
    let by_prefix: Vec<&Recording> = store
        .recordings()
        .iter()
        .filter(|r| r.id.starts_with(query))
        .collect();
    let candidates = if by_prefix.is_empty() {
        store
            .recordings()
            .iter()
            .filter(|r| r.display_title() == query)
            .collect()
    } else {
        by_prefix
    };
    match candidates.as_slice() {
        [one] => Ok(one.id.clone()),
        [] => bail!("No recording matches '{}'", query),
        many => bail!(
            "'{}' matches {} recordings; use a longer id",
            query,
            many.len()
        ),
    }
}

fn rec(store: &mut Store, cmd: RecCommands) -> Result<()> {
    match cmd {
        RecCommands::Add {
            file,
            folder,
            title,
            crop_of,
        } => {
            let bytes =
                fs::read(&file).with_context(|| format!("Cannot read {}", file.display()))?;
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .ok_or_else(|| anyhow!("'{}' is not a file", file.display()))?;
            let title = title.unwrap_or_else(|| reelbox::model::file_stem(&filename).to_string());
            let folder = folder_at(store, folder.as_deref())?;

            let mut recording = Recording::new(filename, title)
                .in_folder(folder.unwrap_or_else(|| UNCATEGORIZED.to_string()));
            if let Some(parent) = crop_of {
                recording = recording.cropped_from(find_recording(store, &parent)?);
            }
            let saved = store.save_recording(recording, &bytes)?;
            render::success(&format!(
                "Added {} ({}) to {}",
                saved.display_title(),
                render::short_id(&saved.id),
                render::display_path(&store.recording_path(&saved))
            ));
        }
        RecCommands::Mv {
            recording,
            folder,
            title,
        } => {
            let id = find_recording(store, &recording)?;
            let dest = folder_at(store, folder.as_deref())?;
            let moved = match title {
                Some(title) => store.move_recording_with_rename(&id, dest.as_deref(), &title)?,
                None => store.move_recording(&id, dest.as_deref())?,
            };
            render::success(&format!(
                "Moved {} to {}",
                moved.display_title(),
                render::display_path(&store.recording_path(&moved))
            ));
        }
        RecCommands::Rename {
            recording,
            new_filename,
        } => {
            let id = find_recording(store, &recording)?;
            let renamed = store.rename_recording(&id, &new_filename)?;
            render::success(&format!("Renamed file to {}", renamed.filename));
        }
        RecCommands::Rm {
            recording,
            with_crops,
        } => {
            let id = find_recording(store, &recording)?;
            let title = store.recording(&id)?.display_title();
            store.delete_recording(&id, with_crops)?;
            render::success(&format!("Deleted {}", title));
        }
        RecCommands::Cat { recording, output } => {
            let id = find_recording(store, &recording)?;
            let bytes = store.get_recording_blob(&id)?;
            match output {
                Some(path) => {
                    fs::write(&path, &bytes)
                        .with_context(|| format!("Cannot write {}", path.display()))?;
                }
                None => std::io::stdout().lock().write_all(&bytes)?,
            }
        }
        RecCommands::Where { recording } => {
            let id = find_recording(store, &recording)?;
            println!("{}", store.recording_location(&id)?.display());
        }
        RecCommands::Tag(args) => tag(store, args)?,
        RecCommands::Ls { folder, json } => {
            let folder = folder_at(store, folder.as_deref())?;
            let list = store.data().recordings_in(folder.as_deref());
            if json {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                render::recordings(&list);
            }
        }
    }
    Ok(())
}

fn tag(store: &mut Store, args: TagArgs) -> Result<()> {
    let id = find_recording(store, &args.recording)?;
    let mut patch = RecordingPatch {
        title: args.title,
        rating: args.rating.map(Some),
        bpm: args.bpm.map(Some),
        key: args.key.map(Some),
        notes: args.notes.map(Some),
        color: args.color.map(Some),
        ..Default::default()
    };
    if !args.add.is_empty() || !args.remove.is_empty() {
        let mut tags: BTreeSet<String> = store.recording(&id)?.tags.clone();
        tags.extend(args.add);
        for removed in &args.remove {
            tags.remove(removed);
        }
        patch.tags = Some(tags);
    }
    let updated = store.update_recording(&id, patch)?;
    render::recordings(&[&updated]);
    Ok(())
}
