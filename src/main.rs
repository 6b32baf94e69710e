//! Phototag CLI application entry point
//!
//! This is the main executable for the phototag gallery core. It is a
//! thin adapter: every command maps onto one session operation from
//! the library, plus some formatting.
//!
//! # Usage
//!
//! ```bash
//! # List a folder's images with their tags
//! phototag list ~/pictures
//! phototag ls ~/pictures -r -s "cats,dogs" --sort name
//!
//! # OR-mode search
//! phototag ls ~/pictures -s "| beach, sunset"
//!
//! # Append tag text to images (written into file metadata)
//! phototag tag img1.jpg img2.jpg -t "holiday"
//!
//! # Replace the tag string outright
//! phototag tag img1.jpg -t "archive" --replace
//!
//! # Re-read modified files into the cache
//! phototag refresh ~/pictures -r
//!
//! # Run the folder's export rules (.gallery_export.json)
//! phototag export ~/pictures
//!
//! # Quiet mode (only output results)
//! phototag -q ls ~/pictures
//! ```
//!
//! # Configuration
//!
//! Settings are stored in the user's config directory
//! (`~/.config/phototag/config.toml` on Linux) and the metadata cache
//! next to it. Tag reads and writes go through exiftool, which must be
//! on PATH for anything useful to happen.

use phototag::{
    PhototagError,
    cli::{Cli, Commands, ConfigCommands},
    config::AppConfig,
    metadata::ExifTool,
    output,
    session::{ListOptions, Session},
};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, PhototagError>;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve the folder argument, falling back to the configured default
fn resolve_folder(folder: Option<PathBuf>, config: &AppConfig) -> Result<PathBuf> {
    folder
        .or_else(|| config.default_folder.clone())
        .ok_or_else(|| {
            PhototagError::InvalidInput(
                "No folder given and no default_folder configured. \
                 Use 'phototag config set default_folder=<path>' or pass a folder."
                    .into(),
            )
        })
}

/// Handle the list command - show a folder's images with their tags
///
/// # Errors
///
/// Returns `PhototagError` if the folder cannot be enumerated.
fn handle_list_command(
    session: &mut Session<ExifTool>,
    folder: &Path,
    options: &ListOptions,
    quiet: bool,
) -> Result<()> {
    let mut report = |done: usize, total: usize| {
        if !quiet {
            eprint!("\rScanning... {done}/{total}");
        }
    };
    let records = session.list_images(folder, options, Some(&mut report))?;
    if !quiet {
        eprint!("\r");
    }

    if records.is_empty() {
        if !quiet {
            println!("No images found in {}", folder.display());
        }
        return Ok(());
    }

    if !quiet {
        println!("Found {} image(s) in {}:", records.len(), folder.display());
    }
    for record in &records {
        println!("{}", output::image_line(record, quiet));
    }
    Ok(())
}

/// Handle the tag command - write tag text to images
///
/// # Errors
///
/// Returns `PhototagError` if a path cannot be resolved. Individual
/// write failures are reported per file and do not abort the batch.
fn handle_tag_command(
    session: &mut Session<ExifTool>,
    files: &[PathBuf],
    text: &str,
    replace: bool,
    quiet: bool,
) -> Result<()> {
    let mut paths = Vec::with_capacity(files.len());
    for file in files {
        let fullpath = file.canonicalize().map_err(|e| {
            PhototagError::InvalidInput(format!(
                "Cannot access path '{}': {e}",
                file.display()
            ))
        })?;
        paths.push(fullpath);
    }

    let outcomes = session.write_tags(&paths, text, replace);
    let mut written = 0;
    for outcome in &outcomes {
        if outcome.written {
            written += 1;
            if !quiet {
                println!("Tagged {} with: {}", outcome.path.display(), outcome.tags);
            }
        } else {
            eprintln!("Failed to write tags to {}", outcome.path.display());
        }
    }
    if !quiet {
        println!("Wrote tags to {written} of {} file(s).", outcomes.len());
    }
    Ok(())
}

/// Handle the refresh command - re-read stale files into the cache
///
/// # Errors
///
/// Returns `PhototagError` if the folder cannot be enumerated.
fn handle_refresh_command(
    session: &mut Session<ExifTool>,
    folder: &Path,
    recursive: bool,
    full: bool,
    quiet: bool,
) -> Result<()> {
    let mut report = |done: usize, total: usize| {
        if !quiet {
            eprint!("\rRefreshing... {done}/{total}");
        }
    };
    let summary = session.refresh_folder(folder, recursive, full, Some(&mut report))?;
    if !quiet {
        eprint!("\r");
        println!(
            "Refreshed {} modified file(s), skipped {} up-to-date file(s).",
            summary.refreshed, summary.skipped
        );
    }
    Ok(())
}

/// Handle the export command - run the folder's export rules
///
/// # Errors
///
/// Returns `PhototagError` if the folder cannot be enumerated or the
/// rule file is missing. Per-rule failures are reported inline and do
/// not abort the batch.
fn handle_export_command(
    session: &mut Session<ExifTool>,
    folder: &Path,
    recursive: bool,
    quiet: bool,
) -> Result<()> {
    let outcomes = session.export_folder(folder, recursive)?;
    let succeeded = outcomes.iter().filter(|o| o.result.is_ok()).count();

    for outcome in &outcomes {
        if quiet && outcome.result.is_ok() {
            continue;
        }
        println!("{}", output::rule_line(outcome));
    }
    if !quiet {
        println!("Exported {succeeded} of {} rule(s).", outcomes.len());
    }
    Ok(())
}

/// Handle the tags command - list distinct tags used in a folder
///
/// # Errors
///
/// Returns `PhototagError` if the folder cannot be enumerated.
fn handle_tags_command(
    session: &mut Session<ExifTool>,
    folder: &Path,
    recursive: bool,
    quiet: bool,
) -> Result<()> {
    let stats = session.tag_stats(folder, recursive)?;

    if stats.is_empty() {
        if !quiet {
            println!("No tags found in {}", folder.display());
        }
        return Ok(());
    }

    if !quiet {
        println!("Tags in {}:", folder.display());
    }
    for (tag, count) in &stats {
        println!("{}", output::tag_with_count(tag, *count, quiet));
    }
    Ok(())
}

/// Handle the config command - manage application settings
///
/// # Errors
///
/// Returns `PhototagError` if the key is unknown, the value cannot be
/// parsed, or the configuration cannot be saved.
fn handle_config_command(
    mut config: AppConfig,
    command: &ConfigCommands,
    quiet: bool,
) -> Result<()> {
    match command {
        ConfigCommands::Set { setting } => {
            let parts: Vec<&str> = setting.splitn(2, '=').collect();
            if parts.len() != 2 {
                return Err(PhototagError::InvalidInput(
                    "Invalid format. Use: phototag config set key=value".into(),
                ));
            }

            let key = parts[0].trim();
            let value = parts[1].trim();

            match key {
                "quiet" => {
                    let new_value = value.parse::<bool>().map_err(|_| {
                        PhototagError::InvalidInput(format!(
                            "Invalid value for quiet: '{value}'. Use 'true' or 'false'"
                        ))
                    })?;
                    config.quiet = new_value;
                    config.save()?;
                    if !quiet {
                        println!("Set quiet = {new_value}");
                    }
                }
                "default_folder" => {
                    config.default_folder = if value.is_empty() {
                        None
                    } else {
                        Some(PathBuf::from(value))
                    };
                    config.save()?;
                    if !quiet {
                        println!("Set default_folder = {value}");
                    }
                }
                _ => {
                    return Err(PhototagError::InvalidInput(format!(
                        "Unknown configuration key: '{key}'. Available keys: quiet, default_folder"
                    )));
                }
            }
        }
        ConfigCommands::Get { key } => match key.as_str() {
            "quiet" => println!("{}", config.quiet),
            "default_folder" => println!(
                "{}",
                config
                    .default_folder
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            ),
            _ => {
                return Err(PhototagError::InvalidInput(format!(
                    "Unknown configuration key: '{key}'. Available keys: quiet, default_folder"
                )));
            }
        },
    }
    Ok(())
}

/// Main entry point for the phototag application
///
/// Loads configuration, parses command-line arguments, and dispatches
/// to the appropriate command handler.
///
/// # Errors
///
/// Returns `PhototagError` if configuration loading fails, the session
/// cannot be opened, or any command handler returns an error.
fn main() -> Result<()> {
    init_logging();

    let config = AppConfig::load()?;
    let cli = Cli::parse_args();
    let quiet = cli.quiet || config.quiet;

    if let Commands::Config { command } = &cli.command {
        return handle_config_command(config, command, quiet);
    }

    if !ExifTool::is_available() {
        warn!("exiftool not found on PATH; tag reads will come up empty and writes will fail");
    }

    let mut session = Session::open(config)?;

    match cli.command {
        Commands::List { folder, recursive, search, sort, descending } => {
            let folder = resolve_folder(folder, session.config())?;
            let options = ListOptions { recursive, filter: search, sort, descending };
            handle_list_command(&mut session, &folder, &options, quiet)
        }
        Commands::Tag { files, tags, replace } => {
            handle_tag_command(&mut session, &files, &tags, replace, quiet)
        }
        Commands::Refresh { folder, recursive, full } => {
            let folder = resolve_folder(folder, session.config())?;
            handle_refresh_command(&mut session, &folder, recursive, full, quiet)
        }
        Commands::Export { folder, recursive } => {
            let folder = resolve_folder(folder, session.config())?;
            handle_export_command(&mut session, &folder, recursive, quiet)
        }
        Commands::Tags { folder, recursive } => {
            let folder = resolve_folder(folder, session.config())?;
            handle_tags_command(&mut session, &folder, recursive, quiet)
        }
        Commands::Config { .. } => unreachable!(),
    }
}
