use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use folder_parser::app::commands::{self, OutputOptions, ParseOptions, RootOptions};
use folder_parser::app::AppState;
use folder_parser::config::{self, AppConfig};
use folder_parser::core::{SystemClipboard, TypeFilter};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Browse a folder, filter its files, and concatenate them into one document.
#[derive(Parser, Debug)]
#[command(name = "folder-parser", version, about)]
struct Cli {
    /// Use this config file instead of the platform default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct RootArgs {
    /// Folder to work on (defaults to the last one used)
    root: Option<PathBuf>,

    /// File type filter: "All Files" or an extension such as .txt
    #[arg(short = 't', long = "type")]
    type_filter: Option<TypeFilter>,

    /// Show only files whose name contains this text (case-insensitive)
    #[arg(short, long)]
    search: Option<String>,
}

impl From<RootArgs> for RootOptions {
    fn from(args: RootArgs) -> Self {
        RootOptions {
            root: args.root,
            type_filter: args.type_filter,
            search: args.search,
        }
    }
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Save the result to this file, or to the configured output file when
    /// no path is given
    #[arg(short, long, num_args = 0..=1, value_name = "PATH")]
    out: Option<Option<PathBuf>>,

    /// Copy the result to the clipboard
    #[arg(short, long)]
    copy: bool,
}

impl From<OutputArgs> for OutputOptions {
    fn from(args: OutputArgs) -> Self {
        OutputOptions {
            save_default: matches!(args.out, Some(None)),
            save_to: args.out.flatten(),
            copy: args.copy,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the files of a folder that pass the filters
    List(RootArgs),
    /// Concatenate the selected (or all) files into one document
    Parse {
        #[command(flatten)]
        root: RootArgs,
        /// Parse only these files (relative to the folder or absolute)
        #[arg(long = "select", value_name = "FILE")]
        select: Vec<PathBuf>,
        /// Parse every file the search leaves visible
        #[arg(long, requires = "search")]
        select_visible: bool,
        /// Print the document and the read errors as JSON
        #[arg(long, conflicts_with_all = ["out", "copy"])]
        json: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print the folder structure as an indented tree
    Tree {
        /// Folder to render (defaults to the last one used)
        root: Option<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Browse folders below a root, filtered by name
    Folders {
        /// Where the tree starts (defaults to the configured folder tree root)
        #[arg(long)]
        root: Option<PathBuf>,
        /// How many levels to descend
        #[arg(long)]
        depth: Option<usize>,
        /// Show only folders whose name or path contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one file, optionally counting matches of a search term
    Preview {
        file: PathBuf,
        #[arg(long)]
        highlight: Option<String>,
    },
    /// Inspect or reset the settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active settings as JSON
    Show,
    /// Print the settings file location
    Path,
    /// Restore the default settings
    Reset,
    /// Write the active settings to a JSON file
    Export { path: PathBuf },
    /// Replace the settings with those from a JSON file
    Import { path: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config_path = cli.config.clone();
    let config = AppConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::error!("Failed to load config, using defaults: {:#}", e);
        AppConfig::default()
    });
    let mut state = AppState::new(config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let stderr = io::stderr();
    let mut err = stderr.lock();
    let clipboard = SystemClipboard;

    match cli.command {
        Command::List(root) => commands::list_files(&mut state, &root.into(), &mut out)?,
        Command::Parse {
            root,
            select,
            select_visible,
            json,
            output,
        } => {
            let options = ParseOptions {
                root: root.into(),
                select,
                select_visible,
                output: output.into(),
                json,
            };
            commands::parse_files(&mut state, &options, &clipboard, &mut out, &mut err)?;
        }
        Command::Tree { root, output } => {
            let options = RootOptions {
                root,
                ..Default::default()
            };
            commands::copy_structure(&mut state, &options, &output.into(), &clipboard, &mut out)?;
        }
        Command::Folders {
            root,
            depth,
            search,
        } => commands::browse_folders(
            &mut state,
            root.as_deref(),
            depth,
            search.as_deref(),
            &mut out,
        )?,
        Command::Preview { file, highlight } => {
            commands::preview_file(&mut state, &file, highlight.as_deref(), &mut out)?
        }
        Command::Config { action } => {
            return run_config_action(action, &state.config, config_path, &mut out);
        }
    }

    // Remember the folder for the next run.
    if let Err(e) = config::settings::save_config(&state.config, config_path.as_deref()) {
        tracing::error!("Failed to save config on exit: {:#}", e);
    }
    Ok(())
}

fn run_config_action(
    action: ConfigAction,
    current: &AppConfig,
    config_path: Option<PathBuf>,
    out: &mut dyn Write,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            writeln!(out, "{}", serde_json::to_string_pretty(current)?)?;
        }
        ConfigAction::Path => {
            let path = config_path
                .or_else(config::settings::get_config_file_path)
                .context("Could not determine config directory")?;
            writeln!(out, "{}", path.display())?;
        }
        ConfigAction::Reset => {
            config::settings::save_config(&AppConfig::default(), config_path.as_deref())?;
            writeln!(out, "Settings restored to defaults.")?;
        }
        ConfigAction::Export { path } => {
            config::settings::export_config(current, &path)
                .with_context(|| format!("Error exporting config to {}", path.display()))?;
            writeln!(out, "Exported settings to {}", path.display())?;
        }
        ConfigAction::Import { path } => {
            let imported = config::settings::import_config(&path)
                .with_context(|| format!("Error importing config from {}", path.display()))?;
            config::settings::save_config(&imported, config_path.as_deref())?;
            writeln!(out, "Imported settings from {}", path.display())?;
        }
    }
    Ok(())
}
