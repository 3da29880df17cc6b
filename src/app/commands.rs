//! One function per user action.
//!
//! Commands drive an [`AppState`] and write their visible output to an
//! injected writer, so the binary and the tests share the same code paths.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::state::AppState;
use crate::config::AppConfig;
use crate::core::{save_document, ClipboardSink, TypeFilter};

/// Inputs shared by every command that works on a root.
#[derive(Debug, Clone, Default)]
pub struct RootOptions {
    /// Falls back to the remembered directory when `None`.
    pub root: Option<PathBuf>,
    pub type_filter: Option<TypeFilter>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub root: RootOptions,
    /// Explicit selection. Relative paths are resolved against the root.
    pub select: Vec<PathBuf>,
    /// Select every file the search leaves visible.
    pub select_visible: bool,
    pub output: OutputOptions,
    /// Print the document and errors as one JSON object.
    pub json: bool,
}

#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    pub save_to: Option<PathBuf>,
    /// Save to the configured output file when `save_to` is `None`.
    pub save_default: bool,
    pub copy: bool,
}

impl OutputOptions {
    /// The file the result goes to, if any.
    pub fn save_target(&self, config: &AppConfig) -> Option<PathBuf> {
        match &self.save_to {
            Some(path) => Some(path.clone()),
            None if self.save_default => Some(config.default_output_path()),
            None => None,
        }
    }
}

/// Points the session at the requested (or remembered) root and applies the
/// type filter and file search.
pub fn open_root(state: &mut AppState, options: &RootOptions) -> Result<PathBuf> {
    let root = match &options.root {
        Some(root) => root.clone(),
        None if state.config.auto_load_last_directory => state
            .config
            .last_directory
            .clone()
            .context("Please select a valid folder first.")?,
        None => anyhow::bail!("Please select a valid folder first."),
    };

    if let Some(type_filter) = &options.type_filter {
        if !state.config.offers_type_filter(type_filter) {
            tracing::warn!(
                "Type filter {} is not one of the configured filters ({})",
                type_filter,
                state
                    .config
                    .type_filters
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        state.filter.type_filter = type_filter.clone();
    }
    state
        .select_root(&root)
        .with_context(|| format!("Error selecting folder {}", root.display()))?;
    if let Some(term) = &options.search {
        state.set_file_term(term);
    }

    for warning in &state.index_warnings {
        tracing::warn!("Skipped {}: {}", warning.path.display(), warning.message);
    }
    Ok(root)
}

/// Prints the visible files, one absolute path per line.
pub fn list_files(state: &mut AppState, options: &RootOptions, out: &mut dyn Write) -> Result<()> {
    open_root(state, options)?;
    for entry in state.visible_files() {
        writeln!(out, "{}", entry.absolute_path.display())?;
    }
    Ok(())
}

/// Aggregates the selection (or the whole root) and delivers the document.
///
/// Per-file read failures are reported on `err` and never fail the command.
pub fn parse_files(
    state: &mut AppState,
    options: &ParseOptions,
    clipboard: &dyn ClipboardSink,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<()> {
    let root = open_root(state, &options.root)?;

    for path in &options.select {
        let path = resolve_against(&root, path);
        if !state.select(&path) {
            writeln!(err, "Not part of the current file list: {}", path.display())?;
        }
    }
    if !options.select.is_empty() && state.selected.is_empty() {
        anyhow::bail!("None of the selected files are in {}", root.display());
    }
    if options.select_visible {
        state.select_all();
    }

    let result = state
        .parse_selected()
        .context("Error parsing folder")?
        .clone();

    let target = options.output.save_target(&state.config);
    if options.json {
        serde_json::to_writer_pretty(&mut *out, &result)?;
        writeln!(out)?;
    } else {
        for failure in &result.errors {
            writeln!(err, "Error reading {}: {}", failure.path.display(), failure.message)?;
        }
        if target.is_none() && !options.output.copy {
            writeln!(out, "{}", result.document)?;
        }
    }

    deliver(&result.document, target.as_deref(), options.output.copy, clipboard, out)
}

/// Renders the folder structure of the root and delivers it.
pub fn copy_structure(
    state: &mut AppState,
    options: &RootOptions,
    output: &OutputOptions,
    clipboard: &dyn ClipboardSink,
    out: &mut dyn Write,
) -> Result<()> {
    open_root(state, options)?;
    let tree = state
        .tree_structure()
        .context("Error copying file structure")?;

    let target = output.save_target(&state.config);
    if target.is_none() && !output.copy {
        writeln!(out, "{tree}")?;
    }
    deliver(&tree, target.as_deref(), output.copy, clipboard, out)
}

/// Prints the folders below `root` that survive `search`, indented by depth.
pub fn browse_folders(
    state: &mut AppState,
    root: Option<&Path>,
    depth: Option<usize>,
    search: Option<&str>,
    out: &mut dyn Write,
) -> Result<()> {
    let root = root
        .map(Path::to_path_buf)
        .or_else(|| state.config.folder_tree_root.clone())
        .context("No folder tree root configured")?;
    let depth = depth.unwrap_or(state.config.folder_tree_depth);

    let warnings = state
        .load_folder_tree(&root, depth)
        .with_context(|| format!("Error filtering folder tree at {}", root.display()))?;
    for warning in warnings {
        tracing::warn!("Skipped {}: {}", warning.path.display(), warning.message);
    }
    if let Some(term) = search {
        state.set_folder_term(term);
    }

    let Some(tree) = state.folder_tree.as_ref() else {
        return Ok(());
    };
    let mut stack = vec![(tree.root(), 0usize)];
    while let Some((id, level)) = stack.pop() {
        let node = tree.node(id);
        if !state.visible_folders.contains(&node.absolute_path) {
            continue;
        }
        writeln!(out, "{}{}/", "    ".repeat(level), node.name)?;
        for child in node.children.iter().rev() {
            stack.push((*child, level + 1));
        }
    }
    Ok(())
}

/// Prints one file with a count of search-term matches.
pub fn preview_file(
    state: &mut AppState,
    path: &Path,
    highlight: Option<&str>,
    out: &mut dyn Write,
) -> Result<()> {
    if let Some(term) = highlight {
        state.set_file_term(term);
    }
    let preview = state
        .preview(path)
        .with_context(|| format!("Error reading {}", path.display()))?;

    writeln!(out, "{}", preview.content)?;
    if !state.filter.file_term.is_empty() {
        let lines: Vec<usize> = preview
            .highlights
            .iter()
            .map(|range| preview.content[..range.start].matches('\n').count() + 1)
            .collect();
        writeln!(
            out,
            "-- {} match(es) for {:?} on line(s) {:?}",
            preview.highlights.len(),
            state.filter.file_term,
            lines
        )?;
    }
    Ok(())
}

fn deliver(
    text: &str,
    save_to: Option<&Path>,
    copy: bool,
    clipboard: &dyn ClipboardSink,
    out: &mut dyn Write,
) -> Result<()> {
    if let Some(path) = save_to {
        save_document(path, text).context("Error saving file")?;
        writeln!(out, "Saved to {}", path.display())?;
    }
    if copy {
        clipboard
            .set_text(text)
            .context("Error copying to clipboard")?;
        writeln!(out, "Copied to clipboard.")?;
    }
    Ok(())
}

fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
