//! `powerpipe mod`: installed mod listing.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::cli::{CommandNode, ExitOutcome, FlagSpec, INTERRUPTED_EXIT_CODE};
use crate::config::INSTALL_DIR_KEY;
use crate::error::{CommandFailure, RegistrationError};
use crate::scope::ExecutionScope;

/// Directory holding installed mods, relative to the install dir.
const MODS_DIR: &str = "mods";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledMod {
    /// Path relative to the mods dir, e.g. `github.com/turbot/steampipe-mod-aws-insights`.
    pub name: String,
    /// Version suffix after `@`, when the directory carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub path: PathBuf,
}

pub fn command() -> Result<CommandNode, RegistrationError> {
    let mut group = CommandNode::new("mod", "Powerpipe mod management")?;
    let mut list = CommandNode::new("list", "List installed mods")?.with_run(run_list);
    list.declare_flag(FlagSpec::switch("json", "Output as JSON"))?;
    group.add_child(list)?;
    Ok(group)
}

/// Mods installed under `install_dir`, sorted by name.
///
/// Mods live at `<mods>/<host>/<org>/<name>@<version>`; a directory counts as
/// a mod once it carries a version suffix or holds a `mod.pp` file.
pub fn list_installed(install_dir: &Path) -> anyhow::Result<Vec<InstalledMod>> {
    let root = install_dir.join(MODS_DIR);
    if !root.is_dir() {
        debug!(path = %root.display(), "Mods directory missing");
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    let mut walker = WalkDir::new(&root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry.with_context(|| format!("walking {}", root.display()))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let versioned = entry.file_name().to_string_lossy().contains('@');
        if versioned || entry.path().join("mod.pp").is_file() {
            found.push(installed_mod(&root, entry.path()));
            // Nested directories belong to the mod itself.
            walker.skip_current_dir();
        }
    }
    found.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.version.cmp(&b.version)));
    Ok(found)
}

fn installed_mod(root: &Path, path: &Path) -> InstalledMod {
    let relative = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/");
    let (name, version) = match relative.rsplit_once('@') {
        Some((name, version)) => (name.to_string(), Some(version.to_string())),
        None => (relative.clone(), None),
    };
    InstalledMod {
        name,
        version,
        path: path.to_path_buf(),
    }
}

pub fn format_list_text(mods: &[InstalledMod]) -> String {
    if mods.is_empty() {
        return "No mods installed.\n".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Mod", "Version"]);
    for m in mods {
        table.add_row(vec![
            m.name.clone(),
            m.version.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }
    format!("{}\n", table)
}

/// Write `mods` to `out` as a table or pretty JSON.
pub fn write_list(out: &mut dyn Write, mods: &[InstalledMod], json: bool) -> anyhow::Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(mods)?)?;
    } else {
        out.write_all(format_list_text(mods).as_bytes())?;
    }
    out.flush()?;
    Ok(())
}

fn run_list(scope: &ExecutionScope, _args: &[String]) -> anyhow::Result<ExitOutcome> {
    let install_dir = scope
        .config()
        .and_then(|store| store.get_path(INSTALL_DIR_KEY))
        .context("install directory is not configured")?;
    let json = scope
        .flags()
        .and_then(|flags| flags.get_bool("json"))
        .unwrap_or(false);

    let reporter = scope.status();
    reporter.begin("Loading installed mods");
    let mods = list_installed(&install_dir);
    reporter.stop();

    if scope.is_cancelled() {
        return Err(CommandFailure::new(INTERRUPTED_EXIT_CODE, "interrupted").into());
    }
    let mods = mods?;

    write_list(&mut std::io::stdout().lock(), &mods, json).context("writing mod list")?;
    Ok(ExitOutcome::SUCCESS)
}
