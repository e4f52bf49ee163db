//! Directory-listing items for browse mode

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{Item, ItemId, ItemTree};

/// Expand a leading `~/` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None if path == "~" => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

/// Whether `id` is a childless item whose output names a directory
pub fn is_browsable(tree: &ItemTree, id: ItemId) -> bool {
    let item = tree.get(id);
    if item.is_separator() || tree.has_children(id) {
        return false;
    }
    item.output
        .as_deref()
        .map(|out| expand_home(out).is_dir())
        .unwrap_or(false)
}

/// Generate detached items listing the directory named by `owner`'s output.
///
/// Hidden entries are skipped; the rest are sorted by file name. Each item's
/// output is the entry's full path.
pub fn list_directory(tree: &mut ItemTree, owner: ItemId) -> io::Result<Vec<ItemId>> {
    let dir = tree
        .get(owner)
        .output
        .as_deref()
        .map(expand_home)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "item has no output"))?;

    let mut entries = read_entries(&dir)?;
    entries.sort();

    Ok(entries
        .into_iter()
        .map(|(name, path)| {
            let output = path.to_string_lossy().into_owned();
            tree.push_detached(owner, Item::entry(name, Some(output)))
        })
        .collect())
}

fn read_entries(dir: &Path) -> io::Result<Vec<(String, PathBuf)>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        entries.push((name, entry.path()));
    }
    Ok(entries)
}
