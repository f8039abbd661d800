use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, instrument};

use crate::path::{normalize_segment, FolderPath, MAX_SEGMENTS};

/// Lists the folders below `root`, at most `max_depth` levels deep, as paths relative
/// to `root`.
///
/// Folders are returned depth first: each folder comes right before its own
/// subfolders. Hidden folders and symlinks are ignored, as are folders whose name is
/// not already a normalized segment (e.g. `Work Notes`): every listed folder must
/// resolve to itself on disk. A skipped or unreadable folder is skipped together with
/// everything below it; scanning never fails as a whole.
#[instrument(skip(root), fields(root = %root.display()))]
pub async fn list_folders(root: &Path, max_depth: usize) -> Vec<FolderPath> {
    walk(root, max_depth, subdirectories).await
}

async fn walk<F, Fut>(root: &Path, max_depth: usize, list: F) -> Vec<FolderPath>
where
    F: Fn(PathBuf) -> Fut,
    Fut: Future<Output = io::Result<Vec<PathBuf>>>,
{
    let max_depth = max_depth.min(MAX_SEGMENTS);
    let mut folders = Vec::new();
    if max_depth == 0 {
        return folders;
    }

    // Stack of (directory, depth below root); children are pushed in reverse so they
    // pop in listing order
    let mut stack: Vec<(PathBuf, usize)> = match list(root.to_path_buf()).await {
        Ok(children) => children.into_iter().rev().map(|c| (c, 1)).collect(),
        Err(e) => {
            debug!(error = %e, "Could not read notes root");
            return folders;
        }
    };

    while let Some((dir, depth)) = stack.pop() {
        if !has_normalized_name(&dir) {
            debug!("Skipping folder whose name is not a normalized segment: {}", dir.display());
            continue;
        }
        let Some(folder) = dir.strip_prefix(root).ok().and_then(FolderPath::from_relative) else {
            debug!("Skipping folder with unusable name: {}", dir.display());
            continue;
        };
        folders.push(folder);

        if depth < max_depth {
            match list(dir.clone()).await {
                Ok(children) => stack.extend(children.into_iter().rev().map(|c| (c, depth + 1))),
                Err(e) => debug!(error = %e, "Skipping unreadable folder: {}", dir.display()),
            }
        }
    }
    debug!("Found {} folders", folders.len());
    folders
}

fn has_normalized_name(dir: &Path) -> bool {
    dir.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| !name.is_empty() && normalize_segment(name) == name)
}

/// Visible subdirectories of `dir`, sorted by name.
async fn subdirectories(dir: PathBuf) -> io::Result<Vec<PathBuf>> {
    let mut read_dir = fs::read_dir(&dir).await?;
    let mut dirs = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        // `file_type` does not follow symlinks, which keeps us out of cycles
        if entry.file_type().await?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}
