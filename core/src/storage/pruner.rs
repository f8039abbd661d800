use std::path::Path;

use tokio::fs;
use tracing::{debug, instrument, warn};

use super::Result;

/// Deletes `start_dir` if it is empty, then its parent if that became empty, and so on.
///
/// Stops at the first non-empty directory or on reaching `root_boundary`, which is
/// never deleted. Only the chain of ancestors is touched, never sibling directories.
/// A `start_dir` that does not exist or lies outside `root_boundary` is left alone.
///
/// Both paths are compared component-wise and should be absolute and canonical.
/// Returns the number of directories removed.
#[instrument(skip_all, fields(start = %start_dir.display(), boundary = %root_boundary.display()))]
pub async fn prune_upward(start_dir: &Path, root_boundary: &Path) -> Result<usize> {
    if !start_dir.starts_with(root_boundary) {
        warn!("Refusing to prune outside of the notes root");
        return Ok(0);
    }

    let mut removed = 0;
    let mut current = start_dir;
    while current != root_boundary {
        let mut entries = match fs::read_dir(current).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Directory does not exist: {}", current.display());
                break;
            }
            Err(e) => return Err(e.into()),
        };
        if entries.next_entry().await?.is_some() {
            debug!("Directory not empty, stopping: {}", current.display());
            break;
        }

        fs::remove_dir(current).await?;
        debug!("Removed empty directory: {}", current.display());
        removed += 1;

        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn removes_single_empty_directory_below_boundary() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("keep.md"), "").await.unwrap();
        let start = root.join("empty");
        fs::create_dir(&start).await.unwrap();

        assert_eq!(prune_upward(&start, root).await.unwrap(), 1);
        assert!(!start.exists());
        assert!(root.exists());
    }

    #[tokio::test]
    async fn removes_chain_until_non_empty_ancestor() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a/b/c")).await.unwrap();
        fs::write(root.join("a/other.md"), "").await.unwrap();

        assert_eq!(prune_upward(&root.join("a/b/c"), root).await.unwrap(), 2);
        assert!(!root.join("a/b").exists());
        assert!(root.join("a/other.md").exists());
    }

    #[tokio::test]
    async fn never_deletes_boundary() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("notes");
        fs::create_dir_all(root.join("x/y")).await.unwrap();

        assert_eq!(prune_upward(&root.join("x/y"), &root).await.unwrap(), 2);
        assert!(root.exists());
        assert_eq!(prune_upward(&root, &root).await.unwrap(), 0);
        assert!(root.exists());
    }

    #[tokio::test]
    async fn leaves_non_empty_start_alone() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a/sub")).await.unwrap();

        assert_eq!(prune_upward(&root.join("a"), root).await.unwrap(), 0);
        assert!(root.join("a/sub").exists());
    }

    #[tokio::test]
    async fn missing_start_is_a_no_op() {
        let dir = tempdir().unwrap();
        assert_eq!(prune_upward(&dir.path().join("gone/deeper"), dir.path()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn outside_boundary_is_a_no_op() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("notes");
        let outside = dir.path().join("elsewhere");
        fs::create_dir_all(&root).await.unwrap();
        fs::create_dir_all(&outside).await.unwrap();

        assert_eq!(prune_upward(&outside, &root).await.unwrap(), 0);
        assert!(outside.exists());
    }
}
