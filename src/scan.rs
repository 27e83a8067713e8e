use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use tracing::{debug, warn};

use crate::error::{BackgroundError, Result};

/// What a configured `image` path points at.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Directory(PathBuf),
    File(PathBuf),
}

/// Expands `~` and environment variables the way a shell would.
/// Unknown variables leave the path untouched.
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(e) => {
            debug!("Could not expand {path}: {e}");
            PathBuf::from(shellexpand::tilde(path).as_ref())
        }
    }
}

pub fn resolve(path: &str) -> Target {
    let expanded = expand_path(path);
    if expanded.is_dir() {
        Target::Directory(expanded)
    } else {
        Target::File(expanded)
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

/// Recursively collects every non-hidden file below `dir`, depth-first.
///
/// Only a failure to open `dir` itself is an error; unreadable
/// subdirectories are skipped with a warning.
pub fn scan_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    let mut visited = HashSet::new();
    scan_dir(dir, &mut paths, &mut visited)?;
    Ok(paths)
}

fn scan_dir(dir: &Path, paths: &mut Vec<PathBuf>, visited: &mut HashSet<PathBuf>) -> Result<()> {
    // Symlinked directories may point back up the tree.
    if let Ok(canonical) = dir.canonicalize() {
        if !visited.insert(canonical) {
            return Ok(());
        }
    }

    let entries = fs::read_dir(dir).map_err(|source| BackgroundError::Scan {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries.flatten() {
        let path = entry.path();
        if is_hidden(&path) {
            continue;
        }

        // fs::metadata follows symlinks, so linked files and folders count.
        let Ok(metadata) = fs::metadata(&path) else {
            continue;
        };
        if metadata.is_dir() {
            if let Err(e) = scan_dir(&path, paths, visited) {
                warn!("{e}");
            }
        } else {
            paths.push(path);
        }
    }
    Ok(())
}

pub fn shuffle(paths: &mut [PathBuf]) {
    paths.shuffle(&mut rand::rng());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    fn names(paths: &[PathBuf], root: &Path) -> Vec<String> {
        let mut names: Vec<String> = paths
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn scans_nested_directories_and_skips_hidden_entries() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("a.png"));
        touch(&root.join("nested/b.jpg"));
        touch(&root.join("nested/deeper/c.jpg"));
        touch(&root.join(".hidden.png"));
        touch(&root.join(".cache/d.png"));

        let paths = scan_images(root).unwrap();
        assert_eq!(
            names(&paths, root),
            vec!["a.png", "nested/b.jpg", "nested/deeper/c.jpg"]
        );
    }

    #[test]
    fn missing_directory_is_a_scan_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_images(&dir.path().join("gone")).unwrap_err();
        assert!(matches!(err, BackgroundError::Scan { .. }));
    }

    #[test]
    fn resolve_distinguishes_directories_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("single.png");
        touch(&file);

        let dir_str = dir.path().to_str().unwrap();
        assert_eq!(resolve(dir_str), Target::Directory(dir.path().to_path_buf()));
        assert_eq!(resolve(file.to_str().unwrap()), Target::File(file.clone()));
    }

    #[test]
    fn expands_home_directory() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/walls"), home.join("walls"));
        }
        assert_eq!(expand_path("/plain/path"), PathBuf::from("/plain/path"));
    }

    #[test]
    fn shuffle_keeps_contents() {
        let mut paths: Vec<PathBuf> = (0..20).map(|i| PathBuf::from(format!("{i}.png"))).collect();
        let original = paths.clone();
        shuffle(&mut paths);
        paths.sort();
        let mut sorted = original;
        sorted.sort();
        assert_eq!(paths, sorted);
    }
}
