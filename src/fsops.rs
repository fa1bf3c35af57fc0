use log::{error, info, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively collects regular files under `dir`, keeping only paths ending
/// in `suffix` (empty `suffix` keeps everything). Unreadable entries are
/// logged and skipped.
pub fn search_directory(dir: &Path, suffix: &str) -> Vec<String> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) if e.file_type().is_file() => {
                let path = e.path().to_string_lossy().to_string();
                path.ends_with(suffix).then_some(path)
            }
            Ok(_) => None,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                None
            }
        })
        .collect()
}

/// Deletes files, tolerating ones that are already gone. `label` names the
/// kind of file in log output.
pub fn delete_files_safely(files: &[PathBuf], label: &str) {
    for path in files {
        match std::fs::remove_file(path) {
            Ok(()) => info!("Deleted {label}: {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("{label} not found: {}", path.display());
            }
            Err(e) => error!("Error deleting {label} {}: {}", path.display(), e),
        }
    }
}

/// Removes empty directories under `base`, deepest first so nested empties
/// collapse in a single pass. `base` itself is left in place.
pub fn cleanup_empty_dirs(base: &Path) {
    let mut dirs: Vec<PathBuf> = WalkDir::new(base)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.into_path())
        .collect();
    dirs.sort_by_key(|d| std::cmp::Reverse(d.components().count()));

    for dir in dirs {
        match std::fs::read_dir(&dir) {
            Ok(mut entries) => {
                if entries.next().is_none() {
                    match std::fs::remove_dir(&dir) {
                        Ok(()) => info!("Deleted directory: {}", dir.display()),
                        Err(e) => error!("Error deleting directory {}: {}", dir.display(), e),
                    }
                }
            }
            Err(e) => warn!("Directory not readable: {}: {}", dir.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn search_finds_nested_files() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a.csv"));
        touch(&dir.path().join("00/t_2m/b.grib2.bz2"));

        let mut found = search_directory(dir.path(), "");
        found.sort();
        assert_eq!(found.len(), 2);
        assert!(found[1].ends_with("a.csv") || found[0].ends_with("a.csv"));
    }

    #[test]
    fn search_applies_suffix_filter() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("keep.bz2"));
        touch(&dir.path().join("drop.txt"));

        let found = search_directory(dir.path(), ".bz2");
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("keep.bz2"));
    }

    #[test]
    fn delete_tolerates_missing_files() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("present");
        touch(&present);
        let absent = dir.path().join("absent");

        delete_files_safely(&[present.clone(), absent], "test file");
        assert!(!present.exists());
    }

    #[test]
    fn cleanup_removes_nested_empty_dirs_only() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("empty/inner")).unwrap();
        touch(&dir.path().join("full/file"));

        cleanup_empty_dirs(dir.path());
        assert!(!dir.path().join("empty").exists());
        assert!(dir.path().join("full/file").exists());
        assert!(dir.path().exists());
    }
}
