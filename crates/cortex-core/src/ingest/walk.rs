use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::IngestError;

/// Walk `dir`, optionally recursively, skipping dotfiles and symlinked
/// directories (reported as walk errors, not a failed walk). Filters the
/// collected files by include/exclude extensions afterward (§4.C).
pub fn walk_directory(
    dir: &Path,
    recursive: bool,
    include_extensions: &HashSet<String>,
    exclude_extensions: &HashSet<String>,
) -> (Vec<PathBuf>, Vec<IngestError>) {
    let mut files = Vec::new();
    let mut errors = Vec::new();
    walk_inner(dir, recursive, &mut files, &mut errors);

    let filtered = files
        .into_iter()
        .filter(|p| passes_extension_filter(p, include_extensions, exclude_extensions))
        .collect();

    (filtered, errors)
}

fn walk_inner(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>, errors: &mut Vec<IngestError>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            errors.push(IngestError {
                path: dir.to_path_buf(),
                line: None,
                message: e.to_string(),
            });
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') {
            continue;
        }

        let is_symlink = path.symlink_metadata().map(|m| m.file_type().is_symlink()).unwrap_or(false);

        if path.is_dir() {
            if is_symlink {
                errors.push(IngestError {
                    path: path.clone(),
                    line: None,
                    message: "symlinked directory skipped".into(),
                });
                continue;
            }
            if recursive {
                walk_inner(&path, recursive, files, errors);
            }
            continue;
        }

        files.push(path);
    }
}

fn passes_extension_filter(
    path: &Path,
    include_extensions: &HashSet<String>,
    exclude_extensions: &HashSet<String>,
) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if exclude_extensions.contains(&ext) {
        return false;
    }
    if !include_extensions.is_empty() && !include_extensions.contains(&ext) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "content").unwrap();
        path
    }

    #[test]
    fn skips_dotfiles() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".hidden.md");
        touch(dir.path(), "visible.md");
        let (files, _) = walk_directory(dir.path(), true, &HashSet::new(), &HashSet::new());
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("visible.md"));
    }

    #[test]
    fn recursive_flag_controls_descent() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        touch(&sub, "nested.md");
        touch(dir.path(), "top.md");

        let (shallow, _) = walk_directory(dir.path(), false, &HashSet::new(), &HashSet::new());
        assert_eq!(shallow.len(), 1);

        let (deep, _) = walk_directory(dir.path(), true, &HashSet::new(), &HashSet::new());
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn include_extensions_filters() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.md");
        touch(dir.path(), "b.json");
        let mut include = HashSet::new();
        include.insert("md".to_string());
        let (files, _) = walk_directory(dir.path(), true, &include, &HashSet::new());
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.md"));
    }
}
