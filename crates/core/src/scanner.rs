//! Enumerates candidate MP3 files in the source directory.

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// List `.mp3` files directly inside `root`, sorted for a stable
/// processing order. Hidden files and exclude-glob matches are dropped;
/// unreadable directory entries are skipped.
pub fn scan(root: &Path, excludes: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let exclude_set = build_globset(excludes)?;
    let mut files = Vec::new();

    for entry in WalkDir::new(root).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let path = entry.path();
        if path.is_dir() || is_hidden(path) || exclude_set.is_match(path) {
            continue;
        }
        if !has_mp3_extension(path) {
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid exclude glob {pat:?}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn has_mp3_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("mp3"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_only_mp3_files_at_depth_one() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.mp3"), b"x").unwrap();
        fs::write(dir.path().join("B.MP3"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"x").unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("deep.mp3"), b"x").unwrap();

        let found = scan(dir.path(), &[]).unwrap();
        let names: Vec<_> = found
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, vec!["B.MP3", "a.mp3"]);
    }

    #[test]
    fn exclude_globs_filter_candidates() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("keep.mp3"), b"x").unwrap();
        fs::write(dir.path().join("skip_me.mp3"), b"x").unwrap();

        let found = scan(dir.path(), &["**/skip_*.mp3".to_string()]).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("keep.mp3"));
    }

    #[test]
    fn empty_directory_yields_no_candidates() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan(dir.path(), &[]).unwrap().is_empty());
    }
}
