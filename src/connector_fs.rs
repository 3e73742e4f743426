//! Filesystem discovery of post source files.
//!
//! Two layouts are supported (see [`Layout`]):
//!
//! - **folders**: every immediate subdirectory of the root is one post; the
//!   first existing file from `index_files` inside it is the source.
//!   Folders without one are skipped.
//! - **flat**: every file under the root (recursively) matching
//!   `include_globs` is one post.
//!
//! A missing root is not an error and yields no files. A root that exists
//! but cannot be read is an error.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{ContentConfig, Layout};

/// One discovered post source, not yet read.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Folder name (folders layout) or file stem (flat layout).
    pub unit_name: String,
    pub modified: Option<DateTime<Utc>>,
}

/// What the content root looked like.
#[derive(Debug)]
pub enum Discovery {
    /// Root does not exist. Expected on fresh deployments.
    RootMissing,
    Found(Vec<SourceFile>),
}

pub fn scan_content(config: &ContentConfig) -> Result<Discovery> {
    let root = &config.root;
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => bail!("Content root is not a directory: {}", root.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Discovery::RootMissing),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to inspect content root: {}", root.display()))
        }
    }

    let files = match config.layout {
        Layout::Folders => scan_folders(root, &config.index_files)?,
        Layout::Flat => scan_flat(root, &config.include_globs)?,
    };
    Ok(Discovery::Found(files))
}

fn scan_folders(root: &Path, index_files: &[String]) -> Result<Vec<SourceFile>> {
    let entries = std::fs::read_dir(root)
        .with_context(|| format!("Failed to read content root: {}", root.display()))?;

    let mut folders = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("Failed to read content root: {}", root.display()))?;
        let path = entry.path();
        if path.is_dir() {
            folders.push(path);
        }
    }
    // Sort for deterministic ordering
    folders.sort();

    let mut files = Vec::new();
    for folder in folders {
        let Some(path) = index_files
            .iter()
            .map(|name| folder.join(name))
            .find(|candidate| candidate.is_file())
        else {
            continue;
        };
        let unit_name = folder
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        files.push(SourceFile {
            modified: modified_time(&path),
            path,
            unit_name,
        });
    }
    Ok(files)
}

fn scan_flat(root: &Path, include_globs: &[String]) -> Result<Vec<SourceFile>> {
    let include_set = build_globset(include_globs)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("Failed to walk content root: {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if !include_set.is_match(relative) {
            continue;
        }

        let unit_name = path
            .file_stem()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        files.push(SourceFile {
            path: path.to_path_buf(),
            unit_name,
            modified: modified_time(path),
        });
    }
    Ok(files)
}

fn modified_time(path: &Path) -> Option<DateTime<Utc>> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .with_context(|| format!("Invalid include glob: {}", pattern))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;
    use tempfile::TempDir;

    fn found(discovery: Discovery) -> Vec<SourceFile> {
        match discovery {
            Discovery::Found(files) => files,
            Discovery::RootMissing => panic!("expected files, root reported missing"),
        }
    }

    fn config(root: &Path, layout: Layout) -> ContentConfig {
        let mut cfg = Config::minimal(root).content;
        cfg.layout = layout;
        cfg
    }

    #[test]
    fn test_missing_root() {
        let tmp = TempDir::new().unwrap();
        let cfg = config(&tmp.path().join("nope"), Layout::Folders);
        assert!(matches!(scan_content(&cfg).unwrap(), Discovery::RootMissing));
    }

    #[test]
    fn test_root_is_a_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("blog");
        fs::write(&file, "x").unwrap();
        assert!(scan_content(&config(&file, Layout::Folders)).is_err());
    }

    #[test]
    fn test_folders_prefer_mdx_and_skip_empty() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("b-post")).unwrap();
        fs::write(root.join("b-post/index.md"), "md").unwrap();
        fs::write(root.join("b-post/index.mdx"), "mdx").unwrap();
        fs::create_dir_all(root.join("a-post")).unwrap();
        fs::write(root.join("a-post/index.md"), "md").unwrap();
        fs::create_dir_all(root.join("drafts")).unwrap();
        fs::write(root.join("drafts/notes.txt"), "x").unwrap();
        fs::write(root.join("stray.md"), "x").unwrap();

        let files = found(scan_content(&config(root, Layout::Folders)).unwrap());
        let names: Vec<&str> = files.iter().map(|f| f.unit_name.as_str()).collect();
        assert_eq!(names, vec!["a-post", "b-post"]);
        assert!(files[1].path.ends_with("b-post/index.mdx"));
        assert!(files[0].modified.is_some());
    }

    #[test]
    fn test_flat_walks_recursively_case_insensitive() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("guides/heat")).unwrap();
        fs::write(root.join("guides/heat/Boilers.TXT"), "x").unwrap();
        fs::write(root.join("Leases.txt"), "x").unwrap();
        fs::write(root.join("image.png"), "x").unwrap();

        let files = found(scan_content(&config(root, Layout::Flat)).unwrap());
        let mut names: Vec<&str> = files.iter().map(|f| f.unit_name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["Boilers", "Leases"]);
    }
}
