//! Cached recursive directory scanner.
//!
//! [`ScanCache::structure`] enumerates every subdirectory beneath a root
//! as a flat, ordered list of relative paths. The listing is post-order: a
//! directory's own path appears after all of its descendants' paths, so a
//! consumer can process leaves before their parents. Sibling order is
//! whatever the filesystem yields and must not be relied on.
//!
//! Results are memoized per `(normalized root, exclusion flag)` for the
//! lifetime of the cache. Parsers that walk the same tree repeatedly
//! within one run share a single [`ScanCache`]; independent runs create a
//! fresh cache (or call [`ScanCache::clear`]) so stale listings never leak
//! between them.

use std::{collections::HashMap, fs, path::Path, rc::Rc};

use crate::error::{Error, Result};

/// Directory names skipped when vendor exclusion is enabled.
pub const VENDOR_DIR_NAMES: &[&str] = &["vendor", "3rdparty"];

#[derive(Debug, Default)]
pub struct ScanCache {
    structures: HashMap<(String, bool), Rc<Vec<String>>>,
}

impl ScanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every memoized listing.
    pub fn clear(&mut self) {
        self.structures.clear();
    }

    /// Returns the relative paths of all subdirectories beneath `root`,
    /// descendants before their parent.
    ///
    /// Entries whose name starts with `.` are always skipped; entries
    /// named `vendor` or `3rdparty` are skipped when `exclude_vendor` is
    /// set. Repeat calls with the same root and flag return the memoized
    /// listing without touching the filesystem.
    pub fn structure(&mut self, root: &Path, exclude_vendor: bool) -> Result<Rc<Vec<String>>> {
        let normalized = normalize_root(root)?;
        let key = (normalized.clone(), exclude_vendor);
        if let Some(cached) = self.structures.get(&key) {
            return Ok(Rc::clone(cached));
        }
        let mut listing = Vec::new();
        walk(Path::new(&normalized), "", exclude_vendor, &mut listing)?;
        let listing = Rc::new(listing);
        self.structures.insert(key, Rc::clone(&listing));
        Ok(listing)
    }
}

fn normalize_root(root: &Path) -> Result<String> {
    let canonical = fs::canonicalize(root).map_err(|e| Error::directory_access(root, &e))?;
    if !canonical.is_dir() {
        return Err(Error::not_a_directory(root));
    }
    let mut normalized = canonical.to_string_lossy().replace('\\', "/");
    while normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    Ok(normalized)
}

fn walk(root: &Path, relative: &str, exclude_vendor: bool, out: &mut Vec<String>) -> Result<()> {
    let dir = if relative.is_empty() {
        root.to_path_buf()
    } else {
        root.join(relative)
    };
    let reader = fs::read_dir(&dir).map_err(|e| Error::directory_access(&dir, &e))?;
    let mut subdirs = Vec::new();
    for entry in reader {
        let entry = entry.map_err(|e| Error::directory_access(&dir, &e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        if !entry.path().is_dir() {
            continue;
        }
        if exclude_vendor && VENDOR_DIR_NAMES.contains(&name.as_str()) {
            continue;
        }
        subdirs.push(name);
    }
    for subdir in subdirs {
        let rel = if relative.is_empty() {
            subdir
        } else {
            format!("{relative}/{subdir}")
        };
        walk(root, &rel, exclude_vendor, out)?;
        out.push(rel);
    }
    Ok(())
}
