//! Derives catalog entries from the block template directory convention.
//!
//! Custom block templates live at `blocks/<name>/templates/<handle>`,
//! either as a directory or as a `<handle>.php` file directly inside the
//! `templates` directory. The handle is a machine identifier; its
//! human-readable label (for example `sidebar_list` → `Sidebar List`) is
//! what translators see, so each distinct handle becomes one catalog
//! entry carrying every path it was found at.

use std::{fs, path::Path, sync::LazyLock};

use regex::Regex;

use super::{Parser, php::SOURCE_EXTENSION};
use crate::{
    catalog::Catalog,
    error::{Error, Result},
    scan::ScanCache,
    utils::humanize,
};

/// Context under which template names are cataloged.
pub const TEMPLATE_CONTEXT: &str = "TemplateFileName";

static TEMPLATE_HANDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|/)blocks/\w+/templates/(\w+)$").unwrap());
static TEMPLATES_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|/)blocks/\w+/templates$").unwrap());

pub struct BlockTemplatesParser {
    exclude_vendor: bool,
}

impl Default for BlockTemplatesParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockTemplatesParser {
    pub fn new() -> Self {
        Self {
            exclude_vendor: true,
        }
    }

    /// Scans `vendor` and `3rdparty` directories too.
    pub fn include_vendor_dirs(mut self) -> Self {
        self.exclude_vendor = false;
        self
    }
}

impl Parser for BlockTemplatesParser {
    fn name(&self) -> &'static str {
        "block-templates"
    }

    fn supports_directory(&self) -> bool {
        true
    }

    fn supports_live_instance(&self) -> bool {
        false
    }

    fn extract_directory(
        &self,
        catalog: &mut Catalog,
        root: &Path,
        relative_path: &str,
        cache: &mut ScanCache,
    ) -> Result<()> {
        let prefix = if relative_path.is_empty() {
            String::new()
        } else {
            format!("{relative_path}/")
        };
        let suffix = format!(".{SOURCE_EXTENSION}");

        // handle -> every path it was found at, in first-seen order
        let mut handles: Vec<(String, Vec<String>)> = Vec::new();
        for child in cache.structure(root, self.exclude_vendor)?.iter() {
            let shown = format!("{prefix}{child}");
            if let Some(captures) = TEMPLATE_HANDLE.captures(&shown) {
                record(&mut handles, &captures[1], shown.clone());
            } else if TEMPLATES_DIR.is_match(&shown) {
                let dir = root.join(child);
                let reader = fs::read_dir(&dir).map_err(|e| Error::directory_access(&dir, &e))?;
                for entry in reader {
                    let entry = entry.map_err(|e| Error::directory_access(&dir, &e))?;
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if name.starts_with('.') {
                        continue;
                    }
                    let Some(handle) = name.strip_suffix(&suffix) else {
                        continue;
                    };
                    if !entry.path().is_file() {
                        continue;
                    }
                    record(&mut handles, handle, format!("{shown}/{name}"));
                }
            }
        }

        for (handle, references) in handles {
            let entry = catalog.insert(Some(TEMPLATE_CONTEXT), &humanize(&handle));
            for reference in references {
                entry.add_reference(reference, None);
            }
        }
        Ok(())
    }
}

fn record(handles: &mut Vec<(String, Vec<String>)>, handle: &str, path: String) {
    match handles.iter_mut().find(|(h, _)| h == handle) {
        Some((_, paths)) => paths.push(path),
        None => handles.push((handle.to_string(), vec![path])),
    }
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    fn extract(root: &Path, relative_path: &str) -> Catalog {
        let mut cache = ScanCache::new();
        BlockTemplatesParser::new()
            .extract_from_directory(None, root, relative_path, &mut cache)
            .unwrap()
    }

    #[test]
    fn test_directory_and_file_templates() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("blocks/foo/templates/view")).unwrap();
        File::create(dir.path().join("blocks/foo/templates/edit.php")).unwrap();

        let catalog = extract(dir.path(), "");
        assert_eq!(catalog.len(), 2);

        let view = catalog.find(Some(TEMPLATE_CONTEXT), "View").unwrap();
        assert_eq!(view.references[0].path, "blocks/foo/templates/view");
        assert_eq!(view.references[0].line, None);

        let edit = catalog.find(Some(TEMPLATE_CONTEXT), "Edit").unwrap();
        assert_eq!(edit.references[0].path, "blocks/foo/templates/edit.php");

        // no entry for the bare templates directory itself
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_handles_are_humanized() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("blocks/page_list/templates/sidebar_list")).unwrap();

        let catalog = extract(dir.path(), "");
        assert!(catalog.find(Some(TEMPLATE_CONTEXT), "Sidebar List").is_some());
    }

    #[test]
    fn test_same_handle_in_two_blocks_shares_one_entry() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("blocks/foo/templates/fancy")).unwrap();
        fs::create_dir_all(dir.path().join("blocks/bar/templates/fancy")).unwrap();

        let catalog = extract(dir.path(), "");
        assert_eq!(catalog.len(), 1);
        let entry = catalog.find(Some(TEMPLATE_CONTEXT), "Fancy").unwrap();
        assert_eq!(entry.references.len(), 2);
    }

    #[test]
    fn test_relative_path_prefix_applies_to_matching_and_references() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("blocks/foo/templates/view")).unwrap();

        let catalog = extract(dir.path(), "packages/theme");
        let entry = catalog.find(Some(TEMPLATE_CONTEXT), "View").unwrap();
        assert_eq!(
            entry.references[0].path,
            "packages/theme/blocks/foo/templates/view"
        );
    }

    #[test]
    fn test_nested_paths_below_a_handle_are_not_handles() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("blocks/foo/templates/view/partials")).unwrap();

        let catalog = extract(dir.path(), "");
        assert_eq!(catalog.len(), 1);
        assert!(catalog.find(Some(TEMPLATE_CONTEXT), "View").is_some());
    }

    #[test]
    fn test_unrelated_directories_yield_nothing() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("controllers/templates/view")).unwrap();
        fs::create_dir_all(dir.path().join("blocks/foo/elements")).unwrap();

        let catalog = extract(dir.path(), "");
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_hidden_and_non_php_files_are_skipped() {
        let dir = tempdir().unwrap();
        let templates = dir.path().join("blocks/foo/templates");
        fs::create_dir_all(&templates).unwrap();
        File::create(templates.join(".hidden.php")).unwrap();
        File::create(templates.join("style.css")).unwrap();
        File::create(templates.join("grid.php")).unwrap();

        let catalog = extract(dir.path(), "");
        assert_eq!(catalog.len(), 1);
        assert!(catalog.find(Some(TEMPLATE_CONTEXT), "Grid").is_some());
    }
}
