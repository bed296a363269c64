//! Extraction parsers and their shared contract.
//!
//! Every parser implements [`Parser`], which declares what the parser can
//! extract from (a directory tree, a live installation, or both) and
//! provides the two validated entry points. Concrete parsers only
//! implement the extraction hooks; input validation, catalog creation and
//! capability checks live here.
//!
//! The set of available parsers is a static registry ([`all_parsers`]),
//! declared in code rather than discovered at runtime.

pub mod block_templates;
pub mod dynamic_item;
pub mod php;
pub mod source_scanner;

use std::{fs, path::Path};

use crate::{
    catalog::Catalog,
    error::{Error, Result},
    scan::ScanCache,
};

pub use dynamic_item::{DynamicItem, LiveInstance};

pub trait Parser {
    /// Display name, also used to select parsers from the CLI and config.
    fn name(&self) -> &'static str;

    /// Whether this parser can extract from a directory tree.
    fn supports_directory(&self) -> bool;

    /// Whether this parser can extract from a running installation.
    fn supports_live_instance(&self) -> bool;

    /// Extracts translatable strings from the tree under `root`.
    ///
    /// Validates that `root` is an existing, readable directory, creates a
    /// new catalog when none is supplied, and delegates to
    /// [`Parser::extract_directory`]. Every reference recorded by the
    /// parser is relative to `relative_path` (after separator
    /// normalization), so the same parser can be invoked once per nested
    /// scope while addressing all references from one logical root.
    fn extract_from_directory(
        &self,
        catalog: Option<Catalog>,
        root: &Path,
        relative_path: &str,
        cache: &mut ScanCache,
    ) -> Result<Catalog> {
        if !self.supports_directory() {
            return Err(Error::UnsupportedOperation {
                parser: self.name(),
                operation: "directory extraction",
            });
        }
        ensure_readable_dir(root)?;
        let relative_path = normalize_relative_path(relative_path);
        let mut catalog = catalog.unwrap_or_default();
        self.extract_directory(&mut catalog, root, &relative_path, cache)?;
        Ok(catalog)
    }

    /// Extracts translatable strings from a running installation.
    ///
    /// Requires that the instance can report a non-empty version string;
    /// fails with [`Error::Environment`] otherwise.
    fn extract_from_live_instance(
        &self,
        catalog: Option<Catalog>,
        instance: &dyn LiveInstance,
    ) -> Result<Catalog> {
        if !self.supports_live_instance() {
            return Err(Error::UnsupportedOperation {
                parser: self.name(),
                operation: "live-instance extraction",
            });
        }
        let version = instance
            .version()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                Error::Environment("unable to determine the running instance version".to_string())
            })?;
        let mut catalog = catalog.unwrap_or_default();
        self.extract_live(&mut catalog, &version, instance)?;
        Ok(catalog)
    }

    /// Directory extraction hook. Parsers with directory support override
    /// this; the default rejects the operation.
    fn extract_directory(
        &self,
        catalog: &mut Catalog,
        root: &Path,
        relative_path: &str,
        cache: &mut ScanCache,
    ) -> Result<()> {
        let _ = (catalog, root, relative_path, cache);
        Err(Error::UnsupportedOperation {
            parser: self.name(),
            operation: "directory extraction",
        })
    }

    /// Live-instance extraction hook. Parsers with live-instance support
    /// override this; the default rejects the operation.
    fn extract_live(
        &self,
        catalog: &mut Catalog,
        version: &str,
        instance: &dyn LiveInstance,
    ) -> Result<()> {
        let _ = (catalog, version, instance);
        Err(Error::UnsupportedOperation {
            parser: self.name(),
            operation: "live-instance extraction",
        })
    }
}

/// The statically declared parser registry, in execution order.
pub fn all_parsers() -> Vec<Box<dyn Parser>> {
    vec![
        Box::new(php::PhpParser::new()),
        Box::new(block_templates::BlockTemplatesParser::new()),
    ]
}

fn ensure_readable_dir(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|e| Error::directory_access(path, &e))?;
    if !metadata.is_dir() {
        return Err(Error::not_a_directory(path));
    }
    fs::read_dir(path).map_err(|e| Error::directory_access(path, &e))?;
    Ok(())
}

fn normalize_relative_path(relative_path: &str) -> String {
    relative_path
        .replace('\\', "/")
        .trim_matches('/')
        .to_string()
}
