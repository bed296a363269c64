//! Extracts translatable strings from PHP files (`t()`, `tc()` and `t2()`
//! calls).
//!
//! Extraction prefers the external `xgettext` tool when it is installed
//! and falls back to the built-in scanner otherwise. The two strategies
//! agree on context, singular and plural texts; exact line numbers and
//! comment capture are best effort and may differ slightly between them.
//! The choice is made on availability only: once `xgettext` has been
//! selected, its failures are fatal and are not retried with the
//! fallback.

use std::{
    ffi::OsString,
    fs,
    io::Write,
    path::Path,
    process::Command,
};

use super::{
    Parser,
    source_scanner::{self, MarkerShape, MarkerSpec, default_markers},
};
use crate::{
    catalog::{Catalog, pot},
    error::{Error, Result},
    scan::ScanCache,
};

/// File extension of the sources this parser reads.
pub const SOURCE_EXTENSION: &str = "php";

pub struct PhpParser {
    markers: Vec<MarkerSpec>,
    exclude_vendor: bool,
    builtin_only: bool,
}

impl Default for PhpParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PhpParser {
    pub fn new() -> Self {
        Self {
            markers: default_markers(),
            exclude_vendor: true,
            builtin_only: false,
        }
    }

    /// Replaces the default `t`/`t2`/`tc` marker table.
    pub fn with_markers(mut self, markers: Vec<MarkerSpec>) -> Self {
        self.markers = markers;
        self
    }

    /// Scans `vendor` and `3rdparty` directories too.
    pub fn include_vendor_dirs(mut self) -> Self {
        self.exclude_vendor = false;
        self
    }

    /// Always uses the built-in scanner, even when `xgettext` is
    /// installed.
    pub fn builtin_only(mut self) -> Self {
        self.builtin_only = true;
        self
    }

    /// Collects every non-hidden `.php` file beneath `root` (the root
    /// itself included), as paths relative to `root`.
    fn collect_source_files(&self, root: &Path, cache: &mut ScanCache) -> Result<Vec<String>> {
        let structure = cache.structure(root, self.exclude_vendor)?;
        let suffix = format!(".{SOURCE_EXTENSION}");
        let mut files = Vec::new();
        for child in std::iter::once("").chain(structure.iter().map(String::as_str)) {
            let dir = if child.is_empty() {
                root.to_path_buf()
            } else {
                root.join(child)
            };
            let reader = fs::read_dir(&dir).map_err(|e| Error::directory_access(&dir, &e))?;
            for entry in reader {
                let entry = entry.map_err(|e| Error::directory_access(&dir, &e))?;
                let name = entry.file_name().to_string_lossy().into_owned();
                if name.starts_with('.') || !name.ends_with(&suffix) {
                    continue;
                }
                if !entry.path().is_file() {
                    continue;
                }
                files.push(if child.is_empty() {
                    name
                } else {
                    format!("{child}/{name}")
                });
            }
        }
        Ok(files)
    }

    fn extract_with_xgettext(&self, root: &Path, files: &[String]) -> Result<Catalog> {
        let mut list_file = tempfile::Builder::new()
            .prefix("potx-files-")
            .tempfile()
            .map_err(Error::TemporaryResource)?;
        list_file
            .write_all(files.join("\n").as_bytes())
            .map_err(Error::TemporaryResource)?;
        list_file.flush().map_err(Error::TemporaryResource)?;
        let pot_file = tempfile::Builder::new()
            .prefix("potx-out-")
            .suffix(".pot")
            .tempfile()
            .map_err(Error::TemporaryResource)?;

        let output = Command::new("xgettext")
            .current_dir(root)
            .args(xgettext_args(
                &self.markers,
                list_file.path(),
                pot_file.path(),
            ))
            .output()
            .map_err(|e| Error::ExtractionTool {
                output: format!("unable to run xgettext: {e}"),
            })?;
        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(Error::ExtractionTool {
                output: format!("{}: {}", output.status, combined.trim()),
            });
        }

        let text = fs::read_to_string(pot_file.path()).map_err(|e| Error::ExtractionTool {
            output: format!("unreadable xgettext output: {e}"),
        })?;
        pot::parse(&text).map_err(|e| Error::ExtractionTool {
            output: format!("unparsable xgettext output: {e}"),
        })
        // both temp files are removed on drop, on success and on every
        // error path above
    }

    fn extract_builtin(&self, root: &Path, files: &[String]) -> Result<Catalog> {
        let mut catalog = Catalog::new();
        for file in files {
            let full = root.join(file);
            let bytes = fs::read(&full).map_err(|e| Error::directory_access(&full, &e))?;
            let source = String::from_utf8_lossy(&bytes);
            for hit in source_scanner::scan_source(&source, &self.markers) {
                let entry = catalog.insert(hit.context.as_deref(), &hit.singular);
                if entry.plural.is_none() {
                    entry.plural = hit.plural;
                }
                entry.add_reference(file.clone(), Some(hit.line));
                if let Some(comment) = hit.comment
                    && !entry.comments.contains(&comment)
                {
                    entry.comments.push(comment);
                }
            }
        }
        Ok(catalog)
    }
}

impl Parser for PhpParser {
    fn name(&self) -> &'static str {
        "php"
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
        let files = self.collect_source_files(root, cache)?;
        if files.is_empty() {
            return Ok(());
        }
        let mut extracted = if !self.builtin_only && xgettext_available() {
            self.extract_with_xgettext(root, &files)?
        } else {
            self.extract_builtin(root, &files)?
        };
        if extracted.is_empty() {
            return Ok(());
        }
        extracted.prefix_references(relative_path);
        catalog.merge_from(extracted);
        Ok(())
    }
}

/// Whether the external extraction tool is on the PATH.
pub fn xgettext_available() -> bool {
    which::which("xgettext").is_ok()
}

/// Builds the xgettext command line: fixed domain, temp-file output,
/// PHP/UTF-8 input, `i18n:`-prefixed comment capture, only the configured
/// markers (defaults disabled), no C escaping, `file:line` locations, and
/// the input list read from `list_file`.
fn xgettext_args(markers: &[MarkerSpec], list_file: &Path, pot_file: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["--default-domain=messages".into()];

    let mut output = OsString::from("--output=");
    output.push(pot_file.file_name().unwrap_or_default());
    args.push(output);
    let mut output_dir = OsString::from("--output-dir=");
    output_dir.push(pot_file.parent().unwrap_or_else(|| Path::new(".")));
    args.push(output_dir);

    args.push("--language=PHP".into());
    args.push("--from-code=UTF-8".into());
    args.push("--add-comments=i18n".into());
    args.push("--keyword".into());
    for marker in markers {
        let spec = match marker.shape {
            MarkerShape::Singular => format!("--keyword={}:1", marker.name),
            MarkerShape::SingularPlural => format!("--keyword={}:1,2", marker.name),
            MarkerShape::ContextSingular => format!("--keyword={}:1c,2", marker.name),
        };
        args.push(spec.into());
    }
    args.push("--no-escape".into());
    args.push("--add-location".into());

    let mut files_from = OsString::from("--files-from=");
    files_from.push(list_file);
    args.push(files_from);

    args
}
