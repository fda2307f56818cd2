//! Auxiliary files of imported blocks
//!
//! A block's code may include HDL headers or memory images stored next to
//! the block file. Importing the block copies them into the project
//! directory first, one file at a time and in the order they are referenced.

use ice_doc::DependencyId;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use crate::collab::Storage;
use crate::decision::{Decision, Prompt};
use crate::error::ResourceCopyError;

/// `// @include file.v` and `// @include file.vh`
static INCLUDE_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"//\s*@include\s+([^\s]+\.vh?)\b").expect("invalid include directive regex")
});

/// `"file.list"` memory images
static LIST_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"\s]+\.list)""#).expect("invalid list file regex"));

/// Files referenced by generated code, first occurrence first
#[must_use]
pub fn find_included_files(code: &str) -> Vec<String> {
    let mut files: Vec<String> = Vec::new();
    for pattern in [&*INCLUDE_DIRECTIVE, &*LIST_FILE] {
        for captures in pattern.captures_iter(code) {
            let file = &captures[1];
            if !files.iter().any(|f| f == file) {
                files.push(file.to_string());
            }
        }
    }
    files
}

/// Result of [`ProjectStore::import_block`](crate::ProjectStore::import_block)
#[derive(Debug)]
pub enum ImportOutcome {
    /// Block inserted into the dependency map and placed in the editor
    Imported {
        /// Address of the imported block
        id: DependencyId,
        /// Files copied into the project directory
        copied: Vec<String>,
        /// Files left alone at the user's request
        skipped: Vec<String>,
        /// Files that could not be copied
        failures: Vec<ResourceCopyError>,
    },
    /// The block includes files but the project has not been saved yet
    NeedsProjectPath {
        /// Files that would have been copied
        files: Vec<String>,
    },
    /// The user cancelled at an overwrite prompt; nothing was inserted
    Cancelled,
}

impl ImportOutcome {
    /// Address of the imported block, if it was inserted
    #[must_use]
    pub fn id(&self) -> Option<&DependencyId> {
        match self {
            Self::Imported { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// Per-file results of [`copy_included_files`]
#[derive(Debug, Default)]
pub struct CopyReport {
    pub copied: Vec<String>,
    pub skipped: Vec<String>,
    pub failures: Vec<ResourceCopyError>,
}

/// Copy `files` from `source_dir` into `target_dir`, in order
///
/// Files that would overwrite an existing one are only copied when `decide`
/// answers [`Decision::Proceed`] to [`Prompt::OverwriteFile`]. Returns `None`
/// when the user cancels; files copied before that stay in place.
pub fn copy_included_files<S, F>(
    storage: &S,
    files: &[String],
    source_dir: &Path,
    target_dir: &Path,
    mut decide: F,
) -> Option<CopyReport>
where
    S: Storage + ?Sized,
    F: FnMut(&Prompt) -> Decision,
{
    let mut report = CopyReport::default();
    for file in files {
        let from = source_dir.join(file);
        let to = target_dir.join(file);
        if from == to {
            continue;
        }

        if storage.exists(&to) {
            let prompt = Prompt::OverwriteFile { file: file.clone() };
            match decide(&prompt) {
                Decision::Proceed => {}
                Decision::Skip => {
                    report.skipped.push(file.clone());
                    continue;
                }
                Decision::Cancel => {
                    tracing::info!(file = %file, "block import cancelled");
                    return None;
                }
            }
        }

        match storage.copy(&from, &to) {
            Ok(()) => report.copied.push(file.clone()),
            Err(reason) => {
                tracing::warn!(file = %file, source = %from.display(), %reason, "included file not copied");
                report.failures.push(ResourceCopyError {
                    file: file.clone(),
                    source_path: from,
                    reason,
                });
            }
        }
    }
    Some(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_includes_and_lists_once() {
        let code = r#"
            // @include ram.v
            //@include defs.vh
            initial $readmemh("rom.list", mem);
            // @include ram.v
            initial $readmemb("rom.list", other);
            // @include notes.txt
        "#;
        assert_eq!(find_included_files(code), ["ram.v", "defs.vh", "rom.list"]);
    }

    #[test]
    fn plain_code_has_no_includes() {
        assert!(find_included_files("assign o = a & b;").is_empty());
    }
}
