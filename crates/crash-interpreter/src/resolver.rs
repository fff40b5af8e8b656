//! Executable lookup by walking the directory trees named in `PATH`.
//!
//! Every regular file seen on the way is scored against the wanted name, so a
//! failed lookup still knows the closest name on the system. That is why the
//! walk is a full recursive descent rather than one `stat` per entry.

use crate::distance::closer;
use crash_parser::split_on;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Prefixes skipped unless configured otherwise. `/mnt/` keeps the walk out
/// of foreign filesystems mounted into `PATH` on dual-boot machines.
pub const DEFAULT_EXCLUDED_PREFIXES: &[&str] = &["/mnt/"];

/// Outcome of a lookup
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolution {
    /// Full path of the first exact match
    pub found: Option<PathBuf>,
    /// Best guess seen so far; empty after an exact match
    pub closest: String,
}

#[derive(Debug, Clone)]
pub struct Resolver {
    excluded_prefixes: Vec<String>,
}

impl Resolver {
    #[must_use]
    pub fn new(excluded_prefixes: Vec<String>) -> Self {
        Self { excluded_prefixes }
    }

    /// Whether a search root is skipped before traversal
    #[must_use]
    pub fn is_excluded(&self, root: &str) -> bool {
        self.excluded_prefixes
            .iter()
            .any(|prefix| root.starts_with(prefix.as_str()))
    }

    /// Look `target` up in a colon-separated search path
    #[must_use]
    pub fn resolve(&self, target: &str, search_path: &str) -> Resolution {
        self.resolve_roots(target, split_on(search_path, ':'))
    }

    /// Look `target` up under each root in order
    pub fn resolve_roots<I, S>(&self, target: &str, roots: I) -> Resolution
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut closest = String::new();

        for root in roots {
            let root = root.as_ref();
            if self.is_excluded(root) {
                trace!(root, "skipping excluded search root");
                continue;
            }

            if let Some(found) = walk(target, Path::new(root), &mut closest) {
                return Resolution {
                    found: Some(found),
                    closest,
                };
            }
        }

        Resolution {
            found: None,
            closest,
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(
            DEFAULT_EXCLUDED_PREFIXES
                .iter()
                .map(|prefix| (*prefix).to_string())
                .collect(),
        )
    }
}

/// Depth-first walk in the order the filesystem yields entries.
///
/// Symlinks are neither followed nor matched. Unreadable directories are
/// skipped without error.
fn walk(target: &str, dir: &Path, closest: &mut String) -> Option<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            trace!(dir = %dir.display(), %err, "cannot open directory");
            return None;
        }
    };

    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if let Some(found) = walk(target, &entry.path(), closest) {
                return Some(found);
            }
        } else if file_type.is_file() {
            let name = entry.file_name().to_string_lossy().into_owned();

            // The first file scanned always becomes a candidate
            if closest.is_empty() {
                closest.clone_from(&name);
            } else {
                let better = closer(target, closest.as_str(), &name).to_string();
                *closest = better;
            }

            if name == target {
                closest.clear();
                return Some(dir.join(name));
            }
        }
    }

    None
}
