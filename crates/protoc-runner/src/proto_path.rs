//! Proto path (import search root) bookkeeping.
//!
//! Roots are kept in insertion order with duplicates collapsed. Membership
//! of a proto file is decided by climbing from its parent directory towards
//! the filesystem root until a registered root matches.

use std::path::{Path, PathBuf};

use crate::error::{InvocationError, InvocationResult};

/// Upper bound on the number of ancestors visited for a single lookup.
pub const MAX_ANCESTOR_DEPTH: usize = 256;

/// An ordered set of proto search roots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtoPath {
    roots: Vec<PathBuf>,
}

impl ProtoPath {
    /// Creates an empty proto path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a search root. Returns false if it was already present.
    pub fn insert(&mut self, root: impl Into<PathBuf>) -> bool {
        let root = root.into();
        if self.roots.contains(&root) {
            return false;
        }
        self.roots.push(root);
        true
    }

    /// Returns true if `dir` is exactly one of the registered roots.
    pub fn contains(&self, dir: &Path) -> bool {
        self.roots.iter().any(|root| root == dir)
    }

    /// Returns the registered roots in insertion order.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Returns true if no roots are registered.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Returns the number of registered roots.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Checks whether `directory` equals a registered root or lies beneath one.
    ///
    /// Every visited path must be a directory; anything else is reported as a
    /// configuration error rather than a negative answer.
    pub fn covers(&self, directory: &Path) -> InvocationResult<bool> {
        let mut current = Some(directory);
        let mut depth = 0;

        while let Some(dir) = current {
            // `Path::parent` yields "" for a bare relative name.
            let dir = if dir.as_os_str().is_empty() {
                Path::new(".")
            } else {
                dir
            };
            if !dir.is_dir() {
                return Err(InvocationError::configuration(format!(
                    "Not a directory: {}",
                    absolute_display(dir)
                )));
            }
            if self.contains(dir) {
                return Ok(true);
            }

            depth += 1;
            if depth > MAX_ANCESTOR_DEPTH {
                return Err(InvocationError::configuration(format!(
                    "Directory nesting exceeds {} levels: {}",
                    MAX_ANCESTOR_DEPTH,
                    absolute_display(directory)
                )));
            }
            // "." has parent "", which would map back to "." forever.
            current = if dir == Path::new(".") {
                None
            } else {
                dir.parent()
            };
        }

        Ok(false)
    }

    /// Fails unless `proto_file` is a regular file reachable from a root.
    pub fn check_proto_file(&self, proto_file: &Path) -> InvocationResult<()> {
        if !proto_file.is_file() {
            return Err(InvocationError::configuration(format!(
                "Not a regular file: {}",
                absolute_display(proto_file)
            )));
        }
        let parent = proto_file.parent().unwrap_or_else(|| Path::new("."));
        if !self.covers(parent)? {
            return Err(InvocationError::configuration(format!(
                "File is not in proto path: {}",
                absolute_display(proto_file)
            )));
        }
        Ok(())
    }
}

/// Renders a path as absolute for error messages, falling back to the input.
pub(crate) fn absolute_display(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
