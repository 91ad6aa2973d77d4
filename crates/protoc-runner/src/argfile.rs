//! Protoc argument files (`@file`).
//!
//! Long proto file lists can exceed the OS command-line limit. Protoc reads
//! one argument per line from a file named by a single `@<path>` argument.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::error::{InvocationError, InvocationResult};

/// Prefix of temporary argument files.
pub const ARGUMENT_FILE_PREFIX: &str = "protoc";

/// A written argument file. The file is removed when this value is dropped.
#[derive(Debug)]
pub struct ArgumentFile {
    path: TempPath,
}

impl ArgumentFile {
    /// Writes `args` one per line (UTF-8) into a new file in `temp_directory`,
    /// or the system temp directory when none is given.
    pub fn create(args: &[String], temp_directory: Option<&Path>) -> InvocationResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(ARGUMENT_FILE_PREFIX);
        let file = match temp_directory {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(InvocationError::ArgumentFile)?;

        let mut writer = BufWriter::new(file);
        for arg in args {
            writer
                .write_all(arg.as_bytes())
                .and_then(|_| writer.write_all(b"\n"))
                .map_err(InvocationError::ArgumentFile)?;
        }
        let file = writer
            .into_inner()
            .map_err(|e| InvocationError::ArgumentFile(e.into_error()))?;

        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    /// Returns the path of the argument file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the absolute path of the argument file.
    pub fn absolute_path(&self) -> PathBuf {
        std::path::absolute(&self.path).unwrap_or_else(|_| self.path.to_path_buf())
    }

    /// Returns the `@<absolute path>` argument referencing this file.
    pub fn reference(&self) -> String {
        format!("@{}", self.absolute_path().display())
    }
}
