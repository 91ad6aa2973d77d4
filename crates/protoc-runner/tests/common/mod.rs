//! Shared fixtures for protoc-runner integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A scratch project with a proto root and an output directory.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let project = Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        };
        fs::create_dir_all(project.proto_root()).unwrap();
        fs::create_dir_all(project.out()).unwrap();
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn proto_root(&self) -> PathBuf {
        self.path().join("src").join("proto")
    }

    pub fn out(&self) -> PathBuf {
        self.path().join("out")
    }

    /// Creates a directory under the project and returns its path.
    pub fn dir(&self, relative: &str) -> PathBuf {
        let dir = self.path().join(relative);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Writes a minimal proto file under the project and returns its path.
    pub fn proto(&self, relative: &str) -> PathBuf {
        let file = self.path().join(relative);
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, "syntax = \"proto3\";\n").unwrap();
        file
    }

    /// Writes an executable shell script and returns its path.
    #[cfg(unix)]
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}
