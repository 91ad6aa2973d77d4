//! Protoc Runner CLI library.
//!
//! Command implementations for the `protoc-runner` binary: printing the
//! assembled protoc command line, running protoc from a configuration file,
//! and checking the local protoc installation.

pub mod commands;
