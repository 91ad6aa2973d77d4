//! Native plugin parameter normalization.
//!
//! Protoc splits `--<id>_out=<parameter>:<dir>` at the first `:`, so a
//! parameter must not contain one. On Windows an option value holding an
//! absolute drive path (`C:\out`) is rewritten to the equivalent loopback
//! UNC path (`\\localhost\C$\out`) when both forms exist on disk.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{InvocationError, InvocationResult};

/// Separator between the parameter block and the output directory.
pub const PARAMETER_SEPARATOR: char = ':';

/// Operating system family, as far as parameter handling is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Windows family (drive letters, UNC paths).
    Windows,
    /// Everything else.
    Other,
}

impl Platform {
    /// Returns the platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Other
        }
    }
}

/// Regex pattern for an absolute single-drive path such as `C:\out` or `C:/out`.
const ABSOLUTE_WIN_PATH_PATTERN: &str = r"^([a-zA-Z]):[\\/].*$";

static ABSOLUTE_WIN_PATH_REGEX: OnceLock<Regex> = OnceLock::new();

fn absolute_win_path_regex() -> &'static Regex {
    ABSOLUTE_WIN_PATH_REGEX
        .get_or_init(|| Regex::new(ABSOLUTE_WIN_PATH_PATTERN).expect("invalid regex pattern"))
}

/// Normalizes a native plugin parameter for the current platform.
pub fn normalize_plugin_parameter(parameter: &str) -> InvocationResult<String> {
    normalize_plugin_parameter_with(parameter, Platform::current(), |p| p.exists())
}

/// Normalizes a native plugin parameter.
///
/// `exists` is consulted for the drive root and its UNC equivalent before a
/// rewrite. Any `:` remaining afterwards is a configuration error.
pub fn normalize_plugin_parameter_with<F>(
    parameter: &str,
    platform: Platform,
    exists: F,
) -> InvocationResult<String>
where
    F: Fn(&Path) -> bool,
{
    if !parameter.contains(PARAMETER_SEPARATOR) {
        return Ok(parameter.to_string());
    }

    let normalized = match platform {
        Platform::Windows => convert_absolute_win_paths_to_unc(parameter, &exists),
        Platform::Other => parameter.to_string(),
    };

    if normalized.contains(PARAMETER_SEPARATOR) {
        return Err(InvocationError::configuration(
            "'native_plugin_parameter' contains illegal characters",
        ));
    }
    Ok(normalized)
}

fn convert_absolute_win_paths_to_unc<F>(parameter: &str, exists: &F) -> String
where
    F: Fn(&Path) -> bool,
{
    parameter
        .split(',')
        .map(|option| match option.split_once('=') {
            Some((key, value)) if value.contains(PARAMETER_SEPARATOR) => {
                match rewrite_drive_prefix(value, exists) {
                    Some(value) => format!("{key}={value}"),
                    None => option.to_string(),
                }
            }
            _ => option.to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Rewrites the drive prefix at the start of `value` to its UNC form.
///
/// Only the leading `C:` is replaced. A value naming the drive again later
/// (`C:\a;C:\b`) keeps its second `:` and is rejected by the caller, where a
/// replace-all rewrite would have accepted it.
fn rewrite_drive_prefix<F>(value: &str, exists: &F) -> Option<String>
where
    F: Fn(&Path) -> bool,
{
    let captures = absolute_win_path_regex().captures(value)?;
    let drive = captures.get(1)?.as_str();
    let path_prefix = format!("{drive}:");
    let unc_prefix = format!(r"\\localhost\{drive}$");

    let drive_root = format!(r"{path_prefix}\");
    let unc_root = format!(r"{unc_prefix}\");
    if !exists(Path::new(&drive_root)) || !exists(Path::new(&unc_root)) {
        return None;
    }

    Some(format!("{unc_prefix}{}", &value[path_prefix.len()..]))
}
