//! Path and glob pattern guards
//!
//! Everything a caller hands us as a *relative* name (glob patterns, entity
//! ids, attachment paths) passes through here before it reaches the
//! filesystem, so that it cannot escape the directory it is applied to.

use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};

use crate::{Error, Result};

/// Reject glob patterns that could reach outside the listed directory.
///
/// Fails on `..` anywhere in the pattern, on a leading `/` or `\`, and on a
/// drive-letter prefix such as `C:`. The empty pattern passes; see
/// [`compile_pattern`] for what happens when it is used.
pub fn validate_pattern(pattern: &str) -> Result<()> {
    let reason = if pattern.contains("..") {
        Some("pattern must not contain '..'")
    } else if pattern.starts_with('/') || pattern.starts_with('\\') {
        Some("pattern must be relative")
    } else if has_drive_prefix(pattern) {
        Some("pattern must not start with a drive letter")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// Validate and compile a pattern for matching directory entry names.
///
/// `*` never crosses a path separator. An empty pattern is refused here
/// rather than silently matching nothing.
pub fn compile_pattern(pattern: &str) -> Result<GlobMatcher> {
    validate_pattern(pattern)?;

    if pattern.is_empty() {
        return Err(Error::InvalidPattern {
            pattern: String::new(),
            reason: "pattern must not be empty".to_string(),
        });
    }

    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.kind().to_string(),
        })?;

    Ok(glob.compile_matcher())
}

fn has_drive_prefix(pattern: &str) -> bool {
    let bytes = pattern.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Check that `name` can be used as a single file name inside a directory.
///
/// Returns the reason on failure so callers can wrap it in their own error.
pub fn validate_path_component(name: &str) -> std::result::Result<(), &'static str> {
    if name.is_empty() {
        return Err("must not be empty");
    }
    if name == "." || name == ".." {
        return Err("must not be a relative directory reference");
    }
    if name.contains(['/', '\\']) {
        return Err("must not contain path separators");
    }
    if name.contains('\0') {
        return Err("must not contain NUL bytes");
    }
    if has_drive_prefix(name) {
        return Err("must not start with a drive letter");
    }
    Ok(())
}

/// Resolve `candidate` against `root` and return it only if it stays inside.
///
/// Relative candidates are joined onto `root`. Existing paths are
/// canonicalized so symlinks cannot be used to escape; paths that do not exist
/// yet are normalized lexically.
pub fn resolve_within(root: &Path, candidate: &Path) -> Option<PathBuf> {
    let root = canonical_or_normalized(root);
    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    };
    let resolved = canonical_or_normalized(&joined);

    resolved.starts_with(&root).then_some(resolved)
}

fn canonical_or_normalized(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| normalize_lexically(path))
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
