//! Include path resolution.

use std::path::{Path, PathBuf};

/// Resolve the path named by an `include` line in file `including`.
///
/// Absolute paths are used as given. Relative paths are taken relative to
/// the including file's directory, or to the current directory when the
/// including file has none.
pub fn resolve_include(including: &Path, file: &str) -> PathBuf {
    let target = Path::new(file);
    if file.is_empty() || target.is_absolute() {
        return target.to_path_buf();
    }

    match including.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(target),
        _ => target.to_path_buf(),
    }
}
