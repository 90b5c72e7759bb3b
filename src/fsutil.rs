//! Filesystem-primitive helpers. Spec names these as external
//! collaborators, specified only at their interface; this module gives
//! them a concrete, idempotent implementation.

use crate::error::{SandboxError, SandboxResult};
use std::fs;
use std::path::Path;

/// Filesystem existence, following symlinks like `stat(2)` does.
pub fn path_exists(path: &Path) -> bool {
    path.exists()
}

/// True iff `path`'s parent directory exists. A path with no parent
/// component (e.g. `/`) is treated as always having an existing parent.
pub fn exists_parent_dir(path: &Path) -> bool {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.is_dir(),
        _ => true,
    }
}

/// Byte-copies `src` to `dst`, preserving the source's mode bits.
/// Idempotent: re-copying onto an existing `dst` truncates and rewrites
/// it rather than erroring.
pub fn copyfile(src: &Path, dst: &Path) -> SandboxResult<()> {
    let metadata = fs::metadata(src).map_err(|source| SandboxError::Copy {
        src: src.to_owned(),
        dst: dst.to_owned(),
        source,
    })?;

    fs::copy(src, dst).map_err(|source| SandboxError::Copy {
        src: src.to_owned(),
        dst: dst.to_owned(),
        source,
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(dst)
            .map_err(|source| SandboxError::Copy {
                src: src.to_owned(),
                dst: dst.to_owned(),
                source,
            })?
            .permissions();
        perms.set_mode(metadata.permissions().mode());
        fs::set_permissions(dst, perms).map_err(|source| SandboxError::Copy {
            src: src.to_owned(),
            dst: dst.to_owned(),
            source,
        })?;
    }

    Ok(())
}

/// Resolves `.`/`..` components and collapses duplicate slashes in an
/// absolute path, purely lexically (no filesystem access, so it does not
/// follow symlinks). `path` is assumed to start with `/`.
pub fn normalize_path(path: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => continue,
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }

    if stack.is_empty() {
        "/".to_owned()
    } else {
        let mut out = String::with_capacity(path.len());
        for component in stack {
            out.push('/');
            out.push_str(component);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn normalize_collapses_dots_and_slashes() {
        assert_eq!(normalize_path("/a/./b//c/../d"), "/a/b/d");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/.."), "/");
        assert_eq!(normalize_path("/a/.."), "/");
    }

    #[test]
    fn copyfile_preserves_bytes_and_is_idempotent() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        fs::File::create(&src).unwrap().write_all(b"hello").unwrap();

        copyfile(&src, &dst).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"hello");

        fs::File::create(&src).unwrap().write_all(b"goodbye!!").unwrap();
        copyfile(&src, &dst).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"goodbye!!");
    }

    #[test]
    fn exists_parent_dir_checks_parent() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file");
        assert!(exists_parent_dir(&file));
        assert!(!exists_parent_dir(&dir.path().join("missing").join("file")));
    }
}
