//! Overlay Materializer: on-demand creation of parent directories in the
//! overlay mirroring host modes, and the copy-on-write of host file
//! content into the overlay on first write.

use crate::config::Config;
use crate::error::{SandboxError, SandboxResult};
use crate::fsutil::copyfile as fsutil_copyfile;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Ensures every directory component of `spn`'s parent exists in the
/// overlay, creating each one with the mode of its host counterpart.
/// Does nothing if the overlay parent already exists, or if the host
/// parent doesn't exist either (the write would fail on the host too).
/// Stops before the final component: the file itself is never created
/// here, only its ancestor directories.
pub fn sync_parent_dirs(hpn: &str, spn: &Path, cfg: &Config) -> SandboxResult<()> {
    let spn_parent = match spn.parent() {
        Some(p) => p,
        None => return Ok(()),
    };
    if spn_parent.is_dir() {
        return Ok(());
    }

    let hpn_parent = match Path::new(hpn).parent() {
        Some(p) => p,
        None => return Ok(()),
    };
    if !hpn_parent.is_dir() {
        return Ok(());
    }

    let mut cur_hpn = PathBuf::from("/");
    let mut cur_spn = cfg.root().to_path_buf();

    for component in hpn_parent.components() {
        use std::path::Component;
        if let Component::Normal(part) = component {
            cur_hpn.push(part);
            cur_spn.push(part);

            if cur_spn.is_dir() {
                continue;
            }

            let mode = fs::metadata(&cur_hpn)
                .map(|m| m.permissions().mode())
                .map_err(|source| SandboxError::Mkdir {
                    path: cur_hpn.clone(),
                    source,
                })?;

            fs::create_dir(&cur_spn).map_err(|source| SandboxError::Mkdir {
                path: cur_spn.clone(),
                source,
            })?;
            fs::set_permissions(&cur_spn, fs::Permissions::from_mode(mode)).map_err(|source| {
                SandboxError::Mkdir {
                    path: cur_spn.clone(),
                    source,
                }
            })?;
        }
    }

    Ok(())
}

/// Copies `hpn`'s host bytes into `spn`, preserving mode. Idempotent.
pub fn copyfile(hpn: &str, spn: &Path) -> SandboxResult<()> {
    fsutil_copyfile(Path::new(hpn), spn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sync_parent_dirs_creates_missing_overlay_ancestors() {
        let host = tempdir().unwrap();
        let root = tempdir().unwrap();
        let cfg = Config::new(root.path().to_path_buf(), false);

        let host_dir = host.path().join("a").join("b");
        fs::create_dir_all(&host_dir).unwrap();

        let hpn = host_dir.join("file.txt");
        let hpn_str = hpn.to_str().unwrap();
        let spn = cfg.spn_of(hpn_str);

        sync_parent_dirs(hpn_str, &spn, &cfg).unwrap();

        assert!(spn.parent().unwrap().is_dir());
    }

    #[test]
    fn sync_parent_dirs_noop_when_host_parent_missing() {
        let root = tempdir().unwrap();
        let cfg = Config::new(root.path().to_path_buf(), false);

        let hpn = "/definitely/does/not/exist/file.txt";
        let spn = cfg.spn_of(hpn);

        sync_parent_dirs(hpn, &spn, &cfg).unwrap();
        assert!(!spn.parent().unwrap().exists());
    }
}
