use std::path::{Path, PathBuf};

/// Process-wide sandbox configuration, built once from the CLI and handed
/// to every handler for the lifetime of the traced child.
///
/// `root` is always an absolute, normalized path. `root_len` is cached
/// because the hot path (`spn_of`, `getcwd` sanitization) needs the byte
/// length of `root` on every call.
#[derive(Clone, Debug)]
pub struct Config {
    root: PathBuf,
    root_len: usize,
    pub interactive: bool,
}

impl Config {
    pub fn new(root: PathBuf, interactive: bool) -> Config {
        let root_str = root.to_string_lossy().into_owned();
        Config {
            root_len: root_str.len(),
            root,
            interactive,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn root_len(&self) -> usize {
        self.root_len
    }

    /// `ROOT ++ hpn`. `hpn` must be an absolute host path.
    pub fn spn_of(&self, hpn: &str) -> PathBuf {
        let mut spn = self.root.clone().into_os_string();
        spn.push(hpn);
        PathBuf::from(spn)
    }

    /// True iff `path` begins with `ROOT`, i.e. it already lives in the
    /// overlay rather than being a host path.
    pub fn is_in_sboxfs(&self, path: &str) -> bool {
        path.as_bytes().starts_with(self.root.to_string_lossy().as_bytes())
    }

    /// Strip the `ROOT` prefix from a path known to be inside the overlay.
    pub fn strip_root<'a>(&self, path: &'a str) -> &'a str {
        &path[self.root_len..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spn_of_concatenates_root_and_hpn() {
        let cfg = Config::new(PathBuf::from("/sbx"), false);
        assert_eq!(cfg.spn_of("/etc/hosts"), PathBuf::from("/sbx/etc/hosts"));
    }

    #[test]
    fn is_in_sboxfs_checks_prefix() {
        let cfg = Config::new(PathBuf::from("/sbx"), false);
        assert!(cfg.is_in_sboxfs("/sbx/etc/hosts"));
        assert!(!cfg.is_in_sboxfs("/etc/hosts"));
    }

    #[test]
    fn strip_root_removes_prefix() {
        let cfg = Config::new(PathBuf::from("/sbx"), false);
        assert_eq!(cfg.strip_root("/sbx/home"), "/home");
    }
}
