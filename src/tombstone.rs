use std::collections::HashSet;

/// In-memory record of host paths the tracee has logically deleted. The
/// host copy is left untouched; the tombstone is what makes subsequent
/// `stat`/`open`/`readdir` of that path look like `ENOENT` to the tracee.
///
/// Lifetime: created empty alongside the `SandboxContext`, freed when the
/// context is dropped at the end of the traced process's life. No entry is
/// ever removed except by `delete_subtree` collapsing older entries into
/// the new prefix tombstone.
#[derive(Default, Debug)]
pub struct TombstoneMap {
    deleted: HashSet<String>,
}

impl TombstoneMap {
    pub fn new() -> TombstoneMap {
        TombstoneMap::default()
    }

    pub fn insert(&mut self, path: &str) {
        self.deleted.insert(path.to_owned());
    }

    pub fn is_deleted(&self, path: &str) -> bool {
        self.deleted.contains(path)
    }

    /// Removes every tombstone whose key begins with `prefix`, then
    /// inserts `prefix` itself. Used when an entire directory is removed:
    /// any file previously tombstoned underneath it collapses into the
    /// single tombstone for the directory.
    pub fn delete_subtree(&mut self, prefix: &str) {
        self.deleted.retain(|key| !key.starts_with(prefix));
        self.deleted.insert(prefix.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_is_deleted() {
        let mut t = TombstoneMap::new();
        assert!(!t.is_deleted("/etc/motd"));
        t.insert("/etc/motd");
        assert!(t.is_deleted("/etc/motd"));
    }

    #[test]
    fn delete_subtree_collapses_prior_entries() {
        let mut t = TombstoneMap::new();
        t.insert("/tmp/dir/a");
        t.insert("/tmp/dir/b");
        t.insert("/tmp/other");
        t.delete_subtree("/tmp/dir");

        assert!(t.is_deleted("/tmp/dir"));
        assert!(!t.is_deleted("/tmp/dir/a"));
        assert!(!t.is_deleted("/tmp/dir/b"));
        assert!(t.is_deleted("/tmp/other"));
    }

    #[test]
    fn delete_subtree_is_idempotent() {
        let mut t = TombstoneMap::new();
        t.delete_subtree("/tmp/dir");
        t.delete_subtree("/tmp/dir");
        assert!(t.is_deleted("/tmp/dir"));
    }
}
