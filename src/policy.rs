/// Governs whether `rewrite_path` rewrites a syscall's path argument, and
/// whether it copies the host file's content into the overlay first.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum AccessPolicy {
    /// Consult the overlay only if it already exists, or the path is
    /// tombstoned. Used for syscalls that merely read or stat a path.
    Read,
    /// If rewriting, copy the host file's content into the overlay first.
    /// Used for syscalls that mutate an existing file's bytes or
    /// attributes.
    Write,
    /// Rewrite unconditionally, never copy. Used for syscalls that create
    /// or remove the path themselves, so there is nothing to preserve.
    Force,
}
