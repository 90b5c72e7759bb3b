//! The long tail of single-path syscalls that all reduce to
//! `rewrite_path` under a fixed access policy: attribute/timestamp
//! mutators, extended attributes, `truncate`, `mknod`, `execve`, and the
//! `-at` variants that take an extra directory-fd argument.
//!
//! Each handler here is entry-only, mirroring the source's
//! `DEF_SBOX_SC_PATH`/`DEF_SBOX_SC_PATH_AT` macro family: a handful of
//! fields (fd slot, path slot, policy) is all that varies.

use crate::context::SandboxContext;
use crate::error::SandboxResult;
use crate::policy::AccessPolicy;
use crate::tracee::TraceeContext;

use super::path::rewrite_path;

/// Generates an entry-only handler for a syscall whose only path
/// argument is resolved relative to `AT_FDCWD`.
macro_rules! path_handler {
    ($name:ident, $arg:expr, $policy:expr) => {
        pub fn $name(tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
            rewrite_path(tcp, libc::AT_FDCWD as i64, $arg, $policy, ctx)
        }
    };
}

/// Generates an entry-only handler for an `-at` syscall: argument
/// `$fd_arg` carries the directory fd, `$path_arg` the path.
macro_rules! path_handler_at {
    ($name:ident, $fd_arg:expr, $path_arg:expr, $policy:expr) => {
        pub fn $name(tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
            let fd = tcp.u_arg[$fd_arg] as i64;
            rewrite_path(tcp, fd, $path_arg, $policy, ctx)
        }
    };
}

path_handler_at!(handle_utimensat_enter, 0, 1, AccessPolicy::Write);
path_handler_at!(handle_fchmodat_enter, 0, 1, AccessPolicy::Write);
path_handler_at!(handle_mknodat_enter, 0, 1, AccessPolicy::Write);
path_handler_at!(handle_futimesat_enter, 0, 1, AccessPolicy::Write);
path_handler_at!(handle_fchownat_enter, 0, 1, AccessPolicy::Write);

path_handler!(handle_setxattr_enter, 0, AccessPolicy::Write);
path_handler!(handle_lsetxattr_enter, 0, AccessPolicy::Write);
path_handler!(handle_removexattr_enter, 0, AccessPolicy::Write);
path_handler!(handle_lremovexattr_enter, 0, AccessPolicy::Write);
path_handler!(handle_getxattr_enter, 0, AccessPolicy::Read);
path_handler!(handle_lgetxattr_enter, 0, AccessPolicy::Read);
path_handler!(handle_listxattr_enter, 0, AccessPolicy::Read);
path_handler!(handle_llistxattr_enter, 0, AccessPolicy::Read);
path_handler!(handle_statfs_enter, 0, AccessPolicy::Read);
path_handler!(handle_uselib_enter, 0, AccessPolicy::Read);
path_handler!(handle_utimes_enter, 0, AccessPolicy::Write);
// No dispatch entry for a raw `utime` syscall: x86_64 has none, glibc's
// `utime()` is implemented on top of `utimensat` on this architecture.
path_handler!(handle_chmod_enter, 0, AccessPolicy::Write);
path_handler!(handle_chown_enter, 0, AccessPolicy::Write);
path_handler!(handle_lchown_enter, 0, AccessPolicy::Write);
path_handler!(handle_execve_enter, 0, AccessPolicy::Read);
path_handler!(handle_truncate_enter, 0, AccessPolicy::Force);
path_handler!(handle_mknod_enter, 0, AccessPolicy::Write);

/// `acct(NULL)` disables accounting and takes no path; anything else
/// names a path to redirect into the overlay.
pub fn handle_acct_enter(tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
    if tcp.u_arg[0] == 0 {
        return Ok(());
    }
    rewrite_path(tcp, libc::AT_FDCWD as i64, 0, AccessPolicy::Write, ctx)
}
