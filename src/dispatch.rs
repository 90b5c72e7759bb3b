//! Syscall dispatch table: maps a syscall number observed at a ptrace
//! stop to the handler that owns it, at the appropriate phase. This is
//! the concrete "one handler per intercepted syscall class" component
//! from SPEC_FULL.md §2; everything not matched here passes straight
//! through untouched, per SPEC_FULL.md §7's "Pass-through" error class.

use crate::context::SandboxContext;
use crate::error::SandboxResult;
use crate::getdents::{on_getdents_exit, DentFlavor};
use crate::handlers::{attrs, create, delete, open, path, rename, stat};
use crate::tracee::TraceeContext;

/// Runs the entry-phase handler for `syscallno`, if any is registered.
/// Unmatched syscall numbers are a no-op: the kernel runs them
/// unmodified.
pub fn on_entry(syscallno: i64, tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
    match syscallno {
        n if n == libc::SYS_open => open::handle_open_enter(tcp, ctx),
        n if n == libc::SYS_openat => open::handle_openat_enter(tcp, ctx),
        n if n == libc::SYS_creat => open::handle_creat_enter(tcp, ctx),

        n if n == libc::SYS_stat => stat::handle_stat_enter(tcp, ctx),
        n if n == libc::SYS_lstat => stat::handle_lstat_enter(tcp, ctx),
        n if n == libc::SYS_newfstatat => stat::handle_newfstatat_enter(tcp, ctx),
        n if n == libc::SYS_access => stat::handle_access_enter(tcp, ctx),
        n if n == libc::SYS_faccessat => stat::handle_faccessat_enter(tcp, ctx),
        n if n == libc::SYS_readlink => stat::handle_readlink_enter(tcp, ctx),
        n if n == libc::SYS_readlinkat => stat::handle_readlinkat_enter(tcp, ctx),

        n if n == libc::SYS_mkdir => create::handle_mkdir_enter(tcp, ctx),
        n if n == libc::SYS_mkdirat => create::handle_mkdirat_enter(tcp, ctx),

        n if n == libc::SYS_rmdir => delete::handle_rmdir_enter(tcp, ctx),
        n if n == libc::SYS_unlink => delete::handle_unlink_enter(tcp, ctx),
        n if n == libc::SYS_unlinkat => delete::handle_unlinkat_enter(tcp, ctx),

        n if n == libc::SYS_rename => rename::handle_rename_enter(tcp, ctx),
        n if n == libc::SYS_renameat || n == libc::SYS_renameat2 => {
            rename::handle_renameat_enter(tcp, ctx)
        }
        n if n == libc::SYS_link => rename::handle_link_enter(tcp, ctx),
        n if n == libc::SYS_linkat => rename::handle_linkat_enter(tcp, ctx),
        n if n == libc::SYS_symlink => rename::handle_symlink_enter(tcp, ctx),
        n if n == libc::SYS_symlinkat => rename::handle_symlinkat_enter(tcp, ctx),

        n if n == libc::SYS_chdir => path::handle_chdir_enter(tcp, ctx),

        n if n == libc::SYS_utimensat => attrs::handle_utimensat_enter(tcp, ctx),
        n if n == libc::SYS_fchmodat => attrs::handle_fchmodat_enter(tcp, ctx),
        n if n == libc::SYS_mknodat => attrs::handle_mknodat_enter(tcp, ctx),
        n if n == libc::SYS_futimesat => attrs::handle_futimesat_enter(tcp, ctx),
        n if n == libc::SYS_fchownat => attrs::handle_fchownat_enter(tcp, ctx),
        n if n == libc::SYS_setxattr => attrs::handle_setxattr_enter(tcp, ctx),
        n if n == libc::SYS_lsetxattr => attrs::handle_lsetxattr_enter(tcp, ctx),
        n if n == libc::SYS_removexattr => attrs::handle_removexattr_enter(tcp, ctx),
        n if n == libc::SYS_lremovexattr => attrs::handle_lremovexattr_enter(tcp, ctx),
        n if n == libc::SYS_getxattr => attrs::handle_getxattr_enter(tcp, ctx),
        n if n == libc::SYS_lgetxattr => attrs::handle_lgetxattr_enter(tcp, ctx),
        n if n == libc::SYS_listxattr => attrs::handle_listxattr_enter(tcp, ctx),
        n if n == libc::SYS_llistxattr => attrs::handle_llistxattr_enter(tcp, ctx),
        n if n == libc::SYS_statfs => attrs::handle_statfs_enter(tcp, ctx),
        n if n == libc::SYS_uselib => attrs::handle_uselib_enter(tcp, ctx),
        n if n == libc::SYS_utimes => attrs::handle_utimes_enter(tcp, ctx),
        n if n == libc::SYS_chmod => attrs::handle_chmod_enter(tcp, ctx),
        n if n == libc::SYS_chown => attrs::handle_chown_enter(tcp, ctx),
        n if n == libc::SYS_lchown => attrs::handle_lchown_enter(tcp, ctx),
        n if n == libc::SYS_execve => attrs::handle_execve_enter(tcp, ctx),
        n if n == libc::SYS_truncate => attrs::handle_truncate_enter(tcp, ctx),
        n if n == libc::SYS_mknod => attrs::handle_mknod_enter(tcp, ctx),
        n if n == libc::SYS_acct => attrs::handle_acct_enter(tcp, ctx),

        _ => Ok(()),
    }
}

/// Runs the exit-phase handler for `syscallno`, if any. Unmatched
/// syscall numbers pass the kernel's own return value through
/// untouched.
pub fn on_exit(syscallno: i64, tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
    match syscallno {
        n if n == libc::SYS_rmdir => delete::handle_rmdir_exit(tcp, ctx),
        n if n == libc::SYS_unlink => delete::handle_unlink_exit(tcp, ctx),
        n if n == libc::SYS_unlinkat => delete::handle_unlinkat_exit(tcp, ctx),

        n if n == libc::SYS_getcwd => path::handle_getcwd_exit(tcp, ctx),

        n if n == libc::SYS_getdents => on_getdents_exit(tcp, ctx, DentFlavor::Legacy),
        n if n == libc::SYS_getdents64 => on_getdents_exit(tcp, ctx, DentFlavor::Dirent64),

        _ => Ok(()),
    }
}

/// True for every syscall number this crate registers an entry or exit
/// handler for. The tracer loop uses this to decide whether a syscall
/// needs its entry registers captured at all, versus just being let
/// through untouched both times.
pub fn is_intercepted(syscallno: i64) -> bool {
    const INTERCEPTED: &[i64] = &[
        libc::SYS_open,
        libc::SYS_openat,
        libc::SYS_creat,
        libc::SYS_stat,
        libc::SYS_lstat,
        libc::SYS_newfstatat,
        libc::SYS_access,
        libc::SYS_faccessat,
        libc::SYS_readlink,
        libc::SYS_readlinkat,
        libc::SYS_mkdir,
        libc::SYS_mkdirat,
        libc::SYS_rmdir,
        libc::SYS_unlink,
        libc::SYS_unlinkat,
        libc::SYS_rename,
        libc::SYS_renameat,
        libc::SYS_renameat2,
        libc::SYS_link,
        libc::SYS_linkat,
        libc::SYS_symlink,
        libc::SYS_symlinkat,
        libc::SYS_chdir,
        libc::SYS_getcwd,
        libc::SYS_getdents,
        libc::SYS_getdents64,
        libc::SYS_utimensat,
        libc::SYS_fchmodat,
        libc::SYS_mknodat,
        libc::SYS_futimesat,
        libc::SYS_fchownat,
        libc::SYS_setxattr,
        libc::SYS_lsetxattr,
        libc::SYS_removexattr,
        libc::SYS_lremovexattr,
        libc::SYS_getxattr,
        libc::SYS_lgetxattr,
        libc::SYS_listxattr,
        libc::SYS_llistxattr,
        libc::SYS_statfs,
        libc::SYS_uselib,
        libc::SYS_utimes,
        libc::SYS_chmod,
        libc::SYS_chown,
        libc::SYS_lchown,
        libc::SYS_execve,
        libc::SYS_truncate,
        libc::SYS_mknod,
        libc::SYS_acct,
    ];
    INTERCEPTED.contains(&syscallno)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_family_is_intercepted() {
        assert!(is_intercepted(libc::SYS_open));
        assert!(is_intercepted(libc::SYS_openat));
        assert!(!is_intercepted(libc::SYS_write));
    }
}
