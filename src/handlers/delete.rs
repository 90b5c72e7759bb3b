//! `rmdir`, `unlink`, `unlinkat` — entry rewrites the path under policy
//! `Force`; exit records a tombstone and, if the overlay syscall failed
//! but the host file is still genuinely there, emulates a successful
//! deletion so the tracee observes it as gone anyway.

use crate::context::SandboxContext;
use crate::error::SandboxResult;
use crate::fsutil::path_exists;
use crate::path_resolver::resolve;
use crate::policy::AccessPolicy;
use crate::tracee::TraceeContext;
use std::path::Path;

use super::path::rewrite_path;

fn unlink_exit(
    tcp: &mut TraceeContext,
    fd: i64,
    arg: usize,
    is_dir: bool,
    ctx: &mut SandboxContext,
) -> SandboxResult<()> {
    let (hpn, _) = resolve(tcp, fd, arg, &ctx.config);
    if hpn.is_empty() {
        return Ok(());
    }

    if tcp.u_rval < 0 && !ctx.tombstones.is_deleted(&hpn) && path_exists(Path::new(&hpn)) {
        log::debug!(target: "sbox::path", "emulating successful delete of {}", hpn);
        tcp.rewrite_ret(0)?;
    }

    if tcp.u_rval == 0 {
        if is_dir {
            ctx.tombstones.delete_subtree(&hpn);
        } else {
            ctx.tombstones.insert(&hpn);
        }
    }

    Ok(())
}

pub fn handle_rmdir_enter(tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
    rewrite_path(tcp, libc::AT_FDCWD as i64, 0, AccessPolicy::Force, ctx)
}

pub fn handle_rmdir_exit(tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
    unlink_exit(tcp, libc::AT_FDCWD as i64, 0, true, ctx)
}

pub fn handle_unlink_enter(tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
    rewrite_path(tcp, libc::AT_FDCWD as i64, 0, AccessPolicy::Force, ctx)
}

pub fn handle_unlink_exit(tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
    unlink_exit(tcp, libc::AT_FDCWD as i64, 0, false, ctx)
}

pub fn handle_unlinkat_enter(tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
    let fd = tcp.u_arg[0] as i64;
    rewrite_path(tcp, fd, 1, AccessPolicy::Force, ctx)
}

pub fn handle_unlinkat_exit(tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
    let fd = tcp.u_arg[0] as i64;
    let is_dir = (tcp.u_arg[2] as i32 & libc::AT_REMOVEDIR) != 0;
    unlink_exit(tcp, fd, 1, is_dir, ctx)
}
