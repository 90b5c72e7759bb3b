//! Read-only single-path syscalls: `stat`/`lstat`/`newfstatat`,
//! `access`/`faccessat`, `readlink`/`readlinkat`. All reduce to
//! `rewrite_path(..., Read)` at entry — the tracee is only looking at
//! the path, so the overlay is consulted but never created for it.

use crate::context::SandboxContext;
use crate::error::SandboxResult;
use crate::policy::AccessPolicy;
use crate::tracee::TraceeContext;

use super::path::rewrite_path;

pub fn handle_stat_enter(tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
    rewrite_path(tcp, libc::AT_FDCWD as i64, 0, AccessPolicy::Read, ctx)
}

pub fn handle_lstat_enter(tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
    rewrite_path(tcp, libc::AT_FDCWD as i64, 0, AccessPolicy::Read, ctx)
}

pub fn handle_newfstatat_enter(
    tcp: &mut TraceeContext,
    ctx: &mut SandboxContext,
) -> SandboxResult<()> {
    let fd = tcp.u_arg[0] as i64;
    rewrite_path(tcp, fd, 1, AccessPolicy::Read, ctx)
}

pub fn handle_access_enter(tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
    rewrite_path(tcp, libc::AT_FDCWD as i64, 0, AccessPolicy::Read, ctx)
}

pub fn handle_faccessat_enter(
    tcp: &mut TraceeContext,
    ctx: &mut SandboxContext,
) -> SandboxResult<()> {
    let fd = tcp.u_arg[0] as i64;
    rewrite_path(tcp, fd, 1, AccessPolicy::Read, ctx)
}

pub fn handle_readlink_enter(
    tcp: &mut TraceeContext,
    ctx: &mut SandboxContext,
) -> SandboxResult<()> {
    rewrite_path(tcp, libc::AT_FDCWD as i64, 0, AccessPolicy::Read, ctx)
}

pub fn handle_readlinkat_enter(
    tcp: &mut TraceeContext,
    ctx: &mut SandboxContext,
) -> SandboxResult<()> {
    let fd = tcp.u_arg[0] as i64;
    rewrite_path(tcp, fd, 1, AccessPolicy::Read, ctx)
}
