//! `rename`/`renameat`, `link`/`linkat`, `symlink`/`symlinkat` — entry
//! only, each rewriting two path arguments under different policies.
//!
//! `rename` reads the source (nothing needs to be created there) and
//! writes the destination, copying host content in first. `link` and
//! `symlink` instead copy the *source* into the overlay before creating
//! the link, so the new name can never resolve outside the overlay view
//! (see SPEC_FULL.md §4.4 and the Open Question on relative symlink
//! targets).

use crate::context::SandboxContext;
use crate::error::SandboxResult;
use crate::policy::AccessPolicy;
use crate::tracee::TraceeContext;

use super::path::rewrite_path;

pub fn handle_rename_enter(tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
    rewrite_path(tcp, libc::AT_FDCWD as i64, 0, AccessPolicy::Read, ctx)?;
    rewrite_path(tcp, libc::AT_FDCWD as i64, 1, AccessPolicy::Write, ctx)
}

pub fn handle_renameat_enter(
    tcp: &mut TraceeContext,
    ctx: &mut SandboxContext,
) -> SandboxResult<()> {
    let old_fd = tcp.u_arg[0] as i64;
    let new_fd = tcp.u_arg[2] as i64;
    rewrite_path(tcp, old_fd, 1, AccessPolicy::Read, ctx)?;
    rewrite_path(tcp, new_fd, 3, AccessPolicy::Write, ctx)
}

pub fn handle_link_enter(tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
    rewrite_path(tcp, libc::AT_FDCWD as i64, 0, AccessPolicy::Write, ctx)?;
    rewrite_path(tcp, libc::AT_FDCWD as i64, 1, AccessPolicy::Force, ctx)
}

pub fn handle_linkat_enter(tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
    let old_fd = tcp.u_arg[0] as i64;
    let new_fd = tcp.u_arg[2] as i64;
    rewrite_path(tcp, old_fd, 1, AccessPolicy::Write, ctx)?;
    rewrite_path(tcp, new_fd, 3, AccessPolicy::Force, ctx)
}

/// `symlink(target, linkpath)`: `target` is not resolved as a path by
/// the kernel, but the source copies it anyway (see the Open Question
/// in SPEC_FULL.md about relative symlink targets escaping the
/// overlay).
pub fn handle_symlink_enter(
    tcp: &mut TraceeContext,
    ctx: &mut SandboxContext,
) -> SandboxResult<()> {
    rewrite_path(tcp, libc::AT_FDCWD as i64, 0, AccessPolicy::Write, ctx)?;
    rewrite_path(tcp, libc::AT_FDCWD as i64, 1, AccessPolicy::Force, ctx)
}

pub fn handle_symlinkat_enter(
    tcp: &mut TraceeContext,
    ctx: &mut SandboxContext,
) -> SandboxResult<()> {
    let new_fd = tcp.u_arg[1] as i64;
    rewrite_path(tcp, libc::AT_FDCWD as i64, 0, AccessPolicy::Write, ctx)?;
    rewrite_path(tcp, new_fd, 2, AccessPolicy::Force, ctx)
}
