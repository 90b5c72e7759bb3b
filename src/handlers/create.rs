//! `mkdir`/`mkdirat` — entry only, policy `Force`: the directory is
//! being created fresh, so there is nothing on the host to preserve and
//! no copy is needed, only the overlay parent chain.

use crate::context::SandboxContext;
use crate::error::SandboxResult;
use crate::policy::AccessPolicy;
use crate::tracee::TraceeContext;

use super::path::rewrite_path;

pub fn handle_mkdir_enter(tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
    rewrite_path(tcp, libc::AT_FDCWD as i64, 0, AccessPolicy::Force, ctx)
}

pub fn handle_mkdirat_enter(tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
    let fd = tcp.u_arg[0] as i64;
    rewrite_path(tcp, fd, 1, AccessPolicy::Force, ctx)
}
