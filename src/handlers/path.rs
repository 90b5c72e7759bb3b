//! The unified rewrite primitive (SPEC_FULL.md §4.4) and the syscall
//! handlers that reduce straight to it: single-path read-only syscalls
//! (`stat`, `access`, `readlink`, ...), single-path mutating syscalls
//! (`chmod`, `chown`, `utime`, extended attributes, ...), `truncate`,
//! `mkdir`/`mkdirat`, `chdir`, and `getcwd`.

use crate::context::SandboxContext;
use crate::error::SandboxResult;
use crate::fsutil::path_exists;
use crate::overlay::{copyfile, sync_parent_dirs};
use crate::path_resolver::{resolve, spn_of};
use crate::policy::AccessPolicy;
use crate::tracee::TraceeContext;

/// `rewrite_path(tcp, fd, arg, policy)`: resolves the path argument,
/// decides whether to rewrite it under the given access policy, and if
/// so synthesizes overlay parent directories, copies host content first
/// when `policy == Write`, and hijacks the argument to the SPN.
pub fn rewrite_path(
    tcp: &mut TraceeContext,
    fd: i64,
    arg: usize,
    policy: AccessPolicy,
    ctx: &mut SandboxContext,
) -> SandboxResult<()> {
    let (hpn, _) = resolve(tcp, fd, arg, &ctx.config);
    if hpn.is_empty() {
        return Ok(());
    }
    let spn = spn_of(&hpn, &ctx.config);

    let should_rewrite =
        policy != AccessPolicy::Read || ctx.tombstones.is_deleted(&hpn) || path_exists(&spn);
    if !should_rewrite {
        return Ok(());
    }

    // Overlay materialization failures (e.g. a `link`/`symlink` source
    // that's relative, a directory, or gone by the time we get here) are
    // not fatal: spec.md §7 only calls out cross-process memory writes,
    // unknown arch slots, and concurrent getdents as Fatal. The source
    // tolerates a failed mkdir/copy and still rewrites the argument, so
    // we log and carry on rather than aborting the whole tracer.
    if policy != AccessPolicy::Read {
        if let Err(e) = sync_parent_dirs(&hpn, &spn, &ctx.config) {
            log::warn!(target: "sbox::path", "sync_parent_dirs({:?}) failed, continuing: {}", spn, e);
        }
    }
    if policy == AccessPolicy::Write {
        if let Err(e) = copyfile(&hpn, &spn) {
            log::warn!(target: "sbox::path", "copyfile({} -> {:?}) failed, continuing: {}", hpn, spn, e);
        }
    }

    log::debug!(target: "sbox::path", "rewrite arg {} ({}) to {:?}", arg, hpn, spn);
    tcp.hijack_str(arg, &spn.to_string_lossy())
}

/// `chdir` — read-only: we don't need the overlay to exist to let the
/// tracee `chdir` there, we just need the path resolved against the
/// right policy so a later `getcwd` can be sanitized. `fchdir` needs no
/// handling: the fd it operates on was already rewritten at its
/// originating `open`.
pub fn handle_chdir_enter(tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
    rewrite_path(tcp, libc::AT_FDCWD as i64, 0, AccessPolicy::Read, ctx)
}

/// `getcwd` — exit only. If the raw buffer the kernel wrote begins with
/// `ROOT`, the tracee is sitting inside the overlay; strip the prefix
/// and reduce the return value by `ROOT_LEN` so it never observes an
/// overlay-looking path.
pub fn handle_getcwd_exit(tcp: &mut TraceeContext, ctx: &SandboxContext) -> SandboxResult<()> {
    if tcp.u_rval <= 0 {
        return Ok(());
    }

    let ptr = tcp.u_arg[0];
    let raw = match tcp.read_string(ptr, crate::registers::PATH_MAX) {
        Some(buf) => buf,
        None => return Ok(()),
    };
    let path = String::from_utf8_lossy(&raw).into_owned();

    if !ctx.config.is_in_sboxfs(&path) {
        return Ok(());
    }

    let hpn = ctx.config.strip_root(&path);
    let mut bytes = hpn.as_bytes().to_vec();
    bytes.push(0);
    tcp.remote_write(ptr, &bytes)?;
    tcp.rewrite_ret(tcp.u_rval - ctx.config.root_len() as i64)
}
