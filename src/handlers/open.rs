//! `open`/`openat`/`creat` — entry only. These don't reduce to the plain
//! `rewrite_path` primitive because the decision also depends on the
//! open flags: a read-only open falls through to the host unless
//! shadowed, a truncating open never copies, and a read/write open
//! copy-on-writes.

use crate::context::SandboxContext;
use crate::error::SandboxResult;
use crate::fsutil::path_exists;
use crate::overlay::{copyfile, sync_parent_dirs};
use crate::path_resolver::{resolve, spn_of};
use crate::policy::AccessPolicy;
use crate::tracee::TraceeContext;

use super::path::rewrite_path;

fn open_enter(
    tcp: &mut TraceeContext,
    fd: i64,
    arg: usize,
    oflag: i32,
    ctx: &mut SandboxContext,
) -> SandboxResult<()> {
    let (hpn, cwd_in_overlay) = resolve(tcp, fd, arg, &ctx.config);
    if hpn.is_empty() {
        return Ok(());
    }

    // /proc needs emulating /proc/pid/fd/*, which this crate doesn't
    // attempt; /dev devices should never be redirected into a regular
    // file in the overlay.
    if hpn.starts_with("/dev/") || hpn.starts_with("/proc/") {
        return Ok(());
    }

    let spn = spn_of(&hpn, &ctx.config);

    if ctx.tombstones.is_deleted(&hpn) {
        log::debug!(target: "sbox::open", "open of deleted file: {}", hpn);
        if let Err(e) = sync_parent_dirs(&hpn, &spn, &ctx.config) {
            log::warn!(target: "sbox::open", "sync_parent_dirs({:?}) failed, continuing: {}", spn, e);
        }
        return tcp.hijack_str(arg, &spn.to_string_lossy());
    }

    if path_exists(&spn) {
        log::debug!(target: "sbox::open", "already in overlay: {:?}", spn);
        return tcp.hijack_str(arg, &spn.to_string_lossy());
    }

    let accmode = oflag & libc::O_ACCMODE;
    if accmode == libc::O_RDONLY {
        // A read-only open against a cwd inside the overlay must ignore
        // that cwd and resolve the absolute host path instead, or it
        // would silently read from inside ROOT.
        if cwd_in_overlay {
            log::debug!(target: "sbox::open", "read-only, rewriting cwd-relative open to hpn: {}", hpn);
            return tcp.hijack_str(arg, &hpn);
        }
        return Ok(());
    }

    if oflag & libc::O_TRUNC != 0 {
        log::debug!(target: "sbox::open", "truncating open: {:?}", spn);
        if let Err(e) = sync_parent_dirs(&hpn, &spn, &ctx.config) {
            log::warn!(target: "sbox::open", "sync_parent_dirs({:?}) failed, continuing: {}", spn, e);
        }
        return tcp.hijack_str(arg, &spn.to_string_lossy());
    }

    // O_RDWR or O_WRONLY: copy-on-write. Neither a failed mkdir nor a
    // failed copy is fatal (spec.md §7) — the source proceeds with the
    // hijack regardless, so a copy failure just means the tracee's
    // write lands on an empty or partially-materialized overlay file
    // instead of aborting the whole sandbox.
    log::debug!(target: "sbox::open", "read/write open, copy-on-write: {:?}", spn);
    if let Err(e) = sync_parent_dirs(&hpn, &spn, &ctx.config) {
        log::warn!(target: "sbox::open", "sync_parent_dirs({:?}) failed, continuing: {}", spn, e);
    }
    if let Err(e) = copyfile(&hpn, &spn) {
        log::warn!(target: "sbox::open", "copyfile({} -> {:?}) failed, continuing: {}", hpn, spn, e);
    }
    tcp.hijack_str(arg, &spn.to_string_lossy())
}

pub fn handle_open_enter(tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
    let oflag = tcp.u_arg[1] as i32;
    open_enter(tcp, libc::AT_FDCWD as i64, 0, oflag, ctx)
}

pub fn handle_openat_enter(tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
    let fd = tcp.u_arg[0] as i64;
    let oflag = tcp.u_arg[2] as i32;
    open_enter(tcp, fd, 1, oflag, ctx)
}

/// `creat(path, mode) == open(path, O_CREAT|O_TRUNC|O_WRONLY, mode)`:
/// the path is always created fresh, so there is nothing on the host to
/// preserve.
pub fn handle_creat_enter(tcp: &mut TraceeContext, ctx: &mut SandboxContext) -> SandboxResult<()> {
    rewrite_path(tcp, libc::AT_FDCWD as i64, 0, AccessPolicy::Force, ctx)
}
