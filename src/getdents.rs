//! Directory Listing Filter: for reads from an overlay directory, unions
//! the kernel's own `getdents`/`getdents64` results (returned directly,
//! since the tracee's fd was itself opened against the overlay
//! directory once it's shadowed) with the unshadowed entries of the
//! corresponding host directory, pumped manually once the real,
//! overlay-backed read drains to EOF. See SPEC_FULL.md §4.4's state
//! machine: Idle -> Pumping -> Idle.

use crate::context::{DentState, SandboxContext};
use crate::error::{SandboxError, SandboxResult};
use crate::fsutil::path_exists;
use crate::tracee::TraceeContext;
use std::ffi::CString;
use std::path::Path;

/// Which flavor of the getdents family the tracee called. The
/// `linux_dirent`/`linux_dirent64` layouts agree on everything up to
/// `d_reclen` and differ only in where the name starts.
#[derive(Copy, Clone, Debug)]
pub enum DentFlavor {
    Legacy,
    Dirent64,
}

impl DentFlavor {
    fn name_offset(self) -> usize {
        match self {
            DentFlavor::Legacy => 18,
            DentFlavor::Dirent64 => 19,
        }
    }

    fn raw_syscall(self) -> i64 {
        match self {
            DentFlavor::Legacy => libc::SYS_getdents,
            DentFlavor::Dirent64 => libc::SYS_getdents64,
        }
    }
}

/// Private scratch buffer cap for the manual host-side pump. Also caps
/// the filtered result so it never exceeds the tracee's own buffer.
const PUMP_BUF: usize = 4096;

/// Runs at the exit of a `getdents`/`getdents64` call whose real return
/// value was 0 (the underlying, overlay-backed read is exhausted).
/// Either leaves the 0 alone (the fd isn't inside the overlay) or
/// continues the listing from the matching host directory, presenting
/// the union view one `getdents` call at a time.
pub fn on_getdents_exit(
    tcp: &mut TraceeContext,
    ctx: &mut SandboxContext,
    flavor: DentFlavor,
) -> SandboxResult<()> {
    if tcp.u_rval != 0 {
        return Ok(());
    }

    let host_fd = tcp.u_arg[0] as i32;

    if !ctx.dent_states.contains_key(&tcp.pid) && !start_pump(tcp, ctx, host_fd)? {
        return Ok(());
    }

    match ctx.dent_states.get(&tcp.pid) {
        Some(state) if state.host_fd == host_fd => {}
        Some(_) => {
            return Err(SandboxError::Unsupported(
                "concurrent getdents on distinct fds is unsupported",
            ));
        }
        None => return Ok(()),
    }

    pump_one(tcp, ctx, flavor)
}

/// Resolves the tracee's fd to its backing path via `/proc/<pid>/fd/<fd>`.
/// If it lies under `ROOT`, opens the matching host directory read-only
/// and transitions the per-tracee state from Idle to Pumping, keyed by
/// `tcp.pid` so it survives past this single syscall stop.
fn start_pump(tcp: &TraceeContext, ctx: &mut SandboxContext, host_fd: i32) -> SandboxResult<bool> {
    let proc_path = format!("/proc/{}/fd/{}", tcp.pid, host_fd);
    let spn = match std::fs::read_link(&proc_path) {
        Ok(p) => p,
        Err(_) => return Ok(false),
    };
    let spn_str = spn.to_string_lossy().into_owned();

    if !ctx.config.is_in_sboxfs(&spn_str) {
        return Ok(false);
    }

    let hpn = ctx.config.strip_root(&spn_str).to_owned();
    let c_hpn = match CString::new(hpn) {
        Ok(c) => c,
        Err(_) => return Ok(false),
    };
    let sbox_fd = unsafe { libc::open(c_hpn.as_ptr(), libc::O_RDONLY | libc::O_DIRECTORY) };
    if sbox_fd < 0 {
        return Ok(false);
    }

    log::debug!(target: "sbox::getdents", "pumping host dir for spn {:?}", spn);

    ctx.dent_states.insert(
        tcp.pid,
        DentState {
            host_fd,
            sbox_fd,
            sbox_spn: spn,
        },
    );
    Ok(true)
}

/// One pump iteration: raw `getdents`/`getdents64` on the host-side fd,
/// filter, write the survivors back into the tracee's buffer. Reads and
/// updates the per-pid `DentState` on `ctx` rather than anything on
/// `tcp`, since `tcp` doesn't outlive this single syscall stop.
fn pump_one(tcp: &mut TraceeContext, ctx: &mut SandboxContext, flavor: DentFlavor) -> SandboxResult<()> {
    let sbox_fd = ctx
        .dent_states
        .get(&tcp.pid)
        .expect("pump_one requires an active pump")
        .sbox_fd;
    let cap = PUMP_BUF.min(tcp.u_arg[2] as usize);
    let mut buf = vec![0u8; cap];

    let n = unsafe { libc::syscall(flavor.raw_syscall(), sbox_fd, buf.as_mut_ptr(), cap as u32) };

    if n <= 0 {
        unsafe { libc::close(sbox_fd) };
        ctx.dent_states.remove(&tcp.pid);
        // n == 0: the host directory is exhausted too; the real 0 the
        // tracee already observed stands. n < 0: nothing sane to
        // present either, so fall back to the same EOF view.
        return Ok(());
    }

    let n = n as usize;
    let name_off = flavor.name_offset();
    let sbox_spn = ctx.dent_states.get(&tcp.pid).unwrap().sbox_spn.clone();
    let mut out = Vec::with_capacity(n);
    let mut pos = 0usize;

    while pos < n {
        let reclen = u16::from_ne_bytes([buf[pos + 16], buf[pos + 17]]) as usize;
        if reclen == 0 || pos + reclen > n {
            break;
        }

        let name_start = pos + name_off;
        let name_end = buf[name_start..pos + reclen]
            .iter()
            .position(|&b| b == 0)
            .map(|i| name_start + i)
            .unwrap_or(pos + reclen);
        let name = String::from_utf8_lossy(&buf[name_start..name_end]);

        let shadowed = name == "." || name == ".." || {
            let candidate = Path::new(&sbox_spn).join(name.as_ref());
            path_exists(&candidate)
        };

        if !shadowed {
            log::debug!(target: "sbox::getdents", "host entry surfaces: {}", name);
            out.extend_from_slice(&buf[pos..pos + reclen]);
        } else {
            log::debug!(target: "sbox::getdents", "host entry shadowed by overlay: {}", name);
        }

        pos += reclen;
    }

    tcp.remote_write(tcp.u_arg[1], &out)?;
    tcp.rewrite_ret(out.len() as i64)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_offsets_match_kernel_layouts() {
        assert_eq!(DentFlavor::Legacy.name_offset(), 18);
        assert_eq!(DentFlavor::Dirent64.name_offset(), 19);
    }
}
