//! Path Resolver: translates `(pid, fd, argument-slot)` triples observed
//! at syscall entry into a normalized absolute host path (HPN) and the
//! matching overlay path (SPN).

use crate::config::Config;
use crate::fsutil::normalize_path;
use crate::registers::PATH_MAX;
use crate::tracee::TraceeContext;
use nix::unistd::Pid;
use std::path::PathBuf;

/// Reads the host path an open fd in the tracee refers to, via
/// `/proc/<pid>/fd/<fd>`. Returns `(path, cwd_in_overlay)`, where the
/// second element is true iff that path lies under `ROOT` (in which case
/// the returned path has already had the `ROOT` prefix stripped, since
/// the tracee's view of its own cwd/fd must look like a host path).
fn read_proc_link(proc_path: &str, cfg: &Config) -> Option<(String, bool)> {
    let link = std::fs::read_link(proc_path).ok()?;
    let path = link.to_string_lossy().into_owned();

    if cfg.is_in_sboxfs(&path) {
        Some((cfg.strip_root(&path).to_owned(), true))
    } else {
        Some((path, false))
    }
}

fn cwd_path(pid: Pid, cfg: &Config) -> (String, bool) {
    read_proc_link(&format!("/proc/{}/cwd", pid), cfg).unwrap_or_else(|| ("/".to_owned(), false))
}

fn fd_path(pid: Pid, fd: i64, cfg: &Config) -> (String, bool) {
    read_proc_link(&format!("/proc/{}/fd/{}", pid, fd), cfg).unwrap_or_else(|| (String::new(), false))
}

/// Resolves the path argument at `arg_slot` (honoring `fd` for relative
/// lookups, `AT_FDCWD` or an open directory fd) into `(hpn,
/// cwd_in_overlay)`. A failed tracee-memory read produces an empty HPN,
/// which callers pass straight through to the kernel to produce its own
/// `EFAULT`/`ENOENT`.
pub fn resolve(tcp: &TraceeContext, fd: i64, arg_slot: usize, cfg: &Config) -> (String, bool) {
    let raw = tcp
        .read_string(tcp.u_arg[arg_slot], PATH_MAX)
        .unwrap_or_default();
    let raw = String::from_utf8_lossy(&raw).into_owned();

    if raw.starts_with('/') {
        return (normalize_path(&raw), false);
    }

    let (base, cwd_in_overlay) = if fd == libc::AT_FDCWD as i64 {
        cwd_path(tcp.pid, cfg)
    } else {
        fd_path(tcp.pid, fd, cfg)
    };

    let joined = format!("{}/{}", base, raw);
    (normalize_path(&joined), cwd_in_overlay)
}

/// `SPN = ROOT ++ HPN`.
pub fn spn_of(hpn: &str, cfg: &Config) -> PathBuf {
    cfg.spn_of(hpn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spn_of_matches_config() {
        let cfg = Config::new(PathBuf::from("/sbx"), false);
        assert_eq!(spn_of("/etc/hosts", &cfg), PathBuf::from("/sbx/etc/hosts"));
    }
}
