//! Sandbox Context: bundles the process-wide pieces every handler needs
//! — the immutable `Config`, the mutable `TombstoneMap`, and the
//! per-tracee directory-listing state — into a single value threaded
//! through the tracer loop instead of reaching for process globals (see
//! SPEC_FULL.md's design notes).

use crate::config::Config;
use crate::tombstone::TombstoneMap;
use nix::unistd::Pid;
use std::collections::HashMap;
use std::path::PathBuf;

/// State of a directory listing currently being pumped from the overlay
/// through to a tracee for a `getdents`/`getdents64` call. At most one
/// iteration is active per tracee at a time. Lives here, keyed by pid,
/// rather than on the per-syscall `TraceeContext`: a single pump spans
/// several separate `getdents` calls, each its own entry/exit stop and
/// each its own freshly-`fetch`ed `TraceeContext`, so the state has to
/// outlive any one of them. `sbox.c` gets this for free because its
/// equivalent fields live in `struct tcb`, which persists for the
/// tracee's lifetime.
#[derive(Debug)]
pub struct DentState {
    /// The fd the tracee is reading from (as seen by the tracee).
    pub host_fd: i32,
    /// Host-side fd the core opened on the corresponding HPN directory,
    /// to pump entries from.
    pub sbox_fd: i32,
    /// SPN of the directory being iterated, used to test for shadowing.
    pub sbox_spn: PathBuf,
}

pub struct SandboxContext {
    pub config: Config,
    pub tombstones: TombstoneMap,
    pub dent_states: HashMap<Pid, DentState>,
}

impl SandboxContext {
    pub fn new(config: Config) -> SandboxContext {
        SandboxContext {
            config,
            tombstones: TombstoneMap::new(),
            dent_states: HashMap::new(),
        }
    }
}
