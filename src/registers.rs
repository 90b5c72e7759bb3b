//! Thin wrapper around the raw `x86_64` `user_regs_struct` ptrace reports.
//!
//! Spec's "architecture-gated" register aliasing collapses here to a
//! single `match` over argument slots, because this crate only targets
//! `x86_64` (see SPEC_FULL.md's Open Questions). A multi-architecture
//! register union, as the teacher does for its own cross-arch replay
//! engine, is out of scope for this sandbox.

use libc::user_regs_struct;

pub const PATH_MAX: usize = 4096;

/// Sentinel argument slot used by the hijack undo log and `rewrite_ret`
/// to address the return-value register alongside the six syscall
/// argument registers.
pub const ARG_RET: usize = 6;

/// Snapshot of the tracee's registers at a syscall stop, plus the
/// argument-slot accessors `rewrite_path` and the handlers need.
#[derive(Copy, Clone, Debug)]
pub struct Registers(pub user_regs_struct);

impl Registers {
    pub fn raw(&self) -> &user_regs_struct {
        &self.0
    }

    /// The syscall number for the syscall currently being entered/exited.
    /// Lives in `orig_rax` for the whole entry/exit pair; `rax` itself is
    /// overwritten with the return value once the kernel runs the call.
    pub fn syscallno(&self) -> i64 {
        self.0.orig_rax as i64
    }

    pub fn syscall_result(&self) -> i64 {
        self.0.rax as i64
    }

    pub fn set_syscall_result(&mut self, value: i64) {
        self.0.rax = value as u64;
    }

    pub fn stack_pointer(&self) -> u64 {
        self.0.rsp
    }

    /// Reads argument/return slot `arg`. Slots `0..=5` are the six
    /// syscall argument registers in Linux x86_64 ABI order; `ARG_RET` is
    /// the return-value register.
    pub fn arg(&self, arg: usize) -> u64 {
        match arg {
            0 => self.0.rdi,
            1 => self.0.rsi,
            2 => self.0.rdx,
            3 => self.0.r10,
            4 => self.0.r8,
            5 => self.0.r9,
            ARG_RET => self.0.rax,
            other => unreachable!("unknown argument slot: {}", other),
        }
    }

    pub fn set_arg(&mut self, arg: usize, val: u64) {
        match arg {
            0 => self.0.rdi = val,
            1 => self.0.rsi = val,
            2 => self.0.rdx = val,
            3 => self.0.r10 = val,
            4 => self.0.r8 = val,
            5 => self.0.r9 = val,
            ARG_RET => self.0.rax = val,
            other => unreachable!("unknown argument slot: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_regs() -> Registers {
        Registers(unsafe { std::mem::zeroed() })
    }

    #[test]
    fn arg_slots_round_trip() {
        let mut regs = blank_regs();
        for slot in 0..=5 {
            regs.set_arg(slot, (slot as u64 + 1) * 11);
        }
        for slot in 0..=5 {
            assert_eq!(regs.arg(slot), (slot as u64 + 1) * 11);
        }
    }

    #[test]
    fn syscallno_reads_orig_rax() {
        let mut regs = blank_regs();
        regs.0.orig_rax = libc::SYS_openat as u64;
        assert_eq!(regs.syscallno(), libc::SYS_openat);
    }

    #[test]
    fn set_syscall_result_writes_rax() {
        let mut regs = blank_regs();
        regs.set_syscall_result(0);
        assert_eq!(regs.syscall_result(), 0);
        regs.set_arg(ARG_RET, 42);
        assert_eq!(regs.arg(ARG_RET), 42);
    }
}
