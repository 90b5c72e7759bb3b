//! The tracer loop: out of scope for the core per spec.md's Purpose &
//! Scope section, but named there as the collaborator that attaches to
//! the child, stops it on every syscall boundary, and dispatches by
//! syscall number. This is the concrete "fork, `PTRACE_TRACEME`, exec,
//! then alternate entry/exit stops" loop the source's `main()` runs.

use crate::config::Config;
use crate::context::SandboxContext;
use crate::dispatch;
use crate::env_setup;
use crate::error::{SandboxError, SandboxResult};
use crate::tracee::TraceeContext;
use nix::sys::ptrace;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{execvp, fork, ForkResult, Pid};
use std::ffi::CString;

/// Forks, `PTRACE_TRACEME`s and `execvp`s `program` in the child, with
/// `$SPWD`/`$HPWD`/`$SHOME` set per `env_setup::setup_test_env` first.
/// The parent waits for the initial `SIGTRAP` `PTRACE_TRACEME` delivers
/// on exec and arms `PTRACE_O_TRACESYSGOOD` so syscall stops can be told
/// apart from ordinary signal stops.
pub fn spawn_traced(program: &str, args: &[String], cfg: &Config) -> SandboxResult<Pid> {
    let prog_c = CString::new(program).expect("program name contains a NUL byte");
    let mut argv = vec![prog_c.clone()];
    argv.extend(
        args.iter()
            .map(|a| CString::new(a.as_str()).expect("argument contains a NUL byte")),
    );

    match unsafe { fork() }.map_err(SandboxError::Fork)? {
        ForkResult::Child => {
            ptrace::traceme().expect("PTRACE_TRACEME failed in traced child");
            env_setup::setup_test_env(cfg);
            let _ = execvp(&prog_c, &argv);
            // execvp only returns on failure.
            std::process::exit(127);
        }
        ForkResult::Parent { child } => {
            waitpid(child, None).map_err(SandboxError::Wait)?;
            ptrace::setoptions(child, ptrace::Options::PTRACE_O_TRACESYSGOOD).map_err(|source| {
                SandboxError::Ptrace {
                    request: "PTRACE_SETOPTIONS",
                    pid: child.as_raw(),
                    source,
                }
            })?;
            Ok(child)
        }
    }
}

fn resume(pid: Pid) -> SandboxResult<()> {
    ptrace::syscall(pid, None).map_err(|source| SandboxError::Ptrace {
        request: "PTRACE_SYSCALL",
        pid: pid.as_raw(),
        source,
    })
}

/// Runs the entry/exit syscall-stop loop for `pid` until it exits,
/// dispatching every intercepted syscall into `dispatch::on_entry` /
/// `dispatch::on_exit` and restoring any hijacked argument registers
/// before resuming past the matching exit stop (SPEC_FULL.md's ordering
/// guarantee: the tracee never observes a hijacked register). Returns
/// the child's exit code, or `128 + signal` if it died from a signal.
pub fn run(pid: Pid, ctx: &mut SandboxContext) -> SandboxResult<i32> {
    resume(pid)?;

    let mut entry: Option<TraceeContext> = None;

    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(code),
            Ok(WaitStatus::Signaled(_, sig, _)) => return Ok(128 + sig as i32),
            Ok(WaitStatus::PtraceSyscall(_)) => {
                match entry.take() {
                    None => {
                        let mut tcp = TraceeContext::fetch(pid)?;
                        let sysno = tcp.regs.syscallno();
                        if dispatch::is_intercepted(sysno) {
                            dispatch::on_entry(sysno, &mut tcp, ctx)?;
                        }
                        entry = Some(tcp);
                    }
                    Some(mut tcp) => {
                        tcp.refresh_exit()?;
                        let sysno = tcp.regs.syscallno();
                        if dispatch::is_intercepted(sysno) {
                            dispatch::on_exit(sysno, &mut tcp, ctx)?;
                        }
                        tcp.restore_hijack()?;
                    }
                }
                resume(pid)?;
            }
            Ok(WaitStatus::Stopped(_, sig)) => {
                // An ordinary signal stop (not a syscall stop): pass the
                // signal through to the tracee on resume.
                ptrace::syscall(pid, Some(sig)).map_err(|source| SandboxError::Ptrace {
                    request: "PTRACE_SYSCALL",
                    pid: pid.as_raw(),
                    source,
                })?;
            }
            Ok(_) => resume(pid)?,
            Err(source) => return Err(SandboxError::Wait(source)),
        }
    }
}
