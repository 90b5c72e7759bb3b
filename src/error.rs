use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the external collaborators (tracer loop, filesystem
/// helpers). These never cross into the per-syscall handler contract,
/// which stays infallible per spec: a handler either rewrites, emulates a
/// successful return, or passes the syscall through untouched.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("failed to copy {src:?} to {dst:?}: {source}")]
    Copy {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create overlay directory {path:?}: {source}")]
    Mkdir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ptrace({request}) on pid {pid} failed: {source}")]
    Ptrace {
        request: &'static str,
        pid: i32,
        #[source]
        source: nix::Error,
    },

    #[error("waitpid failed: {0}")]
    Wait(#[source] nix::Error),

    #[error("failed to exec traced program {program:?}: {source}")]
    Exec {
        program: String,
        #[source]
        source: nix::Error,
    },

    #[error("fork failed: {0}")]
    Fork(#[source] nix::Error),

    #[error("{0} is not allowed")]
    NotAllowed(String),

    #[error("unsupported: {0}")]
    Unsupported(&'static str),
}

pub type SandboxResult<T> = Result<T, SandboxError>;
