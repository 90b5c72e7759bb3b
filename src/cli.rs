//! Command-line surface: overlay root, interactive-commit flag, and the
//! traced program plus its arguments. Not part of the core per spec.md
//! §6 ("No CLI surface is part of the core"), but a runnable binary
//! needs one.

use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "sboxfs",
    about = "Ptrace-based filesystem overlay sandbox for tracing a child process"
)]
pub struct Opt {
    /// Overlay directory every mutating filesystem syscall is
    /// redirected into.
    #[structopt(short = "r", long = "root")]
    pub root: PathBuf,

    /// After the traced program exits, walk the overlay and interactively
    /// offer to commit each changed file back onto the host.
    #[structopt(short, long)]
    pub interactive: bool,

    /// Program to trace, followed by its own arguments.
    #[structopt(required = true)]
    pub command: Vec<String>,
}

impl Opt {
    pub fn program(&self) -> &str {
        &self.command[0]
    }

    pub fn args(&self) -> &[String] {
        &self.command[1..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_root_interactive_and_command() {
        let opt = Opt::from_iter(&[
            "sboxfs",
            "--root",
            "/sbx",
            "--interactive",
            "--",
            "ls",
            "-la",
        ]);
        assert_eq!(opt.root, PathBuf::from("/sbx"));
        assert!(opt.interactive);
        assert_eq!(opt.program(), "ls");
        assert_eq!(opt.args(), ["-la"]);
    }
}
