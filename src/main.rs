mod cli;
mod commit;
mod config;
mod context;
mod dispatch;
mod env_setup;
mod error;
mod fsutil;
mod getdents;
mod handlers;
mod overlay;
mod path_resolver;
mod policy;
mod registers;
mod tombstone;
mod tracee;
mod tracer;

use std::path::PathBuf;
use structopt::StructOpt;

fn main() {
    env_logger::init();

    let opt = cli::Opt::from_args();
    let root = canonicalize_root(&opt.root);
    let config = config::Config::new(root, opt.interactive);
    let mut ctx = context::SandboxContext::new(config);

    let program = opt.program().to_owned();
    let args = opt.args().to_vec();

    let pid = match tracer::spawn_traced(&program, &args, &ctx.config) {
        Ok(pid) => pid,
        Err(e) => {
            eprintln!("sboxfs: failed to launch {:?}: {}", program, e);
            std::process::exit(1);
        }
    };

    let exit_code = match tracer::run(pid, &mut ctx) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("sboxfs: tracer loop failed: {}", e);
            std::process::exit(1);
        }
    };

    if ctx.config.interactive {
        if let Err(e) = commit::run(&ctx.config) {
            eprintln!("sboxfs: interactive commit failed: {}", e);
        }
    }

    std::process::exit(exit_code);
}

/// The overlay root must be an absolute, existing directory: every SPN
/// is byte-concatenated onto it, so a relative or non-canonical root
/// would make `is_in_sboxfs`'s prefix test meaningless.
fn canonicalize_root(root: &std::path::Path) -> PathBuf {
    match std::fs::canonicalize(root) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("sboxfs: overlay root {:?} is not usable: {}", root, e);
            std::process::exit(1);
        }
    }
}
