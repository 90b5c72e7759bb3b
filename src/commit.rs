//! Interactive commit UI: after the traced child exits, walks every
//! regular file under the overlay and offers to commit it back onto the
//! host (`_sbox_interactive_menu` in the source), diff it against the
//! host file first, ignore it, or quit. Out of scope for the core per
//! spec.md, but named as an external collaborator the binary still has
//! to provide.

use crate::config::Config;
use crate::fsutil::copyfile;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

const MENU: &str = "[C]:commit all, [c]:commit, [i]:ignore, [d]:diff, [q]:quit";

/// Walks the overlay tree printing every shadow file, then runs the
/// interactive menu over the same listing.
pub fn run(cfg: &Config) -> io::Result<()> {
    let files = collect_files(cfg.root())?;

    println!("{}:", cfg.root().display());
    for spn in &files {
        println!(" > F: {}", spn.display());
    }

    let mut commit_all = false;
    for spn in &files {
        let hpn = PathBuf::from(strip_root_str(cfg, spn));
        commit_all = prompt_one(spn, &hpn, commit_all)?;
    }
    Ok(())
}

fn strip_root_str(cfg: &Config, spn: &Path) -> String {
    let spn_str = spn.to_string_lossy();
    cfg.strip_root(&spn_str).to_owned()
}

/// Recursively lists every regular file under `root`, skipping `.`/`..`.
fn collect_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    walk(root, &mut out)?;
    Ok(out)
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

/// Drives the menu for a single overlay file `spn`, whose host
/// counterpart is `hpn`. Returns the (possibly updated) "commit all"
/// latch.
fn prompt_one(spn: &Path, hpn: &Path, commit_all: bool) -> io::Result<bool> {
    if commit_all {
        commit(spn, hpn)?;
        return Ok(true);
    }

    loop {
        println!("F:{}", hpn.display());
        match prompt(MENU)? {
            'C' => {
                commit(spn, hpn)?;
                return Ok(true);
            }
            'c' => {
                commit(spn, hpn)?;
                return Ok(false);
            }
            'i' => return Ok(false),
            'd' => {
                diff(spn, hpn)?;
            }
            'q' => std::process::exit(0),
            _ => {}
        }
    }
}

fn commit(spn: &Path, hpn: &Path) -> io::Result<()> {
    println!("  > Commiting {}", hpn.display());
    copyfile(spn, hpn).map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}

fn diff(spn: &Path, hpn: &Path) -> io::Result<()> {
    Command::new("diff").arg("-urN").arg(spn).arg(hpn).status()?;
    Ok(())
}

fn prompt(menu: &str) -> io::Result<char> {
    print!(" {} ? > ", menu);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    println!();
    Ok(line.trim().chars().next().unwrap_or('i'))
}
