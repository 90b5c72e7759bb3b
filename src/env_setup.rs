//! Environment-variable setup for test harnesses: sets `$SPWD` (the
//! overlay-relative cwd), `$HPWD` (the host cwd) and `$SHOME` (the
//! overlay-relative `$HOME`) in the child before it execs the traced
//! program, mirroring the source's `sbox_setenv`. Out of scope for the
//! core per spec.md, but a runnable binary needs it to support the same
//! test harnesses the original tool does.

use crate::config::Config;
use std::env;

/// Sets `$SPWD`/`$HPWD`/`$SHOME` in the *current* process's environment,
/// intended to run in the forked child right before `execvp`. Never
/// overwrites a variable the parent environment already set.
pub fn setup_test_env(cfg: &Config) {
    let hpwd = match env::current_dir() {
        Ok(p) => p,
        Err(_) => return,
    };
    let hpwd_str = hpwd.to_string_lossy().into_owned();

    if env::var_os("SPWD").is_none() {
        let spwd = cfg.spn_of(&hpwd_str);
        log::debug!(target: "sbox::env", "setenv $SPWD={:?}", spwd);
        env::set_var("SPWD", &spwd);
    }

    if env::var_os("HPWD").is_none() {
        log::debug!(target: "sbox::env", "setenv $HPWD={}", hpwd_str);
        env::set_var("HPWD", &hpwd_str);
    }

    if env::var_os("SHOME").is_none() {
        if let Some(home) = env::var_os("HOME") {
            let home_str = home.to_string_lossy().into_owned();
            let shome = cfg.spn_of(&home_str);
            log::debug!(target: "sbox::env", "setenv $SHOME={:?}", shome);
            env::set_var("SHOME", &shome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn setup_test_env_does_not_override_existing_vars() {
        env::set_var("SPWD", "/already/set");
        let cfg = Config::new(PathBuf::from("/sbx"), false);
        setup_test_env(&cfg);
        assert_eq!(env::var("SPWD").unwrap(), "/already/set");
        env::remove_var("SPWD");
    }
}
