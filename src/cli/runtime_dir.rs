//! Location of per-user runtime files (control socket, PID file)

use std::env;
use std::path::PathBuf;

/// `$XDG_RUNTIME_DIR/<name>`, or the temp dir when no runtime dir is set
pub fn runtime_file(name: &str) -> PathBuf {
    env::var_os("XDG_RUNTIME_DIR")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(env::temp_dir)
        .join(name)
}
