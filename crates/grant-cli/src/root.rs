use std::path::{Path, PathBuf};

use grant_core::config::CONFIG_FILE;

/// Resolve the gateway root directory.
///
/// Priority:
/// 1. `--root` flag / `GRANT_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `gateway.yaml`
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_upward(&cwd).unwrap_or(cwd)
}

fn find_upward(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE).is_file())
        .map(Path::to_path_buf)
}
