use std::path::Path;

use grant_server::AppState;

use super::{load_config, runtime, Overrides};

pub fn run(root: &Path, overrides: &Overrides, port: Option<u16>) -> anyhow::Result<()> {
    let config = load_config(root, overrides)?;
    for warning in config.validate(root) {
        tracing::warn!("{}", warning.message);
    }
    let port = port.unwrap_or(config.server.port);
    let state = AppState::for_root(root.to_path_buf(), config);

    runtime()?.block_on(grant_server::serve(state, port))
}
