use std::path::Path;

use grant_core::Organization;

use super::{orchestrator, runtime, Overrides};
use crate::output::print_json;

pub fn run(
    root: &Path,
    overrides: &Overrides,
    org: &str,
    user: &str,
    json: bool,
) -> anyhow::Result<()> {
    let org: Organization = org.parse()?;
    let orchestrator = orchestrator(root, overrides)?;
    let msp_ids = runtime()?.block_on(orchestrator.channel_msp_ids(org, user))?;

    if json {
        print_json(&msp_ids)?;
    } else {
        for id in &msp_ids {
            println!("{id}");
        }
    }
    Ok(())
}
