use std::path::Path;

use clap::Subcommand;
use grant_core::{Organization, ProfileResolver};

use super::{load_config, Overrides};
use crate::output::{print_json, print_table};

#[derive(Subcommand)]
pub enum ProfileSubcommand {
    /// Show the connection profile an organization connects with
    Show {
        #[arg(long)]
        org: String,
    },
}

pub fn run(
    root: &Path,
    overrides: &Overrides,
    subcommand: ProfileSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    match subcommand {
        ProfileSubcommand::Show { org } => show(root, overrides, &org, json),
    }
}

fn show(root: &Path, overrides: &Overrides, org: &str, json: bool) -> anyhow::Result<()> {
    let org: Organization = org.parse()?;
    let config = load_config(root, overrides)?;
    let resolver = ProfileResolver::new(root, &config);
    let profile = resolver.resolve(org)?;

    if json {
        return print_json(profile.as_ref());
    }

    if let Some(path) = resolver.path(org) {
        println!("Profile:      {} ({})", profile.name, path.display());
    }
    let msp = profile
        .client_organization()
        .map(|o| o.mspid.as_str())
        .unwrap_or("-");
    println!("Client MSP:   {msp}");
    println!(
        "Discovery:    {}{}",
        if config.discovery.enabled { "on" } else { "off" },
        if config.discovery.as_localhost {
            " (as localhost)"
        } else {
            ""
        }
    );
    println!();

    let rows = profile
        .gateway_peers()
        .into_iter()
        .map(|(name, endpoint)| {
            let url = endpoint
                .http_url(config.discovery.as_localhost)
                .unwrap_or_else(|e| e.to_string());
            vec![name.to_string(), endpoint.url.clone(), url]
        })
        .collect();
    print_table(&["PEER", "URL", "GATEWAY"], rows);
    Ok(())
}
