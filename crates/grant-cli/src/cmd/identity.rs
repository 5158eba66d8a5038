use std::path::Path;

use clap::Subcommand;
use grant_core::{validate_identity, IdentityStore, Organization};
use serde_json::json;

use super::{load_config, Overrides};
use crate::output::{print_json, print_table};

#[derive(Subcommand)]
pub enum IdentitySubcommand {
    /// Report whether a user is enrolled in an organization's wallet
    Exists {
        #[arg(long)]
        org: String,
        #[arg(long)]
        user: String,
    },
    /// List the identities enrolled in an organization's wallet
    List {
        #[arg(long)]
        org: String,
    },
}

pub fn run(
    root: &Path,
    overrides: &Overrides,
    subcommand: IdentitySubcommand,
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config(root, overrides)?;
    let store = IdentityStore::new(config.wallet_root(root));
    match subcommand {
        IdentitySubcommand::Exists { org, user } => exists(&store, &org, &user, json),
        IdentitySubcommand::List { org } => list(&store, &org, json),
    }
}

fn exists(store: &IdentityStore, org: &str, user: &str, json: bool) -> anyhow::Result<()> {
    let org: Organization = org.parse()?;
    validate_identity(user)?;
    let found = store.exists(org, user);
    if json {
        print_json(&json!({ "org": org, "userId": user, "exists": found }))
    } else {
        println!("{}", if found { "yes" } else { "no" });
        Ok(())
    }
}

fn list(store: &IdentityStore, org: &str, json: bool) -> anyhow::Result<()> {
    let org: Organization = org.parse()?;
    let users = store.list(org)?;
    if json {
        return print_json(&json!({ "org": org, "identities": users }));
    }
    if users.is_empty() {
        println!("no identities enrolled in the {org} wallet");
        return Ok(());
    }
    let rows = users
        .into_iter()
        .map(|user| vec![user, org.to_string()])
        .collect();
    print_table(&["USER", "ORGANIZATION"], rows);
    Ok(())
}
