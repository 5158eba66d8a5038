use std::path::Path;

use clap::Subcommand;

use super::{load_config, Overrides};
use crate::output::print_json;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    Show,
    /// Check the configuration for common mistakes
    Validate,
}

pub fn run(
    root: &Path,
    overrides: &Overrides,
    subcommand: ConfigSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config(root, overrides)?;
    match subcommand {
        ConfigSubcommand::Show => {
            if json {
                print_json(&config)
            } else {
                print!("{}", serde_yaml::to_string(&config)?);
                Ok(())
            }
        }
        ConfigSubcommand::Validate => {
            let warnings = config.validate(root);
            if json {
                return print_json(&warnings);
            }
            if warnings.is_empty() {
                println!("config ok");
            }
            for w in &warnings {
                println!("warning: {}", w.message);
            }
            Ok(())
        }
    }
}
