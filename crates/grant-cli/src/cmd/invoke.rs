use std::path::Path;

use anyhow::{bail, Context};
use grant_core::{GrantOperation, OperationRequest, Reply};

use super::{orchestrator, runtime, Overrides};
use crate::output::print_json;

pub fn run(
    root: &Path,
    overrides: &Overrides,
    org: &str,
    user: &str,
    operation: &str,
    json: bool,
) -> anyhow::Result<()> {
    let operation: GrantOperation =
        serde_json::from_str(operation).context("invalid operation JSON")?;
    let name = operation.name();
    let request = OperationRequest::parse(org, user, operation)?;

    let orchestrator = orchestrator(root, overrides)?;
    let reply = runtime()?.block_on(orchestrator.perform_operation(&request))?;

    if json {
        print_json(&reply)?;
    } else {
        print_human(&reply)?;
    }

    match &reply {
        Reply::Submitted(result) if result.is_error() => {
            bail!("{name} was not committed")
        }
        Reply::CounterpartyMissing => bail!("{name} not sent: counterparty is not enrolled"),
        _ => Ok(()),
    }
}

fn print_human(reply: &Reply) -> anyhow::Result<()> {
    match reply {
        Reply::Submitted(result) => match &result.message {
            Some(message) if result.is_error() => println!("rejected: {message}"),
            _ => println!("status: {}", result.status),
        },
        Reply::Queried(value) => print_json(value)?,
        Reply::CounterpartyMissing => println!("false"),
    }
    Ok(())
}
