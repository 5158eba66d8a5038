//! `grant-core`: research-grant operations over an identity-scoped ledger
//! session.
//!
//! [`Orchestrator::perform_operation`] is the single entry point used by the
//! HTTP server and the CLI. It takes an [`OperationRequest`] (organization,
//! acting identity, typed [`GrantOperation`]) and returns a [`Reply`]:
//!
//! - `Submitted({status})` / `Submitted({status: "error", message})` for
//!   state-changing operations,
//! - `Queried(json)` for reads,
//! - `CounterpartyMissing` when the identity an operation assigns
//!   responsibility to is not enrolled.

pub mod config;
pub mod error;
pub mod identity;
pub mod operation;
pub mod orchestrator;
pub mod organization;
pub mod payload;
pub mod reply;
pub mod resolver;
pub mod validator;

pub use config::{ConfigWarning, GatewayConfig};
pub use error::{GrantError, Result};
pub use identity::IdentityStore;
pub use operation::{
    validate_identity, Counterparty, GrantOperation, LedgerCall, OperationKind, OperationRequest,
};
pub use orchestrator::Orchestrator;
pub use organization::Organization;
pub use reply::{OperationResult, Reply};
pub use resolver::ProfileResolver;
pub use validator::WorkflowValidator;
