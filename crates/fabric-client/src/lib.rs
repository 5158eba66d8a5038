//! `fabric-client`: identity-scoped sessions against a permissioned ledger
//! network.
//!
//! The crate knows about connection profiles, wallets, channels and
//! contracts. It knows nothing about the business data travelling through
//! them.
//!
//! # Architecture
//!
//! ```text
//! ConnectionProfile + Identity
//!     │
//!     ▼
//! Connector        ← transport seam (HttpConnector, or a test fake)
//!     │              discovery happens here
//!     ▼
//! LedgerSession    ← owns one Connection, closed exactly once
//!     │
//!     ▼
//! Channel → Contract → Transaction
//!                       evaluate: public args only
//!                       submit:   public args + transient map
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use fabric_client::{ConnectOptions, ConnectionProfile, FileSystemWallet, HttpConnector, LedgerSession, Wallet};
//!
//! let profile = ConnectionProfile::load("profiles/connection-grantor.json".as_ref())?;
//! let wallet = FileSystemWallet::new("wallet/Grantor");
//! let identity = wallet.get("alice")?.expect("enrolled");
//!
//! let mut session =
//!     LedgerSession::open(&HttpConnector::new(), &profile, &identity, "alice", &ConnectOptions::default()).await?;
//! let contract = session.channel("mychannel")?.contract("research-grant")?;
//! let grants = contract.evaluate("GetAllGrants", &[]).await?;
//! session.close();
//! ```

pub mod connector;
pub mod error;
pub mod http;
pub mod profile;
pub mod session;
pub mod wallet;

pub use connector::{ChannelInfo, ConnectOptions, Connection, Connector, Discovery, Proposal};
pub use error::{strip_framing, FabricError};
pub use http::HttpConnector;
pub use profile::{ConnectionProfile, Endpoint};
pub use session::{Channel, Contract, LedgerSession, Transaction};
pub use wallet::{FileSystemWallet, Identity, Wallet};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, FabricError>;
