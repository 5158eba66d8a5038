pub mod channel;
pub mod grants;
pub mod identities;
pub mod operations;

use serde::Deserialize;

/// `?org=..&userId=..`: who a read is performed as.
#[derive(Debug, Deserialize)]
pub struct ActorQuery {
    pub org: String,
    #[serde(rename = "userId", alias = "user_id")]
    pub user_id: String,
}
