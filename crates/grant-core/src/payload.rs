//! Private payloads delivered to the chaincode through the transient map.
//!
//! Field names match what the chaincode unmarshals (`ID`, `grant_id`,
//! `awardee_id`, ...). Fields the gateway does not model are kept in `extra`
//! and forwarded untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{GrantError, Result};

// ---------------------------------------------------------------------------
// Shared records
// ---------------------------------------------------------------------------

/// An awardee or sub-awardee attached to a grant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardeeRecord {
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub contact: String,
    /// Enrollment id of the awardee's user in its organization's wallet.
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub principal_investigator: String,
    /// Organization name or MSP id (`Awardee`, `SubawardeeMSP`).
    pub organization: String,
    #[serde(default)]
    pub awardee_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benefit {
    pub benefit: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default)]
    pub notes: String,
    pub percentage: String,
}

// ---------------------------------------------------------------------------
// Operation payloads
// ---------------------------------------------------------------------------

/// Grant terms for `InitiateGrant` and `UpdateGrant`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantDetails {
    #[serde(rename = "ID", default)]
    pub id: String,
    pub amount: f64,
    #[serde(default)]
    pub awardee: Vec<AwardeeRecord>,
    #[serde(default)]
    pub benefit: Vec<Benefit>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub payment_type: String,
    #[serde(default)]
    pub progress_freq: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantAssignment {
    pub grant_id: String,
    pub awardee: Vec<AwardeeRecord>,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReimbursementRequest {
    #[serde(rename = "ID")]
    pub id: String,
    pub grant_id: String,
    pub awardee_id: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub item: Vec<Benefit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardeeAddition {
    pub grant_id: String,
    pub awardee: AwardeeRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubawardeeAddition {
    pub grant_id: String,
    /// The awardee the sub-award is placed under.
    pub awardee_id: String,
    pub awardee: AwardeeRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub grant_id: String,
    pub progress: Progress,
}

// ---------------------------------------------------------------------------
// Structural checks
// ---------------------------------------------------------------------------

pub(crate) fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GrantError::InvalidPayload(format!("'{field}' must not be empty")));
    }
    Ok(())
}

impl AwardeeRecord {
    fn validate(&self, field: &str) -> Result<()> {
        require(&format!("{field}.id"), &self.id)?;
        require(&format!("{field}.organization"), &self.organization)
    }
}

impl GrantDetails {
    pub fn validate(&self) -> Result<()> {
        for (i, a) in self.awardee.iter().enumerate() {
            a.validate(&format!("awardee[{i}]"))?;
        }
        Ok(())
    }
}

impl GrantAssignment {
    pub fn validate(&self) -> Result<()> {
        require("grant_id", &self.grant_id)?;
        if self.awardee.is_empty() {
            return Err(GrantError::InvalidPayload(
                "assignment names no awardee".into(),
            ));
        }
        for (i, a) in self.awardee.iter().enumerate() {
            a.validate(&format!("awardee[{i}]"))?;
        }
        Ok(())
    }
}

impl ReimbursementRequest {
    pub fn validate(&self) -> Result<()> {
        require("ID", &self.id)?;
        require("grant_id", &self.grant_id)?;
        require("awardee_id", &self.awardee_id)
    }
}

impl AwardeeAddition {
    pub fn validate(&self) -> Result<()> {
        require("grant_id", &self.grant_id)?;
        self.awardee.validate("awardee")
    }
}

impl SubawardeeAddition {
    pub fn validate(&self) -> Result<()> {
        require("grant_id", &self.grant_id)?;
        require("awardee_id", &self.awardee_id)?;
        self.awardee.validate("awardee")
    }
}

impl ProgressEntry {
    pub fn validate(&self) -> Result<()> {
        require("grant_id", &self.grant_id)?;
        require("progress.percentage", &self.progress.percentage)
    }
}
