use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GrantError, Result};
use crate::organization::Organization;
use crate::payload::{
    require, AwardeeAddition, GrantAssignment, GrantDetails, ProgressEntry, ReimbursementRequest,
    SubawardeeAddition,
};

// ---------------------------------------------------------------------------
// OperationKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Read-only evaluation against one peer.
    Query,
    /// Endorsed, ordered and committed write.
    Submit,
}

// ---------------------------------------------------------------------------
// GrantOperation
// ---------------------------------------------------------------------------

/// Every ledger operation the gateway can perform, with its typed inputs.
///
/// Serialized as `{"operation": "<Name>", ...fields}`. Payload-carrying
/// submits put their private record under `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation")]
pub enum GrantOperation {
    InitiateGrant {
        data: GrantDetails,
    },
    AssignGrant {
        data: GrantAssignment,
    },
    AcceptGrant {
        #[serde(alias = "id")]
        grant_id: String,
    },
    RejectGrant {
        #[serde(alias = "id")]
        grant_id: String,
    },
    RevokeGrant {
        #[serde(alias = "id")]
        grant_id: String,
    },
    UpdateGrant {
        data: GrantDetails,
    },
    RequestReimbursement {
        data: ReimbursementRequest,
    },
    AcceptReimbursement {
        grant_id: String,
        payment_id: String,
    },
    RejectReimbursement {
        grant_id: String,
        payment_id: String,
        #[serde(default)]
        message: String,
    },
    RedeemTokens {
        grant_id: String,
        payment_id: String,
    },
    AcceptRedeem {
        grant_id: String,
        payment_id: String,
    },
    RejectRedeem {
        grant_id: String,
        payment_id: String,
        #[serde(default)]
        message: String,
    },
    AddAwardee {
        data: AwardeeAddition,
    },
    AddSubawardee {
        data: SubawardeeAddition,
    },
    AddProgress {
        data: ProgressEntry,
    },
    DeleteGrant {
        #[serde(alias = "id")]
        grant_id: String,
    },

    ReadGrant {
        #[serde(alias = "id")]
        grant_id: String,
    },
    GetAllGrants,
    GetAllGrantsUser,
    GetAllApprovedGrants,
    GetGrantsByStatus {
        status: String,
    },
    GetGrantBenefits {
        grant_id: String,
    },
    GetPayments {
        grant_id: String,
    },
    /// `status` is handed to the chaincode JSON-encoded.
    GetPaymentByStatus {
        status: Value,
    },
    GetPaymentByStatusForAllGrants {
        status: Vec<String>,
    },
    GetPaymentByAwardee {
        grant_id: String,
        awardee_id: String,
    },
    GetProgress {
        grant_id: String,
    },
    GetRemainingAmount {
        grant_id: String,
    },
    GetWallet {
        grant_id: String,
        awardee_id: String,
        status: String,
    },
    MyWallet {
        grant_id: String,
    },
}

/// The identity an operation hands responsibility to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counterparty<'a> {
    pub organization: &'a str,
    pub user_id: &'a str,
}

impl GrantOperation {
    /// Chaincode function name.
    pub fn name(&self) -> &'static str {
        use GrantOperation::*;
        match self {
            InitiateGrant { .. } => "InitiateGrant",
            AssignGrant { .. } => "AssignGrant",
            AcceptGrant { .. } => "AcceptGrant",
            RejectGrant { .. } => "RejectGrant",
            RevokeGrant { .. } => "RevokeGrant",
            UpdateGrant { .. } => "UpdateGrant",
            RequestReimbursement { .. } => "RequestReimbursement",
            AcceptReimbursement { .. } => "AcceptReimbursement",
            RejectReimbursement { .. } => "RejectReimbursement",
            RedeemTokens { .. } => "RedeemTokens",
            AcceptRedeem { .. } => "AcceptRedeem",
            RejectRedeem { .. } => "RejectRedeem",
            AddAwardee { .. } => "AddAwardee",
            AddSubawardee { .. } => "AddSubawardee",
            AddProgress { .. } => "AddProgress",
            DeleteGrant { .. } => "DeleteGrant",
            ReadGrant { .. } => "ReadGrant",
            GetAllGrants => "GetAllGrants",
            GetAllGrantsUser => "GetAllGrantsUser",
            GetAllApprovedGrants => "GetAllApprovedGrants",
            GetGrantsByStatus { .. } => "GetGrantsByStatus",
            GetGrantBenefits { .. } => "GetGrantBenefits",
            GetPayments { .. } => "GetPayments",
            GetPaymentByStatus { .. } => "GetPaymentByStatus",
            GetPaymentByStatusForAllGrants { .. } => "GetPaymentByStatusForAllGrants",
            GetPaymentByAwardee { .. } => "GetPaymentByAwardee",
            GetProgress { .. } => "GetProgress",
            GetRemainingAmount { .. } => "GetRemainingAmount",
            GetWallet { .. } => "GetWallet",
            MyWallet { .. } => "MyWallet",
        }
    }

    pub fn kind(&self) -> OperationKind {
        use GrantOperation::*;
        match self {
            InitiateGrant { .. }
            | AssignGrant { .. }
            | AcceptGrant { .. }
            | RejectGrant { .. }
            | RevokeGrant { .. }
            | UpdateGrant { .. }
            | RequestReimbursement { .. }
            | AcceptReimbursement { .. }
            | RejectReimbursement { .. }
            | RedeemTokens { .. }
            | AcceptRedeem { .. }
            | RejectRedeem { .. }
            | AddAwardee { .. }
            | AddSubawardee { .. }
            | AddProgress { .. }
            | DeleteGrant { .. } => OperationKind::Submit,
            _ => OperationKind::Query,
        }
    }

    /// Ordered arguments recorded in clear on the ledger.
    pub fn public_args(&self, acting_identity: &str) -> Result<Vec<String>> {
        use GrantOperation::*;
        let args = match self {
            InitiateGrant { .. }
            | AssignGrant { .. }
            | UpdateGrant { .. }
            | RequestReimbursement { .. }
            | AddAwardee { .. }
            | AddSubawardee { .. }
            | AddProgress { .. }
            | GetAllGrants
            | GetAllGrantsUser
            | GetAllApprovedGrants => vec![],
            RevokeGrant { grant_id } => vec![grant_id.clone(), acting_identity.to_string()],
            AcceptGrant { grant_id }
            | RejectGrant { grant_id }
            | DeleteGrant { grant_id }
            | ReadGrant { grant_id }
            | GetGrantBenefits { grant_id }
            | GetPayments { grant_id }
            | GetProgress { grant_id }
            | GetRemainingAmount { grant_id }
            | MyWallet { grant_id } => vec![grant_id.clone()],
            AcceptReimbursement {
                grant_id,
                payment_id,
            }
            | RedeemTokens {
                grant_id,
                payment_id,
            }
            | AcceptRedeem {
                grant_id,
                payment_id,
            } => vec![grant_id.clone(), payment_id.clone()],
            RejectReimbursement {
                grant_id,
                payment_id,
                message,
            }
            | RejectRedeem {
                grant_id,
                payment_id,
                message,
            } => vec![grant_id.clone(), payment_id.clone(), message.clone()],
            GetGrantsByStatus { status } => vec![status.clone()],
            GetPaymentByStatus { status } => vec![serde_json::to_string(status)?],
            GetPaymentByStatusForAllGrants { status } => vec![serde_json::to_string(status)?],
            GetPaymentByAwardee {
                grant_id,
                awardee_id,
            } => vec![grant_id.clone(), awardee_id.clone()],
            GetWallet {
                grant_id,
                awardee_id,
                status,
            } => vec![grant_id.clone(), awardee_id.clone(), status.clone()],
        };
        Ok(args)
    }

    /// Transient map entries. Empty for queries and id-only submits.
    pub fn private_args(&self) -> Result<BTreeMap<String, Vec<u8>>> {
        use GrantOperation::*;
        let (key, bytes) = match self {
            InitiateGrant { data } => ("grant", serde_json::to_vec(data)?),
            AssignGrant { data } => ("assign_grant", serde_json::to_vec(data)?),
            UpdateGrant { data } => ("update_grant", serde_json::to_vec(data)?),
            RequestReimbursement { data } => ("request_reimbursement", serde_json::to_vec(data)?),
            AddAwardee { data } => ("add_awardee", serde_json::to_vec(data)?),
            AddSubawardee { data } => ("add_subawardee", serde_json::to_vec(data)?),
            AddProgress { data } => ("add_progress", serde_json::to_vec(data)?),
            _ => return Ok(BTreeMap::new()),
        };
        Ok(BTreeMap::from([(key.to_string(), bytes)]))
    }

    /// Identity that must already be enrolled before this operation may run.
    pub fn counterparty(&self) -> Option<Counterparty<'_>> {
        let awardee = match self {
            GrantOperation::AssignGrant { data } => data.awardee.first()?,
            GrantOperation::AddAwardee { data } => &data.awardee,
            GrantOperation::AddSubawardee { data } => &data.awardee,
            _ => return None,
        };
        Some(Counterparty {
            organization: &awardee.organization,
            user_id: &awardee.id,
        })
    }

    /// Structural checks only. Business rules belong to the chaincode.
    pub fn validate(&self) -> Result<()> {
        use GrantOperation::*;
        match self {
            InitiateGrant { data } => data.validate(),
            UpdateGrant { data } => {
                require("ID", &data.id)?;
                data.validate()
            }
            AssignGrant { data } => data.validate(),
            RequestReimbursement { data } => data.validate(),
            AddAwardee { data } => data.validate(),
            AddSubawardee { data } => data.validate(),
            AddProgress { data } => data.validate(),
            AcceptGrant { grant_id }
            | RejectGrant { grant_id }
            | RevokeGrant { grant_id }
            | DeleteGrant { grant_id }
            | ReadGrant { grant_id }
            | GetGrantBenefits { grant_id }
            | GetPayments { grant_id }
            | GetProgress { grant_id }
            | GetRemainingAmount { grant_id }
            | MyWallet { grant_id } => require("grant_id", grant_id),
            AcceptReimbursement {
                grant_id,
                payment_id,
            }
            | RedeemTokens {
                grant_id,
                payment_id,
            }
            | AcceptRedeem {
                grant_id,
                payment_id,
            }
            | RejectReimbursement {
                grant_id,
                payment_id,
                ..
            }
            | RejectRedeem {
                grant_id,
                payment_id,
                ..
            } => {
                require("grant_id", grant_id)?;
                require("payment_id", payment_id)
            }
            GetPaymentByAwardee {
                grant_id,
                awardee_id,
            } => {
                require("grant_id", grant_id)?;
                require("awardee_id", awardee_id)
            }
            GetWallet {
                grant_id,
                awardee_id,
                ..
            } => {
                require("grant_id", grant_id)?;
                require("awardee_id", awardee_id)
            }
            GetGrantsByStatus { status } => require("status", status),
            GetPaymentByStatus { .. }
            | GetPaymentByStatusForAllGrants { .. }
            | GetAllGrants
            | GetAllGrantsUser
            | GetAllApprovedGrants => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// OperationRequest
// ---------------------------------------------------------------------------

static IDENTITY_RE: OnceLock<Regex> = OnceLock::new();

fn identity_re() -> &'static Regex {
    IDENTITY_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._@-]{0,127}$").unwrap())
}

/// Identity names become wallet file names, so they are held to a safe
/// alphabet.
pub fn validate_identity(user_id: &str) -> Result<()> {
    if !identity_re().is_match(user_id) {
        return Err(GrantError::InvalidIdentity(user_id.to_string()));
    }
    Ok(())
}

/// One unit of work for the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest {
    pub organization: Organization,
    pub acting_identity: String,
    pub operation: GrantOperation,
}

/// What actually goes to the ledger for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerCall {
    pub kind: OperationKind,
    pub name: &'static str,
    pub public_args: Vec<String>,
    pub private_args: BTreeMap<String, Vec<u8>>,
}

impl OperationRequest {
    pub fn new(
        organization: Organization,
        acting_identity: impl Into<String>,
        operation: GrantOperation,
    ) -> Self {
        OperationRequest {
            organization,
            acting_identity: acting_identity.into(),
            operation,
        }
    }

    /// Build from raw caller input. Unknown organizations fail here, before
    /// anything else happens.
    pub fn parse(
        organization: &str,
        acting_identity: impl Into<String>,
        operation: GrantOperation,
    ) -> Result<Self> {
        Ok(Self::new(organization.parse()?, acting_identity, operation))
    }

    pub fn validate(&self) -> Result<()> {
        validate_identity(&self.acting_identity)?;
        self.operation.validate()?;
        if let Some(cp) = self.operation.counterparty() {
            cp.organization.parse::<Organization>()?;
            validate_identity(cp.user_id)?;
        }
        Ok(())
    }

    pub fn ledger_call(&self) -> Result<LedgerCall> {
        let kind = self.operation.kind();
        let private_args = match kind {
            OperationKind::Submit => self.operation.private_args()?,
            OperationKind::Query => BTreeMap::new(),
        };
        Ok(LedgerCall {
            kind,
            name: self.operation.name(),
            public_args: self.operation.public_args(&self.acting_identity)?,
            private_args,
        })
    }
}
