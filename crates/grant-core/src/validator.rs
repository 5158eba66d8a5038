use crate::identity::IdentityStore;
use crate::organization::Organization;

/// Checks that an identity receiving responsibility is enrolled before any
/// session is opened on its behalf.
pub struct WorkflowValidator<'a> {
    identities: &'a IdentityStore,
}

impl<'a> WorkflowValidator<'a> {
    pub fn new(identities: &'a IdentityStore) -> Self {
        WorkflowValidator { identities }
    }

    pub fn ensure_counterparty_exists(&self, org: Organization, user_id: &str) -> bool {
        self.identities.exists(org, user_id)
    }
}
