use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use fabric_client::ConnectionProfile;

use crate::config::GatewayConfig;
use crate::error::{GrantError, Result};
use crate::organization::Organization;

/// Organization → connection profile, loaded once and shared read-only.
pub struct ProfileResolver {
    paths: HashMap<Organization, PathBuf>,
    cache: RwLock<HashMap<Organization, Arc<ConnectionProfile>>>,
}

impl ProfileResolver {
    pub fn new(root: &std::path::Path, config: &GatewayConfig) -> Self {
        let paths = Organization::all()
            .iter()
            .map(|org| (*org, config.profile_path(root, *org)))
            .collect();
        ProfileResolver {
            paths,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn resolve(&self, org: Organization) -> Result<Arc<ConnectionProfile>> {
        if let Some(profile) = self.read_cache()?.get(&org) {
            return Ok(Arc::clone(profile));
        }

        let path = self
            .paths
            .get(&org)
            .ok_or_else(|| GrantError::UnknownOrganization(org.to_string()))?;
        let profile = Arc::new(ConnectionProfile::load(path)?);
        tracing::debug!(%org, path = %path.display(), "connection profile loaded");

        let mut cache = self
            .cache
            .write()
            .map_err(|_| GrantError::ProfileUnavailable("profile cache poisoned".into()))?;
        Ok(Arc::clone(cache.entry(org).or_insert(profile)))
    }

    pub fn path(&self, org: Organization) -> Option<&PathBuf> {
        self.paths.get(&org)
    }

    fn read_cache(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<Organization, Arc<ConnectionProfile>>>> {
        self.cache
            .read()
            .map_err(|_| GrantError::ProfileUnavailable("profile cache poisoned".into()))
    }
}
