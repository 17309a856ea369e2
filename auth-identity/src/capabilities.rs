// Capability resolution, computed once per authenticated request
use async_trait::async_trait;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::error::Result;
use crate::models::Account;

const WILDCARD: &str = "*";

/// Resolved capabilities of one account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapabilitySet {
    capabilities: BTreeSet<String>,
}

impl CapabilitySet {
    pub fn new<I, S>(capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            capabilities: capabilities.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows(&self, capability: &str) -> bool {
        self.capabilities.contains(WILDCARD) || self.capabilities.contains(capability)
    }

    pub fn allows_all(&self, required: &[&str]) -> bool {
        required.iter().all(|capability| self.allows(capability))
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.capabilities.iter().map(String::as_str)
    }
}

#[async_trait]
pub trait PermissionResolver: Send + Sync {
    async fn resolve(&self, account: &Account) -> Result<CapabilitySet>;
}

/// Maps account roles to capabilities through a static table
#[derive(Debug, Clone, Default)]
pub struct RoleCapabilityResolver {
    roles: HashMap<String, Vec<String>>,
}

impl RoleCapabilityResolver {
    pub fn new(roles: HashMap<String, Vec<String>>) -> Self {
        Self { roles }
    }
}

#[async_trait]
impl PermissionResolver for RoleCapabilityResolver {
    async fn resolve(&self, account: &Account) -> Result<CapabilitySet> {
        let capabilities = account
            .roles
            .iter()
            .filter_map(|role| self.roles.get(role))
            .flatten()
            .cloned();
        Ok(CapabilitySet::new(capabilities))
    }
}
