use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;

use agentflow_core::TenantId;

use crate::error::{Result, StoreError};

/// Per-tenant credential lookup. The runtime falls back to a platform-scoped
/// entry and then an environment variable when a tenant has not configured
/// its own integration — see the credential lookup chain in the runtime
/// crate.
#[async_trait]
pub trait SecretsManager: Send + Sync {
    async fn get(&self, tenant_id: &TenantId, integration: &str) -> Result<HashMap<String, String>>;
}

#[derive(Default)]
pub struct InMemorySecretsManager {
    secrets: DashMap<(String, String), HashMap<String, String>>,
}

impl InMemorySecretsManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, tenant_id: &TenantId, integration: &str, values: HashMap<String, String>) {
        self.secrets
            .insert((tenant_id.as_str().to_string(), integration.to_string()), values);
    }
}

#[async_trait]
impl SecretsManager for InMemorySecretsManager {
    async fn get(&self, tenant_id: &TenantId, integration: &str) -> Result<HashMap<String, String>> {
        self.secrets
            .get(&(tenant_id.as_str().to_string(), integration.to_string()))
            .map(|v| v.clone())
            .ok_or_else(|| StoreError::SecretNotFound {
                tenant_id: tenant_id.as_str().to_string(),
                integration: integration.to_string(),
            })
    }
}
