//! Credential lookup chain for the bound chat model (spec.md §4.4):
//! tenant-scoped secret, then platform-scoped, then an environment
//! fallback. Logs which source resolved without ever logging the value
//! itself, mirroring the teacher's convention of logging *which*
//! provider/model path was taken.

use std::collections::HashMap;

use agentflow_core::TenantId;
use agentflow_store::SecretsManager;
use tracing::{debug, info};

const PLATFORM_TENANT: &str = "platform";
const OPENAI_INTEGRATION: &str = "openai";
const OPENAI_ENV_VAR: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone)]
pub enum CredentialSource {
    TenantSecret,
    PlatformSecret,
    Environment,
    ProviderDefault,
}

impl CredentialSource {
    fn label(&self) -> &'static str {
        match self {
            CredentialSource::TenantSecret => "tenant secret",
            CredentialSource::PlatformSecret => "platform secret",
            CredentialSource::Environment => "environment",
            CredentialSource::ProviderDefault => "provider default (no credential)",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedCredential {
    pub source: CredentialSource,
    pub api_key: Option<String>,
}

/// Resolve an OpenAI credential for `tenant_id`: tenant secret, then
/// platform secret, then `OPENAI_API_KEY` env var. A miss at every stage
/// returns `ProviderDefault` with `api_key: None` — the model is then
/// constructed without an explicit credential.
pub async fn resolve_openai_credential(
    secrets: &dyn SecretsManager,
    tenant_id: &TenantId,
) -> ResolvedCredential {
    debug!(tenant_id = %tenant_id, "credential lookup: trying tenant secret");
    if let Ok(values) = secrets.get(tenant_id, OPENAI_INTEGRATION).await {
        if let Some(key) = extract_api_key(&values) {
            info!(tenant_id = %tenant_id, source = "tenant secret", "resolved chat model credential");
            return ResolvedCredential {
                source: CredentialSource::TenantSecret,
                api_key: Some(key),
            };
        }
    }

    debug!(tenant_id = %tenant_id, "credential lookup: trying platform secret");
    let platform_tenant = TenantId::from(PLATFORM_TENANT);
    if let Ok(values) = secrets.get(&platform_tenant, OPENAI_INTEGRATION).await {
        if let Some(key) = extract_api_key(&values) {
            info!(tenant_id = %tenant_id, source = "platform secret", "resolved chat model credential");
            return ResolvedCredential {
                source: CredentialSource::PlatformSecret,
                api_key: Some(key),
            };
        }
    }

    debug!(tenant_id = %tenant_id, "credential lookup: trying environment fallback");
    if let Ok(key) = std::env::var(OPENAI_ENV_VAR) {
        if !key.is_empty() {
            info!(tenant_id = %tenant_id, source = "environment", "resolved chat model credential");
            return ResolvedCredential {
                source: CredentialSource::Environment,
                api_key: Some(key),
            };
        }
    }

    info!(
        tenant_id = %tenant_id,
        source = CredentialSource::ProviderDefault.label(),
        "no chat model credential resolved, falling back to provider default"
    );
    ResolvedCredential {
        source: CredentialSource::ProviderDefault,
        api_key: None,
    }
}

fn extract_api_key(values: &HashMap<String, String>) -> Option<String> {
    values.get("api_key").cloned().filter(|k| !k.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentflow_store::InMemorySecretsManager;

    #[tokio::test]
    async fn tenant_secret_takes_priority_over_platform_and_env() {
        let secrets = InMemorySecretsManager::new();
        let tenant_id = TenantId::new();
        let mut values = HashMap::new();
        values.insert("api_key".to_string(), "tenant-key".to_string());
        secrets.set(&tenant_id, "openai", values);

        let mut platform_values = HashMap::new();
        platform_values.insert("api_key".to_string(), "platform-key".to_string());
        secrets.set(&TenantId::from("platform"), "openai", platform_values);

        let resolved = resolve_openai_credential(&secrets, &tenant_id).await;
        assert_eq!(resolved.api_key.as_deref(), Some("tenant-key"));
        assert!(matches!(resolved.source, CredentialSource::TenantSecret));
    }

    #[tokio::test]
    async fn falls_back_to_platform_secret_when_tenant_has_none() {
        let secrets = InMemorySecretsManager::new();
        let tenant_id = TenantId::new();
        let mut platform_values = HashMap::new();
        platform_values.insert("api_key".to_string(), "platform-key".to_string());
        secrets.set(&TenantId::from("platform"), "openai", platform_values);

        let resolved = resolve_openai_credential(&secrets, &tenant_id).await;
        assert_eq!(resolved.api_key.as_deref(), Some("platform-key"));
        assert!(matches!(resolved.source, CredentialSource::PlatformSecret));
    }

    #[tokio::test]
    async fn no_credential_anywhere_falls_back_to_provider_default() {
        // SAFETY (test-only): no other test in this process mutates this var
        // concurrently; `serial` harness isolation is unnecessary since each
        // test uses isolated tenant ids and this one clears a var it owns.
        std::env::remove_var("OPENAI_API_KEY");
        let secrets = InMemorySecretsManager::new();
        let tenant_id = TenantId::new();

        let resolved = resolve_openai_credential(&secrets, &tenant_id).await;
        assert!(resolved.api_key.is_none());
        assert!(matches!(resolved.source, CredentialSource::ProviderDefault));
    }
}
