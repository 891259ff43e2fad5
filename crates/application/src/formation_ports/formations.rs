use async_trait::async_trait;
use tessera_core::{AppResult, TenantId};
use tessera_domain::{Formation, FormationTemplate};

/// Read port for formations.
#[async_trait]
pub trait FormationRepository: Send + Sync {
    /// Returns one formation owned by the tenant.
    async fn get(&self, tenant_id: TenantId, formation_id: &str) -> AppResult<Formation>;
}

/// Read port for formation templates.
#[async_trait]
pub trait FormationTemplateRepository: Send + Sync {
    /// Returns one formation template.
    async fn get(&self, template_id: &str) -> AppResult<FormationTemplate>;
}
