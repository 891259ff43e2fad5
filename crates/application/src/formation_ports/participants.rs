use async_trait::async_trait;
use tessera_core::{AppResult, TenantId};
use tessera_domain::{Application, ApplicationTemplate, Labels, Runtime, RuntimeContext};

/// Kind of object labels can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelableObject {
    /// Application labels.
    Application,
    /// Application template labels.
    ApplicationTemplate,
    /// Runtime labels.
    Runtime,
    /// Runtime context labels.
    RuntimeContext,
}

impl LabelableObject {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Application => "APPLICATION",
            Self::ApplicationTemplate => "APPLICATION_TEMPLATE",
            Self::Runtime => "RUNTIME",
            Self::RuntimeContext => "RUNTIME_CONTEXT",
        }
    }
}

/// Read port for applications.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Returns one application visible to the tenant.
    async fn get_by_id(&self, tenant_id: TenantId, id: &str) -> AppResult<Application>;

    /// Returns one application regardless of tenant.
    async fn get_global_by_id(&self, id: &str) -> AppResult<Application>;

    /// Returns whether the tenant has owner access to the application.
    async fn owner_exists(&self, tenant_id: TenantId, id: &str) -> AppResult<bool>;
}

/// Read port for runtimes.
#[async_trait]
pub trait RuntimeRepository: Send + Sync {
    /// Returns one runtime visible to the tenant.
    async fn get_by_id(&self, tenant_id: TenantId, id: &str) -> AppResult<Runtime>;

    /// Returns whether the tenant has owner access to the runtime.
    async fn owner_exists(&self, tenant_id: TenantId, id: &str) -> AppResult<bool>;
}

/// Read port for runtime contexts.
#[async_trait]
pub trait RuntimeContextRepository: Send + Sync {
    /// Returns one runtime context visible to the tenant.
    async fn get_by_id(&self, tenant_id: TenantId, id: &str) -> AppResult<RuntimeContext>;

    /// Returns one runtime context regardless of tenant.
    async fn get_global_by_id(&self, id: &str) -> AppResult<RuntimeContext>;

    /// Lists the tenant's contexts of a runtime.
    async fn list_by_runtime_id(
        &self,
        tenant_id: TenantId,
        runtime_id: &str,
    ) -> AppResult<Vec<RuntimeContext>>;
}

/// Read port for application templates.
#[async_trait]
pub trait ApplicationTemplateRepository: Send + Sync {
    /// Returns one application template.
    async fn get(&self, id: &str) -> AppResult<ApplicationTemplate>;

    /// Returns whether the application template exists.
    async fn exists(&self, id: &str) -> AppResult<bool>;
}

/// Read port for labels.
#[async_trait]
pub trait LabelRepository: Send + Sync {
    /// Lists labels of an object visible to the tenant.
    async fn list_for_object(
        &self,
        tenant_id: TenantId,
        object_type: LabelableObject,
        object_id: &str,
    ) -> AppResult<Labels>;

    /// Lists labels of an object regardless of tenant.
    async fn list_for_global_object(
        &self,
        object_type: LabelableObject,
        object_id: &str,
    ) -> AppResult<Labels>;
}
