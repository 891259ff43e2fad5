use async_trait::async_trait;
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tessera_application::{
    ApplicationRepository, ApplicationTemplateRepository, LabelRepository, LabelableObject,
    RuntimeContextRepository, RuntimeRepository,
};
use tessera_core::{AppError, AppResult, TenantId};
use tessera_domain::{Application, ApplicationTemplate, Labels, Runtime, RuntimeContext};

mod applications;
mod labels;
mod runtimes;


/// PostgreSQL-backed reader for formation participants and their labels.
///
/// Tenant visibility and owner access are recorded in `tenant_resources`.
#[derive(Clone)]
pub struct PostgresParticipantRepository {
    pool: PgPool,
}

impl PostgresParticipantRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn owner_exists_for(
        &self,
        tenant_id: TenantId,
        object_type: LabelableObject,
        id: &str,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM tenant_resources
                WHERE tenant_id = $1 AND object_type = $2 AND object_id = $3 AND owner
            )
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(object_type.as_str())
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to check owner access of tenant '{tenant_id}' to {} '{id}': {error}",
                object_type.as_str()
            ))
        })
    }
}

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: String,
    name: String,
    application_template_id: Option<String>,
    integration_system_id: Option<String>,
}

#[derive(Debug, FromRow)]
struct NamedRow {
    id: String,
    name: String,
}

#[derive(Debug, FromRow)]
struct RuntimeContextRow {
    id: String,
    runtime_id: String,
    key: String,
    value: String,
}

#[derive(Debug, FromRow)]
struct LabelRow {
    key: String,
    value: Value,
}

impl From<ApplicationRow> for Application {
    fn from(row: ApplicationRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            application_template_id: row.application_template_id,
            integration_system_id: row.integration_system_id,
        }
    }
}

impl From<RuntimeContextRow> for RuntimeContext {
    fn from(row: RuntimeContextRow) -> Self {
        Self {
            id: row.id,
            runtime_id: row.runtime_id,
            key: row.key,
            value: row.value,
        }
    }
}

#[async_trait]
impl ApplicationRepository for PostgresParticipantRepository {
    async fn get_by_id(&self, tenant_id: TenantId, id: &str) -> AppResult<Application> {
        self.get_application_impl(Some(tenant_id), id).await
    }

    async fn get_global_by_id(&self, id: &str) -> AppResult<Application> {
        self.get_application_impl(None, id).await
    }

    async fn owner_exists(&self, tenant_id: TenantId, id: &str) -> AppResult<bool> {
        self.owner_exists_for(tenant_id, LabelableObject::Application, id)
            .await
    }
}

#[async_trait]
impl ApplicationTemplateRepository for PostgresParticipantRepository {
    async fn get(&self, id: &str) -> AppResult<ApplicationTemplate> {
        self.get_application_template_impl(id).await
    }

    async fn exists(&self, id: &str) -> AppResult<bool> {
        self.application_template_exists_impl(id).await
    }
}

#[async_trait]
impl RuntimeRepository for PostgresParticipantRepository {
    async fn get_by_id(&self, tenant_id: TenantId, id: &str) -> AppResult<Runtime> {
        self.get_runtime_impl(tenant_id, id).await
    }

    async fn owner_exists(&self, tenant_id: TenantId, id: &str) -> AppResult<bool> {
        self.owner_exists_for(tenant_id, LabelableObject::Runtime, id)
            .await
    }
}

#[async_trait]
impl RuntimeContextRepository for PostgresParticipantRepository {
    async fn get_by_id(&self, tenant_id: TenantId, id: &str) -> AppResult<RuntimeContext> {
        self.get_runtime_context_impl(Some(tenant_id), id).await
    }

    async fn get_global_by_id(&self, id: &str) -> AppResult<RuntimeContext> {
        self.get_runtime_context_impl(None, id).await
    }

    async fn list_by_runtime_id(
        &self,
        tenant_id: TenantId,
        runtime_id: &str,
    ) -> AppResult<Vec<RuntimeContext>> {
        self.list_runtime_contexts_impl(tenant_id, runtime_id).await
    }
}

#[async_trait]
impl LabelRepository for PostgresParticipantRepository {
    async fn list_for_object(
        &self,
        tenant_id: TenantId,
        object_type: LabelableObject,
        object_id: &str,
    ) -> AppResult<Labels> {
        self.list_labels_impl(Some(tenant_id), object_type, object_id)
            .await
    }

    async fn list_for_global_object(
        &self,
        object_type: LabelableObject,
        object_id: &str,
    ) -> AppResult<Labels> {
        self.list_labels_impl(None, object_type, object_id).await
    }
}
