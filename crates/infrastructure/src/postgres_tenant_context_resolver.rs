use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tessera_application::TenantContextResolver;
use tessera_core::{AppError, AppResult, TenantId};
use tessera_domain::CustomerTenantContext;

/// PostgreSQL-backed customer metadata lookup for tenants.
#[derive(Clone)]
pub struct PostgresTenantContextResolver {
    pool: PgPool,
}

impl PostgresTenantContextResolver {
    /// Creates a resolver with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TenantContextRow {
    customer_id: String,
    account_id: Option<String>,
    path: Option<String>,
}

#[async_trait]
impl TenantContextResolver for PostgresTenantContextResolver {
    async fn customer_tenant_context(
        &self,
        tenant_id: TenantId,
    ) -> AppResult<CustomerTenantContext> {
        let row = sqlx::query_as::<_, TenantContextRow>(
            r#"
            SELECT customer_id, account_id, path
            FROM tenants
            WHERE id = $1
            "#,
        )
        .bind(tenant_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to resolve customer context of tenant '{tenant_id}': {error}"
            ))
        })?
        .ok_or_else(|| AppError::NotFound(format!("tenant '{tenant_id}' not found")))?;

        Ok(CustomerTenantContext {
            customer_id: row.customer_id,
            account_id: row.account_id,
            path: row.path,
        })
    }
}
