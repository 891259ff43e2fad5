use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tessera_application::{FormationRepository, FormationTemplateRepository};
use tessera_core::{AppError, AppResult, TenantId};
use tessera_domain::{Formation, FormationState, FormationTemplate};
use uuid::Uuid;

/// PostgreSQL-backed formation and formation template reader.
#[derive(Clone)]
pub struct PostgresFormationRepository {
    pool: PgPool,
}

impl PostgresFormationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct FormationRow {
    id: String,
    tenant_id: Uuid,
    name: String,
    formation_template_id: String,
    state: String,
}

#[derive(Debug, FromRow)]
struct FormationTemplateRow {
    id: String,
    name: String,
}

#[async_trait]
impl FormationRepository for PostgresFormationRepository {
    async fn get(&self, tenant_id: TenantId, formation_id: &str) -> AppResult<Formation> {
        let row = sqlx::query_as::<_, FormationRow>(
            r#"
            SELECT id, tenant_id, name, formation_template_id, state
            FROM formations
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(formation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to get formation '{formation_id}' for tenant '{tenant_id}': {error}"
            ))
        })?
        .ok_or_else(|| {
            AppError::NotFound(format!("formation with ID: '{formation_id}' not found"))
        })?;

        Ok(Formation {
            state: FormationState::parse(row.state.as_str())?,
            id: row.id,
            tenant_id: TenantId::from_uuid(row.tenant_id),
            name: row.name,
            formation_template_id: row.formation_template_id,
        })
    }
}

#[async_trait]
impl FormationTemplateRepository for PostgresFormationRepository {
    async fn get(&self, template_id: &str) -> AppResult<FormationTemplate> {
        let row = sqlx::query_as::<_, FormationTemplateRow>(
            r#"
            SELECT id, name
            FROM formation_templates
            WHERE id = $1
            "#,
        )
        .bind(template_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to get formation template '{template_id}': {error}"
            ))
        })?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "formation template with ID: '{template_id}' not found"
            ))
        })?;

        Ok(FormationTemplate {
            id: row.id,
            name: row.name,
        })
    }
}
