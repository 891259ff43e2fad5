use super::*;

impl PostgresParticipantRepository {
    pub(super) async fn get_application_impl(
        &self,
        tenant_id: Option<TenantId>,
        id: &str,
    ) -> AppResult<Application> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT applications.id, applications.name, applications.application_template_id,
                   applications.integration_system_id
            FROM applications
            WHERE applications.id = $1
              AND (
                  $2::UUID IS NULL
                  OR EXISTS (
                      SELECT 1
                      FROM tenant_resources
                      WHERE tenant_resources.tenant_id = $2
                        AND tenant_resources.object_type = 'APPLICATION'
                        AND tenant_resources.object_id = applications.id
                  )
              )
            "#,
        )
        .bind(id)
        .bind(tenant_id.map(|tenant_id| tenant_id.as_uuid()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to get application '{id}': {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("application with ID: '{id}' not found")))?;

        Ok(Application::from(row))
    }

    pub(super) async fn get_application_template_impl(
        &self,
        id: &str,
    ) -> AppResult<ApplicationTemplate> {
        let row = sqlx::query_as::<_, NamedRow>(
            r#"
            SELECT id, name
            FROM application_templates
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to get application template '{id}': {error}"))
        })?
        .ok_or_else(|| {
            AppError::NotFound(format!("application template with ID: '{id}' not found"))
        })?;

        Ok(ApplicationTemplate {
            id: row.id,
            name: row.name,
        })
    }

    pub(super) async fn application_template_exists_impl(&self, id: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM application_templates WHERE id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to check application template '{id}' existence: {error}"
            ))
        })
    }
}
