use super::*;

impl PostgresParticipantRepository {
    pub(super) async fn get_runtime_impl(
        &self,
        tenant_id: TenantId,
        id: &str,
    ) -> AppResult<Runtime> {
        let row = sqlx::query_as::<_, NamedRow>(
            r#"
            SELECT runtimes.id, runtimes.name
            FROM runtimes
            JOIN tenant_resources
              ON tenant_resources.object_id = runtimes.id
             AND tenant_resources.object_type = 'RUNTIME'
            WHERE runtimes.id = $1 AND tenant_resources.tenant_id = $2
            "#,
        )
        .bind(id)
        .bind(tenant_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to get runtime '{id}': {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("runtime with ID: '{id}' not found")))?;

        Ok(Runtime {
            id: row.id,
            name: row.name,
        })
    }

    pub(super) async fn get_runtime_context_impl(
        &self,
        tenant_id: Option<TenantId>,
        id: &str,
    ) -> AppResult<RuntimeContext> {
        let row = sqlx::query_as::<_, RuntimeContextRow>(
            r#"
            SELECT runtime_contexts.id, runtime_contexts.runtime_id, runtime_contexts.key,
                   runtime_contexts.value
            FROM runtime_contexts
            WHERE runtime_contexts.id = $1
              AND (
                  $2::UUID IS NULL
                  OR EXISTS (
                      SELECT 1
                      FROM tenant_resources
                      WHERE tenant_resources.tenant_id = $2
                        AND tenant_resources.object_type = 'RUNTIME_CONTEXT'
                        AND tenant_resources.object_id = runtime_contexts.id
                  )
              )
            "#,
        )
        .bind(id)
        .bind(tenant_id.map(|tenant_id| tenant_id.as_uuid()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to get runtime context '{id}': {error}"))
        })?
        .ok_or_else(|| AppError::NotFound(format!("runtime context with ID: '{id}' not found")))?;

        Ok(RuntimeContext::from(row))
    }

    pub(super) async fn list_runtime_contexts_impl(
        &self,
        tenant_id: TenantId,
        runtime_id: &str,
    ) -> AppResult<Vec<RuntimeContext>> {
        let rows = sqlx::query_as::<_, RuntimeContextRow>(
            r#"
            SELECT runtime_contexts.id, runtime_contexts.runtime_id, runtime_contexts.key,
                   runtime_contexts.value
            FROM runtime_contexts
            JOIN tenant_resources
              ON tenant_resources.object_id = runtime_contexts.id
             AND tenant_resources.object_type = 'RUNTIME_CONTEXT'
            WHERE runtime_contexts.runtime_id = $1 AND tenant_resources.tenant_id = $2
            ORDER BY runtime_contexts.id
            "#,
        )
        .bind(runtime_id)
        .bind(tenant_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list runtime contexts of runtime '{runtime_id}': {error}"
            ))
        })?;

        Ok(rows.into_iter().map(RuntimeContext::from).collect())
    }
}
