use super::conversions::rows_to_assignments;
use super::*;

impl PostgresFormationAssignmentRepository {
    pub(super) async fn get_impl(
        &self,
        tenant_id: TenantId,
        id: &str,
    ) -> AppResult<FormationAssignment> {
        let row = sqlx::query_as::<_, FormationAssignmentRow>(
            r#"
            SELECT id, formation_id, tenant_id, source, source_type, target, target_type,
                   state, value, error, last_state_change_timestamp,
                   last_notification_sent_timestamp
            FROM formation_assignments
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to get formation assignment '{id}' for tenant '{tenant_id}': {error}"
            ))
        })?
        .ok_or_else(|| not_found(id))?;

        FormationAssignment::try_from(row)
    }

    pub(super) async fn get_for_formation_impl(
        &self,
        tenant_id: TenantId,
        id: &str,
        formation_id: &str,
    ) -> AppResult<FormationAssignment> {
        let row = sqlx::query_as::<_, FormationAssignmentRow>(
            r#"
            SELECT id, formation_id, tenant_id, source, source_type, target, target_type,
                   state, value, error, last_state_change_timestamp,
                   last_notification_sent_timestamp
            FROM formation_assignments
            WHERE tenant_id = $1 AND id = $2 AND formation_id = $3
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(id)
        .bind(formation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to get formation assignment '{id}' of formation '{formation_id}': {error}"
            ))
        })?
        .ok_or_else(|| not_found(id))?;

        FormationAssignment::try_from(row)
    }

    pub(super) async fn get_global_by_id_impl(&self, id: &str) -> AppResult<FormationAssignment> {
        let row = sqlx::query_as::<_, FormationAssignmentRow>(
            r#"
            SELECT id, formation_id, tenant_id, source, source_type, target, target_type,
                   state, value, error, last_state_change_timestamp,
                   last_notification_sent_timestamp
            FROM formation_assignments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to get formation assignment '{id}' globally: {error}"
            ))
        })?
        .ok_or_else(|| not_found(id))?;

        FormationAssignment::try_from(row)
    }

    pub(super) async fn get_global_by_id_and_formation_id_impl(
        &self,
        id: &str,
        formation_id: &str,
    ) -> AppResult<FormationAssignment> {
        let row = sqlx::query_as::<_, FormationAssignmentRow>(
            r#"
            SELECT id, formation_id, tenant_id, source, source_type, target, target_type,
                   state, value, error, last_state_change_timestamp,
                   last_notification_sent_timestamp
            FROM formation_assignments
            WHERE id = $1 AND formation_id = $2
            "#,
        )
        .bind(id)
        .bind(formation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to get formation assignment '{id}' of formation '{formation_id}' globally: {error}"
            ))
        })?
        .ok_or_else(|| not_found(id))?;

        FormationAssignment::try_from(row)
    }

    pub(super) async fn get_by_source_and_target_impl(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        source: &str,
        target: &str,
    ) -> AppResult<FormationAssignment> {
        let row = sqlx::query_as::<_, FormationAssignmentRow>(
            r#"
            SELECT id, formation_id, tenant_id, source, source_type, target, target_type,
                   state, value, error, last_state_change_timestamp,
                   last_notification_sent_timestamp
            FROM formation_assignments
            WHERE tenant_id = $1 AND formation_id = $2 AND source = $3 AND target = $4
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(formation_id)
        .bind(source)
        .bind(target)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to get formation assignment from '{source}' to '{target}': {error}"
            ))
        })?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "formation assignment with source '{source}' and target '{target}' not found in formation '{formation_id}'"
            ))
        })?;

        FormationAssignment::try_from(row)
    }

    pub(super) async fn list_for_ids_impl(
        &self,
        tenant_id: TenantId,
        ids: &[String],
    ) -> AppResult<Vec<FormationAssignment>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, FormationAssignmentRow>(
            r#"
            SELECT id, formation_id, tenant_id, source, source_type, target, target_type,
                   state, value, error, last_state_change_timestamp,
                   last_notification_sent_timestamp
            FROM formation_assignments
            WHERE tenant_id = $1 AND id = ANY($2)
            ORDER BY id
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list formation assignments by ids for tenant '{tenant_id}': {error}"
            ))
        })?;

        rows_to_assignments(rows)
    }

    pub(super) async fn exists_impl(&self, tenant_id: TenantId, id: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM formation_assignments
                WHERE tenant_id = $1 AND id = $2
            )
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to check formation assignment '{id}' existence: {error}"
            ))
        })
    }
}
