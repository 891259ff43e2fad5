use crate::state_change_timestamp::next_state_change_timestamp;

use super::*;

impl PostgresFormationAssignmentRepository {
    pub(super) async fn create_impl(&self, assignment: &FormationAssignment) -> AppResult<()> {
        let row = FormationAssignmentRow::from(assignment);
        let result = sqlx::query(
            r#"
            INSERT INTO formation_assignments (
                id,
                formation_id,
                tenant_id,
                source,
                source_type,
                target,
                target_type,
                state,
                value,
                error,
                last_state_change_timestamp,
                last_notification_sent_timestamp
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, COALESCE($11, now()), $12)
            "#,
        )
        .bind(row.id.as_str())
        .bind(row.formation_id.as_str())
        .bind(row.tenant_id)
        .bind(row.source.as_str())
        .bind(row.source_type.as_str())
        .bind(row.target.as_str())
        .bind(row.target_type.as_str())
        .bind(row.state.as_str())
        .bind(row.value.as_deref())
        .bind(row.error.as_deref())
        .bind(row.last_state_change_timestamp)
        .bind(row.last_notification_sent_timestamp)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(error) => {
                if let sqlx::Error::Database(database_error) = &error
                    && database_error.code().as_deref() == Some("23505")
                {
                    return Err(AppError::Conflict(format!(
                        "formation assignment from '{}' to '{}' already exists in formation '{}'",
                        assignment.source, assignment.target, assignment.formation_id
                    )));
                }

                Err(AppError::Internal(format!(
                    "failed to create formation assignment '{}': {error}",
                    assignment.id
                )))
            }
        }
    }

    pub(super) async fn update_impl(&self, assignment: &FormationAssignment) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to start update transaction for formation assignment '{}': {error}",
                assignment.id
            ))
        })?;

        let stored = sqlx::query_as::<_, StoredStateRow>(
            r#"
            SELECT state, value, last_state_change_timestamp
            FROM formation_assignments
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(assignment.id.as_str())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load formation assignment '{}' for update: {error}",
                assignment.id
            ))
        })?
        .ok_or_else(|| not_found(assignment.id.as_str()))?;

        let last_state_change_timestamp = next_state_change_timestamp(
            AssignmentState::parse(stored.state.as_str())?,
            stored.value.as_deref(),
            stored.last_state_change_timestamp,
            assignment,
            Utc::now(),
        );

        sqlx::query(
            r#"
            UPDATE formation_assignments
            SET state = $2,
                value = $3,
                error = $4,
                last_state_change_timestamp = $5
            WHERE id = $1
            "#,
        )
        .bind(assignment.id.as_str())
        .bind(assignment.state.as_str())
        .bind(assignment.value.as_deref())
        .bind(assignment.error.as_deref())
        .bind(last_state_change_timestamp)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to update formation assignment '{}': {error}",
                assignment.id
            ))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to commit update of formation assignment '{}': {error}",
                assignment.id
            ))
        })
    }

    pub(super) async fn update_last_notification_sent_timestamp_impl(
        &self,
        id: &str,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE formation_assignments
            SET last_notification_sent_timestamp = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to stamp notification time of formation assignment '{id}': {error}"
            ))
        })?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        Ok(())
    }

    pub(super) async fn delete_impl(&self, tenant_id: TenantId, id: &str) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM formation_assignments
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to delete formation assignment '{id}': {error}"
            ))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::Unauthorized(format!(
                "tenant '{tenant_id}' has no access to formation assignment '{id}'"
            )));
        }

        Ok(())
    }

    pub(super) async fn delete_assignments_for_object_id_impl(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        object_id: &str,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM formation_assignments
            WHERE tenant_id = $1
              AND formation_id = $2
              AND (source = $3 OR target = $3)
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(formation_id)
        .bind(object_id)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to delete formation assignments of object '{object_id}' in formation '{formation_id}': {error}"
            ))
        })?;

        Ok(())
    }
}
