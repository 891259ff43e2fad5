use std::collections::HashMap;

use tessera_core::decode_offset_cursor;

use super::conversions::rows_to_assignments;
use super::*;

impl PostgresFormationAssignmentRepository {
    pub(super) async fn list_impl(
        &self,
        tenant_id: TenantId,
        page_size: usize,
        cursor: &str,
    ) -> AppResult<Page<FormationAssignment>> {
        let offset = decode_offset_cursor(cursor)?;

        let total_count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM formation_assignments
            WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to count formation assignments for tenant '{tenant_id}': {error}"
            ))
        })?;

        let rows = sqlx::query_as::<_, FormationAssignmentRow>(
            r#"
            SELECT id, formation_id, tenant_id, source, source_type, target, target_type,
                   state, value, error, last_state_change_timestamp,
                   last_notification_sent_timestamp
            FROM formation_assignments
            WHERE tenant_id = $1
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(to_sql_count(page_size)?)
        .bind(to_sql_count(offset)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list formation assignments for tenant '{tenant_id}': {error}"
            ))
        })?;

        Ok(Page::from_offset_window(
            rows_to_assignments(rows)?,
            from_sql_count(total_count)?,
            cursor,
            offset,
            page_size,
        ))
    }

    pub(super) async fn list_by_formation_ids_impl(
        &self,
        tenant_id: TenantId,
        formation_ids: &[String],
        page_size: usize,
        cursor: &str,
    ) -> AppResult<Vec<Page<FormationAssignment>>> {
        if formation_ids.is_empty() {
            return Ok(Vec::new());
        }

        let offset = decode_offset_cursor(cursor)?;

        let counts = sqlx::query_as::<_, FormationCountRow>(
            r#"
            SELECT formation_id, COUNT(*) AS total_count
            FROM formation_assignments
            WHERE tenant_id = $1 AND formation_id = ANY($2)
            GROUP BY formation_id
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(formation_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to count formation assignments by formation for tenant '{tenant_id}': {error}"
            ))
        })?;

        let rows = sqlx::query_as::<_, FormationAssignmentRow>(
            r#"
            SELECT id, formation_id, tenant_id, source, source_type, target, target_type,
                   state, value, error, last_state_change_timestamp,
                   last_notification_sent_timestamp
            FROM (
                SELECT formation_assignments.*,
                       ROW_NUMBER() OVER (PARTITION BY formation_id ORDER BY id) AS position
                FROM formation_assignments
                WHERE tenant_id = $1 AND formation_id = ANY($2)
            ) windowed
            WHERE position > $3 AND position <= $3 + $4
            ORDER BY formation_id, id
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(formation_ids)
        .bind(to_sql_count(offset)?)
        .bind(to_sql_count(page_size)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list formation assignments by formation for tenant '{tenant_id}': {error}"
            ))
        })?;

        let mut totals = HashMap::with_capacity(counts.len());
        for count in counts {
            totals.insert(count.formation_id, from_sql_count(count.total_count)?);
        }

        let mut by_formation: HashMap<String, Vec<FormationAssignment>> = HashMap::new();
        for assignment in rows_to_assignments(rows)? {
            by_formation
                .entry(assignment.formation_id.clone())
                .or_default()
                .push(assignment);
        }

        Ok(formation_ids
            .iter()
            .map(|formation_id| {
                Page::from_offset_window(
                    by_formation.remove(formation_id).unwrap_or_default(),
                    totals.get(formation_id).copied().unwrap_or_default(),
                    cursor,
                    offset,
                    page_size,
                )
            })
            .collect())
    }

    pub(super) async fn list_all_for_object_ids_impl(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        object_ids: &[String],
    ) -> AppResult<Vec<FormationAssignment>> {
        if object_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, FormationAssignmentRow>(
            r#"
            SELECT id, formation_id, tenant_id, source, source_type, target, target_type,
                   state, value, error, last_state_change_timestamp,
                   last_notification_sent_timestamp
            FROM formation_assignments
            WHERE tenant_id = $1
              AND formation_id = $2
              AND (source = ANY($3) OR target = ANY($3))
            ORDER BY id
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(formation_id)
        .bind(object_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list formation assignments for objects in formation '{formation_id}': {error}"
            ))
        })?;

        rows_to_assignments(rows)
    }

    pub(super) async fn list_all_for_object_global_impl(
        &self,
        object_id: &str,
    ) -> AppResult<Vec<FormationAssignment>> {
        let rows = sqlx::query_as::<_, FormationAssignmentRow>(
            r#"
            SELECT id, formation_id, tenant_id, source, source_type, target, target_type,
                   state, value, error, last_state_change_timestamp,
                   last_notification_sent_timestamp
            FROM formation_assignments
            WHERE source = $1 OR target = $1
            ORDER BY id
            "#,
        )
        .bind(object_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list formation assignments for object '{object_id}' globally: {error}"
            ))
        })?;

        rows_to_assignments(rows)
    }

    pub(super) async fn get_assignments_for_formation_with_states_impl(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        states: Option<&[AssignmentState]>,
    ) -> AppResult<Vec<FormationAssignment>> {
        let states = states.map(|states| {
            states
                .iter()
                .map(|state| state.as_str().to_owned())
                .collect::<Vec<_>>()
        });

        let rows = sqlx::query_as::<_, FormationAssignmentRow>(
            r#"
            SELECT id, formation_id, tenant_id, source, source_type, target, target_type,
                   state, value, error, last_state_change_timestamp,
                   last_notification_sent_timestamp
            FROM formation_assignments
            WHERE tenant_id = $1
              AND formation_id = $2
              AND ($3::TEXT[] IS NULL OR state = ANY($3))
            ORDER BY id
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(formation_id)
        .bind(states)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list formation assignments of formation '{formation_id}': {error}"
            ))
        })?;

        rows_to_assignments(rows)
    }
}

fn to_sql_count(value: usize) -> AppResult<i64> {
    i64::try_from(value)
        .map_err(|_| AppError::Validation(format!("value {value} exceeds the supported range")))
}

fn from_sql_count(value: i64) -> AppResult<usize> {
    usize::try_from(value)
        .map_err(|_| AppError::Internal(format!("database returned invalid count {value}")))
}
