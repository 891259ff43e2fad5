use super::*;

impl PostgresParticipantRepository {
    pub(super) async fn list_labels_impl(
        &self,
        tenant_id: Option<TenantId>,
        object_type: LabelableObject,
        object_id: &str,
    ) -> AppResult<Labels> {
        let rows = sqlx::query_as::<_, LabelRow>(
            r#"
            SELECT key, value
            FROM labels
            WHERE object_type = $1
              AND object_id = $2
              AND ($3::UUID IS NULL OR tenant_id IS NULL OR tenant_id = $3)
            ORDER BY key
            "#,
        )
        .bind(object_type.as_str())
        .bind(object_id)
        .bind(tenant_id.map(|tenant_id| tenant_id.as_uuid()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list labels of {} '{object_id}': {error}",
                object_type.as_str()
            ))
        })?;

        Ok(rows.into_iter().map(|row| (row.key, row.value)).collect())
    }
}
