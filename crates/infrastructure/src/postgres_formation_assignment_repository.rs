use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tessera_application::FormationAssignmentRepository;
use tessera_core::{AppError, AppResult, Page, TenantId};
use tessera_domain::{AssignmentState, FormationAssignment};
use uuid::Uuid;

mod conversions;
mod listing;
mod lookup;
mod mutation;


/// PostgreSQL-backed formation assignment repository.
#[derive(Clone)]
pub struct PostgresFormationAssignmentRepository {
    pool: PgPool,
}

impl PostgresFormationAssignmentRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
struct FormationAssignmentRow {
    id: String,
    formation_id: String,
    tenant_id: Uuid,
    source: String,
    source_type: String,
    target: String,
    target_type: String,
    state: String,
    value: Option<String>,
    error: Option<String>,
    last_state_change_timestamp: Option<DateTime<Utc>>,
    last_notification_sent_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
struct StoredStateRow {
    state: String,
    value: Option<String>,
    last_state_change_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
struct FormationCountRow {
    formation_id: String,
    total_count: i64,
}

#[async_trait]
impl FormationAssignmentRepository for PostgresFormationAssignmentRepository {
    async fn create(&self, assignment: &FormationAssignment) -> AppResult<()> {
        self.create_impl(assignment).await
    }

    async fn get(&self, tenant_id: TenantId, id: &str) -> AppResult<FormationAssignment> {
        self.get_impl(tenant_id, id).await
    }

    async fn get_for_formation(
        &self,
        tenant_id: TenantId,
        id: &str,
        formation_id: &str,
    ) -> AppResult<FormationAssignment> {
        self.get_for_formation_impl(tenant_id, id, formation_id)
            .await
    }

    async fn get_global_by_id(&self, id: &str) -> AppResult<FormationAssignment> {
        self.get_global_by_id_impl(id).await
    }

    async fn get_global_by_id_and_formation_id(
        &self,
        id: &str,
        formation_id: &str,
    ) -> AppResult<FormationAssignment> {
        self.get_global_by_id_and_formation_id_impl(id, formation_id)
            .await
    }

    async fn get_by_source_and_target(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        source: &str,
        target: &str,
    ) -> AppResult<FormationAssignment> {
        self.get_by_source_and_target_impl(tenant_id, formation_id, source, target)
            .await
    }

    async fn list(
        &self,
        tenant_id: TenantId,
        page_size: usize,
        cursor: &str,
    ) -> AppResult<Page<FormationAssignment>> {
        self.list_impl(tenant_id, page_size, cursor).await
    }

    async fn list_by_formation_ids(
        &self,
        tenant_id: TenantId,
        formation_ids: &[String],
        page_size: usize,
        cursor: &str,
    ) -> AppResult<Vec<Page<FormationAssignment>>> {
        self.list_by_formation_ids_impl(tenant_id, formation_ids, page_size, cursor)
            .await
    }

    async fn list_all_for_object(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        object_id: &str,
    ) -> AppResult<Vec<FormationAssignment>> {
        self.list_all_for_object_ids_impl(tenant_id, formation_id, &[object_id.to_owned()])
            .await
    }

    async fn list_all_for_object_ids(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        object_ids: &[String],
    ) -> AppResult<Vec<FormationAssignment>> {
        self.list_all_for_object_ids_impl(tenant_id, formation_id, object_ids)
            .await
    }

    async fn list_all_for_object_global(
        &self,
        object_id: &str,
    ) -> AppResult<Vec<FormationAssignment>> {
        self.list_all_for_object_global_impl(object_id).await
    }

    async fn list_for_ids(
        &self,
        tenant_id: TenantId,
        ids: &[String],
    ) -> AppResult<Vec<FormationAssignment>> {
        self.list_for_ids_impl(tenant_id, ids).await
    }

    async fn get_assignments_for_formation(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
    ) -> AppResult<Vec<FormationAssignment>> {
        self.get_assignments_for_formation_with_states_impl(tenant_id, formation_id, None)
            .await
    }

    async fn get_assignments_for_formation_with_states(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        states: &[AssignmentState],
    ) -> AppResult<Vec<FormationAssignment>> {
        self.get_assignments_for_formation_with_states_impl(tenant_id, formation_id, Some(states))
            .await
    }

    async fn update(&self, assignment: &FormationAssignment) -> AppResult<()> {
        self.update_impl(assignment).await
    }

    async fn update_last_notification_sent_timestamp(&self, id: &str) -> AppResult<()> {
        self.update_last_notification_sent_timestamp_impl(id).await
    }

    async fn delete(&self, tenant_id: TenantId, id: &str) -> AppResult<()> {
        self.delete_impl(tenant_id, id).await
    }

    async fn delete_assignments_for_object_id(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        object_id: &str,
    ) -> AppResult<()> {
        self.delete_assignments_for_object_id_impl(tenant_id, formation_id, object_id)
            .await
    }

    async fn exists(&self, tenant_id: TenantId, id: &str) -> AppResult<bool> {
        self.exists_impl(tenant_id, id).await
    }
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("formation assignment with ID: '{id}' not found"))
}
