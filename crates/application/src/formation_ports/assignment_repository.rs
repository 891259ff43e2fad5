use async_trait::async_trait;
use tessera_core::{AppResult, Page, TenantId};
use tessera_domain::{AssignmentState, FormationAssignment};

/// Repository port for formation assignment records.
///
/// Lookups of a single record fail with `AppError::NotFound` when nothing matches.
#[async_trait]
pub trait FormationAssignmentRepository: Send + Sync {
    /// Persists a new assignment.
    async fn create(&self, assignment: &FormationAssignment) -> AppResult<()>;

    /// Returns one assignment owned by the tenant.
    async fn get(&self, tenant_id: TenantId, id: &str) -> AppResult<FormationAssignment>;

    /// Returns one assignment owned by the tenant inside a formation.
    async fn get_for_formation(
        &self,
        tenant_id: TenantId,
        id: &str,
        formation_id: &str,
    ) -> AppResult<FormationAssignment>;

    /// Returns one assignment regardless of tenant.
    async fn get_global_by_id(&self, id: &str) -> AppResult<FormationAssignment>;

    /// Returns one assignment of a formation regardless of tenant.
    async fn get_global_by_id_and_formation_id(
        &self,
        id: &str,
        formation_id: &str,
    ) -> AppResult<FormationAssignment>;

    /// Returns the assignment for a `(source, target)` pair in a formation.
    async fn get_by_source_and_target(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        source: &str,
        target: &str,
    ) -> AppResult<FormationAssignment>;

    /// Returns the assignment for a `(target, source)` lookup in a formation.
    async fn get_by_target_and_source(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        target: &str,
        source: &str,
    ) -> AppResult<FormationAssignment> {
        self.get_by_source_and_target(tenant_id, formation_id, source, target)
            .await
    }

    /// Returns the reverse of the `(source, target)` assignment.
    async fn get_reverse_by_source_and_target(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        source: &str,
        target: &str,
    ) -> AppResult<FormationAssignment> {
        self.get_by_source_and_target(tenant_id, formation_id, target, source)
            .await
    }

    /// Lists one page of the tenant's assignments.
    async fn list(
        &self,
        tenant_id: TenantId,
        page_size: usize,
        cursor: &str,
    ) -> AppResult<Page<FormationAssignment>>;

    /// Lists one page per formation, in the order of `formation_ids`.
    async fn list_by_formation_ids(
        &self,
        tenant_id: TenantId,
        formation_ids: &[String],
        page_size: usize,
        cursor: &str,
    ) -> AppResult<Vec<Page<FormationAssignment>>>;

    /// Lists assignments of a formation where the object is source or target.
    async fn list_all_for_object(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        object_id: &str,
    ) -> AppResult<Vec<FormationAssignment>>;

    /// Lists assignments of a formation where any of the objects is source or target.
    async fn list_all_for_object_ids(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        object_ids: &[String],
    ) -> AppResult<Vec<FormationAssignment>>;

    /// Lists assignments in any tenant where the object is source or target.
    async fn list_all_for_object_global(
        &self,
        object_id: &str,
    ) -> AppResult<Vec<FormationAssignment>>;

    /// Lists the tenant's assignments with the given ids.
    async fn list_for_ids(
        &self,
        tenant_id: TenantId,
        ids: &[String],
    ) -> AppResult<Vec<FormationAssignment>>;

    /// Lists all assignments of a formation.
    async fn get_assignments_for_formation(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
    ) -> AppResult<Vec<FormationAssignment>>;

    /// Lists assignments of a formation in any of the given states.
    async fn get_assignments_for_formation_with_states(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        states: &[AssignmentState],
    ) -> AppResult<Vec<FormationAssignment>>;

    /// Replaces a stored assignment, looked up globally by id.
    async fn update(&self, assignment: &FormationAssignment) -> AppResult<()>;

    /// Stamps the time a notification was last sent for an assignment.
    async fn update_last_notification_sent_timestamp(&self, id: &str) -> AppResult<()>;

    /// Deletes one assignment owned by the tenant.
    ///
    /// Fails with `AppError::Unauthorized` when the tenant owns no such record.
    async fn delete(&self, tenant_id: TenantId, id: &str) -> AppResult<()>;

    /// Deletes all assignments of a formation where the object is source or target.
    async fn delete_assignments_for_object_id(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        object_id: &str,
    ) -> AppResult<()>;

    /// Returns whether the tenant owns an assignment with the id.
    async fn exists(&self, tenant_id: TenantId, id: &str) -> AppResult<bool>;
}
