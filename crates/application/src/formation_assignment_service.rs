use std::sync::Arc;

use tessera_core::{AppError, AppResult, Page, TenantId};
use tessera_domain::{
    AssignmentErrorCode, AssignmentState, FormationAssignment, ParticipantType,
};
use uuid::Uuid;

use crate::formation_ports::FormationAssignmentRepository;


const MAX_PAGE_SIZE: usize = 200;

/// Input payload for creating a formation assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFormationAssignmentInput {
    /// Owning formation id.
    pub formation_id: String,
    /// Source participant id.
    pub source: String,
    /// Source participant kind.
    pub source_type: ParticipantType,
    /// Target participant id.
    pub target: String,
    /// Target participant kind.
    pub target_type: ParticipantType,
    /// Initial state, forced to `READY` for self-assignments.
    pub state: AssignmentState,
    /// Initial raw configuration.
    pub value: Option<String>,
}

/// Tenant-scoped facade over the formation assignment store.
#[derive(Clone)]
pub struct FormationAssignmentService {
    repository: Arc<dyn FormationAssignmentRepository>,
}

impl FormationAssignmentService {
    /// Creates a new service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn FormationAssignmentRepository>) -> Self {
        Self { repository }
    }

    /// Creates an assignment with a generated id.
    pub async fn create(
        &self,
        tenant_id: TenantId,
        input: CreateFormationAssignmentInput,
    ) -> AppResult<FormationAssignment> {
        let state = if input.source == input.target {
            AssignmentState::Ready
        } else {
            input.state
        };

        let assignment = FormationAssignment {
            id: Uuid::new_v4().to_string(),
            formation_id: input.formation_id,
            tenant_id,
            source: input.source,
            source_type: input.source_type,
            target: input.target,
            target_type: input.target_type,
            state,
            value: input.value,
            error: None,
            last_state_change_timestamp: None,
            last_notification_sent_timestamp: None,
        };

        self.repository
            .create(&assignment)
            .await
            .map_err(|error| {
                error.context(format!(
                    "while creating formation assignment for formation with ID: '{}'",
                    assignment.formation_id
                ))
            })?;

        Ok(assignment)
    }

    /// Returns one assignment owned by the tenant.
    pub async fn get(&self, tenant_id: TenantId, id: &str) -> AppResult<FormationAssignment> {
        self.repository.get(tenant_id, id).await.map_err(|error| {
            error.context(format!("while getting formation assignment with ID: '{id}'"))
        })
    }

    /// Returns one assignment owned by the tenant inside a formation.
    pub async fn get_for_formation(
        &self,
        tenant_id: TenantId,
        id: &str,
        formation_id: &str,
    ) -> AppResult<FormationAssignment> {
        self.repository
            .get_for_formation(tenant_id, id, formation_id)
            .await
            .map_err(|error| {
                error.context(format!(
                    "while getting formation assignment with ID: '{id}' for formation with ID: '{formation_id}'"
                ))
            })
    }

    /// Returns one assignment regardless of tenant.
    pub async fn get_global_by_id(&self, id: &str) -> AppResult<FormationAssignment> {
        self.repository.get_global_by_id(id).await.map_err(|error| {
            error.context(format!(
                "while getting formation assignment with ID: '{id}' globally"
            ))
        })
    }

    /// Returns one assignment of a formation regardless of tenant.
    pub async fn get_global_by_id_and_formation_id(
        &self,
        id: &str,
        formation_id: &str,
    ) -> AppResult<FormationAssignment> {
        self.repository
            .get_global_by_id_and_formation_id(id, formation_id)
            .await
            .map_err(|error| {
                error.context(format!(
                    "while getting formation assignment with ID: '{id}' and formation ID: '{formation_id}' globally"
                ))
            })
    }

    /// Returns the assignment pointing from `source` to `target`.
    pub async fn get_by_target_and_source(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        target: &str,
        source: &str,
    ) -> AppResult<FormationAssignment> {
        self.repository
            .get_by_target_and_source(tenant_id, formation_id, target, source)
            .await
            .map_err(|error| {
                error.context(format!(
                    "while getting formation assignment by target: '{target}' and source: '{source}'"
                ))
            })
    }

    /// Returns the reverse of the `(source, target)` assignment.
    pub async fn get_reverse_by_source_and_target(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        source: &str,
        target: &str,
    ) -> AppResult<FormationAssignment> {
        self.repository
            .get_reverse_by_source_and_target(tenant_id, formation_id, source, target)
            .await
            .map_err(|error| {
                error.context(format!(
                    "while getting reverse formation assignment by source: '{source}' and target: '{target}'"
                ))
            })
    }

    /// Lists one page of the tenant's assignments.
    pub async fn list(
        &self,
        tenant_id: TenantId,
        page_size: usize,
        cursor: &str,
    ) -> AppResult<Page<FormationAssignment>> {
        validate_page_size(page_size)?;
        self.repository.list(tenant_id, page_size, cursor).await
    }

    /// Lists one page per formation.
    pub async fn list_by_formation_ids(
        &self,
        tenant_id: TenantId,
        formation_ids: &[String],
        page_size: usize,
        cursor: &str,
    ) -> AppResult<Vec<Page<FormationAssignment>>> {
        validate_page_size(page_size)?;
        self.repository
            .list_by_formation_ids(tenant_id, formation_ids, page_size, cursor)
            .await
    }

    /// Lists a formation's assignments where the object is source or target.
    pub async fn list_all_for_object(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        object_id: &str,
    ) -> AppResult<Vec<FormationAssignment>> {
        self.repository
            .list_all_for_object(tenant_id, formation_id, object_id)
            .await
    }

    /// Lists a formation's assignments where any object is source or target.
    pub async fn list_all_for_object_ids(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        object_ids: &[String],
    ) -> AppResult<Vec<FormationAssignment>> {
        self.repository
            .list_all_for_object_ids(tenant_id, formation_id, object_ids)
            .await
    }

    /// Lists assignments in any tenant where the object is source or target.
    pub async fn list_all_for_object_global(
        &self,
        object_id: &str,
    ) -> AppResult<Vec<FormationAssignment>> {
        self.repository.list_all_for_object_global(object_id).await
    }

    /// Lists the tenant's assignments with the given ids.
    pub async fn list_for_ids(
        &self,
        tenant_id: TenantId,
        ids: &[String],
    ) -> AppResult<Vec<FormationAssignment>> {
        self.repository.list_for_ids(tenant_id, ids).await
    }

    /// Lists all assignments of a formation.
    pub async fn get_assignments_for_formation(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
    ) -> AppResult<Vec<FormationAssignment>> {
        self.repository
            .get_assignments_for_formation(tenant_id, formation_id)
            .await
    }

    /// Lists assignments of a formation in any of the given states.
    pub async fn get_assignments_for_formation_with_states(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        states: &[AssignmentState],
    ) -> AppResult<Vec<FormationAssignment>> {
        self.repository
            .get_assignments_for_formation_with_states(tenant_id, formation_id, states)
            .await
    }

    /// Replaces a stored assignment owned by the tenant.
    pub async fn update(
        &self,
        tenant_id: TenantId,
        assignment: &FormationAssignment,
    ) -> AppResult<()> {
        let exists = self
            .repository
            .exists(tenant_id, assignment.id.as_str())
            .await
            .map_err(|error| {
                error.context(format!(
                    "while ensuring formation assignment with ID: '{}' exists",
                    assignment.id
                ))
            })?;
        if !exists {
            return Err(AppError::NotFound(format!(
                "formation assignment with ID: '{}' not found",
                assignment.id
            )));
        }

        self.repository
            .update(assignment)
            .await
            .map_err(|error| match error {
                AppError::Unauthorized(_) => AppError::NotFound(format!(
                    "formation assignment with ID: '{}' not found",
                    assignment.id
                )),
                other => other.context(format!(
                    "while updating formation assignment with ID: '{}'",
                    assignment.id
                )),
            })
    }

    /// Stamps the time a notification was last sent for an assignment.
    pub async fn update_last_notification_sent_timestamp(&self, id: &str) -> AppResult<()> {
        self.repository
            .update_last_notification_sent_timestamp(id)
            .await
            .map_err(|error| {
                error.context(format!(
                    "while updating last notification sent timestamp of formation assignment with ID: '{id}'"
                ))
            })
    }

    /// Deletes one assignment owned by the tenant.
    pub async fn delete(&self, tenant_id: TenantId, id: &str) -> AppResult<()> {
        self.repository
            .delete(tenant_id, id)
            .await
            .map_err(|error| match error {
                AppError::Unauthorized(_) => {
                    AppError::NotFound(format!("formation assignment with ID: '{id}' not found"))
                }
                other => other.context(format!("while deleting formation assignment with ID: '{id}'")),
            })
    }

    /// Deletes a formation's assignments where the object is source or target.
    pub async fn delete_assignments_for_object_id(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        object_id: &str,
    ) -> AppResult<()> {
        self.repository
            .delete_assignments_for_object_id(tenant_id, formation_id, object_id)
            .await
    }

    /// Returns whether the tenant owns an assignment with the id.
    pub async fn exists(&self, tenant_id: TenantId, id: &str) -> AppResult<bool> {
        self.repository.exists(tenant_id, id).await
    }

    /// Moves an assignment to an error state without constraint enforcement.
    pub async fn set_assignment_to_error_state(
        &self,
        tenant_id: TenantId,
        mut assignment: FormationAssignment,
        message: &str,
        error_code: AssignmentErrorCode,
        state: AssignmentState,
    ) -> AppResult<FormationAssignment> {
        assignment.set_error(message, error_code, state)?;
        self.update(tenant_id, &assignment).await?;
        Ok(assignment)
    }
}

fn validate_page_size(page_size: usize) -> AppResult<()> {
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(AppError::Validation(format!(
            "page size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }

    Ok(())
}
