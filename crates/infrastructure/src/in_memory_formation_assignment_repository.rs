use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tessera_application::FormationAssignmentRepository;
use tessera_core::{AppError, AppResult, Page, TenantId, decode_offset_cursor};
use tessera_domain::{AssignmentState, FormationAssignment};
use tokio::sync::RwLock;

use crate::state_change_timestamp::next_state_change_timestamp;

#[cfg(test)]
mod tests;

/// In-memory formation assignment repository implementation.
///
/// Rows are kept ordered by id, which is also the paging order.
#[derive(Debug, Default)]
pub struct InMemoryFormationAssignmentRepository {
    assignments: RwLock<BTreeMap<String, FormationAssignment>>,
}

impl InMemoryFormationAssignmentRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn find(
        &self,
        id: &str,
        predicate: impl Fn(&FormationAssignment) -> bool,
    ) -> AppResult<FormationAssignment> {
        self.assignments
            .read()
            .await
            .get(id)
            .filter(|assignment| predicate(*assignment))
            .cloned()
            .ok_or_else(|| {
                AppError::NotFound(format!("formation assignment with ID: '{id}' not found"))
            })
    }

    async fn filter(
        &self,
        predicate: impl Fn(&FormationAssignment) -> bool,
    ) -> Vec<FormationAssignment> {
        self.assignments
            .read()
            .await
            .values()
            .filter(|assignment| predicate(*assignment))
            .cloned()
            .collect()
    }
}

fn page_of(
    rows: Vec<FormationAssignment>,
    cursor: &str,
    offset: usize,
    page_size: usize,
) -> Page<FormationAssignment> {
    let total_count = rows.len();
    let data = rows.into_iter().skip(offset).take(page_size).collect();
    Page::from_offset_window(data, total_count, cursor, offset, page_size)
}

fn touches(assignment: &FormationAssignment, object_id: &str) -> bool {
    assignment.source == object_id || assignment.target == object_id
}

#[async_trait]
impl FormationAssignmentRepository for InMemoryFormationAssignmentRepository {
    async fn create(&self, assignment: &FormationAssignment) -> AppResult<()> {
        let mut assignments = self.assignments.write().await;

        let duplicate_pair = assignments.values().any(|stored| {
            stored.formation_id == assignment.formation_id
                && stored.source == assignment.source
                && stored.target == assignment.target
        });
        if assignments.contains_key(assignment.id.as_str()) || duplicate_pair {
            return Err(AppError::Conflict(format!(
                "formation assignment from '{}' to '{}' already exists in formation '{}'",
                assignment.source, assignment.target, assignment.formation_id
            )));
        }

        let mut stored = assignment.clone();
        stored.last_state_change_timestamp =
            stored.last_state_change_timestamp.or_else(|| Some(Utc::now()));
        assignments.insert(stored.id.clone(), stored);
        Ok(())
    }

    async fn get(&self, tenant_id: TenantId, id: &str) -> AppResult<FormationAssignment> {
        self.find(id, |assignment| assignment.tenant_id == tenant_id)
            .await
    }

    async fn get_for_formation(
        &self,
        tenant_id: TenantId,
        id: &str,
        formation_id: &str,
    ) -> AppResult<FormationAssignment> {
        self.find(id, |assignment| {
            assignment.tenant_id == tenant_id && assignment.formation_id == formation_id
        })
        .await
    }

    async fn get_global_by_id(&self, id: &str) -> AppResult<FormationAssignment> {
        self.find(id, |_| true).await
    }

    async fn get_global_by_id_and_formation_id(
        &self,
        id: &str,
        formation_id: &str,
    ) -> AppResult<FormationAssignment> {
        self.find(id, |assignment| assignment.formation_id == formation_id)
            .await
    }

    async fn get_by_source_and_target(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        source: &str,
        target: &str,
    ) -> AppResult<FormationAssignment> {
        self.filter(|assignment| {
            assignment.tenant_id == tenant_id
                && assignment.formation_id == formation_id
                && assignment.source == source
                && assignment.target == target
        })
        .await
        .into_iter()
        .next()
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "formation assignment with source '{source}' and target '{target}' not found in formation '{formation_id}'"
            ))
        })
    }

    async fn list(
        &self,
        tenant_id: TenantId,
        page_size: usize,
        cursor: &str,
    ) -> AppResult<Page<FormationAssignment>> {
        let offset = decode_offset_cursor(cursor)?;
        let rows = self
            .filter(|assignment| assignment.tenant_id == tenant_id)
            .await;

        Ok(page_of(rows, cursor, offset, page_size))
    }

    async fn list_by_formation_ids(
        &self,
        tenant_id: TenantId,
        formation_ids: &[String],
        page_size: usize,
        cursor: &str,
    ) -> AppResult<Vec<Page<FormationAssignment>>> {
        let offset = decode_offset_cursor(cursor)?;
        let rows = self
            .filter(|assignment| {
                assignment.tenant_id == tenant_id && formation_ids.contains(&assignment.formation_id)
            })
            .await;

        Ok(formation_ids
            .iter()
            .map(|formation_id| {
                let formation_rows = rows
                    .iter()
                    .filter(|assignment| &assignment.formation_id == formation_id)
                    .cloned()
                    .collect();
                page_of(formation_rows, cursor, offset, page_size)
            })
            .collect())
    }

    async fn list_all_for_object(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        object_id: &str,
    ) -> AppResult<Vec<FormationAssignment>> {
        Ok(self
            .filter(|assignment| {
                assignment.tenant_id == tenant_id
                    && assignment.formation_id == formation_id
                    && touches(assignment, object_id)
            })
            .await)
    }

    async fn list_all_for_object_ids(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        object_ids: &[String],
    ) -> AppResult<Vec<FormationAssignment>> {
        Ok(self
            .filter(|assignment| {
                assignment.tenant_id == tenant_id
                    && assignment.formation_id == formation_id
                    && object_ids
                        .iter()
                        .any(|object_id| touches(assignment, object_id))
            })
            .await)
    }

    async fn list_all_for_object_global(
        &self,
        object_id: &str,
    ) -> AppResult<Vec<FormationAssignment>> {
        Ok(self
            .filter(|assignment| touches(assignment, object_id))
            .await)
    }

    async fn list_for_ids(
        &self,
        tenant_id: TenantId,
        ids: &[String],
    ) -> AppResult<Vec<FormationAssignment>> {
        Ok(self
            .filter(|assignment| assignment.tenant_id == tenant_id && ids.contains(&assignment.id))
            .await)
    }

    async fn get_assignments_for_formation(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
    ) -> AppResult<Vec<FormationAssignment>> {
        Ok(self
            .filter(|assignment| {
                assignment.tenant_id == tenant_id && assignment.formation_id == formation_id
            })
            .await)
    }

    async fn get_assignments_for_formation_with_states(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        states: &[AssignmentState],
    ) -> AppResult<Vec<FormationAssignment>> {
        Ok(self
            .filter(|assignment| {
                assignment.tenant_id == tenant_id
                    && assignment.formation_id == formation_id
                    && states.contains(&assignment.state)
            })
            .await)
    }

    async fn update(&self, assignment: &FormationAssignment) -> AppResult<()> {
        let mut assignments = self.assignments.write().await;
        let stored = assignments.get_mut(assignment.id.as_str()).ok_or_else(|| {
            AppError::NotFound(format!(
                "formation assignment with ID: '{}' not found",
                assignment.id
            ))
        })?;

        stored.last_state_change_timestamp = next_state_change_timestamp(
            stored.state,
            stored.value.as_deref(),
            stored.last_state_change_timestamp,
            assignment,
            Utc::now(),
        );
        stored.state = assignment.state;
        stored.value = assignment.value.clone();
        stored.error = assignment.error.clone();
        Ok(())
    }

    async fn update_last_notification_sent_timestamp(&self, id: &str) -> AppResult<()> {
        let mut assignments = self.assignments.write().await;
        let stored = assignments.get_mut(id).ok_or_else(|| {
            AppError::NotFound(format!("formation assignment with ID: '{id}' not found"))
        })?;

        stored.last_notification_sent_timestamp = Some(Utc::now());
        Ok(())
    }

    async fn delete(&self, tenant_id: TenantId, id: &str) -> AppResult<()> {
        let mut assignments = self.assignments.write().await;
        let owned = assignments
            .get(id)
            .is_some_and(|assignment| assignment.tenant_id == tenant_id);
        if !owned {
            return Err(AppError::Unauthorized(format!(
                "tenant '{tenant_id}' has no access to formation assignment '{id}'"
            )));
        }

        assignments.remove(id);
        Ok(())
    }

    async fn delete_assignments_for_object_id(
        &self,
        tenant_id: TenantId,
        formation_id: &str,
        object_id: &str,
    ) -> AppResult<()> {
        self.assignments.write().await.retain(|_, assignment| {
            !(assignment.tenant_id == tenant_id
                && assignment.formation_id == formation_id
                && touches(assignment, object_id))
        });
        Ok(())
    }

    async fn exists(&self, tenant_id: TenantId, id: &str) -> AppResult<bool> {
        Ok(self
            .assignments
            .read()
            .await
            .get(id)
            .is_some_and(|assignment| assignment.tenant_id == tenant_id))
    }
}
