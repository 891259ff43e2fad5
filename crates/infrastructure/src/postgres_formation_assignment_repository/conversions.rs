use tessera_domain::ParticipantType;

use super::*;

impl TryFrom<FormationAssignmentRow> for FormationAssignment {
    type Error = AppError;

    fn try_from(row: FormationAssignmentRow) -> AppResult<Self> {
        Ok(Self {
            source_type: ParticipantType::parse(row.source_type.as_str())?,
            target_type: ParticipantType::parse(row.target_type.as_str())?,
            state: AssignmentState::parse(row.state.as_str())?,
            id: row.id,
            formation_id: row.formation_id,
            tenant_id: TenantId::from_uuid(row.tenant_id),
            source: row.source,
            target: row.target,
            value: row.value,
            error: row.error,
            last_state_change_timestamp: row.last_state_change_timestamp,
            last_notification_sent_timestamp: row.last_notification_sent_timestamp,
        })
    }
}

impl From<&FormationAssignment> for FormationAssignmentRow {
    fn from(assignment: &FormationAssignment) -> Self {
        Self {
            id: assignment.id.clone(),
            formation_id: assignment.formation_id.clone(),
            tenant_id: assignment.tenant_id.as_uuid(),
            source: assignment.source.clone(),
            source_type: assignment.source_type.as_str().to_owned(),
            target: assignment.target.clone(),
            target_type: assignment.target_type.as_str().to_owned(),
            state: assignment.state.as_str().to_owned(),
            value: assignment.value.clone(),
            error: assignment.error.clone(),
            last_state_change_timestamp: assignment.last_state_change_timestamp,
            last_notification_sent_timestamp: assignment.last_notification_sent_timestamp,
        }
    }
}

pub(super) fn rows_to_assignments(
    rows: Vec<FormationAssignmentRow>,
) -> AppResult<Vec<FormationAssignment>> {
    rows.into_iter().map(FormationAssignment::try_from).collect()
}
