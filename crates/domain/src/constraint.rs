use std::fmt::{Display, Formatter};

use tessera_core::TenantId;

use crate::assignment::FormationAssignment;
use crate::formation::{Formation, FormationOperation, FormationTemplate};
use crate::participant::ParticipantType;
use crate::status::NotificationStatusReport;

/// Side of a mutation a constraint runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintPhase {
    /// Before the mutation, able to veto it.
    Pre,
    /// After the mutation committed.
    Post,
}

impl ConstraintPhase {
    /// Returns stable phase value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pre => "PRE",
            Self::Post => "POST",
        }
    }
}

/// Operation a constraint is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetOperation {
    /// A notified side returned a status.
    NotificationStatusReturned,
}

impl TargetOperation {
    /// Returns stable operation value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotificationStatusReturned => "NOTIFICATION_STATUS_RETURNED",
        }
    }
}

/// Named hook point a constraint engine is invoked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JoinPointLocation {
    /// Operation the hook belongs to.
    pub operation: TargetOperation,
    /// Side of the mutation.
    pub phase: ConstraintPhase,
}

impl JoinPointLocation {
    /// Hook before a returned status is persisted.
    pub const PRE_NOTIFICATION_STATUS_RETURNED: Self = Self {
        operation: TargetOperation::NotificationStatusReturned,
        phase: ConstraintPhase::Pre,
    };

    /// Hook after a returned status is persisted.
    pub const POST_NOTIFICATION_STATUS_RETURNED: Self = Self {
        operation: TargetOperation::NotificationStatusReturned,
        phase: ConstraintPhase::Post,
    };
}

impl Display for JoinPointLocation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "target operation {} and constraint type {}",
            self.operation.as_str(),
            self.phase.as_str()
        )
    }
}

/// Details handed to the constraint engine around a status mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationStatusReturnedDetails {
    /// Kind of the assignment target.
    pub resource_type: ParticipantType,
    /// Subtype of the assignment target, empty when unknown.
    pub resource_subtype: String,
    /// Hook the details are evaluated at.
    pub location: JoinPointLocation,
    /// Acting tenant.
    pub tenant_id: TenantId,
    /// Operation in flight.
    pub operation: FormationOperation,
    /// Assignment being mutated.
    pub assignment: FormationAssignment,
    /// Reverse assignment, when it exists.
    pub reverse_assignment: Option<FormationAssignment>,
    /// Reported status.
    pub status_report: NotificationStatusReport,
    /// Owning formation.
    pub formation: Formation,
    /// Template of the owning formation.
    pub formation_template: FormationTemplate,
}

impl NotificationStatusReturnedDetails {
    /// Returns a copy of the details bound to another hook.
    #[must_use]
    pub fn at(&self, location: JoinPointLocation) -> Self {
        Self {
            location,
            ..self.clone()
        }
    }
}
