use async_trait::async_trait;
use tessera_application::ConstraintEngine;
use tessera_core::AppResult;
use tessera_domain::{JoinPointLocation, NotificationStatusReturnedDetails};
use tracing::info;

/// Constraint engine that admits every operation and traces each join point.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveConstraintEngine;

impl PermissiveConstraintEngine {
    /// Creates a new engine.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ConstraintEngine for PermissiveConstraintEngine {
    async fn enforce_constraints(
        &self,
        location: JoinPointLocation,
        details: &NotificationStatusReturnedDetails,
        formation_template_id: &str,
    ) -> AppResult<()> {
        info!(
            %location,
            formation_template_id,
            assignment_id = %details.assignment.id,
            formation_id = %details.formation.id,
            resource_type = %details.resource_type,
            resource_subtype = %details.resource_subtype,
            "no constraints attached to join point"
        );
        Ok(())
    }
}
