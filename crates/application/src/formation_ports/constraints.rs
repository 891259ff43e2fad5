use async_trait::async_trait;
use tessera_core::AppResult;
use tessera_domain::{JoinPointLocation, NotificationStatusReturnedDetails};

/// Pluggable policy evaluator invoked around assignment mutations.
#[async_trait]
pub trait ConstraintEngine: Send + Sync {
    /// Enforces the constraints attached to a join point of a formation template.
    async fn enforce_constraints(
        &self,
        location: JoinPointLocation,
        details: &NotificationStatusReturnedDetails,
        formation_template_id: &str,
    ) -> AppResult<()>;
}
