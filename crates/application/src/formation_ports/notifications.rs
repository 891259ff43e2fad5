use async_trait::async_trait;
use tessera_core::{AppResult, TenantId};
use tessera_domain::{
    ApplicationTemplateWithLabels, ApplicationWithLabels, CustomerTenantContext,
    FormationAssignment, FormationOperation, NotificationDetails, NotificationRequest,
    ParticipantType, RuntimeContextWithLabels, RuntimeWithLabels, Webhook,
};

/// Input for a configuration-change notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationChangeInput {
    /// Operation being notified.
    pub operation: FormationOperation,
    /// Formation id.
    pub formation_id: String,
    /// Customer metadata of the owning tenant.
    pub customer_tenant_context: CustomerTenantContext,
    /// Application template snapshot.
    pub application_template: Option<ApplicationTemplateWithLabels>,
    /// Application snapshot.
    pub application: ApplicationWithLabels,
    /// Runtime snapshot.
    pub runtime: RuntimeWithLabels,
    /// Runtime context snapshot.
    pub runtime_context: Option<RuntimeContextWithLabels>,
    /// Forward assignment.
    pub assignment: FormationAssignment,
    /// Reverse assignment.
    pub reverse_assignment: FormationAssignment,
    /// Kind of the notified participant.
    pub resource_type: ParticipantType,
}

/// Input for an application tenant mapping notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationTenantMappingInput {
    /// Operation being notified.
    pub operation: FormationOperation,
    /// Formation id.
    pub formation_id: String,
    /// Customer metadata of the owning tenant.
    pub customer_tenant_context: CustomerTenantContext,
    /// Source application template snapshot.
    pub source_application_template: Option<ApplicationTemplateWithLabels>,
    /// Source application snapshot.
    pub source_application: ApplicationWithLabels,
    /// Target application template snapshot.
    pub target_application_template: Option<ApplicationTemplateWithLabels>,
    /// Target application snapshot.
    pub target_application: ApplicationWithLabels,
    /// Forward assignment.
    pub assignment: FormationAssignment,
    /// Reverse assignment.
    pub reverse_assignment: FormationAssignment,
}

/// Renders notification details into transport-level requests.
#[async_trait]
pub trait NotificationBuilder: Send + Sync {
    /// Assembles configuration-change details.
    fn prepare_details_for_configuration_change_notification_generation(
        &self,
        input: ConfigurationChangeInput,
    ) -> AppResult<NotificationDetails>;

    /// Assembles application tenant mapping details.
    fn prepare_details_for_application_tenant_mapping_notification_generation(
        &self,
        input: ApplicationTenantMappingInput,
    ) -> AppResult<NotificationDetails>;

    /// Renders the request for a webhook of a formation template.
    async fn build_notification_request(
        &self,
        formation_template_id: &str,
        details: &NotificationDetails,
        webhook: &Webhook,
    ) -> AppResult<NotificationRequest>;
}

/// Loads labelled participant snapshots.
#[async_trait]
pub trait ParticipantDataBuilder: Send + Sync {
    /// Loads an application and, when it has one, its template.
    async fn prepare_application_and_app_template_with_labels(
        &self,
        tenant_id: TenantId,
        application_id: &str,
    ) -> AppResult<(ApplicationWithLabels, Option<ApplicationTemplateWithLabels>)>;

    /// Loads a runtime.
    async fn prepare_runtime_with_labels(
        &self,
        tenant_id: TenantId,
        runtime_id: &str,
    ) -> AppResult<RuntimeWithLabels>;

    /// Loads a runtime context.
    async fn prepare_runtime_context_with_labels(
        &self,
        tenant_id: TenantId,
        runtime_context_id: &str,
    ) -> AppResult<RuntimeContextWithLabels>;

    /// Loads a runtime and its first context, if any.
    async fn prepare_runtime_and_runtime_context_with_labels(
        &self,
        tenant_id: TenantId,
        runtime_id: &str,
    ) -> AppResult<(RuntimeWithLabels, Option<RuntimeContextWithLabels>)>;
}

/// Resolves customer metadata of a tenant.
#[async_trait]
pub trait TenantContextResolver: Send + Sync {
    /// Returns the customer context embedded in notifications for the tenant.
    async fn customer_tenant_context(&self, tenant_id: TenantId)
    -> AppResult<CustomerTenantContext>;
}
