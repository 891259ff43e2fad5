use std::sync::Arc;

use tessera_core::{AppError, AppResult, ConsumerIdentity, ConsumerType, TenantPair};
use tessera_domain::{FormationAssignment, ParticipantType};
use tracing::{info, warn};

use crate::formation_ports::{
    ApplicationRepository, ApplicationTemplateRepository, FormationAssignmentRepository,
    LabelRepository, LabelableObject, RuntimeContextRepository, RuntimeRepository,
};


/// Label keys identifying subscription-provider application templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionLabelKeys {
    /// Label present on provider templates.
    pub self_register_distinguish_label_key: String,
    /// Label carrying the provider subaccount.
    pub consumer_subaccount_label_key: String,
}

impl Default for SubscriptionLabelKeys {
    fn default() -> Self {
        Self {
            self_register_distinguish_label_key: "subscriptionProviderId".to_owned(),
            consumer_subaccount_label_key: "global_subaccount_id".to_owned(),
        }
    }
}

/// Decides whether a caller may report status for a formation assignment.
///
/// `Ok(false)` and `Err(AppError::Unauthorized)` both deny the caller; any other
/// error is an internal failure.
#[derive(Clone)]
pub struct FormationAssignmentCallbackAuthorizer {
    assignment_repository: Arc<dyn FormationAssignmentRepository>,
    application_repository: Arc<dyn ApplicationRepository>,
    application_template_repository: Arc<dyn ApplicationTemplateRepository>,
    runtime_repository: Arc<dyn RuntimeRepository>,
    runtime_context_repository: Arc<dyn RuntimeContextRepository>,
    label_repository: Arc<dyn LabelRepository>,
    subscription_label_keys: SubscriptionLabelKeys,
}

impl FormationAssignmentCallbackAuthorizer {
    /// Creates the authorizer from its collaborators.
    #[must_use]
    pub fn new(
        assignment_repository: Arc<dyn FormationAssignmentRepository>,
        application_repository: Arc<dyn ApplicationRepository>,
        application_template_repository: Arc<dyn ApplicationTemplateRepository>,
        runtime_repository: Arc<dyn RuntimeRepository>,
        runtime_context_repository: Arc<dyn RuntimeContextRepository>,
        label_repository: Arc<dyn LabelRepository>,
    ) -> Self {
        Self {
            assignment_repository,
            application_repository,
            application_template_repository,
            runtime_repository,
            runtime_context_repository,
            label_repository,
            subscription_label_keys: SubscriptionLabelKeys::default(),
        }
    }

    /// Overrides the subscription-provider label keys.
    #[must_use]
    pub fn with_subscription_label_keys(
        mut self,
        subscription_label_keys: SubscriptionLabelKeys,
    ) -> Self {
        self.subscription_label_keys = subscription_label_keys;
        self
    }

    /// Returns whether the caller may update the assignment.
    pub async fn is_authorized(
        &self,
        consumer: &ConsumerIdentity,
        tenant_pair: &TenantPair,
        assignment_id: &str,
        formation_id: &str,
    ) -> AppResult<bool> {
        let assignment = self
            .assignment_repository
            .get_global_by_id_and_formation_id(assignment_id, formation_id)
            .await
            .map_err(|error| {
                error.context(format!(
                    "while getting formation assignment with ID: '{assignment_id}' and formation ID: '{formation_id}' globally"
                ))
            })?;

        info!(
            consumer_id = consumer.consumer_id(),
            consumer_type = %consumer.consumer_type(),
            internal_tenant = %tenant_pair.internal(),
            external_tenant = tenant_pair.external(),
            assignment_id = %assignment.id,
            formation_id = %assignment.formation_id,
            target = %assignment.target,
            target_type = %assignment.target_type,
            "authorizing formation assignment status update"
        );

        match assignment.target_type {
            ParticipantType::Application => {
                self.authorize_application_target(consumer, tenant_pair, &assignment)
                    .await
            }
            ParticipantType::Runtime if is_runtime_consumer(consumer.consumer_type()) => {
                self.runtime_owner_exists(consumer, tenant_pair, assignment.target.as_str())
                    .await
            }
            ParticipantType::RuntimeContext if is_runtime_consumer(consumer.consumer_type()) => {
                let runtime_context = self
                    .runtime_context_repository
                    .get_global_by_id(assignment.target.as_str())
                    .await
                    .map_err(|error| {
                        error.context(format!(
                            "while getting runtime context with ID: '{}' globally",
                            assignment.target
                        ))
                    })?;
                self.runtime_owner_exists(consumer, tenant_pair, runtime_context.runtime_id.as_str())
                    .await
            }
            ParticipantType::Runtime | ParticipantType::RuntimeContext => Ok(false),
        }
    }

    async fn authorize_application_target(
        &self,
        consumer: &ConsumerIdentity,
        tenant_pair: &TenantPair,
        assignment: &FormationAssignment,
    ) -> AppResult<bool> {
        let application = self
            .application_repository
            .get_global_by_id(assignment.target.as_str())
            .await
            .map_err(|error| {
                error.context(format!(
                    "while getting application with ID: '{}' globally",
                    assignment.target
                ))
            })?;

        if consumer.consumer_type() == ConsumerType::IntegrationSystem
            && application.integration_system_id.as_deref() == Some(consumer.consumer_id())
        {
            info!(
                consumer_id = consumer.consumer_id(),
                application_id = %application.id,
                "integration system manages the target application"
            );
            return Ok(true);
        }

        match self
            .application_repository
            .owner_exists(tenant_pair.internal(), application.id.as_str())
            .await
        {
            Ok(true) => {
                info!(
                    internal_tenant = %tenant_pair.internal(),
                    application_id = %application.id,
                    "caller tenant owns the target application"
                );
                return Ok(true);
            }
            Ok(false) => {}
            Err(error) => {
                warn!(
                    internal_tenant = %tenant_pair.internal(),
                    application_id = %application.id,
                    %error,
                    "failed to verify application ownership"
                );
            }
        }

        self.validate_subscription_provider(
            application.application_template_id.as_deref(),
            tenant_pair,
            application.id.as_str(),
        )
        .await
    }

    async fn validate_subscription_provider(
        &self,
        application_template_id: Option<&str>,
        tenant_pair: &TenantPair,
        application_id: &str,
    ) -> AppResult<bool> {
        let Some(application_template_id) =
            application_template_id.filter(|template_id| !template_id.is_empty())
        else {
            warn!(application_id, "application template ID should not be empty");
            return Ok(false);
        };

        let template_exists = self
            .application_template_repository
            .exists(application_template_id)
            .await
            .map_err(|error| {
                AppError::Unauthorized(format!(
                    "while checking application template existence for ID: '{application_template_id}': {error}"
                ))
            })?;
        if !template_exists {
            return Err(AppError::Unauthorized(format!(
                "application template with ID: '{application_template_id}' doesn't exist"
            )));
        }

        let labels = self
            .label_repository
            .list_for_global_object(LabelableObject::ApplicationTemplate, application_template_id)
            .await
            .map_err(|error| {
                error.context(format!(
                    "while getting labels for application template with ID: '{application_template_id}'"
                ))
            })?;

        let keys = &self.subscription_label_keys;
        let (Some(_), Some(subaccount)) = (
            labels.get(keys.self_register_distinguish_label_key.as_str()),
            labels.get(keys.consumer_subaccount_label_key.as_str()),
        ) else {
            return Err(AppError::Unauthorized(format!(
                "both '{}' and '{}' labels should be provided as part of the provider's application template",
                keys.self_register_distinguish_label_key, keys.consumer_subaccount_label_key
            )));
        };

        let Some(subaccount) = subaccount.as_str() else {
            return Err(AppError::Unauthorized(format!(
                "unexpected type of '{}' label, expected a string",
                keys.consumer_subaccount_label_key
            )));
        };

        if subaccount == tenant_pair.external() {
            info!(
                external_tenant = tenant_pair.external(),
                application_id, "caller is the subscription provider of the target application"
            );
            return Ok(true);
        }

        Ok(false)
    }

    async fn runtime_owner_exists(
        &self,
        consumer: &ConsumerIdentity,
        tenant_pair: &TenantPair,
        runtime_id: &str,
    ) -> AppResult<bool> {
        let exists = self
            .runtime_repository
            .owner_exists(tenant_pair.internal(), runtime_id)
            .await
            .map_err(|error| {
                AppError::Unauthorized(format!(
                    "while verifying caller with ID: '{}' and type: '{}' has owner access to runtime with ID: '{runtime_id}': {error}",
                    tenant_pair.internal(),
                    consumer.consumer_type()
                ))
            })?;

        if exists {
            info!(
                internal_tenant = %tenant_pair.internal(),
                runtime_id, "caller tenant owns the target runtime"
            );
        }

        Ok(exists)
    }
}

fn is_runtime_consumer(consumer_type: ConsumerType) -> bool {
    matches!(
        consumer_type,
        ConsumerType::Runtime | ConsumerType::ExternalCertificate | ConsumerType::SuperAdmin
    )
}
