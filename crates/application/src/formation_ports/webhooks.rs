use async_trait::async_trait;
use tessera_core::{AppResult, TenantId};
use tessera_domain::{Webhook, WebhookOwnerType, WebhookType};

/// Read port for participant webhooks.
#[async_trait]
pub trait WebhookRepository: Send + Sync {
    /// Returns the webhook of a type registered on an object.
    ///
    /// Fails with `AppError::NotFound` when the object has no such webhook.
    async fn get_by_id_and_webhook_type(
        &self,
        tenant_id: TenantId,
        object_id: &str,
        object_type: WebhookOwnerType,
        webhook_type: WebhookType,
    ) -> AppResult<Webhook>;
}
