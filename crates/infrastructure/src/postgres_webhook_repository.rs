use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tessera_application::WebhookRepository;
use tessera_core::{AppError, AppResult, TenantId};
use tessera_domain::{Webhook, WebhookMode, WebhookOwnerType, WebhookType};

/// PostgreSQL-backed webhook reader.
#[derive(Clone)]
pub struct PostgresWebhookRepository {
    pool: PgPool,
}

impl PostgresWebhookRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct WebhookRow {
    id: String,
    object_id: String,
    object_type: String,
    webhook_type: String,
    url: Option<String>,
    mode: String,
}

#[async_trait]
impl WebhookRepository for PostgresWebhookRepository {
    async fn get_by_id_and_webhook_type(
        &self,
        tenant_id: TenantId,
        object_id: &str,
        object_type: WebhookOwnerType,
        webhook_type: WebhookType,
    ) -> AppResult<Webhook> {
        // Tenant-less rows are registered globally on the object.
        let row = sqlx::query_as::<_, WebhookRow>(
            r#"
            SELECT id, object_id, object_type, webhook_type, url, mode
            FROM webhooks
            WHERE object_id = $1
              AND object_type = $2
              AND webhook_type = $3
              AND (tenant_id IS NULL OR tenant_id = $4)
            ORDER BY tenant_id NULLS LAST
            LIMIT 1
            "#,
        )
        .bind(object_id)
        .bind(object_type.as_str())
        .bind(webhook_type.as_str())
        .bind(tenant_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to get {} webhook for {} '{object_id}': {error}",
                webhook_type.as_str(),
                object_type.as_str()
            ))
        })?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "webhook of type '{}' not found for {} with ID: '{object_id}'",
                webhook_type.as_str(),
                object_type.as_str()
            ))
        })?;

        Ok(Webhook {
            object_type: WebhookOwnerType::parse(row.object_type.as_str())?,
            webhook_type: WebhookType::parse(row.webhook_type.as_str())?,
            mode: WebhookMode::parse(row.mode.as_str())?,
            id: row.id,
            object_id: row.object_id,
            url: row.url,
        })
    }
}
