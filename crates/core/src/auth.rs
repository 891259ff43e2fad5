use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult, TenantId};

/// Kind of caller recognised by the edge authenticator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsumerType {
    /// Human user.
    User,
    /// Registered application.
    Application,
    /// Registered runtime.
    Runtime,
    /// Integration system managing applications on behalf of tenants.
    IntegrationSystem,
    /// Business integration acting on formations.
    BusinessIntegration,
    /// Caller authenticated with an external certificate.
    ExternalCertificate,
    /// Operator with global access.
    SuperAdmin,
}

impl ConsumerType {
    /// Returns the stable wire value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Application => "Application",
            Self::Runtime => "Runtime",
            Self::IntegrationSystem => "Integration System",
            Self::BusinessIntegration => "Business Integration",
            Self::ExternalCertificate => "External Certificate",
            Self::SuperAdmin => "Super Admin",
        }
    }

    /// Parses the wire value.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value.trim() {
            "User" => Ok(Self::User),
            "Application" => Ok(Self::Application),
            "Runtime" => Ok(Self::Runtime),
            "Integration System" => Ok(Self::IntegrationSystem),
            "Business Integration" => Ok(Self::BusinessIntegration),
            "External Certificate" => Ok(Self::ExternalCertificate),
            "Super Admin" => Ok(Self::SuperAdmin),
            other => Err(AppError::Validation(format!(
                "unknown consumer type '{other}'"
            ))),
        }
    }
}

impl Display for ConsumerType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Authenticated caller of an inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerIdentity {
    consumer_id: String,
    consumer_type: ConsumerType,
}

impl ConsumerIdentity {
    /// Creates a consumer identity.
    #[must_use]
    pub fn new(consumer_id: impl Into<String>, consumer_type: ConsumerType) -> Self {
        Self {
            consumer_id: consumer_id.into(),
            consumer_type,
        }
    }

    /// Returns the consumer identifier.
    #[must_use]
    pub fn consumer_id(&self) -> &str {
        self.consumer_id.as_str()
    }

    /// Returns the consumer kind.
    #[must_use]
    pub fn consumer_type(&self) -> ConsumerType {
        self.consumer_type
    }
}

/// Internal and external identifiers of the caller's tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantPair {
    internal: TenantId,
    external: String,
}

impl TenantPair {
    /// Creates a tenant pair.
    #[must_use]
    pub fn new(internal: TenantId, external: impl Into<String>) -> Self {
        Self {
            internal,
            external: external.into(),
        }
    }

    /// Returns the internal tenant used for ownership checks.
    #[must_use]
    pub fn internal(&self) -> TenantId {
        self.internal
    }

    /// Returns the external tenant id, e.g. a subaccount id.
    #[must_use]
    pub fn external(&self) -> &str {
        self.external.as_str()
    }
}
