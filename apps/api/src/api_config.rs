use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use tessera_application::{SubscriptionLabelKeys, SubtypeLabelKeys};
use tessera_core::AppError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub database_max_connections: u32,
    pub api_host: String,
    pub api_port: u16,
    pub subscription_label_keys: SubscriptionLabelKeys,
    pub subtype_label_keys: SubtypeLabelKeys,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_non_empty_env("DATABASE_URL")?;
        let database_max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(value) => value.trim().parse::<u32>().map_err(|error| {
                AppError::Validation(format!("invalid DATABASE_MAX_CONNECTIONS: {error}"))
            })?,
            Err(_) => 10,
        };

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3002);

        let subscription_defaults = SubscriptionLabelKeys::default();
        let subscription_label_keys = SubscriptionLabelKeys {
            self_register_distinguish_label_key: label_key_env(
                "SELF_REGISTER_DISTINGUISH_LABEL_KEY",
                subscription_defaults.self_register_distinguish_label_key,
            )?,
            consumer_subaccount_label_key: label_key_env(
                "CONSUMER_SUBACCOUNT_LABEL_KEY",
                subscription_defaults.consumer_subaccount_label_key,
            )?,
        };

        let subtype_defaults = SubtypeLabelKeys::default();
        let subtype_label_keys = SubtypeLabelKeys {
            application_type_label_key: label_key_env(
                "APPLICATION_TYPE_LABEL_KEY",
                subtype_defaults.application_type_label_key,
            )?,
            runtime_type_label_key: label_key_env(
                "RUNTIME_TYPE_LABEL_KEY",
                subtype_defaults.runtime_type_label_key,
            )?,
        };

        Ok(Self {
            migrate_only,
            database_url,
            database_max_connections,
            api_host,
            api_port,
            subscription_label_keys,
            subtype_label_keys,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn label_key_env(name: &str, default: String) -> Result<String, AppError> {
    match env::var(name) {
        Ok(value) => validate_label_key(name, value),
        Err(_) => Ok(default),
    }
}

fn validate_label_key(name: &str, value: String) -> Result<String, AppError> {
    let value = value.trim().to_owned();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use tessera_core::AppError;

    use super::{ApiConfig, validate_label_key};

    fn config(api_host: &str) -> ApiConfig {
        ApiConfig {
            migrate_only: false,
            database_url: "postgres://localhost/tessera".to_owned(),
            database_max_connections: 10,
            api_host: api_host.to_owned(),
            api_port: 3002,
            subscription_label_keys: Default::default(),
            subtype_label_keys: Default::default(),
        }
    }

    #[test]
    fn blank_label_key_is_rejected() {
        assert_eq!(
            validate_label_key("RUNTIME_TYPE_LABEL_KEY", "   ".to_owned()),
            Err(AppError::Validation(
                "RUNTIME_TYPE_LABEL_KEY must not be empty".to_owned()
            ))
        );
        assert_eq!(
            validate_label_key("RUNTIME_TYPE_LABEL_KEY", " runtimeType ".to_owned()),
            Ok("runtimeType".to_owned())
        );
    }

    #[test]
    fn socket_address_uses_host_and_port() {
        let address = config("0.0.0.0")
            .socket_address()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(address.to_string(), "0.0.0.0:3002");
    }

    #[test]
    fn invalid_host_is_internal_error() {
        assert!(matches!(
            config("not-an-ip").socket_address(),
            Err(AppError::Internal(_))
        ));
    }
}
