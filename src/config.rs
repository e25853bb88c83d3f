//! Connector configuration.
//!
//! Connection parameters consumed by the core: the authentication variant
//! (modern certificate-based vs. legacy credential-based, mutually
//! exclusive), result page size, and an optional organizational scope filter.
//! Secrets are held in [`secrecy::SecretString`] and never logged; use
//! [`ExchangeConfig::redacted`] when a config must appear in output.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::{ConnectorError, ConnectorResult};

fn default_page_size() -> u32 {
    1000
}

/// Authentication variant for the remote session.
///
/// Deserialize-only: the config arrives in the system parameters and is
/// never written back out. [`ExchangeConfig::redacted`] covers the loggable
/// view.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AuthMethod {
    /// App-only certificate authentication against a hosted organization.
    Certificate {
        app_id: String,
        organization: String,
        certificate_thumbprint: String,
    },
    /// Legacy credential authentication against an explicit endpoint.
    Credentials {
        connection_uri: String,
        username: String,
        password: SecretString,
    },
}

impl AuthMethod {
    /// Short label for logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Certificate { .. } => "certificate",
            AuthMethod::Credentials { .. } => "credentials",
        }
    }
}

/// Connection parameters for the Exchange connector.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    /// How to authenticate. Certificate and credential parameter sets are
    /// mutually exclusive by construction.
    pub auth: AuthMethod,

    /// Page size for bulk listings.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Optional organizational scope filter applied to bulk reads
    /// (e.g. an OU path).
    #[serde(default)]
    pub recipient_scope: Option<String>,
}

impl ExchangeConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> ConnectorResult<()> {
        match &self.auth {
            AuthMethod::Certificate {
                app_id,
                organization,
                certificate_thumbprint,
            } => {
                if app_id.is_empty() {
                    return Err(ConnectorError::invalid_configuration("app_id is empty"));
                }
                if organization.is_empty() {
                    return Err(ConnectorError::invalid_configuration(
                        "organization is empty",
                    ));
                }
                if certificate_thumbprint.is_empty() {
                    return Err(ConnectorError::invalid_configuration(
                        "certificate_thumbprint is empty",
                    ));
                }
            }
            AuthMethod::Credentials {
                connection_uri,
                username,
                ..
            } => {
                if connection_uri.is_empty() {
                    return Err(ConnectorError::invalid_configuration(
                        "connection_uri is empty",
                    ));
                }
                if username.is_empty() {
                    return Err(ConnectorError::invalid_configuration("username is empty"));
                }
            }
        }
        if self.page_size == 0 {
            return Err(ConnectorError::invalid_configuration("page_size must be > 0"));
        }
        Ok(())
    }

    /// Copy with secrets replaced by a placeholder, safe for logging.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let auth = match &self.auth {
            cert @ AuthMethod::Certificate { .. } => cert.clone(),
            AuthMethod::Credentials {
                connection_uri,
                username,
                ..
            } => AuthMethod::Credentials {
                connection_uri: connection_uri.clone(),
                username: username.clone(),
                password: SecretString::new("***".to_string()),
            },
        };
        Self {
            auth,
            page_size: self.page_size,
            recipient_scope: self.recipient_scope.clone(),
        }
    }

    /// Canonical serialization of the identity-affecting parameter subset,
    /// in stable field order. Input to the connection fingerprint.
    ///
    /// The recipient scope is excluded: it shapes queries, not the session
    /// identity.
    #[must_use]
    pub fn fingerprint_material(&self) -> String {
        match &self.auth {
            AuthMethod::Certificate {
                app_id,
                organization,
                certificate_thumbprint,
            } => format!(
                "mode=certificate\nappid={app_id}\norg={organization}\nthumbprint={certificate_thumbprint}\npagesize={}\n",
                self.page_size
            ),
            AuthMethod::Credentials {
                connection_uri,
                username,
                password,
            } => format!(
                "mode=credentials\nuri={connection_uri}\nuser={username}\npass={}\npagesize={}\n",
                password.expose_secret(),
                self.page_size
            ),
        }
    }
}
