//! Gateway error types

use std::fmt;

/// Errors that can occur when calling the external model API
#[derive(Debug, Clone)]
pub enum GatewayError {
    /// 401 Unauthorized - key invalid or revoked
    Unauthorized { provider: String },
    /// 403 Forbidden - key lacks access to the model
    Forbidden { provider: String },
    /// 429 Rate Limited
    RateLimited {
        provider: String,
        retry_after_secs: Option<u64>,
    },
    /// Network or timeout error
    NetworkError { provider: String, message: String },
    /// Other HTTP errors
    HttpError {
        provider: String,
        status: u16,
        message: String,
    },
    /// Response body did not contain generated text
    MalformedResponse { provider: String, message: String },
    /// Provider not configured (no API key in environment)
    NotConfigured { provider: String },
}

impl GatewayError {
    /// Check if this is an authentication error (401 or 403)
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            GatewayError::Unauthorized { .. } | GatewayError::Forbidden { .. }
        )
    }

    /// Check if this is a rate limiting error
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, GatewayError::RateLimited { .. })
    }

    /// Get the provider name for this error
    pub fn provider_name(&self) -> &str {
        match self {
            GatewayError::Unauthorized { provider } => provider,
            GatewayError::Forbidden { provider } => provider,
            GatewayError::RateLimited { provider, .. } => provider,
            GatewayError::NetworkError { provider, .. } => provider,
            GatewayError::HttpError { provider, .. } => provider,
            GatewayError::MalformedResponse { provider, .. } => provider,
            GatewayError::NotConfigured { provider } => provider,
        }
    }

    /// What the user can do about this error, when there is something
    pub fn hint(&self) -> Option<String> {
        if self.is_auth_error() {
            Some(format!(
                "{} rejected the API key; check the variable named by gateway.api_key_env",
                self.provider_name()
            ))
        } else if self.is_rate_limited() {
            Some(format!(
                "{} is throttling requests; wait a moment and retry",
                self.provider_name()
            ))
        } else if matches!(self, GatewayError::NotConfigured { .. }) {
            Some("export the API key and restart dashmigrate".to_string())
        } else {
            None
        }
    }

    pub fn unauthorized(provider: impl Into<String>) -> Self {
        GatewayError::Unauthorized {
            provider: provider.into(),
        }
    }

    pub fn forbidden(provider: impl Into<String>) -> Self {
        GatewayError::Forbidden {
            provider: provider.into(),
        }
    }

    pub fn rate_limited(provider: impl Into<String>, retry_after: Option<u64>) -> Self {
        GatewayError::RateLimited {
            provider: provider.into(),
            retry_after_secs: retry_after,
        }
    }

    pub fn network(provider: impl Into<String>, message: impl Into<String>) -> Self {
        GatewayError::NetworkError {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn http(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        GatewayError::HttpError {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    pub fn malformed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        GatewayError::MalformedResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn not_configured(provider: impl Into<String>) -> Self {
        GatewayError::NotConfigured {
            provider: provider.into(),
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Unauthorized { provider } => {
                write!(f, "{}: Unauthorized (401) - check the API key", provider)
            }
            GatewayError::Forbidden { provider } => {
                write!(
                    f,
                    "{}: Forbidden (403) - key has no access to this model",
                    provider
                )
            }
            GatewayError::RateLimited {
                provider,
                retry_after_secs,
            } => {
                if let Some(secs) = retry_after_secs {
                    write!(f, "{}: Rate limited - retry after {}s", provider, secs)
                } else {
                    write!(f, "{}: Rate limited", provider)
                }
            }
            GatewayError::NetworkError { provider, message } => {
                write!(f, "{}: Network error - {}", provider, message)
            }
            GatewayError::HttpError {
                provider,
                status,
                message,
            } => {
                write!(f, "{}: HTTP {} - {}", provider, status, message)
            }
            GatewayError::MalformedResponse { provider, message } => {
                write!(f, "{}: Malformed response - {}", provider, message)
            }
            GatewayError::NotConfigured { provider } => {
                write!(f, "{}: Not configured (no API key)", provider)
            }
        }
    }
}

impl std::error::Error for GatewayError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_auth_error() {
        assert!(GatewayError::unauthorized("test").is_auth_error());
        assert!(GatewayError::forbidden("test").is_auth_error());
        assert!(!GatewayError::rate_limited("test", None).is_auth_error());
        assert!(!GatewayError::network("test", "timeout").is_auth_error());
    }

    #[test]
    fn test_hint_only_for_actionable_errors() {
        let hint = GatewayError::forbidden("openai").hint().unwrap();
        assert!(hint.starts_with("openai rejected the API key"));
        assert!(GatewayError::rate_limited("openai", Some(30))
            .hint()
            .unwrap()
            .contains("throttling"));
        assert!(GatewayError::not_configured("openai").hint().is_some());
        assert!(GatewayError::network("openai", "timeout").hint().is_none());
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(GatewayError::unauthorized("openai").provider_name(), "openai");
        assert_eq!(
            GatewayError::malformed("mock", "no choices").provider_name(),
            "mock"
        );
    }

    #[test]
    fn test_display() {
        let err = GatewayError::rate_limited("openai", Some(30));
        assert_eq!(err.to_string(), "openai: Rate limited - retry after 30s");

        let err = GatewayError::not_configured("openai");
        assert_eq!(err.to_string(), "openai: Not configured (no API key)");

        let err = GatewayError::http("openai", 500, "boom");
        assert_eq!(err.to_string(), "openai: HTTP 500 - boom");
    }
}
