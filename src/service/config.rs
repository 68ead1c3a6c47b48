use std::{env, sync::Arc};

use crate::config::Config;

/// Environment variables that contact delivery depends on. Missing values are
/// reported at startup but do not prevent the server from running.
const REQUIRED_VARS: [&str; 6] = [
    "SMTP_HOST",
    "SMTP_PORT",
    "SMTP_USER",
    "SMTP_PASS",
    "TO_EMAIL",
    "FROM_EMAIL",
];

pub trait ConfigService: Send + Sync {
    fn port(&self) -> u16;
    fn values(&self) -> &Config;
}

pub struct ConfigServiceImpl {
    config: Arc<Config>,
}

impl ConfigServiceImpl {
    fn strip_wrapping_quotes(value: &str) -> &str {
        if value.len() >= 2 {
            let bytes = value.as_bytes();
            let first = bytes[0];
            let last = bytes[value.len() - 1];
            if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
                return &value[1..value.len() - 1];
            }
        }
        value
    }

    fn env_nonempty(key: &str) -> Option<String> {
        env::var(key).ok().and_then(|value| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return None;
            }
            let normalized = Self::strip_wrapping_quotes(trimmed).trim();
            if normalized.is_empty() {
                None
            } else {
                Some(normalized.to_string())
            }
        })
    }

    fn env_u16(key: &str) -> Option<u16> {
        Self::env_nonempty(key).and_then(|value| value.parse::<u16>().ok())
    }

    fn env_u64(key: &str) -> Option<u64> {
        Self::env_nonempty(key).and_then(|value| value.parse::<u64>().ok())
    }

    pub fn new() -> Self {
        for name in REQUIRED_VARS {
            if Self::env_nonempty(name).is_none() {
                tracing::warn!(
                    variable = name,
                    "missing environment variable; contact delivery will fail until it is set"
                );
            }
        }

        let port = Self::env_u16("PORT").unwrap_or(3000);
        let smtp_host = Self::env_nonempty("SMTP_HOST");
        let smtp_port = Self::env_u16("SMTP_PORT");
        let smtp_user = Self::env_nonempty("SMTP_USER");
        let smtp_pass = Self::env_nonempty("SMTP_PASS");
        let smtp_timeout_seconds = Self::env_u64("SMTP_TIMEOUT_SECONDS").unwrap_or(10);
        let to_email = Self::env_nonempty("TO_EMAIL");
        let from_email = Self::env_nonempty("FROM_EMAIL");
        let cors_origin = Self::env_nonempty("CORS_ORIGIN");
        let static_dir = Self::env_nonempty("STATIC_DIR").unwrap_or_else(|| "public".to_string());

        Self {
            config: Arc::new(Config {
                port,
                smtp_host,
                smtp_port,
                smtp_user,
                smtp_pass,
                smtp_timeout_seconds,
                to_email,
                from_email,
                cors_origin,
                static_dir,
            }),
        }
    }
}

impl ConfigService for ConfigServiceImpl {
    fn port(&self) -> u16 {
        self.config.port
    }

    fn values(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_wrapping_quotes_handles_both_quote_styles() {
        assert_eq!(
            ConfigServiceImpl::strip_wrapping_quotes("\"smtp.example.com\""),
            "smtp.example.com"
        );
        assert_eq!(
            ConfigServiceImpl::strip_wrapping_quotes("'smtp.example.com'"),
            "smtp.example.com"
        );
        assert_eq!(
            ConfigServiceImpl::strip_wrapping_quotes("smtp.example.com"),
            "smtp.example.com"
        );
        assert_eq!(ConfigServiceImpl::strip_wrapping_quotes("\""), "\"");
    }
}
