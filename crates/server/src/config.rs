// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Command-line and environment configuration.

use capela::FailurePolicy;
use capela_domain::{Tz, parse_timezone};
use capela_gateway::SANDBOX_BASE_URL;
use clap::Parser;
use std::net::SocketAddr;

/// Capela Server - HTTP server for parish event registrations
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "CAPELA_DATABASE")]
    pub database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, env = "CAPELA_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address to bind the server to
    #[arg(long, env = "CAPELA_BIND", default_value = "127.0.0.1")]
    pub bind: String,

    /// Shared secret used to verify bearer tokens (HS256)
    #[arg(long, env = "CAPELA_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Required `iss` claim, if any
    #[arg(long, env = "CAPELA_JWT_ISSUER")]
    pub jwt_issuer: Option<String>,

    /// Asaas API key
    #[arg(long, env = "CAPELA_ASAAS_API_KEY", hide_env_values = true)]
    pub asaas_api_key: String,

    /// Asaas API root
    #[arg(long, env = "CAPELA_ASAAS_BASE_URL", default_value = SANDBOX_BASE_URL)]
    pub asaas_base_url: String,

    /// Token Asaas sends in the `asaas-access-token` header
    #[arg(long, env = "CAPELA_ASAAS_WEBHOOK_TOKEN", hide_env_values = true)]
    pub asaas_webhook_token: Option<String>,

    /// Bearer secret expected by the cron endpoint
    #[arg(long, env = "CAPELA_CRON_SECRET", hide_env_values = true)]
    pub cron_secret: Option<String>,

    /// Timezone in which event end dates are evaluated
    #[arg(long, env = "CAPELA_TIMEZONE", default_value = "America/Sao_Paulo")]
    pub timezone: String,

    /// What a failed charge does to a pending inscription
    #[arg(long, env = "CAPELA_FAILURE_POLICY", default_value = "keep-pending")]
    pub failure_policy: String,
}

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),
    #[error("unknown timezone '{0}'")]
    InvalidTimezone(String),
    #[error("{0}")]
    InvalidFailurePolicy(String),
    #[error("the JWT secret must not be empty")]
    EmptyJwtSecret,
}

/// Validated server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: Option<String>,
    pub listen_addr: SocketAddr,
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
    pub asaas_api_key: String,
    pub asaas_base_url: String,
    pub webhook_token: Option<String>,
    pub cron_secret: Option<String>,
    pub timezone: Tz,
    pub failure_policy: FailurePolicy,
}

impl AppConfig {
    /// Validates parsed arguments.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the first invalid value.
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let listen_addr: SocketAddr = format!("{}:{}", args.bind, args.port)
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(args.bind.clone()))?;
        let timezone: Tz = parse_timezone(&args.timezone)
            .map_err(|_| ConfigError::InvalidTimezone(args.timezone.clone()))?;
        let failure_policy: FailurePolicy = args
            .failure_policy
            .parse()
            .map_err(ConfigError::InvalidFailurePolicy)?;
        if args.jwt_secret.trim().is_empty() {
            return Err(ConfigError::EmptyJwtSecret);
        }

        Ok(Self {
            database: args.database,
            listen_addr,
            jwt_secret: args.jwt_secret,
            jwt_issuer: args.jwt_issuer,
            asaas_api_key: args.asaas_api_key,
            asaas_base_url: args.asaas_base_url,
            webhook_token: non_empty(args.asaas_webhook_token),
            cron_secret: non_empty(args.cron_secret),
            timezone,
            failure_policy,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv: Vec<&str> = vec![
            "capela-server",
            "--jwt-secret",
            "segredo",
            "--asaas-api-key",
            "chave",
        ];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config: AppConfig = AppConfig::from_args(parse(&[])).unwrap();

        assert_eq!(config.listen_addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.timezone.name(), "America/Sao_Paulo");
        assert_eq!(config.failure_policy, FailurePolicy::KeepPending);
        assert_eq!(config.asaas_base_url, SANDBOX_BASE_URL);
        assert!(config.database.is_none());
        assert!(config.cron_secret.is_none());
    }

    #[test]
    fn test_blank_secrets_count_as_unset() {
        let config: AppConfig = AppConfig::from_args(parse(&[
            "--asaas-webhook-token",
            "  ",
            "--cron-secret",
            "",
        ]))
        .unwrap();

        assert!(config.webhook_token.is_none());
        assert!(config.cron_secret.is_none());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert_eq!(
            AppConfig::from_args(parse(&["--timezone", "Mars/Olympus"])).unwrap_err(),
            ConfigError::InvalidTimezone(String::from("Mars/Olympus"))
        );
        assert_eq!(
            AppConfig::from_args(parse(&["--bind", "not an address"])).unwrap_err(),
            ConfigError::InvalidBindAddress(String::from("not an address"))
        );
        assert!(matches!(
            AppConfig::from_args(parse(&["--failure-policy", "refund"])),
            Err(ConfigError::InvalidFailurePolicy(_))
        ));
    }

    #[test]
    fn test_cancel_policy_is_accepted() {
        let config: AppConfig =
            AppConfig::from_args(parse(&["--failure-policy", "cancel-inscription"])).unwrap();
        assert_eq!(config.failure_policy, FailurePolicy::CancelInscription);
    }
}
