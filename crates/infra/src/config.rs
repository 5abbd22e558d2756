//! Layered runtime configuration.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. an optional `taskflow.toml` in the working directory
//! 3. environment variables, `TASKFLOW__<SECTION>__<KEY>` (e.g.
//!    `TASKFLOW__JWT__SECRET`, `TASKFLOW__DATABASE__URL`)

use std::net::SocketAddr;

use config::{Config, Environment, File, FileFormat, Map};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use taskflow_auth::{HashingCost, TokenSettings};

const ENV_PREFIX: &str = "TASKFLOW";
const ENV_SEPARATOR: &str = "__";
const CONFIG_FILE: &str = "taskflow";

/// Signing secret used when none is configured. Only fit for local runs.
const DEV_JWT_SECRET: &str = "taskflow-insecure-dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting `{key}`: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub bind_addr: SocketAddr,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Postgres connection string. When absent the in-memory store is used.
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    pub secret: Option<String>,
    pub issuer: String,
    pub audience: String,
    pub duration_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// Default `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: String,
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub password: HashingCost,
    pub log: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        let cost = HashingCost::default();
        Self {
            server: ServerSettings {
                bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            },
            database: DatabaseSettings {
                url: None,
                max_connections: 5,
            },
            jwt: JwtSettings {
                secret: None,
                issuer: "taskflow".to_string(),
                audience: "taskflow-clients".to_string(),
                duration_minutes: 60,
            },
            password: cost,
            log: LogSettings {
                filter: "info".to_string(),
                json: true,
            },
        }
    }
}

impl Settings {
    /// Load from `taskflow.toml` (if present) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(
            File::with_name(CONFIG_FILE).required(false),
            env_source(None),
        )
    }

    /// Load from explicit sources. Tests pass an inline TOML document and a
    /// fixed environment map instead of touching the process environment.
    pub fn load_from<F>(file: F, env: Environment) -> Result<Self, ConfigError>
    where
        F: config::Source + Send + Sync + 'static,
    {
        let defaults = Settings::default();
        let config = Config::builder()
            .set_default("server.bind_addr", defaults.server.bind_addr.to_string())?
            .set_default("database.max_connections", i64::from(defaults.database.max_connections))?
            .set_default("jwt.issuer", defaults.jwt.issuer)?
            .set_default("jwt.audience", defaults.jwt.audience)?
            .set_default("jwt.duration_minutes", defaults.jwt.duration_minutes)?
            .set_default("password.memory_kib", i64::from(defaults.password.memory_kib))?
            .set_default("password.iterations", i64::from(defaults.password.iterations))?
            .set_default("password.parallelism", i64::from(defaults.password.parallelism))?
            .set_default("log.filter", defaults.log.filter)?
            .set_default("log.json", defaults.log.json)?
            .add_source(file)
            .add_source(env)
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "database.max_connections",
                message: "must be at least 1".to_string(),
            });
        }
        if self.jwt.duration_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "jwt.duration_minutes",
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Token settings with the dev secret substituted when none is configured.
    pub fn token_settings(&self) -> TokenSettings {
        let secret = match self.jwt.secret.as_deref().map(str::trim) {
            Some(secret) if !secret.is_empty() => secret.to_string(),
            _ => {
                warn!("jwt.secret is not set; using an insecure development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        TokenSettings {
            secret,
            issuer: self.jwt.issuer.clone(),
            audience: self.jwt.audience.clone(),
            duration_minutes: self.jwt.duration_minutes,
        }
    }
}

fn env_source(vars: Option<Map<String, String>>) -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_SEPARATOR)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
        .source(vars)
}

/// Parse an inline TOML document. Handy for tests and embedded defaults.
pub fn toml_source(document: &str) -> File<config::FileSourceString, FileFormat> {
    File::from_str(document, FileFormat::Toml)
}

/// Environment source backed by a fixed map instead of the process env.
pub fn env_from_map<I, K, V>(vars: I) -> Environment
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    env_source(Some(
        vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(toml: &str, env: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        Settings::load_from(toml_source(toml), env_from_map(env.iter().copied()))
    }

    #[test]
    fn defaults_apply_without_any_source() {
        let settings = load("", &[]).unwrap();

        assert_eq!(settings.server.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(settings.database.url, None);
        assert_eq!(settings.database.max_connections, 5);
        assert_eq!(settings.jwt.issuer, "taskflow");
        assert_eq!(settings.jwt.audience, "taskflow-clients");
        assert_eq!(settings.jwt.duration_minutes, 60);
        assert_eq!(settings.password, HashingCost::default());
        assert_eq!(settings.log.filter, "info");
        assert!(settings.log.json);
    }

    #[test]
    fn file_overrides_defaults() {
        let settings = load(
            r#"
            [server]
            bind_addr = "127.0.0.1:9000"

            [jwt]
            secret = "from-file"
            duration_minutes = 15

            [password]
            memory_kib = 8
            iterations = 1
            parallelism = 1
            "#,
            &[],
        )
        .unwrap();

        assert_eq!(settings.server.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(settings.jwt.secret.as_deref(), Some("from-file"));
        assert_eq!(settings.jwt.duration_minutes, 15);
        assert_eq!(settings.password.memory_kib, 8);
    }

    #[test]
    fn environment_overrides_file() {
        let settings = load(
            "[jwt]\nsecret = \"from-file\"\n",
            &[
                ("TASKFLOW__JWT__SECRET", "from-env"),
                ("TASKFLOW__DATABASE__URL", "postgres://localhost/taskflow"),
                ("TASKFLOW__DATABASE__MAX_CONNECTIONS", "12"),
            ],
        )
        .unwrap();

        assert_eq!(settings.jwt.secret.as_deref(), Some("from-env"));
        assert_eq!(settings.database.url.as_deref(), Some("postgres://localhost/taskflow"));
        assert_eq!(settings.database.max_connections, 12);
    }

    #[test]
    fn rejects_non_positive_token_lifetime() {
        let err = load("[jwt]\nduration_minutes = 0\n", &[]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "jwt.duration_minutes", .. }));
    }

    #[test]
    fn rejects_unparseable_bind_address() {
        let err = load("[server]\nbind_addr = \"not-an-address\"\n", &[]).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn missing_secret_falls_back_to_dev_secret() {
        let settings = load("", &[]).unwrap();
        let tokens = settings.token_settings();
        assert_eq!(tokens.secret, DEV_JWT_SECRET);
        assert_eq!(tokens.issuer, "taskflow");

        let blank = load("[jwt]\nsecret = \"   \"\n", &[]).unwrap();
        assert_eq!(blank.token_settings().secret, DEV_JWT_SECRET);
    }

    #[test]
    fn configured_secret_is_used() {
        let settings = load("", &[("TASKFLOW__JWT__SECRET", "s3cret")]).unwrap();
        assert_eq!(settings.token_settings().secret, "s3cret");
    }
}
