use anyhow::{Context, Result};
use clap::Parser;
use std::{env, path::PathBuf, str::FromStr};

const ENV_HOST: &str = "PET_REGISTRY_HOST";
const ENV_PORT: &str = "PET_REGISTRY_PORT";
const ENV_DATABASE_URL: &str = "PET_REGISTRY_DATABASE_URL";
const ENV_ROUTE_PREFIX: &str = "PET_REGISTRY_ROUTE_PREFIX";
const ENV_MAX_UPLOAD_BYTES: &str = "PET_REGISTRY_MAX_UPLOAD_BYTES";

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Path the registration routes are mounted under; empty for the root.
    pub route_prefix: String,
    pub max_upload_bytes: usize,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Pet registration API")]
pub struct Args {
    /// Host to bind to (overrides PET_REGISTRY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PET_REGISTRY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL, or `memory://` for a throwaway in-process store
    /// (overrides PET_REGISTRY_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Prefix for the registration routes (overrides PET_REGISTRY_ROUTE_PREFIX)
    #[arg(long)]
    pub route_prefix: Option<String>,

    /// Largest accepted request body in bytes (overrides PET_REGISTRY_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        Self::from_sources(Args::parse(), |key| env::var(key))
    }

    /// Merge `args` over values from `lookup` over defaults.
    pub fn from_sources<F>(args: Args, lookup: F) -> Result<(Self, bool)>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        // --- Environment fallback ---
        let env_host = lookup(ENV_HOST).unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = parse_env(&lookup, ENV_PORT, 3000)?;
        let env_db = lookup(ENV_DATABASE_URL)
            .unwrap_or_else(|_| "sqlite://./data/pet_registry.db".into());
        let env_prefix = lookup(ENV_ROUTE_PREFIX).unwrap_or_else(|_| "/api".into());
        let env_max_upload = parse_env(&lookup, ENV_MAX_UPLOAD_BYTES, DEFAULT_MAX_UPLOAD_BYTES)?;

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            route_prefix: normalize_prefix(&args.route_prefix.unwrap_or(env_prefix)),
            max_upload_bytes: args.max_upload_bytes.unwrap_or(env_max_upload),
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Filesystem path of a file-backed SQLite URL, if that is what we have.
    pub fn sqlite_path(&self) -> Option<PathBuf> {
        let rest = self
            .database_url
            .strip_prefix("sqlite://")
            .or_else(|| self.database_url.strip_prefix("sqlite:"))?;
        let path = rest.split('?').next().unwrap_or(rest);
        if path.is_empty() || path.starts_with(":memory:") {
            return None;
        }
        Some(PathBuf::from(path))
    }
}

fn parse_env<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Result<String, env::VarError>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", key)),
    }
}

/// `api/` -> `/api`, `/` -> ``.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Result<String, env::VarError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned().ok_or(env::VarError::NotPresent)
    }

    #[test]
    fn defaults_apply_without_env_or_args() {
        let (cfg, migrate) = AppConfig::from_sources(Args::default(), lookup(&[])).unwrap();
        assert_eq!(cfg.addr(), "0.0.0.0:3000");
        assert_eq!(cfg.database_url, "sqlite://./data/pet_registry.db");
        assert_eq!(cfg.route_prefix, "/api");
        assert_eq!(cfg.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(!migrate);
    }

    #[test]
    fn args_override_env() {
        let args = Args::try_parse_from([
            "pet-registry",
            "--port",
            "8081",
            "--route-prefix",
            "/",
            "--migrate",
        ])
        .unwrap();
        let env = lookup(&[(ENV_PORT, "9000"), (ENV_HOST, "127.0.0.1")]);

        let (cfg, migrate) = AppConfig::from_sources(args, env).unwrap();
        assert_eq!(cfg.addr(), "127.0.0.1:8081");
        assert_eq!(cfg.route_prefix, "");
        assert!(migrate);
    }

    #[test]
    fn invalid_numeric_env_is_an_error() {
        let err = AppConfig::from_sources(Args::default(), lookup(&[(ENV_PORT, "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_PORT));
    }

    #[test]
    fn prefix_is_normalized() {
        assert_eq!(normalize_prefix("api/"), "/api");
        assert_eq!(normalize_prefix("/.netlify/functions/api/"), "/.netlify/functions/api");
        assert_eq!(normalize_prefix("/"), "");
    }

    #[test]
    fn sqlite_path_only_for_file_urls() {
        let mut cfg = AppConfig::from_sources(Args::default(), lookup(&[])).unwrap().0;
        assert_eq!(cfg.sqlite_path(), Some(PathBuf::from("./data/pet_registry.db")));

        cfg.database_url = "sqlite://reg.db?mode=rwc".into();
        assert_eq!(cfg.sqlite_path(), Some(PathBuf::from("reg.db")));

        cfg.database_url = "sqlite::memory:".into();
        assert_eq!(cfg.sqlite_path(), None);

        cfg.database_url = "memory://".into();
        assert_eq!(cfg.sqlite_path(), None);
    }
}
