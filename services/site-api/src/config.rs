use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use axum::http::StatusCode;

pub const DEVELOPMENT_INFERENCE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl FromStr for AppEnv {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(AppEnv::Development),
            "production" | "prod" => Ok(AppEnv::Production),
            _ => anyhow::bail!("invalid APP_ENV value {s}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            _ => anyhow::bail!("invalid SITE_STORE value {s}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_token: Option<String>,
    pub from: String,
    pub admin_address: String,
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub server_host: String,
    pub server_port: u16,
    pub app_env: AppEnv,
    pub store: StoreBackend,
    pub data_dir: PathBuf,
    pub default_allowance: u32,
    pub privileged_allowance: u32,
    pub privileged_identities: Vec<String>,
    pub customer_exhausted_status: StatusCode,
    pub user_exhausted_status: StatusCode,
    pub inference_url: String,
    pub outbound_timeout_secs: u64,
    pub mail: MailConfig,
    pub public_base_url: String,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            app_env: AppEnv::Development,
            store: StoreBackend::Sqlite,
            data_dir: PathBuf::from("data/site"),
            default_allowance: 5,
            privileged_allowance: 1000,
            privileged_identities: Vec::new(),
            customer_exhausted_status: StatusCode::FORBIDDEN,
            user_exhausted_status: StatusCode::OK,
            inference_url: DEVELOPMENT_INFERENCE_URL.to_string(),
            outbound_timeout_secs: 30,
            mail: MailConfig {
                api_url: "http://127.0.0.1:8025".to_string(),
                api_token: None,
                from: "no-reply@localhost".to_string(),
                admin_address: "admin@localhost".to_string(),
            },
            public_base_url: "http://localhost:3000".to_string(),
            request_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl SiteConfig {
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();

        if let Ok(value) = env::var("APP_ENV") {
            cfg.app_env = value.parse()?;
        }
        if let Ok(host) = env::var("SITE_HOST") {
            cfg.server_host = host;
        }
        if let Ok(port) = env::var("SITE_PORT") {
            cfg.server_port = port.parse().context("SITE_PORT must be a valid u16")?;
        }
        if let Ok(store) = env::var("SITE_STORE") {
            cfg.store = store.parse()?;
        }
        if let Ok(dir) = env::var("SITE_DATA_DIR") {
            cfg.data_dir = PathBuf::from(dir);
        }
        if let Ok(value) = env::var("DEFAULT_ALLOWANCE") {
            cfg.default_allowance = value
                .parse()
                .context("DEFAULT_ALLOWANCE must be a positive integer")?;
        }
        if let Ok(value) = env::var("PRIVILEGED_ALLOWANCE") {
            cfg.privileged_allowance = value
                .parse()
                .context("PRIVILEGED_ALLOWANCE must be a positive integer")?;
        }
        if let Ok(list) = env::var("PRIVILEGED_IDENTITIES") {
            cfg.privileged_identities = parse_list(&list);
        }
        if let Ok(value) = env::var("CUSTOMER_EXHAUSTED_STATUS") {
            cfg.customer_exhausted_status = parse_status(&value)
                .with_context(|| format!("CUSTOMER_EXHAUSTED_STATUS is invalid: {value}"))?;
        }
        if let Ok(value) = env::var("USER_EXHAUSTED_STATUS") {
            cfg.user_exhausted_status = parse_status(&value)
                .with_context(|| format!("USER_EXHAUSTED_STATUS is invalid: {value}"))?;
        }

        match env::var("INFERENCE_URL") {
            Ok(url) => cfg.inference_url = url,
            Err(_) if cfg.app_env == AppEnv::Production => {
                anyhow::bail!("INFERENCE_URL is required when APP_ENV=production")
            }
            Err(_) => {}
        }
        if let Ok(value) = env::var("OUTBOUND_TIMEOUT_SECS") {
            cfg.outbound_timeout_secs = value
                .parse()
                .context("OUTBOUND_TIMEOUT_SECS must be a positive integer")?;
        }

        cfg.mail.api_url = required_in_production(cfg.app_env, "MAIL_API_URL")?
            .unwrap_or(cfg.mail.api_url);
        cfg.mail.api_token = required_in_production(cfg.app_env, "MAIL_API_TOKEN")?;
        cfg.mail.from = required_in_production(cfg.app_env, "MAIL_FROM")?.unwrap_or(cfg.mail.from);
        cfg.mail.admin_address = required_in_production(cfg.app_env, "ADMIN_MAIL")?
            .unwrap_or(cfg.mail.admin_address);

        if let Ok(url) = env::var("PUBLIC_BASE_URL") {
            cfg.public_base_url = url;
        }
        if let Ok(value) = env::var("REQUEST_TIMEOUT_SECS") {
            cfg.request_timeout_secs = value
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a positive integer")?;
        }
        if let Ok(level) = env::var("LOG_LEVEL") {
            cfg.log_level = level;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.store == StoreBackend::Sqlite {
            ensure_directory(&self.data_dir)?;
        }

        if self.default_allowance == 0 {
            anyhow::bail!("DEFAULT_ALLOWANCE must be greater than zero");
        }
        if self.privileged_allowance == 0 {
            anyhow::bail!("PRIVILEGED_ALLOWANCE must be greater than zero");
        }
        if self.inference_url.trim().is_empty() {
            anyhow::bail!("INFERENCE_URL cannot be empty");
        }
        if self.outbound_timeout_secs == 0 {
            anyhow::bail!("OUTBOUND_TIMEOUT_SECS must be greater than zero");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }
        if !self.mail.admin_address.contains('@') {
            anyhow::bail!("ADMIN_MAIL must be an email address");
        }
        for status in [self.customer_exhausted_status, self.user_exhausted_status] {
            if !(status.is_success() || status.is_client_error()) {
                anyhow::bail!("exhaustion status {status} must be a 2xx or 4xx code");
            }
        }

        Ok(())
    }
}

fn required_in_production(app_env: AppEnv, key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(_) if app_env == AppEnv::Production => {
            anyhow::bail!("{key} is required when APP_ENV=production")
        }
        Err(_) => Ok(None),
    }
}

fn ensure_directory(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            anyhow::bail!("{} exists but is not a directory", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("unable to create data directory {}", path.display()))?;
    }
    Ok(())
}

fn parse_status(value: &str) -> Result<StatusCode> {
    let code: u16 = value.trim().parse()?;
    Ok(StatusCode::from_u16(code)?)
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> SiteConfig {
        SiteConfig {
            store: StoreBackend::Memory,
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_config_validation() {
        let mut config = memory_config();
        assert!(config.validate().is_ok());

        config.default_allowance = 0;
        assert!(config.validate().is_err());
        config.default_allowance = 5;

        config.inference_url = "  ".to_string();
        assert!(config.validate().is_err());
        config.inference_url = DEVELOPMENT_INFERENCE_URL.to_string();

        config.user_exhausted_status = StatusCode::INTERNAL_SERVER_ERROR;
        assert!(config.validate().is_err());
        config.user_exhausted_status = StatusCode::OK;

        config.mail.admin_address = "nobody".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_status("403").unwrap(), StatusCode::FORBIDDEN);
        assert!(parse_status("forbidden").is_err());
        assert!(parse_status("99").is_err());

        assert_eq!(
            parse_list(" 10.0.0.1, ,203.0.113.5 "),
            vec!["10.0.0.1".to_string(), "203.0.113.5".to_string()]
        );
        assert_eq!("PROD".parse::<AppEnv>().unwrap(), AppEnv::Production);
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("mongo".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_sqlite_validation_creates_data_dir() {
        let temp = tempfile::tempdir().expect("failed to create temp dir");
        let config = SiteConfig {
            data_dir: temp.path().join("nested/store"),
            ..SiteConfig::default()
        };
        config.validate().expect("validation should create the directory");
        assert!(config.data_dir.is_dir());
    }
}
