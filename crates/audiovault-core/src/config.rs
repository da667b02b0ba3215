//! Configuration module
//!
//! Environment-driven settings for the API server, the database pool, durable storage,
//! the upload pipeline and sessions. A `.env` file is honoured through `dotenvy`.

use std::env;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_ALLOWED_AUDIO_CONTENT_TYPES, DEFAULT_UPLOAD_DIR, MAX_UPLOAD_SIZE_BYTES,
    UPLOAD_CHUNK_SIZE_BYTES,
};
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 8080;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const SESSION_EXPIRY_MINUTES: i64 = 10080;
const PLAYBACK_URL_TTL_SECS: u64 = 3600;
const MATERIALIZER_MAX_CONCURRENT: usize = 4;
const MATERIALIZER_QUEUE_SIZE: usize = 1000;
const STALE_UPLOAD_REAP_INTERVAL_SECS: u64 = 0;
const STALE_UPLOAD_GRACE_PERIOD_SECS: i64 = 3600;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_SEED_PASSWORD: &str = "P@ssword12345!";

/// Full application configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub log_format: String,
    // Database
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Durable storage
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Upload pipeline
    pub upload_dir: String,
    pub max_upload_size_bytes: u64,
    pub upload_chunk_size_bytes: usize,
    pub allowed_audio_content_types: Vec<String>,
    pub playback_url_ttl_secs: u64,
    pub materializer_max_concurrent: usize,
    pub materializer_queue_size: usize,
    /// Interval in seconds between stale upload sweeps. 0 = disabled.
    pub stale_upload_reap_interval_secs: u64,
    pub stale_upload_grace_period_secs: i64,
    // Sessions
    pub session_expiry_minutes: i64,
    pub session_cookie_secure: bool,
    // Demo accounts
    pub seed_demo_users: bool,
    pub seed_user_password: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<AppConfig>);

fn env_or<T: FromStr + ToString>(key: &str, default: T) -> T {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse()
        .unwrap_or(default)
}

fn env_list(key: &str, default: &str) -> Vec<String> {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());
        let is_production = is_production_name(&environment);

        let cors_origins = match env::var("CORS_ORIGINS").or_else(|_| env::var("ALLOWED_ORIGINS")) {
            Ok(value) => value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => vec![DEFAULT_CORS_ORIGIN.to_string()],
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse::<StorageBackend>()?,
            Err(_) => StorageBackend::S3,
        };

        let default_types = DEFAULT_ALLOWED_AUDIO_CONTENT_TYPES.join(",");
        let allowed_audio_content_types = env_list("ALLOWED_AUDIO_CONTENT_TYPES", &default_types)
            .into_iter()
            .map(|s| s.to_lowercase())
            .collect();

        Ok(AppConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: env_or("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            storage_backend,
            s3_bucket: env_opt("S3_BUCKET"),
            s3_region: env_opt("S3_REGION").or_else(|| env_opt("AWS_REGION")),
            s3_endpoint: env_opt("S3_ENDPOINT"),
            local_storage_path: env_opt("LOCAL_STORAGE_PATH"),
            local_storage_base_url: env_opt("LOCAL_STORAGE_BASE_URL"),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| DEFAULT_UPLOAD_DIR.to_string()),
            max_upload_size_bytes: env_or("MAX_UPLOAD_SIZE_BYTES", MAX_UPLOAD_SIZE_BYTES),
            upload_chunk_size_bytes: env_or("UPLOAD_CHUNK_SIZE_BYTES", UPLOAD_CHUNK_SIZE_BYTES)
                .max(1),
            allowed_audio_content_types,
            playback_url_ttl_secs: env_or("PLAYBACK_URL_TTL_SECS", PLAYBACK_URL_TTL_SECS),
            materializer_max_concurrent: env_or(
                "MATERIALIZER_MAX_CONCURRENT",
                MATERIALIZER_MAX_CONCURRENT,
            )
            .max(1),
            materializer_queue_size: env_or("MATERIALIZER_QUEUE_SIZE", MATERIALIZER_QUEUE_SIZE)
                .max(1),
            stale_upload_reap_interval_secs: env_or(
                "STALE_UPLOAD_REAP_INTERVAL_SECS",
                STALE_UPLOAD_REAP_INTERVAL_SECS,
            ),
            stale_upload_grace_period_secs: env_or(
                "STALE_UPLOAD_GRACE_PERIOD_SECS",
                STALE_UPLOAD_GRACE_PERIOD_SECS,
            ),
            session_expiry_minutes: env_or("SESSION_EXPIRY_MINUTES", SESSION_EXPIRY_MINUTES),
            session_cookie_secure: env_or("SESSION_COOKIE_SECURE", true),
            seed_demo_users: env_or("SEED_DEMO_USERS", !is_production),
            seed_user_password: env::var("SEED_USER_PASSWORD")
                .unwrap_or_else(|_| DEFAULT_SEED_PASSWORD.to_string()),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a PostgreSQL connection string"
            ));
        }

        if is_production_name(&self.environment) && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when STORAGE_BACKEND is s3"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when STORAGE_BACKEND is s3"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when STORAGE_BACKEND is local"
                    ));
                }
            }
        }

        if self.allowed_audio_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_AUDIO_CONTENT_TYPES must list at least one type"
            ));
        }
        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_BYTES must be greater than 0"));
        }
        if self.session_expiry_minutes <= 0 {
            return Err(anyhow::anyhow!(
                "SESSION_EXPIRY_MINUTES must be greater than 0"
            ));
        }

        Ok(())
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = AppConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.0.validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.0.environment)
    }

    pub fn server_port(&self) -> u16 {
        self.0.server_port
    }

    pub fn environment(&self) -> &str {
        &self.0.environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.0.cors_origins
    }

    pub fn log_format(&self) -> &str {
        &self.0.log_format
    }

    pub fn database_url(&self) -> &str {
        &self.0.database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.0.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.0.db_timeout_seconds
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.0.storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.0.s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.0.s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.0.s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.0.local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.0.local_storage_base_url.as_deref()
    }

    pub fn upload_dir(&self) -> &str {
        &self.0.upload_dir
    }

    pub fn max_upload_size_bytes(&self) -> u64 {
        self.0.max_upload_size_bytes
    }

    pub fn upload_chunk_size_bytes(&self) -> usize {
        self.0.upload_chunk_size_bytes
    }

    pub fn allowed_audio_content_types(&self) -> &[String] {
        &self.0.allowed_audio_content_types
    }

    pub fn playback_url_ttl_secs(&self) -> u64 {
        self.0.playback_url_ttl_secs
    }

    pub fn materializer_max_concurrent(&self) -> usize {
        self.0.materializer_max_concurrent
    }

    pub fn materializer_queue_size(&self) -> usize {
        self.0.materializer_queue_size
    }

    pub fn stale_upload_reap_interval_secs(&self) -> u64 {
        self.0.stale_upload_reap_interval_secs
    }

    pub fn stale_upload_grace_period_secs(&self) -> i64 {
        self.0.stale_upload_grace_period_secs
    }

    pub fn session_expiry_minutes(&self) -> i64 {
        self.0.session_expiry_minutes
    }

    pub fn session_cookie_secure(&self) -> bool {
        self.0.session_cookie_secure
    }

    pub fn seed_demo_users(&self) -> bool {
        self.0.seed_demo_users
    }

    pub fn seed_user_password(&self) -> &str {
        &self.0.seed_user_password
    }
}
