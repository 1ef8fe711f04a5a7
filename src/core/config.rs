use std::env;
use std::path::PathBuf;

use crate::shared::constants::DEFAULT_MAX_FILE_SIZE;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub storage: StorageConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

/// Local disk storage configuration for uploaded files
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding uploaded files and the metadata sidecar (created if absent)
    pub upload_dir: PathBuf,
    /// Maximum accepted file size in bytes
    pub max_file_size: u64,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 8080;

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| Self::DEFAULT_HOST.to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| Self::DEFAULT_PORT.to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StorageConfig {
    const DEFAULT_UPLOAD_DIR: &'static str = "./uploads";

    pub fn from_env() -> Result<Self, String> {
        let upload_dir = env::var("UPLOAD_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_UPLOAD_DIR.to_string());

        let max_file_size = Self::parse_max_file_size(env::var("MAX_FILE_SIZE").ok())?;

        Ok(Self {
            upload_dir: PathBuf::from(upload_dir),
            max_file_size,
        })
    }

    fn parse_max_file_size(raw: Option<String>) -> Result<u64, String> {
        match raw {
            None => Ok(DEFAULT_MAX_FILE_SIZE),
            Some(value) => match value.trim().parse::<u64>() {
                Ok(0) | Err(_) => Err("MAX_FILE_SIZE must be a positive number of bytes".to_string()),
                Ok(size) => Ok(size),
            },
        }
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Berkas API".to_string());
        let version =
            env::var("SWAGGER_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "File upload and sharing API".to_string());

        Ok(Self {
            title,
            version,
            description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_file_size_default() {
        assert_eq!(
            StorageConfig::parse_max_file_size(None),
            Ok(100 * 1024 * 1024)
        );
    }

    #[test]
    fn test_max_file_size_parsing() {
        assert_eq!(
            StorageConfig::parse_max_file_size(Some(" 2048 ".to_string())),
            Ok(2048)
        );
        assert!(StorageConfig::parse_max_file_size(Some("0".to_string())).is_err());
        assert!(StorageConfig::parse_max_file_size(Some("-1".to_string())).is_err());
        assert!(StorageConfig::parse_max_file_size(Some("lots".to_string())).is_err());
    }

    #[test]
    fn test_server_address() {
        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_allowed_origins: vec!["*".to_string()],
        };
        assert_eq!(config.server_address(), "127.0.0.1:8080");
    }
}
