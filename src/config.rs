//! Configuration for the UKM backend
//!
//! CLI arguments and environment variable handling using clap. A `.env` file
//! is loaded by `main` before parsing.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use crate::auth::jwt::MIN_SECRET_LEN;

pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// UKM backend - campus student organization API
#[derive(Parser, Debug, Clone)]
#[command(name = "ukm-backend")]
#[command(about = "REST API for UKM members, activities, attendance and categories")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// Port override for platforms that only hand out a port
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "ukm")]
    pub mongodb_db: String,

    /// HS256 signing secret for issued tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", default_value = "text", value_parser = ["text", "json"])]
    pub log_format: String,

    /// Per-request deadline in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,

    /// Create the default admin account at startup if it is missing
    #[arg(long, env = "SEED_ADMIN", default_value = "true", action = clap::ArgAction::Set)]
    pub seed_admin: bool,

    #[arg(long, env = "ADMIN_EMAIL", default_value = "admin@ukm.com")]
    pub admin_email: String,

    #[arg(long, env = "ADMIN_PASSWORD", default_value = DEFAULT_ADMIN_PASSWORD, hide_env_values = true)]
    pub admin_password: String,

    #[arg(long, env = "ADMIN_NAMA", default_value = "Admin UKM")]
    pub admin_nama: String,

    #[arg(long, env = "ADMIN_UKM", default_value = "Semua UKM")]
    pub admin_ukm: String,
}

impl Args {
    /// Bind address after applying the `PORT` override
    pub fn listen_addr(&self) -> SocketAddr {
        match self.port {
            Some(port) => SocketAddr::new(self.listen.ip(), port),
            None => self.listen,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// The signing secret, or an empty string when unset.
    ///
    /// [`Args::validate`] must pass first; the token service rejects an empty secret.
    pub fn jwt_secret(&self) -> &str {
        self.jwt_secret.as_deref().unwrap_or_default()
    }

    pub fn json_logs(&self) -> bool {
        self.log_format == "json"
    }

    pub fn uses_default_admin_password(&self) -> bool {
        self.admin_password == DEFAULT_ADMIN_PASSWORD
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        match self.jwt_secret.as_deref() {
            None | Some("") => return Err("JWT_SECRET is required".to_string()),
            Some(secret) if secret.len() < MIN_SECRET_LEN => {
                return Err(format!(
                    "JWT_SECRET must be at least {} characters",
                    MIN_SECRET_LEN
                ))
            }
            Some(_) => {}
        }

        if self.request_timeout_ms == 0 {
            return Err("REQUEST_TIMEOUT_MS must be greater than zero".to_string());
        }

        if self.seed_admin && self.admin_email.trim().is_empty() {
            return Err("ADMIN_EMAIL must not be empty when SEED_ADMIN is enabled".to_string());
        }

        Ok(())
    }
}
