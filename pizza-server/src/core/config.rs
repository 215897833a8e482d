use crate::auth::JwtConfig;
use crate::auth::jwt::MIN_SECRET_LEN;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | ./data | Directory holding the redb database |
/// | HTTP_PORT | 3000 | HTTP listen port |
/// | ENVIRONMENT | development | development / staging / production |
/// | LOG_LEVEL | info | Default tracing filter when RUST_LOG is unset |
/// | LOG_DIR | (unset) | Enables a daily rolling log file |
/// | LOG_JSON | false | Emit logs as JSON lines |
/// | JWT_SECRET | (ephemeral) | HS256 signing secret, >= 32 bytes |
/// | JWT_ISSUER / JWT_AUDIENCE | pizza-auth / pizza-storefront | Expected token claims |
/// | STRICT_STAGE_STEPPING | false | Admin stage updates must advance one step |
/// | ADMIN_GUEST_COUPON_BYPASS | true | Admins without a user id skip the coupon login gate |
/// | STATUS_POLL_INTERVAL_SECS | 10 | Poll interval advertised to tracking clients |
/// | REQUEST_TIMEOUT_MS | 30000 | Per-request timeout |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | Grace period for in-flight requests on shutdown |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/pizza HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
    pub jwt: JwtConfig,
    pub strict_stage_stepping: bool,
    pub admin_guest_coupon_bypass: bool,
    pub status_poll_interval_secs: u64,
    pub request_timeout_ms: u64,
    pub shutdown_timeout_ms: u64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: env_or("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            log_json: env_or("LOG_JSON", false),
            jwt: JwtConfig::from_env(),
            strict_stage_stepping: env_or("STRICT_STAGE_STEPPING", false),
            admin_guest_coupon_bypass: env_or("ADMIN_GUEST_COUPON_BYPASS", true),
            status_poll_interval_secs: env_or("STATUS_POLL_INTERVAL_SECS", 10),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30000),
            shutdown_timeout_ms: env_or("SHUTDOWN_TIMEOUT_MS", 10000),
        }
    }

    /// Override the work dir and port (tests)
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Path of the redb database file
    pub fn database_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("pizza.redb")
    }

    /// Reject settings that are unsafe to run with
    pub fn validate(&self) -> Result<(), String> {
        if self.is_production() && std::env::var("JWT_SECRET").is_err() {
            return Err("JWT_SECRET must be set in production".into());
        }
        if self.jwt.secret.len() < MIN_SECRET_LEN {
            return Err(format!(
                "JWT_SECRET must be at least {MIN_SECRET_LEN} bytes"
            ));
        }
        if self.status_poll_interval_secs == 0 {
            return Err("STATUS_POLL_INTERVAL_SECS must be positive".into());
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            work_dir: "/tmp/pizza".into(),
            http_port: 3000,
            environment: "development".into(),
            log_level: "info".into(),
            log_dir: None,
            log_json: false,
            jwt: JwtConfig {
                secret: "x".repeat(MIN_SECRET_LEN),
                expiration_minutes: 60,
                issuer: "pizza-auth".into(),
                audience: "pizza-storefront".into(),
            },
            strict_stage_stepping: false,
            admin_guest_coupon_bypass: true,
            status_poll_interval_secs: 10,
            request_timeout_ms: 30000,
            shutdown_timeout_ms: 10000,
        }
    }

    #[test]
    fn test_validate() {
        assert!(config().validate().is_ok());

        let mut short = config();
        short.jwt.secret = "short".into();
        assert!(short.validate().is_err());

        let mut no_poll = config();
        no_poll.status_poll_interval_secs = 0;
        assert!(no_poll.validate().is_err());
    }

    #[test]
    fn test_database_path() {
        assert_eq!(
            config().database_path(),
            std::path::Path::new("/tmp/pizza/pizza.redb")
        );
    }
}
