//! Server configuration.

use serde::{Deserialize, Serialize};

use carpool_core::{Error, Result};

/// CORS configuration for browser-based access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. Use `["*"]` to allow all origins (development only).
    /// Empty list disables CORS entirely.
    pub allowed_origins: Vec<String>,

    /// Max age for preflight cache (seconds).
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            // Default: disabled (secure-by-default).
            // Set to `["*"]` for local development, or explicit origins for production.
            allowed_origins: Vec::new(),
            max_age_seconds: 3600, // 1 hour
        }
    }
}

/// Session cookie configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in hours.
    pub ttl_hours: u64,

    /// Name of the session cookie.
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: 24,
            cookie_name: default_cookie_name(),
        }
    }
}

fn default_cookie_name() -> String {
    "carpool_session".to_string()
}

/// Enrollment roster used to gate signup.
///
/// Only student numbers in this list may register an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Valid student numbers.
    pub student_numbers: Vec<String>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            student_numbers: vec![
                "1".to_string(),
                "2".to_string(),
                "3".to_string(),
                "12345678".to_string(),
            ],
        }
    }
}

impl RosterConfig {
    /// Returns true when the given student number is on the roster.
    #[must_use]
    pub fn contains(&self, student_number: &str) -> bool {
        self.student_numbers
            .iter()
            .any(|n| n == student_number.trim())
    }
}

/// Seed account created at startup (development convenience).
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedAdminConfig {
    /// Seed account email.
    pub email: String,
    /// Seed account password (hashed before storage).
    pub password: String,
    /// Parent contact email recorded on the seed account.
    pub parent_email: String,
    /// Gender recorded on the seed account.
    pub gender: String,
    /// Student number recorded on the seed account.
    pub student_number: String,
}

impl std::fmt::Debug for SeedAdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAdminConfig")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("parent_email", &self.parent_email)
            .field("gender", &self.gender)
            .field("student_number", &self.student_number)
            .finish()
    }
}

impl Default for SeedAdminConfig {
    fn default() -> Self {
        Self {
            email: "admin@gmail.com".to_string(),
            password: "admin".to_string(),
            parent_email: "admin@gmail.com".to_string(),
            gender: "unspecified".to_string(),
            student_number: "1".to_string(),
        }
    }
}

/// Configuration for the Carpool API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server port.
    pub http_port: u16,

    /// Enable debug mode.
    ///
    /// When enabled the seed admin account and permissive CORS (`["*"]`)
    /// are allowed. Production deployments must run with `debug = false`.
    pub debug: bool,

    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,

    /// Session cookie configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// Enrollment roster checked at signup.
    #[serde(default)]
    pub roster: RosterConfig,

    /// Optional seed account created at startup.
    #[serde(default)]
    pub seed_admin: Option<SeedAdminConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 8080,
            debug: true,
            cors: CorsConfig::default(),
            session: SessionConfig::default(),
            roster: RosterConfig::default(),
            seed_admin: Some(SeedAdminConfig::default()),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Supported env vars:
    /// - `CARPOOL_HTTP_PORT`
    /// - `CARPOOL_DEBUG`
    /// - `CARPOOL_CORS_ALLOWED_ORIGINS` (comma-separated, or `*`)
    /// - `CARPOOL_CORS_MAX_AGE_SECONDS`
    /// - `CARPOOL_SESSION_TTL_HOURS`
    /// - `CARPOOL_SESSION_COOKIE_NAME`
    /// - `CARPOOL_STUDENT_NUMBERS` (comma-separated roster)
    /// - `CARPOOL_SEED_ADMIN` (true/false)
    /// - `CARPOOL_ADMIN_EMAIL`
    /// - `CARPOOL_ADMIN_PASSWORD`
    ///
    /// # Errors
    ///
    /// Returns an error if any environment variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(port) = env_u16("CARPOOL_HTTP_PORT")? {
            config.http_port = port;
        }
        if let Some(debug) = env_bool("CARPOOL_DEBUG")? {
            config.debug = debug;
        }

        if let Some(origins) = env_string("CARPOOL_CORS_ALLOWED_ORIGINS") {
            config.cors.allowed_origins = parse_cors_allowed_origins(&origins);
        }
        if let Some(max_age) = env_u64("CARPOOL_CORS_MAX_AGE_SECONDS")? {
            config.cors.max_age_seconds = max_age;
        }

        if let Some(ttl) = env_u64("CARPOOL_SESSION_TTL_HOURS")? {
            if ttl == 0 {
                return Err(Error::validation(
                    "CARPOOL_SESSION_TTL_HOURS must be greater than 0",
                ));
            }
            config.session.ttl_hours = ttl;
        }
        if let Some(name) = env_string("CARPOOL_SESSION_COOKIE_NAME") {
            config.session.cookie_name = name;
        }

        if let Some(numbers) = env_string("CARPOOL_STUDENT_NUMBERS") {
            config.roster.student_numbers = numbers
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(enabled) = env_bool("CARPOOL_SEED_ADMIN")? {
            config.seed_admin = enabled.then(SeedAdminConfig::default);
        }
        if let Some(email) = env_string("CARPOOL_ADMIN_EMAIL") {
            config.seed_admin.get_or_insert_with(SeedAdminConfig::default).email = email;
        }
        if let Some(password) = env_string("CARPOOL_ADMIN_PASSWORD") {
            config
                .seed_admin
                .get_or_insert_with(SeedAdminConfig::default)
                .password = password;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns an error when production settings carry development-only values.
    pub fn validate(&self) -> Result<()> {
        if !self.debug {
            if self.cors.allowed_origins.iter().any(|o| o == "*") {
                return Err(Error::validation(
                    "CARPOOL_CORS_ALLOWED_ORIGINS cannot be '*' when CARPOOL_DEBUG=false",
                ));
            }
            if self.seed_admin.is_some() {
                return Err(Error::validation(
                    "seed admin account is only allowed when CARPOOL_DEBUG=true",
                ));
            }
        }
        if self.roster.student_numbers.is_empty() {
            return Err(Error::validation(
                "CARPOOL_STUDENT_NUMBERS must list at least one student number",
            ));
        }
        Ok(())
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn env_u16(name: &str) -> Result<Option<u16>> {
    let Some(v) = env_string(name) else {
        return Ok(None);
    };
    v.parse::<u16>()
        .map(Some)
        .map_err(|e| Error::validation(format!("{name} must be a u16: {e}")))
}

fn env_u64(name: &str) -> Result<Option<u64>> {
    let Some(v) = env_string(name) else {
        return Ok(None);
    };
    v.parse::<u64>()
        .map(Some)
        .map_err(|e| Error::validation(format!("{name} must be a u64: {e}")))
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    let value = value.trim().to_ascii_lowercase();
    match value.as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        _ => Err(Error::validation(format!(
            "{name} must be a boolean (true/false/1/0)"
        ))),
    }
}

fn env_bool(name: &str) -> Result<Option<bool>> {
    let Some(v) = env_string(name) else {
        return Ok(None);
    };
    parse_bool(name, &v).map(Some)
}

fn parse_cors_allowed_origins(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed == "*" {
        return vec!["*".to_string()];
    }

    trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_roster_matches_enrollment_list() {
        let roster = RosterConfig::default();
        assert!(roster.contains("12345678"));
        assert!(roster.contains(" 1 "));
        assert!(!roster.contains("99"));
    }

    #[test]
    fn seed_admin_debug_redacts_password() {
        let seed = SeedAdminConfig::default();
        let dbg = format!("{seed:?}");
        assert!(dbg.contains("REDACTED"));
        assert!(!dbg.contains("admin@gmail.com\", password: \"admin"));
    }

    #[test]
    fn validate_rejects_wildcard_cors_outside_debug() {
        let config = Config {
            debug: false,
            seed_admin: None,
            cors: CorsConfig {
                allowed_origins: vec!["*".to_string()],
                max_age_seconds: 60,
            },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_seed_admin_outside_debug() {
        let config = Config {
            debug: false,
            cors: CorsConfig::default(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_roster() {
        let config = Config {
            roster: RosterConfig {
                student_numbers: Vec::new(),
            },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_defaults() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert!(parse_bool("TEST", "true").unwrap());
        assert!(parse_bool("TEST", "1").unwrap());
        assert!(!parse_bool("TEST", "no").unwrap());
        assert!(parse_bool("TEST", "maybe").is_err());
    }

    #[test]
    fn cors_origins_parse_wildcard_and_lists() {
        assert_eq!(parse_cors_allowed_origins("*"), vec!["*".to_string()]);
        assert_eq!(
            parse_cors_allowed_origins("http://a.test, http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(parse_cors_allowed_origins("  ").is_empty());
    }
}
