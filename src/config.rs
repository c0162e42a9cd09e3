//! # Configuration Module
//!
//! Worker configuration: secrets and endpoints the reference application needs at runtime.
//!
//! ## Sources
//!
//! - [`Env::from_env`] reads process environment variables
//! - [`Env::from_toml_file`] reads a TOML file with the same keys in `snake_case`
//!
//! ## Environment Variables
//!
//! | Variable          | Field             | Default                                   |
//! |-------------------|-------------------|-------------------------------------------|
//! | `JWT_SECRET`      | `jwt_secret`      | required                                  |
//! | `AUTH_HEADER_KEY` | `auth_header_key` | empty (no caller can self-promote)        |
//! | `CF_TOKEN`        | `cf_token`        | empty                                     |
//! | `CF_ACCOUNT_ID`   | `cf_account_id`   | empty                                     |
//! | `CF_API_BASE`     | `cf_api_base`     | `https://api.cloudflare.com/client/v4`    |
//! | `STATIC_DIR`      | `static_dir`      | unset (static fallback disabled)          |
//! | `PASSWORD_SALT`   | `password_salt`   | empty                                     |
//! | `TOKEN_TTL_SECS`  | `token_ttl_secs`  | `7200` (2 hours)                          |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use edgeroute::config::Env;
//!
//! let env = Env::from_env().expect("JWT_SECRET must be set");
//! println!("tokens live for {}s", env.token_ttl_secs);
//! ```

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default Cloudflare API base URL
pub const DEFAULT_CF_API_BASE: &str = "https://api.cloudflare.com/client/v4";
/// Default token lifetime: two hours
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 2 * 60 * 60;

fn default_cf_api_base() -> String {
    DEFAULT_CF_API_BASE.to_owned()
}

fn default_token_ttl_secs() -> u64 {
    DEFAULT_TOKEN_TTL_SECS
}

/// Worker environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Env {
    /// Shared secret used to sign and verify bearer tokens
    pub jwt_secret: String,
    /// Pre-shared key that marks a newly created user as admin (`X-EffEng-PSK` header)
    #[serde(default)]
    pub auth_header_key: String,
    /// Cloudflare API token
    #[serde(default)]
    pub cf_token: String,
    /// Cloudflare account identifier
    #[serde(default)]
    pub cf_account_id: String,
    #[serde(default = "default_cf_api_base")]
    pub cf_api_base: String,
    /// Directory served when no route matches
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
    /// Salt mixed into password digests
    #[serde(default)]
    pub password_salt: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

/// Failure to assemble an [`Env`].
#[derive(Debug)]
pub enum ConfigError {
    /// A required variable is absent or empty
    Missing(&'static str),
    /// A variable is present but cannot be parsed
    Invalid { key: &'static str, value: String },
    /// The configuration file could not be read
    Io { path: PathBuf, source: std::io::Error },
    /// The configuration file is not valid TOML for [`Env`]
    Parse { path: PathBuf, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing required configuration: {key}"),
            ConfigError::Invalid { key, value } => {
                write!(f, "invalid value for {key}: {value:?}")
            }
            ConfigError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            ConfigError::Parse { path, message } => {
                write!(f, "failed to parse {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Env {
    /// Build an environment with the given signing secret and defaults elsewhere
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            auth_header_key: String::new(),
            cf_token: String::new(),
            cf_account_id: String::new(),
            cf_api_base: default_cf_api_base(),
            static_dir: None,
            password_salt: String::new(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }

    /// Load configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `JWT_SECRET` is unset or empty and
    /// [`ConfigError::Invalid`] when `TOKEN_TTL_SECS` is not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Env::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let jwt_secret = var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let token_ttl_secs = match var("TOKEN_TTL_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "TOKEN_TTL_SECS",
                value: raw,
            })?,
            None => DEFAULT_TOKEN_TTL_SECS,
        };

        Ok(Self {
            jwt_secret,
            auth_header_key: var("AUTH_HEADER_KEY").unwrap_or_default(),
            cf_token: var("CF_TOKEN").unwrap_or_default(),
            cf_account_id: var("CF_ACCOUNT_ID").unwrap_or_default(),
            cf_api_base: var("CF_API_BASE").unwrap_or_else(default_cf_api_base),
            static_dir: var("STATIC_DIR").map(PathBuf::from),
            password_salt: var("PASSWORD_SALT").unwrap_or_default(),
            token_ttl_secs,
        })
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, is not valid TOML, or has an empty `jwt_secret`.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let env: Env = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if env.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("jwt_secret"));
        }
        Ok(env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_secret_is_error() {
        let err = Env::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));

        let err = Env::from_lookup(lookup(&[("JWT_SECRET", "")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn test_defaults_applied() {
        let env = Env::from_lookup(lookup(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(env, Env::new("s3cret"));
        assert_eq!(env.token_ttl_secs, 7200);
        assert_eq!(env.cf_api_base, DEFAULT_CF_API_BASE);
        assert!(env.static_dir.is_none());
    }

    #[test]
    fn test_all_variables_read() {
        let env = Env::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("AUTH_HEADER_KEY", "psk"),
            ("CF_TOKEN", "tok"),
            ("CF_ACCOUNT_ID", "acc"),
            ("CF_API_BASE", "http://localhost:9000"),
            ("STATIC_DIR", "/srv/www"),
            ("PASSWORD_SALT", "pepper"),
            ("TOKEN_TTL_SECS", "60"),
        ]))
        .unwrap();
        assert_eq!(env.auth_header_key, "psk");
        assert_eq!(env.cf_token, "tok");
        assert_eq!(env.cf_account_id, "acc");
        assert_eq!(env.cf_api_base, "http://localhost:9000");
        assert_eq!(env.static_dir, Some(PathBuf::from("/srv/www")));
        assert_eq!(env.password_salt, "pepper");
        assert_eq!(env.token_ttl_secs, 60);
    }

    #[test]
    fn test_invalid_ttl() {
        let err = Env::from_lookup(lookup(&[("JWT_SECRET", "s"), ("TOKEN_TTL_SECS", "soon")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid value for TOKEN_TTL_SECS: \"soon\"");
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "jwt_secret = \"abc\"\nauth_header_key = \"psk\"\ntoken_ttl_secs = 10"
        )
        .unwrap();
        let env = Env::from_toml_file(file.path()).unwrap();
        assert_eq!(env.jwt_secret, "abc");
        assert_eq!(env.auth_header_key, "psk");
        assert_eq!(env.token_ttl_secs, 10);
        assert_eq!(env.cf_api_base, DEFAULT_CF_API_BASE);
    }

    #[test]
    fn test_from_toml_file_errors() {
        let err = Env::from_toml_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "jwt_secret = 12").unwrap();
        let err = Env::from_toml_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
