use crate::error::{CsrfError, Result};
use crate::format::{DigestAlgorithm, DigestConstruction, TokenFormat};
use crate::window::Window;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Environment variable prefix read by [`CsrfConfig::from_env`].
pub const ENV_PREFIX: &str = "FORMSEAL_CSRF_";

/// CSRF token settings as loaded from a file or the environment.
///
/// This is the serializable, editable form. Turn it into the immutable
/// runtime values with [`window`](Self::window) and
/// [`token_format`](Self::token_format) once at startup.
///
/// ```toml
/// window_min_minutes = -90
/// window_max_minutes = 2160
/// digest = "sha256"
/// construction = "concatenated"
/// salt_bytes = 16
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsrfConfig {
    /// Lower window bound in minutes (exclusive, usually negative)
    pub window_min_minutes: i64,

    /// Upper window bound in minutes (exclusive)
    pub window_max_minutes: i64,

    /// Hash used for the token digest
    pub digest: DigestAlgorithm,

    /// How secrets are mixed into the digest
    pub construction: DigestConstruction,

    /// Salt size in bytes
    pub salt_bytes: usize,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            window_min_minutes: -90,
            window_max_minutes: 36 * 60,
            digest: DigestAlgorithm::Sha256,
            construction: DigestConstruction::Concatenated,
            salt_bytes: 16,
        }
    }
}

impl CsrfConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the window bounds in minutes
    pub fn with_window_minutes(mut self, min: i64, max: i64) -> Self {
        self.window_min_minutes = min;
        self.window_max_minutes = max;
        self
    }

    pub fn with_digest(mut self, digest: DigestAlgorithm) -> Self {
        self.digest = digest;
        self
    }

    pub fn with_construction(mut self, construction: DigestConstruction) -> Self {
        self.construction = construction;
        self
    }

    pub fn with_salt_bytes(mut self, salt_bytes: usize) -> Self {
        self.salt_bytes = salt_bytes;
        self
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| CsrfError::Config(format!("TOML parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CsrfError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Read `FORMSEAL_CSRF_*` variables on top of the defaults.
    ///
    /// Recognised: `WINDOW_MIN_MINUTES`, `WINDOW_MAX_MINUTES`, `DIGEST`,
    /// `CONSTRUCTION`, `SALT_BYTES`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));
        let mut config = Self::default();

        if let Some(value) = var("WINDOW_MIN_MINUTES") {
            config.window_min_minutes = parse_number("WINDOW_MIN_MINUTES", &value)?;
        }
        if let Some(value) = var("WINDOW_MAX_MINUTES") {
            config.window_max_minutes = parse_number("WINDOW_MAX_MINUTES", &value)?;
        }
        if let Some(value) = var("DIGEST") {
            config.digest = value.parse()?;
        }
        if let Some(value) = var("CONSTRUCTION") {
            config.construction = value.parse()?;
        }
        if let Some(value) = var("SALT_BYTES") {
            config.salt_bytes = parse_number("SALT_BYTES", &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the settings describe a usable window and format.
    pub fn validate(&self) -> Result<()> {
        self.window()?;
        self.token_format()?;
        Ok(())
    }

    pub fn window(&self) -> Result<Window> {
        Window::from_minutes(self.window_min_minutes, self.window_max_minutes)
    }

    pub fn token_format(&self) -> Result<TokenFormat> {
        Ok(TokenFormat::v1()
            .with_salt_len(self.salt_bytes)?
            .with_digest(self.digest)
            .with_construction(self.construction))
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CsrfError::Config(format!("{}{} is not a valid number: {:?}", ENV_PREFIX, name, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CsrfConfig::default();
        assert_eq!(config.window().unwrap(), Window::default());
        assert_eq!(config.token_format().unwrap(), TokenFormat::v1());
    }

    #[test]
    fn test_builder() {
        let config = CsrfConfig::new()
            .with_window_minutes(-5, 30)
            .with_digest(DigestAlgorithm::Sha512)
            .with_construction(DigestConstruction::Hmac)
            .with_salt_bytes(32);

        let window = config.window().unwrap();
        assert_eq!(window.min(), Duration::minutes(-5));
        assert_eq!(window.max(), Duration::minutes(30));

        let format = config.token_format().unwrap();
        assert_eq!(format.digest(), DigestAlgorithm::Sha512);
        assert_eq!(format.construction(), DigestConstruction::Hmac);
        assert_eq!(format.salt_len(), 32);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = CsrfConfig::from_toml_str(
            r#"
            window_max_minutes = 60
            construction = "hmac"
            "#,
        )
        .unwrap();

        assert_eq!(config.window_min_minutes, -90);
        assert_eq!(config.window_max_minutes, 60);
        assert_eq!(config.construction, DigestConstruction::Hmac);
        assert_eq!(config.digest, DigestAlgorithm::Sha256);
    }

    #[test]
    fn test_from_toml_rejects_bad_values() {
        assert!(CsrfConfig::from_toml_str("digest = \"md5\"").is_err());
        assert!(CsrfConfig::from_toml_str("window_min_minutes = 10\nwindow_max_minutes = 10").is_err());
        assert!(CsrfConfig::from_toml_str("salt_bytes = 0").is_err());
        assert!(CsrfConfig::from_toml_str("not toml at all [").is_err());
    }

    #[test]
    fn test_from_file_missing() {
        let result = CsrfConfig::from_file("/definitely/not/here/csrf.toml");
        assert!(matches!(result, Err(CsrfError::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("formseal-csrf-{}.toml", std::process::id()));
        fs::write(&path, "digest = \"sha512\"\n").unwrap();
        let config = CsrfConfig::from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.digest, DigestAlgorithm::Sha512);
    }

    #[test]
    fn test_from_lookup() {
        let config = CsrfConfig::from_lookup(lookup(&[
            ("FORMSEAL_CSRF_WINDOW_MIN_MINUTES", "-10"),
            ("FORMSEAL_CSRF_WINDOW_MAX_MINUTES", " 120 "),
            ("FORMSEAL_CSRF_DIGEST", "SHA512"),
            ("FORMSEAL_CSRF_CONSTRUCTION", "hmac"),
            ("FORMSEAL_CSRF_SALT_BYTES", "24"),
        ]))
        .unwrap();

        assert_eq!(config.window_min_minutes, -10);
        assert_eq!(config.window_max_minutes, 120);
        assert_eq!(config.digest, DigestAlgorithm::Sha512);
        assert_eq!(config.construction, DigestConstruction::Hmac);
        assert_eq!(config.salt_bytes, 24);
    }

    #[test]
    fn test_from_lookup_empty_is_default() {
        assert_eq!(CsrfConfig::from_lookup(lookup(&[])).unwrap(), CsrfConfig::default());
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        assert!(CsrfConfig::from_lookup(lookup(&[("FORMSEAL_CSRF_WINDOW_MAX_MINUTES", "soon")])).is_err());
        assert!(CsrfConfig::from_lookup(lookup(&[("FORMSEAL_CSRF_DIGEST", "crc32")])).is_err());
        assert!(CsrfConfig::from_lookup(lookup(&[("FORMSEAL_CSRF_WINDOW_MIN_MINUTES", "5000")])).is_err());
    }

    #[test]
    fn test_rejects_oversized_salt() {
        let result = CsrfConfig::from_lookup(lookup(&[(
            "FORMSEAL_CSRF_SALT_BYTES",
            "9223372036854775808",
        )]));
        assert!(matches!(result, Err(CsrfError::Config(_))));

        assert!(CsrfConfig::from_toml_str("salt_bytes = 1025").is_err());
        assert!(CsrfConfig::new().with_salt_bytes(usize::MAX).validate().is_err());
        assert!(CsrfConfig::new().with_salt_bytes(1024).validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = CsrfConfig::new().with_construction(DigestConstruction::Hmac);
        let text = toml::to_string(&config).unwrap();
        assert_eq!(CsrfConfig::from_toml_str(&text).unwrap(), config);
    }
}
