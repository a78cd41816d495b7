use crate::error::{CsrfError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Version tag of the current token layout.
pub const VERSION_V1: &str = "v1";

/// Separator between the four token fields.
pub const FIELD_SEPARATOR: char = '|';

/// Number of field separators in a token.
pub const FIELD_SEPARATORS: usize = 3;

/// Length of the `YYYY.MM.DD.HH.MM` time field.
pub const TIME_FIELD_LEN: usize = 16;

/// Separator between the components of the time field.
pub const TIME_SEPARATOR: char = '.';

/// Number of separators inside the time field.
pub const TIME_FIELD_SEPARATORS: usize = 4;

/// Default salt size: 128 bits.
pub const DEFAULT_SALT_LEN: usize = 16;

/// Largest accepted salt size in bytes.
pub const MAX_SALT_LEN: usize = 1024;

/// Hash used to derive the token digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    /// Digest size in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha512 => 64,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha512 => "sha512",
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = CsrfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sha256" => Ok(DigestAlgorithm::Sha256),
            "sha512" => Ok(DigestAlgorithm::Sha512),
            other => Err(CsrfError::Config(format!("Unknown digest algorithm: {}", other))),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the secrets are mixed into the digest.
///
/// `Concatenated` hashes `salt|server|session|form|time` directly and is the
/// layout every existing `v1` token uses. `Hmac` keys the hash with the server
/// secret over `salt|session|form|time`; the token text keeps the same shape,
/// only the digest value differs, so both sides must agree on the choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestConstruction {
    #[default]
    Concatenated,
    Hmac,
}

impl DigestConstruction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestConstruction::Concatenated => "concatenated",
            DigestConstruction::Hmac => "hmac",
        }
    }
}

impl FromStr for DigestConstruction {
    type Err = CsrfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "concatenated" => Ok(DigestConstruction::Concatenated),
            "hmac" => Ok(DigestConstruction::Hmac),
            other => Err(CsrfError::Config(format!(
                "Unknown digest construction: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for DigestConstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of the token layout.
///
/// Every exact-length check made during verification is derived from this
/// value, so changing the salt size or the hash changes the accepted token
/// length with it. Build it once and hand it to the codec.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenFormat {
    version: String,
    salt_len: usize,
    digest: DigestAlgorithm,
    construction: DigestConstruction,
}

impl TokenFormat {
    /// The `v1` layout: 128-bit salt, SHA-256, concatenated secrets.
    pub fn v1() -> Self {
        Self {
            version: VERSION_V1.to_string(),
            salt_len: DEFAULT_SALT_LEN,
            digest: DigestAlgorithm::Sha256,
            construction: DigestConstruction::Concatenated,
        }
    }

    /// Set the version tag.
    ///
    /// The tag must be non-empty printable ASCII without the field separator.
    pub fn with_version(mut self, version: impl Into<String>) -> Result<Self> {
        let version = version.into();
        let printable = version.bytes().all(|b| b.is_ascii_graphic());
        if version.is_empty() || !printable || version.contains(FIELD_SEPARATOR) {
            return Err(CsrfError::Config(format!(
                "Invalid token version tag: {:?}",
                version
            )));
        }
        self.version = version;
        Ok(self)
    }

    /// Set the salt size in bytes, between 1 and [`MAX_SALT_LEN`].
    pub fn with_salt_len(mut self, salt_len: usize) -> Result<Self> {
        if salt_len == 0 {
            return Err(CsrfError::Config("Salt length must be non-zero".to_string()));
        }
        if salt_len > MAX_SALT_LEN {
            return Err(CsrfError::Config(format!(
                "Salt length {} exceeds maximum of {} bytes",
                salt_len, MAX_SALT_LEN
            )));
        }
        self.salt_len = salt_len;
        Ok(self)
    }

    pub fn with_digest(mut self, digest: DigestAlgorithm) -> Self {
        self.digest = digest;
        self
    }

    pub fn with_construction(mut self, construction: DigestConstruction) -> Self {
        self.construction = construction;
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn salt_len(&self) -> usize {
        self.salt_len
    }

    pub fn salt_hex_len(&self) -> usize {
        2 * self.salt_len
    }

    pub fn digest(&self) -> DigestAlgorithm {
        self.digest
    }

    pub fn construction(&self) -> DigestConstruction {
        self.construction
    }

    pub fn digest_hex_len(&self) -> usize {
        2 * self.digest.output_len()
    }

    /// Exact length of every token in this format.
    pub fn token_len(&self) -> usize {
        self.version.len()
            + TIME_FIELD_LEN
            + self.salt_hex_len()
            + self.digest_hex_len()
            + FIELD_SEPARATORS
    }
}

impl Default for TokenFormat {
    fn default() -> Self {
        Self::v1()
    }
}
