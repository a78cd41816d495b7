use crate::error::{CsrfError, Result};
use std::fmt;

/// Opaque key material.
///
/// The `Debug` output never includes the bytes, so a `Secret` can sit inside
/// structs that get logged.
#[derive(Clone)]
pub struct Secret(Vec<u8>);

impl Secret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Decode a hex-encoded secret (either case).
    pub fn from_hex(encoded: &str) -> Result<Self> {
        hex::decode(encoded.trim())
            .map(Self)
            .map_err(|e| CsrfError::Config(format!("Secret is not valid hex: {}", e)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Secret {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Secret {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Secret {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret([REDACTED; {} bytes])", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let secret = Secret::new(b"hunter2hunter2".to_vec());
        let shown = format!("{:?}", secret);
        assert_eq!(shown, "Secret([REDACTED; 14 bytes])");
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn test_from_hex() {
        let secret = Secret::from_hex("0123456789ABCDEF0123456789abcdef").unwrap();
        assert_eq!(secret.len(), 16);
        assert_eq!(secret.as_bytes()[0], 0x01);
        assert_eq!(secret.as_bytes()[15], 0xef);

        assert!(Secret::from_hex("not hex").is_err());
        assert!(Secret::from_hex("abc").is_err());
    }

    #[test]
    fn test_empty() {
        assert!(Secret::new(Vec::new()).is_empty());
    }
}
