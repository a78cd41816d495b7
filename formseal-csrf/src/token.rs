use serde::{Deserialize, Serialize};
use std::fmt;

/// An issued CSRF token: `version|YYYY.MM.DD.HH.MM|hex(salt)|hex(digest)`.
///
/// Serializes as the bare string so it can be embedded in templates or JSON
/// bodies. Whatever comes back from a client is verified as `&str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub(crate) fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for CsrfToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CsrfToken> for String {
    fn from(token: CsrfToken) -> Self {
        token.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_plain_string() {
        let token = CsrfToken::new("v1|x|y|z".to_string());
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, "\"v1|x|y|z\"");

        let back: CsrfToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }

    #[test]
    fn test_accessors() {
        let token = CsrfToken::new("abc".to_string());
        assert_eq!(token.as_str(), "abc");
        assert_eq!(token.to_string(), "abc");
        assert_eq!(token.len(), 3);
        assert!(!token.is_empty());
        assert_eq!(String::from(token), "abc");
    }
}
