use crate::entropy::{OsSaltSource, SaltSource};
use crate::error::{CsrfError, Result};
use crate::format::{
    DigestAlgorithm, DigestConstruction, FIELD_SEPARATOR, FIELD_SEPARATORS, TokenFormat,
};
use crate::timestamp;
use crate::token::CsrfToken;
use crate::window::Window;
use chrono::{DateTime, Utc};
use formseal_log::trace;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};
use subtle::ConstantTimeEq;

/// Issues and verifies CSRF tokens for one [`TokenFormat`].
///
/// The codec holds no secrets and no mutable state; it can be shared freely
/// between threads. Secrets, form id and times are passed on every call.
///
/// ```rust
/// use chrono::{Duration, Utc};
/// use formseal_csrf::{TokenCodec, Window};
///
/// let codec = TokenCodec::v1();
/// let now = Utc::now();
/// let token = codec
///     .generate(b"server secret", b"session secret", "login-form", now)
///     .unwrap();
///
/// let window = Window::default();
/// assert!(codec.verify(b"server secret", b"session secret", "login-form", &window, now, token.as_str()));
/// assert!(!codec.verify(b"server secret", b"session secret", "other-form", &window, now, token.as_str()));
/// assert!(!codec.verify(
///     b"server secret",
///     b"session secret",
///     "login-form",
///     &window,
///     now + Duration::hours(37),
///     token.as_str(),
/// ));
/// ```
#[derive(Debug, Clone)]
pub struct TokenCodec<S = OsSaltSource> {
    format: TokenFormat,
    salts: S,
}

impl TokenCodec<OsSaltSource> {
    /// Codec for `format`, salted from the operating system CSPRNG.
    pub fn new(format: TokenFormat) -> Self {
        Self::with_salt_source(format, OsSaltSource)
    }

    /// Codec for the `v1` layout, salted from the operating system CSPRNG.
    pub fn v1() -> Self {
        Self::new(TokenFormat::v1())
    }
}

impl Default for TokenCodec<OsSaltSource> {
    fn default() -> Self {
        Self::v1()
    }
}

impl<S> TokenCodec<S> {
    /// Codec drawing salt from a caller-supplied source.
    pub fn with_salt_source(format: TokenFormat, salts: S) -> Self {
        Self { format, salts }
    }

    pub fn format(&self) -> &TokenFormat {
        &self.format
    }

    /// Build a token from an explicit salt.
    ///
    /// This is the deterministic core of [`generate`](Self::generate): the
    /// same inputs always give the same token. Seconds in `time` are dropped.
    /// An empty `form_id` is accepted but makes the token valid for every
    /// form that also uses an empty id.
    pub fn generate_with_salt(
        &self,
        server_secret: &[u8],
        session_secret: &[u8],
        form_id: impl AsRef<[u8]>,
        time: DateTime<Utc>,
        salt: &[u8],
    ) -> Result<CsrfToken> {
        if salt.len() != self.format.salt_len() {
            return Err(CsrfError::InvalidSalt {
                expected: self.format.salt_len(),
                actual: salt.len(),
            });
        }

        let time = timestamp::format_minute(&time)?;
        let digest = self.digest(
            server_secret,
            session_secret,
            form_id.as_ref(),
            time.as_bytes(),
            salt,
        );

        let mut token = String::with_capacity(self.format.token_len());
        token.push_str(self.format.version());
        token.push(FIELD_SEPARATOR);
        token.push_str(&time);
        token.push(FIELD_SEPARATOR);
        token.push_str(&hex::encode(salt));
        token.push(FIELD_SEPARATOR);
        token.push_str(&hex::encode(digest));

        Ok(CsrfToken::new(token))
    }

    /// Check `token` against the secrets, form id and window.
    ///
    /// `server_time` is the verifier's "now"; this function never reads a
    /// clock. Any malformed, expired, premature or forged token yields
    /// `false`. The final comparison is constant-time.
    pub fn verify(
        &self,
        server_secret: &[u8],
        session_secret: &[u8],
        form_id: impl AsRef<[u8]>,
        window: &Window,
        server_time: DateTime<Utc>,
        token: &str,
    ) -> bool {
        let format = &self.format;

        if token.len() != format.token_len() {
            return reject("length");
        }
        if token.matches(FIELD_SEPARATOR).count() != FIELD_SEPARATORS {
            return reject("separator");
        }

        let mut fields = token.split(FIELD_SEPARATOR);
        let (Some(version), Some(time), Some(salt_hex), Some(digest_hex), None) = (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) else {
            return reject("field");
        };

        if version != format.version() {
            return reject("version");
        }

        let Some(token_time) = timestamp::parse_minute(time) else {
            return reject("time");
        };

        if salt_hex.len() != format.salt_hex_len() {
            return reject("salt");
        }
        let Ok(salt) = hex::decode(salt_hex) else {
            return reject("salt");
        };

        if !window.contains(server_time.signed_duration_since(token_time)) {
            return reject("window");
        }

        if hex::decode(digest_hex).is_err() {
            return reject("digest");
        }

        let Ok(expected) =
            self.generate_with_salt(server_secret, session_secret, form_id, token_time, &salt)
        else {
            return reject("digest");
        };

        if bool::from(expected.as_str().as_bytes().ct_eq(token.as_bytes())) {
            true
        } else {
            reject("digest")
        }
    }

    /// [`verify`](Self::verify), returning [`CsrfError::InvalidToken`] on
    /// failure.
    pub fn check(
        &self,
        server_secret: &[u8],
        session_secret: &[u8],
        form_id: impl AsRef<[u8]>,
        window: &Window,
        server_time: DateTime<Utc>,
        token: &str,
    ) -> Result<()> {
        if self.verify(server_secret, session_secret, form_id, window, server_time, token) {
            Ok(())
        } else {
            Err(CsrfError::InvalidToken)
        }
    }

    fn digest(
        &self,
        server_secret: &[u8],
        session_secret: &[u8],
        form_id: &[u8],
        time: &[u8],
        salt: &[u8],
    ) -> Vec<u8> {
        match self.format.construction() {
            DigestConstruction::Concatenated => {
                let parts = [salt, server_secret, session_secret, form_id, time];
                match self.format.digest() {
                    DigestAlgorithm::Sha256 => concatenated::<Sha256>(&parts),
                    DigestAlgorithm::Sha512 => concatenated::<Sha512>(&parts),
                }
            }
            DigestConstruction::Hmac => {
                let parts = [salt, session_secret, form_id, time];
                match self.format.digest() {
                    DigestAlgorithm::Sha256 => keyed::<Hmac<Sha256>>(server_secret, &parts),
                    DigestAlgorithm::Sha512 => keyed::<Hmac<Sha512>>(server_secret, &parts),
                }
            }
        }
    }
}

impl<S: SaltSource> TokenCodec<S> {
    /// Issue a token stamped with `time`, using fresh salt.
    ///
    /// Fails only if the salt source cannot deliver secure random bytes, or
    /// if `time` falls outside years 1..=9999.
    pub fn generate(
        &self,
        server_secret: &[u8],
        session_secret: &[u8],
        form_id: impl AsRef<[u8]>,
        time: DateTime<Utc>,
    ) -> Result<CsrfToken> {
        let mut salt = vec![0u8; self.format.salt_len()];
        self.salts.fill(&mut salt)?;
        self.generate_with_salt(server_secret, session_secret, form_id, time, &salt)
    }
}

fn reject(stage: &str) -> bool {
    trace!("CSRF token rejected at {} check", stage);
    false
}

/// `H(p0 | p1 | ... | pn)` with a literal `|` byte between parts.
fn concatenated<D: Digest>(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = D::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update(b"|");
        }
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}

fn keyed<M: Mac + KeyInit>(key: &[u8], parts: &[&[u8]]) -> Vec<u8> {
    let mut mac = <M as KeyInit>::new_from_slice(key).expect("HMAC can take key of any size");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            mac.update(b"|");
        }
        mac.update(part);
    }
    mac.finalize().into_bytes().to_vec()
}
