//! # Formseal CSRF Tokens
//!
//! Framework-agnostic Cross-Site Request Forgery tokens that are bound to a
//! server secret, a session secret and a form id, and are only accepted
//! inside a time window.
//!
//! ## Features
//!
//! - ✅ **Stateless** - Nothing to store server-side; tokens are re-derived on verify
//! - ✅ **BREACH-resistant** - Fresh 128-bit salt in every token
//! - ✅ **Per-form** - A token leaked from one form is useless on another
//! - ✅ **Time-windowed** - Configurable clock-skew tolerance and lifetime
//! - ✅ **Constant-time** - Final comparison via `subtle`
//! - ✅ **No oracle** - Every failure is the same `false` / `InvalidToken`
//!
//! Token layout:
//!
//! ```text
//! v1|YYYY.MM.DD.HH.MM|<32 hex salt>|<64 hex digest>
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use formseal_csrf::Window;
//!
//! let server_secret = b"0123456789abcdef";
//! let session_secret = b"per-session-secret";
//! let now = Utc::now();
//!
//! let token = formseal_csrf::generate(server_secret, session_secret, "login-form", now).unwrap();
//!
//! // 90 minutes of clock skew, 36 hours of lifetime
//! let window = Window::default();
//! assert!(formseal_csrf::verify(
//!     server_secret,
//!     session_secret,
//!     "login-form",
//!     &window,
//!     now + Duration::hours(1),
//!     token.as_str(),
//! ));
//! ```
//!
//! ## Throwing Variant
//!
//! ```rust
//! use chrono::Utc;
//! use formseal_csrf::{CsrfError, Window};
//!
//! let result = formseal_csrf::check(
//!     b"server",
//!     b"session",
//!     "login-form",
//!     &Window::default(),
//!     Utc::now(),
//!     "not-a-token",
//! );
//! assert!(matches!(result, Err(CsrfError::InvalidToken)));
//! ```
//!
//! ## Guard
//!
//! [`CsrfGuard`] keeps the server secret, window and clock together for use
//! inside request handlers. Delivering the token (hidden field, header) and
//! managing sessions are left to the embedding application.

pub mod clock;
pub mod codec;
pub mod config;
pub mod entropy;
pub mod error;
pub mod format;
pub mod guard;
pub mod secret;
pub mod timestamp;
pub mod token;
pub mod window;

pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::TokenCodec;
pub use config::CsrfConfig;
pub use entropy::{OsSaltSource, SaltSource};
pub use error::{CsrfError, Result};
pub use format::{DigestAlgorithm, DigestConstruction, TokenFormat};
pub use guard::CsrfGuard;
pub use secret::Secret;
pub use token::CsrfToken;
pub use window::Window;

use chrono::{DateTime, Utc};

/// Issue a `v1` token with fresh OS randomness.
pub fn generate(
    server_secret: &[u8],
    session_secret: &[u8],
    form_id: impl AsRef<[u8]>,
    time: DateTime<Utc>,
) -> Result<CsrfToken> {
    TokenCodec::v1().generate(server_secret, session_secret, form_id, time)
}

/// Build a `v1` token from an explicit salt (deterministic).
pub fn generate_with_salt(
    server_secret: &[u8],
    session_secret: &[u8],
    form_id: impl AsRef<[u8]>,
    time: DateTime<Utc>,
    salt: &[u8],
) -> Result<CsrfToken> {
    TokenCodec::v1().generate_with_salt(server_secret, session_secret, form_id, time, salt)
}

/// Verify a `v1` token. See [`TokenCodec::verify`].
pub fn verify(
    server_secret: &[u8],
    session_secret: &[u8],
    form_id: impl AsRef<[u8]>,
    window: &Window,
    server_time: DateTime<Utc>,
    token: &str,
) -> bool {
    TokenCodec::v1().verify(
        server_secret,
        session_secret,
        form_id,
        window,
        server_time,
        token,
    )
}

/// Verify a `v1` token, failing with [`CsrfError::InvalidToken`].
pub fn check(
    server_secret: &[u8],
    session_secret: &[u8],
    form_id: impl AsRef<[u8]>,
    window: &Window,
    server_time: DateTime<Utc>,
    token: &str,
) -> Result<()> {
    TokenCodec::v1().check(
        server_secret,
        session_secret,
        form_id,
        window,
        server_time,
        token,
    )
}
