use crate::clock::{Clock, SystemClock};
use crate::codec::TokenCodec;
use crate::config::CsrfConfig;
use crate::entropy::{OsSaltSource, SaltSource};
use crate::error::Result;
use crate::secret::Secret;
use crate::token::CsrfToken;
use crate::window::Window;
use formseal_log::debug;

/// Binds the long-lived inputs (server secret, window, codec, clock) so
/// request handlers only pass the session secret, form id and token.
///
/// ```rust
/// use formseal_csrf::{CsrfGuard, Secret, Window};
///
/// let guard = CsrfGuard::new(Secret::new(b"server secret".to_vec()), Window::default());
///
/// let token = guard.issue(b"session-42", "profile-form").unwrap();
/// assert!(guard.is_valid(b"session-42", "profile-form", token.as_str()));
/// assert!(guard.validate(b"session-43", "profile-form", token.as_str()).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct CsrfGuard<S = OsSaltSource, C = SystemClock> {
    server_secret: Secret,
    window: Window,
    codec: TokenCodec<S>,
    clock: C,
}

impl CsrfGuard<OsSaltSource, SystemClock> {
    /// Guard using the `v1` format, OS randomness and the system clock.
    pub fn new(server_secret: Secret, window: Window) -> Self {
        debug!(
            "CSRF guard ready (window {}..{} minutes)",
            window.min().num_minutes(),
            window.max().num_minutes()
        );
        Self {
            server_secret,
            window,
            codec: TokenCodec::v1(),
            clock: SystemClock,
        }
    }

    /// Guard configured from a loaded [`CsrfConfig`].
    pub fn from_config(server_secret: Secret, config: &CsrfConfig) -> Result<Self> {
        let guard = Self::new(server_secret, config.window()?)
            .with_codec(TokenCodec::new(config.token_format()?));
        debug!(
            "CSRF guard using {} digest, {} construction",
            config.digest, config.construction
        );
        Ok(guard)
    }
}

impl<S, C> CsrfGuard<S, C> {
    /// Replace the codec (format and salt source).
    pub fn with_codec<S2>(self, codec: TokenCodec<S2>) -> CsrfGuard<S2, C> {
        CsrfGuard {
            server_secret: self.server_secret,
            window: self.window,
            codec,
            clock: self.clock,
        }
    }

    /// Replace the clock.
    pub fn with_clock<C2>(self, clock: C2) -> CsrfGuard<S, C2> {
        CsrfGuard {
            server_secret: self.server_secret,
            window: self.window,
            codec: self.codec,
            clock,
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn codec(&self) -> &TokenCodec<S> {
        &self.codec
    }
}

impl<S: SaltSource, C: Clock> CsrfGuard<S, C> {
    /// Issue a token for `form_id`, stamped with the clock's current time.
    pub fn issue(&self, session_secret: &[u8], form_id: impl AsRef<[u8]>) -> Result<CsrfToken> {
        self.codec.generate(
            self.server_secret.as_bytes(),
            session_secret,
            form_id,
            self.clock.now(),
        )
    }

    /// Whether `token` is currently valid for this session and form.
    pub fn is_valid(&self, session_secret: &[u8], form_id: impl AsRef<[u8]>, token: &str) -> bool {
        self.codec.verify(
            self.server_secret.as_bytes(),
            session_secret,
            form_id,
            &self.window,
            self.clock.now(),
            token,
        )
    }

    /// Like [`is_valid`](Self::is_valid), failing with
    /// [`CsrfError::InvalidToken`](crate::CsrfError::InvalidToken).
    pub fn validate(
        &self,
        session_secret: &[u8],
        form_id: impl AsRef<[u8]>,
        token: &str,
    ) -> Result<()> {
        self.codec.check(
            self.server_secret.as_bytes(),
            session_secret,
            form_id,
            &self.window,
            self.clock.now(),
            token,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::CsrfError;
    use crate::format::DigestConstruction;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, Ordering};

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 15).unwrap()
    }

    #[test]
    fn test_issue_and_validate() {
        let guard = CsrfGuard::new(Secret::new(b"server".to_vec()), Window::default())
            .with_clock(FixedClock::new(issued_at()));

        let token = guard.issue(b"session", "form").unwrap();
        assert!(guard.is_valid(b"session", "form", token.as_str()));
        assert!(guard.validate(b"session", "form", token.as_str()).is_ok());
        assert!(!guard.is_valid(b"session", "other", token.as_str()));
        assert!(matches!(
            guard.validate(b"other", "form", token.as_str()),
            Err(CsrfError::InvalidToken)
        ));
    }

    #[test]
    fn test_guard_follows_clock() {
        let offset = Arc::new(AtomicI64::new(0));
        let clock_offset = Arc::clone(&offset);
        let clock = move || issued_at() + Duration::minutes(clock_offset.load(Ordering::SeqCst));

        let guard = CsrfGuard::new(Secret::new(b"server".to_vec()), Window::default())
            .with_clock(clock);
        let token = guard.issue(b"session", "form").unwrap();

        offset.store(35 * 60, Ordering::SeqCst);
        assert!(guard.is_valid(b"session", "form", token.as_str()));

        offset.store(37 * 60, Ordering::SeqCst);
        assert!(!guard.is_valid(b"session", "form", token.as_str()));
    }

    #[test]
    fn test_from_config() {
        let config = CsrfConfig::new()
            .with_window_minutes(-1, 10)
            .with_construction(DigestConstruction::Hmac);
        let guard = CsrfGuard::from_config(Secret::new(b"server".to_vec()), &config)
            .unwrap()
            .with_clock(FixedClock::new(issued_at()));

        assert_eq!(guard.window().max(), Duration::minutes(10));
        assert_eq!(guard.codec().format().construction(), DigestConstruction::Hmac);

        let token = guard.issue(b"session", "form").unwrap();
        assert!(guard.is_valid(b"session", "form", token.as_str()));
    }

    #[test]
    fn test_from_invalid_config() {
        let config = CsrfConfig::new().with_window_minutes(10, -1);
        assert!(CsrfGuard::from_config(Secret::new(b"server".to_vec()), &config).is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let guard = CsrfGuard::new(Secret::new(b"topsecretvalue".to_vec()), Window::default());
        let shown = format!("{:?}", guard);
        assert!(!shown.contains("topsecretvalue"));
        assert!(shown.contains("REDACTED"));
    }

    #[test]
    fn test_guard_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CsrfGuard>();
        assert_send_sync::<TokenCodec>();
    }
}
