// Formseal - simple, framework-agnostic, BREACH-resistant CSRF tokens
//
// Tokens are bound to a server secret, a session secret and a form id, and
// are only accepted inside a time window. Delivering them to the browser and
// managing sessions is left to the embedding application.

// Re-export the token codec
pub use formseal_csrf::*;

// Re-export the codec crate under its own name
pub use formseal_csrf as csrf;

// Re-export logging controls
#[cfg(feature = "log")]
pub use formseal_log as log;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Clock, CsrfConfig, CsrfError, CsrfGuard, CsrfToken, Secret, SystemClock, TokenCodec,
        TokenFormat, Window,
    };
    pub use chrono::{DateTime, Duration, Utc};
}
