use crate::error::{CsrfError, Result};
use formseal_log::error;
use rand::RngCore;
use rand::rngs::OsRng;
use std::sync::Arc;

/// Source of per-token salt.
///
/// Implementations must be cryptographically secure and must fail rather
/// than hand out weaker bytes.
pub trait SaltSource: Send + Sync {
    /// Fill `buf` entirely with random bytes.
    fn fill(&self, buf: &mut [u8]) -> Result<()>;
}

/// The operating system's CSPRNG (`getrandom(2)`, `/dev/urandom` after
/// seeding, `BCryptGenRandom`, ...).
///
/// Blocks until the OS entropy pool is initialised; an unavailable source is
/// reported as [`CsrfError::EntropyUnavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSaltSource;

impl SaltSource for OsSaltSource {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        OsRng.try_fill_bytes(buf).map_err(|e| {
            error!("OS random source failed: {}", e);
            CsrfError::EntropyUnavailable(e.to_string())
        })
    }
}

impl<T: SaltSource + ?Sized> SaltSource for Arc<T> {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        (**self).fill(buf)
    }
}

impl<T: SaltSource + ?Sized> SaltSource for &T {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        (**self).fill(buf)
    }
}
