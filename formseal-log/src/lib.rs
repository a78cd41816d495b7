//! Formseal Logging
//!
//! Small, dependency-light logging for the formseal crates. Output goes to
//! stderr and is controlled entirely through environment variables, so the
//! token codec can report what it is doing without pulling a logging
//! framework into every application that embeds it.
//!
//! # Usage
//!
//! ```rust
//! use formseal_log::{debug, error, info, trace, warn};
//!
//! trace!("checking token structure");
//! debug!("issuing token for form {}", "login");
//! info!("guard ready");
//! warn!("window max is unusually large");
//! error!("salt source unavailable");
//!
//! debug!(target: "formseal::csrf", "explicit target");
//! ```
//!
//! # Environment Variables
//!
//! - `FORMSEAL_DEBUG=1` - Enable debug logging
//! - `FORMSEAL_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `FORMSEAL_LOG_FORMAT=pretty|compact|json` - Set output format
//! - `FORMSEAL_LOG_TIMESTAMPS=1|0` - Include timestamps
//!
//! Secrets and token strings must never be passed to these macros.

use once_cell::sync::Lazy;
use std::env;
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

// ============================================================================
// Log Levels
// ============================================================================

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    /// Per-check detail, e.g. which verification stage rejected a token
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    /// Nothing is written
    Off = 5,
}

impl Level {
    /// Upper-case level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            _ => Level::Off,
        }
    }
}

impl FromStr for Level {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "off" | "none" => Ok(Level::Off),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `2024-01-01 12:00:00.000 DEBUG [target] message`
    Pretty,
    /// `12:00:00 D target: message`
    Compact,
    /// One JSON object per line
    Json,
}

impl FromStr for Format {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Format::Pretty),
            "compact" => Ok(Format::Compact),
            "json" => Ok(Format::Json),
            _ => Err(()),
        }
    }
}

// ============================================================================
// Global Configuration
// ============================================================================

const LEVEL_UNSET: u8 = u8::MAX;

/// Active level; `LEVEL_UNSET` until the environment has been read.
static LOG_LEVEL: AtomicU8 = AtomicU8::new(LEVEL_UNSET);

static CONFIG: Lazy<LogConfig> = Lazy::new(|| {
    let config = LogConfig::from_env();
    let _ = LOG_LEVEL.compare_exchange(
        LEVEL_UNSET,
        config.level as u8,
        Ordering::SeqCst,
        Ordering::SeqCst,
    );
    config
});

/// Logging configuration, read once from the environment.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum level written
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Whether to prefix records with a timestamp
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            format: Format::Json,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Build a config from `FORMSEAL_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// Unknown or malformed values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| {
            lookup(key).map(|v| {
                let v = v.trim().to_lowercase();
                v == "1" || v == "true"
            })
        };

        let debug = flag("FORMSEAL_DEBUG").unwrap_or(false);

        let level = lookup("FORMSEAL_LOG_LEVEL")
            .and_then(|s| s.parse().ok())
            .unwrap_or(if debug { Level::Debug } else { Level::Info });

        let format = lookup("FORMSEAL_LOG_FORMAT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(Format::Json);

        let timestamps = flag("FORMSEAL_LOG_TIMESTAMPS").unwrap_or(true);

        Self {
            level,
            format,
            timestamps,
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Read the environment now instead of on the first log call.
pub fn init() {
    Lazy::force(&CONFIG);
}

/// The configuration read from the environment.
pub fn config() -> &'static LogConfig {
    &CONFIG
}

/// Current minimum level.
pub fn current_level() -> Level {
    let raw = LOG_LEVEL.load(Ordering::Relaxed);
    if raw == LEVEL_UNSET {
        init();
        return Level::from_u8(LOG_LEVEL.load(Ordering::Relaxed));
    }
    Level::from_u8(raw)
}

/// Whether a record at `level` would be written.
#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    level != Level::Off && level >= current_level()
}

/// Override the level at runtime.
pub fn set_level(level: Level) {
    init();
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Lower the level to at least `Debug`, or restore `Info`.
pub fn set_debug(enabled: bool) {
    if enabled {
        if current_level() > Level::Debug {
            set_level(Level::Debug);
        }
    } else if current_level() < Level::Info {
        set_level(Level::Info);
    }
}

// ============================================================================
// Log Output
// ============================================================================

#[doc(hidden)]
pub fn log(level: Level, target: &str, message: &str) {
    if !is_level_enabled(level) {
        return;
    }

    let config = config();
    let line = render(config, level, target, message);
    let _ = writeln!(std::io::stderr().lock(), "{}", line);
}

fn render(config: &LogConfig, level: Level, target: &str, message: &str) -> String {
    match config.format {
        Format::Pretty => {
            let mut out = String::new();
            if config.timestamps {
                out.push_str(&chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f ").to_string());
            }
            out.push_str(&format!("{:5} ", level.as_str()));
            if !target.is_empty() {
                out.push_str(&format!("[{}] ", target));
            }
            out.push_str(message);
            out
        }
        Format::Compact => {
            let mut out = String::new();
            if config.timestamps {
                out.push_str(&chrono::Utc::now().format("%H:%M:%S ").to_string());
            }
            out.push(level.as_str().chars().next().unwrap_or('?'));
            out.push(' ');
            if !target.is_empty() {
                out.push_str(target);
                out.push_str(": ");
            }
            out.push_str(message);
            out
        }
        Format::Json => render_json(config, level, target, message),
    }
}

#[cfg(feature = "json")]
fn render_json(config: &LogConfig, level: Level, target: &str, message: &str) -> String {
    use serde::Serialize;

    #[derive(Serialize)]
    struct LogEntry<'a> {
        #[serde(skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
        level: &'a str,
        target: &'a str,
        message: &'a str,
    }

    let entry = LogEntry {
        timestamp: config.timestamps.then(|| chrono::Utc::now().to_rfc3339()),
        level: level.as_str(),
        target,
        message,
    };

    serde_json::to_string(&entry).unwrap_or_else(|_| message.to_string())
}

#[cfg(not(feature = "json"))]
fn render_json(config: &LogConfig, level: Level, target: &str, message: &str) -> String {
    let mut out = String::from("{");
    if config.timestamps {
        out.push_str(&format!(r#""timestamp":"{}","#, chrono::Utc::now().to_rfc3339()));
    }
    out.push_str(&format!(
        r#""level":"{}","target":"{}","message":"{}"}}"#,
        level.as_str(),
        escape_json(target),
        escape_json(message)
    ));
    out
}

#[cfg(not(feature = "json"))]
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => result.push_str(&format!("\\u{:04x}", c as u32)),
            c => result.push(c),
        }
    }
    result
}

// ============================================================================
// Macros
// ============================================================================

/// Log a trace message.
#[macro_export]
macro_rules! trace {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Trace) {
            $crate::log($crate::Level::Trace, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Trace) {
            $crate::log($crate::Level::Trace, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log a debug message.
///
/// Enabled by `FORMSEAL_DEBUG=1` or `FORMSEAL_LOG_LEVEL=debug`.
///
/// ```rust
/// use formseal_log::debug;
///
/// let form = "checkout";
/// debug!("issued token for {}", form);
/// ```
#[macro_export]
macro_rules! debug {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Debug) {
            $crate::log($crate::Level::Debug, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Debug) {
            $crate::log($crate::Level::Debug, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log an info message.
#[macro_export]
macro_rules! info {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Info) {
            $crate::log($crate::Level::Info, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Info) {
            $crate::log($crate::Level::Info, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log a warning message.
#[macro_export]
macro_rules! warn {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Warn) {
            $crate::log($crate::Level::Warn, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Warn) {
            $crate::log($crate::Level::Warn, module_path!(), &format!($($arg)+));
        }
    };
}

/// Log an error message.
#[macro_export]
macro_rules! error {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Error) {
            $crate::log($crate::Level::Error, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Error) {
            $crate::log($crate::Level::Error, module_path!(), &format!($($arg)+));
        }
    };
}

// ============================================================================
// Tests
// ============================================================================
