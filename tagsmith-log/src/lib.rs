//! Tagsmith Logging
//!
//! Structured logging for the Tagsmith engine, controlled by the
//! `TAGSMITH_DEBUG` environment variable.
//!
//! # Usage
//!
//! ```rust
//! use tagsmith_log::{debug, info, warn};
//!
//! debug!("resolving visitor variant");
//! info!("visitor assigned to {}", "test1_exp1");
//! warn!(target: "tagsmith::storage", "factor could not be persisted");
//! ```
//!
//! Records emitted through the [`log`](https://docs.rs/log) facade by other
//! crates can be routed through the same output with [`install_log_bridge`].
//!
//! # Environment Variables
//!
//! - `TAGSMITH_DEBUG=1` - Enable debug logging
//! - `TAGSMITH_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `TAGSMITH_LOG_FORMAT=pretty|json|compact` - Set output format
//! - `TAGSMITH_LOG_COLOR=1|0` - Enable/disable colors
//! - `TAGSMITH_LOG_TIMESTAMPS=1|0` - Include timestamps
//! - `TAGSMITH_LOG_MODULE=1|0` - Include the log target

use once_cell::sync::Lazy;
use std::env;
use std::fmt::{self, Write as _};
use std::io::{IsTerminal, Write};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

// ============================================================================
// Levels and formats
// ============================================================================

/// Severity of a record, least to most severe. `Off` silences everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl Level {
    const ALL: [Level; 6] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Off,
    ];

    const NAMES: [&'static str; 6] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR", "OFF"];

    pub fn as_str(&self) -> &'static str {
        Self::NAMES[*self as usize]
    }

    fn from_u8(value: u8) -> Self {
        Self::ALL.get(value as usize).copied().unwrap_or(Level::Off)
    }

    #[cfg(feature = "color")]
    fn paint(&self) -> String {
        use colored::Colorize;
        let name = format!("{:5}", self.as_str());
        match self {
            Level::Trace => name.magenta().to_string(),
            Level::Debug => name.blue().to_string(),
            Level::Info => name.green().to_string(),
            Level::Warn => name.yellow().to_string(),
            Level::Error => name.red().bold().to_string(),
            Level::Off => name,
        }
    }
}

impl FromStr for Level {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            "WARNING" => Ok(Level::Warn),
            "NONE" => Ok(Level::Off),
            name => Self::NAMES
                .iter()
                .position(|n| *n == name)
                .map(|i| Self::ALL[i])
                .ok_or(()),
        }
    }
}

impl From<::log::Level> for Level {
    fn from(level: ::log::Level) -> Self {
        // `log` orders Error (1) .. Trace (5), the reverse of ours.
        Self::from_u8(5 - level as u8)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output layout of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Date, padded level, `[target]`, message
    Pretty,
    /// Time, level initial, `target:`, message
    Compact,
    /// One JSON object per line
    Json,
}

impl FromStr for Format {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Format::Pretty),
            "compact" => Ok(Format::Compact),
            "json" => Ok(Format::Json),
            _ => Err(()),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

static LOG_LEVEL: AtomicU8 = AtomicU8::new(Level::Warn as u8);

static CONFIG: Lazy<LogConfig> = Lazy::new(|| {
    let config = LogConfig::from_env();
    DEBUG_ENABLED.store(config.debug, Ordering::SeqCst);
    LOG_LEVEL.store(config.level as u8, Ordering::SeqCst);
    config
});

/// Output settings, read once from `TAGSMITH_*` variables.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub debug: bool,
    pub level: Level,
    pub format: Format,
    pub color: bool,
    pub timestamps: bool,
    /// Print the record's target
    pub module_path: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Warn,
            format: Format::Pretty,
            color: false,
            timestamps: true,
            module_path: true,
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let value = env::var(name).ok()?;
    Some(matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    ))
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok()?.parse().ok()
}

impl LogConfig {
    /// The level defaults to `warn`, or `debug` when `TAGSMITH_DEBUG` is set.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let debug = env_flag("TAGSMITH_DEBUG").unwrap_or(defaults.debug);

        Self {
            debug,
            level: env_parse("TAGSMITH_LOG_LEVEL").unwrap_or(if debug {
                Level::Debug
            } else {
                defaults.level
            }),
            format: env_parse("TAGSMITH_LOG_FORMAT").unwrap_or(defaults.format),
            color: env_flag("TAGSMITH_LOG_COLOR").unwrap_or_else(|| {
                env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
            }),
            timestamps: env_flag("TAGSMITH_LOG_TIMESTAMPS").unwrap_or(defaults.timestamps),
            module_path: env_flag("TAGSMITH_LOG_MODULE").unwrap_or(defaults.module_path),
        }
    }
}

// ============================================================================
// Runtime control
// ============================================================================

/// Apply the environment. The first record does this implicitly.
pub fn init() {
    Lazy::force(&CONFIG);
}

pub fn config() -> &'static LogConfig {
    &CONFIG
}

#[inline]
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    level != Level::Off && level >= current_level()
}

pub fn current_level() -> Level {
    Level::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

pub fn set_level(level: Level) {
    init();
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Toggle debug mode; turning it on lowers the level to at least `debug`.
pub fn set_debug(enabled: bool) {
    init();
    DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    if enabled {
        LOG_LEVEL.fetch_min(Level::Debug as u8, Ordering::SeqCst);
    }
}

// ============================================================================
// Records
// ============================================================================

/// One log line before it is written.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    pub level: Level,
    pub target: &'a str,
    pub message: &'a str,
}

impl Record<'_> {
    /// The line as `format` lays it out, without a trailing newline.
    pub fn render(&self, config: &LogConfig) -> String {
        let mut line = String::new();
        let show_target = config.module_path && !self.target.is_empty();

        match config.format {
            Format::Pretty => {
                if config.timestamps {
                    let _ = write!(line, "{} ", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"));
                }
                let _ = write!(line, "{} ", self.level_label(config));
                if show_target {
                    let _ = write!(line, "[{}] ", self.target);
                }
            }
            Format::Compact => {
                if config.timestamps {
                    let _ = write!(line, "{} ", chrono::Local::now().format("%H:%M:%S"));
                }
                let _ = write!(line, "{} ", &self.level.as_str()[..1]);
                if show_target {
                    let _ = write!(line, "{}: ", self.target);
                }
            }
            Format::Json => return self.to_json(),
        }

        line.push_str(self.message);
        line
    }

    #[cfg(feature = "color")]
    fn level_label(&self, config: &LogConfig) -> String {
        if config.color {
            self.level.paint()
        } else {
            format!("{:5}", self.level.as_str())
        }
    }

    #[cfg(not(feature = "color"))]
    fn level_label(&self, _config: &LogConfig) -> String {
        format!("{:5}", self.level.as_str())
    }

    #[cfg(feature = "json")]
    fn to_json(&self) -> String {
        serde_json::json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "level": self.level.as_str(),
            "target": self.target,
            "message": self.message,
        })
        .to_string()
    }

    #[cfg(not(feature = "json"))]
    fn to_json(&self) -> String {
        format!(
            r#"{{"timestamp":"{}","level":"{}","target":"{}","message":"{}"}}"#,
            chrono::Utc::now().to_rfc3339(),
            self.level.as_str(),
            self.target.escape_default(),
            self.message.escape_default()
        )
    }
}

/// Write one record to stderr.
#[doc(hidden)]
pub fn emit(level: Level, target: &str, args: fmt::Arguments<'_>) {
    if !is_level_enabled(level) {
        return;
    }

    let message = args.to_string();
    let line = Record {
        level,
        target,
        message: &message,
    }
    .render(config());

    let _ = writeln!(std::io::stderr().lock(), "{}", line);
}

// ============================================================================
// `log` facade bridge
// ============================================================================

struct Bridge;

impl ::log::Log for Bridge {
    fn enabled(&self, metadata: &::log::Metadata<'_>) -> bool {
        is_level_enabled(metadata.level().into())
    }

    fn log(&self, record: &::log::Record<'_>) {
        emit(record.level().into(), record.target(), *record.args());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static BRIDGE: Bridge = Bridge;

/// Route records from the `log` facade through Tagsmith output.
///
/// Returns `false` when another global logger was installed first.
pub fn install_log_bridge() -> bool {
    init();
    ::log::set_logger(&BRIDGE)
        .map(|()| ::log::set_max_level(::log::LevelFilter::Trace))
        .is_ok()
}

// ============================================================================
// Macros
// ============================================================================

/// Log at an explicit level.
///
/// ```rust
/// use tagsmith_log::{Level, log};
///
/// log!(Level::Info, "plain");
/// log!(Level::Warn, target: "tagsmith::storage", "quota hit after {} writes", 3);
/// ```
#[macro_export]
macro_rules! log {
    ($level:expr, target: $target:expr, $($arg:tt)+) => {{
        $crate::init();
        $crate::emit($level, $target, format_args!($($arg)+));
    }};
    ($level:expr, $($arg:tt)+) => {
        $crate::log!($level, target: module_path!(), $($arg)+)
    };
}

#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => { $crate::log!($crate::Level::Trace, $($arg)+) };
}

/// Enabled by `TAGSMITH_DEBUG=1` or `TAGSMITH_LOG_LEVEL=debug`.
///
/// ```rust
/// use tagsmith_log::debug;
///
/// let variant = "test2_exp1";
/// debug!(target: "tagsmith::gate", "claim recorded for {}", variant);
/// ```
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::log!($crate::Level::Debug, $($arg)+) };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::log!($crate::Level::Info, $($arg)+) };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { $crate::log!($crate::Level::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::log!($crate::Level::Error, $($arg)+) };
}
