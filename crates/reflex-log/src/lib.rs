//! Logging for the `Reflex` runtime.
//!
//! A small, thread-safe logger with module path capture, optional colored
//! output, and a level that can be taken from the environment. Runtime
//! diagnostics (type registration, initialization) go through the macros
//! exported here and are written to standard error.
//!
//! # Example
//!
//! ```
//! use reflex_log::{debug, info, warn, Level};
//!
//! reflex_log::set_level(Level::Debug);
//!
//! let name = "System.TimeoutException";
//! info!("registered {}", name);
//! debug!("base chain depth: {}", 2);
//! warn!("conflicting definition for {}", name);
//! ```

use std::fmt::{self, Arguments};
use std::io::Write;
use std::str::FromStr;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Environment variable holding the default log level.
pub const LEVEL_ENV: &str = "REFLEX_LOG";

/// Environment variable that disables ANSI colors when set to any value.
pub const NO_COLOR_ENV: &str = "NO_COLOR";

/// Log levels, ordered from most severe (Error) to least severe (Trace).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Failures the runtime cannot recover from
    Error = 0,
    /// Rejected definitions and other suspicious input
    Warn = 1,
    /// Lifecycle events such as initialization
    Info = 2,
    /// Registry insertions and lookups
    Debug = 3,
    /// Everything else
    Trace = 4,
}

impl Level {
    /// All levels, most severe first.
    pub const ALL: [Level; 5] = [
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
        Level::Trace,
    ];

    const fn color_code(self) -> &'static str {
        match self {
            Level::Error => "\x1b[31m",
            Level::Warn => "\x1b[33m",
            Level::Info => "\x1b[32m",
            Level::Debug => "\x1b[36m",
            Level::Trace => "\x1b[35m",
        }
    }

    /// Returns the upper-case name of this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }

    const fn from_u8(raw: u8) -> Level {
        match raw {
            0 => Level::Error,
            1 => Level::Warn,
            3 => Level::Debug,
            4 => Level::Trace,
            _ => Level::Info,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a [`Level`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError {
    input: String,
}

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid log level: {:?}", self.input)
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Parses a level name, ignoring case and surrounding whitespace.
    ///
    /// ```
    /// use reflex_log::Level;
    ///
    /// assert_eq!("debug".parse::<Level>(), Ok(Level::Debug));
    /// assert_eq!(" WARN ".parse::<Level>(), Ok(Level::Warn));
    /// assert!("verbose".parse::<Level>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseLevelError {
                input: s.to_string(),
            })
    }
}

/// The global logger.
///
/// Level and color settings are atomics so the logger can be reconfigured
/// while other threads are logging.
pub struct Logger {
    level: AtomicU8,
    color: AtomicBool,
}

impl Logger {
    const fn new(level: Level, color: bool) -> Self {
        Logger {
            level: AtomicU8::new(level as u8),
            color: AtomicBool::new(color),
        }
    }

    /// Sets the minimum level that gets written.
    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::SeqCst);
    }

    /// Returns the current minimum level.
    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// Enables or disables ANSI colors.
    pub fn set_color(&self, enabled: bool) {
        self.color.store(enabled, Ordering::Relaxed);
    }

    /// Returns `true` if a message at `level` would be written.
    pub fn enabled(&self, level: Level) -> bool {
        level as u8 <= self.level.load(Ordering::Relaxed)
    }

    fn format(&self, level: Level, target: &str, args: Arguments) -> String {
        if self.color.load(Ordering::Relaxed) {
            format!("{}[{level}]\x1b[0m {target}: {args}", level.color_code())
        } else {
            format!("[{level}] {target}: {args}")
        }
    }
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Returns the global logger.
///
/// On first use the level is read from [`LEVEL_ENV`] (falling back to
/// `Warn` when unset or invalid) and colors are disabled if [`NO_COLOR_ENV`]
/// is set.
pub fn get_logger() -> &'static Logger {
    LOGGER.get_or_init(|| {
        let level = std::env::var(LEVEL_ENV)
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(Level::Warn);
        let color = std::env::var_os(NO_COLOR_ENV).is_none();
        Logger::new(level, color)
    })
}

/// Sets the minimum level of the global logger.
pub fn set_level(level: Level) {
    get_logger().set_level(level);
}

/// Sets the minimum level of the global logger from a level name.
///
/// # Errors
///
/// Returns [`ParseLevelError`] if `s` is not a level name; the current level
/// is left unchanged.
pub fn set_level_from_str(s: &str) -> Result<(), ParseLevelError> {
    set_level(s.parse()?);
    Ok(())
}

#[doc(hidden)]
pub fn __log_with_target(level: Level, target: &str, args: Arguments) {
    let logger = get_logger();
    if !logger.enabled(level) {
        return;
    }

    let line = logger.format(level, target, args);
    // A closed stderr is not worth failing over.
    let _ = writeln!(std::io::stderr().lock(), "{line}");
}

/// Logs a message at the given level, tagged with the caller's module path.
///
/// ```
/// use reflex_log::{log, Level};
///
/// log!(level: Level::Info, "registered {} types", 3);
/// ```
#[macro_export]
macro_rules! log {
    (level: $level:expr, $($arg:tt)*) => {
        {
            let level = $level;
            if $crate::get_logger().enabled(level) {
                $crate::__log_with_target(level, module_path!(), format_args!($($arg)*));
            }
        }
    };
}

/// Logs a message at the Error level.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Error, $($arg)*)
    };
}

/// Logs a message at the Warn level.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Warn, $($arg)*)
    };
}

/// Logs a message at the Info level.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Info, $($arg)*)
    };
}

/// Logs a message at the Debug level.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Debug, $($arg)*)
    };
}

/// Logs a message at the Trace level.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Trace, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    /// Held by every test that changes the global logger level.
    static GLOBAL_LEVEL: Mutex<()> = Mutex::new(());

    fn lock_global_level() -> MutexGuard<'static, ()> {
        GLOBAL_LEVEL.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[test]
    fn test_level_ordering() {
        assert!(Level::Error < Level::Warn);
        assert!(Level::Warn < Level::Info);
        assert!(Level::Info < Level::Debug);
        assert!(Level::Debug < Level::Trace);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("error".parse::<Level>(), Ok(Level::Error));
        assert_eq!("Info".parse::<Level>(), Ok(Level::Info));
        assert_eq!("TRACE\n".parse::<Level>(), Ok(Level::Trace));
        assert_eq!(
            "loud".parse::<Level>().unwrap_err().to_string(),
            "invalid log level: \"loud\""
        );
    }

    #[test]
    fn test_level_roundtrips_through_u8() {
        for level in Level::ALL {
            assert_eq!(Level::from_u8(level as u8), level);
        }
    }

    #[test]
    fn test_logger_level_filtering() {
        let logger = Logger::new(Level::Info, false);

        assert!(logger.enabled(Level::Error));
        assert!(logger.enabled(Level::Info));
        assert!(!logger.enabled(Level::Debug));

        logger.set_level(Level::Trace);
        assert!(logger.enabled(Level::Trace));
        assert_eq!(logger.level(), Level::Trace);
    }

    #[test]
    fn test_format_plain_and_colored() {
        let logger = Logger::new(Level::Info, false);
        assert_eq!(
            logger.format(Level::Warn, "reflex::registry", format_args!("dup {}", 1)),
            "[WARN] reflex::registry: dup 1"
        );

        logger.set_color(true);
        assert_eq!(
            logger.format(Level::Error, "reflex", format_args!("boom")),
            "\x1b[31m[ERROR]\x1b[0m reflex: boom"
        );
    }

    #[test]
    fn test_set_level_from_str_keeps_level_on_error() {
        let _guard = lock_global_level();
        set_level_from_str("debug").unwrap();
        assert!(set_level_from_str("nope").is_err());
        assert_eq!(get_logger().level(), Level::Debug);
    }

    #[test]
    fn test_macros_from_threads() {
        let _guard = lock_global_level();
        set_level(Level::Info);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                std::thread::spawn(move || {
                    info!("thread {} registered", i);
                    trace!("thread {} filtered", i);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
