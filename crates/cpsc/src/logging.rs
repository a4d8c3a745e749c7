//! Tracing configuration for the checker binary

use clap::ValueEnum;
use std::env;
use std::fmt;

/// Output format for log events
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Auto,
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(spec: &str) -> Option<Self> {
        match spec.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "text" | "plain" | "compact" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Auto => "auto",
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        })
    }
}

/// Log verbosity, least to most verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn parse(spec: &str) -> Option<Self> {
        match spec.trim().to_ascii_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        })
    }
}

/// Effective logging configuration
///
/// Precedence, lowest first: [`LogOptions::DEFAULT`], then `CPSC_LOG_FORMAT` /
/// `CPSC_LOG_LEVEL`, then command-line flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    pub format: LogFormat,
    pub level: LogLevel,
}

impl LogOptions {
    /// Quiet by default so only diagnostics reach stderr
    pub const DEFAULT: Self = Self {
        format: LogFormat::Auto,
        level: LogLevel::Warn,
    };

    #[must_use]
    pub fn from_env() -> Self {
        let format = env::var("CPSC_LOG_FORMAT").ok();
        let level = env::var("CPSC_LOG_LEVEL").ok();
        Self::DEFAULT.with_env(format.as_deref(), level.as_deref())
    }

    /// Apply environment values; unparseable ones are ignored
    #[must_use]
    pub fn with_env(mut self, format: Option<&str>, level: Option<&str>) -> Self {
        if let Some(format) = format.and_then(LogFormat::parse) {
            self.format = format;
        }
        if let Some(level) = level.and_then(LogLevel::parse) {
            self.level = level;
        }
        self
    }

    /// Apply command-line flags; `verbose` raises the level to at least debug
    #[must_use]
    pub fn with_cli(mut self, format: Option<LogFormat>, level: Option<LogLevel>, verbose: bool) -> Self {
        if let Some(format) = format {
            self.format = format;
        }
        if let Some(level) = level {
            self.level = level;
        }
        if verbose {
            self.level = self.level.max(LogLevel::Debug);
        }
        self
    }

    /// Replace `Auto` with the concrete format to install
    #[must_use]
    pub fn resolved(self) -> Self {
        let format = match self.format {
            LogFormat::Auto => LogFormat::Text,
            other => other,
        };
        Self { format, ..self }
    }
}

impl Default for LogOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Install the global subscriber once; later calls are no-ops
///
/// `RUST_LOG` takes precedence over `options.level` when it is set.
pub fn init_logging(options: LogOptions) {
    use std::io::IsTerminal;
    use std::sync::OnceLock;
    use tracing_subscriber::EnvFilter;

    static INSTALLED: OnceLock<()> = OnceLock::new();

    INSTALLED.get_or_init(|| {
        let options = options.resolved();
        let use_ansi = env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(options.level.to_string()));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(use_ansi)
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(false);

        let installed = match options.format {
            LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
            LogFormat::Auto | LogFormat::Text => tracing::subscriber::set_global_default(builder.compact().finish()),
        };
        if installed.is_err() {
            eprintln!("warning: a tracing subscriber was already installed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_aliases() {
        assert_eq!(LogFormat::parse("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse("plain"), Some(LogFormat::Text));
        assert_eq!(LogFormat::parse("xml"), None);

        assert_eq!(LogLevel::parse(" Warning "), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("trace"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::parse("loud"), None);
    }

    #[test]
    fn test_env_overrides_default() {
        let options = LogOptions::DEFAULT.with_env(Some("json"), Some("info"));
        assert_eq!(options, LogOptions { format: LogFormat::Json, level: LogLevel::Info });

        let ignored = LogOptions::DEFAULT.with_env(Some("nope"), None);
        assert_eq!(ignored, LogOptions::DEFAULT);
    }

    #[test]
    fn test_cli_overrides_env() {
        let env = LogOptions::DEFAULT.with_env(Some("json"), Some("error"));
        let options = env.with_cli(Some(LogFormat::Text), None, false);
        assert_eq!(options.format, LogFormat::Text);
        assert_eq!(options.level, LogLevel::Error);
    }

    #[test]
    fn test_verbose_raises_but_never_lowers() {
        assert_eq!(LogOptions::DEFAULT.with_cli(None, None, true).level, LogLevel::Debug);
        let trace = LogOptions::DEFAULT.with_cli(None, Some(LogLevel::Trace), true);
        assert_eq!(trace.level, LogLevel::Trace);
    }

    #[test]
    fn test_resolved_picks_text_for_auto() {
        assert_eq!(LogOptions::DEFAULT.resolved().format, LogFormat::Text);
        let json = LogOptions { format: LogFormat::Json, level: LogLevel::Info };
        assert_eq!(json.resolved().format, LogFormat::Json);
    }

    #[test]
    fn test_init_logging_twice_is_noop() {
        init_logging(LogOptions::DEFAULT);
        init_logging(LogOptions { format: LogFormat::Json, level: LogLevel::Trace });
        tracing::debug!(target: "sema", "after init");
    }
}
