//! Structured logging for the hypeq CLI.
//!
//! Diagnostics go to stderr so summaries and profiles on stdout stay
//! parseable. Three variables shape the stream:
//!
//! - `HYPEQ_LOG_FORMAT`: `human` (default) or `json`;
//! - `HYPEQ_LOG_SPANS`: `none`, `close` (default) or `full`. Closing spans
//!   report how long component search, landmark selection and population
//!   took;
//! - `RUST_LOG`: the filter, defaulting to [`DEFAULT_FILTER`].
//!
//! `log` records are bridged into `tracing`.

use std::{env, sync::OnceLock};

use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, Layer, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
};

const LOG_FORMAT_ENV: &str = "HYPEQ_LOG_FORMAT";
const LOG_SPANS_ENV: &str = "HYPEQ_LOG_SPANS";

/// Filter applied when `RUST_LOG` is unset or invalid: pipeline milestones
/// from hypeq crates, warnings from everything else.
pub const DEFAULT_FILTER: &str = "warn,hypeq_core=info,hypeq_cli=info";

static INITIALISED: OnceLock<LogSettings> = OnceLock::new();

/// Output format of the stderr log stream.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogFormat {
    /// Multi-line human-readable records.
    #[default]
    Human,
    /// One JSON object per record with the active span list.
    Json,
}

/// Which span lifecycle events are written.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SpanEvents {
    /// Events only.
    None,
    /// One record per closed span, with its busy and idle time.
    #[default]
    Close,
    /// Every enter, exit, open and close.
    Full,
}

impl SpanEvents {
    const fn fmt_span(self) -> FmtSpan {
        match self {
            Self::None => FmtSpan::NONE,
            Self::Close => FmtSpan::CLOSE,
            Self::Full => FmtSpan::FULL,
        }
    }
}

/// Resolved logging configuration.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LogSettings {
    /// Record format.
    pub format: LogFormat,
    /// Span lifecycle events.
    pub spans: SpanEvents,
}

impl LogSettings {
    /// Reads the settings from the hypeq logging variables.
    ///
    /// # Errors
    /// Returns [`LoggingError`] when a variable is not valid Unicode or names
    /// an unsupported value.
    pub fn from_env() -> Result<Self, LoggingError> {
        Self::parse(
            read_var(LOG_FORMAT_ENV)?.as_deref(),
            read_var(LOG_SPANS_ENV)?.as_deref(),
        )
    }

    /// Resolves raw variable values; `None` keeps the default.
    ///
    /// # Errors
    /// Returns [`LoggingError::UnsupportedFormat`] or
    /// [`LoggingError::UnsupportedSpans`] for unknown values.
    ///
    /// # Examples
    /// ```
    /// use hypeq_cli::logging::{LogFormat, LogSettings, SpanEvents};
    ///
    /// let settings = LogSettings::parse(Some("JSON"), None)?;
    /// assert_eq!(settings.format, LogFormat::Json);
    /// assert_eq!(settings.spans, SpanEvents::Close);
    /// # Ok::<(), hypeq_cli::logging::LoggingError>(())
    /// ```
    pub fn parse(format: Option<&str>, spans: Option<&str>) -> Result<Self, LoggingError> {
        Ok(Self {
            format: format.map_or(Ok(LogFormat::default()), parse_log_format)?,
            spans: spans.map_or(Ok(SpanEvents::default()), parse_span_events)?,
        })
    }
}

/// Errors raised while initialising structured logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Environment variable contained invalid UTF-8 data.
    #[error("environment variable `{name}` contained invalid UTF-8: {source}")]
    InvalidUnicode {
        /// Name of the offending environment variable.
        name: &'static str,
        /// Underlying parse failure.
        #[source]
        source: env::VarError,
    },
    /// Unsupported log format requested via `HYPEQ_LOG_FORMAT`.
    #[error("unsupported log format `{provided}`; expected `human` or `json`")]
    UnsupportedFormat {
        /// Raw value supplied by the user.
        provided: String,
    },
    /// Unsupported span setting requested via `HYPEQ_LOG_SPANS`.
    #[error("unsupported span events `{provided}`; expected `none`, `close` or `full`")]
    UnsupportedSpans {
        /// Raw value supplied by the user.
        provided: String,
    },
    /// Failed to install the global tracing subscriber.
    #[error("failed to install tracing subscriber: {source}")]
    InstallFailed {
        /// Error raised by `tracing_subscriber`.
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
}

/// Installs the global subscriber once and returns the settings in force.
///
/// A subscriber installed by someone else is left in place; the resolved
/// settings are still returned.
///
/// # Errors
/// Returns [`LoggingError`] when the environment is malformed.
pub fn init_logging() -> Result<LogSettings, LoggingError> {
    if let Some(settings) = INITIALISED.get() {
        return Ok(*settings);
    }
    let settings = LogSettings::from_env()?;
    match install_subscriber(settings) {
        Ok(()) => {}
        Err(LoggingError::InstallFailed { source }) => {
            eprintln!("structured logging already configured elsewhere: {source}");
        }
        Err(err) => return Err(err),
    }
    Ok(*INITIALISED.get_or_init(|| settings))
}

fn read_var(name: &'static str) -> Result<Option<String>, LoggingError> {
    match env::var(name) {
        Ok(raw) => Ok(Some(raw)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(source @ env::VarError::NotUnicode(_)) => {
            Err(LoggingError::InvalidUnicode { name, source })
        }
    }
}

fn install_subscriber(settings: LogSettings) -> Result<(), LoggingError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_span_events(settings.spans.fmt_span())
        .with_writer(std::io::stderr);

    let fmt_layer = match settings.format {
        LogFormat::Json => fmt_layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
        LogFormat::Human => fmt_layer.boxed(),
    };

    // Best effort: another logger may already own the `log` slot.
    let _ = LogTracer::init();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|source| LoggingError::InstallFailed { source })
}

fn parse_log_format(raw: &str) -> Result<LogFormat, LoggingError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "human" => Ok(LogFormat::Human),
        "json" => Ok(LogFormat::Json),
        other => Err(LoggingError::UnsupportedFormat {
            provided: other.to_owned(),
        }),
    }
}

fn parse_span_events(raw: &str) -> Result<SpanEvents, LoggingError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "none" | "off" => Ok(SpanEvents::None),
        "" | "close" => Ok(SpanEvents::Close),
        "full" | "all" => Ok(SpanEvents::Full),
        other => Err(LoggingError::UnsupportedSpans {
            provided: other.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::defaults(None, None, LogFormat::Human, SpanEvents::Close)]
    #[case::json(Some(" json "), None, LogFormat::Json, SpanEvents::Close)]
    #[case::blank(Some("  "), Some(""), LogFormat::Human, SpanEvents::Close)]
    #[case::quiet(Some("HUMAN"), Some("off"), LogFormat::Human, SpanEvents::None)]
    #[case::verbose(None, Some("Full"), LogFormat::Human, SpanEvents::Full)]
    fn settings_resolve_supported_values(
        #[case] format: Option<&str>,
        #[case] spans: Option<&str>,
        #[case] expected_format: LogFormat,
        #[case] expected_spans: SpanEvents,
    ) {
        let settings = LogSettings::parse(format, spans).expect("settings must parse");
        assert_eq!(settings.format, expected_format);
        assert_eq!(settings.spans, expected_spans);
    }

    #[test]
    fn unknown_format_is_rejected() {
        let err = LogSettings::parse(Some("xml"), None).expect_err("xml is not supported");
        match err {
            LoggingError::UnsupportedFormat { provided } => assert_eq!(provided, "xml"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_span_setting_is_rejected() {
        let err = LogSettings::parse(None, Some("enter")).expect_err("enter is not supported");
        assert!(matches!(err, LoggingError::UnsupportedSpans { provided } if provided == "enter"));
    }

    #[test]
    fn default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn init_logging_is_idempotent() {
        let first = init_logging().expect("logging must initialise");
        let second = init_logging().expect("subsequent calls must be no-ops");
        assert_eq!(first, second);
    }
}
