//! Host Console
//!
//! The host's logging channel. Synchronous command rejections are reported
//! here (never as events), so hosts that route script errors to their own
//! console must provide a sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::Result;

/// Severity, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARNING",
            LogLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// One diagnostic line bound for the host console.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    /// Emitting module, e.g. `core_survey::bridge`.
    pub target: String,
    pub message: String,
    /// Signature of the command that produced the entry, e.g.
    /// `pollfish.load( [options] )`.
    pub command: Option<String>,
    /// Remaining structured fields, already redacted.
    pub fields: HashMap<String, String>,
    /// Name of the innermost span, if any.
    pub span: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            target: target.into(),
            message: message.into(),
            command: None,
            fields: HashMap::new(),
            span: None,
        }
    }

    pub fn with_command(mut self, signature: impl Into<String>) -> Self {
        self.command = Some(signature.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn in_span(mut self, span: impl Into<String>) -> Self {
        self.span = Some(span.into());
        self
    }

    /// Formats the entry the way plugin consoles conventionally print
    /// diagnostics: `ERROR: <signature>, <message>`.
    pub fn console_line(&self) -> String {
        let prefix = match self.level {
            LogLevel::Error | LogLevel::Warn => format!("{}: ", self.level),
            _ => String::new(),
        };
        match self.command.as_deref() {
            Some(signature) if !signature.is_empty() => {
                format!("{}{}, {}", prefix, signature, self.message)
            }
            _ => format!("{}{}", prefix, self.message),
        }
    }
}

/// Receives bridge diagnostics on behalf of the host.
///
/// Platform adapters route entries to Logcat, OSLog or stdout. API keys are
/// redacted before an entry reaches a sink; implementations must not re-add
/// them from other sources.
///
/// ```ignore
/// use bridge_traits::console::{LoggerSink, LogEntry, LogLevel};
///
/// async fn report(console: &dyn LoggerSink) {
///     let entry = LogEntry::new(LogLevel::Error, "core_survey", "init() can only be called once")
///         .with_command("pollfish.init(listener, options)");
///     console.log(entry).await.ok();
/// }
/// ```
#[async_trait::async_trait]
pub trait LoggerSink: Send + Sync {
    async fn log(&self, entry: LogEntry) -> Result<()>;

    /// Entries below this level are never forwarded.
    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

/// Prints entries to stdout with a Logcat-style tag.
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    pub min_level: LogLevel,
    pub tag: String,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            tag: "Corona".to_string(),
        }
    }
}

#[async_trait::async_trait]
impl LoggerSink for ConsoleLogger {
    async fn log(&self, entry: LogEntry) -> Result<()> {
        if entry.level >= self.min_level {
            println!(
                "{} {}: {}",
                entry.timestamp.format("%H:%M:%S%.3f"),
                self.tag,
                entry.console_line()
            );
        }
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_builder() {
        let entry = LogEntry::new(LogLevel::Info, "core_survey", "Load accepted")
            .with_command("pollfish.load( [options] )")
            .with_field("placement", "top-left")
            .in_span("load");

        assert_eq!(entry.command.as_deref(), Some("pollfish.load( [options] )"));
        assert_eq!(entry.fields.get("placement").map(String::as_str), Some("top-left"));
        assert_eq!(entry.span.as_deref(), Some("load"));
    }

    #[test]
    fn test_console_line_prefixes() {
        let error = LogEntry::new(LogLevel::Error, "core_survey", "Invalid option 'foo'")
            .with_command("pollfish.load( [options] )");
        assert_eq!(
            error.console_line(),
            "ERROR: pollfish.load( [options] ), Invalid option 'foo'"
        );

        let warn = LogEntry::new(LogLevel::Warn, "core_survey", "Survey not ready");
        assert_eq!(warn.console_line(), "WARNING: Survey not ready");

        let info = LogEntry::new(LogLevel::Info, "core_survey", "Survey plugin registered");
        assert_eq!(info.console_line(), "Survey plugin registered");
    }

    #[tokio::test]
    async fn test_console_logger_accepts_entries() {
        let console = ConsoleLogger {
            min_level: LogLevel::Warn,
            ..ConsoleLogger::default()
        };

        console
            .log(LogEntry::new(LogLevel::Debug, "core_survey", "below threshold"))
            .await
            .unwrap();
        assert_eq!(LoggerSink::min_level(&console), LogLevel::Warn);
    }
}
