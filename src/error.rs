//! Centralized error handling for YAME
//!
//! This module provides a unified error type that covers all error scenarios
//! in the application: file I/O, configuration, the external Markdown
//! converter, and dictionary loading.

use log::warn;
use std::fmt;
use std::io;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the application.
pub type Result<T> = std::result::Result<T, Error>;

/// The centralized error type for the application.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // File I/O Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic I/O error wrapper
    Io(io::Error),

    /// Failed to read (or decode as UTF-8) a document
    FileRead { path: PathBuf, source: io::Error },

    /// Failed to write file contents
    FileWrite { path: PathBuf, source: io::Error },

    /// Save was requested for a document that has never been saved
    NoDocumentPath,

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to load configuration file
    ConfigLoad {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to save configuration file
    ConfigSave {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse configuration (invalid JSON/format)
    ConfigParse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration directory not found or inaccessible
    ConfigDirNotFound,

    /// No Markdown converter executable is configured
    ConverterNotConfigured,

    // ─────────────────────────────────────────────────────────────────────────
    // Conversion Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The converter process could not be started or fed
    ConversionLaunch { program: String, source: io::Error },

    /// The converter process exited unsuccessfully
    ConversionFailed {
        program: String,
        status: Option<i32>,
        stderr: String,
    },

    /// The converter produced output that is not valid UTF-8
    ConversionOutput { program: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Dictionary Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The language tag is not a valid tag (e.g. `en_US`)
    UnknownLanguage(String),

    /// No dictionary files exist for a well-formed language tag
    DictionaryNotFound { tag: String, searched: Vec<PathBuf> },

    /// Dictionary files exist but could not be read or understood
    DictionaryParse { path: PathBuf, message: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Application Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The system clipboard could not be opened or written
    Clipboard(String),

    /// Generic application error with a message
    Application(String),
}

impl Error {
    /// Whether this error means the requested language could not be found.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            Error::UnknownLanguage(_) | Error::DictionaryNotFound { .. }
        )
    }
}

// Implement From traits for convenient error conversion
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigParse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display trait implementation for user-friendly error messages
// ─────────────────────────────────────────────────────────────────────────────
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // File I/O Errors
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::FileRead { path, source } => {
                write!(f, "Failed to read '{}': {}", path.display(), source)
            }
            Error::FileWrite { path, source } => {
                write!(f, "Failed to write '{}': {}", path.display(), source)
            }
            Error::NoDocumentPath => {
                write!(f, "The document has no file path yet. Use 'Save As' instead.")
            }

            // Configuration Errors
            Error::ConfigLoad { path, source } => {
                write!(
                    f,
                    "Failed to load configuration from '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigSave { path, source } => {
                write!(
                    f,
                    "Failed to save configuration to '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigParse { message, .. } => {
                write!(f, "Invalid configuration format: {}", message)
            }
            Error::ConfigDirNotFound => {
                write!(f, "Configuration directory not found")
            }
            Error::ConverterNotConfigured => {
                write!(
                    f,
                    "No Markdown converter configured (set \"converter.program\" in the config file)"
                )
            }

            // Conversion Errors
            Error::ConversionLaunch { program, source } => {
                write!(f, "Failed to run converter '{}': {}", program, source)
            }
            Error::ConversionFailed {
                program,
                status,
                stderr,
            } => {
                match status {
                    Some(code) => write!(f, "Converter '{}' exited with status {}", program, code)?,
                    None => write!(f, "Converter '{}' was terminated by a signal", program)?,
                }
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr)?;
                }
                Ok(())
            }
            Error::ConversionOutput { program } => {
                write!(f, "Converter '{}' produced output that is not UTF-8", program)
            }

            // Dictionary Errors
            Error::UnknownLanguage(tag) => write!(f, "Unknown language tag '{}'", tag),
            Error::DictionaryNotFound { tag, searched } => {
                write!(f, "No dictionary found for '{}'", tag)?;
                if !searched.is_empty() {
                    let dirs: Vec<String> =
                        searched.iter().map(|p| p.display().to_string()).collect();
                    write!(f, " (searched {})", dirs.join(", "))?;
                }
                Ok(())
            }
            Error::DictionaryParse { path, message } => {
                write!(f, "Invalid dictionary '{}': {}", path.display(), message)
            }

            // Application Errors
            Error::Clipboard(msg) => write!(f, "Clipboard error: {}", msg),
            Error::Application(msg) => write!(f, "{}", msg),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// std::error::Error trait implementation for error chaining
// ─────────────────────────────────────────────────────────────────────────────
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::FileRead { source, .. } => Some(source),
            Error::FileWrite { source, .. } => Some(source),
            Error::ConversionLaunch { source, .. } => Some(source),
            Error::ConfigLoad { source, .. } => Some(source.as_ref()),
            Error::ConfigSave { source, .. } => Some(source.as_ref()),
            Error::ConfigParse { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            Error::NoDocumentPath
            | Error::ConfigDirNotFound
            | Error::ConverterNotConfigured
            | Error::ConversionFailed { .. }
            | Error::ConversionOutput { .. }
            | Error::UnknownLanguage(_)
            | Error::DictionaryNotFound { .. }
            | Error::DictionaryParse { .. }
            | Error::Clipboard(_)
            | Error::Application(_) => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for Result to support graceful degradation.
pub trait ResultExt<T> {
    /// If the result is an error, log it at warning level and return the provided default.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
