//! External Markdown converter
//!
//! Runs the configured program with the document on stdin and reads the
//! HTML from stdout. One process is started per conversion.

use crate::config::ConverterSettings;
use crate::error::{Error, Result};
use log::{debug, warn};
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

/// Longest stderr excerpt kept in a conversion error.
const MAX_STDERR_CHARS: usize = 500;

/// A configured converter command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converter {
    program: String,
    args: Vec<String>,
}

impl Converter {
    /// Create a converter. An empty program name is a configuration error.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Result<Self> {
        let program = program.into().trim().to_string();
        if program.is_empty() {
            return Err(Error::ConverterNotConfigured);
        }
        Ok(Self { program, args })
    }

    pub fn from_settings(settings: &ConverterSettings) -> Result<Self> {
        Self::new(settings.program.clone(), settings.args.clone())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Convert Markdown text to HTML.
    pub fn convert(&self, markdown: &str) -> Result<String> {
        let output = self.convert_bytes(markdown.as_bytes())?;
        String::from_utf8(output).map_err(|_| Error::ConversionOutput {
            program: self.program.clone(),
        })
    }

    /// Pipe raw bytes through the converter and return its stdout.
    pub fn convert_bytes(&self, input: &[u8]) -> Result<Vec<u8>> {
        let launch_error = |source: io::Error| Error::ConversionLaunch {
            program: self.program.clone(),
            source,
        };

        debug!("Running converter {} {:?}", self.program, self.args);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(launch_error)?;

        // Feed stdin from a separate thread so a converter that writes
        // before it finishes reading cannot fill its stdout pipe and block.
        let stdin = child.stdin.take();
        let input = input.to_vec();
        let writer = thread::spawn(move || -> io::Result<()> {
            match stdin {
                Some(mut stdin) => stdin.write_all(&input),
                None => Ok(()),
            }
        });

        let output = child.wait_with_output().map_err(launch_error)?;

        match writer.join() {
            Ok(Ok(())) => {}
            // The converter may exit without reading all of its input.
            Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!("Converter {} closed stdin early", self.program);
            }
            Ok(Err(e)) => return Err(launch_error(e)),
            Err(_) => {
                return Err(Error::Application(
                    "converter input thread panicked".to_string(),
                ))
            }
        }

        if !output.status.success() {
            let stderr = excerpt(&String::from_utf8_lossy(&output.stderr));
            warn!(
                "Converter {} failed with {}: {}",
                self.program, output.status, stderr
            );
            return Err(Error::ConversionFailed {
                program: self.program.clone(),
                status: output.status.code(),
                stderr,
            });
        }

        Ok(output.stdout)
    }
}

/// Trim and shorten converter stderr for display.
fn excerpt(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.chars().count() <= MAX_STDERR_CHARS {
        return stderr.to_string();
    }
    let mut short: String = stderr.chars().take(MAX_STDERR_CHARS).collect();
    short.push('…');
    short
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
