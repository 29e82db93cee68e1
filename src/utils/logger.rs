// Copyright (c) 2024 Mudit Bhargava
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.
//

// logger.rs
//
// A small level-filtered logger used by the CLI binary, independent of any
// process-global logging facade so the core never depends on mutable
// global logger state (SPEC_FULL §1 expansion: logging). The core itself
// never logs directly; it reports through the `Diagnostics` sink
// (errors.rs), which `LoggerDiagnostics` below adapts onto this logger.

use std::fs::File;
use std::io::{self, Write};

use crate::errors::{Diagnostic, Diagnostics};

pub struct Logger {
    pub file: Option<File>,
    pub level: LogLevel,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl Logger {
    pub fn new(file_path: Option<&str>, level: LogLevel) -> io::Result<Self> {
        let file = file_path.map(File::create).transpose()?;
        Ok(Self { file, level })
    }

    pub fn log(&mut self, level: LogLevel, message: &str) -> io::Result<()> {
        if level < self.level {
            return Ok(());
        }
        let log_message = format!("[{level:?}] {message}\n");
        match &mut self.file {
            Some(file) => file.write_all(log_message.as_bytes()),
            None => io::stdout().write_all(log_message.as_bytes()),
        }
    }

    pub fn debug(&mut self, message: &str) -> io::Result<()> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&mut self, message: &str) -> io::Result<()> {
        self.log(LogLevel::Info, message)
    }

    pub fn warning(&mut self, message: &str) -> io::Result<()> {
        self.log(LogLevel::Warning, message)
    }

    pub fn error(&mut self, message: &str) -> io::Result<()> {
        self.log(LogLevel::Error, message)
    }
}

/// Adapts a `Logger` into a `Diagnostics` sink: every recorded diagnostic
/// is logged at `Warning`, except invariant violations (absorbed by
/// design, §7) which log at `Debug` so a normal run stays quiet about
/// them.
pub struct LoggerDiagnostics<'a> {
    logger: &'a mut Logger,
}

impl<'a> LoggerDiagnostics<'a> {
    pub fn new(logger: &'a mut Logger) -> Self {
        Self { logger }
    }
}

impl Diagnostics for LoggerDiagnostics<'_> {
    fn record(&mut self, diagnostic: Diagnostic) {
        let level = match diagnostic {
            Diagnostic::InvariantViolation(_) => LogLevel::Debug,
            _ => LogLevel::Warning,
        };
        let _ = self.logger.log(level, &diagnostic.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_below_the_configured_level_are_suppressed() {
        let mut logger = Logger::new(None, LogLevel::Warning).unwrap();
        assert!(logger.debug("ignored").is_ok());
        assert!(logger.error("shown").is_ok());
    }

    #[test]
    fn logger_diagnostics_adapts_the_sink() {
        let mut logger = Logger::new(None, LogLevel::Debug).unwrap();
        let mut sink = LoggerDiagnostics::new(&mut logger);
        sink.record(Diagnostic::LabelNotFound("loop".to_string()));
    }
}
