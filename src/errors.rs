use std::error::Error;
use std::fmt;

/// The handful of failures that actually prevent a run from starting or
/// completing. Everything recoverable (bad input lines, stale tags) goes
/// through `Diagnostic` instead.
#[derive(Debug)]
pub enum CoreError {
    /// The requested starting PC has no instruction at that index.
    StartPcOutOfRange { pc: u16, program_len: usize },
    IoError(std::io::Error),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::StartPcOutOfRange { pc, program_len } => {
                write!(f, "starting PC {pc} is out of range for a {program_len}-instruction program")
            },
            CoreError::IoError(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl Error for CoreError {}

impl From<std::io::Error> for CoreError {
    fn from(error: std::io::Error) -> Self {
        CoreError::IoError(error)
    }
}

/// Recorded-not-fatal conditions: malformed input lines, out-of-range
/// offsets, unresolved labels, and invariant violations absorbed inside
/// the core. Reported through a `Diagnostics` sink rather than returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    ParseError(String),
    OffsetOutOfRange { offset: i32 },
    LabelNotFound(String),
    InvariantViolation(String),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ParseError(line) => write!(f, "parse error: {line}"),
            Diagnostic::OffsetOutOfRange { offset } => {
                write!(f, "offset {offset} out of range [-16, 15]")
            },
            Diagnostic::LabelNotFound(label) => write!(f, "label not found: {label}"),
            Diagnostic::InvariantViolation(detail) => write!(f, "invariant violation: {detail}"),
        }
    }
}

/// Sink for `Diagnostic`s raised while parsing or simulating. The
/// scheduler and frontend take `&mut dyn Diagnostics` rather than
/// printing, so callers choose how (or whether) to surface them.
pub trait Diagnostics {
    fn record(&mut self, diagnostic: Diagnostic);
}

/// Collects every diagnostic into a `Vec`, used by the frontend parsers
/// and by tests.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticLog(pub Vec<Diagnostic>);

impl Diagnostics for DiagnosticLog {
    fn record(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_log_collects_in_order() {
        let mut log = DiagnosticLog::default();
        log.record(Diagnostic::LabelNotFound("loop".to_string()));
        log.record(Diagnostic::OffsetOutOfRange { offset: 99 });
        assert_eq!(log.0.len(), 2);
    }
}
