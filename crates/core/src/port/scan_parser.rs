// Scan Parser Port
// Turns a scanner's stdout into signals; the text format never leaks past here

use thiserror::Error;

use crate::domain::{DomainError, Signal};

/// Scanner output parse errors (line numbers are 1-based)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: malformed entry: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("line {line}: invalid {field} '{value}'")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: {source}")]
    Domain {
        line: usize,
        #[source]
        source: DomainError,
    },
}

/// Parses the output of one scanner tool
pub trait ScanParser: Send + Sync {
    /// Parse the complete stdout of one scan
    ///
    /// Empty output parses to no signals; `SignalService` treats blank
    /// output as a failed scan before it reaches the parser.
    fn parse(&self, output: &str) -> Result<Vec<Signal>, ParseError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::Band;

    /// Mock parser for `mac,ssid,band,strength` lines
    pub struct MockScanParser;

    impl ScanParser for MockScanParser {
        fn parse(&self, output: &str) -> Result<Vec<Signal>, ParseError> {
            let mut signals = Vec::new();

            for (index, line) in output.lines().enumerate() {
                let line_no = index + 1;
                // '#' lines play the part of a scanner's column header
                if line.trim().is_empty() || line.starts_with('#') {
                    continue;
                }

                let fields: Vec<&str> = line.split(',').map(str::trim).collect();
                let [mac, ssid, band, strength] = fields[..] else {
                    return Err(ParseError::MalformedLine {
                        line: line_no,
                        reason: format!("expected 4 fields, found {}", fields.len()),
                    });
                };

                let band: Band = band.parse().map_err(|_| ParseError::InvalidField {
                    line: line_no,
                    field: "band",
                    value: band.to_string(),
                })?;
                let strength: i32 = strength.parse().map_err(|_| ParseError::InvalidField {
                    line: line_no,
                    field: "strength",
                    value: strength.to_string(),
                })?;

                signals.push(Signal::try_new(mac, ssid, band, strength).map_err(|source| {
                    ParseError::Domain {
                        line: line_no,
                        source,
                    }
                })?);
            }

            Ok(signals)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::MockScanParser;
    use super::*;

    #[test]
    fn test_mock_parser_reads_lines() {
        let signals = MockScanParser
            .parse("mac1,ssid1,5,-45\n\nmac2,ssid1,2,-30\n")
            .unwrap();
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[1].strength, -30);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = MockScanParser.parse("mac1,ssid1,5,-45\ngarbage").unwrap_err();
        assert!(matches!(err, ParseError::MalformedLine { line: 2, .. }));
        assert!(err.to_string().starts_with("line 2:"));
    }
}
