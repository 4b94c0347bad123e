// NetworkManager scanner (Linux)
//
// `nmcli -t -f BSSID,SSID,FREQ,SIGNAL device wifi list` prints one radio per
// line, fields separated by ':' with literal colons escaped as '\:':
//
//   AA\:BB\:CC\:DD\:EE\:01:HomeNet:2437 MHz:70

use surveyor_core::domain::{Band, Signal};
use surveyor_core::port::{CommandSpec, ParseError, ScanParser};

use super::ensure_terminated;

pub fn scan_command() -> CommandSpec {
    CommandSpec::new(
        "nmcli",
        ["-t", "-f", "BSSID,SSID,FREQ,SIGNAL", "device", "wifi", "list"],
    )
}

/// Split one terse line on unescaped ':'
fn split_terse(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => current.push(chars.next().unwrap_or('\\')),
            ':' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);

    fields
}

/// Parser for `nmcli` terse wifi listings
pub struct NmcliParser;

impl NmcliParser {
    fn parse_line(line_no: usize, line: &str) -> Result<Signal, ParseError> {
        let fields = split_terse(line);
        let [mac, ssid, freq, quality] = &fields[..] else {
            return Err(ParseError::MalformedLine {
                line: line_no,
                reason: format!("expected 4 fields, found {}", fields.len()),
            });
        };

        let invalid = |field: &'static str, value: &str| ParseError::InvalidField {
            line: line_no,
            field,
            value: value.to_string(),
        };

        let band = freq
            .trim()
            .trim_end_matches("MHz")
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(Band::from_mhz)
            .ok_or_else(|| invalid("frequency", freq))?;

        let quality: u8 = quality
            .trim()
            .parse()
            .ok()
            .filter(|q| *q <= 100)
            .ok_or_else(|| invalid("signal", quality))?;

        Signal::try_new(mac.as_str(), ssid.as_str(), band, Signal::dbm_from_quality(quality))
            .map_err(|source| ParseError::Domain {
                line: line_no,
                source,
            })
    }
}

impl ScanParser for NmcliParser {
    fn parse(&self, output: &str) -> Result<Vec<Signal>, ParseError> {
        ensure_terminated(output)?;
        output
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| Self::parse_line(index + 1, line))
            .collect()
    }
}
