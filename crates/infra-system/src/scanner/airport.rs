// airport scanner (macOS)
//
// `airport -s` prints a header and one radio per line. SSID is right aligned
// and may contain spaces, so columns are located from the BSSID onwards:
//
//                             SSID BSSID             RSSI CHANNEL HT CC SECURITY
//                     Home Network aa:bb:cc:dd:ee:01 -52  36,+1   Y  US WPA2(PSK/AES/AES)

use surveyor_core::domain::{Band, Signal};
use surveyor_core::port::{CommandSpec, ParseError, ScanParser};

use super::ensure_terminated;

const AIRPORT_PATH: &str =
    "/System/Library/PrivateFrameworks/Apple80211.framework/Versions/Current/Resources/airport";

pub fn scan_command() -> CommandSpec {
    CommandSpec::new(AIRPORT_PATH, ["-s"])
}

/// Whitespace separated tokens with their byte offsets
fn tokens(line: &str) -> Vec<(usize, &str)> {
    let mut tokens = Vec::new();
    let mut start = None;

    for (i, c) in line.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                tokens.push((s, &line[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push((s, &line[s..]));
    }

    tokens
}

/// `aa:bb:cc:dd:ee:ff` (either case, ':' or '-' separated)
fn is_mac(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() == 17
        && bytes.iter().enumerate().all(|(i, b)| {
            if i % 3 == 2 {
                *b == b':' || *b == b'-'
            } else {
                b.is_ascii_hexdigit()
            }
        })
}

fn is_header(tokens: &[(usize, &str)]) -> bool {
    tokens.iter().any(|(_, t)| *t == "BSSID") && tokens.iter().any(|(_, t)| *t == "RSSI")
}

/// Parser for `airport -s` listings
pub struct AirportParser;

impl AirportParser {
    fn parse_line(line_no: usize, line: &str, tokens: &[(usize, &str)]) -> Result<Signal, ParseError> {
        let Some(mac_index) = tokens.iter().position(|(_, t)| is_mac(t)) else {
            return Err(ParseError::MalformedLine {
                line: line_no,
                reason: "no BSSID column".to_string(),
            });
        };

        let (mac_offset, mac) = tokens[mac_index];
        let (Some((_, rssi)), Some((_, channel))) =
            (tokens.get(mac_index + 1), tokens.get(mac_index + 2))
        else {
            return Err(ParseError::MalformedLine {
                line: line_no,
                reason: "missing RSSI or CHANNEL column".to_string(),
            });
        };

        let invalid = |field: &'static str, value: &str| ParseError::InvalidField {
            line: line_no,
            field,
            value: value.to_string(),
        };

        let strength: i32 = rssi.parse().map_err(|_| invalid("rssi", rssi))?;

        // "36,+1" or "149,80": primary channel before the comma
        let band = channel
            .split(',')
            .next()
            .and_then(|c| c.parse::<u32>().ok())
            .and_then(Band::from_channel)
            .ok_or_else(|| invalid("channel", channel))?;

        let ssid = line[..mac_offset].trim();

        Signal::try_new(mac, ssid, band, strength).map_err(|source| ParseError::Domain {
            line: line_no,
            source,
        })
    }
}

impl ScanParser for AirportParser {
    fn parse(&self, output: &str) -> Result<Vec<Signal>, ParseError> {
        ensure_terminated(output)?;
        let mut signals = Vec::new();

        for (index, line) in output.lines().enumerate() {
            let tokens = tokens(line);
            if tokens.is_empty() || is_header(&tokens) {
                continue;
            }
            signals.push(Self::parse_line(index + 1, line, &tokens)?);
        }

        Ok(signals)
    }
}
